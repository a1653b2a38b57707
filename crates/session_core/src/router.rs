//! Dispatch of decoded agent events into overlay state.

use shared::domain::GeneratedImage;
use shared::protocol::AgentEvent;
use tracing::{debug, warn};

/// Routes one event into the overlay slot. Returns true when the
/// overlay changed. Side effects are confined to `overlay`; invalid
/// payloads leave the prior overlay intact.
pub(crate) fn route_agent_event(
    event: AgentEvent,
    overlay: &mut Option<GeneratedImage>,
) -> bool {
    match event {
        AgentEvent::Image(payload) => {
            if payload.url.is_empty() {
                warn!("image event missing url; keeping prior overlay");
                return false;
            }
            *overlay = Some(GeneratedImage {
                url: payload.url,
                prompt: payload.prompt,
            });
            true
        }
        AgentEvent::Unknown => {
            debug!("ignoring unknown agent event kind");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::ImageEventPayload;

    use super::*;

    fn image_event(url: &str, prompt: &str) -> AgentEvent {
        AgentEvent::Image(ImageEventPayload {
            url: url.to_string(),
            prompt: prompt.to_string(),
        })
    }

    #[test]
    fn valid_image_replaces_overlay() {
        let mut overlay = None;
        assert!(route_agent_event(image_event("http://x/i.png", "milk"), &mut overlay));
        assert!(route_agent_event(image_event("http://x/j.png", "eggs"), &mut overlay));
        assert_eq!(
            overlay,
            Some(GeneratedImage {
                url: "http://x/j.png".to_string(),
                prompt: "eggs".to_string(),
            })
        );
    }

    #[test]
    fn empty_url_preserves_prior_overlay() {
        let mut overlay = Some(GeneratedImage {
            url: "http://x/i.png".to_string(),
            prompt: "milk".to_string(),
        });
        assert!(!route_agent_event(image_event("", "eggs"), &mut overlay));
        assert_eq!(overlay.as_ref().map(|i| i.prompt.as_str()), Some("milk"));
    }

    #[test]
    fn unknown_event_is_a_noop() {
        let mut overlay = None;
        assert!(!route_agent_event(AgentEvent::Unknown, &mut overlay));
        assert_eq!(overlay, None);
    }
}
