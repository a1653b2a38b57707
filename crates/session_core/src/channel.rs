//! Decode step for the shared data channel: narrows the untyped
//! packet stream down to typed agent events on the reserved topic.

use room_integration::DataPacket;
use shared::protocol::{AgentEvent, AGENT_EVENTS_TOPIC};
use tracing::warn;

/// Returns the decoded event for reserved-topic packets. Packets on
/// other topics are dropped silently; malformed payloads on the
/// reserved topic are dropped with a diagnostic. Never fails upward.
pub(crate) fn decode_agent_packet(packet: &DataPacket) -> Option<AgentEvent> {
    if packet.topic != AGENT_EVENTS_TOPIC {
        return None;
    }

    let text = match std::str::from_utf8(&packet.payload) {
        Ok(text) => text,
        Err(err) => {
            warn!(topic = %packet.topic, error = %err, "agent event payload is not utf-8");
            return None;
        }
    };

    match serde_json::from_str::<AgentEvent>(text) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(topic = %packet.topic, error = %err, "failed to parse agent event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use shared::protocol::ImageEventPayload;

    use super::*;

    fn packet(topic: &str, payload: &[u8]) -> DataPacket {
        DataPacket {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            participant_identity: Some("agent".to_string()),
        }
    }

    #[test]
    fn decodes_image_event_on_reserved_topic() {
        let decoded = decode_agent_packet(&packet(
            AGENT_EVENTS_TOPIC,
            br#"{"type":"image","data":{"url":"http://x/i.png","prompt":"milk"}}"#,
        ));
        assert_eq!(
            decoded,
            Some(AgentEvent::Image(ImageEventPayload {
                url: "http://x/i.png".to_string(),
                prompt: "milk".to_string(),
            }))
        );
    }

    #[test]
    fn drops_other_topics_silently() {
        let decoded = decode_agent_packet(&packet(
            "lk.chat",
            br#"{"type":"image","data":{"url":"http://x/i.png","prompt":"milk"}}"#,
        ));
        assert_eq!(decoded, None);
    }

    #[test]
    fn malformed_json_is_dropped() {
        assert_eq!(
            decode_agent_packet(&packet(AGENT_EVENTS_TOPIC, b"{not json")),
            None
        );
    }

    #[test]
    fn non_utf8_payload_is_dropped() {
        assert_eq!(
            decode_agent_packet(&packet(AGENT_EVENTS_TOPIC, &[0xff, 0xfe, 0x00])),
            None
        );
    }

    #[test]
    fn unknown_kind_decodes_to_unknown() {
        let decoded = decode_agent_packet(&packet(
            AGENT_EVENTS_TOPIC,
            br#"{"type":"order_status","data":{"id":42}}"#,
        ));
        assert_eq!(decoded, Some(AgentEvent::Unknown));
    }
}
