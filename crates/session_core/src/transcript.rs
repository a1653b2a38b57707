//! Append-only transcript merged from local and remote transcription
//! records, ordered by arrival rather than by timestamp.

use std::collections::HashMap;

use shared::domain::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub message: ChatMessage,
    /// Set when a local message arrived before the session was active
    /// and the pre-connect buffer is enabled; cleared once the session
    /// reaches the active phase.
    pub buffered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptUpdate {
    /// A new message was appended. `autoscroll` is true iff it
    /// originated locally; it is the sole trigger for scrolling.
    Appended { autoscroll: bool },
    /// A correction for a known id updated the text in place.
    Edited,
    /// Re-delivery of an identical record; nothing changed.
    Unchanged,
}

#[derive(Debug, Default)]
pub struct TranscriptAggregator {
    entries: Vec<TranscriptEntry>,
    index: HashMap<String, usize>,
}

impl TranscriptAggregator {
    pub fn apply(&mut self, message: ChatMessage, buffered: bool) -> TranscriptUpdate {
        if let Some(&position) = self.index.get(&message.id) {
            let entry = &mut self.entries[position];
            if entry.message.text == message.text {
                return TranscriptUpdate::Unchanged;
            }
            entry.message.text = message.text;
            entry.message.edited = true;
            return TranscriptUpdate::Edited;
        }

        let autoscroll = message.origin.is_local();
        self.index.insert(message.id.clone(), self.entries.len());
        self.entries.push(TranscriptEntry { message, buffered });
        TranscriptUpdate::Appended { autoscroll }
    }

    pub fn mark_delivered(&mut self) {
        for entry in &mut self.entries {
            entry.buffered = false;
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last_message_is_local(&self) -> bool {
        self.entries
            .last()
            .is_some_and(|entry| entry.message.origin.is_local())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shared::domain::MessageOrigin;

    use super::*;

    fn message(id: &str, origin: MessageOrigin, text: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            origin,
            text: text.to_string(),
            created_at: Utc::now(),
            edited: false,
        }
    }

    #[test]
    fn preserves_append_order_and_length() {
        let mut transcript = TranscriptAggregator::default();
        transcript.apply(message("a", MessageOrigin::Remote, "hi"), false);
        transcript.apply(message("b", MessageOrigin::Local, "milk please"), false);
        transcript.apply(message("c", MessageOrigin::Remote, "on it"), false);

        let ids: Vec<&str> = transcript
            .entries()
            .iter()
            .map(|e| e.message.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn autoscroll_true_only_for_local_appends() {
        let mut transcript = TranscriptAggregator::default();
        assert_eq!(
            transcript.apply(message("a", MessageOrigin::Local, "hey"), false),
            TranscriptUpdate::Appended { autoscroll: true }
        );
        assert_eq!(
            transcript.apply(message("b", MessageOrigin::Remote, "hello"), false),
            TranscriptUpdate::Appended { autoscroll: false }
        );
        assert!(!transcript.last_message_is_local());
    }

    #[test]
    fn correction_toggles_edited_without_reordering() {
        let mut transcript = TranscriptAggregator::default();
        transcript.apply(message("a", MessageOrigin::Local, "I need mil"), false);
        transcript.apply(message("b", MessageOrigin::Remote, "pardon?"), false);

        let update = transcript.apply(message("a", MessageOrigin::Local, "I need milk"), false);
        assert_eq!(update, TranscriptUpdate::Edited);

        let first = &transcript.entries()[0];
        assert_eq!(first.message.text, "I need milk");
        assert!(first.message.edited);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn identical_redelivery_is_unchanged() {
        let mut transcript = TranscriptAggregator::default();
        transcript.apply(message("a", MessageOrigin::Local, "hello"), false);
        let update = transcript.apply(message("a", MessageOrigin::Local, "hello"), false);
        assert_eq!(update, TranscriptUpdate::Unchanged);
        assert!(!transcript.entries()[0].message.edited);
    }

    #[test]
    fn mark_delivered_clears_buffered_flags() {
        let mut transcript = TranscriptAggregator::default();
        transcript.apply(message("a", MessageOrigin::Local, "early"), true);
        transcript.apply(message("b", MessageOrigin::Remote, "greeting"), false);
        assert!(transcript.entries()[0].buffered);

        transcript.mark_delivered();
        assert!(transcript.entries().iter().all(|e| !e.buffered));
    }
}
