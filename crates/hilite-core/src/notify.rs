//! Document-state notifications for external consumers.
//!
//! Events are advisory. The [`Notifier`] keeps only the newest event of each
//! kind and releases them once input has been quiet for the debounce
//! interval, so a slow consumer sees one update per burst of keystrokes
//! rather than one per key.

use std::time::Duration;

use web_time::Instant;

/// Default quiet interval before queued events are released.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Full text, paragraphs joined by newline.
    TextUpdated(String),
    /// Linear selection bounds.
    CursorChanged { start: usize, end: usize },
}

/// Debouncing queue for [`DocumentEvent`]s.
#[derive(Debug, Clone)]
pub struct Notifier {
    debounce: Duration,
    text: Option<String>,
    cursor: Option<(usize, usize)>,
    last_queued: Option<Instant>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Notifier {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            text: None,
            cursor: None,
            last_queued: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Queue an event, replacing any pending event of the same kind.
    pub fn queue(&mut self, event: DocumentEvent, now: Instant) {
        match event {
            DocumentEvent::TextUpdated(text) => self.text = Some(text),
            DocumentEvent::CursorChanged { start, end } => self.cursor = Some((start, end)),
        }
        self.last_queued = Some(now);
    }

    pub fn has_pending(&self) -> bool {
        self.text.is_some() || self.cursor.is_some()
    }

    /// Release pending events if nothing was queued for the debounce interval.
    pub fn poll(&mut self, now: Instant) -> Vec<DocumentEvent> {
        match self.last_queued {
            Some(at) if now.saturating_duration_since(at) >= self.debounce => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Release pending events immediately. Text comes before cursor.
    pub fn flush(&mut self) -> Vec<DocumentEvent> {
        self.last_queued = None;
        let mut events = Vec::with_capacity(2);
        if let Some(text) = self.text.take() {
            events.push(DocumentEvent::TextUpdated(text));
        }
        if let Some((start, end)) = self.cursor.take() {
            events.push(DocumentEvent::CursorChanged { start, end });
        }
        if !events.is_empty() {
            tracing::trace!(count = events.len(), "releasing document events");
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_keeps_latest() {
        let start = Instant::now();
        let mut n = Notifier::new(Duration::from_millis(100));
        n.queue(DocumentEvent::TextUpdated("a".into()), start);
        n.queue(DocumentEvent::CursorChanged { start: 1, end: 1 }, start);
        n.queue(
            DocumentEvent::TextUpdated("ab".into()),
            start + Duration::from_millis(50),
        );

        assert!(n.poll(start + Duration::from_millis(120)).is_empty());
        assert!(n.has_pending());

        let events = n.poll(start + Duration::from_millis(150));
        assert_eq!(
            events,
            vec![
                DocumentEvent::TextUpdated("ab".into()),
                DocumentEvent::CursorChanged { start: 1, end: 1 },
            ]
        );
        assert!(!n.has_pending());
        assert!(n.poll(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_flush_releases_immediately() {
        let mut n = Notifier::default();
        n.queue(DocumentEvent::CursorChanged { start: 0, end: 2 }, Instant::now());
        assert_eq!(
            n.flush(),
            vec![DocumentEvent::CursorChanged { start: 0, end: 2 }]
        );
        assert!(n.flush().is_empty());
    }
}
