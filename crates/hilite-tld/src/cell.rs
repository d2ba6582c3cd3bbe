//! The swappable "current pattern" value.
//!
//! Readers take a snapshot at the start of an edit and keep it for the whole
//! edit; a refresh publishes a new immutable pattern in one step.

use std::sync::Arc;

use hilite_core::CompositePattern;
use tokio::sync::watch;

/// Holder of the active composite pattern.
#[derive(Debug, Clone)]
pub struct PatternCell {
    tx: Arc<watch::Sender<Arc<CompositePattern>>>,
}

impl PatternCell {
    pub fn new(pattern: CompositePattern) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(pattern));
        Self { tx: Arc::new(tx) }
    }

    /// The current pattern.
    pub fn snapshot(&self) -> Arc<CompositePattern> {
        self.tx.borrow().clone()
    }

    /// Publish a new pattern, returning the one it replaced.
    pub fn replace(&self, pattern: CompositePattern) -> Arc<CompositePattern> {
        self.tx.send_replace(Arc::new(pattern))
    }

    /// Receiver notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CompositePattern>> {
        self.tx.subscribe()
    }
}

impl Default for PatternCell {
    fn default() -> Self {
        Self::new(CompositePattern::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilite_core::{TldList, build_pattern};

    #[test]
    fn test_snapshot_survives_replace() {
        let cell = PatternCell::default();
        let before = cell.snapshot();

        let fresh = build_pattern(&TldList::from_entries(["zz"])).unwrap();
        let old = cell.replace(fresh.clone());

        assert_eq!(*old, *before);
        assert_eq!(*cell.snapshot(), fresh);
        // The earlier snapshot is unaffected.
        assert!(before.find_matches("see example.zz").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_replacement() {
        let cell = PatternCell::default();
        let mut rx = cell.subscribe();
        let clone = cell.clone();
        clone.replace(build_pattern(&TldList::from_entries(["zz"])).unwrap());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().find_matches("see example.zz").unwrap().len(), 1);
    }
}
