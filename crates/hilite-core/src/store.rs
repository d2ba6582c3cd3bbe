//! Key-value persistence for the last-known composite pattern.

use std::collections::HashMap;

use crate::error::StoreError;
use crate::pattern::CompositePattern;

/// Key under which the pattern source is stored.
pub const PATTERN_KEY: &str = "hilite:pattern";

/// Minimal string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, for tests and sessions without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Persist a pattern's source under `key`.
pub fn save_pattern<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    pattern: &CompositePattern,
) -> Result<(), StoreError> {
    store.set(key, pattern.source())
}

/// Restore the pattern stored under `key`, or the builtin one.
///
/// A missing entry, a store failure or a source that no longer compiles all
/// fall back to [`CompositePattern::builtin`].
pub fn load_pattern<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> CompositePattern {
    let source = match store.get(key) {
        Ok(Some(source)) => source,
        Ok(None) => {
            tracing::debug!(key, "no stored pattern, using builtin");
            return CompositePattern::builtin();
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read stored pattern");
            return CompositePattern::builtin();
        }
    };

    match CompositePattern::from_source(&source) {
        Ok(pattern) => {
            tracing::debug!(key, "restored stored pattern");
            pattern
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "stored pattern is unusable");
            CompositePattern::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{TldList, build_pattern};

    #[test]
    fn test_pattern_round_trip() {
        let mut store = MemoryStore::new();
        let pattern = build_pattern(&TldList::from_entries(["zz", "xn--abc"])).unwrap();
        save_pattern(&mut store, PATTERN_KEY, &pattern).unwrap();

        let restored = load_pattern(&store, PATTERN_KEY);
        assert_eq!(restored, pattern);
        assert_eq!(restored.find_matches("go to site.zz").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_falls_back_to_builtin() {
        let store = MemoryStore::new();
        assert_eq!(load_pattern(&store, PATTERN_KEY), CompositePattern::builtin());
    }

    #[test]
    fn test_unusable_source_falls_back() {
        let mut store = MemoryStore::new();
        store.set(PATTERN_KEY, "(a)(b").unwrap();
        assert_eq!(load_pattern(&store, PATTERN_KEY), CompositePattern::builtin());

        store.set(PATTERN_KEY, "(a)|(b)").unwrap();
        assert_eq!(load_pattern(&store, PATTERN_KEY), CompositePattern::builtin());
    }
}
