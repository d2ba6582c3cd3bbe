//! Key-value store backed by a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hilite_core::{KeyValueStore, StoreError};

use crate::error::JsonStoreError;

/// Key-value store backed by a single JSON object file.
///
/// A missing file reads as an empty store; the file and its parent
/// directories are created on first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T = PathBuf>
where
    T: AsRef<Path>,
{
    path: T,
}

impl<T> JsonFileStore<T>
where
    T: AsRef<Path>,
{
    pub fn new(path: T) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        self.path.as_ref()
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let file = match std::fs::read_to_string(self.path.as_ref()) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let entries = serde_json::from_str(&file).map_err(JsonStoreError::from)?;
        Ok(entries)
    }
}

impl<T> KeyValueStore for JsonFileStore<T>
where
    T: AsRef<Path>,
{
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_owned(), value.to_owned());

        let path = self.path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = serde_json::to_string_pretty(&entries).map_err(JsonStoreError::from)?;
        std::fs::write(path, file)?;
        tracing::trace!(key, path = %path.display(), "stored value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilite_core::{CompositePattern, PATTERN_KEY, load_pattern, save_pattern};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hilite-store-{}-{name}", std::process::id()))
            .join("store.json")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let path = temp_path("roundtrip");
        let mut store = JsonFileStore::new(path.clone());
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let reopened = JsonFileStore::new(path.clone());
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_pattern_persists_across_stores() {
        let path = temp_path("pattern");
        let mut store = JsonFileStore::new(path.clone());
        let pattern = CompositePattern::builtin();
        save_pattern(&mut store, PATTERN_KEY, &pattern).unwrap();

        let reopened = JsonFileStore::new(path.clone());
        assert_eq!(load_pattern(&reopened, PATTERN_KEY), pattern);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_backend_error() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = JsonFileStore::new(path.clone());
        assert!(matches!(store.get("a"), Err(StoreError::Backend(_))));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
