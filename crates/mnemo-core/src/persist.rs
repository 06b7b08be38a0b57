//! Shared JSON-document persistence for the stores.
//!
//! Each store owns one JSON document: a pretty-printed file on disk, or an
//! in-memory slot with identical semantics for tests. The document is fully
//! rewritten on every save. Reads are fail-open: a missing, unreadable, or
//! malformed document loads as empty so memory never blocks the
//! conversational path.

use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use crate::error::Result;

/// Storage backing for one JSON document.
pub(crate) enum Backing {
    /// Pretty-printed JSON file.
    File(PathBuf),
    /// In-memory document slot.
    Memory(Mutex<Option<String>>),
}

impl Backing {
    pub(crate) fn in_memory() -> Self {
        Backing::Memory(Mutex::new(None))
    }

    /// Load and parse the document, falling back to the type's default when
    /// the document is missing or malformed.
    pub(crate) async fn load_or_default<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        let raw = match self {
            Backing::File(path) => {
                if !path.exists() {
                    return T::default();
                }
                match fs::read_to_string(path).await {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!("Failed to read {}, treating as empty: {}", path.display(), e);
                        return T::default();
                    }
                }
            }
            Backing::Memory(slot) => match slot.lock().clone() {
                Some(content) => content,
                None => return T::default(),
            },
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Malformed store document, treating as empty: {}", e);
                T::default()
            }
        }
    }

    /// Serialize and fully rewrite the document.
    pub(crate) async fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        match self {
            Backing::File(path) => fs::write(path, content).await?,
            Backing::Memory(slot) => *slot.lock() = Some(content),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let backing = Backing::File(temp_dir.path().join("absent.json"));

        let value: Vec<String> = backing.load_or_default().await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let backing = Backing::File(path);
        let value: HashMap<String, String> = backing.load_or_default().await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_file_roundtrip_is_pretty_printed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        let backing = Backing::File(path.clone());

        backing.save(&vec!["a".to_string(), "b".to_string()]).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains('\n'));

        let value: Vec<String> = backing.load_or_default().await;
        assert_eq!(value, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_memory_slot_roundtrip() {
        let backing = Backing::in_memory();

        let empty: Vec<u32> = backing.load_or_default().await;
        assert!(empty.is_empty());

        backing.save(&vec![1u32, 2, 3]).await.unwrap();

        let value: Vec<u32> = backing.load_or_default().await;
        assert_eq!(value, vec![1, 2, 3]);
    }
}
