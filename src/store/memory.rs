use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{CollectionStore, PutOutcome, VersionedBlob};

/// In-memory collection store with the same conditional-write semantics as
/// the Postgres implementation. Used by tests and local smoke runs.
#[derive(Default)]
pub struct MemoryCollectionStore {
    entries: Mutex<HashMap<String, (JsonValue, i64)>>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryCollectionStore {
    async fn get(&self, key: &str) -> Result<Option<VersionedBlob>> {
        let entries = self.entries.lock().expect("memory store mutex poisoned");
        Ok(entries.get(key).map(|(value, version)| VersionedBlob {
            value: value.clone(),
            version: *version,
        }))
    }

    async fn put(&self, key: &str, value: JsonValue, expected: Option<i64>) -> Result<PutOutcome> {
        let mut entries = self.entries.lock().expect("memory store mutex poisoned");
        match (entries.get(key), expected) {
            (None, None) => {
                entries.insert(key.to_string(), (value, 1));
                Ok(PutOutcome::Stored(1))
            }
            (Some((_, current)), Some(version)) if *current == version => {
                let next = version + 1;
                entries.insert(key.to_string(), (value, next));
                Ok(PutOutcome::Stored(next))
            }
            _ => Ok(PutOutcome::Conflict),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("memory store mutex poisoned");
        entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().expect("memory store mutex poisoned");
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}
