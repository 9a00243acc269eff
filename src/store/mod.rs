pub mod memory;
pub mod postgres;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub use memory::MemoryCollectionStore;
pub use postgres::PgCollectionStore;

/// Collection keys, mirroring the layout of the legacy store.
pub const QUIZZES_KEY: &str = "quizzes:all";
pub const SCORE_DETAILS_KEY: &str = "scoredetails:all";
pub const PROGRAMS_KEY: &str = "master:programs";
pub const PROGRAM_SISWA_KEY: &str = "master:program-siswa";
pub const MITRA_KEY: &str = "mitrakerja:all";
pub const ATTEMPTS_PREFIX: &str = "attempts:";

pub fn attempts_key(login: &str) -> String {
    format!("{}{}", ATTEMPTS_PREFIX, login.to_uppercase())
}

/// How many times a read-modify-write cycle retries on a version conflict
/// before giving up.
const CAS_MAX_ROUNDS: usize = 5;

#[derive(Debug, Clone)]
pub struct VersionedBlob {
    pub value: JsonValue,
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored(i64),
    Conflict,
}

/// A remote store of named JSON collections. Each key holds one whole
/// collection; there is no per-record addressing. Writes are conditional on
/// the version observed at read time, so concurrent writers cannot silently
/// clobber each other.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Fetch the blob stored under `key`, with its current version.
    async fn get(&self, key: &str) -> Result<Option<VersionedBlob>>;

    /// Store `value` under `key`. `expected = None` requires the key to be
    /// absent; `Some(v)` requires the stored version to still be `v`.
    async fn put(&self, key: &str, value: JsonValue, expected: Option<i64>) -> Result<PutOutcome>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix` (reconciliation scans).
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

pub type SharedStore = Arc<dyn CollectionStore>;

/// Read the collection under `key` as `T`, defaulting when the key is absent.
/// Returns the decoded value together with the version token to pass back to
/// `write_collection`.
pub async fn read_collection<T>(store: &dyn CollectionStore, key: &str) -> Result<(T, Option<i64>)>
where
    T: DeserializeOwned + Default,
{
    match store.get(key).await? {
        Some(blob) => {
            // A blob that no longer matches its type is stored-data
            // corruption, not a caller mistake.
            let value = serde_json::from_value(blob.value)
                .map_err(|err| Error::Internal(format!("Corrupt collection {}: {}", key, err)))?;
            Ok((value, Some(blob.version)))
        }
        None => Ok((T::default(), None)),
    }
}

/// Write back a whole collection, conditional on the version obtained from
/// `read_collection`. `Ok(true)` means stored, `Ok(false)` means someone
/// else got there first and the caller should re-read and retry.
pub async fn write_collection<T>(
    store: &dyn CollectionStore,
    key: &str,
    value: &T,
    expected: Option<i64>,
) -> Result<bool>
where
    T: Serialize,
{
    let json = serde_json::to_value(value)
        .map_err(|err| Error::Internal(format!("Cannot encode collection {}: {}", key, err)))?;
    match store.put(key, json, expected).await? {
        PutOutcome::Stored(_) => Ok(true),
        PutOutcome::Conflict => Ok(false),
    }
}

/// Run a read-modify-write cycle against one collection key, retrying on
/// version conflicts. `mutate` returns `Commit` to persist the mutated
/// collection or `Unchanged` to leave it untouched; errors from the closure
/// abort the cycle without writing.
pub async fn modify_collection<T, F, O>(store: &dyn CollectionStore, key: &str, mutate: F) -> Result<O>
where
    T: DeserializeOwned + Serialize + Default,
    F: Fn(&mut T) -> Result<MutateOutcome<O>>,
{
    for round in 0..CAS_MAX_ROUNDS {
        let (mut collection, version) = read_collection::<T>(store, key).await?;
        match mutate(&mut collection)? {
            MutateOutcome::Unchanged(output) => return Ok(output),
            MutateOutcome::Commit(output) => {
                if write_collection(store, key, &collection, version).await? {
                    return Ok(output);
                }
                tracing::warn!(key, round, "collection write conflict, retrying");
            }
        }
    }
    Err(Error::Conflict(format!(
        "Gave up writing collection {} after {} conflicting rounds",
        key, CAS_MAX_ROUNDS
    )))
}

pub enum MutateOutcome<O> {
    /// Persist the mutated collection and return the output.
    Commit(O),
    /// Nothing changed; skip the write entirely.
    Unchanged(O),
}
