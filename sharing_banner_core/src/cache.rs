//! Expiring key/value cache over [`SessionStorage`].
//!
//! All entries of one cache live in a single storage value (the
//! _namespace record_), serialized as JSON:
//!
//! ```text
//! "<namespace>" => { "<sub key>": { "payload": <any>, "expiration": <ms> | null }, ... }
//! ```
//!
//! The functions here are stateless: storage and the current time are
//! passed in. Neither [`get`] nor [`set`] fails. Storage and (de)serialization
//! problems are logged and read as a miss.

use std::collections::BTreeMap;

use core::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{storage::SessionStorage, timestamp::TimestampMillis};

type NamespaceRecord = BTreeMap<String, serde_json::Value>;

/// A cached payload and the instant after which it is no longer valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub payload: T,

    /// Milliseconds since the Unix epoch; `None` never expires.
    pub expiration: Option<u64>,
}

impl<T> CacheEntry<T> {
    /// Whether the entry is past its expiration at `now`.
    ///
    /// An entry is still valid at exactly its expiration instant.
    #[must_use]
    pub fn is_expired(&self, now: TimestampMillis) -> bool {
        self.expiration
            .is_some_and(|expiration| now.as_millis() > expiration)
    }
}

/// Problem reading or writing the namespace record.
#[derive(Debug, Error)]
pub enum CacheError<E: core::error::Error> {
    /// The storage backend failed.
    #[error("session storage error: {0}")]
    Storage(#[source] E),

    /// The stored record (or entry) is not valid JSON of the expected shape.
    #[error("malformed cache record: {0}")]
    Decode(#[source] serde_json::Error),

    /// The payload could not be serialized.
    #[error("could not serialize cache entry: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Look up `sub_key` in the `namespace` record.
///
/// Returns `None` if the entry is absent, expired at `now`, or anything
/// about the storage or its contents is broken.
pub fn get<S: SessionStorage, T: DeserializeOwned>(
    storage: &S,
    now: TimestampMillis,
    namespace: &str,
    sub_key: &str,
) -> Option<T> {
    match try_get(storage, now, namespace, sub_key) {
        Ok(Some(payload)) => {
            tracing::debug!(namespace, sub_key, "cache hit");
            Some(payload)
        }
        Ok(None) => {
            tracing::debug!(namespace, sub_key, "cache miss");
            None
        }
        Err(e) => {
            tracing::warn!(namespace, sub_key, error = %e, "cache read failed, treating as miss");
            None
        }
    }
}

/// Store `payload` under `sub_key` in the `namespace` record.
///
/// A non-zero `ttl` sets the expiration to `now + ttl`; `None` or a zero
/// duration stores an entry that never expires. Other entries of the
/// namespace are preserved. An unreadable record is replaced.
///
/// Returns the entry as read back through [`get`], or `None` if the write
/// failed.
pub fn set<S: SessionStorage, T: Serialize + DeserializeOwned>(
    storage: &S,
    now: TimestampMillis,
    namespace: &str,
    sub_key: &str,
    payload: T,
    ttl: Option<Duration>,
) -> Option<T> {
    if let Err(e) = try_set(storage, now, namespace, sub_key, payload, ttl) {
        tracing::warn!(namespace, sub_key, error = %e, "cache write failed");
        return None;
    }

    get(storage, now, namespace, sub_key)
}

fn try_get<S: SessionStorage, T: DeserializeOwned>(
    storage: &S,
    now: TimestampMillis,
    namespace: &str,
    sub_key: &str,
) -> Result<Option<T>, CacheError<S::Error>> {
    let mut record = read_record(storage, namespace)?;
    let Some(value) = record.remove(sub_key) else {
        return Ok(None);
    };

    let entry: CacheEntry<T> = serde_json::from_value(value).map_err(CacheError::Decode)?;
    if entry.is_expired(now) {
        tracing::debug!(namespace, sub_key, expiration = ?entry.expiration, "cache entry expired");
        return Ok(None);
    }

    Ok(Some(entry.payload))
}

fn try_set<S: SessionStorage, T: Serialize>(
    storage: &S,
    now: TimestampMillis,
    namespace: &str,
    sub_key: &str,
    payload: T,
    ttl: Option<Duration>,
) -> Result<(), CacheError<S::Error>> {
    let mut record = match read_record(storage, namespace) {
        Ok(record) => record,
        Err(CacheError::Decode(e)) => {
            tracing::warn!(namespace, error = %e, "replacing malformed cache record");
            NamespaceRecord::new()
        }
        Err(e) => return Err(e),
    };

    let expiration = ttl
        .filter(|ttl| !ttl.is_zero())
        .map(|ttl| now.saturating_add(ttl).as_millis());
    let entry = CacheEntry {
        payload,
        expiration,
    };

    record.insert(
        sub_key.to_owned(),
        serde_json::to_value(&entry).map_err(CacheError::Encode)?,
    );
    let raw = serde_json::to_string(&record).map_err(CacheError::Encode)?;
    storage
        .set_item(namespace, &raw)
        .map_err(CacheError::Storage)
}

fn read_record<S: SessionStorage>(
    storage: &S,
    namespace: &str,
) -> Result<NamespaceRecord, CacheError<S::Error>> {
    match storage.get_item(namespace).map_err(CacheError::Storage)? {
        None => Ok(NamespaceRecord::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(CacheError::Decode),
    }
}
