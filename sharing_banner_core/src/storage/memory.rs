//! In-memory storage backend.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use thiserror::Error;

use super::SessionStorage;

/// An in-memory [`SessionStorage`].
///
/// Clones share the same underlying map, the same way every handle to
/// `window.sessionStorage` sees the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create a new, empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("creating new in-memory session storage");
        Self::default()
    }

    /// Make every subsequent operation fail (or succeed again).
    ///
    /// Simulates a browser that has storage disabled or is out of quota.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), MemoryStorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(MemoryStorageError)
        } else {
            Ok(())
        }
    }
}

impl SessionStorage for MemoryStorage {
    type Error = MemoryStorageError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.check_available()?;
        tracing::trace!(key, "MemoryStorage::get_item");
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.check_available()?;
        tracing::trace!(key, "MemoryStorage::set_item");
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// The in-memory storage has been switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("in-memory session storage is unavailable")]
pub struct MemoryStorageError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_is_none() -> Result<(), MemoryStorageError> {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("missing")?, None);
        Ok(())
    }

    #[test]
    fn test_clones_share_contents() -> Result<(), MemoryStorageError> {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("k", "v")?;
        assert_eq!(other.get_item("k")?.as_deref(), Some("v"));
        assert_eq!(other.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unavailable_fails_reads_and_writes() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        assert_eq!(storage.set_item("k", "v"), Err(MemoryStorageError));
        assert_eq!(storage.get_item("k"), Err(MemoryStorageError));

        storage.set_unavailable(false);
        assert!(storage.is_empty());
    }
}
