//! Session-scoped key/value storage.
//!
//! Mirrors the browser's `sessionStorage`: string keys, string values,
//! synchronous access, contents live for the browsing session only.

pub mod memory;

/// Synchronous string key/value storage scoped to a browsing session.
pub trait SessionStorage {
    /// The error type for storage operations.
    type Error: core::error::Error;

    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying storage cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the underlying storage rejects the write
    /// (unavailable, quota exceeded, ...).
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for &S {
    type Error = S::Error;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set_item(key, value)
    }
}
