//! `window.sessionStorage`.

use sharing_banner_core::storage::SessionStorage;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// A [`SessionStorage`] over the window's `sessionStorage`.
///
/// The storage object is looked up on every call; browsers may refuse it
/// (privacy modes, sandboxed frames), in which case every operation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WebSessionStorage;

impl WebSessionStorage {
    fn storage() -> Result<web_sys::Storage, WebStorageError> {
        web_sys::window()
            .ok_or(WebStorageError::Unavailable)?
            .session_storage()
            .map_err(WebStorageError::Js)?
            .ok_or(WebStorageError::Unavailable)
    }
}

impl SessionStorage for WebSessionStorage {
    type Error = WebStorageError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Self::storage()?.get_item(key).map_err(WebStorageError::Js)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        Self::storage()?
            .set_item(key, value)
            .map_err(WebStorageError::Js)
    }
}

/// Problem accessing `sessionStorage`.
#[derive(Debug, Clone, Error)]
pub enum WebStorageError {
    /// No window, or the browser refused access to session storage.
    #[error("session storage unavailable")]
    Unavailable,

    /// The storage call threw (e.g. quota exceeded).
    #[error("session storage error: {0:?}")]
    Js(JsValue),
}
