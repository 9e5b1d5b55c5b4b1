//! Error types.

use sharing_banner_core::{config::ConfigError, extension::InitError};
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Problem initializing the [`SharingBanner`](crate::extension::WasmSharingBanner).
#[derive(Debug, Error)]
pub enum WasmInitError {
    /// The extension properties could not be read as configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The extension properties could not be serialized.
    #[error("unreadable extension properties: {0:?}")]
    Properties(JsValue),

    /// The lifecycle rejected the call.
    #[error(transparent)]
    Lifecycle(#[from] InitError),
}

impl WasmInitError {
    const fn js_name(&self) -> &'static str {
        match self {
            WasmInitError::Config(_) | WasmInitError::Properties(_) => "SharingBannerConfigError",
            WasmInitError::Lifecycle(_) => "SharingBannerInitError",
        }
    }
}

impl From<WasmInitError> for JsValue {
    fn from(err: WasmInitError) -> Self {
        let js_err = js_sys::Error::new(&err.to_string());
        js_err.set_name(err.js_name());
        js_err.into()
    }
}
