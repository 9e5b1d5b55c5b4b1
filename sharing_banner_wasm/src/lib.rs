//! # Browser bindings for the sharing banner.
//!
//! Wires [`sharing_banner_core`] to the browser: `sessionStorage`, the
//! SharePoint search REST endpoint, `setTimeout`, and a duck-typed host
//! object supplied by the page extension's JavaScript shim.
//!
//! ```js
//! import init, { SharingBanner } from "sharing_banner_wasm";
//!
//! await init();
//! const banner = new SharingBanner(host);
//! banner.initialize(properties);
//! // ...
//! banner.teardown();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clock;
pub mod error;
pub mod extension;
pub mod host;
pub mod search;
pub mod storage;
pub mod timer;

use wasm_bindgen::prelude::*;
use wasm_tracing::WasmLayerConfig;

pub use sharing_banner_core;

/// Route `tracing` events to the browser console and set a panic hook.
#[wasm_bindgen(js_name = setPanicHook)]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let max_level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let mut config = WasmLayerConfig::new();
    config.set_max_level(max_level);
    config.console = wasm_tracing::ConsoleConfig::ReportWithConsoleColor;

    if wasm_tracing::set_as_global_default_with_config(config).is_err() {
        tracing::debug!("global tracing subscriber already set");
    }
}

/// Entry point called when the wasm module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    tracing::info!("sharing_banner_wasm v{}", env!("CARGO_PKG_VERSION"));
}
