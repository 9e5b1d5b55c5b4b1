//! The `SharingBanner` JavaScript class.

use std::rc::{Rc, Weak};

use future_form::Local;
use sharing_banner_core::{
    BannerConfig, SharingBanner,
    extension::{Activation, InitError},
};
use wasm_bindgen::{JsCast, closure::Closure, prelude::*};

use crate::{
    clock::JsClock,
    error::WasmInitError,
    host::{HostPageContext, HostPlaceholderProvider, JsHost},
    search::RestSearchClient,
    storage::WebSessionStorage,
    timer::WasmTimeout,
};

type BrowserBanner = SharingBanner<
    Local,
    WebSessionStorage,
    JsClock,
    RestSearchClient,
    WasmTimeout,
    HostPlaceholderProvider,
    HostPageContext,
>;

#[derive(Debug)]
struct Subscription {
    callback: Closure<dyn FnMut()>,
    unsubscribe: Option<js_sys::Function>,
}

/// The sharing banner page extension.
///
/// Create one per page with the host object, call `initialize` with the
/// extension properties, and `teardown` when the host disposes the
/// extension.
#[wasm_bindgen(js_name = SharingBanner)]
#[derive(Debug)]
pub struct WasmSharingBanner {
    host: JsHost,
    banner: Option<Rc<BrowserBanner>>,
    subscription: Option<Subscription>,
    torn_down: bool,
}

#[wasm_bindgen(js_class = SharingBanner)]
impl WasmSharingBanner {
    /// Create an extension bound to `host`.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(host: JsHost) -> Self {
        Self {
            host,
            banner: None,
            subscription: None,
            torn_down: false,
        }
    }

    /// Read the extension properties and decide whether the banner runs.
    ///
    /// Returns `true` if the banner is active and listening for
    /// navigations, `false` if it is suppressed for this page (excluded
    /// site, or an external user).
    ///
    /// # Errors
    ///
    /// Throws if the properties are not a valid configuration, if the host
    /// has no page context, or if called twice or after `teardown`.
    pub fn initialize(&mut self, properties: &JsValue) -> Result<bool, WasmInitError> {
        if self.torn_down {
            return Err(InitError::TornDown.into());
        }
        if self.banner.is_some() {
            return Err(InitError::AlreadyInitialized.into());
        }

        let config = BannerConfig::from_json(&properties_json(properties)?)?;
        let context = HostPageContext::new(self.host.clone());
        let banner = Rc::new(SharingBanner::new(
            config,
            WebSessionStorage,
            JsClock,
            RestSearchClient::new(context.clone()),
            WasmTimeout,
            HostPlaceholderProvider::new(self.host.clone()),
            context,
        ));

        let activation = banner.initialize()?;
        self.banner = Some(Rc::clone(&banner));
        if activation != Activation::Active {
            return Ok(false);
        }

        let weak = Rc::downgrade(&banner);
        let callback = Closure::<dyn FnMut()>::new(move || spawn_navigation(&weak));
        let unsubscribe = self.host.on_navigated(callback.as_ref().unchecked_ref());
        self.subscription = Some(Subscription {
            callback,
            unsubscribe,
        });

        // The host does not report the page it was loaded on.
        spawn_navigation(&Rc::downgrade(&banner));

        Ok(true)
    }

    /// Stop listening for navigations and remove the banner.
    pub fn teardown(&mut self) {
        if let Some(Subscription {
            callback,
            unsubscribe,
        }) = self.subscription.take()
        {
            match unsubscribe {
                Some(unsubscribe) => {
                    if let Err(e) = unsubscribe.call0(&JsValue::NULL) {
                        tracing::warn!(error = ?e, "navigation unsubscribe threw");
                    }
                    drop(callback);
                }
                // The host may still call it; it only holds a weak handle.
                None => callback.forget(),
            }
        }

        if let Some(banner) = self.banner.take() {
            banner.teardown();
        }
        self.torn_down = true;
    }
}

fn spawn_navigation(banner: &Weak<BrowserBanner>) {
    let Some(banner) = banner.upgrade() else {
        return;
    };
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = banner.navigate().await;
        tracing::debug!(?outcome, "navigation handled");
    });
}

/// The extension properties as JSON text.
///
/// Hosts pass either the raw JSON string or an already parsed object.
fn properties_json(properties: &JsValue) -> Result<String, WasmInitError> {
    if properties.is_undefined() || properties.is_null() {
        return Ok(String::new());
    }
    if let Some(text) = properties.as_string() {
        return Ok(text);
    }
    js_sys::JSON::stringify(properties)
        .map(String::from)
        .map_err(WasmInitError::Properties)
}
