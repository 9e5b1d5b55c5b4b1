//! The host page, as seen through the extension's JavaScript shim.

use sharing_banner_core::{
    banner::VisualState,
    context::{PageContext, PageContextSource},
    markup::{BANNER_CLASS, EXPANDED_CLASS},
    placeholder::{Placeholder, PlaceholderProvider, PlaceholderRegion},
};
use wasm_bindgen::{JsCast, prelude::*};

#[wasm_bindgen(typescript_custom_section)]
const TS: &str = r#"
export interface SharingBannerPageContext {
    siteId: string;
    webId: string;
    siteUrl: string;
    webUrl: string;
    isExternalUser?: boolean;
    isAnonymousGuestUser?: boolean;
}

export interface SharingBannerPlaceholder {
    readonly domElement: HTMLElement;
    dispose(): void;
}

export interface SharingBannerHost {
    pageContext(): SharingBannerPageContext | undefined;
    tryCreatePlaceholder(name: "Top"): SharingBannerPlaceholder | undefined;
    onNavigated(callback: () => void): () => void;
}
"#;

#[wasm_bindgen]
extern "C" {
    /// A duck-typed host interface.
    #[wasm_bindgen(js_name = SharingBannerHost, typescript_type = "SharingBannerHost")]
    #[derive(Debug, Clone)]
    pub type JsHost;

    #[wasm_bindgen(method, js_name = pageContext)]
    fn js_page_context(this: &JsHost) -> JsValue;

    #[wasm_bindgen(method, js_name = tryCreatePlaceholder)]
    fn js_try_create_placeholder(this: &JsHost, name: &str) -> JsValue;

    #[wasm_bindgen(method, js_name = onNavigated)]
    fn js_on_navigated(this: &JsHost, callback: &js_sys::Function) -> JsValue;

    /// Placeholder content handed out by the host.
    #[wasm_bindgen(typescript_type = "SharingBannerPlaceholder")]
    #[derive(Debug, Clone)]
    pub type JsPlaceholder;

    #[wasm_bindgen(method, getter, js_name = domElement)]
    fn js_dom_element(this: &JsPlaceholder) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, js_name = dispose)]
    fn js_dispose(this: &JsPlaceholder);
}

impl JsHost {
    /// Register `callback` for in-page navigations.
    ///
    /// Returns the host's unsubscribe function, if it gave one back.
    pub fn on_navigated(&self, callback: &js_sys::Function) -> Option<js_sys::Function> {
        self.js_on_navigated(callback).dyn_into().ok()
    }
}

/// Reads the [`PageContext`] from the host on every call.
#[derive(Debug, Clone)]
pub struct HostPageContext {
    host: JsHost,
}

impl HostPageContext {
    /// Wrap `host`.
    #[must_use]
    pub const fn new(host: JsHost) -> Self {
        Self { host }
    }
}

impl PageContextSource for HostPageContext {
    fn current(&self) -> Option<PageContext> {
        let raw = self.host.js_page_context();
        if raw.is_undefined() || raw.is_null() {
            return None;
        }

        let json: String = js_sys::JSON::stringify(&raw).ok()?.into();
        match serde_json::from_str(&json) {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::warn!(error = %e, "malformed page context from host");
                None
            }
        }
    }
}

/// Hands out host placeholder regions.
#[derive(Debug, Clone)]
pub struct HostPlaceholderProvider {
    host: JsHost,
}

impl HostPlaceholderProvider {
    /// Wrap `host`.
    #[must_use]
    pub const fn new(host: JsHost) -> Self {
        Self { host }
    }
}

impl PlaceholderProvider for HostPlaceholderProvider {
    type Placeholder = HostPlaceholder;

    fn try_create(&self, region: PlaceholderRegion) -> Option<Self::Placeholder> {
        let raw = self.host.js_try_create_placeholder(region.name());
        if raw.is_undefined() || raw.is_null() {
            return None;
        }
        Some(HostPlaceholder {
            content: raw.unchecked_into(),
        })
    }
}

/// A placeholder region acquired from the host.
#[derive(Debug)]
pub struct HostPlaceholder {
    content: JsPlaceholder,
}

impl HostPlaceholder {
    fn banner_root(&self) -> Option<web_sys::HtmlElement> {
        self.content
            .js_dom_element()
            .query_selector(&format!(".{BANNER_CLASS}"))
            .ok()
            .flatten()?
            .dyn_into()
            .ok()
    }
}

/// What the banner root element must look like for a [`VisualState`].
///
/// Both fields are always written, so applying a patch leaves nothing
/// behind from the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ElementPatch<'a> {
    /// Whether the expanded class is present.
    expanded_class: bool,

    /// Inline `height`; `None` removes it.
    height: Option<&'a str>,
}

impl<'a> ElementPatch<'a> {
    fn for_visual(visual: &'a VisualState) -> Self {
        match visual {
            VisualState::Collapsed => Self {
                expanded_class: false,
                height: None,
            },
            VisualState::Expanded { height } => Self {
                expanded_class: true,
                height: Some(height.as_str()),
            },
        }
    }
}

impl Placeholder for HostPlaceholder {
    fn inject(&mut self, markup: &str) {
        self.content.js_dom_element().set_inner_html(markup);
    }

    fn apply(&mut self, visual: &VisualState) {
        let Some(root) = self.banner_root() else {
            tracing::warn!("banner markup missing from placeholder");
            return;
        };

        let patch = ElementPatch::for_visual(visual);
        let classes = root.class_list();
        let style = root.style();
        let class_result = if patch.expanded_class {
            classes.add_1(EXPANDED_CLASS)
        } else {
            classes.remove_1(EXPANDED_CLASS)
        };
        let result = class_result.and_then(|()| match patch.height {
            Some(height) => style.set_property("height", height),
            None => style.remove_property("height").map(drop),
        });

        if let Err(e) = result {
            tracing::warn!(?visual, error = ?e, "could not update banner element");
        }
    }

    fn release(self) {
        self.content.js_dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The parts of the banner root element a patch touches.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Element {
        expanded_class: bool,
        height: Option<String>,
    }

    impl Element {
        fn apply(&mut self, visual: &VisualState) {
            let patch = ElementPatch::for_visual(visual);
            self.expanded_class = patch.expanded_class;
            self.height = patch.height.map(str::to_owned);
        }
    }

    fn expanded() -> VisualState {
        VisualState::Expanded {
            height: "40px".into(),
        }
    }

    #[test]
    fn test_collapsed_clears_class_and_height() {
        assert_eq!(
            ElementPatch::for_visual(&VisualState::Collapsed),
            ElementPatch {
                expanded_class: false,
                height: None,
            }
        );
    }

    #[test]
    fn test_expanded_sets_class_and_height() {
        let visual = expanded();
        assert_eq!(
            ElementPatch::for_visual(&visual),
            ElementPatch {
                expanded_class: true,
                height: Some("40px"),
            }
        );
    }

    #[test]
    fn test_show_hide_show_leaves_no_residue() {
        let mut element = Element::default();

        element.apply(&VisualState::Collapsed);
        element.apply(&expanded());
        element.apply(&VisualState::Collapsed);
        assert_eq!(element, Element::default());

        element.apply(&VisualState::Collapsed);
        element.apply(&expanded());
        assert_eq!(
            element,
            Element {
                expanded_class: true,
                height: Some("40px".into()),
            }
        );
    }
}
