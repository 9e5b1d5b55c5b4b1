//! The page the user is currently looking at.

use serde::{Deserialize, Serialize};

/// Snapshot of the host page's site, web and user.
///
/// Read fresh on every navigation since in-page navigation can move the
/// user to a different site without reloading the extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    /// Id (GUID) of the current site collection.
    pub site_id: String,

    /// Id (GUID) of the current web.
    pub web_id: String,

    /// Absolute URL of the current site collection.
    pub site_url: String,

    /// Absolute URL of the current web.
    pub web_url: String,

    /// The user is a guest from another tenant.
    #[serde(default)]
    pub is_external_user: bool,

    /// The user is browsing through an anonymous sharing link.
    #[serde(default)]
    pub is_anonymous_guest_user: bool,
}

impl PageContext {
    /// Whether the current user is external or anonymous.
    #[must_use]
    pub const fn is_external_or_anonymous(&self) -> bool {
        self.is_external_user || self.is_anonymous_guest_user
    }
}

/// Synchronous access to the current [`PageContext`].
pub trait PageContextSource {
    /// The current page context, or `None` if the host cannot provide one.
    fn current(&self) -> Option<PageContext>;
}

impl<T: PageContextSource + ?Sized> PageContextSource for &T {
    fn current(&self) -> Option<PageContext> {
        (**self).current()
    }
}
