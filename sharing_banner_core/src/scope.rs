//! Scope of the sharing check and the cache key derived from it.

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::PageContext;

/// Granularity of the sharing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    /// The whole site collection.
    #[default]
    Site,

    /// Only the current web within the site collection.
    Web,
}

impl Scope {
    /// The configuration spelling of this scope.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::Site => "site",
            Scope::Web => "web",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site" => Ok(Scope::Site),
            "web" => Ok(Scope::Web),
            other => Err(UnknownScope(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = UnknownScope;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.as_str().to_owned()
    }
}

/// A scope value other than `site` or `web`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("unknown scope `{0}`, expected `site` or `web`")]
pub struct UnknownScope(pub String);

/// Identifies one unit of querying and caching.
///
/// `web_id` is present iff the key was built for [`Scope::Web`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey {
    site_id: String,
    web_id: Option<String>,
}

impl ScopeKey {
    /// Key for a whole site collection.
    #[must_use]
    pub fn site(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            web_id: None,
        }
    }

    /// Key for a single web of a site collection.
    #[must_use]
    pub fn web(site_id: impl Into<String>, web_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            web_id: Some(web_id.into()),
        }
    }

    /// Key for the page in `context` at the given `scope`.
    #[must_use]
    pub fn for_context(scope: Scope, context: &PageContext) -> Self {
        match scope {
            Scope::Site => Self::site(context.site_id.clone()),
            Scope::Web => Self::web(context.site_id.clone(), context.web_id.clone()),
        }
    }

    /// The site collection id.
    #[must_use]
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// The web id, for web-scoped keys.
    #[must_use]
    pub fn web_id(&self) -> Option<&str> {
        self.web_id.as_deref()
    }

    /// The scope this key was built for.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        if self.web_id.is_some() {
            Scope::Web
        } else {
            Scope::Site
        }
    }

    /// Sub key within the cache namespace: the site id, followed directly
    /// by the web id for web-scoped keys.
    ///
    /// Site ids are fixed-length GUIDs, so two different sites can never
    /// produce the same key even when they share a web id.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match &self.web_id {
            None => self.site_id.clone(),
            Some(web_id) => format!("{}{web_id}", self.site_id),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.web_id {
            None => write!(f, "site:{}", self.site_id),
            Some(web_id) => write!(f, "web:{}/{web_id}", self.site_id),
        }
    }
}
