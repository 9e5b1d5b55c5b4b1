//! Extension properties.
//!
//! The host passes a JSON object of overrides. Missing keys take the
//! defaults below; unknown keys are ignored. There is no further schema
//! validation beyond what deserialization enforces (types, and `scope`
//! being `site` or `web`).

use core::time::Duration;

use serde::{Deserialize, Serialize, de::Unexpected};
use serde_json::Value;
use thiserror::Error;

use crate::scope::Scope;

/// Default banner message. `{siteurl}` and `{weburl}` are substituted at
/// render time.
pub const DEFAULT_MESSAGE: &str =
    "This site contains content that is shared with people outside your organization.";

/// Default cache lifetime in minutes.
pub const DEFAULT_CACHE_LIFETIME_MINUTES: u32 = 30;

/// Default deadline for the search query in milliseconds.
pub const DEFAULT_SEARCH_TIMEOUT_MS: u32 = 10_000;

/// Resolved configuration of the banner extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerConfig {
    /// Banner text; may contain `{siteurl}` and `{weburl}` tokens and markup.
    pub message: String,

    /// CSS color of the banner text.
    pub text_color: String,

    /// CSS background color of the banner.
    pub background_color: String,

    /// CSS font size of the banner text.
    pub text_font_size: String,

    /// CSS height of the expanded banner.
    pub banner_height: String,

    /// Cache resolved statuses in session storage.
    pub enable_cache: bool,

    /// Cache lifetime in minutes; `0` keeps entries for the whole session.
    pub cache_lifetime: u32,

    /// Whether to check the whole site collection or only the current web.
    pub scope: Scope,

    /// Never show the banner to external or anonymous users.
    pub hidden_for_external_users: bool,

    /// Site collection URLs on which the extension stays inert.
    pub site_exclusion_list: Vec<String>,

    /// Deadline for the search query in milliseconds.
    pub search_timeout: u32,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            message: DEFAULT_MESSAGE.to_owned(),
            text_color: "#333333".to_owned(),
            background_color: "#FFF4CE".to_owned(),
            text_font_size: "14px".to_owned(),
            banner_height: "40px".to_owned(),
            enable_cache: true,
            cache_lifetime: DEFAULT_CACHE_LIFETIME_MINUTES,
            scope: Scope::Site,
            hidden_for_external_users: true,
            site_exclusion_list: Vec::new(),
            search_timeout: DEFAULT_SEARCH_TIMEOUT_MS,
        }
    }
}

impl BannerConfig {
    /// Merge a JSON object of overrides onto the defaults.
    ///
    /// Blank input (or `null`) yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the input is not a JSON object of the
    /// expected shape.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str::<Value>(json)? {
            Value::Null => Ok(Self::default()),
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            other => Err(ConfigError(serde::de::Error::invalid_type(
                unexpected(&other),
                &"a JSON object of banner properties",
            ))),
        }
    }

    /// Time-to-live for cached statuses; zero means no expiry.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_lifetime) * 60)
    }

    /// Deadline for the search query.
    #[must_use]
    pub fn search_deadline(&self) -> Duration {
        Duration::from_millis(u64::from(self.search_timeout))
    }

    /// Whether `site_url` is on the exclusion list.
    ///
    /// Comparison ignores ASCII case and trailing slashes.
    #[must_use]
    pub fn is_excluded(&self, site_url: &str) -> bool {
        let site_url = normalize_url(site_url);
        self.site_exclusion_list
            .iter()
            .any(|excluded| normalize_url(excluded).eq_ignore_ascii_case(site_url))
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

fn normalize_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

/// Problem parsing the extension properties.
#[derive(Debug, Error)]
#[error("invalid banner properties: {0}")]
pub struct ConfigError(#[from] serde_json::Error);
