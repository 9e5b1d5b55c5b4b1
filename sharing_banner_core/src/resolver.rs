//! Sharing-status resolution against the search index.
//!
//! The check is a presence test: one query, one row at most, and the answer
//! is whether the total row count is non-zero. All of the precision lives
//! in the query template.

use core::{marker::PhantomData, time::Duration};

use future_form::FutureForm;
use thiserror::Error;

use crate::{
    scope::ScopeKey,
    search::{CLIENT_TYPE, LOCAL_SHAREPOINT_RESULTS, SearchClient, SearchQuery},
    timer::{TimedOut, Timeout},
};

/// Content that counts as shared externally or anonymously.
pub const EXPOSURE_FILTER: &str = "(ViewableByExternalUsers:true OR ViewableByAnonymousUsers:true)";

/// Restricts matches to documents and list items, dropping the site, web
/// and list entities themselves, user-information rows, site pages and
/// OneNote pages. Those carry the external-sharing flags of their
/// container and would otherwise produce false positives.
pub const CONTENT_FILTER: &str = "(IsDocument:true OR ContentTypeId:0x0100*) \
    -ContentClass:STS_Site -ContentClass:STS_Web -ContentClass:STS_List_* \
    -ContentClass:STS_ListItem_UserInformation -ContentClass:STS_ListItem_WebPageLibrary \
    -FileExtension:one -FileExtension:onetoc2";

/// Build the presence query for `key`.
#[must_use]
pub fn build_query(key: &ScopeKey) -> SearchQuery {
    let mut template = format!("{{searchterms}} SiteId:{}", key.site_id());
    if let Some(web_id) = key.web_id() {
        template.push_str(" WebId:");
        template.push_str(web_id);
    }
    template.push(' ');
    template.push_str(EXPOSURE_FILTER);
    template.push(' ');
    template.push_str(CONTENT_FILTER);

    SearchQuery {
        query_text: "*".to_owned(),
        query_template: template,
        selected_properties: vec!["SiteId".to_owned(), "WebId".to_owned()],
        client_type: CLIENT_TYPE.to_owned(),
        source_id: LOCAL_SHAREPOINT_RESULTS.to_owned(),
        row_limit: 1,
        enable_query_rules: false,
    }
}

/// Problem resolving the sharing status.
#[derive(Debug, Error)]
pub enum ResolveError<E: core::error::Error> {
    /// The search capability failed.
    #[error("search query failed: {0}")]
    Search(#[source] E),

    /// The search capability did not answer in time.
    #[error("search query timed out after {0:?}")]
    TimedOut(Duration),
}

/// Resolves the sharing status of a scope through a [`SearchClient`].
pub struct SharingStatusResolver<K: FutureForm, Q, O> {
    client: Q,
    timer: O,
    deadline: Duration,
    _form: PhantomData<fn() -> K>,
}

impl<K: FutureForm, Q: core::fmt::Debug, O: core::fmt::Debug> core::fmt::Debug
    for SharingStatusResolver<K, Q, O>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharingStatusResolver")
            .field("client", &self.client)
            .field("timer", &self.timer)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl<K: FutureForm, Q: SearchClient<K>, O: Timeout<K>> SharingStatusResolver<K, Q, O> {
    /// Create a resolver whose queries are abandoned after `deadline`.
    #[must_use]
    pub const fn new(client: Q, timer: O, deadline: Duration) -> Self {
        Self {
            client,
            timer,
            deadline,
            _form: PhantomData,
        }
    }

    /// The underlying search client.
    #[must_use]
    pub const fn client(&self) -> &Q {
        &self.client
    }

    /// Whether `key` holds content viewable by external or anonymous users.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the query fails or times out.
    pub async fn resolve(&self, key: &ScopeKey) -> Result<bool, ResolveError<Q::Error>> {
        let query = build_query(key);
        tracing::debug!(%key, "querying search for externally shared content");

        let results = self
            .timer
            .timeout(self.deadline, self.client.search(&query))
            .await
            .map_err(|TimedOut| ResolveError::TimedOut(self.deadline))?
            .map_err(ResolveError::Search)?;

        let shared = results.total_rows > 0;
        tracing::debug!(%key, total_rows = results.total_rows, shared, "sharing status resolved");
        Ok(shared)
    }

    /// Like [`resolve`](Self::resolve), but any failure reads as `false`.
    pub async fn fetch(&self, key: &ScopeKey) -> bool {
        match self.resolve(key).await {
            Ok(shared) => shared,
            Err(e) => {
                tracing::error!(%key, error = %e, "sharing status lookup failed");
                false
            }
        }
    }
}
