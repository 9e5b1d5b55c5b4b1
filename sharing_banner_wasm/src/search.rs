//! SharePoint search over the `_api/search/query` REST endpoint.

use future_form::Local;
use futures::{FutureExt, future::LocalBoxFuture};
use serde::Deserialize;
use sharing_banner_core::{
    context::PageContextSource,
    search::{SearchClient, SearchQuery, SearchResults},
};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

use crate::host::HostPageContext;

/// A `fetch()`-backed [`SearchClient<Local>`].
///
/// Queries the search endpoint of the web the user is currently on, with
/// the user's own (same-origin) credentials.
#[derive(Debug, Clone)]
pub struct RestSearchClient {
    context: HostPageContext,
}

impl RestSearchClient {
    /// Create a client that resolves the web URL through `context`.
    #[must_use]
    pub const fn new(context: HostPageContext) -> Self {
        Self { context }
    }
}

impl SearchClient<Local> for RestSearchClient {
    type Error = RestSearchError;

    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> LocalBoxFuture<'a, Result<SearchResults, Self::Error>> {
        async move {
            let web_url = self
                .context
                .current()
                .ok_or(RestSearchError::NoContext)?
                .web_url;
            let url = query_url(&web_url, query);
            tracing::debug!(%url, "search request");

            let opts = web_sys::RequestInit::new();
            opts.set_method("GET");
            opts.set_mode(web_sys::RequestMode::SameOrigin);
            opts.set_credentials(web_sys::RequestCredentials::SameOrigin);

            let headers = web_sys::Headers::new().map_err(RestSearchError::Js)?;
            headers
                .set("Accept", "application/json;odata=nometadata")
                .map_err(RestSearchError::Js)?;
            opts.set_headers(&headers);

            let request = web_sys::Request::new_with_str_and_init(&url, &opts)
                .map_err(RestSearchError::Js)?;

            let response: web_sys::Response =
                wasm_bindgen_futures::JsFuture::from(fetch_global(&request)?)
                    .await
                    .map_err(RestSearchError::Js)?
                    .dyn_into()
                    .map_err(RestSearchError::Js)?;

            if !response.ok() {
                return Err(RestSearchError::Status(response.status()));
            }

            let body = wasm_bindgen_futures::JsFuture::from(
                response.text().map_err(RestSearchError::Js)?,
            )
            .await
            .map_err(RestSearchError::Js)?
            .as_string()
            .unwrap_or_default();

            Ok(SearchResults {
                total_rows: parse_total_rows(&body)?,
            })
        }
        .boxed_local()
    }
}

/// Problem running a search query.
#[derive(Debug, Error)]
pub enum RestSearchError {
    /// The host had no page context, so there is no web to query.
    #[error("no page context to derive the search endpoint from")]
    NoContext,

    /// A browser API threw or rejected.
    #[error("fetch error: {0:?}")]
    Js(JsValue),

    /// The endpoint answered with a non-success status.
    #[error("search endpoint returned HTTP {0}")]
    Status(u16),

    /// The response body did not have the expected shape.
    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryResponse {
    primary_query_result: PrimaryQueryResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PrimaryQueryResult {
    relevant_results: RelevantResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelevantResults {
    total_rows: u64,
}

/// Pull `PrimaryQueryResult.RelevantResults.TotalRows` out of a
/// `odata=nometadata` response body.
fn parse_total_rows(body: &str) -> Result<u64, serde_json::Error> {
    let response: QueryResponse = serde_json::from_str(body)?;
    Ok(response.primary_query_result.relevant_results.total_rows)
}

fn query_url(web_url: &str, query: &SearchQuery) -> String {
    let params = query
        .rest_parameters()
        .into_iter()
        .map(|(name, value)| {
            let value = String::from(js_sys::encode_uri_component(&value));
            format!("{name}={value}")
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}/_api/search/query?{params}", web_url.trim_end_matches('/'))
}

/// Call `fetch()` on the appropriate global scope (`Window` or `WorkerGlobalScope`).
fn fetch_global(request: &web_sys::Request) -> Result<js_sys::Promise, RestSearchError> {
    let global: js_sys::Object = js_sys::global().unchecked_into();

    if let Ok(window) = global.clone().dyn_into::<web_sys::Window>() {
        return Ok(window.fetch_with_request(request));
    }

    if let Ok(worker) = global.dyn_into::<web_sys::WorkerGlobalScope>() {
        return Ok(worker.fetch_with_request(request));
    }

    Err(RestSearchError::Js(JsValue::from_str(
        "no global fetch available (not Window or WorkerGlobalScope)",
    )))
}
