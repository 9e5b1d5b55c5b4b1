//! Search capability consumed by the resolver.

use future_form::FutureForm;

/// The built-in "Local SharePoint Results" result source.
pub const LOCAL_SHAREPOINT_RESULTS: &str = "8413cd39-2156-4e00-b54d-11efd9abdb89";

/// Client type tag attached to every query, keeping these presence checks
/// apart from user searches in search analytics.
pub const CLIENT_TYPE: &str = "SharingBanner";

/// A structured keyword query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    /// Free-text part, substituted for `{searchterms}` in the template.
    pub query_text: String,

    /// KQL template wrapping the free text with filters.
    pub query_template: String,

    /// Managed properties to return per row.
    pub selected_properties: Vec<String>,

    /// Client type tag.
    pub client_type: String,

    /// Result source id.
    pub source_id: String,

    /// Maximum number of rows to return.
    pub row_limit: u32,

    /// Whether query rules may rewrite the query.
    pub enable_query_rules: bool,
}

impl SearchQuery {
    /// Parameters for the `_api/search/query` REST endpoint.
    ///
    /// String values are wrapped in single quotes with embedded quotes
    /// doubled, as the endpoint expects. Values are not URL-encoded.
    #[must_use]
    pub fn rest_parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("querytext", quote(&self.query_text)),
            ("querytemplate", quote(&self.query_template)),
            (
                "selectproperties",
                quote(&self.selected_properties.join(",")),
            ),
            ("clienttype", quote(&self.client_type)),
            ("sourceid", quote(&self.source_id)),
            ("rowlimit", self.row_limit.to_string()),
            ("enablequeryrules", self.enable_query_rules.to_string()),
        ]
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The part of a search result set the resolver looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SearchResults {
    /// Total number of rows matching the query, independent of the row limit.
    pub total_rows: u64,
}

/// Executes [`SearchQuery`]s against a search index.
pub trait SearchClient<K: FutureForm + ?Sized> {
    /// The error type for failed queries.
    type Error: core::error::Error;

    /// Run `query`.
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> K::Future<'a, Result<SearchResults, Self::Error>>;
}
