//! Fakes for the platform capabilities.
//!
//! Every fake is cheap to clone and clones share state, so a test can keep
//! a handle to inspect or steer a fake after moving it into the code under
//! test.

use core::time::Duration;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use future_form::{FutureForm, Local, Sendable, future_form};
use futures_timer::Delay;
use thiserror::Error;

use crate::{
    banner::VisualState,
    context::{PageContext, PageContextSource},
    placeholder::{Placeholder, PlaceholderProvider, PlaceholderRegion},
    search::{SearchClient, SearchQuery, SearchResults},
    timestamp::{Clock, TimestampMillis},
};

// ==================== Clock ====================

/// A [`Clock`] that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `millis` since the epoch.
    #[must_use]
    pub fn new(millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Move the clock forward.
    #[allow(clippy::cast_possible_truncation)]
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimestampMillis {
        TimestampMillis::new(self.now.load(Ordering::SeqCst))
    }
}

// ==================== Search ====================

/// How [`MockSearchClient`] answers queries for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchResponse {
    /// Answer immediately with this many total rows.
    Rows(u64),

    /// Answer with this many total rows after a delay.
    Delayed(u64, Duration),

    /// Fail.
    Fail,

    /// Never answer.
    Hang,
}

impl SearchResponse {
    /// Answer immediately with `total_rows`.
    #[must_use]
    pub const fn rows(total_rows: u64) -> Self {
        Self::Rows(total_rows)
    }
}

/// Error returned by [`MockSearchClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("mock search failure")]
pub struct MockSearchError;

/// A [`SearchClient`] with canned answers per site id.
///
/// Sites without a canned answer have no matching rows.
#[derive(Debug, Clone, Default)]
pub struct MockSearchClient {
    responses: Arc<Mutex<HashMap<String, SearchResponse>>>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
    calls: Arc<AtomicUsize>,
}

impl MockSearchClient {
    /// Create a client with no canned answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `site_id` with `response` from now on.
    pub fn respond(&self, site_id: &str, response: SearchResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(site_id.to_owned(), response);
    }

    /// Number of queries received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query received, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, query: &SearchQuery) -> SearchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        let site_id = site_id_of(&query.query_template);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(site_id)
            .copied()
            .unwrap_or(SearchResponse::Rows(0))
    }
}

fn site_id_of(template: &str) -> &str {
    template
        .split_whitespace()
        .find_map(|term| term.strip_prefix("SiteId:"))
        .unwrap_or_default()
}

#[future_form(Sendable, Local)]
impl<K: FutureForm> SearchClient<K> for MockSearchClient {
    type Error = MockSearchError;

    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> K::Future<'a, Result<SearchResults, Self::Error>> {
        K::from_future(async move {
            match self.record(query) {
                SearchResponse::Rows(total_rows) => Ok(SearchResults { total_rows }),
                SearchResponse::Delayed(total_rows, delay) => {
                    Delay::new(delay).await;
                    Ok(SearchResults { total_rows })
                }
                SearchResponse::Fail => Err(MockSearchError),
                SearchResponse::Hang => futures::future::pending().await,
            }
        })
    }
}

// ==================== Page context ====================

/// A [`PageContextSource`] whose context is set by the test.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    current: Arc<Mutex<Option<PageContext>>>,
}

impl StaticContext {
    /// Create a source returning `context`.
    #[must_use]
    pub fn new(context: PageContext) -> Self {
        Self {
            current: Arc::new(Mutex::new(Some(context))),
        }
    }

    /// Create a source that has no context.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Replace the current context (simulates the user navigating).
    pub fn set(&self, context: PageContext) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(context);
    }
}

impl PageContextSource for StaticContext {
    fn current(&self) -> Option<PageContext> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ==================== Placeholders ====================

/// Something that happened to a [`RecordingPlaceholders`] region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderEvent {
    /// A region was handed out.
    Created(PlaceholderRegion),

    /// Markup was injected.
    Injected(String),

    /// A visual state was applied.
    Applied(VisualState),

    /// The region was released.
    Released,
}

/// A [`PlaceholderProvider`] that records everything done to its regions.
#[derive(Debug, Clone)]
pub struct RecordingPlaceholders {
    events: Arc<Mutex<Vec<PlaceholderEvent>>>,
    available: Arc<AtomicBool>,
}

impl Default for RecordingPlaceholders {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPlaceholders {
    /// Create a provider whose regions are available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Make `try_create` succeed or fail.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<PlaceholderEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of regions handed out.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.count(|e| matches!(e, PlaceholderEvent::Created(_)))
    }

    /// Number of markup injections.
    #[must_use]
    pub fn injected_count(&self) -> usize {
        self.count(|e| matches!(e, PlaceholderEvent::Injected(_)))
    }

    /// Every visual state applied, oldest first.
    #[must_use]
    pub fn visual_history(&self) -> Vec<VisualState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PlaceholderEvent::Applied(visual) => Some(visual),
                _ => None,
            })
            .collect()
    }

    /// The most recently applied visual state.
    #[must_use]
    pub fn current_visual(&self) -> Option<VisualState> {
        self.visual_history().pop()
    }

    fn count(&self, pred: impl Fn(&PlaceholderEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| pred(e))
            .count()
    }

    fn push(&self, event: PlaceholderEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl PlaceholderProvider for RecordingPlaceholders {
    type Placeholder = RecordingPlaceholder;

    fn try_create(&self, region: PlaceholderRegion) -> Option<Self::Placeholder> {
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        self.push(PlaceholderEvent::Created(region));
        Some(RecordingPlaceholder {
            recorder: self.clone(),
        })
    }
}

/// A region handed out by [`RecordingPlaceholders`].
#[derive(Debug)]
pub struct RecordingPlaceholder {
    recorder: RecordingPlaceholders,
}

impl Placeholder for RecordingPlaceholder {
    fn inject(&mut self, markup: &str) {
        self.recorder
            .push(PlaceholderEvent::Injected(markup.to_owned()));
    }

    fn apply(&mut self, visual: &VisualState) {
        self.recorder.push(PlaceholderEvent::Applied(visual.clone()));
    }

    fn release(self) {
        self.recorder.push(PlaceholderEvent::Released);
    }
}
