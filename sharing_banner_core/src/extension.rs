//! The banner extension: gating, navigation handling and teardown.
//!
//! The host calls [`SharingBanner::initialize`] once. If that returns
//! [`Activation::Active`] the host subscribes to its navigation event and
//! calls [`SharingBanner::navigate`] on each one; otherwise it never
//! subscribes. [`SharingBanner::teardown`] ends the lifecycle.
//!
//! Navigations may overlap (a slow search for one page still in flight
//! when the user moves on). Each navigation takes a sequence number and
//! its result is dropped if a newer navigation started in the meantime.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use future_form::FutureForm;
use thiserror::Error;

use crate::{
    banner::{BannerPresenter, BannerState, Transition},
    config::BannerConfig,
    context::PageContextSource,
    markup,
    placeholder::PlaceholderProvider,
    resolver::SharingStatusResolver,
    scope::ScopeKey,
    search::SearchClient,
    status::{CachePolicy, CachedStatus},
    storage::SessionStorage,
    timer::{Tick, Timeout},
    timestamp::Clock,
};

/// Result of [`SharingBanner::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Navigation events should be delivered.
    Active,

    /// The banner stays inert for this session.
    Suppressed(SuppressReason),
}

/// Why the banner was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressReason {
    /// The current site is on the exclusion list.
    ExcludedSite,

    /// The user is external or anonymous and the banner is configured to
    /// be hidden from them.
    ExternalUser,
}

/// Problem initializing the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InitError {
    /// `initialize` was already called.
    #[error("sharing banner is already initialized")]
    AlreadyInitialized,

    /// `teardown` was already called.
    #[error("sharing banner has been torn down")]
    TornDown,

    /// The host did not provide a page context.
    #[error("page context unavailable")]
    ContextUnavailable,
}

/// What a navigation led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationOutcome {
    /// The extension is not active; nothing was resolved or rendered.
    Inactive,

    /// The host did not provide a page context; nothing changed.
    NoContext,

    /// A newer navigation superseded this one; its result was discarded.
    Stale,

    /// The status was applied to the banner.
    Applied(Transition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Lifecycle {
    Uninitialized,
    Active,
    Suppressed,
    TornDown,
}

struct Shared<P: PlaceholderProvider> {
    lifecycle: Lifecycle,
    presenter: BannerPresenter<P>,
}

/// The sharing banner extension.
///
/// Generic over the future form `K` and every platform capability:
/// session storage `S`, clock `C`, search client `Q`, timer `O`,
/// placeholder provider `P` and page context source `X`.
pub struct SharingBanner<K: FutureForm, S, C, Q, O, P: PlaceholderProvider, X> {
    config: BannerConfig,
    status: CachedStatus<K, S, C, Q, O>,
    timer: O,
    context: X,
    shared: Mutex<Shared<P>>,
    sequence: AtomicU64,
}

impl<K, S, C, Q, O, P, X> SharingBanner<K, S, C, Q, O, P, X>
where
    K: FutureForm,
    S: SessionStorage,
    C: Clock,
    Q: SearchClient<K>,
    O: Timeout<K> + Tick<K>,
    P: PlaceholderProvider,
    X: PageContextSource,
{
    /// Assemble the extension from its configuration and capabilities.
    #[must_use]
    pub fn new(
        config: BannerConfig,
        storage: S,
        clock: C,
        search: Q,
        timer: O,
        placeholders: P,
        context: X,
    ) -> Self {
        let resolver = SharingStatusResolver::new(search, timer.clone(), config.search_deadline());
        let status = CachedStatus::new(resolver, storage, clock, CachePolicy::from_config(&config));
        let presenter = BannerPresenter::new(placeholders, config.banner_height.clone());

        Self {
            config,
            status,
            timer,
            context,
            shared: Mutex::new(Shared {
                lifecycle: Lifecycle::Uninitialized,
                presenter,
            }),
            sequence: AtomicU64::new(0),
        }
    }

    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &BannerConfig {
        &self.config
    }

    /// The cached status source.
    #[must_use]
    pub const fn status(&self) -> &CachedStatus<K, S, C, Q, O> {
        &self.status
    }

    /// Current banner state.
    #[must_use]
    pub fn banner_state(&self) -> BannerState {
        self.lock().presenter.state()
    }

    /// Decide whether the banner runs for this session.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if called twice, after teardown, or if the
    /// host has no page context.
    pub fn initialize(&self) -> Result<Activation, InitError> {
        let mut shared = self.lock();
        match shared.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Active | Lifecycle::Suppressed => return Err(InitError::AlreadyInitialized),
            Lifecycle::TornDown => return Err(InitError::TornDown),
        }

        let context = self.context.current().ok_or(InitError::ContextUnavailable)?;

        let activation = if self.config.is_excluded(&context.site_url) {
            Activation::Suppressed(SuppressReason::ExcludedSite)
        } else if self.config.hidden_for_external_users && context.is_external_or_anonymous() {
            Activation::Suppressed(SuppressReason::ExternalUser)
        } else {
            Activation::Active
        };

        shared.lifecycle = match activation {
            Activation::Active => {
                tracing::info!(
                    site_url = %context.site_url,
                    scope = %self.config.scope,
                    "sharing banner active"
                );
                Lifecycle::Active
            }
            Activation::Suppressed(reason) => {
                tracing::info!(site_url = %context.site_url, ?reason, "sharing banner suppressed");
                Lifecycle::Suppressed
            }
        };

        Ok(activation)
    }

    /// Handle a navigation: resolve the current scope's status and show or
    /// hide the banner accordingly.
    pub async fn navigate(&self) -> NavigationOutcome {
        if !self.is_active() {
            return NavigationOutcome::Inactive;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel) + 1;

        let Some(context) = self.context.current() else {
            tracing::warn!(sequence, "no page context on navigation");
            return NavigationOutcome::NoContext;
        };
        let key = ScopeKey::for_context(self.config.scope, &context);
        tracing::debug!(sequence, %key, "navigation");

        let shared = self.status.get_status(&key).await;

        let (transition, generation) = {
            let mut guard = self.lock();
            if guard.lifecycle != Lifecycle::Active {
                return NavigationOutcome::Inactive;
            }
            if !self.is_current(sequence) {
                tracing::debug!(sequence, %key, "discarding stale sharing status");
                return NavigationOutcome::Stale;
            }
            let transition = guard
                .presenter
                .apply(shared, || markup::render(&self.config, &context));
            (transition, guard.presenter.generation())
        };

        if transition == Transition::Shown {
            self.timer.next_tick().await;
            // No-op if a later navigation hid or re-showed the banner meanwhile.
            self.lock().presenter.expand(generation);
        }

        NavigationOutcome::Applied(transition)
    }

    /// End the lifecycle: stop reacting to navigations and release the
    /// placeholder.
    pub fn teardown(&self) {
        let mut shared = self.lock();
        shared.lifecycle = Lifecycle::TornDown;
        shared.presenter.teardown();
        tracing::debug!("sharing banner torn down");
    }

    fn is_active(&self) -> bool {
        self.lock().lifecycle == Lifecycle::Active
    }

    fn is_current(&self, sequence: u64) -> bool {
        self.sequence.load(Ordering::Acquire) == sequence
    }

    fn lock(&self) -> MutexGuard<'_, Shared<P>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: FutureForm, S, C, Q, O, P: PlaceholderProvider, X> core::fmt::Debug
    for SharingBanner<K, S, C, Q, O, P, X>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharingBanner")
            .field("config", &self.config)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
