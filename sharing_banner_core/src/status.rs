//! Cached sharing status.
//!
//! Composes the [`cache`](crate::cache) with the
//! [`SharingStatusResolver`]: a hit answers without touching the network,
//! a miss resolves and writes back. Failures answer `false` and are never
//! cached, so the next navigation retries.

use core::time::Duration;

use future_form::FutureForm;

use crate::{
    cache,
    config::BannerConfig,
    resolver::SharingStatusResolver,
    scope::ScopeKey,
    search::SearchClient,
    storage::SessionStorage,
    timer::Timeout,
    timestamp::Clock,
};

/// Session storage key of the status cache's namespace record.
pub const CACHE_NAMESPACE: &str = "SharingBanner.status";

/// How (and whether) resolved statuses are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachePolicy {
    /// Read and write the cache at all.
    pub enabled: bool,

    /// Lifetime of an entry; zero keeps it for the whole session.
    pub ttl: Duration,
}

impl CachePolicy {
    /// The policy described by `config`.
    #[must_use]
    pub fn from_config(config: &BannerConfig) -> Self {
        Self {
            enabled: config.enable_cache,
            ttl: config.cache_ttl(),
        }
    }
}

/// Sharing status with a session cache in front of the resolver.
pub struct CachedStatus<K: FutureForm, S, C, Q, O> {
    resolver: SharingStatusResolver<K, Q, O>,
    storage: S,
    clock: C,
    policy: CachePolicy,
}

impl<K, S, C, Q, O> CachedStatus<K, S, C, Q, O>
where
    K: FutureForm,
    S: SessionStorage,
    C: Clock,
    Q: SearchClient<K>,
    O: Timeout<K>,
{
    /// Create a new cached status source.
    #[must_use]
    pub const fn new(
        resolver: SharingStatusResolver<K, Q, O>,
        storage: S,
        clock: C,
        policy: CachePolicy,
    ) -> Self {
        Self {
            resolver,
            storage,
            clock,
            policy,
        }
    }

    /// The resolver behind the cache.
    #[must_use]
    pub const fn resolver(&self) -> &SharingStatusResolver<K, Q, O> {
        &self.resolver
    }

    /// The cache policy in effect.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Whether `key` holds content viewable by external or anonymous users.
    ///
    /// Never fails: a failed resolution answers `false` and leaves the
    /// cache untouched.
    pub async fn get_status(&self, key: &ScopeKey) -> bool {
        let sub_key = key.cache_key();

        if self.policy.enabled
            && let Some(shared) =
                cache::get::<_, bool>(&self.storage, self.clock.now(), CACHE_NAMESPACE, &sub_key)
        {
            return shared;
        }

        let shared = match self.resolver.resolve(key).await {
            Ok(shared) => shared,
            Err(e) => {
                tracing::error!(
                    %key,
                    error = %e,
                    "could not resolve sharing status, assuming not shared"
                );
                return false;
            }
        };

        if self.policy.enabled {
            cache::set(
                &self.storage,
                self.clock.now(),
                CACHE_NAMESPACE,
                &sub_key,
                shared,
                Some(self.policy.ttl),
            );
        }

        shared
    }
}

impl<K: FutureForm, S, C, Q, O> core::fmt::Debug for CachedStatus<K, S, C, Q, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CachedStatus")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
