//! # Sharing Banner
//!
//! Decides whether the SharePoint site (or web) a user is looking at holds
//! content that external or anonymous users can see, and drives a banner
//! that says so.
//!
//! The pipeline on every navigation:
//!
//! ```text
//! navigate ─▶ ScopeKey ─▶ cache ─(miss)─▶ search query ─▶ cache store
//!                           │                                  │
//!                           └──────────────▶ bool ◀────────────┘
//!                                             │
//!                                   BannerPresenter::apply
//! ```
//!
//! Everything that touches the browser (session storage, `fetch`, timers,
//! the host's placeholder regions) sits behind a trait so that the core can
//! run under both [`Sendable`](future_form::Sendable) and
//! [`Local`](future_form::Local) futures.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod banner;
pub mod cache;
pub mod config;
pub mod context;
pub mod extension;
pub mod markup;
pub mod placeholder;
pub mod resolver;
pub mod scope;
pub mod search;
pub mod status;
pub mod storage;
pub mod timer;
pub mod timestamp;

#[cfg(any(test, feature = "test_utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test_utils")))]
pub mod test_utils;

pub use config::BannerConfig;
pub use extension::SharingBanner;
