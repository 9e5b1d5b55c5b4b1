//! Wall clock backed by `Date.now()`.

use sharing_banner_core::timestamp::{Clock, TimestampMillis};

/// A [`Clock`] reading the JavaScript `Date.now()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JsClock;

impl Clock for JsClock {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now(&self) -> TimestampMillis {
        TimestampMillis::new(js_sys::Date::now() as u64)
    }
}
