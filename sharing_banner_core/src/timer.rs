//! Runtime-agnostic timers.
//!
//! The resolver bounds the search call with a [`Timeout`]; the navigation
//! driver defers the expand half of the show transition by one [`Tick`].

use core::time::Duration;

use future_form::FutureForm;
use thiserror::Error;

#[cfg(feature = "futures-timer")]
use future_form::{Local, Sendable};

#[cfg(feature = "futures-timer")]
use futures::{
    FutureExt,
    future::{BoxFuture, Either, LocalBoxFuture, select},
};

#[cfg(feature = "futures-timer")]
use futures_timer::Delay;

/// A trait for time-limiting futures.
pub trait Timeout<K: FutureForm + ?Sized>: Clone {
    /// Wrap a future with a timeout.
    fn timeout<'a, T: 'a>(
        &'a self,
        dur: Duration,
        fut: K::Future<'a, T>,
    ) -> K::Future<'a, Result<T, TimedOut>>;
}

/// A source of scheduler ticks.
pub trait Tick<K: FutureForm + ?Sized> {
    /// Resolve after the current task yields to the scheduler once, so that
    /// work queued meanwhile (such as a browser paint) runs first.
    fn next_tick(&self) -> K::Future<'_, ()>;
}

/// An error indicating that an operation has timed out.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
#[error("Operation timed out")]
pub struct TimedOut;

/// Timers backed by the [`futures-timer`] crate.
#[cfg(feature = "futures-timer")]
#[cfg_attr(docsrs, doc(cfg(feature = "futures-timer")))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FuturesTimerTimeout;

#[cfg(feature = "futures-timer")]
impl Timeout<Local> for FuturesTimerTimeout {
    fn timeout<'a, T: 'a>(
        &'a self,
        dur: Duration,
        fut: LocalBoxFuture<'a, T>,
    ) -> LocalBoxFuture<'a, Result<T, TimedOut>> {
        async move {
            match select(fut, Delay::new(dur)).await {
                Either::Left((val, _delay)) => Ok(val),
                Either::Right(_) => Err(TimedOut),
            }
        }
        .boxed_local()
    }
}

#[cfg(feature = "futures-timer")]
impl Timeout<Sendable> for FuturesTimerTimeout {
    fn timeout<'a, T: 'a>(
        &'a self,
        dur: Duration,
        fut: BoxFuture<'a, T>,
    ) -> BoxFuture<'a, Result<T, TimedOut>> {
        async move {
            match select(fut, Delay::new(dur)).await {
                Either::Left((val, _delay)) => Ok(val),
                Either::Right(_) => Err(TimedOut),
            }
        }
        .boxed()
    }
}

#[cfg(feature = "futures-timer")]
impl Tick<Local> for FuturesTimerTimeout {
    fn next_tick(&self) -> LocalBoxFuture<'_, ()> {
        Delay::new(Duration::ZERO).boxed_local()
    }
}

#[cfg(feature = "futures-timer")]
impl Tick<Sendable> for FuturesTimerTimeout {
    fn next_tick(&self) -> BoxFuture<'_, ()> {
        Delay::new(Duration::ZERO).boxed()
    }
}
