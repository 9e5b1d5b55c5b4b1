//! Browser timers.
//!
//! [`WasmTimeout`] uses `setTimeout` / `clearTimeout` from the global scope,
//! so it works in both `Window` and `WorkerGlobalScope` contexts.

use core::time::Duration;

use future_form::Local;
use futures::{
    FutureExt,
    future::{self, Either, LocalBoxFuture, select},
};
use js_sys::{Function, Object, Promise, Reflect};
use sharing_banner_core::timer::{Tick, TimedOut, Timeout};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// A [`Timeout<Local>`] and [`Tick<Local>`] using browser `setTimeout`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WasmTimeout;

impl Timeout<Local> for WasmTimeout {
    /// Without a global `setTimeout` the deadline cannot be enforced; the
    /// future then runs to completion unbounded rather than timing out on
    /// the spot.
    fn timeout<'a, T: 'a>(
        &'a self,
        dur: Duration,
        fut: LocalBoxFuture<'a, T>,
    ) -> LocalBoxFuture<'a, Result<T, TimedOut>> {
        async move {
            let ms = dur.as_millis().try_into().unwrap_or(i32::MAX);
            let Some(timer) = Timer::start(ms) else {
                tracing::warn!("setTimeout unavailable, running without a deadline");
                return Ok(fut.await);
            };

            match select(fut, timer.elapsed).await {
                Either::Left((val, _)) => {
                    clear_timeout(&timer.id);
                    Ok(val)
                }
                Either::Right(_) => Err(TimedOut),
            }
        }
        .boxed_local()
    }
}

impl Tick<Local> for WasmTimeout {
    fn next_tick(&self) -> LocalBoxFuture<'_, ()> {
        match Timer::start(0) {
            Some(timer) => timer.elapsed,
            None => future::ready(()).boxed_local(),
        }
    }
}

/// A pending browser timeout.
struct Timer {
    elapsed: LocalBoxFuture<'static, ()>,
    id: JsValue,
}

impl Timer {
    /// Schedule a timeout of `ms` milliseconds on the global scope.
    ///
    /// Returns `None` if the global scope has no `setTimeout`.
    fn start(ms: i32) -> Option<Self> {
        let global = js_sys::global();
        let set_timeout = global_function(&global, "setTimeout")?;

        let mut id = JsValue::UNDEFINED;
        let promise = Promise::new(&mut |resolve, _reject| {
            id = set_timeout
                .call2(&global, resolve.as_ref(), &JsValue::from(ms))
                .unwrap_or(JsValue::UNDEFINED);
        });

        Some(Self {
            elapsed: async move {
                drop(JsFuture::from(promise).await);
            }
            .boxed_local(),
            id,
        })
    }
}

fn clear_timeout(id: &JsValue) {
    let global = js_sys::global();
    if let Some(clear) = global_function(&global, "clearTimeout") {
        drop(clear.call1(&global, id));
    }
}

fn global_function(global: &Object, name: &str) -> Option<Function> {
    Reflect::get(global, &JsValue::from_str(name))
        .and_then(JsCast::dyn_into::<Function>)
        .ok()
}
