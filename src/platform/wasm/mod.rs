//! `wasm32`-platform-specific functionality.

mod constraints;
mod error;
mod media_devices;
mod media_track;
pub mod utils;

use std::sync::Once;

use futures::Future;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::Window;

pub use self::{
    error::Error, media_devices::WebMediaDevices, media_track::WebMediaTrack,
};

/// When the `console_error_panic_hook` feature is enabled, sets a panic hook
/// printing better error messages to the browser console if the code ever
/// panics.
///
/// For more details see:
/// <https://github.com/rustwasm/console_error_panic_hook#readme>
#[inline]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Initializes [`wasm_logger`] as the default application logger writing
/// entries up to the provided `level`.
///
/// Only the first call has any effect.
pub fn init_logger(level: log::Level) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        wasm_logger::init(wasm_logger::Config::new(level));
    });
}

/// Runs a Rust [`Future`] on the current thread.
#[inline]
pub fn spawn<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
}

/// Returns [`Window`] object.
///
/// # Panics
///
/// When global [`Window`] object is inaccessible.
#[must_use]
pub fn window() -> Window {
    // Cannot use `lazy_static` since `window` is `!Sync`.
    // Safe to unwrap.
    web_sys::window().unwrap()
}

/// Returns property of JS object by name if its defined.
/// Converts the value with a given predicate.
pub fn get_property_by_name<T, F, U>(
    value: &T,
    name: &str,
    into: F,
) -> Option<U>
where
    T: AsRef<JsValue>,
    F: Fn(JsValue) -> Option<U>,
{
    Reflect::get(value.as_ref(), &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined())
        .and_then(into)
}
