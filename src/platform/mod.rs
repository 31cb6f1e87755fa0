//! Platform specific functionality.

mod wasm;

#[doc(inline)]
pub use self::wasm::{
    get_property_by_name, init_logger, set_panic_hook, spawn,
    utils::{EventListener, EventListenerBindError},
    window, Error, WebMediaDevices, WebMediaTrack,
};
