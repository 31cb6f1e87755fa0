//! Browser page for tuning [media capture constraints][1] of a camera and
//! observing the settings negotiated by the device.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#constrainable-interface

#![allow(clippy::module_name_repetitions)]
#![warn(missing_docs)]

#[macro_use]
pub mod utils;
pub mod api;
pub mod conf;
pub mod controls;
pub mod media;
pub mod platform;
pub mod playground;
pub mod view;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[doc(inline)]
pub use self::{
    api::ConstraintsPlayground, conf::Conf, playground::Playground,
    utils::PlaygroundError,
};
