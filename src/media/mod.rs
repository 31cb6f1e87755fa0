//! Adapters to [Media Capture and Streams API][1].
//!
//! [1]: https://w3.org/TR/mediacapture-streams

mod applicator;
mod constraints;
mod devices;
mod session;
mod settings;
mod track;

#[cfg(any(test, feature = "mockable"))]
#[doc(inline)]
pub use self::{devices::MockMediaDevices, track::MockMediaTrack};
#[doc(inline)]
pub use self::{
    applicator::ConstraintApplicator,
    constraints::{
        ConstraintKey, ConstraintName, ConstraintSet, ConstraintValue,
        UnknownConstraintName, ValueShape,
    },
    devices::{CaptureRequest, MediaDevices, MediaDevicesError},
    session::{
        CancellationToken, CaptureSession, SessionError, SessionManager,
        SessionState,
    },
    settings::{NegotiatedSettings, SettingValue, SettingsReadout},
    track::{MediaKind, MediaTrack},
};
