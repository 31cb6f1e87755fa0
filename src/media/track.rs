//! [MediaStreamTrack][1] abstraction.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#mediastreamtrack

use derive_more::Display;
use futures::future::LocalBoxFuture;
use tracerr::Traced;

use super::{ConstraintSet, MediaDevicesError, NegotiatedSettings};

/// Kind of a media track.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum MediaKind {
    /// Audio track.
    #[display(fmt = "audio")]
    Audio,

    /// Video track.
    #[display(fmt = "video")]
    Video,
}

/// Single audio or video track produced by a capture device.
#[cfg_attr(any(test, feature = "mockable"), mockall::automock)]
pub trait MediaTrack {
    /// Returns unique identifier of this track.
    fn id(&self) -> String;

    /// Returns kind of this track.
    fn kind(&self) -> MediaKind;

    /// Asks the device to renegotiate this track with the provided
    /// [`ConstraintSet`], which replaces any previously applied one.
    ///
    /// Adapter for a [MediaStreamTrack.applyConstraints()][1] function.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediastreamtrack-applyconstraints
    fn apply_constraints(
        &self,
        constraints: &ConstraintSet,
    ) -> LocalBoxFuture<'static, Result<(), Traced<MediaDevicesError>>>;

    /// Returns the settings the device currently uses for this track.
    ///
    /// Adapter for a [MediaStreamTrack.getSettings()][1] function.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediastreamtrack-getsettings
    fn settings(&self) -> NegotiatedSettings;

    /// Releases the hardware backing this track. Idempotent.
    ///
    /// Adapter for a [MediaStreamTrack.stop()][1] function.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediastreamtrack-stop
    fn stop(&self);
}
