//! [MediaDevices][1] abstraction.
//!
//! [1]: https://w3.org/TR/mediacapture-streams#mediadevices

use derive_more::Display;
use futures::future::LocalBoxFuture;
use tracerr::Traced;

use crate::{platform, utils::JsCaused};

#[cfg(any(test, feature = "mockable"))]
use super::track::MockMediaTrack;
use super::{ConstraintKey, MediaTrack};

/// Errors that may occur when accessing capture devices.
#[derive(Clone, Debug, Display, JsCaused, PartialEq)]
#[js(error = "platform::Error")]
pub enum MediaDevicesError {
    /// Occurs if the [MediaDevices][1] interface is not available.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#mediadevices
    #[display(fmt = "Navigator.mediaDevices is unavailable: {}", _0)]
    MediaDevicesUnavailable(platform::Error),

    /// Occurs if the [getUserMedia][1] request failed.
    ///
    /// [1]: https://tinyurl.com/rnxcavf
    #[display(fmt = "MediaDevices.getUserMedia() failed: {}", _0)]
    GetUserMediaFailed(platform::Error),

    /// Occurs if the device rejected the applied constraints.
    #[display(fmt = "MediaStreamTrack.applyConstraints() failed: {}", _0)]
    ApplyConstraintsFailed(platform::Error),
}

/// Kinds of media requested from a capture device.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CaptureRequest {
    /// Whether a video track is requested.
    pub video: bool,

    /// Whether an audio track is requested. [`None`] leaves it to the
    /// platform default.
    pub audio: Option<bool>,
}

impl Default for CaptureRequest {
    #[inline]
    fn default() -> Self {
        Self {
            video: true,
            audio: None,
        }
    }
}

/// Entry point to the capture devices of the platform.
#[cfg_attr(
    any(test, feature = "mockable"),
    mockall::automock(type Track = MockMediaTrack;)
)]
pub trait MediaDevices {
    /// Track produced by these [`MediaDevices`].
    type Track: MediaTrack + 'static;

    /// Returns names of the constraints the platform recognizes.
    ///
    /// Adapter for a [MediaDevices.getSupportedConstraints()][1] function.
    ///
    /// # Errors
    ///
    /// With [`MediaDevicesError::MediaDevicesUnavailable`] if the platform
    /// doesn't expose capture devices at all.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediadevices-getsupportedconstraints
    fn supported_constraints(
        &self,
    ) -> Result<Vec<ConstraintKey>, Traced<MediaDevicesError>>;

    /// Prompts a user for a permission to use media inputs and returns the
    /// acquired tracks.
    ///
    /// Adapter for a [MediaDevices.getUserMedia()][1] function.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#dom-mediadevices-getusermedia
    fn get_user_media(
        &self,
        request: CaptureRequest,
    ) -> LocalBoxFuture<
        'static,
        Result<Vec<Self::Track>, Traced<MediaDevicesError>>,
    >;
}
