//! [MediaStreamTrack][1] functionality.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#mediastreamtrack

use derive_more::AsRef;
use futures::future::LocalBoxFuture;
use tracerr::Traced;
use wasm_bindgen_futures::JsFuture;
use web_sys::MediaTrackConstraints;

use crate::{
    media::{
        ConstraintSet, MediaDevicesError, MediaKind, MediaTrack,
        NegotiatedSettings,
    },
    platform,
};

/// Wrapper around [MediaStreamTrack][1] received from a
/// [getUserMedia()][2] request.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#mediastreamtrack
/// [2]: https://w3.org/TR/mediacapture-streams/#dom-mediadevices-getusermedia
#[derive(AsRef, Clone, Debug)]
pub struct WebMediaTrack {
    #[as_ref]
    sys_track: web_sys::MediaStreamTrack,
    kind: MediaKind,
}

impl From<web_sys::MediaStreamTrack> for WebMediaTrack {
    fn from(sys_track: web_sys::MediaStreamTrack) -> Self {
        let kind = match sys_track.kind().as_ref() {
            "audio" => MediaKind::Audio,
            "video" => MediaKind::Video,
            _ => unreachable!(),
        };
        Self { sys_track, kind }
    }
}

impl MediaTrack for WebMediaTrack {
    #[inline]
    fn id(&self) -> String {
        self.sys_track.id()
    }

    #[inline]
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn apply_constraints(
        &self,
        constraints: &ConstraintSet,
    ) -> LocalBoxFuture<'static, Result<(), Traced<MediaDevicesError>>> {
        let promise = self.sys_track.apply_constraints_with_constraints(
            &MediaTrackConstraints::from(constraints),
        );
        Box::pin(async move {
            let promise = promise
                .map_err(platform::Error::from)
                .map_err(MediaDevicesError::ApplyConstraintsFailed)
                .map_err(tracerr::wrap!())?;
            JsFuture::from(promise)
                .await
                .map(drop)
                .map_err(platform::Error::from)
                .map_err(MediaDevicesError::ApplyConstraintsFailed)
                .map_err(tracerr::wrap!())
        })
    }

    fn settings(&self) -> NegotiatedSettings {
        NegotiatedSettings::from(&self.sys_track.get_settings())
    }

    #[inline]
    fn stop(&self) {
        self.sys_track.stop();
    }
}
