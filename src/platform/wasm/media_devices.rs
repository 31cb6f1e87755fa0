//! [MediaDevices][1] functionality.
//!
//! [1]: https://w3.org/TR/mediacapture-streams#mediadevices

use futures::future::LocalBoxFuture;
use tracerr::Traced;
use wasm_bindgen::JsCast as _;
use wasm_bindgen_futures::JsFuture;

use crate::{
    media::{CaptureRequest, ConstraintKey, MediaDevices, MediaDevicesError},
    platform,
};

use super::{constraints, get_property_by_name, window, WebMediaTrack};

/// [MediaDevices][1] of the current browser window.
///
/// [1]: https://w3.org/TR/mediacapture-streams#mediadevices
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMediaDevices;

/// Returns [MediaDevices][1] of the current browser window.
///
/// # Errors
///
/// With [`MediaDevicesError::MediaDevicesUnavailable`] if the browser
/// doesn't expose `navigator.mediaDevices`, which happens in insecure
/// contexts.
///
/// [1]: https://w3.org/TR/mediacapture-streams#mediadevices
fn media_devices() -> Result<web_sys::MediaDevices, Traced<MediaDevicesError>>
{
    get_property_by_name(&window().navigator(), "mediaDevices", |devices| {
        (!devices.is_null()).then(|| devices.unchecked_into())
    })
    .ok_or_else(|| {
        tracerr::new!(MediaDevicesError::MediaDevicesUnavailable(
            platform::Error::new(
                "NotSupportedError",
                "navigator.mediaDevices is undefined",
            )
        ))
    })
}

impl MediaDevices for WebMediaDevices {
    type Track = WebMediaTrack;

    fn supported_constraints(
        &self,
    ) -> Result<Vec<ConstraintKey>, Traced<MediaDevicesError>> {
        let devices = media_devices()?;
        Ok(constraints::supported_keys(
            &devices.get_supported_constraints(),
        ))
    }

    fn get_user_media(
        &self,
        request: CaptureRequest,
    ) -> LocalBoxFuture<
        'static,
        Result<Vec<Self::Track>, Traced<MediaDevicesError>>,
    > {
        Box::pin(async move {
            let promise = media_devices()?
                .get_user_media_with_constraints(&request.into())
                .map_err(platform::Error::from)
                .map_err(MediaDevicesError::GetUserMediaFailed)
                .map_err(tracerr::wrap!())?;
            let stream = JsFuture::from(promise)
                .await
                .map(web_sys::MediaStream::from)
                .map_err(platform::Error::from)
                .map_err(MediaDevicesError::GetUserMediaFailed)
                .map_err(tracerr::wrap!())?;

            let tracks: Vec<_> = stream
                .get_tracks()
                .iter()
                .map(|track| {
                    WebMediaTrack::from(
                        track.unchecked_into::<web_sys::MediaStreamTrack>(),
                    )
                })
                .collect();
            log::debug!("Acquired {} tracks", tracks.len());
            Ok(tracks)
        })
    }
}
