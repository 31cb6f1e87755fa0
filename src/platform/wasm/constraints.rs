//! Conversions between constraints and their JS side representations.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{
    MediaStreamConstraints, MediaTrackConstraints, MediaTrackSettings,
    MediaTrackSupportedConstraints,
};

use crate::media::{
    CaptureRequest, ConstraintKey, ConstraintSet, ConstraintValue,
    NegotiatedSettings, SettingValue,
};

impl From<&ConstraintValue> for JsValue {
    fn from(value: &ConstraintValue) -> Self {
        match value {
            ConstraintValue::UnsignedLong(v) => Self::from(*v),
            ConstraintValue::Double(v) => Self::from_f64(*v),
            ConstraintValue::Boolean(v) => Self::from_bool(*v),
            ConstraintValue::DomString(v) => Self::from_str(v),
        }
    }
}

/// Builds a plain [MediaTrackConstraints][1] object: members are keyed by the
/// JS side constraint names and hold bare values.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#media-track-constraints
impl From<&ConstraintSet> for MediaTrackConstraints {
    fn from(set: &ConstraintSet) -> Self {
        let constraints = Object::new();
        for (name, value) in set.iter() {
            if let Err(e) = Reflect::set(
                &constraints,
                &JsValue::from_str(name.js_name()),
                &JsValue::from(value),
            ) {
                log::error!("Failed to set `{}` constraint: {:?}", name, e);
            }
        }
        constraints.unchecked_into()
    }
}

impl From<CaptureRequest> for MediaStreamConstraints {
    fn from(request: CaptureRequest) -> Self {
        let constraints = Self::new();
        constraints.set_video(&JsValue::from_bool(request.video));
        if let Some(audio) = request.audio {
            constraints.set_audio(&JsValue::from_bool(audio));
        }
        constraints
    }
}

impl From<&MediaTrackSettings> for NegotiatedSettings {
    fn from(settings: &MediaTrackSettings) -> Self {
        entries(settings)
            .into_iter()
            .filter_map(|(name, value)| {
                let value = if let Some(flag) = value.as_bool() {
                    SettingValue::Boolean(flag)
                } else if let Some(number) = value.as_f64() {
                    SettingValue::Number(number)
                } else if let Some(text) = value.as_string() {
                    SettingValue::Text(text)
                } else {
                    log::debug!("Skipping `{}` setting: {:?}", name, value);
                    return None;
                };
                Some((name, value))
            })
            .collect()
    }
}

/// Returns keys of all the constraints the provided
/// [MediaTrackSupportedConstraints][1] dictionary marks as supported, in the
/// order the platform reports them.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#media-track-supported-constraints
pub fn supported_keys(
    supported: &MediaTrackSupportedConstraints,
) -> Vec<ConstraintKey> {
    entries(supported)
        .into_iter()
        .filter(|(_, value)| value.as_bool() == Some(true))
        .map(|(name, _)| ConstraintKey::from(name.as_str()))
        .collect()
}

/// Returns own enumerable string-keyed properties of the provided JS object.
fn entries(object: &Object) -> Vec<(String, JsValue)> {
    Object::entries(object)
        .iter()
        .filter_map(|entry| {
            let entry: Array = entry.unchecked_into();
            entry.get(0).as_string().map(|name| (name, entry.get(1)))
        })
        .collect()
}
