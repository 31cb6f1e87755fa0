//! Playground configuration passed from the JS side.

use std::{borrow::Cow, collections::BTreeMap, str::FromStr as _};

use derive_more::{Display, From};
use serde::Deserialize;
use smart_default::SmartDefault;
use tracerr::Traced;
use wasm_bindgen::JsValue;

use crate::{
    media::{CaptureRequest, ConstraintSet, ConstraintValue},
    platform,
    utils::{JsCaused, JsonParseError},
};

/// Errors that may occur when reading a [`Conf`].
#[derive(Clone, Debug, Display, From, JsCaused, PartialEq)]
#[js(error = "platform::Error")]
pub enum ConfError {
    /// Occurs if the provided JS object cannot be serialized to JSON.
    #[display(fmt = "Configuration is not serializable: {}", _0)]
    #[from(ignore)]
    NotSerializable(platform::Error),

    /// Occurs if the provided configuration has a malformed shape.
    #[display(fmt = "Failed to parse configuration: {}", _0)]
    Parse(JsonParseError),
}

/// Playground configuration.
///
/// Every field is optional on the JS side, missing ones take their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, SmartDefault)]
#[serde(default, rename_all = "camelCase")]
pub struct Conf {
    /// ID of the DOM element the playground is mounted into.
    /// Defaults to `root`.
    #[default("root")]
    pub root_element_id: Cow<'static, str>,

    /// Maximum level of the log entries written to the browser console.
    /// Defaults to `INFO`. Unknown level (`OFF`, for example) disables
    /// logging.
    #[default("INFO")]
    pub log_level: Cow<'static, str>,

    /// Whether the video preview starts playing as soon as it's attached.
    /// Defaults to `true`.
    #[default(true)]
    pub autoplay: bool,

    /// Whether an audio track is requested along with the video one.
    /// Left to the platform default if not set.
    pub audio: Option<bool>,

    /// Constraints requested before any user edits, keyed by their JS side
    /// names.
    pub initial_constraints: BTreeMap<String, ConstraintValue>,
}

impl Conf {
    /// Reads a [`Conf`] from the provided JS object.
    ///
    /// `undefined` and `null` produce a default [`Conf`].
    ///
    /// # Errors
    ///
    /// With [`ConfError::NotSerializable`] if the provided object cannot be
    /// stringified (has cycles, for example).
    ///
    /// With [`ConfError::Parse`] if the provided object has a malformed
    /// shape.
    pub fn from_js(value: &JsValue) -> Result<Self, Traced<ConfError>> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let json = js_sys::JSON::stringify(value).map_err(|e| {
            tracerr::new!(ConfError::NotSerializable(platform::Error::from(e)))
        })?;
        Self::parse_json(&json.as_string().unwrap_or_default())
    }

    /// Parses a [`Conf`] from the provided JSON string.
    ///
    /// # Errors
    ///
    /// With [`ConfError::Parse`] if the provided string is not a valid JSON
    /// or has a malformed shape.
    pub fn parse_json(json: &str) -> Result<Self, Traced<ConfError>> {
        serde_json::from_str(json)
            .map_err(JsonParseError::from)
            .map_err(ConfError::from)
            .map_err(tracerr::wrap!())
    }

    /// Returns configured logging level. [`None`] if disabled.
    #[must_use]
    pub fn log_level(&self) -> Option<log::Level> {
        log::Level::from_str(&self.log_level).ok()
    }

    /// Returns [`CaptureRequest`] to acquire capture devices with.
    #[must_use]
    pub fn capture_request(&self) -> CaptureRequest {
        CaptureRequest {
            audio: self.audio,
            ..CaptureRequest::default()
        }
    }

    /// Returns [`ConstraintSet`] to start the playground with.
    ///
    /// Entries with unknown names or values of a wrong shape are skipped.
    #[must_use]
    pub fn initial_constraints(&self) -> ConstraintSet {
        ConstraintSet::from_entries(
            self.initial_constraints
                .iter()
                .map(|(name, value)| (name.as_str(), value.clone())),
        )
    }
}

#[cfg(test)]
mod conf_spec {
    use crate::media::{ConstraintName, ConstraintValue};

    use super::{Conf, ConfError};

    #[test]
    fn defaults_missing_fields() {
        let conf = Conf::parse_json("{}").unwrap();

        assert_eq!(conf, Conf::default());
        assert_eq!(conf.root_element_id, "root");
        assert_eq!(conf.log_level(), Some(log::Level::Info));
        assert!(conf.autoplay);
        assert_eq!(conf.capture_request().audio, None);
        assert!(conf.capture_request().video);
        assert!(conf.initial_constraints().is_empty());
    }

    #[test]
    fn reads_camel_case_fields() {
        let conf = Conf::parse_json(
            r#"{
                "rootElementId": "playground",
                "logLevel": "debug",
                "autoplay": false,
                "audio": true
            }"#,
        )
        .unwrap();

        assert_eq!(conf.root_element_id, "playground");
        assert_eq!(conf.log_level(), Some(log::Level::Debug));
        assert!(!conf.autoplay);
        assert_eq!(conf.capture_request().audio, Some(true));
    }

    #[test]
    fn unknown_log_level_disables_logging() {
        let conf = Conf::parse_json(r#"{"logLevel": "OFF"}"#).unwrap();

        assert_eq!(conf.log_level(), None);
    }

    #[test]
    fn drops_invalid_initial_constraints() {
        let conf = Conf::parse_json(
            r#"{"initialConstraints": {
                "width": 1280,
                "frameRate": 30,
                "height": -1,
                "echoCancellation": "yes",
                "facingMode": "user",
                "zoom": 2
            }}"#,
        )
        .unwrap();

        let constraints = conf.initial_constraints();

        assert_eq!(constraints.len(), 3);
        assert_eq!(
            constraints.get(ConstraintName::Width),
            Some(&ConstraintValue::UnsignedLong(1280)),
        );
        assert_eq!(
            constraints.get(ConstraintName::FrameRate),
            Some(&ConstraintValue::Double(30.0)),
        );
        assert_eq!(
            constraints.get(ConstraintName::FacingMode),
            Some(&ConstraintValue::DomString("user".into())),
        );
    }

    #[test]
    fn builds_constraints_from_js_names() {
        let conf = Conf {
            initial_constraints: btreemap! {
                "height".to_owned() => ConstraintValue::Double(720.0),
                "noiseSuppression".to_owned() => ConstraintValue::Boolean(true),
            },
            ..Conf::default()
        };

        let constraints = conf.initial_constraints();

        assert_eq!(
            constraints.get(ConstraintName::Height),
            Some(&ConstraintValue::UnsignedLong(720)),
        );
        assert_eq!(
            constraints.get(ConstraintName::NoiseSuppression),
            Some(&ConstraintValue::Boolean(true)),
        );
    }

    #[test]
    fn errors_on_malformed_json() {
        let err = Conf::parse_json(r#"{"autoplay": "sure"}"#).unwrap_err();

        assert!(matches!(err.as_ref(), ConfError::Parse(_)));
    }
}
