//! Media track constraints and the reducer merging single edits into them.

use std::{collections::BTreeMap, fmt, str::FromStr};

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Shape of the value a [`ConstraintName`] accepts.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ValueShape {
    /// Bounded integer, see [ConstrainULong][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-constrainulong
    UnsignedLong,

    /// Bounded float, see [ConstrainDouble][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-constraindouble
    Double,

    /// Flag, see [ConstrainBoolean][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-constrainboolean
    Boolean,

    /// Free text, see [ConstrainDOMString][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-constraindomstring
    DomString,
}

impl ValueShape {
    /// Converts the provided [`ConstraintValue`] into this [`ValueShape`].
    ///
    /// Returns [`None`] if the value cannot represent this shape.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn coerce(self, value: ConstraintValue) -> Option<ConstraintValue> {
        use ConstraintValue as V;

        match (self, value) {
            (Self::UnsignedLong, V::UnsignedLong(v)) => Some(V::UnsignedLong(v)),
            (Self::UnsignedLong, V::Double(v)) => {
                let fits = v.is_finite()
                    && v.fract() == 0.0
                    && v >= 0.0
                    && v <= f64::from(u32::MAX);
                fits.then(|| V::UnsignedLong(v as u32))
            }
            (Self::Double, V::Double(v)) => v.is_finite().then(|| V::Double(v)),
            (Self::Double, V::UnsignedLong(v)) => Some(V::Double(f64::from(v))),
            (Self::Boolean, V::Boolean(v)) => Some(V::Boolean(v)),
            (Self::DomString, V::DomString(v)) => Some(V::DomString(v)),
            _ => None,
        }
    }
}

/// Declares [`ConstraintName`] along with the static table describing every
/// name: its JS side name and its [`ValueShape`].
macro_rules! constraint_names {
    ($(
        $(#[$meta:meta])*
        $variant:ident => ($js_name:literal, $shape:ident),
    )+) => {
        /// Name of a [MediaTrackConstraintSet][1] member known to this crate.
        ///
        /// [1]: https://w3.org/TR/mediacapture-streams/#dom-mediatrackconstraintset
        #[derive(
            Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq,
            PartialOrd, Serialize,
        )]
        pub enum ConstraintName {
            $(
                $(#[$meta])*
                #[serde(rename = $js_name)]
                $variant,
            )+
        }

        impl ConstraintName {
            /// All the known [`ConstraintName`]s.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the name of this constraint as the JS side knows it.
            #[must_use]
            pub fn js_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $js_name,)+
                }
            }

            /// Returns the [`ValueShape`] this constraint accepts.
            #[must_use]
            pub fn shape(self) -> ValueShape {
                match self {
                    $(Self::$variant => ValueShape::$shape,)+
                }
            }
        }
    };
}

constraint_names! {
    /// Width of the video, in pixels.
    Width => ("width", UnsignedLong),
    /// Height of the video, in pixels.
    Height => ("height", UnsignedLong),
    /// Frames per second of the video.
    FrameRate => ("frameRate", Double),
    /// Width divided by height of the video.
    AspectRatio => ("aspectRatio", Double),
    /// Audio samples per second.
    SampleRate => ("sampleRate", UnsignedLong),
    /// Bits per audio sample.
    SampleSize => ("sampleSize", UnsignedLong),
    /// Number of independent audio channels.
    ChannelCount => ("channelCount", UnsignedLong),
    /// Audio latency, in seconds.
    Latency => ("latency", Double),
    /// Automatic gain control of the microphone.
    AutoGainControl => ("autoGainControl", Boolean),
    /// Echo cancellation of the microphone.
    EchoCancellation => ("echoCancellation", Boolean),
    /// Noise suppression of the microphone.
    NoiseSuppression => ("noiseSuppression", Boolean),
    /// Whether the captured audio is kept off the local speakers.
    SuppressLocalAudioPlayback => ("suppressLocalAudioPlayback", Boolean),
    /// Brightness of the camera image.
    Brightness => ("brightness", UnsignedLong),
    /// White balance of the camera, in kelvins.
    ColorTemperature => ("colorTemperature", UnsignedLong),
    /// Contrast of the camera image.
    Contrast => ("contrast", UnsignedLong),
    /// Identifier of the capture device.
    DeviceId => ("deviceId", DomString),
    /// Camera facing: `user`, `environment`, `left` or `right`.
    FacingMode => ("facingMode", DomString),
    /// Identifier of the physical device group.
    GroupId => ("groupId", DomString),
}

impl fmt::Display for ConstraintName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.js_name())
    }
}

/// Error of parsing unknown [`ConstraintName`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display(fmt = "Unknown constraint name: {}", _0)]
pub struct UnknownConstraintName(pub String);

impl FromStr for ConstraintName {
    type Err = UnknownConstraintName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.js_name() == s)
            .ok_or_else(|| UnknownConstraintName(s.to_owned()))
    }
}

/// Constraint name as reported by the platform.
///
/// The platform may support constraints this crate has no [`ValueShape`] for.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ConstraintKey {
    /// Constraint with a known [`ValueShape`].
    Known(ConstraintName),

    /// Constraint which is not implemented by this crate.
    Unknown(String),
}

impl ConstraintKey {
    /// Returns the name of this constraint as the JS side knows it.
    #[must_use]
    pub fn js_name(&self) -> &str {
        match self {
            Self::Known(name) => name.js_name(),
            Self::Unknown(name) => name,
        }
    }

    /// Returns the [`ValueShape`] of this constraint, if it's known.
    #[inline]
    #[must_use]
    pub fn shape(&self) -> Option<ValueShape> {
        match self {
            Self::Known(name) => Some(name.shape()),
            Self::Unknown(_) => None,
        }
    }
}

impl From<&str> for ConstraintKey {
    fn from(name: &str) -> Self {
        name.parse()
            .map_or_else(|_| Self::Unknown(name.to_owned()), Self::Known)
    }
}

impl From<ConstraintName> for ConstraintKey {
    #[inline]
    fn from(name: ConstraintName) -> Self {
        Self::Known(name)
    }
}

impl fmt::Display for ConstraintKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.js_name())
    }
}

/// Requested value of a single constraint.
#[derive(Clone, Debug, Deserialize, Display, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConstraintValue {
    /// Value of a [`ValueShape::UnsignedLong`] constraint.
    UnsignedLong(u32),

    /// Value of a [`ValueShape::Double`] constraint.
    Double(f64),

    /// Value of a [`ValueShape::Boolean`] constraint.
    Boolean(bool),

    /// Value of a [`ValueShape::DomString`] constraint.
    DomString(String),
}

/// Requested constraints of a media track.
///
/// A [`ConstraintName`] absent from the set means "no preference".
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConstraintSet(BTreeMap<ConstraintName, ConstraintValue>);

impl ConstraintSet {
    /// Creates a new empty [`ConstraintSet`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a [`ConstraintSet`] by merging all the provided entries one by
    /// one with [`ConstraintSet::apply`].
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ConstraintValue)>,
        K: Into<ConstraintKey>,
    {
        entries.into_iter().fold(Self::new(), |set, (key, value)| {
            set.apply(&key.into(), Some(value))
        })
    }

    /// Returns a new [`ConstraintSet`] with the provided `key` set to the
    /// provided `value`, or without the `key` if the `value` is [`None`].
    ///
    /// The `value` is converted to the [`ValueShape`] of the `key`. If it
    /// cannot be converted, the `key` is removed.
    ///
    /// [`ConstraintKey::Unknown`] keys leave the set unmodified.
    #[must_use]
    pub fn apply(
        &self,
        key: &ConstraintKey,
        value: Option<ConstraintValue>,
    ) -> Self {
        let name = match key {
            ConstraintKey::Known(name) => *name,
            ConstraintKey::Unknown(name) => {
                log::debug!("Constraint `{}` is not implemented", name);
                return self.clone();
            }
        };

        let mut updated = self.0.clone();
        match value.map(|v| (name.shape().coerce(v.clone()), v)) {
            None => {
                let _ = updated.remove(&name);
            }
            Some((Some(value), _)) => {
                let _ = updated.insert(name, value);
            }
            Some((None, rejected)) => {
                log::warn!(
                    "Constraint `{}` expects {} value, but got: {:?}",
                    name,
                    name.shape(),
                    rejected,
                );
                let _ = updated.remove(&name);
            }
        }
        Self(updated)
    }

    /// Returns the requested value of the provided constraint.
    #[inline]
    #[must_use]
    pub fn get(&self, name: ConstraintName) -> Option<&ConstraintValue> {
        self.0.get(&name)
    }

    /// Returns the requested value of the provided [`ConstraintKey`].
    #[must_use]
    pub fn get_by_key(&self, key: &ConstraintKey) -> Option<&ConstraintValue> {
        match key {
            ConstraintKey::Known(name) => self.get(*name),
            ConstraintKey::Unknown(_) => None,
        }
    }

    /// Iterates over all the requested constraints.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (ConstraintName, &ConstraintValue)> {
        self.0.iter().map(|(name, value)| (*name, value))
    }

    /// Returns count of the requested constraints.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether no constraints are requested.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes this [`ConstraintSet`] into a JSON object keyed with JS side
    /// constraint names.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("Failed to serialize ConstraintSet: {}", e);
            String::from("{}")
        })
    }
}
