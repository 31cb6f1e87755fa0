//! Settings negotiated by a capture device.

use std::{collections::BTreeMap, iter::FromIterator};

use derive_more::Display;

/// Value of a single [MediaTrackSettings][1] member.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#media-track-settings
#[derive(Clone, Debug, Display, PartialEq)]
pub enum SettingValue {
    /// Numeric setting (`width`, `frameRate`, ...).
    Number(f64),

    /// Flag setting (`echoCancellation`, ...).
    Boolean(bool),

    /// Text setting (`deviceId`, `facingMode`, ...).
    Text(String),
}

/// Settings reported by media tracks after constraints were applied, keyed by
/// their JS side names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NegotiatedSettings(BTreeMap<String, SettingValue>);

impl NegotiatedSettings {
    /// Returns the value of the setting with the provided JS side `name`.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.0.get(name)
    }

    /// Sets the value of the setting with the provided JS side `name`.
    #[inline]
    pub fn insert(&mut self, name: String, value: SettingValue) {
        let _ = self.0.insert(name, value);
    }

    /// Merges the `other` settings into these ones. Values of the `other`
    /// settings win.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Iterates over all the reported settings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Indicates whether no settings are reported.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SettingValue)> for NegotiatedSettings {
    fn from_iter<I: IntoIterator<Item = (String, SettingValue)>>(
        iter: I,
    ) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Published [`NegotiatedSettings`] along with the number of applies which
/// produced them.
///
/// Every apply bumps the [`SettingsReadout::revision`], so two readouts are
/// never equal even if the devices reported the same settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsReadout {
    revision: u64,
    settings: NegotiatedSettings,
}

impl SettingsReadout {
    /// Creates a new [`SettingsReadout`].
    #[inline]
    #[must_use]
    pub fn new(revision: u64, settings: NegotiatedSettings) -> Self {
        Self { revision, settings }
    }

    /// Returns number of the apply which produced this [`SettingsReadout`].
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the published [`NegotiatedSettings`].
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &NegotiatedSettings {
        &self.settings
    }
}
