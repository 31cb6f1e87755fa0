//! Typed input controls editing a single constraint value.
//!
//! Text controls keep a local edit buffer which is committed only once the
//! control loses focus, so the device is never renegotiated mid-edit.

use crate::media::{ConstraintValue, ValueShape};

/// Result of committing a [`Control`].
#[derive(Clone, Debug, PartialEq)]
pub enum Commit {
    /// Nothing was edited, the committed value stays as is.
    Unchanged,

    /// Constraint should be set to the provided value, or removed if it's
    /// [`None`].
    Set(Option<ConstraintValue>),
}

/// Control editing a value of a single [`ValueShape`].
#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    /// Control of a [`ValueShape::UnsignedLong`] value.
    UnsignedLong(Option<String>),

    /// Control of a [`ValueShape::Double`] value.
    Double(Option<String>),

    /// Checkbox of a [`ValueShape::Boolean`] value.
    ///
    /// Has no edit buffer, since every toggle is committed immediately.
    Boolean,

    /// Control of a [`ValueShape::DomString`] value.
    DomString(Option<String>),
}

impl Control {
    /// Creates a new [`Control`] for values of the provided [`ValueShape`].
    #[must_use]
    pub fn for_shape(shape: ValueShape) -> Self {
        match shape {
            ValueShape::UnsignedLong => Self::UnsignedLong(None),
            ValueShape::Double => Self::Double(None),
            ValueShape::Boolean => Self::Boolean,
            ValueShape::DomString => Self::DomString(None),
        }
    }

    /// Returns [`ValueShape`] edited by this [`Control`].
    #[must_use]
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::UnsignedLong(_) => ValueShape::UnsignedLong,
            Self::Double(_) => ValueShape::Double,
            Self::Boolean => ValueShape::Boolean,
            Self::DomString(_) => ValueShape::DomString,
        }
    }

    /// Indicates whether this [`Control`] holds uncommitted edits.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.buffer().is_some()
    }

    /// Returns text to be displayed by this [`Control`]: the edit buffer while
    /// editing, otherwise the `committed` value, or an empty string.
    #[must_use]
    pub fn display(&self, committed: Option<&ConstraintValue>) -> String {
        match (self.buffer(), committed) {
            (Some(buffer), _) => buffer.to_owned(),
            (None, Some(value)) => value.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Indicates whether a [`Control::Boolean`] should be rendered checked
    /// for the provided `committed` value.
    #[must_use]
    pub fn is_checked(committed: Option<&ConstraintValue>) -> bool {
        matches!(committed, Some(ConstraintValue::Boolean(true)))
    }

    /// Replaces the edit buffer with the provided `text`.
    ///
    /// No-op for a [`Control::Boolean`].
    pub fn input(&mut self, text: String) {
        match self {
            Self::UnsignedLong(buffer)
            | Self::Double(buffer)
            | Self::DomString(buffer) => *buffer = Some(text),
            Self::Boolean => (),
        }
    }

    /// Converts the edit buffer into a [`Commit`] and stops editing.
    ///
    /// Text which cannot be converted into the [`ValueShape`] of this
    /// [`Control`] commits removal of the constraint.
    pub fn commit(&mut self) -> Commit {
        let text = match self {
            Self::UnsignedLong(buffer)
            | Self::Double(buffer)
            | Self::DomString(buffer) => buffer.take(),
            Self::Boolean => None,
        };
        let text = match text {
            Some(text) => text,
            None => return Commit::Unchanged,
        };

        let value = match self.shape() {
            ValueShape::UnsignedLong => parse_unsigned_long(&text),
            ValueShape::Double => parse_double(&text),
            ValueShape::DomString => Some(ConstraintValue::DomString(text)),
            ValueShape::Boolean => None,
        };
        Commit::Set(value)
    }

    /// Commits the new state of a [`Control::Boolean`]: `true` if `checked`,
    /// otherwise removal of the constraint.
    ///
    /// Returns [`Commit::Unchanged`] for other [`Control`]s.
    #[must_use]
    pub fn toggle(&self, checked: bool) -> Commit {
        match self {
            Self::Boolean => {
                Commit::Set(checked.then(|| ConstraintValue::Boolean(true)))
            }
            _ => Commit::Unchanged,
        }
    }

    fn buffer(&self) -> Option<&str> {
        match self {
            Self::UnsignedLong(buffer)
            | Self::Double(buffer)
            | Self::DomString(buffer) => buffer.as_deref(),
            Self::Boolean => None,
        }
    }
}

fn parse_unsigned_long(text: &str) -> Option<ConstraintValue> {
    text.trim().parse().ok().map(ConstraintValue::UnsignedLong)
}

fn parse_double(text: &str) -> Option<ConstraintValue> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(ConstraintValue::Double)
}

#[cfg(test)]
mod control_spec {
    use crate::media::{ConstraintValue, ValueShape};

    use super::{Commit, Control};

    fn commit(shape: ValueShape, text: &str) -> Commit {
        let mut control = Control::for_shape(shape);
        control.input(text.to_owned());
        control.commit()
    }

    #[test]
    fn unsigned_long_parses_integers() {
        assert_eq!(
            commit(ValueShape::UnsignedLong, "42"),
            Commit::Set(Some(ConstraintValue::UnsignedLong(42))),
        );
        assert_eq!(
            commit(ValueShape::UnsignedLong, " 1280 "),
            Commit::Set(Some(ConstraintValue::UnsignedLong(1280))),
        );
    }

    #[test]
    fn unsigned_long_clears_on_invalid_text() {
        for text in &["abc", "4.2", "", "-1", "4294967296"] {
            assert_eq!(
                commit(ValueShape::UnsignedLong, text),
                Commit::Set(None),
                "text: {:?}",
                text,
            );
        }
    }

    #[test]
    fn double_parses_finite_numbers() {
        assert_eq!(
            commit(ValueShape::Double, "1.5"),
            Commit::Set(Some(ConstraintValue::Double(1.5))),
        );
        assert_eq!(
            commit(ValueShape::Double, "30"),
            Commit::Set(Some(ConstraintValue::Double(30.0))),
        );
    }

    #[test]
    fn double_clears_on_non_finite_text() {
        for text in &["NaN", "inf", "-infinity", "", "fast"] {
            assert_eq!(
                commit(ValueShape::Double, text),
                Commit::Set(None),
                "text: {:?}",
                text,
            );
        }
    }

    #[test]
    fn boolean_never_commits_false() {
        let control = Control::for_shape(ValueShape::Boolean);

        assert_eq!(
            control.toggle(true),
            Commit::Set(Some(ConstraintValue::Boolean(true))),
        );
        assert_eq!(control.toggle(false), Commit::Set(None));
    }

    #[test]
    fn boolean_is_checked_only_by_true() {
        assert!(Control::is_checked(Some(&ConstraintValue::Boolean(true))));
        assert!(!Control::is_checked(Some(&ConstraintValue::Boolean(false))));
        assert!(!Control::is_checked(None));
    }

    #[test]
    fn dom_string_commits_verbatim() {
        assert_eq!(
            commit(ValueShape::DomString, " user "),
            Commit::Set(Some(ConstraintValue::DomString(" user ".into()))),
        );
        assert_eq!(
            commit(ValueShape::DomString, ""),
            Commit::Set(Some(ConstraintValue::DomString(String::new()))),
        );
    }

    #[test]
    fn untouched_control_is_unchanged() {
        for shape in &[
            ValueShape::UnsignedLong,
            ValueShape::Double,
            ValueShape::DomString,
        ] {
            assert_eq!(Control::for_shape(*shape).commit(), Commit::Unchanged);
        }
    }

    #[test]
    fn displays_buffer_while_editing() {
        let committed = ConstraintValue::UnsignedLong(640);
        let mut control = Control::for_shape(ValueShape::UnsignedLong);
        assert_eq!(control.display(Some(&committed)), "640");
        assert_eq!(control.display(None), "");

        control.input("12".to_owned());
        assert!(control.is_editing());
        assert_eq!(control.display(Some(&committed)), "12");

        let _ = control.commit();
        assert!(!control.is_editing());
        assert_eq!(control.display(Some(&committed)), "640");
    }

    #[test]
    fn commit_ends_editing() {
        let mut control = Control::for_shape(ValueShape::Double);
        control.input("2.5".to_owned());

        assert_eq!(
            control.commit(),
            Commit::Set(Some(ConstraintValue::Double(2.5))),
        );
        assert_eq!(control.commit(), Commit::Unchanged);
    }
}
