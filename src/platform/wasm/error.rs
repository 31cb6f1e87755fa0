//! More convenient wrapper for [`js_sys::Error`].

use std::borrow::Cow;

use derive_more::Display;
use wasm_bindgen::{JsCast, JsValue};

/// Wrapper for JS value which returned from JS side as error.
#[derive(Clone, Debug, Display)]
#[display(fmt = "{}: {}", name, message)]
pub struct Error {
    /// Name of JS error.
    pub name: Cow<'static, str>,

    /// Message of JS error.
    pub message: Cow<'static, str>,

    /// Original JS error.
    pub sys_cause: Option<js_sys::Error>,
}

impl Error {
    /// Creates a new [`Error`] which has no JS side cause.
    #[inline]
    #[must_use]
    pub fn new<N, M>(name: N, message: M) -> Self
    where
        N: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            name: name.into(),
            message: message.into(),
            sys_cause: None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.message == other.message
    }
}

impl From<JsValue> for Error {
    fn from(val: JsValue) -> Self {
        match val.dyn_into::<js_sys::Error>() {
            Ok(err) => Self {
                name: Cow::Owned(err.name().into()),
                message: Cow::Owned(err.message().into()),
                sys_cause: Some(err),
            },
            Err(val) => match val.as_string() {
                Some(reason) => Self {
                    name: "Unknown JS error".into(),
                    message: reason.into(),
                    sys_cause: None,
                },
                None => Self {
                    name: "Unknown JS error".into(),
                    message: format!("{:?}", val).into(),
                    sys_cause: None,
                },
            },
        }
    }
}

impl From<Error> for js_sys::Error {
    fn from(err: Error) -> Self {
        match err.sys_cause {
            Some(sys_cause) => sys_cause,
            None => {
                let error = Self::new(&err.message);
                error.set_name(&err.name);
                error
            }
        }
    }
}
