//! External API exported to the JS side.

use std::{cell::RefCell, rc::Rc};

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::{
    conf::Conf,
    media::{ConstraintKey, ConstraintValue},
    platform::{self, WebMediaDevices},
    playground::Playground,
    utils::PlaygroundError,
    view::PlaygroundView,
};

/// Handle of a constraints playground page mounted into the DOM.
///
/// The page is unmounted and the capture devices are released once
/// [`ConstraintsPlayground::dispose`] is called or the handle is freed.
#[wasm_bindgen]
pub struct ConstraintsPlayground {
    /// State of the page.
    playground: Rc<Playground<WebMediaDevices>>,

    /// Rendered page. [`None`] once disposed.
    view: RefCell<Option<PlaygroundView>>,
}

#[wasm_bindgen]
impl ConstraintsPlayground {
    /// Mounts a new constraints playground page configured with the provided
    /// object.
    ///
    /// Recognized configuration keys: `rootElementId` (`"root"` by default),
    /// `logLevel` (`"INFO"` by default), `autoplay` (`true` by default),
    /// `audio` and `initialConstraints`.
    ///
    /// # Errors
    ///
    /// With [`PlaygroundError`] if the configuration is malformed or the page
    /// cannot be mounted.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ConstraintsPlayground, JsValue> {
        platform::set_panic_hook();
        let conf = Conf::from_js(&config).map_err(PlaygroundError::from)?;
        if let Some(level) = conf.log_level() {
            platform::init_logger(level);
        }

        let playground =
            Rc::new(Playground::create(Rc::new(WebMediaDevices), &conf));
        let view = PlaygroundView::mount(
            &conf.root_element_id,
            conf.autoplay,
            &playground,
        )
        .map_err(PlaygroundError::from)?;
        log::info!("Constraints playground mounted");

        Ok(Self {
            playground,
            view: RefCell::new(Some(view)),
        })
    }

    /// Enables or disables capture.
    ///
    /// Returns [`Promise`] resolving once the capture devices are acquired,
    /// or rejecting with a [`PlaygroundError`] if they can't be acquired.
    pub fn set_enabled(&self, enabled: bool) -> Promise {
        let fut = self.playground.set_enabled(enabled);
        future_to_promise(async move {
            fut.await.map_err(PlaygroundError::from)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Flips the requested capture state.
    ///
    /// See [`ConstraintsPlayground::set_enabled`] for details.
    pub fn toggle(&self) -> Promise {
        let fut = self.playground.toggle();
        future_to_promise(async move {
            fut.await.map_err(PlaygroundError::from)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Indicates whether capture is currently requested.
    pub fn is_enabled(&self) -> bool {
        self.playground.sessions().is_requested()
    }

    /// Requests the provided `value` of the constraint with the provided
    /// `name`.
    ///
    /// `undefined`, `null` and values of a wrong type remove the constraint.
    /// Constraints unknown to the playground are ignored.
    pub fn update_constraint(&self, name: &str, value: JsValue) {
        let value = if let Some(flag) = value.as_bool() {
            Some(ConstraintValue::Boolean(flag))
        } else if let Some(number) = value.as_f64() {
            Some(ConstraintValue::Double(number))
        } else {
            value.as_string().map(ConstraintValue::DomString)
        };
        self.playground.update(&ConstraintKey::from(name), value);
    }

    /// Returns the requested constraints as a JSON object.
    pub fn constraints(&self) -> String {
        self.playground.constraints().to_json()
    }

    /// Returns names of the constraints supported by the platform.
    pub fn supported_constraints(&self) -> Vec<JsValue> {
        self.playground
            .supported()
            .iter()
            .map(|key| JsValue::from_str(key.js_name()))
            .collect()
    }

    /// Unmounts the page and releases the capture devices. Idempotent.
    pub fn dispose(&self) {
        if let Some(mut view) = self.view.borrow_mut().take() {
            view.dispose();
        }
        self.playground.dispose();
    }
}

impl Drop for ConstraintsPlayground {
    fn drop(&mut self) {
        self.dispose();
    }
}
