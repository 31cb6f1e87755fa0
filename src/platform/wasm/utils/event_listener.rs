use std::rc::Rc;

use derive_more::{Display, From};
use tracerr::Traced;
use wasm_bindgen::{closure::Closure, convert::FromWasmAbi, JsCast};

use crate::{platform, utils::JsCaused};

/// Failed to bind to [`EventTarget`][1] event.
///
/// [1]: https://developer.mozilla.org/en-US/docs/Web/API/EventTarget
#[derive(Clone, Debug, Display, From, JsCaused, PartialEq)]
#[display(fmt = "Failed to bind to DOM event: {}", _0)]
#[js(error = "platform::Error")]
pub struct EventListenerBindError(platform::Error);

/// Wrapper for closure that handles some [`EventTarget`] event.
///
/// Unregisters the handler on [`Drop`].
///
/// [`EventTarget`]: web_sys::EventTarget
pub struct EventListener<T, A>
where
    T: AsRef<web_sys::EventTarget>,
{
    event_name: &'static str,
    target: Rc<T>,
    closure: Closure<dyn FnMut(A)>,
}

impl<T, A> EventListener<T, A>
where
    T: AsRef<web_sys::EventTarget>,
    A: FromWasmAbi + 'static,
{
    /// Creates new [`EventListener`] from a given [`FnMut`] `closure`.
    ///
    /// # Errors
    ///
    /// Errors if [`EventListener`] bound fails.
    pub fn new_mut<F>(
        target: Rc<T>,
        event_name: &'static str,
        closure: F,
    ) -> Result<Self, Traced<EventListenerBindError>>
    where
        F: FnMut(A) + 'static,
    {
        let closure = Closure::wrap(Box::new(closure) as Box<dyn FnMut(A)>);

        let event_target: &web_sys::EventTarget = (*target).as_ref();
        event_target
            .add_event_listener_with_callback(
                event_name,
                closure.as_ref().unchecked_ref(),
            )
            .map_err(platform::Error::from)
            .map_err(EventListenerBindError::from)
            .map_err(tracerr::wrap!())?;

        Ok(Self {
            event_name,
            target,
            closure,
        })
    }
}

impl<T, A> Drop for EventListener<T, A>
where
    T: AsRef<web_sys::EventTarget>,
{
    /// Drops [`EventListener`]'s closure and unregisters appropriate event
    /// handler.
    fn drop(&mut self) {
        let event_target: &web_sys::EventTarget = (*self.target).as_ref();
        if let Err(err) = event_target.remove_event_listener_with_callback(
            self.event_name,
            self.closure.as_ref().unchecked_ref(),
        ) {
            log::error!("Failed to remove EventListener: {:?}", err);
        }
    }
}
