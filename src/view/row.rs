//! Row of a single supported constraint.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use tracerr::Traced;
use web_sys::{Document, Event, HtmlElement, HtmlInputElement};

use crate::{
    controls::Control,
    media::{ConstraintKey, ConstraintSet, NegotiatedSettings, ValueShape},
    platform::{EventListener, WebMediaDevices},
    playground::Playground,
};

use super::{append, create_element, ViewError};

/// Text displayed instead of a control for constraints with unknown
/// [`ValueShape`].
const NOT_IMPLEMENTED: &str = "not implemented...";

/// [`Control`] bound to an `<input>` element.
struct Editor {
    /// `<input>` element of this [`Editor`].
    input: Rc<HtmlInputElement>,

    /// Edited [`Control`].
    control: Rc<RefCell<Control>>,

    /// Listeners of the `input` DOM events.
    _listeners: Vec<EventListener<HtmlInputElement, Event>>,
}

impl Editor {
    /// Creates a new [`Editor`] committing the edits of the provided
    /// constraint to the provided [`Playground`].
    fn new(
        document: &Document,
        key: &ConstraintKey,
        shape: ValueShape,
        playground: &Weak<Playground<WebMediaDevices>>,
    ) -> Result<Self, Traced<ViewError>> {
        let input: Rc<HtmlInputElement> =
            Rc::new(create_element(document, "input")?);
        let control = Rc::new(RefCell::new(Control::for_shape(shape)));

        let listeners = if shape == ValueShape::Boolean {
            input.set_type("checkbox");
            vec![Self::on_change(&input, &control, key, playground)?]
        } else {
            input.set_type("text");
            if shape != ValueShape::DomString {
                input
                    .set_attribute("inputmode", "decimal")
                    .map_err(ViewError::dom)?;
            }
            vec![
                Self::on_input(&input, &control)?,
                Self::on_blur(&input, &control, key, playground)?,
            ]
        };

        Ok(Self {
            input,
            control,
            _listeners: listeners,
        })
    }

    /// Commits every toggle of a checkbox.
    fn on_change(
        input: &Rc<HtmlInputElement>,
        control: &Rc<RefCell<Control>>,
        key: &ConstraintKey,
        playground: &Weak<Playground<WebMediaDevices>>,
    ) -> Result<EventListener<HtmlInputElement, Event>, Traced<ViewError>>
    {
        let checkbox = Rc::clone(input);
        let control = Rc::clone(control);
        let key = key.clone();
        let playground = Weak::clone(playground);
        EventListener::new_mut(Rc::clone(input), "change", move |_: Event| {
            let commit = control.borrow().toggle(checkbox.checked());
            if let Some(playground) = playground.upgrade() {
                playground.commit(&key, commit);
            }
        })
        .map_err(tracerr::map_from_and_wrap!())
    }

    /// Buffers every keystroke.
    fn on_input(
        input: &Rc<HtmlInputElement>,
        control: &Rc<RefCell<Control>>,
    ) -> Result<EventListener<HtmlInputElement, Event>, Traced<ViewError>>
    {
        let field = Rc::clone(input);
        let control = Rc::clone(control);
        EventListener::new_mut(Rc::clone(input), "input", move |_: Event| {
            control.borrow_mut().input(field.value());
        })
        .map_err(tracerr::map_from_and_wrap!())
    }

    /// Commits the buffered text once the focus is lost.
    fn on_blur(
        input: &Rc<HtmlInputElement>,
        control: &Rc<RefCell<Control>>,
        key: &ConstraintKey,
        playground: &Weak<Playground<WebMediaDevices>>,
    ) -> Result<EventListener<HtmlInputElement, Event>, Traced<ViewError>>
    {
        let field = Rc::clone(input);
        let control = Rc::clone(control);
        let key = key.clone();
        let playground = Weak::clone(playground);
        EventListener::new_mut(Rc::clone(input), "blur", move |_: Event| {
            let commit = control.borrow_mut().commit();
            if let Some(playground) = playground.upgrade() {
                playground.commit(&key, commit);
                let constraints = playground.constraints();
                field.set_value(
                    &control.borrow().display(constraints.get_by_key(&key)),
                );
            }
        })
        .map_err(tracerr::map_from_and_wrap!())
    }

    /// Displays the provided `constraints`, unless the user is editing.
    fn render(&self, key: &ConstraintKey, constraints: &ConstraintSet) {
        let control = self.control.borrow();
        let committed = constraints.get_by_key(key);
        match *control {
            Control::Boolean => {
                self.input.set_checked(Control::is_checked(committed));
            }
            _ if control.is_editing() => (),
            _ => self.input.set_value(&control.display(committed)),
        }
    }
}

/// Row displaying the requested and negotiated values of a single
/// constraint.
pub struct ConstraintRow {
    /// Constraint displayed by this [`ConstraintRow`].
    key: ConstraintKey,

    /// `<li>` element of this [`ConstraintRow`].
    element: HtmlElement,

    /// Element displaying the negotiated value.
    negotiated: HtmlElement,

    /// Editor of the requested value. [`None`] for the constraints of
    /// unknown [`ValueShape`].
    editor: Option<Editor>,
}

impl ConstraintRow {
    /// Builds a new [`ConstraintRow`] for the provided constraint.
    ///
    /// # Errors
    ///
    /// With [`ViewError`] if building DOM elements fails.
    pub fn new(
        document: &Document,
        key: ConstraintKey,
        playground: &Weak<Playground<WebMediaDevices>>,
    ) -> Result<Self, Traced<ViewError>> {
        let element: HtmlElement = create_element(document, "li")?;
        let name: HtmlElement = create_element(document, "span")?;
        name.set_text_content(Some(key.js_name()));
        let negotiated: HtmlElement = create_element(document, "span")?;
        negotiated.set_class_name("negotiated");
        append(&element, &name)?;
        append(&element, &negotiated)?;

        let editor = match key.shape() {
            Some(shape) => {
                let editor = Editor::new(document, &key, shape, playground)?;
                append(&element, &*editor.input)?;
                Some(editor)
            }
            None => {
                let placeholder: HtmlElement =
                    create_element(document, "span")?;
                placeholder.set_text_content(Some(NOT_IMPLEMENTED));
                append(&element, &placeholder)?;
                None
            }
        };

        Ok(Self {
            key,
            element,
            negotiated,
            editor,
        })
    }

    /// Returns `<li>` element of this [`ConstraintRow`].
    #[inline]
    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Displays the requested value of the constraint.
    pub fn render_requested(&self, constraints: &ConstraintSet) {
        if let Some(editor) = &self.editor {
            editor.render(&self.key, constraints);
        }
    }

    /// Displays the negotiated value of the constraint.
    pub fn render_negotiated(&self, settings: &NegotiatedSettings) {
        let value = settings
            .get(self.key.js_name())
            .map(ToString::to_string)
            .unwrap_or_default();
        self.negotiated.set_text_content(Some(&value));
    }
}
