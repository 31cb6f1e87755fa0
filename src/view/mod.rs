//! DOM presentation of a [`Playground`].

mod row;

use std::{cell::RefCell, rc::Rc};

use derive_more::{Display, From};
use tracerr::Traced;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement,
    HtmlVideoElement, MediaStream, Node,
};

use crate::{
    media::{CaptureSession, SessionState},
    platform::{
        self, EventListener, EventListenerBindError, WebMediaDevices,
        WebMediaTrack,
    },
    playground::Playground,
    utils::{JsCaused, WatchersStore},
};

pub use self::row::ConstraintRow;

/// Errors that may occur when rendering a [`Playground`].
#[derive(Clone, Debug, Display, From, JsCaused, PartialEq)]
#[js(error = "platform::Error")]
pub enum ViewError {
    /// Occurs if the element to mount a [`Playground`] into doesn't exist.
    #[display(fmt = "Element `#{}` does not exist", _0)]
    #[from(ignore)]
    RootNotFound(String),

    /// Occurs if a DOM operation throws.
    #[display(fmt = "DOM operation failed: {}", _0)]
    Dom(platform::Error),

    /// Occurs if a DOM event listener cannot be added.
    #[display(fmt = "{}", _0)]
    EventListenerBind(#[js(cause)] EventListenerBindError),
}

impl ViewError {
    /// Wraps the provided JS exception into a [`ViewError::Dom`].
    fn dom(err: JsValue) -> Traced<Self> {
        tracerr::new!(Self::Dom(platform::Error::from(err)))
    }
}

/// Creates a new element with the provided `tag`.
fn create_element<T: JsCast>(
    document: &Document,
    tag: &str,
) -> Result<T, Traced<ViewError>> {
    document
        .create_element(tag)
        .map(JsCast::unchecked_into)
        .map_err(ViewError::dom)
}

/// Appends the provided `child` to the `parent` node.
fn append<P, C>(parent: &P, child: &C) -> Result<(), Traced<ViewError>>
where
    P: AsRef<Node>,
    C: AsRef<Node>,
{
    parent
        .as_ref()
        .append_child(child.as_ref())
        .map(drop)
        .map_err(ViewError::dom)
}

/// Returns the text describing the provided [`SessionState`].
fn status_text(state: &SessionState) -> String {
    match state {
        SessionState::Disabled => "Capture is off".to_owned(),
        SessionState::Acquiring => "Waiting for capture devices...".to_owned(),
        SessionState::Enabled => "Capture is on".to_owned(),
        SessionState::Failed(err) => format!("Capture failed: {}", err),
    }
}

/// Page rendering a [`Playground`] into a DOM element.
///
/// All the DOM listeners and watchers are removed once the page is disposed
/// or dropped.
pub struct PlaygroundView {
    /// Element holding the whole page.
    container: HtmlElement,

    /// Preview of the published [`CaptureSession`].
    video: HtmlVideoElement,

    /// Listener of the on/off button.
    toggle_listener: Option<EventListener<HtmlButtonElement, Event>>,

    /// Rows of the supported constraints.
    rows: Rc<RefCell<Vec<ConstraintRow>>>,

    /// Tasks updating the page.
    watchers: WatchersStore,
}

impl PlaygroundView {
    /// Renders the provided [`Playground`] into the element with the provided
    /// ID, and starts applying its constraints.
    ///
    /// # Errors
    ///
    /// With [`ViewError::RootNotFound`] if there is no element with the
    /// provided ID.
    ///
    /// With [`ViewError::Dom`] or [`ViewError::EventListenerBind`] if
    /// building the page fails.
    pub fn mount(
        root_id: &str,
        autoplay: bool,
        playground: &Rc<Playground<WebMediaDevices>>,
    ) -> Result<Self, Traced<ViewError>> {
        let document = platform::window().document().ok_or_else(|| {
            tracerr::new!(ViewError::Dom(platform::Error::new(
                "NotFoundError",
                "window.document is undefined",
            )))
        })?;
        let root: Element =
            document.get_element_by_id(root_id).ok_or_else(|| {
                tracerr::new!(ViewError::RootNotFound(root_id.into()))
            })?;

        let container: HtmlElement = create_element(&document, "div")?;
        container.set_class_name("constraints-playground");
        let toggle: Rc<HtmlButtonElement> =
            Rc::new(create_element(&document, "button")?);
        let status: HtmlElement = create_element(&document, "p")?;
        let requested: HtmlElement = create_element(&document, "pre")?;
        let list: HtmlElement = create_element(&document, "ul")?;
        let video: HtmlVideoElement = create_element(&document, "video")?;
        video.set_autoplay(autoplay);
        video.set_muted(true);

        let weak_playground = Rc::downgrade(playground);
        let rows = playground
            .supported()
            .iter()
            .cloned()
            .map(|key| ConstraintRow::new(&document, key, &weak_playground))
            .collect::<Result<Vec<_>, _>>()?;
        for row in &rows {
            append(&list, row.element())?;
        }

        append(&container, &*toggle)?;
        append(&container, &status)?;
        append(&container, &requested)?;
        append(&container, &list)?;
        append(&container, &video)?;
        append(&root, &container)?;

        let toggle_listener = EventListener::new_mut(
            Rc::clone(&toggle),
            "click",
            move |_: Event| {
                if let Some(playground) = weak_playground.upgrade() {
                    let toggled = playground.toggle();
                    platform::spawn(async move {
                        // Failures are rendered from the `SessionState`.
                        if let Err(e) = toggled.await {
                            log::debug!("Toggle failed: {}", e);
                        }
                    });
                }
            },
        )
        .map_err(tracerr::map_from_and_wrap!())?;

        let this = Self {
            container,
            video,
            toggle_listener: Some(toggle_listener),
            rows: Rc::new(RefCell::new(rows)),
            watchers: WatchersStore::default(),
        };
        this.spawn_watchers(playground, toggle, status, requested);
        Ok(this)
    }

    /// Spawns the tasks keeping the page in sync with the [`Playground`].
    fn spawn_watchers(
        &self,
        playground: &Playground<WebMediaDevices>,
        toggle: Rc<HtmlButtonElement>,
        status: HtmlElement,
        requested: HtmlElement,
    ) {
        self.watchers.spawn_watcher(
            playground.subscribe_state(),
            move |state| {
                let label = if state.is_requested() { "off" } else { "on" };
                toggle.set_text_content(Some(label));
                status.set_text_content(Some(&status_text(&state)));
                Ok::<_, Traced<ViewError>>(())
            },
        );

        let rows = Rc::clone(&self.rows);
        self.watchers.spawn_watcher(
            playground.subscribe_constraints(),
            move |constraints| {
                requested.set_text_content(Some(&constraints.to_json()));
                for row in rows.borrow().iter() {
                    row.render_requested(&constraints);
                }
                Ok::<_, Traced<ViewError>>(())
            },
        );

        let rows = Rc::clone(&self.rows);
        self.watchers.spawn_watcher(
            playground.subscribe_readout(),
            move |readout| {
                log::debug!("Negotiated settings #{}", readout.revision());
                for row in rows.borrow().iter() {
                    row.render_negotiated(readout.settings());
                }
                Ok::<_, Traced<ViewError>>(())
            },
        );

        let video = self.video.clone();
        self.watchers.spawn_watcher(
            playground.subscribe_session(),
            move |session| bind_preview(&video, session.as_deref()),
        );

        self.watchers.spawn(playground.applicator_task());
    }

    /// Stops updating the page and removes it from the DOM. Idempotent.
    pub fn dispose(&mut self) {
        self.watchers.clear();
        drop(self.toggle_listener.take());
        self.rows.borrow_mut().clear();
        self.video.set_src_object(None);
        self.container.remove();
    }
}

impl Drop for PlaygroundView {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Binds the provided `video` element to the tracks of the provided
/// [`CaptureSession`], or clears its source if there is none.
fn bind_preview(
    video: &HtmlVideoElement,
    session: Option<&CaptureSession<WebMediaTrack>>,
) -> Result<(), Traced<ViewError>> {
    let session = match session {
        Some(session) => session,
        None => {
            video.set_src_object(None);
            return Ok(());
        }
    };

    let stream = MediaStream::new().map_err(ViewError::dom)?;
    for track in session.tracks() {
        stream.add_track(track.as_ref());
    }
    video.set_src_object(Some(&stream));
    Ok(())
}
