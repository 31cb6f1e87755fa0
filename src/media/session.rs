//! Acquiring and releasing of [`CaptureSession`]s.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use derive_more::{Display, From};
use futures::{
    future::{self, LocalBoxFuture},
    stream::LocalBoxStream,
};
use medea_reactive::ObservableCell;
use tracerr::Traced;

use crate::{platform, utils::JsCaused};

use super::{
    CaptureRequest, MediaDevices, MediaDevicesError, MediaKind, MediaTrack,
};

/// Errors that may occur in a [`SessionManager`].
#[derive(Clone, Debug, Display, From, JsCaused, PartialEq)]
#[js(error = "platform::Error")]
pub enum SessionError {
    /// Occurs if capture devices could not be acquired.
    #[display(fmt = "Failed to acquire capture devices: {}", _0)]
    CouldNotGetMedia(#[js(cause)] MediaDevicesError),

    /// Occurs if the [`SessionManager`] was dropped while acquiring.
    #[display(fmt = "SessionManager is in detached state")]
    #[from(ignore)]
    Detached,
}

/// Token revoking publication of a pending capture request.
///
/// Clones share the revocation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    /// Creates a new live [`CancellationToken`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes this [`CancellationToken`] and all its clones.
    #[inline]
    pub fn revoke(&self) {
        self.0.set(true);
    }

    /// Indicates whether this [`CancellationToken`] was revoked.
    #[inline]
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.0.get()
    }
}

/// Tracks acquired by a single capture request.
///
/// Stops all its tracks once released or dropped.
pub struct CaptureSession<T: MediaTrack> {
    /// Number of this [`CaptureSession`] within its [`SessionManager`].
    id: u64,

    /// Tracks owned by this [`CaptureSession`].
    tracks: Vec<T>,

    /// Whether the tracks were already stopped.
    released: Cell<bool>,
}

impl<T: MediaTrack> CaptureSession<T> {
    /// Creates a new [`CaptureSession`] owning the provided `tracks`.
    #[must_use]
    pub fn new(id: u64, tracks: Vec<T>) -> Self {
        Self {
            id,
            tracks,
            released: Cell::new(false),
        }
    }

    /// Returns number of this [`CaptureSession`].
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns all the tracks owned by this [`CaptureSession`].
    #[inline]
    #[must_use]
    pub fn tracks(&self) -> &[T] {
        &self.tracks
    }

    /// Iterates over the video tracks of this [`CaptureSession`].
    pub fn video_tracks(&self) -> impl Iterator<Item = &T> {
        self.tracks
            .iter()
            .filter(|track| track.kind() == MediaKind::Video)
    }

    /// Stops every track of this [`CaptureSession`].
    ///
    /// Tracks are stopped only once, no matter how many times this is called.
    pub fn release(&self) {
        if self.released.replace(true) {
            return;
        }
        for track in &self.tracks {
            track.stop();
        }
        log::debug!("CaptureSession #{} released", self.id);
    }

    /// Indicates whether this [`CaptureSession`] was released.
    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.get()
    }
}

impl<T: MediaTrack> Drop for CaptureSession<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: MediaTrack> PartialEq for CaptureSession<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: MediaTrack> fmt::Debug for CaptureSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .field("released", &self.released.get())
            .finish()
    }
}

/// State of a [`SessionManager`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// No capture requested.
    Disabled,

    /// Capture requested, the device is not granted yet.
    Acquiring,

    /// [`CaptureSession`] is published.
    Enabled,

    /// Last capture request failed. Capture may be requested again.
    Failed(SessionError),
}

impl SessionState {
    /// Indicates whether capture is requested in this [`SessionState`].
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Acquiring | Self::Enabled)
    }
}

/// Actual data of a [`SessionManager`].
struct InnerSessionManager<D: MediaDevices> {
    /// Devices to acquire [`CaptureSession`]s from.
    devices: Rc<D>,

    /// Kinds of media to request.
    request: CaptureRequest,

    /// Current [`SessionState`].
    state: ObservableCell<SessionState>,

    /// Published [`CaptureSession`].
    session: ObservableCell<Option<Rc<CaptureSession<D::Track>>>>,

    /// [`CancellationToken`] of the latest capture request.
    token: RefCell<Option<CancellationToken>>,

    /// Number of the last published [`CaptureSession`].
    last_session_id: Cell<u64>,
}

impl<D: MediaDevices> InnerSessionManager<D> {
    /// Publishes a new [`CaptureSession`] over the provided `tracks`.
    fn publish(&self, tracks: Vec<D::Track>) {
        let id = self.last_session_id.get() + 1;
        self.last_session_id.set(id);

        let session = Rc::new(CaptureSession::new(id, tracks));
        log::debug!("CaptureSession #{} published", id);
        if let Some(previous) = self.session.replace(Some(session)) {
            previous.release();
        }
        self.state.set(SessionState::Enabled);
    }

    /// Withdraws the published [`CaptureSession`], cancels any pending
    /// capture request and stops all the owned tracks, in this order.
    fn disable(&self) {
        let session = self.session.replace(None);
        if let Some(token) = self.token.borrow_mut().take() {
            token.revoke();
        }
        self.state.set(SessionState::Disabled);
        if let Some(session) = session {
            session.release();
        }
    }
}

/// Capture request started by [`SessionManager::set_enabled`].
///
/// Disables its [`SessionManager`] if dropped before the request resolves,
/// unless the request was cancelled already.
struct PendingRequest<D: MediaDevices> {
    /// [`SessionManager`] the request was started by.
    inner: Weak<InnerSessionManager<D>>,

    /// [`CancellationToken`] of the request.
    token: CancellationToken,

    /// Whether the request resolved.
    settled: bool,
}

impl<D: MediaDevices> Drop for PendingRequest<D> {
    fn drop(&mut self) {
        if self.settled || self.token.is_revoked() {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            log::debug!("Capture request abandoned");
            inner.disable();
        }
    }
}

impl<D: MediaDevices> Drop for InnerSessionManager<D> {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Manager that is responsible for [`CaptureSession`] acquisition and
/// release.
///
/// At most one [`CaptureSession`] is live at a time.
pub struct SessionManager<D: MediaDevices>(Rc<InnerSessionManager<D>>);

impl<D: MediaDevices + 'static> SessionManager<D> {
    /// Creates a new [`SessionManager`] in [`SessionState::Disabled`] state.
    #[must_use]
    pub fn new(devices: Rc<D>, request: CaptureRequest) -> Self {
        Self(Rc::new(InnerSessionManager {
            devices,
            request,
            state: ObservableCell::new(SessionState::Disabled),
            session: ObservableCell::new(None),
            token: RefCell::new(None),
            last_session_id: Cell::new(0),
        }))
    }

    /// Requests capture to be enabled or disabled.
    ///
    /// Disabling happens immediately: the published [`CaptureSession`] is
    /// withdrawn and its tracks are stopped before this function returns.
    ///
    /// Enabling switches to [`SessionState::Acquiring`] immediately, while the
    /// actual capture request is performed by the returned [`Future`]. The
    /// request may be cancelled by disabling before it resolves, in which case
    /// the acquired tracks are stopped and never published. Enabling while
    /// already acquiring or enabled does nothing.
    ///
    /// # Errors
    ///
    /// With [`SessionError::CouldNotGetMedia`] if the capture request failed.
    /// [`SessionState::Failed`] is set in this case.
    ///
    /// [`Future`]: std::future::Future
    pub fn set_enabled(
        &self,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), Traced<SessionError>>> {
        if enabled {
            self.enable()
        } else {
            self.0.disable();
            Box::pin(future::ok(()))
        }
    }

    /// Flips the requested capture state.
    pub fn toggle(
        &self,
    ) -> LocalBoxFuture<'static, Result<(), Traced<SessionError>>> {
        self.set_enabled(!self.is_requested())
    }

    /// Starts a new capture request unless one is already running.
    fn enable(
        &self,
    ) -> LocalBoxFuture<'static, Result<(), Traced<SessionError>>> {
        if self.0.state.borrow().is_requested() {
            log::debug!("Capture is already requested");
            return Box::pin(future::ok(()));
        }

        let token = CancellationToken::new();
        if let Some(previous) = self.0.token.replace(Some(token.clone())) {
            previous.revoke();
        }
        self.0.state.set(SessionState::Acquiring);

        let devices = Rc::clone(&self.0.devices);
        let request = self.0.request;
        let mut pending = PendingRequest {
            inner: Rc::downgrade(&self.0),
            token,
            settled: false,
        };
        Box::pin(async move {
            if pending.token.is_revoked() {
                return Ok(());
            }
            let result = devices.get_user_media(request).await;
            pending.settled = true;
            Self::on_acquired(&pending.inner, &pending.token, result)
        })
    }

    /// Handles the result of a capture request issued with the provided
    /// [`CancellationToken`].
    fn on_acquired(
        inner: &Weak<InnerSessionManager<D>>,
        token: &CancellationToken,
        result: Result<Vec<D::Track>, Traced<MediaDevicesError>>,
    ) -> Result<(), Traced<SessionError>> {
        if token.is_revoked() {
            if let Ok(tracks) = result {
                log::debug!(
                    "Capture request cancelled, stopping {} acquired tracks",
                    tracks.len(),
                );
                for track in &tracks {
                    track.stop();
                }
            }
            return Ok(());
        }

        let inner = match inner.upgrade() {
            Some(inner) => inner,
            None => {
                if let Ok(tracks) = &result {
                    for track in tracks {
                        track.stop();
                    }
                }
                return Err(tracerr::new!(SessionError::Detached));
            }
        };

        match result.map_err(tracerr::map_from_and_wrap!(=> SessionError)) {
            Ok(tracks) => {
                inner.publish(tracks);
                Ok(())
            }
            Err(err) => {
                log::error!("{}\n{}", err.as_ref(), err.trace());
                let _ = inner.token.borrow_mut().take();
                inner.state.set(SessionState::Failed(err.as_ref().clone()));
                Err(err)
            }
        }
    }

    /// Disables capture. Idempotent.
    ///
    /// Invoked on unmount of the page.
    #[inline]
    pub fn dispose(&self) {
        self.0.disable();
    }

    /// Returns current [`SessionState`].
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.0.state.get()
    }

    /// Indicates whether capture is currently requested.
    #[inline]
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.state.borrow().is_requested()
    }

    /// Returns the published [`CaptureSession`], if any.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<Rc<CaptureSession<D::Track>>> {
        self.0.session.get()
    }

    /// Subscribes to the [`SessionState`] changes.
    #[inline]
    pub fn subscribe_state(&self) -> LocalBoxStream<'static, SessionState> {
        self.0.state.subscribe()
    }

    /// Subscribes to the published [`CaptureSession`] changes.
    #[inline]
    pub fn subscribe_session(
        &self,
    ) -> LocalBoxStream<'static, Option<Rc<CaptureSession<D::Track>>>> {
        self.0.session.subscribe()
    }
}
