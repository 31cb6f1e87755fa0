//! Explicit state of a constraints playground page.

use std::rc::Rc;

use futures::{future::LocalBoxFuture, stream::LocalBoxStream};
use medea_reactive::ObservableCell;
use tracerr::Traced;

use crate::{
    conf::Conf,
    controls::Commit,
    media::{
        CaptureSession, ConstraintApplicator, ConstraintKey, ConstraintSet,
        ConstraintValue, MediaDevices, SessionError, SessionManager,
        SessionState, SettingsReadout,
    },
};

/// State of a constraints playground: the requested [`ConstraintSet`], the
/// [`CaptureSession`] it's applied to and the settings negotiated by the
/// device.
pub struct Playground<D: MediaDevices> {
    /// Constraints supported by the platform, discovered once on creation.
    supported: Vec<ConstraintKey>,

    /// Requested [`ConstraintSet`].
    constraints: ObservableCell<ConstraintSet>,

    /// Owner of the [`CaptureSession`].
    sessions: SessionManager<D>,

    /// Applier of the requested [`ConstraintSet`].
    applicator: Rc<ConstraintApplicator>,
}

impl<D: MediaDevices + 'static> Playground<D> {
    /// Creates a new [`Playground`] discovering the constraints supported by
    /// the provided [`MediaDevices`].
    ///
    /// Failed discovery is not fatal: the [`Playground`] just supports no
    /// constraints.
    #[must_use]
    pub fn create(devices: Rc<D>, conf: &Conf) -> Self {
        let supported = devices.supported_constraints().unwrap_or_else(|e| {
            log::warn!(
                "Failed to discover supported constraints: {}\n{}",
                e.as_ref(),
                e.trace(),
            );
            Vec::new()
        });
        log::debug!("Supported constraints: {:?}", supported);

        Self {
            supported,
            constraints: ObservableCell::new(conf.initial_constraints()),
            sessions: SessionManager::new(devices, conf.capture_request()),
            applicator: Rc::new(ConstraintApplicator::new()),
        }
    }

    /// Returns the constraints supported by the platform.
    #[inline]
    #[must_use]
    pub fn supported(&self) -> &[ConstraintKey] {
        &self.supported
    }

    /// Returns the requested [`ConstraintSet`].
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> ConstraintSet {
        self.constraints.get()
    }

    /// Sets the requested value of the provided constraint, or removes it if
    /// the `value` is [`None`].
    pub fn update(&self, key: &ConstraintKey, value: Option<ConstraintValue>) {
        let updated = self.constraints.borrow().apply(key, value);
        self.constraints.set(updated);
    }

    /// Updates the provided constraint with the [`Commit`] of its control.
    pub fn commit(&self, key: &ConstraintKey, commit: Commit) {
        match commit {
            Commit::Unchanged => (),
            Commit::Set(value) => self.update(key, value),
        }
    }

    /// Enables or disables capture.
    ///
    /// See [`SessionManager::set_enabled`] for details.
    #[inline]
    pub fn set_enabled(
        &self,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), Traced<SessionError>>> {
        self.sessions.set_enabled(enabled)
    }

    /// Flips the requested capture state.
    #[inline]
    pub fn toggle(
        &self,
    ) -> LocalBoxFuture<'static, Result<(), Traced<SessionError>>> {
        self.sessions.toggle()
    }

    /// Returns [`SessionManager`] owning the [`CaptureSession`].
    #[inline]
    #[must_use]
    pub fn sessions(&self) -> &SessionManager<D> {
        &self.sessions
    }

    /// Returns the last published [`SettingsReadout`].
    #[inline]
    #[must_use]
    pub fn readout(&self) -> SettingsReadout {
        self.applicator.readout()
    }

    /// Subscribes to the requested [`ConstraintSet`] changes.
    #[inline]
    pub fn subscribe_constraints(
        &self,
    ) -> LocalBoxStream<'static, ConstraintSet> {
        self.constraints.subscribe()
    }

    /// Subscribes to the published [`SettingsReadout`]s.
    #[inline]
    pub fn subscribe_readout(&self) -> LocalBoxStream<'static, SettingsReadout> {
        self.applicator.subscribe()
    }

    /// Subscribes to the [`SessionState`] changes.
    #[inline]
    pub fn subscribe_state(&self) -> LocalBoxStream<'static, SessionState> {
        self.sessions.subscribe_state()
    }

    /// Subscribes to the published [`CaptureSession`] changes.
    #[inline]
    pub fn subscribe_session(
        &self,
    ) -> LocalBoxStream<'static, Option<Rc<CaptureSession<D::Track>>>> {
        self.sessions.subscribe_session()
    }

    /// Returns task applying the requested [`ConstraintSet`] to the published
    /// [`CaptureSession`] on every change of any of them.
    ///
    /// The task should be spawned by the owner of this [`Playground`].
    #[must_use]
    pub fn applicator_task(&self) -> LocalBoxFuture<'static, ()> {
        Rc::clone(&self.applicator).watch(
            self.sessions.subscribe_session(),
            self.constraints.subscribe(),
        )
    }

    /// Releases the capture devices. Idempotent.
    #[inline]
    pub fn dispose(&self) {
        self.sessions.dispose();
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod playground_spec {
    use std::{cell::RefCell, rc::Rc};

    use futures::{future, StreamExt as _};
    use tracerr::Traced;

    use crate::{
        conf::Conf,
        controls::Commit,
        media::{
            ConstraintKey, ConstraintName, ConstraintSet, ConstraintValue,
            MediaDevicesError, MediaKind, MockMediaDevices, MockMediaTrack,
            SettingValue, SessionState,
        },
        platform,
    };

    use super::Playground;

    fn width(value: u32) -> ConstraintSet {
        ConstraintSet::from_entries(vec![(
            ConstraintName::Width,
            ConstraintValue::UnsignedLong(value),
        )])
    }

    /// Returns [`MockMediaDevices`] supporting `width` and `zoom` constraints,
    /// and granting a single video track recording every applied
    /// [`ConstraintSet`] into the provided `applied` log.
    fn devices(applied: &Rc<RefCell<Vec<ConstraintSet>>>) -> MockMediaDevices {
        let mut track = MockMediaTrack::new();
        let log = Rc::clone(applied);
        track.expect_kind().return_const(MediaKind::Video);
        track.expect_stop().times(1).return_const(());
        track.expect_settings().returning_st(move || {
            vec![("width".to_owned(), SettingValue::Number(1280.0))]
                .into_iter()
                .collect()
        });
        track.expect_apply_constraints().returning_st(move |set| {
            log.borrow_mut().push(set.clone());
            Box::pin(future::ok::<_, Traced<MediaDevicesError>>(()))
        });

        let mut devices = MockMediaDevices::new();
        devices.expect_supported_constraints().returning(|| {
            Ok(vec![
                ConstraintName::Width.into(),
                ConstraintKey::Unknown("zoom".into()),
            ])
        });
        let mut track = Some(track);
        devices.expect_get_user_media().times(1).returning_st(move |_| {
            let tracks = track.take().into_iter().collect();
            Box::pin(future::ok::<_, Traced<MediaDevicesError>>(tracks))
        });
        devices
    }

    #[test]
    fn discovers_supported_constraints_once() {
        let mut devices = MockMediaDevices::new();
        devices
            .expect_supported_constraints()
            .times(1)
            .returning(|| Ok(vec![ConstraintName::FrameRate.into()]));

        let playground = Playground::create(Rc::new(devices), &Conf::default());

        assert_eq!(
            playground.supported(),
            &[ConstraintKey::Known(ConstraintName::FrameRate)],
        );
    }

    #[test]
    fn failed_discovery_supports_nothing() {
        let mut devices = MockMediaDevices::new();
        devices.expect_supported_constraints().returning(|| {
            Err(tracerr::new!(MediaDevicesError::MediaDevicesUnavailable(
                platform::Error::new("NotSupportedError", "insecure context")
            )))
        });

        let playground = Playground::create(Rc::new(devices), &Conf::default());

        assert!(playground.supported().is_empty());
        assert_eq!(playground.sessions().state(), SessionState::Disabled);
    }

    #[test]
    fn starts_with_configured_constraints() {
        let mut devices = MockMediaDevices::new();
        devices.expect_supported_constraints().returning(|| Ok(Vec::new()));
        let conf =
            Conf::parse_json(r#"{"initialConstraints": {"width": 640}}"#)
                .unwrap();

        let playground = Playground::create(Rc::new(devices), &conf);

        assert_eq!(playground.constraints(), width(640));
    }

    #[test]
    fn commits_only_changes() {
        let mut devices = MockMediaDevices::new();
        devices.expect_supported_constraints().returning(|| Ok(Vec::new()));
        let playground = Playground::create(Rc::new(devices), &Conf::default());
        let key = ConstraintKey::from(ConstraintName::Width);

        playground.commit(
            &key,
            Commit::Set(Some(ConstraintValue::UnsignedLong(640))),
        );
        playground.commit(&key, Commit::Unchanged);
        assert_eq!(playground.constraints(), width(640));

        playground.commit(&key, Commit::Set(None));
        assert!(playground.constraints().is_empty());
    }

    #[tokio::test]
    async fn applies_updates_to_enabled_session() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let applied = Rc::new(RefCell::new(Vec::new()));
                let playground = Playground::create(
                    Rc::new(devices(&applied)),
                    &Conf::default(),
                );
                let mut readouts = playground.subscribe_readout();
                assert_eq!(readouts.next().await.unwrap().revision(), 0);
                drop(tokio::task::spawn_local(playground.applicator_task()));

                playground.set_enabled(true).await.unwrap();
                let readout = readouts.next().await.unwrap();
                assert_eq!(readout.revision(), 1);
                assert_eq!(
                    readout.settings().get("width"),
                    Some(&SettingValue::Number(1280.0)),
                );

                playground.update(
                    &ConstraintName::Width.into(),
                    Some(ConstraintValue::UnsignedLong(1280)),
                );
                assert_eq!(readouts.next().await.unwrap().revision(), 2);
                assert_eq!(
                    *applied.borrow(),
                    vec![ConstraintSet::new(), width(1280)],
                );

                playground.dispose();
                assert!(readouts.next().await.unwrap().settings().is_empty());
                assert_eq!(
                    playground.sessions().state(),
                    SessionState::Disabled,
                );
            })
            .await;
    }

    #[tokio::test]
    async fn unknown_constraint_is_noop() {
        let applied = Rc::new(RefCell::new(Vec::new()));
        let playground =
            Playground::create(Rc::new(devices(&applied)), &Conf::default());
        let mut constraints = playground.subscribe_constraints();
        assert_eq!(constraints.next().await, Some(ConstraintSet::new()));

        playground.update(
            &ConstraintKey::Unknown("zoom".into()),
            Some(ConstraintValue::Double(2.0)),
        );

        assert!(playground.constraints().is_empty());
        playground.set_enabled(true).await.unwrap();
        playground.dispose();
    }
}
