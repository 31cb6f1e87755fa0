//! Pushing of [`ConstraintSet`]s to the published [`CaptureSession`].

use std::{cell::Cell, rc::Rc};

use futures::{
    future::{self, LocalBoxFuture},
    stream::{self, LocalBoxStream},
    Stream, StreamExt as _,
};
use medea_reactive::ObservableCell;

use super::{
    CaptureSession, ConstraintSet, MediaTrack, NegotiatedSettings,
    SettingsReadout,
};

/// Single change observed by a [`ConstraintApplicator::watch`]er.
enum Change<T: MediaTrack> {
    /// Published [`CaptureSession`] has changed.
    Session(Option<Rc<CaptureSession<T>>>),

    /// Requested [`ConstraintSet`] has changed.
    Constraints(ConstraintSet),
}

/// Latest values seen by a [`ConstraintApplicator::watch`]er.
type Latest<T> =
    (Option<Option<Rc<CaptureSession<T>>>>, Option<ConstraintSet>);

/// Applier of the requested [`ConstraintSet`] to the video tracks of the
/// published [`CaptureSession`], which publishes the [`SettingsReadout`]
/// negotiated by the device.
#[derive(Debug)]
pub struct ConstraintApplicator {
    /// Last published [`SettingsReadout`].
    readout: ObservableCell<SettingsReadout>,

    /// Number of the last started apply.
    revision: Cell<u64>,
}

impl Default for ConstraintApplicator {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintApplicator {
    /// Creates a new [`ConstraintApplicator`] with an empty
    /// [`SettingsReadout`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            readout: ObservableCell::new(SettingsReadout::default()),
            revision: Cell::new(0),
        }
    }

    /// Returns the last published [`SettingsReadout`].
    #[inline]
    #[must_use]
    pub fn readout(&self) -> SettingsReadout {
        self.readout.get()
    }

    /// Subscribes to the published [`SettingsReadout`]s.
    #[inline]
    pub fn subscribe(&self) -> LocalBoxStream<'static, SettingsReadout> {
        self.readout.subscribe()
    }

    /// Applies the full `constraints` to every video track of the provided
    /// `session` concurrently, and publishes the settings negotiated by them
    /// afterwards.
    ///
    /// Failed applies are logged and don't prevent the settings from being
    /// read back. If there is no `session`, a previously published readout is
    /// cleared.
    ///
    /// Results of an apply are dropped if a newer apply has already published
    /// its readout, or if the `session` was released meanwhile.
    pub async fn apply<T: MediaTrack>(
        &self,
        session: Option<Rc<CaptureSession<T>>>,
        constraints: ConstraintSet,
    ) {
        let session = match session.filter(|s| !s.is_released()) {
            Some(session) => session,
            None => {
                if !self.readout.borrow().settings().is_empty() {
                    let revision = self.next_revision();
                    self.readout.set(SettingsReadout::new(
                        revision,
                        NegotiatedSettings::default(),
                    ));
                }
                return;
            }
        };

        let revision = self.next_revision();
        log::debug!(
            "Applying constraints #{} to CaptureSession #{}: {}",
            revision,
            session.id(),
            constraints.to_json(),
        );
        let results = future::join_all(
            session
                .video_tracks()
                .map(|track| track.apply_constraints(&constraints)),
        )
        .await;
        for (track, result) in session.video_tracks().zip(results) {
            if let Err(e) = result {
                log::warn!(
                    "Track `{}` rejected constraints: {}\n{}",
                    track.id(),
                    e.as_ref(),
                    e.trace(),
                );
            }
        }

        if session.is_released() {
            log::debug!("CaptureSession #{} is gone", session.id());
            return;
        }
        if self.readout.borrow().revision() > revision {
            log::debug!("Constraints #{} were superseded", revision);
            return;
        }

        let settings = session.video_tracks().fold(
            NegotiatedSettings::default(),
            |mut merged, track| {
                merged.merge(track.settings());
                merged
            },
        );
        self.readout.set(SettingsReadout::new(revision, settings));
    }

    /// Returns [`Future`] applying the latest [`ConstraintSet`] to the latest
    /// [`CaptureSession`] every time any of them changes.
    ///
    /// Applies run concurrently, so a slow apply never delays a newer one.
    /// Resolves once any of the provided [`Stream`]s ends and all the started
    /// applies are finished.
    ///
    /// [`Future`]: std::future::Future
    pub fn watch<T, S, C>(
        self: Rc<Self>,
        sessions: S,
        constraints: C,
    ) -> LocalBoxFuture<'static, ()>
    where
        T: MediaTrack + 'static,
        S: Stream<Item = Option<Rc<CaptureSession<T>>>> + 'static,
        C: Stream<Item = ConstraintSet> + 'static,
    {
        let changes = stream::select(
            sessions.map(Change::Session),
            constraints.map(Change::Constraints),
        );
        let latest = changes
            .scan((None, None), |latest: &mut Latest<T>, change| {
                match change {
                    Change::Session(session) => latest.0 = Some(session),
                    Change::Constraints(set) => latest.1 = Some(set),
                }
                let current = match latest {
                    (Some(session), Some(set)) => {
                        Some((session.clone(), set.clone()))
                    }
                    _ => None,
                };
                future::ready(Some(current))
            })
            .filter_map(future::ready);

        Box::pin(latest.for_each_concurrent(
            None,
            move |(session, constraints)| {
                let this = Rc::clone(&self);
                async move { this.apply(session, constraints).await }
            },
        ))
    }

    /// Starts a new apply returning its number.
    fn next_revision(&self) -> u64 {
        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        revision
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod constraint_applicator_spec {
    use std::{cell::RefCell, rc::Rc};

    use futures::{channel::oneshot, future, StreamExt as _};
    use medea_reactive::ObservableCell;
    use tracerr::Traced;

    use crate::{
        media::{
            CaptureSession, ConstraintName, ConstraintSet, ConstraintValue,
            MediaDevicesError, MediaKind, MockMediaTrack, NegotiatedSettings,
            SettingValue,
        },
        platform,
    };

    use super::ConstraintApplicator;

    fn settings(width: f64) -> NegotiatedSettings {
        vec![("width".to_owned(), SettingValue::Number(width))]
            .into_iter()
            .collect()
    }

    fn width(value: u32) -> ConstraintSet {
        ConstraintSet::from_entries(vec![(
            ConstraintName::Width,
            ConstraintValue::UnsignedLong(value),
        )])
    }

    /// Returns a video [`MockMediaTrack`] recording every applied
    /// [`ConstraintSet`] into the provided `applied` log.
    fn video_track(
        applied: &Rc<RefCell<Vec<ConstraintSet>>>,
        reported_width: f64,
    ) -> MockMediaTrack {
        let applied = Rc::clone(applied);
        let mut track = MockMediaTrack::new();
        track.expect_kind().return_const(MediaKind::Video);
        track.expect_stop().return_const(());
        track.expect_settings().return_const(settings(reported_width));
        track.expect_apply_constraints().returning_st(move |set| {
            applied.borrow_mut().push(set.clone());
            Box::pin(future::ok::<_, Traced<MediaDevicesError>>(()))
        });
        track
    }

    #[tokio::test]
    async fn applies_full_set_to_video_track_once() {
        let applied = Rc::new(RefCell::new(Vec::new()));
        let mut audio = MockMediaTrack::new();
        audio.expect_kind().return_const(MediaKind::Audio);
        audio.expect_stop().return_const(());
        let session = Rc::new(CaptureSession::new(
            1,
            vec![video_track(&applied, 1280.0), audio],
        ));
        let applicator = ConstraintApplicator::new();

        applicator.apply(Some(session), width(1280)).await;

        assert_eq!(*applied.borrow(), vec![width(1280)]);
        let readout = applicator.readout();
        assert_eq!(readout.revision(), 1);
        assert_eq!(readout.settings(), &settings(1280.0));
    }

    #[tokio::test]
    async fn later_tracks_override_settings() {
        let applied = Rc::new(RefCell::new(Vec::new()));
        let session = Rc::new(CaptureSession::new(
            1,
            vec![video_track(&applied, 640.0), video_track(&applied, 1920.0)],
        ));
        let applicator = ConstraintApplicator::new();

        applicator.apply(Some(session), width(1920)).await;

        assert_eq!(applied.borrow().len(), 2);
        assert_eq!(applicator.readout().settings(), &settings(1920.0));
    }

    #[tokio::test]
    async fn reads_settings_back_after_rejection() {
        let mut track = MockMediaTrack::new();
        track.expect_kind().return_const(MediaKind::Video);
        track.expect_stop().return_const(());
        track.expect_id().return_const("camera".to_owned());
        track.expect_settings().return_const(settings(640.0));
        track.expect_apply_constraints().times(1).returning_st(|_| {
            Box::pin(future::err::<(), _>(tracerr::new!(
                MediaDevicesError::ApplyConstraintsFailed(
                    platform::Error::new(
                        "OverconstrainedError",
                        "Cannot satisfy constraints",
                    )
                )
            )))
        });
        let session = Rc::new(CaptureSession::new(1, vec![track]));
        let applicator = ConstraintApplicator::new();

        applicator.apply(Some(session), width(100_000)).await;

        assert_eq!(applicator.readout().settings(), &settings(640.0));
    }

    #[tokio::test]
    async fn no_session_clears_readout() {
        let applied = Rc::new(RefCell::new(Vec::new()));
        let session =
            Rc::new(CaptureSession::new(1, vec![video_track(&applied, 640.0)]));
        let applicator = ConstraintApplicator::new();
        applicator.apply(Some(session), ConstraintSet::new()).await;

        applicator.apply::<MockMediaTrack>(None, width(640)).await;

        let readout = applicator.readout();
        assert!(readout.settings().is_empty());
        assert_eq!(readout.revision(), 2);

        applicator.apply::<MockMediaTrack>(None, width(640)).await;
        assert_eq!(applicator.readout().revision(), 2);
    }

    #[tokio::test]
    async fn skips_released_session() {
        let mut track = MockMediaTrack::new();
        track.expect_stop().times(1).return_const(());
        let session = Rc::new(CaptureSession::new(1, vec![track]));
        session.release();
        let applicator = ConstraintApplicator::new();

        applicator.apply(Some(session), width(640)).await;

        assert_eq!(applicator.readout().revision(), 0);
    }

    #[tokio::test]
    async fn newer_apply_wins() {
        let (slow_tx, slow_rx) = oneshot::channel();
        let mut slow_rx = Some(slow_rx);
        let mut track = MockMediaTrack::new();
        track.expect_kind().return_const(MediaKind::Video);
        track.expect_stop().return_const(());
        track.expect_settings().return_const(settings(1280.0));
        track.expect_apply_constraints().times(2).returning_st(move |_| {
            match slow_rx.take() {
                Some(rx) => Box::pin(async move {
                    rx.await.unwrap();
                    Ok::<_, Traced<MediaDevicesError>>(())
                }),
                None => Box::pin(future::ok(())),
            }
        });
        let session = Rc::new(CaptureSession::new(1, vec![track]));
        let applicator = ConstraintApplicator::new();

        let slow = applicator.apply(Some(Rc::clone(&session)), width(640));
        let fast = async {
            applicator.apply(Some(Rc::clone(&session)), width(1280)).await;
            slow_tx.send(()).unwrap();
        };
        let ((), ()) = future::join(slow, fast).await;

        assert_eq!(applicator.readout().revision(), 2);
    }

    #[tokio::test]
    async fn reapplies_on_every_change() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let applied = Rc::new(RefCell::new(Vec::new()));
                let constraints = ObservableCell::new(ConstraintSet::new());
                let sessions = ObservableCell::new(None);
                let applicator = Rc::new(ConstraintApplicator::new());
                let mut readouts = applicator.subscribe();
                assert_eq!(readouts.next().await.unwrap().revision(), 0);

                drop(tokio::task::spawn_local(Rc::clone(&applicator).watch(
                    sessions.subscribe(),
                    constraints.subscribe(),
                )));

                sessions.set(Some(Rc::new(CaptureSession::new(
                    1,
                    vec![video_track(&applied, 1280.0)],
                ))));
                let readout = readouts.next().await.unwrap();
                assert_eq!(readout.revision(), 1);
                assert_eq!(readout.settings(), &settings(1280.0));

                constraints.set(width(1280));
                let readout = readouts.next().await.unwrap();
                assert_eq!(readout.revision(), 2);
                assert_eq!(readout.settings(), &settings(1280.0));

                assert_eq!(
                    *applied.borrow(),
                    vec![ConstraintSet::new(), width(1280)],
                );

                sessions.set(None);
                let readout = readouts.next().await.unwrap();
                assert!(readout.settings().is_empty());
            })
            .await;
    }
}
