//! Spawned tasks bound to the lifetime of their owner.

use std::{cell::RefCell, fmt::Display};

use derive_more::From;
use futures::{
    future::{self, AbortHandle},
    Future, Stream, StreamExt as _,
};
use tracerr::Traced;

use crate::{
    platform,
    utils::{JsCaused, PlaygroundError},
};

/// Wrapper around [`AbortHandle`] which aborts [`Future`] on [`Drop`].
#[derive(Debug, From)]
pub struct TaskHandle(AbortHandle);

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Storage of the tasks spawned on behalf of some owner.
///
/// Will stop all the spawned tasks on [`Drop`] or [`WatchersStore::clear`].
#[derive(Debug, Default)]
pub struct WatchersStore(RefCell<Vec<TaskHandle>>);

impl WatchersStore {
    /// Spawns the provided `task`, which will be aborted once this
    /// [`WatchersStore`] is cleared or dropped.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        let (fut, handle) = future::abortable(task);
        platform::spawn(async move {
            let _ = fut.await;
        });
        self.0.borrow_mut().push(TaskHandle::from(handle));
    }

    /// Spawns watcher for the provided [`Stream`].
    ///
    /// If watcher returns error then this error will be converted to the
    /// [`PlaygroundError`] and printed with a [`PlaygroundError::print`].
    pub fn spawn_watcher<S, V, F, E>(&self, mut rx: S, handle: F)
    where
        S: Stream<Item = V> + Unpin + 'static,
        F: Fn(V) -> Result<(), Traced<E>> + 'static,
        E: JsCaused + Display,
        E::Error: Into<js_sys::Error>,
    {
        self.spawn(async move {
            while let Some(value) = rx.next().await {
                if let Err(e) = (handle)(value) {
                    PlaygroundError::from(e).print();
                }
            }
        });
    }

    /// Aborts all the spawned tasks.
    pub fn clear(&self) {
        drop(self.0.replace(Vec::new()));
    }
}
