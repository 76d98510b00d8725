//! Public control surface
//!
//! [`Poller`] is the handle a view holds for as long as it is on screen.
//! Dropping it tears the poller down: the pending timer is cancelled and a
//! fetch that is still in flight completes without touching any state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jobwatch_core::domain::polling::PollingState;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::options::PollerOptions;
use crate::poll_loop::{Command, PollLoop, UpdateCallback};
use crate::store::PauseStore;
use crate::target::PollTarget;

/// Builder for a [`Poller`]
pub struct PollerBuilder<T: PollTarget> {
    target: T,
    options: PollerOptions,
    pause_store: Option<PauseStore>,
    on_update: Option<UpdateCallback<T::Snapshot>>,
}

impl<T: PollTarget> PollerBuilder<T> {
    pub fn options(mut self, options: PollerOptions) -> Self {
        self.options = options;
        self
    }

    /// Store used for the pause flag when `persist_key` is set
    pub fn pause_store(mut self, store: PauseStore) -> Self {
        self.pause_store = Some(store);
        self
    }

    pub fn on_update(mut self, callback: impl Fn(&T::Snapshot) + Send + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Spawns the poll loop on the current tokio runtime
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn(self) -> Poller<T> {
        let torn_down = Arc::new(AtomicBool::new(false));
        let poll_loop = PollLoop::new(
            self.target,
            self.options,
            self.pause_store,
            self.on_update,
            Arc::clone(&torn_down),
        );

        let state = poll_loop.subscribe_state();
        let snapshot = poll_loop.subscribe_snapshot();
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(poll_loop.run(receiver));

        Poller {
            commands,
            state,
            snapshot,
            torn_down,
            task: Some(task),
        }
    }
}

/// Handle to a running poller
///
/// All control methods are infallible: fetch failures only show up in
/// [`PollingState::error`], and calls on a poller that has already shut
/// down are no-ops.
pub struct Poller<T: PollTarget> {
    commands: mpsc::UnboundedSender<Command<T::Snapshot>>,
    state: watch::Receiver<PollingState>,
    snapshot: watch::Receiver<Option<T::Snapshot>>,
    torn_down: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<T: PollTarget> Poller<T> {
    /// Starts configuring a poller for `target`
    pub fn builder(target: T) -> PollerBuilder<T> {
        PollerBuilder {
            target,
            options: PollerOptions::default(),
            pause_store: None,
            on_update: None,
        }
    }

    /// Current polling state
    pub fn polling_state(&self) -> PollingState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every polling state change
    pub fn subscribe(&self) -> watch::Receiver<PollingState> {
        self.state.clone()
    }

    /// Latest successfully fetched snapshot
    pub fn snapshot(&self) -> Option<T::Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every successful fetch
    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<T::Snapshot>> {
        self.snapshot.clone()
    }

    /// Begins polling; no-op when already scheduled or paused
    pub async fn start(&self) {
        self.request(Command::Start).await;
    }

    /// Cancels the pending tick; an in-flight fetch still lands
    pub async fn stop(&self) {
        self.request(Command::Stop).await;
    }

    /// Stops scheduled polling and persists the pause
    ///
    /// Once this returns no network call is made until [`resume`](Self::resume)
    /// or [`force_update`](Self::force_update).
    pub async fn pause(&self) {
        self.request(Command::Pause).await;
    }

    /// Clears the pause and polls immediately
    pub async fn resume(&self) {
        self.request(Command::Resume).await;
    }

    /// Fetches once outside the schedule and waits for the result to be applied
    ///
    /// Joins the in-flight fetch instead of issuing a second request.
    pub async fn force_update(&self) {
        self.request(Command::ForceUpdate).await;
    }

    /// Replaces the update callback used for subsequent fetches
    pub fn set_on_update(&self, callback: impl Fn(&T::Snapshot) + Send + 'static) {
        let _ = self
            .commands
            .send(Command::SetOnUpdate(Some(Box::new(callback))));
    }

    /// Tears the poller down and waits for its loop to exit
    pub async fn shutdown(mut self) {
        self.torn_down.store(true, Ordering::Release);
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    async fn request(&self, command: impl FnOnce(oneshot::Sender<()>) -> Command<T::Snapshot>) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(command(ack)).is_err() {
            return;
        }
        let _ = done.await;
    }
}

impl<T: PollTarget> Drop for Poller<T> {
    fn drop(&mut self) {
        self.torn_down.store(true, Ordering::Release);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
