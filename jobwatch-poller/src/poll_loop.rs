//! Poll loop
//!
//! The state machine behind every poller. It runs as a single tokio task
//! that owns the timer, the retry counter and the observable state; the
//! [`Poller`](crate::Poller) handle only sends it commands.
//!
//! States: idle (optionally with a tick armed) and polling (one fetch in
//! flight). A fetch runs in its own task so that tearing the loop down never
//! cancels a request mid-way; its result is simply never applied.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use jobwatch_core::domain::polling::PollingState;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::options::{MIN_BASE_INTERVAL, PollerOptions};
use crate::retry::RetryPolicy;
use crate::store::PauseStore;
use crate::target::{FetchError, PollTarget};

/// Callback invoked with every freshly fetched snapshot
pub type UpdateCallback<S> = Box<dyn Fn(&S) + Send + 'static>;

type Ack = oneshot::Sender<()>;

/// Requests sent by the control surface
pub(crate) enum Command<S> {
    Start(Ack),
    Stop(Ack),
    Pause(Ack),
    Resume(Ack),
    /// Acknowledged once the resulting fetch has been applied
    ForceUpdate(Ack),
    SetOnUpdate(Option<UpdateCallback<S>>),
    Shutdown,
}

enum Event<S> {
    Command(Option<Command<S>>),
    Fetched(Result<S, FetchError>),
    Tick,
}

pub(crate) struct PollLoop<T: PollTarget> {
    target: Arc<T>,
    options: PollerOptions,
    retry: RetryPolicy,
    pause_store: Option<PauseStore>,
    on_update: Option<UpdateCallback<T::Snapshot>>,
    state: watch::Sender<PollingState>,
    snapshot: watch::Sender<Option<T::Snapshot>>,
    torn_down: Arc<AtomicBool>,
    /// Set by `start`, cleared by `stop`; timers are only armed while set
    started: bool,
    paused: bool,
    next_tick: Option<Instant>,
    in_flight: Option<JoinHandle<Result<T::Snapshot, FetchError>>>,
    /// Force-update callers waiting for the in-flight fetch
    waiters: Vec<Ack>,
}

impl<T: PollTarget> PollLoop<T> {
    pub(crate) fn new(
        target: T,
        mut options: PollerOptions,
        pause_store: Option<PauseStore>,
        on_update: Option<UpdateCallback<T::Snapshot>>,
        torn_down: Arc<AtomicBool>,
    ) -> Self {
        if options.base_interval < MIN_BASE_INTERVAL {
            warn!(
                "Base interval {:?} for {} is below {:?}, using the minimum",
                options.base_interval,
                target.label(),
                MIN_BASE_INTERVAL
            );
            options.base_interval = MIN_BASE_INTERVAL;
        }

        let paused = match (&pause_store, &options.persist_key) {
            (Some(store), Some(key)) => store.load(key),
            _ => false,
        };

        let (state, _) = watch::channel(PollingState {
            is_paused: paused,
            ..PollingState::default()
        });
        let (snapshot, _) = watch::channel(None);

        Self {
            target: Arc::new(target),
            retry: RetryPolicy::new(options.max_retries),
            options,
            pause_store,
            on_update,
            state,
            snapshot,
            torn_down,
            started: false,
            paused,
            next_tick: None,
            in_flight: None,
            waiters: Vec::new(),
        }
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<PollingState> {
        self.state.subscribe()
    }

    pub(crate) fn subscribe_snapshot(&self) -> watch::Receiver<Option<T::Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Drives the loop until shutdown, teardown or every handle is dropped
    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command<T::Snapshot>>) {
        if self.options.auto_start {
            self.start();
        }

        loop {
            // No tick may fire while a fetch is in flight
            let tick_at = if self.in_flight.is_some() {
                None
            } else {
                self.next_tick
            };

            let event = tokio::select! {
                biased;
                command = commands.recv() => Event::Command(command),
                result = wait_for_fetch(&mut self.in_flight) => Event::Fetched(result),
                () = wait_for_tick(tick_at) => Event::Tick,
            };

            if self.is_torn_down() {
                break;
            }

            match event {
                Event::Command(None) | Event::Command(Some(Command::Shutdown)) => break,
                Event::Command(Some(command)) => self.handle_command(command),
                Event::Fetched(result) => self.finish_fetch(result),
                Event::Tick => {
                    self.next_tick = None;
                    self.tick();
                }
            }
        }

        debug!("Poller for {} torn down", self.target.label());
    }

    fn handle_command(&mut self, command: Command<T::Snapshot>) {
        match command {
            Command::Start(ack) => {
                self.start();
                let _ = ack.send(());
            }
            Command::Stop(ack) => {
                self.stop();
                let _ = ack.send(());
            }
            Command::Pause(ack) => {
                self.pause();
                let _ = ack.send(());
            }
            Command::Resume(ack) => {
                self.resume();
                let _ = ack.send(());
            }
            Command::ForceUpdate(ack) => self.force_update(ack),
            Command::SetOnUpdate(callback) => self.on_update = callback,
            Command::Shutdown => {}
        }
    }

    fn start(&mut self) {
        if self.paused {
            self.publish(|state| state.is_paused = true);
            debug!("Poller for {} is paused, not starting", self.target.label());
            return;
        }

        self.started = true;
        if self.in_flight.is_some() {
            // A fetch forced while paused did not count as polling
            self.publish(|state| state.is_polling = true);
            return;
        }
        if self.next_tick.is_some() {
            return;
        }

        info!(
            "Starting poller for {} (interval: {:?})",
            self.target.label(),
            self.options.base_interval
        );
        self.begin_fetch();
    }

    fn stop(&mut self) {
        self.started = false;
        self.next_tick = None;
        self.publish(|state| state.is_polling = false);
    }

    fn pause(&mut self) {
        self.paused = true;
        self.stop();
        self.publish(|state| state.is_paused = true);
        self.persist_pause(true);
        info!("Paused poller for {}", self.target.label());
    }

    fn resume(&mut self) {
        self.paused = false;
        self.publish(|state| state.is_paused = false);
        self.persist_pause(false);
        info!("Resumed poller for {}", self.target.label());
        self.start();
    }

    fn force_update(&mut self, ack: Ack) {
        self.waiters.push(ack);
        if self.in_flight.is_none() {
            debug!("Forced refresh of {}", self.target.label());
            self.begin_fetch();
        }
    }

    fn tick(&mut self) {
        if self.paused || !self.started || self.in_flight.is_some() {
            return;
        }
        self.begin_fetch();
    }

    fn begin_fetch(&mut self) {
        debug!("Polling {}", self.target.label());

        let target = Arc::clone(&self.target);
        self.in_flight = Some(tokio::spawn(async move { target.fetch().await }));

        let paused = self.paused;
        self.publish(|state| state.is_polling = !paused);
    }

    fn finish_fetch(&mut self, result: Result<T::Snapshot, FetchError>) {
        self.in_flight = None;
        // The handle may have been dropped from another worker since the
        // event was received
        if self.is_torn_down() {
            self.waiters.clear();
            return;
        }
        let base = self.options.base_interval;

        let next_delay = match result {
            Ok(snapshot) => {
                let delay = self.target.next_interval(&snapshot, base);
                self.publish(|state| {
                    state.is_polling = false;
                    state.retry_count = 0;
                    state.last_update = Some(Utc::now());
                    state.error = None;
                });
                self.snapshot.send_replace(Some(snapshot.clone()));
                if let Some(on_update) = &self.on_update {
                    if !self.is_torn_down() {
                        on_update(&snapshot);
                    }
                }
                delay
            }
            Err(err) => {
                let previous = self.state.borrow().retry_count;
                let decision = self.retry.on_failure(previous, base);
                if decision.retry_count == 0 {
                    warn!(
                        "Polling {} failed: {} (retries exhausted, back to regular interval)",
                        self.target.label(),
                        err
                    );
                } else {
                    warn!(
                        "Polling {} failed (attempt {}/{}): {}",
                        self.target.label(),
                        decision.retry_count,
                        self.retry.max_retries(),
                        err
                    );
                }
                self.publish(|state| {
                    state.is_polling = false;
                    state.retry_count = decision.retry_count;
                    state.error = Some(err.to_string());
                });
                Some(decision.delay)
            }
        };

        self.arm(next_delay);

        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(());
        }
    }

    /// Arms the timer unless stopped, paused or already armed
    fn arm(&mut self, delay: Option<Duration>) {
        if !self.started || self.paused || self.next_tick.is_some() {
            return;
        }

        match delay {
            Some(delay) => {
                debug!("Next poll of {} in {:?}", self.target.label(), delay);
                self.next_tick = Some(Instant::now() + delay);
            }
            None => info!(
                "{} reached a terminal status, polling stopped",
                self.target.label()
            ),
        }
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    fn persist_pause(&self, paused: bool) {
        if let (Some(store), Some(key)) = (&self.pause_store, &self.options.persist_key) {
            store.save(key, paused);
        }
    }

    fn publish(&self, update: impl FnOnce(&mut PollingState)) {
        self.state.send_modify(update);
    }
}

async fn wait_for_fetch<S>(
    in_flight: &mut Option<JoinHandle<Result<S, FetchError>>>,
) -> Result<S, FetchError> {
    match in_flight {
        Some(handle) => match handle.await {
            Ok(result) => result,
            Err(e) => Err(FetchError::Transport(format!("fetch task failed: {}", e))),
        },
        None => std::future::pending().await,
    }
}

async fn wait_for_tick(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
