//! Per-activation view readiness.
//!
//! A view starts `Loading` and becomes `Ready` when its delay elapses or a
//! readiness signal arrives, whichever happens first. Losing connectivity
//! sends it back to `Loading`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::models::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessSignal {
    TimerElapsed,
    /// Connectivity restored.
    Online,
    /// Connectivity lost.
    Offline,
    /// The view's critical image finished loading.
    ImageLoaded,
}

/// Pure readiness state machine for one view activation.
#[derive(Debug, Clone)]
pub struct ViewReadiness {
    view: ViewId,
    state: ReadinessState,
    timer_armed: bool,
}

impl ViewReadiness {
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            state: ReadinessState::Loading,
            timer_armed: true,
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Whether the delay timer should be running.
    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Apply a signal. Returns true if the state changed.
    pub fn apply(&mut self, signal: ReadinessSignal, online: bool) -> bool {
        let before = self.state;
        match signal {
            ReadinessSignal::TimerElapsed => {
                self.timer_armed = false;
                self.state = ReadinessState::Ready;
            }
            ReadinessSignal::Online => self.state = ReadinessState::Ready,
            ReadinessSignal::ImageLoaded => {
                if online {
                    self.state = ReadinessState::Ready;
                }
            }
            ReadinessSignal::Offline => {
                self.state = ReadinessState::Loading;
                self.timer_armed = true;
            }
        }
        before != self.state
    }
}

/// Shared online/offline flag. Clones observe the same value.
#[derive(Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Returns true if the value changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Runs one view's readiness machine on a background task, racing the
/// delay timer against signals and connectivity changes. Dropping the
/// tracker cancels the timer and detaches the listeners.
pub struct ReadinessTracker {
    view: ViewId,
    state: watch::Receiver<ReadinessState>,
    signals: mpsc::UnboundedSender<ReadinessSignal>,
    task: JoinHandle<()>,
}

impl ReadinessTracker {
    pub fn spawn(view: ViewId, delay: Duration, connectivity: &Connectivity) -> Self {
        let (state_tx, state_rx) = watch::channel(ReadinessState::Loading);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let online = connectivity.subscribe();

        let task = tokio::spawn(run(
            ViewReadiness::new(view),
            delay,
            online,
            signal_rx,
            state_tx,
        ));

        Self {
            view,
            state: state_rx,
            signals: signal_tx,
            task,
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn state(&self) -> ReadinessState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    pub fn signal(&self, signal: ReadinessSignal) {
        // The task only stops when the tracker is dropped.
        let _ = self.signals.send(signal);
    }

    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.state.clone()
    }
}

impl Drop for ReadinessTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut readiness: ViewReadiness,
    delay: Duration,
    mut online: watch::Receiver<bool>,
    mut signals: mpsc::UnboundedReceiver<ReadinessSignal>,
    state: watch::Sender<ReadinessState>,
) {
    let timer = sleep(delay);
    tokio::pin!(timer);
    let mut connectivity_open = true;

    loop {
        let signal = tokio::select! {
            _ = &mut timer, if readiness.timer_armed() => ReadinessSignal::TimerElapsed,
            Some(signal) = signals.recv() => signal,
            changed = online.changed(), if connectivity_open => match changed {
                Ok(()) if *online.borrow_and_update() => ReadinessSignal::Online,
                Ok(()) => ReadinessSignal::Offline,
                Err(_) => {
                    connectivity_open = false;
                    continue;
                }
            },
            else => break,
        };

        let was_armed = readiness.timer_armed();
        let changed = readiness.apply(signal, *online.borrow());
        if readiness.timer_armed() && !was_armed {
            timer.as_mut().reset(Instant::now() + delay);
        }
        if changed {
            debug!(view = %readiness.view(), ?signal, state = ?readiness.state(), "Readiness changed");
            state.send_replace(readiness.state());
        }
    }
}
