//! Scheduling of the thank-you countdown.
//!
//! Entering the thank-you screen asks a [`Ticker`] for periodic wake-ups and
//! keeps the returned [`TickGuard`] inside the screen state. Dropping the
//! guard stops the wake-ups, so every transition away from the screen
//! cancels the timer without the renderer having to remember it.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// One wake-up of the countdown, stamped with the submission it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    pub epoch: u64,
}

/// Keeps scheduled ticks alive; dropping it cancels them.
pub struct TickGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Guard with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self::new(move || task.abort())
    }

    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for TickGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickGuard")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Source of periodic countdown wake-ups.
pub trait Ticker {
    fn start(&self, epoch: u64, period: Duration) -> TickGuard;
}

impl<T: Ticker + ?Sized> Ticker for &T {
    fn start(&self, epoch: u64, period: Duration) -> TickGuard {
        (**self).start(epoch, period)
    }
}

/// Schedules nothing; the embedder calls `tick_countdown` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTicker;

impl Ticker for ManualTicker {
    fn start(&self, _epoch: u64, _period: Duration) -> TickGuard {
        TickGuard::detached()
    }
}

/// Spawns an interval task on a tokio runtime that forwards ticks over a channel.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    handle: Handle,
    ticks: UnboundedSender<CountdownTick>,
}

impl TokioTicker {
    pub fn new(handle: Handle, ticks: UnboundedSender<CountdownTick>) -> Self {
        Self { handle, ticks }
    }
}

impl Ticker for TokioTicker {
    fn start(&self, epoch: u64, period: Duration) -> TickGuard {
        let ticks = self.ticks.clone();
        let task = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(CountdownTick { epoch }).is_err() {
                    debug!(epoch, "countdown receiver dropped");
                    break;
                }
            }
        });
        TickGuard::from_task(task)
    }
}
