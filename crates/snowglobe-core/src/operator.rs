//! Run controls for the simulation loop.
//!
//! [`RunControl`] is shared between the tick loop and whoever drives it
//! (the engine binary, a signal handler, a test). It can pause and resume
//! the loop, change the tick interval and request a clean stop without
//! touching the simulation state.
//!
//! All fields are atomics or [`Notify`] so the loop reads them without
//! locking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::config::WorldConfig;

/// Why the simulation loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks`.
    MaxTicksReached,
    /// A stop was requested.
    Stopped,
}

/// Shared control state for a running simulation.
#[derive(Debug)]
pub struct RunControl {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    tick_interval_ms: AtomicU64,
    max_ticks: u64,
    started_at: Instant,
}

impl RunControl {
    /// Create controls. A `max_ticks` of 0 runs until stopped.
    pub fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
            started_at: Instant::now(),
        }
    }

    /// Controls taken from the world section of the configuration.
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.tick_interval_ms, config.max_ticks)
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Whether the loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the loop before its next tick.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the loop and wake it.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the loop is no longer paused or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. A paused loop is woken so it can exit.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Tick speed and bounds
    // -----------------------------------------------------------------------

    /// Wall-clock pause between ticks in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the pause between ticks. Returns the previous value.
    pub fn set_tick_interval_ms(&self, ms: u64) -> u64 {
        self.tick_interval_ms.swap(ms, Ordering::AcqRel)
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `current_tick` has reached the tick limit.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Wall-clock time since the controls were created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
