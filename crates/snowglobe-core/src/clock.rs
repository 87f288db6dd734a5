//! Simulation clock.
//!
//! The clock is the single source of truth for simulated time. It counts
//! ticks and accumulates elapsed seconds at a fixed step per tick. Scheduled
//! callbacks are due against [`SimClock::elapsed`].
//!
//! Elapsed time is derived from the tick counter, never accumulated
//! independently, so long runs do not drift.

use crate::config::WorldConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid time configuration (e.g. a zero or negative tick length).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Fixed-step simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClock {
    /// Number of ticks completed.
    tick: u64,

    /// Simulated seconds per tick.
    tick_seconds: f32,
}

impl SimClock {
    /// A clock at tick 0 advancing `tick_seconds` per tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `tick_seconds` is not a
    /// positive finite number.
    pub fn new(tick_seconds: f32) -> Result<Self, ClockError> {
        if !tick_seconds.is_finite() || tick_seconds <= 0.0 {
            return Err(ClockError::InvalidConfig {
                reason: format!("tick_seconds must be positive, got {tick_seconds}"),
            });
        }
        Ok(Self {
            tick: 0,
            tick_seconds,
        })
    }

    /// A clock using the world configuration's tick length.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_config(config: &WorldConfig) -> Result<Self, ClockError> {
        Self::new(config.tick_seconds)
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Number of ticks completed.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds per tick.
    pub const fn tick_seconds(&self) -> f32 {
        self.tick_seconds
    }

    /// Simulated seconds since tick 0.
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * f64::from(self.tick_seconds)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_tick_zero() {
        let clock = SimClock::new(5.0).unwrap();
        assert_eq!(clock.tick(), 0);
        assert!(clock.elapsed().abs() < f64::EPSILON);
    }

    #[test]
    fn clock_advances() {
        let mut clock = SimClock::new(0.5).unwrap();
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert!((clock.elapsed() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_tick_length() {
        assert!(matches!(SimClock::new(0.0), Err(ClockError::InvalidConfig { .. })));
        assert!(SimClock::new(-1.0).is_err());
        assert!(SimClock::new(f32::NAN).is_err());
    }

    #[test]
    fn from_config_uses_tick_seconds() {
        let config = WorldConfig {
            tick_seconds: 2.5,
            ..WorldConfig::default()
        };
        let clock = SimClock::from_config(&config).unwrap();
        assert!((clock.tick_seconds() - 2.5).abs() < f32::EPSILON);
    }
}
