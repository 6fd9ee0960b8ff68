//! Repeating interval driven by accumulated elapsed time.
//!
//! The caller owns the clock: it reports elapsed seconds through
//! [`RepeatingInterval::advance`] and acts on the number of periods that
//! completed. Changing the period restarts the accumulator from zero.

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingInterval {
    period_secs: f64,
    accumulated_secs: f64,
}

impl RepeatingInterval {
    pub fn new(period_secs: f64) -> Result<Self> {
        validate_period(period_secs)?;
        Ok(Self {
            period_secs,
            accumulated_secs: 0.0,
        })
    }

    pub fn period_secs(&self) -> f64 {
        self.period_secs
    }

    /// Seconds left until the next completion, assuming steady time.
    pub fn remaining_secs(&self) -> f64 {
        self.period_secs - self.accumulated_secs
    }

    /// Feed elapsed time in and get back how many periods completed.
    ///
    /// Non-positive or non-finite deltas are ignored. A delta spanning
    /// several periods reports every completion, so slow callers never
    /// lose ticks.
    pub fn advance(&mut self, delta_secs: f64) -> u32 {
        if !(delta_secs > 0.0) || !delta_secs.is_finite() {
            return 0;
        }
        self.accumulated_secs += delta_secs;
        let completed = (self.accumulated_secs / self.period_secs).floor();
        self.accumulated_secs -= completed * self.period_secs;
        completed as u32
    }

    /// Replace the period and restart the accumulator from zero.
    pub fn set_period(&mut self, period_secs: f64) -> Result<()> {
        validate_period(period_secs)?;
        self.period_secs = period_secs;
        self.accumulated_secs = 0.0;
        Ok(())
    }

    /// Restart the accumulator without changing the period.
    pub fn restart(&mut self) {
        self.accumulated_secs = 0.0;
    }
}

fn validate_period(period_secs: f64) -> Result<()> {
    if !(period_secs > 0.0) || !period_secs.is_finite() {
        return Err(CoreError::InvalidConfig(format!(
            "interval period must be a positive number of seconds, got {}",
            period_secs
        )));
    }
    Ok(())
}
