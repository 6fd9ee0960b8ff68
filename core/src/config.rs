//! Session configuration

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{CoreError, Result};

/// Ledger settings: starting balance and decay schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance a fresh save starts with.
    pub initial_money: f64,
    /// Balance removed by each decay tick.
    pub decay_amount: f64,
    /// Seconds between decay ticks.
    pub decay_interval_secs: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_money: constants::INITIAL_MONEY,
            decay_amount: constants::DECAY_AMOUNT,
            decay_interval_secs: constants::DECAY_INTERVAL_SECS,
        }
    }
}

impl EconomyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.initial_money.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "initial money must be a finite number, got {}",
                self.initial_money
            )));
        }
        if !self.decay_amount.is_finite() || self.decay_amount < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "decay amount must be a non-negative number, got {}",
                self.decay_amount
            )));
        }
        if !(self.decay_interval_secs > 0.0) || !self.decay_interval_secs.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "decay interval must be a positive number of seconds, got {}",
                self.decay_interval_secs
            )));
        }
        Ok(())
    }
}

/// Phase timer settings: where the two marks sit on the elapsed clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Elapsed seconds at which the first mark fires.
    pub first_mark_secs: f64,
    /// Elapsed seconds at which the second mark fires and the timer stops.
    pub second_mark_secs: f64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            first_mark_secs: constants::FIRST_MARK_SECS,
            second_mark_secs: constants::SECOND_MARK_SECS,
        }
    }
}

impl PhaseConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.first_mark_secs > 0.0) || !self.first_mark_secs.is_finite() {
            return Err(CoreError::InvalidConfig(format!(
                "first mark must be a positive number of seconds, got {}",
                self.first_mark_secs
            )));
        }
        if !self.second_mark_secs.is_finite() || self.second_mark_secs <= self.first_mark_secs {
            return Err(CoreError::InvalidConfig(format!(
                "second mark ({}) must come after the first mark ({})",
                self.second_mark_secs, self.first_mark_secs
            )));
        }
        Ok(())
    }
}

/// Everything a session needs besides its store and toggle handles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub economy: EconomyConfig,
    pub timer: PhaseConfig,
    /// Fixed seed for the market-event draw; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}
