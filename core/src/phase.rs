//! Phase timer: the elapsed-session-time state machine.
//!
//! The timer accumulates elapsed seconds while running and crosses two marks
//! on the way. The first mark flips on a latch and fires once per session
//! run; the second stops the clock for good until someone resets it. Every
//! transition goes out through the signal hub, kicks a toggle run, and is
//! written back to the save store before the tick returns.

use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::config::PhaseConfig;
use crate::error::Result;
use crate::signal::{PhaseSignal, SignalHub};
use crate::store::{keys, SharedStore};
use crate::toggle::ToggleSequence;

/// Point-in-time view of the timer, as persisted and as reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub elapsed_secs: f64,
    pub first_mark_done: bool,
    pub running: bool,
}

pub struct PhaseTimer {
    elapsed_secs: f64,
    running: bool,
    first_mark_done: bool,
    restart_available: bool,
    config: PhaseConfig,
    signals: SignalHub,
    toggles: ToggleSequence,
    store: SharedStore,
    elapsed_watchers: Vec<mpsc::Sender<f64>>,
}

impl PhaseTimer {
    /// Build a timer from whatever the store holds.
    ///
    /// A missing save starts fresh and persists that state right away. A
    /// save claiming "stopped" before the second mark is treated as stale
    /// and resumed, so an interrupted session never sticks half-way.
    pub fn load(config: PhaseConfig, toggles: ToggleSequence, store: SharedStore) -> Result<Self> {
        config.validate()?;
        let mut timer = Self {
            elapsed_secs: 0.0,
            running: true,
            first_mark_done: false,
            restart_available: false,
            config,
            signals: SignalHub::new(),
            toggles,
            store,
            elapsed_watchers: Vec::new(),
        };
        match timer.store.get_f64(keys::TIMER)? {
            Some(saved_elapsed) => {
                timer.elapsed_secs = saved_elapsed;
                timer.first_mark_done = timer
                    .store
                    .get_bool(keys::FIRST_TOGGLE_DONE)?
                    .unwrap_or(false);
                timer.running = timer.store.get_bool(keys::TIMER_RUNNING)?.unwrap_or(true);
                if !timer.running && timer.elapsed_secs < timer.config.second_mark_secs {
                    log::warn!(
                        "saved timer stopped at {:.1}s, before the {:.0}s terminal mark; resuming",
                        timer.elapsed_secs,
                        timer.config.second_mark_secs
                    );
                    timer.running = true;
                }
                if !timer.running {
                    timer.restart_available = true;
                }
                log::info!(
                    "loaded timer state: elapsed={:.1}s first_mark_done={} running={}",
                    timer.elapsed_secs,
                    timer.first_mark_done,
                    timer.running
                );
            }
            None => {
                log::info!("no saved timer state; starting fresh");
                timer.persist()?;
            }
        }
        Ok(timer)
    }

    /// Advance the session clock by `delta_secs`.
    ///
    /// Pending toggle flips drain first and keep draining after the timer
    /// stops. Mark checks run against the new elapsed value, so one large
    /// delta can cross both marks in order within a single tick.
    pub fn tick(&mut self, delta_secs: f64) -> Result<()> {
        self.toggles.advance(delta_secs);
        if !self.running || !(delta_secs > 0.0) || !delta_secs.is_finite() {
            return Ok(());
        }
        self.elapsed_secs += delta_secs;
        self.notify_elapsed();

        if !self.first_mark_done && self.elapsed_secs >= self.config.first_mark_secs {
            self.first_mark_done = true;
            log::info!("first phase mark reached at {:.1}s", self.elapsed_secs);
            self.signals.emit(PhaseSignal::FirstMark);
            self.toggles.begin();
            self.persist()?;
        }

        if self.elapsed_secs >= self.config.second_mark_secs {
            self.running = false;
            log::info!(
                "second phase mark reached at {:.1}s; timer stopped",
                self.elapsed_secs
            );
            self.signals.emit(PhaseSignal::SecondMark);
            self.toggles.begin();
            self.restart_available = true;
            self.persist()?;
        }
        Ok(())
    }

    /// Rewind to a fresh running state and persist it. Valid from any state;
    /// both marks will fire again once re-reached.
    pub fn reset(&mut self) -> Result<()> {
        self.elapsed_secs = 0.0;
        self.first_mark_done = false;
        self.running = true;
        self.restart_available = false;
        log::info!("phase timer reset");
        self.notify_elapsed();
        self.persist()
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn first_mark_done(&self) -> bool {
        self.first_mark_done
    }

    /// True once the timer has reached its terminal state, which is when a
    /// restart makes sense to offer.
    pub fn restart_available(&self) -> bool {
        self.restart_available
    }

    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_secs: self.elapsed_secs,
            first_mark_done: self.first_mark_done,
            running: self.running,
        }
    }

    /// On/off state of every toggle handle, in registration order.
    pub fn toggle_states(&self) -> Vec<bool> {
        self.toggles.states()
    }

    pub fn signals_mut(&mut self) -> &mut SignalHub {
        &mut self.signals
    }

    /// Channel that receives the elapsed value after every advance.
    pub fn watch_elapsed(&mut self) -> mpsc::Receiver<f64> {
        let (tx, rx) = mpsc::channel();
        self.elapsed_watchers.push(tx);
        rx
    }

    fn notify_elapsed(&mut self) {
        let elapsed = self.elapsed_secs;
        self.elapsed_watchers.retain(|tx| tx.send(elapsed).is_ok());
    }

    fn persist(&self) -> Result<()> {
        self.store.set_f64(keys::TIMER, self.elapsed_secs)?;
        self.store
            .set_bool(keys::FIRST_TOGGLE_DONE, self.first_mark_done)?;
        self.store.set_bool(keys::TIMER_RUNNING, self.running)?;
        log::debug!(
            "timer state saved: elapsed={:.1}s first_mark_done={} running={}",
            self.elapsed_secs,
            self.first_mark_done,
            self.running
        );
        Ok(())
    }
}
