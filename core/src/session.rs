//! Session composition root.
//!
//! [`EconomySession`] owns the phase timer and the ledger and wires the two
//! together: at the first phase mark it draws a market event and applies the
//! payout to the ledger, inline, before the tick that crossed the mark
//! returns. Both components share one save store, injected at start.

use std::sync::{mpsc, Arc};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::ledger::{EconomyLedger, MarketEvent};
use crate::phase::{PhaseTimer, TimerSnapshot};
use crate::signal::{PhaseSignal, Subscription};
use crate::store::SharedStore;
use crate::toggle::ToggleSequence;

/// Serializable summary of everything a status consumer wants to know.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub balance: f64,
    pub decay_amount: f64,
    pub decay_interval_secs: f64,
    pub decay_remaining_secs: f64,
    pub timer: TimerSnapshot,
    pub restart_available: bool,
    pub toggle_states: Vec<bool>,
}

pub struct EconomySession {
    timer: PhaseTimer,
    ledger: Arc<Mutex<EconomyLedger>>,
    payout_subscription: Option<Subscription>,
    store: SharedStore,
}

impl EconomySession {
    /// Load both components from the store and attach the payout handler.
    pub fn start(
        config: SessionConfig,
        toggles: ToggleSequence,
        store: SharedStore,
    ) -> Result<Self> {
        let ledger = Arc::new(Mutex::new(EconomyLedger::load(
            &config.economy,
            Arc::clone(&store),
        )?));
        let mut timer = PhaseTimer::load(config.timer, toggles, Arc::clone(&store))?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let payout_subscription = Some(Self::attach_payout(&mut timer, Arc::clone(&ledger), rng));

        log::info!("session started");
        Ok(Self {
            timer,
            ledger,
            payout_subscription,
            store,
        })
    }

    fn attach_payout(
        timer: &mut PhaseTimer,
        ledger: Arc<Mutex<EconomyLedger>>,
        mut rng: StdRng,
    ) -> Subscription {
        timer.signals_mut().subscribe(move |signal| {
            if signal != PhaseSignal::FirstMark {
                return;
            }
            let event = MarketEvent::draw(&mut rng);
            if let Err(err) = ledger.lock().apply_market_event(event) {
                log::error!("market payout failed to persist: {}", err);
            }
        })
    }

    /// Advance the whole session by `delta_secs` of elapsed time.
    ///
    /// The timer ticks first, so a first-mark payout lands on the balance
    /// before the ledger's own decay schedule runs for the same delta.
    pub fn advance(&mut self, delta_secs: f64) -> Result<()> {
        self.timer.tick(delta_secs)?;
        self.ledger.lock().advance(delta_secs)?;
        Ok(())
    }

    pub fn balance(&self) -> f64 {
        self.ledger.lock().balance()
    }

    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    pub fn restart_available(&self) -> bool {
        self.timer.restart_available()
    }

    pub fn status(&self) -> SessionStatus {
        let ledger = self.ledger.lock();
        SessionStatus {
            balance: ledger.balance(),
            decay_amount: ledger.decay_amount(),
            decay_interval_secs: ledger.decay_interval_secs(),
            decay_remaining_secs: ledger.decay_remaining_secs(),
            timer: self.timer.snapshot(),
            restart_available: self.timer.restart_available(),
            toggle_states: self.timer.toggle_states(),
        }
    }

    /// Put the balance back to its starting value.
    pub fn reset_balance(&mut self) -> Result<()> {
        self.ledger.lock().reset()
    }

    /// Rewind the timer to a fresh running state; marks will fire again.
    pub fn reset_timer(&mut self) -> Result<()> {
        self.timer.reset()
    }

    /// Apply one decay tick immediately, outside the schedule.
    pub fn force_decay_tick(&mut self) -> Result<f64> {
        self.ledger.lock().apply_decay_tick()
    }

    pub fn set_decay_amount(&mut self, amount: f64) -> Result<()> {
        self.ledger.lock().set_decay_amount(amount)
    }

    pub fn set_decay_interval(&mut self, interval_secs: f64) -> Result<()> {
        self.ledger.lock().set_decay_interval(interval_secs)
    }

    /// Delete every persisted save key. In-memory state is untouched and
    /// will be written back on its next change.
    pub fn clear_save(&mut self) -> Result<()> {
        self.store.clear()?;
        log::info!("save data cleared");
        Ok(())
    }

    /// Register an external observer for phase signals.
    pub fn subscribe_signals(
        &mut self,
        handler: impl FnMut(PhaseSignal) + Send + Sync + 'static,
    ) -> Subscription {
        self.timer.signals_mut().subscribe(handler)
    }

    pub fn unsubscribe_signals(&mut self, subscription: Subscription) -> bool {
        self.timer.signals_mut().unsubscribe(subscription)
    }

    /// Channel that receives the balance after every change.
    pub fn watch_balance(&mut self) -> mpsc::Receiver<f64> {
        self.ledger.lock().watch_balance()
    }

    /// Channel that receives the elapsed time after every timer advance.
    pub fn watch_elapsed(&mut self) -> mpsc::Receiver<f64> {
        self.timer.watch_elapsed()
    }

    /// Detach the payout handler. Idempotent; call before dropping the
    /// session so the ledger hook cannot outlive it half-wired.
    pub fn close(&mut self) {
        if let Some(subscription) = self.payout_subscription.take() {
            self.timer.signals_mut().unsubscribe(subscription);
            log::info!("session closed; payout handler detached");
        }
    }
}
