//! Currency ledger with scheduled decay and market-event payouts.
//!
//! Decay is the steady drain: every interval the balance drops by a fixed
//! amount and clamps at zero. Market events are the one-off shocks paid out
//! at the first phase mark; they apply their delta as-is, so a recession can
//! push the balance negative. Both paths persist the new balance before
//! telling watchers about it.

use std::fmt;
use std::sync::mpsc;

use rand::Rng;
use serde::Serialize;

use crate::config::EconomyConfig;
use crate::constants::{INVESTMENT_GAIN, RECESSION_LOSS};
use crate::error::Result;
use crate::schedule::RepeatingInterval;
use crate::store::{keys, SharedStore};

/// Outcome of the first-mark coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketEvent {
    Recession,
    InvestmentOpportunity,
}

impl MarketEvent {
    /// Even-odds draw between the two events.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random::<f64>() < 0.5 {
            MarketEvent::Recession
        } else {
            MarketEvent::InvestmentOpportunity
        }
    }

    /// Signed balance change this event applies.
    pub fn balance_delta(self) -> f64 {
        match self {
            MarketEvent::Recession => -RECESSION_LOSS,
            MarketEvent::InvestmentOpportunity => INVESTMENT_GAIN,
        }
    }
}

impl fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketEvent::Recession => write!(f, "recession"),
            MarketEvent::InvestmentOpportunity => write!(f, "investment opportunity"),
        }
    }
}

pub struct EconomyLedger {
    balance: f64,
    initial_money: f64,
    decay_amount: f64,
    decay_schedule: RepeatingInterval,
    store: SharedStore,
    balance_watchers: Vec<mpsc::Sender<f64>>,
}

impl EconomyLedger {
    /// Build a ledger from the store, falling back to the configured
    /// starting balance on a fresh save.
    pub fn load(config: &EconomyConfig, store: SharedStore) -> Result<Self> {
        config.validate()?;
        let balance = match store.get_f64(keys::MONEY)? {
            Some(saved) => {
                log::info!("loaded balance: {:.1}", saved);
                saved
            }
            None => {
                log::info!(
                    "no saved balance; starting with {:.1}",
                    config.initial_money
                );
                config.initial_money
            }
        };
        // the balance is written back on its first change, not at load
        Ok(Self {
            balance,
            initial_money: config.initial_money,
            decay_amount: config.decay_amount,
            decay_schedule: RepeatingInterval::new(config.decay_interval_secs)?,
            store,
            balance_watchers: Vec::new(),
        })
    }

    /// Feed elapsed time into the decay schedule, applying one decay tick
    /// per completed interval. Returns how many ticks applied.
    pub fn advance(&mut self, delta_secs: f64) -> Result<u32> {
        let due = self.decay_schedule.advance(delta_secs);
        for _ in 0..due {
            self.apply_decay_tick()?;
        }
        Ok(due)
    }

    /// Subtract one decay amount, clamping the result at zero.
    pub fn apply_decay_tick(&mut self) -> Result<f64> {
        self.balance = (self.balance - self.decay_amount).max(0.0);
        self.persist()?;
        self.notify_balance();
        log::info!("decay applied; balance now {:.1}", self.balance);
        Ok(self.balance)
    }

    /// Apply a market event's delta without any clamp.
    pub fn apply_market_event(&mut self, event: MarketEvent) -> Result<f64> {
        self.balance += event.balance_delta();
        self.persist()?;
        self.notify_balance();
        log::info!("market event ({}); balance now {:.1}", event, self.balance);
        Ok(self.balance)
    }

    /// Put the balance back to its starting value and persist it.
    pub fn reset(&mut self) -> Result<()> {
        self.balance = self.initial_money;
        self.persist()?;
        self.notify_balance();
        log::info!("balance reset to {:.1}", self.balance);
        Ok(())
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn decay_amount(&self) -> f64 {
        self.decay_amount
    }

    pub fn decay_interval_secs(&self) -> f64 {
        self.decay_schedule.period_secs()
    }

    /// Seconds until the next scheduled decay tick.
    pub fn decay_remaining_secs(&self) -> f64 {
        self.decay_schedule.remaining_secs()
    }

    pub fn set_decay_amount(&mut self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(crate::error::CoreError::InvalidConfig(format!(
                "decay amount must be a non-negative number, got {}",
                amount
            )));
        }
        self.decay_amount = amount;
        log::info!("decay amount set to {:.1}", amount);
        Ok(())
    }

    /// Change the decay interval; the schedule restarts from zero.
    pub fn set_decay_interval(&mut self, interval_secs: f64) -> Result<()> {
        self.decay_schedule.set_period(interval_secs)?;
        log::info!("decay interval set to {:.1}s; schedule restarted", interval_secs);
        Ok(())
    }

    /// Channel that receives the balance after every change.
    pub fn watch_balance(&mut self) -> mpsc::Receiver<f64> {
        let (tx, rx) = mpsc::channel();
        self.balance_watchers.push(tx);
        rx
    }

    fn notify_balance(&mut self) {
        let balance = self.balance;
        self.balance_watchers.retain(|tx| tx.send(balance).is_ok());
    }

    fn persist(&self) -> Result<()> {
        self.store.set_f64(keys::MONEY, self.balance)?;
        log::debug!("balance saved: {:.1}", self.balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn test_config() -> EconomyConfig {
        EconomyConfig {
            initial_money: 1000.0,
            decay_amount: 100.0,
            decay_interval_secs: 600.0,
        }
    }

    fn fresh_ledger(store: SharedStore) -> EconomyLedger {
        EconomyLedger::load(&test_config(), store).unwrap()
    }

    #[test]
    fn test_fresh_ledger_starts_with_initial_money() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(Arc::clone(&store));
        assert_eq!(ledger.balance(), 1000.0);
        // nothing hits the store until the balance first changes
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), None);
        ledger.apply_decay_tick().unwrap();
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), Some(900.0));
    }

    #[test]
    fn test_loads_saved_balance() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set_f64(keys::MONEY, 250.0).unwrap();
        let ledger = fresh_ledger(store);
        assert_eq!(ledger.balance(), 250.0);
    }

    #[test]
    fn test_decay_reduces_balance_by_amount() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(Arc::clone(&store));
        ledger.apply_decay_tick().unwrap();
        assert_eq!(ledger.balance(), 900.0);
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), Some(900.0));
    }

    #[test]
    fn test_decay_clamps_at_zero() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set_f64(keys::MONEY, 50.0).unwrap();
        let mut ledger = fresh_ledger(store);

        ledger.apply_decay_tick().unwrap();
        assert_eq!(ledger.balance(), 0.0);
        // repeated decay stays pinned at zero
        ledger.apply_decay_tick().unwrap();
        assert_eq!(ledger.balance(), 0.0);
    }

    #[test]
    fn test_market_event_skips_the_clamp() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set_f64(keys::MONEY, 100.0).unwrap();
        let mut ledger = fresh_ledger(Arc::clone(&store));

        ledger.apply_market_event(MarketEvent::Recession).unwrap();
        assert_eq!(ledger.balance(), -100.0);
        assert_eq!(store.get_f64(keys::MONEY).unwrap(), Some(-100.0));
    }

    #[test]
    fn test_investment_adds_gain() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);
        ledger
            .apply_market_event(MarketEvent::InvestmentOpportunity)
            .unwrap();
        assert_eq!(ledger.balance(), 1300.0);
    }

    #[test]
    fn test_reset_restores_initial_money() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);
        ledger.apply_market_event(MarketEvent::Recession).unwrap();
        ledger.reset().unwrap();
        assert_eq!(ledger.balance(), 1000.0);
    }

    #[test]
    fn test_advance_applies_scheduled_decay() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);

        assert_eq!(ledger.advance(599.0).unwrap(), 0);
        assert_eq!(ledger.balance(), 1000.0);
        assert_eq!(ledger.advance(1.0).unwrap(), 1);
        assert_eq!(ledger.balance(), 900.0);
    }

    #[test]
    fn test_large_advance_applies_every_due_tick() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);
        assert_eq!(ledger.advance(1800.0).unwrap(), 3);
        assert_eq!(ledger.balance(), 700.0);
    }

    #[test]
    fn test_interval_change_restarts_schedule() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);

        ledger.advance(550.0).unwrap();
        ledger.set_decay_interval(300.0).unwrap();
        // accumulated progress was discarded
        assert_eq!(ledger.advance(299.0).unwrap(), 0);
        assert_eq!(ledger.advance(1.0).unwrap(), 1);
        assert_eq!(ledger.balance(), 900.0);
    }

    #[test]
    fn test_rejects_invalid_decay_settings() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);
        assert!(ledger.set_decay_amount(-5.0).is_err());
        assert!(ledger.set_decay_interval(0.0).is_err());
        // failed updates leave the old settings in place
        assert_eq!(ledger.decay_amount(), 100.0);
        assert_eq!(ledger.decay_interval_secs(), 600.0);
    }

    #[test]
    fn test_balance_watchers_hear_every_change() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut ledger = fresh_ledger(store);
        let balance_rx = ledger.watch_balance();

        ledger.apply_decay_tick().unwrap();
        ledger.apply_market_event(MarketEvent::Recession).unwrap();
        ledger.reset().unwrap();

        let seen: Vec<f64> = balance_rx.try_iter().collect();
        assert_eq!(seen, vec![900.0, 700.0, 1000.0]);
    }

    #[test]
    fn test_draw_returns_both_events_over_many_rolls() {
        let mut rng = rand::rng();
        let mut saw_recession = false;
        let mut saw_investment = false;
        for _ in 0..1000 {
            match MarketEvent::draw(&mut rng) {
                MarketEvent::Recession => saw_recession = true,
                MarketEvent::InvestmentOpportunity => saw_investment = true,
            }
            if saw_recession && saw_investment {
                break;
            }
        }
        assert!(saw_recession && saw_investment);
    }
}
