//! Upkeep Core Library
//!
//! Session economy and phase-timer state machines: a currency ledger that
//! decays on a fixed schedule, a two-mark elapsed-time timer, the signal hub
//! joining them, and the save-store abstraction both persist through. All of
//! it is synchronous and clock-free; the embedding process supplies elapsed
//! time and a store implementation.

pub mod config;
pub mod error;
pub mod ledger;
pub mod phase;
pub mod schedule;
pub mod session;
pub mod signal;
pub mod store;
pub mod toggle;

pub use config::{EconomyConfig, PhaseConfig, SessionConfig};
pub use error::{CoreError, Result};
pub use ledger::{EconomyLedger, MarketEvent};
pub use phase::{PhaseTimer, TimerSnapshot};
pub use schedule::RepeatingInterval;
pub use session::{EconomySession, SessionStatus};
pub use signal::{PhaseSignal, SignalHub, Subscription};
pub use store::{keys, MemoryStore, SaveStore, SharedStore};
pub use toggle::{NamedToggle, ToggleHandle, ToggleSequence};

/// Session economy constants
pub mod constants {
    /// Balance a fresh save starts with.
    pub const INITIAL_MONEY: f64 = 1000.0;

    /// Balance removed by each decay tick.
    pub const DECAY_AMOUNT: f64 = 100.0;

    /// Seconds between decay ticks.
    pub const DECAY_INTERVAL_SECS: f64 = 600.0;

    /// Elapsed seconds at which the first phase mark fires.
    pub const FIRST_MARK_SECS: f64 = 300.0;

    /// Elapsed seconds at which the second phase mark fires and the
    /// timer stops.
    pub const SECOND_MARK_SECS: f64 = 600.0;

    /// Balance lost to a recession market event.
    pub const RECESSION_LOSS: f64 = 200.0;

    /// Balance gained from an investment-opportunity market event.
    pub const INVESTMENT_GAIN: f64 = 300.0;

    /// Real-time pause between toggle flips in a side-effect run.
    pub const FLIP_SPACING_SECS: f64 = 0.5;
}
