//! Discount Rocket - a crash-style discount mini-game
//!
//! Core modules:
//! - `sim`: Deterministic round engine (state machine, risk models, RNG)
//! - `ledger`: Accumulated winnings and high score for a session
//! - `session`: Fixed-timestep driver and persistence glue
//! - `highscores`: High score storage (LocalStorage on web)
//! - `settings`: Timing, value range and risk configuration
//! - `web`: Browser bindings (wasm32 only)

pub mod error;
pub mod highscores;
pub mod ledger;
pub mod session;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{RoundError, SettingsError};
pub use highscores::{HighScoreStore, MemoryHighScore};
pub use ledger::{LedgerSnapshot, SessionLedger};
pub use session::{Session, SessionSnapshot};
pub use settings::Settings;
pub use sim::{Discount, GameEvent, RoundEngine, RoundPhase, RiskStrategy};

/// Game configuration constants
pub mod consts {
    /// Default driver cadence (20 Hz)
    pub const TICK_PERIOD_MS: u32 = 50;
    /// Maximum ticks per update to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
