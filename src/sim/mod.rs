//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Ticks are driven from outside, never by timers
//! - Seeded or scripted RNG only
//! - No rendering, audio or platform dependencies

pub mod discount;
pub mod risk;
pub mod rng;
pub mod state;
pub mod tick;

pub use discount::Discount;
pub use risk::{HazardBand, PredeterminedPoint, RiskModel, RiskStrategy, TickHazard, Tranche};
pub use rng::{PcgSource, RandomSource, ScriptedSource};
pub use state::{GameEvent, Round, RoundPhase, SettleKind};
pub use tick::{RoundEngine, StepOutcome, TickInput};
