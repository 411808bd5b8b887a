//! Error types for round operations and configuration

use thiserror::Error;

use crate::sim::RoundPhase;

/// Rejected round operation. Never fatal: state is unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    #[error("{op} is not allowed during {phase}")]
    InvalidPhase { op: &'static str, phase: RoundPhase },
    #[error("cash out requires a bet on this round")]
    NotBetting,
    #[error("round already resolved")]
    AlreadyResolved,
}

/// Invalid or unreadable configuration
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("tick period must be positive")]
    InvalidTickPeriod,
    #[error("value step must be positive, got {0}")]
    InvalidStep(f64),
    #[error("value floor must be non-negative, got {0}")]
    InvalidFloor(f64),
    #[error("value floor {floor} must be below cap {cap}")]
    FloorAboveCap { floor: f64, cap: f64 },
    #[error("cap hold must be positive")]
    InvalidCapHold,
    #[error("hazard bands must not increase with value")]
    HazardNotMonotonic,
    #[error("hazard probability must be within [0, 1], got {0}")]
    InvalidHazard(f64),
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
