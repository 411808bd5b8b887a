//! Crash risk models
//!
//! Two interchangeable strategies decide when the rocket explodes:
//! - [`TickHazard`]: a per-tick crash probability that falls as the value rises
//! - [`PredeterminedPoint`]: a crash point drawn once at round start
//!
//! Both front-load risk ("early risk, later safety") and neither forces a crash
//! merely because the value reached the cap.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::discount::Discount;
use super::rng::RandomSource;
use super::state::Round;
use crate::error::SettingsError;

/// Strategy interface consulted by the engine
pub trait RiskModel: fmt::Debug {
    /// Called once when a round starts. Strategies without a fixed crash
    /// point return `None`.
    fn draw_crash_point(
        &self,
        _rng: &mut dyn RandomSource,
        _floor: Discount,
        _cap: Discount,
    ) -> Option<Discount> {
        None
    }

    /// Called once per running tick, after the value has advanced
    fn evaluate(&self, round: &Round, rng: &mut dyn RandomSource) -> bool;
}

/// Which built-in model a configuration selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskStrategy {
    #[default]
    TickHazard,
    PredeterminedPoint,
}

impl RiskStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStrategy::TickHazard => "TickHazard",
            RiskStrategy::PredeterminedPoint => "PredeterminedPoint",
        }
    }

    /// Build the default-tuned model for this strategy
    pub fn build(&self) -> Box<dyn RiskModel> {
        match self {
            RiskStrategy::TickHazard => Box::new(TickHazard::default()),
            RiskStrategy::PredeterminedPoint => Box::new(PredeterminedPoint::default()),
        }
    }
}

/// Crash probability applied from `from` upward until the next band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardBand {
    pub from: Discount,
    pub probability: f64,
}

/// Per-tick hazard as a step function of the current value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickHazard {
    bands: Vec<HazardBand>,
}

impl Default for TickHazard {
    fn default() -> Self {
        // ~80% cumulative by 5.00, ~10% across 5-10, ~2% across 10-20
        Self {
            bands: vec![
                HazardBand {
                    from: Discount::ZERO,
                    probability: 0.00402,
                },
                HazardBand {
                    from: Discount::from_points(5),
                    probability: 0.0002,
                },
                HazardBand {
                    from: Discount::from_points(10),
                    probability: 0.00002,
                },
            ],
        }
    }
}

impl TickHazard {
    /// Bands are sorted by `from`; probabilities must lie in `[0, 1]` and
    /// must not increase with value.
    pub fn new(mut bands: Vec<HazardBand>) -> Result<Self, SettingsError> {
        bands.sort_by_key(|b| b.from);
        for band in &bands {
            if !(0.0..=1.0).contains(&band.probability) {
                return Err(SettingsError::InvalidHazard(band.probability));
            }
        }
        if bands
            .windows(2)
            .any(|pair| pair[1].probability > pair[0].probability)
        {
            return Err(SettingsError::HazardNotMonotonic);
        }
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[HazardBand] {
        &self.bands
    }

    /// Per-tick crash probability at `value`. Values below the first band use
    /// the first band; an empty table never crashes.
    pub fn hazard(&self, value: Discount) -> f64 {
        self.bands
            .iter()
            .rev()
            .find(|b| b.from <= value)
            .or(self.bands.first())
            .map(|b| b.probability)
            .unwrap_or(0.0)
    }

    /// Probability that a round starting at `start` crashes on some tick
    /// before its value passes `until`, stepping by `step`
    pub fn cumulative_crash_probability(
        &self,
        start: Discount,
        until: Discount,
        step: Discount,
    ) -> f64 {
        if step.is_zero() {
            return 0.0;
        }
        let mut survival = 1.0;
        let mut value = start.saturating_add(step);
        while value <= until {
            survival *= 1.0 - self.hazard(value);
            value = value.saturating_add(step);
        }
        1.0 - survival
    }
}

impl RiskModel for TickHazard {
    fn evaluate(&self, round: &Round, rng: &mut dyn RandomSource) -> bool {
        rng.next_f64() < self.hazard(round.value())
    }
}

/// A slice of the crash-point distribution ending at `upper`
/// (`None` extends to the cap)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    pub upper: Option<Discount>,
    pub weight: f64,
}

/// Crash point drawn once per round from a tranche mixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredeterminedPoint {
    tranches: Vec<Tranche>,
    /// Pins every round's crash point (replays, fixtures)
    replay: Option<Discount>,
}

impl Default for PredeterminedPoint {
    fn default() -> Self {
        Self {
            tranches: vec![
                Tranche {
                    upper: Some(Discount::from_points(5)),
                    weight: 0.80,
                },
                Tranche {
                    upper: Some(Discount::from_points(10)),
                    weight: 0.15,
                },
                Tranche {
                    upper: None,
                    weight: 0.05,
                },
            ],
            replay: None,
        }
    }
}

impl PredeterminedPoint {
    pub fn new(tranches: Vec<Tranche>) -> Self {
        Self {
            tranches,
            replay: None,
        }
    }

    /// Model that crashes every round at exactly `point`
    pub fn fixed(point: Discount) -> Self {
        Self {
            replay: Some(point),
            ..Self::default()
        }
    }

    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }
}

/// Clamp into `(floor, cap]` so a round never starts at its crash point
fn above_floor(point: Discount, floor: Discount, cap: Discount) -> Discount {
    point
        .max(floor.saturating_add(Discount::from_hundredths(1)))
        .min(cap)
}

impl RiskModel for PredeterminedPoint {
    fn draw_crash_point(
        &self,
        rng: &mut dyn RandomSource,
        floor: Discount,
        cap: Discount,
    ) -> Option<Discount> {
        let cap = cap.max(floor);
        if let Some(point) = self.replay {
            return Some(above_floor(point, floor, cap));
        }

        let total: f64 = self.tranches.iter().map(|t| t.weight.max(0.0)).sum();
        if total <= 0.0 {
            return Some(cap);
        }

        let pick = rng.next_f64() * total;
        let position = rng.next_f64();

        let mut lower = floor;
        let mut acc = 0.0;
        for (i, tranche) in self.tranches.iter().enumerate() {
            let upper = tranche.upper.unwrap_or(cap).clamp(floor, cap);
            acc += tranche.weight.max(0.0);
            let last = i + 1 == self.tranches.len();
            if pick < acc || last {
                // Point lies in (lo, upper]
                let lo = lower.min(upper);
                let span = upper.hundredths() - lo.hundredths();
                let offset = if span == 0 {
                    0
                } else {
                    ((position * span as f64).ceil() as u32).clamp(1, span)
                };
                let point = Discount::from_hundredths(lo.hundredths() + offset);
                return Some(above_floor(point, floor, cap));
            }
            lower = upper;
        }
        Some(cap)
    }

    fn evaluate(&self, round: &Round, _rng: &mut dyn RandomSource) -> bool {
        round
            .crash_point()
            .is_some_and(|point| round.value() >= point)
    }
}
