//! Game settings
//!
//! Timing, value range and risk strategy. JSON field names are camelCase so
//! the browser side can hand over a plain object. Persisted in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sim::{Discount, RiskStrategy};

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Timing ===
    /// Driver cadence for one simulation tick
    pub tick_period_ms: u32,
    /// Pre-round betting window (0 = launch immediately)
    pub countdown_seconds: u32,
    /// Pause after a crash or cash-out before the next round
    pub settle_delay_ms: u32,

    // === Value range ===
    /// Value added per running tick
    pub value_step: f64,
    /// Value every round starts from
    pub value_floor: f64,
    /// Highest reachable value
    pub value_cap: f64,
    /// Longest a round may hold at the cap before it crashes
    pub cap_hold_ms: u32,

    // === Risk ===
    pub risk_strategy: RiskStrategy,
    /// A bet during the countdown launches the rocket at once
    pub bet_skips_countdown: bool,
    /// Rounds nobody bet on can still crash
    pub spectator_rounds_crash: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_period_ms: crate::consts::TICK_PERIOD_MS,
            countdown_seconds: 5,
            settle_delay_ms: 2000,

            value_step: 0.01,
            value_floor: 0.0,
            value_cap: 20.0,
            cap_hold_ms: 10_000,

            risk_strategy: RiskStrategy::TickHazard,
            bet_skips_countdown: true,
            spectator_rounds_crash: true,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tick_period_ms == 0 {
            return Err(SettingsError::InvalidTickPeriod);
        }
        if !self.value_step.is_finite() || self.step().is_zero() {
            return Err(SettingsError::InvalidStep(self.value_step));
        }
        if !self.value_floor.is_finite() || self.value_floor < 0.0 {
            return Err(SettingsError::InvalidFloor(self.value_floor));
        }
        if !self.value_cap.is_finite() || self.floor() >= self.cap() {
            return Err(SettingsError::FloorAboveCap {
                floor: self.value_floor,
                cap: self.value_cap,
            });
        }
        if self.cap_hold_ms == 0 {
            return Err(SettingsError::InvalidCapHold);
        }
        Ok(())
    }

    pub fn floor(&self) -> Discount {
        Discount::from_f64(self.value_floor)
    }

    pub fn cap(&self) -> Discount {
        Discount::from_f64(self.value_cap)
    }

    pub fn step(&self) -> Discount {
        Discount::from_f64(self.value_step)
    }

    /// Countdown length in whole ticks (rounded up)
    pub fn countdown_ticks(&self) -> u32 {
        self.ms_to_ticks(self.countdown_seconds.saturating_mul(1000))
    }

    /// Settle delay in whole ticks (rounded up)
    pub fn settle_ticks(&self) -> u32 {
        self.ms_to_ticks(self.settle_delay_ms)
    }

    /// Ticks a round may spend at the cap, counting the tick that reaches it
    pub fn cap_hold_ticks(&self) -> u32 {
        self.ms_to_ticks(self.cap_hold_ms)
    }

    fn ms_to_ticks(&self, ms: u32) -> u32 {
        if self.tick_period_ms == 0 {
            return 0;
        }
        ms.div_ceil(self.tick_period_ms)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "discount_rocket_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save settings");
                } else {
                    log::info!("Settings saved");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.countdown_ticks(), 100);
        assert_eq!(settings.settle_ticks(), 40);
        assert_eq!(settings.step(), Discount::from_hundredths(1));
        assert_eq!(settings.cap(), Discount::from_points(20));
        assert_eq!(settings.cap_hold_ticks(), 200);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{"valueFloor": 1.0, "riskStrategy": "PredeterminedPoint"}"#)
                .unwrap();
        assert_eq!(settings.floor(), Discount::from_points(1));
        assert_eq!(settings.risk_strategy, RiskStrategy::PredeterminedPoint);
        assert_eq!(settings.tick_period_ms, 50);
    }

    #[test]
    fn test_ticks_round_up() {
        let settings = Settings {
            tick_period_ms: 30,
            settle_delay_ms: 100,
            ..Settings::default()
        };
        assert_eq!(settings.settle_ticks(), 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_step = Settings {
            value_step: 0.0,
            ..Settings::default()
        };
        assert!(matches!(bad_step.validate(), Err(SettingsError::InvalidStep(_))));

        let inverted = Settings {
            value_floor: 20.0,
            value_cap: 5.0,
            ..Settings::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(SettingsError::FloorAboveCap { .. })
        ));

        let zero_tick = Settings {
            tick_period_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(
            zero_tick.validate(),
            Err(SettingsError::InvalidTickPeriod)
        ));

        let no_hold = Settings {
            cap_hold_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(
            no_hold.validate(),
            Err(SettingsError::InvalidCapHold)
        ));

        assert!(matches!(
            Settings::from_json("{not json"),
            Err(SettingsError::Parse(_))
        ));
    }
}
