//! Browser bindings
//!
//! The page owns the animation frame loop, DOM and audio. It forwards button
//! clicks as intents, calls `update` every frame and renders the returned
//! events.

use wasm_bindgen::prelude::*;

use crate::highscores::LocalStorageHighScore;
use crate::session::Session;
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Discount Rocket starting...");
}

/// Game instance exported to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    session: Session<LocalStorageHighScore>,
}

#[wasm_bindgen]
impl WebGame {
    /// `settings_json` overrides stored settings when given
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<WebGame, JsValue> {
        let settings = match settings_json {
            Some(json) => {
                let settings =
                    Settings::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?;
                settings.save();
                settings
            }
            None => Settings::load(),
        };
        let seed = js_sys::Date::now() as u64;
        let session = Session::new(&settings, seed, LocalStorageHighScore)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WebGame { session })
    }

    /// "Blast Off" button
    pub fn place_bet(&mut self) {
        self.session.queue_bet();
    }

    /// "Cash Out" button
    pub fn cash_out(&mut self) {
        self.session.queue_cash_out();
    }

    /// Demo mode: bet every round and cash out at `target` (disable with `None`)
    pub fn set_autopilot(&mut self, target: Option<f64>) {
        self.session
            .set_autopilot(target.map(crate::sim::Discount::from_f64));
    }

    /// Advance by `dt_ms` and return the emitted events as a JSON array
    pub fn update(&mut self, dt_ms: f64) -> String {
        let events = self.session.update(dt_ms);
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Event serialization failed: {}", e);
            "[]".to_string()
        })
    }

    /// Current round and ledger as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|e| {
            log::warn!("Snapshot serialization failed: {}", e);
            "{}".to_string()
        })
    }
}
