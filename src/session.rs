//! Session driver
//!
//! Glue between a real (or simulated) clock and the round engine: converts
//! elapsed milliseconds into fixed ticks, queues player intents until the next
//! tick, and writes the high score through a [`HighScoreStore`].

use serde::Serialize;

use crate::consts::MAX_SUBSTEPS;
use crate::error::SettingsError;
use crate::highscores::HighScoreStore;
use crate::ledger::{LedgerSnapshot, SessionLedger};
use crate::settings::Settings;
use crate::sim::{
    Discount, GameEvent, PcgSource, RandomSource, Round, RoundEngine, StepOutcome, TickInput,
};

/// Everything a renderer needs to redraw from scratch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub round: Round,
    pub ledger: LedgerSnapshot,
    pub can_cash_out: bool,
    pub rounds_started: u64,
}

/// One player's game: an engine, its clock and its high-score store
#[derive(Debug)]
pub struct Session<S: HighScoreStore, R: RandomSource = PcgSource> {
    engine: RoundEngine<R>,
    store: S,
    input: TickInput,
    tick_period_ms: f64,
    accumulator_ms: f64,
    saved_high_score: Discount,
}

impl<S: HighScoreStore> Session<S> {
    /// Session with a seeded PCG source
    pub fn new(settings: &Settings, seed: u64, store: S) -> Result<Self, SettingsError> {
        let rng = PcgSource::new(seed);
        log::info!(
            "Session initialized with seed: {} ({})",
            rng.seed(),
            settings.risk_strategy.as_str()
        );
        let engine = RoundEngine::new(settings, rng)?;
        Ok(Self::with_engine(engine, settings, store))
    }
}

impl<S: HighScoreStore, R: RandomSource> Session<S, R> {
    /// Wrap an existing engine, seeding its ledger from the store
    pub fn with_engine(engine: RoundEngine<R>, settings: &Settings, store: S) -> Self {
        let high_score = store.load_high_score();
        let engine = engine.with_ledger(SessionLedger::with_high_score(high_score));
        Self {
            engine,
            store,
            input: TickInput::default(),
            tick_period_ms: settings.tick_period_ms.max(1) as f64,
            accumulator_ms: 0.0,
            saved_high_score: high_score,
        }
    }

    pub fn engine(&self) -> &RoundEngine<R> {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bet on the next tick
    pub fn queue_bet(&mut self) {
        self.input.place_bet = true;
    }

    /// Cash out on the next tick (after that tick's crash check)
    pub fn queue_cash_out(&mut self) {
        self.input.cash_out = true;
    }

    /// Enable or disable demo mode
    pub fn set_autopilot(&mut self, target: Option<Discount>) {
        self.input.autopilot = target;
    }

    /// Advance by wall-clock time. Runs whole ticks only; a long stall is
    /// capped at `MAX_SUBSTEPS` ticks.
    pub fn update(&mut self, dt_ms: f64) -> Vec<GameEvent> {
        let max_ms = self.tick_period_ms * MAX_SUBSTEPS as f64;
        let dt_ms = if dt_ms.is_finite() { dt_ms.clamp(0.0, max_ms) } else { 0.0 };
        self.accumulator_ms += dt_ms;

        let mut substeps = 0;
        while self.accumulator_ms >= self.tick_period_ms && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator_ms -= self.tick_period_ms;
            substeps += 1;
        }

        self.engine.drain_events()
    }

    /// Run exactly one tick with the queued intents. Events stay queued until
    /// the next `update` or `drain_events`.
    pub fn step(&mut self) -> StepOutcome {
        let outcome = self.engine.step(&self.input);

        // Clear one-shot inputs after processing
        self.input.place_bet = false;
        self.input.cash_out = false;

        self.persist_high_score();
        outcome
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.engine.drain_events()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            round: self.engine.round().clone(),
            ledger: self.engine.ledger().snapshot(),
            can_cash_out: self.engine.round().can_cash_out(),
            rounds_started: self.engine.rounds_started(),
        }
    }

    fn persist_high_score(&mut self) {
        let high_score = self.engine.ledger().high_score();
        if high_score > self.saved_high_score {
            self.store.save_high_score(high_score);
            self.saved_high_score = high_score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryHighScore;
    use crate::sim::{RoundPhase, ScriptedSource};

    fn session(settings: &Settings, store: MemoryHighScore) -> Session<MemoryHighScore, ScriptedSource> {
        let engine = RoundEngine::new(settings, ScriptedSource::constant(0.999)).unwrap();
        Session::with_engine(engine, settings, store)
    }

    fn quick_settings() -> Settings {
        Settings {
            countdown_seconds: 0,
            value_floor: 1.0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_loads_high_score_from_store() {
        let session = session(&quick_settings(), MemoryHighScore::new(Discount::from_points(9)));
        assert_eq!(session.snapshot().ledger.high_score, Discount::from_points(9));
        assert_eq!(session.store().saves(), 0);
    }

    #[test]
    fn test_snapshot_counts_rounds() {
        let settings = Settings {
            settle_delay_ms: 50,
            ..quick_settings()
        };
        let mut session = session(&settings, MemoryHighScore::default());
        assert_eq!(session.snapshot().rounds_started, 0);
        session.step(); // Armed
        session.queue_bet();
        session.step(); // Running
        session.queue_cash_out();
        session.step();
        assert_eq!(session.snapshot().rounds_started, 1);
        session.step(); // settle delay elapsed, next round begins
        let snapshot = session.snapshot();
        assert_eq!(snapshot.rounds_started, 2);
        assert_eq!(snapshot.round.phase(), RoundPhase::Armed);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""roundsStarted":2"#));
    }

    #[test]
    fn test_seeded_session_is_reproducible() {
        let settings = quick_settings();
        let mut a = Session::new(&settings, 42, MemoryHighScore::default()).unwrap();
        let mut b = Session::new(&settings, 42, MemoryHighScore::default()).unwrap();
        a.set_autopilot(Some(Discount::from_hundredths(150)));
        b.set_autopilot(Some(Discount::from_hundredths(150)));
        for _ in 0..500 {
            assert_eq!(a.update(50.0), b.update(50.0));
        }
        assert_eq!(a.snapshot().ledger, b.snapshot().ledger);
    }

    #[test]
    fn test_partial_frames_accumulate() {
        let mut session = session(&quick_settings(), MemoryHighScore::default());
        assert!(session.update(20.0).is_empty());
        assert!(session.update(20.0).is_empty());
        // Third slice crosses one tick period
        let events = session.update(20.0);
        assert!(events.contains(&GameEvent::PhaseChanged {
            phase: RoundPhase::Armed
        }));
    }

    #[test]
    fn test_stall_is_capped() {
        let mut session = session(&quick_settings(), MemoryHighScore::default());
        session.update(50.0); // Armed
        session.update(50.0); // Running
        session.update(60_000.0);
        // At most MAX_SUBSTEPS ticks despite a minute-long stall
        assert_eq!(
            session.engine().round().ticks_elapsed(),
            MAX_SUBSTEPS as u64
        );
    }

    #[test]
    fn test_queued_intents_fire_once() {
        let mut session = session(&quick_settings(), MemoryHighScore::default());
        session.step(); // Armed
        session.queue_bet();
        let outcome = session.step();
        assert_eq!(outcome.bet, Some(Ok(())));
        assert_eq!(session.engine().phase(), RoundPhase::Running);

        let outcome = session.step();
        assert_eq!(outcome.bet, None);
    }

    #[test]
    fn test_new_high_score_is_saved() {
        let mut session = session(&quick_settings(), MemoryHighScore::new(Discount::from_hundredths(50)));
        session.step();
        session.queue_bet();
        session.step();
        for _ in 0..98 {
            session.step();
        }
        // Cash-out step ticks to 2.00 first
        session.queue_cash_out();
        let outcome = session.step();
        assert_eq!(outcome.cash_out, Some(Ok(Discount::from_points(2))));
        assert_eq!(session.store().load_high_score(), Discount::from_points(2));
        assert_eq!(session.store().saves(), 1);

        // A lower total does not rewrite the store
        session.step();
        assert_eq!(session.store().saves(), 1);
    }
}
