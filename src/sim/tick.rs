//! Round engine
//!
//! Owns one round and the session ledger, and advances them through
//! `Idle -> Countdown -> Armed -> Running -> {Crashed | CashedOut} -> Idle`.
//! Every operation is a synchronous state transition; timing belongs to
//! whoever calls [`RoundEngine::step`] (or the individual operations).

use super::discount::Discount;
use super::risk::RiskModel;
use super::rng::{PcgSource, RandomSource};
use super::state::{GameEvent, Round, RoundPhase, SettleKind};
use crate::error::{RoundError, SettingsError};
use crate::ledger::SessionLedger;
use crate::settings::Settings;

/// Intents collected for a single step (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Bet on the current round (click "Blast Off")
    pub place_bet: bool,
    /// Lock in the current value
    pub cash_out: bool,
    /// Idle/demo mode - bet every round and cash out at this value
    pub autopilot: Option<Discount>,
}

/// Result of the intents applied during a step. `None` = not attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub bet: Option<Result<(), RoundError>>,
    pub cash_out: Option<Result<Discount, RoundError>>,
}

/// Round state machine
#[derive(Debug)]
pub struct RoundEngine<R: RandomSource = PcgSource> {
    round: Round,
    ledger: SessionLedger,
    risk: Box<dyn RiskModel>,
    rng: R,
    floor: Discount,
    cap: Discount,
    step: Discount,
    countdown_ticks: u32,
    settle_ticks: u32,
    cap_hold_ticks: u32,
    bet_skips_countdown: bool,
    spectator_rounds_crash: bool,
    rounds_started: u64,
    events: Vec<GameEvent>,
}

impl<R: RandomSource> RoundEngine<R> {
    /// Engine using the risk strategy named in `settings`
    pub fn new(settings: &Settings, rng: R) -> Result<Self, SettingsError> {
        Self::with_risk_model(settings, rng, settings.risk_strategy.build())
    }

    /// Engine with a caller-supplied risk model
    pub fn with_risk_model(
        settings: &Settings,
        rng: R,
        risk: Box<dyn RiskModel>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            round: Round::idle(settings.floor()),
            ledger: SessionLedger::new(),
            risk,
            rng,
            floor: settings.floor(),
            cap: settings.cap(),
            step: settings.step(),
            countdown_ticks: settings.countdown_ticks(),
            settle_ticks: settings.settle_ticks(),
            cap_hold_ticks: settings.cap_hold_ticks(),
            bet_skips_countdown: settings.bet_skips_countdown,
            spectator_rounds_crash: settings.spectator_rounds_crash,
            rounds_started: 0,
            events: Vec::new(),
        })
    }

    /// Replace the ledger (e.g. one seeded with a persisted high score)
    pub fn with_ledger(mut self, ledger: SessionLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn value(&self) -> Discount {
        self.round.value
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn rounds_started(&self) -> u64 {
        self.rounds_started
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a round with the configured countdown
    pub fn start(&mut self) -> Result<(), RoundError> {
        self.start_countdown(self.countdown_ticks)
    }

    /// Idle -> Countdown (or straight to Armed when `duration_ticks` is 0)
    pub fn start_countdown(&mut self, duration_ticks: u32) -> Result<(), RoundError> {
        self.require(&[RoundPhase::Idle], "start_countdown")?;
        self.begin_round(duration_ticks);
        Ok(())
    }

    /// Declare a bet on the current round. Repeated bets are no-ops.
    pub fn place_bet(&mut self) -> Result<(), RoundError> {
        self.require(&[RoundPhase::Countdown, RoundPhase::Armed], "place_bet")?;
        if self.round.bet_placed {
            return Ok(());
        }

        self.round.bet_placed = true;
        self.emit(GameEvent::BetPlaced);
        log::info!("Bet placed on round {}", self.round.id);

        if self.bet_skips_countdown {
            if self.round.phase == RoundPhase::Countdown {
                self.round.countdown_remaining = 0;
                self.set_phase(RoundPhase::Armed);
            }
            self.launch_armed();
        }
        Ok(())
    }

    /// One countdown tick; reaching zero arms the rocket
    pub fn advance_countdown(&mut self) -> Result<(), RoundError> {
        self.require(&[RoundPhase::Countdown], "advance_countdown")?;
        self.countdown_armed();
        Ok(())
    }

    /// Armed -> Running
    pub fn launch(&mut self) -> Result<(), RoundError> {
        self.require(&[RoundPhase::Armed], "launch")?;
        self.launch_armed();
        Ok(())
    }

    /// Advance the value one step and evaluate crash risk
    pub fn tick(&mut self) -> Result<(), RoundError> {
        if self.round.phase.is_terminal() {
            return Err(RoundError::AlreadyResolved);
        }
        self.require(&[RoundPhase::Running], "tick")?;
        self.tick_running();
        Ok(())
    }

    /// Lock in the current value. Returns the payout.
    pub fn cash_out(&mut self) -> Result<Discount, RoundError> {
        if !self.round.bet_placed {
            return Err(RoundError::NotBetting);
        }
        if self.round.phase.is_terminal() {
            return Err(RoundError::AlreadyResolved);
        }
        self.require(&[RoundPhase::Running], "cash_out")?;

        let payout = self.round.value;
        self.set_phase(RoundPhase::CashedOut);
        self.ledger.record_cashout(payout);
        self.round.settle_remaining = self.settle_ticks;
        self.emit(GameEvent::Settled {
            kind: SettleKind::CashedOut,
            payout,
            at: payout,
        });
        log::info!(
            "Round {} cashed out at {} (total {})",
            self.round.id,
            payout,
            self.ledger.accumulated_total()
        );
        Ok(payout)
    }

    /// One settle-delay tick after a terminal phase; at zero the round goes
    /// back to Idle and the next one starts
    pub fn advance_settle(&mut self) -> Result<(), RoundError> {
        self.require(&[RoundPhase::Crashed, RoundPhase::CashedOut], "advance_settle")?;
        self.settle_terminal();
        Ok(())
    }

    /// Apply one driver step: bet intent, phase advance, then cash-out intent.
    /// A crash on this step's tick beats a cash-out queued for the same step.
    pub fn step(&mut self, input: &TickInput) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        let autopilot_bet = input.autopilot.is_some()
            && self.round.phase.accepts_bets()
            && !self.round.bet_placed;
        if input.place_bet || autopilot_bet {
            let result = self.place_bet();
            if let Err(e) = &result {
                log::debug!("Bet rejected: {}", e);
            }
            outcome.bet = Some(result);
        }

        match self.round.phase {
            RoundPhase::Idle => self.begin_round(self.countdown_ticks),
            RoundPhase::Countdown => self.countdown_armed(),
            RoundPhase::Armed => self.launch_armed(),
            RoundPhase::Running => self.tick_running(),
            RoundPhase::Crashed | RoundPhase::CashedOut => self.settle_terminal(),
        }

        let autopilot_cash_out = input
            .autopilot
            .is_some_and(|target| self.round.can_cash_out() && self.round.value >= target);
        if input.cash_out || autopilot_cash_out {
            let result = self.cash_out();
            if let Err(e) = &result {
                log::debug!("Cash out rejected: {}", e);
            }
            outcome.cash_out = Some(result);
        }

        outcome
    }

    fn require(&self, allowed: &[RoundPhase], op: &'static str) -> Result<(), RoundError> {
        if allowed.contains(&self.round.phase) {
            Ok(())
        } else {
            Err(RoundError::InvalidPhase {
                op,
                phase: self.round.phase,
            })
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn set_phase(&mut self, phase: RoundPhase) {
        self.round.phase = phase;
        self.emit(GameEvent::PhaseChanged { phase });
    }

    fn begin_round(&mut self, countdown_ticks: u32) {
        self.rounds_started += 1;
        let crash_point = self
            .risk
            .draw_crash_point(&mut self.rng, self.floor, self.cap);
        self.round = Round::begin(self.rounds_started, self.floor, crash_point, countdown_ticks);

        log::info!(
            "Round {} started (countdown {} ticks)",
            self.round.id,
            countdown_ticks
        );
        self.emit(GameEvent::ValueChanged {
            value: self.round.value,
        });
        self.emit(GameEvent::PhaseChanged {
            phase: self.round.phase,
        });
        if self.round.phase == RoundPhase::Countdown {
            self.emit(GameEvent::CountdownTick {
                remaining: countdown_ticks,
            });
        }
    }

    fn countdown_armed(&mut self) {
        self.round.countdown_remaining = self.round.countdown_remaining.saturating_sub(1);
        self.emit(GameEvent::CountdownTick {
            remaining: self.round.countdown_remaining,
        });
        if self.round.countdown_remaining == 0 {
            self.set_phase(RoundPhase::Armed);
        }
    }

    fn launch_armed(&mut self) {
        self.set_phase(RoundPhase::Running);
        log::debug!(
            "Round {} launched ({})",
            self.round.id,
            if self.round.bet_placed { "bet" } else { "spectating" }
        );
    }

    fn tick_running(&mut self) {
        self.round.ticks_elapsed += 1;
        self.round.value = self.round.value.saturating_add(self.step).min(self.cap);
        if self.round.value == self.cap {
            self.round.ticks_at_cap += 1;
        }

        // Exempt spectator rounds skip hazard draws; a drawn crash point still applies
        let exempt = !self.round.bet_placed
            && !self.spectator_rounds_crash
            && self.round.crash_point.is_none();
        if !exempt && self.risk.evaluate(&self.round, &mut self.rng) {
            self.crash();
        } else if self.round.ticks_at_cap > self.cap_hold_ticks {
            log::debug!(
                "Round {} held at cap for {} ticks",
                self.round.id,
                self.cap_hold_ticks
            );
            self.crash();
        } else {
            self.emit(GameEvent::ValueChanged {
                value: self.round.value,
            });
        }
    }

    fn crash(&mut self) {
        self.set_phase(RoundPhase::Crashed);
        let forfeited = self.ledger.record_crash(self.round.bet_placed);
        self.round.settle_remaining = self.settle_ticks;
        self.emit(GameEvent::Settled {
            kind: SettleKind::Crashed,
            payout: Discount::ZERO,
            at: self.round.value,
        });
        log::info!(
            "Round {} crashed at {} after {} ticks (forfeited {})",
            self.round.id,
            self.round.value,
            self.round.ticks_elapsed,
            forfeited
        );
    }

    fn settle_terminal(&mut self) {
        self.round.settle_remaining = self.round.settle_remaining.saturating_sub(1);
        if self.round.settle_remaining == 0 {
            self.set_phase(RoundPhase::Idle);
            self.begin_round(self.countdown_ticks);
        }
    }
}
