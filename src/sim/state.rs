//! Round state and core simulation types
//!
//! A [`Round`] is only mutated by the engine in `tick.rs`; everything outside
//! the `sim` module sees it through read-only accessors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::discount::Discount;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round in progress
    Idle,
    /// Pre-round betting window is open
    Countdown,
    /// On the launch pad, betting still open
    Armed,
    /// Value is rising, cash-out available to bettors
    Running,
    /// Rocket exploded
    Crashed,
    /// Bettor locked in the value
    CashedOut,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "Idle",
            RoundPhase::Countdown => "Countdown",
            RoundPhase::Armed => "Armed",
            RoundPhase::Running => "Running",
            RoundPhase::Crashed => "Crashed",
            RoundPhase::CashedOut => "CashedOut",
        }
    }

    /// Crashed or CashedOut
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundPhase::Crashed | RoundPhase::CashedOut)
    }

    /// Phases in which a bet may still be placed
    pub fn accepts_bets(&self) -> bool {
        matches!(self, RoundPhase::Countdown | RoundPhase::Armed)
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettleKind {
    Crashed,
    CashedOut,
}

/// Events emitted for the renderer, drained after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    ValueChanged { value: Discount },
    PhaseChanged { phase: RoundPhase },
    /// Remaining countdown ticks after this advance
    CountdownTick { remaining: u32 },
    BetPlaced,
    /// `payout` is zero for a crash; `at` is the value when the round ended
    Settled {
        kind: SettleKind,
        payout: Discount,
        at: Discount,
    },
}

/// One play cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Monotonic round counter (0 before the first round)
    pub(super) id: u64,
    pub(super) value: Discount,
    pub(super) phase: RoundPhase,
    pub(super) bet_placed: bool,
    /// Only set under the predetermined-point strategy
    pub(super) crash_point: Option<Discount>,
    pub(super) ticks_elapsed: u64,
    /// Running ticks spent at the cap, including the one that reached it
    pub(super) ticks_at_cap: u32,
    pub(super) countdown_remaining: u32,
    pub(super) settle_remaining: u32,
}

impl Round {
    /// Placeholder round before anything has started
    pub fn idle(floor: Discount) -> Self {
        Self {
            id: 0,
            value: floor,
            phase: RoundPhase::Idle,
            bet_placed: false,
            crash_point: None,
            ticks_elapsed: 0,
            ticks_at_cap: 0,
            countdown_remaining: 0,
            settle_remaining: 0,
        }
    }

    /// Fresh round at the floor value
    pub(super) fn begin(
        id: u64,
        floor: Discount,
        crash_point: Option<Discount>,
        countdown_ticks: u32,
    ) -> Self {
        let phase = if countdown_ticks == 0 {
            RoundPhase::Armed
        } else {
            RoundPhase::Countdown
        };
        Self {
            id,
            value: floor,
            phase,
            bet_placed: false,
            crash_point,
            ticks_elapsed: 0,
            ticks_at_cap: 0,
            countdown_remaining: countdown_ticks,
            settle_remaining: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn value(&self) -> Discount {
        self.value
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn bet_placed(&self) -> bool {
        self.bet_placed
    }

    pub fn crash_point(&self) -> Option<Discount> {
        self.crash_point
    }

    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks_elapsed
    }

    pub fn ticks_at_cap(&self) -> u32 {
        self.ticks_at_cap
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn settle_remaining(&self) -> u32 {
        self.settle_remaining
    }

    /// Whether a cash-out would currently be accepted
    pub fn can_cash_out(&self) -> bool {
        self.phase == RoundPhase::Running && self.bet_placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_without_countdown_is_armed() {
        let round = Round::begin(1, Discount::from_points(1), None, 0);
        assert_eq!(round.phase(), RoundPhase::Armed);
        assert_eq!(round.value(), Discount::from_points(1));
        assert!(!round.bet_placed());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_string(&GameEvent::Settled {
            kind: SettleKind::CashedOut,
            payout: Discount::from_hundredths(250),
            at: Discount::from_hundredths(250),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"Settled","kind":"CashedOut","payout":2.5,"at":2.5}"#
        );
    }
}
