//! Session winnings ledger
//!
//! Tracks the accumulated discount across rounds and the best total seen.
//! Durable storage of the high score is handled by [`crate::highscores`].

use serde::{Deserialize, Serialize};

use crate::sim::Discount;

/// Read-only view for display and persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub accumulated_total: Discount,
    pub high_score: Discount,
}

/// Accumulated winnings for one player session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionLedger {
    accumulated_total: Discount,
    high_score: Discount,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with a previously persisted high score
    pub fn with_high_score(high_score: Discount) -> Self {
        Self {
            accumulated_total: Discount::ZERO,
            high_score,
        }
    }

    /// Add a cash-out payout. Returns true if the high score was raised.
    pub fn record_cashout(&mut self, payout: Discount) -> bool {
        self.accumulated_total = self.accumulated_total.saturating_add(payout);
        if self.accumulated_total > self.high_score {
            self.high_score = self.accumulated_total;
            log::info!("New high score: {}", self.high_score);
            true
        } else {
            false
        }
    }

    /// Apply a crash. A bettor forfeits the whole accumulated total; a
    /// spectator's crash leaves the ledger untouched. Returns the forfeited amount.
    pub fn record_crash(&mut self, bet_placed: bool) -> Discount {
        if !bet_placed {
            return Discount::ZERO;
        }
        let lost = self.accumulated_total;
        self.accumulated_total = Discount::ZERO;
        lost
    }

    pub fn accumulated_total(&self) -> Discount {
        self.accumulated_total
    }

    pub fn high_score(&self) -> Discount {
        self.high_score
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            accumulated_total: self.accumulated_total,
            high_score: self.high_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cashouts_accumulate_and_raise_high_score() {
        let mut ledger = SessionLedger::new();
        assert!(ledger.record_cashout(Discount::from_hundredths(250)));
        assert!(ledger.record_cashout(Discount::from_hundredths(100)));
        assert_eq!(ledger.accumulated_total(), Discount::from_hundredths(350));
        assert_eq!(ledger.high_score(), Discount::from_hundredths(350));
    }

    #[test]
    fn test_crash_with_bet_wipes_total_but_keeps_high_score() {
        let mut ledger = SessionLedger::new();
        ledger.record_cashout(Discount::from_points(4));
        let lost = ledger.record_crash(true);
        assert_eq!(lost, Discount::from_points(4));
        assert_eq!(ledger.accumulated_total(), Discount::ZERO);
        assert_eq!(ledger.high_score(), Discount::from_points(4));

        // Rebuilding below the old best does not count as a new high score
        assert!(!ledger.record_cashout(Discount::from_points(1)));
    }

    #[test]
    fn test_crash_without_bet_is_noop() {
        let mut ledger = SessionLedger::new();
        ledger.record_cashout(Discount::from_points(3));
        let before = ledger.clone();
        assert_eq!(ledger.record_crash(false), Discount::ZERO);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_persisted_high_score_is_kept() {
        let mut ledger = SessionLedger::with_high_score(Discount::from_points(12));
        assert!(!ledger.record_cashout(Discount::from_points(2)));
        assert_eq!(ledger.snapshot().high_score, Discount::from_points(12));
    }

    proptest! {
        #[test]
        fn prop_cashout_adds_exactly(payouts in proptest::collection::vec(0u32..2000, 0..50)) {
            let mut ledger = SessionLedger::new();
            for p in payouts {
                let before = ledger.accumulated_total();
                let payout = Discount::from_hundredths(p);
                ledger.record_cashout(payout);
                prop_assert_eq!(ledger.accumulated_total(), before.saturating_add(payout));
                prop_assert!(ledger.high_score() >= ledger.accumulated_total());
            }
        }
    }
}
