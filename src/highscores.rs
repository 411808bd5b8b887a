//! High score persistence
//!
//! The ledger only tracks the best total in memory; these stores carry it
//! across page loads. The browser store keeps a two-decimal string in
//! LocalStorage.

use crate::sim::Discount;

/// Durable home for the best accumulated total
pub trait HighScoreStore {
    fn load_high_score(&self) -> Discount;
    fn save_high_score(&mut self, score: Discount);
}

/// In-process store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    score: Discount,
    saves: u32,
}

impl MemoryHighScore {
    pub fn new(score: Discount) -> Self {
        Self { score, saves: 0 }
    }

    /// How many times the score has been written
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load_high_score(&self) -> Discount {
        self.score
    }

    fn save_high_score(&mut self, score: Discount) {
        self.score = score;
        self.saves += 1;
    }
}

/// Parse a stored score; anything unreadable counts as zero
pub fn parse_score(raw: &str) -> Discount {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|v| Discount::try_from(v).ok())
        .unwrap_or(Discount::ZERO)
}

/// LocalStorage-backed store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageHighScore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageHighScore {
    const STORAGE_KEY: &'static str = "highScore";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageHighScore {
    fn load_high_score(&self) -> Discount {
        if let Some(storage) = Self::storage() {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                let score = parse_score(&raw);
                log::info!("Loaded high score {}", score);
                return score;
            }
        }
        log::info!("No high score found, starting fresh");
        Discount::ZERO
    }

    fn save_high_score(&mut self, score: Discount) {
        match Self::storage() {
            Some(storage) => {
                if storage
                    .set_item(Self::STORAGE_KEY, &score.to_string())
                    .is_err()
                {
                    log::warn!("Failed to save high score");
                } else {
                    log::info!("High score saved ({})", score);
                }
            }
            None => log::warn!("LocalStorage unavailable, high score not saved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("12.34"), Discount::from_hundredths(1234));
        assert_eq!(parse_score(" 5 "), Discount::from_points(5));
        assert_eq!(parse_score("NaN"), Discount::ZERO);
        assert_eq!(parse_score("-2.00"), Discount::ZERO);
        assert_eq!(parse_score("garbage"), Discount::ZERO);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryHighScore::default();
        assert_eq!(store.load_high_score(), Discount::ZERO);
        store.save_high_score(Discount::from_hundredths(875));
        assert_eq!(store.load_high_score(), Discount::from_hundredths(875));
        assert_eq!(store.saves(), 1);
    }
}
