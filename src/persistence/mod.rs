//! Save/load of progress that outlives a run
//!
//! Features:
//! - Banked gold stored as a plain integer string
//! - High score table stored as JSON
//! - Unreadable values fall back to defaults (logged), never abort a session

use crate::highscores::HighScores;
use crate::platform::storage::{KeyValueStore, StorageError};

/// Storage key for banked gold
pub const GOLD_KEY: &str = "riverRaidGold";
/// Storage key for the local high score table
pub const SCORES_KEY: &str = "riverRaidScores";

/// Typed persistence over a key-value store
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Banked gold, or 0 when missing or unreadable
    pub fn load_banked_gold(&self) -> u64 {
        match self.store.get(GOLD_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u64>() {
                Ok(gold) => {
                    log::info!("Loaded {} banked gold", gold);
                    gold
                }
                Err(e) => {
                    log::warn!("Banked gold {:?} unreadable ({}), starting from 0", raw, e);
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Could not load banked gold: {}", e);
                0
            }
        }
    }

    pub fn save_banked_gold(&mut self, gold: u64) -> Result<(), StorageError> {
        self.store.set(GOLD_KEY, &gold.to_string())?;
        log::debug!("Banked gold saved ({})", gold);
        Ok(())
    }

    /// Local high scores, or an empty table when missing or unreadable
    pub fn load_high_scores(&self) -> HighScores {
        match self.store.get(SCORES_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    HighScores::from_entries(scores.entries)
                }
                Err(e) => {
                    log::warn!("High scores unreadable ({}), starting fresh", e);
                    HighScores::new()
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                HighScores::new()
            }
            Err(e) => {
                log::warn!("Could not load high scores: {}", e);
                HighScores::new()
            }
        }
    }

    pub fn save_high_scores(&mut self, scores: &HighScores) -> Result<(), StorageError> {
        let json = serde_json::to_string(scores)?;
        self.store.set(SCORES_KEY, &json)?;
        log::info!("High scores saved ({} entries)", scores.entries.len());
        Ok(())
    }
}
