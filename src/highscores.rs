//! High score leaderboard
//!
//! Kept locally alongside the banked gold, tracks the top 20 named scores.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 20;

/// Longest name accepted on the name-entry screen
pub const MAX_NAME_LEN: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
}

/// High score table, sorted descending by score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a table from arbitrary entries, restoring order and the size bound
    pub fn from_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        // Stable sort keeps the earlier entry ahead on ties
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score (if it qualifies). Returns the 1-indexed rank achieved.
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: name.to_string(),
            score,
        };

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// First `limit` entries
    pub fn top(&self, limit: usize) -> Vec<HighScoreEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }
}

/// Normalize a typed name the way the entry field does: uppercase, bounded length
pub fn normalize_name(raw: &str) -> String {
    raw.to_uppercase().chars().take(MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_score_keeps_descending_order() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score("AAA", 100), Some(1));
        assert_eq!(scores.add_score("BBB", 300), Some(1));
        assert_eq!(scores.add_score("CCC", 200), Some(2));
        let names: Vec<_> = scores.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["BBB", "CCC", "AAA"]);
        assert_eq!(scores.top_score(), Some(300));
    }

    #[test]
    fn test_table_is_bounded() {
        let mut scores = HighScores::new();
        for i in 1..=(MAX_HIGH_SCORES as u64 + 5) {
            scores.add_score("P", i * 10);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(10));
        assert_eq!(scores.potential_rank(10_000), Some(1));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_from_entries_sorts_and_truncates() {
        let entries = (0..30)
            .map(|i| HighScoreEntry {
                name: format!("P{}", i),
                score: i,
            })
            .collect();
        let scores = HighScores::from_entries(entries);
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(29));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("maverick_the_pilot"), "MAVERICK_T");
        assert_eq!(normalize_name("ace"), "ACE");
    }
}
