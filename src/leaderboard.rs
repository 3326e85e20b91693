//! Leaderboard service contract and name-entry state
//!
//! The remote leaderboard is an external collaborator. The session only
//! knows the `LeaderboardService` trait; failures are logged and shown as a
//! status line, they never reach the simulation.

use std::fmt;

use serde::Serialize;

use crate::highscores::{HighScoreEntry, HighScores};

/// How many entries the leaderboard screen shows
pub const LEADERBOARD_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// No backend configured
    NotConfigured,
    /// Submitted without a name
    EmptyName,
    /// Backend refused the entry
    Rejected(String),
    /// Network or transport failure
    Transport(String),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::NotConfigured => write!(f, "leaderboard not configured"),
            LeaderboardError::EmptyName => write!(f, "name is empty"),
            LeaderboardError::Rejected(msg) => write!(f, "leaderboard rejected entry: {}", msg),
            LeaderboardError::Transport(msg) => write!(f, "leaderboard unreachable: {}", msg),
        }
    }
}

impl std::error::Error for LeaderboardError {}

/// Remote (or local) score board
pub trait LeaderboardService {
    fn submit_score(&mut self, name: &str, score: u64) -> Result<(), LeaderboardError>;

    /// Top entries, descending by score
    fn fetch_top_scores(&mut self, limit: usize) -> Result<Vec<HighScoreEntry>, LeaderboardError>;
}

/// In-process leaderboard backed by a high score table
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard {
    scores: HighScores,
}

impl LocalLeaderboard {
    pub fn new(scores: HighScores) -> Self {
        Self { scores }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl LeaderboardService for LocalLeaderboard {
    fn submit_score(&mut self, name: &str, score: u64) -> Result<(), LeaderboardError> {
        if name.trim().is_empty() {
            return Err(LeaderboardError::EmptyName);
        }
        if self.scores.add_score(name, score).is_none() {
            log::debug!("Score {} by {} did not make the local board", score, name);
        }
        Ok(())
    }

    fn fetch_top_scores(&mut self, limit: usize) -> Result<Vec<HighScoreEntry>, LeaderboardError> {
        Ok(self.scores.top(limit))
    }
}

/// Result of the last submission, shown under the name field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
    NotConfigured,
}

impl SaveStatus {
    pub fn message(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved!",
            SaveStatus::Failed => "Error Saving",
            SaveStatus::NotConfigured => "Config Error: No DB",
        }
    }

    /// Whether the submit button accepts another press
    pub fn can_submit(&self) -> bool {
        !matches!(self, SaveStatus::Saving | SaveStatus::Saved)
    }
}

/// UI-side leaderboard state; the simulation never reads it
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeaderboardView {
    pub entries: Vec<HighScoreEntry>,
    pub loading: bool,
    pub status: SaveStatus,
    /// Name typed on the game-over screen (kept across failed submits)
    pub name_input: String,
}
