//! Engine error type shared by the store, the algorithms and the web layer.

use crate::models::category::CategoryId;
use crate::models::game_match::{MatchId, MatchState};
use crate::models::group::GroupId;
use crate::models::team::TeamId;

/// Errors that can occur while scheduling, tabulating or persisting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// Update targeted a match that is no longer stored.
    MatchNotFound(MatchId),
    GroupNotFound(GroupId),
    CategoryNotFound(CategoryId),
    /// A new match references a team that does not exist in storage.
    UnknownTeam(TeamId),
    /// Match lifecycle step requested from the wrong state.
    InvalidTransition {
        match_id: MatchId,
        from: MatchState,
        to: MatchState,
    },
    /// Group draw that cannot be stored (wrong category, or fixtures already booked).
    InvalidDraw(String),
    /// Config or timetable file could not be read or parsed.
    Config(String),
    /// Backend failure (poisoned lock, I/O in a real store, ...).
    Storage(String),
}

impl EngineError {
    /// True for the "thing does not exist" family (mapped to 404 by the web layer).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::MatchNotFound(_)
                | EngineError::GroupNotFound(_)
                | EngineError::CategoryNotFound(_)
        )
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            EngineError::GroupNotFound(id) => write!(f, "Group {} not found", id),
            EngineError::CategoryNotFound(id) => write!(f, "Category {} not found", id),
            EngineError::UnknownTeam(id) => write!(f, "Match references unknown team {}", id),
            EngineError::InvalidTransition { match_id, from, to } => {
                write!(f, "Match {} cannot go from {:?} to {:?}", match_id, from, to)
            }
            EngineError::InvalidDraw(msg) => write!(f, "Invalid group draw: {}", msg),
            EngineError::Config(msg) => write!(f, "Configuration error: {}", msg),
            EngineError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl From<csv::Error> for EngineError {
    fn from(e: csv::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}
