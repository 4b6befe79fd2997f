//! Data structures for the scheduling engine: slots, matches, teams, groups, categories.

mod category;
mod error;
mod game_match;
mod group;
mod slot;
mod team;

pub use category::{Category, CategoryId, EditionId};
pub use error::EngineError;
pub use game_match::{Match, MatchId, MatchState};
pub use group::{
    Group, GroupAssignmentVariant, GroupId, GroupStanding, POINTS_FOR_DRAW, POINTS_FOR_WIN,
};
pub use slot::{CourtSchedule, Slot, DEFAULT_INTERVAL_MINUTES};
pub use team::{Team, TeamId, TeamWithAttributes};
