//! Team and the per-draw scheduling attributes.

use crate::models::category::CategoryId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// A team entered in one category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub category_id: CategoryId,
    pub name: String,
    pub club: Option<String>,
}

impl Team {
    pub fn new(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            name: name.into(),
            club: None,
        }
    }

    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.club = Some(club.into());
        self
    }
}

/// Team annotated for a group draw. Built per call, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamWithAttributes {
    pub team: Team,
    /// Higher is stronger.
    pub strength: i32,
    #[serde(default)]
    pub girls: bool,
}

impl TeamWithAttributes {
    pub fn new(team: Team, strength: i32, girls: bool) -> Self {
        Self {
            team,
            strength,
            girls,
        }
    }
}
