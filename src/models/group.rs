//! Groups, draw variants and standings rows.

use crate::models::category::CategoryId;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;

/// Points for a win (2-1-0 scheme).
pub const POINTS_FOR_WIN: u32 = 2;
pub const POINTS_FOR_DRAW: u32 = 1;

/// A round-robin group: label plus ordered team memberships.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub category_id: CategoryId,
    /// "A", "B", ...
    pub name: String,
    pub team_ids: Vec<TeamId>,
}

impl Group {
    pub fn new(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            name: name.into(),
            team_ids: Vec::new(),
        }
    }

    pub fn with_teams(category_id: CategoryId, name: impl Into<String>, team_ids: Vec<TeamId>) -> Self {
        Self {
            team_ids,
            ..Self::new(category_id, name)
        }
    }

    pub fn len(&self) -> usize {
        self.team_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.team_ids.is_empty()
    }

    /// Round-robin fixtures implied by this group's size.
    pub fn fixture_count(&self) -> usize {
        let k = self.len();
        k * k.saturating_sub(1) / 2
    }
}

/// One candidate partitioning of a category into groups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignmentVariant {
    pub group_count: usize,
    pub total_fixtures: usize,
    /// Fewest group matches any single team gets.
    pub min_fixtures_per_team: usize,
    pub groups: Vec<Group>,
}

/// League table row for one team. Always rebuilt from the match list.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl GroupStanding {
    pub fn new(team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            ..Default::default()
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Fold one finished match into the row, from this team's point of view.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        if scored > conceded {
            self.wins += 1;
            self.points += POINTS_FOR_WIN;
        } else if scored == conceded {
            self.draws += 1;
            self.points += POINTS_FOR_DRAW;
        } else {
            self.losses += 1;
        }
    }
}
