//! Match record and its lifecycle state.

use crate::models::category::CategoryId;
use crate::models::error::EngineError;
use crate::models::group::GroupId;
use crate::models::slot::Slot;
use crate::models::team::TeamId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match (and for the slot it was generated from).
pub type MatchId = Uuid;

/// Lifecycle of a match row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// Blank slot: time and court only, no teams.
    #[default]
    Generated,
    /// Teams assigned, not yet played.
    None,
    Pending,
    Done,
}

/// A match: a (time, court) slot plus, once assigned, the two teams and their group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub time: NaiveDateTime,
    pub playground: String,
    pub home: Option<TeamId>,
    pub away: Option<TeamId>,
    pub group_id: Option<GroupId>,
    pub category_id: Option<CategoryId>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub state: MatchState,
}

impl Match {
    /// Blank match occupying the given slot.
    pub fn blank(slot: &Slot) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: slot.time,
            playground: slot.court.clone(),
            home: None,
            away: None,
            group_id: None,
            category_id: None,
            home_score: None,
            away_score: None,
            state: MatchState::Generated,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.time, self.playground.clone())
    }

    pub fn is_blank(&self) -> bool {
        self.state == MatchState::Generated
    }

    /// Both team references, if the match has been assigned.
    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        Some((self.home?, self.away?))
    }

    /// Fill a blank match with a fixture (`Generated -> None`).
    pub fn assign(
        &mut self,
        home: TeamId,
        away: TeamId,
        group_id: GroupId,
        category_id: CategoryId,
    ) -> Result<(), EngineError> {
        self.transition(MatchState::Generated, MatchState::None)?;
        self.home = Some(home);
        self.away = Some(away);
        self.group_id = Some(group_id);
        self.category_id = Some(category_id);
        Ok(())
    }

    /// Mark the match as being played (`None -> Pending`).
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.transition(MatchState::None, MatchState::Pending)
    }

    /// Record the final score. Allowed from `None`, `Pending`, or `Done` (score correction).
    pub fn finish(&mut self, home_score: u32, away_score: u32) -> Result<(), EngineError> {
        if !matches!(
            self.state,
            MatchState::None | MatchState::Pending | MatchState::Done
        ) {
            return Err(self.invalid(MatchState::Done));
        }
        self.home_score = Some(home_score);
        self.away_score = Some(away_score);
        self.state = MatchState::Done;
        Ok(())
    }

    /// (home, away, home goals, away goals) for a finished match with complete data.
    pub fn result(&self) -> Option<(TeamId, TeamId, u32, u32)> {
        if self.state != MatchState::Done {
            return None;
        }
        let (home, away) = self.teams()?;
        Some((home, away, self.home_score?, self.away_score?))
    }

    fn transition(&mut self, from: MatchState, to: MatchState) -> Result<(), EngineError> {
        if self.state != from {
            return Err(self.invalid(to));
        }
        self.state = to;
        Ok(())
    }

    fn invalid(&self, to: MatchState) -> EngineError {
        EngineError::InvalidTransition {
            match_id: self.id,
            from: self.state,
            to,
        }
    }
}
