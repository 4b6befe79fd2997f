//! Persistence port used by the engine, plus an in-memory implementation.
//!
//! The engine only ever talks to storage through [`MatchStore`]. [`MemoryStore`] backs the web
//! binary and the tests.

use crate::models::{
    Category, CategoryId, EditionId, EngineError, Group, GroupId, Match, MatchId, MatchState, Team,
    TeamId,
};
use log::warn;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Load/save operations the engine needs from the CRUD layer.
pub trait MatchStore {
    fn load_categories_by_edition(&self, edition_id: EditionId) -> Result<Vec<Category>, EngineError>;

    fn load_category(&self, category_id: CategoryId) -> Result<Option<Category>, EngineError>;

    fn load_teams_by_category(&self, category_id: CategoryId) -> Result<Vec<Team>, EngineError>;

    fn load_groups_by_category(&self, category_id: CategoryId) -> Result<Vec<Group>, EngineError>;

    fn load_group(&self, group_id: GroupId) -> Result<Option<Group>, EngineError>;

    /// Insert or replace groups by id.
    fn save_groups(&self, groups: &[Group]) -> Result<(), EngineError>;

    /// Drop every group of the category and store `groups` in their place.
    fn replace_groups(&self, category_id: CategoryId, groups: &[Group]) -> Result<(), EngineError>;

    /// All matches still in state `Generated`, ordered by time.
    fn load_blank_matches(&self) -> Result<Vec<Match>, EngineError>;

    /// Every stored match in any state, ordered by time.
    fn load_matches(&self) -> Result<Vec<Match>, EngineError>;

    fn load_matches_by_group(&self, group_id: GroupId) -> Result<Vec<Match>, EngineError>;

    /// Insert a batch. Every team reference must exist, otherwise nothing is written.
    fn save_new_matches(&self, matches: &[Match]) -> Result<(), EngineError>;

    /// Replace a stored match. `MatchNotFound` if the id is gone.
    fn update_match(&self, m: &Match) -> Result<(), EngineError>;

    /// Replace several matches; ids that are gone are logged and skipped.
    fn update_matches(&self, matches: &[Match]) -> Result<(), EngineError> {
        for m in matches {
            match self.update_match(m) {
                Ok(()) => {}
                Err(EngineError::MatchNotFound(id)) => {
                    warn!("Skipping update of match {}: no longer stored", id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    teams: HashMap<TeamId, Team>,
    /// Insertion order, for stable listings.
    team_order: Vec<TeamId>,
    groups: Vec<Group>,
    matches: Vec<Match>,
}

/// Store kept entirely in process memory behind a lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, EngineError> {
        self.tables
            .read()
            .map_err(|_| EngineError::Storage("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, EngineError> {
        self.tables
            .write()
            .map_err(|_| EngineError::Storage("lock error".to_string()))
    }

    pub fn add_category(&self, category: Category) -> Result<(), EngineError> {
        let mut t = self.write()?;
        t.categories.retain(|c| c.id != category.id);
        t.categories.push(category);
        Ok(())
    }

    pub fn add_team(&self, team: Team) -> Result<(), EngineError> {
        let mut t = self.write()?;
        if !t.teams.contains_key(&team.id) {
            t.team_order.push(team.id);
        }
        t.teams.insert(team.id, team);
        Ok(())
    }

    pub fn load_match(&self, match_id: MatchId) -> Result<Option<Match>, EngineError> {
        Ok(self.read()?.matches.iter().find(|m| m.id == match_id).cloned())
    }

    /// Record a final score under one write lock, so concurrent corrections cannot interleave.
    pub fn record_result(
        &self,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
    ) -> Result<Match, EngineError> {
        let mut t = self.write()?;
        let m = t
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;
        m.finish(home_score, away_score)?;
        Ok(m.clone())
    }

    /// Drop a match row (e.g. a slot removed by the organiser).
    pub fn remove_match(&self, match_id: MatchId) -> Result<bool, EngineError> {
        let mut t = self.write()?;
        let before = t.matches.len();
        t.matches.retain(|m| m.id != match_id);
        Ok(t.matches.len() != before)
    }
}

impl MatchStore for MemoryStore {
    fn load_categories_by_edition(&self, edition_id: EditionId) -> Result<Vec<Category>, EngineError> {
        Ok(self
            .read()?
            .categories
            .iter()
            .filter(|c| c.edition_id == edition_id)
            .cloned()
            .collect())
    }

    fn load_category(&self, category_id: CategoryId) -> Result<Option<Category>, EngineError> {
        Ok(self
            .read()?
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .cloned())
    }

    fn load_teams_by_category(&self, category_id: CategoryId) -> Result<Vec<Team>, EngineError> {
        let t = self.read()?;
        Ok(t.team_order
            .iter()
            .filter_map(|id| t.teams.get(id))
            .filter(|team| team.category_id == category_id)
            .cloned()
            .collect())
    }

    fn load_groups_by_category(&self, category_id: CategoryId) -> Result<Vec<Group>, EngineError> {
        Ok(self
            .read()?
            .groups
            .iter()
            .filter(|g| g.category_id == category_id)
            .cloned()
            .collect())
    }

    fn load_group(&self, group_id: GroupId) -> Result<Option<Group>, EngineError> {
        Ok(self.read()?.groups.iter().find(|g| g.id == group_id).cloned())
    }

    fn save_groups(&self, groups: &[Group]) -> Result<(), EngineError> {
        let mut t = self.write()?;
        for group in groups {
            match t.groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) => *existing = group.clone(),
                None => t.groups.push(group.clone()),
            }
        }
        Ok(())
    }

    fn replace_groups(&self, category_id: CategoryId, groups: &[Group]) -> Result<(), EngineError> {
        let mut t = self.write()?;
        t.groups.retain(|g| g.category_id != category_id);
        t.groups.extend(groups.iter().cloned());
        Ok(())
    }

    fn load_blank_matches(&self) -> Result<Vec<Match>, EngineError> {
        let mut blank: Vec<Match> = self
            .read()?
            .matches
            .iter()
            .filter(|m| m.state == MatchState::Generated)
            .cloned()
            .collect();
        blank.sort_by_key(|m| m.time);
        Ok(blank)
    }

    fn load_matches(&self) -> Result<Vec<Match>, EngineError> {
        let mut all = self.read()?.matches.clone();
        all.sort_by_key(|m| m.time);
        Ok(all)
    }

    fn load_matches_by_group(&self, group_id: GroupId) -> Result<Vec<Match>, EngineError> {
        Ok(self
            .read()?
            .matches
            .iter()
            .filter(|m| m.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    fn save_new_matches(&self, matches: &[Match]) -> Result<(), EngineError> {
        let mut t = self.write()?;
        // Validate the whole batch before touching the table.
        for m in matches {
            for team in m.home.iter().chain(m.away.iter()) {
                if !t.teams.contains_key(team) {
                    return Err(EngineError::UnknownTeam(*team));
                }
            }
        }
        t.matches.extend(matches.iter().cloned());
        Ok(())
    }

    fn update_match(&self, m: &Match) -> Result<(), EngineError> {
        let mut t = self.write()?;
        let slot = t
            .matches
            .iter_mut()
            .find(|x| x.id == m.id)
            .ok_or(EngineError::MatchNotFound(m.id))?;
        *slot = m.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Slot;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn slot(hour: u32) -> Slot {
        let time = NaiveDate::from_ymd_opt(2025, 6, 6)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Slot::new(time, "Hall 1")
    }

    #[test]
    fn unknown_team_rejects_whole_batch() {
        let store = MemoryStore::new();
        let category = Category::new(Uuid::new_v4(), "U13B", "Boys U13");
        let team = Team::new(category.id, "Sokol");
        store.add_team(team.clone()).unwrap();

        let ok = Match::blank(&slot(9));
        let mut bad = Match::blank(&slot(10));
        let ghost = Uuid::new_v4();
        bad.home = Some(team.id);
        bad.away = Some(ghost);

        assert_eq!(
            store.save_new_matches(&[ok, bad]),
            Err(EngineError::UnknownTeam(ghost))
        );
        assert!(store.load_matches().unwrap().is_empty());
    }

    #[test]
    fn update_matches_skips_missing_ids() {
        let store = MemoryStore::new();
        let kept = Match::blank(&slot(9));
        let gone = Match::blank(&slot(10));
        store.save_new_matches(&[kept.clone(), gone.clone()]).unwrap();
        assert!(store.remove_match(gone.id).unwrap());

        let mut kept_update = kept.clone();
        kept_update.playground = "Hall 2".to_string();
        assert_eq!(
            store.update_match(&gone),
            Err(EngineError::MatchNotFound(gone.id))
        );
        store.update_matches(&[gone, kept_update]).unwrap();
        assert_eq!(
            store.load_match(kept.id).unwrap().unwrap().playground,
            "Hall 2"
        );
    }

    #[test]
    fn blank_matches_come_back_in_time_order() {
        let store = MemoryStore::new();
        store
            .save_new_matches(&[Match::blank(&slot(11)), Match::blank(&slot(9))])
            .unwrap();
        let hours: Vec<_> = store
            .load_blank_matches()
            .unwrap()
            .iter()
            .map(|m| m.time)
            .collect();
        assert!(hours[0] < hours[1]);
    }

    #[test]
    fn replacing_groups_leaves_other_categories_alone() {
        let store = MemoryStore::new();
        let (mine, other) = (Uuid::new_v4(), Uuid::new_v4());
        store
            .save_groups(&[Group::new(mine, "A"), Group::new(mine, "B"), Group::new(other, "A")])
            .unwrap();

        store.replace_groups(mine, &[Group::new(mine, "X")]).unwrap();
        let names: Vec<String> = store
            .load_groups_by_category(mine)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["X"]);
        assert_eq!(store.load_groups_by_category(other).unwrap().len(), 1);
    }

    #[test]
    fn record_result_finishes_in_place() {
        let store = MemoryStore::new();
        let category = Category::new(Uuid::new_v4(), "U13B", "Boys U13");
        let (a, b) = (Team::new(category.id, "A"), Team::new(category.id, "B"));
        store.add_team(a.clone()).unwrap();
        store.add_team(b.clone()).unwrap();
        let mut m = Match::blank(&slot(9));
        m.assign(a.id, b.id, Uuid::new_v4(), category.id).unwrap();
        store.save_new_matches(&[m.clone()]).unwrap();

        let done = store.record_result(m.id, 21, 19).unwrap();
        assert_eq!(done.state, MatchState::Done);
        assert_eq!(store.load_match(m.id).unwrap(), Some(done));

        let blank = Match::blank(&slot(10));
        store.save_new_matches(&[blank.clone()]).unwrap();
        assert!(matches!(
            store.record_result(blank.id, 1, 0),
            Err(EngineError::InvalidTransition { .. })
        ));
        let missing = Uuid::new_v4();
        assert_eq!(
            store.record_result(missing, 1, 0),
            Err(EngineError::MatchNotFound(missing))
        );
    }
}
