//! Group standings: fold finished matches into a sorted league table.

use crate::models::{EngineError, GroupId, GroupStanding, Match, TeamId};
use crate::store::MatchStore;
use log::warn;
use std::collections::HashMap;

/// Standings of a group, recomputed from its matches.
///
/// Every member team gets a row, even without a finished match. Only `Done` matches with both
/// teams and both scores count. Sorted by points, goal difference, then goals scored; remaining
/// ties keep group membership order.
pub fn compute_standings(
    store: &impl MatchStore,
    group_id: GroupId,
) -> Result<Vec<GroupStanding>, EngineError> {
    let group = store
        .load_group(group_id)?
        .ok_or(EngineError::GroupNotFound(group_id))?;
    let names: HashMap<TeamId, String> = store
        .load_teams_by_category(group.category_id)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let matches = store.load_matches_by_group(group_id)?;
    Ok(tabulate(&group.team_ids, &names, &matches))
}

/// Pure table computation over an explicit team list and match set.
pub fn tabulate(
    team_ids: &[TeamId],
    names: &HashMap<TeamId, String>,
    matches: &[Match],
) -> Vec<GroupStanding> {
    let mut rows: Vec<GroupStanding> = team_ids
        .iter()
        .map(|id| GroupStanding::new(*id, names.get(id).cloned().unwrap_or_default()))
        .collect();
    let index: HashMap<TeamId, usize> = team_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    for (home, away, home_goals, away_goals) in matches.iter().filter_map(Match::result) {
        let (Some(&h), Some(&a)) = (index.get(&home), index.get(&away)) else {
            warn!("Ignoring result {} vs {}: team outside the group", home, away);
            continue;
        };
        rows[h].record(home_goals, away_goals);
        rows[a].record(away_goals, home_goals);
    }

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference().cmp(&a.goal_difference()))
            .then(b.goals_for.cmp(&a.goals_for))
    });
    rows
}
