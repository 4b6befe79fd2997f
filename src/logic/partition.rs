//! Balanced group draw: strength-ordered snake draft with girls teams kept apart.

use crate::models::{CategoryId, EngineError, Group, GroupAssignmentVariant, TeamWithAttributes};
use crate::store::MatchStore;
use log::info;

/// Group counts offered to the organiser.
pub const GROUP_COUNTS: [usize; 3] = [3, 4, 5];

/// One variant per entry of [`GROUP_COUNTS`]. The caller picks one.
pub fn partition_variants(
    teams: &[TeamWithAttributes],
    category_id: CategoryId,
) -> Vec<GroupAssignmentVariant> {
    GROUP_COUNTS
        .iter()
        .map(|&n| partition_into(teams, n, category_id))
        .collect()
}

/// Distribute teams into `group_count` groups labelled "A", "B", ...
///
/// Teams are taken strongest first. A girls team goes to the smallest group that has no girls
/// team yet; when every group already has one it is drafted like everyone else. The draft runs
/// 0, 1, .., n-1, n-1, .., 1, 0, 0, 1, .. and only advances on drafted teams.
pub fn partition_into(
    teams: &[TeamWithAttributes],
    group_count: usize,
    category_id: CategoryId,
) -> GroupAssignmentVariant {
    let mut groups: Vec<Group> = (0..group_count)
        .map(|i| Group::new(category_id, group_label(i)))
        .collect();
    let mut has_girls = vec![false; group_count];

    let mut ranked: Vec<&TeamWithAttributes> = teams.iter().collect();
    ranked.sort_by(|a, b| b.strength.cmp(&a.strength));

    let mut draft = SnakeDraft::new(group_count);
    for entry in ranked {
        if group_count == 0 {
            break;
        }
        let target = if entry.girls {
            girls_group(&groups, &has_girls).unwrap_or_else(|| draft.next())
        } else {
            draft.next()
        };
        groups[target].team_ids.push(entry.team.id);
        if entry.girls {
            has_girls[target] = true;
        }
    }

    GroupAssignmentVariant {
        group_count,
        total_fixtures: groups.iter().map(Group::fixture_count).sum(),
        min_fixtures_per_team: groups
            .iter()
            .filter(|g| g.len() >= 2)
            .map(|g| g.len() - 1)
            .min()
            .unwrap_or(0),
        groups,
    }
}

/// Store the chosen variant as the category's groups, replacing any earlier draw.
///
/// Refused once a group of the category has assigned matches, since those fixtures would
/// point at groups that no longer exist.
pub fn apply_variant(
    store: &impl MatchStore,
    category_id: CategoryId,
    variant: &GroupAssignmentVariant,
) -> Result<(), EngineError> {
    if let Some(g) = variant.groups.iter().find(|g| g.category_id != category_id) {
        return Err(EngineError::InvalidDraw(format!(
            "group {} belongs to category {}",
            g.name, g.category_id
        )));
    }
    for group in store.load_groups_by_category(category_id)? {
        let booked = store
            .load_matches_by_group(group.id)?
            .iter()
            .any(|m| !m.is_blank());
        if booked {
            return Err(EngineError::InvalidDraw(format!(
                "group {} already has scheduled matches",
                group.name
            )));
        }
    }
    store.replace_groups(category_id, &variant.groups)?;
    info!(
        "Saved {} groups ({} fixtures) for category {}",
        variant.group_count, variant.total_fixtures, category_id
    );
    Ok(())
}

/// "A".."Z", then "G27", ... for silly group counts.
fn group_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        format!("G{}", index + 1)
    }
}

/// Smallest group without a girls team, lowest label on ties.
fn girls_group(groups: &[Group], has_girls: &[bool]) -> Option<usize> {
    groups
        .iter()
        .enumerate()
        .filter(|(i, _)| !has_girls[*i])
        .min_by_key(|(i, g)| (g.len(), *i))
        .map(|(i, _)| i)
}

/// Boustrophedon cursor over group indices.
struct SnakeDraft {
    len: isize,
    index: isize,
    step: isize,
}

impl SnakeDraft {
    fn new(len: usize) -> Self {
        Self {
            len: len as isize,
            index: 0,
            step: 1,
        }
    }

    fn next(&mut self) -> usize {
        let current = self.index;
        self.index += self.step;
        if self.index < 0 || self.index >= self.len {
            self.step = -self.step;
            self.index += self.step;
        }
        current as usize
    }
}
