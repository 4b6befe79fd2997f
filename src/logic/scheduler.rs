//! Constraint scheduler: pack group fixtures into blank match slots.
//!
//! Placement is greedy first-fit. Candidate slots for a category are ordered once per run
//! (preferred day, then the category's primary courts, then time) and every pairing takes the
//! first free slot where both teams satisfy the rest and lunch-break rules. There is no
//! backtracking: a pairing that fits nowhere is reported and skipped.
//!
//! All per-run bookkeeping lives in a [`SchedulingSession`]; nothing is kept between runs.

use crate::config::SchedulingConfig;
use crate::logic::eligibility::CourtRules;
use crate::logic::pairing::round_robin_pairings;
use crate::models::{
    Category, CategoryId, EditionId, EngineError, Group, GroupId, Match, MatchId, Slot, TeamId,
};
use crate::store::MatchStore;
use chrono::{Datelike, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One fixture still to be placed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub home: TeamId,
    pub away: TeamId,
    pub group_id: GroupId,
    pub category_id: CategoryId,
}

/// Outcome of one scheduling run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Ids of the matches filled during this run, in assignment order.
    pub assigned: Vec<MatchId>,
    pub unassigned: Vec<Pairing>,
    pub warnings: Vec<String>,
}

impl ScheduleReport {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// True when every demanded pairing got a slot.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Run-scoped state: the blank slot pool and what has been scheduled so far.
#[derive(Clone, Debug, Default)]
pub struct SchedulingSession {
    pool: Vec<Match>,
    taken: Vec<bool>,
    team_times: HashMap<TeamId, Vec<NaiveDateTime>>,
    lunch_times: HashMap<TeamId, Vec<NaiveDateTime>>,
    /// Start times of every match the run knows about, sorted.
    scheduled: Vec<NaiveDateTime>,
}

impl SchedulingSession {
    /// Session over a blank pool. Rows sharing a (time, court) collapse to the first one.
    pub fn new(pool: Vec<Match>) -> Self {
        let mut seen = HashSet::new();
        let pool: Vec<Match> = pool
            .into_iter()
            .filter(|m| {
                let fresh = seen.insert(m.slot());
                if !fresh {
                    warn!(
                        "Ignoring duplicate slot {} at {} (match {})",
                        m.playground, m.time, m.id
                    );
                }
                fresh
            })
            .collect();
        let taken = vec![false; pool.len()];
        Self {
            pool,
            taken,
            ..Default::default()
        }
    }

    pub fn pool(&self) -> &[Match] {
        &self.pool
    }

    pub fn is_taken(&self, index: usize) -> bool {
        self.taken.get(index).copied().unwrap_or(true)
    }

    pub fn free_slots(&self) -> usize {
        self.taken.iter().filter(|t| !**t).count()
    }

    /// Register an already assigned match (from storage) so rest and lunch rules see it.
    pub fn seed(&mut self, m: &Match, config: &SchedulingConfig) {
        if let Some((home, away)) = m.teams() {
            self.record(home, away, m.time, config);
        }
    }

    /// Matches known to the run that start strictly between `a` and `b`.
    pub fn matches_between(&self, a: NaiveDateTime, b: NaiveDateTime) -> usize {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let first_after = self.scheduled.partition_point(|t| *t <= lo);
        let first_at_or_after_hi = self.scheduled.partition_point(|t| *t < hi);
        first_at_or_after_hi.saturating_sub(first_after)
    }

    /// Whether `team` may play at `time` given everything scheduled so far.
    pub fn team_can_play(&self, team: TeamId, time: NaiveDateTime, config: &SchedulingConfig) -> bool {
        let played = self.team_times.get(&team).map(Vec::as_slice).unwrap_or(&[]);

        let rested = played
            .iter()
            .all(|t| (time - *t).num_minutes().abs() >= config.rest_minutes);
        if !rested {
            return false;
        }

        // A lunch match needs `lunch_spacing` matches before the team's next match.
        let lunches = self.lunch_times.get(&team).map(Vec::as_slice).unwrap_or(&[]);
        let after_lunch_ok = lunches
            .iter()
            .filter(|lunch| **lunch < time)
            .all(|lunch| self.matches_between(*lunch, time) >= config.lunch_spacing);
        if !after_lunch_ok {
            return false;
        }

        if config.is_lunch(time) {
            return played
                .iter()
                .filter(|t| **t > time)
                .all(|t| self.matches_between(time, *t) >= config.lunch_spacing);
        }
        true
    }

    /// Slot `index` is no longer usable (assigned, or vanished from storage).
    fn retire(&mut self, index: usize) {
        if let Some(t) = self.taken.get_mut(index) {
            *t = true;
        }
    }

    fn commit(&mut self, index: usize, m: Match, config: &SchedulingConfig) {
        self.retire(index);
        if let Some((home, away)) = m.teams() {
            self.record(home, away, m.time, config);
        }
        self.pool[index] = m;
    }

    fn record(&mut self, home: TeamId, away: TeamId, time: NaiveDateTime, config: &SchedulingConfig) {
        for team in [home, away] {
            self.team_times.entry(team).or_default().push(time);
            if config.is_lunch(time) {
                self.lunch_times.entry(team).or_default().push(time);
            }
        }
        let at = self.scheduled.partition_point(|t| *t <= time);
        self.scheduled.insert(at, time);
    }
}

/// Shared inputs of a run.
struct Run<'a, S: MatchStore> {
    store: &'a S,
    rules: &'a CourtRules,
    config: &'a SchedulingConfig,
}

/// Schedule every outstanding fixture of one category.
pub fn schedule_category<S: MatchStore>(
    store: &S,
    rules: &CourtRules,
    config: &SchedulingConfig,
    category_id: CategoryId,
) -> Result<ScheduleReport, EngineError> {
    let category = store
        .load_category(category_id)?
        .ok_or(EngineError::CategoryNotFound(category_id))?;
    let run = Run {
        store,
        rules,
        config,
    };
    let mut report = ScheduleReport::default();
    if !rules.has_rules(&category.code) {
        report.warn(format!(
            "Category {} ({}) has no court rules; nothing scheduled",
            category.name, category.code
        ));
        return Ok(report);
    }

    let mut session = open_session(store)?;
    let demand = outstanding_pairings(&run, &category, &mut session)?;
    place_category(&run, &mut session, &category, &demand, &mut report)?;

    info!(
        "Scheduled category {}: {} assigned, {} unassigned",
        category.code,
        report.assigned.len(),
        report.unassigned.len()
    );
    Ok(report)
}

/// Schedule every category of an edition against one shared slot pool.
///
/// Separately scheduled categories (the mini tournament) are skipped.
pub fn schedule_edition<S: MatchStore>(
    store: &S,
    rules: &CourtRules,
    config: &SchedulingConfig,
    edition_id: EditionId,
) -> Result<ScheduleReport, EngineError> {
    let run = Run {
        store,
        rules,
        config,
    };
    let mut report = ScheduleReport::default();
    let mut session = open_session(store)?;

    // Seed every category's existing fixtures before placing anything.
    let mut plans = Vec::new();
    for category in store.load_categories_by_edition(edition_id)? {
        if config.is_scheduled_separately(&category.code) {
            info!("Skipping separately scheduled category {}", category.code);
            continue;
        }
        if !rules.has_rules(&category.code) {
            report.warn(format!(
                "Category {} ({}) has no court rules; skipped",
                category.name, category.code
            ));
            continue;
        }
        let demand = outstanding_pairings(&run, &category, &mut session)?;
        plans.push((category, demand));
    }

    for (category, demand) in &plans {
        place_category(&run, &mut session, category, demand, &mut report)?;
    }

    info!(
        "Scheduled edition {}: {} assigned, {} unassigned, {} slots left",
        edition_id,
        report.assigned.len(),
        report.unassigned.len(),
        session.free_slots()
    );
    Ok(report)
}

/// Session over the blank pool, minus blanks whose (time, court) an assigned match already holds.
fn open_session<S: MatchStore>(store: &S) -> Result<SchedulingSession, EngineError> {
    let occupied: HashSet<Slot> = store
        .load_matches()?
        .iter()
        .filter(|m| !m.is_blank())
        .map(Match::slot)
        .collect();
    let pool = store
        .load_blank_matches()?
        .into_iter()
        .filter(|m| !occupied.contains(&m.slot()))
        .collect();
    Ok(SchedulingSession::new(pool))
}

/// Round-robin pairings of the category's groups that have no match yet.
/// Existing assigned matches are seeded into the session on the way.
fn outstanding_pairings<S: MatchStore>(
    run: &Run<'_, S>,
    category: &Category,
    session: &mut SchedulingSession,
) -> Result<Vec<Pairing>, EngineError> {
    let mut demand = Vec::new();
    for group in run.store.load_groups_by_category(category.id)? {
        let existing = run.store.load_matches_by_group(group.id)?;
        let mut played = HashSet::new();
        for m in existing.iter().filter(|m| !m.is_blank()) {
            if let Some((home, away)) = m.teams() {
                played.insert(unordered(home, away));
                session.seed(m, run.config);
            }
        }
        demand.extend(group_pairings(&group, category.id, &played));
    }
    Ok(demand)
}

fn group_pairings(
    group: &Group,
    category_id: CategoryId,
    played: &HashSet<(TeamId, TeamId)>,
) -> Vec<Pairing> {
    round_robin_pairings(&group.team_ids)
        .into_iter()
        .filter(|(home, away)| !played.contains(&unordered(*home, *away)))
        .map(|(home, away)| Pairing {
            home,
            away,
            group_id: group.id,
            category_id,
        })
        .collect()
}

fn unordered(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Indices of pool slots the category may use, best first.
fn candidate_order(
    session: &SchedulingSession,
    rules: &CourtRules,
    config: &SchedulingConfig,
    code: &str,
) -> Vec<usize> {
    let mut order: Vec<usize> = session
        .pool()
        .iter()
        .enumerate()
        .filter(|(_, m)| rules.allows(code, &m.playground, m.time.weekday()))
        .map(|(i, _)| i)
        .collect();
    order.sort_by_key(|&i| {
        let m = &session.pool()[i];
        (
            config.day_rank(m.time.weekday()),
            !rules.is_primary(code, &m.playground),
            m.time,
        )
    });
    order
}

fn place_category<S: MatchStore>(
    run: &Run<'_, S>,
    session: &mut SchedulingSession,
    category: &Category,
    demand: &[Pairing],
    report: &mut ScheduleReport,
) -> Result<(), EngineError> {
    if demand.is_empty() {
        debug!("Category {} has no outstanding fixtures", category.code);
        return Ok(());
    }
    let order = candidate_order(session, run.rules, run.config, &category.code);
    for pairing in demand {
        if !place_pairing(run, session, &order, pairing, report)? {
            report.warn(format!(
                "No compatible slot for {} vs {} in category {}",
                pairing.home, pairing.away, category.code
            ));
            report.unassigned.push(*pairing);
        }
    }
    Ok(())
}

/// First-fit placement of one pairing. Returns false when no slot fits.
fn place_pairing<S: MatchStore>(
    run: &Run<'_, S>,
    session: &mut SchedulingSession,
    order: &[usize],
    pairing: &Pairing,
    report: &mut ScheduleReport,
) -> Result<bool, EngineError> {
    for &index in order {
        if session.is_taken(index) {
            continue;
        }
        let time = session.pool()[index].time;
        if !session.team_can_play(pairing.home, time, run.config)
            || !session.team_can_play(pairing.away, time, run.config)
        {
            continue;
        }

        let mut m = session.pool()[index].clone();
        m.assign(pairing.home, pairing.away, pairing.group_id, pairing.category_id)?;
        match run.store.update_match(&m) {
            Ok(()) => {}
            Err(EngineError::MatchNotFound(id)) => {
                report.warn(format!("Slot match {} disappeared from storage; skipped", id));
                session.retire(index);
                continue;
            }
            Err(e) => return Err(e),
        }
        debug!(
            "Assigned {} vs {} to {} at {}",
            pairing.home, pairing.away, m.playground, m.time
        );
        report.assigned.push(m.id);
        session.commit(index, m, run.config);
        return Ok(true);
    }
    Ok(false)
}
