//! Slot generation: expand the venue timetable into (time, court) slots and blank matches.

use crate::config::SchedulingConfig;
use crate::models::{CourtSchedule, EditionId, EngineError, Group, Match, Slot};
use crate::store::MatchStore;
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use std::collections::HashSet;

/// Expand timetable rules into slots, sorted by start time.
///
/// For each rule a slot starts at `start + day_offset + opening` and every `interval` minutes
/// after that, as long as the whole interval ends by `closing`. Equal start times keep rule order.
pub fn generate_slots(start: NaiveDate, rules: &[CourtSchedule]) -> Vec<Slot> {
    let mut slots = Vec::new();
    for rule in rules {
        if rule.interval_minutes == 0 {
            warn!("Court {} has a zero-minute interval; no slots generated", rule.court);
            continue;
        }
        let interval = Duration::minutes(i64::from(rule.interval_minutes));
        let day = Duration::try_days(rule.day_offset).and_then(|d| start.checked_add_signed(d));
        let Some(day) = day else {
            warn!(
                "Court {} is {} days from {}, outside the calendar; no slots generated",
                rule.court, rule.day_offset, start
            );
            continue;
        };
        let closing = day.and_time(rule.closing);
        let mut current = day.and_time(rule.opening);
        while let Some(end) = current.checked_add_signed(interval) {
            if end > closing {
                break;
            }
            slots.push(Slot::new(current, rule.court.clone()));
            current = end;
        }
    }
    slots.sort_by_key(|s| s.time);
    slots
}

/// Round-robin fixtures needed for these groups.
pub fn fixtures_for_groups(groups: &[Group]) -> usize {
    groups.iter().map(Group::fixture_count).sum()
}

/// Fixtures needed across an edition, leaving out separately scheduled categories.
pub fn fixtures_for_edition(
    store: &impl MatchStore,
    config: &SchedulingConfig,
    edition_id: EditionId,
) -> Result<usize, EngineError> {
    let mut total = 0;
    for category in store.load_categories_by_edition(edition_id)? {
        if config.is_scheduled_separately(&category.code) {
            continue;
        }
        total += fixtures_for_groups(&store.load_groups_by_category(category.id)?);
    }
    Ok(total)
}

/// Top the stored slot pool up to `fixtures_required` blank matches.
///
/// Blank matches already stored count towards the target, and a (time, court) that already
/// holds a match is never offered again, so calling this twice does not double-book a court.
/// Returns the newly created matches. When the timetable is too small every free slot is used
/// and a warning is logged.
pub fn create_blank_matches(
    store: &impl MatchStore,
    start: NaiveDate,
    rules: &[CourtSchedule],
    fixtures_required: usize,
) -> Result<Vec<Match>, EngineError> {
    let existing = store.load_matches()?;
    let occupied: HashSet<Slot> = existing.iter().map(Match::slot).collect();
    let blank = existing.iter().filter(|m| m.is_blank()).count();
    let wanted = fixtures_required.saturating_sub(blank);

    let free: Vec<Slot> = generate_slots(start, rules)
        .into_iter()
        .filter(|s| !occupied.contains(s))
        .collect();
    if free.len() < wanted {
        warn!(
            "Timetable has {} free slots but {} more blank matches are required",
            free.len(),
            wanted
        );
    }
    let matches: Vec<Match> = free.iter().take(wanted).map(Match::blank).collect();
    store.save_new_matches(&matches)?;
    info!(
        "Created {} blank matches starting {} ({} already open)",
        matches.len(),
        start,
        blank
    );
    Ok(matches)
}
