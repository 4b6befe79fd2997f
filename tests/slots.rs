//! Integration tests for timetable expansion and blank match creation.

use chrono::{NaiveDate, NaiveTime};
use handball_scheduler::{
    create_blank_matches, fixtures_for_edition, generate_slots, read_timetable, schedule_category,
    Category, CategoryId, CourtRule, CourtRules, CourtSchedule, Group, Match, MatchState,
    MatchStore, MemoryStore, SchedulingConfig, Team,
};
use std::collections::HashSet;
use uuid::Uuid;

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()
}

fn venue() -> Vec<CourtSchedule> {
    vec![
        CourtSchedule::new("Hall 1", 0, hm(8, 0), hm(20, 0)),
        CourtSchedule::new("Hall 2", 0, hm(9, 0), hm(18, 0)).with_interval(40),
        CourtSchedule::new("Hall 1", 1, hm(8, 0), hm(19, 0)),
        CourtSchedule::new("Outdoor", 2, hm(9, 0), hm(13, 0)),
    ]
}

#[test]
fn generation_is_deterministic_and_sorted() {
    let first = generate_slots(friday(), &venue());
    let second = generate_slots(friday(), &venue());
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].time <= w[1].time));
    assert!(first.iter().any(|s| s.court == "Outdoor"));
}

#[test]
fn equal_times_keep_rule_order() {
    let rules = [
        CourtSchedule::new("Hall 2", 0, hm(9, 0), hm(10, 0)),
        CourtSchedule::new("Hall 1", 0, hm(9, 0), hm(10, 0)),
    ];
    let slots = generate_slots(friday(), &rules);
    let courts: Vec<&str> = slots.iter().map(|s| s.court.as_str()).collect();
    assert_eq!(courts, vec!["Hall 2", "Hall 1"]);
}

#[test]
fn blank_matches_take_the_earliest_slots() {
    let store = MemoryStore::new();
    let created = create_blank_matches(&store, friday(), &venue(), 10).unwrap();
    assert_eq!(created.len(), 10);

    let blank = store.load_blank_matches().unwrap();
    assert_eq!(blank.len(), 10);
    assert!(blank.iter().all(|m| m.state == MatchState::Generated));
    assert!(blank
        .iter()
        .all(|m| m.home.is_none() && m.away.is_none() && m.group_id.is_none()));

    let earliest: Vec<_> = generate_slots(friday(), &venue())
        .into_iter()
        .take(10)
        .collect();
    let stored: Vec<_> = blank.iter().map(|m| m.slot()).collect();
    assert_eq!(stored, earliest);
}

#[test]
fn small_timetable_yields_every_slot() {
    let store = MemoryStore::new();
    let rules = [CourtSchedule::new("Hall 1", 0, hm(9, 0), hm(10, 45))];
    let created = create_blank_matches(&store, friday(), &rules, 8).unwrap();
    assert_eq!(created.len(), 3);
}

#[test]
fn csv_timetable_feeds_the_generator() {
    let csv = "court,day_offset,opening,closing,interval\n\
               Hall 1,0,08:00,10:00,\n\
               Hall 2, 1 ,09:00,11:00,60\n";
    let rules = read_timetable(csv.as_bytes(), 35).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].interval_minutes, 35);
    assert_eq!(rules[1].interval_minutes, 60);

    let slots = generate_slots(friday(), &rules);
    // Hall 1: 08:00, 08:35, 09:10; Hall 2 on Saturday: 09:00, 10:00.
    assert_eq!(slots.len(), 5);
    assert_eq!(slots[4].time, friday().succ_opt().unwrap().and_time(hm(10, 0)));
}

#[test]
fn csv_timetable_rejects_inverted_hours() {
    let csv = "court,day_offset,opening,closing,interval\nHall 1,0,18:00,08:00,35\n";
    assert!(read_timetable(csv.as_bytes(), 35).is_err());
}

#[test]
fn edition_fixture_count_leaves_out_mini() {
    let store = MemoryStore::new();
    let edition = Uuid::new_v4();
    for (code, size) in [("U13B", 4), ("U15G", 3), ("mini", 6)] {
        let category = Category::new(edition, code, code);
        store.add_category(category.clone()).unwrap();
        let teams: Vec<Team> = (0..size)
            .map(|i| Team::new(category.id, format!("{code} {i}")))
            .collect();
        for t in &teams {
            store.add_team(t.clone()).unwrap();
        }
        let group = Group::with_teams(category.id, "A", teams.iter().map(|t| t.id).collect());
        store.save_groups(&[group]).unwrap();
    }
    let count = fixtures_for_edition(&store, &SchedulingConfig::default(), edition).unwrap();
    assert_eq!(count, 6 + 3);
}

/// One category with a single group of `size` teams.
fn one_group(store: &MemoryStore, size: usize) -> CategoryId {
    let category = Category::new(Uuid::new_v4(), "U13B", "Boys U13");
    store.add_category(category.clone()).unwrap();
    let teams: Vec<Team> = (0..size)
        .map(|i| Team::new(category.id, format!("T{i}")))
        .collect();
    for t in &teams {
        store.add_team(t.clone()).unwrap();
    }
    let group = Group::with_teams(category.id, "A", teams.iter().map(|t| t.id).collect());
    store.save_groups(&[group]).unwrap();
    category.id
}

fn assert_no_double_booking(store: &MemoryStore) -> usize {
    let assigned: Vec<Match> = store
        .load_matches()
        .unwrap()
        .into_iter()
        .filter(|m| !m.is_blank())
        .collect();
    let distinct: HashSet<_> = assigned.iter().map(|m| m.slot()).collect();
    assert_eq!(distinct.len(), assigned.len());
    assigned.len()
}

#[test]
fn repeated_generation_does_not_double_book_courts() {
    let store = MemoryStore::new();
    let category = one_group(&store, 3);
    let hall = [CourtSchedule::new("Hall 1", 0, hm(8, 0), hm(18, 0))];

    assert_eq!(create_blank_matches(&store, friday(), &hall, 3).unwrap().len(), 3);
    assert!(create_blank_matches(&store, friday(), &hall, 3).unwrap().is_empty());
    // Topping up only uses slots nobody holds yet.
    let extra = create_blank_matches(&store, friday(), &hall, 5).unwrap();
    assert_eq!(extra.len(), 2);
    let all = store.load_matches().unwrap();
    let distinct: HashSet<_> = all.iter().map(|m| m.slot()).collect();
    assert_eq!(distinct.len(), all.len());

    let rules = CourtRules::new().with("U13B", vec![CourtRule::any_day("Hall 1", true)]);
    let report =
        schedule_category(&store, &rules, &SchedulingConfig::default(), category).unwrap();
    assert!(report.is_complete());
    assert_eq!(assert_no_double_booking(&store), 3);

    // Regenerating after the run leaves the filled slots alone.
    let after = create_blank_matches(&store, friday(), &hall, 5).unwrap();
    let held: HashSet<_> = store
        .load_matches()
        .unwrap()
        .iter()
        .filter(|m| !m.is_blank())
        .map(|m| m.slot())
        .collect();
    assert!(after.iter().all(|m| !held.contains(&m.slot())));
}

#[test]
fn duplicate_rows_already_stored_are_filled_once() {
    let store = MemoryStore::new();
    let category = one_group(&store, 3);
    let hall = [CourtSchedule::new("Hall 1", 0, hm(8, 0), hm(18, 0))];
    // Two blank rows per slot, written past the generator.
    let rows: Vec<Match> = generate_slots(friday(), &hall)
        .iter()
        .flat_map(|s| [Match::blank(s), Match::blank(s)])
        .collect();
    store.save_new_matches(&rows).unwrap();

    let rules = CourtRules::new().with("U13B", vec![CourtRule::any_day("Hall 1", true)]);
    let config = SchedulingConfig::default();
    schedule_category(&store, &rules, &config, category).unwrap();
    assert_eq!(assert_no_double_booking(&store), 3);
}
