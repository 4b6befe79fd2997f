//! Integration tests for group standings computed through the store.

use chrono::NaiveDate;
use handball_scheduler::{
    compute_standings, Category, EngineError, Group, GroupId, Match, MatchStore, MemoryStore,
    Slot, Team, TeamId,
};
use uuid::Uuid;

struct League {
    store: MemoryStore,
    group: GroupId,
    teams: Vec<Team>,
}

fn league(names: &[&str]) -> League {
    let store = MemoryStore::new();
    let category = Category::new(Uuid::new_v4(), "U15B", "Boys U15");
    store.add_category(category.clone()).unwrap();
    let teams: Vec<Team> = names.iter().map(|n| Team::new(category.id, *n)).collect();
    for t in &teams {
        store.add_team(t.clone()).unwrap();
    }
    let group = Group::with_teams(category.id, "A", teams.iter().map(|t| t.id).collect());
    store.save_groups(&[group.clone()]).unwrap();
    League {
        store,
        group: group.id,
        teams,
    }
}

impl League {
    fn id(&self, name: &str) -> TeamId {
        self.teams.iter().find(|t| t.name == name).unwrap().id
    }

    /// Store a match between two teams; `score` None leaves it unplayed.
    fn play(&self, home: &str, away: &str, score: Option<(u32, u32)>) -> Match {
        let time = NaiveDate::from_ymd_opt(2025, 6, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut m = Match::blank(&Slot::new(time, "Hall 1"));
        let category = self.teams[0].category_id;
        m.assign(self.id(home), self.id(away), self.group, category)
            .unwrap();
        if let Some((h, a)) = score {
            m.finish(h, a).unwrap();
        }
        self.store.save_new_matches(&[m.clone()]).unwrap();
        m
    }
}

#[test]
fn two_one_zero_points_and_tie_breaks() {
    let l = league(&["A", "B", "C"]);
    l.play("A", "B", Some((3, 1)));
    l.play("B", "C", Some((2, 2)));
    l.play("A", "C", None);

    let table = compute_standings(&l.store, l.group).unwrap();
    let order: Vec<&str> = table.iter().map(|r| r.team_name.as_str()).collect();
    assert_eq!(order, vec!["A", "C", "B"]);

    let a = &table[0];
    assert_eq!((a.played, a.wins, a.draws, a.losses), (1, 1, 0, 0));
    assert_eq!((a.goals_for, a.goals_against, a.points), (3, 1, 2));

    let c = &table[1];
    assert_eq!((c.played, c.wins, c.draws, c.losses), (1, 0, 1, 0));
    assert_eq!((c.goals_for, c.goals_against, c.points), (2, 2, 1));
    assert_eq!(c.goal_difference(), 0);

    let b = &table[2];
    assert_eq!((b.played, b.wins, b.draws, b.losses), (2, 0, 1, 1));
    assert_eq!((b.goals_for, b.goals_against, b.points), (3, 5, 1));
    assert_eq!(b.goal_difference(), -2);
}

#[test]
fn teams_without_results_still_get_a_row() {
    let l = league(&["Sokol", "Dukla", "Zubri", "Lovosice"]);
    l.play("Sokol", "Dukla", Some((30, 28)));

    let table = compute_standings(&l.store, l.group).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table[0].team_name, "Sokol");
    assert_eq!(table.iter().filter(|r| r.played == 0).count(), 2);
}

#[test]
fn pending_and_unscored_matches_do_not_count() {
    let l = league(&["A", "B"]);
    let mut pending = l.play("A", "B", None);
    pending.start().unwrap();
    l.store.update_match(&pending).unwrap();

    // Done but with a missing score: ignored rather than read as 0-0.
    let mut broken = l.play("B", "A", Some((5, 5)));
    broken.away_score = None;
    l.store.update_match(&broken).unwrap();

    let table = compute_standings(&l.store, l.group).unwrap();
    assert!(table.iter().all(|r| r.played == 0 && r.points == 0));
}

#[test]
fn recomputation_reflects_corrected_scores() {
    let l = league(&["A", "B"]);
    let mut m = l.play("A", "B", Some((10, 12)));
    assert_eq!(compute_standings(&l.store, l.group).unwrap()[0].team_name, "B");

    m.finish(13, 12).unwrap();
    l.store.update_match(&m).unwrap();
    let table = compute_standings(&l.store, l.group).unwrap();
    assert_eq!(table[0].team_name, "A");
    assert_eq!(table[0].played, 1);
}

#[test]
fn unknown_group_is_not_found() {
    let l = league(&["A"]);
    let missing = Uuid::new_v4();
    assert_eq!(
        compute_standings(&l.store, missing),
        Err(EngineError::GroupNotFound(missing))
    );
}
