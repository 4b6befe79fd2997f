//! Handball tournament scheduling engine: library with models, algorithms and a store port.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{load_timetable, read_timetable, EngineConfig, SchedulingConfig, MAX_DAY_OFFSET};
pub use logic::{
    apply_variant, compute_standings, create_blank_matches, fixtures_for_edition,
    fixtures_for_groups, generate_slots, partition_into, partition_variants, round_robin_pairings,
    schedule_category, schedule_edition, tabulate, CourtRule, CourtRules, Pairing, ScheduleReport,
    SchedulingSession, GROUP_COUNTS,
};
pub use models::{
    Category, CategoryId, CourtSchedule, EditionId, EngineError, Group, GroupAssignmentVariant,
    GroupId, GroupStanding, Match, MatchId, MatchState, Slot, Team, TeamId, TeamWithAttributes,
    DEFAULT_INTERVAL_MINUTES,
};
pub use store::{MatchStore, MemoryStore};
