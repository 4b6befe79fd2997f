//! Scheduling engine logic: slots, court rules, pairings, placement, standings, group draw.

mod eligibility;
mod pairing;
mod partition;
mod scheduler;
mod slots;
mod standings;

pub use eligibility::{CourtRule, CourtRules};
pub use pairing::round_robin_pairings;
pub use partition::{apply_variant, partition_into, partition_variants, GROUP_COUNTS};
pub use scheduler::{
    schedule_category, schedule_edition, Pairing, ScheduleReport, SchedulingSession,
};
pub use slots::{create_blank_matches, fixtures_for_edition, fixtures_for_groups, generate_slots};
pub use standings::{compute_standings, tabulate};
