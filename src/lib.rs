//! Youth league tournaments: library with models and scheduling logic.
//!
//! Brackets are built from seeded competitors, results advance winners through
//! the bracket under optimistic versioning, and courts are assigned to playable
//! matches under hard constraints and a weighted soft objective.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    assign_courts, build_bracket, cancel_match, cancel_tournament, commit_assignments, generate_next_swiss_round,
    plan_assignments, report_match_result, schedule_match, seed_competitors, standings, start_match,
    validate_schedule, validate_tournament, AssignmentOutcome, AssignmentWarning, OptimizerSettings, Standing,
    StrategyKind,
};
pub use models::{
    Assignment, BracketOptions, BracketSide, BracketStructure, Competitor, CompetitorId, Conflict, ConflictEntity,
    Court, CourtAssignmentCriteria, CourtId, CourtReservation, GameMatch, Location, MatchFlags, MatchId, MatchStatus,
    PrimeTime, Record, Round, ScheduledMatch, Score, SeedingMethod, Team, TimeSlot, Tournament, TournamentError, TournamentFormat,
    TournamentId, TournamentState,
};
pub use store::{TournamentRepository, TournamentStore};
