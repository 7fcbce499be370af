//! Tournament business logic: seeding, bracket building, match lifecycle, court assignment.

mod assignment;
mod builder;
mod conflicts;
mod elimination;
mod match_state;
mod round_robin;
mod scheduling;
mod seeding;
mod standings;
mod swiss;

pub use assignment::{
    build_problem, default_importance, plan_assignments, strategy_for, AssignmentOutcome, AssignmentProblem,
    AssignmentStrategy, AssignmentWarning, Candidate, ExactStrategy, GreedyStrategy, OptimizerSettings,
    ProblemMatch, ScoringWeights, StrategyKind,
};
pub use builder::{
    build_bracket, builder_for, BracketBuilder, DoubleEliminationBuilder, RoundRobinBuilder,
    SingleEliminationBuilder, SwissBuilder,
};
pub use conflicts::{scheduled_matches, validate_schedule, validate_tournament};
pub use elimination::{advancement, losers_round_size, losers_rounds, Advancement, SlotRef};
pub use match_state::{cancel_match, cancel_tournament, report_match_result, schedule_match, start_match};
pub use round_robin::{circle_rounds, CircleRound};
pub use scheduling::{assign_courts, commit_assignments};
pub use seeding::{bracket_order, bracket_size, compare_by_ranking, first_round_pairs, seed_competitors};
pub use standings::{standings, Standing};
pub use swiss::{generate_next_swiss_round, swiss_round_count};
