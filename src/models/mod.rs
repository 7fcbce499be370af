//! Data structures for tournaments: competitors, matches, brackets, courts and schedules.

mod bracket;
mod competitor;
mod court;
mod game;
mod schedule;
mod tournament;

pub use bracket::{BracketOptions, BracketStructure, Round, SeedingMethod, TournamentFormat};
pub use competitor::{Competitor, CompetitorId, Record};
pub use court::{Court, CourtId, Location, PrimeTime, TimeSlot};
pub use game::{BracketSide, GameMatch, MatchFlags, MatchId, MatchStatus, Score, Team};
pub use schedule::{
    Assignment, Conflict, ConflictEntity, CourtAssignmentCriteria, CourtReservation, ScheduledMatch,
};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentState};
