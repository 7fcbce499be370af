//! Tournament aggregate, TournamentState and TournamentError.

use crate::models::bracket::{BracketOptions, BracketStructure, TournamentFormat};
use crate::models::competitor::{Competitor, CompetitorId};
use crate::models::court::{Court, CourtId};
use crate::models::game::{BracketSide, GameMatch, MatchId, MatchStatus};
use crate::models::schedule::Conflict;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Fewer than 2 competitors.
    InvalidBracketSize { competitors: usize },
    /// Equal scores submitted for a match that needs a winner.
    TieScoreRejected { match_id: MatchId },
    /// Hard-constraint violations found while validating a batch.
    DoubleBookingConflict(Vec<Conflict>),
    /// Supplied version does not match the stored one.
    ConcurrentModification {
        match_id: MatchId,
        supplied: u64,
        current: u64,
    },
    /// Downstream slot was already resolved.
    StaleBracketState { match_id: MatchId },
    MatchNotFound(MatchId),
    /// Match is not in a state that allows this action.
    MatchNotPlayable { match_id: MatchId, status: MatchStatus },
    CourtNotFound(CourtId),
    /// The same competitor id was entered twice.
    DuplicateCompetitor(CompetitorId),
    /// Tournament is not in a state (or format) that allows this action.
    InvalidState,
    /// Current swiss round still has unfinished matches.
    RoundInProgress { round_number: u32 },
    /// No pairing without a rematch exists for the next swiss round.
    SwissPairingExhausted { round_number: u32 },
    TournamentNotFound(TournamentId),
    /// Tournament changed between snapshot and commit.
    StaleSnapshot { expected: u64, current: u64 },
    /// Store lock poisoned.
    StoreUnavailable,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidBracketSize { competitors } => {
                write!(f, "Need at least 2 competitors to build a bracket (got {})", competitors)
            }
            TournamentError::TieScoreRejected { .. } => write!(f, "Match needs a winner; tie scores are rejected"),
            TournamentError::DoubleBookingConflict(conflicts) => {
                write!(f, "Schedule has {} double booking conflict(s)", conflicts.len())
            }
            TournamentError::ConcurrentModification { supplied, current, .. } => write!(
                f,
                "Match was modified concurrently (version {} supplied, current is {})",
                supplied, current
            ),
            TournamentError::StaleBracketState { .. } => write!(f, "Downstream slot is already resolved"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::MatchNotPlayable { status, .. } => {
                write!(f, "Match is {} and cannot accept this action", status)
            }
            TournamentError::CourtNotFound(_) => write!(f, "Court not found"),
            TournamentError::DuplicateCompetitor(_) => write!(f, "Competitor entered more than once"),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::RoundInProgress { round_number } => {
                write!(f, "Round {} still has unfinished matches", round_number)
            }
            TournamentError::SwissPairingExhausted { round_number } => {
                write!(f, "No rematch-free pairing exists for round {}", round_number)
            }
            TournamentError::TournamentNotFound(_) => write!(f, "No tournament"),
            TournamentError::StaleSnapshot { expected, current } => write!(
                f,
                "Tournament changed during the operation (revision {} expected, current is {})",
                expected, current
            ),
            TournamentError::StoreUnavailable => write!(f, "Tournament store unavailable"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Bracket built; results and schedules are being applied.
    #[default]
    InProgress,
    /// Champion decided and every match closed.
    Completed,
    Cancelled,
}

/// Full tournament state: competitors, flat match collection, bracket rounds, courts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub options: BracketOptions,
    /// Seeded competitors, seed order.
    pub competitors: Vec<Competitor>,
    pub matches: Vec<GameMatch>,
    pub bracket: BracketStructure,
    /// Courts registered from the venue directory.
    pub courts: Vec<Court>,
    pub state: TournamentState,
    pub champion: Option<CompetitorId>,
    /// Bumped on every committed change; used to detect stale snapshots.
    pub revision: u64,
}

impl Tournament {
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        options: BracketOptions,
        competitors: Vec<Competitor>,
        matches: Vec<GameMatch>,
        bracket: BracketStructure,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            options,
            competitors,
            matches,
            bracket,
            courts: Vec::new(),
            state: TournamentState::InProgress,
            champion: None,
            revision: 0,
        }
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Match at a bracket coordinate.
    pub fn match_at(&self, side: BracketSide, round_number: u32, position: u32) -> Option<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.side == side && m.round_number == round_number && m.bracket_position == position)
    }

    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    pub fn court(&self, id: CourtId) -> Option<&Court> {
        self.courts.iter().find(|c| c.id == id)
    }

    /// Replace the registered courts (venue directory refresh).
    pub fn set_courts(&mut self, courts: Vec<Court>) -> Result<(), TournamentError> {
        if self.state != TournamentState::InProgress {
            return Err(TournamentError::InvalidState);
        }
        self.courts = courts;
        self.revision += 1;
        Ok(())
    }

    /// Matches eligible for court assignment.
    pub fn schedulable_matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.matches.iter().filter(|m| m.is_schedulable())
    }

    pub fn is_finished(&self) -> bool {
        self.matches.iter().all(|m| m.status.is_terminal())
    }
}
