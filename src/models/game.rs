//! Match (game), slot, score and status types for bracket and pool play.

use crate::models::competitor::CompetitorId;
use crate::models::court::{CourtId, TimeSlot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two competitor slots of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[default]
    One,
    Two,
}

impl Team {
    /// Slot fed by the match at `position` of the previous round (even -> One, odd -> Two).
    pub fn from_position(position: u32) -> Self {
        if position % 2 == 0 {
            Team::One
        } else {
            Team::Two
        }
    }

    pub fn other(self) -> Self {
        match self {
            Team::One => Team::Two,
            Team::Two => Team::One,
        }
    }
}

/// Which part of the bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
    /// Round robin and swiss rounds.
    Pool,
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Slot exists; one or both competitors may be unresolved.
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Completed,
    /// Advanced without play (at most one competitor present).
    Bye,
    Cancelled,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed | MatchStatus::Bye | MatchStatus::Cancelled
        )
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Bye => "bye",
            MatchStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Final score, team one first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub team_1: u32,
    pub team_2: u32,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchFlags {
    pub is_finals: bool,
    pub is_third_place: bool,
    pub is_consolation: bool,
}

/// A single match. Downstream linkage is derived from `(side, round_number, bracket_position)`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub side: BracketSide,
    pub round_number: u32,
    /// Position within the round (0-based).
    pub bracket_position: u32,
    /// None while the slot is unresolved (TBD).
    pub team_1: Option<CompetitorId>,
    pub team_2: Option<CompetitorId>,
    /// Slots that will never receive a competitor.
    #[serde(default)]
    pub vacant: Vec<Team>,
    pub score: Option<Score>,
    pub status: MatchStatus,
    pub winner: Option<CompetitorId>,
    pub scheduled_time: Option<TimeSlot>,
    pub court_id: Option<CourtId>,
    #[serde(default)]
    pub flags: MatchFlags,
    /// Optimistic concurrency counter, bumped on every mutation.
    pub version: u64,
}

impl GameMatch {
    pub fn new(side: BracketSide, round_number: u32, bracket_position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            round_number,
            bracket_position,
            team_1: None,
            team_2: None,
            vacant: Vec::new(),
            score: None,
            status: MatchStatus::Pending,
            winner: None,
            scheduled_time: None,
            court_id: None,
            flags: MatchFlags::default(),
            version: 0,
        }
    }

    /// A pool match between two known competitors.
    pub fn between(round_number: u32, bracket_position: u32, team_1: CompetitorId, team_2: CompetitorId) -> Self {
        Self {
            team_1: Some(team_1),
            team_2: Some(team_2),
            ..Self::new(BracketSide::Pool, round_number, bracket_position)
        }
    }

    pub fn with_flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn competitor(&self, team: Team) -> Option<CompetitorId> {
        match team {
            Team::One => self.team_1,
            Team::Two => self.team_2,
        }
    }

    pub fn set_competitor(&mut self, team: Team, id: CompetitorId) {
        match team {
            Team::One => self.team_1 = Some(id),
            Team::Two => self.team_2 = Some(id),
        }
    }

    pub fn is_vacant(&self, team: Team) -> bool {
        self.vacant.contains(&team)
    }

    /// Slot already holds a competitor or is known to stay empty.
    pub fn is_slot_resolved(&self, team: Team) -> bool {
        self.competitor(team).is_some() || self.is_vacant(team)
    }

    /// Both competitors known.
    pub fn is_ready(&self) -> bool {
        self.team_1.is_some() && self.team_2.is_some()
    }

    pub fn competitors(&self) -> Vec<CompetitorId> {
        self.team_1.iter().chain(self.team_2.iter()).copied().collect()
    }

    pub fn involves(&self, id: CompetitorId) -> bool {
        self.team_1 == Some(id) || self.team_2 == Some(id)
    }

    /// The competitor that did not win, once a winner exists.
    pub fn loser(&self) -> Option<CompetitorId> {
        let winner = self.winner?;
        self.competitors().into_iter().find(|&c| c != winner)
    }

    pub fn is_assigned(&self) -> bool {
        self.court_id.is_some() && self.scheduled_time.is_some()
    }

    /// Ready, unassigned and still pending: eligible for court assignment.
    pub fn is_schedulable(&self) -> bool {
        self.status == MatchStatus::Pending && self.is_ready() && !self.is_assigned()
    }

    /// Played to a result (byes excluded).
    pub fn is_decisive(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_from_position() {
        assert_eq!(Team::from_position(0), Team::One);
        assert_eq!(Team::from_position(3), Team::Two);
        assert_eq!(Team::One.other(), Team::Two);
    }

    #[test]
    fn loser_is_the_other_competitor() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut m = GameMatch::between(1, 0, a, b);
        assert_eq!(m.loser(), None);
        m.winner = Some(b);
        assert_eq!(m.loser(), Some(a));
        assert!(m.is_schedulable());
    }
}
