//! Competitor and Record data structures.

use crate::models::court::{CourtId, Location};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a competitor (team).
pub type CompetitorId = Uuid;

/// Win/loss record used as the ranking metric for seeding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub points_for: u32,
    #[serde(default)]
    pub points_against: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self {
            wins,
            losses,
            ..Self::default()
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    /// Share of games won; zero when no games have been played.
    pub fn win_percentage(&self) -> f64 {
        match self.games_played() {
            0 => 0.0,
            played => f64::from(self.wins) / f64::from(played),
        }
    }

    pub fn point_differential(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

/// A team entered in the tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default = "Uuid::new_v4")]
    pub id: CompetitorId,
    pub name: String,
    /// Rank 1..n once seeded. Manual seeding reads it as input.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Record coming into the tournament (ranking metric).
    #[serde(default)]
    pub record: Record,
    /// Preferred court ids, most preferred first.
    #[serde(default)]
    pub preferred_courts: Vec<CourtId>,
    /// Home venue, for travel distance.
    #[serde(default)]
    pub home_venue: Option<Location>,
}

impl Competitor {
    /// Create a new competitor with the given name and an empty record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed: None,
            record: Record::default(),
            preferred_courts: Vec::new(),
            home_venue: None,
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_preferred_courts(mut self, courts: Vec<CourtId>) -> Self {
        self.preferred_courts = courts;
        self
    }

    pub fn with_home_venue(mut self, location: Location) -> Self {
        self.home_venue = Some(location);
        self
    }
}
