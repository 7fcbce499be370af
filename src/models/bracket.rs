//! Tournament format, bracket options and the round/bracket structure.

use crate::models::competitor::CompetitorId;
use crate::models::game::MatchId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl std::fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentFormat::SingleElimination => write!(f, "single_elimination"),
            TournamentFormat::DoubleElimination => write!(f, "double_elimination"),
            TournamentFormat::RoundRobin => write!(f, "round_robin"),
            TournamentFormat::Swiss => write!(f, "swiss"),
        }
    }
}

/// How seeds 1..n are assigned before placement.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Win percentage, then point differential, then id.
    #[default]
    Ranking,
    /// Keep the seeds supplied on the competitors; unseeded ones follow by ranking.
    Manual,
    /// Reproducible draw from the given rng seed.
    Random { seed: u64 },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketOptions {
    pub seeding: SeedingMethod,
    /// Single elimination: semifinal losers play for third place.
    pub third_place_match: bool,
    /// Double elimination: replay the grand final if the losers-bracket champion wins it.
    pub true_final_reset: bool,
    /// Round robin: 1 or 2 meetings per pair.
    pub round_robin_cycles: u32,
    /// Swiss: number of rounds. Defaults to ceil(log2 n).
    pub swiss_rounds: Option<u32>,
}

impl Default for BracketOptions {
    fn default() -> Self {
        Self {
            seeding: SeedingMethod::Ranking,
            third_place_match: false,
            true_final_reset: true,
            round_robin_cycles: 1,
            swiss_rounds: None,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round_number: u32,
    pub match_ids: Vec<MatchId>,
    /// Competitors sitting out this round (round robin with an odd count).
    #[serde(default)]
    pub byes: Vec<CompetitorId>,
}

impl Round {
    pub fn new(round_number: u32) -> Self {
        Self {
            round_number,
            ..Self::default()
        }
    }
}

/// Rounds of match ids. Matches themselves live in the tournament's flat collection.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketStructure {
    pub format: TournamentFormat,
    /// Power of two for elimination formats, competitor count otherwise.
    pub bracket_size: u32,
    pub total_rounds: u32,
    pub total_matches: u32,
    pub rounds: Vec<Round>,
    /// Present only for double elimination.
    pub losers_bracket: Option<Vec<Round>>,
    /// Grand final, plus the reset match once it is created.
    #[serde(default)]
    pub grand_finals: Vec<MatchId>,
}

impl BracketStructure {
    /// Rounds in the winners bracket (log2 of the bracket size) for elimination formats.
    pub fn winners_rounds(&self) -> u32 {
        self.bracket_size.max(1).trailing_zeros()
    }
}
