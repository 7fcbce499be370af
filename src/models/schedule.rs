//! Court assignment criteria, placed assignments and schedule conflicts.

use crate::models::competitor::CompetitorId;
use crate::models::court::{CourtId, PrimeTime, TimeSlot};
use crate::models::game::MatchId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Exclusive hold on a court: only the listed matches may use it while the
/// reservation window is active (the whole day when `window` is None).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CourtReservation {
    pub court_id: CourtId,
    #[serde(default)]
    pub window: Option<TimeSlot>,
    pub match_ids: BTreeSet<MatchId>,
}

impl CourtReservation {
    pub fn new(court_id: CourtId, window: Option<TimeSlot>, match_ids: impl IntoIterator<Item = MatchId>) -> Self {
        Self {
            court_id,
            window,
            match_ids: match_ids.into_iter().collect(),
        }
    }

    /// True if the reservation blocks `slot` on `court_id`.
    pub fn covers(&self, court_id: CourtId, slot: &TimeSlot) -> bool {
        self.court_id == court_id && self.window.map_or(true, |w| w.overlaps(slot))
    }

    /// True if `slot` on `court_id` is a place this reservation grants to its matches.
    pub fn grants(&self, court_id: CourtId, slot: &TimeSlot) -> bool {
        self.court_id == court_id && self.window.map_or(true, |w| w.contains(slot))
    }
}

/// Weighted soft-constraint configuration for one assignment batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtAssignmentCriteria {
    /// Match importance 0..=10. Absent matches use a default derived from their flags.
    pub match_importance: BTreeMap<MatchId, u8>,
    /// Per-team ordered court preference. Overrides the competitor's own list.
    pub team_preferences: BTreeMap<CompetitorId, Vec<CourtId>>,
    pub court_reservations: Vec<CourtReservation>,
    pub minimize_travel: bool,
    pub balance_load: bool,
    pub preserve_continuity: bool,
    pub prime_time: Option<PrimeTime>,
}

/// A placed match: court plus time slot.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub match_id: MatchId,
    pub court_id: CourtId,
    pub slot: TimeSlot,
}

/// Input row for schedule validation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub match_id: MatchId,
    pub court_id: CourtId,
    pub slot: TimeSlot,
    pub competitors: Vec<CompetitorId>,
}

/// What is double booked.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ConflictEntity {
    Court(CourtId),
    Competitor(CompetitorId),
}

/// Two matches overlapping on the same court or competitor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub entity: ConflictEntity,
    pub match_a: MatchId,
    pub match_b: MatchId,
}
