//! Schedule validation: double booking of courts and competitors.

use crate::models::{
    Conflict, ConflictEntity, CourtId, CourtReservation, MatchId, MatchStatus, ScheduledMatch, Tournament,
};
use std::collections::BTreeMap;

/// Report every pair of assignments that overlap on the same court or the same
/// competitor. Court overlaps are allowed when one reservation on that court
/// grants both matches their slots.
pub fn validate_schedule(assignments: &[ScheduledMatch], reservations: &[CourtReservation]) -> Vec<Conflict> {
    let mut by_entity: BTreeMap<ConflictEntity, Vec<&ScheduledMatch>> = BTreeMap::new();
    for a in assignments {
        by_entity.entry(ConflictEntity::Court(a.court_id)).or_default().push(a);
        for &c in &a.competitors {
            by_entity.entry(ConflictEntity::Competitor(c)).or_default().push(a);
        }
    }

    let mut conflicts = Vec::new();
    for (entity, mut rows) in by_entity {
        rows.sort_by_key(|a| (a.slot.start, a.match_id));
        for (i, a) in rows.iter().enumerate() {
            for b in rows[i + 1..].iter().take_while(|b| b.slot.start < a.slot.end) {
                if a.match_id == b.match_id {
                    continue;
                }
                if let ConflictEntity::Court(court) = entity {
                    if co_reserved(reservations, court, a, b) {
                        continue;
                    }
                }
                conflicts.push(Conflict {
                    entity,
                    match_a: a.match_id,
                    match_b: b.match_id,
                });
            }
        }
    }
    conflicts
}

fn co_reserved(reservations: &[CourtReservation], court: CourtId, a: &ScheduledMatch, b: &ScheduledMatch) -> bool {
    reservations.iter().any(|r| {
        r.match_ids.contains(&a.match_id)
            && r.match_ids.contains(&b.match_id)
            && r.grants(court, &a.slot)
            && r.grants(court, &b.slot)
    })
}

/// Assignments currently held by the tournament's matches (cancelled ones excluded).
pub fn scheduled_matches(tournament: &Tournament) -> Vec<ScheduledMatch> {
    tournament
        .matches
        .iter()
        .filter(|m| m.status != MatchStatus::Cancelled)
        .filter_map(|m| {
            Some(ScheduledMatch {
                match_id: m.id,
                court_id: m.court_id?,
                slot: m.scheduled_time?,
                competitors: m.competitors(),
            })
        })
        .collect()
}

/// Re-check a tournament's committed schedule, e.g. after manual overrides.
pub fn validate_tournament(tournament: &Tournament, reservations: &[CourtReservation]) -> Vec<Conflict> {
    validate_schedule(&scheduled_matches(tournament), reservations)
}

/// Conflicts that involve at least one of `proposed`.
pub(crate) fn conflicts_touching(conflicts: Vec<Conflict>, proposed: &[MatchId]) -> Vec<Conflict> {
    conflicts
        .into_iter()
        .filter(|c| proposed.contains(&c.match_a) || proposed.contains(&c.match_b))
        .collect()
}
