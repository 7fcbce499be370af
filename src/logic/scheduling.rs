//! Court assignment batches: plan on a snapshot, validate the whole batch, commit all or nothing.

use crate::logic::assignment::{plan_assignments, AssignmentOutcome, OptimizerSettings};
use crate::logic::conflicts::{conflicts_touching, scheduled_matches, validate_schedule};
use crate::logic::match_state::schedule_match;
use crate::models::{
    CourtAssignmentCriteria, CourtReservation, GameMatch, MatchId, ScheduledMatch, Tournament, TournamentError,
    TournamentState,
};

/// Validate a planned batch against the committed schedule and apply it.
///
/// Any double booking rejects the whole batch with `DoubleBookingConflict`;
/// nothing is written unless every placement succeeds.
pub fn commit_assignments(
    tournament: &mut Tournament,
    outcome: &AssignmentOutcome,
    reservations: &[CourtReservation],
) -> Result<Vec<GameMatch>, TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    if outcome.placed.is_empty() {
        return Ok(Vec::new());
    }

    let proposed: Vec<MatchId> = outcome.placed.iter().map(|a| a.match_id).collect();
    let mut rows: Vec<ScheduledMatch> = scheduled_matches(tournament)
        .into_iter()
        .filter(|row| !proposed.contains(&row.match_id))
        .collect();
    for a in &outcome.placed {
        let m = tournament
            .get_match(a.match_id)
            .ok_or(TournamentError::MatchNotFound(a.match_id))?;
        if !m.is_schedulable() {
            return Err(TournamentError::MatchNotPlayable {
                match_id: m.id,
                status: m.status,
            });
        }
        rows.push(ScheduledMatch {
            match_id: a.match_id,
            court_id: a.court_id,
            slot: a.slot,
            competitors: m.competitors(),
        });
    }

    let conflicts = conflicts_touching(validate_schedule(&rows, reservations), &proposed);
    if !conflicts.is_empty() {
        log::warn!(
            "Rejected assignment batch for tournament {}: {} conflict(s)",
            tournament.id,
            conflicts.len()
        );
        return Err(TournamentError::DoubleBookingConflict(conflicts));
    }

    let mut snapshot = tournament.clone();
    let mut updated = Vec::with_capacity(outcome.placed.len());
    for a in &outcome.placed {
        updated.push(schedule_match(&mut snapshot, a.match_id, a.court_id, a.slot)?);
    }
    snapshot.revision = tournament.revision + 1;
    *tournament = snapshot;

    log::info!(
        "Committed {} court assignment(s) for tournament {} ({} unplaced)",
        updated.len(),
        tournament.id,
        outcome.unplaced.len()
    );
    Ok(updated)
}

/// Plan and commit court assignments for every newly schedulable match.
pub fn assign_courts(
    tournament: &mut Tournament,
    criteria: &CourtAssignmentCriteria,
    settings: &OptimizerSettings,
) -> Result<AssignmentOutcome, TournamentError> {
    let outcome = plan_assignments(tournament, criteria, settings)?;
    commit_assignments(tournament, &outcome, &criteria.court_reservations)?;
    Ok(outcome)
}
