//! Integration tests for schedule validation.

mod common;

use common::{at, slot, tournament};
use tournament_scheduler::{
    cancel_match, schedule_match, validate_schedule, validate_tournament, BracketOptions, BracketSide,
    ConflictEntity, CourtReservation, ScheduledMatch, TimeSlot, TournamentFormat,
};
use uuid::Uuid;

fn row(court_id: Uuid, slot: TimeSlot, competitors: Vec<Uuid>) -> ScheduledMatch {
    ScheduledMatch {
        match_id: Uuid::new_v4(),
        court_id,
        slot,
        competitors,
    }
}

#[test]
fn same_court_overlap_is_a_conflict() {
    let court = Uuid::new_v4();
    let a = row(court, slot(10), vec![Uuid::new_v4(), Uuid::new_v4()]);
    let b = row(
        court,
        TimeSlot::new(at(10, 30), at(11, 30)),
        vec![Uuid::new_v4(), Uuid::new_v4()],
    );
    let conflicts = validate_schedule(&[a.clone(), b.clone()], &[]);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].entity, ConflictEntity::Court(court));
    assert_eq!((conflicts[0].match_a, conflicts[0].match_b), (a.match_id, b.match_id));
}

#[test]
fn competitor_on_two_courts_at_once_is_a_conflict() {
    let team = Uuid::new_v4();
    let a = row(Uuid::new_v4(), slot(10), vec![team, Uuid::new_v4()]);
    let b = row(Uuid::new_v4(), slot(10), vec![Uuid::new_v4(), team]);
    let conflicts = validate_schedule(&[a, b], &[]);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].entity, ConflictEntity::Competitor(team));
}

#[test]
fn back_to_back_slots_do_not_overlap() {
    let court = Uuid::new_v4();
    let team = Uuid::new_v4();
    let rows = [
        row(court, slot(10), vec![team, Uuid::new_v4()]),
        row(court, slot(11), vec![team, Uuid::new_v4()]),
    ];
    assert!(validate_schedule(&rows, &[]).is_empty());
}

#[test]
fn co_reserved_matches_may_share_a_court() {
    let court = Uuid::new_v4();
    let a = row(court, slot(10), vec![Uuid::new_v4(), Uuid::new_v4()]);
    let b = row(court, slot(10), vec![Uuid::new_v4(), Uuid::new_v4()]);
    let reservation = CourtReservation::new(court, None, [a.match_id, b.match_id]);
    assert!(validate_schedule(&[a.clone(), b.clone()], &[reservation]).is_empty());

    // A reservation for a different court does not exempt them.
    let elsewhere = CourtReservation::new(Uuid::new_v4(), None, [a.match_id, b.match_id]);
    assert_eq!(validate_schedule(&[a, b], &[elsewhere]).len(), 1);
}

#[test]
fn manual_overrides_are_checked_and_cancelled_matches_ignored() {
    let mut t = tournament(4, TournamentFormat::SingleElimination, BracketOptions::default());
    let court = t.courts[0].id;
    let first = t.match_at(BracketSide::Winners, 1, 0).unwrap().id;
    let second = t.match_at(BracketSide::Winners, 1, 1).unwrap().id;
    schedule_match(&mut t, first, court, slot(9)).unwrap();
    schedule_match(&mut t, second, court, slot(9)).unwrap();

    let conflicts = validate_tournament(&t, &[]);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].entity, ConflictEntity::Court(court));

    cancel_match(&mut t, second).unwrap();
    assert!(validate_tournament(&t, &[]).is_empty());
}
