//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tournament_scheduler::{
    build_bracket, report_match_result, schedule_match, start_match, BracketOptions, Competitor, CompetitorId,
    Court, GameMatch, Location, MatchId, MatchStatus, Record, TimeSlot, Tournament, TournamentError,
    TournamentFormat,
};

/// Tournament day, UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 2, hour, minute, 0).unwrap()
}

/// One-hour slot starting on the hour.
pub fn slot(hour: u32) -> TimeSlot {
    TimeSlot::starting_at(at(hour, 0), Duration::hours(1))
}

pub fn court(name: &str, open: u32, close: u32) -> Court {
    Court::new(name, Location::new(47.6, -122.3)).with_window(TimeSlot::new(at(open, 0), at(close, 0)))
}

/// Team 1 has the best record, team n the worst, so seeds follow input order.
pub fn ranked_competitors(n: usize) -> Vec<Competitor> {
    (0..n)
        .map(|i| Competitor::new(format!("Team {}", i + 1)).with_record(Record::new((n - i) as u32, i as u32)))
        .collect()
}

/// Built tournament with one all-day court registered.
pub fn tournament(n: usize, format: TournamentFormat, options: BracketOptions) -> Tournament {
    let mut t = build_bracket("Spring Cup", ranked_competitors(n), format, options).unwrap();
    t.set_courts(vec![court("Court 1", 8, 20)]).unwrap();
    t
}

pub fn seed_of(t: &Tournament, id: CompetitorId) -> u32 {
    t.competitor(id).and_then(|c| c.seed).unwrap()
}

/// Start an already scheduled match and report its score.
pub fn finish(t: &mut Tournament, match_id: MatchId, score_1: u32, score_2: u32) -> Result<Vec<GameMatch>, TournamentError> {
    let version = t.get_match(match_id).unwrap().version;
    let started = start_match(t, match_id, version)?;
    report_match_result(t, match_id, score_1, score_2, started.version)
}

/// Schedule on the first court, start and report.
pub fn play(t: &mut Tournament, match_id: MatchId, score_1: u32, score_2: u32) -> Result<Vec<GameMatch>, TournamentError> {
    let court_id = t.courts[0].id;
    schedule_match(t, match_id, court_id, slot(9))?;
    finish(t, match_id, score_1, score_2)
}

/// Play every ready match, better seed winning 3-1, until none is left. Returns the count played.
pub fn play_out(t: &mut Tournament) -> usize {
    let mut played = 0;
    loop {
        let next = t
            .matches
            .iter()
            .find(|m| m.status == MatchStatus::Pending && m.is_ready())
            .cloned();
        let Some(m) = next else { break };
        let (a, b) = (m.team_1.unwrap(), m.team_2.unwrap());
        let (s1, s2) = if seed_of(t, a) < seed_of(t, b) { (3, 1) } else { (1, 3) };
        play(t, m.id, s1, s2).unwrap();
        played += 1;
    }
    played
}
