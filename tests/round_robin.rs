//! Integration tests for round robin rounds and standings.

mod common;

use common::{play, play_out, seed_of, tournament};
use std::collections::{HashMap, HashSet};
use tournament_scheduler::{standings, BracketOptions, CompetitorId, Tournament, TournamentFormat, TournamentState};

fn pair(a: CompetitorId, b: CompetitorId) -> (CompetitorId, CompetitorId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn meetings(t: &Tournament) -> HashMap<(CompetitorId, CompetitorId), usize> {
    let mut count = HashMap::new();
    for m in &t.matches {
        *count.entry(pair(m.team_1.unwrap(), m.team_2.unwrap())).or_insert(0) += 1;
    }
    count
}

fn assert_nobody_plays_twice_per_round(t: &Tournament) {
    for round in &t.bracket.rounds {
        let mut seen = HashSet::new();
        for id in &round.match_ids {
            let m = t.get_match(*id).unwrap();
            for c in m.competitors() {
                assert!(seen.insert(c), "competitor twice in round {}", round.round_number);
            }
        }
    }
}

#[test]
fn six_competitors_meet_once() {
    let t = tournament(6, TournamentFormat::RoundRobin, BracketOptions::default());
    assert_eq!(t.matches.len(), 15);
    assert_eq!(t.bracket.total_rounds, 5);
    assert!(t.bracket.rounds.iter().all(|r| r.match_ids.len() == 3));

    let met = meetings(&t);
    assert_eq!(met.len(), 15);
    assert!(met.values().all(|&n| n == 1));
    assert_nobody_plays_twice_per_round(&t);
}

#[test]
fn double_round_robin_swaps_slots() {
    let options = BracketOptions {
        round_robin_cycles: 2,
        ..BracketOptions::default()
    };
    let t = tournament(4, TournamentFormat::RoundRobin, options);
    assert_eq!(t.matches.len(), 12);
    assert_eq!(t.bracket.total_rounds, 6);
    assert!(meetings(&t).values().all(|&n| n == 2));
    assert_nobody_plays_twice_per_round(&t);

    // Each pair hosts once.
    let hosted: HashSet<(CompetitorId, CompetitorId)> =
        t.matches.iter().map(|m| (m.team_1.unwrap(), m.team_2.unwrap())).collect();
    assert_eq!(hosted.len(), 12);
}

#[test]
fn odd_field_sits_one_out_per_round() {
    let t = tournament(5, TournamentFormat::RoundRobin, BracketOptions::default());
    assert_eq!(t.matches.len(), 10);
    assert_eq!(t.bracket.total_rounds, 5);
    let byes: HashSet<CompetitorId> = t.bracket.rounds.iter().flat_map(|r| r.byes.clone()).collect();
    assert_eq!(byes.len(), 5);
    assert!(t.bracket.rounds.iter().all(|r| r.match_ids.len() == 2 && r.byes.len() == 1));
}

#[test]
fn standings_decide_the_champion() {
    let mut t = tournament(4, TournamentFormat::RoundRobin, BracketOptions::default());
    assert_eq!(play_out(&mut t), 6);
    assert_eq!(t.state, TournamentState::Completed);

    let table = standings(&t);
    let wins: Vec<u32> = table.iter().map(|s| s.wins).collect();
    assert_eq!(wins, vec![3, 2, 1, 0]);
    assert_eq!(table.iter().map(|s| s.seed).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(seed_of(&t, t.champion.unwrap()), 1);
}

#[test]
fn huge_scores_saturate_point_totals() {
    let options = BracketOptions {
        round_robin_cycles: 2,
        ..BracketOptions::default()
    };
    let mut t = tournament(2, TournamentFormat::RoundRobin, options);
    let ids: Vec<_> = t.matches.iter().map(|m| m.id).collect();
    for id in ids {
        let m = t.get_match(id).unwrap();
        let (s1, s2) = if seed_of(&t, m.team_1.unwrap()) == 1 { (u32::MAX, 0) } else { (0, u32::MAX) };
        play(&mut t, id, s1, s2).unwrap();
    }

    let table = standings(&t);
    assert_eq!(table[0].wins, 2);
    assert_eq!(table[0].points_for, u32::MAX);
    assert_eq!(table[1].points_against, u32::MAX);
}
