//! Integration tests for bracket construction and play-through of the elimination formats.

mod common;

use common::{play, play_out, ranked_competitors, seed_of, tournament};
use tournament_scheduler::{
    build_bracket, standings, BracketOptions, BracketSide, Competitor, MatchFlags, MatchId, MatchStatus, Team, Tournament,
    TournamentError, TournamentFormat, TournamentState,
};

fn decisive(t: &Tournament) -> usize {
    t.matches.iter().filter(|m| m.is_decisive()).count()
}

fn at_pos(t: &Tournament, side: BracketSide, round_number: u32, position: u32) -> MatchId {
    t.match_at(side, round_number, position).unwrap().id
}

#[test]
fn fewer_than_two_competitors_is_rejected() {
    for n in 0..2 {
        let err = build_bracket("Cup", ranked_competitors(n), TournamentFormat::SingleElimination, BracketOptions::default())
            .unwrap_err();
        assert_eq!(err, TournamentError::InvalidBracketSize { competitors: n });
    }
}

#[test]
fn duplicate_competitor_is_rejected() {
    let mut field = ranked_competitors(3);
    field.push(field[0].clone());
    let dup = field[0].id;
    assert_eq!(
        build_bracket("Cup", field, TournamentFormat::RoundRobin, BracketOptions::default()).unwrap_err(),
        TournamentError::DuplicateCompetitor(dup)
    );
}

#[test]
fn single_elimination_plays_n_minus_one_matches() {
    for n in 2..=17 {
        let mut t = tournament(n, TournamentFormat::SingleElimination, BracketOptions::default());
        assert_eq!(t.bracket.total_matches as usize, t.matches.len());
        let played = play_out(&mut t);
        assert_eq!(played, n - 1, "n = {n}");
        assert_eq!(decisive(&t), n - 1);
        assert_eq!(t.state, TournamentState::Completed, "n = {n}");
        assert_eq!(seed_of(&t, t.champion.unwrap()), 1);
    }
}

#[test]
fn five_competitors_give_top_three_seeds_byes() {
    let t = tournament(5, TournamentFormat::SingleElimination, BracketOptions::default());
    assert_eq!(t.bracket.bracket_size, 8);
    assert_eq!(t.bracket.total_rounds, 3);
    assert_eq!(t.bracket.rounds[0].match_ids.len(), 4);

    let first_round: Vec<_> = t
        .matches
        .iter()
        .filter(|m| m.side == BracketSide::Winners && m.round_number == 1)
        .collect();
    let mut bye_winners: Vec<u32> = first_round
        .iter()
        .filter(|m| m.status == MatchStatus::Bye)
        .map(|m| seed_of(&t, m.winner.unwrap()))
        .collect();
    bye_winners.sort();
    assert_eq!(bye_winners, vec![1, 2, 3]);

    let playable: Vec<_> = first_round.iter().filter(|m| m.status == MatchStatus::Pending).collect();
    assert_eq!(playable.len(), 1);
    let seeds = (seed_of(&t, playable[0].team_1.unwrap()), seed_of(&t, playable[0].team_2.unwrap()));
    assert_eq!(seeds, (4, 5));

    // Seeds 2 and 3 already meet in round two; seed 1 waits for the 4/5 winner.
    let top = t.match_at(BracketSide::Winners, 2, 0).unwrap();
    assert_eq!(top.team_1.map(|c| seed_of(&t, c)), Some(1));
    assert_eq!(top.team_2, None);
    let bottom = t.match_at(BracketSide::Winners, 2, 1).unwrap();
    assert!(bottom.is_ready());
}

#[test]
fn third_place_match_takes_semifinal_losers() {
    let options = BracketOptions {
        third_place_match: true,
        ..BracketOptions::default()
    };
    let mut t = tournament(4, TournamentFormat::SingleElimination, options);
    assert_eq!(t.matches.len(), 4);

    assert_eq!(play_out(&mut t), 4);
    let third = t.match_at(BracketSide::Winners, 2, 1).unwrap();
    assert_eq!(
        third.flags,
        MatchFlags {
            is_third_place: true,
            ..MatchFlags::default()
        }
    );
    assert_eq!(seed_of(&t, third.winner.unwrap()), 3);
    assert_eq!(seed_of(&t, t.champion.unwrap()), 1);
    assert_eq!(t.state, TournamentState::Completed);
}

#[test]
fn double_elimination_layout_for_eight() {
    let t = tournament(8, TournamentFormat::DoubleElimination, BracketOptions::default());
    let losers = t.bracket.losers_bracket.as_ref().unwrap();
    let sizes: Vec<usize> = losers.iter().map(|r| r.match_ids.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1, 1]);
    assert_eq!(t.bracket.grand_finals.len(), 1);
    // 7 winners + 6 losers + grand final
    assert_eq!(t.matches.len(), 14);
    assert_eq!(t.bracket.total_rounds, 3 + 4 + 1);
}

#[test]
fn double_elimination_everyone_but_the_champion_loses_twice() {
    for n in [5, 8, 11] {
        let mut t = tournament(n, TournamentFormat::DoubleElimination, BracketOptions::default());
        // No reset when the winners-bracket champion takes the grand final.
        assert_eq!(play_out(&mut t), 2 * n - 2, "n = {n}");
        assert_eq!(t.state, TournamentState::Completed);
        let champion = t.champion.unwrap();
        assert_eq!(seed_of(&t, champion), 1);
        for s in standings(&t) {
            let expected = if s.competitor_id == champion { 0 } else { 2 };
            assert_eq!(s.losses, expected, "n = {n}, seed {}", s.seed);
        }
    }
}

#[test]
fn grand_final_reset_when_losers_champion_wins() {
    let mut t = tournament(4, TournamentFormat::DoubleElimination, BracketOptions::default());

    // Winners round 1: 1 beats 4, 2 beats 3
    let (w1a, w1b) = (at_pos(&t, BracketSide::Winners, 1, 0), at_pos(&t, BracketSide::Winners, 1, 1));
    play(&mut t, w1a, 3, 0).unwrap();
    play(&mut t, w1b, 3, 0).unwrap();
    let l1 = t.match_at(BracketSide::Losers, 1, 0).unwrap();
    assert_eq!((seed_of(&t, l1.team_1.unwrap()), seed_of(&t, l1.team_2.unwrap())), (4, 3));

    // Winners final: 1 beats 2, who drops into losers round 2
    let w2 = at_pos(&t, BracketSide::Winners, 2, 0);
    play(&mut t, w2, 3, 1).unwrap();
    let l2 = t.match_at(BracketSide::Losers, 2, 0).unwrap();
    assert_eq!(l2.competitor(Team::Two).map(|c| seed_of(&t, c)), Some(2));

    let (l1, l2) = (at_pos(&t, BracketSide::Losers, 1, 0), at_pos(&t, BracketSide::Losers, 2, 0));
    play(&mut t, l1, 1, 3).unwrap();
    play(&mut t, l2, 1, 3).unwrap();
    let gf = t.match_at(BracketSide::GrandFinal, 1, 0).unwrap().clone();
    assert_eq!(seed_of(&t, gf.team_1.unwrap()), 1);
    assert_eq!(seed_of(&t, gf.team_2.unwrap()), 2);

    // Losers champion wins: a second grand final is created
    let updated = play(&mut t, gf.id, 2, 3).unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(t.bracket.grand_finals.len(), 2);
    assert_eq!(t.champion, None);
    assert_eq!(t.state, TournamentState::InProgress);

    let reset = t.match_at(BracketSide::GrandFinal, 2, 0).unwrap().clone();
    assert!(reset.is_ready());
    play(&mut t, reset.id, 3, 2).unwrap();
    assert_eq!(seed_of(&t, t.champion.unwrap()), 1);
    assert_eq!(t.state, TournamentState::Completed);
    assert_eq!(decisive(&t), 2 * 4 - 1);
}

#[test]
fn no_reset_when_disabled() {
    let options = BracketOptions {
        true_final_reset: false,
        ..BracketOptions::default()
    };
    let mut t = tournament(2, TournamentFormat::DoubleElimination, options);
    let first = t.match_at(BracketSide::Winners, 1, 0).unwrap().id;
    play(&mut t, first, 3, 1).unwrap();

    // Two competitors: the winners final loser goes straight to the grand final.
    let gf = t.match_at(BracketSide::GrandFinal, 1, 0).unwrap().clone();
    assert!(gf.is_ready());
    play(&mut t, gf.id, 1, 3).unwrap();
    assert_eq!(t.bracket.grand_finals.len(), 1);
    assert_eq!(seed_of(&t, t.champion.unwrap()), 2);
    assert_eq!(t.state, TournamentState::Completed);
}

#[test]
fn manual_seeds_are_placed_as_given() {
    let field: Vec<Competitor> = ranked_competitors(4)
        .into_iter()
        .zip([4, 3, 2, 1])
        .map(|(c, s)| c.with_seed(s))
        .collect();
    let last = field[3].id;
    let options = BracketOptions {
        seeding: tournament_scheduler::SeedingMethod::Manual,
        ..BracketOptions::default()
    };
    let t = build_bracket("Cup", field, TournamentFormat::SingleElimination, options).unwrap();
    assert_eq!(t.competitors[0].id, last);
    assert_eq!(t.match_at(BracketSide::Winners, 1, 0).unwrap().team_1, Some(last));
}
