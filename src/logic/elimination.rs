//! Single and double elimination: bracket construction and slot routing.
//!
//! Routing is pure arithmetic on `(side, round_number, bracket_position)`; no
//! match holds a reference to another.

use crate::logic::seeding::{bracket_size, first_round_pairs};
use crate::models::{
    BracketOptions, BracketSide, BracketStructure, Competitor, GameMatch, MatchFlags, Round, Team,
    TournamentFormat,
};

/// Target slot of an advancing competitor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotRef {
    pub side: BracketSide,
    pub round_number: u32,
    pub bracket_position: u32,
    pub team: Team,
}

impl SlotRef {
    fn new(side: BracketSide, round_number: u32, bracket_position: u32, team: Team) -> Self {
        Self {
            side,
            round_number,
            bracket_position,
            team,
        }
    }
}

/// Where the winner and loser of a match go. `None` means the result is terminal for them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Advancement {
    pub winner: Option<SlotRef>,
    pub loser: Option<SlotRef>,
}

/// Number of losers-bracket rounds for a winners bracket of `winners_rounds` rounds.
pub fn losers_rounds(winners_rounds: u32) -> u32 {
    2 * winners_rounds.saturating_sub(1)
}

/// Matches in losers round `round` (1-based) of a bracket of `size` slots.
///
/// Odd rounds pair survivors, even rounds take in the winners-bracket drop-downs;
/// each pair of rounds halves the field.
pub fn losers_round_size(size: u32, round: u32) -> u32 {
    size >> ((round + 1) / 2 + 1)
}

/// Build a single elimination bracket from seeded competitors (seed order).
pub fn build_single_elimination(
    seeded: &[Competitor],
    options: &BracketOptions,
) -> (Vec<GameMatch>, BracketStructure) {
    let (mut matches, mut rounds, size) = winners_bracket(seeded, false);
    let winners_rounds = size.trailing_zeros();

    if options.third_place_match && winners_rounds >= 2 {
        let third = GameMatch::new(BracketSide::Winners, winners_rounds, 1).with_flags(MatchFlags {
            is_third_place: true,
            ..MatchFlags::default()
        });
        if let Some(last) = rounds.last_mut() {
            last.match_ids.push(third.id);
        }
        matches.push(third);
    }

    let structure = BracketStructure {
        format: TournamentFormat::SingleElimination,
        bracket_size: size,
        total_rounds: winners_rounds,
        total_matches: matches.len() as u32,
        rounds,
        losers_bracket: None,
        grand_finals: Vec::new(),
    };
    (matches, structure)
}

/// Build a double elimination bracket: winners bracket, losers bracket and grand final.
pub fn build_double_elimination(seeded: &[Competitor]) -> (Vec<GameMatch>, BracketStructure) {
    let (mut matches, rounds, size) = winners_bracket(seeded, true);
    let winners_rounds = size.trailing_zeros();

    let mut losers = Vec::new();
    for lr in 1..=losers_rounds(winners_rounds) {
        let mut round = Round::new(lr);
        for p in 0..losers_round_size(size, lr) {
            let m = GameMatch::new(BracketSide::Losers, lr, p).with_flags(MatchFlags {
                is_consolation: true,
                ..MatchFlags::default()
            });
            round.match_ids.push(m.id);
            matches.push(m);
        }
        losers.push(round);
    }

    let grand_final = GameMatch::new(BracketSide::GrandFinal, 1, 0).with_flags(MatchFlags {
        is_finals: true,
        ..MatchFlags::default()
    });
    let grand_finals = vec![grand_final.id];
    matches.push(grand_final);

    let structure = BracketStructure {
        format: TournamentFormat::DoubleElimination,
        bracket_size: size,
        total_rounds: winners_rounds + losers.len() as u32 + 1,
        total_matches: matches.len() as u32,
        rounds,
        losers_bracket: Some(losers),
        grand_finals,
    };
    (matches, structure)
}

/// Winners bracket shared by both elimination formats. Round one is filled
/// from the seed pairs; absent seeds become vacant slots.
fn winners_bracket(seeded: &[Competitor], double: bool) -> (Vec<GameMatch>, Vec<Round>, u32) {
    let size = bracket_size(seeded.len());
    let total = size.trailing_zeros();
    let pairs = first_round_pairs(seeded.len());

    let mut matches = Vec::with_capacity(size as usize);
    let mut rounds = Vec::with_capacity(total as usize);
    for r in 1..=total {
        let mut round = Round::new(r);
        for p in 0..(size >> r) {
            let mut m = GameMatch::new(BracketSide::Winners, r, p);
            if r == total && !double {
                m.flags.is_finals = true;
            }
            if r == 1 {
                let (high, low) = pairs[p as usize];
                m.team_1 = Some(seeded[high as usize - 1].id);
                match low {
                    Some(low) => m.team_2 = Some(seeded[low as usize - 1].id),
                    None => m.vacant.push(Team::Two),
                }
            }
            round.match_ids.push(m.id);
            matches.push(m);
        }
        rounds.push(round);
    }
    (matches, rounds, size)
}

/// Where the winner and loser of `m` are written.
pub fn advancement(m: &GameMatch, bracket: &BracketStructure, options: &BracketOptions) -> Advancement {
    let size = bracket.bracket_size;
    let winners_rounds = bracket.winners_rounds();
    let double = bracket.format == TournamentFormat::DoubleElimination;
    let (r, p) = (m.round_number, m.bracket_position);

    match m.side {
        BracketSide::Winners if m.flags.is_third_place => Advancement::default(),
        BracketSide::Winners => {
            let winner = if r < winners_rounds {
                Some(SlotRef::new(BracketSide::Winners, r + 1, p / 2, Team::from_position(p)))
            } else if double {
                Some(SlotRef::new(BracketSide::GrandFinal, 1, 0, Team::One))
            } else {
                None
            };
            let loser = if double {
                Some(winners_loser_target(size, winners_rounds, r, p))
            } else if options.third_place_match && winners_rounds >= 2 && r + 1 == winners_rounds {
                Some(SlotRef::new(BracketSide::Winners, winners_rounds, 1, Team::from_position(p)))
            } else {
                None
            };
            Advancement { winner, loser }
        }
        BracketSide::Losers => {
            let last = losers_rounds(winners_rounds);
            let winner = if r == last {
                SlotRef::new(BracketSide::GrandFinal, 1, 0, Team::Two)
            } else if r % 2 == 1 {
                SlotRef::new(BracketSide::Losers, r + 1, p, Team::One)
            } else {
                SlotRef::new(BracketSide::Losers, r + 1, p / 2, Team::from_position(p))
            };
            Advancement {
                winner: Some(winner),
                loser: None,
            }
        }
        BracketSide::GrandFinal | BracketSide::Pool => Advancement::default(),
    }
}

/// Drop-down slot in the losers bracket for the loser of winners round `r`, position `p`.
fn winners_loser_target(size: u32, winners_rounds: u32, r: u32, p: u32) -> SlotRef {
    if winners_rounds == 1 {
        return SlotRef::new(BracketSide::GrandFinal, 1, 0, Team::Two);
    }
    if r == 1 {
        return SlotRef::new(BracketSide::Losers, 1, p / 2, Team::from_position(p));
    }
    let round = 2 * (r - 1);
    let count = losers_round_size(size, round);
    // Alternate the drop-down order to delay rematches from the winners bracket.
    let position = if r % 2 == 0 { count - 1 - p } else { p };
    SlotRef::new(BracketSide::Losers, round, position, Team::Two)
}
