//! Round robin: circle-method rounds, every pair meeting once per cycle.

use crate::models::{
    BracketOptions, BracketStructure, Competitor, CompetitorId, GameMatch, Round, TournamentFormat,
};

/// One round of the circle method: pairs plus the competitor sitting out (odd counts).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CircleRound {
    pub pairs: Vec<(CompetitorId, CompetitorId)>,
    pub bye: Option<CompetitorId>,
}

/// Circle method over `ids`: the first entry stays fixed, the rest rotate one
/// step per round. An odd field gets a phantom entry; whoever meets it sits out.
pub fn circle_rounds(ids: &[CompetitorId]) -> Vec<CircleRound> {
    let mut slots: Vec<Option<CompetitorId>> = ids.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut rounds = Vec::with_capacity(n - 1);
    for r in 0..n - 1 {
        let mut round = CircleRound::default();
        for i in 0..n / 2 {
            let (a, b) = (slots[i], slots[n - 1 - i]);
            match (a, b) {
                (Some(a), Some(b)) => {
                    // Alternate the fixed entry between slots so it does not always host.
                    if i == 0 && r % 2 == 1 {
                        round.pairs.push((b, a));
                    } else {
                        round.pairs.push((a, b));
                    }
                }
                (Some(x), None) | (None, Some(x)) => round.bye = Some(x),
                (None, None) => {}
            }
        }
        rounds.push(round);
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Build every round up front. A second cycle repeats the rounds with slots swapped.
pub fn build_round_robin(
    seeded: &[Competitor],
    options: &BracketOptions,
) -> (Vec<GameMatch>, BracketStructure) {
    let ids: Vec<CompetitorId> = seeded.iter().map(|c| c.id).collect();
    let cycle = circle_rounds(&ids);
    let cycles = options.round_robin_cycles.clamp(1, 2);

    let mut matches = Vec::new();
    let mut rounds = Vec::new();
    for c in 0..cycles {
        for circle in &cycle {
            let mut round = Round::new(rounds.len() as u32 + 1);
            for (p, &(a, b)) in circle.pairs.iter().enumerate() {
                let (t1, t2) = if c % 2 == 0 { (a, b) } else { (b, a) };
                let m = GameMatch::between(round.round_number, p as u32, t1, t2);
                round.match_ids.push(m.id);
                matches.push(m);
            }
            round.byes.extend(circle.bye);
            rounds.push(round);
        }
    }

    let structure = BracketStructure {
        format: TournamentFormat::RoundRobin,
        bracket_size: seeded.len() as u32,
        total_rounds: rounds.len() as u32,
        total_matches: matches.len() as u32,
        rounds,
        losers_bracket: None,
        grand_finals: Vec::new(),
    };
    (matches, structure)
}
