//! Seeding: rank competitors into seeds 1..n and place seeds into bracket slots.

use crate::models::{Competitor, SeedingMethod, TournamentError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Order competitors by ranking metric and write seeds 1..n.
///
/// Rejects fewer than two competitors and duplicate ids.
pub fn seed_competitors(
    mut competitors: Vec<Competitor>,
    method: SeedingMethod,
) -> Result<Vec<Competitor>, TournamentError> {
    if competitors.len() < 2 {
        return Err(TournamentError::InvalidBracketSize {
            competitors: competitors.len(),
        });
    }
    let mut seen = HashSet::with_capacity(competitors.len());
    for c in &competitors {
        if !seen.insert(c.id) {
            return Err(TournamentError::DuplicateCompetitor(c.id));
        }
    }

    match method {
        SeedingMethod::Ranking => competitors.sort_by(compare_by_ranking),
        SeedingMethod::Manual => competitors.sort_by(|a, b| match (a.seed, b.seed) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| compare_by_ranking(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_by_ranking(a, b),
        }),
        SeedingMethod::Random { seed } => {
            // Sort first so the draw does not depend on input order.
            competitors.sort_by_key(|c| c.id);
            competitors.shuffle(&mut StdRng::seed_from_u64(seed));
        }
    }

    for (i, c) in competitors.iter_mut().enumerate() {
        c.seed = Some(i as u32 + 1);
    }
    Ok(competitors)
}

/// Better competitor first: win percentage, then point differential, then id.
pub fn compare_by_ranking(a: &Competitor, b: &Competitor) -> Ordering {
    b.record
        .win_percentage()
        .total_cmp(&a.record.win_percentage())
        .then_with(|| b.record.point_differential().cmp(&a.record.point_differential()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Next power of two >= n.
pub fn bracket_size(n: usize) -> u32 {
    (n.max(1) as u32).next_power_of_two()
}

/// Seed numbers in slot order so that seed 1 meets seed `size`, seed 2 meets
/// seed `size - 1`, and top seeds stay apart until the latest round.
/// Consecutive pairs form the first-round matches.
pub fn bracket_order(size: u32) -> Vec<u32> {
    let mut order = vec![1u32];
    while (order.len() as u32) < size {
        let next_len = order.len() as u32 * 2;
        order = order
            .iter()
            .flat_map(|&s| [s, next_len + 1 - s])
            .collect();
    }
    order
}

/// First-round seed pairs for `n` competitors; `None` marks an absent seed (bye).
pub fn first_round_pairs(n: usize) -> Vec<(u32, Option<u32>)> {
    let order = bracket_order(bracket_size(n));
    order
        .chunks_exact(2)
        .map(|pair| {
            let (high, low) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            (high, (low as usize <= n).then_some(low))
        })
        .collect()
}
