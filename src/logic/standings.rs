//! Standings computed from match results (pool formats, swiss pairing, API).

use crate::models::{BracketSide, CompetitorId, MatchStatus, Tournament};
use serde::Serialize;
use std::collections::HashMap;

/// Running record of one competitor inside the tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub competitor_id: CompetitorId,
    pub seed: u32,
    pub wins: u32,
    pub losses: u32,
    /// Pool byes; each also counts as a win.
    pub byes: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl Standing {
    pub fn point_differential(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

/// Standings sorted best first: wins, point differential, seed.
pub fn standings(tournament: &Tournament) -> Vec<Standing> {
    let mut table: Vec<Standing> = tournament
        .competitors
        .iter()
        .enumerate()
        .map(|(i, c)| Standing {
            competitor_id: c.id,
            seed: c.seed.unwrap_or(i as u32 + 1),
            ..Standing::default()
        })
        .collect();
    let index: HashMap<CompetitorId, usize> = table
        .iter()
        .enumerate()
        .map(|(i, s)| (s.competitor_id, i))
        .collect();

    for m in &tournament.matches {
        match m.status {
            MatchStatus::Completed => {
                let (Some(winner), Some(loser), Some(score)) = (m.winner, m.loser(), m.score) else {
                    continue;
                };
                let (won_by, lost_by) = if m.team_1 == Some(winner) {
                    (score.team_1, score.team_2)
                } else {
                    (score.team_2, score.team_1)
                };
                if let Some(&i) = index.get(&winner) {
                    let row = &mut table[i];
                    row.wins += 1;
                    row.points_for = row.points_for.saturating_add(won_by);
                    row.points_against = row.points_against.saturating_add(lost_by);
                }
                if let Some(&i) = index.get(&loser) {
                    let row = &mut table[i];
                    row.losses += 1;
                    row.points_for = row.points_for.saturating_add(lost_by);
                    row.points_against = row.points_against.saturating_add(won_by);
                }
            }
            MatchStatus::Bye if m.side == BracketSide::Pool => {
                if let Some(&i) = m.winner.as_ref().and_then(|w| index.get(w)) {
                    table[i].wins += 1;
                    table[i].byes += 1;
                }
            }
            _ => {}
        }
    }

    table.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.point_differential().cmp(&a.point_differential()))
            .then_with(|| a.seed.cmp(&b.seed))
    });
    table
}
