//! Swiss system: pair competitors with the closest running record, never repeating a pairing.
//! Rounds are generated one at a time because pairings depend on earlier results.

use crate::logic::standings::standings;
use crate::models::{
    BracketOptions, BracketSide, BracketStructure, Competitor, CompetitorId, GameMatch, MatchStatus,
    Round, Team, Tournament, TournamentError, TournamentFormat, TournamentState,
};
use std::collections::HashSet;

/// Default number of swiss rounds: ceil(log2 n), at least one.
pub fn swiss_round_count(n: usize) -> u32 {
    (n.max(2) as u32).next_power_of_two().trailing_zeros().max(1)
}

/// Build the structure and first round (seed order, no history).
pub fn build_swiss(
    seeded: &[Competitor],
    options: &BracketOptions,
) -> Result<(Vec<GameMatch>, BracketStructure), TournamentError> {
    let ranked: Vec<CompetitorId> = seeded.iter().map(|c| c.id).collect();
    let matches = pair_round(1, &ranked, &HashSet::new(), &HashSet::new())?;

    let mut round = Round::new(1);
    round.match_ids = matches.iter().map(|m| m.id).collect();
    let structure = BracketStructure {
        format: TournamentFormat::Swiss,
        bracket_size: seeded.len() as u32,
        total_rounds: options
            .swiss_rounds
            .unwrap_or_else(|| swiss_round_count(seeded.len()))
            .max(1),
        total_matches: matches.len() as u32,
        rounds: vec![round],
        losers_bracket: None,
        grand_finals: Vec::new(),
    };
    Ok((matches, structure))
}

/// Pair the next swiss round from current standings. The previous round must be finished.
pub fn generate_next_swiss_round(tournament: &mut Tournament) -> Result<Vec<GameMatch>, TournamentError> {
    if tournament.format != TournamentFormat::Swiss || tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    let generated = tournament.bracket.rounds.len() as u32;
    if generated >= tournament.bracket.total_rounds {
        return Err(TournamentError::InvalidState);
    }
    if !tournament.is_finished() {
        return Err(TournamentError::RoundInProgress {
            round_number: generated,
        });
    }

    let ranked: Vec<CompetitorId> = standings(tournament)
        .into_iter()
        .map(|s| s.competitor_id)
        .collect();
    let mut played = HashSet::new();
    let mut had_bye = HashSet::new();
    for m in &tournament.matches {
        match (m.team_1, m.team_2) {
            (Some(a), Some(b)) => {
                played.insert(pair_key(a, b));
            }
            (Some(a), None) if m.status == MatchStatus::Bye => {
                had_bye.insert(a);
            }
            _ => {}
        }
    }

    let round_number = generated + 1;
    let matches = pair_round(round_number, &ranked, &played, &had_bye)?;

    let mut round = Round::new(round_number);
    round.match_ids = matches.iter().map(|m| m.id).collect();
    tournament.bracket.rounds.push(round);
    tournament.bracket.total_matches += matches.len() as u32;
    tournament.matches.extend(matches.iter().cloned());
    tournament.revision += 1;

    log::info!(
        "Generated swiss round {} of {} for tournament {} ({} matches)",
        round_number,
        tournament.bracket.total_rounds,
        tournament.id,
        matches.len()
    );
    Ok(matches)
}

fn pair_key(a: CompetitorId, b: CompetitorId) -> (CompetitorId, CompetitorId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pair `ranked` (best first). With an odd count the lowest-ranked competitor
/// without a previous bye sits out, as long as the rest can still be paired.
fn pair_round(
    round_number: u32,
    ranked: &[CompetitorId],
    played: &HashSet<(CompetitorId, CompetitorId)>,
    had_bye: &HashSet<CompetitorId>,
) -> Result<Vec<GameMatch>, TournamentError> {
    let exhausted = TournamentError::SwissPairingExhausted { round_number };

    let (pairs, bye) = if ranked.len() % 2 == 0 {
        let pairs = pair_remaining(ranked.to_vec(), played).ok_or(exhausted)?;
        (pairs, None)
    } else {
        // Prefer competitors who have not had a bye, lowest ranked first.
        let mut candidates: Vec<CompetitorId> = ranked.iter().rev().copied().collect();
        candidates.sort_by_key(|c| had_bye.contains(c));
        candidates
            .into_iter()
            .find_map(|bye| {
                let rest: Vec<CompetitorId> = ranked.iter().copied().filter(|&c| c != bye).collect();
                pair_remaining(rest, played).map(|pairs| (pairs, Some(bye)))
            })
            .ok_or(exhausted)?
    };

    let mut matches: Vec<GameMatch> = pairs
        .into_iter()
        .enumerate()
        .map(|(p, (a, b))| GameMatch::between(round_number, p as u32, a, b))
        .collect();
    if let Some(bye) = bye {
        let mut m = GameMatch::new(BracketSide::Pool, round_number, matches.len() as u32);
        m.team_1 = Some(bye);
        m.vacant.push(Team::Two);
        m.status = MatchStatus::Bye;
        m.winner = Some(bye);
        matches.push(m);
    }
    Ok(matches)
}

/// Depth-first pairing: the top remaining competitor takes the closest-ranked
/// opponent it has not met, backtracking when the rest cannot be paired.
fn pair_remaining(
    mut remaining: Vec<CompetitorId>,
    played: &HashSet<(CompetitorId, CompetitorId)>,
) -> Option<Vec<(CompetitorId, CompetitorId)>> {
    if remaining.is_empty() {
        return Some(Vec::new());
    }
    let top = remaining.remove(0);
    for i in 0..remaining.len() {
        let opponent = remaining[i];
        if played.contains(&pair_key(top, opponent)) {
            continue;
        }
        let mut rest = remaining.clone();
        rest.remove(i);
        if let Some(mut pairs) = pair_remaining(rest, played) {
            pairs.insert(0, (top, opponent));
            return Some(pairs);
        }
    }
    None
}
