//! Match lifecycle: pending -> scheduled -> in_progress -> completed, byes and cancellation.
//!
//! Every command checks the match version, applies to a copy of the match
//! collection and commits only when the whole advancement succeeded.

use crate::logic::elimination::{advancement, SlotRef};
use crate::logic::standings::standings;
use crate::models::{
    BracketOptions, BracketSide, BracketStructure, CompetitorId, CourtId, GameMatch, MatchFlags,
    MatchId, MatchStatus, Score, Team, TimeSlot, Tournament, TournamentError, TournamentFormat,
    TournamentState,
};
use std::collections::VecDeque;

/// Writes advancing competitors into downstream slots and resolves the byes that follow.
struct Advancer<'a> {
    bracket: &'a BracketStructure,
    options: &'a BracketOptions,
    matches: Vec<GameMatch>,
    queue: VecDeque<usize>,
    touched: Vec<MatchId>,
}

impl<'a> Advancer<'a> {
    fn new(matches: Vec<GameMatch>, bracket: &'a BracketStructure, options: &'a BracketOptions) -> Self {
        Self {
            bracket,
            options,
            matches,
            queue: VecDeque::new(),
            touched: Vec::new(),
        }
    }

    fn touch(&mut self, idx: usize) {
        let id = self.matches[idx].id;
        self.matches[idx].touch();
        if !self.touched.contains(&id) {
            self.touched.push(id);
        }
    }

    /// Fill `target` with `competitor`, or mark it vacant when there is nobody to send.
    fn place(&mut self, target: SlotRef, competitor: Option<CompetitorId>) -> Result<(), TournamentError> {
        let idx = self
            .matches
            .iter()
            .position(|m| {
                m.side == target.side
                    && m.round_number == target.round_number
                    && m.bracket_position == target.bracket_position
            })
            .ok_or(TournamentError::InvalidState)?;

        let m = &mut self.matches[idx];
        if m.status.is_terminal() || m.is_slot_resolved(target.team) {
            return Err(TournamentError::StaleBracketState { match_id: m.id });
        }
        match competitor {
            Some(c) => m.set_competitor(target.team, c),
            None => m.vacant.push(target.team),
        }
        self.touch(idx);
        self.queue.push_back(idx);
        Ok(())
    }

    /// Route the winner and loser of a finished match.
    fn advance(&mut self, idx: usize) -> Result<(), TournamentError> {
        let m = &self.matches[idx];
        let (winner, loser) = (m.winner, m.loser());
        let route = advancement(m, self.bracket, self.options);
        if let Some(target) = route.winner {
            self.place(target, winner)?;
        }
        if let Some(target) = route.loser {
            self.place(target, loser)?;
        }
        Ok(())
    }

    /// A pending match with a vacant slot becomes a bye and forwards its entrant.
    fn settle(&mut self, idx: usize) -> Result<(), TournamentError> {
        let m = &self.matches[idx];
        if m.status != MatchStatus::Pending
            || !m.is_slot_resolved(Team::One)
            || !m.is_slot_resolved(Team::Two)
            || m.is_ready()
        {
            return Ok(());
        }
        let winner = m.team_1.or(m.team_2);
        let m = &mut self.matches[idx];
        m.status = MatchStatus::Bye;
        m.winner = winner;
        self.touch(idx);
        if let Some(w) = winner {
            log::debug!("Bye: competitor {} advances from match {}", w, self.matches[idx].id);
        }
        self.advance(idx)
    }

    fn drain(&mut self) -> Result<(), TournamentError> {
        while let Some(idx) = self.queue.pop_front() {
            self.settle(idx)?;
        }
        Ok(())
    }

    fn finish(self) -> (Vec<GameMatch>, Vec<MatchId>) {
        (self.matches, self.touched)
    }
}

/// Resolve byes in a freshly built bracket.
pub(crate) fn settle_initial_byes(
    matches: Vec<GameMatch>,
    bracket: &BracketStructure,
    options: &BracketOptions,
) -> Result<Vec<GameMatch>, TournamentError> {
    let mut advancer = Advancer::new(matches, bracket, options);
    advancer.queue.extend(0..advancer.matches.len());
    advancer.drain()?;
    Ok(advancer.finish().0)
}

fn ensure_in_progress(tournament: &Tournament) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    Ok(())
}

fn check_version(m: &GameMatch, version: u64) -> Result<(), TournamentError> {
    if m.version != version {
        return Err(TournamentError::ConcurrentModification {
            match_id: m.id,
            supplied: version,
            current: m.version,
        });
    }
    Ok(())
}

/// Assign court and time: pending (both slots resolved) -> scheduled. A scheduled
/// match may be moved again by an admin override.
pub fn schedule_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    court_id: CourtId,
    slot: TimeSlot,
) -> Result<GameMatch, TournamentError> {
    ensure_in_progress(tournament)?;
    if tournament.court(court_id).is_none() {
        return Err(TournamentError::CourtNotFound(court_id));
    }
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    let allowed = match m.status {
        MatchStatus::Pending => m.is_ready(),
        MatchStatus::Scheduled => true,
        _ => false,
    };
    if !allowed {
        return Err(TournamentError::MatchNotPlayable {
            match_id,
            status: m.status,
        });
    }
    m.court_id = Some(court_id);
    m.scheduled_time = Some(slot);
    m.status = MatchStatus::Scheduled;
    m.touch();
    let updated = m.clone();
    tournament.revision += 1;
    Ok(updated)
}

/// Start signal from live scoring: scheduled -> in_progress.
pub fn start_match(tournament: &mut Tournament, match_id: MatchId, version: u64) -> Result<GameMatch, TournamentError> {
    ensure_in_progress(tournament)?;
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    check_version(m, version)?;
    if m.status != MatchStatus::Scheduled {
        return Err(TournamentError::MatchNotPlayable {
            match_id,
            status: m.status,
        });
    }
    m.status = MatchStatus::InProgress;
    m.touch();
    let updated = m.clone();
    tournament.revision += 1;
    Ok(updated)
}

/// Complete an in-progress match and advance its winner (and loser, where the
/// format routes losers). Returns every match changed, the reported one first.
pub fn report_match_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
    version: u64,
) -> Result<Vec<GameMatch>, TournamentError> {
    ensure_in_progress(tournament)?;
    let idx = tournament
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    let current = &tournament.matches[idx];
    check_version(current, version)?;
    if current.status != MatchStatus::InProgress {
        return Err(TournamentError::MatchNotPlayable {
            match_id,
            status: current.status,
        });
    }
    if score_1 == score_2 {
        return Err(TournamentError::TieScoreRejected { match_id });
    }
    let (Some(team_1), Some(team_2)) = (current.team_1, current.team_2) else {
        return Err(TournamentError::MatchNotPlayable {
            match_id,
            status: current.status,
        });
    };
    let winner = if score_1 > score_2 { team_1 } else { team_2 };

    let mut bracket = tournament.bracket.clone();
    let mut advancer = Advancer::new(tournament.matches.clone(), &tournament.bracket, &tournament.options);
    {
        let m = &mut advancer.matches[idx];
        m.score = Some(Score {
            team_1: score_1,
            team_2: score_2,
        });
        m.winner = Some(winner);
        m.status = MatchStatus::Completed;
    }
    advancer.touch(idx);

    let finished = advancer.matches[idx].clone();
    let mut reset = None;
    if finished.side == BracketSide::GrandFinal {
        if finished.round_number == 1 && tournament.options.true_final_reset && Some(winner) == finished.team_2 {
            let mut m = GameMatch::new(BracketSide::GrandFinal, 2, 0).with_flags(MatchFlags {
                is_finals: true,
                ..MatchFlags::default()
            });
            m.team_1 = finished.team_1;
            m.team_2 = finished.team_2;
            reset = Some(m);
        }
    } else {
        advancer.advance(idx)?;
        advancer.drain()?;
    }

    let (mut matches, mut touched) = advancer.finish();
    if let Some(m) = reset {
        log::info!("Losers bracket champion {} forced a grand final reset", winner);
        bracket.grand_finals.push(m.id);
        bracket.total_matches += 1;
        touched.push(m.id);
        matches.push(m);
    }

    tournament.matches = matches;
    tournament.bracket = bracket;
    tournament.revision += 1;
    log::info!(
        "Match {} completed {}-{}, winner {} ({} match(es) updated)",
        match_id,
        score_1,
        score_2,
        winner,
        touched.len()
    );
    refresh_completion(tournament);

    Ok(touched
        .iter()
        .filter_map(|id| tournament.get_match(*id).cloned())
        .collect())
}

/// Administrative cancel of a non-terminal match. Does not advance anyone.
pub fn cancel_match(tournament: &mut Tournament, match_id: MatchId) -> Result<GameMatch, TournamentError> {
    ensure_in_progress(tournament)?;
    let m = tournament
        .get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.status.is_terminal() {
        return Err(TournamentError::MatchNotPlayable {
            match_id,
            status: m.status,
        });
    }
    m.status = MatchStatus::Cancelled;
    m.touch();
    let updated = m.clone();
    tournament.revision += 1;
    log::info!("Match {} cancelled", match_id);
    refresh_completion(tournament);
    Ok(updated)
}

/// Cancel the tournament: every open match is cancelled and the bracket is closed.
pub fn cancel_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    ensure_in_progress(tournament)?;
    for m in tournament.matches.iter_mut().filter(|m| !m.status.is_terminal()) {
        m.status = MatchStatus::Cancelled;
        m.touch();
    }
    tournament.state = TournamentState::Cancelled;
    tournament.revision += 1;
    log::info!("Tournament {} cancelled", tournament.id);
    Ok(())
}

/// Decide the champion once the format allows it, and close the tournament when
/// nothing is left to play.
fn refresh_completion(tournament: &mut Tournament) {
    if tournament.champion.is_none() {
        tournament.champion = champion(tournament);
        if let Some(c) = tournament.champion {
            log::info!("Tournament {} champion decided: {}", tournament.id, c);
        }
    }
    let pool_done = tournament.format != TournamentFormat::Swiss
        || tournament.bracket.rounds.len() as u32 >= tournament.bracket.total_rounds;
    if tournament.champion.is_some() && pool_done && tournament.is_finished() {
        tournament.state = TournamentState::Completed;
        log::info!("Tournament {} completed", tournament.id);
    }
}

fn champion(tournament: &Tournament) -> Option<CompetitorId> {
    match tournament.format {
        TournamentFormat::SingleElimination => tournament
            .match_at(BracketSide::Winners, tournament.bracket.winners_rounds(), 0)
            .filter(|m| matches!(m.status, MatchStatus::Completed | MatchStatus::Bye))
            .and_then(|m| m.winner),
        TournamentFormat::DoubleElimination => {
            let last = tournament
                .bracket
                .grand_finals
                .last()
                .and_then(|id| tournament.get_match(*id))?;
            let decided = last.status == MatchStatus::Completed
                && (last.round_number > 1 || last.winner == last.team_1 || !tournament.options.true_final_reset);
            decided.then_some(last.winner).flatten()
        }
        TournamentFormat::RoundRobin | TournamentFormat::Swiss => {
            let rounds_done = tournament.format == TournamentFormat::RoundRobin
                || tournament.bracket.rounds.len() as u32 >= tournament.bracket.total_rounds;
            if rounds_done && tournament.is_finished() {
                standings(tournament).first().map(|s| s.competitor_id)
            } else {
                None
            }
        }
    }
}
