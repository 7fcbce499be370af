//! Court assignment: feasible (match, court, slot) candidates, the weighted soft
//! objective, and the greedy and exact solvers behind one strategy trait.

use crate::logic::conflicts::scheduled_matches;
use crate::models::{
    Assignment, CompetitorId, Court, CourtAssignmentCriteria, CourtId, CourtReservation, GameMatch, MatchId,
    MatchStatus, ScheduledMatch, TimeSlot, Tournament, TournamentError, TournamentState,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-9;

/// Weights of the soft objective terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Per importance point, for a primary court.
    pub primary_court: f64,
    /// Per importance point, for a prime-time slot.
    pub prime_time: f64,
    /// Full bonus for a team's first-choice court, scaled down by rank.
    pub team_preference: f64,
    /// Per competitor kept on the court of its previous match.
    pub continuity: f64,
    /// Penalty per kilometre travelled from the previous venue (or home).
    pub travel_per_km: f64,
    /// Penalty per unit of variance in matches-per-court.
    pub load_balance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            primary_court: 1.0,
            prime_time: 1.0,
            team_preference: 3.0,
            continuity: 2.0,
            travel_per_km: 0.1,
            load_balance: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Greedy,
    Exact,
    /// Exact for small batches, greedy otherwise.
    #[default]
    Auto,
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(StrategyKind::Greedy),
            "exact" => Ok(StrategyKind::Exact),
            "auto" => Ok(StrategyKind::Auto),
            other => Err(format!("unknown assignment strategy: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Length of one match slot.
    pub slot_minutes: i64,
    pub strategy: StrategyKind,
    /// Largest batch `Auto` hands to the exact solver.
    pub exact_max_matches: usize,
    /// Search nodes before the exact solver settles for its best so far.
    pub exact_node_limit: usize,
    pub weights: ScoringWeights,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            slot_minutes: 60,
            strategy: StrategyKind::Auto,
            exact_max_matches: 8,
            exact_node_limit: 200_000,
            weights: ScoringWeights::default(),
        }
    }
}

/// One feasible placement for a match, with its static score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub court_index: usize,
    pub slot: TimeSlot,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProblemMatch {
    pub id: MatchId,
    pub round_number: u32,
    pub importance: u8,
    pub competitors: Vec<CompetitorId>,
    /// Named in a reservation; placed before everything else.
    pub reserved: bool,
    /// Sorted by slot start, then court.
    pub candidates: Vec<Candidate>,
}

/// Snapshot of one assignment batch. Candidates already respect the committed schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentProblem {
    pub matches: Vec<ProblemMatch>,
    pub court_ids: Vec<CourtId>,
    pub reservations: Vec<CourtReservation>,
    /// Committed matches per court before this batch.
    pub base_load: Vec<usize>,
    pub balance_load: bool,
    pub weights: ScoringWeights,
}

impl AssignmentProblem {
    /// Reserved first, then importance descending, round ascending, id ascending.
    pub fn priority_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.matches.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.matches[a], &self.matches[b]);
            b.reserved
                .cmp(&a.reserved)
                .then_with(|| b.importance.cmp(&a.importance))
                .then_with(|| a.round_number.cmp(&b.round_number))
                .then_with(|| a.id.cmp(&b.id))
        });
        order
    }

    /// Can match `m` take `cand` alongside the placements in `chosen`?
    pub fn compatible(&self, chosen: &[Option<usize>], m: usize, cand: &Candidate) -> bool {
        let this = &self.matches[m];
        chosen.iter().enumerate().all(|(j, pick)| {
            let Some(k) = *pick else { return true };
            if j == m {
                return true;
            }
            let other = &self.matches[j];
            let placed = &other.candidates[k];
            if !placed.slot.overlaps(&cand.slot) {
                return true;
            }
            let court_clash = placed.court_index == cand.court_index
                && !self.co_reserved(self.court_ids[cand.court_index], this.id, &cand.slot, other.id, &placed.slot);
            let competitor_clash = this.competitors.iter().any(|c| other.competitors.contains(c));
            !court_clash && !competitor_clash
        })
    }

    fn co_reserved(&self, court: CourtId, a: MatchId, slot_a: &TimeSlot, b: MatchId, slot_b: &TimeSlot) -> bool {
        co_reserved(&self.reservations, court, a, slot_a, b, slot_b)
    }

    /// Matches per court after applying `chosen`.
    pub fn load(&self, chosen: &[Option<usize>]) -> Vec<usize> {
        let mut load = self.base_load.clone();
        for (m, pick) in chosen.iter().enumerate() {
            if let Some(k) = pick {
                load[self.matches[m].candidates[*k].court_index] += 1;
            }
        }
        load
    }

    /// Objective of a full assignment: static scores minus the load-variance penalty.
    pub fn evaluate(&self, chosen: &[Option<usize>]) -> f64 {
        let static_sum: f64 = chosen
            .iter()
            .enumerate()
            .filter_map(|(m, pick)| pick.map(|k| self.matches[m].candidates[k].score))
            .sum();
        if self.balance_load {
            static_sum - self.weights.load_balance * variance(&self.load(chosen))
        } else {
            static_sum
        }
    }
}

fn variance(load: &[usize]) -> f64 {
    if load.is_empty() {
        return 0.0;
    }
    let n = load.len() as f64;
    let mean = load.iter().sum::<usize>() as f64 / n;
    load.iter().map(|&l| (l as f64 - mean).powi(2)).sum::<f64>() / n
}

fn co_reserved(
    reservations: &[CourtReservation],
    court: CourtId,
    a: MatchId,
    slot_a: &TimeSlot,
    b: MatchId,
    slot_b: &TimeSlot,
) -> bool {
    reservations.iter().any(|r| {
        r.match_ids.contains(&a) && r.match_ids.contains(&b) && r.grants(court, slot_a) && r.grants(court, slot_b)
    })
}

/// Placement for every match of a problem: candidate index, or None when unplaced.
pub trait AssignmentStrategy {
    fn kind(&self) -> StrategyKind;
    fn solve(&self, problem: &AssignmentProblem) -> Vec<Option<usize>>;
}

/// Highest-priority match first, each to its best compatible candidate.
pub struct GreedyStrategy;

impl AssignmentStrategy for GreedyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Greedy
    }

    fn solve(&self, problem: &AssignmentProblem) -> Vec<Option<usize>> {
        let mut chosen = vec![None; problem.matches.len()];
        let mut load = problem.base_load.clone();
        for m in problem.priority_order() {
            let mean = if load.is_empty() {
                0.0
            } else {
                load.iter().sum::<usize>() as f64 / load.len() as f64
            };
            let mut best: Option<(usize, f64)> = None;
            for (k, cand) in problem.matches[m].candidates.iter().enumerate() {
                if !problem.compatible(&chosen, m, cand) {
                    continue;
                }
                let mut score = cand.score;
                if problem.balance_load {
                    score -= problem.weights.load_balance * (load[cand.court_index] as f64 - mean);
                }
                // Candidates are in (start, court) order, so ties keep the earliest slot.
                if best.map_or(true, |(_, s)| score > s + EPSILON) {
                    best = Some((k, score));
                }
            }
            if let Some((k, _)) = best {
                chosen[m] = Some(k);
                load[problem.matches[m].candidates[k].court_index] += 1;
            }
        }
        chosen
    }
}

/// Branch and bound over all placements: maximises the number of placed
/// matches, then the objective. Starts from the greedy answer, so hitting the
/// node limit never returns anything worse than greedy.
pub struct ExactStrategy {
    pub node_limit: usize,
}

struct Search<'p> {
    problem: &'p AssignmentProblem,
    order: Vec<usize>,
    /// Candidate indices per match, best score first.
    ranked: Vec<Vec<usize>>,
    /// Optimistic score still obtainable from `order[depth..]`.
    suffix_bound: Vec<f64>,
    chosen: Vec<Option<usize>>,
    best: Vec<Option<usize>>,
    best_key: (usize, f64),
    nodes: usize,
    limit: usize,
}

fn better(a: (usize, f64), b: (usize, f64)) -> bool {
    a.0 > b.0 || (a.0 == b.0 && a.1 > b.1 + EPSILON)
}

impl Search<'_> {
    fn run(&mut self, depth: usize, placed: usize, score: f64) {
        self.nodes += 1;
        if self.nodes > self.limit {
            return;
        }
        if depth == self.order.len() {
            let key = (placed, self.problem.evaluate(&self.chosen));
            if better(key, self.best_key) {
                self.best = self.chosen.clone();
                self.best_key = key;
            }
            return;
        }
        let remaining = self.order.len() - depth;
        if !better((placed + remaining, score + self.suffix_bound[depth]), self.best_key) {
            return;
        }

        let m = self.order[depth];
        for i in 0..self.ranked[m].len() {
            let k = self.ranked[m][i];
            let cand = self.problem.matches[m].candidates[k];
            if !self.problem.compatible(&self.chosen, m, &cand) {
                continue;
            }
            self.chosen[m] = Some(k);
            self.run(depth + 1, placed + 1, score + cand.score);
            self.chosen[m] = None;
        }
        self.run(depth + 1, placed, score);
    }
}

impl AssignmentStrategy for ExactStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn solve(&self, problem: &AssignmentProblem) -> Vec<Option<usize>> {
        let greedy = GreedyStrategy.solve(problem);
        let placed = greedy.iter().filter(|p| p.is_some()).count();
        let order = problem.priority_order();

        let ranked: Vec<Vec<usize>> = problem
            .matches
            .iter()
            .map(|pm| {
                let mut idx: Vec<usize> = (0..pm.candidates.len()).collect();
                idx.sort_by(|&a, &b| {
                    pm.candidates[b]
                        .score
                        .total_cmp(&pm.candidates[a].score)
                        .then(a.cmp(&b))
                });
                idx
            })
            .collect();
        let mut suffix_bound = vec![0.0; order.len() + 1];
        for d in (0..order.len()).rev() {
            let best = problem.matches[order[d]]
                .candidates
                .iter()
                .map(|c| c.score)
                .fold(0.0_f64, f64::max);
            suffix_bound[d] = suffix_bound[d + 1] + best;
        }

        let mut search = Search {
            problem,
            order,
            ranked,
            suffix_bound,
            chosen: vec![None; problem.matches.len()],
            best_key: (placed, problem.evaluate(&greedy)),
            best: greedy,
            nodes: 0,
            limit: self.node_limit,
        };
        search.run(0, 0, 0.0);
        if search.nodes > search.limit {
            log::debug!("Exact assignment hit the node limit ({}); keeping best found", self.node_limit);
        }
        search.best
    }
}

pub fn strategy_for(settings: &OptimizerSettings, batch_size: usize) -> Box<dyn AssignmentStrategy + Send + Sync> {
    match settings.strategy {
        StrategyKind::Greedy => Box::new(GreedyStrategy),
        StrategyKind::Exact => Box::new(ExactStrategy {
            node_limit: settings.exact_node_limit,
        }),
        StrategyKind::Auto if batch_size <= settings.exact_max_matches => Box::new(ExactStrategy {
            node_limit: settings.exact_node_limit,
        }),
        StrategyKind::Auto => Box::new(GreedyStrategy),
    }
}

/// Importance used when the criteria do not name a match.
pub fn default_importance(m: &GameMatch) -> u8 {
    if m.flags.is_finals {
        10
    } else if m.flags.is_third_place {
        8
    } else if m.flags.is_consolation {
        3
    } else {
        5
    }
}

/// Reserved slots take only their matches; reserved matches go only into their reservations.
fn reservation_allows(
    reservations: &[CourtReservation],
    match_id: MatchId,
    reserved: bool,
    court: CourtId,
    slot: &TimeSlot,
) -> bool {
    let blocked = reservations
        .iter()
        .any(|r| r.covers(court, slot) && !r.match_ids.contains(&match_id));
    let granted = !reserved
        || reservations
            .iter()
            .any(|r| r.match_ids.contains(&match_id) && r.grants(court, slot));
    !blocked && granted
}

fn clashes_with_committed(
    committed: &[ScheduledMatch],
    reservations: &[CourtReservation],
    m: &GameMatch,
    court: CourtId,
    slot: &TimeSlot,
) -> bool {
    committed.iter().any(|c| {
        if c.match_id == m.id || !c.slot.overlaps(slot) {
            return false;
        }
        let court_clash =
            c.court_id == court && !co_reserved(reservations, court, m.id, slot, c.match_id, &c.slot);
        court_clash || c.competitors.iter().any(|&x| m.involves(x))
    })
}

/// End of the latest played or running match of any competitor in `m`.
/// A newly unlocked match may not start before the matches that fed it.
fn not_before(tournament: &Tournament, m: &GameMatch) -> Option<DateTime<Utc>> {
    tournament
        .matches
        .iter()
        .filter(|x| x.id != m.id && matches!(x.status, MatchStatus::Completed | MatchStatus::InProgress))
        .filter(|x| x.competitors().into_iter().any(|c| m.involves(c)))
        .filter_map(|x| x.scheduled_time.map(|slot| slot.end))
        .max()
}

#[allow(clippy::too_many_arguments)]
fn static_score(
    tournament: &Tournament,
    criteria: &CourtAssignmentCriteria,
    weights: &ScoringWeights,
    committed: &[ScheduledMatch],
    m: &GameMatch,
    importance: u8,
    court: &Court,
    slot: &TimeSlot,
) -> f64 {
    let w = f64::from(importance);
    let mut score = 0.0;
    if court.is_primary {
        score += weights.primary_court * w;
    }
    if criteria.prime_time.map_or(false, |p| p.contains(slot)) {
        score += weights.prime_time * w;
    }

    for c in m.competitors() {
        let competitor = tournament.competitor(c);
        let prefs: &[CourtId] = criteria
            .team_preferences
            .get(&c)
            .map(Vec::as_slice)
            .or_else(|| competitor.map(|x| x.preferred_courts.as_slice()))
            .unwrap_or(&[]);
        if let Some(rank) = prefs.iter().position(|&p| p == court.id) {
            score += weights.team_preference * (prefs.len() - rank) as f64 / prefs.len() as f64;
        }

        let previous = committed
            .iter()
            .filter(|x| x.competitors.contains(&c) && x.slot.end <= slot.start)
            .max_by_key(|x| x.slot.start);
        if criteria.preserve_continuity && previous.map(|p| p.court_id) == Some(court.id) {
            score += weights.continuity;
        }
        if criteria.minimize_travel {
            let from = previous
                .and_then(|p| tournament.court(p.court_id))
                .map(|pc| pc.location)
                .or_else(|| competitor.and_then(|x| x.home_venue));
            if let Some(from) = from {
                score -= weights.travel_per_km * from.distance_km(&court.location);
            }
        }
    }
    score
}

/// Build the candidate set for every schedulable match against the committed schedule.
pub fn build_problem(
    tournament: &Tournament,
    criteria: &CourtAssignmentCriteria,
    settings: &OptimizerSettings,
) -> AssignmentProblem {
    let slot_length = Duration::minutes(settings.slot_minutes);
    let reservations = &criteria.court_reservations;
    let committed = scheduled_matches(tournament);
    let court_ids: Vec<CourtId> = tournament.courts.iter().map(|c| c.id).collect();
    let base_load: Vec<usize> = court_ids
        .iter()
        .map(|id| committed.iter().filter(|c| c.court_id == *id).count())
        .collect();
    let court_slots: Vec<Vec<TimeSlot>> = tournament.courts.iter().map(|c| c.slots(slot_length)).collect();

    let matches = tournament
        .schedulable_matches()
        .map(|m| {
            let importance = criteria
                .match_importance
                .get(&m.id)
                .copied()
                .unwrap_or_else(|| default_importance(m))
                .min(10);
            let reserved = reservations.iter().any(|r| r.match_ids.contains(&m.id));
            let earliest = not_before(tournament, m);

            let mut candidates = Vec::new();
            for (ci, court) in tournament.courts.iter().enumerate() {
                for slot in &court_slots[ci] {
                    if earliest.map_or(false, |t| slot.start < t)
                        || !reservation_allows(reservations, m.id, reserved, court.id, slot)
                        || clashes_with_committed(&committed, reservations, m, court.id, slot)
                    {
                        continue;
                    }
                    candidates.push(Candidate {
                        court_index: ci,
                        slot: *slot,
                        score: static_score(
                            tournament,
                            criteria,
                            &settings.weights,
                            &committed,
                            m,
                            importance,
                            court,
                            slot,
                        ),
                    });
                }
            }
            candidates.sort_by(|a, b| {
                a.slot
                    .start
                    .cmp(&b.slot.start)
                    .then(a.court_index.cmp(&b.court_index))
            });

            ProblemMatch {
                id: m.id,
                round_number: m.round_number,
                importance,
                competitors: m.competitors(),
                reserved,
                candidates,
            }
        })
        .collect();

    AssignmentProblem {
        matches,
        court_ids,
        reservations: reservations.clone(),
        base_load,
        balance_load: criteria.balance_load,
        weights: settings.weights,
    }
}

/// Soft-constraint shortfalls reported next to a successful result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentWarning {
    /// No feasible slot exists for these matches (partial success).
    Unsatisfiable { match_ids: Vec<MatchId> },
    LoadImbalance { busiest: usize, quietest: usize },
    PreferenceUnmet { match_id: MatchId, competitor_id: CompetitorId },
}

/// Result of planning one batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    /// Sorted by slot start, court, match id.
    pub placed: Vec<Assignment>,
    /// Priority order.
    pub unplaced: Vec<MatchId>,
    pub warnings: Vec<AssignmentWarning>,
    pub objective: f64,
    pub strategy: StrategyKind,
}

impl AssignmentOutcome {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Plan court assignments for every schedulable match. Nothing is committed.
pub fn plan_assignments(
    tournament: &Tournament,
    criteria: &CourtAssignmentCriteria,
    settings: &OptimizerSettings,
) -> Result<AssignmentOutcome, TournamentError> {
    if tournament.state != TournamentState::InProgress {
        return Err(TournamentError::InvalidState);
    }
    let problem = build_problem(tournament, criteria, settings);
    let strategy = strategy_for(settings, problem.matches.len());
    log::debug!(
        "Assigning {} match(es) over {} court(s) with {:?} ({} candidates)",
        problem.matches.len(),
        problem.court_ids.len(),
        strategy.kind(),
        problem.matches.iter().map(|m| m.candidates.len()).sum::<usize>()
    );
    let chosen = strategy.solve(&problem);

    let mut placed = Vec::new();
    let mut unplaced = Vec::new();
    let mut warnings = Vec::new();
    for m in problem.priority_order() {
        let pm = &problem.matches[m];
        let Some(k) = chosen[m] else {
            unplaced.push(pm.id);
            continue;
        };
        let cand = pm.candidates[k];
        let court_id = problem.court_ids[cand.court_index];
        placed.push(Assignment {
            match_id: pm.id,
            court_id,
            slot: cand.slot,
        });
        for &c in &pm.competitors {
            let prefs = criteria
                .team_preferences
                .get(&c)
                .cloned()
                .or_else(|| tournament.competitor(c).map(|x| x.preferred_courts.clone()))
                .unwrap_or_default();
            if !prefs.is_empty() && !prefs.contains(&court_id) {
                warnings.push(AssignmentWarning::PreferenceUnmet {
                    match_id: pm.id,
                    competitor_id: c,
                });
            }
        }
    }
    placed.sort_by(|a, b| {
        a.slot
            .start
            .cmp(&b.slot.start)
            .then_with(|| court_rank(&problem, a.court_id).cmp(&court_rank(&problem, b.court_id)))
            .then_with(|| a.match_id.cmp(&b.match_id))
    });

    if criteria.balance_load {
        let load = problem.load(&chosen);
        if let (Some(&busiest), Some(&quietest)) = (load.iter().max(), load.iter().min()) {
            if busiest - quietest > 1 {
                warnings.push(AssignmentWarning::LoadImbalance { busiest, quietest });
            }
        }
    }
    if !unplaced.is_empty() {
        log::warn!("{} match(es) could not be placed on any court", unplaced.len());
        warnings.insert(
            0,
            AssignmentWarning::Unsatisfiable {
                match_ids: unplaced.clone(),
            },
        );
    }

    Ok(AssignmentOutcome {
        placed,
        unplaced,
        warnings,
        objective: problem.evaluate(&chosen),
        strategy: strategy.kind(),
    })
}

fn court_rank(problem: &AssignmentProblem, court: CourtId) -> usize {
    problem
        .court_ids
        .iter()
        .position(|&c| c == court)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_of_even_load_is_zero() {
        assert_eq!(variance(&[2, 2, 2]), 0.0);
        assert!((variance(&[0, 2]) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn strategy_parsing() {
        assert_eq!("Greedy".parse::<StrategyKind>(), Ok(StrategyKind::Greedy));
        assert!("fastest".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn auto_uses_exact_for_small_batches() {
        let settings = OptimizerSettings::default();
        assert_eq!(strategy_for(&settings, 3).kind(), StrategyKind::Exact);
        assert_eq!(strategy_for(&settings, 50).kind(), StrategyKind::Greedy);
    }
}
