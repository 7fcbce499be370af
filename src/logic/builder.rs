//! Bracket construction: seed the field, build the format's rounds, resolve byes.

use crate::logic::elimination::{build_double_elimination, build_single_elimination};
use crate::logic::match_state::settle_initial_byes;
use crate::logic::round_robin::build_round_robin;
use crate::logic::seeding::seed_competitors;
use crate::logic::swiss::build_swiss;
use crate::models::{
    BracketOptions, BracketStructure, Competitor, GameMatch, Tournament, TournamentError, TournamentFormat,
};

/// Builds the initial match set and round structure for one format from seeded competitors.
pub trait BracketBuilder {
    fn build(
        &self,
        seeded: &[Competitor],
        options: &BracketOptions,
    ) -> Result<(Vec<GameMatch>, BracketStructure), TournamentError>;
}

pub struct SingleEliminationBuilder;
pub struct DoubleEliminationBuilder;
pub struct RoundRobinBuilder;
pub struct SwissBuilder;

impl BracketBuilder for SingleEliminationBuilder {
    fn build(
        &self,
        seeded: &[Competitor],
        options: &BracketOptions,
    ) -> Result<(Vec<GameMatch>, BracketStructure), TournamentError> {
        Ok(build_single_elimination(seeded, options))
    }
}

impl BracketBuilder for DoubleEliminationBuilder {
    fn build(
        &self,
        seeded: &[Competitor],
        _options: &BracketOptions,
    ) -> Result<(Vec<GameMatch>, BracketStructure), TournamentError> {
        Ok(build_double_elimination(seeded))
    }
}

impl BracketBuilder for RoundRobinBuilder {
    fn build(
        &self,
        seeded: &[Competitor],
        options: &BracketOptions,
    ) -> Result<(Vec<GameMatch>, BracketStructure), TournamentError> {
        Ok(build_round_robin(seeded, options))
    }
}

impl BracketBuilder for SwissBuilder {
    fn build(
        &self,
        seeded: &[Competitor],
        options: &BracketOptions,
    ) -> Result<(Vec<GameMatch>, BracketStructure), TournamentError> {
        build_swiss(seeded, options)
    }
}

pub fn builder_for(format: TournamentFormat) -> Box<dyn BracketBuilder + Send + Sync> {
    match format {
        TournamentFormat::SingleElimination => Box::new(SingleEliminationBuilder),
        TournamentFormat::DoubleElimination => Box::new(DoubleEliminationBuilder),
        TournamentFormat::RoundRobin => Box::new(RoundRobinBuilder),
        TournamentFormat::Swiss => Box::new(SwissBuilder),
    }
}

/// Seed `competitors`, build the bracket for `format` and return the new tournament.
///
/// Fails with `InvalidBracketSize` for fewer than two competitors.
pub fn build_bracket(
    name: impl Into<String>,
    competitors: Vec<Competitor>,
    format: TournamentFormat,
    options: BracketOptions,
) -> Result<Tournament, TournamentError> {
    let seeded = seed_competitors(competitors, options.seeding)?;
    let (matches, structure) = builder_for(format).build(&seeded, &options)?;
    let matches = settle_initial_byes(matches, &structure, &options)?;

    let tournament = Tournament::new(name, format, options, seeded, matches, structure);
    log::info!(
        "Built {} bracket for tournament {} ({}): {} competitors, {} rounds, {} matches",
        format,
        tournament.name,
        tournament.id,
        tournament.competitors.len(),
        tournament.bracket.total_rounds,
        tournament.bracket.total_matches
    );
    Ok(tournament)
}
