//! In-memory tournament store: snapshot reads, revision-checked writes and idle cleanup.

use crate::models::{Tournament, TournamentError, TournamentId};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Repository contract for tournament records. Writes are optimistic on `Tournament::revision`.
pub trait TournamentRepository {
    fn insert(&self, tournament: Tournament) -> Result<(), TournamentError>;

    /// Snapshot of the stored tournament.
    fn load(&self, id: TournamentId) -> Result<Tournament, TournamentError>;

    /// Replace the stored tournament if its revision still equals `expected_revision`.
    fn save(&self, tournament: Tournament, expected_revision: u64) -> Result<(), TournamentError>;

    /// Drop tournaments not touched for `max_idle`. Returns how many were removed.
    fn remove_idle(&self, max_idle: Duration) -> Result<usize, TournamentError>;
}

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// Tournaments by id behind one lock.
#[derive(Default)]
pub struct TournamentStore {
    entries: RwLock<HashMap<TournamentId, TournamentEntry>>,
}

impl TournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to a copy of the tournament under the write lock; the copy
    /// replaces the stored one only when `f` succeeds.
    pub fn update<R>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<R, TournamentError>,
    ) -> Result<R, TournamentError> {
        let mut g = self.entries.write().map_err(|_| TournamentError::StoreUnavailable)?;
        let entry = g.get_mut(&id).ok_or(TournamentError::TournamentNotFound(id))?;
        entry.last_activity = Instant::now();
        let mut working = entry.tournament.clone();
        let result = f(&mut working)?;
        entry.tournament = working;
        Ok(result)
    }
}

impl TournamentRepository for TournamentStore {
    fn insert(&self, tournament: Tournament) -> Result<(), TournamentError> {
        let mut g = self.entries.write().map_err(|_| TournamentError::StoreUnavailable)?;
        g.insert(
            tournament.id,
            TournamentEntry {
                tournament,
                last_activity: Instant::now(),
            },
        );
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let mut g = self.entries.write().map_err(|_| TournamentError::StoreUnavailable)?;
        let entry = g.get_mut(&id).ok_or(TournamentError::TournamentNotFound(id))?;
        entry.last_activity = Instant::now();
        Ok(entry.tournament.clone())
    }

    fn save(&self, tournament: Tournament, expected_revision: u64) -> Result<(), TournamentError> {
        let mut g = self.entries.write().map_err(|_| TournamentError::StoreUnavailable)?;
        let entry = g
            .get_mut(&tournament.id)
            .ok_or(TournamentError::TournamentNotFound(tournament.id))?;
        if entry.tournament.revision != expected_revision {
            return Err(TournamentError::StaleSnapshot {
                expected: expected_revision,
                current: entry.tournament.revision,
            });
        }
        entry.tournament = tournament;
        entry.last_activity = Instant::now();
        Ok(())
    }

    fn remove_idle(&self, max_idle: Duration) -> Result<usize, TournamentError> {
        let mut g = self.entries.write().map_err(|_| TournamentError::StoreUnavailable)?;
        let before = g.len();
        g.retain(|_, entry| entry.last_activity.elapsed() < max_idle);
        let removed = before - g.len();
        if removed > 0 {
            log::info!("Cleaned up {} inactive tournament(s)", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::build_bracket;
    use crate::models::{BracketOptions, Competitor, TournamentFormat};

    fn sample() -> Tournament {
        let field = vec![Competitor::new("North"), Competitor::new("South")];
        build_bracket("League Day", field, TournamentFormat::SingleElimination, BracketOptions::default()).unwrap()
    }

    #[test]
    fn save_rejects_a_stale_revision() {
        let store = TournamentStore::new();
        let t = sample();
        let id = t.id;
        store.insert(t).unwrap();

        let mut first = store.load(id).unwrap();
        let second = store.load(id).unwrap();
        first.revision += 1;
        store.save(first, 0).unwrap();

        assert_eq!(
            store.save(second, 0).unwrap_err(),
            TournamentError::StaleSnapshot { expected: 0, current: 1 }
        );
    }

    #[test]
    fn failed_update_leaves_the_tournament_untouched() {
        let store = TournamentStore::new();
        let t = sample();
        let id = t.id;
        store.insert(t.clone()).unwrap();

        let result: Result<(), _> = store.update(id, |t| {
            t.name.push_str(" (edited)");
            Err(TournamentError::InvalidState)
        });
        assert_eq!(result.unwrap_err(), TournamentError::InvalidState);
        assert_eq!(store.load(id).unwrap(), t);
    }

    #[test]
    fn idle_tournaments_are_removed() {
        let store = TournamentStore::new();
        store.insert(sample()).unwrap();
        assert_eq!(store.remove_idle(Duration::from_secs(3600)).unwrap(), 0);
        assert_eq!(store.remove_idle(Duration::ZERO).unwrap(), 1);
        assert!(store.is_empty());
        assert!(matches!(
            store.load(uuid::Uuid::new_v4()),
            Err(TournamentError::TournamentNotFound(_))
        ));
    }
}
