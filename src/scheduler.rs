//! Weighted shuffle scheduler for the classic and inverted flashcard modes.
//!
//! Words still being learned are dealt three times per round, words being
//! practiced twice and learned words once. Reported words sit out, and a
//! rebuilt round never opens with the word that closed the previous one.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

use crate::models::{UserData, WordEntry};

/// Re-permutations tried before the leading repeat is swapped away.
const MAX_RESHUFFLES: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("the word catalog is empty")]
    EmptyCatalog,
}

/// Catalog indices repeated by mastery weight, skipping excluded words.
pub fn weighted_pool(catalog: &[WordEntry], progress: &UserData, excluded: &HashSet<String>) -> Vec<usize> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, word)| !excluded.contains(&word.id))
        .flat_map(|(idx, word)| std::iter::repeat(idx).take(progress.status_of(&word.id).weight()))
        .collect()
}

/// Build a fresh round of catalog indices.
///
/// Falls back to every catalog word once when nothing survives exclusion.
pub fn build_queue<R: Rng + ?Sized>(
    catalog: &[WordEntry],
    progress: &UserData,
    excluded: &HashSet<String>,
    last_played: Option<usize>,
    rng: &mut R,
) -> Vec<usize> {
    let mut pool = weighted_pool(catalog, progress, excluded);
    if pool.is_empty() {
        pool = (0..catalog.len()).collect();
    }

    pool.shuffle(rng);

    if let Some(last) = last_played {
        // A single distinct index has to repeat.
        if pool.len() > 1 && pool.iter().any(|&idx| idx != last) {
            let mut attempts = 0;
            while pool[0] == last && attempts < MAX_RESHUFFLES {
                pool.shuffle(rng);
                attempts += 1;
            }
            if pool[0] == last {
                if let Some(pos) = pool.iter().position(|&idx| idx != last) {
                    pool.swap(0, pos);
                }
            }
        }
    }

    pool
}

/// Deals catalog indices one at a time, rebuilding the round when it runs out.
pub struct Scheduler {
    queue: VecDeque<usize>,
    last_played: Option<usize>,
    rng: ChaCha8Rng,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self {
            queue: VecDeque::new(),
            last_played: None,
            rng,
        }
    }

    /// Draw the next word to show.
    pub fn next(
        &mut self,
        catalog: &[WordEntry],
        progress: &UserData,
        excluded: &HashSet<String>,
    ) -> Result<usize, SchedulerError> {
        if catalog.is_empty() {
            return Err(SchedulerError::EmptyCatalog);
        }

        if self.queue.is_empty() {
            let round = build_queue(catalog, progress, excluded, self.last_played, &mut self.rng);
            debug!(len = round.len(), excluded = excluded.len(), "rebuilt shuffle queue");
            self.queue = round.into();
        }

        let idx = self.queue.pop_front().ok_or(SchedulerError::EmptyCatalog)?;
        self.last_played = Some(idx);
        Ok(idx)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drop the current round so the next draw sees fresh exclusions and weights.
    pub fn invalidate(&mut self) {
        self.queue.clear();
    }

    /// Forget the round and the last word played.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.last_played = None;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
