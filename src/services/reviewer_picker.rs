//! Uniform random choice of reviewers.

use crate::models::User;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of randomness for reviewer selection.
pub trait ReviewerPicker: Send + Sync {
    /// Pick `min(limit, candidates.len())` distinct candidates, uniformly
    /// without replacement.
    fn pick_reviewers(&self, candidates: Vec<User>, limit: usize) -> Vec<User>;

    /// Pick one candidate uniformly, `None` when there is nobody to pick.
    fn pick_replacement(&self, candidates: &[User]) -> Option<User>;
}

fn shuffle_and_take<R: Rng + ?Sized>(rng: &mut R, mut candidates: Vec<User>, limit: usize) -> Vec<User> {
    candidates.shuffle(rng);
    candidates.truncate(limit);
    candidates
}

/// Picker backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ReviewerPicker for RandomPicker {
    fn pick_reviewers(&self, candidates: Vec<User>, limit: usize) -> Vec<User> {
        shuffle_and_take(&mut rand::thread_rng(), candidates, limit)
    }

    fn pick_replacement(&self, candidates: &[User]) -> Option<User> {
        candidates.choose(&mut rand::thread_rng()).cloned()
    }
}

/// Reproducible picker for tests and replays.
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned lock still holds a usable RNG
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut *rng)
    }
}

impl ReviewerPicker for SeededPicker {
    fn pick_reviewers(&self, candidates: Vec<User>, limit: usize) -> Vec<User> {
        self.with_rng(|rng| shuffle_and_take(rng, candidates, limit))
    }

    fn pick_replacement(&self, candidates: &[User]) -> Option<User> {
        self.with_rng(|rng| candidates.choose(rng).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn users(ids: &[i64]) -> Vec<User> {
        ids.iter()
            .map(|&id| User {
                id,
                username: format!("user{}", id),
                team_name: "backend".into(),
                is_active: true,
            })
            .collect()
    }

    #[test]
    fn test_pick_reviewers_returns_distinct_members() {
        let picker = SeededPicker::new(7);
        for _ in 0..50 {
            let picked = picker.pick_reviewers(users(&[2, 3, 4]), 2);
            let ids: HashSet<i64> = picked.iter().map(|u| u.id).collect();
            assert_eq!(ids.len(), 2);
            assert!(ids.is_subset(&HashSet::from([2, 3, 4])));
        }
    }

    #[test]
    fn test_pick_reviewers_caps_at_pool_size() {
        let picker = RandomPicker;
        assert_eq!(picker.pick_reviewers(users(&[5]), 2).len(), 1);
        assert!(picker.pick_reviewers(Vec::new(), 2).is_empty());
    }

    #[test]
    fn test_pick_replacement_empty_pool() {
        assert!(RandomPicker.pick_replacement(&[]).is_none());
        assert!(SeededPicker::new(1).pick_replacement(&[]).is_none());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let a = SeededPicker::new(42);
        let b = SeededPicker::new(42);
        let pool = users(&[1, 2, 3, 4, 5, 6]);
        for _ in 0..10 {
            assert_eq!(a.pick_reviewers(pool.clone(), 2), b.pick_reviewers(pool.clone(), 2));
            assert_eq!(a.pick_replacement(&pool), b.pick_replacement(&pool));
        }
    }

    #[test]
    fn test_every_candidate_gets_picked() {
        // Loose uniformity check: over many draws each of three candidates shows up
        let picker = SeededPicker::new(2024);
        let pool = users(&[10, 11, 12]);
        let mut seen: HashMap<i64, usize> = HashMap::new();
        for _ in 0..300 {
            let id = picker.pick_replacement(&pool).unwrap().id;
            *seen.entry(id).or_default() += 1;
        }
        assert_eq!(seen.len(), 3);
        assert!(seen.values().all(|&n| n > 50));
    }
}
