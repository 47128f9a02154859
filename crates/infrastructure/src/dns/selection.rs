//! Nameserver selection strategies.
//!
//! A selector only decides the order in which candidates are tried; the
//! resolver then walks that order one server at a time.

use getdns_domain::SelectionStrategy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub trait ServerSelector: Send + Sync {
    /// A permutation of `0..count`.
    fn order(&self, count: usize) -> Vec<usize>;

    fn name(&self) -> &'static str;
}

/// Shuffles candidates. Seeded selectors produce a reproducible sequence.
pub struct RandomSelector {
    rng: Option<Mutex<fastrand::Rng>>,
}

impl RandomSelector {
    pub fn new() -> Self {
        Self { rng: None }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(fastrand::Rng::with_seed(seed))),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSelector for RandomSelector {
    fn order(&self, count: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..count).collect();
        match &self.rng {
            Some(rng) => match rng.lock() {
                Ok(mut rng) => rng.shuffle(&mut indices),
                Err(poisoned) => poisoned.into_inner().shuffle(&mut indices),
            },
            None => fastrand::shuffle(&mut indices),
        }
        indices
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Starts one position further along on every call.
pub struct RoundRobinSelector {
    counter: AtomicUsize,
}

impl RoundRobinSelector {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }

    fn next_index(&self, count: usize) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) % count
    }
}

impl Default for RoundRobinSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSelector for RoundRobinSelector {
    fn order(&self, count: usize) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        let start = self.next_index(count);
        (0..count).map(|i| (start + i) % count).collect()
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

/// Keeps the given order, i.e. plain failover.
#[derive(Default)]
pub struct PrioritySelector;

impl ServerSelector for PrioritySelector {
    fn order(&self, count: usize) -> Vec<usize> {
        (0..count).collect()
    }

    fn name(&self) -> &'static str {
        "priority"
    }
}

pub fn create_selector(strategy: SelectionStrategy, seed: Option<u64>) -> Arc<dyn ServerSelector> {
    match strategy {
        SelectionStrategy::Random => match seed {
            Some(seed) => Arc::new(RandomSelector::with_seed(seed)),
            None => Arc::new(RandomSelector::new()),
        },
        SelectionStrategy::RoundRobin => Arc::new(RoundRobinSelector::new()),
        SelectionStrategy::Priority => Arc::new(PrioritySelector),
    }
}
