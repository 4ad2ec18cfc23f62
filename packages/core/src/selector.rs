//! Caregiver selection for reservations.
//!
//! When several caregivers are open on the requested day, one is chosen
//! uniformly at random; the point is to spread appointments across
//! caregivers, not to optimise anything. The choice goes through a trait so
//! tests (and `--seed` runs) can pin it.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks which of `n` open slots takes the reservation.
pub trait CaregiverSelector: Send + Sync {
    /// Return an index in `0..n`, uniformly distributed. Callers guarantee
    /// `n >= 1`.
    fn pick(&self, n: usize) -> usize;
}

/// Uniform selection backed by the thread-local generator.
#[derive(Debug, Default)]
pub struct UniformSelector;

impl CaregiverSelector for UniformSelector {
    fn pick(&self, n: usize) -> usize {
        rand::thread_rng().gen_range(0..n)
    }
}

/// Deterministic uniform selection from a seed. Used by `--seed` runs and
/// by tests that need a reproducible caregiver assignment.
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<StdRng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CaregiverSelector for SeededSelector {
    fn pick(&self, n: usize) -> usize {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(0..n)
    }
}
