//! Voter identity generation
//!
//! Votes carry a throwaway voter id drawn from `[1, 99999)`. The id is neither
//! secret nor unique; it exists because the vote endpoint requires one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lowest voter id (inclusive)
pub const VOTER_ID_MIN: u32 = 1;

/// Upper voter id bound (exclusive)
pub const VOTER_ID_MAX: u32 = 99_999;

/// Source of voter ids
pub trait VoterIdGenerator: Send + 'static {
    fn next_id(&mut self) -> String;
}

/// Voter ids from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVoterIds;

impl VoterIdGenerator for RandomVoterIds {
    fn next_id(&mut self) -> String {
        rand::rng()
            .random_range(VOTER_ID_MIN..VOTER_ID_MAX)
            .to_string()
    }
}

/// Reproducible voter ids from a seeded RNG
#[derive(Debug, Clone)]
pub struct SeededVoterIds {
    rng: StdRng,
}

impl SeededVoterIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl VoterIdGenerator for SeededVoterIds {
    fn next_id(&mut self) -> String {
        self.rng
            .random_range(VOTER_ID_MIN..VOTER_ID_MAX)
            .to_string()
    }
}
