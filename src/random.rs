//! Seeded random number generation.
//!
//! Every stochastic routine in this crate is generic over [`rand::Rng`];
//! runners build their generator here so that a configured seed makes a
//! sequential run fully reproducible.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed, drawing a fresh seed from
/// the thread-local generator when none is given.
pub fn create_rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => create_rng(s),
        None => create_rng(rand::random()),
    }
}
