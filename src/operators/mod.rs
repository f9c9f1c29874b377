//! Variation and initialization operators for real-coded MOEAs.
//!
//! Every operator takes its inputs by reference and returns freshly
//! allocated vectors; parents are never modified, so one parent can feed
//! several offspring-generation calls in the same generation.
//!
//! # Key Types
//!
//! - [`TournamentSelection`]: dominance or crowded-comparison tournament
//! - [`SimulatedBinaryCrossover`]: bounded SBX on real slots
//! - [`PolynomialMutation`]: bounded polynomial perturbation, integer
//!   rounding, boolean bit flips
//! - [`Generator`]: initial designs ([`RandomGenerator`],
//!   [`LatinHypercubeGenerator`], [`CustomGenerator`])
//!
//! # References
//!
//! - Deb & Agrawal (1995), "Simulated Binary Crossover for Continuous Search Space"
//! - Deb (2001), *Multi-Objective Optimization Using Evolutionary Algorithms*
//! - McKay, Beckman & Conover (1979), Latin hypercube sampling

mod crossover;
mod generation;
mod mutation;
mod selection;

pub use crossover::SimulatedBinaryCrossover;
pub use generation::{CustomGenerator, Generator, LatinHypercubeGenerator, RandomGenerator};
pub use mutation::PolynomialMutation;
pub use selection::{TournamentCriterion, TournamentSelection};
