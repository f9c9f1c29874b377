//! Multi-objective evolutionary optimization.
//!
//! Building blocks for Pareto-based evolutionary algorithms, plus a
//! complete NSGA-II driver:
//!
//! - **Dominance**: Pareto and ε-box comparators with feasibility-first
//!   ordering ([`dominance`]).
//! - **Sorting**: fast non-dominated sort, crowding distance, and
//!   NSGA-II environmental truncation ([`sorting`]).
//! - **Archive**: bounded or unbounded mutually non-dominated elite set
//!   ([`archive`]).
//! - **Operators**: tournament selection, simulated binary crossover,
//!   polynomial mutation, and initial-design generators ([`operators`]).
//! - **NSGA-II**: stepwise generational driver with parallel evaluation,
//!   transient-failure retries, and per-generation sinks ([`nsga2`]).
//!
//! All costs are stored lower-is-better; maximized objectives are
//! negated on the way in (see [`parameter::Objective`]).
//!
//! # Architecture
//!
//! The algorithmic core (sorting, crowding, archive, operators) is
//! single-threaded and works on caller-owned batches. Only the NSGA-II
//! evaluation phase fans out, behind the `parallel` feature.

pub mod archive;
pub mod dominance;
pub mod error;
pub mod individual;
pub mod nsga2;
pub mod operators;
pub mod parameter;
pub mod random;
pub mod sorting;

pub use archive::{Archive, RankingFeature};
pub use dominance::{Comparator, Dominance, DominanceComparator, EpsilonDominance, ParetoDominance};
pub use error::{EvaluationError, MoeaError};
pub use individual::{IdSequence, Individual, IndividualId, Population};
pub use parameter::{Goal, Objective, Parameter, ParameterKind, ParameterSpace};
