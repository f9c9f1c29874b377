//! NSGA-II driver.
//!
//! A generic, real-coded NSGA-II. Users describe their problem by
//! implementing [`MoeaProblem`]: parameter declarations, objectives, and
//! an evaluator. Everything else (initial design, tournament, SBX,
//! polynomial mutation, non-dominated truncation, optional elite archive)
//! is handled by [`Nsga2Runner`].
//!
//! # Key Types
//!
//! - [`Nsga2Config`]: population sizing, operator rates, dominance mode
//! - [`Nsga2Runner`]: stepwise or run-to-completion execution
//! - [`Nsga2Result`]: final population, front 1, archive, statistics
//! - [`PopulationSink`]: per-generation output ([`NullSink`], [`MemorySink`])
//!
//! # Example
//!
//! ```
//! use u_moea::error::EvaluationError;
//! use u_moea::nsga2::{optimize, Evaluation, MoeaProblem, Nsga2Config};
//! use u_moea::parameter::{Objective, Parameter};
//!
//! struct Schaffer;
//!
//! impl MoeaProblem for Schaffer {
//!     fn parameters(&self) -> Vec<Parameter> {
//!         vec![Parameter::real("x", -10.0, 10.0)]
//!     }
//!     fn objectives(&self) -> Vec<Objective> {
//!         vec![Objective::minimize("f1"), Objective::minimize("f2")]
//!     }
//!     fn evaluate(&self, x: &[f64]) -> Result<Evaluation, EvaluationError> {
//!         Ok(Evaluation::feasible(vec![x[0] * x[0], (x[0] - 2.0).powi(2)]))
//!     }
//! }
//!
//! let config = Nsga2Config::default()
//!     .with_population_size(20)
//!     .with_max_generations(20)
//!     .with_seed(1);
//! let result = optimize(&Schaffer, config).unwrap();
//! assert_eq!(result.population.len(), 20);
//! ```
//!
//! # References
//!
//! - Deb, Pratap, Agarwal & Meyarivan (2002), "A Fast and Elitist
//!   Multiobjective Genetic Algorithm: NSGA-II"
//! - Laumanns, Thiele, Deb & Zitzler (2002), "Combining Convergence and
//!   Diversity in Evolutionary Multiobjective Optimization" (ε-archives)

mod config;
mod runner;
mod types;

pub use config::{ArchiveConfig, DominanceMode, Nsga2Config, SurvivorPool};
pub use runner::Nsga2Runner;
pub use types::{Evaluation, MemorySink, MoeaProblem, Nsga2Result, NullSink, PopulationSink, RunState};

use crate::error::MoeaError;

/// Runs NSGA-II with the default generator and no sink.
pub fn optimize<P: MoeaProblem>(problem: &P, config: Nsga2Config) -> Result<Nsga2Result, MoeaError> {
    Nsga2Runner::new(problem, config)?.run()
}
