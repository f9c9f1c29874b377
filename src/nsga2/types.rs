//! Problem, sink, and result types for the NSGA-II driver.

use crate::error::{EvaluationError, MoeaError};
use crate::individual::{Individual, Population};
use crate::parameter::{Objective, Parameter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one decision vector.
///
/// Costs are in the evaluator's own orientation; the driver negates
/// maximized objectives before storing them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    pub costs: Vec<f64>,
    /// `0.0` when feasible, otherwise the constraint violation.
    pub feasibility: f64,
}

impl Evaluation {
    pub fn feasible(costs: Vec<f64>) -> Self {
        Self {
            costs,
            feasibility: 0.0,
        }
    }

    pub fn infeasible(costs: Vec<f64>, violation: f64) -> Self {
        Self {
            costs,
            feasibility: violation,
        }
    }
}

/// A multi-objective problem.
///
/// `evaluate` may be called concurrently for distinct vectors when
/// parallel evaluation is enabled, so it must not rely on shared mutable
/// state without synchronization.
pub trait MoeaProblem: Send + Sync {
    /// Ordered decision-variable declarations. Slot `i` of every vector
    /// is governed by parameter `i`.
    fn parameters(&self) -> Vec<Parameter>;

    fn objectives(&self) -> Vec<Objective>;

    /// Scores one decision vector.
    ///
    /// Return [`EvaluationError::Transient`] to have the driver retry with
    /// a fresh vector, [`EvaluationError::Fatal`] to abort the run.
    fn evaluate(&self, vector: &[f64]) -> Result<Evaluation, EvaluationError>;

    /// Called after every generation (including generation 0) with the
    /// ranked survivors.
    fn on_generation(&self, _generation: usize, _population: &Population) {}
}

/// Write-only destination for finished generations.
pub trait PopulationSink: Send {
    fn write_population(&mut self, generation: usize, population: &Population) -> Result<(), MoeaError>;
}

/// Discards every population.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PopulationSink for NullSink {
    fn write_population(&mut self, _generation: usize, _population: &Population) -> Result<(), MoeaError> {
        Ok(())
    }
}

/// Keeps a copy of every population in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<(usize, Population)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PopulationSink for MemorySink {
    fn write_population(&mut self, generation: usize, population: &Population) -> Result<(), MoeaError> {
        self.records.push((generation, population.clone()));
        Ok(())
    }
}

impl<S: PopulationSink + ?Sized> PopulationSink for &mut S {
    fn write_population(&mut self, generation: usize, population: &Population) -> Result<(), MoeaError> {
        (**self).write_population(generation, population)
    }
}

/// Lifecycle of an [`Nsga2Runner`](super::Nsga2Runner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunState {
    Uninitialized,
    /// Population ranked; ready for the next generation.
    Initialized,
    Generating,
    Evaluating,
    Truncating,
    Terminated,
}

/// Result of an NSGA-II run.
#[derive(Debug, Clone)]
pub struct Nsga2Result {
    /// Final survivors, ranked.
    pub population: Vec<Individual>,

    /// Members of front 1 of the final population.
    pub front: Vec<Individual>,

    /// Archive contents, when an archive was configured.
    pub archive: Option<Vec<Individual>>,

    /// Generations executed after generation 0.
    pub generations: usize,

    /// Total evaluator calls, retries included.
    pub evaluations: usize,

    /// Whether the run was stopped by the cancellation flag.
    pub cancelled: bool,

    /// Front-1 size at the end of each generation, starting with generation 0.
    pub front_sizes: Vec<usize>,

    pub state: RunState,

    pub objectives: Vec<Objective>,
}

impl Nsga2Result {
    /// Costs of `individual` in the evaluator's orientation.
    pub fn reported_costs(&self, individual: &Individual) -> Option<Vec<f64>> {
        individual.costs().map(|costs| {
            costs
                .iter()
                .zip(&self.objectives)
                .map(|(&c, obj)| obj.to_reported(c))
                .collect()
        })
    }
}
