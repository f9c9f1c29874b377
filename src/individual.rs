//! Individuals and populations.
//!
//! An [`Individual`] is a point in decision space plus, once evaluated,
//! its cost vector and feasibility. The decision vector is fixed at
//! construction; there is no way to change it afterwards, so an evaluated
//! individual always describes the vector it was scored for.
//!
//! Ranking scratch (`front_number`, `crowding_distance`) is written by the
//! sorting routines. Domination counters and dominated sets never live
//! here: they are side tables owned by a single sort call.

use crate::error::MoeaError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of an individual, unique within one [`IdSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndividualId(pub u64);

impl std::fmt::Display for IndividualId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Explicit monotonically increasing id source.
///
/// Owned by whoever creates individuals (usually a runner) and passed
/// along; there is no process-wide counter.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the sequence at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Returns the next value and advances.
    pub fn next_value(&mut self) -> u64 {
        let v = self.next;
        self.next += 1;
        v
    }

    pub fn next_id(&mut self) -> IndividualId {
        IndividualId(self.next_value())
    }
}

/// Borrowed objective data of an evaluated individual, as consumed by
/// dominance comparators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostView<'a> {
    pub costs: &'a [f64],
    /// `0.0` when feasible, otherwise the magnitude of constraint violation.
    pub feasibility: f64,
}

impl<'a> CostView<'a> {
    pub fn new(costs: &'a [f64], feasibility: f64) -> Self {
        Self { costs, feasibility }
    }

    /// A feasible view.
    pub fn feasible(costs: &'a [f64]) -> Self {
        Self::new(costs, 0.0)
    }
}

/// Optional per-individual state for swarm-style operators.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwarmState {
    pub velocity: Vec<f64>,
    pub best_vector: Vec<f64>,
    pub best_cost: Vec<f64>,
}

/// A candidate solution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Individual {
    id: IndividualId,
    vector: Vec<f64>,
    costs: Option<Vec<f64>>,
    feasibility: f64,
    /// Population this individual was last emitted with.
    pub population_id: Option<u64>,
    /// 1-based front rank from the last sort, `None` before sorting.
    pub front_number: Option<usize>,
    /// Crowding distance from the last crowding pass.
    pub crowding_distance: f64,
    pub swarm: Option<SwarmState>,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(id: IndividualId, vector: Vec<f64>) -> Self {
        Self {
            id,
            vector,
            costs: None,
            feasibility: 0.0,
            population_id: None,
            front_number: None,
            crowding_distance: 0.0,
            swarm: None,
        }
    }

    /// Creates an already evaluated, feasible individual.
    pub fn evaluated(id: IndividualId, vector: Vec<f64>, costs: Vec<f64>) -> Self {
        let mut ind = Self::new(id, vector);
        ind.set_costs(costs, 0.0);
        ind
    }

    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    /// Costs in lower-is-better orientation, `None` until evaluated.
    pub fn costs(&self) -> Option<&[f64]> {
        self.costs.as_deref()
    }

    pub fn feasibility(&self) -> f64 {
        self.feasibility
    }

    pub fn is_evaluated(&self) -> bool {
        self.costs.is_some()
    }

    pub fn is_feasible(&self) -> bool {
        self.feasibility <= 0.0
    }

    /// Records an evaluation result. Clears stale ranking scratch.
    pub fn set_costs(&mut self, costs: Vec<f64>, feasibility: f64) {
        self.costs = Some(costs);
        self.feasibility = feasibility;
        self.front_number = None;
        self.crowding_distance = 0.0;
    }

    /// Marks the individual as permanently infeasible: it loses every
    /// dominance comparison against a finite-violation individual.
    pub fn mark_infeasible(&mut self, objectives: usize) {
        self.set_costs(vec![f64::INFINITY; objectives], f64::INFINITY);
    }

    /// Borrowed view for dominance comparison.
    ///
    /// `index` is only used to locate the offender in the error.
    pub fn cost_view(&self, index: usize) -> Result<CostView<'_>, MoeaError> {
        match &self.costs {
            Some(c) => Ok(CostView::new(c, self.feasibility)),
            None => Err(MoeaError::Unevaluated { index }),
        }
    }

    /// Copy of this individual under a new identity, with ranking scratch
    /// cleared. Used when an individual crosses into an independent batch.
    pub fn fork(&self, id: IndividualId) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy.front_number = None;
        copy.crowding_distance = 0.0;
        copy
    }
}

/// Collects cost views for a batch, checking that every individual is
/// evaluated and all cost vectors share one length.
pub(crate) fn batch_views(individuals: &[Individual]) -> Result<Vec<CostView<'_>>, MoeaError> {
    let mut views = Vec::with_capacity(individuals.len());
    let mut expected = None;
    for (i, ind) in individuals.iter().enumerate() {
        let view = ind.cost_view(i)?;
        match expected {
            None => expected = Some(view.costs.len()),
            Some(m) if m != view.costs.len() => {
                return Err(MoeaError::CostLengthMismatch {
                    expected: m,
                    found: view.costs.len(),
                })
            }
            _ => {}
        }
        views.push(view);
    }
    Ok(views)
}

/// A batch of individuals with a provenance id.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Population {
    pub id: u64,
    pub individuals: Vec<Individual>,
}

impl Population {
    /// Wraps `individuals`, stamping each with this population's id.
    pub fn new(id: u64, mut individuals: Vec<Individual>) -> Self {
        for ind in &mut individuals {
            ind.population_id = Some(id);
        }
        Self { id, individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Members of front 1, in population order.
    pub fn first_front(&self) -> impl Iterator<Item = &Individual> {
        self.individuals
            .iter()
            .filter(|ind| ind.front_number == Some(1))
    }
}
