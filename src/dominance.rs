//! Dominance comparison.
//!
//! All objectives are **minimized**. Maximized objectives must be negated
//! before comparison (see [`Objective`](crate::parameter::Objective)).
//!
//! Constraint violation takes priority over objectives: when two
//! feasibility values differ and at least one is positive, the smaller
//! violation wins outright.
//!
//! # Comparators
//!
//! - [`ParetoDominance`]: classic Pareto dominance
//! - [`EpsilonDominance`]: Pareto dominance on ε-boxes, with a
//!   distance-to-corner tie-break inside one box
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Laumanns et al. (2002), "Combining Convergence and Diversity in
//!   Evolutionary Multiobjective Optimization"

use crate::error::MoeaError;
use crate::individual::CostView;

/// Three-way dominance result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

impl Dominance {
    /// The result with the operands swapped.
    pub fn reverse(self) -> Self {
        match self {
            Dominance::Left => Dominance::Right,
            Dominance::Right => Dominance::Left,
            Dominance::Neither => Dominance::Neither,
        }
    }
}

/// A pairwise dominance relation over evaluated cost vectors.
///
/// Implementations must be antisymmetric: `compare(a, b) == Left` iff
/// `compare(b, a) == Right`, and `compare(a, a) == Neither`.
pub trait DominanceComparator: Send + Sync {
    /// Compares two evaluated individuals.
    ///
    /// # Panics
    /// Panics if the cost vectors have different lengths.
    fn compare(&self, a: CostView<'_>, b: CostView<'_>) -> Dominance;

    /// Whether `a` and `b` are indistinguishable for archiving purposes.
    fn is_duplicate(&self, a: CostView<'_>, b: CostView<'_>) -> bool;

    /// Convenience: `compare(a, b) == Left`.
    fn dominates(&self, a: CostView<'_>, b: CostView<'_>) -> bool {
        self.compare(a, b) == Dominance::Left
    }
}

/// Resolves the constraint-violation priority rule.
///
/// Returns `None` when objectives must decide.
fn feasibility_cmp(a: f64, b: f64) -> Option<Dominance> {
    if a != b && (a > 0.0 || b > 0.0) {
        if a < b {
            Some(Dominance::Left)
        } else {
            Some(Dominance::Right)
        }
    } else {
        None
    }
}

/// Compare two objective vectors for Pareto dominance (minimization).
///
/// Equal vectors compare as [`Dominance::Neither`].
pub fn pareto_cmp(a: &[f64], b: &[f64]) -> Dominance {
    assert_eq!(a.len(), b.len(), "cost vectors must have equal length");

    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
        if a_better_in_some && b_better_in_some {
            return Dominance::Neither;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Pareto dominance with feasibility priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParetoDominance;

impl DominanceComparator for ParetoDominance {
    fn compare(&self, a: CostView<'_>, b: CostView<'_>) -> Dominance {
        if let Some(d) = feasibility_cmp(a.feasibility, b.feasibility) {
            return d;
        }
        pareto_cmp(a.costs, b.costs)
    }

    fn is_duplicate(&self, a: CostView<'_>, b: CostView<'_>) -> bool {
        a.feasibility == b.feasibility && a.costs == b.costs
    }
}

/// ε-box dominance.
///
/// Each cost `f_i` maps to box index `floor(f_i / ε_i)`. If fewer epsilons
/// than objectives are given, they are cycled. Box vectors are compared
/// with Pareto dominance; inside one shared box the point closer to the
/// box's optimal corner (`box * ε`) wins.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonDominance {
    epsilons: Vec<f64>,
}

impl EpsilonDominance {
    /// # Errors
    /// Rejects an empty list and any epsilon that is zero, negative or not
    /// finite.
    pub fn new(epsilons: Vec<f64>) -> Result<Self, MoeaError> {
        if epsilons.is_empty() {
            return Err(MoeaError::NoEpsilons);
        }
        for (index, &value) in epsilons.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(MoeaError::InvalidEpsilon { index, value });
            }
        }
        Ok(Self { epsilons })
    }

    pub fn epsilons(&self) -> &[f64] {
        &self.epsilons
    }

    fn epsilon(&self, objective: usize) -> f64 {
        self.epsilons[objective % self.epsilons.len()]
    }

    /// Box index vector of `costs`.
    pub fn box_index(&self, costs: &[f64]) -> Vec<f64> {
        costs
            .iter()
            .enumerate()
            .map(|(i, &c)| (c / self.epsilon(i)).floor())
            .collect()
    }

    /// Whether both cost vectors fall in the same ε-box.
    pub fn same_box(&self, a: &[f64], b: &[f64]) -> bool {
        assert_eq!(a.len(), b.len(), "cost vectors must have equal length");
        a.iter()
            .zip(b)
            .enumerate()
            .all(|(i, (&x, &y))| (x / self.epsilon(i)).floor() == (y / self.epsilon(i)).floor())
    }

    /// Squared distance from `costs` to the optimal corner of its box.
    pub fn corner_distance(&self, costs: &[f64]) -> f64 {
        costs
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let eps = self.epsilon(i);
                let corner = (c / eps).floor() * eps;
                (c - corner).powi(2)
            })
            .sum()
    }
}

impl DominanceComparator for EpsilonDominance {
    fn compare(&self, a: CostView<'_>, b: CostView<'_>) -> Dominance {
        if let Some(d) = feasibility_cmp(a.feasibility, b.feasibility) {
            return d;
        }

        let box_a = self.box_index(a.costs);
        let box_b = self.box_index(b.costs);
        match pareto_cmp(&box_a, &box_b) {
            Dominance::Neither if box_a == box_b => {
                let da = self.corner_distance(a.costs);
                let db = self.corner_distance(b.costs);
                if da < db {
                    Dominance::Left
                } else if db < da {
                    Dominance::Right
                } else {
                    Dominance::Neither
                }
            }
            other => other,
        }
    }

    fn is_duplicate(&self, a: CostView<'_>, b: CostView<'_>) -> bool {
        a.feasibility == b.feasibility
            && self.same_box(a.costs, b.costs)
            && self.corner_distance(a.costs) == self.corner_distance(b.costs)
    }
}

/// Runtime choice between the built-in comparators.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparator {
    Pareto(ParetoDominance),
    Epsilon(EpsilonDominance),
}

impl Comparator {
    pub fn pareto() -> Self {
        Comparator::Pareto(ParetoDominance)
    }

    pub fn epsilon(epsilons: Vec<f64>) -> Result<Self, MoeaError> {
        Ok(Comparator::Epsilon(EpsilonDominance::new(epsilons)?))
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::pareto()
    }
}

impl DominanceComparator for Comparator {
    fn compare(&self, a: CostView<'_>, b: CostView<'_>) -> Dominance {
        match self {
            Comparator::Pareto(c) => c.compare(a, b),
            Comparator::Epsilon(c) => c.compare(a, b),
        }
    }

    fn is_duplicate(&self, a: CostView<'_>, b: CostView<'_>) -> bool {
        match self {
            Comparator::Pareto(c) => c.is_duplicate(a, b),
            Comparator::Epsilon(c) => c.is_duplicate(a, b),
        }
    }
}

impl<C: DominanceComparator + ?Sized> DominanceComparator for &C {
    fn compare(&self, a: CostView<'_>, b: CostView<'_>) -> Dominance {
        (**self).compare(a, b)
    }

    fn is_duplicate(&self, a: CostView<'_>, b: CostView<'_>) -> bool {
        (**self).is_duplicate(a, b)
    }
}
