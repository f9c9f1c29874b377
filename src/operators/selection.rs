//! Tournament selection.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Deb et al. (2002), crowded-comparison operator of NSGA-II

use rand::Rng;

use crate::dominance::{Dominance, DominanceComparator};
use crate::error::MoeaError;
use crate::individual::Individual;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a tournament decides whether a newly drawn candidate beats the
/// current winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TournamentCriterion {
    /// The candidate wins only if it dominates the current winner under
    /// the supplied comparator.
    #[default]
    Dominance,

    /// Lower front number wins; on equal fronts larger crowding distance
    /// wins. Requires a previous ranking pass.
    CrowdedComparison,
}

/// Tournament selection over a pool of evaluated individuals.
///
/// Draws `size` distinct pool members; the first drawn is the initial
/// winner and is replaced only by a strictly better later draw, so ties
/// favour earlier draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TournamentSelection {
    pub size: usize,
    pub criterion: TournamentCriterion,
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::binary()
    }
}

impl TournamentSelection {
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            criterion: TournamentCriterion::Dominance,
        }
    }

    /// Binary tournament (`size = 2`).
    pub fn binary() -> Self {
        Self::new(2)
    }

    pub fn with_criterion(mut self, criterion: TournamentCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the pool index of the tournament winner.
    ///
    /// A tournament larger than the pool uses the whole pool.
    ///
    /// # Errors
    /// [`MoeaError::EmptyPopulation`] for an empty pool;
    /// [`MoeaError::Unevaluated`] if a drawn individual has no costs and
    /// the criterion is [`TournamentCriterion::Dominance`].
    pub fn select<C: DominanceComparator, R: Rng>(
        &self,
        pool: &[Individual],
        comparator: &C,
        rng: &mut R,
    ) -> Result<usize, MoeaError> {
        if pool.is_empty() {
            return Err(MoeaError::EmptyPopulation);
        }
        let k = self.size.clamp(1, pool.len());
        let draws = rand::seq::index::sample(rng, pool.len(), k);

        let mut draws = draws.into_iter();
        let mut winner = draws.next().expect("k >= 1 draws");
        for challenger in draws {
            if self.beats(pool, challenger, winner, comparator)? {
                winner = challenger;
            }
        }
        Ok(winner)
    }

    fn beats<C: DominanceComparator>(
        &self,
        pool: &[Individual],
        challenger: usize,
        winner: usize,
        comparator: &C,
    ) -> Result<bool, MoeaError> {
        match self.criterion {
            TournamentCriterion::Dominance => {
                let a = pool[challenger].cost_view(challenger)?;
                let b = pool[winner].cost_view(winner)?;
                Ok(comparator.compare(a, b) == Dominance::Left)
            }
            TournamentCriterion::CrowdedComparison => {
                let (a, b) = (&pool[challenger], &pool[winner]);
                let fa = a.front_number.unwrap_or(usize::MAX);
                let fb = b.front_number.unwrap_or(usize::MAX);
                Ok(fa < fb || (fa == fb && a.crowding_distance > b.crowding_distance))
            }
        }
    }
}
