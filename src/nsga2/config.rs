//! NSGA-II configuration.
//!
//! [`Nsga2Config`] holds every parameter that controls the generational
//! loop: population sizing, operator rates, dominance mode, archive, and
//! failure budgets.

use crate::dominance::Comparator;
use crate::error::MoeaError;
use crate::operators::TournamentCriterion;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dominance relation used for sorting, tournaments, and the archive.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DominanceMode {
    #[default]
    Pareto,
    /// ε-dominance with per-objective box widths (cycled if shorter
    /// than the objective count).
    Epsilon(Vec<f64>),
}

impl DominanceMode {
    /// Builds the comparator, validating epsilons.
    pub fn comparator(&self) -> Result<Comparator, MoeaError> {
        match self {
            DominanceMode::Pareto => Ok(Comparator::pareto()),
            DominanceMode::Epsilon(eps) => Comparator::epsilon(eps.clone()),
        }
    }
}

/// Which individuals compete for survival each generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SurvivorPool {
    /// Parents and offspring are ranked together (elitist NSGA-II).
    #[default]
    ParentsAndOffspring,
    /// Only the offspring are ranked; parents are discarded.
    OffspringOnly,
}

/// Elite archive fed with front 1 after every generation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArchiveConfig {
    pub dominance: DominanceMode,
    /// Maximum size; overflow evicts the most crowded member.
    pub capacity: Option<usize>,
}

impl ArchiveConfig {
    pub fn pareto() -> Self {
        Self::default()
    }

    pub fn epsilon(epsilons: Vec<f64>) -> Self {
        Self {
            dominance: DominanceMode::Epsilon(epsilons),
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// Configuration for NSGA-II.
///
/// # Defaults
///
/// ```
/// use u_moea::nsga2::Nsga2Config;
///
/// let config = Nsga2Config::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 100);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_moea::nsga2::{ArchiveConfig, Nsga2Config};
///
/// let config = Nsga2Config::default()
///     .with_population_size(40)
///     .with_max_generations(250)
///     .with_crossover_probability(0.8)
///     .with_archive(ArchiveConfig::epsilon(vec![0.01, 0.01]))
///     .with_seed(7);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Nsga2Config {
    /// Number of survivors kept each generation (N).
    pub population_size: usize,

    /// Generations to run after the initial generation 0.
    pub max_generations: usize,

    /// Probability that a selected parent pair is recombined by SBX.
    pub crossover_probability: f64,

    /// SBX distribution index. Larger values keep children closer to
    /// their parents. Typical range: 2–20.
    pub crossover_distribution_index: f64,

    /// Per-slot mutation probability. `None` means `1 / number_of_parameters`.
    pub mutation_probability: Option<f64>,

    /// Polynomial-mutation distribution index. Typical range: 20–100.
    pub mutation_distribution_index: f64,

    /// Candidates drawn per tournament.
    pub tournament_size: usize,

    pub tournament_criterion: TournamentCriterion,

    pub dominance: DominanceMode,

    pub survivor_pool: SurvivorPool,

    /// Offspring produced per generation. `None` means N when parents
    /// compete and 2N when only offspring do.
    pub offspring_size: Option<usize>,

    pub archive: Option<ArchiveConfig>,

    /// Consecutive duplicate children rejected before a duplicate is
    /// accepted anyway.
    pub duplicate_retry_limit: usize,

    /// Fresh vectors tried after a transient evaluation failure before
    /// the individual is marked infeasible.
    pub max_evaluation_retries: usize,

    /// Whether to evaluate individuals in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for Nsga2Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            crossover_probability: 0.9,
            crossover_distribution_index: 15.0,
            mutation_probability: None,
            mutation_distribution_index: 20.0,
            tournament_size: 2,
            tournament_criterion: TournamentCriterion::Dominance,
            dominance: DominanceMode::Pareto,
            survivor_pool: SurvivorPool::ParentsAndOffspring,
            offspring_size: None,
            archive: None,
            duplicate_retry_limit: 100,
            max_evaluation_retries: 3,
            parallel: true,
            seed: None,
        }
    }
}

impl Nsga2Config {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the crossover probability, clamped to `[0, 1]`.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_crossover_distribution_index(mut self, eta: f64) -> Self {
        self.crossover_distribution_index = eta.max(0.0);
        self
    }

    /// Sets the per-slot mutation probability, clamped to `[0, 1]`.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = Some(p.clamp(0.0, 1.0));
        self
    }

    pub fn with_mutation_distribution_index(mut self, eta: f64) -> Self {
        self.mutation_distribution_index = eta.max(0.0);
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_tournament_criterion(mut self, criterion: TournamentCriterion) -> Self {
        self.tournament_criterion = criterion;
        self
    }

    pub fn with_dominance(mut self, dominance: DominanceMode) -> Self {
        self.dominance = dominance;
        self
    }

    pub fn with_survivor_pool(mut self, pool: SurvivorPool) -> Self {
        self.survivor_pool = pool;
        self
    }

    pub fn with_offspring_size(mut self, n: usize) -> Self {
        self.offspring_size = Some(n);
        self
    }

    pub fn with_archive(mut self, archive: ArchiveConfig) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn with_duplicate_retry_limit(mut self, limit: usize) -> Self {
        self.duplicate_retry_limit = limit;
        self
    }

    pub fn with_max_evaluation_retries(mut self, retries: usize) -> Self {
        self.max_evaluation_retries = retries;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Offspring count per generation after applying defaults.
    pub fn effective_offspring_size(&self) -> usize {
        self.offspring_size.unwrap_or(match self.survivor_pool {
            SurvivorPool::ParentsAndOffspring => self.population_size,
            SurvivorPool::OffspringOnly => 2 * self.population_size,
        })
    }

    /// Mutation probability for `n_params` decision slots after applying
    /// defaults.
    pub fn effective_mutation_probability(&self, n_params: usize) -> f64 {
        self.mutation_probability
            .unwrap_or(1.0 / n_params.max(1) as f64)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`MoeaError::InvalidConfig`] describing the first problem found, or
    /// the epsilon errors of [`DominanceMode::comparator`].
    pub fn validate(&self) -> Result<(), MoeaError> {
        let invalid = |msg: &str| Err(MoeaError::InvalidConfig(msg.to_string()));

        if self.population_size == 0 {
            return invalid("population_size must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return invalid("crossover_probability must be in [0, 1]");
        }
        if let Some(p) = self.mutation_probability {
            if !(0.0..=1.0).contains(&p) {
                return invalid("mutation_probability must be in [0, 1]");
            }
        }
        if !(self.crossover_distribution_index.is_finite() && self.crossover_distribution_index >= 0.0) {
            return invalid("crossover_distribution_index must be finite and non-negative");
        }
        if !(self.mutation_distribution_index.is_finite() && self.mutation_distribution_index >= 0.0) {
            return invalid("mutation_distribution_index must be finite and non-negative");
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be at least 1");
        }
        if self.offspring_size == Some(0) {
            return invalid("offspring_size must be at least 1");
        }
        if self.survivor_pool == SurvivorPool::OffspringOnly
            && self.effective_offspring_size() < self.population_size
        {
            return invalid("offspring-only survival needs at least population_size offspring");
        }
        self.dominance.comparator()?;
        if let Some(archive) = &self.archive {
            if archive.capacity == Some(0) {
                return invalid("archive capacity must be at least 1");
            }
            archive.dominance.comparator()?;
        }
        Ok(())
    }
}
