//! NSGA-II generational loop.
//!
//! [`Nsga2Runner`] drives the run through explicit states:
//! initialization → (generating → evaluating → truncating)* → terminated.
//! Evaluation of a batch is a full barrier; nothing is ranked until every
//! member of the batch has costs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::{Nsga2Config, SurvivorPool};
use super::types::{Evaluation, MoeaProblem, NullSink, Nsga2Result, PopulationSink, RunState};
use crate::archive::{Archive, RankingFeature};
use crate::dominance::Comparator;
use crate::error::{EvaluationError, MoeaError};
use crate::individual::{IdSequence, Individual, Population};
use crate::operators::{
    Generator, PolynomialMutation, RandomGenerator, SimulatedBinaryCrossover, TournamentSelection,
};
use crate::parameter::{Objective, ParameterSpace};
use crate::random::create_rng_from;
use crate::sorting::{nondominated_truncate, rank_population};

/// Executes NSGA-II on a [`MoeaProblem`].
///
/// # Usage
///
/// ```ignore
/// let config = Nsga2Config::default().with_seed(42);
/// let result = Nsga2Runner::new(&problem, config)?
///     .with_generator(LatinHypercubeGenerator::new())
///     .run()?;
/// println!("front 1: {} members", result.front.len());
/// ```
///
/// For finer control call [`step`](Self::step) repeatedly; each call
/// advances by exactly one generation.
pub struct Nsga2Runner<'a, P: MoeaProblem> {
    problem: &'a P,
    config: Nsga2Config,
    space: ParameterSpace,
    objectives: Vec<Objective>,
    comparator: Comparator,
    selection: TournamentSelection,
    crossover: SimulatedBinaryCrossover,
    mutation: PolynomialMutation,
    generator: Box<dyn Generator + 'a>,
    sink: Box<dyn PopulationSink + 'a>,
    cancel: Option<Arc<AtomicBool>>,
    rng: StdRng,
    ids: IdSequence,
    population_ids: IdSequence,
    population: Population,
    archive: Option<Archive>,
    generation: usize,
    evaluations: usize,
    front_sizes: Vec<usize>,
    state: RunState,
    cancelled: bool,
}

impl<'a, P: MoeaProblem> Nsga2Runner<'a, P> {
    /// Prepares a run.
    ///
    /// # Errors
    /// Invalid configuration, invalid parameter declarations, or a problem
    /// without objectives.
    pub fn new(problem: &'a P, config: Nsga2Config) -> Result<Self, MoeaError> {
        config.validate()?;
        let space = ParameterSpace::new(problem.parameters())?;
        let objectives = problem.objectives();
        if objectives.is_empty() {
            return Err(MoeaError::InvalidConfig(
                "problem declares no objectives".into(),
            ));
        }

        let comparator = config.dominance.comparator()?;
        let archive = match &config.archive {
            Some(ac) => {
                let archive = Archive::new(ac.dominance.comparator()?);
                Some(match ac.capacity {
                    Some(cap) => archive.with_capacity(cap, RankingFeature::CrowdingDistance, true),
                    None => archive,
                })
            }
            None => None,
        };

        let selection = TournamentSelection::new(config.tournament_size)
            .with_criterion(config.tournament_criterion);
        let crossover = SimulatedBinaryCrossover::new(
            config.crossover_probability,
            config.crossover_distribution_index,
        );
        let mutation = PolynomialMutation::new(
            config.effective_mutation_probability(space.len()),
            config.mutation_distribution_index,
        );
        let rng = create_rng_from(config.seed);

        Ok(Self {
            problem,
            config,
            space,
            objectives,
            comparator,
            selection,
            crossover,
            mutation,
            generator: Box::new(RandomGenerator::new()),
            sink: Box::new(NullSink),
            cancel: None,
            rng,
            ids: IdSequence::new(),
            population_ids: IdSequence::new(),
            population: Population::new(0, Vec::new()),
            archive,
            generation: 0,
            evaluations: 0,
            front_sizes: Vec::new(),
            state: RunState::Uninitialized,
            cancelled: false,
        })
    }

    /// Replaces the initial-population generator (uniform random by default).
    pub fn with_generator(mut self, generator: impl Generator + 'a) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Sends every finished generation to `sink`.
    pub fn with_sink(mut self, sink: impl PopulationSink + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Stops the run at the next generation boundary once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current generation; 0 is the initial population.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn archive(&self) -> Option<&Archive> {
        self.archive.as_ref()
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn parameter_space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Generates, evaluates, and ranks generation 0. Does nothing once the
    /// runner has left [`RunState::Uninitialized`].
    pub fn initialize(&mut self) -> Result<(), MoeaError> {
        if self.state != RunState::Uninitialized {
            return Ok(());
        }
        let outcome = self.seed_population();
        if outcome.is_err() {
            self.state = RunState::Terminated;
        }
        outcome
    }

    /// Advances the run by one generation.
    ///
    /// The first call produces generation 0. Returns `Ok(false)` once the
    /// generation budget is spent or the run was cancelled; the runner is
    /// then [`RunState::Terminated`]. Any error also terminates the run.
    pub fn step(&mut self) -> Result<bool, MoeaError> {
        match self.state {
            RunState::Terminated => Ok(false),
            RunState::Uninitialized => self.initialize().map(|_| true),
            _ => {
                let outcome = self.advance();
                if outcome.is_err() {
                    self.state = RunState::Terminated;
                }
                outcome
            }
        }
    }

    /// Runs to termination.
    pub fn run(mut self) -> Result<Nsga2Result, MoeaError> {
        while self.step()? {}
        Ok(self.into_result())
    }

    fn seed_population(&mut self) -> Result<(), MoeaError> {
        log::info!(
            "NSGA-II start: {} parameters, {} objectives, population {}, {} generations",
            self.space.len(),
            self.objectives.len(),
            self.config.population_size,
            self.config.max_generations
        );
        let started = Instant::now();

        let vectors = self
            .generator
            .generate(&self.space, self.config.population_size, &mut self.rng)?;
        let mut individuals = Vec::with_capacity(vectors.len());
        for vector in vectors {
            self.space.check_len(&vector)?;
            individuals.push(Individual::new(self.ids.next_id(), vector));
        }

        self.state = RunState::Evaluating;
        self.evaluate(&mut individuals)?;
        rank_population(&mut individuals, &self.comparator)?;
        self.finish_generation(individuals, started)
    }

    fn advance(&mut self) -> Result<bool, MoeaError> {
        if self.is_cancelled() {
            self.cancelled = true;
            log::info!("NSGA-II cancelled at generation {}", self.generation);
            self.terminate();
            return Ok(false);
        }
        if self.generation >= self.config.max_generations {
            self.terminate();
            return Ok(false);
        }

        let started = Instant::now();

        self.state = RunState::Generating;
        let mut offspring = self.make_offspring(self.config.effective_offspring_size())?;

        self.state = RunState::Evaluating;
        self.evaluate(&mut offspring)?;

        self.state = RunState::Truncating;
        let pool = match self.config.survivor_pool {
            SurvivorPool::ParentsAndOffspring => {
                let mut pool = std::mem::take(&mut self.population.individuals);
                pool.extend(offspring);
                pool
            }
            SurvivorPool::OffspringOnly => offspring,
        };
        let survivors = nondominated_truncate(pool, self.config.population_size, &self.comparator)?;

        self.generation += 1;
        self.finish_generation(survivors, started)?;
        Ok(true)
    }

    /// Stamps, archives, logs, and publishes a ranked generation.
    fn finish_generation(&mut self, individuals: Vec<Individual>, started: Instant) -> Result<(), MoeaError> {
        let population = Population::new(self.population_ids.next_value(), individuals);
        let front_size = population.first_front().count();
        self.front_sizes.push(front_size);

        if let Some(archive) = &mut self.archive {
            let before = archive.len();
            for ind in population.first_front() {
                archive.add(ind.fork(self.ids.next_id()))?;
            }
            log::debug!(
                "generation {}: archive {} -> {} members ({} improvements so far)",
                self.generation,
                before,
                archive.len(),
                archive.improvements()
            );
        }

        log::info!(
            "generation {}: front 1 has {}/{} members ({:.2?})",
            self.generation,
            front_size,
            population.len(),
            started.elapsed()
        );

        self.sink.write_population(self.generation, &population)?;
        self.problem.on_generation(self.generation, &population);
        self.population = population;
        self.state = RunState::Initialized;
        Ok(())
    }

    /// Tournament → SBX → polynomial mutation until `count` children exist.
    ///
    /// A child equal to one already accepted this generation is discarded,
    /// up to `duplicate_retry_limit` consecutive times; after that the
    /// duplicate is accepted.
    fn make_offspring(&mut self, count: usize) -> Result<Vec<Individual>, MoeaError> {
        let pool = &self.population.individuals;
        let limit = self.config.duplicate_retry_limit;
        let mut vectors: Vec<Vec<f64>> = Vec::with_capacity(count);
        let mut rejected = 0usize;
        let mut forced = 0usize;

        while vectors.len() < count {
            let first = self.selection.select(pool, &self.comparator, &mut self.rng)?;
            let mut second = self.selection.select(pool, &self.comparator, &mut self.rng)?;
            let mut redraws = 0;
            while second == first && pool.len() > 1 && redraws < limit {
                second = self.selection.select(pool, &self.comparator, &mut self.rng)?;
                redraws += 1;
            }

            let (c1, c2) = self.crossover.cross(
                &self.space,
                pool[first].vector(),
                pool[second].vector(),
                &mut self.rng,
            );

            for child in [c1, c2] {
                if vectors.len() == count {
                    break;
                }
                let mut child = self.mutation.mutate(&self.space, &child, &mut self.rng);
                self.space.repair(&mut child);

                if vectors.contains(&child) {
                    if rejected < limit {
                        rejected += 1;
                        continue;
                    }
                    forced += 1;
                }
                rejected = 0;
                vectors.push(child);
            }
        }

        if forced > 0 {
            log::warn!(
                "generation {}: accepted {} duplicate offspring after {} consecutive rejections",
                self.generation + 1,
                forced,
                limit
            );
        }

        Ok(vectors
            .into_iter()
            .map(|v| Individual::new(self.ids.next_id(), v))
            .collect())
    }

    /// Evaluates a batch, then settles failures one by one.
    fn evaluate(&mut self, individuals: &mut [Individual]) -> Result<(), MoeaError> {
        let outcomes = evaluate_batch(self.problem, individuals, self.config.parallel);
        self.evaluations += individuals.len();
        for (ind, outcome) in individuals.iter_mut().zip(outcomes) {
            self.settle(ind, outcome)?;
        }
        Ok(())
    }

    /// Stores a successful evaluation, or replaces the vector and retries
    /// after a transient failure.
    fn settle(
        &mut self,
        ind: &mut Individual,
        mut outcome: Result<Evaluation, EvaluationError>,
    ) -> Result<(), MoeaError> {
        let mut retries = 0;
        loop {
            match outcome {
                Ok(evaluation) => {
                    let costs = self.orient(evaluation.costs)?;
                    ind.set_costs(costs, evaluation.feasibility);
                    return Ok(());
                }
                Err(fatal @ EvaluationError::Fatal(_)) => return Err(fatal.into()),
                Err(EvaluationError::Transient(reason)) => {
                    if retries >= self.config.max_evaluation_retries {
                        log::warn!(
                            "individual {} failed evaluation after {} retries ({}), marking infeasible",
                            ind.id(),
                            retries,
                            reason
                        );
                        ind.mark_infeasible(self.objectives.len());
                        return Ok(());
                    }
                    retries += 1;
                    log::warn!(
                        "individual {} failed evaluation ({}), retrying with a fresh vector ({}/{})",
                        ind.id(),
                        reason,
                        retries,
                        self.config.max_evaluation_retries
                    );
                    let vector = RandomGenerator::sample(&self.space, &mut self.rng);
                    *ind = Individual::new(self.ids.next_id(), vector);
                    outcome = self.problem.evaluate(ind.vector());
                    self.evaluations += 1;
                }
            }
        }
    }

    /// Checks the cost length and converts to lower-is-better.
    fn orient(&self, costs: Vec<f64>) -> Result<Vec<f64>, MoeaError> {
        if costs.len() != self.objectives.len() {
            return Err(MoeaError::CostLengthMismatch {
                expected: self.objectives.len(),
                found: costs.len(),
            });
        }
        Ok(costs
            .into_iter()
            .zip(&self.objectives)
            .map(|(c, obj)| obj.to_minimized(c))
            .collect())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn terminate(&mut self) {
        self.state = RunState::Terminated;
        log::info!(
            "NSGA-II done: {} generations, {} evaluations, front 1 size {}",
            self.generation,
            self.evaluations,
            self.front_sizes.last().copied().unwrap_or(0)
        );
    }

    fn into_result(self) -> Nsga2Result {
        let front = self.population.first_front().cloned().collect();
        Nsga2Result {
            population: self.population.individuals,
            front,
            archive: self.archive.map(Archive::into_vec),
            generations: self.generation,
            evaluations: self.evaluations,
            cancelled: self.cancelled,
            front_sizes: self.front_sizes,
            state: self.state,
            objectives: self.objectives,
        }
    }
}

#[cfg(feature = "parallel")]
fn evaluate_batch<P: MoeaProblem>(
    problem: &P,
    individuals: &[Individual],
    parallel: bool,
) -> Vec<Result<Evaluation, EvaluationError>> {
    if parallel {
        individuals
            .par_iter()
            .map(|ind| problem.evaluate(ind.vector()))
            .collect()
    } else {
        individuals
            .iter()
            .map(|ind| problem.evaluate(ind.vector()))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_batch<P: MoeaProblem>(
    problem: &P,
    individuals: &[Individual],
    _parallel: bool,
) -> Vec<Result<Evaluation, EvaluationError>> {
    individuals
        .iter()
        .map(|ind| problem.evaluate(ind.vector()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
