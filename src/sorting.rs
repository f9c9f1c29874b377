//! Non-dominated sorting, crowding distance, and survivor truncation.
//!
//! Domain-agnostic batch algorithms for Pareto-based methods such as
//! NSGA-II. All objectives are **minimized**.
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance assignment for diversity preservation
//! - [`nondominated_truncate`]: NSGA-II environmental selection
//!
//! Domination counters and dominated sets are local to one sort call
//! (adjacency lists indexed by batch position), so nothing leaks between
//! independent batches.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use std::cmp::Ordering;

use crate::dominance::{Dominance, DominanceComparator};
use crate::error::MoeaError;
use crate::individual::{batch_views, CostView, Individual};

/// Result of non-dominated sorting.
///
/// Each element of `front_numbers` corresponds to the solution at the
/// same index. Front 1 is the non-dominated set of the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NondominatedSortResult {
    /// 1-based front number for each solution.
    pub front_numbers: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` holds front 1, etc.
    pub fronts: Vec<Vec<usize>>,
}

impl NondominatedSortResult {
    pub fn front_count(&self) -> usize {
        self.fronts.len()
    }
}

/// Fast non-dominated sorting over evaluated individuals.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair of solutions, determine dominance
/// 2. Solutions dominated by no other belong to front 1
/// 3. Remove front 1, repeat to find subsequent fronts
///
/// Front membership does not depend on input order; the order of indices
/// inside a front does, and is deterministic for a given input.
///
/// # Complexity
///
/// O(m * n²) comparisons for n solutions and m objectives.
///
/// # Errors
///
/// Fails if any individual is unevaluated or cost lengths differ.
/// An empty batch yields an empty result.
pub fn non_dominated_sort<C: DominanceComparator>(
    individuals: &[Individual],
    comparator: &C,
) -> Result<NondominatedSortResult, MoeaError> {
    let views = batch_views(individuals)?;
    Ok(sort_views(&views, comparator))
}

/// Sorts a batch of validated cost views.
pub fn sort_views<C: DominanceComparator>(
    views: &[CostView<'_>],
    comparator: &C,
) -> NondominatedSortResult {
    let n = views.len();
    if n == 0 {
        return NondominatedSortResult {
            front_numbers: Vec::new(),
            fronts: Vec::new(),
        };
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut front_numbers = vec![0usize; n];

    // Compute dominance relationships
    for i in 0..n {
        for j in (i + 1)..n {
            match comparator.compare(views[i], views[j]) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let front_1: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    for &i in &front_1 {
        front_numbers[i] = 1;
    }

    // Build subsequent fronts
    let mut fronts = vec![front_1];
    loop {
        let current = fronts.last().expect("fronts is initialized with front 1; never empty");
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    front_numbers[j] = fronts.len() + 1;
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    NondominatedSortResult {
        front_numbers,
        fronts,
    }
}

/// Sorts `individuals` and writes each one's `front_number`.
pub fn assign_fronts<C: DominanceComparator>(
    individuals: &mut [Individual],
    comparator: &C,
) -> Result<NondominatedSortResult, MoeaError> {
    let result = non_dominated_sort(individuals, comparator)?;
    for (ind, &front) in individuals.iter_mut().zip(&result.front_numbers) {
        ind.front_number = Some(front);
    }
    Ok(result)
}

/// Crowding distance for a set of objective vectors.
///
/// Higher distance means the solution is more isolated (more diverse).
///
/// # Algorithm (Deb et al., 2002)
///
/// For each objective:
/// 1. Sort solutions by objective value (stable)
/// 2. Assign infinity to the minimum and maximum solutions
/// 3. For interior solutions, add the neighbour gap normalized by the range
///
/// The accumulated sum is divided by the number of objectives. An
/// objective whose range is zero has no boundary and contributes nothing.
/// Sets of one or two solutions are all boundary.
///
/// # Complexity
///
/// O(m * n * log n)
///
/// # Example
///
/// ```
/// use u_moea::sorting::crowding_distance;
///
/// let objectives: Vec<&[f64]> = vec![&[1.0, 5.0], &[3.0, 3.0], &[5.0, 1.0]];
/// let distances = crowding_distance(&objectives);
///
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// assert!(distances[1].is_finite());
/// ```
pub fn crowding_distance(objectives: &[&[f64]]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let mut distances = vec![0.0f64; n];
    if m == 0 {
        return distances;
    }

    #[allow(clippy::needless_range_loop)] // obj_idx is a column index into 2D data
    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            objectives[a][obj_idx]
                .partial_cmp(&objectives[b][obj_idx])
                .unwrap_or(Ordering::Equal)
        });

        let min_val = objectives[indices[0]][obj_idx];
        let max_val = objectives[indices[n - 1]][obj_idx];
        let range = max_val - min_val;

        if !(range > 0.0) {
            continue;
        }

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        for i in 1..(n - 1) {
            let prev = objectives[indices[i - 1]][obj_idx];
            let next = objectives[indices[i + 1]][obj_idx];
            distances[indices[i]] += (next - prev) / range;
        }
    }

    for d in &mut distances {
        *d /= m as f64;
    }
    distances
}

/// Computes crowding distance over `individuals` and overwrites each
/// one's `crowding_distance`. Calling twice gives the same values.
pub fn assign_crowding_distance(individuals: &mut [Individual]) -> Result<(), MoeaError> {
    let distances = {
        let views = batch_views(individuals)?;
        let objectives: Vec<&[f64]> = views.iter().map(|v| v.costs).collect();
        crowding_distance(&objectives)
    };
    for (ind, d) in individuals.iter_mut().zip(distances) {
        ind.crowding_distance = d;
    }
    Ok(())
}

/// Assigns crowding distance front by front, using a previous sort.
fn assign_crowding_by_front(
    individuals: &mut [Individual],
    fronts: &[Vec<usize>],
) {
    for front in fronts {
        let distances = {
            let objectives: Vec<&[f64]> = front
                .iter()
                .map(|&i| individuals[i].costs().unwrap_or(&[]))
                .collect();
            crowding_distance(&objectives)
        };
        for (&i, d) in front.iter().zip(distances) {
            individuals[i].crowding_distance = d;
        }
    }
}

/// Sorts and assigns both front numbers and per-front crowding distance.
pub fn rank_population<C: DominanceComparator>(
    individuals: &mut [Individual],
    comparator: &C,
) -> Result<NondominatedSortResult, MoeaError> {
    let result = assign_fronts(individuals, comparator)?;
    assign_crowding_by_front(individuals, &result.fronts);
    Ok(result)
}

/// NSGA-II environmental selection.
///
/// Keeps exactly `target` individuals: whole fronts are taken in order
/// while they fit; the first front that does not fit is ranked by
/// crowding distance (descending, stable) and cut. Survivors carry their
/// front number and crowding distance within their front.
///
/// # Errors
///
/// [`MoeaError::TruncationTooLarge`] if `population` holds fewer than
/// `target` individuals, plus the validation errors of
/// [`non_dominated_sort`].
pub fn nondominated_truncate<C: DominanceComparator>(
    mut population: Vec<Individual>,
    target: usize,
    comparator: &C,
) -> Result<Vec<Individual>, MoeaError> {
    if population.len() < target {
        return Err(MoeaError::TruncationTooLarge {
            available: population.len(),
            target,
        });
    }

    let result = rank_population(&mut population, comparator)?;

    let mut selected: Vec<usize> = Vec::with_capacity(target);
    for front in &result.fronts {
        let room = target - selected.len();
        if room == 0 {
            break;
        }
        if front.len() <= room {
            selected.extend_from_slice(front);
        } else {
            let mut cut = front.clone();
            cut.sort_by(|&a, &b| {
                population[b]
                    .crowding_distance
                    .partial_cmp(&population[a].crowding_distance)
                    .unwrap_or(Ordering::Equal)
            });
            selected.extend_from_slice(&cut[..room]);
            break;
        }
    }

    let mut slots: Vec<Option<Individual>> = population.into_iter().map(Some).collect();
    Ok(selected
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dominance::{EpsilonDominance, ParetoDominance};
    use crate::individual::IndividualId;

    fn population(costs: &[&[f64]]) -> Vec<Individual> {
        costs
            .iter()
            .enumerate()
            .map(|(i, c)| Individual::evaluated(IndividualId(i as u64), vec![i as f64], c.to_vec()))
            .collect()
    }

    // ---- Non-dominated sort ----

    #[test]
    fn test_single_solution() {
        let pop = population(&[&[1.0, 2.0]]);
        let result = non_dominated_sort(&pop, &ParetoDominance).unwrap();
        assert_eq!(result.front_numbers, vec![1]);
        assert_eq!(result.fronts, vec![vec![0]]);
    }

    #[test]
    fn test_empty_batch() {
        let result = non_dominated_sort(&[], &ParetoDominance).unwrap();
        assert!(result.fronts.is_empty());
    }

    #[test]
    fn test_two_non_dominated() {
        let pop = population(&[&[1.0, 3.0], &[3.0, 1.0]]);
        let result = non_dominated_sort(&pop, &ParetoDominance).unwrap();
        assert_eq!(result.front_numbers, vec![1, 1]);
        assert_eq!(result.front_count(), 1);
    }

    #[test]
    fn test_clear_dominance() {
        let pop = population(&[&[1.0, 1.0], &[2.0, 2.0], &[3.0, 3.0]]);
        let result = non_dominated_sort(&pop, &ParetoDominance).unwrap();
        assert_eq!(result.front_numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_fronts() {
        let pop = population(&[
            &[1.0, 5.0], // front 1
            &[3.0, 3.0], // front 1
            &[5.0, 1.0], // front 1
            &[4.0, 4.0], // dominated by (3,3)
            &[6.0, 6.0], // dominated by (4,4)
        ]);
        let result = non_dominated_sort(&pop, &ParetoDominance).unwrap();
        assert_eq!(result.front_numbers, vec![1, 1, 1, 2, 3]);
        assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3], vec![4]]);
    }

    #[test]
    fn test_all_equal_share_front() {
        let pop = population(&[&[2.0, 2.0], &[2.0, 2.0], &[2.0, 2.0]]);
        let result = non_dominated_sort(&pop, &ParetoDominance).unwrap();
        assert!(result.front_numbers.iter().all(|&f| f == 1));
    }

    #[test]
    fn test_feasibility_ranks_first() {
        let mut pop = population(&[&[0.0, 0.0], &[5.0, 5.0]]);
        pop[0].set_costs(vec![0.0, 0.0], 1.0);
        let result = assign_fronts(&mut pop, &ParetoDominance).unwrap();
        assert_eq!(result.front_numbers, vec![2, 1]);
        assert_eq!(pop[1].front_number, Some(1));
    }

    #[test]
    fn test_epsilon_sort() {
        let eps = EpsilonDominance::new(vec![1.0]).unwrap();
        // Same box; the second is closer to the corner.
        let pop = population(&[&[1.9, 1.9], &[1.1, 1.1]]);
        let result = non_dominated_sort(&pop, &eps).unwrap();
        assert_eq!(result.front_numbers, vec![2, 1]);
    }

    #[test]
    fn test_unevaluated_rejected() {
        let mut pop = population(&[&[1.0, 1.0]]);
        pop.push(Individual::new(IndividualId(9), vec![0.0]));
        assert_eq!(
            non_dominated_sort(&pop, &ParetoDominance).unwrap_err(),
            MoeaError::Unevaluated { index: 1 }
        );
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let pop = population(&[&[1.0, 1.0], &[1.0]]);
        assert!(matches!(
            non_dominated_sort(&pop, &ParetoDominance),
            Err(MoeaError::CostLengthMismatch { .. })
        ));
    }

    // ---- Crowding distance ----

    #[test]
    fn test_crowding_small_sets() {
        assert!(crowding_distance(&[]).is_empty());
        let one: Vec<&[f64]> = vec![&[1.0, 2.0]];
        assert!(crowding_distance(&one)[0].is_infinite());
        let two: Vec<&[f64]> = vec![&[1.0, 3.0], &[3.0, 1.0]];
        assert!(crowding_distance(&two).iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_crowding_line_with_constant_objective() {
        let objs: Vec<&[f64]> = vec![
            &[0.0, 7.0],
            &[1.0, 7.0],
            &[2.0, 7.0],
            &[3.0, 7.0],
            &[4.0, 7.0],
        ];
        let dist = crowding_distance(&objs);
        assert!(dist[0].is_infinite());
        assert!(dist[4].is_infinite());
        // (3 - 1) / 4 from objective 0, nothing from objective 1, over 2 objectives.
        assert!((dist[2] - 0.25).abs() < 1e-12);
        assert!((dist[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_crowding_constant_objective_order_independent() {
        let objs: Vec<&[f64]> = vec![&[2.0, 7.0], &[4.0, 7.0], &[0.0, 7.0], &[1.0, 7.0], &[3.0, 7.0]];
        let dist = crowding_distance(&objs);
        assert!(dist[0].is_finite());
        assert!(dist[1].is_infinite());
        assert!(dist[2].is_infinite());
    }

    #[test]
    fn test_crowding_evenly_spaced() {
        let objs: Vec<&[f64]> = vec![
            &[0.0, 4.0],
            &[1.0, 3.0],
            &[2.0, 2.0],
            &[3.0, 1.0],
            &[4.0, 0.0],
        ];
        let dist = crowding_distance(&objs);
        assert!(dist[0].is_infinite());
        assert!(dist[4].is_infinite());
        assert!((dist[1] - dist[2]).abs() < 1e-10);
        assert!((dist[2] - dist[3]).abs() < 1e-10);
        assert!((dist[2] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_crowding_all_identical() {
        let objs: Vec<&[f64]> = vec![&[1.0, 1.0], &[1.0, 1.0], &[1.0, 1.0]];
        assert_eq!(crowding_distance(&objs), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_assign_crowding_is_idempotent() {
        let mut pop = population(&[&[1.0, 5.0], &[2.0, 4.0], &[3.0, 3.0], &[5.0, 1.0]]);
        assign_crowding_distance(&mut pop).unwrap();
        let first: Vec<f64> = pop.iter().map(|i| i.crowding_distance).collect();
        assign_crowding_distance(&mut pop).unwrap();
        let second: Vec<f64> = pop.iter().map(|i| i.crowding_distance).collect();
        assert_eq!(first, second);
    }

    // ---- Truncation ----

    #[test]
    fn test_truncate_keeps_best_front_and_boundaries() {
        // Front 1: six points on x + y = 10; front 2: six points on x + y = 20.
        let mut costs: Vec<Vec<f64>> = Vec::new();
        for i in 0..6 {
            costs.push(vec![i as f64 * 2.0, 10.0 - i as f64 * 2.0]);
        }
        for i in 0..6 {
            costs.push(vec![5.0 + i as f64 * 2.0, 15.0 - i as f64 * 2.0 + 10.0]);
        }
        let refs: Vec<&[f64]> = costs.iter().map(|c| c.as_slice()).collect();
        let pop = population(&refs);

        let survivors = nondominated_truncate(pop, 8, &ParetoDominance).unwrap();
        assert_eq!(survivors.len(), 8);
        let front1 = survivors.iter().filter(|s| s.front_number == Some(1)).count();
        assert_eq!(front1, 6);

        // The two boundary points of front 2 have infinite crowding distance.
        let kept_front2: Vec<u64> = survivors
            .iter()
            .filter(|s| s.front_number == Some(2))
            .map(|s| s.id().0)
            .collect();
        assert_eq!(kept_front2, vec![6, 11]);
    }

    #[test]
    fn test_truncate_exact_fit() {
        let pop = population(&[&[1.0, 1.0], &[2.0, 2.0], &[3.0, 3.0]]);
        let survivors = nondominated_truncate(pop, 2, &ParetoDominance).unwrap();
        let ids: Vec<u64> = survivors.iter().map(|s| s.id().0).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_truncate_to_zero() {
        let pop = population(&[&[1.0, 1.0]]);
        assert!(nondominated_truncate(pop, 0, &ParetoDominance).unwrap().is_empty());
    }

    #[test]
    fn test_truncate_too_large() {
        let pop = population(&[&[1.0, 1.0]]);
        assert_eq!(
            nondominated_truncate(pop, 2, &ParetoDominance).unwrap_err(),
            MoeaError::TruncationTooLarge {
                available: 1,
                target: 2
            }
        );
    }

    #[test]
    fn test_rank_population_sets_scratch() {
        let mut pop = population(&[&[1.0, 5.0], &[3.0, 3.0], &[5.0, 1.0], &[4.0, 4.0]]);
        rank_population(&mut pop, &ParetoDominance).unwrap();
        assert_eq!(pop[1].front_number, Some(1));
        assert!(pop[1].crowding_distance.is_finite());
        assert_eq!(pop[3].front_number, Some(2));
        assert!(pop[3].crowding_distance.is_infinite());
    }
}
