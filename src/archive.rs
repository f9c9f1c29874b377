//! Non-dominated archive.
//!
//! An [`Archive`] keeps a mutually non-dominated set of individuals under
//! its comparator. It owns its members outright: callers hand over an
//! [`Individual`] by value (usually a clone), so later changes to the
//! population that produced it cannot reach archive contents.
//!
//! Insertion is a linear scan: `add` costs O(size) comparisons, which is
//! fine for elite sets of tens to low hundreds of members.
//!
//! # Invariants
//!
//! - No member dominates another under the archive's comparator.
//! - No two members are duplicates ([`DominanceComparator::is_duplicate`]).
//! - A bounded archive never holds more than its capacity.

use std::cmp::Ordering;

use rand::Rng;

use crate::dominance::{Comparator, Dominance, DominanceComparator, EpsilonDominance, ParetoDominance};
use crate::error::MoeaError;
use crate::individual::Individual;
use crate::sorting::{assign_crowding_distance, crowding_distance};

/// Scalar used to rank archive members for truncation and eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingFeature {
    /// Crowding distance, recomputed over the archive contents first.
    CrowdingDistance,
    /// The cost of one objective.
    Cost(usize),
    /// Constraint violation.
    Feasibility,
}

impl RankingFeature {
    fn value(self, ind: &Individual) -> f64 {
        match self {
            RankingFeature::CrowdingDistance => ind.crowding_distance,
            RankingFeature::Cost(i) => ind.costs().and_then(|c| c.get(i).copied()).unwrap_or(f64::INFINITY),
            RankingFeature::Feasibility => ind.feasibility(),
        }
    }
}

/// Capacity policy of a bounded archive.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bound {
    capacity: usize,
    feature: RankingFeature,
    prefer_larger: bool,
}

/// A mutually non-dominated set of individuals.
#[derive(Debug, Clone)]
pub struct Archive<C: DominanceComparator = Comparator> {
    comparator: C,
    contents: Vec<Individual>,
    bound: Option<Bound>,
    objectives: Option<usize>,
    improvements: usize,
}

impl Archive<ParetoDominance> {
    /// Unbounded Pareto archive.
    pub fn pareto() -> Self {
        Self::new(ParetoDominance)
    }
}

impl Archive<EpsilonDominance> {
    /// Unbounded ε-box archive.
    ///
    /// # Errors
    /// Rejects empty, zero, negative, or non-finite epsilons.
    pub fn epsilon(epsilons: Vec<f64>) -> Result<Self, MoeaError> {
        Ok(Self::new(EpsilonDominance::new(epsilons)?))
    }
}

impl<C: DominanceComparator> Archive<C> {
    /// Unbounded archive using `comparator`.
    pub fn new(comparator: C) -> Self {
        Self {
            comparator,
            contents: Vec::new(),
            bound: None,
            objectives: None,
            improvements: 0,
        }
    }

    /// Caps the archive at `capacity` members. When an insertion would
    /// overflow it, the surviving members and the candidate are ranked
    /// together by `feature` and the lowest is dropped: the smallest value
    /// if `prefer_larger`, else the largest. Members rank ahead of the
    /// candidate on ties.
    pub fn with_capacity(mut self, capacity: usize, feature: RankingFeature, prefer_larger: bool) -> Self {
        self.bound = Some(Bound {
            capacity: capacity.max(1),
            feature,
            prefer_larger,
        });
        self
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn capacity(&self) -> Option<usize> {
        self.bound.map(|b| b.capacity)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn contents(&self) -> &[Individual] {
        &self.contents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.contents.iter()
    }

    pub fn into_vec(self) -> Vec<Individual> {
        self.contents
    }

    /// Accepted insertions that evicted at least one dominated member.
    pub fn improvements(&self) -> usize {
        self.improvements
    }

    /// Attempts to insert `individual`.
    ///
    /// Returns `Ok(false)`, leaving the archive unchanged, when a member
    /// dominates the candidate, is a duplicate of it, or when a full
    /// bounded archive would drop the candidate itself. Otherwise evicts
    /// every member the candidate dominates, inserts it, and returns
    /// `Ok(true)`.
    ///
    /// The cost length is fixed by the first member and forgotten again
    /// whenever the archive becomes empty.
    ///
    /// # Errors
    /// [`MoeaError::Unevaluated`] for an unevaluated candidate and
    /// [`MoeaError::CostLengthMismatch`] when its cost length differs from
    /// the members'.
    pub fn add(&mut self, individual: Individual) -> Result<bool, MoeaError> {
        if self.contents.is_empty() {
            self.objectives = None;
        }
        let m = individual.cost_view(self.contents.len())?.costs.len();
        if let Some(expected) = self.objectives {
            if expected != m {
                return Err(MoeaError::CostLengthMismatch { expected, found: m });
            }
        }

        let candidate = individual.cost_view(self.contents.len())?;
        let mut evict = Vec::new();
        for (i, member) in self.contents.iter().enumerate() {
            let existing = member.cost_view(i)?;
            match self.comparator.compare(candidate, existing) {
                Dominance::Right => return Ok(false),
                Dominance::Left => evict.push(i),
                Dominance::Neither => {
                    if self.comparator.is_duplicate(candidate, existing) {
                        return Ok(false);
                    }
                }
            }
        }
        let dominated = evict.len();

        if let Some(bound) = self.bound {
            if self.contents.len() - dominated + 1 > bound.capacity {
                let kept: Vec<usize> = (0..self.contents.len())
                    .filter(|i| evict.binary_search(i).is_err())
                    .collect();
                let mut ranked: Vec<&Individual> = kept.iter().map(|&i| &self.contents[i]).collect();
                ranked.push(&individual);
                let worst = lowest_ranked(&ranked, bound)?;
                if worst == kept.len() {
                    log::trace!("archive at capacity {}: rejected {}", bound.capacity, individual.id());
                    return Ok(false);
                }
                log::trace!(
                    "archive at capacity {}: evicted {}",
                    bound.capacity,
                    self.contents[kept[worst]].id()
                );
                evict.push(kept[worst]);
                evict.sort_unstable();
            }
        }

        if dominated > 0 {
            self.improvements += 1;
        }
        if !evict.is_empty() {
            let mut index = 0;
            self.contents.retain(|_| {
                let keep = evict.binary_search(&index).is_err();
                index += 1;
                keep
            });
        }

        log::trace!(
            "archive accepted {} (evicted {}, size {})",
            individual.id(),
            dominated,
            self.contents.len() + 1
        );
        self.objectives = Some(m);
        self.contents.push(individual);

        if let Some(bound) = self.bound {
            if dominated < evict.len() {
                self.refresh(bound.feature)?;
            }
        }
        Ok(true)
    }

    /// Inserts every individual; returns how many were accepted.
    pub fn extend<I>(&mut self, individuals: I) -> Result<usize, MoeaError>
    where
        I: IntoIterator<Item = Individual>,
    {
        let mut accepted = 0;
        for ind in individuals {
            if self.add(ind)? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Removes the member with the same id, if present.
    pub fn remove(&mut self, individual: &Individual) -> bool {
        match self.contents.iter().position(|m| m.id() == individual.id()) {
            Some(i) => {
                self.contents.remove(i);
                if self.contents.is_empty() {
                    self.objectives = None;
                }
                true
            }
            None => false,
        }
    }

    fn refresh(&mut self, feature: RankingFeature) -> Result<(), MoeaError> {
        if feature == RankingFeature::CrowdingDistance {
            assign_crowding_distance(&mut self.contents)?;
        }
        Ok(())
    }

    /// Keeps the `target_size` best members by `feature`.
    ///
    /// Members are ranked descending when `prefer_larger`, ascending
    /// otherwise; ties keep insertion order. Dominance is not re-checked:
    /// truncation only removes. A target at or above the current size is
    /// a no-op.
    pub fn truncate(
        &mut self,
        target_size: usize,
        feature: RankingFeature,
        prefer_larger: bool,
    ) -> Result<(), MoeaError> {
        if target_size >= self.contents.len() {
            return Ok(());
        }
        self.refresh(feature)?;
        self.contents.sort_by(|a, b| {
            rank_cmp(feature.value(b), feature.value(a), prefer_larger)
        });
        self.contents.truncate(target_size);
        if self.contents.is_empty() {
            self.objectives = None;
        }
        Ok(())
    }

    /// One member chosen uniformly at random.
    pub fn rand_choice<R: Rng>(&self, rng: &mut R) -> Result<&Individual, MoeaError> {
        if self.contents.is_empty() {
            return Err(MoeaError::SampleTooLarge {
                requested: 1,
                available: 0,
            });
        }
        Ok(&self.contents[rng.random_range(0..self.contents.len())])
    }

    /// `k` distinct members chosen uniformly at random.
    ///
    /// # Errors
    /// [`MoeaError::SampleTooLarge`] if `k` exceeds the archive size.
    pub fn rand_sample<R: Rng>(&self, k: usize, rng: &mut R) -> Result<Vec<&Individual>, MoeaError> {
        if k > self.contents.len() {
            return Err(MoeaError::SampleTooLarge {
                requested: k,
                available: self.contents.len(),
            });
        }
        Ok(rand::seq::index::sample(rng, self.contents.len(), k)
            .into_iter()
            .map(|i| &self.contents[i])
            .collect())
    }
}

/// Index of the lowest-ranked entry of `members` under `bound`; the
/// first one on ties. Crowding distance is computed over `members` alone.
fn lowest_ranked(members: &[&Individual], bound: Bound) -> Result<usize, MoeaError> {
    let values: Vec<f64> = match bound.feature {
        RankingFeature::CrowdingDistance => {
            let objectives = members
                .iter()
                .enumerate()
                .map(|(i, m)| m.cost_view(i).map(|v| v.costs))
                .collect::<Result<Vec<&[f64]>, MoeaError>>()?;
            crowding_distance(&objectives)
        }
        feature => members.iter().map(|m| feature.value(m)).collect(),
    };
    Ok(values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| rank_cmp(**a, **b, bound.prefer_larger))
        .map_or(0, |(i, _)| i))
}

/// Orders `a` before `b` when `a` ranks lower.
fn rank_cmp(a: f64, b: f64, prefer_larger: bool) -> Ordering {
    let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    if prefer_larger {
        ord
    } else {
        ord.reverse()
    }
}

impl<'a, C: DominanceComparator> IntoIterator for &'a Archive<C> {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.contents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::IndividualId;
    use crate::random::create_rng;

    fn ind(id: u64, costs: &[f64]) -> Individual {
        Individual::evaluated(IndividualId(id), vec![id as f64], costs.to_vec())
    }

    fn non_dominated<C: DominanceComparator>(archive: &Archive<C>) -> bool {
        let c = archive.contents();
        for i in 0..c.len() {
            for j in 0..c.len() {
                if i != j {
                    let a = c[i].cost_view(i).unwrap();
                    let b = c[j].cost_view(j).unwrap();
                    if archive.comparator().dominates(a, b) {
                        return false;
                    }
                }
            }
        }
        true
    }

    #[test]
    fn test_first_insert_accepted() {
        let mut a = Archive::pareto();
        assert!(a.add(ind(0, &[5.0, 5.0])).unwrap());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_dominating_insert_evicts() {
        let mut a = Archive::pareto();
        a.add(ind(0, &[5.0, 5.0])).unwrap();
        assert!(a.add(ind(1, &[3.0, 3.0])).unwrap());
        assert_eq!(a.len(), 1);
        assert_eq!(a.contents()[0].id(), IndividualId(1));
        assert_eq!(a.improvements(), 1);

        assert!(!a.add(ind(2, &[6.0, 6.0])).unwrap());
        assert_eq!(a.len(), 1);
        assert_eq!(a.contents()[0].id(), IndividualId(1));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut a = Archive::pareto();
        a.add(ind(0, &[1.0, 2.0])).unwrap();
        assert!(!a.add(ind(1, &[1.0, 2.0])).unwrap());
        assert!(a.add(ind(2, &[2.0, 1.0])).unwrap());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_evicts_several() {
        let mut a = Archive::pareto();
        a.extend(vec![ind(0, &[1.0, 9.0]), ind(1, &[5.0, 5.0]), ind(2, &[6.0, 4.0]), ind(3, &[9.0, 1.0])])
            .unwrap();
        assert_eq!(a.len(), 4);
        assert!(a.add(ind(4, &[4.0, 3.0])).unwrap());
        let ids: Vec<u64> = a.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![0, 3, 4]);
        assert!(non_dominated(&a));
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let mut a = Archive::pareto();
        a.add(ind(0, &[1.0, 2.0])).unwrap();
        assert_eq!(
            a.add(ind(1, &[1.0])).unwrap_err(),
            MoeaError::CostLengthMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_unevaluated_is_error() {
        let mut a = Archive::pareto();
        let err = a.add(Individual::new(IndividualId(0), vec![0.0])).unwrap_err();
        assert!(matches!(err, MoeaError::Unevaluated { .. }));
    }

    #[test]
    fn test_source_mutation_does_not_leak() {
        let mut source = ind(0, &[1.0, 1.0]);
        let mut a = Archive::pareto();
        a.add(source.clone()).unwrap();
        source.crowding_distance = 42.0;
        source.set_costs(vec![9.0, 9.0], 0.0);
        assert_eq!(a.contents()[0].costs(), Some(&[1.0, 1.0][..]));
        assert_eq!(a.contents()[0].crowding_distance, 0.0);
    }

    #[test]
    fn test_epsilon_archive_rejects_zero_epsilon() {
        assert!(Archive::epsilon(vec![0.0]).is_err());
    }

    #[test]
    fn test_epsilon_archive_one_per_box() {
        let mut a = Archive::epsilon(vec![1.0]).unwrap();
        assert!(a.add(ind(0, &[1.8, 1.8])).unwrap());
        // Same box, closer to corner: replaces.
        assert!(a.add(ind(1, &[1.2, 1.2])).unwrap());
        assert_eq!(a.len(), 1);
        // Same box, farther: rejected.
        assert!(!a.add(ind(2, &[1.5, 1.5])).unwrap());
        // Same box, same corner distance: rejected as duplicate.
        assert!(!a.add(ind(3, &[1.2, 1.2])).unwrap());
        // Different, non-dominated box.
        assert!(a.add(ind(4, &[0.5, 3.5])).unwrap());
        assert_eq!(a.len(), 2);
        assert!(non_dominated(&a));
    }

    #[test]
    fn test_bounded_evicts_most_crowded() {
        let mut a = Archive::pareto().with_capacity(3, RankingFeature::CrowdingDistance, true);
        a.add(ind(0, &[0.0, 10.0])).unwrap();
        a.add(ind(1, &[10.0, 0.0])).unwrap();
        a.add(ind(2, &[1.0, 9.0])).unwrap();
        assert!(a.add(ind(3, &[5.0, 5.0])).unwrap());
        assert_eq!(a.len(), 3);
        // Interior crowding: (1,9) -> 0.5, (5,5) -> 0.9.
        let ids: Vec<u64> = a.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![0, 1, 3]);
        assert_eq!(a.improvements(), 0);
    }

    #[test]
    fn test_bounded_rejects_lowest_ranked_candidate() {
        let mut a = Archive::pareto().with_capacity(3, RankingFeature::CrowdingDistance, true);
        a.add(ind(0, &[0.0, 10.0])).unwrap();
        a.add(ind(1, &[10.0, 0.0])).unwrap();
        a.add(ind(2, &[5.0, 5.0])).unwrap();
        // Interior crowding: (5,5) -> 0.55, (5.5,4.5) -> 0.5.
        assert!(!a.add(ind(3, &[5.5, 4.5])).unwrap());
        let ids: Vec<u64> = a.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_bounded_full_rejects_worse_candidate() {
        let mut a = Archive::pareto().with_capacity(1, RankingFeature::Cost(0), false);
        a.add(ind(0, &[1.0, 9.0])).unwrap();
        assert!(!a.add(ind(1, &[2.0, 8.0])).unwrap());
        assert_eq!(a.len(), 1);
        assert_eq!(a.contents()[0].id(), IndividualId(0));

        assert!(a.add(ind(2, &[0.5, 9.5])).unwrap());
        assert_eq!(a.contents()[0].id(), IndividualId(2));
        assert_eq!(a.improvements(), 0);
    }

    #[test]
    fn test_cost_length_resets_when_emptied() {
        let mut a = Archive::pareto();
        let first = ind(0, &[1.0, 2.0]);
        a.add(first.clone()).unwrap();
        assert!(a.remove(&first));
        assert!(a.add(ind(1, &[1.0, 2.0, 3.0])).unwrap());
        assert_eq!(a.len(), 1);

        a.truncate(0, RankingFeature::Cost(0), false).unwrap();
        assert!(a.is_empty());
        assert!(a.add(ind(2, &[4.0])).unwrap());
        assert_eq!(
            a.add(ind(3, &[1.0, 1.0])).unwrap_err(),
            MoeaError::CostLengthMismatch {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_truncate_by_cost() {
        let mut a = Archive::pareto();
        a.extend(vec![ind(0, &[1.0, 9.0]), ind(1, &[5.0, 5.0]), ind(2, &[9.0, 1.0])])
            .unwrap();
        a.truncate(2, RankingFeature::Cost(0), false).unwrap();
        let ids: Vec<u64> = a.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![0, 1]);

        a.truncate(5, RankingFeature::Cost(0), false).unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_truncate_by_crowding_keeps_boundaries() {
        let mut a = Archive::pareto();
        a.extend(vec![
            ind(0, &[0.0, 4.0]),
            ind(1, &[1.0, 3.0]),
            ind(2, &[2.0, 2.0]),
            ind(3, &[3.0, 1.0]),
            ind(4, &[4.0, 0.0]),
        ])
        .unwrap();
        a.truncate(2, RankingFeature::CrowdingDistance, true).unwrap();
        let ids: Vec<u64> = a.iter().map(|m| m.id().0).collect();
        assert_eq!(ids, vec![0, 4]);
    }

    #[test]
    fn test_rand_sample() {
        let mut rng = create_rng(42);
        let mut a = Archive::pareto();
        a.extend(vec![ind(0, &[1.0, 9.0]), ind(1, &[5.0, 5.0]), ind(2, &[9.0, 1.0])])
            .unwrap();

        let picked = a.rand_sample(3, &mut rng).unwrap();
        let mut ids: Vec<u64> = picked.iter().map(|m| m.id().0).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);

        assert_eq!(
            a.rand_sample(4, &mut rng).unwrap_err(),
            MoeaError::SampleTooLarge {
                requested: 4,
                available: 3
            }
        );
        assert!(a.rand_choice(&mut rng).is_ok());
    }

    #[test]
    fn test_rand_choice_empty() {
        let mut rng = create_rng(42);
        let a = Archive::pareto();
        assert!(a.rand_choice(&mut rng).is_err());
    }

    #[test]
    fn test_remove() {
        let mut a = Archive::pareto();
        let x = ind(0, &[1.0, 1.0]);
        a.add(x.clone()).unwrap();
        assert!(a.remove(&x));
        assert!(!a.remove(&x));
        assert!(a.is_empty());
    }
}
