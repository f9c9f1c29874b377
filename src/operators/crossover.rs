//! Simulated binary crossover (SBX).
//!
//! # References
//!
//! - Deb & Agrawal (1995), "Simulated Binary Crossover for Continuous Search Space"
//! - Deb & Goyal (1996), bounded SBX variant used by NSGA-II

use rand::Rng;

use crate::parameter::{clip, ParameterKind, ParameterSpace};

/// SBX for bounded real variables.
///
/// With probability `probability` the pair is recombined; each real slot
/// whose parent values differ then gets two children spread around the
/// parents by the polynomial distribution with index `distribution_index`,
/// randomly swapped between the two children and clipped to bounds.
/// Integer and boolean slots are copied verbatim.
///
/// Parents are never modified; the children are fresh vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedBinaryCrossover {
    pub probability: f64,
    pub distribution_index: f64,
}

impl Default for SimulatedBinaryCrossover {
    fn default() -> Self {
        Self {
            probability: 0.9,
            distribution_index: 15.0,
        }
    }
}

impl SimulatedBinaryCrossover {
    pub fn new(probability: f64, distribution_index: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            distribution_index: distribution_index.max(0.0),
        }
    }

    /// Produces two children from two parents.
    ///
    /// # Panics
    /// Panics if either parent's length differs from the parameter space.
    pub fn cross<R: Rng>(
        &self,
        space: &ParameterSpace,
        parent1: &[f64],
        parent2: &[f64],
        rng: &mut R,
    ) -> (Vec<f64>, Vec<f64>) {
        assert_eq!(parent1.len(), space.len(), "parent length must match parameters");
        assert_eq!(parent2.len(), space.len(), "parent length must match parameters");

        let mut child1 = parent1.to_vec();
        let mut child2 = parent2.to_vec();

        if rng.random::<f64>() >= self.probability {
            return (child1, child2);
        }

        for (i, param) in space.iter().enumerate() {
            if param.kind != ParameterKind::Real {
                continue;
            }
            let (c1, c2) = self.sbx(child1[i], child2[i], param.lower, param.upper, rng);
            child1[i] = c1;
            child2[i] = c2;
        }

        (child1, child2)
    }

    /// Recombines one variable.
    fn sbx<R: Rng>(&self, x1: f64, x2: f64, lb: f64, ub: f64, rng: &mut R) -> (f64, f64) {
        if (x1 - x2).abs() <= f64::EPSILON {
            return (x1, x2);
        }

        let (y1, y2) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
        let dy = y2 - y1;
        let u: f64 = rng.random();

        // Spread towards the lower bound.
        let beta = 1.0 + 2.0 * (y1 - lb).max(0.0) / dy;
        let betaq = self.spread_factor(beta, u);
        let mut c1 = 0.5 * ((y1 + y2) - betaq * dy);

        // Spread towards the upper bound.
        let beta = 1.0 + 2.0 * (ub - y2).max(0.0) / dy;
        let betaq = self.spread_factor(beta, u);
        let mut c2 = 0.5 * ((y1 + y2) + betaq * dy);

        if rng.random_bool(0.5) {
            std::mem::swap(&mut c1, &mut c2);
        }

        (clip(c1, lb, ub), clip(c2, lb, ub))
    }

    /// `β_q` from the bound-aware spread `β` and uniform sample `u`.
    fn spread_factor(&self, beta: f64, u: f64) -> f64 {
        let exponent = self.distribution_index + 1.0;
        let alpha = 2.0 - beta.powf(-exponent);
        if u <= 1.0 / alpha {
            (u * alpha).powf(1.0 / exponent)
        } else {
            (1.0 / (2.0 - u * alpha)).powf(1.0 / exponent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use crate::random::create_rng;

    fn space() -> ParameterSpace {
        ParameterSpace::new(vec![
            Parameter::real("a", 0.0, 10.0),
            Parameter::real("b", -5.0, 5.0),
            Parameter::integer("c", 0, 100),
            Parameter::boolean("d"),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_probability_copies_parents() {
        let sbx = SimulatedBinaryCrossover::new(0.0, 15.0);
        let mut rng = create_rng(42);
        let p1 = vec![1.0, -2.0, 10.0, 0.0];
        let p2 = vec![9.0, 4.0, 90.0, 1.0];
        for _ in 0..100 {
            let (c1, c2) = sbx.cross(&space(), &p1, &p2, &mut rng);
            assert_eq!(c1, p1);
            assert_eq!(c2, p2);
        }
    }

    #[test]
    fn test_children_within_bounds() {
        let s = space();
        let sbx = SimulatedBinaryCrossover::new(1.0, 2.0);
        let mut rng = create_rng(42);
        let p1 = vec![0.5, -4.9, 10.0, 0.0];
        let p2 = vec![9.5, 4.9, 90.0, 1.0];
        for _ in 0..500 {
            let (c1, c2) = sbx.cross(&s, &p1, &p2, &mut rng);
            assert!(s.contains(&c1), "child out of bounds: {c1:?}");
            assert!(s.contains(&c2), "child out of bounds: {c2:?}");
        }
    }

    #[test]
    fn test_discrete_slots_copied() {
        let sbx = SimulatedBinaryCrossover::new(1.0, 15.0);
        let mut rng = create_rng(5);
        let p1 = vec![1.0, 1.0, 10.0, 0.0];
        let p2 = vec![8.0, -3.0, 90.0, 1.0];
        for _ in 0..100 {
            let (c1, c2) = sbx.cross(&space(), &p1, &p2, &mut rng);
            assert_eq!(&c1[2..], &p1[2..]);
            assert_eq!(&c2[2..], &p2[2..]);
        }
    }

    #[test]
    fn test_equal_parents_unchanged() {
        let sbx = SimulatedBinaryCrossover::new(1.0, 15.0);
        let mut rng = create_rng(9);
        let p = vec![3.0, 0.0, 50.0, 1.0];
        let (c1, c2) = sbx.cross(&space(), &p, &p, &mut rng);
        assert_eq!(c1, p);
        assert_eq!(c2, p);
    }

    #[test]
    fn test_crossover_changes_something() {
        let sbx = SimulatedBinaryCrossover::new(1.0, 15.0);
        let mut rng = create_rng(11);
        let p1 = vec![2.0, -1.0, 10.0, 0.0];
        let p2 = vec![8.0, 1.0, 90.0, 1.0];
        let changed = (0..50).any(|_| {
            let (c1, _) = sbx.cross(&space(), &p1, &p2, &mut rng);
            c1[0] != p1[0] && c1[0] != p2[0]
        });
        assert!(changed);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let sbx = SimulatedBinaryCrossover::default();
        let p1 = vec![2.0, -1.0, 10.0, 0.0];
        let p2 = vec![8.0, 1.0, 90.0, 1.0];
        let a = sbx.cross(&space(), &p1, &p2, &mut create_rng(77));
        let b = sbx.cross(&space(), &p1, &p2, &mut create_rng(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_children_center_on_parents() {
        // Without clipping, the children's mean equals the parents' mean.
        let s = ParameterSpace::new(vec![Parameter::real("x", -1000.0, 1000.0)]).unwrap();
        let sbx = SimulatedBinaryCrossover::new(1.0, 15.0);
        let mut rng = create_rng(21);
        for _ in 0..100 {
            let (c1, c2) = sbx.cross(&s, &[1.0], &[3.0], &mut rng);
            assert!(((c1[0] + c2[0]) / 2.0 - 2.0).abs() < 1e-6);
        }
    }
}
