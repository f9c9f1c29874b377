//! Polynomial mutation.
//!
//! # References
//!
//! - Deb & Goyal (1996), "A Combined Genetic Adaptive Search (GeneAS)
//!   for Engineering Design"

use rand::Rng;

use crate::parameter::{clip, ParameterKind, ParameterSpace};

/// Per-slot bounded mutation.
///
/// Each slot mutates independently with probability `probability`:
/// real slots get a polynomial perturbation scaled by the bound width,
/// integer slots the same followed by rounding, boolean slots a bit flip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialMutation {
    pub probability: f64,
    pub distribution_index: f64,
}

impl Default for PolynomialMutation {
    fn default() -> Self {
        Self {
            probability: 0.1,
            distribution_index: 20.0,
        }
    }
}

impl PolynomialMutation {
    pub fn new(probability: f64, distribution_index: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            distribution_index: distribution_index.max(0.0),
        }
    }

    /// Returns a mutated copy of `vector`.
    ///
    /// # Panics
    /// Panics if `vector`'s length differs from the parameter space.
    pub fn mutate<R: Rng>(&self, space: &ParameterSpace, vector: &[f64], rng: &mut R) -> Vec<f64> {
        assert_eq!(vector.len(), space.len(), "vector length must match parameters");

        let mut child = vector.to_vec();
        for (param, x) in space.iter().zip(child.iter_mut()) {
            if rng.random::<f64>() >= self.probability {
                continue;
            }
            *x = match param.kind {
                ParameterKind::Real => self.perturb(*x, param.lower, param.upper, rng),
                ParameterKind::Integer => self
                    .perturb(*x, param.lower, param.upper, rng)
                    .round()
                    .clamp(param.lower.ceil(), param.upper.floor()),
                ParameterKind::Boolean => {
                    if *x >= 0.5 {
                        0.0
                    } else {
                        1.0
                    }
                }
            };
        }
        child
    }

    fn perturb<R: Rng>(&self, x: f64, lb: f64, ub: f64, rng: &mut R) -> f64 {
        let dx = ub - lb;
        if dx <= 0.0 {
            return x;
        }

        let exponent = self.distribution_index + 1.0;
        let u: f64 = rng.random();
        let delta = if u < 0.5 {
            let bl = (x - lb) / dx;
            let b = 2.0 * u + (1.0 - 2.0 * u) * (1.0 - bl).powf(exponent);
            b.powf(1.0 / exponent) - 1.0
        } else {
            let bu = (ub - x) / dx;
            let b = 2.0 * (1.0 - u) + 2.0 * (u - 0.5) * (1.0 - bu).powf(exponent);
            1.0 - b.powf(1.0 / exponent)
        };

        clip(x + delta * dx, lb, ub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;
    use crate::random::create_rng;

    fn space() -> ParameterSpace {
        ParameterSpace::new(vec![
            Parameter::real("a", 0.0, 1.0),
            Parameter::integer("b", -10, 10),
            Parameter::boolean("c"),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_probability_is_identity() {
        let pm = PolynomialMutation::new(0.0, 20.0);
        let mut rng = create_rng(42);
        let x = vec![0.3, 4.0, 1.0];
        for _ in 0..100 {
            assert_eq!(pm.mutate(&space(), &x, &mut rng), x);
        }
    }

    #[test]
    fn test_stays_in_bounds_and_integral() {
        let s = space();
        let pm = PolynomialMutation::new(1.0, 1.0);
        let mut rng = create_rng(42);
        let x = vec![0.99, 9.0, 0.0];
        for _ in 0..1000 {
            let y = pm.mutate(&s, &x, &mut rng);
            assert!(s.contains(&y), "out of bounds: {y:?}");
            assert_eq!(y[1], y[1].round());
        }
    }

    #[test]
    fn test_boolean_flips() {
        let s = ParameterSpace::new(vec![Parameter::boolean("a"), Parameter::boolean("b")]).unwrap();
        let pm = PolynomialMutation::new(1.0, 20.0);
        let mut rng = create_rng(1);
        assert_eq!(pm.mutate(&s, &[0.0, 1.0], &mut rng), vec![1.0, 0.0]);
    }

    #[test]
    fn test_input_untouched() {
        let pm = PolynomialMutation::new(1.0, 20.0);
        let mut rng = create_rng(3);
        let x = vec![0.5, 0.0, 0.0];
        let y = pm.mutate(&space(), &x, &mut rng);
        assert_eq!(x, vec![0.5, 0.0, 0.0]);
        assert_ne!(y[2], x[2]);
    }

    #[test]
    fn test_degenerate_bounds() {
        let s = ParameterSpace::new(vec![Parameter::real("fixed", 2.0, 2.0)]).unwrap();
        let pm = PolynomialMutation::new(1.0, 20.0);
        let mut rng = create_rng(3);
        assert_eq!(pm.mutate(&s, &[2.0], &mut rng), vec![2.0]);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let pm = PolynomialMutation::new(0.5, 20.0);
        let x = vec![0.5, 0.0, 1.0];
        let a = pm.mutate(&space(), &x, &mut create_rng(8));
        let b = pm.mutate(&space(), &x, &mut create_rng(8));
        assert_eq!(a, b);
    }

    #[test]
    fn test_perturbation_is_local() {
        // A high distribution index keeps mutants close to the parent.
        let s = ParameterSpace::new(vec![Parameter::real("x", 0.0, 100.0)]).unwrap();
        let pm = PolynomialMutation::new(1.0, 100.0);
        let mut rng = create_rng(4);
        let mean_shift: f64 = (0..1000)
            .map(|_| (pm.mutate(&s, &[50.0], &mut rng)[0] - 50.0).abs())
            .sum::<f64>()
            / 1000.0;
        assert!(mean_shift < 5.0, "mean shift {mean_shift}");
    }
}
