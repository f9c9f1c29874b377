//! Initial-population generators.
//!
//! A [`Generator`] produces decision vectors that already satisfy the
//! parameter space: every slot lies within bounds, integers are whole,
//! booleans are `0.0` / `1.0`.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::MoeaError;
use crate::parameter::{ParameterKind, ParameterSpace};

/// Source of decision vectors for the initial population and for
/// replacing vectors whose evaluation failed transiently.
pub trait Generator: Send {
    /// Produces `n` vectors for `space`.
    ///
    /// # Errors
    /// Finite sources return [`MoeaError::GeneratorExhausted`] when fewer
    /// than `n` vectors remain.
    fn generate(
        &mut self,
        space: &ParameterSpace,
        n: usize,
        rng: &mut dyn rand::RngCore,
    ) -> Result<Vec<Vec<f64>>, MoeaError>;
}

/// Independent uniform sampling per slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn sample<R: Rng + ?Sized>(space: &ParameterSpace, rng: &mut R) -> Vec<f64> {
        space
            .iter()
            .map(|p| {
                let value = match p.kind {
                    ParameterKind::Real => {
                        if p.span() > 0.0 {
                            rng.random_range(p.lower..=p.upper)
                        } else {
                            p.lower
                        }
                    }
                    ParameterKind::Integer => {
                        let lo = p.lower.ceil() as i64;
                        let hi = p.upper.floor() as i64;
                        rng.random_range(lo..=hi) as f64
                    }
                    ParameterKind::Boolean => {
                        if rng.random_bool(0.5) {
                            1.0
                        } else {
                            0.0
                        }
                    }
                };
                p.repair(value)
            })
            .collect()
    }
}

impl Generator for RandomGenerator {
    fn generate(
        &mut self,
        space: &ParameterSpace,
        n: usize,
        rng: &mut dyn rand::RngCore,
    ) -> Result<Vec<Vec<f64>>, MoeaError> {
        Ok((0..n).map(|_| Self::sample(space, &mut *rng)).collect())
    }
}

/// Latin hypercube sampling.
///
/// Each slot's interval is cut into `n` equal strata; every stratum
/// receives exactly one sample, and strata are paired across slots by an
/// independent permutation per slot. Integer slots are stratified over
/// their whole numbers instead of the raw interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatinHypercubeGenerator;

impl LatinHypercubeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for LatinHypercubeGenerator {
    fn generate(
        &mut self,
        space: &ParameterSpace,
        n: usize,
        rng: &mut dyn rand::RngCore,
    ) -> Result<Vec<Vec<f64>>, MoeaError> {
        let mut vectors = vec![Vec::with_capacity(space.len()); n];
        if n == 0 {
            return Ok(vectors);
        }

        let mut strata: Vec<usize> = (0..n).collect();
        for param in space.iter() {
            strata.shuffle(&mut *rng);
            for (vector, &stratum) in vectors.iter_mut().zip(&strata) {
                let u = (stratum as f64 + rng.random::<f64>()) / n as f64;
                let value = match param.kind {
                    // Equal share of strata per whole number.
                    ParameterKind::Integer => {
                        let lo = param.lower.ceil();
                        let count = param.upper.floor() - lo + 1.0;
                        lo + (u * count).floor().min(count - 1.0)
                    }
                    _ => param.lower + u * param.span(),
                };
                vector.push(param.repair(value));
            }
        }
        Ok(vectors)
    }
}

/// Hands out a fixed list of user-supplied vectors in order.
#[derive(Debug, Clone, Default)]
pub struct CustomGenerator {
    vectors: VecDeque<Vec<f64>>,
}

impl CustomGenerator {
    pub fn new(vectors: Vec<Vec<f64>>) -> Self {
        Self {
            vectors: vectors.into(),
        }
    }

    /// Vectors not yet handed out.
    pub fn remaining(&self) -> usize {
        self.vectors.len()
    }
}

impl Generator for CustomGenerator {
    fn generate(
        &mut self,
        space: &ParameterSpace,
        n: usize,
        _rng: &mut dyn rand::RngCore,
    ) -> Result<Vec<Vec<f64>>, MoeaError> {
        if n > self.vectors.len() {
            return Err(MoeaError::GeneratorExhausted {
                requested: n,
                remaining: self.vectors.len(),
            });
        }
        for v in self.vectors.iter().take(n) {
            space.check_len(v)?;
            if !space.contains(v) {
                return Err(MoeaError::InvalidConfig(format!(
                    "custom vector {v:?} lies outside the parameter bounds"
                )));
            }
        }
        Ok(self.vectors.drain(..n).collect())
    }
}
