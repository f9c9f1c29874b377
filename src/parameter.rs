//! Decision-variable and objective declarations.
//!
//! A problem declares an ordered list of [`Parameter`]s; operators index
//! into it positionally, so slot `i` of every decision vector is governed
//! by parameter `i`. The per-slot [`ParameterKind`] is resolved once when
//! the [`ParameterSpace`] is built instead of being inspected per value.

use crate::error::MoeaError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a decision-vector slot is interpreted by the operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterKind {
    /// Continuous value in `[lower, upper]`. The only kind SBX recombines.
    Real,
    /// Whole number in `[lower, upper]`. Mutation rounds after clipping.
    Integer,
    /// A single bit stored as `0.0` / `1.0`. Mutation flips it.
    Boolean,
}

/// A bounded decision variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameter {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: ParameterKind,
    /// Optional quantization step for real values, measured from `lower`.
    pub precision: Option<f64>,
}

impl Parameter {
    /// A real-valued parameter in `[lower, upper]`.
    pub fn real(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            kind: ParameterKind::Real,
            precision: None,
        }
    }

    /// An integer parameter in `[lower, upper]`.
    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            lower: lower as f64,
            upper: upper as f64,
            kind: ParameterKind::Integer,
            precision: None,
        }
    }

    /// A boolean parameter encoded as `0.0` / `1.0`.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: 1.0,
            kind: ParameterKind::Boolean,
            precision: None,
        }
    }

    /// Sets the quantization step.
    pub fn with_precision(mut self, step: f64) -> Self {
        self.precision = Some(step);
        self
    }

    /// Width of the feasible interval.
    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }

    fn validate(&self) -> Result<(), MoeaError> {
        let invalid = |reason: &str| MoeaError::InvalidParameter {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if self.lower > self.upper {
            return Err(invalid("lower bound exceeds upper bound"));
        }
        match self.kind {
            ParameterKind::Integer if self.lower.ceil() > self.upper.floor() => {
                return Err(invalid("no integer lies within the bounds"));
            }
            ParameterKind::Boolean if self.lower != 0.0 || self.upper != 1.0 => {
                return Err(invalid("boolean bounds must be [0, 1]"));
            }
            _ => {}
        }
        if let Some(step) = self.precision {
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid("precision must be finite and positive"));
            }
        }
        Ok(())
    }

    /// Brings a value back into this parameter's domain: clip, quantize,
    /// round integers, snap booleans.
    pub fn repair(&self, value: f64) -> f64 {
        let clipped = clip(value, self.lower, self.upper);
        match self.kind {
            ParameterKind::Real => match self.precision {
                Some(step) => {
                    let steps = ((clipped - self.lower) / step).round();
                    clip(self.lower + steps * step, self.lower, self.upper)
                }
                None => clipped,
            },
            ParameterKind::Integer => clipped.round().clamp(self.lower.ceil(), self.upper.floor()),
            ParameterKind::Boolean => {
                if clipped >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Clamps `value` into `[lower, upper]`.
pub(crate) fn clip(value: f64, lower: f64, upper: f64) -> f64 {
    value.max(lower).min(upper)
}

/// A validated, ordered set of parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSpace {
    parameters: Vec<Parameter>,
}

impl ParameterSpace {
    /// Validates every declaration.
    ///
    /// # Errors
    /// Returns [`MoeaError::InvalidParameter`] for empty declarations,
    /// non-finite or inverted bounds, integer ranges without an integer,
    /// non-`[0, 1]` booleans, or a non-positive precision.
    pub fn new(parameters: Vec<Parameter>) -> Result<Self, MoeaError> {
        if parameters.is_empty() {
            return Err(MoeaError::InvalidParameter {
                name: String::new(),
                reason: "at least one parameter is required".into(),
            });
        }
        for p in &parameters {
            p.validate()?;
        }
        Ok(Self { parameters })
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get(&self, index: usize) -> &Parameter {
        &self.parameters[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Whether every slot of `vector` lies within its bounds.
    pub fn contains(&self, vector: &[f64]) -> bool {
        vector.len() == self.len()
            && self
                .parameters
                .iter()
                .zip(vector)
                .all(|(p, &x)| x >= p.lower && x <= p.upper)
    }

    /// Checks the vector length against the declaration.
    pub fn check_len(&self, vector: &[f64]) -> Result<(), MoeaError> {
        if vector.len() != self.len() {
            return Err(MoeaError::VectorLengthMismatch {
                expected: self.len(),
                found: vector.len(),
            });
        }
        Ok(())
    }

    /// Repairs every slot in place. See [`Parameter::repair`].
    pub fn repair(&self, vector: &mut [f64]) {
        for (p, x) in self.parameters.iter().zip(vector.iter_mut()) {
            *x = p.repair(*x);
        }
    }
}

/// Optimization direction of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Goal {
    #[default]
    Minimize,
    Maximize,
}

/// A named objective.
///
/// Internally every cost is minimized: maximized objectives are negated
/// on the way in and restored with [`to_reported`](Self::to_reported).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Objective {
    pub name: String,
    pub goal: Goal,
}

impl Objective {
    pub fn minimize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: Goal::Minimize,
        }
    }

    pub fn maximize(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: Goal::Maximize,
        }
    }

    fn sign(&self) -> f64 {
        match self.goal {
            Goal::Minimize => 1.0,
            Goal::Maximize => -1.0,
        }
    }

    /// Converts an evaluator value to its lower-is-better form.
    pub fn to_minimized(&self, value: f64) -> f64 {
        self.sign() * value
    }

    /// Converts a stored cost back to the evaluator's orientation.
    pub fn to_reported(&self, cost: f64) -> f64 {
        self.sign() * cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_rejects_empty() {
        assert!(ParameterSpace::new(vec![]).is_err());
    }

    #[test]
    fn test_space_rejects_inverted_bounds() {
        let err = ParameterSpace::new(vec![Parameter::real("x", 2.0, 1.0)]).unwrap_err();
        assert!(matches!(err, MoeaError::InvalidParameter { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_space_rejects_integer_gap() {
        let p = Parameter {
            name: "n".into(),
            lower: 0.2,
            upper: 0.8,
            kind: ParameterKind::Integer,
            precision: None,
        };
        assert!(ParameterSpace::new(vec![p]).is_err());
    }

    #[test]
    fn test_space_rejects_bad_precision() {
        let p = Parameter::real("x", 0.0, 1.0).with_precision(0.0);
        assert!(ParameterSpace::new(vec![p]).is_err());
    }

    #[test]
    fn test_repair_kinds() {
        let space = ParameterSpace::new(vec![
            Parameter::real("a", 0.0, 1.0).with_precision(0.25),
            Parameter::integer("b", -3, 3),
            Parameter::boolean("c"),
            Parameter::real("d", -1.0, 1.0),
        ])
        .unwrap();

        let mut v = vec![0.3, 2.6, 0.7, 5.0];
        space.repair(&mut v);
        assert_eq!(v, vec![0.25, 3.0, 1.0, 1.0]);
        assert!(space.contains(&v));

        let mut v = vec![-4.0, -9.0, 0.1, -1.5];
        space.repair(&mut v);
        assert_eq!(v, vec![0.0, -3.0, 0.0, -1.0]);
    }

    #[test]
    fn test_contains_checks_length() {
        let space = ParameterSpace::new(vec![Parameter::real("x", 0.0, 1.0)]).unwrap();
        assert!(!space.contains(&[0.5, 0.5]));
        assert!(space.check_len(&[0.5, 0.5]).is_err());
        assert!(space.check_len(&[0.5]).is_ok());
    }

    #[test]
    fn test_objective_orientation() {
        let min = Objective::minimize("mass");
        let max = Objective::maximize("torque");
        assert_eq!(min.to_minimized(3.0), 3.0);
        assert_eq!(max.to_minimized(3.0), -3.0);
        assert_eq!(max.to_reported(max.to_minimized(3.0)), 3.0);
    }
}
