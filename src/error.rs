//! Error types.
//!
//! [`MoeaError`] is returned for caller contract violations: these
//! indicate an invariant breach upstream and are never silently degraded.
//! [`EvaluationError`] is produced by user evaluators; only its
//! [`Fatal`](EvaluationError::Fatal) variant ever escapes a run.

/// Failure reported by a problem evaluator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// The candidate could not be scored this time. The runner replaces
    /// the vector with a freshly generated one and tries again.
    #[error("transient evaluation failure: {0}")]
    Transient(String),

    /// The evaluator cannot continue. Terminates the run.
    #[error("fatal evaluation failure: {0}")]
    Fatal(String),
}

/// Errors raised by sorting, archiving, operators, and runners.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoeaError {
    #[error("individual at position {index} has not been evaluated")]
    Unevaluated { index: usize },

    #[error("cost vector length mismatch: expected {expected}, found {found}")]
    CostLengthMismatch { expected: usize, found: usize },

    #[error("decision vector length mismatch: expected {expected}, found {found}")]
    VectorLengthMismatch { expected: usize, found: usize },

    #[error("operation requires a non-empty population")]
    EmptyPopulation,

    #[error("cannot truncate {available} individuals to {target}")]
    TruncationTooLarge { available: usize, target: usize },

    #[error("cannot sample {requested} members from an archive of {available}")]
    SampleTooLarge { requested: usize, available: usize },

    #[error("invalid epsilon {value} at objective {index}: must be finite and positive")]
    InvalidEpsilon { index: usize, value: f64 },

    #[error("epsilon list must not be empty")]
    NoEpsilons,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("generator exhausted: requested {requested}, {remaining} vectors left")]
    GeneratorExhausted { requested: usize, remaining: usize },

    #[error("population sink failed: {0}")]
    Sink(String),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
