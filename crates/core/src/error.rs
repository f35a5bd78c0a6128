use thiserror::Error;

/// Failures of the typing judgment and the reducer.
///
/// Terms are rendered eagerly so the error can leave the thread that owns the
/// term factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("unknown constant `{name}`")]
    UnknownConstant { name: String },
    #[error("variable #{index} escapes a context of {depth} binders")]
    UnboundIndex { index: usize, depth: usize },
    #[error("{position} is not a type: `{term}` has type `{found}`")]
    NotAType {
        position: &'static str,
        term: String,
        found: String
    },
    #[error("`{term}` is not a function, its type is `{found}`")]
    NotAFunction { term: String, found: String },
    #[error("argument type mismatch: expected `{expected}`, found `{found}`")]
    ArgumentMismatch { expected: String, found: String },
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    #[error("staging construct `{term}` in object code")]
    StagedTerm { term: String },
    #[error("no universe above `(sort {level})`")]
    UniverseOverflow { level: usize },
    #[error("no termination after {steps} steps")]
    NonTermination { steps: usize },
}
