use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MerkleError>;

/// One rejected input to a root derivation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyInput,
    UnknownAlgorithm(String),
    InvalidProcessType(i64),
    /// A process type given by a name that matches no strategy.
    UnknownProcessName(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyInput => write!(f, "no leaves supplied"),
            ValidationIssue::UnknownAlgorithm(name) => write!(f, "unknown algorithm {name:?}"),
            ValidationIssue::InvalidProcessType(v) => write!(f, "invalid process type {v}"),
            ValidationIssue::UnknownProcessName(name) => write!(f, "unknown process type {name:?}"),
        }
    }
}

/// Every issue found while validating one request, in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn has_empty_input(&self) -> bool {
        self.issues.iter().any(|i| matches!(i, ValidationIssue::EmptyInput))
    }

    pub fn has_unknown_algorithm(&self) -> bool {
        self.issues.iter().any(|i| matches!(i, ValidationIssue::UnknownAlgorithm(_)))
    }

    pub fn has_invalid_process_type(&self) -> bool {
        self.issues.iter().any(|i| {
            matches!(i, ValidationIssue::InvalidProcessType(_) | ValidationIssue::UnknownProcessName(_))
        })
    }

    /// Ok when nothing was recorded, otherwise the aggregated error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MerkleError::Invalid(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum MerkleError {
    #[error("argument error(s) - {0}")]
    Invalid(ValidationErrors),

    #[error("timed out after {deadline:?}")]
    TimedOut { deadline: Duration },

    #[error("root mismatch: expected {expected}, computed {actual}")]
    ProofMismatch { expected: String, actual: String },

    #[error("reduction worker exited without reporting a result")]
    WorkerLost,

    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MerkleError {
    /// The validation issues carried by this error, if it is a validation error.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            MerkleError::Invalid(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, MerkleError::TimedOut { .. })
    }
}
