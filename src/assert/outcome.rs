//! Expectation outcomes

use serde::{Deserialize, Serialize};

/// Verdict of a single expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The contract clause holds
    Passed,
    /// The backend answered, but not as the contract requires
    Failed { expected: String, actual: String },
    /// The check could not be judged (transport error, unexpected rejection,
    /// failed setup, timeout)
    Errored { message: String },
}

impl Outcome {
    pub fn failed(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Outcome::Failed {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        Outcome::Errored {
            message: message.into(),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Passed => write!(f, "passed"),
            Outcome::Failed { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Outcome::Errored { message } => write!(f, "error: {message}"),
        }
    }
}
