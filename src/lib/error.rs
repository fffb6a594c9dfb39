//! Diagnostics returned instead of a program.

use std::fmt;
use thiserror::Error;

/// The machining operations a program can contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Facing,
    Turning,
    StepTurning,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Facing => write!(f, "facing"),
            Operation::Turning => write!(f, "turning"),
            Operation::StepTurning => write!(f, "step turning"),
        }
    }
}

/// Why a request did not produce a program. None of these are fatal; all but
/// `NoApplicableOperation` are correctable by the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// An operation that applies has no positive depth of cut.
    #[error("Please enter a positive depth of cut for {operation}")]
    MissingDepthOfCut { operation: Operation },

    /// Nothing to remove, and step turning was not requested.
    #[error("No operation needed: final dimensions are not smaller than initial dimensions")]
    NoApplicableOperation,

    /// Step turning needs at least one step.
    #[error("Number of steps must be at least 1, got {count}")]
    InvalidStepCount { count: usize },

    /// A workpiece dimension is zero or negative.
    #[error("Please enter all initial and final dimensions: {name} is {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    /// A spindle speed or feed rate is zero or negative.
    #[error("Invalid value for '{name}': {value} (must be positive)")]
    InvalidParameter { name: &'static str, value: f64 },
}

impl PlanError {
    /// True when the diagnostic reports that there is nothing to do, rather than a bad input.
    pub fn is_informational(&self) -> bool {
        matches!(self, PlanError::NoApplicableOperation)
    }
}
