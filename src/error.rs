//! Error type shared by the measurement, fitting and calibration stages.
//!
//! Every variant aborts the single call that raised it; nothing is retried
//! internally and no partial results are returned.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VcutError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VcutError {
    /// Hint line has zero length or cannot be clipped into the image bounds.
    #[error("degenerate line: {reason}")]
    DegenerateLine { reason: String },

    /// Fitted V edges are (near-)parallel, so no apex exists.
    #[error("no intersection between fitted V edges: {reason}")]
    NoIntersection { reason: String },

    /// The sampled curve never reaches the requested level.
    #[error("curve does not cross y={target} (occurrence {occurrence}, {samples} samples)")]
    NoCrossing {
        target: f64,
        occurrence: usize,
        samples: usize,
    },

    /// Two input images that must share dimensions do not.
    #[error("shape mismatch: {what} is {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Contrast could not be formed or normalized.
    #[error("degenerate contrast: {reason}")]
    DegenerateContrast { reason: String },

    /// Least-squares input without enough support or x-spread.
    #[error("degenerate fit: {reason}")]
    DegenerateFit { reason: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl VcutError {
    pub(crate) fn degenerate_line(reason: impl Into<String>) -> Self {
        Self::DegenerateLine {
            reason: reason.into(),
        }
    }

    pub(crate) fn no_intersection(reason: impl Into<String>) -> Self {
        Self::NoIntersection {
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate_contrast(reason: impl Into<String>) -> Self {
        Self::DegenerateContrast {
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate_fit(reason: impl Into<String>) -> Self {
        Self::DegenerateFit {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
