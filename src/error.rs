//! axial rope error types

/// axial rope result type
pub type Result<T> = std::result::Result<T, Error>;

/// axial rope errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Construction parameters that cannot produce a well-defined frequency set
    #[error("invalid configuration '{field}': {reason}")]
    InvalidConfiguration {
        /// Offending configuration field
        field: &'static str,
        /// Why it's invalid
        reason: String,
    },

    /// A tensor whose shape is incompatible with the transform
    #[error("shape mismatch for '{tensor}': expected {expected}, got {actual:?}")]
    ShapeMismatch {
        /// Which input tensor
        tensor: &'static str,
        /// Human readable description of the accepted shape
        expected: String,
        /// The shape that was supplied
        actual: Vec<i64>,
    },

    /// Error raised by libtorch while evaluating the transform
    #[error("tch error: {0}")]
    Tch(#[from] tch::TchError),
}

impl Error {
    pub(crate) fn invalid_configuration(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration { field, reason: reason.into() }
    }

    pub(crate) fn shape_mismatch(tensor: &'static str, expected: impl Into<String>, actual: Vec<i64>) -> Self {
        Error::ShapeMismatch { tensor, expected: expected.into(), actual }
    }
}
