//! Error types for fill operations.

use thiserror::Error;

/// Error type for fill operations.
///
/// Only precondition failures are errors. A fully masked image or a pixel
/// with no usable source patch is a degenerate input with defined fallback
/// behaviour and never produces an `OpsError`.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from a core buffer operation.
    #[error(transparent)]
    Core(#[from] heal_core::Error),
}

/// Result type for fill operations.
pub type OpsResult<T> = Result<T, OpsError>;
