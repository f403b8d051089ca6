//! Crate-wide error taxonomy.
//!
//! Every entry point returns `Result<_, Error>`. A non-success result
//! means any partially written output must not be trusted.

use crate::abi::LayoutMismatch;
use crate::config::ConfigError;
use crate::entropy::EntropyError;
use thiserror::Error;

/// Errors returned by generation, audit and layout checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A length, alphabet or count argument was rejected before any draw.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The entropy source failed. Never retried, never substituted.
    #[error("entropy unavailable: {0}")]
    EntropyUnavailable(#[from] EntropyError),

    /// Character-class minimums cannot be met for this length or alphabet.
    #[error("character requirements impossible: {0}")]
    RequirementsImpossible(String),

    /// Constrained generation ran out of attempts.
    #[error("constrained generation exhausted {attempts} attempts")]
    ExhaustedAttempts {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// The record layout does not match what the reader expects.
    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatch),

    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Stable status code for callers on the far side of a boundary.
    ///
    /// Zero is reserved for success; every failure kind is negative.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::EntropyUnavailable(_) => -1,
            Error::InvalidArgument(_) | Error::Config(_) => -2,
            Error::RequirementsImpossible(_) => -3,
            Error::ExhaustedAttempts { .. } => -4,
            Error::LayoutMismatch(_) => -5,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
