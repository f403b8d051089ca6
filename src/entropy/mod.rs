//! Entropy acquisition.
//!
//! Every random byte in the crate comes through [`EntropySource`].
//! Two backends exist and are chosen when the generator is built:
//!
//! - [`OsEntropy`]: the operating system CSPRNG via `rand_core::OsRng`.
//! - [`HostEntropy`]: a fill callback supplied by a host across a
//!   sandbox boundary (e.g. a WASI `random_get` import).
//!
//! Failure is fail-closed. A source that cannot fill the whole buffer
//! reports an error; callers never fall back to anything deterministic.

mod host;
mod os;

pub use host::HostEntropy;
pub use os::OsEntropy;

use thiserror::Error;

/// Errors reported by an entropy source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    /// The underlying source reported a failure.
    #[error("entropy source failed: {0}")]
    SourceFailed(String),

    /// The host callback returned a nonzero status code.
    #[error("host entropy call returned status {0}")]
    HostStatus(i32),

    /// The source kept producing bytes that rejection sampling discards.
    #[error("entropy source stalled after {rejected} rejected bytes")]
    Stalled {
        /// Bytes rejected before giving up.
        rejected: u64,
    },
}

/// A source of cryptographically secure random bytes.
pub trait EntropySource {
    /// Fills the whole buffer or fails. There is no partial completion.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError>;

    /// Human-readable backend name, used in logs.
    fn name(&self) -> &'static str;
}

impl<S: EntropySource + ?Sized> EntropySource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        (**self).fill(buf)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
