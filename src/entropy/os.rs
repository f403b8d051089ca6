//! Operating system CSPRNG backend.

use super::{EntropyError, EntropySource};
use rand_core::{OsRng, RngCore};

/// Entropy from the operating system CSPRNG.
///
/// Delegates to `getrandom` through `rand_core::OsRng`. This type never
/// generates random numbers itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl OsEntropy {
    /// Creates the OS-backed source.
    pub fn new() -> Self {
        Self
    }
}

impl EntropySource for OsEntropy {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        if buf.is_empty() {
            return Ok(());
        }

        OsRng.try_fill_bytes(buf).map_err(|e| {
            tracing::warn!(error = %e, requested = buf.len(), "OS entropy fill failed");
            EntropyError::SourceFailed(e.to_string())
        })
    }

    fn name(&self) -> &'static str {
        "os"
    }
}
