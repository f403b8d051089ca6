//! Host-supplied entropy backend.
//!
//! Inside a sandbox (WASM, enclave) the only entropy is whatever the
//! host hands over. The host call is modelled as a closure returning a
//! status code, matching the WASI `random_get` convention: zero is
//! success, anything else is an errno.

use super::{EntropyError, EntropySource};

/// Entropy delegated to a host fill callback.
pub struct HostEntropy<F>
where
    F: FnMut(&mut [u8]) -> i32,
{
    fill: F,
    calls: u64,
}

impl<F> HostEntropy<F>
where
    F: FnMut(&mut [u8]) -> i32,
{
    /// Wraps a host fill callback.
    pub fn new(fill: F) -> Self {
        Self { fill, calls: 0 }
    }

    /// Number of successful host calls so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl<F> EntropySource for HostEntropy<F>
where
    F: FnMut(&mut [u8]) -> i32,
{
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        if buf.is_empty() {
            return Ok(());
        }

        match (self.fill)(buf) {
            0 => {
                self.calls += 1;
                Ok(())
            }
            status => {
                // Partially written bytes are not trusted.
                buf.fill(0);
                tracing::warn!(status, requested = buf.len(), "host entropy call failed");
                Err(EntropyError::HostStatus(status))
            }
        }
    }

    fn name(&self) -> &'static str {
        "host"
    }
}

impl<F> std::fmt::Debug for HostEntropy<F>
where
    F: FnMut(&mut [u8]) -> i32,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEntropy")
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}
