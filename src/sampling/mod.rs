//! Unbiased index sampling by rejection.
//!
//! For an alphabet of `n` symbols, a raw byte is accepted only if it is
//! at most `max_valid(n) = floor(256 / n) * n - 1`. Accepted bytes are
//! reduced modulo `n`, so every index has exactly `floor(256 / n)`
//! preimages and the distribution is uniform. Dropping the `- 1`
//! silently reintroduces modulo bias.

use crate::entropy::EntropySource;
use crate::error::{Error, Result};

/// Largest supported alphabet size for sampling.
pub const MAX_SAMPLE_SPACE: usize = 256;

/// Upper bound on the bytes requested from the source per fill.
const CHUNK_LEN: usize = 512;

/// Largest accepted raw byte for an alphabet of `n` symbols.
///
/// `n` must be in `1..=256`.
#[inline]
pub const fn max_valid(n: usize) -> usize {
    (256 / n) * n - 1
}

/// Probability, as a fraction, that a single raw byte is rejected.
#[inline]
pub fn rejection_probability(n: usize) -> f64 {
    (255 - max_valid(n)) as f64 / 256.0
}

/// Draws unbiased indices from an entropy source.
#[derive(Debug, Clone)]
pub struct RejectionSampler {
    n: usize,
    max_valid: u8,
    /// Rejected bytes tolerated before a draw is abandoned.
    budget: Option<u64>,
    rejected: u64,
}

/// Outcome of a budgeted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    /// The output buffer was filled.
    Complete,
    /// The rejection budget ran out first; the output is not usable.
    BudgetExceeded,
}

impl RejectionSampler {
    /// Creates a sampler over `0..n` with no rejection budget.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 || n > MAX_SAMPLE_SPACE {
            return Err(Error::invalid(format!(
                "sample space {n} outside 1..={MAX_SAMPLE_SPACE}"
            )));
        }
        Ok(Self {
            n,
            max_valid: max_valid(n) as u8,
            budget: None,
            rejected: 0,
        })
    }

    /// Creates a sampler that gives up after `budget` rejected bytes.
    pub fn with_budget(n: usize, budget: u64) -> Result<Self> {
        let mut sampler = Self::new(n)?;
        sampler.budget = Some(budget);
        Ok(sampler)
    }

    /// Rejected bytes seen since construction.
    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Maps a raw byte to an index, or `None` if it must be redrawn.
    #[inline]
    pub fn accept(&self, byte: u8) -> Option<usize> {
        (byte <= self.max_valid).then(|| byte as usize % self.n)
    }

    /// Fills `out` with independent indices in `0..n`.
    ///
    /// Raw bytes are requested in chunks of roughly twice the number of
    /// indices still missing and scrubbed before returning.
    pub fn fill<S: EntropySource + ?Sized>(
        &mut self,
        source: &mut S,
        out: &mut [usize],
    ) -> Result<Draw> {
        let mut buf = [0u8; CHUNK_LEN];
        let mut filled = 0;

        let outcome = loop {
            if filled == out.len() {
                break Draw::Complete;
            }

            let need = ((out.len() - filled) * 2).min(CHUNK_LEN);
            if let Err(e) = source.fill(&mut buf[..need]) {
                buf.fill(0);
                return Err(e.into());
            }

            let mut exhausted = false;
            for &byte in &buf[..need] {
                if filled == out.len() {
                    break;
                }
                match self.accept(byte) {
                    Some(index) => {
                        out[filled] = index;
                        filled += 1;
                    }
                    None => {
                        self.rejected += 1;
                        if self.budget.is_some_and(|b| self.rejected > b) {
                            exhausted = true;
                            break;
                        }
                    }
                }
            }

            if exhausted {
                tracing::debug!(
                    rejected = self.rejected,
                    space = self.n,
                    "rejection budget exceeded"
                );
                break Draw::BudgetExceeded;
            }
        };

        buf.fill(0);
        Ok(outcome)
    }
}
