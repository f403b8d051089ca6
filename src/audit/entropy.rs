//! Entropy and uniqueness bounds for a secret's search space.
//!
//! All search-space arithmetic is done in log space; `N^L` overflows
//! `f64` quickly.

use serde::{Deserialize, Serialize};

/// Guess rate assumed for brute-force estimates.
pub const DEFAULT_GUESSES_PER_SECOND: f64 = 1e12;

/// Entropy thresholds in bits: memorized secret, high value,
/// cryptographic equivalent, post-quantum.
pub const ENTROPY_THRESHOLDS: [f64; 4] = [30.0, 80.0, 128.0, 256.0];

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Entropy figures for secrets of a given length and alphabet size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyProof {
    /// log2 of the alphabet size.
    pub bits_per_symbol: f64,
    /// Bits for the whole secret.
    pub total_bits: f64,
    /// log10 of `alphabet_size ^ length`.
    pub log10_search_space: f64,
    /// Years to enumerate the whole space at the assumed guess rate.
    pub brute_force_years: f64,
    /// One flag per entry of [`ENTROPY_THRESHOLDS`].
    pub thresholds: [bool; 4],
}

impl EntropyProof {
    /// Computes the proof for `length` symbols over `alphabet_size`.
    pub fn compute(length: usize, alphabet_size: usize, guesses_per_second: f64) -> Self {
        let n = alphabet_size as f64;
        let l = length as f64;

        let bits_per_symbol = n.log2();
        let total_bits = l * bits_per_symbol;
        let log10_search_space = l * n.log10();

        let log10_years =
            log10_search_space - guesses_per_second.log10() - SECONDS_PER_YEAR.log10();

        Self {
            bits_per_symbol,
            total_bits,
            log10_search_space,
            brute_force_years: 10f64.powf(log10_years),
            thresholds: ENTROPY_THRESHOLDS.map(|t| total_bits >= t),
        }
    }
}

/// Birthday-paradox collision bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirthdayBound {
    /// Approximate chance that `samples` draws contain a repeat.
    pub collision_probability: f64,
    /// Draws needed for a 50% chance of any repeat.
    pub samples_for_50pct: f64,
}

impl BirthdayBound {
    /// `P ≈ 1 - exp(-k² / 2S)` and `k50 ≈ sqrt(2 ln 2) * sqrt(S)` with
    /// `S = alphabet_size ^ length`.
    pub fn compute(length: usize, alphabet_size: usize, samples: usize) -> Self {
        let ln_space = length as f64 * (alphabet_size as f64).ln();

        let collision_probability = if samples == 0 {
            0.0
        } else {
            let exponent = (2.0 * (samples as f64).ln() - std::f64::consts::LN_2 - ln_space).exp();
            (-(-exponent).exp_m1()).clamp(0.0, 1.0)
        };

        let samples_for_50pct =
            (0.5 * (ln_space + std::f64::consts::LN_2 + std::f64::consts::LN_2.ln())).exp();

        Self {
            collision_probability,
            samples_for_50pct,
        }
    }
}
