//! Statistical tests over generated symbol sequences.
//!
//! These are sanity checks: passing them is consistent with uniform,
//! independent draws but proves nothing about the entropy source.

use crate::digest::{Digest, HashProvider};
use std::collections::HashSet;

/// Chi-squared tests pass when the p-value exceeds this.
pub const CHI2_ALPHA: f64 = 0.01;

/// Serial correlation passes when its magnitude is below this.
pub const SERIAL_LIMIT: f64 = 0.05;

/// Result of a chi-squared goodness-of-fit test against uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquared {
    /// Sum of `(observed - expected)^2 / expected`.
    pub statistic: f64,
    /// Always `categories - 1`.
    pub degrees_of_freedom: usize,
    /// Upper-tail probability of the statistic.
    pub p_value: f64,
}

impl ChiSquared {
    /// True if the sample is consistent with uniform at the 1% level.
    pub fn passes(&self) -> bool {
        self.p_value > CHI2_ALPHA
    }
}

/// Counts how often each index in `0..n` occurs.
pub fn frequencies(indices: &[usize], n: usize) -> Vec<u64> {
    let mut counts = vec![0u64; n];
    for &i in indices {
        counts[i] += 1;
    }
    counts
}

/// Chi-squared statistic of observed counts against a uniform expectation.
pub fn chi_squared(counts: &[u64]) -> ChiSquared {
    let categories = counts.len();
    let degrees_of_freedom = categories.saturating_sub(1);
    let total: u64 = counts.iter().sum();

    if total == 0 || degrees_of_freedom == 0 {
        return ChiSquared {
            statistic: 0.0,
            degrees_of_freedom,
            p_value: 1.0,
        };
    }

    let expected = total as f64 / categories as f64;
    let statistic = counts
        .iter()
        .map(|&o| {
            let diff = o as f64 - expected;
            diff * diff / expected
        })
        .sum();

    ChiSquared {
        statistic,
        degrees_of_freedom,
        p_value: p_value(statistic, degrees_of_freedom),
    }
}

/// Upper-tail p-value by the Wilson-Hilferty cube-root approximation.
///
/// `(X/k)^(1/3)` is approximately normal with mean `1 - 2/(9k)` and
/// variance `2/(9k)`.
pub fn p_value(statistic: f64, degrees_of_freedom: usize) -> f64 {
    if degrees_of_freedom == 0 {
        return 1.0;
    }
    let k = degrees_of_freedom as f64;
    let variance = 2.0 / (9.0 * k);
    let z = ((statistic / k).cbrt() - (1.0 - variance)) / variance.sqrt();
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Complementary error function, Abramowitz & Stegun 7.1.26.
fn erfc(x: f64) -> f64 {
    let ax = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * ax);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let r = poly * (-ax * ax).exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Lag-1 serial correlation coefficient.
///
/// Zero for fewer than two values or zero variance.
pub fn serial_correlation(values: &[usize]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;

    let variance: f64 = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
    if variance == 0.0 {
        return 0.0;
    }

    let covariance: f64 = values
        .windows(2)
        .map(|w| (w[0] as f64 - mean) * (w[1] as f64 - mean))
        .sum();

    covariance / variance
}

/// Counts secrets whose digest already appeared earlier in the batch.
///
/// A value seen three times contributes two duplicates.
pub fn count_duplicates<H, I, T>(hasher: &H, secrets: I) -> usize
where
    H: HashProvider + ?Sized,
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut seen: HashSet<Digest> = HashSet::new();
    secrets
        .into_iter()
        .filter(|s| !seen.insert(hasher.digest(s.as_ref())))
        .count()
}
