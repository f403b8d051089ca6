//! Weak-pattern scan of a single secret.
//!
//! Counts are additive: every matching window is one issue, so a run of
//! six identical symbols reports three overlapping runs of four.

/// Shortest run or sequence that counts as an issue.
pub const MIN_PATTERN_LEN: usize = 4;

/// Substrings flagged wherever they appear, compared case-insensitively.
pub const WEAK_SUBSTRINGS: &[&str] = &[
    "qwert", "asdfg", "zxcvb", "12345", "qazws", "!@#$%", "passw", "admin", "letmein",
];

/// Issues found in one secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternReport {
    /// Windows of identical symbols.
    pub repeated_runs: usize,
    /// Windows whose byte values step by a constant nonzero amount.
    pub arithmetic_runs: usize,
    /// Occurrences of [`WEAK_SUBSTRINGS`].
    pub weak_substrings: usize,
}

impl PatternReport {
    /// Scans `secret` for all pattern kinds.
    pub fn scan(secret: &[u8]) -> Self {
        let mut report = Self::default();

        for w in secret.windows(MIN_PATTERN_LEN) {
            if w.iter().all(|&b| b == w[0]) {
                report.repeated_runs += 1;
                continue;
            }
            let step = w[1] as i16 - w[0] as i16;
            if w.windows(2).all(|p| p[1] as i16 - p[0] as i16 == step) {
                report.arithmetic_runs += 1;
            }
        }

        for weak in WEAK_SUBSTRINGS {
            let weak = weak.as_bytes();
            report.weak_substrings += secret
                .windows(weak.len())
                .filter(|w| w.eq_ignore_ascii_case(weak))
                .count();
        }

        report
    }

    /// Total issue count.
    pub fn total(&self) -> usize {
        self.repeated_runs + self.arithmetic_runs + self.weak_substrings
    }
}
