//! The audit record.
//!
//! A single fixed-layout `#[repr(C)]` struct holding everything one
//! audit run produces. Readers on the far side of a boundary locate
//! fields through [`crate::abi`] rather than assuming offsets.

use crate::digest::DIGEST_HEX_LEN;
use crate::generator::{ClassCounts, MAX_SECRET_LEN};

/// Bytes reserved for the NUL-terminated secret.
pub const SECRET_CAPACITY: usize = MAX_SECRET_LEN + 1;

/// Bytes reserved for the NUL-terminated hex digest.
pub const DIGEST_HEX_CAPACITY: usize = DIGEST_HEX_LEN + 1;

/// Audit progress. The record stores it as a `u32` ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum Stage {
    /// Record zeroed, no run yet.
    Idle = 0,
    /// Reference secret and digest.
    Generate = 1,
    /// Batch frequency test.
    ChiSquared = 2,
    /// Lag-1 correlation.
    SerialCorrelation = 3,
    /// Duplicate detection.
    Collisions = 4,
    /// Entropy figures and rejection rate.
    Entropy = 5,
    /// Birthday collision bound.
    Birthday = 6,
    /// Weak-pattern scan.
    Patterns = 7,
    /// All figures and the verdict are final.
    Done = 8,
}

impl Stage {
    /// Stage for a stored ordinal.
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        let stage = match ordinal {
            0 => Stage::Idle,
            1 => Stage::Generate,
            2 => Stage::ChiSquared,
            3 => Stage::SerialCorrelation,
            4 => Stage::Collisions,
            5 => Stage::Entropy,
            6 => Stage::Birthday,
            7 => Stage::Patterns,
            8 => Stage::Done,
            _ => return None,
        };
        Some(stage)
    }

    /// Ordinal stored in the record.
    #[inline]
    pub fn ordinal(self) -> u32 {
        self as u32
    }
}

/// Everything one audit run produces.
///
/// Overwritten wholesale at the start of every run. Unless
/// [`AuditResult::is_complete`] holds, the contents belong to a run
/// that failed part way and must not be trusted.
#[repr(C)]
#[derive(Clone, PartialEq)]
pub struct AuditResult {
    /// Reference secret, NUL-terminated.
    pub secret: [u8; SECRET_CAPACITY],
    /// Lowercase hex SHA-256 of the secret, NUL-terminated.
    pub digest_hex: [u8; DIGEST_HEX_CAPACITY],
    /// Requested secret length.
    pub length: u32,
    /// Symbols in the alphabet.
    pub alphabet_size: u32,

    /// Chi-squared statistic over the batch.
    pub chi2_statistic: f64,
    /// `alphabet_size - 1`.
    pub degrees_of_freedom: u32,
    /// Wilson-Hilferty p-value.
    pub chi2_p_value: f64,
    /// p-value above 0.01.
    pub chi2_pass: bool,

    /// Lag-1 correlation of the batch index stream.
    pub serial_correlation: f64,
    /// Magnitude below 0.05.
    pub serial_pass: bool,

    /// Secrets in the statistical batch.
    pub batch_size: u32,
    /// Repeated secrets in the batch.
    pub duplicates: u32,
    /// No duplicates.
    pub collision_pass: bool,

    /// log2 of the alphabet size.
    pub bits_per_symbol: f64,
    /// Entropy of one secret in bits.
    pub total_entropy: f64,
    /// log10 of the search space.
    pub log10_search_space: f64,
    /// Years to exhaust the search space at the configured guess rate.
    pub brute_force_years: f64,

    /// At least 30 bits.
    pub meets_memorized: bool,
    /// At least 80 bits.
    pub meets_high_value: bool,
    /// At least 128 bits.
    pub meets_crypto_equivalent: bool,
    /// At least 256 bits.
    pub meets_post_quantum: bool,

    /// Birthday collision probability for the batch.
    pub collision_probability: f64,
    /// Secrets needed for a 50% collision chance.
    pub samples_for_50pct: f64,

    /// Largest raw byte accepted by the sampler.
    pub rejection_boundary: u32,
    /// Percentage of raw bytes rejected.
    pub rejection_rate_pct: f64,

    /// Weak-pattern findings in the reference secret.
    pub pattern_issues: u32,

    /// Overall verdict under the auditor's policy.
    pub all_pass: bool,
    /// [`Stage`] ordinal, 0 to 8.
    pub current_stage: u32,

    /// Secrets drawn during the run, reference plus batch.
    pub generation_count: u32,

    /// First configured framework (NIST SP 800-63B by default).
    pub compliance_nist: bool,
    /// Second framework (PCI DSS).
    pub compliance_pci_dss: bool,
    /// Third framework (HIPAA).
    pub compliance_hipaa: bool,
    /// Fourth framework (SOC 2).
    pub compliance_soc2: bool,
    /// Fifth framework (GDPR).
    pub compliance_gdpr: bool,
    /// Sixth framework (ISO 27001).
    pub compliance_iso27001: bool,

    /// Lowercase letters in the reference secret.
    pub count_lowercase: u32,
    /// Uppercase letters in the reference secret.
    pub count_uppercase: u32,
    /// Digits in the reference secret.
    pub count_digits: u32,
    /// Other symbols in the reference secret.
    pub count_symbols: u32,
}

impl AuditResult {
    /// A zeroed record at [`Stage::Idle`].
    pub fn new() -> Self {
        Self {
            secret: [0; SECRET_CAPACITY],
            digest_hex: [0; DIGEST_HEX_CAPACITY],
            length: 0,
            alphabet_size: 0,
            chi2_statistic: 0.0,
            degrees_of_freedom: 0,
            chi2_p_value: 0.0,
            chi2_pass: false,
            serial_correlation: 0.0,
            serial_pass: false,
            batch_size: 0,
            duplicates: 0,
            collision_pass: false,
            bits_per_symbol: 0.0,
            total_entropy: 0.0,
            log10_search_space: 0.0,
            brute_force_years: 0.0,
            meets_memorized: false,
            meets_high_value: false,
            meets_crypto_equivalent: false,
            meets_post_quantum: false,
            collision_probability: 0.0,
            samples_for_50pct: 0.0,
            rejection_boundary: 0,
            rejection_rate_pct: 0.0,
            pattern_issues: 0,
            all_pass: false,
            current_stage: 0,
            generation_count: 0,
            compliance_nist: false,
            compliance_pci_dss: false,
            compliance_hipaa: false,
            compliance_soc2: false,
            compliance_gdpr: false,
            compliance_iso27001: false,
            count_lowercase: 0,
            count_uppercase: 0,
            count_digits: 0,
            count_symbols: 0,
        }
    }

    /// Clears every field back to the zeroed state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The reference secret.
    pub fn secret_str(&self) -> &str {
        nul_terminated(&self.secret)
    }

    /// The reference secret's hex digest.
    pub fn digest_hex_str(&self) -> &str {
        nul_terminated(&self.digest_hex)
    }

    /// Current stage, if the stored ordinal is valid.
    pub fn stage(&self) -> Option<Stage> {
        Stage::from_ordinal(self.current_stage)
    }

    /// True once a run has reached [`Stage::Done`].
    pub fn is_complete(&self) -> bool {
        self.stage() == Some(Stage::Done)
    }

    /// Character-class counts of the reference secret.
    pub fn class_counts(&self) -> ClassCounts {
        ClassCounts {
            lowercase: self.count_lowercase as usize,
            uppercase: self.count_uppercase as usize,
            digits: self.count_digits as usize,
            symbols: self.count_symbols as usize,
        }
    }

    /// Compliance flags in preset order: NIST, PCI DSS, HIPAA, SOC 2,
    /// GDPR, ISO 27001.
    pub fn compliance_flags(&self) -> [bool; 6] {
        [
            self.compliance_nist,
            self.compliance_pci_dss,
            self.compliance_hipaa,
            self.compliance_soc2,
            self.compliance_gdpr,
            self.compliance_iso27001,
        ]
    }

    pub(crate) fn set_secret(&mut self, secret: &[u8]) {
        write_nul_terminated(&mut self.secret, secret);
    }

    pub(crate) fn set_digest_hex(&mut self, hex: &str) {
        write_nul_terminated(&mut self.digest_hex, hex.as_bytes());
    }

    pub(crate) fn set_class_counts(&mut self, counts: &ClassCounts) {
        self.count_lowercase = counts.lowercase as u32;
        self.count_uppercase = counts.uppercase as u32;
        self.count_digits = counts.digits as u32;
        self.count_symbols = counts.symbols as u32;
    }

    pub(crate) fn set_compliance_flags(&mut self, flags: [bool; 6]) {
        [
            self.compliance_nist,
            self.compliance_pci_dss,
            self.compliance_hipaa,
            self.compliance_soc2,
            self.compliance_gdpr,
            self.compliance_iso27001,
        ] = flags;
    }
}

impl Default for AuditResult {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuditResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret itself is never printed.
        f.debug_struct("AuditResult")
            .field("length", &self.length)
            .field("alphabet_size", &self.alphabet_size)
            .field("stage", &self.stage())
            .field("chi2_p_value", &self.chi2_p_value)
            .field("serial_correlation", &self.serial_correlation)
            .field("duplicates", &self.duplicates)
            .field("total_entropy", &self.total_entropy)
            .field("pattern_issues", &self.pattern_issues)
            .field("all_pass", &self.all_pass)
            .finish_non_exhaustive()
    }
}

fn nul_terminated(buf: &[u8]) -> &str {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..end]).unwrap_or("")
}

fn write_nul_terminated(buf: &mut [u8], value: &[u8]) {
    let len = value.len().min(buf.len() - 1);
    buf.fill(0);
    buf[..len].copy_from_slice(&value[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_idle_and_empty() {
        let result = AuditResult::new();
        assert_eq!(result.stage(), Some(Stage::Idle));
        assert_eq!(result.secret_str(), "");
        assert!(!result.is_complete());
        assert!(!result.all_pass);
    }

    #[test]
    fn test_secret_round_trips_through_buffer() {
        let mut result = AuditResult::new();
        result.set_secret(b"correct-horse");
        assert_eq!(result.secret_str(), "correct-horse");

        // A shorter secret leaves no tail from the previous one.
        result.set_secret(b"abc");
        assert_eq!(result.secret_str(), "abc");
        assert_eq!(result.secret[3], 0);
    }

    #[test]
    fn test_max_length_secret_keeps_terminator() {
        let mut result = AuditResult::new();
        result.set_secret(&[b'x'; MAX_SECRET_LEN]);
        assert_eq!(result.secret_str().len(), MAX_SECRET_LEN);
        assert_eq!(result.secret[MAX_SECRET_LEN], 0);
    }

    #[test]
    fn test_stage_ordinals() {
        for ordinal in 0..=8 {
            assert_eq!(Stage::from_ordinal(ordinal).unwrap().ordinal(), ordinal);
        }
        assert!(Stage::from_ordinal(9).is_none());
    }

    #[test]
    fn test_compliance_flags_order() {
        let mut result = AuditResult::new();
        result.set_compliance_flags([true, false, true, false, false, true]);
        assert!(result.compliance_nist);
        assert!(result.compliance_hipaa);
        assert!(result.compliance_iso27001);
        assert_eq!(result.compliance_flags(), [true, false, true, false, false, true]);
    }
}
