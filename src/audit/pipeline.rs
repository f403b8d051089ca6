//! The seven-stage audit.
//!
//! One call generates a reference secret and a batch, runs every test,
//! and overwrites an [`AuditResult`]. Stages advance strictly in order;
//! an observer may follow along.

use super::entropy::{BirthdayBound, EntropyProof, DEFAULT_GUESSES_PER_SECOND};
use super::patterns::PatternReport;
use super::result::{AuditResult, Stage};
use super::statistics::{self, SERIAL_LIMIT};
use crate::compliance::{self, ComplianceFramework};
use crate::digest::{self, HashProvider};
use crate::entropy::EntropySource;
use crate::error::{Error, Result};
use crate::generator::{self, Alphabet, ClassCounts, SecretGenerator};
use crate::sampling;
use serde::{Deserialize, Serialize};

/// Largest batch accepted for the statistical stages.
pub const MAX_BATCH_SIZE: usize = 2000;

/// Which findings count against the overall verdict.
///
/// Chi-squared, serial correlation and collision results always count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictPolicy {
    /// Fail the audit when the reference secret has pattern issues.
    pub include_patterns: bool,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            include_patterns: true,
        }
    }
}

impl VerdictPolicy {
    /// Policy that reports patterns without failing on them.
    pub fn statistics_only() -> Self {
        Self {
            include_patterns: false,
        }
    }

    /// Overall verdict for a filled record.
    pub fn verdict(&self, result: &AuditResult) -> bool {
        result.chi2_pass
            && result.serial_pass
            && result.collision_pass
            && (!self.include_patterns || result.pattern_issues == 0)
    }
}

/// Tunables for an [`Auditor`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSettings {
    /// Which findings fail the verdict.
    pub policy: VerdictPolicy,
    /// Guess rate for the brute-force estimate.
    pub guesses_per_second: f64,
    /// Frameworks behind the six compliance flags, in flag order.
    pub frameworks: [ComplianceFramework; 6],
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            policy: VerdictPolicy::default(),
            guesses_per_second: DEFAULT_GUESSES_PER_SECOND,
            frameworks: compliance::presets(),
        }
    }
}

/// Runs audits with a fixed entropy source and hash backend.
pub struct Auditor<S: EntropySource, H: HashProvider> {
    generator: SecretGenerator<S>,
    hasher: H,
    settings: AuditSettings,
}

impl<S: EntropySource, H: HashProvider> Auditor<S, H> {
    /// Creates an auditor with default settings.
    pub fn new(source: S, hasher: H) -> Self {
        Self::with_settings(source, hasher, AuditSettings::default())
    }

    /// Creates an auditor with explicit settings.
    pub fn with_settings(source: S, hasher: H, settings: AuditSettings) -> Self {
        Self {
            generator: SecretGenerator::new(source),
            hasher,
            settings,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    /// Settings, for adjustment between runs.
    pub fn settings_mut(&mut self) -> &mut AuditSettings {
        &mut self.settings
    }

    /// The generator, for plain secret generation outside an audit.
    pub fn generator_mut(&mut self) -> &mut SecretGenerator<S> {
        &mut self.generator
    }

    /// The hash backend.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Runs a full audit into `result`.
    pub fn run(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        batch_size: usize,
        result: &mut AuditResult,
    ) -> Result<()> {
        self.run_with_observer(alphabet, length, batch_size, result, |_, _| {})
    }

    /// Runs a full audit, calling `observer` as each stage starts and once
    /// more at [`Stage::Done`].
    ///
    /// Arguments are checked before `result` is touched. After that the
    /// record is reset; on error it holds a partial run whose stage is
    /// below [`Stage::Done`].
    pub fn run_with_observer<F>(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        batch_size: usize,
        result: &mut AuditResult,
        mut observer: F,
    ) -> Result<()>
    where
        F: FnMut(Stage, &AuditResult),
    {
        generator::check_length(length)?;
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(Error::invalid(format!(
                "batch size {batch_size} outside 1..={MAX_BATCH_SIZE}"
            )));
        }

        let n = alphabet.len();
        result.reset();
        result.length = length as u32;
        result.alphabet_size = n as u32;
        result.batch_size = batch_size as u32;
        result.degrees_of_freedom = (n - 1) as u32;
        result.rejection_boundary = sampling::max_valid(n) as u32;
        result.rejection_rate_pct = sampling::rejection_probability(n) * 100.0;

        // Stage 1: reference secret and its digest.
        advance(Stage::Generate, result, &mut observer);
        let reference = self.generator.generate_indices(alphabet, length)?;
        let secret = generator::render(alphabet, &reference);
        result.set_secret(secret.as_bytes());
        result.set_digest_hex(&digest::to_hex(&self.hasher.digest(secret.as_bytes())));
        result.generation_count = 1;

        // Stage 2: batch frequencies.
        advance(Stage::ChiSquared, result, &mut observer);
        let mut batch = Vec::with_capacity(batch_size * length);
        for _ in 0..batch_size {
            batch.extend(self.generator.generate_indices(alphabet, length)?);
            result.generation_count += 1;
        }
        let chi = statistics::chi_squared(&statistics::frequencies(&batch, n));
        result.chi2_statistic = chi.statistic;
        result.chi2_p_value = chi.p_value;
        result.chi2_pass = chi.passes();

        // Stage 3: lag-1 correlation across the batch's index stream.
        advance(Stage::SerialCorrelation, result, &mut observer);
        result.serial_correlation = statistics::serial_correlation(&batch);
        result.serial_pass = result.serial_correlation.abs() < SERIAL_LIMIT;

        // Stage 4: content-addressed duplicate check.
        advance(Stage::Collisions, result, &mut observer);
        let rendered = batch.chunks(length).map(|s| generator::render(alphabet, s));
        result.duplicates = statistics::count_duplicates(&self.hasher, rendered) as u32;
        result.collision_pass = result.duplicates == 0;

        // Stage 5
        advance(Stage::Entropy, result, &mut observer);
        let proof = EntropyProof::compute(length, n, self.settings.guesses_per_second);
        result.bits_per_symbol = proof.bits_per_symbol;
        result.total_entropy = proof.total_bits;
        result.log10_search_space = proof.log10_search_space;
        result.brute_force_years = proof.brute_force_years;
        [
            result.meets_memorized,
            result.meets_high_value,
            result.meets_crypto_equivalent,
            result.meets_post_quantum,
        ] = proof.thresholds;

        // Stage 6
        advance(Stage::Birthday, result, &mut observer);
        let bound = BirthdayBound::compute(length, n, batch_size);
        result.collision_probability = bound.collision_probability;
        result.samples_for_50pct = bound.samples_for_50pct;

        // Stage 7
        advance(Stage::Patterns, result, &mut observer);
        let patterns = PatternReport::scan(secret.as_bytes());
        result.pattern_issues = patterns.total() as u32;

        // Terminal: composition, compliance, verdict.
        result.set_class_counts(&ClassCounts::of(secret.as_bytes()));
        let flags = compliance::check_all(result, &self.settings.frameworks);
        result.set_compliance_flags(flags);
        result.all_pass = self.settings.policy.verdict(result);
        advance(Stage::Done, result, &mut observer);

        if result.all_pass {
            tracing::info!(
                length,
                alphabet = n,
                batch_size,
                entropy_bits = result.total_entropy,
                "audit passed"
            );
        } else {
            tracing::warn!(
                chi2_p = result.chi2_p_value,
                serial = result.serial_correlation,
                duplicates = result.duplicates,
                patterns = result.pattern_issues,
                "audit failed"
            );
        }

        Ok(())
    }
}

fn advance<F>(stage: Stage, result: &mut AuditResult, observer: &mut F)
where
    F: FnMut(Stage, &AuditResult),
{
    debug_assert!(stage.ordinal() > result.current_stage);
    result.current_stage = stage.ordinal();
    tracing::debug!(stage = ?stage, "audit stage");
    observer(stage, result);
}

impl<S: EntropySource, H: HashProvider> std::fmt::Debug for Auditor<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("generator", &self.generator)
            .field("hasher", &self.hasher.name())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{CompactSha256, LibrarySha256};
    use crate::entropy::{EntropyError, HostEntropy, OsEntropy};

    fn os_auditor() -> Auditor<OsEntropy, LibrarySha256> {
        Auditor::new(OsEntropy::new(), LibrarySha256)
    }

    #[test]
    fn test_full_audit_reaches_done() {
        let mut auditor = os_auditor();
        let mut result = AuditResult::new();

        auditor
            .run(&Alphabet::printable(), 32, 200, &mut result)
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.secret_str().len(), 32);
        assert_eq!(result.digest_hex_str().len(), 64);
        assert_eq!(result.alphabet_size, 94);
        assert_eq!(result.degrees_of_freedom, 93);
        assert_eq!(result.rejection_boundary, 187);
        assert!((result.rejection_rate_pct - 26.5625).abs() < 1e-9);
        assert_eq!(result.generation_count, 201);
        assert!((result.total_entropy - 209.75).abs() < 0.01);
        assert!(result.collision_pass);
    }

    #[test]
    fn test_digest_matches_secret() {
        let mut auditor = Auditor::new(OsEntropy::new(), CompactSha256);
        let mut result = AuditResult::new();
        auditor.run(&Alphabet::hex(), 16, 10, &mut result).unwrap();

        let expected = digest::to_hex(&LibrarySha256.digest(result.secret_str().as_bytes()));
        assert_eq!(result.digest_hex_str(), expected);
    }

    #[test]
    fn test_stages_advance_once_each_in_order() {
        let mut auditor = os_auditor();
        let mut result = AuditResult::new();
        let mut seen = Vec::new();

        auditor
            .run_with_observer(&Alphabet::alphanumeric(), 20, 50, &mut result, |stage, _| {
                seen.push(stage.ordinal())
            })
            .unwrap();

        assert_eq!(seen, (1..=8).collect::<Vec<u32>>());
    }

    #[test]
    fn test_verdict_is_and_of_flags() {
        let mut auditor = os_auditor();
        let mut result = AuditResult::new();
        auditor.run(&Alphabet::alphanumeric(), 24, 100, &mut result).unwrap();

        let expected = result.chi2_pass
            && result.serial_pass
            && result.collision_pass
            && result.pattern_issues == 0;
        assert_eq!(result.all_pass, expected);
    }

    #[test]
    fn test_published_secret_matches_length() {
        assert!(Alphabet::new(b"\0a").is_err());

        let mut auditor = os_auditor();
        let mut result = AuditResult::new();
        auditor
            .run(&Alphabet::new(" a").unwrap(), 16, 10, &mut result)
            .unwrap();

        assert_eq!(result.secret_str().len(), result.length as usize);
        assert_eq!(
            result.digest_hex_str(),
            digest::to_hex(&auditor.hasher().digest(result.secret_str().as_bytes()))
        );
    }

    #[test]
    fn test_tiny_alphabet_collides_and_fails() {
        // 2^3 = 8 possible secrets, 100 draws: duplicates are certain.
        let mut auditor = os_auditor();
        auditor.settings_mut().policy = VerdictPolicy::statistics_only();
        let mut result = AuditResult::new();
        auditor
            .run(&Alphabet::new("01").unwrap(), 3, 100, &mut result)
            .unwrap();

        assert!(result.duplicates >= 92);
        assert!(!result.collision_pass);
        assert!(!result.all_pass);
        assert!((result.collision_probability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_batch_leaves_record_untouched() {
        let mut auditor = os_auditor();
        let mut result = AuditResult::new();
        result.length = 99;

        let err = auditor.run(&Alphabet::hex(), 16, 0, &mut result).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(result.length, 99);

        assert!(auditor
            .run(&Alphabet::hex(), 16, MAX_BATCH_SIZE + 1, &mut result)
            .is_err());
        assert!(auditor.run(&Alphabet::hex(), 0, 10, &mut result).is_err());
    }

    #[test]
    fn test_entropy_failure_mid_run_is_incomplete() {
        let mut calls = 0;
        let source = HostEntropy::new(move |buf: &mut [u8]| {
            calls += 1;
            if calls > 3 {
                return 8;
            }
            buf.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
            0
        });
        let mut auditor = Auditor::new(source, LibrarySha256);
        let mut result = AuditResult::new();

        let err = auditor
            .run(&Alphabet::hex(), 8, 100, &mut result)
            .unwrap_err();

        assert_eq!(err, Error::EntropyUnavailable(EntropyError::HostStatus(8)));
        assert!(!result.is_complete());
        assert_eq!(result.stage(), Some(Stage::ChiSquared));
    }

    #[test]
    fn test_sequential_runs_overwrite_alphabet_fields() {
        let mut auditor = os_auditor();
        let mut result = AuditResult::new();

        auditor.run(&Alphabet::printable(), 32, 50, &mut result).unwrap();
        assert_eq!(result.degrees_of_freedom, 93);

        auditor.run(&Alphabet::new("0123456789").unwrap(), 12, 50, &mut result).unwrap();
        assert_eq!(result.alphabet_size, 10);
        assert_eq!(result.degrees_of_freedom, 9);
        assert_eq!(result.rejection_boundary, 249);
        assert_eq!(result.length, 12);
        assert_eq!(result.secret_str().len(), 12);
        assert!(result.secret_str().bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(result.count_lowercase + result.count_uppercase + result.count_symbols, 0);
        assert!((result.total_entropy - 12.0 * 10f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_policy_controls_verdict() {
        let mut result = AuditResult::new();
        result.chi2_pass = true;
        result.serial_pass = true;
        result.collision_pass = true;
        result.pattern_issues = 2;

        assert!(!VerdictPolicy::default().verdict(&result));
        assert!(VerdictPolicy::statistics_only().verdict(&result));
    }
}
