//! Owned engine tying a source, a hash backend and one audit record.
//!
//! ```no_run
//! use paranoid_secrets::{Alphabet, Engine};
//!
//! let mut engine = Engine::os();
//! let result = engine.run_audit(&Alphabet::printable(), 32, 500)?;
//! println!("{} pass={}", result.secret_str(), result.all_pass);
//! # Ok::<(), paranoid_secrets::Error>(())
//! ```

use crate::audit::{AuditResult, AuditSettings, Auditor, Stage};
use crate::digest::{HashProvider, LibrarySha256};
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{Error, Result};
use crate::generator::{self, Alphabet, CharacterRequirements, ClassCounts, MAX_MULTI_COUNT};
use tracing::{info, warn};

/// Audit engine. Each engine owns exactly one [`AuditResult`]; run
/// audits concurrently by building one engine per thread.
pub struct Engine<S: EntropySource, H: HashProvider> {
    auditor: Auditor<S, H>,
    // Boxed so the record address is stable while the engine moves.
    result: Box<AuditResult>,
    runs: u64,
}

impl Engine<OsEntropy, LibrarySha256> {
    /// Engine backed by the OS CSPRNG and the `sha2` digest.
    pub fn os() -> Self {
        Self::new(OsEntropy::new(), LibrarySha256)
    }
}

impl<S: EntropySource, H: HashProvider> Engine<S, H> {
    /// Engine with default audit settings.
    pub fn new(source: S, hasher: H) -> Self {
        Self::with_settings(source, hasher, AuditSettings::default())
    }

    /// Engine with explicit audit settings.
    pub fn with_settings(source: S, hasher: H, settings: AuditSettings) -> Self {
        Self {
            auditor: Auditor::with_settings(source, hasher, settings),
            result: Box::new(AuditResult::new()),
            runs: 0,
        }
    }

    /// Runs an audit, overwriting the engine's record.
    pub fn run_audit(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        batch_size: usize,
    ) -> Result<&AuditResult> {
        self.run_audit_with_observer(alphabet, length, batch_size, |_, _| {})
    }

    /// Like [`Engine::run_audit`], reporting each stage to `observer`.
    pub fn run_audit_with_observer<F>(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        batch_size: usize,
        observer: F,
    ) -> Result<&AuditResult>
    where
        F: FnMut(Stage, &AuditResult),
    {
        self.runs += 1;
        match self
            .auditor
            .run_with_observer(alphabet, length, batch_size, &mut self.result, observer)
        {
            Ok(()) => {
                info!(run = self.runs, all_pass = self.result.all_pass, "engine audit finished");
                Ok(&self.result)
            }
            Err(e) => {
                warn!(run = self.runs, stage = self.result.current_stage, error = %e, "engine audit aborted");
                Err(e)
            }
        }
    }

    /// The record of the most recent run. Zeroed before the first run.
    pub fn result(&self) -> &AuditResult {
        &self.result
    }

    /// Audits started by this engine, including aborted ones.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Current audit settings.
    pub fn settings(&self) -> &AuditSettings {
        self.auditor.settings()
    }

    /// Audit settings, for adjustment between runs.
    pub fn settings_mut(&mut self) -> &mut AuditSettings {
        self.auditor.settings_mut()
    }

    /// Generates one secret without touching the record.
    pub fn generate(&mut self, alphabet: &Alphabet, length: usize) -> Result<String> {
        self.auditor.generator_mut().generate(alphabet, length)
    }

    /// Generates `count` independent secrets.
    pub fn generate_multiple(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        count: usize,
    ) -> Result<Vec<String>> {
        self.auditor
            .generator_mut()
            .generate_multiple(alphabet, length, count)
    }

    /// Generates a secret meeting per-class minimums.
    pub fn generate_constrained(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        requirements: &CharacterRequirements,
    ) -> Result<String> {
        self.auditor
            .generator_mut()
            .generate_constrained(alphabet, length, requirements)
    }

    /// Secrets to hand out after an audit.
    ///
    /// The audited reference secret comes first when the last run
    /// completed over `alphabet` and `length` and it meets
    /// `requirements`. The rest are fresh draws, constrained whenever a
    /// minimum is set.
    pub fn issue_secrets(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        count: usize,
        requirements: &CharacterRequirements,
    ) -> Result<Vec<String>> {
        if count == 0 || count > MAX_MULTI_COUNT {
            return Err(Error::invalid(format!(
                "count {count} outside 1..={MAX_MULTI_COUNT}"
            )));
        }
        generator::check_length(length)?;
        requirements.check_possible(alphabet, length)?;

        let mut secrets = Vec::with_capacity(count);
        let reference = self.result.secret_str();
        let reusable = self.result.is_complete()
            && self.result.alphabet_size as usize == alphabet.len()
            && reference.len() == length
            && reference.bytes().all(|b| alphabet.index_of(b).is_some())
            && requirements.satisfied_by(&ClassCounts::of(reference.as_bytes()));
        if reusable {
            secrets.push(reference.to_string());
        }

        while secrets.len() < count {
            let secret = if requirements.is_empty() {
                self.generate(alphabet, length)?
            } else {
                self.generate_constrained(alphabet, length, requirements)?
            };
            secrets.push(secret);
        }
        Ok(secrets)
    }

    /// Digest of `input` with the engine's hash backend.
    pub fn hash(&self, input: &[u8]) -> crate::digest::Digest {
        self.auditor.hasher().digest(input)
    }
}

impl<S: EntropySource, H: HashProvider> std::fmt::Debug for Engine<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("hasher", &self.auditor.hasher().name())
            .field("runs", &self.runs)
            .field("stage", &self.result.current_stage)
            .finish_non_exhaustive()
    }
}
