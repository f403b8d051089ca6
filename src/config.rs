//! File-based configuration.
//!
//! Audit parameters, generation defaults and optional compliance
//! framework overrides, loaded from TOML. Every section is optional.

use crate::audit::{AuditSettings, VerdictPolicy, DEFAULT_GUESSES_PER_SECOND, MAX_BATCH_SIZE};
use crate::compliance::{self, ComplianceFramework};
use crate::generator::{Alphabet, CharacterRequirements, MAX_MULTI_COUNT, MAX_SECRET_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Secret length outside the supported range.
    #[error("invalid secret length {0} (must be 1-{max})", max = MAX_SECRET_LEN)]
    InvalidLength(usize),
    /// Batch size outside the supported range.
    #[error("invalid batch size {0} (must be 1-{max})", max = MAX_BATCH_SIZE)]
    InvalidBatchSize(usize),
    /// Secret count outside the supported range.
    #[error("invalid secret count {0} (must be 1-{max})", max = MAX_MULTI_COUNT)]
    InvalidCount(usize),
    /// Guess rate is zero, negative or not finite.
    #[error("guess rate must be positive and finite")]
    InvalidGuessRate,
    /// Unknown preset or unusable custom alphabet.
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
    /// Class minimums cannot be met for the configured length and alphabet.
    #[error("generation requirements impossible: {0}")]
    ImpossibleRequirements(String),
    /// A framework override did not list exactly six frameworks.
    #[error("expected 6 compliance frameworks, found {0}")]
    FrameworkCount(usize),
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Failed to parse the config file.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Parameters of an audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Preset name (`printable`, `alphanumeric`, ...) or, when
    /// `custom_alphabet` is set, ignored.
    pub alphabet: String,
    /// Literal symbols, normalized to sorted unique printable ASCII.
    pub custom_alphabet: Option<String>,
    /// Secret length in symbols.
    pub length: usize,
    /// Secrets in the statistical batch.
    pub batch_size: usize,
    /// Attacker guess rate for the brute-force estimate.
    pub guesses_per_second: f64,
    /// Whether pattern issues fail the overall verdict.
    pub include_patterns: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            alphabet: "printable".to_string(),
            custom_alphabet: None,
            length: 32,
            batch_size: 500,
            guesses_per_second: DEFAULT_GUESSES_PER_SECOND,
            include_patterns: true,
        }
    }
}

impl AuditConfig {
    /// Resolves the configured alphabet.
    pub fn alphabet(&self) -> Result<Alphabet, ConfigError> {
        match &self.custom_alphabet {
            Some(custom) => {
                Alphabet::normalize(custom).map_err(|e| ConfigError::InvalidAlphabet(e.to_string()))
            }
            None => Alphabet::preset(&self.alphabet)
                .ok_or_else(|| ConfigError::InvalidAlphabet(format!("unknown preset `{}`", self.alphabet))),
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 || self.length > MAX_SECRET_LEN {
            return Err(ConfigError::InvalidLength(self.length));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if !(self.guesses_per_second.is_finite() && self.guesses_per_second > 0.0) {
            return Err(ConfigError::InvalidGuessRate);
        }
        self.alphabet()?;
        Ok(())
    }
}

/// Defaults for standalone secret generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Secrets to print per invocation.
    pub count: usize,
    /// Per-class minimums for issued secrets.
    pub requirements: CharacterRequirements,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            count: 1,
            requirements: CharacterRequirements::default(),
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Audit parameters.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Generation defaults.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Replaces the six preset frameworks when present.
    #[serde(default)]
    pub frameworks: Vec<ComplianceFramework>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audit.validate()?;
        let count = self.generation.count;
        if count == 0 || count > MAX_MULTI_COUNT {
            return Err(ConfigError::InvalidCount(count));
        }
        let alphabet = self.audit.alphabet()?;
        self.generation
            .requirements
            .check_possible(&alphabet, self.audit.length)
            .map_err(|e| ConfigError::ImpossibleRequirements(e.to_string()))?;
        if !self.frameworks.is_empty() && self.frameworks.len() != 6 {
            return Err(ConfigError::FrameworkCount(self.frameworks.len()));
        }
        Ok(())
    }

    /// Auditor settings derived from this configuration.
    pub fn audit_settings(&self) -> Result<AuditSettings, ConfigError> {
        let frameworks = if self.frameworks.is_empty() {
            compliance::presets()
        } else {
            <[ComplianceFramework; 6]>::try_from(self.frameworks.clone())
                .map_err(|v| ConfigError::FrameworkCount(v.len()))?
        };

        Ok(AuditSettings {
            policy: VerdictPolicy {
                include_patterns: self.audit.include_patterns,
            },
            guesses_per_second: self.audit.guesses_per_second,
            frameworks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.audit.alphabet().unwrap().len(), 94);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.audit.length, 32);
        assert_eq!(config.audit.batch_size, 500);
        assert!(config.audit.include_patterns);
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
            [audit]
            custom_alphabet = "zyxabc123"
            length = 20
            include_patterns = false

            [generation]
            count = 3
            requirements = { min_digits = 2 }
            "#,
        )
        .unwrap();

        assert_eq!(config.audit.alphabet().unwrap().as_bytes(), b"123abcxyz");
        assert_eq!(config.audit.batch_size, 500);
        assert_eq!(config.generation.requirements.min_digits, 2);
        assert!(!config.audit_settings().unwrap().policy.include_patterns);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            FileConfig::from_toml("[audit]\nlength = 0").unwrap_err(),
            ConfigError::InvalidLength(0)
        );
        assert_eq!(
            FileConfig::from_toml("[audit]\nbatch_size = 5000").unwrap_err(),
            ConfigError::InvalidBatchSize(5000)
        );
        assert!(matches!(
            FileConfig::from_toml("[audit]\nalphabet = \"runes\""),
            Err(ConfigError::InvalidAlphabet(_))
        ));
        assert!(matches!(
            FileConfig::from_toml("[audit\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_impossible_requirements_rejected() {
        let too_many = r#"
            [audit]
            length = 8

            [generation]
            requirements = { min_lowercase = 5, min_digits = 5 }
        "#;
        assert!(matches!(
            FileConfig::from_toml(too_many),
            Err(ConfigError::ImpossibleRequirements(_))
        ));

        let missing_class = r#"
            [audit]
            alphabet = "alphanumeric"

            [generation]
            requirements = { min_symbols = 5 }
        "#;
        assert!(matches!(
            FileConfig::from_toml(missing_class),
            Err(ConfigError::ImpossibleRequirements(_))
        ));

        let overflow = format!(
            "[generation]\nrequirements = {{ min_lowercase = {m}, min_uppercase = {m}, min_digits = {m} }}",
            m = i64::MAX
        );
        assert!(matches!(
            FileConfig::from_toml(&overflow),
            Err(ConfigError::ImpossibleRequirements(_))
        ));
    }

    #[test]
    fn test_framework_override_needs_six() {
        let text = r#"
            [[frameworks]]
            name = "only one"
            min_length = 8
            min_entropy_bits = 40.0
        "#;
        assert_eq!(
            FileConfig::from_toml(text).unwrap_err(),
            ConfigError::FrameworkCount(1)
        );
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FileConfig::from_file("/nonexistent/paranoid.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
