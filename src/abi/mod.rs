//! Layout contract for readers of [`AuditResult`] across a boundary.
//!
//! A reader built separately (another language, another target) must
//! not assume where fields live. Offsets here come from the compiled
//! layout via `core::mem::offset_of!`, and [`LayoutSchema`] bundles
//! them with a version and the record size so the reader can compare
//! once and refuse the record on any difference.

use crate::audit::AuditResult;
use serde::{Deserialize, Serialize};
use std::mem::{align_of, offset_of, size_of};
use thiserror::Error;

/// Bumped whenever a field is added, removed, reordered or retyped.
pub const SCHEMA_VERSION: u32 = 1;

/// Layout check failures. Any of these means the record must not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutMismatch {
    /// Schema versions differ.
    #[error("layout schema version {actual}, reader expects {expected}")]
    Version {
        /// Version the reader was built against.
        expected: u32,
        /// Version of this build.
        actual: u32,
    },

    /// Record sizes differ.
    #[error("record size {actual} bytes, reader expects {expected}")]
    Size {
        /// Size the reader expects.
        expected: usize,
        /// Size of this build.
        actual: usize,
    },

    /// Record alignments differ.
    #[error("record alignment {actual}, reader expects {expected}")]
    Align {
        /// Alignment the reader expects.
        expected: usize,
        /// Alignment of this build.
        actual: usize,
    },

    /// A field moved.
    #[error("field `{field}` at offset {actual}, reader expects {expected}")]
    Offset {
        /// Field name.
        field: String,
        /// Offset the reader expects.
        expected: usize,
        /// Offset in this build.
        actual: usize,
    },

    /// The reader names a field this build does not have.
    #[error("reader expects unknown field `{0}`")]
    UnknownField(String),
}

macro_rules! fields {
    ($($variant:ident => $field:ident),+ $(,)?) => {
        /// Every externally readable field of [`AuditResult`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Field {
            $(
                #[doc = concat!("`AuditResult::", stringify!($field), "`.")]
                $variant,
            )+
        }

        impl Field {
            /// All fields in declaration order.
            pub const ALL: &'static [Field] = &[$(Field::$variant,)+];

            /// Field name as it appears in the record.
            pub fn name(self) -> &'static str {
                match self {
                    $(Field::$variant => stringify!($field),)+
                }
            }

            /// Looks up a field by record name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($field) => Some(Field::$variant),)+
                    _ => None,
                }
            }

            /// Byte offset of this field in the live record layout.
            pub fn offset(self) -> usize {
                match self {
                    $(Field::$variant => offset_of!(AuditResult, $field),)+
                }
            }
        }
    };
}

fields! {
    Secret => secret,
    DigestHex => digest_hex,
    Length => length,
    AlphabetSize => alphabet_size,
    Chi2Statistic => chi2_statistic,
    DegreesOfFreedom => degrees_of_freedom,
    Chi2PValue => chi2_p_value,
    Chi2Pass => chi2_pass,
    SerialCorrelation => serial_correlation,
    SerialPass => serial_pass,
    BatchSize => batch_size,
    Duplicates => duplicates,
    CollisionPass => collision_pass,
    BitsPerSymbol => bits_per_symbol,
    TotalEntropy => total_entropy,
    Log10SearchSpace => log10_search_space,
    BruteForceYears => brute_force_years,
    MeetsMemorized => meets_memorized,
    MeetsHighValue => meets_high_value,
    MeetsCryptoEquivalent => meets_crypto_equivalent,
    MeetsPostQuantum => meets_post_quantum,
    CollisionProbability => collision_probability,
    SamplesFor50Pct => samples_for_50pct,
    RejectionBoundary => rejection_boundary,
    RejectionRatePct => rejection_rate_pct,
    PatternIssues => pattern_issues,
    AllPass => all_pass,
    CurrentStage => current_stage,
    GenerationCount => generation_count,
    ComplianceNist => compliance_nist,
    CompliancePciDss => compliance_pci_dss,
    ComplianceHipaa => compliance_hipaa,
    ComplianceSoc2 => compliance_soc2,
    ComplianceGdpr => compliance_gdpr,
    ComplianceIso27001 => compliance_iso27001,
    CountLowercase => count_lowercase,
    CountUppercase => count_uppercase,
    CountDigits => count_digits,
    CountSymbols => count_symbols,
}

/// Byte offset of `field` in the live layout.
pub fn offset_of(field: Field) -> usize {
    field.offset()
}

/// Byte offset of a field given its record name.
pub fn offset_of_name(name: &str) -> Option<usize> {
    Field::from_name(name).map(Field::offset)
}

/// Size of the record in bytes.
pub fn record_size() -> usize {
    size_of::<AuditResult>()
}

/// One field's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOffset {
    /// Field name as in [`Field::name`].
    pub name: String,
    /// Byte offset from the start of the record.
    pub offset: usize,
}

/// Versioned description of the record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSchema {
    /// Bumped whenever the record layout changes.
    pub version: u32,
    /// `size_of::<AuditResult>()`.
    pub size: usize,
    /// `align_of::<AuditResult>()`.
    pub align: usize,
    /// Field offsets, in record order.
    pub fields: Vec<FieldOffset>,
}

impl LayoutSchema {
    /// Schema of the layout this crate was compiled with.
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            size: size_of::<AuditResult>(),
            align: align_of::<AuditResult>(),
            fields: Field::ALL
                .iter()
                .map(|f| FieldOffset {
                    name: f.name().to_string(),
                    offset: f.offset(),
                })
                .collect(),
        }
    }

    /// Checks a reader's expected schema against this one.
    ///
    /// The reader may list a subset of fields, but every field it lists
    /// must exist here at the same offset.
    pub fn verify(&self, expected: &LayoutSchema) -> Result<(), LayoutMismatch> {
        if expected.version != self.version {
            return Err(LayoutMismatch::Version {
                expected: expected.version,
                actual: self.version,
            });
        }
        if expected.size != self.size {
            return Err(LayoutMismatch::Size {
                expected: expected.size,
                actual: self.size,
            });
        }
        if expected.align != self.align {
            return Err(LayoutMismatch::Align {
                expected: expected.align,
                actual: self.align,
            });
        }
        for want in &expected.fields {
            let have = self
                .fields
                .iter()
                .find(|f| f.name == want.name)
                .ok_or_else(|| LayoutMismatch::UnknownField(want.name.clone()))?;
            if have.offset != want.offset {
                tracing::warn!(
                    field = %want.name,
                    expected = want.offset,
                    actual = have.offset,
                    "record layout drift"
                );
                return Err(LayoutMismatch::Offset {
                    field: want.name.clone(),
                    expected: want.offset,
                    actual: have.offset,
                });
            }
        }
        Ok(())
    }
}

/// Verifies a reader's hardcoded `(name, offset)` table against the live layout.
pub fn check_offsets<'a, I>(expected: I) -> Result<(), LayoutMismatch>
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    for (name, want) in expected {
        let have =
            offset_of_name(name).ok_or_else(|| LayoutMismatch::UnknownField(name.to_string()))?;
        if have != want {
            return Err(LayoutMismatch::Offset {
                field: name.to_string(),
                expected: want,
                actual: have,
            });
        }
    }
    Ok(())
}
