//! Regulatory threshold checks.
//!
//! Frameworks are supplied from outside (presets below, or a config
//! file). The check is a pure comparison against an audit record.

use crate::audit::AuditResult;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Minimum requirements a framework places on a secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFramework {
    /// Short display name.
    pub name: Cow<'static, str>,
    /// One-line summary of the framework.
    #[serde(default)]
    pub description: Cow<'static, str>,
    /// Minimum secret length.
    pub min_length: u32,
    /// Minimum entropy in bits.
    pub min_entropy_bits: f64,
    /// Needs at least one lowercase and one uppercase letter.
    #[serde(default)]
    pub require_mixed_case: bool,
    /// Needs at least one digit.
    #[serde(default)]
    pub require_digits: bool,
    /// Needs at least one symbol.
    #[serde(default)]
    pub require_symbols: bool,
}

/// NIST SP 800-63B memorized secrets. No composition rules.
pub const NIST: ComplianceFramework = ComplianceFramework {
    name: Cow::Borrowed("NIST SP 800-63B"),
    description: Cow::Borrowed("US federal digital identity guidelines (memorized secrets)"),
    min_length: 8,
    min_entropy_bits: 30.0,
    require_mixed_case: false,
    require_digits: false,
    require_symbols: false,
};

/// PCI DSS 4.0 requirement 8.3.6.
pub const PCI_DSS: ComplianceFramework = ComplianceFramework {
    name: Cow::Borrowed("PCI DSS 4.0"),
    description: Cow::Borrowed("Payment card industry data security standard"),
    min_length: 12,
    min_entropy_bits: 60.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: false,
};

/// HIPAA security rule, per HHS/HITRUST guidance.
pub const HIPAA: ComplianceFramework = ComplianceFramework {
    name: Cow::Borrowed("HIPAA"),
    description: Cow::Borrowed("US health information privacy (HHS/HITRUST guidance)"),
    min_length: 8,
    min_entropy_bits: 50.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: true,
};

/// SOC 2 Type II, CC6.1.
pub const SOC2: ComplianceFramework = ComplianceFramework {
    name: Cow::Borrowed("SOC 2"),
    description: Cow::Borrowed("Service organization controls (AICPA trust services criteria)"),
    min_length: 8,
    min_entropy_bits: 50.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: false,
};

/// GDPR article 32 with ENISA technical guidelines.
pub const GDPR: ComplianceFramework = ComplianceFramework {
    name: Cow::Borrowed("GDPR/ENISA"),
    description: Cow::Borrowed("EU data protection (ENISA technical guidelines)"),
    min_length: 10,
    min_entropy_bits: 80.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: true,
};

/// ISO/IEC 27001:2022 annex A.5.17.
pub const ISO27001: ComplianceFramework = ComplianceFramework {
    name: Cow::Borrowed("ISO 27001"),
    description: Cow::Borrowed("Information security management (annex A.5.17)"),
    min_length: 12,
    min_entropy_bits: 90.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: true,
};

/// The six built-in frameworks, in record flag order.
pub fn presets() -> [ComplianceFramework; 6] {
    [NIST, PCI_DSS, HIPAA, SOC2, GDPR, ISO27001]
}

/// True if `result` meets every requirement of `framework`.
///
/// Length and entropy are compared against the requested parameters;
/// composition flags against the reference secret's class counts.
pub fn check(result: &AuditResult, framework: &ComplianceFramework) -> bool {
    if result.length < framework.min_length {
        return false;
    }
    if result.total_entropy < framework.min_entropy_bits {
        return false;
    }
    if framework.require_mixed_case && (result.count_lowercase == 0 || result.count_uppercase == 0)
    {
        return false;
    }
    if framework.require_digits && result.count_digits == 0 {
        return false;
    }
    if framework.require_symbols && result.count_symbols == 0 {
        return false;
    }
    true
}

/// Checks six frameworks at once, in the order given.
pub fn check_all(result: &AuditResult, frameworks: &[ComplianceFramework; 6]) -> [bool; 6] {
    frameworks.each_ref().map(|f| check(result, f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn result_with(length: u32, entropy: f64, counts: [u32; 4]) -> AuditResult {
        let mut result = AuditResult::new();
        result.length = length;
        result.total_entropy = entropy;
        [
            result.count_lowercase,
            result.count_uppercase,
            result.count_digits,
            result.count_symbols,
        ] = counts;
        result
    }

    #[test]
    fn test_strong_secret_meets_all_presets() {
        let result = result_with(32, 209.75, [10, 10, 6, 6]);
        assert_eq!(check_all(&result, &presets()), [true; 6]);
    }

    #[test]
    fn test_short_secret_fails_length() {
        let result = result_with(7, 200.0, [2, 2, 2, 1]);
        assert!(!check(&result, &NIST));
    }

    #[test]
    fn test_low_entropy_fails() {
        let result = result_with(12, 40.0, [4, 4, 2, 2]);
        assert!(check(&result, &NIST));
        assert!(!check(&result, &PCI_DSS));
    }

    #[test]
    fn test_composition_rules() {
        // Lowercase and digits only.
        let result = result_with(16, 82.7, [10, 0, 6, 0]);
        assert!(check(&result, &NIST));
        assert!(!check(&result, &SOC2));
        assert!(!check(&result, &GDPR));
    }

    #[test]
    fn test_framework_from_toml() {
        let framework: ComplianceFramework = toml::from_str(
            r#"
            name = "internal"
            min_length = 20
            min_entropy_bits = 100.0
            require_symbols = true
            "#,
        )
        .unwrap();

        assert_eq!(framework.name, "internal");
        assert!(!framework.require_digits);
        assert!(!check(&result_with(20, 120.0, [10, 10, 0, 0]), &framework));
        assert!(check(&result_with(20, 120.0, [10, 9, 0, 1]), &framework));
    }

    proptest! {
        #[test]
        fn prop_raising_thresholds_never_passes_a_failure(
            length in 1u32..64,
            entropy in 0.0f64..400.0,
            base_len in 1u32..64,
            base_bits in 0.0f64..400.0,
            extra_len in 0u32..32,
            extra_bits in 0.0f64..200.0,
        ) {
            let result = result_with(length, entropy, [1, 1, 1, 1]);
            let base = ComplianceFramework {
                min_length: base_len,
                min_entropy_bits: base_bits,
                ..NIST
            };
            let stricter = ComplianceFramework {
                min_length: base_len + extra_len,
                min_entropy_bits: base_bits + extra_bits,
                ..base.clone()
            };

            if !check(&result, &base) {
                prop_assert!(!check(&result, &stricter));
            }
        }
    }
}
