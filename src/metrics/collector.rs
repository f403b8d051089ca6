//! Metrics collection and registry.

use crate::audit::AuditResult;
use crate::error::Error;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Errors that can occur during metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus registry holding audit metrics.
pub struct MetricsRegistry {
    registry: Registry,

    // Last audit
    chi2_statistic: Gauge,
    chi2_p_value: Gauge,
    serial_correlation: Gauge,
    duplicates: IntGauge,
    total_entropy: Gauge,
    pattern_issues: IntGauge,
    all_pass: IntGauge,
    stage: IntGauge,

    // Totals
    audits_total: IntCounter,
    audits_failed_total: IntCounter,
    errors_total: IntCounterVec,
}

impl MetricsRegistry {
    /// Creates a registry with all audit metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let chi2_statistic = Gauge::new(
            "paranoid_chi2_statistic",
            "Chi-squared statistic of the last audit batch",
        )?;
        let chi2_p_value = Gauge::new(
            "paranoid_chi2_p_value",
            "Wilson-Hilferty p-value of the last chi-squared test",
        )?;
        let serial_correlation = Gauge::new(
            "paranoid_serial_correlation",
            "Lag-1 serial correlation of the last audit batch",
        )?;
        let duplicates = IntGauge::new(
            "paranoid_duplicates",
            "Duplicate secrets found in the last audit batch",
        )?;
        let total_entropy = Gauge::new(
            "paranoid_total_entropy_bits",
            "Entropy of the last audited secret shape in bits",
        )?;
        let pattern_issues = IntGauge::new(
            "paranoid_pattern_issues",
            "Weak-pattern issues in the last reference secret",
        )?;
        let all_pass = IntGauge::new(
            "paranoid_all_pass",
            "Overall verdict of the last audit (1=pass, 0=fail)",
        )?;
        let stage = IntGauge::new("paranoid_stage", "Stage reached by the last audit")?;

        let audits_total = IntCounter::new("paranoid_audits_total", "Audits completed")?;
        let audits_failed_total = IntCounter::new(
            "paranoid_audits_failed_total",
            "Audits completed with a failing verdict",
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("paranoid_errors_total", "Audits aborted by an error"),
            &["status"],
        )?;

        registry.register(Box::new(chi2_statistic.clone()))?;
        registry.register(Box::new(chi2_p_value.clone()))?;
        registry.register(Box::new(serial_correlation.clone()))?;
        registry.register(Box::new(duplicates.clone()))?;
        registry.register(Box::new(total_entropy.clone()))?;
        registry.register(Box::new(pattern_issues.clone()))?;
        registry.register(Box::new(all_pass.clone()))?;
        registry.register(Box::new(stage.clone()))?;
        registry.register(Box::new(audits_total.clone()))?;
        registry.register(Box::new(audits_failed_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;

        Ok(Self {
            registry,
            chi2_statistic,
            chi2_p_value,
            serial_correlation,
            duplicates,
            total_entropy,
            pattern_issues,
            all_pass,
            stage,
            audits_total,
            audits_failed_total,
            errors_total,
        })
    }

    /// Records a completed audit.
    pub fn observe(&self, result: &AuditResult) {
        self.chi2_statistic.set(result.chi2_statistic);
        self.chi2_p_value.set(result.chi2_p_value);
        self.serial_correlation.set(result.serial_correlation);
        self.duplicates.set(i64::from(result.duplicates));
        self.total_entropy.set(result.total_entropy);
        self.pattern_issues.set(i64::from(result.pattern_issues));
        self.all_pass.set(i64::from(result.all_pass));
        self.stage.set(i64::from(result.current_stage));

        self.audits_total.inc();
        if !result.all_pass {
            self.audits_failed_total.inc();
        }
    }

    /// Records an audit that returned an error.
    pub fn observe_error(&self, error: &Error) {
        self.errors_total
            .with_label_values(&[&error.status_code().to_string()])
            .inc();
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("audits_total", &self.audits_total.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::EntropyError;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_observe_sets_gauges_and_counters() {
        let registry = MetricsRegistry::new().unwrap();

        let mut result = AuditResult::new();
        result.duplicates = 2;
        result.pattern_issues = 1;
        result.current_stage = 8;
        result.all_pass = false;

        registry.observe(&result);

        let output = registry.encode().unwrap();
        assert!(output.contains("paranoid_duplicates 2"));
        assert!(output.contains("paranoid_pattern_issues 1"));
        assert!(output.contains("paranoid_stage 8"));
        assert!(output.contains("paranoid_all_pass 0"));
        assert!(output.contains("paranoid_audits_total 1"));
        assert!(output.contains("paranoid_audits_failed_total 1"));
    }

    #[test]
    fn test_errors_labelled_by_status() {
        let registry = MetricsRegistry::new().unwrap();
        registry.observe_error(&Error::EntropyUnavailable(EntropyError::HostStatus(1)));

        let output = registry.encode().unwrap();
        assert!(output.contains("paranoid_errors_total{status=\"-1\"} 1"));
    }
}
