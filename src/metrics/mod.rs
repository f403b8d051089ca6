//! Prometheus metrics for audit runs.
//!
//! # Metrics Exposed
//!
//! ## Last audit
//! - `paranoid_chi2_statistic`, `paranoid_chi2_p_value`
//! - `paranoid_serial_correlation`
//! - `paranoid_duplicates`
//! - `paranoid_total_entropy_bits`
//! - `paranoid_pattern_issues`
//! - `paranoid_all_pass` (1=pass, 0=fail)
//! - `paranoid_stage`
//!
//! ## Totals
//! - `paranoid_audits_total`, `paranoid_audits_failed_total`
//! - `paranoid_errors_total` (audits that returned an error)
//!
//! Metrics are encoded on demand; serving them is left to the caller.

mod collector;

pub use collector::{MetricsError, MetricsRegistry};
