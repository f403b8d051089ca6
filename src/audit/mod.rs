//! Statistical audit of generated secrets.
//!
//! The pipeline runs seven stages in a fixed order and publishes every
//! figure through one [`AuditResult`]:
//!
//! ```text
//! 1 generate → 2 chi-squared → 3 serial correlation → 4 collisions
//!   → 5 entropy → 6 birthday bound → 7 patterns → 8 done
//! ```
//!
//! These are consistency checks. A source that is uniform over a small
//! hidden subset passes all of them.

mod entropy;
mod patterns;
mod pipeline;
mod result;
pub mod statistics;

pub use entropy::{BirthdayBound, EntropyProof, DEFAULT_GUESSES_PER_SECOND, ENTROPY_THRESHOLDS};
pub use patterns::{PatternReport, MIN_PATTERN_LEN, WEAK_SUBSTRINGS};
pub use pipeline::{AuditSettings, Auditor, VerdictPolicy, MAX_BATCH_SIZE};
pub use result::{AuditResult, Stage, DIGEST_HEX_CAPACITY, SECRET_CAPACITY};
pub use statistics::{ChiSquared, CHI2_ALPHA, SERIAL_LIMIT};
