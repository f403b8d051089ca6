//! Paranoid Secrets Library
//!
//! A self-auditing secret generator. Symbols are drawn without modulo
//! bias from a cryptographic entropy source, and every run is checked by
//! a seven-stage statistical audit whose figures land in one fixed-layout
//! record that an untrusted reader can locate field by field.
//!
//! # Architecture
//!
//! ```text
//! entropy → sampling → generator → audit → AuditResult
//!                                    ↓          ↓
//!                                 digest   compliance, abi
//! ```
//!
//! # Design Principles
//!
//! - **Fail-closed**: an entropy failure aborts the call; nothing is
//!   ever substituted for the source
//! - **Unbiased**: rejection sampling, never a bare `byte % n`
//! - **Owned state**: the record belongs to the caller or an [`Engine`]
//! - **No cryptographic claims**: the audit shows statistical
//!   consistency with randomness, not randomness
//!
//! # Example
//!
//! ```no_run
//! use paranoid_secrets::{
//!     digest::LibrarySha256,
//!     entropy::OsEntropy,
//!     Alphabet, AuditResult, Auditor,
//! };
//!
//! let mut auditor = Auditor::new(OsEntropy::new(), LibrarySha256);
//! let mut result = AuditResult::new();
//!
//! auditor.run(&Alphabet::printable(), 32, 500, &mut result)?;
//!
//! if result.all_pass {
//!     println!("{}", result.secret_str());
//! }
//! # Ok::<(), paranoid_secrets::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod abi;
pub mod audit;
pub mod compliance;
pub mod config;
pub mod digest;
pub mod engine;
pub mod entropy;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod sampling;

// Re-export commonly used types at crate root
pub use abi::{LayoutMismatch, LayoutSchema};
pub use audit::{AuditResult, AuditSettings, Auditor, Stage, VerdictPolicy};
pub use compliance::ComplianceFramework;
pub use config::FileConfig;
pub use digest::{CompactSha256, HashProvider, LibrarySha256};
pub use engine::Engine;
pub use entropy::{EntropySource, HostEntropy, OsEntropy};
pub use error::{Error, Result};
pub use generator::{Alphabet, CharacterRequirements, SecretGenerator};
pub use metrics::MetricsRegistry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
