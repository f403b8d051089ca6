//! Paranoid Secrets CLI
//!
//! Runs one audited generation with the OS entropy source and prints the
//! secret if the audit passes.

use clap::Parser;
use paranoid_secrets::{
    Engine, FileConfig, LibrarySha256, MetricsRegistry, OsEntropy, Stage,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "paranoid-secrets", version, about = "Generate and audit a secret")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Secret length (overrides the config file)
    #[arg(short, long)]
    length: Option<usize>,

    /// Secrets in the statistical batch (overrides the config file)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Alphabet preset name, or literal symbols prefixed with `=`
    #[arg(short, long)]
    alphabet: Option<String>,

    /// Print Prometheus metrics after the audit
    #[arg(long)]
    metrics: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Paranoid Secrets v{}", paranoid_secrets::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => FileConfig::default(),
    };

    if let Some(length) = args.length {
        config.audit.length = length;
    }
    if let Some(batch_size) = args.batch_size {
        config.audit.batch_size = batch_size;
    }
    if let Some(alphabet) = args.alphabet {
        match alphabet.strip_prefix('=') {
            Some(custom) => config.audit.custom_alphabet = Some(custom.to_string()),
            None => {
                config.audit.custom_alphabet = None;
                config.audit.alphabet = alphabet;
            }
        }
    }

    let prepared = config
        .validate()
        .and_then(|()| Ok((config.audit.alphabet()?, config.audit_settings()?)));
    let (alphabet, settings) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let metrics = match MetricsRegistry::new() {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to create metrics registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        alphabet = %alphabet,
        size = alphabet.len(),
        length = config.audit.length,
        batch = config.audit.batch_size,
        "Running audit"
    );

    let mut engine = Engine::with_settings(OsEntropy::new(), LibrarySha256, settings);
    let outcome = engine.run_audit_with_observer(
        &alphabet,
        config.audit.length,
        config.audit.batch_size,
        |stage: Stage, _| debug!(?stage, "stage"),
    );

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            metrics.observe_error(&e);
            error!("Audit failed: {} (status {})", e, e.status_code());
            return ExitCode::FAILURE;
        }
    };
    metrics.observe(result);

    info!(
        "chi2={:.2} (df={}, p={:.4}) serial={:.4} duplicates={} patterns={}",
        result.chi2_statistic,
        result.degrees_of_freedom,
        result.chi2_p_value,
        result.serial_correlation,
        result.duplicates,
        result.pattern_issues
    );
    info!(
        "entropy={:.2} bits, brute force ~{:.3e} years, 50% collision after {:.3e} secrets",
        result.total_entropy, result.brute_force_years, result.samples_for_50pct
    );

    let frameworks = &engine.settings().frameworks;
    for (framework, passed) in frameworks.iter().zip(engine.result().compliance_flags()) {
        debug!(framework = %framework.name, passed, "compliance");
    }
    let met = engine
        .result()
        .compliance_flags()
        .iter()
        .filter(|&&passed| passed)
        .count();
    info!("Compliance: {}/{} frameworks met", met, frameworks.len());

    let passed = engine.result().all_pass;
    if passed {
        info!(sha256 = engine.result().digest_hex_str(), "Audit passed");
        let issued = engine.issue_secrets(
            &alphabet,
            config.audit.length,
            config.generation.count,
            &config.generation.requirements,
        );
        match issued {
            Ok(secrets) => {
                for secret in secrets {
                    println!("{}", secret);
                }
            }
            Err(e) => {
                error!("Generation failed: {} (status {})", e, e.status_code());
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!("Audit did not pass; secrets withheld");
    }

    if args.metrics {
        match metrics.encode() {
            Ok(text) => print!("{}", text),
            Err(e) => warn!("Failed to encode metrics: {}", e),
        }
    }

    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
