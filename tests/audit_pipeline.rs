//! End-to-end audits through the public API with a seeded host source.

use paranoid_secrets::abi::{self, Field, LayoutSchema};
use paranoid_secrets::audit::{AuditSettings, Stage, VerdictPolicy};
use paranoid_secrets::compliance;
use paranoid_secrets::entropy::EntropyError;
use paranoid_secrets::generator::ClassCounts;
use paranoid_secrets::{
    Alphabet, AuditResult, Auditor, CharacterRequirements, CompactSha256, Engine, Error,
    HostEntropy, LibrarySha256,
};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

fn chacha_source(seed: u64) -> HostEntropy<impl FnMut(&mut [u8]) -> i32> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    HostEntropy::new(move |buf: &mut [u8]| {
        rng.fill_bytes(buf);
        0
    })
}

fn statistics_only() -> AuditSettings {
    AuditSettings {
        policy: VerdictPolicy::statistics_only(),
        ..AuditSettings::default()
    }
}

#[test]
fn test_full_audit_printable() {
    let mut auditor = Auditor::new(chacha_source(1), LibrarySha256);
    let mut result = AuditResult::new();

    auditor
        .run(&Alphabet::printable(), 32, 500, &mut result)
        .unwrap();

    assert!(result.is_complete());
    assert_eq!(result.current_stage, Stage::Done.ordinal());
    assert_eq!(result.secret_str().len(), 32);
    assert_eq!(result.digest_hex_str().len(), 64);
    assert_eq!(result.degrees_of_freedom, 93);
    assert_eq!(result.rejection_boundary, 187);
    assert!((result.rejection_rate_pct - 26.5625).abs() < 1e-9);
    assert!((result.total_entropy - 209.75).abs() < 0.01);
    assert!(result.meets_memorized && result.meets_crypto_equivalent);
    assert!(!result.meets_post_quantum);
    assert_eq!(result.generation_count, 501);
    assert_eq!(result.duplicates, 0);

    let printable = Alphabet::printable();
    assert!(result
        .secret_str()
        .bytes()
        .all(|b| printable.index_of(b).is_some()));

    let counts = ClassCounts::of(result.secret_str().as_bytes());
    assert_eq!(result.class_counts(), counts);
}

#[test]
fn test_uniform_source_passes_statistics() {
    // Chi-squared rejects 1% of honest runs; demand a clear majority.
    let passes = (10..15)
        .filter(|&seed| {
            let mut engine =
                Engine::with_settings(chacha_source(seed), CompactSha256, statistics_only());
            engine.run_audit(&Alphabet::alphanumeric(), 24, 400).unwrap().all_pass
        })
        .count();

    assert!(passes >= 4, "only {passes}/5 seeded audits passed");
}

#[test]
fn test_biased_source_fails_chi_squared() {
    // Bytes only ever land on the first 47 printable symbols.
    let mut next = 0u8;
    let skewed = HostEntropy::new(move |buf: &mut [u8]| {
        for b in buf.iter_mut() {
            *b = next % 47;
            next = next.wrapping_add(1);
        }
        0
    });

    let mut engine = Engine::with_settings(skewed, LibrarySha256, statistics_only());
    let result = engine.run_audit(&Alphabet::printable(), 16, 200).unwrap();

    assert!(result.is_complete());
    assert!(!result.chi2_pass);
    assert!(result.chi2_p_value < 0.001);
    assert!(!result.all_pass);
}

#[test]
fn test_sequential_runs_overwrite_record() {
    let mut engine = Engine::new(chacha_source(7), LibrarySha256);

    engine.run_audit(&Alphabet::printable(), 32, 50).unwrap();
    let first_secret = engine.result().secret_str().to_string();

    let result = engine.run_audit(&Alphabet::hex(), 12, 20).unwrap();
    assert_eq!(result.alphabet_size, 16);
    assert_eq!(result.degrees_of_freedom, 15);
    assert_eq!(result.rejection_boundary, 255);
    assert_eq!(result.rejection_rate_pct, 0.0);
    assert_eq!(result.length, 12);
    assert_eq!(result.batch_size, 20);
    assert_eq!(result.generation_count, 21);
    assert_eq!(result.secret_str().len(), 12);
    assert_ne!(result.secret_str(), first_secret);
    assert_eq!(engine.runs(), 2);
}

#[test]
fn test_observer_sees_every_stage_once() {
    let mut auditor = Auditor::new(chacha_source(3), CompactSha256);
    let mut result = AuditResult::new();
    let mut seen = Vec::new();

    auditor
        .run_with_observer(&Alphabet::alphanumeric(), 20, 30, &mut result, |stage, r| {
            assert_eq!(r.current_stage, stage.ordinal());
            seen.push(stage.ordinal());
        })
        .unwrap();

    assert_eq!(seen, (1..=8).collect::<Vec<u32>>());
}

#[test]
fn test_invalid_arguments_leave_record_untouched() {
    let mut auditor = Auditor::new(chacha_source(4), LibrarySha256);
    let mut result = AuditResult::new();
    auditor.run(&Alphabet::hex(), 8, 10, &mut result).unwrap();
    let before = result.clone();

    for (length, batch) in [(0, 10), (257, 10), (8, 0), (8, 2001)] {
        let err = auditor
            .run(&Alphabet::hex(), length, batch, &mut result)
            .unwrap_err();
        assert_eq!(err.status_code(), -2);
    }
    assert!(result == before);
}

#[test]
fn test_entropy_failure_is_fatal() {
    let mut calls = 0;
    let flaky = HostEntropy::new(move |buf: &mut [u8]| {
        calls += 1;
        if calls > 3 {
            return 29;
        }
        buf.fill(0x11);
        0
    });

    let mut engine = Engine::new(flaky, LibrarySha256);
    let err = engine.run_audit(&Alphabet::printable(), 32, 100).unwrap_err();

    assert_eq!(err, Error::EntropyUnavailable(EntropyError::HostStatus(29)));
    assert!(!engine.result().is_complete());
}

#[test]
fn test_constrained_generation_meets_minimums() {
    let mut engine = Engine::new(chacha_source(5), LibrarySha256);
    let requirements = CharacterRequirements {
        min_lowercase: 3,
        min_uppercase: 3,
        min_digits: 3,
        min_symbols: 3,
    };

    for _ in 0..20 {
        let secret = engine
            .generate_constrained(&Alphabet::printable(), 16, &requirements)
            .unwrap();
        assert_eq!(secret.len(), 16);
        assert!(requirements.satisfied_by(&ClassCounts::of(secret.as_bytes())));
    }

    let err = engine
        .generate_constrained(&Alphabet::alphanumeric(), 16, &requirements)
        .unwrap_err();
    assert_eq!(err.status_code(), -3);
}

#[test]
fn test_generate_multiple_independent() {
    let mut engine = Engine::new(chacha_source(6), LibrarySha256);
    let secrets = engine
        .generate_multiple(&Alphabet::alphanumeric(), 24, 10)
        .unwrap();

    assert_eq!(secrets.len(), 10);
    let mut unique = secrets.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 10);

    assert!(engine
        .generate_multiple(&Alphabet::alphanumeric(), 24, 11)
        .is_err());
}

#[test]
fn test_compliance_flags_follow_frameworks() {
    let mut engine = Engine::new(chacha_source(8), LibrarySha256);
    let result = engine.run_audit(&Alphabet::hex(), 8, 20).unwrap();

    // 8 hex symbols carry 32 bits: only NIST's 30-bit floor is met.
    let flags = result.compliance_flags();
    assert!(flags[0]);
    assert!(flags[1..].iter().all(|&f| !f));

    for (framework, flag) in compliance::presets().iter().zip(flags) {
        assert_eq!(compliance::check(result, framework), flag);
    }
}

#[test]
fn test_reader_schema_round_trip() {
    // A reader ships the schema it was built against and checks it once.
    let shipped = toml::to_string(&LayoutSchema::current()).unwrap();
    let expected: LayoutSchema = toml::from_str(&shipped).unwrap();
    assert!(LayoutSchema::current().verify(&expected).is_ok());

    let mut stale = expected.clone();
    if let Some(field) = stale.fields.iter_mut().find(|f| f.name == "all_pass") {
        field.offset += 4;
    }
    let err = LayoutSchema::current().verify(&stale).unwrap_err();
    assert_eq!(Error::from(err).status_code(), -5);
}

#[test]
fn test_offsets_locate_live_fields() {
    let mut engine = Engine::new(chacha_source(9), LibrarySha256);
    let result = engine.run_audit(&Alphabet::alphanumeric(), 20, 10).unwrap();

    let base = result as *const AuditResult as usize;
    let stage_ptr = &result.current_stage as *const u32 as usize;
    assert_eq!(stage_ptr - base, abi::offset_of(Field::CurrentStage));
    assert_eq!(abi::offset_of_name("length"), Some(abi::offset_of(Field::Length)));
    assert!(abi::record_size() >= abi::offset_of(Field::CountSymbols) + 4);
}
