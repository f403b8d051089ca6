//! Compact SHA-256 vs the `sha2` crate.
//!
//! Both backends must agree bit for bit; this measures what the
//! from-scratch implementation costs.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use paranoid_secrets::digest::{CompactSha256, HashProvider, LibrarySha256, Sha256State};

const SECRET: &[u8] = b"k#8Vq!r2Lp@w9Zt$e4Nb&y7Hc*u1Jm^x";

fn bench_secret_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("sha256/secret_32b");

    group.throughput(Throughput::Bytes(SECRET.len() as u64));

    group.bench_function("compact", |b| {
        b.iter(|| black_box(CompactSha256.digest(black_box(SECRET))));
    });
    group.bench_function("library", |b| {
        b.iter(|| black_box(LibrarySha256.digest(black_box(SECRET))));
    });

    group.finish();
}

fn bench_bulk_digest(c: &mut Criterion) {
    let data = vec![0x5au8; 64 * 1024];
    let mut group = c.benchmark_group("sha256/bulk_64k");

    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("compact", |b| {
        b.iter(|| black_box(CompactSha256.digest(black_box(&data))));
    });
    group.bench_function("library", |b| {
        b.iter(|| black_box(LibrarySha256.digest(black_box(&data))));
    });

    group.bench_function("compact_incremental_1k_chunks", |b| {
        b.iter(|| {
            let mut state = Sha256State::new();
            for chunk in black_box(&data).chunks(1024) {
                state.update(chunk);
            }
            black_box(state.finalize())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_secret_digest, bench_bulk_digest);
criterion_main!(benches);
