//! # Fleet Mesh Benchmarks
//!
//! | Path | Expectation |
//! |------|-------------|
//! | Agreement scoring | linear in votes |
//! | Multi-surgeon audit | linear in content length |
//! | Envelope sign + verify | bounded by one HMAC each |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fleet_01_peer_discovery::codec::{LocalAgent, MessageCodec, MessageType};
use fleet_01_peer_discovery::{Metadata, Timestamp};
use fleet_02_consensus::{calculate_agreement_score, run_multi_surgeon_audit, tally};
use fleet_tests::fixtures::{random_votes, FLEET_SECRET, T0};
use std::collections::BTreeMap;

fn bench_agreement_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("fleet-02-agreement");
    for size in [10usize, 100, 1_000, 10_000] {
        let votes = random_votes(size, 4);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("score", size), &votes, |b, votes| {
            b.iter(|| black_box(calculate_agreement_score(votes)))
        });
        group.bench_with_input(BenchmarkId::new("tally_winner", size), &votes, |b, votes| {
            b.iter(|| black_box(tally(votes).winner().map(|(h, w)| (h.len(), w))))
        });
    }
    group.finish();
}

fn bench_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fleet-02-audit");
    for lines in [10usize, 100, 1_000] {
        let mut proposals = BTreeMap::new();
        for i in 0..8 {
            let body = format!("def f_{i}(x):\n    return [x, {{'k': (x)}}]\n").repeat(lines);
            proposals.insert(format!("hash-{i}"), body);
        }
        group.bench_with_input(BenchmarkId::new("multi_surgeon", lines), &proposals, |b, p| {
            b.iter(|| black_box(run_multi_surgeon_audit(p)))
        });
    }
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("fleet-01-codec");
    let codec = MessageCodec::new(Some(FLEET_SECRET));
    let agent = LocalAgent {
        agent_id: "bench-agent".into(),
        ip: "10.0.0.1".into(),
        port: 31415,
        metadata: Metadata::new(),
    };
    let bytes = codec
        .encode(MessageType::Heartbeat, &agent, Timestamp::new(T0), serde_json::Map::new())
        .expect("heartbeat encodes");

    group.bench_function("encode_heartbeat", |b| {
        b.iter(|| {
            black_box(codec.encode(
                MessageType::Heartbeat,
                &agent,
                Timestamp::new(T0),
                serde_json::Map::new(),
            ))
        })
    });
    group.bench_function("decode_and_verify", |b| {
        b.iter(|| {
            let envelope = codec.decode(black_box(&bytes)).expect("valid envelope");
            black_box(codec.verify_envelope(&envelope))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_agreement_score, bench_audit, bench_envelope);
criterion_main!(benches);
