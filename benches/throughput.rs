//! Throughput Benchmark for redkey
//!
//! Measures command dispatch against the database under various workloads,
//! plus the RESP codec on its own.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use redkey::commands::CommandHandler;
use redkey::protocol::{parse_message, RespValue};
use redkey::storage::Database;
use std::time::Duration;

fn args(items: &[&str]) -> Vec<Bytes> {
    items.iter().map(|s| Bytes::from(s.to_string())).collect()
}

fn request(items: &[&str]) -> RespValue {
    RespValue::array(items.iter().map(|s| RespValue::bulk_string(s.to_string())).collect())
}

/// Benchmark HSET operations
fn bench_hset(c: &mut Criterion) {
    let handler = CommandHandler::new(Database::new());

    let mut group = c.benchmark_group("hset");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new_fields", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let field = format!("field:{}", i);
            black_box(handler.dispatch(b"hset", args(&["user", field.as_str(), "value"])));
            i += 1;
        });
    });

    group.bench_function("new_keys", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("hash:{}", i);
            black_box(handler.dispatch(b"hset", args(&[key.as_str(), "f", "value"])));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark read commands
fn bench_reads(c: &mut Criterion) {
    let handler = CommandHandler::new(Database::new());

    for i in 0..10_000 {
        let field = format!("field:{}", i);
        handler.dispatch(b"hset", args(&["user", field.as_str(), "value"]));
    }

    let mut group = c.benchmark_group("reads");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hget_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let field = format!("field:{}", i % 10_000);
            black_box(handler.dispatch(b"hget", args(&["user", field.as_str()])));
            i += 1;
        });
    });

    group.bench_function("hget_missing_key", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(handler.dispatch(b"hget", args(&[key.as_str(), "f"])));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark list pushes and pops
fn bench_lists(c: &mut Criterion) {
    let handler = CommandHandler::new(Database::new());

    let mut group = c.benchmark_group("lists");
    group.throughput(Throughput::Elements(1));

    group.bench_function("lpush", |b| {
        b.iter(|| {
            black_box(handler.dispatch(b"lpush", args(&["queue", "item"])));
        });
    });

    group.bench_function("rpush_lpop", |b| {
        b.iter(|| {
            handler.dispatch(b"rpush", args(&["fifo", "item"]));
            black_box(handler.dispatch(b"lpop", args(&["fifo"])));
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_same_hash", |b| {
        b.iter(|| {
            let handler = CommandHandler::new(Database::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let handler = handler.clone();
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let field = format!("{}:{}", t, i);
                            handler.dispatch(b"hset", args(&["shared", field.as_str(), "v"]));
                            handler.dispatch(b"hget", args(&["shared", field.as_str()]));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(handler.database().len());
        });
    });

    group.finish();
}

/// Benchmark expiry operations
fn bench_expiry(c: &mut Criterion) {
    let handler = CommandHandler::new(Database::new());

    for i in 0..10_000 {
        let key = format!("expire:{}", i);
        handler.dispatch(b"set", args(&[key.as_str(), "value"]));
    }

    let mut group = c.benchmark_group("expiry");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_with_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            black_box(handler.dispatch(b"set", args(&[key.as_str(), "value", "EX", "3600"])));
            i += 1;
        });
    });

    group.bench_function("pexpire_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("expire:{}", i % 10_000);
            black_box(handler.dispatch(b"pexpire", args(&[key.as_str(), "3600000"])));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark the RESP codec
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let hset = request(&["HSET", "user:1000", "name", "Ariz"]);
    let encoded = hset.encode().unwrap();
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("encode_request", |b| {
        b.iter(|| black_box(hset.encode()));
    });

    group.bench_function("parse_request", |b| {
        b.iter(|| black_box(parse_message(&encoded)));
    });

    let reply = RespValue::from(
        (0..100)
            .map(|i| Bytes::from(format!("member:{}", i)))
            .collect::<Vec<_>>(),
    );
    group.bench_function("encode_array_reply", |b| {
        b.iter(|| black_box(reply.encode()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_hset,
    bench_reads,
    bench_lists,
    bench_concurrent,
    bench_expiry,
    bench_codec,
);

criterion_main!(benches);
