//! Benchmarks for payload normalization
//!
//! Run with: cargo bench

use chirpstack_multicast::pipeline::normalize;
use chirpstack_multicast::types::Payload;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn bench_text_encodings(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_payloads");

    for size in [16usize, 64, 222].iter() {
        let bytes = sample_bytes(*size);
        let hex_text = Payload::Json(Value::String(hex::encode(&bytes)));
        let b64_text = Payload::Json(Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            &bytes,
        )));
        let utf8_text = Payload::Json(Value::String("temp: 21.5C, ok!".repeat(size / 16)));

        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("hex", size), &hex_text, |b, p| {
            b.iter(|| black_box(normalize(p)))
        });
        group.bench_with_input(BenchmarkId::new("base64", size), &b64_text, |b, p| {
            b.iter(|| black_box(normalize(p)))
        });
        group.bench_with_input(BenchmarkId::new("utf8", size), &utf8_text, |b, p| {
            b.iter(|| black_box(normalize(p)))
        });
    }

    group.finish();
}

fn bench_buffers(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_payloads");

    let bytes = sample_bytes(222);
    let binary = Payload::Binary(bytes.clone());
    let descriptor = Payload::Json(json!({"type": "Buffer", "data": bytes}));
    let wrapped = Payload::Json(json!({"multicastGroupId": "g", "data": hex::encode(&bytes)}));

    group.bench_function("binary", |b| b.iter(|| black_box(normalize(&binary))));
    group.bench_function("serialized_buffer", |b| {
        b.iter(|| black_box(normalize(&descriptor)))
    });
    group.bench_function("data_field_hex", |b| {
        b.iter(|| black_box(normalize(&wrapped)))
    });

    group.finish();
}

criterion_group!(benches, bench_text_encodings, bench_buffers);
criterion_main!(benches);
