//! Criterion microbenches for circlegen hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - masked CRC32C over record-sized payloads
//! - container framing and reading
//! - example feature map encoding and decoding
//! - circle placement

use std::hint::black_box;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use circlegen::annotate;
use circlegen::feature::{decode, encode, FeatureMap};
use circlegen::geometry::{generate, GeneratorConfig};
use circlegen::ir::Circle;
use circlegen::record::{masked_crc32c, write_record, RecordReader};

// Roughly the size of a 128x128 PNG with a handful of rings.
const PAYLOAD_LEN: usize = 8 * 1024;
const RECORDS: usize = 64;

fn sample_example() -> FeatureMap {
    let circles = [
        Circle::new(30.0, 30.0, 12.0),
        Circle::new(90.0, 40.0, 20.0),
        Circle::new(60.0, 100.0, 15.0),
    ];
    let annotation = annotate::build(&circles, 128, 128);
    annotate::build_example(vec![0x5a; PAYLOAD_LEN], 128, 128, &annotation.boxes)
}

fn framed_container() -> Vec<u8> {
    let payload = vec![0xa5u8; PAYLOAD_LEN];
    let mut bytes = Vec::new();
    for _ in 0..RECORDS {
        write_record(&mut bytes, &payload).unwrap();
    }
    bytes
}

/// Benchmark the masked checksum alone.
fn bench_masked_crc(c: &mut Criterion) {
    let payload = vec![0x42u8; PAYLOAD_LEN];
    let mut group = c.benchmark_group("crc");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("masked_crc32c", |b| {
        b.iter(|| black_box(masked_crc32c(black_box(&payload))))
    });

    group.finish();
}

/// Benchmark framing records into memory and reading them back.
fn bench_framing(c: &mut Criterion) {
    let payload = vec![0xa5u8; PAYLOAD_LEN];
    let container = framed_container();
    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Bytes(container.len() as u64));

    group.bench_function("write_records", |b| {
        b.iter(|| {
            let mut bytes = Vec::with_capacity(container.len());
            for _ in 0..RECORDS {
                write_record(&mut bytes, black_box(&payload)).unwrap();
            }
            black_box(bytes)
        })
    });

    group.bench_function("read_records", |b| {
        b.iter(|| {
            let count = RecordReader::new(Cursor::new(black_box(container.as_slice())))
                .map(|record| record.unwrap().len())
                .sum::<usize>();
            black_box(count)
        })
    });

    group.finish();
}

/// Benchmark the example codec.
fn bench_feature_codec(c: &mut Criterion) {
    let example = sample_example();
    let encoded = encode(&example);
    let mut group = c.benchmark_group("feature_codec");
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("encode", |b| b.iter(|| black_box(encode(black_box(&example)))));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode(black_box(&encoded)).unwrap()))
    });

    group.finish();
}

/// Benchmark circle placement on the default canvas.
fn bench_generate(c: &mut Criterion) {
    let config = GeneratorConfig::default();
    c.bench_function("generate_10_circles_128", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| black_box(generate(128, 128, 10, &config, &mut rng)))
    });
}

criterion_group!(
    benches,
    bench_masked_crc,
    bench_framing,
    bench_feature_codec,
    bench_generate,
);
criterion_main!(benches);
