//! Sample encode throughput benchmark

use runoff::output::CsvBuffer;
use runoff::row::{header_row, sample_to_row};
use runoff::sample::Sample;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::collections::HashMap;

fn create_test_samples(count: usize) -> Vec<Sample> {
    let base = Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let method = match i % 4 {
                0 => "GET",
                1 => "POST",
                2 => "PUT",
                _ => "DELETE",
            };
            let status = match i % 3 {
                0 => "200",
                1 => "301",
                _ => "500",
            };
            Sample {
                timestamp: base + chrono::Duration::milliseconds(i as i64),
                metric: "http_reqs".to_string(),
                value: (i as f64 % 100.0) / 100.0,
                tags: HashMap::from([
                    ("method".to_string(), method.to_string()),
                    ("status".to_string(), status.to_string()),
                ]),
            }
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let tags = vec!["method".to_string(), "status".to_string()];
    let samples = create_test_samples(10_000);

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(samples.len() as u64));

    group.bench_function("format_rows", |b| {
        b.iter(|| {
            for sample in &samples {
                black_box(sample_to_row(sample, &tags));
            }
        });
    });

    group.bench_function("format_and_buffer", |b| {
        b.iter(|| {
            let buffer = CsvBuffer::new();
            buffer.write_header(&header_row(&tags)).unwrap();
            let rows: Vec<Vec<String>> =
                samples.iter().map(|s| sample_to_row(s, &tags)).collect();
            let outcome = buffer.write_rows(&rows).unwrap();
            black_box(outcome.rows_written);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
