//! Registry benchmarks
//!
//! Measures the sorted view (rebuilt on every indexed lookup) and document decoding.

use audiohub_core::{ConfigCodec, EngineRecord, EngineRegistry};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::{json, Value};

fn registry_of(count: usize) -> EngineRegistry {
    let mut registry = EngineRegistry::new();
    for i in 0..count {
        let record = EngineRecord::new(format!("Engine {:04}", (i * 7919) % count), 2)
            .expect("valid channel count");
        registry.add(record).expect("fresh identifiers are unique");
    }
    registry
}

fn document_of(count: usize) -> Value {
    let engines: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "Description": format!("Engine {}", i),
                "Formats": [{ "IOAudioStreamNumChannels": 2 + (i % 7) }]
            })
        })
        .collect();
    json!({ "IOKitPersonalities": { "PhantomAudioDriver": { "AudioEngines": engines } } })
}

fn benchmark_record_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_at");

    for count in [8, 64, 512].iter() {
        let registry = registry_of(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_function(format!("record_at_{}_engines", count), |b| {
            b.iter(|| registry.record_at(black_box(*count / 2)))
        });
    }

    group.finish();
}

fn benchmark_decode_all(c: &mut Criterion) {
    let codec = ConfigCodec::default();
    let document = document_of(256);

    c.bench_function("decode_all_256", |b| {
        b.iter(|| codec.decode_all(black_box(&document)))
    });
}

criterion_group!(benches, benchmark_record_at, benchmark_decode_all);
criterion_main!(benches);
