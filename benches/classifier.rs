//! Benchmark for the instance classification pipeline

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use softlayer_inventory::{
    sanitize, InventoryClassifier, OperatingSystemLookup, RawInstance, Result,
};

/// Lookup that resolves instantly, so the bench measures the pipeline
/// rather than network latency
struct FixedLookup;

#[async_trait]
impl OperatingSystemLookup for FixedLookup {
    async fn operating_system(&self, id: i64) -> Result<Option<String>> {
        if id % 3 == 0 {
            Ok(None)
        } else {
            Ok(Some("UBUNTU_22_64".to_string()))
        }
    }
}

fn make_fleet(count: i64) -> Vec<RawInstance> {
    (0..count)
        .map(|i| {
            serde_json::from_value(serde_json::json!({
                "id": i,
                "hostname": format!("host{:04}", i),
                "domain": "example.com",
                "fullyQualifiedDomainName": format!("host{:04}.example.com", i),
                "primaryIpAddress": format!("10.0.{}.{}", i / 256, i % 256),
                "datacenter": {"name": if i % 2 == 0 { "ams01" } else { "dal10" }},
                "status": {"name": "Active"},
                "powerState": {"name": "Running"},
                "maxCpu": 1 + (i % 8),
                "maxMemory": 1024 * (1 + (i % 16)),
            }))
            .unwrap()
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier");
    let fleet = make_fleet(1000);
    let rt = tokio::runtime::Runtime::new().unwrap();

    group.throughput(Throughput::Elements(fleet.len() as u64));
    group.bench_function("classify_1000_instances", |b| {
        let classifier = InventoryClassifier::new();
        b.iter(|| {
            let document = rt
                .block_on(classifier.classify(black_box(fleet.clone()), &FixedLookup))
                .unwrap();
            black_box(document);
        });
    });

    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("sanitize_group_name", |b| {
        b.iter(|| sanitize(black_box("us-south.1/A with spaces!")));
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_sanitize);
criterion_main!(benches);
