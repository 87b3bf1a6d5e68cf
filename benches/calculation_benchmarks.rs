//! Performance benchmarks for the Convention Billing Calculation Engine.
//!
//! This benchmark suite verifies that the calculation engine meets performance targets:
//! - Single item calculation: < 50μs mean
//! - Realistic invoice (8 items, package bundling): < 500μs mean
//! - Invoice with 50 items: < 2ms mean
//! - Batch of 100 invoices: < 50ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use convention_engine::calculation::{BillingOptions, calculate_billing};
use convention_engine::config::{ConventionStore, EffectiveConfig};
use convention_engine::models::{BillingItem, ServiceCategory};

/// Resolves the effective configuration used across all benchmarks.
fn load_config(id: &str) -> EffectiveConfig {
    let store = ConventionStore::load("./config/conventions").expect("Failed to load conventions");
    store.resolve(id).expect("Failed to resolve convention")
}

fn simple_item(code: &str, category: ServiceCategory, unit_price: u64) -> BillingItem {
    BillingItem {
        code: code.to_string(),
        description: code.to_string(),
        category: Some(category),
        quantity: Some(Decimal::ONE),
        unit_price: Some(Decimal::from(unit_price)),
    }
}

/// A realistic mixed invoice: the full ophthalmology work-up (which the
/// BRALIMA package bundles) plus two unbundled items.
fn realistic_invoice() -> Vec<BillingItem> {
    vec![
        simple_item("CONSULT", ServiceCategory::Consultation, 30000),
        simple_item("REFRACTO", ServiceCategory::Examination, 20000),
        simple_item("TONO", ServiceCategory::Examination, 25000),
        simple_item("BIOMICRO", ServiceCategory::Examination, 20000),
        simple_item("FOND-ND", ServiceCategory::Examination, 30000),
        simple_item("FLUORO", ServiceCategory::Imaging, 15000),
        simple_item("NFS", ServiceCategory::Laboratory, 18000),
        simple_item("COLLYRE", ServiceCategory::Medication, 8500),
    ]
}

/// Creates an invoice with the specified number of line items.
fn invoice_with_items(count: usize) -> Vec<BillingItem> {
    let categories = [
        ServiceCategory::Consultation,
        ServiceCategory::Examination,
        ServiceCategory::Procedure,
        ServiceCategory::Imaging,
        ServiceCategory::Laboratory,
        ServiceCategory::Medication,
    ];

    (0..count)
        .map(|i| {
            simple_item(
                &format!("ACT-{:03}", i),
                categories[i % categories.len()],
                1000 + (i as u64) * 137,
            )
        })
        .collect()
}

/// Benchmark: single line item, no packages.
///
/// Target: < 50μs mean
fn bench_single_item(c: &mut Criterion) {
    let config = load_config("activa");
    let options = BillingOptions::default();
    let items = vec![simple_item("CONSULT", ServiceCategory::Consultation, 30000)];

    c.bench_function("single_item", |b| {
        b.iter(|| {
            let summary = calculate_billing(black_box(&items), &config, &options).unwrap();
            black_box(summary)
        })
    });
}

/// Benchmark: realistic invoice with package bundling.
///
/// Target: < 500μs mean
fn bench_realistic_invoice(c: &mut Criterion) {
    let config = load_config("bralima");
    let options = BillingOptions::default();
    let items = realistic_invoice();

    c.bench_function("realistic_invoice", |b| {
        b.iter(|| {
            let summary = calculate_billing(black_box(&items), &config, &options).unwrap();
            black_box(summary)
        })
    });
}

/// Benchmark: invoice size scaling.
fn bench_invoice_scaling(c: &mut Criterion) {
    let config = load_config("cigna");
    let options = BillingOptions::default();

    let mut group = c.benchmark_group("invoice_scaling");
    for count in [5, 20, 50] {
        let items = invoice_with_items(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| {
                let summary = calculate_billing(black_box(items), &config, &options).unwrap();
                black_box(summary)
            })
        });
    }
    group.finish();
}

/// Benchmark: batch of 100 invoices across different conventions.
///
/// Target: < 50ms mean
fn bench_batch_100(c: &mut Criterion) {
    let store = ConventionStore::load("./config/conventions").expect("Failed to load conventions");
    let configs: Vec<EffectiveConfig> = ["activa", "activa_mining", "bralima", "cigna", "boa"]
        .iter()
        .map(|id| store.resolve(id).unwrap())
        .collect();
    let options = BillingOptions::default();

    // Pre-create 100 invoices of varying shape.
    let invoices: Vec<Vec<BillingItem>> = (0..100)
        .map(|i| {
            if i % 4 == 0 {
                realistic_invoice()
            } else {
                invoice_with_items(3 + i % 7)
            }
        })
        .collect();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100));

    group.bench_function("batch_100", |b| {
        b.iter(|| {
            let mut results = Vec::with_capacity(invoices.len());
            for (i, items) in invoices.iter().enumerate() {
                let config = &configs[i % configs.len()];
                let summary = calculate_billing(items, config, &options).unwrap();
                results.push(summary);
            }
            black_box(results)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_item,
    bench_realistic_invoice,
    bench_invoice_scaling,
    bench_batch_100
);
criterion_main!(benches);
