//! Matching engine benchmarks.
//!
//! Run with: cargo bench -p kestrel-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kestrel_core::{ClientId, Decimal, OrderBook, OrderType, Side, SymbolId};

fn create_book() -> OrderBook {
    OrderBook::new(SymbolId(1), 1 << 20)
}

fn price(ticks: i64) -> Decimal {
    // Hundredths, e.g. 10000 ticks = 100.00
    Decimal::from_raw(ticks as i128 * (Decimal::SCALE / 100))
}

/// Benchmark inserting into an empty book.
fn bench_insert_empty(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_empty");
    group.throughput(Throughput::Elements(1));

    group.bench_function("limit_order", |b| {
        let mut book = create_book();
        b.iter(|| {
            black_box(book.add_order(
                Side::Buy,
                OrderType::Limit,
                price(10000),
                Decimal::from_int(100),
                ClientId(1),
                0,
            ))
        })
    });

    group.finish();
}

/// Benchmark inserting into a book with existing depth.
fn bench_insert_deep_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_deep_book");
    group.throughput(Throughput::Elements(1));

    for depth in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut book = create_book();
            for i in 0..depth {
                book.add_order(
                    Side::Sell,
                    OrderType::Limit,
                    price(10000 + (i % 100)),
                    Decimal::from_int(100),
                    ClientId(1),
                    i as u64,
                )
                .unwrap();
            }

            b.iter(|| {
                black_box(book.add_order(
                    Side::Buy,
                    OrderType::Limit,
                    price(9990), // Won't match
                    Decimal::from_int(100),
                    ClientId(1),
                    0,
                ))
            })
        });
    }

    group.finish();
}

/// Benchmark crossing against multiple resting orders.
fn bench_match_multiple(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_multiple");
    group.throughput(Throughput::Elements(1));

    for count in [1, 5, 10] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut book = create_book();
                    for i in 0..count {
                        book.add_order(
                            Side::Sell,
                            OrderType::Limit,
                            price(10000),
                            Decimal::from_int(10),
                            ClientId(1),
                            i as u64,
                        )
                        .unwrap();
                    }
                    book
                },
                |mut book| {
                    black_box(book.add_order(
                        Side::Buy,
                        OrderType::Market,
                        Decimal::ZERO,
                        Decimal::from_int(10 * count),
                        ClientId(1),
                        100,
                    ))
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark a mixed insert/cross workload.
fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(10000));

    group.bench_function("mixed_workload", |b| {
        b.iter_batched(
            create_book,
            |mut book| {
                for i in 0..10000i64 {
                    let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
                    let _ = black_box(book.add_order(
                        side,
                        OrderType::Limit,
                        price(10000 + (i % 10)),
                        Decimal::from_int(100),
                        ClientId(1),
                        i as u64,
                    ));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_empty,
    bench_insert_deep_book,
    bench_match_multiple,
    bench_throughput,
);

criterion_main!(benches);
