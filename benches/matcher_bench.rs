//! Benchmarks for route matching and navigation
//!
//! Run with: cargo bench

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use waypoint::routing::{match_path, parse_query, RoutePattern};
use waypoint::{Config, NavigateOptions, RouteDefinition, RouteTable, Router};

fn create_table(count: usize) -> RouteTable {
    let definitions = (0..count)
        .map(|i| RouteDefinition::new(format!("/section{}/:id/items/:item", i), "Item"))
        .collect();
    RouteTable::build(definitions).unwrap()
}

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern");

    group.bench_function("parse", |b| {
        b.iter(|| RoutePattern::parse(black_box("/users/:id/posts/{post}/comments")).unwrap())
    });

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");

    for size in [10, 100, 1000] {
        let table = create_table(size);
        let last = format!("/section{}/42/items/7", size - 1);

        group.throughput(Throughput::Elements(1));

        group.bench_function(format!("first_of_{}", size), |b| {
            b.iter(|| match_path(&table, black_box("/section0/42/items/7"), ""))
        });

        group.bench_function(format!("last_of_{}", size), |b| {
            b.iter(|| match_path(&table, black_box(&last), ""))
        });

        group.bench_function(format!("miss_of_{}", size), |b| {
            b.iter(|| match_path(&table, black_box("/nowhere/at/all"), ""))
        });
    }

    group.bench_function("query_string", |b| {
        b.iter(|| parse_query(black_box("q=hello+world&tag=a&tag=b&page=%32")))
    });

    group.finish();
}

fn bench_router(c: &mut Criterion) {
    let mut group = c.benchmark_group("router");
    let table = Config::default().route_table().unwrap();
    let router = Router::new(table);

    group.bench_function("navigate", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            router.navigate(black_box(&format!("/albums/{}", i)), "", NavigateOptions::push())
        });
    });

    group.bench_function("navigate_with_listeners", |b| {
        let subs: Vec<_> = (0..10).map(|_| router.subscribe(|_| Ok(()))).collect();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            router.navigate(black_box(&format!("/artists/{}", i)), "", NavigateOptions::push())
        });
        drop(subs);
    });

    group.bench_function("resolve", |b| {
        let params: HashMap<String, String> =
            [("id".to_string(), "a b/c".to_string())].into_iter().collect();
        b.iter(|| router.resolve(black_box("album"), &params).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_patterns, bench_matching, bench_router);
criterion_main!(benches);
