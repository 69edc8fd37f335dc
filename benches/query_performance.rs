//! Benchmark suite for interactive query latency
//!
//! This benchmark measures:
//! - Query parsing
//! - Child matching at one level (the common "typing after a dot" case)
//! - Wildcard subtree scans, sequential vs parallel
//! - The full engine pipeline with and without the result cache

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use namespace_search::matcher::Matcher;
use namespace_search::query::parse;
use namespace_search::tree::{EntityTree, NoDescriptions, TreeBuilder};
use namespace_search::{EngineConfig, SearchEngine, rank};

/// Generate a synthetic site-packages namespace with `packages` top-level packages,
/// each holding `modules` modules of `members` members.
fn generate_namespace(packages: usize, modules: usize, members: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(packages * modules * (members + 1));
    for p in 0..packages {
        let package = format!("package_{}", p);
        names.push(package.clone());
        for m in 0..modules {
            let module = format!("{}.module_{}", package, m);
            names.push(module.clone());
            for i in 0..members {
                names.push(format!("{}.member_{}_{}", module, i, p % 7));
            }
        }
    }
    names
}

fn build_tree(names: &[String]) -> EntityTree {
    TreeBuilder::default()
        .build(names, &NoDescriptions)
        .expect("permissive build never fails")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for raw in ["", "os.pa", "*join", "xml.etree.ElementTree.*find  "] {
        group.bench_with_input(BenchmarkId::from_parameter(raw.trim()), raw, |b, raw| {
            b.iter(|| parse(black_box(raw)));
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    for packages in [10, 100, 400].iter() {
        let names = generate_namespace(*packages, 10, 10);
        group.throughput(Throughput::Elements(names.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(names.len()), &names, |b, names| {
            b.iter(|| build_tree(black_box(names)));
        });
    }

    group.finish();
}

fn bench_child_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("child_matching");

    for packages in [100, 1000, 5000].iter() {
        let tree = build_tree(&generate_namespace(*packages, 1, 0));
        let query = parse("pkg_1");
        group.throughput(Throughput::Elements(*packages as u64));
        group.bench_with_input(BenchmarkId::from_parameter(packages), &tree, |b, tree| {
            b.iter(|| rank(Matcher::default().match_query(black_box(tree), &query)));
        });
    }

    group.finish();
}

fn bench_wildcard(c: &mut Criterion) {
    let mut group = c.benchmark_group("wildcard_parallel_vs_sequential");
    group.sample_size(30);

    for packages in [10, 100, 300].iter() {
        let tree = build_tree(&generate_namespace(*packages, 10, 10));
        let query = parse("*mem3_5");
        group.throughput(Throughput::Elements(tree.len() as u64));

        group.bench_with_input(BenchmarkId::new("sequential", tree.len()), &tree, |b, tree| {
            let matcher = Matcher::new(usize::MAX);
            b.iter(|| rank(matcher.match_query(black_box(tree), &query)));
        });

        group.bench_with_input(BenchmarkId::new("parallel", tree.len()), &tree, |b, tree| {
            let matcher = Matcher::new(1);
            b.iter(|| rank(matcher.match_query(black_box(tree), &query)));
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_search");
    let tree = build_tree(&generate_namespace(200, 10, 10));

    let cached = SearchEngine::with_tree(EngineConfig::default(), tree.clone());
    group.bench_function("cached", |b| {
        b.iter(|| cached.search(black_box("*module_3")));
    });

    let uncached = SearchEngine::with_tree(
        EngineConfig {
            cache_capacity: 0,
            ..EngineConfig::default()
        },
        tree,
    );
    group.bench_function("uncached", |b| {
        b.iter(|| uncached.search(black_box("*module_3")));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_build,
    bench_child_matching,
    bench_wildcard,
    bench_engine
);
criterion_main!(benches);
