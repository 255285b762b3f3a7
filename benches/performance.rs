use closure_deps::core::DependencyAnalyzer;
use closure_deps::parsers::{Source, SourceCache};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_file(i: usize) -> String {
    format!(
        r#"/**
 * @fileoverview Generated sample {i}.
 */
goog.provide('bench.Component{i}');

goog.require('bench.Base');
goog.require('goog.array');
goog.require('goog.dom');

/**
 * @constructor
 * @extends {{bench.Base}}
 */
bench.Component{i} = function(id) {{
  bench.Base.call(this);
  this.id_ = id || {i};
  this.pattern_ = /component-(\d+)/g;
}};
goog.inherits(bench.Component{i}, bench.Base);

bench.Component{i}.prototype.render = function() {{
  var ids = goog.array.map([1, 2, 3], function(n) {{ return n * {i} / 2; }});
  return `<div id="${{this.id_}}">${{ids.join(',')}}</div>`;
}};
"#
    )
}

fn benchmark_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let content = sample_file(7);

    group.bench_function("single_file", |b| {
        b.iter(|| {
            let source = Source::from_text("bench.js", black_box(&content), false);
            black_box(source)
        });
    });

    let test_dir = tempfile::TempDir::new().unwrap();
    for i in 0..100 {
        std::fs::write(
            test_dir.path().join(format!("component_{}.js", i)),
            sample_file(i),
        )
        .unwrap();
    }

    group.bench_function("directory_without_cache", |b| {
        b.iter(|| {
            let mut analyzer = DependencyAnalyzer::new(None);
            black_box(analyzer.analyze(black_box(test_dir.path())))
        });
    });

    group.finish();
}

fn benchmark_cache_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_performance");

    let test_dir = tempfile::TempDir::new().unwrap();
    for i in 0..100 {
        std::fs::write(
            test_dir.path().join(format!("component_{}.js", i)),
            sample_file(i),
        )
        .unwrap();
    }
    let cache_file = test_dir.path().join("cache.json");

    let mut analyzer = DependencyAnalyzer::new(Some(SourceCache::load(&cache_file)));
    analyzer.analyze(test_dir.path()).unwrap();
    analyzer.save_cache().unwrap();

    group.bench_function("directory_from_warm_cache", |b| {
        b.iter(|| {
            let mut analyzer = DependencyAnalyzer::new(Some(SourceCache::load(&cache_file)));
            black_box(analyzer.analyze(black_box(test_dir.path())))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_extraction, benchmark_cache_performance);
criterion_main!(benches);
