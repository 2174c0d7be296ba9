use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use facetdb::core::config::{Config, Dimension};
use facetdb::core::types::Document;
use facetdb::id::{generator, prefix_table::PrefixTable};

fn config() -> Config {
    Config::new("bench.json")
        .with_dimension(
            Dimension::enumerated("status", vec!["pending".into(), "completed".into(), "archived".into()])
                .with_default("pending")
                .with_prefix("completed", 'c')
                .with_prefix("archived", 'a'),
        )
        .with_dimension(
            Dimension::enumerated("priority", vec!["normal".into(), "high".into()])
                .with_default("normal")
                .with_prefix("high", 'h'),
        )
        .with_dimension(Dimension::hierarchical("parent_id"))
}

/// A shallow forest: `roots` top-level documents, each with `children_per_root`
/// direct children -- roughly what a todo list with a handful of projects
/// looks like in practice.
fn build_documents(roots: usize, children_per_root: usize) -> Vec<Document> {
    let mut documents = Vec::with_capacity(roots * (1 + children_per_root));
    for r in 0..roots {
        let mut parent = Document::new(format!("Root {}", r));
        documents.push(parent.clone());
        for c in 0..children_per_root {
            let mut child = Document::new(format!("Child {}.{}", r, c));
            child
                .dimensions
                .insert("parent_id".to_string(), parent.uuid.to_string().into());
            documents.push(child.clone());
            parent = child; // chain a few levels deep rather than a flat fan-out
        }
    }
    documents
}

fn bench_canonicalize(c: &mut Criterion) {
    let config = config();
    let prefixes = PrefixTable::build(&config).unwrap();

    let mut group = c.benchmark_group("canonicalize");
    for &size in &[10usize, 100, 1_000] {
        let documents = build_documents(size, 3);
        group.bench_with_input(BenchmarkId::from_parameter(size), &documents, |b, documents| {
            b.iter(|| black_box(generator::canonicalize(documents, &config, &prefixes)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_canonicalize);
criterion_main!(benches);
