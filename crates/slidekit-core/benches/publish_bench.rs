//! Benchmarks for slide publishing and presentation assembly.
//!
//! Run with: SLIDEKIT_BENCH_DIR=/path/to/decks cargo bench --bench publish_bench
//!
//! Every `.pptx` in the directory is benchmarked; without the variable the
//! benchmarks are skipped.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slidekit_core::pml::publish_slides_parallel;
use slidekit_core::{
    build_presentation, publish_slides, PmlDocument, PresentationBuilderSettings, SlideSource,
};
use std::fs;
use std::path::PathBuf;

fn bench_decks() -> Vec<(String, Vec<u8>, PmlDocument)> {
    let Some(dir) = std::env::var_os("SLIDEKIT_BENCH_DIR").map(PathBuf::from) else {
        eprintln!("SLIDEKIT_BENCH_DIR not set; skipping");
        return Vec::new();
    };
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Skipping {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut decks = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pptx") {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Skipping {}: {}", name, e);
                continue;
            }
        };
        match PmlDocument::from_bytes(&bytes) {
            Ok(doc) => decks.push((name, bytes, doc)),
            Err(e) => eprintln!("Skipping {}: parse error: {}", name, e),
        }
    }
    decks.sort_by(|a, b| a.0.cmp(&b.0));
    decks
}

fn publish_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");
    group.sample_size(10);
    let settings = PresentationBuilderSettings::default();

    for (name, bytes, doc) in bench_decks() {
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("sequential", &name), &doc, |b, doc| {
            b.iter(|| publish_slides(doc, "bench").filter(|r| r.is_ok()).count())
        });
        group.bench_with_input(BenchmarkId::new("parallel", &name), &doc, |b, doc| {
            b.iter(|| publish_slides_parallel(doc, "bench", &settings).map(|r| r.len()))
        });
    }
    group.finish();
}

fn build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for (name, bytes, doc) in bench_decks() {
        group.throughput(Throughput::Bytes(2 * bytes.len() as u64));
        // Twice the same deck: the second copy exercises master and image reuse.
        group.bench_with_input(BenchmarkId::new("self_merge", &name), &doc, |b, doc| {
            b.iter(|| build_presentation(&[SlideSource::all(doc), SlideSource::all(doc)]))
        });
    }
    group.finish();
}

criterion_group!(benches, publish_benchmark, build_benchmark);
criterion_main!(benches);
