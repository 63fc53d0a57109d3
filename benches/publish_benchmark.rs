//! Performance benchmarks for PatchForge
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use patchforge::manifest::{ManifestBuilder, ManifestDiffer, PublishedManifest};
use patchforge::version::VersionTag;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

/// Create a test file of the specified size
fn create_test_file(dir: &Path, name: &str, size: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();

    let chunk_size = 64 * 1024;
    let chunk: Vec<u8> = (0..chunk_size).map(|i| (i % 256) as u8).collect();
    let mut remaining = size;

    while remaining > 0 {
        let to_write = remaining.min(chunk_size);
        file.write_all(&chunk[..to_write]).unwrap();
        remaining -= to_write;
    }

    path
}

fn bench_hash_file(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let mut group = c.benchmark_group("hash_file");

    for size in [64 * 1024, 1024 * 1024, 16 * 1024 * 1024] {
        let path = create_test_file(dir.path(), &format!("file_{size}.bin"), size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &path, |b, path| {
            b.iter(|| black_box(patchforge::hash::hash_file(path).unwrap()));
        });
    }

    group.finish();
}

fn bench_manifest_build(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    for i in 0..200 {
        create_test_file(dir.path(), &format!("file_{i}.dat"), 4 * 1024);
    }

    c.bench_function("build_200_files", |b| {
        let builder = ManifestBuilder::new(dir.path());
        b.iter(|| black_box(builder.build(VersionTag::new(1, 1)).unwrap()));
    });
}

fn bench_diff_unchanged(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    for i in 0..200 {
        create_test_file(dir.path(), &format!("file_{i}.dat"), 1024);
    }

    let builder = ManifestBuilder::new(dir.path());
    let (manifest, _) = builder.build(VersionTag::new(1, 1)).unwrap();
    let published =
        PublishedManifest::from_slice(manifest.to_json_string().unwrap().as_bytes()).unwrap();

    c.bench_function("diff_200_unchanged", |b| {
        let differ = ManifestDiffer::new(dir.path());
        b.iter(|| {
            black_box(differ.diff(
                Some(&published),
                &manifest,
                Path::new("patchlist.json"),
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_hash_file,
    bench_manifest_build,
    bench_diff_unchanged
);
criterion_main!(benches);
