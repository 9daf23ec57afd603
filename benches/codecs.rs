//! Criterion benchmarks for the per-page codec wrappers.
//!
//! Run with:
//!   cargo bench --bench codecs

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use memcomp::adapter;
use memcomp::config::PAGE_SIZE;
use memcomp::model::RunConfig;

fn sample_pages() -> Vec<(&'static str, Vec<u8>)> {
    let mut repetitive = vec![0u8; PAGE_SIZE];
    for b in repetitive.iter_mut() {
        *b = b'A';
    }

    let mut gradient = vec![0u8; PAGE_SIZE];
    for (i, b) in gradient.iter_mut().enumerate() {
        *b = (i % 251) as u8;
    }

    vec![("zero", vec![0u8; PAGE_SIZE]), ("repetitive", repetitive), ("gradient", gradient)]
}

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_codecs");
    let config = RunConfig::default();

    #[allow(clippy::type_complexity)]
    let codecs: &[(&str, fn(&[u8], &RunConfig) -> memcomp::error::Result<memcomp::model::PageResult>)] = &[
        ("bdi", adapter::bdi_compress_page),
        ("bpc", adapter::bpc_compress_page),
        ("bpc_compresso", adapter::bpc_compresso_compress_page),
        ("cpack", adapter::cpack_compress_page),
        ("huffman1", adapter::huffman1_compress_page),
    ];

    for (page_name, page) in sample_pages() {
        group.throughput(Throughput::Bytes(PAGE_SIZE as u64));
        for (codec_name, compress) in codecs {
            group.bench_with_input(
                BenchmarkId::new(*codec_name, page_name),
                &page,
                |b, page| b.iter(|| compress(page, &config).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
