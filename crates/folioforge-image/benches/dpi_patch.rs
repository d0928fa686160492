//! Benchmarks for the JFIF and pHYs density patchers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folioforge_image::dpi::{crc32, inject_jfif_dpi, inject_phys};
use folioforge_image::encode::{encode, OutputKind};
use image::{Rgba, RgbaImage};

fn sample(kind: OutputKind) -> Vec<u8> {
    let img = RgbaImage::from_fn(512, 512, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255]));
    encode(&img, kind, 72, 90).expect("encode sample")
}

fn bench_jfif(c: &mut Criterion) {
    let jpeg = sample(OutputKind::Jpeg);
    c.bench_function("inject_jfif_dpi/512x512", |b| {
        b.iter(|| inject_jfif_dpi(black_box(&jpeg), black_box(96)))
    });
}

fn bench_phys(c: &mut Criterion) {
    let png = sample(OutputKind::Png);
    c.bench_function("inject_phys/512x512", |b| {
        b.iter(|| inject_phys(black_box(&png), black_box(96)))
    });
}

fn bench_crc(c: &mut Criterion) {
    let data = vec![0xA5u8; 64 * 1024];
    c.bench_function("crc32/64KiB", |b| b.iter(|| crc32(black_box(&data))));
}

criterion_group!(benches, bench_jfif, bench_phys, bench_crc);
criterion_main!(benches);
