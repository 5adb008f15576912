//! Benchmarks for the per-image stages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fundus_prep::{clahe::clahe, BackgroundRemover, ContrastEnhancer, FundusProcessor};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

fn fundus(size: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(size, size, Rgb([5, 4, 3]));
    let center = ((size / 2) as i32, (size / 2) as i32);
    draw_filled_circle_mut(&mut image, center, (size / 2 - 8) as i32, Rgb([180, 90, 40]));
    image
}

fn bench_clahe(c: &mut Criterion) {
    let mut group = c.benchmark_group("clahe");
    for size in [256u32, 512] {
        let image = GrayImage::from_fn(size, size, |x, y| Luma([((x ^ y) & 0xff) as u8]));
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| clahe(black_box(image), 1.5, 8, 8));
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let image = fundus(512);
    let enhancer = ContrastEnhancer::default();
    let remover = BackgroundRemover::default();
    let processor = FundusProcessor::default();

    c.bench_function("enhance_512", |b| b.iter(|| enhancer.enhance(black_box(&image))));
    c.bench_function("remove_background_512", |b| {
        b.iter(|| remover.remove_background(black_box(&image)));
    });
    c.bench_function("process_image_512", |b| {
        b.iter(|| processor.process_image(black_box(&image)));
    });
}

criterion_group!(benches, bench_clahe, bench_stages);
criterion_main!(benches);
