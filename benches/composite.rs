use backdrop::{CompositorConfig, Frame, FrameProcessor, Mask, MaskCompositor, Timestamp, WeightMode};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};

fn bench_composite(c: &mut Criterion) {
    let (w, h) = (640u32, 360u32);
    let frame = Frame::rgb(
        Timestamp(0),
        RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128])),
    );
    let values = (0..h)
        .flat_map(|y| (0..w).map(move |x| if (x as i64 - 320).pow(2) + (y as i64 - 180).pow(2) < 120 * 120 { 1.0 } else { 0.0 }))
        .collect();
    let mask = Mask::normalized(w, h, values).expect("mask");
    let background = DynamicImage::ImageRgb8(RgbImage::from_pixel(1280, 720, Rgb([0, 0, 255])));

    let mut group = c.benchmark_group("composite_640x360");
    for mode in [WeightMode::Independent, WeightMode::Complementary] {
        let config = CompositorConfig {
            weight_mode: mode,
            ..CompositorConfig::default()
        };
        let mut compositor = MaskCompositor::with_background(background.clone(), config).expect("compositor");
        group.bench_function(format!("{mode:?}"), |b| {
            b.iter(|| compositor.process(black_box(&frame), black_box(&mask)).expect("composite"))
        });
    }
    group.finish();

    c.bench_function("composite_uncached_640x360", |b| {
        b.iter(|| {
            backdrop::composite(black_box(&frame), black_box(&mask), &background, &CompositorConfig::default())
                .expect("composite")
        })
    });
}

criterion_group!(benches, bench_composite);
criterion_main!(benches);
