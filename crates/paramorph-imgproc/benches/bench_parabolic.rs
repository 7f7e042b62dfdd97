use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paramorph_image::Image;
use paramorph_imgproc::kernel::{
    parabolic_line_brute_force, parabolic_line_with, LineScratch, MorphMode, ParabolicAlgorithm,
};
use paramorph_imgproc::morphology::{MorphOp, ParabolicFilter, ParabolicParams};
use paramorph_imgproc::parallel::ExecutionStrategy;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_samples(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.random_range(0.0..255.0)).collect()
}

fn bench_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("ParabolicLine");

    for len in [256, 1024] {
        let line = random_samples(len);
        group.throughput(Throughput::Elements(len as u64));

        for curvature in [0.01, 10.0] {
            let parameter_string = format!("{len}/c={curvature}");

            for (name, algorithm) in [
                ("intersection", ParabolicAlgorithm::Intersection),
                ("contact_point", ParabolicAlgorithm::ContactPoint),
            ] {
                group.bench_with_input(
                    BenchmarkId::new(name, &parameter_string),
                    &line,
                    |b, l| {
                        let mut scratch = LineScratch::with_capacity(len);
                        let mut work = l.clone();
                        b.iter(|| {
                            work.copy_from_slice(l);
                            parabolic_line_with(
                                &mut work,
                                curvature,
                                MorphMode::Erode,
                                algorithm,
                                &mut scratch,
                            );
                            black_box(&work);
                        })
                    },
                );
            }

            if len <= 256 {
                group.bench_with_input(
                    BenchmarkId::new("brute_force", &parameter_string),
                    &line,
                    |b, l| {
                        b.iter(|| {
                            black_box(parabolic_line_brute_force(l, curvature, MorphMode::Erode))
                        })
                    },
                );
            }
        }
    }

    group.finish();
}

fn bench_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("ParabolicImage");

    for (width, height) in [(256, 224), (512, 448)] {
        let image = Image::<f32, 2>::new(
            [height, width],
            random_samples(width * height)
                .into_iter()
                .map(|v| v as f32)
                .collect(),
        )
        .unwrap();
        group.throughput(Throughput::Elements((width * height) as u64));
        let parameter_string = format!("{width}x{height}");

        for (name, strategy) in [
            ("serial", ExecutionStrategy::Serial),
            ("parallel", ExecutionStrategy::Parallel),
        ] {
            let filter =
                ParabolicFilter::new(ParabolicParams::uniform(4.0, 2).with_strategy(strategy))
                    .unwrap();

            group.bench_with_input(
                BenchmarkId::new(format!("erode_{name}"), &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(filter.apply(i, MorphOp::Erode))),
            );

            group.bench_with_input(
                BenchmarkId::new(format!("open_{name}"), &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(filter.apply(i, MorphOp::Open))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_line, bench_image);
criterion_main!(benches);
