use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vframe_plane::{Plane, PlaneSize, TransferChar};
use vframe_filters::gaussian::gaussian_blur;
use vframe_filters::nlmeans::{NlMeans, NlMeansConfig};

fn test_plane(size: PlaneSize) -> Plane {
    let data: Vec<u16> = (0..size.pixel_count())
        .map(|i| ((i * 31 + i / size.width * 7) % 256) as u16)
        .collect();
    Plane::new(size, 8, 0, 0, 255, TransferChar::Bt709, data).unwrap()
}

fn bench_gaussian(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recursive Gaussian");

    for (width, height) in [(256, 256), (1024, 1024)].iter() {
        for sigma in [1.5, 8.0].iter() {
            let parameter_string = format!("{}x{}x{}", width, height, sigma);
            group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

            let src = test_plane(PlaneSize {
                width: *width,
                height: *height,
            });
            let dst = src.clone();

            group.bench_with_input(
                BenchmarkId::new("gaussian_blur", &parameter_string),
                &(&src, &dst),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(gaussian_blur(&mut dst, src, *sigma)))
                },
            );
        }
    }

    group.finish();
}

fn bench_nlmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("NLMeans");
    group.sample_size(10);

    for (width, height) in [(128, 128), (256, 256)].iter() {
        let parameter_string = format!("{}x{}", width, height);
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let src = test_plane(PlaneSize {
            width: *width,
            height: *height,
        });
        let dst = src.clone();

        for correction in [false, true] {
            let filter = NlMeans::new(NlMeansConfig::with_sigma(8.0, correction));
            let name = if correction {
                "denoise_correction"
            } else {
                "denoise"
            };
            group.bench_with_input(
                BenchmarkId::new(name, &parameter_string),
                &(&src, &dst),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(filter.denoise(&mut dst, src, src)))
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_gaussian, bench_nlmeans);
criterion_main!(benches);
