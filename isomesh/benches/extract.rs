use criterion::{
    BenchmarkId, Criterion, black_box, criterion_group, criterion_main,
};
use isomesh::{
    GridSize, ParallelExtractor, SequentialExtractor, Settings,
    field::{FieldSource, HeightField, SphereField},
};
use std::num::NonZeroUsize;

pub fn sphere_worker_sweep(c: &mut Criterion) {
    let grid = GridSize::cube(64);
    let field = FieldSource::Sphere(SphereField {
        radius: 1.5,
        spacing: 4.0 / 64.0,
    })
    .build(grid, None);

    let mut group = c.benchmark_group("speed vs workers (sphere, 64^3)");
    let settings = Settings {
        threads: None,
        ..Default::default()
    };
    let mut ex = SequentialExtractor::new();
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(ex.extract::<u32>(&field, &settings).unwrap()))
    });
    for workers in [1, 2, 4, 8, 16] {
        let settings = Settings {
            workers: NonZeroUsize::new(workers),
            ..Default::default()
        };
        let mut ex = ParallelExtractor::new(grid, &settings);
        group.bench_function(BenchmarkId::new("parallel", workers), |b| {
            b.iter(|| {
                black_box(ex.extract::<u32>(&field, &settings).unwrap().len())
            })
        });
    }
}

pub fn height_field_mesh(c: &mut Criterion) {
    let grid = GridSize::new(128, 48, 128);
    let field = FieldSource::Height(HeightField::default()).build(grid, None);

    let mut group = c.benchmark_group("speed vs workers (height field)");
    for workers in [1, 4, 8] {
        let settings = Settings {
            workers: NonZeroUsize::new(workers),
            ..Default::default()
        };
        group.bench_function(BenchmarkId::new("run", workers), |b| {
            b.iter(|| black_box(settings.run::<u32>(&field).unwrap()))
        });
    }
}

criterion_group!(benches, sphere_worker_sweep, height_field_mesh);
criterion_main!(benches);
