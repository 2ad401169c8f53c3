//! Integration tests comparing sequential and parallel extraction
use isomesh::{
    Error, GridSize, MeshBuffers, MeshIndex, ScalarField, Settings, ThreadPool,
    field::{FieldSource, HeightField, NoiseKind, SphereField},
    types::ScalarSample,
};
use ordered_float::OrderedFloat;
use std::num::NonZeroUsize;

type Key = [[OrderedFloat<f32>; 5]; 3];

/// Collects drawn triangles (position and uv of each corner) as sortable keys
fn drawn<I: MeshIndex>(mesh: &MeshBuffers<I>) -> Vec<Key> {
    let mut out: Vec<Key> = mesh
        .triangle_vertices()
        .map(|t| {
            t.map(|v| {
                let [x, y, z] = v.position;
                let [u, w] = v.uv;
                [x, y, z, u, w].map(OrderedFloat)
            })
        })
        .collect();
    out.sort();
    out
}

fn sequential() -> Settings<'static> {
    Settings {
        threads: None,
        ..Default::default()
    }
}

fn check_same_triangles(field: &ScalarField, isolevel: f32) {
    for invert_winding in [false, true] {
        let seq = Settings {
            isolevel,
            invert_winding,
            ..sequential()
        }
        .run::<u32>(field)
        .unwrap();
        assert!(seq.triangle_count() > 0);
        let expected = drawn(&seq);

        for workers in [1, 2, 3, 8, 13] {
            let par = Settings {
                isolevel,
                invert_winding,
                workers: NonZeroUsize::new(workers),
                ..Default::default()
            }
            .run::<u32>(field)
            .unwrap();
            assert_eq!(par.triangle_count(), seq.triangle_count());
            assert_eq!(
                drawn(&par),
                expected,
                "mismatch with {workers} workers"
            );
        }
    }
}

#[test]
fn sphere_sequential_matches_parallel() {
    let grid = GridSize::cube(17);
    let field = FieldSource::Sphere(SphereField::default()).build(grid, None);
    check_same_triangles(&field, 0.5);
}

#[test]
fn height_field_sequential_matches_parallel() {
    for noise in [NoiseKind::Perlin, NoiseKind::Fbm] {
        let h = HeightField {
            noise,
            seed: 42,
            ..HeightField::default()
        };
        let grid = GridSize::new(20, 12, 16);
        let field = FieldSource::Height(h)
            .build(grid, Some(&ThreadPool::Global));
        check_same_triangles(&field, 0.3);
    }
}

#[test]
fn sphere_vertices_lie_near_surface() {
    let s = SphereField {
        radius: 1.0,
        spacing: 0.125,
    };
    let grid = GridSize::cube(25);
    let field = s.build(grid, None);
    let mesh = Settings::default().run::<u32>(&field).unwrap();
    let center = nalgebra::Vector3::repeat(1.5);
    for v in mesh.vertices() {
        let r = (v.pos() - center).norm();
        assert!((r - 1.0).abs() < 0.05, "vertex at radius {r}");
    }
}

#[test]
fn single_cell_plane() {
    let grid = GridSize::cube(2);
    let densities = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
    let samples = (0..8)
        .map(|i| {
            let [x, y, z] = grid.coord(i);
            ScalarSample {
                position: [x as f32, y as f32, z as f32],
                density: densities[z * 4 + y * 2 + x],
            }
        })
        .collect();
    let field = ScalarField::new(grid, samples).unwrap();
    for settings in [sequential(), Settings::default()] {
        let mesh = settings.run::<u16>(&field).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        for v in mesh.vertices() {
            assert_eq!(v.position[2], 0.5);
        }
    }
}

#[test]
fn flat_field_is_empty() {
    let grid = GridSize::new(6, 5, 4);
    let field = ScalarField::from_fn(grid, None, |[x, y, z]| ScalarSample {
        position: [x as f32, y as f32, z as f32],
        density: 0.0,
    });
    for settings in [sequential(), Settings::default()] {
        let mesh = settings.run::<u16>(&field).unwrap();
        assert!(mesh.is_empty());
    }
}

#[test]
fn degenerate_grid_is_empty() {
    let grid = GridSize::new(3, 1, 1);
    let data = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 1.0];
    let field = ScalarField::from_flat(grid, &data).unwrap();
    for settings in [sequential(), Settings::default()] {
        assert!(settings.run::<u16>(&field).unwrap().is_empty());
    }
}

#[test]
fn worst_case_exceeds_u16() {
    let grid = GridSize::cube(32);
    let field = FieldSource::Sphere(SphereField::default()).build(grid, None);
    for settings in [sequential(), Settings::default()] {
        let r = settings.run::<u16>(&field);
        assert!(
            matches!(r, Err(Error::CapacityExceeded { available: 65535, .. })),
            "{r:?}"
        );
        assert!(settings.run::<u32>(&field).is_ok());
    }
}
