//! Scalar fields and field synthesis
//!
//! A [`ScalarField`] is a dense grid of [`ScalarSample`] values in row-major
//! order.  Fields can be built from existing samples, from a flat `f32`
//! buffer, from a closure, or from one of the built-in [`FieldSource`]s.
//!
//! ```
//! use isomesh::{GridSize, field::{FieldSource, SphereField}};
//!
//! let grid = GridSize::cube(8);
//! let field = FieldSource::Sphere(SphereField::default()).build(grid, None);
//! assert_eq!(field.samples().len(), grid.len());
//! ```
use crate::{
    Error,
    buffers::cast_slice,
    config::ThreadPool,
    grid::GridSize,
    types::ScalarSample,
};
use nalgebra::{Vector2, Vector3};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin, Simplex, Worley};
use rayon::prelude::*;

/// Dense grid of scalar samples
#[derive(Clone, Debug, Default)]
pub struct ScalarField {
    grid: GridSize,
    samples: Vec<ScalarSample>,
}

impl ScalarField {
    /// Wraps a sample vector, checking its length against the grid
    pub fn new(
        grid: GridSize,
        samples: Vec<ScalarSample>,
    ) -> Result<Self, Error> {
        if samples.len() != grid.len() {
            return Err(Error::BadFieldLength {
                expected: grid.len(),
                actual: samples.len(),
            });
        }
        Ok(Self { grid, samples })
    }

    /// Copies a flat buffer of `x, y, z, density` tuples into a field
    pub fn from_flat(grid: GridSize, data: &[f32]) -> Result<Self, Error> {
        let samples: &[ScalarSample] = cast_slice(data)?;
        Self::new(grid, samples.to_vec())
    }

    /// Builds a field by evaluating `f` at every grid coordinate
    ///
    /// If `threads` is `None`, the field is filled on the calling thread;
    /// otherwise, Z slabs are filled in parallel on the given pool.
    pub fn from_fn<F>(
        grid: GridSize,
        threads: Option<&ThreadPool>,
        f: F,
    ) -> Self
    where
        F: Fn([usize; 3]) -> ScalarSample + Send + Sync,
    {
        Self::from_fn_init(grid, threads, || (), |_, c| f(c))
    }

    /// Builds a field with per-worker state
    ///
    /// `init` is called once per unit of parallel work (or once in total,
    /// when running on a single thread); its result is passed to `f`.
    pub fn from_fn_init<T, INIT, F>(
        grid: GridSize,
        threads: Option<&ThreadPool>,
        init: INIT,
        f: F,
    ) -> Self
    where
        INIT: Fn() -> T + Send + Sync,
        F: Fn(&mut T, [usize; 3]) -> ScalarSample + Send + Sync,
    {
        let mut samples = vec![ScalarSample::default(); grid.len()];
        if samples.is_empty() {
            return Self { grid, samples };
        }
        let slab = grid.x * grid.y;
        let fill = |state: &mut T, (z, out): (usize, &mut [ScalarSample])| {
            for (i, s) in out.iter_mut().enumerate() {
                *s = f(state, [i % grid.x, i / grid.x, z]);
            }
        };
        match threads {
            None => {
                let mut state = init();
                samples
                    .chunks_mut(slab)
                    .enumerate()
                    .for_each(|chunk| fill(&mut state, chunk));
            }
            Some(p) => p.run(|| {
                samples
                    .par_chunks_mut(slab)
                    .enumerate()
                    .for_each_init(&init, fill)
            }),
        }
        Self { grid, samples }
    }

    /// Returns the grid size
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Returns all samples, in row-major order
    pub fn samples(&self) -> &[ScalarSample] {
        &self.samples
    }

    /// Returns the sample at the given coordinate
    pub fn sample(&self, c: [usize; 3]) -> &ScalarSample {
        &self.samples[self.grid.index(c)]
    }

    /// Reinterprets the samples as a flat `f32` buffer
    pub fn as_flat(&self) -> Result<&[f32], Error> {
        cast_slice(self.samples.as_slice())
    }

    /// Consumes the field, returning its samples
    pub fn into_samples(self) -> Vec<ScalarSample> {
        self.samples
    }
}

/// Noise generator used by a [`HeightField`]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum NoiseKind {
    /// Gradient noise
    #[default]
    Perlin,
    /// Simplex noise
    Simplex,
    /// Worley (cellular) noise
    Cellular,
    /// Fractal sum of Perlin octaves
    Fbm,
}

impl NoiseKind {
    /// Builds a 2D noise function with the given seed
    ///
    /// `octaves` only applies to [`NoiseKind::Fbm`].
    pub fn build(self, seed: u32, octaves: usize) -> Box<dyn NoiseFn<f64, 2>> {
        match self {
            NoiseKind::Perlin => Box::new(Perlin::new(seed)),
            NoiseKind::Simplex => Box::new(Simplex::new(seed)),
            NoiseKind::Cellular => Box::new(Worley::new(seed)),
            NoiseKind::Fbm => Box::new(
                Fbm::<Perlin>::new(seed).set_octaves(octaves.clamp(1, 32)),
            ),
        }
    }
}

/// Terrain-like field whose surface is a noise heightmap
///
/// The density at normalized coordinate `n` (in `[0, 1]` on each axis) is the
/// noise value at `noise_scale * (n.xz + offset)`, rescaled to `[0, 1]` and
/// multiplied by `n.y`, then remapped to `remap` and clamped to `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightField {
    /// Noise generator
    pub noise: NoiseKind,
    /// Noise seed
    pub seed: u32,
    /// Octave count, for fractal noise
    pub octaves: usize,
    /// Scale from normalized coordinates to sample positions
    pub position_scale: Vector3<f32>,
    /// Scale from normalized coordinates to noise coordinates
    pub noise_scale: f32,
    /// Offset applied in noise space (before scaling)
    pub offset: Vector2<f32>,
    /// Output range for the density
    pub remap: Vector2<f32>,
}

impl Default for HeightField {
    fn default() -> Self {
        Self {
            noise: NoiseKind::Perlin,
            seed: 0,
            octaves: 4,
            position_scale: Vector3::repeat(1.0),
            noise_scale: 4.0,
            offset: Vector2::zeros(),
            remap: Vector2::new(0.0, 1.0),
        }
    }
}

impl HeightField {
    /// Samples the height field across the given grid
    pub fn build(
        &self,
        grid: GridSize,
        threads: Option<&ThreadPool>,
    ) -> ScalarField {
        let size = Vector3::new(grid.x, grid.y, grid.z).map(|v| v as f32);
        ScalarField::from_fn_init(
            grid,
            threads,
            || self.noise.build(self.seed, self.octaves),
            |noise, [x, y, z]| {
                let n = Vector3::new(x as f32, y as f32, z as f32)
                    .component_div(&size);
                let loc =
                    (Vector2::new(n.x, n.z) + self.offset) * self.noise_scale;
                let raw = noise.get([loc.x as f64, loc.y as f64]) as f32;
                let d = (raw + 1.0) / 2.0 * n.y;
                let d = self.remap.x + d * (self.remap.y - self.remap.x);
                ScalarSample {
                    position: self.position_scale.component_mul(&n).into(),
                    density: d.clamp(0.0, 1.0),
                }
            },
        )
    }
}

/// Distance field of a sphere centered in the grid
///
/// Densities are `|p - center| / (2 * radius)`, so the surface sits at an
/// isolevel of 0.5 with the inside below it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphereField {
    /// Sphere radius, in world units
    pub radius: f32,
    /// Distance between adjacent samples, in world units
    pub spacing: f32,
}

impl Default for SphereField {
    fn default() -> Self {
        Self {
            radius: 0.4,
            spacing: 0.125,
        }
    }
}

impl SphereField {
    /// Samples the sphere across the given grid
    ///
    /// The sphere is centered on the middle of the grid.
    pub fn build(
        &self,
        grid: GridSize,
        threads: Option<&ThreadPool>,
    ) -> ScalarField {
        let center = Vector3::new(grid.x, grid.y, grid.z)
            .map(|v| v.saturating_sub(1) as f32 * self.spacing / 2.0);
        let scale = 1.0 / (2.0 * self.radius);
        ScalarField::from_fn(grid, threads, |[x, y, z]| {
            let p = Vector3::new(x as f32, y as f32, z as f32) * self.spacing;
            ScalarSample::new(p, (p - center).norm() * scale)
        })
    }
}

/// Built-in field generators
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FieldSource {
    /// Noise heightmap
    Height(HeightField),
    /// Sphere distance field
    Sphere(SphereField),
}

impl FieldSource {
    /// Samples this source across the given grid
    pub fn build(
        &self,
        grid: GridSize,
        threads: Option<&ThreadPool>,
    ) -> ScalarField {
        match self {
            FieldSource::Height(h) => h.build(grid, threads),
            FieldSource::Sphere(s) => s.build(grid, threads),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn length_mismatch() {
        let grid = GridSize::new(2, 2, 2);
        let r = ScalarField::new(grid, vec![ScalarSample::default(); 7]);
        assert!(matches!(
            r,
            Err(Error::BadFieldLength {
                expected: 8,
                actual: 7
            })
        ));
        let samples = vec![ScalarSample::default(); 8];
        assert!(ScalarField::new(grid, samples).is_ok());
    }

    #[test]
    fn flat_round_trip() {
        let grid = GridSize::new(2, 1, 1);
        let data = [0.0, 1.0, 2.0, 0.25, 3.0, 4.0, 5.0, 0.75];
        let field = ScalarField::from_flat(grid, &data).unwrap();
        assert_eq!(field.sample([1, 0, 0]).position, [3.0, 4.0, 5.0]);
        assert_eq!(field.sample([0, 0, 0]).density, 0.25);
        assert_eq!(field.as_flat().unwrap(), &data);

        let r = ScalarField::from_flat(grid, &data[..4]);
        assert!(matches!(r, Err(Error::BadFieldLength { .. })));
        let r = ScalarField::from_flat(grid, &data[..6]);
        assert!(matches!(r, Err(Error::SizeMismatch { len: 24, size: 16 })));
    }

    #[test]
    fn parallel_fill_matches_sequential() {
        let grid = GridSize::new(5, 4, 3);
        let f = |[x, y, z]: [usize; 3]| ScalarSample {
            position: [x as f32, y as f32, z as f32],
            density: (x * 100 + y * 10 + z) as f32,
        };
        let a = ScalarField::from_fn(grid, None, f);
        let b = ScalarField::from_fn(grid, Some(&ThreadPool::Global), f);
        assert_eq!(a.samples(), b.samples());
        assert_eq!(a.sample([4, 3, 2]).density, 432.0);
    }

    #[test]
    fn height_field_range() {
        for noise in NoiseKind::iter() {
            let h = HeightField {
                noise,
                seed: 7,
                ..HeightField::default()
            };
            let grid = GridSize::new(9, 6, 9);
            let field = h.build(grid, Some(&ThreadPool::Global));
            for s in field.samples() {
                assert!((0.0..=1.0).contains(&s.density), "{noise}: {s:?}");
            }
            // The bottom layer has n.y = 0, so it is always empty
            for x in 0..grid.x {
                assert_eq!(field.sample([x, 0, 0]).density, 0.0);
            }
            let top = field.sample([8, 5, 8]);
            assert_relative_eq!(top.position[0], 8.0 / 9.0);
            assert_relative_eq!(top.position[1], 5.0 / 6.0);
        }
    }

    #[test]
    fn height_field_is_deterministic() {
        let h = HeightField {
            noise: NoiseKind::Fbm,
            seed: 3,
            ..HeightField::default()
        };
        let grid = GridSize::cube(6);
        let a = h.build(grid, None);
        let b = h.build(grid, Some(&ThreadPool::Global));
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn sphere_field() {
        let s = SphereField {
            radius: 1.0,
            spacing: 0.5,
        };
        let field = s.build(GridSize::cube(5), None);
        assert_relative_eq!(field.sample([2, 2, 2]).density, 0.0);
        assert_relative_eq!(field.sample([4, 2, 2]).density, 0.5);
        assert_eq!(field.sample([4, 2, 2]).position, [2.0, 1.0, 1.0]);
    }

    #[test]
    fn noise_kind_names() {
        assert_eq!(NoiseKind::Cellular.to_string(), "cellular");
        assert_eq!("fbm".parse::<NoiseKind>().unwrap(), NoiseKind::Fbm);
    }
}
