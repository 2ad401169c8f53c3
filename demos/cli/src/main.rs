use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::info;
use nalgebra::{Vector2, Vector3};
use strum::IntoEnumIterator;

use isomesh::{
    GridSize, MeshBuffers, MeshIndex, ScalarField, Settings, ThreadPool,
    field::{FieldSource, HeightField, NoiseKind, SphereField},
};

/// Marching cubes mesher for synthetic scalar fields
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mesh a noise heightmap
    Height {
        #[clap(flatten)]
        field: HeightSettings,

        #[clap(flatten)]
        settings: MeshSettings,
    },
    /// Mesh a sphere centered in the grid
    Sphere {
        /// Sphere radius, in world units
        #[clap(short, long, default_value_t = 0.4)]
        radius: f32,

        /// Distance between samples, in world units
        #[clap(long, default_value_t = 1.0 / 64.0)]
        spacing: f32,

        #[clap(flatten)]
        settings: MeshSettings,
    },
}

#[derive(ValueEnum, Copy, Clone)]
enum Mode {
    Sequential,
    Parallel,
}

#[derive(ValueEnum, Copy, Clone)]
enum IndexWidth {
    U16,
    U32,
}

#[derive(Parser)]
struct HeightSettings {
    /// Noise generator
    #[clap(long, default_value_t = NoiseKind::Perlin)]
    noise: NoiseKind,

    /// Noise seed
    #[clap(long, default_value_t = 0)]
    seed: u32,

    /// Octave count for fractal noise
    #[clap(long, default_value_t = 4)]
    octaves: usize,

    /// Scale from normalized grid coordinates to noise coordinates
    #[clap(long, default_value_t = 4.0)]
    noise_scale: f32,

    /// Scale from normalized grid coordinates to positions, as `x,y,z`
    #[clap(
        long,
        num_args = 3,
        value_delimiter = ',',
        default_values_t = [1.0, 1.0, 1.0]
    )]
    position_scale: Vec<f32>,

    /// Offset in noise space, as `x,z`
    #[clap(
        long,
        num_args = 2,
        value_delimiter = ',',
        default_values_t = [0.0, 0.0]
    )]
    offset: Vec<f32>,

    /// Output density range, as `min,max`
    #[clap(
        long,
        num_args = 2,
        value_delimiter = ',',
        default_values_t = [0.0, 1.0]
    )]
    remap: Vec<f32>,
}

#[derive(Parser)]
struct MeshSettings {
    /// Samples along each axis, as `x,y,z`
    #[clap(
        short, long,
        num_args = 3,
        value_delimiter = ',',
        default_values_t = [64, 64, 64]
    )]
    grid: Vec<usize>,

    /// Density threshold for the surface
    #[clap(short, long, default_value_t = 0.5)]
    isolevel: f32,

    /// Draw triangles in table order
    #[clap(long)]
    invert: bool,

    /// Extractor flavor
    #[clap(short, long, value_enum, default_value_t = Mode::Parallel)]
    mode: Mode,

    /// Number of threads to use
    #[clap(short, long)]
    threads: Option<NonZeroUsize>,

    /// Number of scratch slots (defaults to the thread count)
    #[clap(short, long)]
    workers: Option<NonZeroUsize>,

    /// Number of triangles to reserve (defaults to 5 per cell)
    #[clap(long)]
    capacity: Option<usize>,

    /// Index buffer width
    #[clap(long, value_enum, default_value_t = IndexWidth::U32)]
    index: IndexWidth,

    /// Number of times to extract (for benchmarking)
    #[clap(short = 'N', default_value_t = 1)]
    n: usize,

    /// Name of a `.stl` or `.obj` file to write
    #[clap(short, long)]
    out: Option<PathBuf>,
}

impl MeshSettings {
    fn grid(&self) -> GridSize {
        GridSize::new(self.grid[0], self.grid[1], self.grid[2])
    }

    fn pool(&self) -> Result<Option<ThreadPool>> {
        Ok(match (self.mode, self.threads) {
            (Mode::Sequential, _) => None,
            (Mode::Parallel, Some(n)) => Some(ThreadPool::with_threads(n)?),
            (Mode::Parallel, None) => Some(ThreadPool::Global),
        })
    }
}

fn run_mesh<I: MeshIndex>(
    field: &ScalarField,
    settings: &MeshSettings,
    threads: Option<&ThreadPool>,
) -> Result<MeshBuffers<I>> {
    let cfg = Settings {
        isolevel: settings.isolevel,
        invert_winding: settings.invert,
        threads,
        workers: settings.workers,
        capacity: settings.capacity,
    };
    let mut mesh = MeshBuffers::new();
    for _ in 0..settings.n {
        mesh = cfg.run(field)?;
    }
    Ok(mesh)
}

fn save<I: MeshIndex>(mesh: &MeshBuffers<I>, out: &Path) -> Result<()> {
    let ext = out.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut file = std::fs::File::create(out)?;
    match ext.to_ascii_lowercase().as_str() {
        "stl" => {
            info!("Writing STL to {out:?}");
            mesh.write_stl(&mut file)?;
        }
        "obj" => {
            info!("Writing OBJ to {out:?}");
            mesh.write_obj(&mut file)?;
        }
        _ => bail!("unknown output format {ext:?} (expected .stl or .obj)"),
    }
    Ok(())
}

fn run<I: MeshIndex>(
    field: &ScalarField,
    settings: &MeshSettings,
    threads: Option<&ThreadPool>,
) -> Result<()> {
    let start = Instant::now();
    let mesh = run_mesh::<I>(field, settings, threads)?;
    info!(
        "Extracted {}x at {:?} ms/iter",
        settings.n,
        start.elapsed().as_micros() as f64 / 1000.0 / (settings.n as f64)
    );
    info!(
        "Mesh has {} triangles and {} vertices",
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    if let Some(out) = &settings.out {
        let start = Instant::now();
        save(&mesh, out)?;
        info!("Wrote mesh in {:?}", start.elapsed());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    let (source, settings) = match args.cmd {
        Command::Height { field, settings } => {
            let h = HeightField {
                noise: field.noise,
                seed: field.seed,
                octaves: field.octaves,
                position_scale: Vector3::from_column_slice(
                    &field.position_scale,
                ),
                noise_scale: field.noise_scale,
                offset: Vector2::from_column_slice(&field.offset),
                remap: Vector2::from_column_slice(&field.remap),
            };
            (FieldSource::Height(h), settings)
        }
        Command::Sphere {
            radius,
            spacing,
            settings,
        } => (FieldSource::Sphere(SphereField { radius, spacing }), settings),
    };
    if let FieldSource::Height(h) = &source {
        let kinds: Vec<_> = NoiseKind::iter().map(|k| k.to_string()).collect();
        info!("Using {} noise (available: {})", h.noise, kinds.join(", "));
    }

    let pool = settings.pool()?;
    let threads = pool.as_ref();
    let grid = settings.grid();

    let start = Instant::now();
    let field = source.build(grid, threads);
    info!("Built {grid} field in {:?}", start.elapsed());

    match settings.index {
        IndexWidth::U16 => run::<u16>(&field, &settings, threads),
        IndexWidth::U32 => run::<u32>(&field, &settings, threads),
    }
}
