//! Extraction settings and thread pool selection
use crate::{
    Error,
    assemble::assemble,
    buffers::{MeshBuffers, MeshIndex, check_capacity},
    field::ScalarField,
    grid::GridSize,
    parallel::ParallelExtractor,
    sequential::SequentialExtractor,
    tables::MAX_TRIANGLES,
};
use std::num::NonZeroUsize;

/// Thread pool to use for multithreaded extraction
///
/// Most users will use the global Rayon pool, but it's possible to provide your
/// own as well.
pub enum ThreadPool {
    /// User-provided pool
    Custom(rayon::ThreadPool),
    /// Global Rayon pool
    Global,
}

impl ThreadPool {
    /// Builds a custom pool with the given number of threads
    pub fn with_threads(
        n: NonZeroUsize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n.get())
            .build()
            .map(ThreadPool::Custom)
    }

    /// Runs a function across the thread pool
    pub fn run<F: FnOnce() -> V + Send, V: Send>(&self, f: F) -> V {
        match self {
            ThreadPool::Custom(p) => p.install(f),
            ThreadPool::Global => f(),
        }
    }

    /// Returns the number of threads in the pool
    pub fn thread_count(&self) -> usize {
        match self {
            ThreadPool::Custom(p) => p.current_num_threads(),
            ThreadPool::Global => rayon::current_num_threads(),
        }
    }
}

/// Settings for a single extraction
#[derive(Copy, Clone)]
pub struct Settings<'a> {
    /// Density threshold; corners below it are inside the surface
    pub isolevel: f32,

    /// Draw triangles in table order instead of reversed table order
    pub invert_winding: bool,

    /// Thread pool to use for extraction
    ///
    /// If this is `None`, the sequential extractor is used; otherwise, the
    /// parallel extractor runs on the provided pool.
    pub threads: Option<&'a ThreadPool>,

    /// Number of scratch slots (and contiguous work chunks)
    ///
    /// Defaults to the pool's thread count.
    pub workers: Option<NonZeroUsize>,

    /// Number of triangles to reserve
    ///
    /// Defaults to the worst case of 5 triangles per cell.
    pub capacity: Option<usize>,
}

impl Default for Settings<'_> {
    fn default() -> Self {
        Self {
            isolevel: 0.5,
            invert_winding: false,
            threads: Some(&ThreadPool::Global),
            workers: None,
            capacity: None,
        }
    }
}

impl Settings<'_> {
    /// Returns the number of scratch slots to use
    pub fn worker_count(&self) -> usize {
        match (self.workers, self.threads) {
            (Some(n), _) => n.get(),
            (None, Some(p)) => p.thread_count().max(1),
            (None, None) => 1,
        }
    }

    /// Returns the number of triangles to reserve for the given grid
    pub fn triangle_capacity(&self, grid: GridSize) -> usize {
        self.capacity
            .unwrap_or_else(|| grid.cell_count().saturating_mul(MAX_TRIANGLES))
    }

    /// Extracts a mesh from the given field in a one-shot session
    ///
    /// The worst-case vertex count is checked against the index width before
    /// any buffer is allocated.
    pub fn run<I: MeshIndex>(
        &self,
        field: &ScalarField,
    ) -> Result<MeshBuffers<I>, Error> {
        match self.threads {
            None => SequentialExtractor::new().extract(field, self),
            Some(_) => {
                let grid = field.grid();
                check_capacity::<I>(
                    self.triangle_capacity(grid).saturating_mul(3),
                )?;
                let mut ex = ParallelExtractor::new(grid, self);
                let triangles = ex.extract::<I>(field, self)?;
                assemble(triangles, self.invert_winding)
            }
        }
    }
}
