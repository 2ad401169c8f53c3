//! Data-parallel extraction
//!
//! The flat cell range is split into one contiguous chunk per worker.  Each
//! worker runs the solver on its own scratch slot (from a [`ScratchPool`]) and
//! appends self-contained [`Triangle`]s to a shared [`AppendBuffer`].  The
//! triangle order depends on scheduling, but the set of triangles does not.
//!
//! ```
//! use isomesh::{
//!     GridSize, Settings, assemble,
//!     field::{FieldSource, SphereField},
//!     parallel::ParallelExtractor,
//! };
//!
//! let grid = GridSize::cube(16);
//! let field = FieldSource::Sphere(SphereField::default()).build(grid, None);
//! let settings = Settings::default();
//!
//! let mut ex = ParallelExtractor::new(grid, &settings);
//! let triangles = ex.extract::<u32>(&field, &settings)?;
//! let mesh = assemble::<u32>(triangles, settings.invert_winding)?;
//! assert!(mesh.triangle_count() > 0);
//! # Ok::<(), isomesh::Error>(())
//! ```
mod append;
mod pool;

pub use append::AppendBuffer;
pub use pool::ScratchPool;

use crate::{
    Error,
    buffers::{MeshIndex, check_capacity},
    cell::CellSlot,
    config::Settings,
    field::ScalarField,
    grid::GridSize,
    solver::polygonise,
    types::Triangle,
};
use rayon::prelude::*;

/// Reusable parallel extraction session
///
/// Scratch slots and the output buffer are allocated up front, then reset
/// between runs.  They are only reallocated when the worker count or the
/// reserved triangle capacity changes.
#[derive(Debug, Default)]
pub struct ParallelExtractor {
    pool: ScratchPool,
    output: AppendBuffer<Triangle>,
}

impl ParallelExtractor {
    /// Allocates a session sized for the given grid and settings
    pub fn new(grid: GridSize, settings: &Settings) -> Self {
        let workers = settings.worker_count();
        let capacity = settings.triangle_capacity(grid);
        log::debug!(
            "allocating {workers} scratch slots and room for {capacity} \
             triangles"
        );
        Self {
            pool: ScratchPool::new(workers),
            output: AppendBuffer::new(capacity),
        }
    }

    /// Number of scratch slots
    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Number of triangles that fit in the output buffer
    pub fn capacity(&self) -> usize {
        self.output.capacity()
    }

    /// Extracts triangles from the given field
    ///
    /// `I` is the index type the triangles will be assembled into.  The
    /// reserved worst case is checked against it before anything is written,
    /// returning [`Error::CapacityExceeded`] if it cannot be addressed.
    ///
    /// The returned slice holds exactly the triangles emitted by this run.  If
    /// the workers produce more triangles than were reserved, this also
    /// returns [`Error::CapacityExceeded`].
    ///
    /// If `settings.threads` is `None`, the worker chunks are processed one
    /// after the other on the calling thread.
    pub fn extract<I: MeshIndex>(
        &mut self,
        field: &ScalarField,
        settings: &Settings,
    ) -> Result<&[Triangle], Error> {
        let grid = field.grid();
        let workers = settings.worker_count();
        let capacity = settings.triangle_capacity(grid);
        check_capacity::<I>(capacity.saturating_mul(3))?;
        if workers != self.workers() || capacity != self.capacity() {
            *self = Self::new(grid, settings);
        } else {
            self.reset();
        }
        if grid.is_degenerate() {
            return Ok(self.output.as_slice());
        }

        let chunk = grid.len().div_ceil(workers);
        let isolevel = settings.isolevel;
        let output = &self.output;
        let run = |(w, mut slot): (usize, CellSlot)| {
            let end = ((w + 1) * chunk).min(grid.len());
            for i in w * chunk..end {
                let Some(origin) = grid.cell_origin(i) else {
                    continue;
                };
                slot.fill(field, origin);
                polygonise(&mut slot, isolevel);
                for (k, t) in slot.triangles().iter().enumerate() {
                    // Failed pushes are still counted; overflow is reported
                    // once every worker is done.
                    let _ = output.push(Triangle {
                        vertices: *t,
                        uv_flip: k % 2 == 1,
                        valid: true,
                    });
                }
            }
        };
        let slots = self.pool.slots_mut();
        match settings.threads {
            None => slots.into_iter().enumerate().for_each(run),
            Some(p) => {
                p.run(|| slots.into_par_iter().enumerate().for_each(run))
            }
        }

        if self.output.overflowed() {
            let required = self.output.claimed();
            self.output.reset();
            return Err(Error::CapacityExceeded {
                required: required * 3,
                available: capacity * 3,
            });
        }
        log::trace!(
            "parallel extraction of {grid} on {workers} workers produced {} \
             triangles",
            self.output.len()
        );
        Ok(self.output.as_slice())
    }

    /// Clears scratch slots and the output buffer, keeping their allocations
    pub fn reset(&mut self) {
        self.pool.reset();
        self.output.reset();
    }

    /// Frees all scratch and output storage
    ///
    /// The next call to [`extract`](Self::extract) reallocates.
    pub fn release(&mut self) {
        self.pool.release();
        self.output = AppendBuffer::default();
    }
}
