//! Single-threaded extraction
use crate::{
    Error,
    buffers::{MeshBuffers, MeshIndex, MeshVertex, check_capacity},
    cell::Cell,
    config::Settings,
    field::ScalarField,
    solver::polygonise,
    tables::{UV_OFFSETS, UV_PATTERNS},
};

/// Extractor that walks every cell on the calling thread
///
/// The extractor owns a single scratch [`Cell`], which is reused for every
/// cell of every run.
#[derive(Clone, Debug, Default)]
pub struct SequentialExtractor {
    cell: Cell,
}

impl SequentialExtractor {
    /// Builds a new extractor
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts a mesh from the given field
    ///
    /// Vertices are written in table order, with indices reversed unless
    /// `settings.invert_winding` is set; the first triangle of each cell uses
    /// UV pattern 0, and patterns alternate after that.
    ///
    /// `settings.threads` and `settings.workers` are ignored.
    pub fn extract<I: MeshIndex>(
        &mut self,
        field: &ScalarField,
        settings: &Settings,
    ) -> Result<MeshBuffers<I>, Error> {
        let grid = field.grid();
        if grid.is_degenerate() {
            return Ok(MeshBuffers::new());
        }
        let capacity = settings.triangle_capacity(grid);
        check_capacity::<I>(capacity.saturating_mul(3))?;

        let order = if settings.invert_winding {
            [0, 1, 2]
        } else {
            [2, 1, 0]
        };
        let mut out = MeshBuffers::<I>::new();
        for i in 0..grid.len() {
            let Some(origin) = grid.cell_origin(i) else {
                continue;
            };
            let mut slot = self.cell.slot();
            slot.fill(field, origin);
            let n = polygonise(&mut slot, settings.isolevel);
            if out.triangle_count() + n > capacity {
                return Err(Error::CapacityExceeded {
                    required: (out.triangle_count() + n) * 3,
                    available: capacity * 3,
                });
            }
            for (k, tri) in slot.triangles().iter().enumerate() {
                let uv = &UV_PATTERNS[k % 2];
                let base = out.vertices.len();
                for (v, &u) in tri.iter().zip(uv) {
                    out.vertices.push(MeshVertex::new(v, UV_OFFSETS[u]));
                }
                out.indices
                    .extend(order.map(|o| I::from_usize(base + o)));
            }
        }
        log::trace!(
            "sequential extraction of {grid} produced {} triangles",
            out.triangle_count()
        );
        Ok(out)
    }

    /// Clears the scratch cell
    pub fn reset(&mut self) {
        self.cell.reset();
    }
}
