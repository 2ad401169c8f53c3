//! Per-cell scratch state
//!
//! The solver never owns its scratch memory: it works through a [`CellSlot`],
//! which borrows the corner, edge and triangle storage for one cell.  A
//! [`Cell`] owns that storage outright (for the sequential extractor), while
//! the parallel extractor hands out slots carved from shared backing arrays.
use crate::{
    field::ScalarField,
    tables::MAX_TRIANGLES,
    types::{Corner, ScalarSample},
};
use nalgebra::Vector3;

/// Owned scratch storage for a single cell
#[derive(Clone, Debug)]
pub struct Cell {
    corners: [ScalarSample; 8],
    edge_verts: [Vector3<f32>; 12],
    triangles: [[Vector3<f32>; 3]; MAX_TRIANGLES],
    count: usize,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            corners: [ScalarSample::default(); 8],
            edge_verts: [Vector3::zeros(); 12],
            triangles: [[Vector3::zeros(); 3]; MAX_TRIANGLES],
            count: 0,
        }
    }
}

impl Cell {
    /// Builds an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows this cell's storage as a slot
    pub fn slot(&mut self) -> CellSlot<'_> {
        CellSlot::new(
            &mut self.corners,
            &mut self.edge_verts,
            &mut self.triangles,
            &mut self.count,
        )
    }

    /// Clears the triangle count
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Exclusive view of one cell's scratch storage
///
/// Slices are exactly 8, 12 and [`MAX_TRIANGLES`] entries long.
#[derive(Debug)]
pub struct CellSlot<'a> {
    pub(crate) corners: &'a mut [ScalarSample],
    pub(crate) edge_verts: &'a mut [Vector3<f32>],
    pub(crate) triangles: &'a mut [[Vector3<f32>; 3]],
    pub(crate) count: &'a mut usize,
}

impl<'a> CellSlot<'a> {
    pub(crate) fn new(
        corners: &'a mut [ScalarSample],
        edge_verts: &'a mut [Vector3<f32>],
        triangles: &'a mut [[Vector3<f32>; 3]],
        count: &'a mut usize,
    ) -> Self {
        assert_eq!(corners.len(), 8);
        assert_eq!(edge_verts.len(), 12);
        assert_eq!(triangles.len(), MAX_TRIANGLES);
        Self {
            corners,
            edge_verts,
            triangles,
            count,
        }
    }

    /// Gathers the 8 corner samples of the cell whose origin is `origin`
    ///
    /// The origin must not lie on the last index of any axis.
    pub fn fill(&mut self, field: &ScalarField, origin: [usize; 3]) {
        let grid = field.grid();
        let samples = field.samples();
        for c in Corner::iter() {
            let [dx, dy, dz] = c.offset();
            let [x, y, z] = origin;
            let i = grid.index([x + dx, y + dy, z + dz]);
            self.corners[c.index()] = samples[i];
        }
    }

    /// Corner samples, in Bourke order
    pub fn corners(&self) -> &[ScalarSample] {
        &*self.corners
    }

    /// Mutable corner samples, for callers that gather corners themselves
    pub fn corners_mut(&mut self) -> &mut [ScalarSample] {
        &mut *self.corners
    }

    /// Triangles produced by the last solver run
    pub fn triangles(&self) -> &[[Vector3<f32>; 3]] {
        &self.triangles[..*self.count]
    }

    /// Number of triangles produced by the last solver run
    pub fn count(&self) -> usize {
        *self.count
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::GridSize;

    #[test]
    fn fill_gathers_bourke_corners() {
        let grid = GridSize::new(3, 3, 3);
        let field = ScalarField::from_fn(grid, None, |[x, y, z]| {
            ScalarSample {
                position: [x as f32, y as f32, z as f32],
                density: grid.index([x, y, z]) as f32,
            }
        });
        let mut cell = Cell::new();
        let mut slot = cell.slot();
        slot.fill(&field, [1, 0, 1]);
        for c in Corner::iter() {
            let [dx, dy, dz] = c.offset();
            let s = slot.corners()[c.index()];
            let expected = [1 + dx, dy, 1 + dz].map(|v| v as f32);
            assert_eq!(s.position, expected);
        }
        assert_eq!(slot.corners()[2].position, [2.0, 1.0, 1.0]);
        assert_eq!(slot.count(), 0);
        assert!(slot.triangles().is_empty());
    }
}
