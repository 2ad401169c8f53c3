//! Per-worker scratch storage
use crate::{cell::CellSlot, tables::MAX_TRIANGLES, types::ScalarSample};
use nalgebra::Vector3;

/// Scratch cells for a fixed number of workers
///
/// Storage is kept as four flat arrays (corners, edge vertices, triangles and
/// counts), with worker `w` owning entries `w * stride .. (w + 1) * stride` of
/// each.  [`ScratchPool::slots_mut`] splits those arrays into disjoint
/// [`CellSlot`]s, so no two workers can ever see the same entry.
#[derive(Clone, Debug, Default)]
pub struct ScratchPool {
    corners: Vec<ScalarSample>,
    edge_verts: Vec<Vector3<f32>>,
    triangles: Vec<[Vector3<f32>; 3]>,
    counts: Vec<usize>,
}

impl ScratchPool {
    /// Allocates scratch storage for `workers` workers
    pub fn new(workers: usize) -> Self {
        Self {
            corners: vec![ScalarSample::default(); workers * 8],
            edge_verts: vec![Vector3::zeros(); workers * 12],
            triangles: vec![[Vector3::zeros(); 3]; workers * MAX_TRIANGLES],
            counts: vec![0; workers],
        }
    }

    /// Number of workers with a slot in this pool
    pub fn workers(&self) -> usize {
        self.counts.len()
    }

    /// Splits the pool into one exclusive slot per worker
    pub fn slots_mut(&mut self) -> Vec<CellSlot<'_>> {
        self.corners
            .chunks_exact_mut(8)
            .zip(self.edge_verts.chunks_exact_mut(12))
            .zip(self.triangles.chunks_exact_mut(MAX_TRIANGLES))
            .zip(self.counts.iter_mut())
            .map(|(((c, e), t), n)| CellSlot::new(c, e, t, n))
            .collect()
    }

    /// Clears every slot's triangle count, keeping the allocation
    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    /// Frees all storage; the pool has zero workers afterwards
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slots_are_disjoint() {
        let mut pool = ScratchPool::new(4);
        assert_eq!(pool.workers(), 4);
        {
            let mut slots = pool.slots_mut();
            assert_eq!(slots.len(), 4);
            for (w, slot) in slots.iter_mut().enumerate() {
                for s in slot.corners_mut() {
                    s.density = w as f32;
                }
                *slot.count = w;
            }
        }
        for (w, chunk) in pool.corners.chunks_exact(8).enumerate() {
            assert!(chunk.iter().all(|s| s.density == w as f32));
        }
        assert_eq!(pool.counts, vec![0, 1, 2, 3]);

        pool.reset();
        assert!(pool.counts.iter().all(|&n| n == 0));
        assert_eq!(pool.workers(), 4);

        pool.release();
        assert_eq!(pool.workers(), 0);
        assert!(pool.slots_mut().is_empty());
    }
}
