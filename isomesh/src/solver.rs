//! Per-cell marching cubes solver
use crate::{
    cell::CellSlot,
    tables::{TRI_END, TRI_TABLE},
    types::{CellMask, Edge, ScalarSample},
};
use nalgebra::Vector3;
use std::cmp::Ordering;

/// Tolerance used when comparing densities during interpolation
pub const EPSILON: f32 = 1e-5;

/// Triangulates a single cell
///
/// Corners must already be gathered into the slot.  Returns the number of
/// triangles written (0 to 5), which is also stored in the slot.  Edge
/// vertices are only computed for edges that the surface crosses; the rest of
/// the edge storage is left untouched and never read.
pub fn polygonise(cell: &mut CellSlot, isolevel: f32) -> usize {
    let mask = CellMask::classify(cell.corners, isolevel);
    let edges = mask.edges();
    if edges == 0 {
        *cell.count = 0;
        return 0;
    }

    for e in Edge::iter().filter(|e| mask.crosses(*e)) {
        let (a, b) = e.corners();
        cell.edge_verts[e.index()] = vertex_interp(
            isolevel,
            &cell.corners[a.index()],
            &cell.corners[b.index()],
        );
    }

    let mut n = 0;
    for tri in TRI_TABLE[mask.index()].chunks_exact(3) {
        if tri[0] == TRI_END {
            break;
        }
        cell.triangles[n] = [
            cell.edge_verts[tri[0] as usize],
            cell.edge_verts[tri[1] as usize],
            cell.edge_verts[tri[2] as usize],
        ];
        n += 1;
    }
    *cell.count = n;
    n
}

/// Finds the point along an edge where the density crosses the isolevel
///
/// The two samples are put into a canonical order before interpolating, so
/// swapping the arguments gives a bitwise-identical result.
pub fn vertex_interp(
    isolevel: f32,
    a: &ScalarSample,
    b: &ScalarSample,
) -> Vector3<f32> {
    let (p1, p2) = match canonical_order(a, b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    let (d1, d2) = (p1.density, p2.density);
    if (isolevel - d1).abs() < EPSILON {
        p1.pos()
    } else if (isolevel - d2).abs() < EPSILON {
        p2.pos()
    } else if (d1 - d2).abs() < EPSILON {
        p1.pos()
    } else {
        let t = (isolevel - d1) / (d2 - d1);
        p1.pos() + (p2.pos() - p1.pos()) * t
    }
}

/// Orders samples by density, then by position
fn canonical_order(a: &ScalarSample, b: &ScalarSample) -> Ordering {
    a.density.total_cmp(&b.density).then_with(|| {
        a.position
            .iter()
            .zip(&b.position)
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}
