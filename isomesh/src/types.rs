//! Strongly-typed indexes and plain data types
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE};
use nalgebra::Vector3;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Strongly-typed cell corner, in the `0..8` range
///
/// Corner numbering follows the classic Bourke layout; see
/// [`CORNER_OFFSETS`] for the position of each corner.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Corner(u8);

impl Corner {
    /// Builds a new corner
    ///
    /// # Panics
    /// If `i >= 8`, which is not a valid corner index
    pub const fn new(i: u8) -> Self {
        assert!(i < 8);
        Self(i)
    }

    /// Returns the value of this corner as an index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over all 8 corners
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..8).map(Corner)
    }

    /// Integer offset of this corner from the cell origin
    pub fn offset(self) -> [usize; 3] {
        CORNER_OFFSETS[self.index()]
    }
}

/// Strongly-typed cell edge, in the `0..12` range
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Edge(u8);

impl Edge {
    /// Builds a new edge
    ///
    /// # Panics
    /// If `i >= 12`, which is not a valid edge index
    pub const fn new(i: u8) -> Self {
        assert!(i < 12);
        Self(i)
    }

    /// Returns the value of this edge as an index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over all 12 edges
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..12).map(Edge)
    }

    /// Returns the two corners joined by this edge
    pub fn corners(self) -> (Corner, Corner) {
        let [a, b] = EDGE_CORNERS[self.index()];
        (Corner(a), Corner(b))
    }
}

/// Cell configuration, as an 8-bit value representing inside corners
///
/// Bit `i` is set iff corner `i` has a density below the isolevel.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CellMask(u8);

impl CellMask {
    /// Builds a mask from its raw bits
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Classifies a set of 8 corner samples against the isolevel
    pub fn classify(corners: &[ScalarSample], isolevel: f32) -> Self {
        debug_assert_eq!(corners.len(), 8);
        let bits = corners
            .iter()
            .enumerate()
            .filter(|(_, s)| s.density < isolevel)
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        Self(bits)
    }

    /// Returns the mask as a table index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks whether the given corner is inside the surface
    pub fn contains(self, c: Corner) -> bool {
        self.0 & (1 << c.0) != 0
    }

    /// Returns the 12-bit mask of edges crossed by the surface
    pub fn edges(self) -> u16 {
        EDGE_TABLE[self.index()]
    }

    /// Checks whether the surface crosses the given edge
    pub fn crosses(self, e: Edge) -> bool {
        self.edges() & (1 << e.0) != 0
    }
}

/// A single density sample with its position
///
/// The layout is exactly four `f32` values, so a flat `&[f32]` of
/// `x, y, z, density` tuples can be reinterpreted in place.
#[repr(C)]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    IntoBytes,
    FromBytes,
    Immutable,
    KnownLayout,
)]
pub struct ScalarSample {
    /// Sample position
    pub position: [f32; 3],
    /// Scalar value at that position
    pub density: f32,
}
static_assertions::const_assert_eq!(std::mem::size_of::<ScalarSample>(), 16);

impl ScalarSample {
    /// Builds a new sample
    pub fn new(position: Vector3<f32>, density: f32) -> Self {
        Self {
            position: position.into(),
            density,
        }
    }

    /// Returns the position as a vector
    pub fn pos(&self) -> Vector3<f32> {
        Vector3::from(self.position)
    }
}

/// Self-contained triangle produced by the parallel extractor
///
/// Vertices are stored in table order; the drawing order is decided when the
/// triangle is assembled.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Triangle {
    /// Vertex positions, in table order
    pub vertices: [Vector3<f32>; 3],
    /// Selects the second UV pattern
    pub uv_flip: bool,
    /// Unset for placeholder entries, which are skipped during assembly
    pub valid: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mask_classification() {
        let mut corners = [ScalarSample::default(); 8];
        for (i, c) in corners.iter_mut().enumerate() {
            c.density = if i < 4 { 0.0 } else { 1.0 };
        }
        let m = CellMask::classify(&corners, 0.5);
        assert_eq!(m.index(), 0b0000_1111);
        assert!(m.contains(Corner::new(0)));
        assert!(!m.contains(Corner::new(7)));
        assert_eq!(m.edges(), 0xf00);
        assert!(m.crosses(Edge::new(8)));
        assert!(!m.crosses(Edge::new(0)));
    }

    #[test]
    fn isolevel_is_exclusive() {
        let corners = [ScalarSample {
            position: [0.0; 3],
            density: 0.5,
        }; 8];
        assert_eq!(CellMask::classify(&corners, 0.5).index(), 0);
    }

    #[test]
    fn edge_corners() {
        let (a, b) = Edge::new(8).corners();
        assert_eq!((a.index(), b.index()), (0, 4));
        for e in Edge::iter() {
            let (a, b) = e.corners();
            assert_ne!(a, b);
        }
        assert_eq!(Corner::new(6).offset(), [1, 1, 1]);
        assert_eq!(Corner::iter().count(), 8);
    }

    #[test]
    fn sample_layout() {
        let s = ScalarSample::new(Vector3::new(1.0, 2.0, 3.0), 4.0);
        let f = <[f32]>::ref_from_bytes(s.as_bytes()).unwrap();
        assert_eq!(f, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.pos(), Vector3::new(1.0, 2.0, 3.0));
    }
}
