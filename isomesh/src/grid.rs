//! Dense grid dimensions and flat indexing
//!
//! Samples are stored in row-major order with `x` varying fastest, so the
//! sample at `(x, y, z)` lives at `z * (sx * sy) + y * sx + x`.

/// Dimensions of a dense sample grid
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct GridSize {
    /// Number of samples along the X axis
    pub x: usize,
    /// Number of samples along the Y axis
    pub y: usize,
    /// Number of samples along the Z axis
    pub z: usize,
}

impl GridSize {
    /// Builds a new grid size
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Builds a cubic grid with `n` samples per axis
    pub const fn cube(n: usize) -> Self {
        Self::new(n, n, n)
    }

    /// Total number of samples
    pub const fn len(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Checks whether the grid contains no samples at all
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether any axis is too short to contain a cell
    ///
    /// Degenerate grids produce empty meshes.
    pub const fn is_degenerate(&self) -> bool {
        self.x < 2 || self.y < 2 || self.z < 2
    }

    /// Number of cells, which is one less than the sample count on each axis
    pub const fn cell_count(&self) -> usize {
        self.x.saturating_sub(1)
            * self.y.saturating_sub(1)
            * self.z.saturating_sub(1)
    }

    /// Converts a 3D coordinate into a flat offset
    #[inline]
    pub const fn index(&self, [x, y, z]: [usize; 3]) -> usize {
        debug_assert!(x < self.x && y < self.y && z < self.z);
        z * (self.x * self.y) + y * self.x + x
    }

    /// Converts a flat offset into a 3D coordinate
    #[inline]
    pub const fn coord(&self, i: usize) -> [usize; 3] {
        [i % self.x, (i / self.x) % self.y, i / (self.x * self.y)]
    }

    /// Returns the coordinate of flat index `i` if it is the origin of a cell
    ///
    /// Samples on the last index of any axis have no cell extending past them
    /// and return `None`.
    #[inline]
    pub const fn cell_origin(&self, i: usize) -> Option<[usize; 3]> {
        let c = self.coord(i);
        if c[0] + 1 >= self.x || c[1] + 1 >= self.y || c[2] + 1 >= self.z {
            None
        } else {
            Some(c)
        }
    }

    /// Iterates over every cell origin, in flat index order
    pub fn cell_origins(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (0..self.len()).filter_map(|i| self.cell_origin(i))
    }
}

impl From<[usize; 3]> for GridSize {
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_coord_bijection() {
        let g = GridSize::new(3, 4, 5);
        for i in 0..g.len() {
            assert_eq!(g.index(g.coord(i)), i);
        }
        assert_eq!(g.index([2, 3, 4]), g.len() - 1);
        assert_eq!(g.coord(1), [1, 0, 0]);
        assert_eq!(g.coord(3), [0, 1, 0]);
        assert_eq!(g.coord(12), [0, 0, 1]);
    }

    #[test]
    fn boundary_samples_are_skipped() {
        let g = GridSize::new(3, 2, 2);
        let origins: Vec<_> = g.cell_origins().collect();
        assert_eq!(origins, vec![[0, 0, 0], [1, 0, 0]]);
        assert_eq!(origins.len(), g.cell_count());

        let g = GridSize::new(4, 3, 5);
        assert_eq!(g.cell_origins().count(), 3 * 2 * 4);
    }

    #[test]
    fn degenerate_grids() {
        assert!(GridSize::new(3, 1, 1).is_degenerate());
        assert_eq!(GridSize::new(3, 1, 1).cell_count(), 0);
        assert_eq!(GridSize::new(3, 1, 1).cell_origins().count(), 0);
        assert!(GridSize::new(0, 0, 0).is_empty());
        assert!(!GridSize::cube(2).is_degenerate());
        assert_eq!(GridSize::cube(2).cell_count(), 1);
    }
}
