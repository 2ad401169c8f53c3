//! Interleaved vertex and index buffers
use crate::Error;
use nalgebra::Vector3;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Interleaved vertex, ready for upload to a renderer
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
pub struct MeshVertex {
    /// Vertex position
    pub position: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
}
static_assertions::const_assert_eq!(std::mem::size_of::<MeshVertex>(), 20);

impl MeshVertex {
    /// Builds a new vertex
    pub fn new(position: &Vector3<f32>, uv: [f32; 2]) -> Self {
        Self {
            position: (*position).into(),
            uv,
        }
    }

    /// Returns the position as a vector
    pub fn pos(&self) -> Vector3<f32> {
        Vector3::from(self.position)
    }
}

/// Integer type usable in an index buffer
pub trait MeshIndex:
    Copy + Send + Sync + std::fmt::Debug + IntoBytes + Immutable + 'static
{
    /// Largest number of vertices addressable with this index type
    const MAX: usize;

    /// Converts from a vertex offset
    ///
    /// The offset must be below [`MeshIndex::MAX`]; this is checked before any
    /// buffer is written.
    fn from_usize(i: usize) -> Self;

    /// Converts back into a vertex offset
    fn to_usize(self) -> usize;
}

macro_rules! mesh_index {
    ($t:ty) => {
        impl MeshIndex for $t {
            const MAX: usize = <$t>::MAX as usize;
            fn from_usize(i: usize) -> Self {
                debug_assert!(i <= <Self as MeshIndex>::MAX);
                i as $t
            }
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}
mesh_index!(u16);
mesh_index!(u32);

/// Checks that `vertices` can be addressed by index type `I`
pub(crate) fn check_capacity<I: MeshIndex>(
    vertices: usize,
) -> Result<(), Error> {
    if vertices > I::MAX {
        Err(Error::CapacityExceeded {
            required: vertices,
            available: I::MAX,
        })
    } else {
        Ok(())
    }
}

/// Indexed triangle mesh with interleaved vertices
///
/// Every triangle owns three consecutive vertices; indices never refer to a
/// vertex outside of their own 3-vertex block.
#[derive(Clone, Debug)]
pub struct MeshBuffers<I> {
    pub(crate) vertices: Vec<MeshVertex>,
    pub(crate) indices: Vec<I>,
}

impl<I> Default for MeshBuffers<I> {
    fn default() -> Self {
        Self {
            vertices: vec![],
            indices: vec![],
        }
    }
}

impl<I: MeshIndex> MeshBuffers<I> {
    /// Builds an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an empty mesh with room for `triangles` triangles
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Vertex buffer
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Index buffer
    pub fn indices(&self) -> &[I] {
        &self.indices
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Checks whether the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw bytes of the vertex buffer
    pub fn vertex_bytes(&self) -> &[u8] {
        self.vertices.as_bytes()
    }

    /// Raw bytes of the index buffer
    pub fn index_bytes(&self) -> &[u8] {
        self.indices.as_bytes()
    }

    /// Iterates over triangles as vertex positions, in drawing order
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [t[0], t[1], t[2]].map(|i| self.vertices[i.to_usize()].pos())
        })
    }

    /// Iterates over triangles as full vertices, in drawing order
    pub fn triangle_vertices(
        &self,
    ) -> impl Iterator<Item = [MeshVertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [t[0], t[1], t[2]].map(|i| self.vertices[i.to_usize()])
        })
    }

    /// Empties the mesh, keeping its allocations
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// Reinterprets a slice as a slice of another plain-data type
///
/// Returns [`Error::SizeMismatch`] if the byte length does not divide into
/// whole `U` values, or [`Error::Misaligned`] if the data is not aligned for
/// `U`.
pub fn cast_slice<T, U>(data: &[T]) -> Result<&[U], Error>
where
    T: IntoBytes + Immutable,
    U: FromBytes + Immutable + KnownLayout,
{
    let bytes = data.as_bytes();
    let size = std::mem::size_of::<U>();
    if size == 0 || bytes.len() % size != 0 {
        return Err(Error::SizeMismatch {
            len: bytes.len(),
            size,
        });
    }
    <[U]>::ref_from_bytes(bytes).map_err(|_| Error::Misaligned {
        align: std::mem::align_of::<U>(),
    })
}
