//! Conversion from triangle lists to mesh buffers
use crate::{
    Error,
    buffers::{MeshBuffers, MeshIndex, MeshVertex, check_capacity},
    tables::{UV_OFFSETS, UV_PATTERNS},
    types::Triangle,
};

/// Expands a list of triangles into vertex and index buffers
///
/// Each valid triangle gets three fresh vertices, written in drawing order:
/// reversed table order by default, or table order when `invert_winding` is
/// set.  Texture coordinates stay attached to the table-order vertex they
/// were assigned to.  Invalid triangles are skipped.
///
/// The vertex count is checked against the index width before anything is
/// written.
pub fn assemble<I: MeshIndex>(
    triangles: &[Triangle],
    invert_winding: bool,
) -> Result<MeshBuffers<I>, Error> {
    check_capacity::<I>(triangles.len() * 3)?;

    let mut out = MeshBuffers::with_capacity(triangles.len());
    for tri in triangles.iter().filter(|t| t.valid) {
        let uv = &UV_PATTERNS[tri.uv_flip as usize];
        let base = out.vertices.len();
        for t in 0..3 {
            let src = if invert_winding { t } else { 2 - t };
            out.vertices.push(MeshVertex::new(
                &tri.vertices[src],
                UV_OFFSETS[uv[src]],
            ));
            out.indices.push(I::from_usize(base + t));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector3;

    fn tri(i: usize, uv_flip: bool) -> Triangle {
        let o = i as f32;
        Triangle {
            vertices: [
                Vector3::new(o, 0.0, 0.0),
                Vector3::new(o, 1.0, 0.0),
                Vector3::new(o, 0.0, 1.0),
            ],
            uv_flip,
            valid: true,
        }
    }

    #[test]
    fn indices_stay_in_block() {
        let tris: Vec<_> = (0..10).map(|i| tri(i, i % 2 == 1)).collect();
        let mesh = assemble::<u32>(&tris, false).unwrap();
        assert_eq!(mesh.indices().len(), 30);
        assert_eq!(mesh.vertex_count(), 30);
        for (b, block) in mesh.indices().chunks_exact(3).enumerate() {
            for &i in block {
                assert!((i as usize) < mesh.vertex_count());
                assert_eq!(i as usize / 3, b);
            }
        }
    }

    #[test]
    fn winding() {
        let t = tri(0, false);
        let mesh = assemble::<u16>(&[t], false).unwrap();
        let drawn = mesh.triangle_vertices().next().unwrap();
        assert_eq!(drawn[0].pos(), t.vertices[2]);
        assert_eq!(drawn[2].pos(), t.vertices[0]);
        assert_eq!(drawn[0].uv, UV_OFFSETS[UV_PATTERNS[0][2]]);

        let mesh = assemble::<u16>(&[t], true).unwrap();
        let drawn = mesh.triangle_vertices().next().unwrap();
        assert_eq!(drawn[0].pos(), t.vertices[0]);
        assert_eq!(drawn[0].uv, UV_OFFSETS[0]);
    }

    #[test]
    fn flipped_uvs() {
        let mesh = assemble::<u16>(&[tri(0, true)], true).unwrap();
        let uvs: Vec<_> = mesh.vertices().iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    }

    #[test]
    fn invalid_triangles_are_skipped() {
        let tris = [tri(0, false), Triangle::default(), tri(2, false)];
        let mesh = assemble::<u16>(&tris, false).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn index_overflow() {
        let tris = vec![tri(0, false); 21846];
        let r = assemble::<u16>(&tris, false);
        assert!(matches!(
            r,
            Err(Error::CapacityExceeded {
                required: 65538,
                available: 65535
            })
        ));
        assert!(assemble::<u32>(&tris, false).is_ok());
    }
}
