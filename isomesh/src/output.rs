//! Mesh output implementation
use crate::buffers::{MeshBuffers, MeshIndex};
use std::io::{BufWriter, Write};

impl<I: MeshIndex> MeshBuffers<I> {
    /// Writes a binary STL to the given output
    pub fn write_stl<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        // We're going to do many small writes and will typically be writing to
        // a file, so using a `BufWriter` saves excessive syscalls.
        let mut out = BufWriter::new(out);
        const HEADER: &[u8] = b"Binary STL exported by isomesh";
        static_assertions::const_assert!(HEADER.len() <= 80);
        out.write_all(HEADER)?;
        out.write_all(&[0u8; 80 - HEADER.len()])?;
        out.write_all(&(self.triangle_count() as u32).to_le_bytes())?;
        for [a, b, c] in self.triangles() {
            let normal = (b - a).cross(&(c - a));
            let normal = normal.try_normalize(f32::EPSILON).unwrap_or(normal);
            for p in normal.iter().chain(&a).chain(&b).chain(&c) {
                out.write_all(&p.to_le_bytes())?;
            }
            out.write_all(&[0u8; std::mem::size_of::<u16>()])?; // attributes
        }
        out.flush()?;
        Ok(())
    }

    /// Writes a Wavefront OBJ with positions and texture coordinates
    pub fn write_obj<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        let mut out = BufWriter::new(out);
        writeln!(out, "# exported by isomesh")?;
        for v in &self.vertices {
            let [x, y, z] = v.position;
            writeln!(out, "v {x} {y} {z}")?;
        }
        for v in &self.vertices {
            let [u, w] = v.uv;
            writeln!(out, "vt {u} {w}")?;
        }
        // OBJ indices are 1-based
        for t in self.indices.chunks_exact(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| i.to_usize() + 1);
            writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
        }
        out.flush()?;
        Ok(())
    }
}
