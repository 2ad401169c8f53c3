//! Marching cubes over dense scalar grids
//!
//! This crate converts a regular 3D grid of density samples into a triangle
//! mesh, using the classic table-driven marching cubes algorithm.  Extraction
//! can run on a single thread ([`SequentialExtractor`]) or as a fork/join pass
//! across a Rayon pool ([`ParallelExtractor`]); both produce the same set of
//! triangles, with the same winding and texture coordinates.
//!
//! The usual entry point is [`Settings::run`], which picks an extractor based
//! on [`Settings::threads`]:
//!
//! ```
//! use isomesh::{GridSize, Settings, field::{FieldSource, SphereField}};
//!
//! let grid = GridSize::cube(16);
//! let field = FieldSource::Sphere(SphereField::default()).build(grid, None);
//!
//! // Parallel extraction on the global pool
//! let mesh = Settings::default().run::<u32>(&field)?;
//!
//! // Sequential extraction
//! let settings = Settings { threads: None, ..Default::default() };
//! let same = settings.run::<u32>(&field)?;
//! assert_eq!(mesh.triangle_count(), same.triangle_count());
//!
//! // Open a file to write, e.g.
//! // let mut f = std::fs::File::create("out.stl")?;
//! # let mut f = vec![];
//! mesh.write_stl(&mut f)?;
//! # Ok::<(), isomesh::Error>(())
//! ```
//!
//! Sessions can also be driven directly, which lets a [`ParallelExtractor`]
//! keep its scratch storage and output buffer between runs.
#![warn(missing_docs)]

mod assemble;
mod buffers;
mod cell;
mod config;
mod error;
mod grid;
mod output;
mod sequential;
mod solver;

pub mod field;
pub mod parallel;
pub mod tables;
pub mod types;

pub use assemble::assemble;
pub use buffers::{MeshBuffers, MeshIndex, MeshVertex, cast_slice};
pub use cell::{Cell, CellSlot};
pub use config::{Settings, ThreadPool};
pub use error::Error;
pub use field::ScalarField;
pub use grid::GridSize;
pub use parallel::ParallelExtractor;
pub use sequential::SequentialExtractor;
pub use solver::{EPSILON, polygonise, vertex_interp};
