//! Core mesh types.
//!
//! This crate provides the data model shared by every mesh algorithm crate:
//!
//! - [`Mesh`] - points, lines or triangles with per-vertex attribute arrays
//!   and an optional index buffer
//! - [`Vertex`] - one vertex's full attribute tuple
//! - [`Triangle`], [`Line`], [`Plane`], [`Aabb`], [`Sphere`] - geometric primitives
//! - [`DisjointSets`] - union-find used by the connectivity algorithms
//! - [`MeshError`] - the error type returned by every mesh operation
//! - [`fan_out`] - index-ordered data-parallel task execution
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Coordinate System
//!
//! Right-handed. Face winding is **counter-clockwise (CCW) when viewed from
//! outside**; normals point outward by the right-hand rule.
//!
//! # Indexed and Expanded Meshes
//!
//! A mesh with an empty index buffer is *expanded*: every `arity`
//! consecutive vertices form one face. Otherwise faces are read from the
//! index buffer. [`Mesh::convert_to_indexed`] and
//! [`Mesh::convert_to_expanded`] switch between the two layouts without
//! changing the geometry.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Mesh, Point3, Topology};
//!
//! let mut mesh = Mesh::from_indexed(
//!     Topology::Triangles,
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     vec![0, 1, 2],
//! )
//! .unwrap();
//!
//! assert_eq!(mesh.faces_count(), 1);
//! mesh.convert_to_expanded();
//! assert!(!mesh.is_indexed());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod error;
mod indexing;
mod mesh;
mod parallel;
mod plane;
pub mod shapes;
mod triangle;
mod union_find;
mod vertex;

pub use bounds::{Aabb, Sphere};
pub use error::{require_non_negative, require_positive, MeshError, MeshResult};
pub use mesh::{Mesh, TexCoords, Topology};
pub use parallel::fan_out;
pub use plane::Plane;
pub use triangle::{Line, Triangle, DEGENERATE_AREA, DEGENERATE_LENGTH};
pub use union_find::DisjointSets;
pub use vertex::{BoneBinding, TexCoord, Vertex, VertexAttributes};

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, UnitQuaternion, Vector2, Vector3, Vector4};
