//! Clipping, cutting and spatial chunking of triangle meshes.
//!
//! - [`clip_box`] keeps the part of a mesh inside an axis-aligned box,
//!   interpolating vertex attributes at the cut
//! - [`clip_plane`] and [`cut`] split a mesh along an arbitrary plane
//! - [`chunking`] divides a large mesh into pieces of bounded surface area
//!
//! The lower-level building blocks [`clip_add_point`], [`clip_triangles`]
//! and [`plane_cut`] are public as well; the tessellation crate uses
//! [`plane_cut`] to split long and intersecting triangles.
//!
//! Clipping never adds caps: a closed mesh clipped by a box is open where
//! the box cut it.
//!
//! # Example
//!
//! ```
//! use mesh_clip::{clip_box, cut};
//! use mesh_types::{shapes::unit_cube, Aabb, Plane, Point3, Vector3};
//!
//! let mut mesh = unit_cube();
//! clip_box(&mut mesh, &Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 0.5))).unwrap();
//!
//! let plane = Plane::new(Point3::new(0.5, 0.0, 0.0), Vector3::x()).unwrap();
//! let left = cut(&mut mesh, &plane).unwrap();
//! assert!(left.faces_count() > 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod chunk;
mod clip;
mod plane_cut;

pub use chunk::{chunking, ChunkingParams};
pub use clip::{clip_add_point, clip_box, clip_triangles};
pub use plane_cut::{clip_plane, cut, plane_cut, Fragments};
