//! Mesh validity repair, connectivity analysis and culling.
//!
//! This crate provides tools for:
//! - Removal of non-finite vertices, non-unit normals and degenerate faces
//! - Unused vertex removal
//! - Connected component analysis
//! - Removal of small faces
//! - Removal of triangles hidden inside the mesh (ray-cast occlusion)
//!
//! Every operation works in place on a [`mesh_types::Mesh`] and checks its
//! preconditions before touching the mesh.
//!
//! # Example
//!
//! ```
//! use mesh_repair::{discard_invalid, remove_small, separate_disconnected};
//! use mesh_types::shapes::unit_cube;
//!
//! let mut mesh = unit_cube();
//! let summary = discard_invalid(&mut mesh).unwrap();
//! println!("{summary}");
//!
//! remove_small(&mut mesh, 1e-3).unwrap();
//! let parts = separate_disconnected(&mesh).unwrap();
//! assert_eq!(parts.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod connectivity;
mod occlusion;
mod small;
mod validity;

pub use connectivity::{discard_disconnected, separate_disconnected};
pub use occlusion::{remove_occluded, OcclusionParams};
pub use small::remove_small;
pub use validity::{discard_invalid, remove_unused_vertices, valid_vertices, RepairSummary};
