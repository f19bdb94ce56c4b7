//! Vertex welding and planar simplification.
//!
//! Two merge operations reduce redundant geometry without moving the
//! surface:
//!
//! - [`merge_close_vertices`] welds vertices closer than a distance
//!   threshold, either by remapping indices or by moving them together
//! - [`merge_planar`] collapses vertices inside flat regions and along
//!   straight boundaries, removing triangles that add no shape
//!
//! Both report a [`MergeSummary`] and drop faces that collapse.
//!
//! # Example
//!
//! ```
//! use mesh_decimate::{merge_close_vertices, merge_planar, MergeParams, PlanarParams};
//! use mesh_types::shapes::unit_cube;
//!
//! let mut cube = unit_cube();
//! cube.convert_to_expanded();
//!
//! let welded = merge_close_vertices(&mut cube, &MergeParams::default()).unwrap();
//! println!("{welded}");
//!
//! let planar = merge_planar(&mut cube, &PlanarParams::default()).unwrap();
//! assert_eq!(planar.faces_after, 12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod merge;
mod params;
mod planar;
mod result;

pub use merge::merge_close_vertices;
pub use params::{MergeParams, PlanarParams};
pub use planar::merge_planar;
pub use result::MergeSummary;
