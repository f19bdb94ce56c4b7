//! Tessellation quality: splitting long and intersecting triangles.
//!
//! - [`split_long`] bisects long, thin triangles across their longest edge
//!   until every triangle is compact or short enough
//! - [`split_intersecting`] cuts triangles along the planes of the
//!   triangles that pass through them, so that intersections run along
//!   edges afterwards
//!
//! Both work on triangle soups and produce expanded meshes.
//!
//! # Examples
//!
//! ```
//! use mesh_subdivide::{split_intersecting, split_long, SplitIntersectingParams, SplitLongParams};
//! use mesh_types::shapes::uv_sphere;
//!
//! let mut sphere = uv_sphere(1.0, 32, 4);
//! let summary = split_long(&mut sphere, &SplitLongParams::default())?;
//! println!("{summary}");
//!
//! split_intersecting(&mut sphere, &SplitIntersectingParams::default())?;
//! # Ok::<(), mesh_types::MeshError>(())
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod params;
mod result;
mod soup;
mod split_intersecting;
mod split_long;

pub use params::{SplitIntersectingParams, SplitLongParams, MIN_RATIO};
pub use result::SplitSummary;
pub use split_intersecting::split_intersecting;
pub use split_long::split_long;
