//! Spatial acceleration structures for mesh algorithms.
//!
//! - [`Bvh`] - median-split bounding volume hierarchy over boxed items
//! - [`SpatialIndex`] - id-keyed broad-phase index over points, boxes,
//!   spheres and triangles
//! - [`Collider`] - triangle soup with ray casts, box overlap and
//!   closest-triangle queries
//!
//! All queries are read-only and can be shared across rayon tasks.
//!
//! # Example
//!
//! ```
//! use mesh_spatial::{Collider, Ray};
//! use mesh_types::{shapes::tetrahedron, Point3, Vector3};
//!
//! let collider = Collider::from_mesh(&tetrahedron()).unwrap();
//! let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vector3::z());
//! let hit = collider.cast_ray(&ray, 10.0, true).unwrap();
//! assert!(hit.point.z.abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bvh;
mod collider;
mod index;

pub use bvh::{Bvh, DEFAULT_LEAF_SIZE, PARALLEL_BUILD_THRESHOLD};
pub use collider::{Collider, Ray, RayHit};
pub use index::{Shape, SpatialIndex};
