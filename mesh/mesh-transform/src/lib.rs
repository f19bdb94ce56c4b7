//! Mesh transforms and normal operations.
//!
//! - [`Transform3D`] - similarity transform (uniform scale, rotation,
//!   translation) and [`apply_transform`] to move a whole mesh
//! - [`apply_skinning`] - bake bone poses into positions and directions
//! - [`flip_normals`] - reverse winding and normals
//! - [`duplicate_sides`] - make triangles visible from both sides
//! - [`generate_normals`] - smooth, area-weighted vertex normals
//!
//! # Example
//!
//! ```
//! use mesh_transform::{apply_transform, generate_normals, Transform3D};
//! use mesh_types::shapes::unit_cube;
//! use mesh_types::Vector3;
//!
//! let mut cube = unit_cube();
//! generate_normals(&mut cube)?;
//!
//! let t = Transform3D::rotation_axis(Vector3::z(), std::f64::consts::FRAC_PI_4)
//!     .then(&Transform3D::translation(0.0, 0.0, 5.0));
//! apply_transform(&mut cube, &t);
//! assert!((cube.signed_volume() - 1.0).abs() < 1e-9);
//! # Ok::<(), mesh_types::MeshError>(())
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod normals;
mod skinning;
mod transform;

pub use normals::{duplicate_sides, flip_normals, generate_normals};
pub use skinning::apply_skinning;
pub use transform::{apply_transform, Transform3D};
