//! Texture-space rasterization and retexturing.
//!
//! [`generate_texture`] walks every texel a mesh's texture coordinates
//! cover and reports which triangle covers it and where. [`retexture`]
//! builds on it to bake images from one mesh onto the texture layout of
//! another, typically a simplified or re-unwrapped copy of the same
//! surface.
//!
//! Images are `image::ImageBuffer`s with `f32` channels; any pixel type
//! with one to four channels works.
//!
//! # Example
//!
//! ```
//! use mesh_texture::generate_texture;
//! use mesh_types::{Mesh, Point2, Point3, Topology};
//!
//! let mut mesh = Mesh::from_positions(
//!     Topology::Triangles,
//!     vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
//! );
//! mesh.set_uvs(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)])?;
//!
//! let mut positions = Vec::new();
//! generate_texture(&mesh, 16, 16, |texel| positions.push(texel.interpolate(mesh.positions())))?;
//! assert!(!positions.is_empty());
//! # Ok::<(), mesh_types::MeshError>(())
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod raster;
mod retexture;

pub use raster::{generate_texture, TexelSample};
pub use retexture::{retexture, sample_bilinear, RetextureParams, Texture};
