//! Triangle mesh processing toolkit.
//!
//! This umbrella crate re-exports all mesh-* crates, providing a unified API
//! for cleaning, cutting, simplifying, re-tessellating, texturing and saving
//! meshes. Every operation works in place on a single [`types::Mesh`] value.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! // Load a mesh
//! let mut mesh = mesh::io::load_mesh("scan.obj").unwrap();
//!
//! // Clean it up
//! discard_invalid(&mut mesh).unwrap();
//! merge_close_vertices(&mut mesh, &MergeParams::with_distance(1e-4)).unwrap();
//! discard_disconnected(&mut mesh).unwrap();
//!
//! // Keep the top half and give it smooth normals
//! let plane = Plane::new(Point3::origin(), Vector3::z()).unwrap();
//! let _bottom = cut(&mut mesh, &plane).unwrap();
//! generate_normals(&mut mesh).unwrap();
//!
//! // Save the result
//! mesh::io::save_mesh(&mesh, "top.glb").unwrap();
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - The `Mesh` container, `Vertex`, `Triangle`, `Plane`, `Aabb`
//! - [`spatial`] - Spatial index and ray/overlap collider
//! - [`io`] - cagemesh, OBJ and GLB persistence
//!
//! ## Cleanup
//! - [`repair`] - Invalid geometry, small faces, disconnected and occluded parts
//! - [`decimate`] - Close-vertex merging and planar simplification
//!
//! ## Cutting & Tessellation
//! - [`clip`] - Box and plane clipping, cutting, spatial chunking
//! - [`subdivide`] - Long-edge and intersection splitting
//!
//! ## Attributes
//! - [`transform`] - Similarity transforms, skinning, winding and normals
//! - [`texture`] - Texture-space rasterization and retexturing
//!
//! # Feature Flags
//!
//! - `serde` - Serialize meshes and parameter structs

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![doc(html_root_url = "https://docs.rs/mesh/0.7.0")]

// =============================================================================
// Re-exports
// =============================================================================

/// The `Mesh` container, `Vertex`, `Triangle`, `Plane`, `Aabb`.
pub use mesh_types as types;

/// Spatial index and ray/overlap collider.
pub use mesh_spatial as spatial;

/// cagemesh, OBJ and GLB persistence.
pub use mesh_io as io;

/// Invalid geometry, small faces, disconnected and occluded parts.
pub use mesh_repair as repair;

/// Close-vertex merging and planar simplification.
pub use mesh_decimate as decimate;

/// Box and plane clipping, cutting, spatial chunking.
pub use mesh_clip as clip;

/// Long-edge and intersection splitting.
pub use mesh_subdivide as subdivide;

/// Similarity transforms, skinning, winding and normal generation.
pub use mesh_transform as transform;

/// Texture-space rasterization and retexturing.
pub use mesh_texture as texture;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for mesh processing.
///
/// This module re-exports the most commonly used types and functions.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{
        Aabb, Mesh, MeshError, MeshResult, Plane, Point2, Point3, Topology, Triangle, Vector3,
        Vertex,
    };

    // I/O
    pub use mesh_io::{load_mesh, save_mesh, MeshFormat};

    // Cleanup
    pub use mesh_decimate::{merge_close_vertices, merge_planar, MergeParams, PlanarParams};
    pub use mesh_repair::{
        discard_disconnected, discard_invalid, remove_small, separate_disconnected,
    };

    // Cutting & tessellation
    pub use mesh_clip::{chunking, clip_box, clip_plane, cut, ChunkingParams};
    pub use mesh_subdivide::{split_long, SplitLongParams};

    // Attributes
    pub use mesh_transform::{apply_transform, flip_normals, generate_normals, Transform3D};
}

// =============================================================================
// Tests
// =============================================================================
