//! A single vertex with its full attribute tuple.

use nalgebra::{Point2, Point3, Vector3, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MeshError, MeshResult};

/// A texture coordinate, two- or three-dimensional.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TexCoord {
    /// 2D texture coordinate.
    Uv(Point2<f64>),
    /// 3D texture coordinate (texture arrays, volume textures).
    Uv3(Point3<f64>),
}

/// Skinning data: four bone ids with their weights.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoneBinding {
    /// Bone ids.
    pub indices: [u32; 4],
    /// Bone weights, expected to sum to one.
    pub weights: Vector4<f64>,
}

/// Optional per-vertex attributes.
///
/// Direction attributes (normal, tangent, bitangent) are expected to be unit
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexAttributes {
    /// Surface normal.
    pub normal: Option<Vector3<f64>>,
    /// Tangent direction.
    pub tangent: Option<Vector3<f64>>,
    /// Bitangent direction.
    pub bitangent: Option<Vector3<f64>>,
    /// Texture coordinate.
    pub uv: Option<TexCoord>,
    /// Skinning data.
    pub bones: Option<BoneBinding>,
}

/// A vertex: position plus optional attributes.
///
/// # Example
///
/// ```
/// use mesh_types::{Vertex, Point3, Vector3};
///
/// let v = Vertex::from_coords(1.0, 2.0, 3.0).with_normal(Vector3::z());
/// assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
/// assert!(v.attributes.normal.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position.
    pub position: Point3<f64>,
    /// Optional attributes.
    pub attributes: VertexAttributes,
}

impl Vertex {
    /// Create a vertex with no attributes.
    #[inline]
    #[must_use]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: VertexAttributes::default(),
        }
    }

    /// Create a vertex from coordinates.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Set the normal.
    #[must_use]
    pub const fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.attributes.normal = Some(normal);
        self
    }

    /// Set the tangent.
    #[must_use]
    pub const fn with_tangent(mut self, tangent: Vector3<f64>) -> Self {
        self.attributes.tangent = Some(tangent);
        self
    }

    /// Set the bitangent.
    #[must_use]
    pub const fn with_bitangent(mut self, bitangent: Vector3<f64>) -> Self {
        self.attributes.bitangent = Some(bitangent);
        self
    }

    /// Set a 2D texture coordinate.
    #[must_use]
    pub const fn with_uv(mut self, uv: Point2<f64>) -> Self {
        self.attributes.uv = Some(TexCoord::Uv(uv));
        self
    }

    /// Set a 3D texture coordinate.
    #[must_use]
    pub const fn with_uv3(mut self, uv: Point3<f64>) -> Self {
        self.attributes.uv = Some(TexCoord::Uv3(uv));
        self
    }

    /// Set the skinning data.
    #[must_use]
    pub const fn with_bones(mut self, indices: [u32; 4], weights: Vector4<f64>) -> Self {
        self.attributes.bones = Some(BoneBinding { indices, weights });
        self
    }

    /// Interpolate between two vertices at parameter `t`.
    ///
    /// Positions and texture coordinates are interpolated linearly.
    /// Direction attributes are interpolated and renormalized. An attribute
    /// missing on either side is missing in the result.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] when either vertex carries bone
    /// data, which has no meaningful interpolation.
    pub fn lerp(a: &Self, b: &Self, t: f64) -> MeshResult<Self> {
        if a.attributes.bones.is_some() || b.attributes.bones.is_some() {
            return Err(MeshError::validation(
                "interpolate vertex",
                "bone indices and weights cannot be interpolated",
            ));
        }
        let dir = |x: Option<Vector3<f64>>, y: Option<Vector3<f64>>| {
            let (x, y) = (x?, y?);
            let v = x.lerp(&y, t);
            Some(v.try_normalize(f64::MIN_POSITIVE).unwrap_or(v))
        };
        let uv = match (a.attributes.uv, b.attributes.uv) {
            (Some(TexCoord::Uv(x)), Some(TexCoord::Uv(y))) => {
                Some(TexCoord::Uv(Point2::from(x.coords.lerp(&y.coords, t))))
            }
            (Some(TexCoord::Uv3(x)), Some(TexCoord::Uv3(y))) => {
                Some(TexCoord::Uv3(Point3::from(x.coords.lerp(&y.coords, t))))
            }
            _ => None,
        };
        Ok(Self {
            position: Point3::from(a.position.coords.lerp(&b.position.coords, t)),
            attributes: VertexAttributes {
                normal: dir(a.attributes.normal, b.attributes.normal),
                tangent: dir(a.attributes.tangent, b.attributes.tangent),
                bitangent: dir(a.attributes.bitangent, b.attributes.bitangent),
                uv,
                bones: None,
            },
        })
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}
