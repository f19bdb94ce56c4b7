//! The mesh container: topology, per-vertex attribute arrays and optional indices.

use nalgebra::{Point2, Point3, Vector3, Vector4};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Aabb, BoneBinding, Line, MeshError, MeshResult, Sphere, TexCoord, Triangle, Vertex,
    VertexAttributes,
};

/// Primitive kind of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Topology {
    /// Every face is a single vertex.
    Points,
    /// Every face is a segment of two vertices.
    Lines,
    /// Every face is a triangle of three vertices.
    #[default]
    Triangles,
}

impl Topology {
    /// Number of vertices per face.
    #[inline]
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Points => 1,
            Self::Lines => 2,
            Self::Triangles => 3,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::Triangles => "triangles",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Texture coordinate array. Two- and three-dimensional coordinates are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TexCoords {
    /// No texture coordinates.
    #[default]
    None,
    /// 2D coordinates.
    Uv(Vec<Point2<f64>>),
    /// 3D coordinates.
    Uv3(Vec<Point3<f64>>),
}

impl TexCoords {
    /// Number of coordinates stored.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Uv(v) => v.len(),
            Self::Uv3(v) => v.len(),
        }
    }

    /// Check whether no coordinates are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, i: usize) -> Option<TexCoord> {
        match self {
            Self::None => None,
            Self::Uv(v) => v.get(i).copied().map(TexCoord::Uv),
            Self::Uv3(v) => v.get(i).copied().map(TexCoord::Uv3),
        }
    }

    fn push(&mut self, uv: Option<TexCoord>) {
        match self {
            Self::None => {}
            Self::Uv(v) => v.push(match uv {
                Some(TexCoord::Uv(p)) => p,
                _ => Point2::origin(),
            }),
            Self::Uv3(v) => v.push(match uv {
                Some(TexCoord::Uv3(p)) => p,
                _ => Point3::origin(),
            }),
        }
    }

    fn filter(&mut self, keep: &[bool]) {
        match self {
            Self::None => {}
            Self::Uv(v) => filter(v, keep),
            Self::Uv3(v) => filter(v, keep),
        }
    }

    fn gather(&self, ids: &[u32]) -> Self {
        match self {
            Self::None => Self::None,
            Self::Uv(v) => Self::Uv(gather(v, ids)),
            Self::Uv3(v) => Self::Uv3(gather(v, ids)),
        }
    }

    fn extend(&mut self, other: &Self) {
        match (self, other) {
            (Self::Uv(a), Self::Uv(b)) => a.extend_from_slice(b),
            (Self::Uv3(a), Self::Uv3(b)) => a.extend_from_slice(b),
            _ => {}
        }
    }
}

/// A mesh of points, lines or triangles.
///
/// Vertices are stored as parallel attribute arrays. Every optional
/// attribute is either empty or exactly [`vertex_count`](Self::vertex_count)
/// long. When `indices` is empty the mesh is *expanded*: consecutive groups
/// of `arity` vertices form the faces. Otherwise the mesh is *indexed* and
/// consecutive groups of `arity` indices form the faces.
///
/// # Example
///
/// ```
/// use mesh_types::{Mesh, Point3, Topology};
///
/// let mut mesh = Mesh::new(Topology::Triangles);
/// mesh.add_vertex(Point3::new(0.0, 0.0, 0.0).into());
/// mesh.add_vertex(Point3::new(1.0, 0.0, 0.0).into());
/// mesh.add_vertex(Point3::new(0.0, 1.0, 0.0).into());
/// assert_eq!(mesh.faces_count(), 1);
/// assert!(!mesh.is_indexed());
/// assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    topology: Topology,
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    tangents: Vec<Vector3<f64>>,
    bitangents: Vec<Vector3<f64>>,
    uvs: TexCoords,
    bone_indices: Vec<[u32; 4]>,
    bone_weights: Vec<Vector4<f64>>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            ..Self::default()
        }
    }

    /// Create an expanded mesh from positions only.
    #[must_use]
    pub fn from_positions(topology: Topology, positions: Vec<Point3<f64>>) -> Self {
        Self {
            topology,
            positions,
            ..Self::default()
        }
    }

    /// Create an indexed mesh from positions and indices.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] if an index is out of range or the
    /// index count is not a multiple of the topology's arity.
    pub fn from_indexed(
        topology: Topology,
        positions: Vec<Point3<f64>>,
        indices: Vec<u32>,
    ) -> MeshResult<Self> {
        let mesh = Self {
            topology,
            positions,
            indices,
            ..Self::default()
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Create an expanded triangle mesh from a triangle soup.
    #[must_use]
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let positions = triangles.iter().flat_map(Triangle::vertices).collect();
        Self::from_positions(Topology::Triangles, positions)
    }

    // ==================== Shape ====================

    /// Primitive kind.
    #[inline]
    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    /// Change the primitive kind.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] if the mesh has vertices.
    pub fn set_topology(&mut self, topology: Topology) -> MeshResult<()> {
        if !self.positions.is_empty() {
            return Err(MeshError::validation(
                "set topology",
                "topology can only change while the mesh is empty",
            ));
        }
        self.topology = topology;
        Ok(())
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices.
    #[inline]
    #[must_use]
    pub fn indices_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of faces (points, lines or triangles).
    #[must_use]
    pub fn faces_count(&self) -> usize {
        let n = if self.is_indexed() {
            self.indices.len()
        } else {
            self.positions.len()
        };
        n / self.topology.arity()
    }

    /// Check whether faces reference vertices through indices.
    #[inline]
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Check whether the mesh has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Remove every vertex and index. The topology is kept.
    pub fn clear(&mut self) {
        *self = Self::new(self.topology);
    }

    // ==================== Attributes ====================

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Mutable vertex positions.
    pub fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    /// Vertex normals, empty when absent.
    #[must_use]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Mutable vertex normals.
    pub fn normals_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.normals
    }

    /// Vertex tangents, empty when absent.
    #[must_use]
    pub fn tangents(&self) -> &[Vector3<f64>] {
        &self.tangents
    }

    /// Mutable vertex tangents.
    pub fn tangents_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.tangents
    }

    /// Vertex bitangents, empty when absent.
    #[must_use]
    pub fn bitangents(&self) -> &[Vector3<f64>] {
        &self.bitangents
    }

    /// Mutable vertex bitangents.
    pub fn bitangents_mut(&mut self) -> &mut [Vector3<f64>] {
        &mut self.bitangents
    }

    /// Texture coordinates of either dimension.
    #[must_use]
    pub const fn tex_coords(&self) -> &TexCoords {
        &self.uvs
    }

    /// 2D texture coordinates, empty when absent or 3D.
    #[must_use]
    pub fn uvs(&self) -> &[Point2<f64>] {
        match &self.uvs {
            TexCoords::Uv(v) => v,
            _ => &[],
        }
    }

    /// Mutable 2D texture coordinates.
    pub fn uvs_mut(&mut self) -> &mut [Point2<f64>] {
        match &mut self.uvs {
            TexCoords::Uv(v) => v,
            _ => &mut [],
        }
    }

    /// 3D texture coordinates, empty when absent or 2D.
    #[must_use]
    pub fn uvs3(&self) -> &[Point3<f64>] {
        match &self.uvs {
            TexCoords::Uv3(v) => v,
            _ => &[],
        }
    }

    /// Mutable 3D texture coordinates.
    pub fn uvs3_mut(&mut self) -> &mut [Point3<f64>] {
        match &mut self.uvs {
            TexCoords::Uv3(v) => v,
            _ => &mut [],
        }
    }

    /// Bone ids, empty when absent.
    #[must_use]
    pub fn bone_indices(&self) -> &[[u32; 4]] {
        &self.bone_indices
    }

    /// Bone weights, empty when absent.
    #[must_use]
    pub fn bone_weights(&self) -> &[Vector4<f64>] {
        &self.bone_weights
    }

    /// Face indices, empty for expanded meshes.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Mutable face indices.
    pub fn indices_mut(&mut self) -> &mut [u32] {
        &mut self.indices
    }

    /// Exchange every attribute of vertices `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either id is out of range.
    pub fn swap_vertices(&mut self, a: usize, b: usize) {
        fn swap<T>(values: &mut [T], a: usize, b: usize) {
            if !values.is_empty() {
                values.swap(a, b);
            }
        }
        self.positions.swap(a, b);
        swap(&mut self.normals, a, b);
        swap(&mut self.tangents, a, b);
        swap(&mut self.bitangents, a, b);
        swap(self.uvs_mut(), a, b);
        swap(self.uvs3_mut(), a, b);
        swap(&mut self.bone_indices, a, b);
        swap(&mut self.bone_weights, a, b);
    }

    fn check_len(&self, operation: &'static str, len: usize) -> MeshResult<()> {
        if len == 0 || len == self.positions.len() {
            Ok(())
        } else {
            Err(MeshError::validation(
                operation,
                format!(
                    "attribute has {len} values but the mesh has {} vertices",
                    self.positions.len()
                ),
            ))
        }
    }

    /// Replace the positions.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] if another populated attribute or an
    /// index disagrees with the new vertex count.
    pub fn set_positions(&mut self, positions: Vec<Point3<f64>>) -> MeshResult<()> {
        let previous = std::mem::replace(&mut self.positions, positions);
        if let Err(e) = self.validate() {
            self.positions = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Replace the normals. An empty vector removes them.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] on a length mismatch.
    pub fn set_normals(&mut self, normals: Vec<Vector3<f64>>) -> MeshResult<()> {
        self.check_len("set normals", normals.len())?;
        self.normals = normals;
        Ok(())
    }

    /// Replace the tangents. An empty vector removes them.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] on a length mismatch.
    pub fn set_tangents(&mut self, tangents: Vec<Vector3<f64>>) -> MeshResult<()> {
        self.check_len("set tangents", tangents.len())?;
        self.tangents = tangents;
        Ok(())
    }

    /// Replace the bitangents. An empty vector removes them.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] on a length mismatch.
    pub fn set_bitangents(&mut self, bitangents: Vec<Vector3<f64>>) -> MeshResult<()> {
        self.check_len("set bitangents", bitangents.len())?;
        self.bitangents = bitangents;
        Ok(())
    }

    /// Replace the texture coordinates with 2D ones, dropping any 3D ones.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] on a length mismatch.
    pub fn set_uvs(&mut self, uvs: Vec<Point2<f64>>) -> MeshResult<()> {
        self.check_len("set uvs", uvs.len())?;
        self.uvs = if uvs.is_empty() {
            TexCoords::None
        } else {
            TexCoords::Uv(uvs)
        };
        Ok(())
    }

    /// Replace the texture coordinates with 3D ones, dropping any 2D ones.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] on a length mismatch.
    pub fn set_uvs3(&mut self, uvs: Vec<Point3<f64>>) -> MeshResult<()> {
        self.check_len("set uvs3", uvs.len())?;
        self.uvs = if uvs.is_empty() {
            TexCoords::None
        } else {
            TexCoords::Uv3(uvs)
        };
        Ok(())
    }

    /// Replace the skinning data. Empty vectors remove it.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] on a length mismatch.
    pub fn set_bones(
        &mut self,
        indices: Vec<[u32; 4]>,
        weights: Vec<Vector4<f64>>,
    ) -> MeshResult<()> {
        self.check_len("set bones", indices.len())?;
        self.check_len("set bones", weights.len())?;
        if indices.len() != weights.len() {
            return Err(MeshError::validation(
                "set bones",
                "bone indices and weights differ in length",
            ));
        }
        self.bone_indices = indices;
        self.bone_weights = weights;
        Ok(())
    }

    /// Replace the indices. An empty vector makes the mesh expanded.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] if an index is out of range or the
    /// count is not a multiple of the arity.
    pub fn set_indices(&mut self, indices: Vec<u32>) -> MeshResult<()> {
        self.check_indices("set indices", &indices)?;
        self.indices = indices;
        Ok(())
    }

    fn check_indices(&self, operation: &'static str, indices: &[u32]) -> MeshResult<()> {
        if indices.len() % self.topology.arity() != 0 {
            return Err(MeshError::validation(
                operation,
                format!(
                    "{} indices do not form whole {}",
                    indices.len(),
                    self.topology
                ),
            ));
        }
        let n = self.positions.len();
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= n) {
            return Err(MeshError::validation(
                operation,
                format!("index {bad} out of range for {n} vertices"),
            ));
        }
        Ok(())
    }

    /// Check every structural invariant of the mesh.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] describing the first violation.
    pub fn validate(&self) -> MeshResult<()> {
        const OP: &str = "validate mesh";
        self.check_len(OP, self.normals.len())?;
        self.check_len(OP, self.tangents.len())?;
        self.check_len(OP, self.bitangents.len())?;
        self.check_len(OP, self.uvs.len())?;
        self.check_len(OP, self.bone_indices.len())?;
        self.check_len(OP, self.bone_weights.len())?;
        if self.bone_indices.len() != self.bone_weights.len() {
            return Err(MeshError::validation(
                OP,
                "bone indices and weights differ in length",
            ));
        }
        if self.is_indexed() {
            self.check_indices(OP, &self.indices)
        } else if self.positions.len() % self.topology.arity() != 0 {
            Err(MeshError::validation(
                OP,
                format!(
                    "{} vertices do not form whole {}",
                    self.positions.len(),
                    self.topology
                ),
            ))
        } else {
            Ok(())
        }
    }

    /// Reject meshes whose vertices cannot be interpolated.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] when bone data is present.
    pub fn check_interpolatable(&self, operation: &'static str) -> MeshResult<()> {
        if self.bone_indices.is_empty() && self.bone_weights.is_empty() {
            Ok(())
        } else {
            Err(MeshError::validation(
                operation,
                "bone indices and weights cannot be interpolated",
            ))
        }
    }

    /// Reject meshes that are not made of triangles.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] for points and lines.
    pub fn require_triangles(&self, operation: &'static str) -> MeshResult<()> {
        if self.topology == Topology::Triangles {
            Ok(())
        } else {
            Err(MeshError::validation(
                operation,
                format!("requires triangles, got {}", self.topology),
            ))
        }
    }

    // ==================== Building ====================

    /// Append a vertex and return its id.
    ///
    /// The first vertex of an empty mesh decides which attributes are
    /// populated. Afterwards every populated attribute receives the value
    /// carried by the vertex, or zero when it carries none; attributes the
    /// mesh does not populate are ignored.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let a = vertex.attributes;
        if self.positions.is_empty() {
            self.normals.clear();
            self.tangents.clear();
            self.bitangents.clear();
            self.bone_indices.clear();
            self.bone_weights.clear();
            self.uvs = match a.uv {
                None => TexCoords::None,
                Some(TexCoord::Uv(_)) => TexCoords::Uv(Vec::new()),
                Some(TexCoord::Uv3(_)) => TexCoords::Uv3(Vec::new()),
            };
            self.positions.push(vertex.position);
            if let Some(n) = a.normal {
                self.normals.push(n);
            }
            if let Some(t) = a.tangent {
                self.tangents.push(t);
            }
            if let Some(b) = a.bitangent {
                self.bitangents.push(b);
            }
            self.uvs.push(a.uv);
            if let Some(bones) = a.bones {
                self.bone_indices.push(bones.indices);
                self.bone_weights.push(bones.weights);
            }
        } else {
            self.positions.push(vertex.position);
            push_populated(&mut self.normals, a.normal);
            push_populated(&mut self.tangents, a.tangent);
            push_populated(&mut self.bitangents, a.bitangent);
            if !self.uvs.is_empty() {
                self.uvs.push(a.uv);
            }
            push_populated(&mut self.bone_indices, a.bones.map(|b| b.indices));
            push_populated(&mut self.bone_weights, a.bones.map(|b| b.weights));
        }
        last_id(&self.positions)
    }

    fn add_face(&mut self, operation: &'static str, topology: Topology, ids: &[u32]) -> MeshResult<()> {
        if self.topology != topology {
            return Err(MeshError::validation(
                operation,
                format!("mesh topology is {}", self.topology),
            ));
        }
        self.check_indices(operation, ids)?;
        self.indices.extend_from_slice(ids);
        Ok(())
    }

    /// Append an indexed point.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] for a non-point mesh or an
    /// out-of-range id.
    pub fn add_point(&mut self, a: u32) -> MeshResult<()> {
        self.add_face("add point", Topology::Points, &[a])
    }

    /// Append an indexed line.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] for a non-line mesh or an
    /// out-of-range id.
    pub fn add_line(&mut self, a: u32, b: u32) -> MeshResult<()> {
        self.add_face("add line", Topology::Lines, &[a, b])
    }

    /// Append an indexed triangle.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] for a non-triangle mesh or an
    /// out-of-range id.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) -> MeshResult<()> {
        self.add_face("add triangle", Topology::Triangles, &[a, b, c])
    }

    /// Append a segment as two new vertices, expanding the mesh first.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] for a non-line mesh.
    pub fn add_line_shape(&mut self, line: &Line) -> MeshResult<()> {
        if self.topology != Topology::Lines {
            return Err(MeshError::validation(
                "add line",
                format!("mesh topology is {}", self.topology),
            ));
        }
        self.convert_to_expanded();
        self.add_vertex(Vertex::new(line.a));
        self.add_vertex(Vertex::new(line.b));
        Ok(())
    }

    /// Append a triangle as three new vertices, expanding the mesh first.
    ///
    /// When normals are populated the new vertices receive the flat face
    /// normal.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] for a non-triangle mesh.
    pub fn add_triangle_shape(&mut self, triangle: &Triangle) -> MeshResult<()> {
        self.require_triangles("add triangle")?;
        self.convert_to_expanded();
        for p in triangle.vertices() {
            self.add_vertex(Vertex::new(p));
        }
        if !self.normals.is_empty() {
            let n = triangle.normal().unwrap_or_else(Vector3::zeros);
            let start = self.normals.len() - 3;
            self.normals[start..].fill(n);
        }
        Ok(())
    }

    /// Append all faces of another mesh.
    ///
    /// If only one of the meshes is indexed, both are expanded first.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] when the topologies differ or the
    /// two meshes populate different attributes.
    pub fn append(&mut self, other: &Self) -> MeshResult<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.topology != other.topology {
            return Err(MeshError::validation(
                "append mesh",
                format!("cannot append {} to {}", other.topology, self.topology),
            ));
        }
        let layout = |m: &Self| {
            (
                m.normals.is_empty(),
                m.tangents.is_empty(),
                m.bitangents.is_empty(),
                std::mem::discriminant(&m.uvs),
                m.bone_indices.is_empty(),
            )
        };
        if layout(self) != layout(other) {
            return Err(MeshError::validation(
                "append mesh",
                "meshes populate different attributes",
            ));
        }
        let mut other = other.clone();
        if self.is_indexed() != other.is_indexed() {
            self.convert_to_expanded();
            other.convert_to_expanded();
        }
        let offset = last_id(&self.positions) + 1;
        self.indices.extend(other.indices.iter().map(|i| i + offset));
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.tangents.extend_from_slice(&other.tangents);
        self.bitangents.extend_from_slice(&other.bitangents);
        self.uvs.extend(&other.uvs);
        self.bone_indices.extend_from_slice(&other.bone_indices);
        self.bone_weights.extend_from_slice(&other.bone_weights);
        Ok(())
    }

    // ==================== Reading ====================

    /// Full attribute tuple of vertex `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn vertex(&self, i: usize) -> Vertex {
        let bones = match (self.bone_indices.get(i), self.bone_weights.get(i)) {
            (Some(&indices), Some(&weights)) => Some(BoneBinding { indices, weights }),
            _ => None,
        };
        Vertex {
            position: self.positions[i],
            attributes: VertexAttributes {
                normal: self.normals.get(i).copied(),
                tangent: self.tangents.get(i).copied(),
                bitangent: self.bitangents.get(i).copied(),
                uv: self.uvs.get(i),
                bones,
            },
        }
    }

    /// Vertex ids of face `f`. Expanded meshes use implicit ids.
    ///
    /// # Panics
    ///
    /// Panics if `f` is out of range.
    #[must_use]
    pub fn face(&self, f: usize) -> SmallVec<[u32; 3]> {
        let k = self.topology.arity();
        let range = f * k..(f + 1) * k;
        if self.is_indexed() {
            SmallVec::from_slice(&self.indices[range])
        } else {
            range.map(to_id).collect()
        }
    }

    /// Vertex ids of triangle `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` is out of range or the mesh is not made of triangles.
    #[must_use]
    pub fn triangle_ids(&self, f: usize) -> [u32; 3] {
        debug_assert_eq!(self.topology, Topology::Triangles);
        if self.is_indexed() {
            [
                self.indices[f * 3],
                self.indices[f * 3 + 1],
                self.indices[f * 3 + 2],
            ]
        } else {
            [to_id(f * 3), to_id(f * 3 + 1), to_id(f * 3 + 2)]
        }
    }

    /// Geometry of triangle `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` is out of range or the mesh is not made of triangles.
    #[must_use]
    pub fn triangle(&self, f: usize) -> Triangle {
        let [a, b, c] = self.triangle_ids(f);
        Triangle::new(
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        )
    }

    /// Geometry of line `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` is out of range or the mesh is not made of lines.
    #[must_use]
    pub fn line(&self, f: usize) -> Line {
        let ids = self.face(f);
        Line::new(self.positions[ids[0] as usize], self.positions[ids[1] as usize])
    }

    /// Iterate over all triangles. Yields nothing for points and lines.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let n = if self.topology == Topology::Triangles {
            self.faces_count()
        } else {
            0
        };
        (0..n).map(move |f| self.triangle(f))
    }

    /// Axis-aligned bounding box of all positions.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// Approximate bounding sphere of all positions.
    #[must_use]
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::from_points(&self.positions)
    }

    /// Total triangle area; zero for points and lines.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Signed enclosed volume; positive for closed meshes with outward
    /// winding. Zero for points and lines.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum::<f64>()
            / 6.0
    }

    // ==================== Compaction ====================

    /// Keep only the faces whose flag is set. Vertices of indexed meshes are
    /// left in place; see [`remove_unused_vertices`](Self::remove_unused_vertices).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] if `keep` does not have one flag per face.
    pub fn retain_faces(&mut self, keep: &[bool]) -> MeshResult<()> {
        let faces = self.faces_count();
        if keep.len() != faces {
            return Err(MeshError::validation(
                "retain faces",
                format!("{} flags for {faces} faces", keep.len()),
            ));
        }
        let k = self.topology.arity();
        if self.is_indexed() {
            self.indices = self
                .indices
                .chunks_exact(k)
                .zip(keep)
                .filter(|(_, &kept)| kept)
                .flat_map(|(face, _)| face.iter().copied())
                .collect();
            if self.indices.is_empty() {
                self.clear();
            }
        } else {
            let vertex_keep: Vec<bool> = keep
                .iter()
                .flat_map(|&kept| std::iter::repeat(kept).take(k))
                .collect();
            self.filter_vertices(&vertex_keep);
        }
        Ok(())
    }

    /// Drop the vertices whose flag is clear together with every face that
    /// uses one of them, remapping indices.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Validation`] if `keep` does not have one flag per
    /// vertex.
    pub fn retain_vertices(&mut self, keep: &[bool]) -> MeshResult<()> {
        let n = self.vertex_count();
        if keep.len() != n {
            return Err(MeshError::validation(
                "retain vertices",
                format!("{} flags for {n} vertices", keep.len()),
            ));
        }
        let k = self.topology.arity();
        if self.is_indexed() {
            let mut remap = vec![u32::MAX; n];
            let mut next = 0u32;
            for (slot, &kept) in remap.iter_mut().zip(keep) {
                if kept {
                    *slot = next;
                    next += 1;
                }
            }
            self.indices = self
                .indices
                .chunks_exact(k)
                .filter(|face| face.iter().all(|&i| keep[i as usize]))
                .flat_map(|face| face.iter().map(|&i| remap[i as usize]))
                .collect();
            self.filter_vertices(keep);
            if self.indices.is_empty() {
                self.clear();
            }
        } else {
            let whole: Vec<bool> = keep
                .chunks_exact(k)
                .flat_map(|face| {
                    let kept = face.iter().all(|&b| b);
                    std::iter::repeat(kept).take(k)
                })
                .collect();
            self.filter_vertices(&whole);
        }
        Ok(())
    }

    /// Remove vertices no index references. Expanded meshes use every vertex.
    ///
    /// Returns the number of removed vertices.
    pub fn remove_unused_vertices(&mut self) -> usize {
        if !self.is_indexed() {
            return 0;
        }
        let mut used = vec![false; self.vertex_count()];
        for &i in &self.indices {
            used[i as usize] = true;
        }
        let removed = used.iter().filter(|&&u| !u).count();
        if removed > 0 {
            let mut remap = vec![0u32; used.len()];
            let mut next = 0u32;
            for (slot, &u) in remap.iter_mut().zip(&used) {
                *slot = next;
                if u {
                    next += 1;
                }
            }
            for i in &mut self.indices {
                *i = remap[*i as usize];
            }
            self.filter_vertices(&used);
        }
        removed
    }

    fn filter_vertices(&mut self, keep: &[bool]) {
        filter(&mut self.positions, keep);
        filter(&mut self.normals, keep);
        filter(&mut self.tangents, keep);
        filter(&mut self.bitangents, keep);
        self.uvs.filter(keep);
        filter(&mut self.bone_indices, keep);
        filter(&mut self.bone_weights, keep);
        if self.uvs.is_empty() {
            self.uvs = TexCoords::None;
        }
    }

    /// Rebuild every attribute array from the given vertex ids, dropping the
    /// indices. The result is an expanded mesh with one vertex per id.
    pub(crate) fn gather_vertices(&mut self, ids: &[u32]) {
        self.positions = gather(&self.positions, ids);
        self.normals = gather(&self.normals, ids);
        self.tangents = gather(&self.tangents, ids);
        self.bitangents = gather(&self.bitangents, ids);
        self.uvs = self.uvs.gather(ids);
        self.bone_indices = gather(&self.bone_indices, ids);
        self.bone_weights = gather(&self.bone_weights, ids);
        self.indices.clear();
    }

    /// Install a new index buffer without checks. Callers guarantee range.
    pub(crate) fn replace_indices(&mut self, indices: Vec<u32>) {
        self.indices = indices;
    }
}

fn push_populated<T: Default>(values: &mut Vec<T>, value: Option<T>) {
    if !values.is_empty() {
        values.push(value.unwrap_or_default());
    }
}

fn filter<T>(values: &mut Vec<T>, keep: &[bool]) {
    if values.is_empty() {
        return;
    }
    let mut flags = keep.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}

fn gather<T: Copy>(values: &[T], ids: &[u32]) -> Vec<T> {
    if values.is_empty() {
        return Vec::new();
    }
    ids.iter().map(|&i| values[i as usize]).collect()
}

#[allow(clippy::cast_possible_truncation)]
fn to_id(i: usize) -> u32 {
    i as u32
}

fn last_id<T>(values: &[T]) -> u32 {
    to_id(values.len().saturating_sub(1))
}
