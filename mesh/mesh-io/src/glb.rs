//! Binary glTF 2.0 export.
//!
//! ```text
//! UINT32 magic "glTF" | UINT32 version 2 | UINT32 total length
//! UINT32 length | UINT32 "JSON" | JSON padded with spaces to 4 bytes
//! UINT32 length | UINT32 "BIN\0" | buffer padded with zeros to 4 bytes
//! ```
//!
//! One scene with one node and one mesh with a single primitive. Every
//! populated attribute gets its own buffer view and accessor.

#![allow(clippy::cast_possible_truncation)]

use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{Mesh, Topology};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// `glTF` in little endian.
pub const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const FLOAT: u32 = 5126;
const UNSIGNED_SHORT: u32 = 5123;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Options for GLB export.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlbExportParams {
    /// Name of the node and mesh.
    pub name: String,
    /// Write `1 - v` instead of `v` for texture coordinates.
    pub flip_uv_vertically: bool,
}

impl Default for GlbExportParams {
    fn default() -> Self {
        Self {
            name: "mesh".to_string(),
            flip_uv_vertically: false,
        }
    }
}

impl GlbExportParams {
    /// Set the node and mesh name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Flip texture coordinates vertically.
    #[must_use]
    pub const fn with_flip_uv_vertically(mut self, flip: bool) -> Self {
        self.flip_uv_vertically = flip;
        self
    }
}

/// Accumulates the binary buffer together with its views and accessors.
#[derive(Default)]
struct Builder {
    bin: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
    attributes: Map<String, Value>,
}

impl Builder {
    /// Append a view and accessor; returns the accessor index.
    fn push(
        &mut self,
        bytes: &[u8],
        component_type: u32,
        kind: &str,
        count: usize,
        target: u32,
        bounds: Option<(Value, Value)>,
    ) -> usize {
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
            "target": target,
        }));
        let mut accessor = json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "type": kind,
            "count": count,
        });
        if let (Some((min, max)), Value::Object(map)) = (bounds, &mut accessor) {
            map.insert("min".to_string(), min);
            map.insert("max".to_string(), max);
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    fn attribute(&mut self, name: &str, floats: &[f32], kind: &str, count: usize) {
        let bytes: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
        let index = self.push(&bytes, FLOAT, kind, count, ARRAY_BUFFER, None);
        self.attributes.insert(name.to_string(), json!(index));
    }
}

fn f32s<const N: usize>(values: impl Iterator<Item = [f64; N]>) -> Vec<f32> {
    values.flat_map(|v| v.map(|c| c as f32)).collect()
}

/// Encode a mesh as a GLB byte stream.
///
/// Tangents are written with `w = 1`. Bone indices are stored as 16-bit
/// joints. 3D texture coordinates have no glTF counterpart and are skipped.
///
/// # Errors
///
/// - [`IoError::InvalidContent`] for an empty mesh or a bone index above
///   `u16::MAX`
/// - [`IoError::Json`] if the JSON chunk cannot be encoded
pub fn glb_to_vec(mesh: &Mesh, params: &GlbExportParams) -> IoResult<Vec<u8>> {
    if mesh.vertex_count() == 0 {
        return Err(IoError::invalid_content("cannot export an empty mesh"));
    }
    let count = mesh.vertex_count();
    let mut b = Builder::default();

    {
        let box_ = mesh.bounding_box();
        let floats = f32s(mesh.positions().iter().map(|p| [p.x, p.y, p.z]));
        let bytes: Vec<u8> = floats.iter().flat_map(|f| f.to_le_bytes()).collect();
        let bounds = (
            json!([box_.min.x as f32, box_.min.y as f32, box_.min.z as f32]),
            json!([box_.max.x as f32, box_.max.y as f32, box_.max.z as f32]),
        );
        let index = b.push(&bytes, FLOAT, "VEC3", count, ARRAY_BUFFER, Some(bounds));
        b.attributes.insert("POSITION".to_string(), json!(index));
    }
    if !mesh.normals().is_empty() {
        let floats = f32s(mesh.normals().iter().map(|n| [n.x, n.y, n.z]));
        b.attribute("NORMAL", &floats, "VEC3", count);
    }
    if !mesh.tangents().is_empty() {
        let floats = f32s(mesh.tangents().iter().map(|t| [t.x, t.y, t.z, 1.0]));
        b.attribute("TANGENT", &floats, "VEC4", count);
    }
    if !mesh.uvs().is_empty() {
        let flip = params.flip_uv_vertically;
        let floats = f32s(
            mesh.uvs()
                .iter()
                .map(|t| [t.x, if flip { 1.0 - t.y } else { t.y }]),
        );
        b.attribute("TEXCOORD_0", &floats, "VEC2", count);
    } else if !mesh.uvs3().is_empty() {
        debug!("skipping 3D texture coordinates in GLB export");
    }
    if !mesh.bone_indices().is_empty() {
        let mut bytes = Vec::with_capacity(count * 8);
        for &j in mesh.bone_indices().iter().flatten() {
            let j = u16::try_from(j).map_err(|_| {
                IoError::invalid_content(format!("bone index {j} does not fit 16 bits"))
            })?;
            bytes.extend_from_slice(&j.to_le_bytes());
        }
        let index = b.push(&bytes, UNSIGNED_SHORT, "VEC4", count, ARRAY_BUFFER, None);
        b.attributes.insert("JOINTS_0".to_string(), json!(index));

        let floats = f32s(mesh.bone_weights().iter().map(|w| [w.x, w.y, w.z, w.w]));
        b.attribute("WEIGHTS_0", &floats, "VEC4", count);
    }

    let mode = match mesh.topology() {
        Topology::Points => 0,
        Topology::Lines => 1,
        Topology::Triangles => 4,
    };
    let mut primitive = json!({ "mode": mode });
    if mesh.is_indexed() {
        let bytes: Vec<u8> = mesh.indices().iter().flat_map(|i| i.to_le_bytes()).collect();
        let index = b.push(
            &bytes,
            UNSIGNED_INT,
            "SCALAR",
            mesh.indices().len(),
            ELEMENT_ARRAY_BUFFER,
            None,
        );
        primitive["indices"] = json!(index);
    }
    primitive["attributes"] = Value::Object(std::mem::take(&mut b.attributes));

    let document = json!({
        "asset": { "version": "2.0", "generator": "mesh-io" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "name": params.name }],
        "meshes": [{ "name": params.name, "primitives": [primitive] }],
        "buffers": [{ "byteLength": b.bin.len() }],
        "bufferViews": b.views,
        "accessors": b.accessors,
    });

    let mut json = serde_json::to_vec(&document)?;
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = b.bin;
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let total_u32 = u32::try_from(total)
        .map_err(|_| IoError::invalid_content(format!("{total} bytes exceed the GLB limit")))?;
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&total_u32.to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    out.extend_from_slice(&bin);

    debug!(bytes = out.len(), vertices = count, "encoded glb");
    Ok(out)
}

/// Write a mesh as GLB into any writer.
///
/// # Errors
///
/// See [`glb_to_vec`]; also fails if writing fails.
pub fn write_glb<W: Write>(mesh: &Mesh, params: &GlbExportParams, mut writer: W) -> IoResult<()> {
    writer.write_all(&glb_to_vec(mesh, params)?)?;
    writer.flush()?;
    Ok(())
}

/// Save a mesh as a GLB file.
///
/// # Errors
///
/// See [`glb_to_vec`]; also fails if the file cannot be written.
pub fn save_glb<P: AsRef<Path>>(mesh: &Mesh, path: P, params: &GlbExportParams) -> IoResult<()> {
    let bytes = glb_to_vec(mesh, params)?;
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::shapes::unit_cube;
    use mesh_types::{Point2, Point3, Vector3, Vector4};

    fn word(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    /// Split a GLB into its JSON document and binary chunk.
    fn parse(bytes: &[u8]) -> (Value, Vec<u8>) {
        assert_eq!(word(bytes, 0), GLB_MAGIC);
        assert_eq!(word(bytes, 4), 2);
        assert_eq!(word(bytes, 8) as usize, bytes.len());
        let json_len = word(bytes, 12) as usize;
        assert_eq!(word(bytes, 16), CHUNK_JSON);
        let json = serde_json::from_slice(&bytes[20..20 + json_len]).unwrap();
        let bin_at = 20 + json_len;
        let bin_len = word(bytes, bin_at) as usize;
        assert_eq!(word(bytes, bin_at + 4), CHUNK_BIN);
        (json, bytes[bin_at + 8..bin_at + 8 + bin_len].to_vec())
    }

    #[test]
    fn cube_layout() {
        let bytes = glb_to_vec(&unit_cube(), &GlbExportParams::default()).unwrap();
        assert_eq!(bytes.len() % 4, 0);
        let (doc, bin) = parse(&bytes);
        assert_eq!(doc["asset"]["version"], "2.0");
        let primitive = &doc["meshes"][0]["primitives"][0];
        assert_eq!(primitive["mode"], 4);
        assert_eq!(primitive["attributes"]["POSITION"], 0);
        assert_eq!(primitive["indices"], 1);

        let position = &doc["accessors"][0];
        assert_eq!(position["count"], 8);
        assert_eq!(position["min"], json!([0.0, 0.0, 0.0]));
        assert_eq!(position["max"], json!([1.0, 1.0, 1.0]));
        assert_eq!(doc["accessors"][1]["count"], 36);
        assert_eq!(doc["buffers"][0]["byteLength"], 8 * 12 + 36 * 4);
        assert_eq!(bin.len(), 8 * 12 + 36 * 4);
    }

    #[test]
    fn all_attributes() {
        let mut mesh = Mesh::from_positions(
            Topology::Triangles,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        );
        mesh.set_normals(vec![Vector3::z(); 3]).unwrap();
        mesh.set_tangents(vec![Vector3::x(); 3]).unwrap();
        mesh.set_uvs(vec![Point2::new(0.0, 0.25); 3]).unwrap();
        mesh.set_bones(vec![[1, 2, 0, 0]; 3], vec![Vector4::new(0.5, 0.5, 0.0, 0.0); 3])
            .unwrap();
        let params = GlbExportParams::default()
            .with_name("tri")
            .with_flip_uv_vertically(true);
        let (doc, bin) = parse(&glb_to_vec(&mesh, &params).unwrap());

        let attributes = doc["meshes"][0]["primitives"][0]["attributes"]
            .as_object()
            .unwrap();
        for name in ["POSITION", "NORMAL", "TANGENT", "TEXCOORD_0", "JOINTS_0", "WEIGHTS_0"] {
            assert!(attributes.contains_key(name), "{name}");
        }
        assert!(doc["meshes"][0]["primitives"][0].get("indices").is_none());
        assert_eq!(doc["nodes"][0]["name"], "tri");

        let uv = attributes["TEXCOORD_0"].as_u64().unwrap() as usize;
        let view = &doc["bufferViews"][uv];
        let at = view["byteOffset"].as_u64().unwrap() as usize;
        let v = f32::from_le_bytes(bin[at + 4..at + 8].try_into().unwrap());
        assert_eq!(v, 0.75);

        let tangent = attributes["TANGENT"].as_u64().unwrap() as usize;
        let at = doc["bufferViews"][tangent]["byteOffset"].as_u64().unwrap() as usize;
        let w = f32::from_le_bytes(bin[at + 12..at + 16].try_into().unwrap());
        assert_eq!(w, 1.0);
    }

    #[test]
    fn mode_follows_topology() {
        let lines = Mesh::from_positions(
            Topology::Lines,
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
        );
        let (doc, _) = parse(&glb_to_vec(&lines, &GlbExportParams::default()).unwrap());
        assert_eq!(doc["meshes"][0]["primitives"][0]["mode"], 1);
    }

    #[test]
    fn rejects_empty_and_wide_bones() {
        assert!(matches!(
            glb_to_vec(&Mesh::default(), &GlbExportParams::default()),
            Err(IoError::InvalidContent { .. })
        ));
        let mut mesh = Mesh::from_positions(Topology::Points, vec![Point3::origin()]);
        mesh.set_bones(vec![[70_000, 0, 0, 0]], vec![Vector4::new(1.0, 0.0, 0.0, 0.0)])
            .unwrap();
        assert!(matches!(
            glb_to_vec(&mesh, &GlbExportParams::default()),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.glb");
        save_glb(&unit_cube(), &path, &GlbExportParams::default()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, glb_to_vec(&unit_cube(), &GlbExportParams::default()).unwrap());
    }
}
