//! Wavefront OBJ text format.
//!
//! Export writes each attribute as a sorted pool without duplicates, so a
//! vertex shared by many faces, or many vertices sharing one normal,
//! appear once:
//!
//! ```text
//! # mesh exported by mesh-io
//! mtllib scene.mtl
//! o name
//! usemtl material
//! v x y z
//! vn x y z
//! vt u v [w]
//! f p/t/n p/t/n p/t/n
//! ```
//!
//! Points are written as `p`, lines as `l` and triangles as `f`
//! elements. Import reads the same subset back; polygons with more than
//! three corners are split into a triangle fan.

#![allow(clippy::cast_possible_truncation)]

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use hashbrown::HashMap;
use mesh_types::{Mesh, MeshError, Point2, Point3, Topology, Vector3, Vertex};
use tracing::debug;

use crate::error::{open, IoError, IoResult};

/// Header line of every exported file.
pub const OBJ_HEADER: &str = "# mesh exported by mesh-io";

/// Optional names written into an OBJ file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjExportParams {
    /// Name of the object (`o`).
    pub object_name: Option<String>,
    /// Material library file (`mtllib`).
    pub material_library: Option<String>,
    /// Material used by all faces (`usemtl`).
    pub material_name: Option<String>,
}

impl ObjExportParams {
    /// Set the object name.
    #[must_use]
    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = Some(name.into());
        self
    }

    /// Set the material library and the material used by the faces.
    #[must_use]
    pub fn with_material(mut self, library: impl Into<String>, name: impl Into<String>) -> Self {
        self.material_library = Some(library.into());
        self.material_name = Some(name.into());
        self
    }
}

/// Sorted, deduplicated values with 1-based lookup.
struct Pool<const N: usize> {
    values: Vec<[f64; N]>,
}

fn compare<const N: usize>(a: &[f64; N], b: &[f64; N]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl<const N: usize> Pool<N> {
    fn new(items: impl IntoIterator<Item = [f64; N]>) -> Self {
        let mut values: Vec<[f64; N]> = items.into_iter().collect();
        values.sort_by(compare);
        values.dedup_by(|a, b| compare(a, b).is_eq());
        Self { values }
    }

    fn id(&self, value: &[f64; N]) -> usize {
        self.values
            .binary_search_by(|probe| compare(probe, value))
            .map_or(0, |i| i + 1)
    }

    fn write_to(&self, out: &mut String, prefix: &str) {
        for v in &self.values {
            out.push_str(prefix);
            for c in v {
                let _ = write!(out, " {c}");
            }
            out.push('\n');
        }
    }
}

/// Render a mesh as OBJ text.
#[must_use]
pub fn obj_to_string(mesh: &Mesh, params: &ObjExportParams) -> String {
    let mut out = String::new();
    out.push_str(OBJ_HEADER);
    out.push('\n');
    if let Some(lib) = &params.material_library {
        let _ = writeln!(out, "mtllib {lib}");
    }
    if let Some(name) = &params.object_name {
        let _ = writeln!(out, "o {name}");
    }
    if let Some(material) = &params.material_name {
        let _ = writeln!(out, "usemtl {material}");
    }

    let positions = Pool::new(mesh.positions().iter().map(|p| [p.x, p.y, p.z]));
    let normals = Pool::new(mesh.normals().iter().map(|n| [n.x, n.y, n.z]));
    let uvs = Pool::new(mesh.uvs().iter().map(|t| [t.x, t.y]));
    let uvs3 = Pool::new(mesh.uvs3().iter().map(|t| [t.x, t.y, t.z]));
    positions.write_to(&mut out, "v");
    normals.write_to(&mut out, "vn");
    uvs.write_to(&mut out, "vt");
    uvs3.write_to(&mut out, "vt");

    let corner = |out: &mut String, i: usize| {
        let p = mesh.positions()[i];
        let _ = write!(out, "{}", positions.id(&[p.x, p.y, p.z]));
        let t = if let Some(t) = mesh.uvs().get(i) {
            Some(uvs.id(&[t.x, t.y]))
        } else {
            mesh.uvs3().get(i).map(|t| uvs3.id(&[t.x, t.y, t.z]))
        };
        let n = mesh.normals().get(i).map(|n| normals.id(&[n.x, n.y, n.z]));
        match (t, n) {
            (None, None) => {}
            (Some(t), None) => {
                let _ = write!(out, "/{t}");
            }
            (None, Some(n)) => {
                let _ = write!(out, "//{n}");
            }
            (Some(t), Some(n)) => {
                let _ = write!(out, "/{t}/{n}");
            }
        }
    };

    let prefix = match mesh.topology() {
        Topology::Points => "p",
        Topology::Lines => "l",
        Topology::Triangles => "f",
    };
    for f in 0..mesh.faces_count() {
        out.push_str(prefix);
        for id in mesh.face(f) {
            out.push(' ');
            corner(&mut out, id as usize);
        }
        out.push('\n');
    }
    out
}

/// Write a mesh as OBJ text into any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_obj<W: Write>(mesh: &Mesh, params: &ObjExportParams, mut writer: W) -> IoResult<()> {
    writer.write_all(obj_to_string(mesh, params).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Save a mesh as an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(mesh: &Mesh, path: P, params: &ObjExportParams) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    write_obj(mesh, params, BufWriter::new(file))
}

fn number<T: FromStr>(token: &str, line: usize) -> IoResult<T>
where
    T::Err: std::fmt::Display,
{
    token
        .parse()
        .map_err(|e| IoError::invalid_content(format!("line {line}: {token:?}: {e}")))
}

/// Resolve a 1-based or negative (relative) OBJ index.
fn resolve(token: &str, count: usize, line: usize) -> IoResult<usize> {
    let i: i64 = number(token, line)?;
    let resolved = match i.cmp(&0) {
        Ordering::Greater => usize::try_from(i - 1).ok(),
        Ordering::Less => count.checked_sub(usize::try_from(-i).unwrap_or(usize::MAX)),
        Ordering::Equal => None,
    };
    resolved.filter(|&r| r < count).ok_or_else(|| {
        IoError::invalid_content(format!("line {line}: index {i} out of range for {count} values"))
    })
}

fn floats<const N: usize>(parts: &[&str], line: usize) -> IoResult<[f64; N]> {
    if parts.len() < N {
        return Err(IoError::invalid_content(format!(
            "line {line}: expected {N} numbers"
        )));
    }
    let mut out = [0.0; N];
    for (o, p) in out.iter_mut().zip(parts) {
        *o = number(p, line)?;
    }
    Ok(out)
}

#[derive(Default)]
struct ObjData {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<Point3<f64>>,
    uv3: bool,
    topology: Option<Topology>,
    corners: HashMap<(usize, Option<usize>, Option<usize>), u32>,
    mesh: Mesh,
}

impl ObjData {
    fn corner(&mut self, token: &str, line: usize) -> IoResult<u32> {
        let mut fields = token.split('/');
        let p = resolve(fields.next().unwrap_or(""), self.positions.len(), line)?;
        let t = match fields.next() {
            Some(t) if !t.is_empty() => Some(resolve(t, self.uvs.len(), line)?),
            _ => None,
        };
        let n = match fields.next() {
            Some(n) if !n.is_empty() => Some(resolve(n, self.normals.len(), line)?),
            _ => None,
        };
        if let Some(&id) = self.corners.get(&(p, t, n)) {
            return Ok(id);
        }
        let mut vertex = Vertex::new(self.positions[p]);
        if let Some(n) = n {
            vertex = vertex.with_normal(self.normals[n]);
        }
        if let Some(t) = t {
            let uv = self.uvs[t];
            vertex = if self.uv3 {
                vertex.with_uv3(uv)
            } else {
                vertex.with_uv(Point2::new(uv.x, uv.y))
            };
        }
        let id = self.mesh.add_vertex(vertex);
        self.corners.insert((p, t, n), id);
        Ok(id)
    }

    fn element(&mut self, topology: Topology, tokens: &[&str], line: usize) -> IoResult<()> {
        match self.topology {
            None => {
                self.topology = Some(topology);
                self.mesh = Mesh::new(topology);
            }
            Some(t) if t != topology => {
                return Err(IoError::invalid_content(format!(
                    "line {line}: {topology} mixed with {t}"
                )));
            }
            Some(_) => {}
        }
        let ids = tokens
            .iter()
            .map(|t| self.corner(t, line))
            .collect::<IoResult<Vec<u32>>>()?;
        let added: Result<(), MeshError> = match topology {
            Topology::Points => ids.iter().try_for_each(|&a| self.mesh.add_point(a)),
            Topology::Lines => ids.windows(2).try_for_each(|w| self.mesh.add_line(w[0], w[1])),
            Topology::Triangles => {
                if ids.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {line}: face with {} corners",
                        ids.len()
                    )));
                }
                ids[1..]
                    .windows(2)
                    .try_for_each(|w| self.mesh.add_triangle(ids[0], w[0], w[1]))
            }
        };
        added.map_err(IoError::from)
    }
}

/// Parse OBJ text from any buffered reader.
///
/// Vertices are shared between faces when they use the same position,
/// texture coordinate and normal, so the result is indexed.
///
/// # Errors
///
/// Returns [`IoError::InvalidContent`] for malformed numbers, indices out
/// of range or files mixing points, lines and faces.
pub fn read_obj<R: BufRead>(reader: R) -> IoResult<Mesh> {
    let mut data = ObjData::default();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&keyword, rest)) = parts.split_first() else {
            continue;
        };
        match keyword {
            "v" => data.positions.push(Point3::from(floats::<3>(rest, line_no)?)),
            "vn" => data.normals.push(Vector3::from(floats::<3>(rest, line_no)?)),
            "vt" => {
                let [u, v] = floats::<2>(rest, line_no)?;
                let w = match rest.get(2) {
                    Some(w) => {
                        data.uv3 = true;
                        number(w, line_no)?
                    }
                    None => 0.0,
                };
                data.uvs.push(Point3::new(u, v, w));
            }
            "p" => data.element(Topology::Points, rest, line_no)?,
            "l" => data.element(Topology::Lines, rest, line_no)?,
            "f" => data.element(Topology::Triangles, rest, line_no)?,
            _ => {}
        }
    }
    debug!(
        vertices = data.mesh.vertex_count(),
        faces = data.mesh.faces_count(),
        "parsed obj"
    );
    Ok(data.mesh)
}

/// Load a mesh from an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed; see
/// [`read_obj`].
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let file = open(path.as_ref())?;
    read_obj(BufReader::new(file))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::shapes::unit_cube;

    fn quad_with_attributes() -> Mesh {
        let mut mesh = Mesh::from_indexed(
            Topology::Triangles,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .unwrap();
        mesh.set_normals(vec![Vector3::z(); 4]).unwrap();
        mesh.set_uvs(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        mesh
    }

    #[test]
    fn header_and_names() {
        let params = ObjExportParams::default()
            .with_object_name("cube")
            .with_material("scene.mtl", "steel");
        let text = obj_to_string(&unit_cube(), &params);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], OBJ_HEADER);
        assert_eq!(lines[1], "mtllib scene.mtl");
        assert_eq!(lines[2], "o cube");
        assert_eq!(lines[3], "usemtl steel");
    }

    #[test]
    fn pools_are_deduplicated() {
        let text = obj_to_string(&quad_with_attributes(), &ObjExportParams::default());
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 1);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 4);
        // positions sort as (0,0) (0,1) (1,0) (1,1), uvs likewise
        assert!(text.contains("f 1/1/1 3/3/1 4/4/1"));
    }

    #[test]
    fn segment_shapes() {
        let mut mesh = quad_with_attributes();
        mesh.set_uvs(Vec::new()).unwrap();
        let text = obj_to_string(&mesh, &ObjExportParams::default());
        assert!(text.contains("f 1//1 3//1 4//1"));

        mesh.set_normals(Vec::new()).unwrap();
        let text = obj_to_string(&mesh, &ObjExportParams::default());
        assert!(text.contains("f 1 3 4\n"));
    }

    #[test]
    fn expanded_positions_are_pooled() {
        let mut cube = unit_cube();
        cube.convert_to_expanded();
        let text = obj_to_string(&cube, &ObjExportParams::default());
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 12);
    }

    #[test]
    fn element_prefix_follows_topology() {
        let lines = Mesh::from_positions(
            Topology::Lines,
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
        );
        assert!(obj_to_string(&lines, &ObjExportParams::default()).contains("\nl 1 2\n"));
        let points = Mesh::from_positions(Topology::Points, vec![Point3::origin()]);
        assert!(obj_to_string(&points, &ObjExportParams::default()).contains("\np 1\n"));
    }

    #[test]
    fn round_trip_keeps_geometry() {
        let original = quad_with_attributes();
        let text = obj_to_string(&original, &ObjExportParams::default());
        let loaded = read_obj(text.as_bytes()).unwrap();
        assert_eq!(loaded.faces_count(), 2);
        assert_eq!(loaded.vertex_count(), 4);
        for f in 0..2 {
            for (a, b) in original.face(f).iter().zip(loaded.face(f).iter()) {
                let (a, b) = (original.vertex(*a as usize), loaded.vertex(*b as usize));
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn polygons_become_fans() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = read_obj(text.as_bytes()).unwrap();
        assert_eq!(mesh.faces_count(), 2);
        assert!((mesh.surface_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = read_obj(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle(0).vertices()[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn malformed_input() {
        assert!(matches!(
            read_obj("v 0 0 0\nf 1 2 3\n".as_bytes()),
            Err(IoError::InvalidContent { .. })
        ));
        assert!(matches!(
            read_obj("v 0 0\n".as_bytes()),
            Err(IoError::InvalidContent { .. })
        ));
        let err = read_obj("v 0 0 0\nv 0 0 zero\n".as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::InvalidContent { .. }));
        assert!(err.to_string().starts_with("invalid file content: line 2: \"zero\""));
        assert!(matches!(
            read_obj("v 0 0 0\nf 1 x 1\n".as_bytes()),
            Err(IoError::InvalidContent { .. })
        ));
        assert!(matches!(
            read_obj("v 0 0 0\nv 1 0 0\nl 1 2\np 1\n".as_bytes()),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        save_obj(&unit_cube(), &path, &ObjExportParams::default()).unwrap();
        let loaded = load_obj(&path).unwrap();
        assert_eq!(loaded.faces_count(), 12);
        assert!((loaded.signed_volume() - 1.0).abs() < 1e-12);
    }
}
