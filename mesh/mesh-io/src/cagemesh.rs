//! Native binary mesh format.
//!
//! # Layout
//!
//! ```text
//! UINT8[12]   – Magic "cageMeshFile"
//! UINT32      – Version (1)
//! UINT32      – Topology (0 points, 1 lines, 2 triangles)
//! UINT32      – Attribute flags
//! foreach populated attribute, in flag order
//!     UINT32  – Element count
//!     payload – REAL32 or UINT32 components, little endian
//! end
//! ```
//!
//! | flag | attribute     | components    |
//! |------|---------------|---------------|
//! | 1    | positions     | 3 × REAL32    |
//! | 2    | normals       | 3 × REAL32    |
//! | 4    | tangents      | 3 × REAL32    |
//! | 8    | bitangents    | 3 × REAL32    |
//! | 16   | bone indices  | 4 × UINT32    |
//! | 32   | bone weights  | 4 × REAL32    |
//! | 64   | uvs3          | 3 × REAL32    |
//! | 128  | uvs           | 2 × REAL32    |
//! | 256  | indices       | 1 × UINT32    |
//!
//! Values are stored in single precision, so a round trip is exact only
//! for coordinates representable as `f32`.

// f64 -> f32 narrowing is the storage precision of the format
#![allow(clippy::cast_possible_truncation)]

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use mesh_types::{Mesh, Point2, Point3, Topology, Vector3, Vector4};
use tracing::debug;

use crate::error::{open, IoError, IoResult};

/// File magic.
pub const MAGIC: &[u8; 12] = b"cageMeshFile";

/// Current format version.
pub const VERSION: u32 = 1;

const POSITIONS: u32 = 1;
const NORMALS: u32 = 2;
const TANGENTS: u32 = 4;
const BITANGENTS: u32 = 8;
const BONE_INDICES: u32 = 16;
const BONE_WEIGHTS: u32 = 32;
const UVS3: u32 = 64;
const UVS: u32 = 128;
const INDICES: u32 = 256;
const ALL_FLAGS: u32 = 511;

const fn topology_tag(topology: Topology) -> u32 {
    match topology {
        Topology::Points => 0,
        Topology::Lines => 1,
        Topology::Triangles => 2,
    }
}

/// Attribute flags describing which arrays of `mesh` are populated.
fn flags_of(mesh: &Mesh) -> u32 {
    let mut flags = 0;
    let mut set = |flag: u32, populated: bool| {
        if populated {
            flags |= flag;
        }
    };
    set(POSITIONS, mesh.vertex_count() > 0);
    set(NORMALS, !mesh.normals().is_empty());
    set(TANGENTS, !mesh.tangents().is_empty());
    set(BITANGENTS, !mesh.bitangents().is_empty());
    set(BONE_INDICES, !mesh.bone_indices().is_empty());
    set(BONE_WEIGHTS, !mesh.bone_weights().is_empty());
    set(UVS3, !mesh.uvs3().is_empty());
    set(UVS, !mesh.uvs().is_empty());
    set(INDICES, mesh.is_indexed());
    flags
}

struct Encoder<W> {
    out: W,
}

impl<W: Write> Encoder<W> {
    fn u32(&mut self, v: u32) -> IoResult<()> {
        self.out.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn f32s(&mut self, values: impl IntoIterator<Item = f64>) -> IoResult<()> {
        for v in values {
            self.out.write_all(&(v as f32).to_le_bytes())?;
        }
        Ok(())
    }

    fn len(&mut self, len: usize) -> IoResult<()> {
        let len = u32::try_from(len)
            .map_err(|_| IoError::invalid_content(format!("{len} elements exceed the format limit")))?;
        self.u32(len)
    }
}

/// Encode a mesh into any writer.
///
/// # Errors
///
/// Returns an error if writing fails or an array has more than
/// `u32::MAX` elements.
pub fn write_cagemesh<W: Write>(mesh: &Mesh, writer: W) -> IoResult<()> {
    let flags = flags_of(mesh);
    let mut enc = Encoder { out: writer };
    enc.out.write_all(MAGIC)?;
    enc.u32(VERSION)?;
    enc.u32(topology_tag(mesh.topology()))?;
    enc.u32(flags)?;

    let vec3s = |enc: &mut Encoder<W>, values: &[Vector3<f64>]| -> IoResult<()> {
        enc.len(values.len())?;
        enc.f32s(values.iter().flat_map(|v| [v.x, v.y, v.z]))
    };

    if flags & POSITIONS != 0 {
        enc.len(mesh.vertex_count())?;
        enc.f32s(mesh.positions().iter().flat_map(|p| [p.x, p.y, p.z]))?;
    }
    if flags & NORMALS != 0 {
        vec3s(&mut enc, mesh.normals())?;
    }
    if flags & TANGENTS != 0 {
        vec3s(&mut enc, mesh.tangents())?;
    }
    if flags & BITANGENTS != 0 {
        vec3s(&mut enc, mesh.bitangents())?;
    }
    if flags & BONE_INDICES != 0 {
        enc.len(mesh.bone_indices().len())?;
        for &b in mesh.bone_indices().iter().flatten() {
            enc.u32(b)?;
        }
    }
    if flags & BONE_WEIGHTS != 0 {
        enc.len(mesh.bone_weights().len())?;
        enc.f32s(mesh.bone_weights().iter().flat_map(|w| [w.x, w.y, w.z, w.w]))?;
    }
    if flags & UVS3 != 0 {
        enc.len(mesh.uvs3().len())?;
        enc.f32s(mesh.uvs3().iter().flat_map(|p| [p.x, p.y, p.z]))?;
    }
    if flags & UVS != 0 {
        enc.len(mesh.uvs().len())?;
        enc.f32s(mesh.uvs().iter().flat_map(|p| [p.x, p.y]))?;
    }
    if flags & INDICES != 0 {
        enc.len(mesh.indices().len())?;
        for &i in mesh.indices() {
            enc.u32(i)?;
        }
    }
    enc.out.flush()?;
    Ok(())
}

struct Decoder<R> {
    input: R,
    position: u64,
}

impl<R: Read> Decoder<R> {
    fn bytes<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                IoError::UnexpectedEof {
                    position: self.position,
                }
            } else {
                IoError::Io(e)
            }
        })?;
        self.position += N as u64;
        Ok(buf)
    }

    fn u32(&mut self) -> IoResult<u32> {
        self.bytes::<4>().map(u32::from_le_bytes)
    }

    fn f64(&mut self) -> IoResult<f64> {
        self.bytes::<4>().map(|b| f64::from(f32::from_le_bytes(b)))
    }

    /// Read an element count followed by `count` elements.
    fn array<T>(&mut self, mut element: impl FnMut(&mut Self) -> IoResult<T>) -> IoResult<Vec<T>> {
        let count = self.u32()? as usize;
        // the count is untrusted until the payload is actually there
        let mut values = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            values.push(element(self)?);
        }
        Ok(values)
    }

    fn vec3(&mut self) -> IoResult<Vector3<f64>> {
        Ok(Vector3::new(self.f64()?, self.f64()?, self.f64()?))
    }
}

/// Decode a mesh from any reader.
///
/// # Errors
///
/// - [`IoError::FormatMismatch`] for a wrong magic, version, topology or
///   flag set, or when an attribute count disagrees with the positions
/// - [`IoError::UnexpectedEof`] when the data ends early
/// - [`IoError::Mesh`] when the decoded mesh is not valid
pub fn read_cagemesh<R: Read>(reader: R) -> IoResult<Mesh> {
    let mut dec = Decoder {
        input: reader,
        position: 0,
    };
    if &dec.bytes::<12>()? != MAGIC {
        return Err(IoError::format_mismatch("not a cagemesh file"));
    }
    let version = dec.u32()?;
    if version != VERSION {
        return Err(IoError::format_mismatch(format!(
            "unsupported version {version}"
        )));
    }
    let topology = match dec.u32()? {
        0 => Topology::Points,
        1 => Topology::Lines,
        2 => Topology::Triangles,
        other => {
            return Err(IoError::format_mismatch(format!(
                "unknown topology {other}"
            )))
        }
    };
    let flags = dec.u32()?;
    if flags & !ALL_FLAGS != 0 {
        return Err(IoError::format_mismatch(format!(
            "unknown attribute flags {:#x}",
            flags & !ALL_FLAGS
        )));
    }
    if flags & UVS != 0 && flags & UVS3 != 0 {
        return Err(IoError::format_mismatch("both uvs and uvs3 are present"));
    }
    if flags & !POSITIONS != 0 && flags & POSITIONS == 0 {
        return Err(IoError::format_mismatch("attributes without positions"));
    }

    let positions = if flags & POSITIONS != 0 {
        dec.array(|d| Ok(Point3::from(d.vec3()?)))?
    } else {
        Vec::new()
    };
    let n = positions.len();
    let check = |name: &str, len: usize| {
        if len == n {
            Ok(())
        } else {
            Err(IoError::format_mismatch(format!(
                "{len} {name} for {n} positions"
            )))
        }
    };

    let mut mesh = Mesh::from_positions(topology, positions);
    if flags & NORMALS != 0 {
        let normals = dec.array(Decoder::vec3)?;
        check("normals", normals.len())?;
        mesh.set_normals(normals)?;
    }
    if flags & TANGENTS != 0 {
        let tangents = dec.array(Decoder::vec3)?;
        check("tangents", tangents.len())?;
        mesh.set_tangents(tangents)?;
    }
    if flags & BITANGENTS != 0 {
        let bitangents = dec.array(Decoder::vec3)?;
        check("bitangents", bitangents.len())?;
        mesh.set_bitangents(bitangents)?;
    }
    let bone_indices = if flags & BONE_INDICES != 0 {
        dec.array(|d| Ok([d.u32()?, d.u32()?, d.u32()?, d.u32()?]))?
    } else {
        Vec::new()
    };
    let bone_weights = if flags & BONE_WEIGHTS != 0 {
        dec.array(|d| Ok(Vector4::new(d.f64()?, d.f64()?, d.f64()?, d.f64()?)))?
    } else {
        Vec::new()
    };
    if !bone_indices.is_empty() || !bone_weights.is_empty() {
        check("bone indices", bone_indices.len())?;
        check("bone weights", bone_weights.len())?;
        mesh.set_bones(bone_indices, bone_weights)?;
    }
    if flags & UVS3 != 0 {
        let uvs = dec.array(|d| Ok(Point3::from(d.vec3()?)))?;
        check("uvs3", uvs.len())?;
        mesh.set_uvs3(uvs)?;
    }
    if flags & UVS != 0 {
        let uvs = dec.array(|d| Ok(Point2::new(d.f64()?, d.f64()?)))?;
        check("uvs", uvs.len())?;
        mesh.set_uvs(uvs)?;
    }
    if flags & INDICES != 0 {
        let indices = dec.array(Decoder::u32)?;
        if indices.is_empty() {
            return Err(IoError::format_mismatch("index flag set with no indices"));
        }
        mesh.set_indices(indices)?;
    }
    mesh.validate()?;

    debug!(
        topology = %mesh.topology(),
        vertices = mesh.vertex_count(),
        faces = mesh.faces_count(),
        bytes = dec.position,
        "decoded cagemesh"
    );
    Ok(mesh)
}

/// Save a mesh in the native binary format.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_cagemesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    let file = std::fs::File::create(path)?;
    write_cagemesh(mesh, BufWriter::new(file))
}

/// Load a mesh saved with [`save_cagemesh`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid cagemesh
/// file; see [`read_cagemesh`].
pub fn load_cagemesh<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let file = open(path.as_ref())?;
    read_cagemesh(BufReader::new(file))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::shapes::unit_cube;

    fn encode(mesh: &Mesh) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_cagemesh(mesh, &mut bytes).unwrap();
        bytes
    }

    fn decorated_triangle() -> Mesh {
        let mut mesh = Mesh::from_positions(
            Topology::Triangles,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        );
        mesh.set_normals(vec![Vector3::z(); 3]).unwrap();
        mesh.set_uvs(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)])
            .unwrap();
        mesh.set_bones(vec![[0, 1, 0, 0]; 3], vec![Vector4::new(0.75, 0.25, 0.0, 0.0); 3])
            .unwrap();
        mesh
    }

    #[test]
    fn header_layout() {
        let bytes = encode(&unit_cube());
        assert_eq!(&bytes[..12], MAGIC);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), VERSION);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(bytes[20..24].try_into().unwrap()),
            POSITIONS | INDICES
        );
        // header, 8 positions, 36 indices
        assert_eq!(bytes.len(), 24 + 4 + 8 * 12 + 4 + 36 * 4);
    }

    #[test]
    fn indexed_round_trip() {
        let cube = unit_cube();
        let decoded = read_cagemesh(encode(&cube).as_slice()).unwrap();
        assert_eq!(decoded, cube);
    }

    #[test]
    fn attributes_round_trip() {
        let mesh = decorated_triangle();
        let decoded = read_cagemesh(encode(&mesh).as_slice()).unwrap();
        assert_eq!(decoded, mesh);
        assert!(!decoded.is_indexed());
    }

    #[test]
    fn uvs3_round_trip() {
        let mut mesh = unit_cube();
        mesh.set_uvs3(mesh.positions().to_vec()).unwrap();
        let decoded = read_cagemesh(encode(&mesh).as_slice()).unwrap();
        assert_eq!(decoded.uvs3(), mesh.uvs3());
        assert!(decoded.uvs().is_empty());
    }

    #[test]
    fn empty_mesh_round_trip() {
        let mesh = Mesh::new(Topology::Lines);
        let bytes = encode(&mesh);
        assert_eq!(bytes.len(), 24);
        assert_eq!(read_cagemesh(bytes.as_slice()).unwrap(), mesh);
    }

    #[test]
    fn rejects_bad_headers() {
        let good = encode(&unit_cube());

        let mut bad_magic = good.clone();
        bad_magic[0] = b'x';
        assert!(matches!(
            read_cagemesh(bad_magic.as_slice()),
            Err(IoError::FormatMismatch { .. })
        ));

        let mut bad_version = good.clone();
        bad_version[12] = 2;
        assert!(matches!(
            read_cagemesh(bad_version.as_slice()),
            Err(IoError::FormatMismatch { .. })
        ));

        let mut bad_topology = good.clone();
        bad_topology[16] = 7;
        assert!(matches!(
            read_cagemesh(bad_topology.as_slice()),
            Err(IoError::FormatMismatch { .. })
        ));

        let mut bad_flags = good;
        bad_flags[22] = 0x10;
        assert!(matches!(
            read_cagemesh(bad_flags.as_slice()),
            Err(IoError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut mesh = decorated_triangle();
        mesh.set_uvs(Vec::new()).unwrap();
        let mut bytes = encode(&mesh);
        // normals count follows the header, the position count and 3 positions
        let at = 24 + 4 + 3 * 12;
        bytes[at..at + 4].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            read_cagemesh(bytes.as_slice()),
            Err(IoError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn truncated_data_reports_position() {
        let bytes = encode(&unit_cube());
        let err = read_cagemesh(&bytes[..30]).unwrap_err();
        assert!(matches!(err, IoError::UnexpectedEof { position: 28 }));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let mut bytes = encode(&unit_cube());
        let last = bytes.len() - 4;
        bytes[last..].copy_from_slice(&99u32.to_le_bytes());
        assert!(matches!(
            read_cagemesh(bytes.as_slice()),
            Err(IoError::Mesh(_))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.cagemesh");
        save_cagemesh(&unit_cube(), &path).unwrap();
        assert_eq!(load_cagemesh(&path).unwrap(), unit_cube());
        assert!(matches!(
            load_cagemesh(dir.path().join("missing.cagemesh")),
            Err(IoError::FileNotFound { .. })
        ));
    }
}
