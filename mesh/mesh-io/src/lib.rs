//! Mesh persistence and export.
//!
//! - **cagemesh** - native binary format, lossless for every attribute
//!   (in single precision), read and write
//! - **OBJ** (Wavefront) - text, positions, normals and texture
//!   coordinates, read and write
//! - **GLB** (binary glTF 2.0) - export only
//!
//! Every format has an in-memory variant taking a reader or writer next to
//! the path-based one.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! // Format detected from extension
//! let mesh = load_mesh("model.cagemesh").unwrap();
//! save_mesh(&mesh, "model.obj").unwrap();
//! save_mesh(&mesh, "model.glb").unwrap();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cagemesh;
mod error;
mod glb;
mod obj;

pub use cagemesh::{load_cagemesh, read_cagemesh, save_cagemesh, write_cagemesh, MAGIC, VERSION};
pub use error::{IoError, IoResult};
pub use glb::{glb_to_vec, save_glb, write_glb, GlbExportParams, GLB_MAGIC};
pub use obj::{load_obj, obj_to_string, read_obj, save_obj, write_obj, ObjExportParams, OBJ_HEADER};

use std::path::Path;

use mesh_types::Mesh;
use tracing::info;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Native binary format.
    Cagemesh,
    /// Wavefront OBJ text.
    Obj,
    /// Binary glTF 2.0, export only.
    Glb,
}

impl MeshFormat {
    /// Detect format from file extension, ignoring case.
    ///
    /// Returns `None` if the extension is missing or not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "cagemesh" => Some(Self::Cagemesh),
            "obj" => Some(Self::Obj),
            "glb" => Some(Self::Glb),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Cagemesh => "cagemesh",
            Self::Obj => "obj",
            Self::Glb => "glb",
        }
    }

    /// Whether meshes can be loaded from this format.
    #[must_use]
    pub const fn can_load(&self) -> bool {
        !matches!(self, Self::Glb)
    }
}

fn detect(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file, detecting format from extension.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The format is export only
/// - The file cannot be read
/// - The file content is invalid for the detected format
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let path = path.as_ref();
    let format = detect(path)?;
    let mesh = match format {
        MeshFormat::Cagemesh => load_cagemesh(path)?,
        MeshFormat::Obj => load_obj(path)?,
        MeshFormat::Glb => {
            return Err(IoError::ExportOnly {
                extension: format.extension(),
            })
        }
    };
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.faces_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Save a mesh to a file, detecting format from extension.
///
/// OBJ and GLB files are written with default export parameters.
///
/// # Errors
///
/// Returns an error if:
/// - The file format cannot be determined from the extension
/// - The mesh cannot be represented in the format
/// - The file cannot be written
pub fn save_mesh<P: AsRef<Path>>(mesh: &Mesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Cagemesh => save_cagemesh(mesh, path)?,
        MeshFormat::Obj => save_obj(mesh, path, &ObjExportParams::default())?,
        MeshFormat::Glb => save_glb(mesh, path, &GlbExportParams::default())?,
    }
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.faces_count(),
        "saved mesh"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::shapes::unit_cube;

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFormat::from_path("model.cagemesh"), Some(MeshFormat::Cagemesh));
        assert_eq!(MeshFormat::from_path("model.CageMesh"), Some(MeshFormat::Cagemesh));
        assert_eq!(MeshFormat::from_path("model.OBJ"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("/path/to/model.glb"), Some(MeshFormat::Glb));
    }

    #[test]
    fn format_from_path_unknown() {
        assert_eq!(MeshFormat::from_path("model.stl"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
        assert_eq!(MeshFormat::from_path(""), None);
    }

    #[test]
    fn format_extension() {
        for format in [MeshFormat::Cagemesh, MeshFormat::Obj, MeshFormat::Glb] {
            let name = format!("x.{}", format.extension());
            assert_eq!(MeshFormat::from_path(name), Some(format));
        }
        assert!(!MeshFormat::Glb.can_load());
    }

    #[test]
    fn dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cube = unit_cube();
        for name in ["a.cagemesh", "a.obj", "a.glb"] {
            save_mesh(&cube, dir.path().join(name)).unwrap();
        }
        assert_eq!(load_mesh(dir.path().join("a.cagemesh")).unwrap(), cube);
        assert_eq!(load_mesh(dir.path().join("a.obj")).unwrap().faces_count(), 12);
        assert!(matches!(
            load_mesh(dir.path().join("a.glb")),
            Err(IoError::ExportOnly { extension: "glb" })
        ));
        assert!(matches!(
            save_mesh(&cube, dir.path().join("a.stl")),
            Err(IoError::UnknownFormat { .. })
        ));
    }
}
