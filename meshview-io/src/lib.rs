//! I/O operations for meshes
//!
//! This crate loads the meshes shown by the viewer (PLY and OBJ) and
//! enumerates the model directory that populates the model catalog.

pub mod ply;
pub mod obj;
pub mod catalog;
pub mod error;

pub use error::*;
pub use catalog::{list_files_with_extension, list_files_with_extensions, DirectoryMeshSource};

use meshview_core::{TriangleMesh, Result};

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<TriangleMesh>;
}

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<std::path::Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    match extension.as_deref() {
        Some("obj") => obj::ObjReader::read_mesh(path),
        Some("ply") => ply::PlyReader::read_mesh(path),
        _ => Err(meshview_core::Error::UnsupportedFormat(
            format!("Unsupported mesh format: {:?}", path.extension())
        )),
    }
}
