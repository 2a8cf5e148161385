//! Model catalog enumeration and directory-backed mesh loading

use crate::read_mesh;
use meshview_core::{MeshSource, Result, TriangleMesh};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the names of files directly inside `dir` whose extension matches `ext`
///
/// The comparison ignores case and an optional leading dot in `ext`. Names
/// are sorted so catalog indices are stable between runs.
pub fn list_files_with_extension<P: AsRef<Path>>(dir: P, ext: &str) -> Result<Vec<String>> {
    list_files_with_extensions(dir, &[ext])
}

/// Like [`list_files_with_extension`] for several extensions at once
pub fn list_files_with_extensions<P: AsRef<Path>, S: AsRef<str>>(dir: P, exts: &[S]) -> Result<Vec<String>> {
    let wanted: Vec<String> = exts
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut names = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed"))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| wanted.iter().any(|w| w.eq_ignore_ascii_case(e)))
            .unwrap_or(false);

        if matches {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

/// Loads catalog entries by name from a models directory
#[derive(Debug, Clone)]
pub struct DirectoryMeshSource {
    root: PathBuf,
}

impl DirectoryMeshSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MeshSource for DirectoryMeshSource {
    fn load_mesh(&self, name: &str) -> Result<TriangleMesh> {
        let path = self.root.join(name);
        let mut mesh = read_mesh(&path)?;

        if mesh.normals.is_none() {
            mesh.compute_vertex_normals();
        }

        tracing::debug!(
            path = %path.display(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Loaded mesh"
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lists_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cube.ply", "Bunny.PLY", "notes.txt", "armadillo.ply"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.ply")).unwrap();

        let names = list_files_with_extension(dir.path(), "ply").unwrap();
        assert_eq!(names, vec!["Bunny.PLY", "armadillo.ply", "cube.ply"]);

        let dotted = list_files_with_extension(dir.path(), ".ply").unwrap();
        assert_eq!(dotted, names);
    }

    #[test]
    fn test_multiple_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.obj", "b.ply", "c.stl"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let names = list_files_with_extensions(dir.path(), &["ply", "obj"]).unwrap();
        assert_eq!(names, vec!["a.obj", "b.ply"]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        assert!(list_files_with_extension("no/such/dir", "ply").is_err());
    }

    #[test]
    fn test_directory_source_computes_normals() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let source = DirectoryMeshSource::new(dir.path());
        let mesh = source.load_mesh("tri.obj").unwrap();
        assert!(mesh.normals.is_some());
        assert!(source.load_mesh("missing.obj").is_err());
    }
}
