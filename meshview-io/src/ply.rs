//! PLY format support

use crate::{IoError, MeshReader};
use meshview_core::{TriangleMesh, Result, Point3f, Vector3f, TexCoord};
use std::path::Path;
use std::fs::File;
use std::io::{BufRead, BufReader};
use ply_rs::{
    parser::Parser,
    ply::{Property, DefaultElement},
};

/// Texture coordinate property pairs, in lookup order
const UV_PROPERTIES: [(&str, &str); 3] = [("u", "v"), ("s", "t"), ("texture_u", "texture_v")];

pub struct PlyReader;

impl PlyReader {
    /// Parse a PLY mesh (ASCII or binary) from a buffered reader
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<TriangleMesh> {
        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(reader)?;

        // Extract vertices
        let vertex_element = ply.payload.get("vertex").map(Vec::as_slice).unwrap_or(&[]);
        let mut vertices = Vec::with_capacity(vertex_element.len());
        for vertex in vertex_element {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;

            vertices.push(Point3f::new(x, y, z));
        }

        // Extract faces, fanning polygons into triangles
        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face)?;
                if let Some(&bad) = indices.iter().find(|&&i| i >= vertices.len()) {
                    return Err(IoError::ParseError {
                        message: format!(
                            "Face references vertex {} but only {} vertices exist",
                            bad,
                            vertices.len()
                        ),
                    }
                    .into());
                }
                for i in 1..indices.len().saturating_sub(1) {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
        }

        // Normals and texture coordinates are kept only when every vertex has them
        let normals: Option<Vec<Vector3f>> = vertex_element
            .iter()
            .map(|vertex| {
                Some(Vector3f::new(
                    extract_property_value(vertex, "nx").ok()?,
                    extract_property_value(vertex, "ny").ok()?,
                    extract_property_value(vertex, "nz").ok()?,
                ))
            })
            .collect();

        let uvs: Option<Vec<TexCoord>> = UV_PROPERTIES.iter().find_map(|(u, v)| {
            vertex_element
                .iter()
                .map(|vertex| {
                    Some([
                        extract_property_value(vertex, u).ok()?,
                        extract_property_value(vertex, v).ok()?,
                    ])
                })
                .collect()
        });

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = normals.filter(|n| !n.is_empty()) {
            mesh.set_normals(normals);
        }
        if let Some(uvs) = uvs.filter(|uv| !uv.is_empty()) {
            mesh.set_uvs(uvs);
        }

        Ok(mesh)
    }
}

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::parse(&mut reader)
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        Some(Property::Char(val)) => Ok(*val as f32),
        Some(Property::UChar(val)) => Ok(*val as f32),
        _ => Err(IoError::ParseError {
            message: format!("Property '{}' not found or invalid type", name),
        }
        .into()),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let property = element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"));

    let indices: Vec<i64> = match property {
        Some(Property::ListInt(indices)) => indices.iter().map(|&i| i as i64).collect(),
        Some(Property::ListUInt(indices)) => indices.iter().map(|&i| i as i64).collect(),
        Some(Property::ListShort(indices)) => indices.iter().map(|&i| i as i64).collect(),
        Some(Property::ListUShort(indices)) => indices.iter().map(|&i| i as i64).collect(),
        Some(Property::ListChar(indices)) => indices.iter().map(|&i| i as i64).collect(),
        Some(Property::ListUChar(indices)) => indices.iter().map(|&i| i as i64).collect(),
        _ => {
            return Err(IoError::ParseError {
                message: "Face indices not found".to_string(),
            }
            .into())
        }
    };

    indices
        .into_iter()
        .map(|i| {
            usize::try_from(i).map_err(|_| {
                IoError::ParseError {
                    message: format!("Negative face index {}", i),
                }
                .into()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD_WITH_NORMALS: &str = "ply
format ascii 1.0
comment unit quad
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
property float u
property float v
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0 1 0 0
1 0 0 0 0 1 1 0
1 1 0 0 0 1 1 1
0 1 0 0 0 1 0 1
4 0 1 2 3
";

    #[test]
    fn test_ascii_quad_is_fanned() {
        let mesh = PlyReader::parse(&mut QUAD_WITH_NORMALS.as_bytes()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.normals.as_ref().unwrap()[2], Vector3f::z());
        assert_eq!(mesh.uvs.as_ref().unwrap()[2], [1.0, 1.0]);
        assert_relative_eq!(mesh.max_bounds(), Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_positions_only() {
        let data = "ply
format ascii 1.0
element vertex 3
property double x
property double y
property double z
element face 1
property list uchar uint vertex_index
end_header
-1 0 0
1 0 0
0 2 0
3 0 1 2
";
        let mesh = PlyReader::parse(&mut data.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.normals.is_none());
        assert!(mesh.uvs.is_none());
        assert_relative_eq!(mesh.min_bounds(), Point3f::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let data = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 7
";
        let err = PlyReader::parse(&mut data.as_bytes()).unwrap_err();
        assert!(matches!(err, meshview_core::Error::InvalidData(_)));
    }

    #[test]
    fn test_read_mesh_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.ply");
        std::fs::write(&path, QUAD_WITH_NORMALS).unwrap();

        let mesh = PlyReader::read_mesh(&path).unwrap();
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PlyReader::read_mesh("does/not/exist.ply").unwrap_err();
        assert!(matches!(err, meshview_core::Error::Io(_)));
    }
}
