//! OBJ format support

use crate::{IoError, MeshReader};
use meshview_core::{TriangleMesh, Result, Point3f, Vector3f};
use obj::{IndexTuple, ObjData};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct ObjReader;

impl ObjReader {
    /// Parse an OBJ mesh from a reader
    ///
    /// OBJ indexes positions, texture coordinates and normals separately;
    /// each distinct `(position, uv, normal)` tuple becomes one vertex.
    pub fn parse<R: Read>(reader: R) -> Result<TriangleMesh> {
        let data = ObjData::load_buf(reader).map_err(|e| IoError::ParseError {
            message: format!("OBJ parse error: {}", e),
        })?;
        Self::from_obj_data(&data)
    }

    fn from_obj_data(data: &ObjData) -> Result<TriangleMesh> {
        let polygons = data
            .objects
            .iter()
            .flat_map(|object| object.groups.iter())
            .flat_map(|group| group.polys.iter());

        let mut mesh = TriangleMesh::new();
        let mut uvs = Vec::new();
        let mut normals = Vec::new();
        let mut has_uvs = true;
        let mut has_normals = true;
        let mut remap: HashMap<(usize, Option<usize>, Option<usize>), usize> = HashMap::new();

        for polygon in polygons {
            let mut indices = Vec::with_capacity(polygon.0.len());

            for &IndexTuple(p, t, n) in &polygon.0 {
                let key = (p, t, n);
                if let Some(&index) = remap.get(&key) {
                    indices.push(index);
                    continue;
                }

                let position = data.position.get(p).ok_or_else(|| IoError::ParseError {
                    message: format!("Position index {} out of range", p),
                })?;
                let index = mesh.add_vertex(Point3f::from(*position));

                match t.and_then(|t| data.texture.get(t)) {
                    Some(uv) => uvs.push(*uv),
                    None => has_uvs = false,
                }
                match n.and_then(|n| data.normal.get(n)) {
                    Some(normal) => normals.push(Vector3f::from(*normal)),
                    None => has_normals = false,
                }

                remap.insert(key, index);
                indices.push(index);
            }

            for i in 1..indices.len().saturating_sub(1) {
                mesh.add_face([indices[0], indices[i], indices[i + 1]]);
            }
        }

        if has_uvs {
            mesh.set_uvs(uvs);
        }
        if has_normals {
            mesh.set_normals(normals);
        }

        Ok(mesh)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }
}
