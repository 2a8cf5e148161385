//! Mesh data structures and functionality

use crate::point::*;

/// A triangle mesh with vertices, faces and optional per-vertex attributes
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub uvs: Option<Vec<TexCoord>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            uvs: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            uvs: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Calculate face normals
    ///
    /// Degenerate triangles yield a zero vector instead of NaN.
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Compute area-weighted vertex normals and store them on the mesh
    pub fn compute_vertex_normals(&mut self) {
        let mut accumulated = vec![Vector3f::zeros(); self.vertices.len()];

        for face in &self.faces {
            let v0 = self.vertices[face[0]];
            let v1 = self.vertices[face[1]];
            let v2 = self.vertices[face[2]];

            // Unnormalized cross product: its length is twice the triangle area
            let weighted = (v1 - v0).cross(&(v2 - v0));
            for &index in face {
                accumulated[index] += weighted;
            }
        }

        let normals = accumulated
            .into_iter()
            .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::y))
            .collect();
        self.normals = Some(normals);
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex texture coordinates
    pub fn set_uvs(&mut self, uvs: Vec<TexCoord>) {
        if uvs.len() == self.vertices.len() {
            self.uvs = Some(uvs);
        }
    }

    /// Component-wise minimum corner of the axis-aligned bounding box
    pub fn min_bounds(&self) -> Point3f {
        self.bounds().0
    }

    /// Component-wise maximum corner of the axis-aligned bounding box
    pub fn max_bounds(&self) -> Point3f {
        self.bounds().1
    }

    /// Axis-aligned bounding box as `(min, max)`; the origin for an empty mesh
    pub fn bounds(&self) -> (Point3f, Point3f) {
        let Some(first) = self.vertices.first() else {
            return (Point3f::origin(), Point3f::origin());
        };

        self.vertices.iter().fold((*first, *first), |(min, max), v| {
            (
                Point3f::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z)),
                Point3f::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z)),
            )
        })
    }

    /// Axis-aligned cube of edge length 1 centered at the origin, with flat
    /// per-face normals and per-face texture coordinates
    pub fn unit_cube() -> Self {
        // (normal, tangent u, tangent v) for each face
        let sides = [
            (Vector3f::z(), Vector3f::x(), Vector3f::y()),
            (-Vector3f::z(), -Vector3f::x(), Vector3f::y()),
            (Vector3f::y(), Vector3f::x(), -Vector3f::z()),
            (-Vector3f::y(), Vector3f::x(), Vector3f::z()),
            (Vector3f::x(), -Vector3f::z(), Vector3f::y()),
            (-Vector3f::x(), Vector3f::z(), Vector3f::y()),
        ];

        let mut mesh = Self::new();
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);

        for (normal, u, v) in sides {
            let base = mesh.vertices.len();
            for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                let p = normal * 0.5 + u * su + v * sv;
                mesh.add_vertex(Point3f::from(p));
                normals.push(normal);
                uvs.push([su + 0.5, 0.5 - sv]);
            }
            mesh.add_face([base, base + 1, base + 2]);
            mesh.add_face([base, base + 2, base + 3]);
        }

        mesh.normals = Some(normals);
        mesh.uvs = Some(uvs);
        mesh
    }

    /// Unit square in the XZ plane centered at the origin, facing +Y
    pub fn unit_plane() -> Self {
        let vertices = vec![
            Point3f::new(-0.5, 0.0, 0.5),
            Point3f::new(0.5, 0.0, 0.5),
            Point3f::new(0.5, 0.0, -0.5),
            Point3f::new(-0.5, 0.0, -0.5),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];

        let mut mesh = Self::from_vertices_and_faces(vertices, faces);
        mesh.normals = Some(vec![Vector3f::y(); 4]);
        mesh.uvs = Some(vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
        mesh
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
