//! Core traits for meshview
//!
//! These are the seams between the viewer logic and its collaborators: the
//! mesh loader, and the render backend that owns shader programs, textures
//! and GPU geometry.

use crate::{mesh::*, uniforms::UniformSink, Result};
use nalgebra::Matrix4;

/// Trait for objects that can load meshes by catalog name
pub trait MeshSource {
    /// Load the named mesh; no partially loaded state is ever returned
    fn load_mesh(&self, name: &str) -> Result<TriangleMesh>;
}

/// Blanket support for plain loader closures, handy in tests
impl<F> MeshSource for F
where
    F: Fn(&str) -> Result<TriangleMesh>,
{
    fn load_mesh(&self, name: &str) -> Result<TriangleMesh> {
        self(name)
    }
}

/// Geometry the backend knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// The currently loaded model mesh
    ActiveMesh,
    /// Unit cube centered at the origin
    Cube,
    /// Unit plane in XZ facing +Y
    Plane,
}

/// Render backend driven by the scene composer once per frame
pub trait RenderBackend: UniformSink {
    /// Set the view transform used by subsequent draws
    fn set_view(&mut self, view: &Matrix4<f32>);

    /// Set the projection transform used by subsequent draws
    fn set_projection(&mut self, projection: &Matrix4<f32>);

    /// Activate a loaded shader program by name
    fn begin_shader(&mut self, name: &str) -> Result<()>;

    /// Deactivate the current shader program
    fn end_shader(&mut self);

    /// Bind a loaded texture to a sampler uniform for subsequent draws
    fn bind_texture(&mut self, uniform: &str, texture: &str) -> Result<()>;

    /// Draw geometry under the active program with the given model transform
    fn draw(&mut self, geometry: Geometry, model: &Matrix4<f32>) -> Result<()>;
}
