//! Named shader parameters shared by the lighting dispatcher and backends

use nalgebra::{Matrix4, Vector3, Vector4};

/// A typed shader parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat4(Matrix4<f32>),
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(value: Vector3<f32>) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vector4<f32>> for UniformValue {
    fn from(value: Vector4<f32>) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(value: Matrix4<f32>) -> Self {
        UniformValue::Mat4(value)
    }
}

/// Receiver of named shader parameters for the active program
///
/// Writing a name the active program does not use, or writing while no
/// program is active, is a silent no-op.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

/// Uniform names understood by the built-in shader programs
pub mod names {
    pub const LIGHT_AMBIENT: &str = "Light.La";
    pub const LIGHT_DIFFUSE: &str = "Light.Ld";
    pub const LIGHT_SPECULAR: &str = "Light.Ls";
    /// Eye-space light position; `w` is 1 for positional, 0 for directional
    pub const LIGHT_POSITION: &str = "Light.Pos";

    pub const SPOT_DIRECTION: &str = "Spot.Direction";
    /// Cosine of the inner cone half-angle
    pub const SPOT_INNER_CUTOFF: &str = "Spot.InnerCutoff";
    /// Cosine of the outer cone half-angle
    pub const SPOT_OUTER_CUTOFF: &str = "Spot.OuterCutoff";
    pub const SPOT_EXPONENT: &str = "Spot.Exponent";

    pub const MATERIAL_AMBIENT: &str = "Material.Ka";
    pub const MATERIAL_DIFFUSE: &str = "Material.Kd";
    pub const MATERIAL_SPECULAR: &str = "Material.Ks";
    pub const MATERIAL_SHININESS: &str = "Material.alpha";

    pub const TOON_OUTLINE_COLOR: &str = "Toon.OutlineColor";

    pub const FOG_MIN_DISTANCE: &str = "Fog.MinDist";
    pub const FOG_MAX_DISTANCE: &str = "Fog.MaxDist";
    pub const FOG_COLOR: &str = "Fog.Color";

    /// Flat color of the unlit program
    pub const FLAT_COLOR: &str = "Color";

    /// Sampler uniform that receives the bound texture
    pub const DIFFUSE_TEXTURE: &str = "diffuseTexture";
}
