//! The uniform block shared by every built-in program
//!
//! Named parameters written through [`UniformSink`](meshview_core::UniformSink)
//! land in fixed slots of one `std140`-compatible block. Every field is a
//! `vec4` or `mat4` so the Rust and WGSL layouts agree without padding.

use bytemuck::{Pod, Zeroable};
use meshview_core::uniforms::names;
use meshview_core::UniformValue;
use nalgebra::{Matrix4, Vector3};

/// Maps OpenGL clip depth (-1..1) onto wgpu clip depth (0..1)
#[rustfmt::skip]
pub fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// Inverse transpose of model-view, for eye-space normals
    pub normal_matrix: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],
    pub material_ambient: [f32; 4],
    pub material_diffuse: [f32; 4],
    /// `w` holds the shininess exponent
    pub material_specular: [f32; 4],
    pub spot_direction: [f32; 4],
    /// inner cutoff, outer cutoff, exponent, unused
    pub spot_params: [f32; 4],
    pub fog_color: [f32; 4],
    /// min distance, max distance, unused, unused
    pub fog_params: [f32; 4],
    pub flat_color: [f32; 4],
    pub outline_color: [f32; 4],
}

impl Default for UniformBlock {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            normal_matrix: identity,
            flat_color: [1.0; 4],
            ..Zeroable::zeroed()
        }
    }
}

fn vec3_slot(slot: &mut [f32; 4], v: &Vector3<f32>) {
    slot[0] = v.x;
    slot[1] = v.y;
    slot[2] = v.z;
}

impl UniformBlock {
    /// Write a named parameter; returns `false` for unknown names or a
    /// value of the wrong type
    pub fn set(&mut self, name: &str, value: UniformValue) -> bool {
        use UniformValue::*;

        match (name, value) {
            (names::LIGHT_POSITION, Vec4(v)) => self.light_position = v.into(),
            (names::LIGHT_AMBIENT, Vec3(v)) => vec3_slot(&mut self.light_ambient, &v),
            (names::LIGHT_DIFFUSE, Vec3(v)) => vec3_slot(&mut self.light_diffuse, &v),
            (names::LIGHT_SPECULAR, Vec3(v)) => vec3_slot(&mut self.light_specular, &v),
            (names::MATERIAL_AMBIENT, Vec3(v)) => vec3_slot(&mut self.material_ambient, &v),
            (names::MATERIAL_DIFFUSE, Vec3(v)) => vec3_slot(&mut self.material_diffuse, &v),
            (names::MATERIAL_SPECULAR, Vec3(v)) => vec3_slot(&mut self.material_specular, &v),
            (names::MATERIAL_SHININESS, Float(f)) => self.material_specular[3] = f,
            (names::SPOT_DIRECTION, Vec3(v)) => vec3_slot(&mut self.spot_direction, &v),
            (names::SPOT_INNER_CUTOFF, Float(f)) => self.spot_params[0] = f,
            (names::SPOT_OUTER_CUTOFF, Float(f)) => self.spot_params[1] = f,
            (names::SPOT_EXPONENT, Float(f)) => self.spot_params[2] = f,
            (names::FOG_MIN_DISTANCE, Float(f)) => self.fog_params[0] = f,
            (names::FOG_MAX_DISTANCE, Float(f)) => self.fog_params[1] = f,
            (names::FOG_COLOR, Vec3(v)) => vec3_slot(&mut self.fog_color, &v),
            (names::FLAT_COLOR, Vec3(v)) => vec3_slot(&mut self.flat_color, &v),
            (names::TOON_OUTLINE_COLOR, Vec3(v)) => vec3_slot(&mut self.outline_color, &v),
            _ => return false,
        }
        true
    }

    /// Fill the transform slots; `projection` uses OpenGL depth conventions
    pub fn set_transforms(&mut self, model: &Matrix4<f32>, view: &Matrix4<f32>, projection: &Matrix4<f32>) {
        let model_view = view * model;
        let normal_matrix = model_view
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix4::identity);

        self.model = (*model).into();
        self.view = (*view).into();
        self.projection = (opengl_to_wgpu() * projection).into();
        self.normal_matrix = normal_matrix.into();
    }
}
