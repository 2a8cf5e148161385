//! Point and vector type aliases

use nalgebra::{Point3, Vector3, Vector4};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A homogeneous vector; the `w` component tags positions (1) and directions (0)
pub type Vector4f = Vector4<f32>;

/// Texture coordinates
pub type TexCoord = [f32; 2];
