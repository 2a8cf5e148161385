//! Core data structures and traits for meshview
//! 
//! This crate provides the pieces of the viewer that need no window or GPU:
//! triangle meshes and their bounds, affine transforms with a scoped
//! transform stack, the bounding-box normalizer, and the traits through
//! which the viewer talks to mesh loaders and render backends.

pub mod point;
pub mod mesh;
pub mod bounds;
pub mod traits;
pub mod uniforms;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use bounds::*;
pub use traits::*;
pub use uniforms::{UniformSink, UniformValue};
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Vector4, Matrix3, Matrix4};
