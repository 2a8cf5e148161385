//! Bounding-box normalization
//!
//! Maps an arbitrary axis-aligned bounding box into a cube of fixed
//! half-extent centered at the origin, using one uniform scale so the
//! mesh keeps its aspect ratio.

use crate::point::*;
use nalgebra::Matrix4;

/// Extents smaller than this are treated as flat and scale by 1
pub const FIT_EPSILON: f32 = 1e-6;

/// Half-extent of the reference view box (a 10 x 10 x 10 cube)
pub const DEFAULT_HALF_EXTENT: f32 = 5.0;

/// Uniform scale and translation fitting a box into the reference cube
///
/// The translation is applied first, then the scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsFit {
    pub scale: f32,
    pub translate: Vector3f,
}

impl BoundsFit {
    /// Compute the fit of `[min, max]` into a cube of half-extent `half_extent`
    pub fn compute(min: &Point3f, max: &Point3f, half_extent: f32) -> Self {
        let extent = max - min;
        let side = 2.0 * half_extent;

        let scale = extent
            .iter()
            .map(|&e| if e.abs() < FIT_EPSILON { 1.0 } else { side / e })
            .fold(f32::INFINITY, f32::min);

        let midpoint = (min.coords + max.coords) * 0.5;

        Self {
            scale,
            translate: -midpoint,
        }
    }

    /// Identity fit, used when no mesh is loaded
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translate: Vector3f::zeros(),
        }
    }

    /// Apply the fit to a point
    pub fn apply(&self, point: &Point3f) -> Point3f {
        (point + self.translate) * self.scale
    }

    /// The fit as a model matrix (`scale * translate`)
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_scaling(self.scale) * Matrix4::new_translation(&self.translate)
    }
}

impl Default for BoundsFit {
    fn default() -> Self {
        Self::identity()
    }
}
