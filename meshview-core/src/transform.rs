//! 3D transformation utilities and the scoped model-transform stack

use nalgebra::{Point3, Vector3, Matrix4, Rotation3};
use std::ops::{Deref, DerefMut};

/// A 3D transformation that can be applied to points and vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&translation),
        }
    }

    /// Create a rotation from XYZ Euler angles in radians (`Rz * Ry * Rx`)
    pub fn euler(angles: Vector3<f32>) -> Self {
        Self {
            matrix: Rotation3::from_euler_angles(angles.x, angles.y, angles.z).to_homogeneous(),
        }
    }

    /// Create a scaling transformation
    pub fn scaling(scale: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&scale),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Apply the transformation to a vector
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0) * vector
    }

    /// Compose this transformation with another (`other` is applied first)
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Option<Self> {
        self.matrix.try_inverse().map(|inv_matrix| Self {
            matrix: inv_matrix,
        })
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        let identity = Matrix4::identity();
        (self.matrix - identity).norm() < epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}

/// Stack of model transforms with strict save/restore nesting
///
/// Local operations post-multiply the current top, so the operation issued
/// last is the first applied to geometry. Saving is only possible through
/// [`TransformStack::push`], whose guard restores the saved top on drop.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Transform3D,
    saved: Vec<Transform3D>,
}

impl TransformStack {
    /// Create a stack whose top is the identity
    pub fn new() -> Self {
        Self::with_base(Transform3D::identity())
    }

    /// Create a stack whose top is `base`
    pub fn with_base(base: Transform3D) -> Self {
        Self {
            current: base,
            saved: Vec::new(),
        }
    }

    /// Save the current top; it is restored when the returned scope drops
    pub fn push(&mut self) -> TransformScope<'_> {
        self.saved.push(self.current);
        let depth = self.saved.len();
        TransformScope { stack: self, depth }
    }

    /// Compose a translation into the current top
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        self.current = self.current * Transform3D::translation(*offset);
    }

    /// Compose a non-uniform scale into the current top
    pub fn scale(&mut self, factors: &Vector3<f32>) {
        self.current = self.current * Transform3D::scaling(*factors);
    }

    /// Compose an XYZ Euler rotation (radians) into the current top
    pub fn rotate(&mut self, angles: &Vector3<f32>) {
        self.current = self.current * Transform3D::euler(*angles);
    }

    /// Compose an arbitrary transform into the current top
    pub fn multiply(&mut self, transform: &Transform3D) {
        self.current = self.current * *transform;
    }

    /// The current model transform
    pub fn current(&self) -> &Transform3D {
        &self.current
    }

    /// Number of saved transforms
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    fn restore(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.current = previous;
        }
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

/// A saved level of a [`TransformStack`]
///
/// Dereferences to the stack so local transforms and nested scopes can be
/// issued through it. Dropping the scope, including while unwinding or on an
/// early `?` return, restores the transform that was current at `push`.
pub struct TransformScope<'a> {
    stack: &'a mut TransformStack,
    depth: usize,
}

impl Deref for TransformScope<'_> {
    type Target = TransformStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for TransformScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        debug_assert_eq!(self.stack.depth(), self.depth, "transform scopes must nest");
        self.stack.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_push_pop_restores_parent() {
        let base = Transform3D::translation(Vector3::new(1.0, 2.0, 3.0));
        let mut stack = TransformStack::with_base(base);

        {
            let mut scope = stack.push();
            scope.scale(&Vector3::new(2.0, 2.0, 2.0));
            scope.rotate(&Vector3::new(0.3, 0.2, 0.1));
            {
                let mut inner = scope.push();
                inner.translate(&Vector3::new(-5.0, 0.0, 0.0));
                assert_eq!(inner.depth(), 2);
            }
            assert_eq!(scope.depth(), 1);
        }

        assert_eq!(stack.depth(), 0);
        assert_eq!(*stack.current(), base);
    }

    #[test]
    fn test_scope_restores_on_early_return() {
        fn failing(stack: &mut TransformStack) -> Result<(), ()> {
            let mut scope = stack.push();
            scope.translate(&Vector3::new(9.0, 9.0, 9.0));
            Err(())
        }

        let mut stack = TransformStack::new();
        assert!(failing(&mut stack).is_err());
        assert_eq!(stack.depth(), 0);
        assert!(stack.current().is_identity(1e-6));
    }

    #[test]
    fn test_last_operation_applies_first() {
        let mut stack = TransformStack::new();
        stack.scale(&Vector3::new(2.0, 2.0, 2.0));
        stack.translate(&Vector3::new(1.0, 0.0, 0.0));

        // Translate first, then scale: (0 + 1) * 2
        let p = stack.current().transform_point(&Point3::origin());
        assert_relative_eq!(p, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_euler_rotation_turns_up_into_forward() {
        let t = Transform3D::euler(Vector3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0));
        assert_relative_eq!(t.transform_vector(&Vector3::y()), Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let t = Transform3D::translation(Vector3::new(1.0, -2.0, 0.5))
            * Transform3D::uniform_scaling(3.0);
        let inv = t.inverse().unwrap();
        assert!((t * inv).is_identity(1e-5));
    }
}
