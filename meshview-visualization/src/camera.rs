//! Orbit camera and perspective projection
//!
//! The camera is parameterized by `(radius, azimuth, elevation)` around a
//! fixed look point. Its eye position, basis and view transform are derived
//! from that state every time they are requested and never cached.

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Closest the camera may get to the look point
pub const RADIUS_MIN: f32 = 10.0;

/// Margin keeping elevation strictly inside `(-pi/2, pi/2)`
pub const ELEVATION_EPSILON: f32 = 1e-5;

/// Spherical camera coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            radius: RADIUS_MIN,
            azimuth: 0.0,
            elevation: 0.0,
        }
    }
}

/// Right-handed camera frame derived from the eye position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    /// Points from the look point back toward the eye
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
}

/// A camera orbiting a fixed look point
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    state: OrbitState,
    look: Point3<f32>,
    radius_min: f32,
    radius_max: Option<f32>,
}

impl OrbitCamera {
    /// Create a camera looking at the origin with the default radius floor
    pub fn new(state: OrbitState) -> Self {
        let mut camera = Self {
            state,
            look: Point3::origin(),
            radius_min: RADIUS_MIN,
            radius_max: None,
        };
        camera.clamp();
        camera
    }

    /// Set the radius limits; `max` below `min` is raised to `min`
    pub fn with_radius_limits(mut self, min: f32, max: Option<f32>) -> Self {
        self.radius_min = min;
        self.radius_max = max.map(|m| m.max(min));
        self.clamp();
        self
    }

    /// Current spherical coordinates
    pub fn state(&self) -> OrbitState {
        self.state
    }

    pub fn look(&self) -> Point3<f32> {
        self.look
    }

    pub fn radius_limits(&self) -> (f32, Option<f32>) {
        (self.radius_min, self.radius_max)
    }

    /// Rotate around the look point; azimuth wraps freely, elevation is clamped
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.state.azimuth += d_azimuth;
        self.state.elevation += d_elevation;
        self.clamp();
    }

    /// Move toward (negative) or away from (positive) the look point
    pub fn zoom(&mut self, d_radius: f32) {
        self.state.radius += d_radius;
        self.clamp();
        tracing::debug!(radius = self.state.radius, "Camera radius changed");
    }

    /// Level the camera and face it from `azimuth`, keeping the radius
    pub fn reset(&mut self, azimuth: f32) {
        self.state.azimuth = azimuth;
        self.state.elevation = 0.0;
    }

    /// Eye position in world space
    pub fn eye(&self) -> Point3<f32> {
        let OrbitState { radius, azimuth, elevation } = self.state;
        self.look
            + Vector3::new(
                radius * azimuth.sin() * elevation.cos(),
                radius * elevation.sin(),
                radius * azimuth.cos() * elevation.cos(),
            )
    }

    /// Camera frame: `forward = eye - look`, `right = worldUp x forward`,
    /// `up = forward x right`, all normalized
    pub fn basis(&self) -> CameraBasis {
        let forward = (self.eye() - self.look).normalize();
        let right = Vector3::y().cross(&forward).normalize();
        let up = forward.cross(&right);
        CameraBasis { forward, right, up }
    }

    /// Look-at view transform for the current orbit state
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let basis = self.basis();
        Matrix4::look_at_rh(&self.eye(), &self.look, &basis.up)
    }

    fn clamp(&mut self) {
        let limit = FRAC_PI_2 - ELEVATION_EPSILON;
        self.state.elevation = self.state.elevation.clamp(-limit, limit);

        let mut radius = self.state.radius.max(self.radius_min);
        if let Some(max) = self.radius_max {
            radius = radius.min(max);
        }
        self.state.radius = radius;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(OrbitState::default())
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

/// Aspect ratio used when none can be derived from a framebuffer size
pub const FALLBACK_ASPECT_RATIO: f32 = 16.0 / 9.0;

impl Projection {
    /// A zero, negative or non-finite `aspect_ratio` is replaced by [`FALLBACK_ASPECT_RATIO`]
    pub fn new(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            FALLBACK_ASPECT_RATIO
        };
        Self {
            fov_y,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Update the aspect ratio from a framebuffer size; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// Get the projection matrix (OpenGL clip-space conventions)
    pub fn matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect_ratio, self.fov_y, self.near, self.far).into_inner()
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(60f32.to_radians(), FALLBACK_ASPECT_RATIO, 0.1, 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_eye_on_positive_z_at_rest() {
        let camera = OrbitCamera::new(OrbitState { radius: 10.0, azimuth: 0.0, elevation: 0.0 });
        assert_relative_eq!(camera.eye(), Point3::new(0.0, 0.0, 10.0), epsilon = 1e-6);
    }

    #[test]
    fn test_eye_follows_azimuth_and_elevation() {
        let camera = OrbitCamera::new(OrbitState { radius: 20.0, azimuth: PI / 2.0, elevation: PI / 6.0 });
        let eye = camera.eye();
        assert_relative_eq!(eye.x, 20.0 * (PI / 6.0).cos(), epsilon = 1e-4);
        assert_relative_eq!(eye.y, 10.0, epsilon = 1e-4);
        assert_relative_eq!(eye.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_elevation_stays_strictly_inside_bounds() {
        let mut camera = OrbitCamera::default();
        for _ in 0..100 {
            camera.orbit(0.3, 10.0);
            assert!(camera.state().elevation < FRAC_PI_2);
        }
        for _ in 0..100 {
            camera.orbit(-0.3, -1000.0);
            assert!(camera.state().elevation > -FRAC_PI_2);
        }
    }

    #[test]
    fn test_basis_is_orthonormal_near_the_pole() {
        let mut camera = OrbitCamera::default();
        camera.orbit(1.0, 100.0);
        let basis = camera.basis();

        assert!(basis.right.norm().is_finite());
        assert_relative_eq!(basis.right.norm(), 1.0, epsilon = 1e-3);
        assert_relative_eq!(basis.up.norm(), 1.0, epsilon = 1e-3);
        assert_relative_eq!(basis.forward.dot(&basis.right), 0.0, epsilon = 1e-3);
        assert_relative_eq!(basis.forward.dot(&basis.up), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_radius_never_below_minimum() {
        let mut camera = OrbitCamera::default();
        for delta in [-1.0, -50.0, 3.0, -0.5, -1e6] {
            camera.zoom(delta);
            assert!(camera.state().radius >= RADIUS_MIN);
        }
        camera.zoom(15.0);
        assert_relative_eq!(camera.state().radius, RADIUS_MIN + 15.0);
    }

    #[test]
    fn test_radius_capped_in_room() {
        let mut camera = OrbitCamera::default().with_radius_limits(RADIUS_MIN, Some(19.0));
        camera.zoom(100.0);
        assert_relative_eq!(camera.state().radius, 19.0);

        // A cap below the floor collapses to the floor
        let camera = OrbitCamera::default().with_radius_limits(RADIUS_MIN, Some(2.0));
        assert_eq!(camera.radius_limits(), (RADIUS_MIN, Some(RADIUS_MIN)));
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin_and_look_down_negative_z() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.7, -0.4);
        let view = camera.view_matrix();

        assert_relative_eq!(view.transform_point(&camera.eye()), Point3::origin(), epsilon = 1e-4);
        let look = view.transform_point(&camera.look());
        assert_relative_eq!(look.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(look.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(look.z, -camera.state().radius, epsilon = 1e-4);
    }

    #[test]
    fn test_reset_levels_camera_and_keeps_radius() {
        let mut camera = OrbitCamera::default();
        camera.zoom(5.0);
        camera.orbit(2.0, 0.5);
        camera.reset(0.0);

        assert_eq!(camera.state(), OrbitState { radius: 15.0, azimuth: 0.0, elevation: 0.0 });
    }

    #[test]
    fn test_projection_resize_ignores_zero_height() {
        let mut projection = Projection::default();
        projection.resize(800, 0);
        assert_relative_eq!(projection.aspect_ratio, 16.0 / 9.0);
        projection.resize(800, 400);
        assert_relative_eq!(projection.aspect_ratio, 2.0);
    }

    #[test]
    fn test_projection_rejects_degenerate_aspect() {
        for aspect in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let projection = Projection::new(60f32.to_radians(), aspect, 0.1, 50.0);
            assert_relative_eq!(projection.aspect_ratio, FALLBACK_ASPECT_RATIO);
            assert!(projection.matrix().iter().all(|v| v.is_finite()));
        }
    }
}
