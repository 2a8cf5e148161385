//! Light state and the orbital light animator

use nalgebra::{Point3, Vector3, Vector4};

/// Ambient, diffuse and specular light intensities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIntensity {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for LightIntensity {
    fn default() -> Self {
        Self {
            ambient: Vector3::repeat(0.2),
            diffuse: Vector3::repeat(0.5),
            specular: Vector3::repeat(1.0),
        }
    }
}

/// A single light source
///
/// `position.w` tags the light type: 1 for positional, 0 for directional.
/// `theta`/`phi` are the orbital angles used while the light is moving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub position: Vector4<f32>,
    pub intensity: LightIntensity,
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
    pub moving: bool,
}

impl LightState {
    /// Create a stationary light whose orbit passes through `position`
    pub fn from_position(position: Vector4<f32>, intensity: LightIntensity) -> Self {
        let radius = position.xyz().norm();
        let (theta, phi) = if radius > f32::EPSILON {
            (position.x.atan2(position.z), (position.y / radius).clamp(-1.0, 1.0).asin())
        } else {
            (0.0, 0.0)
        };

        Self {
            position,
            intensity,
            theta,
            phi,
            radius,
            moving: false,
        }
    }

    pub fn is_directional(&self) -> bool {
        self.position.w == 0.0
    }

    /// World-space location of the light marker
    pub fn world_position(&self) -> Point3<f32> {
        Point3::from(self.position.xyz())
    }

    /// Flip the moving flag and return the new value
    pub fn toggle_moving(&mut self) -> bool {
        self.moving = !self.moving;
        self.moving
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::from_position(Vector4::new(10.0, 2.5, 5.0, 1.0), LightIntensity::default())
    }
}

/// Advances a moving light along its orbit at fixed angular rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightAnimator {
    /// Radians per second added to theta
    pub theta_rate: f32,
    /// Radians per second added to phi
    pub phi_rate: f32,
}

impl LightAnimator {
    pub fn new(theta_rate: f32, phi_rate: f32) -> Self {
        Self { theta_rate, phi_rate }
    }

    /// Advance the light by `dt` seconds; stationary lights are untouched
    ///
    /// Angles grow without bound; only their sines and cosines are used.
    pub fn advance(&self, light: &mut LightState, dt: f32) {
        if !light.moving {
            return;
        }

        light.theta += dt * self.theta_rate;
        light.phi += dt * self.phi_rate;

        let (sin_theta, cos_theta) = light.theta.sin_cos();
        let (sin_phi, cos_phi) = light.phi.sin_cos();
        let orbit = Vector3::new(sin_theta * cos_phi, sin_phi, cos_theta * cos_phi) * light.radius;

        light.position = orbit.push(light.position.w);
    }
}

impl Default for LightAnimator {
    fn default() -> Self {
        Self::new(0.8, 0.35)
    }
}
