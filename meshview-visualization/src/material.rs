//! Shading models and their material presets

use meshview_core::{Error, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Program used for the light marker
pub const UNLIT_SHADER: &str = "unlit";

/// A selectable lighting/material computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadingModel {
    /// Eye-space normals as color, no lighting
    Normals,
    /// Phong evaluated per vertex (Gouraud)
    PhongVertex,
    /// Phong evaluated per fragment
    PhongPixel,
    /// Phong restricted to a cone aimed at the origin
    Spotlight,
    /// Banded diffuse with a dark silhouette
    Toon,
    /// Per-fragment Phong blended toward a fog color by eye distance
    Fog,
}

impl ShadingModel {
    pub const ALL: [ShadingModel; 6] = [
        ShadingModel::Normals,
        ShadingModel::PhongVertex,
        ShadingModel::PhongPixel,
        ShadingModel::Spotlight,
        ShadingModel::Toon,
        ShadingModel::Fog,
    ];

    /// Name of the shader program implementing this model
    pub fn shader_name(self) -> &'static str {
        match self {
            ShadingModel::Normals => "normals",
            ShadingModel::PhongVertex => "phong-vertex",
            ShadingModel::PhongPixel => "phong-pixel",
            ShadingModel::Spotlight => "spotlight",
            ShadingModel::Toon => "toon",
            ShadingModel::Fog => "fog",
        }
    }

    /// Read-only coefficients for this model
    pub fn preset(self) -> MaterialPreset {
        const BLUE: [f32; 3] = [0.21, 0.31, 1.0];
        let blue = Vector3::from(BLUE);

        match self {
            ShadingModel::Normals => MaterialPreset::default(),
            ShadingModel::PhongVertex | ShadingModel::PhongPixel => MaterialPreset {
                ambient: blue,
                diffuse: blue,
                specular: Vector3::repeat(0.5),
                shininess: 32.0,
                ..MaterialPreset::default()
            },
            ShadingModel::Spotlight => MaterialPreset {
                ambient: blue * 0.5,
                diffuse: blue,
                specular: Vector3::repeat(0.8),
                shininess: 64.0,
                spot: Some(SpotCone {
                    inner_degrees: 12.0,
                    outer_degrees: 20.0,
                    exponent: 8.0,
                }),
                ..MaterialPreset::default()
            },
            ShadingModel::Toon => MaterialPreset {
                ambient: blue * 0.3,
                diffuse: blue,
                outline: Some(Vector3::zeros()),
                ..MaterialPreset::default()
            },
            ShadingModel::Fog => MaterialPreset {
                ambient: Vector3::repeat(0.4),
                diffuse: Vector3::repeat(0.9),
                specular: Vector3::repeat(0.2),
                shininess: 16.0,
                fog: Some(FogRange {
                    near_factor: 0.1,
                    far_factor: 0.75,
                    color: Vector3::new(0.6, 0.6, 0.65),
                }),
                ..MaterialPreset::default()
            },
        }
    }
}

impl fmt::Display for ShadingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shader_name())
    }
}

impl FromStr for ShadingModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ShadingModel::ALL
            .into_iter()
            .find(|m| m.shader_name() == s)
            .ok_or_else(|| Error::Config(format!("Unknown shading model '{}'", s)))
    }
}

/// Spotlight cone, stored as half-angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotCone {
    pub inner_degrees: f32,
    pub outer_degrees: f32,
    pub exponent: f32,
}

impl SpotCone {
    /// Cosine of the inner half-angle (full intensity inside)
    pub fn inner_cutoff(&self) -> f32 {
        self.inner_degrees.to_radians().cos()
    }

    /// Cosine of the outer half-angle (no light outside)
    pub fn outer_cutoff(&self) -> f32 {
        self.outer_degrees.to_radians().cos()
    }
}

/// Fog falloff expressed relative to the room scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogRange {
    pub near_factor: f32,
    pub far_factor: f32,
    pub color: Vector3<f32>,
}

impl FogRange {
    /// `(near, far)` eye distances for a room of edge length `room_scale`
    pub fn distances(&self, room_scale: f32) -> (f32, f32) {
        (self.near_factor * room_scale, self.far_factor * room_scale)
    }
}

/// Constant coefficient set for one shading model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPreset {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
    pub spot: Option<SpotCone>,
    pub fog: Option<FogRange>,
    pub outline: Option<Vector3<f32>>,
}

impl Default for MaterialPreset {
    fn default() -> Self {
        Self {
            ambient: Vector3::zeros(),
            diffuse: Vector3::zeros(),
            specular: Vector3::zeros(),
            shininess: 1.0,
            spot: None,
            fog: None,
            outline: None,
        }
    }
}
