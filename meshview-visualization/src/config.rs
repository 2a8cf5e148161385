//! Viewer configuration (TOML)

use crate::camera::{OrbitState, RADIUS_MIN};
use crate::material::ShadingModel;
use meshview_core::{Error, Result, DEFAULT_HALF_EXTENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest relative gap allowed between the near and far planes
const MIN_DEPTH_RATIO: f32 = 1e-4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default = "default_model_extensions")]
    pub model_extensions: Vec<String>,
    #[serde(default = "default_textures_dir")]
    pub textures_dir: PathBuf,
    #[serde(default = "default_texture_extension")]
    pub texture_extension: String,
    /// Shader catalog, in cycling order
    #[serde(default = "default_shaders")]
    pub shaders: Vec<ShadingModel>,
    #[serde(default = "default_half_extent")]
    pub fit_half_extent: f32,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub room: RoomConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_radius_min")]
    pub radius_min: f32,
    /// Radians of orbit per pixel of drag
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_fov")]
    pub fov_y_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default)]
    pub initial: OrbitState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// `w` = 1 positional, 0 directional
    #[serde(default = "default_light_position")]
    pub position: [f32; 4],
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 3],
    #[serde(default = "default_diffuse")]
    pub diffuse: [f32; 3],
    #[serde(default = "default_specular")]
    pub specular: [f32; 3],
    #[serde(default = "default_theta_rate")]
    pub theta_rate: f32,
    #[serde(default = "default_phi_rate")]
    pub phi_rate: f32,
    #[serde(default)]
    pub moving: bool,
    #[serde(default = "default_marker_size")]
    pub marker_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_room_scale")]
    pub scale: f32,
    #[serde(default = "default_room_texture")]
    pub texture: String,
}

fn default_models_dir() -> PathBuf { PathBuf::from("models") }
fn default_model_extensions() -> Vec<String> { vec!["ply".to_string()] }
fn default_textures_dir() -> PathBuf { PathBuf::from("textures") }
fn default_texture_extension() -> String { "png".to_string() }
fn default_shaders() -> Vec<ShadingModel> { ShadingModel::ALL.to_vec() }
fn default_half_extent() -> f32 { DEFAULT_HALF_EXTENT }
fn default_title() -> String { "Mesh Viewer".to_string() }
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_background() -> [f32; 3] { [0.1, 0.1, 0.12] }
fn default_radius_min() -> f32 { RADIUS_MIN }
fn default_sensitivity() -> f32 { 0.01 }
fn default_fov() -> f32 { 60.0 }
fn default_near() -> f32 { 0.1 }
fn default_far() -> f32 { 50.0 }
fn default_light_position() -> [f32; 4] { [10.0, 2.5, 5.0, 1.0] }
fn default_ambient() -> [f32; 3] { [0.2; 3] }
fn default_diffuse() -> [f32; 3] { [0.5; 3] }
fn default_specular() -> [f32; 3] { [1.0; 3] }
fn default_theta_rate() -> f32 { 0.8 }
fn default_phi_rate() -> f32 { 0.35 }
fn default_marker_size() -> f32 { 0.5 }
fn default_room_scale() -> f32 { 40.0 }
fn default_room_texture() -> String { "wall.png".to_string() }

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            model_extensions: default_model_extensions(),
            textures_dir: default_textures_dir(),
            texture_extension: default_texture_extension(),
            shaders: default_shaders(),
            fit_half_extent: default_half_extent(),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            room: RoomConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            background: default_background(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius_min: default_radius_min(),
            sensitivity: default_sensitivity(),
            fov_y_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            initial: OrbitState::default(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: default_light_position(),
            ambient: default_ambient(),
            diffuse: default_diffuse(),
            specular: default_specular(),
            theta_rate: default_theta_rate(),
            phi_rate: default_phi_rate(),
            moving: false,
            marker_size: default_marker_size(),
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scale: default_room_scale(),
            texture: default_room_texture(),
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&content)?;
                tracing::info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject settings the viewer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.shaders.is_empty() {
            return Err(Error::EmptyCatalog("shaders".to_string()));
        }
        let positive = [
            ("fit_half_extent", self.fit_half_extent),
            ("camera.radius_min", self.camera.radius_min),
            ("camera.fov_y_degrees", self.camera.fov_y_degrees),
            ("camera.near", self.camera.near),
            ("light.marker_size", self.light.marker_size),
            ("room.scale", self.room.scale),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.camera.fov_y_degrees >= 180.0 {
            return Err(Error::Config("camera.fov_y_degrees must be below 180".to_string()));
        }
        // Planes closer than this collapse the depth range
        if self.camera.far.is_nan() || self.camera.far <= self.camera.near * (1.0 + MIN_DEPTH_RATIO) {
            return Err(Error::Config("camera.far must exceed camera.near".to_string()));
        }
        if self.model_extensions.is_empty() {
            return Err(Error::Config("model_extensions must not be empty".to_string()));
        }
        Ok(())
    }

    /// Far plane, widened to enclose the room when it is drawn
    pub fn far_plane(&self) -> f32 {
        if self.room.enabled {
            self.camera.far.max(2.0 * self.room.scale)
        } else {
            self.camera.far
        }
    }
}
