//! Interactive mesh viewer
//!
//! Everything between window input and the render backend:
//! - Orbit camera and perspective projection
//! - Selection registers for shaders, textures and models
//! - Shading models with their material presets, and the uniform dispatcher
//! - Light animation
//! - Scene composition into backend draw calls
//! - Configuration and the winit event loop
//!
//! Apart from [`interactive_viewer`], nothing here needs a window or GPU;
//! frames can be composed against [`recording::RecordingBackend`].

pub mod camera;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod interactive_viewer;
pub mod light;
pub mod material;
pub mod recording;
pub mod scene;
pub mod selection;
pub mod viewer;

pub use camera::*;
pub use config::*;
pub use dispatch::{dispatch, LightingContext};
pub use input::{InputEvent, InputTranslator, Key};
pub use interactive_viewer::InteractiveViewer;
pub use light::*;
pub use material::*;
pub use recording::RecordingBackend;
pub use scene::*;
pub use selection::*;
pub use viewer::*;
