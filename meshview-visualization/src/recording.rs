//! A headless render backend that records what the composer asks for
//!
//! Useful for testing frame composition without a window or GPU. Shader
//! scoping follows the same rules as the GPU backend: uniforms written with
//! no active program are dropped and drawing outside a program is an error.

use meshview_core::{Error, Geometry, RenderBackend, Result, UniformSink, UniformValue};
use nalgebra::Matrix4;
use std::collections::HashSet;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetView(Matrix4<f32>),
    SetProjection(Matrix4<f32>),
    BeginShader(String),
    EndShader,
    Uniform(String, UniformValue),
    BindTexture { uniform: String, texture: String },
    Draw { geometry: Geometry, model: Matrix4<f32> },
}

/// Records every accepted call in order
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub commands: Vec<Command>,
    shaders: Option<HashSet<String>>,
    active: Option<String>,
}

impl RecordingBackend {
    /// Backend that accepts any shader name
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that only knows the given shader programs
    pub fn with_shaders<I, S>(shaders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shaders: Some(shaders.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn active_shader(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Recorded draws with the program that was active for each
    pub fn draws(&self) -> Vec<(String, Geometry, Matrix4<f32>)> {
        let mut program = String::new();
        let mut draws = Vec::new();
        for command in &self.commands {
            match command {
                Command::BeginShader(name) => program = name.clone(),
                Command::Draw { geometry, model } => draws.push((program.clone(), *geometry, *model)),
                _ => {}
            }
        }
        draws
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl UniformSink for RecordingBackend {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if self.active.is_some() {
            self.commands.push(Command::Uniform(name.to_string(), value));
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn set_view(&mut self, view: &Matrix4<f32>) {
        self.commands.push(Command::SetView(*view));
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.commands.push(Command::SetProjection(*projection));
    }

    fn begin_shader(&mut self, name: &str) -> Result<()> {
        if let Some(known) = &self.shaders {
            if !known.contains(name) {
                return Err(Error::Visualization(format!("Unknown shader '{}'", name)));
            }
        }
        self.active = Some(name.to_string());
        self.commands.push(Command::BeginShader(name.to_string()));
        Ok(())
    }

    fn end_shader(&mut self) {
        if self.active.take().is_some() {
            self.commands.push(Command::EndShader);
        }
    }

    fn bind_texture(&mut self, uniform: &str, texture: &str) -> Result<()> {
        self.commands.push(Command::BindTexture {
            uniform: uniform.to_string(),
            texture: texture.to_string(),
        });
        Ok(())
    }

    fn draw(&mut self, geometry: Geometry, model: &Matrix4<f32>) -> Result<()> {
        if self.active.is_none() {
            return Err(Error::Visualization(format!("Draw of {:?} outside a shader scope", geometry)));
        }
        self.commands.push(Command::Draw { geometry, model: *model });
        Ok(())
    }
}
