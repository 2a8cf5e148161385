//! Windowed viewer: winit event loop driving [`ViewerState`] and the wgpu renderer

use std::sync::Arc;

use instant::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use meshview_core::{Error, Result};
use meshview_gpu::SceneRenderer;
use meshview_io::{list_files_with_extension, list_files_with_extensions, DirectoryMeshSource};

use crate::config::ViewerConfig;
use crate::input::InputTranslator;
use crate::viewer::{ViewerAction, ViewerState};

/// Interactive mesh viewer window
pub struct InteractiveViewer {
    config: ViewerConfig,
}

impl InteractiveViewer {
    /// Create a viewer; the configuration is validated up front
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Build the initial viewer state from the model and texture directories
    ///
    /// An unreadable models directory is an error. Textures are optional, so
    /// an unreadable textures directory leaves the texture catalog empty.
    pub fn build_state(&self) -> Result<ViewerState> {
        let config = &self.config;
        let models = list_files_with_extensions(&config.models_dir, &config.model_extensions)?;
        tracing::info!("Found {} models in {}", models.len(), config.models_dir.display());

        let textures = match list_files_with_extension(&config.textures_dir, &config.texture_extension) {
            Ok(textures) => textures,
            Err(e) => {
                tracing::warn!("Cannot list textures in {}: {}", config.textures_dir.display(), e);
                Vec::new()
            }
        };

        let source = DirectoryMeshSource::new(config.models_dir.clone());
        let mut state = ViewerState::new(config, models, textures, Box::new(source));
        state.load_initial_model();
        Ok(state)
    }

    /// Open the window and run until it is closed or Escape is released
    pub fn run(self) -> Result<()> {
        tracing::info!("Starting mesh viewer");

        let mut state = self.build_state()?;

        let event_loop = EventLoop::new().map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(self.config.window.title.as_str())
                .with_inner_size(winit::dpi::PhysicalSize::new(self.config.window.width, self.config.window.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let mut renderer = pollster::block_on(SceneRenderer::new(window.clone(), self.config.window.background))?;
        load_textures(&mut renderer, &self.config, state.selection.textures.entries());

        let size = window.inner_size();
        state.projection.resize(size.width, size.height);

        let mut translator = InputTranslator::new();
        let mut uploaded_revision = 0;
        let mut last_frame = Instant::now();

        tracing::info!("Viewer initialized");

        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { event, window_id } if window_id == window.id() => {
                        if let Some(input) = translator.translate(&event) {
                            if state.handle_input(input) == ViewerAction::Exit {
                                target.exit();
                                return;
                            }
                        }

                        match event {
                            WindowEvent::CloseRequested => target.exit(),
                            WindowEvent::Resized(new_size) => renderer.resize(new_size.width, new_size.height),
                            WindowEvent::RedrawRequested => {
                                let now = Instant::now();
                                let dt = now.duration_since(last_frame).as_secs_f32();
                                last_frame = now;
                                state.update(dt);

                                if state.mesh_revision() != uploaded_revision {
                                    if let Some(mesh) = state.mesh() {
                                        renderer.set_mesh(mesh);
                                    }
                                    uploaded_revision = state.mesh_revision();
                                }

                                renderer.begin_frame();
                                if let Err(e) = state.compose_frame(&mut renderer) {
                                    tracing::error!("Failed to compose frame: {}", e);
                                    return;
                                }
                                if let Err(e) = renderer.end_frame() {
                                    tracing::error!("Failed to submit frame: {}", e);
                                    target.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => window.request_redraw(),
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

        Ok(())
    }
}

/// Upload every catalog texture plus the room texture; failures are logged
fn load_textures(renderer: &mut SceneRenderer, config: &ViewerConfig, names: &[String]) {
    let room_texture = config.room.enabled.then_some(config.room.texture.as_str());

    for name in names.iter().map(String::as_str).chain(room_texture) {
        let path = config.textures_dir.join(name);
        if let Err(e) = renderer.load_texture(name, &path) {
            tracing::warn!("Failed to load texture {}: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ShadingModel;
    use std::fs;

    const TRIANGLE_PLY: &str = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
2 0 0
0 4 0
3 0 1 2
";

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ViewerConfig {
            shaders: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(InteractiveViewer::new(config), Err(Error::EmptyCatalog(_))));
    }

    #[test]
    fn test_build_state_enumerates_directories() {
        let models = tempfile::tempdir().unwrap();
        fs::write(models.path().join("b.ply"), TRIANGLE_PLY).unwrap();
        fs::write(models.path().join("a.ply"), TRIANGLE_PLY).unwrap();
        fs::write(models.path().join("notes.txt"), "ignored").unwrap();

        let config = ViewerConfig {
            models_dir: models.path().to_path_buf(),
            textures_dir: models.path().join("missing"),
            ..Default::default()
        };
        let state = InteractiveViewer::new(config).unwrap().build_state().unwrap();

        assert_eq!(state.selection.models.entries(), &["a.ply".to_string(), "b.ply".to_string()]);
        assert!(state.selection.textures.is_empty());
        assert_eq!(state.selection.shading_model(), ShadingModel::ALL[0]);
        assert_eq!(state.mesh().map(|m| m.face_count()), Some(1));
    }

    #[test]
    fn test_build_state_fails_without_models_dir() {
        let config = ViewerConfig {
            models_dir: "/nonexistent/models".into(),
            ..Default::default()
        };
        assert!(InteractiveViewer::new(config).unwrap().build_state().is_err());
    }
}
