//! Viewer state: everything input mutates and every frame reads

use crate::camera::{OrbitCamera, Projection};
use crate::config::ViewerConfig;
use crate::input::{InputEvent, Key};
use crate::light::{LightAnimator, LightIntensity, LightState};
use crate::scene::{FrameInputs, RoomLayout, SceneComposer};
use crate::selection::{SelectionState, Step};
use meshview_core::{BoundsFit, MeshSource, RenderBackend, Result, TransformStack, TriangleMesh};
use nalgebra::{Vector3, Vector4};

/// Azimuth the camera returns to after a model switch
pub const MODEL_SWITCH_AZIMUTH: f32 = 0.0;

/// What the event loop should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Continue,
    Exit,
}

/// Interactive viewer state, independent of window and GPU
pub struct ViewerState {
    pub camera: OrbitCamera,
    pub projection: Projection,
    pub selection: SelectionState,
    pub light: LightState,
    pub animator: LightAnimator,
    composer: SceneComposer,
    stack: TransformStack,
    source: Box<dyn MeshSource>,
    mesh: Option<TriangleMesh>,
    mesh_revision: u64,
    half_extent: f32,
    sensitivity: f32,
    dragging: bool,
}

impl ViewerState {
    /// Build the viewer from configuration and the enumerated catalogs
    pub fn new(
        config: &ViewerConfig,
        models: Vec<String>,
        textures: Vec<String>,
        source: Box<dyn MeshSource>,
    ) -> Self {
        let room = config
            .room
            .enabled
            .then(|| RoomLayout::new(config.room.scale, config.room.texture.clone()));

        let radius_max = room.as_ref().map(|r| r.radius_cap(config.camera.radius_min));
        let camera = OrbitCamera::new(config.camera.initial).with_radius_limits(config.camera.radius_min, radius_max);

        let projection = Projection::new(
            config.camera.fov_y_degrees.to_radians(),
            config.window.width as f32 / config.window.height.max(1) as f32,
            config.camera.near,
            config.far_plane(),
        );

        let mut light = LightState::from_position(
            Vector4::from(config.light.position),
            LightIntensity {
                ambient: Vector3::from(config.light.ambient),
                diffuse: Vector3::from(config.light.diffuse),
                specular: Vector3::from(config.light.specular),
            },
        );
        light.moving = config.light.moving;

        Self {
            camera,
            projection,
            selection: SelectionState::new(config.shaders.clone(), textures, models),
            light,
            animator: LightAnimator::new(config.light.theta_rate, config.light.phi_rate),
            composer: SceneComposer::new(config.light.marker_size, room, config.room.scale),
            stack: TransformStack::new(),
            source,
            mesh: None,
            mesh_revision: 0,
            half_extent: config.fit_half_extent,
            sensitivity: config.camera.sensitivity,
            dragging: false,
        }
    }

    /// Load the first catalog entry; on failure the viewer holds no mesh
    pub fn load_initial_model(&mut self) {
        let Some(name) = self.selection.model().map(str::to_string) else {
            tracing::warn!("Model catalog is empty, nothing to display");
            return;
        };

        match self.source.load_mesh(&name) {
            Ok(mesh) => {
                self.replace_mesh(mesh);
                tracing::info!("Loaded model: {}", name);
            }
            Err(e) => tracing::warn!("Failed to load model {}: {}", name, e),
        }
    }

    pub fn mesh(&self) -> Option<&TriangleMesh> {
        self.mesh.as_ref()
    }

    /// Incremented whenever the displayed mesh is replaced
    pub fn mesh_revision(&self) -> u64 {
        self.mesh_revision
    }

    pub fn room(&self) -> Option<&RoomLayout> {
        self.composer.room.as_ref()
    }

    /// Fit of the current mesh into the reference cube, recomputed on each call
    pub fn fit(&self) -> Option<BoundsFit> {
        self.mesh.as_ref().map(|mesh| {
            let (min, max) = mesh.bounds();
            BoundsFit::compute(&min, &max, self.half_extent)
        })
    }

    /// Apply one input event
    pub fn handle_input(&mut self, event: InputEvent) -> ViewerAction {
        match event {
            InputEvent::PointerButton { pressed } => self.dragging = pressed,
            InputEvent::PointerMoved { dx, dy, shift } if self.dragging => {
                if shift {
                    self.camera.zoom(-dx);
                } else {
                    self.camera.orbit(dx * self.sensitivity, dy * self.sensitivity);
                }
            }
            InputEvent::PointerMoved { .. } => {}
            InputEvent::Scroll { dy } => self.camera.zoom(-dy),
            InputEvent::Resized { width, height } => self.projection.resize(width, height),
            InputEvent::KeyUp { key, shift } => return self.handle_key(key, shift),
        }
        ViewerAction::Continue
    }

    fn handle_key(&mut self, key: Key, shift: bool) -> ViewerAction {
        let step = if shift { Step::Backward } else { Step::Forward };
        match key {
            Key::N => self.switch_model(Step::Forward),
            Key::P => self.switch_model(Step::Backward),
            Key::S => {
                self.selection.shaders.advance(step);
                tracing::info!("changed shader to: {}", self.selection.shading_model());
            }
            Key::T => {
                self.selection.textures.advance(step);
                match self.selection.texture() {
                    Some(texture) => tracing::info!("changed texture to: {}", texture),
                    None => tracing::info!("No textures available"),
                }
            }
            Key::L => {
                let moving = self.light.toggle_moving();
                tracing::info!("Light animation {}", if moving { "started" } else { "stopped" });
            }
            Key::Escape => return ViewerAction::Exit,
        }
        ViewerAction::Continue
    }

    /// Load the neighbouring model and make it current
    ///
    /// The new mesh is fully loaded before it replaces the old one. When the
    /// load fails the previous mesh and model index stay in place.
    pub fn switch_model(&mut self, step: Step) {
        if self.selection.models.is_empty() {
            return;
        }

        let index = self.selection.models.peek(step);
        let name = self.selection.models.entries()[index].clone();

        match self.source.load_mesh(&name) {
            Ok(mesh) => {
                self.selection.models.select(index);
                self.replace_mesh(mesh);
                self.camera.reset(MODEL_SWITCH_AZIMUTH);
                tracing::info!("changed model to: {}", name);
            }
            Err(e) => {
                tracing::warn!("Failed to load model {}: {}; keeping current model", name, e);
            }
        }
    }

    fn replace_mesh(&mut self, mesh: TriangleMesh) {
        self.mesh = Some(mesh);
        self.mesh_revision += 1;
    }

    /// Advance time-dependent state by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.animator.advance(&mut self.light, dt);
    }

    /// Issue this frame's draw sequence to `backend`
    pub fn compose_frame<B>(&mut self, backend: &mut B) -> Result<()>
    where
        B: RenderBackend + ?Sized,
    {
        let frame = FrameInputs {
            fit: self.fit(),
            shading: self.selection.shading_model(),
            texture: self.selection.texture(),
            light: &self.light,
            view: self.camera.view_matrix(),
            projection: self.projection.matrix(),
        };
        self.composer.compose_frame(&frame, &mut self.stack, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ShadingModel;
    use crate::recording::RecordingBackend;
    use approx::assert_relative_eq;
    use meshview_core::{Error, Geometry, Point3};

    fn cube_source() -> Box<dyn MeshSource> {
        Box::new(|name: &str| -> Result<TriangleMesh> {
            match name {
                "broken.ply" => Err(Error::InvalidData("truncated".to_string())),
                _ => Ok(TriangleMesh::unit_cube()),
            }
        })
    }

    fn viewer(models: &[&str]) -> ViewerState {
        let models = models.iter().map(|m| m.to_string()).collect();
        let textures = vec!["a.png".to_string(), "b.png".to_string()];
        let mut viewer = ViewerState::new(&ViewerConfig::default(), models, textures, cube_source());
        viewer.load_initial_model();
        viewer
    }

    #[test]
    fn test_initial_model_loaded() {
        let viewer = viewer(&["bunny.ply", "dragon.ply"]);
        assert_eq!(viewer.mesh_revision(), 1);
        let fit = viewer.fit().unwrap();
        assert_relative_eq!(fit.scale, 10.0, epsilon = 1e-5);
        assert_eq!(fit.apply(&Point3::new(0.5, 0.5, 0.5)), Point3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_model_switch_resets_camera() {
        let mut viewer = viewer(&["bunny.ply", "dragon.ply"]);
        viewer.camera.orbit(1.2, 0.4);
        viewer.switch_model(Step::Forward);

        assert_eq!(viewer.selection.model(), Some("dragon.ply"));
        assert_eq!(viewer.camera.state().azimuth, MODEL_SWITCH_AZIMUTH);
        assert_eq!(viewer.camera.state().elevation, 0.0);
        assert_eq!(viewer.mesh_revision(), 2);
    }

    #[test]
    fn test_failed_switch_keeps_previous_model() {
        let mut viewer = viewer(&["bunny.ply", "broken.ply"]);
        viewer.camera.orbit(1.2, 0.4);
        let before = viewer.camera.state();
        viewer.switch_model(Step::Forward);

        assert_eq!(viewer.selection.model(), Some("bunny.ply"));
        assert_eq!(viewer.mesh_revision(), 1);
        assert!(viewer.mesh().is_some());
        assert_eq!(viewer.camera.state(), before);
    }

    #[test]
    fn test_empty_model_catalog_draws_only_light() {
        let mut viewer = viewer(&[]);
        viewer.switch_model(Step::Forward);
        assert!(viewer.mesh().is_none());

        let mut backend = RecordingBackend::new();
        viewer.compose_frame(&mut backend).unwrap();
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].1, Geometry::Cube);
    }

    #[test]
    fn test_keys_drive_selection_and_light() {
        let mut viewer = viewer(&["bunny.ply"]);
        viewer.handle_input(InputEvent::KeyUp { key: Key::S, shift: false });
        assert_eq!(viewer.selection.shading_model(), ShadingModel::PhongVertex);
        viewer.handle_input(InputEvent::KeyUp { key: Key::S, shift: true });
        viewer.handle_input(InputEvent::KeyUp { key: Key::S, shift: true });
        assert_eq!(viewer.selection.shading_model(), ShadingModel::Fog);

        viewer.handle_input(InputEvent::KeyUp { key: Key::T, shift: true });
        assert_eq!(viewer.selection.texture(), Some("b.png"));

        viewer.handle_input(InputEvent::KeyUp { key: Key::L, shift: false });
        assert!(viewer.light.moving);
        assert_eq!(
            viewer.handle_input(InputEvent::KeyUp { key: Key::Escape, shift: false }),
            ViewerAction::Exit
        );
    }

    #[test]
    fn test_drag_orbits_only_while_pressed() {
        let mut viewer = viewer(&["bunny.ply"]);
        viewer.handle_input(InputEvent::PointerMoved { dx: 50.0, dy: 0.0, shift: false });
        assert_eq!(viewer.camera.state().azimuth, 0.0);

        viewer.handle_input(InputEvent::PointerButton { pressed: true });
        viewer.handle_input(InputEvent::PointerMoved { dx: 50.0, dy: 20.0, shift: false });
        assert_relative_eq!(viewer.camera.state().azimuth, 0.5, epsilon = 1e-6);
        assert_relative_eq!(viewer.camera.state().elevation, 0.2, epsilon = 1e-6);

        viewer.handle_input(InputEvent::PointerMoved { dx: -5.0, dy: 0.0, shift: true });
        assert_relative_eq!(viewer.camera.state().radius, 15.0, epsilon = 1e-6);

        viewer.handle_input(InputEvent::Scroll { dy: 3.0 });
        assert_relative_eq!(viewer.camera.state().radius, 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_drag_ends_when_pointer_leaves_window() {
        use crate::input::InputTranslator;
        use winit::dpi::PhysicalPosition;
        use winit::event::{DeviceId, WindowEvent};

        // SAFETY: dummy device ids are only compared, never dereferenced
        let device_id = unsafe { DeviceId::dummy() };
        let moved = |x: f64, y: f64| WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(x, y),
        };
        let mut translator = InputTranslator::new();
        let mut viewer = viewer(&["bunny.ply"]);
        let mut feed = |viewer: &mut ViewerState, event: &WindowEvent| {
            if let Some(input) = translator.translate(event) {
                viewer.handle_input(input);
            }
        };

        viewer.handle_input(InputEvent::PointerButton { pressed: true });
        feed(&mut viewer, &moved(0.0, 0.0));
        feed(&mut viewer, &moved(40.0, 0.0));
        let dragged = viewer.camera.state().azimuth;
        assert_relative_eq!(dragged, 0.4, epsilon = 1e-6);

        // The button is released outside the window, so no MouseInput arrives
        feed(&mut viewer, &WindowEvent::CursorLeft { device_id });
        feed(&mut viewer, &moved(0.0, 0.0));
        feed(&mut viewer, &moved(80.0, 30.0));
        assert_eq!(viewer.camera.state().azimuth, dragged);
    }

    #[test]
    fn test_light_moves_only_when_enabled() {
        let mut viewer = viewer(&["bunny.ply"]);
        let start = viewer.light.position;
        viewer.update(0.5);
        assert_eq!(viewer.light.position, start);

        viewer.handle_input(InputEvent::KeyUp { key: Key::L, shift: false });
        viewer.update(0.5);
        assert_ne!(viewer.light.position, start);
    }
}
