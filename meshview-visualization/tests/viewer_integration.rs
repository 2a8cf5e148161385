//! Integration tests for meshview-visualization
//!
//! These drive `ViewerState` end to end: meshes are loaded from PLY files on
//! disk, input events are applied, and frames are composed against the
//! recording backend.

use approx::assert_relative_eq;
use meshview_core::uniforms::names;
use meshview_core::{Geometry, MeshSource};
use meshview_io::{list_files_with_extension, DirectoryMeshSource};
use meshview_visualization::recording::Command;
use meshview_visualization::*;
use nalgebra::Point3;
use std::fs;
use std::path::Path;

/// ASCII PLY of an axis-aligned box spanning `min..max`, as two triangles per face
fn box_ply(min: [f32; 3], max: [f32; 3]) -> String {
    let mut ply = String::from(
        "ply\nformat ascii 1.0\nelement vertex 8\nproperty float x\nproperty float y\nproperty float z\n\
         element face 12\nproperty list uchar int vertex_indices\nend_header\n",
    );
    for i in 0..8 {
        let x = if i & 1 == 0 { min[0] } else { max[0] };
        let y = if i & 2 == 0 { min[1] } else { max[1] };
        let z = if i & 4 == 0 { min[2] } else { max[2] };
        ply.push_str(&format!("{} {} {}\n", x, y, z));
    }
    let faces = [
        [0, 2, 1], [1, 2, 3], [4, 5, 6], [5, 7, 6],
        [0, 1, 4], [1, 5, 4], [2, 6, 3], [3, 6, 7],
        [0, 4, 2], [2, 4, 6], [1, 3, 5], [3, 7, 5],
    ];
    for [a, b, c] in faces {
        ply.push_str(&format!("3 {} {} {}\n", a, b, c));
    }
    ply
}

fn write_models(dir: &Path) {
    fs::write(dir.join("a_small.ply"), box_ply([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0])).unwrap();
    fs::write(dir.join("b_offset.ply"), box_ply([10.0, 0.0, 0.0], [30.0, 5.0, 2.0])).unwrap();
}

fn viewer_for(dir: &Path, config: &ViewerConfig) -> ViewerState {
    let models = list_files_with_extension(dir, "ply").unwrap();
    let source: Box<dyn MeshSource> = Box::new(DirectoryMeshSource::new(dir));
    let mut viewer = ViewerState::new(config, models, Vec::new(), source);
    viewer.load_initial_model();
    viewer
}

fn key(key: Key) -> InputEvent {
    InputEvent::KeyUp { key, shift: false }
}

fn mesh_draw(backend: &RecordingBackend) -> (String, Point3<f32>, Point3<f32>) {
    let (program, _, model) = backend
        .draws()
        .into_iter()
        .find(|(_, geometry, _)| *geometry == Geometry::ActiveMesh)
        .expect("frame has a mesh draw");
    let lo = model.transform_point(&Point3::origin());
    let hi = model.transform_point(&Point3::new(1.0, 1.0, 1.0));
    (program, lo, hi)
}

#[test]
fn test_loaded_mesh_is_fit_into_reference_cube() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let mut viewer = viewer_for(dir.path(), &ViewerConfig::default());

    viewer.handle_input(key(Key::N));
    assert_eq!(viewer.selection.model(), Some("b_offset.ply"));

    let fit = viewer.fit().unwrap();
    let (min, max) = viewer.mesh().unwrap().bounds();
    let lo = fit.apply(&min);
    let hi = fit.apply(&max);

    // Largest extent (x: 20 units) maps onto 2H = 10, centered on the origin
    assert_relative_eq!(hi.x - lo.x, 10.0, epsilon = 1e-4);
    assert_relative_eq!(lo.coords + hi.coords, Point3::<f32>::origin().coords, epsilon = 1e-4);
}

#[test]
fn test_frame_draws_mesh_with_selected_shader() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let mut viewer = viewer_for(dir.path(), &ViewerConfig::default());

    for expected in ShadingModel::ALL {
        let mut backend = RecordingBackend::new();
        viewer.compose_frame(&mut backend).unwrap();

        let (program, lo, hi) = mesh_draw(&backend);
        assert_eq!(program, expected.shader_name());
        // a_small is centered already; only the scale of 5 applies
        assert_relative_eq!(lo, Point3::origin(), epsilon = 1e-4);
        assert_relative_eq!(hi, Point3::new(5.0, 5.0, 5.0), epsilon = 1e-4);
        assert_eq!(backend.active_shader(), None);

        viewer.handle_input(key(Key::S));
    }

    assert_eq!(viewer.selection.shading_model(), ShadingModel::ALL[0]);
    viewer.handle_input(InputEvent::KeyUp { key: Key::S, shift: true });
    assert_eq!(viewer.selection.shading_model(), ShadingModel::Fog);
}

#[test]
fn test_broken_model_keeps_previous_mesh() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let dangling = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\n\
                    element face 1\nproperty list uchar int vertex_indices\nend_header\n0 0 0\n3 0 1 2\n";
    fs::write(dir.path().join("c_broken.ply"), dangling).unwrap();
    let mut viewer = viewer_for(dir.path(), &ViewerConfig::default());

    viewer.handle_input(key(Key::N));
    let revision = viewer.mesh_revision();
    let faces = viewer.mesh().unwrap().face_count();

    viewer.handle_input(key(Key::N));
    assert_eq!(viewer.selection.model(), Some("b_offset.ply"));
    assert_eq!(viewer.mesh_revision(), revision);
    assert_eq!(viewer.mesh().unwrap().face_count(), faces);

    // Wrapping backward onto the broken entry fails the same way
    viewer.handle_input(key(Key::P));
    assert_eq!(viewer.selection.model(), Some("a_small.ply"));
    viewer.handle_input(key(Key::P));
    assert_eq!(viewer.selection.model(), Some("a_small.ply"));
}

#[test]
fn test_model_switch_resets_camera() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let mut viewer = viewer_for(dir.path(), &ViewerConfig::default());

    viewer.handle_input(InputEvent::PointerButton { pressed: true });
    viewer.handle_input(InputEvent::PointerMoved { dx: 100.0, dy: 30.0, shift: false });
    viewer.handle_input(InputEvent::Scroll { dy: -15.0 });
    assert!(viewer.camera.state().azimuth.abs() > 0.5);

    viewer.handle_input(key(Key::N));
    let state = viewer.camera.state();
    assert_eq!(state.azimuth, MODEL_SWITCH_AZIMUTH);
    assert_eq!(state.elevation, 0.0);
}

#[test]
fn test_room_variant_draws_fogged_panels() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let mut config = ViewerConfig::default();
    config.room.enabled = true;
    let mut viewer = viewer_for(dir.path(), &config);

    let mut backend = RecordingBackend::new();
    viewer.compose_frame(&mut backend).unwrap();

    let panels: Vec<_> = backend
        .draws()
        .into_iter()
        .filter(|(_, geometry, _)| *geometry == Geometry::Plane)
        .collect();
    assert_eq!(panels.len(), 6);
    assert!(panels.iter().all(|(program, _, _)| program == "fog"));

    let fog_max = backend.commands.iter().find_map(|c| match c {
        Command::Uniform(name, value) if name == names::FOG_MAX_DISTANCE => Some(*value),
        _ => None,
    });
    assert_eq!(fog_max, Some((0.75 * config.room.scale).into()));

    assert!(backend.commands.contains(&Command::BindTexture {
        uniform: names::DIFFUSE_TEXTURE.to_string(),
        texture: config.room.texture.clone(),
    }));

    // Zooming far out stays inside the room
    viewer.handle_input(InputEvent::Scroll { dy: -1000.0 });
    assert!(viewer.camera.state().radius <= config.room.scale / 2.0 - 1.0 + 1e-4);
}

#[test]
fn test_light_marker_follows_animation() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let mut viewer = viewer_for(dir.path(), &ViewerConfig::default());

    let marker = |viewer: &mut ViewerState| {
        let mut backend = RecordingBackend::new();
        viewer.compose_frame(&mut backend).unwrap();
        let (_, _, model) = backend
            .draws()
            .into_iter()
            .find(|(program, geometry, _)| program == UNLIT_SHADER && *geometry == Geometry::Cube)
            .unwrap();
        model.transform_point(&Point3::origin())
    };

    let start = marker(&mut viewer);
    viewer.update(0.5);
    assert_eq!(marker(&mut viewer), start);

    viewer.handle_input(key(Key::L));
    viewer.update(0.5);
    let moved = marker(&mut viewer);
    assert!((moved - start).norm() > 1e-3);
    // Orbit radius around the origin is preserved
    assert_relative_eq!(moved.coords.norm(), start.coords.norm(), epsilon = 1e-3);
}

#[test]
fn test_escape_exits() {
    let dir = tempfile::tempdir().unwrap();
    write_models(dir.path());
    let mut viewer = viewer_for(dir.path(), &ViewerConfig::default());
    assert_eq!(viewer.handle_input(key(Key::T)), ViewerAction::Continue);
    assert_eq!(viewer.handle_input(key(Key::Escape)), ViewerAction::Exit);
}
