//! Scene composition
//!
//! A frame is drawn in a fixed order: the fitted mesh under the active
//! shading model, the light marker under the unlit program, then (room
//! variant only) six wall panels under the fog program. Every object is
//! drawn inside its own transform scope so no local transform leaks to a
//! sibling.

use crate::dispatch::{dispatch, LightingContext};
use crate::light::LightState;
use crate::material::{ShadingModel, UNLIT_SHADER};
use meshview_core::uniforms::names;
use meshview_core::{BoundsFit, Geometry, RenderBackend, Result, Transform3D, TransformStack};
use nalgebra::{Matrix4, Vector3};
use std::f32::consts::{FRAC_PI_2, PI};

/// One wall of the room: placement relative to the room center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomPanel {
    pub name: &'static str,
    pub offset: Vector3<f32>,
    /// XYZ Euler angles turning the +Y facing plane toward the room center
    pub rotation: Vector3<f32>,
}

/// An axis-aligned box of six textured panels centered at the origin
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    pub scale: f32,
    pub texture: String,
}

impl RoomLayout {
    pub fn new(scale: f32, texture: impl Into<String>) -> Self {
        Self {
            scale,
            texture: texture.into(),
        }
    }

    /// Floor, ceiling and four side walls, all facing inward
    pub fn panels(&self) -> [RoomPanel; 6] {
        let h = self.scale / 2.0;
        [
            RoomPanel {
                name: "floor",
                offset: Vector3::new(0.0, -h, 0.0),
                rotation: Vector3::zeros(),
            },
            RoomPanel {
                name: "ceiling",
                offset: Vector3::new(0.0, h, 0.0),
                rotation: Vector3::new(PI, 0.0, 0.0),
            },
            RoomPanel {
                name: "back",
                offset: Vector3::new(0.0, 0.0, -h),
                rotation: Vector3::new(FRAC_PI_2, 0.0, 0.0),
            },
            RoomPanel {
                name: "front",
                offset: Vector3::new(0.0, 0.0, h),
                rotation: Vector3::new(-FRAC_PI_2, 0.0, 0.0),
            },
            RoomPanel {
                name: "left",
                offset: Vector3::new(-h, 0.0, 0.0),
                rotation: Vector3::new(0.0, 0.0, -FRAC_PI_2),
            },
            RoomPanel {
                name: "right",
                offset: Vector3::new(h, 0.0, 0.0),
                rotation: Vector3::new(0.0, 0.0, FRAC_PI_2),
            },
        ]
    }

    /// Largest orbit radius that keeps the eye inside the walls
    pub fn radius_cap(&self, radius_min: f32) -> f32 {
        (self.scale / 2.0 - 1.0).max(radius_min)
    }
}

/// Per-frame inputs gathered from the viewer state
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Fit of the active mesh, `None` when no mesh is loaded
    pub fit: Option<BoundsFit>,
    pub shading: ShadingModel,
    pub texture: Option<&'a str>,
    pub light: &'a LightState,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

/// Issues the draw sequence of one frame
#[derive(Debug, Clone)]
pub struct SceneComposer {
    pub marker_size: f32,
    pub marker_color: Vector3<f32>,
    pub room: Option<RoomLayout>,
    /// Scale fog distances are derived from when no room is drawn
    pub fog_scale: f32,
}

impl SceneComposer {
    pub fn new(marker_size: f32, room: Option<RoomLayout>, fog_scale: f32) -> Self {
        Self {
            marker_size,
            marker_color: Vector3::repeat(1.0),
            room,
            fog_scale,
        }
    }

    /// Draw one frame; `stack` is left exactly as it was found
    pub fn compose_frame<B>(&self, frame: &FrameInputs<'_>, stack: &mut TransformStack, backend: &mut B) -> Result<()>
    where
        B: RenderBackend + ?Sized,
    {
        backend.set_view(&frame.view);
        backend.set_projection(&frame.projection);

        let ctx = LightingContext {
            light: frame.light,
            view: &frame.view,
            room_scale: self.room.as_ref().map_or(self.fog_scale, |room| room.scale),
        };

        if let Some(fit) = frame.fit {
            let mut scope = stack.push();
            scope.multiply(&Transform3D::from(fit.to_matrix()));
            let model = scope.current().matrix;

            with_shader(backend, frame.shading.shader_name(), |backend| {
                dispatch(frame.shading, &frame.shading.preset(), &ctx, backend);
                if let Some(texture) = frame.texture {
                    backend.bind_texture(names::DIFFUSE_TEXTURE, texture)?;
                }
                backend.draw(Geometry::ActiveMesh, &model)
            })?;
        }

        {
            let mut scope = stack.push();
            scope.translate(&frame.light.position.xyz());
            scope.scale(&Vector3::repeat(self.marker_size));
            let model = scope.current().matrix;

            with_shader(backend, UNLIT_SHADER, |backend| {
                backend.set_uniform(names::FLAT_COLOR, self.marker_color.into());
                backend.draw(Geometry::Cube, &model)
            })?;
        }

        if let Some(room) = &self.room {
            let fog = ShadingModel::Fog;
            with_shader(backend, fog.shader_name(), |backend| {
                dispatch(fog, &fog.preset(), &ctx, backend);
                backend.bind_texture(names::DIFFUSE_TEXTURE, &room.texture)?;

                for panel in room.panels() {
                    let mut scope = stack.push();
                    scope.translate(&panel.offset);
                    scope.rotate(&panel.rotation);
                    scope.scale(&Vector3::new(room.scale, 1.0, room.scale));
                    backend.draw(Geometry::Plane, &scope.current().matrix)?;
                }
                Ok(())
            })?;
        }

        Ok(())
    }
}

/// Run `body` with `name` active; the program is ended even when `body` fails
fn with_shader<B, F>(backend: &mut B, name: &str, body: F) -> Result<()>
where
    B: RenderBackend + ?Sized,
    F: FnOnce(&mut B) -> Result<()>,
{
    backend.begin_shader(name)?;
    let result = body(backend);
    backend.end_shader();
    result
}
