//! Material/lighting dispatch
//!
//! Each shading model consumes the same light and view inputs but writes its
//! own set of named uniforms into the active program. Dispatch never touches
//! geometry and must run between `begin_shader` and the matching draw.

use crate::light::LightState;
use crate::material::{MaterialPreset, ShadingModel};
use meshview_core::uniforms::{names, UniformSink};
use nalgebra::{Matrix4, Vector3, Vector4};

/// Inputs shared by every shading model for one frame
#[derive(Debug, Clone, Copy)]
pub struct LightingContext<'a> {
    pub light: &'a LightState,
    pub view: &'a Matrix4<f32>,
    /// Edge length of the room, used for fog distances
    pub room_scale: f32,
}

impl LightingContext<'_> {
    /// Light position in eye space; `w` is carried through unchanged
    pub fn eye_light_position(&self) -> Vector4<f32> {
        self.view * self.light.position
    }

    /// Eye-space direction from the light toward the world origin
    pub fn eye_spot_direction(&self) -> Vector3<f32> {
        let toward_origin = (-self.light.position.xyz())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::y());
        let eye = self.view * toward_origin.push(0.0);
        eye.xyz().try_normalize(f32::EPSILON).unwrap_or(toward_origin)
    }
}

/// Write the uniforms `model` needs, using `preset` for its coefficients
pub fn dispatch<S>(model: ShadingModel, preset: &MaterialPreset, ctx: &LightingContext<'_>, sink: &mut S)
where
    S: UniformSink + ?Sized,
{
    match model {
        ShadingModel::Normals => {}
        ShadingModel::PhongVertex | ShadingModel::PhongPixel => {
            emit_phong(preset, ctx, sink);
        }
        ShadingModel::Spotlight => {
            emit_phong(preset, ctx, sink);
            sink.set_uniform(names::SPOT_DIRECTION, ctx.eye_spot_direction().into());
            if let Some(cone) = preset.spot {
                sink.set_uniform(names::SPOT_INNER_CUTOFF, cone.inner_cutoff().into());
                sink.set_uniform(names::SPOT_OUTER_CUTOFF, cone.outer_cutoff().into());
                sink.set_uniform(names::SPOT_EXPONENT, cone.exponent.into());
            }
        }
        ShadingModel::Toon => {
            sink.set_uniform(names::LIGHT_POSITION, ctx.eye_light_position().into());
            sink.set_uniform(names::MATERIAL_AMBIENT, preset.ambient.into());
            sink.set_uniform(names::MATERIAL_DIFFUSE, preset.diffuse.into());
            let outline = preset.outline.unwrap_or_else(Vector3::zeros);
            sink.set_uniform(names::TOON_OUTLINE_COLOR, outline.into());
        }
        ShadingModel::Fog => {
            emit_phong(preset, ctx, sink);
            if let Some(fog) = preset.fog {
                let (near, far) = fog.distances(ctx.room_scale);
                sink.set_uniform(names::FOG_MIN_DISTANCE, near.into());
                sink.set_uniform(names::FOG_MAX_DISTANCE, far.into());
                sink.set_uniform(names::FOG_COLOR, fog.color.into());
            }
        }
    }
}

fn emit_phong<S>(preset: &MaterialPreset, ctx: &LightingContext<'_>, sink: &mut S)
where
    S: UniformSink + ?Sized,
{
    let intensity = &ctx.light.intensity;
    sink.set_uniform(names::LIGHT_AMBIENT, intensity.ambient.into());
    sink.set_uniform(names::LIGHT_DIFFUSE, intensity.diffuse.into());
    sink.set_uniform(names::LIGHT_SPECULAR, intensity.specular.into());
    sink.set_uniform(names::LIGHT_POSITION, ctx.eye_light_position().into());

    sink.set_uniform(names::MATERIAL_AMBIENT, preset.ambient.into());
    sink.set_uniform(names::MATERIAL_DIFFUSE, preset.diffuse.into());
    sink.set_uniform(names::MATERIAL_SPECULAR, preset.specular.into());
    sink.set_uniform(names::MATERIAL_SHININESS, preset.shininess.into());
}
