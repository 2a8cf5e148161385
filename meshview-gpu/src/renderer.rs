//! wgpu render backend
//!
//! Backend calls made by the scene composer are recorded into a list of
//! draw calls, each with a snapshot of the uniform block. [`SceneRenderer::end_frame`]
//! turns that list into one render pass and presents it.

use crate::mesh::GpuMesh;
use crate::program::{bind_group_layout_entries, ShaderRegistry};
use crate::texture::{create_depth_view, GpuTexture, TextureRegistry};
use crate::uniforms::UniformBlock;
use crate::GpuContext;
use meshview_core::uniforms::names;
use meshview_core::{Error, Geometry, RenderBackend, Result, TriangleMesh, UniformSink, UniformValue};
use nalgebra::Matrix4;
use std::path::Path;
use std::sync::Arc;
use winit::window::Window;

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub program: String,
    pub geometry: Geometry,
    pub texture: Option<String>,
    pub uniforms: UniformBlock,
}

/// Backend bookkeeping that needs no GPU: active program, bound texture,
/// current uniforms and the draw list of the frame being recorded
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    uniforms: UniformBlock,
    active_program: Option<String>,
    bound_texture: Option<String>,
    draws: Vec<DrawCall>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            uniforms: UniformBlock::default(),
            active_program: None,
            bound_texture: None,
            draws: Vec::new(),
        }
    }

    pub fn set_view(&mut self, view: &Matrix4<f32>) {
        self.view = *view;
    }

    pub fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.projection = *projection;
    }

    pub fn begin_program(&mut self, name: &str) {
        self.active_program = Some(name.to_string());
        self.bound_texture = None;
    }

    pub fn end_program(&mut self) {
        self.active_program = None;
        self.bound_texture = None;
    }

    pub fn active_program(&self) -> Option<&str> {
        self.active_program.as_deref()
    }

    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if self.active_program.is_none() {
            tracing::trace!(name, "Uniform written with no active program");
        } else if !self.uniforms.set(name, value) {
            tracing::trace!(name, "Uniform not used by the built-in programs");
        }
    }

    pub fn bind_texture(&mut self, uniform: &str, texture: &str) {
        if uniform == names::DIFFUSE_TEXTURE {
            self.bound_texture = Some(texture.to_string());
        } else {
            tracing::trace!(uniform, "Unknown sampler uniform");
        }
    }

    pub fn draw(&mut self, geometry: Geometry, model: &Matrix4<f32>) -> Result<()> {
        let Some(program) = self.active_program.clone() else {
            return Err(Error::Visualization(format!("Draw of {:?} outside a shader scope", geometry)));
        };

        let mut uniforms = self.uniforms;
        uniforms.set_transforms(model, &self.view, &self.projection);
        self.draws.push(DrawCall {
            program,
            geometry,
            texture: self.bound_texture.clone(),
            uniforms,
        });
        Ok(())
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Take the recorded draws, leaving the recorder ready for the next frame
    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// What a per-draw uniform slot needs before a draw can use it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    /// No slot exists at this index yet
    Create,
    /// The slot exists but was bound with a different texture
    Rebind,
    Reuse,
}

/// Texture each uniform slot's bind group was built with
///
/// Slots are claimed in draw order every frame, so a frame with `n` draws
/// uses slots `0..n` and the pool only grows to the largest draw count seen.
#[derive(Debug, Clone, Default)]
pub struct SlotBindings {
    textures: Vec<Option<String>>,
}

impl SlotBindings {
    /// Claim slot `index` for a draw sampling `texture`
    pub fn prepare(&mut self, index: usize, texture: Option<&str>) -> SlotUpdate {
        match self.textures.get_mut(index) {
            None => {
                self.textures.push(texture.map(str::to_string));
                SlotUpdate::Create
            }
            Some(bound) if bound.as_deref() == texture => SlotUpdate::Reuse,
            Some(bound) => {
                *bound = texture.map(str::to_string);
                SlotUpdate::Rebind
            }
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Forget every slot; the next frame creates them again
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// Uniform buffer and bind group reused by the draw at the same index each frame
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

fn draw_bind_group(
    ctx: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    texture: &GpuTexture,
) -> wgpu::BindGroup {
    ctx.create_bind_group(
        "Draw Bind Group",
        layout,
        &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    )
}

/// Renders recorded frames into a window surface
pub struct SceneRenderer {
    pub gpu_context: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    bind_group_layout: wgpu::BindGroupLayout,
    programs: ShaderRegistry,
    textures: TextureRegistry,
    active_mesh: Option<GpuMesh>,
    cube: GpuMesh,
    plane: GpuMesh,
    recorder: FrameRecorder,
    uniform_slots: Vec<UniformSlot>,
    slot_bindings: SlotBindings,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    /// Create a renderer for `window` with all built-in programs loaded
    pub async fn new(window: Arc<Window>, background: [f32; 3]) -> Result<Self> {
        let size = window.inner_size();
        let (gpu_context, surface) = GpuContext::for_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no supported formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let depth_view = create_depth_view(&gpu_context, surface_config.width, surface_config.height);
        let bind_group_layout = gpu_context.create_bind_group_layout("Mesh Viewer Bind Group Layout", &bind_group_layout_entries());

        let mut programs = ShaderRegistry::new(&gpu_context, &bind_group_layout, surface_format);
        programs.load_builtin(&gpu_context);

        let textures = TextureRegistry::new(&gpu_context);
        let cube = GpuMesh::upload(&gpu_context, "Light Marker", &TriangleMesh::unit_cube())
            .ok_or_else(|| Error::Gpu("Failed to build marker cube".to_string()))?;
        let plane = GpuMesh::upload(&gpu_context, "Room Panel", &TriangleMesh::unit_plane())
            .ok_or_else(|| Error::Gpu("Failed to build room panel".to_string()))?;

        tracing::info!(
            width = surface_config.width,
            height = surface_config.height,
            format = ?surface_format,
            "Renderer initialized"
        );

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            depth_view,
            bind_group_layout,
            programs,
            textures,
            active_mesh: None,
            cube,
            plane,
            recorder: FrameRecorder::new(),
            uniform_slots: Vec::new(),
            slot_bindings: SlotBindings::default(),
            clear_color: wgpu::Color {
                r: background[0] as f64,
                g: background[1] as f64,
                b: background[2] as f64,
                a: 1.0,
            },
        })
    }

    /// Compile an additional program, or replace a built-in one
    pub fn load_shader(&mut self, name: &str, source: &str) {
        self.programs.load_shader(&self.gpu_context, name, source);
    }

    /// Decode and upload a texture under `name`
    pub fn load_texture(&mut self, name: &str, path: &Path) -> Result<()> {
        self.textures.load_texture(&self.gpu_context, name, path)?;
        // Bind groups may still reference the replaced texture view
        self.uniform_slots.clear();
        self.slot_bindings.clear();
        Ok(())
    }

    /// Replace the geometry drawn for [`Geometry::ActiveMesh`]
    pub fn set_mesh(&mut self, mesh: &TriangleMesh) {
        self.active_mesh = GpuMesh::upload(&self.gpu_context, "Active Mesh", mesh);
        if self.active_mesh.is_none() {
            tracing::warn!("Mesh has no faces; nothing will be drawn for it");
        }
    }

    /// Reconfigure the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.gpu_context.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.gpu_context, width, height);
    }

    /// Discard draws left over from a frame that was never submitted
    pub fn begin_frame(&mut self) {
        self.recorder.take_draws();
    }

    /// Submit the recorded draws and present
    ///
    /// A lost or outdated surface is reconfigured and the frame is skipped.
    pub fn end_frame(&mut self) -> Result<()> {
        let draws = self.recorder.take_draws();

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {:?}", e))),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        for (index, call) in draws.iter().enumerate() {
            let texture = self.textures.get(call.texture.as_deref());
            match self.slot_bindings.prepare(index, call.texture.as_deref()) {
                SlotUpdate::Create => {
                    let buffer = self.gpu_context.create_buffer_init(
                        "Draw Uniform Buffer",
                        std::slice::from_ref(&call.uniforms),
                        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    );
                    let bind_group = draw_bind_group(&self.gpu_context, &self.bind_group_layout, &buffer, texture);
                    self.uniform_slots.push(UniformSlot { buffer, bind_group });
                    continue;
                }
                SlotUpdate::Rebind => {
                    let slot = self
                        .uniform_slots
                        .get_mut(index)
                        .ok_or_else(|| Error::Gpu(format!("Uniform slot {} is missing", index)))?;
                    slot.bind_group = draw_bind_group(&self.gpu_context, &self.bind_group_layout, &slot.buffer, texture);
                }
                SlotUpdate::Reuse => {}
            }
            let slot = self
                .uniform_slots
                .get(index)
                .ok_or_else(|| Error::Gpu(format!("Uniform slot {} is missing", index)))?;
            self.gpu_context
                .queue
                .write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&call.uniforms));
        }

        let mut encoder = self.gpu_context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Mesh Viewer Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Viewer Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (call, slot) in draws.iter().zip(&self.uniform_slots) {
                let Some(pipeline) = self.programs.get(&call.program) else {
                    continue;
                };
                let mesh = match call.geometry {
                    Geometry::ActiveMesh => match &self.active_mesh {
                        Some(mesh) => mesh,
                        None => continue,
                    },
                    Geometry::Cube => &self.cube,
                    Geometry::Plane => &self.plane,
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &slot.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl UniformSink for SceneRenderer {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.recorder.set_uniform(name, value);
    }
}

impl RenderBackend for SceneRenderer {
    fn set_view(&mut self, view: &Matrix4<f32>) {
        self.recorder.set_view(view);
    }

    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.recorder.set_projection(projection);
    }

    fn begin_shader(&mut self, name: &str) -> Result<()> {
        if !self.programs.contains(name) {
            return Err(Error::Gpu(format!("Shader program '{}' is not loaded", name)));
        }
        self.recorder.begin_program(name);
        Ok(())
    }

    fn end_shader(&mut self) {
        self.recorder.end_program();
    }

    fn bind_texture(&mut self, uniform: &str, texture: &str) -> Result<()> {
        if !self.textures.contains(texture) {
            tracing::trace!(texture, "Texture not loaded, using fallback");
        }
        self.recorder.bind_texture(uniform, texture);
        Ok(())
    }

    fn draw(&mut self, geometry: Geometry, model: &Matrix4<f32>) -> Result<()> {
        self.recorder.draw(geometry, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_draw_snapshots_uniforms() {
        let mut recorder = FrameRecorder::new();
        recorder.begin_program("unlit");
        recorder.set_uniform(names::FLAT_COLOR, Vector3::<f32>::new(1.0, 0.0, 0.0).into());
        recorder.draw(Geometry::Cube, &Matrix4::identity()).unwrap();
        recorder.set_uniform(names::FLAT_COLOR, Vector3::<f32>::new(0.0, 1.0, 0.0).into());
        recorder.draw(Geometry::Cube, &Matrix4::identity()).unwrap();

        let draws = recorder.draws();
        assert_eq!(draws[0].uniforms.flat_color[..3], [1.0, 0.0, 0.0]);
        assert_eq!(draws[1].uniforms.flat_color[..3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_draw_outside_program_fails() {
        let mut recorder = FrameRecorder::new();
        assert!(matches!(
            recorder.draw(Geometry::Plane, &Matrix4::identity()),
            Err(Error::Visualization(_))
        ));
    }

    #[test]
    fn test_uniform_without_program_is_ignored() {
        let mut recorder = FrameRecorder::new();
        recorder.set_uniform(names::FOG_MIN_DISTANCE, UniformValue::Float(4.0));
        recorder.begin_program("fog");
        recorder.draw(Geometry::Plane, &Matrix4::identity()).unwrap();
        assert_eq!(recorder.draws()[0].uniforms.fog_params[0], 0.0);
    }

    #[test]
    fn test_texture_binding_is_scoped_to_program() {
        let mut recorder = FrameRecorder::new();
        recorder.begin_program("phong-pixel");
        recorder.bind_texture(names::DIFFUSE_TEXTURE, "bricks.png");
        recorder.draw(Geometry::ActiveMesh, &Matrix4::identity()).unwrap();
        recorder.end_program();

        recorder.begin_program("unlit");
        recorder.draw(Geometry::Cube, &Matrix4::identity()).unwrap();

        let draws = recorder.take_draws();
        assert_eq!(draws[0].texture.as_deref(), Some("bricks.png"));
        assert_eq!(draws[1].texture, None);
        assert!(recorder.draws().is_empty());
    }

    #[test]
    fn test_slots_are_reused_across_frames() {
        let mut bindings = SlotBindings::default();
        assert_eq!(bindings.prepare(0, Some("bricks.png")), SlotUpdate::Create);
        assert_eq!(bindings.prepare(1, None), SlotUpdate::Create);

        // Same draws next frame: nothing is allocated or rebound
        assert_eq!(bindings.prepare(0, Some("bricks.png")), SlotUpdate::Reuse);
        assert_eq!(bindings.prepare(1, None), SlotUpdate::Reuse);
        assert_eq!(bindings.len(), 2);

        // A texture change only rebinds its own slot
        assert_eq!(bindings.prepare(0, Some("wood.png")), SlotUpdate::Rebind);
        assert_eq!(bindings.prepare(1, None), SlotUpdate::Reuse);
        assert_eq!(bindings.prepare(2, None), SlotUpdate::Create);
        assert_eq!(bindings.len(), 3);
    }

    #[test]
    fn test_fewer_draws_keep_existing_slots() {
        let mut bindings = SlotBindings::default();
        for index in 0..4 {
            bindings.prepare(index, None);
        }
        assert_eq!(bindings.prepare(0, None), SlotUpdate::Reuse);
        assert_eq!(bindings.len(), 4);

        bindings.clear();
        assert!(bindings.is_empty());
        assert_eq!(bindings.prepare(0, None), SlotUpdate::Create);
    }
}
