//! Shader programs: WGSL sources compiled into render pipelines by name

use crate::mesh::MeshVertex;
use crate::texture::DEPTH_FORMAT;
use crate::GpuContext;
use std::collections::HashMap;

/// Declarations every program source is appended to
pub const COMMON_WGSL: &str = include_str!("shaders/common.wgsl");

/// Program sources shipped with the renderer, keyed by program name
pub const BUILTIN_PROGRAMS: &[(&str, &str)] = &[
    ("normals", include_str!("shaders/normals.wgsl")),
    ("phong-vertex", include_str!("shaders/phong_vertex.wgsl")),
    ("phong-pixel", include_str!("shaders/phong_pixel.wgsl")),
    ("spotlight", include_str!("shaders/spotlight.wgsl")),
    ("toon", include_str!("shaders/toon.wgsl")),
    ("fog", include_str!("shaders/fog.wgsl")),
    ("unlit", include_str!("shaders/unlit.wgsl")),
];

/// Layout of the single bind group all programs share:
/// uniform block, diffuse texture, sampler
pub fn bind_group_layout_entries() -> [wgpu::BindGroupLayoutEntry; 3] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

/// Compiled programs by name
pub struct ShaderRegistry {
    pipelines: HashMap<String, wgpu::RenderPipeline>,
    layout: wgpu::PipelineLayout,
    target_format: wgpu::TextureFormat,
}

impl ShaderRegistry {
    pub fn new(ctx: &GpuContext, bind_group_layout: &wgpu::BindGroupLayout, target_format: wgpu::TextureFormat) -> Self {
        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Viewer Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            pipelines: HashMap::new(),
            layout,
            target_format,
        }
    }

    /// Compile `source` (which must define `vs_main` and `fs_main`) under `name`
    ///
    /// Loading a name twice replaces the earlier program.
    pub fn load_shader(&mut self, ctx: &GpuContext, name: &str, source: &str) {
        let module = ctx.create_shader_module(name, &program_source(source));
        let pipeline = self.create_render_pipeline(ctx, &module, name);
        tracing::debug!(name, "Loaded shader program");
        self.pipelines.insert(name.to_string(), pipeline);
    }

    /// Compile every built-in program
    pub fn load_builtin(&mut self, ctx: &GpuContext) {
        for (name, source) in BUILTIN_PROGRAMS {
            self.load_shader(ctx, name, source);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(name)
    }

    fn create_render_pipeline(&self, ctx: &GpuContext, shader: &wgpu::ShaderModule, label: &str) -> wgpu::RenderPipeline {
        ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Render Pipeline", label)),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[MeshVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Panels and open meshes are drawn double-sided
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }
}

/// Full WGSL module for a program body
pub fn program_source(body: &str) -> String {
    format!("{}\n{}", COMMON_WGSL, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_programs_cover_all_shading_models() {
        let names: Vec<&str> = BUILTIN_PROGRAMS.iter().map(|(name, _)| *name).collect();
        for expected in ["normals", "phong-vertex", "phong-pixel", "spotlight", "toon", "fog", "unlit"] {
            assert!(names.contains(&expected), "missing program {}", expected);
        }
    }

    #[test]
    fn test_every_program_defines_entry_points() {
        for (name, source) in BUILTIN_PROGRAMS {
            assert!(source.contains("fn vs_main"), "{} has no vertex entry", name);
            assert!(source.contains("fn fs_main"), "{} has no fragment entry", name);
            assert!(!source.contains("struct Uniforms"), "{} redeclares the uniform block", name);
        }
    }

    #[test]
    fn test_program_source_prepends_common() {
        let full = program_source("fn body() {}");
        assert!(full.starts_with(COMMON_WGSL));
        assert!(full.ends_with("fn body() {}"));
    }
}
