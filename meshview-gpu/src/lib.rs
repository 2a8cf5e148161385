//! # meshview GPU
//!
//! wgpu render backend for the mesh viewer.
//!
//! [`SceneRenderer`] implements [`meshview_core::RenderBackend`]: the scene
//! composer selects programs by name, writes named uniforms, binds textures
//! and issues draws, and the renderer turns each frame's draws into a single
//! render pass.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meshview_gpu::SceneRenderer;
//! use std::sync::Arc;
//! use winit::{event_loop::EventLoop, window::WindowBuilder};
//!
//! fn example() -> meshview_core::Result<()> {
//!     let event_loop = EventLoop::new().unwrap();
//!     let window = Arc::new(WindowBuilder::new().build(&event_loop).unwrap());
//!     let mut renderer = pollster::block_on(SceneRenderer::new(window, [0.1, 0.1, 0.1]))?;
//!     renderer.set_mesh(&meshview_core::TriangleMesh::unit_cube());
//!     renderer.end_frame()?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod mesh;
pub mod program;
pub mod renderer;
pub mod texture;
pub mod uniforms;

pub use device::GpuContext;
pub use mesh::{mesh_to_vertices, GpuMesh, MeshVertex};
pub use program::{ShaderRegistry, BUILTIN_PROGRAMS};
pub use renderer::{DrawCall, FrameRecorder, SceneRenderer, SlotBindings, SlotUpdate};
pub use texture::{GpuTexture, RgbaImage, TextureRegistry};
pub use uniforms::UniformBlock;
