//! Texture decoding, upload and lookup by name

use crate::GpuContext;
use meshview_core::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Format depth attachments are created with
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A sampled 2D texture
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Decoded RGBA8 pixels ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Decode any format the `image` crate understands
    pub fn decode(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|e| Error::InvalidData(format!("Failed to decode {}: {}", path.display(), e)))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            pixels: image.into_raw(),
        })
    }

    /// A single opaque white pixel
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        }
    }
}

impl GpuTexture {
    /// Upload RGBA8 pixels as an sRGB texture with repeat addressing
    pub fn from_rgba(ctx: &GpuContext, label: &str, image: &RgbaImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self { texture, view, sampler }
    }
}

/// Create a depth attachment matching a surface size
pub fn create_depth_view(ctx: &GpuContext, width: u32, height: u32) -> wgpu::TextureView {
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Loaded textures by name, with a white fallback for unknown names
pub struct TextureRegistry {
    textures: HashMap<String, GpuTexture>,
    fallback: GpuTexture,
}

impl TextureRegistry {
    pub fn new(ctx: &GpuContext) -> Self {
        Self {
            textures: HashMap::new(),
            fallback: GpuTexture::from_rgba(ctx, "Fallback Texture", &RgbaImage::white()),
        }
    }

    /// Decode and upload the image at `path` under `name`
    pub fn load_texture(&mut self, ctx: &GpuContext, name: &str, path: &Path) -> Result<()> {
        let image = RgbaImage::decode(path)?;
        let texture = GpuTexture::from_rgba(ctx, name, &image);
        tracing::debug!(name, width = image.width, height = image.height, "Loaded texture");
        self.textures.insert(name.to_string(), texture);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// The named texture, or the fallback
    pub fn get(&self, name: Option<&str>) -> &GpuTexture {
        name.and_then(|n| self.textures.get(n)).unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_fallback_is_one_opaque_pixel() {
        let white = RgbaImage::white();
        assert_eq!((white.width, white.height), (1, 1));
        assert_eq!(white.pixels, vec![255, 255, 255, 255]);
    }

    #[test]
    fn test_decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let mut img = image::RgbaImage::new(2, 3);
        img.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let decoded = RgbaImage::decode(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(decoded.pixels.len(), 2 * 3 * 4);
        assert_eq!(&decoded.pixels[20..24], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_missing_file_fails() {
        assert!(RgbaImage::decode(Path::new("/nonexistent/texture.png")).is_err());
    }
}
