//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture
//! resources, together with [`PixelData`], the numeric-format tag that
//! decides the internal texture format. Helpers exist for creating depth
//! textures and for loading textures from encoded image data.

use anyhow::*;
use image::{GenericImageView, ImageFormat, load_from_memory_with_format};

/// Raw RGBA pixel payload tagged with its numeric format.
///
/// The format rule is fixed: float-typed data maps to a 4-channel
/// floating-point texture, byte-typed data to a standard 4-channel 8-bit
/// texture. Buffers are tightly packed, four components per texel.
#[derive(Clone, Debug)]
pub enum PixelData {
    Byte(Vec<u8>),
    Float(Vec<f32>),
}

impl PixelData {
    /// The internal texture format chosen for this payload.
    pub fn texture_format(&self) -> wgpu::TextureFormat {
        match self {
            PixelData::Byte(_) => wgpu::TextureFormat::Rgba8Unorm,
            PixelData::Float(_) => wgpu::TextureFormat::Rgba32Float,
        }
    }

    pub fn bytes_per_texel(&self) -> u32 {
        match self {
            PixelData::Byte(_) => 4,
            PixelData::Float(_) => 16,
        }
    }

    /// Number of components in the payload.
    pub fn len(&self) -> usize {
        match self {
            PixelData::Byte(data) => data.len(),
            PixelData::Float(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the payload holds exactly `width * height` RGBA texels.
    pub fn matches_extent(&self, width: u32, height: u32) -> bool {
        self.len() == width as usize * height as usize * 4
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            PixelData::Byte(data) => data,
            PixelData::Float(data) => bytemuck::cast_slice(data),
        }
    }
}

/// A GPU texture with a view and optional sampler.
///
/// Wraps WGPU texture objects along with associated views and samplers.
/// Contents and dimensions are fixed at construction; there is no re-upload
/// path. Typically created via [`from_pixels`](Self::from_pixels) or via
/// [`create_depth_texture`](Self::create_depth_texture).
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// The returned texture is suitable for use as a `RENDER_ATTACHMENT` in
    /// render passes.
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Upload a full image from a raw pixel buffer.
    ///
    /// The internal format follows the [`PixelData`] rule; filtering is
    /// nearest-neighbour for both magnification and minification. The only
    /// reported error is a payload whose length does not match the extent;
    /// GPU-side failures are not surfaced.
    ///
    /// # Arguments
    ///
    /// * `pixels` is the tightly packed RGBA payload with its format tag
    /// * `width`/`height` are the texture dimensions in texels
    /// * `label` is used as a debug name for the GPU resource
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &PixelData,
        width: u32,
        height: u32,
        label: &str,
    ) -> Result<Self> {
        ensure!(
            pixels.matches_extent(width, height),
            "pixel buffer for {label} holds {} components, expected {}x{}x4",
            pixels.len(),
            width,
            height,
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: pixels.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            pixels.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixels.bytes_per_texel() * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_nearest_sampler(device));

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// Load a texture from raw byte data (image file contents).
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, etc.)
    /// * `label` is used as a debug name for the GPU resource
    /// * `format` is an optional file format hint (e.g., "png"). If None, auto-detect.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
    ) -> Result<Self> {
        let img = match format {
            None => image::load_from_memory(bytes)?,
            Some(fmt) => {
                let fmt = ImageFormat::from_extension(fmt)
                    .ok_or_else(|| anyhow!("unknown image format hint {fmt}"))?;
                load_from_memory_with_format(bytes, fmt)?
            }
        };
        Self::from_image(device, queue, &img, Some(label))
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
    ) -> Result<Self> {
        let dimensions = img.dimensions();
        let rgba = img.to_rgba8();
        let pixels = PixelData::Byte(rgba.into_raw());
        Self::from_pixels(
            device,
            queue,
            &pixels,
            dimensions.0,
            dimensions.1,
            label.unwrap_or("image texture"),
        )
    }

    /// Build the bind group that attaches this texture to a render pass.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(
                        self.sampler.as_ref().expect("texture carries no sampler"),
                    ),
                },
            ],
            label: Some("texture_bind_group"),
        })
    }
}

pub fn create_nearest_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}
