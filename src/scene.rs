//! Scene collaborators: the parser seam and the sceneview scene.
//!
//! Scene content construction lives outside the viewer. A [`SceneParser`]
//! hands over an already-parsed scene description; a [`Scene`] owns the GPU
//! resources built from it and describes itself to the event loop through a
//! [`Render`] each frame. [`SceneviewScene`] is the stock implementation:
//! every parsed image becomes a textured quad placed in world space.

use std::fmt::Debug;

use wgpu::util::DeviceExt;

use crate::{
    context::InitContext,
    data_structures::texture::{PixelData, Texture},
    pipelines::textured::{Vertex, quad_texture_layout},
    render::{Flat, Render},
};

/// One image the scene should display, with its world placement.
///
/// The quad is axis-aligned in the xy plane, centred at `position`, `size`
/// wide and tall in world units.
#[derive(Clone, Debug)]
pub struct SceneImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: PixelData,
    pub position: cgmath::Vector3<f32>,
    pub size: [f32; 2],
}

/// Already-parsed scene description handed to scene construction.
///
/// Parsing happens upstream; the viewer only consumes the result. The parser
/// is borrowed for the duration of the load and owned by the caller.
pub trait SceneParser {
    fn images(&self) -> anyhow::Result<Vec<SceneImage>>;
}

impl Debug for dyn SceneParser + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SceneParser")
    }
}

/// A loaded scene the view delegates to.
pub trait Scene {
    /// Build the scene's GPU resources from a parsed description, replacing
    /// any previous content.
    fn load_scene(&mut self, gpu: &InitContext, parser: &dyn SceneParser) -> anyhow::Result<()>;

    /// Global render settings changed; re-read them before the next frame.
    fn settings_changed(&mut self);

    /// Describe this scene's draw work for the current frame.
    fn render<'a, 'pass>(&'a self) -> Render<'a, 'pass>;
}

impl Debug for dyn Scene + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Scene")
    }
}

struct LoadedImage {
    // The texture must stay alive while its bind group is in use.
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: usize,
}

/// Stock scene: a set of textured quads uploaded from parsed images.
pub struct SceneviewScene {
    quads: Vec<LoadedImage>,
    settings_dirty: bool,
}

impl SceneviewScene {
    pub fn new() -> Self {
        Self {
            quads: Vec::new(),
            settings_dirty: true,
        }
    }

    fn load_image(gpu: &InitContext, image: &SceneImage) -> anyhow::Result<LoadedImage> {
        let texture = Texture::from_pixels(
            &gpu.device,
            &gpu.queue,
            &image.pixels,
            image.width,
            image.height,
            &image.label,
        )?;
        let layout = quad_texture_layout(&gpu.device);
        let bind_group = texture.bind_group(&gpu.device, &layout);

        let [w, h] = image.size;
        let [cx, cy, cz] = [image.position.x, image.position.y, image.position.z];
        // Counter-clockwise when viewed from +z, where the camera sits.
        let vertices = [
            Vertex {
                position: [cx - w / 2.0, cy - h / 2.0, cz],
                tex_coords: [0.0, 1.0],
            },
            Vertex {
                position: [cx + w / 2.0, cy - h / 2.0, cz],
                tex_coords: [1.0, 1.0],
            },
            Vertex {
                position: [cx - w / 2.0, cy + h / 2.0, cz],
                tex_coords: [0.0, 0.0],
            },
            Vertex {
                position: [cx + w / 2.0, cy + h / 2.0, cz],
                tex_coords: [1.0, 0.0],
            },
        ];
        let indices: [u16; 6] = [0, 1, 2, 2, 1, 3];

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", image.label)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", image.label)),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Ok(LoadedImage {
            texture,
            bind_group,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len(),
        })
    }
}

impl Default for SceneviewScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for SceneviewScene {
    fn load_scene(&mut self, gpu: &InitContext, parser: &dyn SceneParser) -> anyhow::Result<()> {
        let images = parser.images()?;
        let mut quads = Vec::with_capacity(images.len());
        for image in &images {
            quads.push(Self::load_image(gpu, image)?);
        }
        self.quads = quads;
        self.settings_dirty = true;
        log::info!("scene loaded with {} image(s)", self.quads.len());
        Ok(())
    }

    fn settings_changed(&mut self) {
        self.settings_dirty = true;
        log::debug!("scene settings changed");
    }

    fn render<'a, 'pass>(&'a self) -> Render<'a, 'pass> {
        if self.quads.is_empty() {
            return Render::None;
        }
        Render::Textureds(
            self.quads
                .iter()
                .map(|quad| Flat {
                    vertex: &quad.vertex_buffer,
                    index: &quad.index_buffer,
                    group: &quad.bind_group,
                    amount: quad.num_indices,
                })
                .collect(),
        )
    }
}
