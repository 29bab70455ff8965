//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which is used by scenes to
//! specify how they should be rendered. The event loop uses `Render` to sort
//! objects into batches for the textured pipeline and to support custom
//! per-object render passes.
//!
//! # Key types
//!
//! - [`Render<'a, 'pass>`] is the primary enum describing render operations
//! - [`Flat<'a>`] contains data for textured quad rendering (vertex + index
//!   buffers and a texture bind group)
//!

use wgpu::RenderPass;

use crate::context::Context;

/// Data for textured quad rendering: vertex and index buffers with a bind group.
///
/// The bind group contains the texture and sampler for the rendered object;
/// `amount` is the number of indices to draw.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: usize,
}

/// Specifies how a scene should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Textured(Flat)` renders a single textured quad
/// - `Textureds(Vec<Flat>)` renders a batch of textured quads
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
/// - `Custom(...)` invokes a user-defined closure for custom rendering
///
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Textured(Flat<'a>),
    Textureds(Vec<Flat<'a>>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>) -> ()>),
}

impl<'a, 'pass> Render<'a, 'pass> {
    /// Whether this render draws nothing at all.
    pub fn is_none(&self) -> bool {
        match self {
            Render::None => true,
            Render::Textured(_) | Render::Custom(_) => false,
            Render::Textureds(vec) => vec.is_empty(),
            Render::Composed(renders) => renders.iter().all(Render::is_none),
        }
    }

    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        flats: &mut Vec<Flat<'a>>,
    ) {
        match self {
            Render::Textured(flat) => flats.push(flat),
            Render::Textureds(mut vec) => flats.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, flats)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}
