//! view-ngin
//!
//! A minimal scene viewer built as thin glue between a windowing toolkit
//! (winit) and a graphics API (wgpu). The crate owns a windowed view with an
//! orbiting camera, a fixed-rate render tick and a small texture-upload
//! wrapper. Scene content itself stays behind a collaborator seam: the view
//! delegates drawing to whatever scene is currently loaded.
//!
//! High-level modules
//! - `camera`: the polymorphic camera capability set and the orbiting camera
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: GPU texture wrapper and pixel-format rules
//! - `view`: the view controller and the application event loop
//! - `pipelines`: definitions for the render pipelines used by scenes
//! - `scene`: scene and parser collaborator traits plus the sceneview scene
//! - `render`: render composition returned by scenes each frame
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod scene;
pub mod view;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::dpi::PhysicalPosition;
pub use cgmath::*;
pub use winit::event::MouseButton;
pub use winit::event::WindowEvent;
pub use wgpu::*;
