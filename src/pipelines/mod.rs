//! Definitions for the render pipelines used by scenes.

pub mod textured;
