//! Engine data structures.
//!
//! - `texture` contains the GPU texture wrapper, pixel-format rules and
//!   creation utilities

pub mod texture;
