//! Prism engine crate.
//!
//! The CPU side of a deferred renderer with weighted blended order-independent
//! transparency: the math the shaders mirror, the byte layouts of every record
//! shared with the GPU, G-buffer and OIT target setup, and the per-frame scene
//! cycle. The host owns the device, the window and the shaders.

pub mod color;
pub mod config;
mod error;
pub mod layout;
pub mod logging;
pub mod math;
pub mod render;
pub mod scene;
pub mod time;

pub use config::{OitConfig, PipelineConfig};
pub use error::LayoutError;
