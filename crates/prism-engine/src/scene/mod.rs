//! CPU-side scene model.
//!
//! Revision-independent values that the layout module encodes into GPU records,
//! plus the per-frame publish cycle.

mod instance;
mod material;
mod ring;
mod state;
mod uniforms;

pub use instance::Instance;
pub use material::Material;
pub use ring::FrameRing;
pub use state::{PublishedScene, SceneState};
pub use uniforms::{NearTransparency, Scene};
