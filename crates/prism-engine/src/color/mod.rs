//! Color spaces at the lighting/display boundary.
//!
//! - [`LinearRgba`]: linear light, the working space of all shading math.
//! - [`NormalizedSrgba`]: sRGB-encoded, what display and `*Srgb` storage targets hold.
//!
//! The free functions mirror the shader-side helpers of the same name and operate
//! on raw `float4` values.

mod linear;
mod srgb;
mod transfer;

pub use linear::LinearRgba;
pub use srgb::NormalizedSrgba;
pub use transfer::{
    linear_rgb_to_normalized_srgb, linear_to_srgb, normalized_srgb_to_linear_rgb, srgb_to_linear,
};
