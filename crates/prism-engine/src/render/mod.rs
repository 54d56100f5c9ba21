//! GPU-facing pieces: attachment formats, blend states, samplers and uploads.
//!
//! Nothing here owns a device. Functions that touch the GPU take a
//! [`RenderCtx`] from the host.

mod ctx;
pub mod gbuffer;
pub mod oit;
mod sampler;
mod upload;

pub use ctx::RenderCtx;
pub use gbuffer::{DiscriminatorStrategy, GBufferLayout, GBufferSample, GBufferTexel};
pub use oit::{OitFragment, OitPixel, WeightFunction};
pub use sampler::{AddressMode, SamplerCache, SamplerPolicy, SamplerPreset};
pub use upload::{GpuFrameUniforms, GpuRecordBuffer, RecordSource, Upload};
