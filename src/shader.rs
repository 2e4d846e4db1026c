//! WGSL sources and the uniform blocks they read.

use bytemuck::{Pod, Zeroable};

pub const RAIN_SHADER: &str = include_str!("rain.wgsl");
pub const BLOOM_SHADER: &str = include_str!("bloom.wgsl");

/// Per-frame uniforms for `rain.wgsl` (96 bytes, std140-compatible).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RainUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub time: f32,
    pub speed: f32,
    pub drift: f32,
    pub stretch: f32,
    pub _pad: f32,
}

/// Parameters for one bloom pass (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BloomParams {
    /// `1 / size` of the texture being sampled.
    pub texel_size: [f32; 2],
    /// Blur axis; ignored by extract and composite.
    pub direction: [f32; 2],
    pub threshold: f32,
    pub strength: f32,
    /// Blur tap spacing in texels.
    pub spread: f32,
    pub _pad: f32,
}
