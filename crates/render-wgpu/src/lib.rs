//! wgpu render backend for the still-life viewer.
//!
//! Implements the shader, mesh and texture services on top of one Phong
//! pipeline. Uniforms are written by name, as with a linked GL program, and
//! staged into per-frame and per-draw blocks.
//!
//! # Invariants
//! - A uniform keeps its value until it is written again.
//! - Every captured draw uses the object block as it was when captured.
//! - A draw with no valid texture unit samples a 1x1 white texture.

mod gpu;
mod meshes;
mod shaders;
mod textures;
mod uniforms;

pub use gpu::WgpuRenderer;
pub use meshes::{MeshData, PartRanges, Vertex};
pub use textures::{DecodedImage, decode_rgba};
pub use uniforms::{FrameUniforms, MAX_LIGHTS, ObjectUniforms, UniformStaging};
