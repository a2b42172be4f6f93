//! Renderer-agnostic capabilities consumed by the scene and view layers.
//!
//! A backend provides three services: a single shader program addressed by
//! uniform name, a library of primitive meshes, and texture storage bound to
//! numbered units. The wgpu backend implements them for real; the
//! [`RecordingBackend`] implements them by logging every call.
//!
//! # Invariants
//! - Uniform state is shared: a value persists until overwritten.
//! - Draw calls read whatever uniform state is live when they are issued.

mod mesh;
mod recording;
mod shader;
mod texture;

pub use mesh::{MeshKind, MeshLibrary, MeshParts};
pub use recording::{Command, DrawRecord, RecordingBackend};
pub use shader::{ShaderProgram, UniformValue, uniform};
pub use texture::{TextureBackend, TextureError, TextureHandle};

/// Everything a scene needs from a backend.
pub trait Graphics: ShaderProgram + MeshLibrary + TextureBackend {}

impl<T: ShaderProgram + MeshLibrary + TextureBackend> Graphics for T {}
