use serde::Serialize;
use std::path::{Path, PathBuf};

/// Opaque handle to a texture owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextureHandle(pub u32);

/// Errors from creating a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("unsupported image format in {path}: {channels} channels")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
    #[error("{path} is {width}x{height}, larger than the {max}px texture limit")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

impl TextureError {
    pub fn path(&self) -> &Path {
        match self {
            TextureError::Io { path, .. }
            | TextureError::Decode { path, .. }
            | TextureError::UnsupportedChannels { path, .. }
            | TextureError::TooLarge { path, .. } => path,
        }
    }
}

/// Texture service: decodes and uploads images, binds them to units.
pub trait TextureBackend {
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError>;

    /// Bind `handle` to texture unit `unit`.
    fn bind_texture(&mut self, handle: TextureHandle, unit: u32);

    fn destroy_texture(&mut self, handle: TextureHandle);
}
