//! Tagged registries for materials and textures.
//!
//! Both registries are filled once while the scene is prepared and are
//! read-only while it renders. Lookups are by tag, first match wins.

mod material;
mod texture;

pub use material::{Material, MaterialRegistry};
pub use texture::{TEXTURE_CAPACITY, TextureBinding, TextureRegistry};

use stilllife_render::TextureError;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("texture registry is full ({capacity} slots), cannot load '{tag}'")]
    CapacityExceeded { capacity: usize, tag: String },
    #[error(transparent)]
    Texture(#[from] TextureError),
}
