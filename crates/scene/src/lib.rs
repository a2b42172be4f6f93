//! Scene composition: the ordered object table and the per-frame draw pass.
//!
//! A scene is data: materials, lights, texture sources and an ordered list of
//! [`SceneObject`] descriptors. [`SceneComposer`] turns that data into calls
//! against a backend once at setup and once per frame.
//!
//! # Invariants
//! - Objects are drawn in table order, one draw each, every frame.
//! - Each draw re-specifies model matrix, color-or-texture and UV scale.
//! - A missing material or texture never aborts a frame.

mod animation;
mod composer;
mod descriptor;
mod lighting;
pub mod still_life;

pub use animation::{Spin, SpinMode};
pub use composer::{PrepareReport, SceneComposer, TextureSource};
pub use descriptor::{SceneObject, Surface};
pub use lighting::LightSource;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stilllife_assets::Material;

/// Everything that makes up a scene before it is prepared.
#[derive(Debug, Clone)]
pub struct SceneDefinition {
    pub materials: Vec<Material>,
    pub lights: Vec<LightSource>,
    pub textures: Vec<TextureSource>,
    pub objects: Vec<SceneObject>,
    /// Point on the vertical axis spinning objects turn about.
    pub spin_pivot: Vec3,
}

/// Runtime settings for a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory texture files are resolved against.
    pub texture_root: PathBuf,
    pub spin_mode: SpinMode,
    /// Degrees per frame, or per second in wall-clock mode.
    pub spin_step_degrees: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            texture_root: PathBuf::from("textures"),
            spin_mode: SpinMode::Frame,
            spin_step_degrees: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: SceneConfig = serde_json::from_str(r#"{ "spin_mode": "wall_clock" }"#).unwrap();
        assert_eq!(config.spin_mode, SpinMode::WallClock);
        assert_eq!(config.texture_root, PathBuf::from("textures"));
        assert_eq!(config.spin_step_degrees, 0.01);
    }
}
