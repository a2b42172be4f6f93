//! Shared types for the still-life renderer.

mod types;

pub use types::{Placement, model_matrix, rotation_about_vertical};
