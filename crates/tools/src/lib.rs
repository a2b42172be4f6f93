//! Developer Tooling: scene and view inspection.
//!
//! # Invariants
//! - Inspection never mutates the scene or the view state.

mod inspector;

pub use inspector::{ObjectInfo, SceneInspector, SceneSummary, ViewSummary};
