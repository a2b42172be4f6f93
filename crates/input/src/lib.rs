//! Viewer input: platform-neutral keys, held-key movement, and the camera
//! view state that turns pointer, scroll and key events into matrices.
//!
//! # Invariants
//! - `front` is a unit vector after any sequence of pointer moves.
//! - Pitch stays inside the gimbal-safe range no matter how large the input.
//! - Projection toggles only on a fresh press, never on key repeat.

pub mod action;
mod view;

pub use action::{HeldKeys, Key, KeyAction, Movement};
pub use view::{ProjectionMode, ViewConfig, ViewState};
