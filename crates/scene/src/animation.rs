use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use stilllife_common::rotation_about_vertical;

/// How the spin angle advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinMode {
    /// A fixed step per rendered frame. Speed depends on frame rate.
    #[default]
    Frame,
    /// Step is degrees per second, scaled by the frame's delta time.
    WallClock,
}

/// Accumulating rotation about a vertical axis, kept in `[0, 360)` degrees.
///
/// Frame mode derives the angle from a frame count, so `n` updates land on
/// exactly `n * step` modulo 360 with no accumulated rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    frames: u64,
    wall_clock_degrees: f64,
    step_degrees: f64,
    mode: SpinMode,
    pivot: Vec3,
}

impl Spin {
    pub fn new(mode: SpinMode, step_degrees: f64, pivot: Vec3) -> Self {
        Self {
            frames: 0,
            wall_clock_degrees: 0.0,
            step_degrees,
            mode,
            pivot,
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        match self.mode {
            SpinMode::Frame => self.frames += 1,
            SpinMode::WallClock => {
                self.wall_clock_degrees = (self.wall_clock_degrees
                    + self.step_degrees * f64::from(delta_time))
                .rem_euclid(360.0);
            }
        }
    }

    pub fn angle_degrees(&self) -> f32 {
        let degrees = match self.mode {
            SpinMode::Frame => (self.frames as f64 * self.step_degrees).rem_euclid(360.0),
            SpinMode::WallClock => self.wall_clock_degrees,
        } as f32;
        // Values just under 360 round up when narrowed.
        if degrees >= 360.0 { 0.0 } else { degrees }
    }

    /// Updates applied so far in frame mode.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn mode(&self) -> SpinMode {
        self.mode
    }

    /// Current rotation about the pivot's vertical axis.
    pub fn rotation(&self) -> Mat4 {
        rotation_about_vertical(self.pivot, self.angle_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_mode_ignores_delta_time() {
        let mut spin = Spin::new(SpinMode::Frame, 2.0, Vec3::ZERO);
        spin.update(0.5);
        spin.update(10.0);
        assert_eq!(spin.angle_degrees(), 4.0);
    }

    #[test]
    fn n_updates_advance_by_n_steps_and_wrap() {
        let mut spin = Spin::new(SpinMode::Frame, 7.5, Vec3::ZERO);
        for _ in 0..100 {
            spin.update(1.0 / 60.0);
        }
        // 100 * 7.5 = 750 = 2 * 360 + 30
        assert_eq!(spin.angle_degrees(), 30.0);
    }

    #[test]
    fn small_steps_do_not_drift() {
        let mut spin = Spin::new(SpinMode::Frame, 0.01, Vec3::ZERO);
        for _ in 0..100 {
            spin.update(1.0 / 60.0);
        }
        assert!((spin.angle_degrees() - 1.0).abs() < 1e-6);

        for _ in 100..36_000 {
            spin.update(1.0 / 60.0);
        }
        assert_eq!(spin.frames(), 36_000);
        let angle = spin.angle_degrees();
        assert!(angle < 1e-6, "36000 steps of 0.01 should close the circle, got {angle}");
    }

    #[test]
    fn wall_clock_scales_by_delta() {
        let mut spin = Spin::new(SpinMode::WallClock, 90.0, Vec3::ZERO);
        spin.update(0.5);
        assert_eq!(spin.angle_degrees(), 45.0);
        spin.update(4.0);
        assert_eq!(spin.angle_degrees(), 45.0);
    }

    #[test]
    fn zero_angle_is_identity() {
        let spin = Spin::new(SpinMode::Frame, 1.0, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(spin.rotation(), Mat4::IDENTITY);
    }
}
