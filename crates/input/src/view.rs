use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use stilllife_render::{ShaderProgram, uniform};

use crate::action::{Key, KeyAction, Movement};

const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Starting pose and tuning for the view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    /// Degrees of rotation per pixel of pointer travel.
    pub sensitivity: f32,
    /// World units per second.
    pub speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed change per scroll notch.
    pub scroll_step: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.0, 10.0),
            yaw_degrees: -90.0,
            pitch_degrees: -20.0,
            sensitivity: 0.1,
            speed: 2.5,
            min_speed: 0.5,
            max_speed: 25.0,
            scroll_step: 0.5,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }
}

/// Camera orientation, position and projection mode driven by input events.
///
/// Look input arrives either as absolute window coordinates
/// ([`on_pointer_move`](Self::on_pointer_move), rotating by the difference to
/// the previous one) or as raw motion deltas
/// ([`on_pointer_delta`](Self::on_pointer_delta)). After construction or
/// [`ViewState::reset_pointer`] the first event of either kind only seeds.
#[derive(Debug, Clone)]
pub struct ViewState {
    yaw_degrees: f32,
    pitch_degrees: f32,
    position: Vec3,
    front: Vec3,
    up: Vec3,
    speed: f32,
    projection: ProjectionMode,
    last_pointer: Option<Vec2>,
    skip_next_delta: bool,
    config: ViewConfig,
}

impl ViewState {
    pub fn new(config: ViewConfig) -> Self {
        let min_speed = config.min_speed.max(f32::EPSILON);
        let max_speed = config.max_speed.max(min_speed);
        let mut state = Self {
            yaw_degrees: config.yaw_degrees,
            pitch_degrees: config
                .pitch_degrees
                .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES),
            position: config.position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            speed: config.speed.clamp(min_speed, max_speed),
            projection: ProjectionMode::Perspective,
            last_pointer: None,
            skip_next_delta: true,
            config: ViewConfig {
                min_speed,
                max_speed,
                ..config
            },
        };
        state.update_front();
        state
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let pointer = Vec2::new(x, y);
        let Some(last) = self.last_pointer.replace(pointer) else {
            return;
        };
        let delta = pointer - last;
        self.look(delta.x, delta.y);
    }

    /// Rotate by raw pointer motion. Unlike positions, deltas keep coming when
    /// the cursor sits at the window edge.
    pub fn on_pointer_delta(&mut self, dx: f32, dy: f32) {
        if std::mem::take(&mut self.skip_next_delta) {
            return;
        }
        self.look(dx, dy);
    }

    /// Forget the reference pointer so the next move or delta re-seeds.
    pub fn reset_pointer(&mut self) {
        self.last_pointer = None;
        self.skip_next_delta = true;
    }

    fn look(&mut self, dx: f32, dy: f32) {
        self.yaw_degrees = (self.yaw_degrees + dx * self.config.sensitivity).rem_euclid(360.0);
        // Window y grows downward; moving the pointer up looks up.
        self.pitch_degrees = (self.pitch_degrees - dy * self.config.sensitivity)
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        self.update_front();
    }

    /// Scroll adjusts movement speed; it never zooms.
    pub fn on_scroll(&mut self, delta_y: f32) {
        self.speed = (self.speed + delta_y * self.config.scroll_step)
            .clamp(self.config.min_speed, self.config.max_speed);
        tracing::trace!(speed = self.speed, "movement speed changed");
    }

    pub fn on_key(&mut self, key: Key, action: KeyAction) {
        if key == Key::P && action == KeyAction::Press {
            self.projection = self.projection.toggled();
            tracing::debug!(mode = ?self.projection, "projection toggled");
        }
    }

    pub fn apply_movement(&mut self, movement: &Movement, delta_time: f32) {
        if movement.is_idle() {
            return;
        }
        let step = self.speed * delta_time;
        self.position += self.front * movement.forward * step
            + self.right() * movement.right * step
            + self.up * movement.up * step;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Orthographic mode keeps the perspective frustum's vertical extent at
    /// the distance from the camera to the world origin.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let fov = self.config.fov_degrees.to_radians();
        match self.projection {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(fov, aspect_ratio, self.config.near, self.config.far)
            }
            ProjectionMode::Orthographic => {
                let distance = self.position.length().max(self.config.near);
                let half_height = distance * (fov * 0.5).tan();
                let half_width = half_height * aspect_ratio;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.config.near,
                    self.config.far,
                )
            }
        }
    }

    /// Set `view`, `projection` and `viewPosition` for the coming frame.
    pub fn upload(&self, shader: &mut impl ShaderProgram, aspect_ratio: f32) {
        shader.set_mat4(uniform::VIEW, self.view_matrix());
        shader.set_mat4(uniform::PROJECTION, self.projection_matrix(aspect_ratio));
        shader.set_vec3(uniform::VIEW_POSITION, self.position);
    }

    pub fn right(&self) -> Vec3 {
        self.front.cross(self.up).normalize()
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_degrees
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_degrees
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    fn update_front(&mut self) {
        let (yaw, pitch) = (self.yaw_degrees.to_radians(), self.pitch_degrees.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
