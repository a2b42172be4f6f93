/// Keys the viewer reacts to. Window layers map their own key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    P,
    Escape,
    F1,
    Other,
}

/// Transition reported for a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    /// Auto-repeat while held. Never counts as a fresh press.
    Repeat,
    Release,
}

/// Per-axis movement intent for one frame, each component in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Movement {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl Movement {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }
}

/// Movement keys currently held down, polled once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a key event. Non-movement keys are ignored.
    pub fn handle(&mut self, key: Key, action: KeyAction) {
        let held = action != KeyAction::Release;
        match key {
            Key::W => self.forward = held,
            Key::S => self.back = held,
            Key::A => self.left = held,
            Key::D => self.right = held,
            Key::Q => self.up = held,
            Key::E => self.down = held,
            _ => {}
        }
    }

    /// Drop all held keys, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn movement(&self) -> Movement {
        fn axis(pos: bool, neg: bool) -> f32 {
            pos as i8 as f32 - neg as i8 as f32
        }
        Movement {
            forward: axis(self.forward, self.back),
            right: axis(self.right, self.left),
            up: axis(self.up, self.down),
        }
    }
}
