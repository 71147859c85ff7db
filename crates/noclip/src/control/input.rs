use serde::{Deserialize, Serialize};

/// Keys the desktop flight controls can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesktopKey {
    Q,
    E,
    R,
    F,
    C,
    X,
    Z,
    Space,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    PageUp,
    PageDown,
}

const KEY_COUNT: usize = 14;

impl DesktopKey {
    const fn index(self) -> usize {
        match self {
            DesktopKey::Q => 0,
            DesktopKey::E => 1,
            DesktopKey::R => 2,
            DesktopKey::F => 3,
            DesktopKey::C => 4,
            DesktopKey::X => 5,
            DesktopKey::Z => 6,
            DesktopKey::Space => 7,
            DesktopKey::LeftShift => 8,
            DesktopKey::RightShift => 9,
            DesktopKey::LeftControl => 10,
            DesktopKey::RightControl => 11,
            DesktopKey::PageUp => 12,
            DesktopKey::PageDown => 13,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let key = match token.to_ascii_lowercase().as_str() {
            "q" => DesktopKey::Q,
            "e" => DesktopKey::E,
            "r" => DesktopKey::R,
            "f" => DesktopKey::F,
            "c" => DesktopKey::C,
            "x" => DesktopKey::X,
            "z" => DesktopKey::Z,
            "space" => DesktopKey::Space,
            "left_shift" | "shift" => DesktopKey::LeftShift,
            "right_shift" => DesktopKey::RightShift,
            "left_control" | "ctrl" => DesktopKey::LeftControl,
            "right_control" => DesktopKey::RightControl,
            "page_up" => DesktopKey::PageUp,
            "page_down" => DesktopKey::PageDown,
            _ => return None,
        };
        Some(key)
    }
}

/// Raw input delivered by the host application, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// The activation control changed state. Only presses count as edges.
    Activation { pressed: bool },
    MoveHorizontal { value: f32 },
    MoveVertical { value: f32 },
    LookVertical { value: f32 },
    Key { key: DesktopKey, pressed: bool },
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeyStates {
    down: [bool; KEY_COUNT],
}

impl KeyStates {
    pub(crate) fn set(&mut self, key: DesktopKey, is_down: bool) {
        self.down[key.index()] = is_down;
    }

    pub(crate) fn is_down(&self, key: DesktopKey) -> bool {
        self.down[key.index()]
    }
}

/// Latched analog axes and held keys, read by the integrator each tick.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct InputState {
    pub(crate) move_horizontal: f32,
    pub(crate) move_vertical: f32,
    pub(crate) look_vertical: f32,
    /// Last raw activation sample; only a released-to-pressed change is an edge.
    pub(crate) activation_held: bool,
    pub(crate) keys: KeyStates,
}

impl InputState {
    pub(crate) fn axis_or_zero(value: f32) -> f32 {
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}
