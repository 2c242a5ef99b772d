/// Browser key codes of the keyboard layout used by the game.
pub mod key_codes {
    pub const SHIFT: u32 = 16;
    pub const SPACE: u32 = 32;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_UP: u32 = 38;
    pub const ARROW_RIGHT: u32 = 39;
    pub const ARROW_DOWN: u32 = 40;
    pub const KEY_I: u32 = 73;
    pub const KEY_P: u32 = 80;
    pub const KEY_V: u32 = 86;
}

/// ControlEvent is a discrete input event. Variants carrying a bool are held controls (true on
/// key-down, false on key-up), the others are one-shot actions triggered on key-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Accelerate(bool),
    Brake(bool),
    TurnLeft(bool),
    TurnRight(bool),
    DriftModifier(bool),
    Boost,
    UseItem,
    UsePowerUp,
    TogglePov,
}

impl ControlEvent {
    /// from_key_code maps a key-down (`pressed == true`) or key-up event onto a control event.
    /// Unknown key codes and key-ups of one-shot keys yield None.
    pub fn from_key_code(key_code: u32, pressed: bool) -> Option<ControlEvent> {
        use self::key_codes::*;

        match (key_code, pressed) {
            (ARROW_UP, _) => Some(ControlEvent::Accelerate(pressed)),
            (ARROW_DOWN, _) => Some(ControlEvent::Brake(pressed)),
            (ARROW_LEFT, _) => Some(ControlEvent::TurnLeft(pressed)),
            (ARROW_RIGHT, _) => Some(ControlEvent::TurnRight(pressed)),
            (SHIFT, _) => Some(ControlEvent::DriftModifier(pressed)),
            (SPACE, true) => Some(ControlEvent::Boost),
            (KEY_I, true) => Some(ControlEvent::UseItem),
            (KEY_P, true) => Some(ControlEvent::UsePowerUp),
            (KEY_V, true) => Some(ControlEvent::TogglePov),
            _ => None,
        }
    }
}

/// ControlFlags holds the state of the held controls between key-down and key-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub drift_modifier: bool,
}

impl ControlFlags {
    /// set applies a held control event. Returns false for one-shot events, which are not
    /// represented by a flag.
    pub fn set(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::Accelerate(on) => self.accelerate = on,
            ControlEvent::Brake(on) => self.brake = on,
            ControlEvent::TurnLeft(on) => self.turn_left = on,
            ControlEvent::TurnRight(on) => self.turn_right = on,
            ControlEvent::DriftModifier(on) => self.drift_modifier = on,
            ControlEvent::Boost
            | ControlEvent::UseItem
            | ControlEvent::UsePowerUp
            | ControlEvent::TogglePov => return false,
        }
        true
    }

    pub fn is_turning(&self) -> bool {
        self.turn_left || self.turn_right
    }
}
