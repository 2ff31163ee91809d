//! Keyboard state to per-frame player intents.
//!
//! Movement and jump are level-triggered (held), attack is edge-triggered and
//! true only on the frame the key went down.

use oak_core::input::{InputState, Key};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub moving_left: bool,
    pub moving_right: bool,
    pub jump_pressed: bool,
    pub attack_just_pressed: bool,
}

impl Intents {
    pub fn any_horizontal(&self) -> bool {
        self.moving_left || self.moving_right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
    pub attack: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: Key::Left,
            right: Key::Right,
            jump: Key::Up,
            attack: Key::X,
        }
    }
}

pub fn read_intents(input: &InputState, bindings: &KeyBindings) -> Intents {
    Intents {
        moving_left: input.is_held(bindings.left),
        moving_right: input.is_held(bindings.right),
        jump_pressed: input.is_held(bindings.jump),
        attack_just_pressed: input.is_just_pressed(bindings.attack),
    }
}
