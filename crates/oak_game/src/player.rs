//! Player motion and animation state machine.
//!
//! `step` is a pure function of the previous state and this frame's inputs. It
//! returns the next state and a `MotionCommand` that the world applies to the
//! physics body and the animation player. Rules, in order:
//!
//! 1. Horizontal: left wins over right, both set facing; neither stops.
//! 2. Jump: held jump on the ground while not attacking sets the jump velocity.
//! 3. Attack: a fresh press on the ground while not attacking starts the
//!    attack clip and zeroes horizontal velocity for this frame.
//! 4. Animation: while attacking nothing else is requested. Otherwise airborne
//!    picks jump (rising) or fall, grounded picks run or idle.
//!
//! The attack flag clears only when the attack clip reports completion.

use oak_core::animation::{AnimationSet, ClipDef, REPEAT_FOREVER};

use crate::intent::Intents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAnim {
    Idle,
    Run,
    Jump,
    Fall,
    Attack,
}

impl PlayerAnim {
    pub const ALL: [PlayerAnim; 5] = [
        PlayerAnim::Idle,
        PlayerAnim::Run,
        PlayerAnim::Jump,
        PlayerAnim::Fall,
        PlayerAnim::Attack,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PlayerAnim::Idle => "char-blue-idle",
            PlayerAnim::Run => "char-blue-run",
            PlayerAnim::Jump => "char-blue-jump",
            PlayerAnim::Fall => "char-blue-fall",
            PlayerAnim::Attack => "char-blue-attack",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|anim| anim.key() == key)
    }

    /// Frame ranges on the 56x56 character sheet.
    pub fn clip_def(self) -> ClipDef {
        let (start_frame, end_frame, frame_rate, repeat) = match self {
            PlayerAnim::Idle => (0, 5, 8, REPEAT_FOREVER),
            PlayerAnim::Run => (16, 21, 10, REPEAT_FOREVER),
            PlayerAnim::Jump => (28, 31, 10, 0),
            PlayerAnim::Fall => (35, 37, 10, 0),
            PlayerAnim::Attack => (8, 13, 12, 0),
        };
        ClipDef {
            start_frame,
            end_frame,
            frame_rate,
            repeat,
        }
    }
}

pub fn register_player_clips(set: &mut AnimationSet) -> Result<(), String> {
    for anim in PlayerAnim::ALL {
        set.register(anim.key(), anim.clip_def())?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Horizontal speed, units/s.
    pub speed: f32,
    /// Vertical velocity applied on jump. Negative is up.
    pub jump_velocity: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 100.0,
            jump_velocity: -250.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    pub is_attacking: bool,
    /// Sprite mirrored to face left.
    pub flip_x: bool,
    /// Last requested clip.
    pub animation: PlayerAnim,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_attacking: false,
            flip_x: false,
            animation: PlayerAnim::Idle,
        }
    }
}

impl PlayerState {
    pub fn on_animation_complete(&mut self, key: &str) {
        if key == PlayerAnim::Attack.key() {
            self.is_attacking = false;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInputs {
    pub intents: Intents,
    /// Body blocked from below after this frame's physics step.
    pub on_ground: bool,
    pub velocity_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    pub velocity_x: f32,
    /// `Some` only when the vertical velocity is overridden (jump).
    pub velocity_y: Option<f32>,
    /// Clip to play with ignore-if-playing semantics.
    pub play: Option<PlayerAnim>,
}

pub fn step(
    state: PlayerState,
    inputs: &FrameInputs,
    config: &MotionConfig,
) -> (PlayerState, MotionCommand) {
    let intents = inputs.intents;
    let mut next = state;
    let mut command = MotionCommand {
        velocity_x: 0.0,
        velocity_y: None,
        play: None,
    };

    if intents.moving_left {
        command.velocity_x = -config.speed;
        next.flip_x = true;
    } else if intents.moving_right {
        command.velocity_x = config.speed;
        next.flip_x = false;
    }

    if intents.jump_pressed && inputs.on_ground && !state.is_attacking {
        command.velocity_y = Some(config.jump_velocity);
    }

    if intents.attack_just_pressed && inputs.on_ground && !state.is_attacking {
        next.is_attacking = true;
        command.velocity_x = 0.0;
        command.play = Some(PlayerAnim::Attack);
    }

    if !next.is_attacking {
        command.play = Some(select_animation(
            inputs.on_ground,
            inputs.velocity_y,
            intents.any_horizontal(),
        ));
    }

    if let Some(anim) = command.play {
        next.animation = anim;
    }
    (next, command)
}

/// Movement clip for a non-attacking player.
pub fn select_animation(on_ground: bool, velocity_y: f32, moving_horizontally: bool) -> PlayerAnim {
    if !on_ground {
        if velocity_y < 0.0 {
            PlayerAnim::Jump
        } else {
            PlayerAnim::Fall
        }
    } else if moving_horizontally {
        PlayerAnim::Run
    } else {
        PlayerAnim::Idle
    }
}
