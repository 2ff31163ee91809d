//! Headless game state advanced one fixed step at a time.
//!
//! Nothing here touches the GPU or the window, so the whole loop runs in tests.
//! Order inside a step:
//!
//! 1. physics (gravity, terrain and world-bounds collision)
//! 2. animation tick, forwarding clip completion to the player state
//! 3. gameplay update (intents, state machine, parallax, ground generation)
//! 4. camera follow

use glam::Vec2;
use oak_core::animation::{AnimationEvent, AnimationPlayer, AnimationSet};
use oak_core::input::InputState;
use oak_render::{Camera2D, CameraFollow};

use crate::intent::{read_intents, KeyBindings};
use crate::parallax::{ParallaxOffsets, ParallaxRatios};
use crate::physics::{ArcadeBody, BodyShape, PhysicsConfig};
use crate::player::{self, register_player_clips, FrameInputs, MotionConfig, PlayerAnim, PlayerState};
use crate::scene::{PLAYER_SPAWN, VIEW_HEIGHT, VIEW_WIDTH};
use crate::terrain::{TerrainConfig, TerrainGrid};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub terrain: TerrainConfig,
    pub physics: PhysicsConfig,
    pub motion: MotionConfig,
    pub parallax: ParallaxRatios,
    pub follow: CameraFollow,
    pub bindings: KeyBindings,
    pub body: BodyShape,
    pub spawn: Vec2,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            physics: PhysicsConfig::default(),
            motion: MotionConfig::default(),
            parallax: ParallaxRatios::default(),
            follow: CameraFollow::default(),
            bindings: KeyBindings::default(),
            body: BodyShape::default(),
            spawn: PLAYER_SPAWN,
        }
    }
}

pub struct GameWorld {
    pub config: WorldConfig,
    pub terrain: TerrainGrid,
    pub body: ArcadeBody,
    pub player: PlayerState,
    pub animations: AnimationSet,
    pub anim_player: AnimationPlayer,
    pub camera: Camera2D,
    pub parallax: ParallaxOffsets,
    pub step_count: u64,
    /// Whether the previous step already saw the attack key's press edge.
    attack_edge_seen: bool,
}

impl GameWorld {
    pub fn new(config: WorldConfig) -> Result<Self, String> {
        let mut terrain = TerrainGrid::new(config.terrain);
        terrain.seed();

        let mut animations = AnimationSet::new();
        register_player_clips(&mut animations)?;
        let mut anim_player = AnimationPlayer::new();
        let player = PlayerState::default();
        anim_player.play(&animations, player.animation.key(), true);

        let body = ArcadeBody::new(config.spawn, config.body);
        let mut camera = Camera2D::new(VIEW_WIDTH, VIEW_HEIGHT);
        camera.start_follow(body.position, config.follow);
        let parallax = ParallaxOffsets::compute(camera.scroll_x(), &config.parallax);

        log::info!(
            "Scene started: player at ({}, {}), {} ground columns ready",
            body.position.x,
            body.position.y,
            terrain.generated_to()
        );

        Ok(Self {
            config,
            terrain,
            body,
            player,
            animations,
            anim_player,
            camera,
            parallax,
            step_count: 0,
            attack_edge_seen: false,
        })
    }

    pub fn step(&mut self, input: &InputState, dt_us: u64) {
        let dt = dt_us as f32 / 1_000_000.0;

        self.body.step(dt, &self.config.physics, &self.terrain);

        if let Some(AnimationEvent::Complete(key)) = self.anim_player.tick(dt_us, &self.animations) {
            if PlayerAnim::from_key(&key) == Some(PlayerAnim::Attack) && self.player.is_attacking {
                log::debug!("Attack finished at step {}", self.step_count);
            }
            self.player.on_animation_complete(&key);
        }

        self.update(input);

        self.camera.update_follow(self.body.position);
        self.step_count += 1;
    }

    fn update(&mut self, input: &InputState) {
        let mut intents = read_intents(input, &self.config.bindings);
        // A press edge belongs to the first step that sees it, even if the
        // caller runs several steps before clearing it.
        let edge = intents.attack_just_pressed;
        intents.attack_just_pressed = edge && !self.attack_edge_seen;
        self.attack_edge_seen = edge;

        let inputs = FrameInputs {
            intents,
            on_ground: self.body.on_floor(),
            velocity_y: self.body.velocity.y,
        };
        let (next, command) = player::step(self.player, &inputs, &self.config.motion);

        self.body.velocity.x = command.velocity_x;
        if let Some(vy) = command.velocity_y {
            self.body.velocity.y = vy;
        }
        if let Some(anim) = command.play {
            if anim == PlayerAnim::Attack {
                log::debug!("Attack started at step {}", self.step_count);
            }
            self.anim_player.play(&self.animations, anim.key(), true);
        }
        self.player = next;

        self.parallax = ParallaxOffsets::compute(self.camera.scroll_x(), &self.config.parallax);
        self.terrain.extend_ahead(self.body.position.x);
    }

    pub fn player_frame(&self) -> Option<u32> {
        self.anim_player.current_frame(&self.animations)
    }
}
