//! Spritesheet animation clips and deterministic playback.
//!
//! A clip is a contiguous frame range of one spritesheet played at a fixed
//! frame rate. Timing uses integer microseconds (`u64`) so playback advances
//! identically under the fixed-timestep loop on every platform.
//!
//! Repeat semantics: `-1` loops forever, `0` plays once, `n` plays `n` extra
//! times. Finite clips report an `AnimationEvent::Complete` from the tick that
//! runs past their last frame, and the player stops on that frame.

use std::collections::HashMap;

pub const REPEAT_FOREVER: i32 = -1;

/// Authoring-side description of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipDef {
    pub start_frame: u32,
    pub end_frame: u32,
    pub frame_rate: u32,
    pub repeat: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub sheet_frame: u32,
    pub duration_us: u64,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    pub repeat: i32,
}

impl AnimationClip {
    pub fn from_def(def: ClipDef) -> Result<Self, String> {
        if def.end_frame < def.start_frame {
            return Err(format!(
                "Clip validation failed: end_frame {} is before start_frame {}",
                def.end_frame, def.start_frame
            ));
        }
        if def.frame_rate == 0 {
            return Err("Clip validation failed: frame_rate must be > 0".to_string());
        }
        if def.repeat < REPEAT_FOREVER {
            return Err(format!(
                "Clip validation failed: repeat {} is below -1",
                def.repeat
            ));
        }
        let duration_us = 1_000_000 / u64::from(def.frame_rate);
        let frames = (def.start_frame..=def.end_frame)
            .map(|sheet_frame| AnimationFrame {
                sheet_frame,
                duration_us,
            })
            .collect();
        Ok(Self {
            frames,
            repeat: def.repeat,
        })
    }

    pub fn loops_forever(&self) -> bool {
        self.repeat == REPEAT_FOREVER
    }

    /// Duration of one pass through the frames.
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// Named clips available to an `AnimationPlayer`.
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    clips: HashMap<String, AnimationClip>,
}

impl AnimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, def: ClipDef) -> Result<(), String> {
        let clip = AnimationClip::from_def(def).map_err(|e| format!("Clip '{key}': {e}"))?;
        if self.clips.insert(key.to_string(), clip).is_some() {
            log::warn!("Animation clip '{}' registered twice; keeping the latest", key);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&AnimationClip> {
        self.clips.get(key)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    Complete(String),
}

/// Playback state for one sprite.
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayer {
    current: Option<String>,
    frame_index: usize,
    elapsed_us: u64,
    passes_left: i32,
    playing: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `key` from its first frame. With `ignore_if_playing`, a call for
    /// the clip that is already running is a no-op; a clip that has completed
    /// is no longer running and restarts. Returns whether playback restarted.
    pub fn play(&mut self, set: &AnimationSet, key: &str, ignore_if_playing: bool) -> bool {
        if ignore_if_playing && self.playing && self.current.as_deref() == Some(key) {
            return false;
        }
        let Some(clip) = set.get(key) else {
            log::warn!("Tried to play unknown animation clip '{}'", key);
            return false;
        };
        self.current = Some(key.to_string());
        self.frame_index = 0;
        self.elapsed_us = 0;
        self.passes_left = clip.repeat;
        self.playing = true;
        true
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Spritesheet frame to draw, or `None` before the first `play`.
    pub fn current_frame(&self, set: &AnimationSet) -> Option<u32> {
        let clip = set.get(self.current.as_deref()?)?;
        clip.frames.get(self.frame_index).map(|f| f.sheet_frame)
    }

    /// Advance by `dt_us` microseconds using integer arithmetic only.
    pub fn tick(&mut self, dt_us: u64, set: &AnimationSet) -> Option<AnimationEvent> {
        if !self.playing {
            return None;
        }
        let key = self.current.as_deref()?;
        let Some(clip) = set.get(key) else {
            log::warn!("Active animation clip '{}' is not registered", key);
            return None;
        };
        if clip.frames.is_empty() {
            return None;
        }

        self.elapsed_us += dt_us;

        loop {
            let duration = clip.frames[self.frame_index].duration_us;
            if self.elapsed_us < duration {
                return None;
            }
            self.elapsed_us -= duration;

            if self.frame_index + 1 < clip.frames.len() {
                self.frame_index += 1;
                continue;
            }

            if clip.loops_forever() {
                self.frame_index = 0;
            } else if self.passes_left > 0 {
                self.passes_left -= 1;
                self.frame_index = 0;
            } else {
                self.elapsed_us = 0;
                self.playing = false;
                return Some(AnimationEvent::Complete(key.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(key: &str, def: ClipDef) -> AnimationSet {
        let mut set = AnimationSet::new();
        set.register(key, def).expect("valid clip");
        set
    }

    fn once(start: u32, end: u32, rate: u32) -> ClipDef {
        ClipDef {
            start_frame: start,
            end_frame: end,
            frame_rate: rate,
            repeat: 0,
        }
    }

    #[test]
    fn clip_expands_frame_range() {
        let clip = AnimationClip::from_def(once(8, 13, 12)).expect("valid");
        assert_eq!(clip.frames.len(), 6);
        assert_eq!(clip.frames[0].sheet_frame, 8);
        assert_eq!(clip.frames[5].sheet_frame, 13);
        assert_eq!(clip.frames[0].duration_us, 83_333);
    }

    #[test]
    fn clip_rejects_bad_definitions() {
        let err = AnimationClip::from_def(once(5, 2, 10)).expect_err("reversed range");
        assert!(err.contains("before start_frame"));
        let err = AnimationClip::from_def(once(0, 2, 0)).expect_err("zero rate");
        assert!(err.contains("frame_rate"));
        let err = AnimationClip::from_def(ClipDef {
            repeat: -2,
            ..once(0, 1, 10)
        })
        .expect_err("repeat below -1");
        assert!(err.contains("repeat"));
    }

    #[test]
    fn tick_advances_through_frames() {
        let set = set_with("walk", once(0, 2, 10));
        let mut player = AnimationPlayer::new();
        assert!(player.play(&set, "walk", true));
        assert_eq!(player.current_frame(&set), Some(0));

        assert_eq!(player.tick(50_000, &set), None);
        assert_eq!(player.current_frame(&set), Some(0));
        assert_eq!(player.tick(60_000, &set), None);
        assert_eq!(player.current_frame(&set), Some(1));
    }

    #[test]
    fn looping_clip_wraps_and_never_completes() {
        let set = set_with(
            "idle",
            ClipDef {
                repeat: REPEAT_FOREVER,
                ..once(0, 5, 8)
            },
        );
        let mut player = AnimationPlayer::new();
        player.play(&set, "idle", true);
        for _ in 0..600 {
            assert_eq!(player.tick(16_667, &set), None);
        }
        assert!(player.is_playing());
    }

    #[test]
    fn play_once_clip_completes_on_last_frame() {
        let set = set_with("attack", once(8, 13, 12));
        let mut player = AnimationPlayer::new();
        player.play(&set, "attack", true);

        let mut completed_at = None;
        for step in 1..=40 {
            if let Some(event) = player.tick(16_667, &set) {
                assert_eq!(event, AnimationEvent::Complete("attack".to_string()));
                completed_at = Some(step);
                break;
            }
        }
        // Six frames at 12 fps is half a second: 30 steps at 60 Hz.
        assert_eq!(completed_at, Some(30));
        assert!(!player.is_playing());
        assert_eq!(player.current_frame(&set), Some(13));
        assert_eq!(player.tick(16_667, &set), None);
    }

    #[test]
    fn repeat_count_adds_extra_passes() {
        let set = set_with(
            "blink",
            ClipDef {
                repeat: 2,
                ..once(0, 0, 10)
            },
        );
        let mut player = AnimationPlayer::new();
        player.play(&set, "blink", true);
        assert_eq!(player.tick(100_000, &set), None);
        assert_eq!(player.tick(100_000, &set), None);
        assert!(player.tick(100_000, &set).is_some());
    }

    #[test]
    fn play_is_idempotent_while_running() {
        let set = set_with("run", once(16, 21, 10));
        let mut player = AnimationPlayer::new();
        player.play(&set, "run", true);
        player.tick(150_000, &set);
        assert_eq!(player.frame_index(), 1);

        assert!(!player.play(&set, "run", true));
        assert_eq!(player.frame_index(), 1);

        assert!(player.play(&set, "run", false));
        assert_eq!(player.frame_index(), 0);
    }

    #[test]
    fn completed_clip_restarts_on_play() {
        let set = set_with("jump", once(28, 31, 10));
        let mut player = AnimationPlayer::new();
        player.play(&set, "jump", true);
        assert!(player.tick(400_000, &set).is_some());
        assert!(player.play(&set, "jump", true));
        assert_eq!(player.current_frame(&set), Some(28));
    }

    #[test]
    fn unknown_clip_is_ignored() {
        let set = AnimationSet::new();
        let mut player = AnimationPlayer::new();
        assert!(!player.play(&set, "missing", true));
        assert_eq!(player.current_key(), None);
        assert_eq!(player.tick(16_667, &set), None);
    }

    #[test]
    fn playback_is_deterministic() {
        let set = set_with(
            "run",
            ClipDef {
                repeat: REPEAT_FOREVER,
                ..once(16, 21, 10)
            },
        );
        let mut a = AnimationPlayer::new();
        let mut b = AnimationPlayer::new();
        a.play(&set, "run", true);
        b.play(&set, "run", true);
        for _ in 0..250 {
            a.tick(16_667, &set);
            b.tick(16_667, &set);
            assert_eq!(a.current_frame(&set), b.current_frame(&set));
        }
    }
}
