use oak_core::input::{InputState, Key};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::world::GameWorld;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt_us")]
    pub fixed_dt_us: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held during the frame: "left", "right", "up", "down", "x".
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn expanded_frames(&self) -> Result<Vec<Vec<Key>>, String> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let keys = frame
                .held
                .iter()
                .map(|name| parse_key(name))
                .collect::<Result<Vec<_>, _>>()?;
            for _ in 0..frame.repeat.max(1) {
                out.push(keys.clone());
            }
        }
        Ok(out)
    }

    /// Feed every frame to `world`, pressing and releasing keys as the held
    /// set changes between frames.
    pub fn run(&self, world: &mut GameWorld) -> Result<(), String> {
        let mut input = InputState::new();
        for held in self.expanded_frames()? {
            for key in ALL_KEYS {
                let want = held.contains(&key);
                if want && !input.is_held(key) {
                    input.key_down(key);
                } else if !want && input.is_held(key) {
                    input.key_up(key);
                }
            }
            world.step(&input, self.fixed_dt_us);
            input.end_frame();
        }
        Ok(())
    }
}

const ALL_KEYS: [Key; 5] = [Key::Left, Key::Right, Key::Up, Key::Down, Key::X];

fn parse_key(name: &str) -> Result<Key, String> {
    match name {
        "left" => Ok(Key::Left),
        "right" => Ok(Key::Right),
        "up" => Ok(Key::Up),
        "down" => Ok(Key::Down),
        "x" => Ok(Key::X),
        other => Err(format!("Replay validation failed: unknown key '{other}'")),
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt_us == 0 {
        return Err("Replay validation failed: fixed_dt_us must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    replay.expanded_frames().map(|_| ())
}

const fn default_dt_us() -> u64 {
    16_667
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerAnim;
    use crate::world::WorldConfig;
    use glam::Vec2;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "oak_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[derive(Debug, PartialEq)]
    struct Snapshot {
        position: Vec2,
        velocity: Vec2,
        flip_x: bool,
        is_attacking: bool,
        animation: PlayerAnim,
        clip: Option<String>,
        frame: Option<u32>,
        scroll: Vec2,
        far: f32,
        generated_to: i32,
    }

    fn snapshot(world: &GameWorld) -> Snapshot {
        Snapshot {
            position: world.body.position,
            velocity: world.body.velocity,
            flip_x: world.player.flip_x,
            is_attacking: world.player.is_attacking,
            animation: world.player.animation,
            clip: world.anim_player.current_key().map(str::to_string),
            frame: world.player_frame(),
            scroll: world.camera.scroll,
            far: world.parallax.far,
            generated_to: world.terrain.generated_to(),
        }
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "held": ["right"], "repeat": 3 },
                { "held": ["right", "x"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.fixed_dt_us, 16_667);
        let frames = replay.expanded_frames().expect("keys parse");
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[3], vec![Key::Right, Key::X]);
        assert!(frames[5].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_unknown_keys() {
        let path = temp_file_path("badkey");
        fs::write(&path, r#"{ "frames": [ { "held": ["space"] } ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("unknown key should fail");
        assert!(err.contains("unknown key 'space'"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = temp_file_path("deterministic");
        fs::write(
            &path,
            r#"{
              "frames": [
                { "repeat": 40 },
                { "held": ["right"], "repeat": 90 },
                { "held": ["right", "up"], "repeat": 5 },
                { "held": ["right"], "repeat": 60 },
                { "held": ["x"] },
                { "repeat": 40 },
                { "held": ["left"], "repeat": 45 },
                { "held": ["left", "x"], "repeat": 3 },
                { "held": ["right"], "repeat": 600 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let mut run_a = GameWorld::new(WorldConfig::default()).expect("world a");
        let mut run_b = GameWorld::new(WorldConfig::default()).expect("world b");
        replay.run(&mut run_a).expect("run a");
        replay.run(&mut run_b).expect("run b");

        assert_eq!(snapshot(&run_a), snapshot(&run_b));
        assert_eq!(run_a.step_count, 884);
        assert_eq!(run_a.player.animation, PlayerAnim::Run);
        assert!(run_a.terrain.generated_to() > 20);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn attack_press_is_seen_once_even_when_held() {
        let replay = ReplaySequence {
            fixed_dt_us: 16_667,
            frames: vec![
                ReplayFrame {
                    held: vec![],
                    repeat: 40,
                },
                ReplayFrame {
                    held: vec!["x".to_string()],
                    repeat: 80,
                },
            ],
        };
        let mut world = GameWorld::new(WorldConfig::default()).expect("world");
        replay.run(&mut world).expect("run");
        // One attack, finished after ~30 steps; holding X does not re-trigger.
        assert!(!world.player.is_attacking);
        assert_eq!(world.player.animation, PlayerAnim::Idle);
    }
}
