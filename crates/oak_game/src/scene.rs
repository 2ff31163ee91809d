//! Fixed content of the Oak Woods scene: texture keys, the decoration layout
//! and the player spawn point.

use glam::Vec2;

pub const VIEW_WIDTH: u32 = 320;
pub const VIEW_HEIGHT: u32 = 180;

/// World y of the ground surface (top of the ground tile row).
pub const GROUND_Y: f32 = 184.0;

pub const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, 120.0);

/// Back to front, paired with `ParallaxOffsets::layers()`.
pub const BACKGROUND_KEYS: [&str; 3] = [
    "oakwoods-bg-layer1",
    "oakwoods-bg-layer2",
    "oakwoods-bg-layer3",
];

pub const TILESET_KEY: &str = "oakwoods-tileset";
pub const CHARACTER_KEY: &str = "oakwoods-char-blue";

/// Image anchored bottom-centre on the ground line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub key: &'static str,
    pub x: f32,
}

const fn deco(key: &'static str, x: f32) -> Decoration {
    Decoration { key, x }
}

/// In paint order.
pub const DECORATIONS: &[Decoration] = &[
    deco("oakwoods-shop", 250.0),
    deco("oakwoods-lamp", 50.0),
    deco("oakwoods-lamp", 180.0),
    deco("oakwoods-sign", 320.0),
    deco("oakwoods-fence1", 400.0),
    deco("oakwoods-fence2", 470.0),
    deco("oakwoods-rock1", 140.0),
    deco("oakwoods-rock2", 350.0),
    deco("oakwoods-rock3", 550.0),
    deco("oakwoods-grass1", 70.0),
    deco("oakwoods-grass2", 120.0),
    deco("oakwoods-grass3", 200.0),
    deco("oakwoods-grass1", 280.0),
    deco("oakwoods-grass2", 380.0),
    deco("oakwoods-grass3", 450.0),
];

/// Every texture key the scene draws.
pub fn required_texture_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = BACKGROUND_KEYS.to_vec();
    keys.extend(DECORATIONS.iter().map(|d| d.key));
    keys.push(TILESET_KEY);
    keys.push(CHARACTER_KEY);
    keys.sort_unstable();
    keys.dedup();
    keys
}
