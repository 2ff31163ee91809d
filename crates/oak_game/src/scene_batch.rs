//! Turns the world state into one paint-ordered sprite batch.
//!
//! Paint order: background layers (back to front), decorations, ground tiles,
//! player. Backgrounds cover the camera view and scroll by offsetting their U
//! coordinates; the sampler repeats, so the texture wraps horizontally.

use std::collections::HashMap;

use oak_render::{SpriteBatch, SpriteQuad};

use crate::scene::{BACKGROUND_KEYS, CHARACTER_KEY, DECORATIONS, GROUND_Y, TILESET_KEY};
use crate::world::GameWorld;

/// Pixel sizes of the uploaded textures plus the character sheet's frame size.
#[derive(Debug, Clone, Default)]
pub struct SceneTextures {
    pub sizes: HashMap<String, (u32, u32)>,
    pub character_frame: (u32, u32),
}

impl SceneTextures {
    fn size(&self, key: &str) -> Option<(f32, f32)> {
        self.sizes
            .get(key)
            .filter(|(w, h)| *w > 0 && *h > 0)
            .map(|&(w, h)| (w as f32, h as f32))
    }
}

pub fn build_scene_batch(world: &GameWorld, textures: &SceneTextures, batch: &mut SpriteBatch) {
    batch.clear();
    push_backgrounds(world, textures, batch);
    push_decorations(textures, batch);
    push_tiles(world, textures, batch);
    push_player(world, textures, batch);
}

fn push_backgrounds(world: &GameWorld, textures: &SceneTextures, batch: &mut SpriteBatch) {
    let view = world.camera.view_size();
    let origin = world.camera.scroll;
    for (key, offset) in BACKGROUND_KEYS.iter().zip(world.parallax.layers()) {
        let Some((tw, th)) = textures.size(key) else {
            continue;
        };
        batch.push_quad(SpriteQuad {
            uv: [offset / tw, 0.0, (offset + view.x) / tw, view.y / th],
            ..SpriteQuad::new(key, origin.x, origin.y, view.x, view.y)
        });
    }
}

fn push_decorations(textures: &SceneTextures, batch: &mut SpriteBatch) {
    for deco in DECORATIONS {
        let Some((w, h)) = textures.size(deco.key) else {
            continue;
        };
        batch.push_quad(SpriteQuad::new(deco.key, deco.x - w * 0.5, GROUND_Y - h, w, h));
    }
}

fn push_tiles(world: &GameWorld, textures: &SceneTextures, batch: &mut SpriteBatch) {
    let Some((tw, th)) = textures.size(TILESET_KEY) else {
        return;
    };
    let terrain = &world.terrain;
    let tile = terrain.config.tile_size;
    let columns = ((tw / tile) as u32).max(1);
    for (col, row, index) in terrain.filled_tiles() {
        let u0 = (index % columns) as f32 * tile;
        let v0 = (index / columns) as f32 * tile;
        batch.push_quad(SpriteQuad {
            uv: [u0 / tw, v0 / th, (u0 + tile) / tw, (v0 + tile) / th],
            ..SpriteQuad::new(TILESET_KEY, terrain.col_left(col), terrain.row_top(row), tile, tile)
        });
    }
}

fn push_player(world: &GameWorld, textures: &SceneTextures, batch: &mut SpriteBatch) {
    let Some((tw, th)) = textures.size(CHARACTER_KEY) else {
        return;
    };
    let (fw, fh) = textures.character_frame;
    if fw == 0 || fh == 0 {
        return;
    }
    let frame = world.player_frame().unwrap_or(0);
    let columns = (tw as u32 / fw).max(1);
    let (fw, fh) = (fw as f32, fh as f32);
    let u0 = (frame % columns) as f32 * fw;
    let v0 = (frame / columns) as f32 * fh;
    let pos = world.body.position;

    batch.push_quad(SpriteQuad {
        uv: [u0 / tw, v0 / th, (u0 + fw) / tw, (v0 + fh) / th],
        flip_x: world.player.flip_x,
        ..SpriteQuad::new(CHARACTER_KEY, pos.x - fw * 0.5, pos.y - fh * 0.5, fw, fh)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldConfig;

    fn full_textures() -> SceneTextures {
        let mut sizes = HashMap::new();
        for key in BACKGROUND_KEYS {
            sizes.insert(key.to_string(), (320, 180));
        }
        for deco in DECORATIONS {
            sizes.insert(deco.key.to_string(), (20, 40));
        }
        sizes.insert(TILESET_KEY.to_string(), (96, 48));
        sizes.insert(CHARACTER_KEY.to_string(), (448, 336));
        SceneTextures {
            sizes,
            character_frame: (56, 56),
        }
    }

    fn world() -> GameWorld {
        GameWorld::new(WorldConfig::default()).expect("default world builds")
    }

    #[test]
    fn batch_draws_every_scene_element_in_paint_order() {
        let world = world();
        let mut batch = SpriteBatch::new();
        build_scene_batch(&world, &full_textures(), &mut batch);

        // 3 backgrounds + 15 decorations + 20 seeded tiles + player
        assert_eq!(batch.sprite_count(), 39);
        let first: &str = &batch.draw_calls[0].texture_key;
        let last: &str = &batch.draw_calls.last().unwrap().texture_key;
        assert_eq!(first, "oakwoods-bg-layer1");
        assert_eq!(last, CHARACTER_KEY);
        // All seeded tiles share one draw.
        let tile_draw = batch
            .draw_calls
            .iter()
            .find(|d| &*d.texture_key == TILESET_KEY)
            .unwrap();
        assert_eq!(tile_draw.index_count, 20 * 6);
    }

    #[test]
    fn background_covers_view_with_parallax_uv() {
        let world = world();
        let mut batch = SpriteBatch::new();
        build_scene_batch(&world, &full_textures(), &mut batch);

        // Far layer: scroll -60 * 0.1 = -6 texels.
        let v = &batch.vertices[0..4];
        assert_eq!(v[0].position, [world.camera.scroll.x, world.camera.scroll.y]);
        assert!((v[0].tex_coords[0] - (-6.0 / 320.0)).abs() < 1e-6);
        assert!((v[1].tex_coords[0] - (314.0 / 320.0)).abs() < 1e-6);
        assert!((v[2].tex_coords[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn decorations_stand_on_ground_line() {
        let world = world();
        let mut batch = SpriteBatch::new();
        build_scene_batch(&world, &full_textures(), &mut batch);

        // First decoration is the shop at x=250, quad index 3.
        let v = &batch.vertices[12..16];
        assert_eq!(v[0].position, [240.0, 144.0]);
        assert_eq!(v[2].position, [260.0, 184.0]);
    }

    #[test]
    fn player_quad_uses_current_frame_and_flip() {
        let mut world = world();
        world.player.flip_x = true;
        let mut batch = SpriteBatch::new();
        build_scene_batch(&world, &full_textures(), &mut batch);

        let n = batch.vertices.len();
        let v = &batch.vertices[n - 4..];
        assert_eq!(v[0].position, [72.0, 92.0]);
        // Idle frame 0, flipped: left edge samples u = 56/448.
        assert!((v[0].tex_coords[0] - 56.0 / 448.0).abs() < 1e-6);
        assert!((v[1].tex_coords[0] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn missing_textures_are_skipped() {
        let world = world();
        let mut textures = full_textures();
        textures.sizes.remove("oakwoods-lamp");
        textures.sizes.remove(TILESET_KEY);
        let mut batch = SpriteBatch::new();
        build_scene_batch(&world, &textures, &mut batch);
        assert_eq!(batch.sprite_count(), 39 - 2 - 20);
    }
}
