//! Ground strip that keeps generating ahead of the player.
//!
//! The grid has a fixed capacity (`width` x `height` tiles). Columns are filled
//! strictly left to right: every column below the watermark holds the ground
//! tile on `ground_row`, every column at or past it is empty. The watermark only
//! moves forward and stops at the grid width, after which there is no more
//! ground to generate.
//!
//! Collision is by exclusion: any non-empty cell is solid.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainConfig {
    pub tile_size: f32,
    pub width: i32,
    pub height: i32,
    pub ground_row: i32,
    pub ground_tile: u32,
    /// Columns kept generated past the player's current column.
    pub look_ahead: i32,
    pub initial_columns: i32,
    /// World y of the grid's top edge.
    pub origin_y: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size: 24.0,
            width: 500,
            height: 8,
            ground_row: 7,
            ground_tile: 0,
            look_ahead: 20,
            initial_columns: 20,
            origin_y: 16.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TerrainGrid {
    pub config: TerrainConfig,
    tiles: Vec<Option<u32>>,
    generated_to: i32,
}

impl TerrainGrid {
    pub fn new(config: TerrainConfig) -> Self {
        let cells = (config.width.max(0) * config.height.max(0)) as usize;
        Self {
            config,
            tiles: vec![None; cells],
            generated_to: 0,
        }
    }

    /// Fill the starting strip. Call once at scene setup.
    pub fn seed(&mut self) {
        let end = self.config.initial_columns.clamp(0, self.config.width);
        self.fill_ground(self.generated_to..end);
        self.generated_to = self.generated_to.max(end);
    }

    /// Watermark: columns `< generated_to()` are ground.
    pub fn generated_to(&self) -> i32 {
        self.generated_to
    }

    pub fn is_exhausted(&self) -> bool {
        self.generated_to >= self.config.width
    }

    /// Make sure ground exists up to `look_ahead` columns past the column under
    /// `player_x`. Returns the newly filled columns, or `None` when nothing had
    /// to be generated.
    pub fn extend_ahead(&mut self, player_x: f32) -> Option<Range<i32>> {
        let player_col = self.world_to_col(player_x);
        let target = player_col.saturating_add(self.config.look_ahead);
        if target <= self.generated_to {
            return None;
        }

        let start = self.generated_to;
        let end = target.min(self.config.width);
        if start >= end {
            return None;
        }
        self.fill_ground(start..end);
        self.generated_to = end;

        log::trace!("Generated ground columns {}..{}", start, end);
        if self.is_exhausted() {
            log::info!(
                "Ground generation reached the grid edge at column {}",
                self.config.width
            );
        }
        Some(start..end)
    }

    pub fn tile_at(&self, col: i32, row: i32) -> Option<u32> {
        self.index(col, row).and_then(|i| self.tiles[i])
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.tile_at(col, row).is_some()
    }

    /// Filled cells as `(col, row, tile_index)`, column-major within the
    /// generated range.
    pub fn filled_tiles(&self) -> impl Iterator<Item = (i32, i32, u32)> + '_ {
        let height = self.config.height;
        (0..self.generated_to).flat_map(move |col| {
            (0..height).filter_map(move |row| self.tile_at(col, row).map(|t| (col, row, t)))
        })
    }

    pub fn world_to_col(&self, world_x: f32) -> i32 {
        (world_x / self.config.tile_size).floor() as i32
    }

    pub fn world_to_row(&self, world_y: f32) -> i32 {
        ((world_y - self.config.origin_y) / self.config.tile_size).floor() as i32
    }

    pub fn col_left(&self, col: i32) -> f32 {
        col as f32 * self.config.tile_size
    }

    pub fn row_top(&self, row: i32) -> f32 {
        self.config.origin_y + row as f32 * self.config.tile_size
    }

    fn fill_ground(&mut self, cols: Range<i32>) {
        let row = self.config.ground_row;
        let tile = self.config.ground_tile;
        for col in cols {
            if let Some(i) = self.index(col, row) {
                self.tiles[i] = Some(tile);
            }
        }
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || col >= self.config.width || row < 0 || row >= self.config.height {
            return None;
        }
        Some((row * self.config.width + col) as usize)
    }
}
