//! Arcade-style body for the player: gravity, terrain collision and a
//! world-bounds clamp, stepped once per fixed tick.
//!
//! World space is y-down. Movement is axis-separable: X is resolved against
//! solid tiles first, then Y using the corrected X, which gives the usual
//! slide-along-walls behaviour. `blocked` is rebuilt every step, so
//! `blocked.down` is the "on ground" signal for the frame.

use glam::Vec2;

use crate::terrain::TerrainGrid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Downward acceleration, units/s^2.
    pub gravity: f32,
    pub bounds: WorldBounds,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 900.0,
            // Effectively unbounded to the right; the floor of the view is the
            // floor of the world.
            bounds: WorldBounds {
                x: 0.0,
                y: 0.0,
                width: 999_999.0,
                height: 180.0,
            },
        }
    }
}

/// Collision box inside the sprite frame. Offsets are from the frame's
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyShape {
    pub frame_width: f32,
    pub frame_height: f32,
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for BodyShape {
    fn default() -> Self {
        Self {
            frame_width: 56.0,
            frame_height: 56.0,
            width: 20.0,
            height: 38.0,
            offset_x: 18.0,
            offset_y: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ArcadeBody {
    /// Sprite centre in world space.
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: BodyShape,
    pub blocked: Blocked,
    pub collide_world_bounds: bool,
}

impl ArcadeBody {
    pub fn new(position: Vec2, shape: BodyShape) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            shape,
            blocked: Blocked::default(),
            collide_world_bounds: true,
        }
    }

    pub fn on_floor(&self) -> bool {
        self.blocked.down
    }

    pub fn body_left(&self) -> f32 {
        self.position.x - self.shape.frame_width * 0.5 + self.shape.offset_x
    }

    pub fn body_top(&self) -> f32 {
        self.position.y - self.shape.frame_height * 0.5 + self.shape.offset_y
    }

    pub fn body_bottom(&self) -> f32 {
        self.body_top() + self.shape.height
    }

    pub fn aabb(&self) -> Aabb {
        Aabb {
            center_x: self.body_left() + self.shape.width * 0.5,
            center_y: self.body_top() + self.shape.height * 0.5,
            half_w: self.shape.width * 0.5,
            half_h: self.shape.height * 0.5,
        }
    }

    fn set_aabb(&mut self, aabb: Aabb) {
        let s = self.shape;
        self.position.x = aabb.center_x - s.width * 0.5 - s.offset_x + s.frame_width * 0.5;
        self.position.y = aabb.center_y - s.height * 0.5 - s.offset_y + s.frame_height * 0.5;
    }

    pub fn step(&mut self, dt: f32, config: &PhysicsConfig, terrain: &TerrainGrid) {
        self.blocked = Blocked::default();
        self.velocity.y += config.gravity * dt;

        let dx = self.velocity.x * dt;
        let dy = self.velocity.y * dt;
        let result = move_and_collide(terrain, self.aabb(), dx, dy);
        self.set_aabb(result.aabb);
        self.blocked = result.blocked;

        if (self.blocked.left && self.velocity.x < 0.0)
            || (self.blocked.right && self.velocity.x > 0.0)
        {
            self.velocity.x = 0.0;
        }
        if (self.blocked.up && self.velocity.y < 0.0)
            || (self.blocked.down && self.velocity.y > 0.0)
        {
            self.velocity.y = 0.0;
        }

        if self.collide_world_bounds {
            self.clamp_to_bounds(&config.bounds);
        }
    }

    /// Zero bounce: a body pushed back inside loses its velocity on that axis.
    fn clamp_to_bounds(&mut self, bounds: &WorldBounds) {
        let mut aabb = self.aabb();
        if aabb.center_x - aabb.half_w < bounds.x {
            aabb.center_x = bounds.x + aabb.half_w;
            self.velocity.x = 0.0;
            self.blocked.left = true;
        } else if aabb.center_x + aabb.half_w > bounds.right() {
            aabb.center_x = bounds.right() - aabb.half_w;
            self.velocity.x = 0.0;
            self.blocked.right = true;
        }

        if aabb.center_y - aabb.half_h < bounds.y {
            aabb.center_y = bounds.y + aabb.half_h;
            self.velocity.y = 0.0;
            self.blocked.up = true;
        } else if self.body_bottom() > bounds.bottom() {
            aabb.center_y = bounds.bottom() - aabb.half_h;
            self.velocity.y = 0.0;
            self.blocked.down = true;
        }
        self.set_aabb(aabb);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MoveResult {
    pub aabb: Aabb,
    pub blocked: Blocked,
}

pub fn move_and_collide(terrain: &TerrainGrid, aabb: Aabb, dx: f32, dy: f32) -> MoveResult {
    const EPS: f32 = 0.0001;

    let resolved_x = resolve_axis_x(terrain, aabb, dx);
    let collided_x = (resolved_x - (aabb.center_x + dx)).abs() > EPS;

    let mut moved = aabb;
    moved.center_x = resolved_x;
    let resolved_y = resolve_axis_y(terrain, moved, dy);
    let collided_y = (resolved_y - (aabb.center_y + dy)).abs() > EPS;
    moved.center_y = resolved_y;

    MoveResult {
        aabb: moved,
        blocked: Blocked {
            left: collided_x && dx < 0.0,
            right: collided_x && dx > 0.0,
            up: collided_y && dy < 0.0,
            down: collided_y && dy > 0.0,
        },
    }
}

fn resolve_axis_x(terrain: &TerrainGrid, aabb: Aabb, dx: f32) -> f32 {
    if dx == 0.0 {
        return aabb.center_x;
    }

    const EPS: f32 = 0.001;
    let tile = terrain.config.tile_size;
    let mut candidate_x = aabb.center_x + dx;
    let row0 = terrain.world_to_row(aabb.center_y - aabb.half_h + EPS);
    let row1 = terrain.world_to_row(aabb.center_y + aabb.half_h - EPS);

    if dx > 0.0 {
        let col = terrain.world_to_col(candidate_x + aabb.half_w - EPS);
        for row in row0..=row1 {
            if terrain.is_solid(col, row) {
                candidate_x = candidate_x.min(terrain.col_left(col) - aabb.half_w);
            }
        }
        // Never push against the direction of travel.
        candidate_x = candidate_x.max(aabb.center_x);
    } else {
        let col = terrain.world_to_col(candidate_x - aabb.half_w + EPS);
        for row in row0..=row1 {
            if terrain.is_solid(col, row) {
                candidate_x = candidate_x.max(terrain.col_left(col) + tile + aabb.half_w);
            }
        }
        candidate_x = candidate_x.min(aabb.center_x);
    }

    candidate_x
}

fn resolve_axis_y(terrain: &TerrainGrid, aabb: Aabb, dy: f32) -> f32 {
    if dy == 0.0 {
        return aabb.center_y;
    }

    const EPS: f32 = 0.001;
    let tile = terrain.config.tile_size;
    let mut candidate_y = aabb.center_y + dy;
    let col0 = terrain.world_to_col(aabb.center_x - aabb.half_w + EPS);
    let col1 = terrain.world_to_col(aabb.center_x + aabb.half_w - EPS);

    if dy > 0.0 {
        let row = terrain.world_to_row(candidate_y + aabb.half_h - EPS);
        for col in col0..=col1 {
            if terrain.is_solid(col, row) {
                candidate_y = candidate_y.min(terrain.row_top(row) - aabb.half_h);
            }
        }
        candidate_y = candidate_y.max(aabb.center_y);
    } else {
        let row = terrain.world_to_row(candidate_y - aabb.half_h + EPS);
        for col in col0..=col1 {
            if terrain.is_solid(col, row) {
                candidate_y = candidate_y.max(terrain.row_top(row) + tile + aabb.half_h);
            }
        }
        candidate_y = candidate_y.min(aabb.center_y);
    }

    candidate_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainConfig;

    const DT: f32 = 1.0 / 60.0;

    fn seeded_terrain() -> TerrainGrid {
        let mut terrain = TerrainGrid::new(TerrainConfig::default());
        terrain.seed();
        terrain
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn spawned_body_falls_and_rests_on_world_floor() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        let mut body = ArcadeBody::new(Vec2::new(100.0, 120.0), BodyShape::default());

        body.step(DT, &config, &terrain);
        assert!(!body.on_floor());
        assert!(body.velocity.y > 0.0);

        for _ in 0..120 {
            body.step(DT, &config, &terrain);
        }
        assert!(body.on_floor());
        assert!(approx(body.body_bottom(), 180.0));
        assert!(approx(body.position.y, 154.0));
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn resting_body_reports_floor_every_step() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        let mut body = ArcadeBody::new(Vec2::new(100.0, 154.0), BodyShape::default());
        for _ in 0..10 {
            body.step(DT, &config, &terrain);
            assert!(body.on_floor());
            assert!(approx(body.position.y, 154.0));
        }
    }

    #[test]
    fn upward_velocity_leaves_floor() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        let mut body = ArcadeBody::new(Vec2::new(100.0, 154.0), BodyShape::default());
        body.step(DT, &config, &terrain);
        body.velocity.y = -250.0;
        body.step(DT, &config, &terrain);
        assert!(!body.on_floor());
        assert!(body.position.y < 154.0);
        assert!(approx(body.velocity.y, -235.0));
    }

    #[test]
    fn left_world_edge_stops_body() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        let mut body = ArcadeBody::new(Vec2::new(12.0, 154.0), BodyShape::default());
        body.velocity.x = -100.0;
        for _ in 0..30 {
            body.step(DT, &config, &terrain);
            body.velocity.x = -100.0;
        }
        assert!(approx(body.body_left(), 0.0));
        assert!(body.blocked.left);
    }

    #[test]
    fn without_world_bounds_body_lands_on_ground_tiles() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        let mut body = ArcadeBody::new(Vec2::new(100.0, 120.0), BodyShape::default());
        body.collide_world_bounds = false;
        for _ in 0..120 {
            body.step(DT, &config, &terrain);
        }
        assert!(body.on_floor());
        assert!(approx(body.body_bottom(), 184.0));
        assert!(approx(body.position.y, 158.0));
    }

    #[test]
    fn body_falls_through_where_ground_is_not_generated() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        // Column 30 is past the seeded strip.
        let mut body = ArcadeBody::new(Vec2::new(30.0 * 24.0 + 12.0, 120.0), BodyShape::default());
        body.collide_world_bounds = false;
        for _ in 0..120 {
            body.step(DT, &config, &terrain);
        }
        assert!(body.body_bottom() > 184.0);
        assert!(!body.on_floor());
    }

    #[test]
    fn ground_column_blocks_sideways_motion() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        };
        // Body sits in row 7 just right of the last generated column (19).
        let mut body = ArcadeBody::new(Vec2::new(492.0, 198.0), BodyShape::default());
        body.collide_world_bounds = false;
        assert!(approx(body.body_left(), 482.0));

        body.velocity.x = -300.0;
        body.step(DT, &config, &terrain);
        assert!(body.blocked.left);
        assert!(!body.blocked.right);
        assert!(approx(body.body_left(), 480.0));
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn rising_into_a_tile_does_not_push_downward() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        };
        // Body top just below the ground row's bottom edge (208).
        let mut body = ArcadeBody::new(Vec2::new(100.0, 222.0), BodyShape::default());
        body.collide_world_bounds = false;
        assert!(approx(body.body_top(), 210.0));
        body.velocity.y = -300.0;
        body.step(DT, &config, &terrain);
        assert!(body.blocked.up);
        assert!(approx(body.body_top(), 208.0));
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn identical_runs_are_deterministic() {
        let terrain = seeded_terrain();
        let config = PhysicsConfig::default();
        let mut a = ArcadeBody::new(Vec2::new(100.0, 120.0), BodyShape::default());
        let mut b = a;
        for i in 0..240 {
            let vx = if i % 50 < 25 { 100.0 } else { -100.0 };
            a.velocity.x = vx;
            b.velocity.x = vx;
            if i == 90 {
                a.velocity.y = -250.0;
                b.velocity.y = -250.0;
            }
            a.step(DT, &config, &terrain);
            b.step(DT, &config, &terrain);
        }
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
        assert_eq!(a.blocked, b.blocked);
    }
}
