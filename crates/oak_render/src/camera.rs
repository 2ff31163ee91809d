//! 2D camera in y-down world space.
//!
//! `scroll` is the world position of the view's top-left corner. When a follow
//! target is set, `update_follow` keeps the target inside a dead-zone rectangle
//! centred on the view, closing any overshoot by a fraction (`lerp`) per step.

use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFollow {
    /// Fraction of the remaining offset closed per update, per axis.
    pub lerp: Vec2,
    /// Dead-zone size in world units.
    pub deadzone: Vec2,
}

impl Default for CameraFollow {
    fn default() -> Self {
        Self {
            lerp: Vec2::new(0.1, 0.1),
            deadzone: Vec2::new(50.0, 50.0),
        }
    }
}

pub struct Camera2D {
    pub scroll: Vec2,
    pub zoom: f32,
    /// View size in world units at zoom 1.
    pub viewport: (u32, u32),
    follow: Option<CameraFollow>,
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            scroll: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
            follow: None,
        }
    }

    pub fn view_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) / self.zoom
    }

    pub fn midpoint(&self) -> Vec2 {
        self.scroll + self.view_size() * 0.5
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll.x
    }

    /// Begin following and snap the view so `target` sits at its centre.
    pub fn start_follow(&mut self, target: Vec2, follow: CameraFollow) {
        self.follow = Some(follow);
        self.scroll = target - self.view_size() * 0.5;
    }

    pub fn stop_follow(&mut self) {
        self.follow = None;
    }

    pub fn update_follow(&mut self, target: Vec2) {
        let Some(follow) = self.follow else {
            return;
        };
        let mid = self.midpoint();
        let half_dz = follow.deadzone * 0.5;
        self.scroll.x = follow_axis(
            self.scroll.x,
            target.x,
            mid.x - half_dz.x,
            mid.x + half_dz.x,
            follow.lerp.x,
        );
        self.scroll.y = follow_axis(
            self.scroll.y,
            target.y,
            mid.y - half_dz.y,
            mid.y + half_dz.y,
            follow.lerp.y,
        );
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let size = self.view_size();
        // Top of the view is the smaller y, so bottom/top are swapped relative
        // to a y-up projection.
        let proj = Mat4::orthographic_rh(
            self.scroll.x,
            self.scroll.x + size.x,
            self.scroll.y + size.y,
            self.scroll.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

fn follow_axis(scroll: f32, target: f32, dz_min: f32, dz_max: f32, lerp: f32) -> f32 {
    if target < dz_min {
        scroll - (dz_min - target) * lerp
    } else if target > dz_max {
        scroll + (target - dz_max) * lerp
    } else {
        scroll
    }
}
