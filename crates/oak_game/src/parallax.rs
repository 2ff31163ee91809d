//! Background layer offsets derived from the camera's horizontal scroll.
//!
//! Offsets are recomputed from scratch every frame, so they never drift from
//! `scroll_x * ratio`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxRatios {
    pub far: f32,
    pub mid: f32,
    pub near: f32,
}

impl Default for ParallaxRatios {
    fn default() -> Self {
        Self {
            far: 0.1,
            mid: 0.3,
            near: 0.5,
        }
    }
}

/// Horizontal texture offsets, in texture pixels, per background layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParallaxOffsets {
    pub far: f32,
    pub mid: f32,
    pub near: f32,
}

impl ParallaxOffsets {
    pub fn compute(scroll_x: f32, ratios: &ParallaxRatios) -> Self {
        Self {
            far: scroll_x * ratios.far,
            mid: scroll_x * ratios.mid,
            near: scroll_x * ratios.near,
        }
    }

    /// Back to front.
    pub fn layers(&self) -> [f32; 3] {
        [self.far, self.mid, self.near]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_scale_with_scroll() {
        let offsets = ParallaxOffsets::compute(1000.0, &ParallaxRatios::default());
        assert!((offsets.far - 100.0).abs() < 1e-3);
        assert!((offsets.mid - 300.0).abs() < 1e-3);
        assert!((offsets.near - 500.0).abs() < 1e-3);
    }

    #[test]
    fn zero_scroll_gives_zero_offsets() {
        assert_eq!(
            ParallaxOffsets::compute(0.0, &ParallaxRatios::default()),
            ParallaxOffsets::default()
        );
    }

    #[test]
    fn negative_scroll_is_allowed() {
        let offsets = ParallaxOffsets::compute(-60.0, &ParallaxRatios::default());
        assert!(offsets.far < 0.0 && offsets.mid < offsets.far && offsets.near < offsets.mid);
    }

    #[test]
    fn nearer_layers_move_faster() {
        let ratios = ParallaxRatios::default();
        for scroll in [1.0f32, 37.5, 512.0, 11_000.0] {
            let [far, mid, near] = ParallaxOffsets::compute(scroll, &ratios).layers();
            assert!(far < mid && mid < near);
            assert!(near < scroll);
        }
    }

    #[test]
    fn recompute_matches_direct_product_exactly() {
        let ratios = ParallaxRatios::default();
        let mut scroll = -60.0f32;
        for _ in 0..1000 {
            scroll += 1.6667;
            let offsets = ParallaxOffsets::compute(scroll, &ratios);
            assert_eq!(offsets.far, scroll * 0.1);
            assert_eq!(offsets.mid, scroll * 0.3);
            assert_eq!(offsets.near, scroll * 0.5);
        }
    }
}
