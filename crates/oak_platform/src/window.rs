use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// Window settings. The game renders a fixed virtual resolution that is
/// scaled to fit the window, centred, keeping its aspect ratio.
pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub virtual_width: u32,
    pub virtual_height: u32,
}

impl PlatformConfig {
    /// Letterboxed viewport `(x, y, width, height)` in surface pixels for a
    /// `width` x `height` surface.
    pub fn fit_viewport(&self, width: u32, height: u32) -> (f32, f32, f32, f32) {
        let vw = self.virtual_width.max(1) as f32;
        let vh = self.virtual_height.max(1) as f32;
        let scale = (width as f32 / vw).min(height as f32 / vh);
        let w = vw * scale;
        let h = vh * scale;
        ((width as f32 - w) * 0.5, (height as f32 - h) * 0.5, w, h)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Oak Woods".to_string(),
            width: 1280,
            height: 720,
            virtual_width: 320,
            virtual_height: 180,
        }
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    log::info!(
        "Window created: {}x{} (virtual {}x{})",
        config.width,
        config.height,
        config.virtual_width,
        config.virtual_height
    );
    Arc::new(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_viewport_fills_matching_aspect() {
        let config = PlatformConfig::default();
        assert_eq!(config.fit_viewport(1280, 720), (0.0, 0.0, 1280.0, 720.0));
    }

    #[test]
    fn fit_viewport_letterboxes_wide_window() {
        let config = PlatformConfig::default();
        let (x, y, w, h) = config.fit_viewport(1600, 720);
        assert_eq!((w, h), (1280.0, 720.0));
        assert_eq!((x, y), (160.0, 0.0));
    }
}
