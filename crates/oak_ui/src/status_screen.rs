//! Full-screen text messages drawn with egui: the "Loading..." notice and the
//! diagnostics shown instead of the game when assets are missing.
//!
//! egui needs a three-phase render split because `egui_wgpu::Renderer::render()`
//! takes a `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run egui, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder)
//!   3. `paint()`   -- render into a pass created with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references

use winit::window::Window;

/// Font size in virtual (320x180) pixels.
const FONT_SIZE: f32 = 12.0;
const MARGIN: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLayout {
    /// Single line centred on screen.
    Centered,
    /// Wrapped block anchored at the top-left margin.
    TopLeft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub layout: StatusLayout,
}

impl StatusMessage {
    pub fn centered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            layout: StatusLayout::Centered,
        }
    }

    pub fn top_left(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            layout: StatusLayout::TopLeft,
        }
    }
}

pub struct StatusScreen {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    message: Option<StatusMessage>,
}

impl StatusScreen {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            message: None,
        }
    }

    pub fn show(&mut self, message: StatusMessage) {
        if self.message.as_ref() != Some(&message) {
            log::info!("Status screen:\n{}", message.text);
        }
        self.message = Some(message);
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    /// Scale egui so the virtual font size tracks the letterboxed viewport.
    pub fn set_zoom(&self, zoom: f32) {
        if zoom > 0.0 && (self.egui_ctx.zoom_factor() - zoom).abs() > f32::EPSILON {
            self.egui_ctx.set_zoom_factor(zoom);
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn prepare(
        &mut self,
        window: &Window,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let message = self.message.as_ref();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let Some(message) = message else {
                return;
            };
            let text = egui::RichText::new(&message.text)
                .font(egui::FontId::monospace(FONT_SIZE))
                .color(egui::Color32::WHITE);
            match message.layout {
                StatusLayout::Centered => {
                    egui::Area::new(egui::Id::new("status_centered"))
                        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                        .show(ctx, |ui| {
                            ui.label(text);
                        });
                }
                StatusLayout::TopLeft => {
                    let wrap_width = ctx.screen_rect().width() - MARGIN * 2.0;
                    egui::Area::new(egui::Id::new("status_top_left"))
                        .fixed_pos([MARGIN, MARGIN])
                        .show(ctx, |ui| {
                            ui.set_max_width(wrap_width);
                            ui.label(text);
                        });
                }
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
