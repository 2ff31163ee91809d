//! Oak Woods -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Each `RedrawRequested`:
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed the accumulator
//!   2. `while should_step()` -- advance the world in fixed 1/60 s slices
//!   3. rebuild the sprite batch from the world and upload it
//!   4. draw the scene into the letterboxed 320x180 viewport, then egui text
//!
//! Before the scene can start the app is in a boot phase: one frame of
//! "Loading...", then the manifest and all images are loaded. If anything is
//! missing the diagnostic text stays on screen and the game never starts.

mod intent;
mod manifest;
mod parallax;
mod physics;
mod player;
#[cfg(test)]
mod replay;
mod scene;
mod scene_batch;
mod terrain;
mod world;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use manifest::{BootOutcome, LoadedAssets};
use oak_core::input::{InputState, Key};
use oak_core::time::TimeState;
use oak_platform::window::PlatformConfig;
use oak_render::{GpuContext, GpuMesh, GpuSettings, SpriteBatch, SpritePipeline, Texture};
use oak_ui::{StatusMessage, StatusScreen};
use scene_batch::{build_scene_batch, SceneTextures};
use world::{GameWorld, WorldConfig};

/// #1a1a1a in linear space.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0103,
    g: 0.0103,
    b: 0.0103,
    a: 1.0,
};

struct GpuSpriteTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// Everything that exists only once the scene has started.
struct Playing {
    world: GameWorld,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    scene_textures: SceneTextures,
    batch: SpriteBatch,
    mesh: GpuMesh,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

enum Phase {
    /// Frames drawn with the loading text so far.
    Loading(u32),
    /// Boot failed; the status screen explains why.
    Halted,
    Playing(Box<Playing>),
}

struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    sprite_pipeline: SpritePipeline,
    status: StatusScreen,
    phase: Phase,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(window.clone(), &GpuSettings::default());
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let mut status = StatusScreen::new(&gpu.device, gpu.surface_format, &window);
        status.show(StatusMessage::centered("Loading..."));

        Self {
            window,
            gpu,
            time: TimeState::new(),
            input: InputState::new(),
            sprite_pipeline,
            status,
            phase: Phase::Loading(0),
        }
    }

    /// Runs the blocking asset load once the loading text has been presented.
    fn advance_boot(&mut self) {
        let Phase::Loading(frames) = &mut self.phase else {
            return;
        };
        if *frames == 0 {
            *frames += 1;
            return;
        }

        let text = match manifest::boot(Path::new("")) {
            BootOutcome::Ready(assets) => match self.start_game(assets) {
                Ok(playing) => {
                    self.status.hide();
                    self.phase = Phase::Playing(Box::new(playing));
                    return;
                }
                Err(err) => {
                    log::error!("Failed to start scene: {err}");
                    err
                }
            },
            failed => failed.status_text().unwrap_or_default(),
        };
        self.status.show(StatusMessage::top_left(text));
        self.phase = Phase::Halted;
    }

    fn start_game(&self, assets: LoadedAssets) -> Result<Playing, String> {
        let world = GameWorld::new(WorldConfig::default())?;

        let mut textures = HashMap::new();
        for (key, image) in &assets.images {
            let texture = Texture::from_image(&self.gpu.device, &self.gpu.queue, image, key);
            let bind_group = self
                .sprite_pipeline
                .create_texture_bind_group(&self.gpu.device, &texture);
            textures.insert(
                Arc::from(key.as_str()),
                GpuSpriteTexture {
                    _texture: texture,
                    bind_group,
                },
            );
        }
        log::info!("Uploaded {} textures", textures.len());

        let camera_buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[world.camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = self
            .sprite_pipeline
            .create_camera_bind_group(&self.gpu.device, &camera_buffer);

        Ok(Playing {
            scene_textures: SceneTextures {
                sizes: assets.texture_sizes(),
                character_frame: assets.character_frame,
            },
            world,
            textures,
            batch: SpriteBatch::new(),
            mesh: GpuMesh::new(&self.gpu.device),
            camera_buffer,
            camera_bind_group,
        })
    }

    fn render(&mut self, config: &PlatformConfig) {
        let Some(frame) = self.gpu.acquire_frame() else {
            return;
        };
        let (width, height) = self.gpu.size;
        let (vx, vy, vw, vh) = config.fit_viewport(width, height);

        // Size status text in virtual pixels so it scales with the viewport.
        let scale = vw / config.virtual_width.max(1) as f32;
        self.status
            .set_zoom(scale / self.window.scale_factor() as f32);
        let (egui_primitives, egui_textures_delta) = self.status.prepare(&self.window);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: self.status.egui_ctx.pixels_per_point(),
        };

        if let Phase::Playing(playing) = &mut self.phase {
            build_scene_batch(&playing.world, &playing.scene_textures, &mut playing.batch);
            playing
                .mesh
                .upload(&self.gpu.device, &self.gpu.queue, &playing.batch);
            self.gpu.queue.write_buffer(
                &playing.camera_buffer,
                0,
                bytemuck::cast_slice(&[playing.world.camera.build_uniform()]),
            );
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if let Phase::Playing(playing) = &self.phase {
                render_pass.set_viewport(vx, vy, vw, vh, 0.0, 1.0);
                render_pass.set_pipeline(&self.sprite_pipeline.render_pipeline);
                render_pass.set_bind_group(0, &playing.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, playing.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(
                    playing.mesh.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );

                let mut last_bound: Option<&Arc<str>> = None;
                for draw in &playing.batch.draw_calls {
                    let Some(texture) = playing.textures.get(&draw.texture_key) else {
                        continue;
                    };
                    if last_bound != Some(&draw.texture_key) {
                        render_pass.set_bind_group(1, &texture.bind_group, &[]);
                        last_bound = Some(&draw.texture_key);
                    }
                    render_pass.draw_indexed(
                        draw.index_start..(draw.index_start + draw.index_count),
                        0,
                        0..1,
                    );
                }
            }
        }

        self.status.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.status
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.status.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = oak_platform::window::create_window(event_loop, &self.config);
        self.state = Some(EngineState::new(window));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.status.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                let dt_us = state.time.fixed_dt_us();
                while state.time.should_step() {
                    if state.input.is_just_pressed(Key::Escape) {
                        log::info!("Escape pressed, exiting.");
                        event_loop.exit();
                        return;
                    }
                    if let Phase::Playing(playing) = &mut state.phase {
                        playing.world.step(&state.input, dt_us);
                    }
                    // Edges belong to the step that consumed them. A press on
                    // a zero-step frame survives until the next step runs.
                    state.input.end_frame();
                }

                state.advance_boot();
                state.render(&self.config);
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyX => Some(Key::X),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Oak Woods starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
