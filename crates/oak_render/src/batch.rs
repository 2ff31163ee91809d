//! CPU-side quad batching and the GPU buffers it streams into.
//!
//! Quads are appended in paint order. Consecutive quads that share a texture
//! collapse into a single draw call, so a layer of tiles from one tileset is
//! one `draw_indexed`.

use std::sync::Arc;

use crate::vertex::SpriteVertex;

/// A contiguous run of indices that share the same texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

/// One axis-aligned textured rectangle in world space (y-down).
#[derive(Debug, Clone, Copy)]
pub struct SpriteQuad<'a> {
    pub texture_key: &'a str,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// `[u0, v0, u1, v1]`, top-left to bottom-right.
    pub uv: [f32; 4],
    pub flip_x: bool,
    pub color: [f32; 4],
}

impl<'a> SpriteQuad<'a> {
    pub fn new(texture_key: &'a str, left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            texture_key,
            left,
            top,
            width,
            height,
            uv: [0.0, 0.0, 1.0, 1.0],
            flip_x: false,
            color: [1.0; 4],
        }
    }
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    pub fn sprite_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn push_quad(&mut self, quad: SpriteQuad<'_>) {
        let [mut u0, v0, mut u1, v1] = quad.uv;
        if quad.flip_x {
            std::mem::swap(&mut u0, &mut u1);
        }
        let right = quad.left + quad.width;
        let bottom = quad.top + quad.height;
        let base = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&[
            SpriteVertex::new(quad.left, quad.top, u0, v0, quad.color),
            SpriteVertex::new(right, quad.top, u1, v0, quad.color),
            SpriteVertex::new(right, bottom, u1, v1, quad.color),
            SpriteVertex::new(quad.left, bottom, u0, v1, quad.color),
        ]);

        let index_start = self.indices.len() as u32;
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.push_draw_call(quad.texture_key, index_start, 6);
    }

    /// Number of texture rebinds the draw list needs.
    pub fn texture_bind_count(&self) -> usize {
        let mut binds = 0;
        let mut current: Option<&str> = None;
        for draw in &self.draw_calls {
            let key: &str = &draw.texture_key;
            if current != Some(key) {
                current = Some(key);
                binds += 1;
            }
        }
        binds
    }

    fn push_draw_call(&mut self, texture_key: &str, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if &*last.texture_key == texture_key && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key: Arc::from(texture_key),
            index_start,
            index_count,
        });
    }
}

/// Vertex and index buffers that grow (power-of-two) but never shrink.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            vertex_buffer: create_vertex_buffer(device, 4),
            index_buffer: create_index_buffer(device, 6),
            vertex_capacity: 4,
            index_capacity: 6,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &SpriteBatch) {
        let needed_vertices = batch.vertices.len().max(1);
        if needed_vertices > self.vertex_capacity {
            self.vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
        }
        let needed_indices = batch.indices.len().max(1);
        if needed_indices > self.index_capacity {
            self.index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(device, self.index_capacity);
        }

        if !batch.vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&batch.vertices));
        }
        if !batch.indices.is_empty() {
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&batch.indices));
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
