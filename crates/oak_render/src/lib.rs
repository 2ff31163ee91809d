pub mod batch;
pub mod camera;
pub mod gpu_context;
pub mod sprite_pipeline;
pub mod texture;
pub mod vertex;

pub use batch::{DrawCall, GpuMesh, SpriteBatch, SpriteQuad};
pub use camera::{Camera2D, CameraFollow, CameraUniform};
pub use gpu_context::{Frame, GpuContext, GpuSettings};
pub use sprite_pipeline::SpritePipeline;
pub use texture::{ImageData, Texture};
pub use vertex::SpriteVertex;
