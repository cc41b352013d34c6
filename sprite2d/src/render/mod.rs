mod frame;
mod text;
mod wgpu_backend;

pub use frame::Frame;
pub use wgpu_backend::Renderer;
