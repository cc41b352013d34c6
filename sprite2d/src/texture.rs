use std::rc::Rc;

/// Opaque handle used to reference textures owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// Build a handle from a raw id.
    ///
    /// Useful for headless canvases and tests that never touch the GPU.
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// A loaded image: the renderer handle plus its pixel size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn new(handle: TextureHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

/// Ordered, shared list of animation frames.
///
/// Cloning a frame set only bumps a reference count, so composites can swap
/// between facing sets every tick.
pub type FrameSet = Rc<[Texture]>;

/// Build a frame set from any list of textures.
pub fn frame_set(frames: impl Into<Vec<Texture>>) -> FrameSet {
    let frames: Vec<Texture> = frames.into();
    Rc::from(frames)
}
