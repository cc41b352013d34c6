//! Sprite2D - sprites, frame animation and collision helpers for small 2D games.
//!
//! The gameplay types (sprites, movers, animations, the frame loop and screens)
//! only talk to a [`Canvas`], so they run headless in tests. [`Engine`] drives
//! them inside a winit window rendered with wgpu.

pub mod animation;
pub mod assets;
pub mod canvas;
pub mod clamp;
pub mod engine;
pub mod error;
pub mod frame_loop;
pub mod geometry;
pub mod input;
pub mod jumper;
pub mod mover;
pub mod render;
pub mod schedule;
pub mod screen;
pub mod sprite;
pub mod sprites;
pub mod texture;

pub use crate::animation::Animation;
pub use crate::assets::{AssetManager, ImageProvider, SheetGrid, TextureSink};
pub use crate::canvas::{Anchor, Canvas, Color, DrawCommand, RecordingCanvas, BLACK, WHITE};
pub use crate::clamp::Clamp;
pub use crate::engine::{Engine, EngineConfig, EngineContext, Game};
pub use crate::error::SpriteError;
pub use crate::frame_loop::{Drawable, FrameLoop, Updatable};
pub use crate::geometry::{Bounds, Point};
pub use crate::input::{ActionId, InputMap, InputState};
pub use crate::jumper::Jumper;
pub use crate::mover::{Direction, Mover};
pub use crate::render::{Frame, Renderer};
pub use crate::schedule::{Scheduler, TimerHandle};
pub use crate::screen::{Navigator, Screen, ScreenManager, ScreenTick};
pub use crate::sprite::Sprite;
pub use crate::texture::{frame_set, FrameSet, Texture, TextureHandle};
pub use image;
pub use winit::keyboard::KeyCode;
