use anyhow::Result;

use crate::{geometry::Bounds, texture::Texture};

/// RGBA color with components in 0.0..=1.0.
pub type Color = [f32; 4];

pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// Which point of a text block the draw position refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    Center,
}

/// Drawing surface that sprites and screens render onto.
///
/// Coordinates are canvas pixels with (0, 0) at the top-left corner.
/// Commands are composited in the order they are issued, later commands on top.
pub trait Canvas {
    /// Fill the whole canvas with a color.
    fn clear(&mut self, color: Color) -> Result<()>;

    fn fill_rect(&mut self, bounds: Bounds, color: Color) -> Result<()>;

    /// Draw a rectangle border `width` pixels thick, inside `bounds`.
    fn outline_rect(&mut self, bounds: Bounds, color: Color, width: u32) -> Result<()>;

    /// Draw a texture at its native size with its top-left corner at (x, y).
    fn blit(&mut self, texture: &Texture, x: i32, y: i32) -> Result<()>;

    /// Draw a line (or several, split on `\n`) of text.
    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Color,
        anchor: Anchor,
    ) -> Result<()>;
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    FillRect(Bounds, Color),
    OutlineRect(Bounds, Color, u32),
    Blit(Texture, i32, i32),
    Text {
        text: String,
        x: i32,
        y: i32,
        size: f32,
        color: Color,
        anchor: Anchor,
    },
}

/// Canvas that records every command instead of rendering it.
///
/// Useful for headless runs and for asserting draw order in tests.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Recorded text strings, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Recorded blits, in draw order.
    pub fn blits(&self) -> Vec<(Texture, i32, i32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Blit(t, x, y) => Some((*t, *x, *y)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) -> Result<()> {
        self.commands.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) -> Result<()> {
        self.commands.push(DrawCommand::FillRect(bounds, color));
        Ok(())
    }

    fn outline_rect(&mut self, bounds: Bounds, color: Color, width: u32) -> Result<()> {
        self.commands
            .push(DrawCommand::OutlineRect(bounds, color, width));
        Ok(())
    }

    fn blit(&mut self, texture: &Texture, x: i32, y: i32) -> Result<()> {
        self.commands.push(DrawCommand::Blit(*texture, x, y));
        Ok(())
    }

    fn text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Color,
        anchor: Anchor,
    ) -> Result<()> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            size,
            color,
            anchor,
        });
        Ok(())
    }
}
