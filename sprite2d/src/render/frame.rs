use anyhow::Result;

use crate::{
    canvas::{Anchor, Canvas, Color, BLACK, WHITE},
    geometry::Bounds,
    texture::{Texture, TextureHandle},
};

/// Textured (or, with `texture: None`, solid) rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Quad {
    pub texture: Option<TextureHandle>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TextCommand {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub anchor: Anchor,
}

/// Draw calls collected for one presented frame.
///
/// Quads are composited in submission order; text is drawn after all quads.
#[derive(Debug)]
pub struct Frame {
    pub(crate) clear_color: Color,
    pub(crate) quads: Vec<Quad>,
    pub(crate) texts: Vec<TextCommand>,
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self {
            clear_color: BLACK,
            quads: Vec::new(),
            texts: Vec::new(),
        }
    }

    fn push_solid(&mut self, left: i32, top: i32, width: i32, height: i32, color: Color) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.quads.push(Quad {
            texture: None,
            x: left as f32,
            y: top as f32,
            width: width as f32,
            height: height as f32,
            color,
        });
    }
}

impl Canvas for Frame {
    fn clear(&mut self, color: Color) -> Result<()> {
        self.clear_color = color;
        self.quads.clear();
        self.texts.clear();
        Ok(())
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) -> Result<()> {
        self.push_solid(bounds.left, bounds.top, bounds.width(), bounds.height(), color);
        Ok(())
    }

    fn outline_rect(&mut self, bounds: Bounds, color: Color, width: u32) -> Result<()> {
        let w = (width as i32).min(bounds.width()).min(bounds.height());
        if w <= 0 {
            return Ok(());
        }
        let inner_height = bounds.height() - 2 * w;
        self.push_solid(bounds.left, bounds.top, bounds.width(), w, color);
        self.push_solid(bounds.left, bounds.bottom - w, bounds.width(), w, color);
        self.push_solid(bounds.left, bounds.top + w, w, inner_height, color);
        self.push_solid(bounds.right - w, bounds.top + w, w, inner_height, color);
        Ok(())
    }

    fn blit(&mut self, texture: &Texture, x: i32, y: i32) -> Result<()> {
        self.quads.push(Quad {
            texture: Some(texture.handle),
            x: x as f32,
            y: y as f32,
            width: texture.width as f32,
            height: texture.height as f32,
            color: WHITE,
        });
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
        self.texts.push(TextCommand {
            text: text.to_string(),
            x: x as f32,
            y: y as f32,
            size,
            color,
            anchor,
        });
        Ok(())
    }
}
