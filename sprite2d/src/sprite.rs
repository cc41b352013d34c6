use anyhow::Result;

use crate::{
    canvas::{Canvas, Color, BLACK},
    error::SpriteError,
    frame_loop::Drawable,
    geometry::{Bounds, Point},
    texture::Texture,
};

/// Axis-aligned rectangle with an optional image: the bounds of every entity.
///
/// Width and height follow the attached image. Once an image is attached the
/// size can only change by attaching another image.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub x: i32,
    pub y: i32,
    width: i32,
    height: i32,
    image: Option<Texture>,
    pub border_color: Option<Color>,
    pub border_width: u32,
    pub fill_color: Option<Color>,
}

impl Sprite {
    /// Plain rectangle with a 2px black border and no fill.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            image: None,
            border_color: Some(BLACK),
            border_width: 2,
            fill_color: None,
        }
    }

    /// Borderless sprite sized to `image`.
    pub fn with_image(x: i32, y: i32, image: Texture) -> Self {
        let mut sprite = Self::new(x, y, 0, 0);
        sprite.border_color = None;
        sprite.border_width = 0;
        sprite.set_image(image);
        sprite
    }

    #[must_use]
    pub fn with_border(mut self, color: Option<Color>, width: u32) -> Self {
        self.border_color = color;
        self.border_width = width;
        self
    }

    #[must_use]
    pub fn with_fill(mut self, color: Option<Color>) -> Self {
        self.fill_color = color;
        self
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn set_width(&mut self, width: i32) -> Result<(), SpriteError> {
        if self.image.is_some() {
            return Err(SpriteError::SizeLockedByImage { dimension: "width" });
        }
        self.width = width;
        Ok(())
    }

    pub fn set_height(&mut self, height: i32) -> Result<(), SpriteError> {
        if self.image.is_some() {
            return Err(SpriteError::SizeLockedByImage {
                dimension: "height",
            });
        }
        self.height = height;
        Ok(())
    }

    pub fn image(&self) -> Option<&Texture> {
        self.image.as_ref()
    }

    /// Attach an image; the sprite takes the image's size.
    pub fn set_image(&mut self, image: Texture) {
        self.width = image.width as i32;
        self.height = image.height as i32;
        self.image = Some(image);
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn set_left(&mut self, value: i32) {
        self.x = value;
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn set_right(&mut self, value: i32) {
        self.x = value - self.width;
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn set_top(&mut self, value: i32) {
        self.y = value;
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn set_bottom(&mut self, value: i32) {
        self.y = value - self.height;
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn set_center_x(&mut self, value: i32) {
        self.x = value - self.width / 2;
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn set_center_y(&mut self, value: i32) {
        self.y = value - self.height / 2;
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    pub fn set_center(&mut self, center: Point) {
        self.set_center_x(center.x);
        self.set_center_y(center.y);
    }

    pub fn increment_x(&mut self, distance: i32) {
        self.x += distance;
    }

    pub fn increment_y(&mut self, distance: i32) {
        self.y += distance;
    }

    /// Current (left, top, right, bottom) box.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.left(), self.top(), self.right(), self.bottom())
    }

    /// True when this sprite overlaps `other`; touching edges count.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.bounds().intersects(other)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bounds().contains(x, y)
    }
}

impl Drawable for Sprite {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let bounds = self.bounds();
        if let Some(fill) = self.fill_color {
            canvas.fill_rect(bounds, fill)?;
        }
        if let Some(border) = self.border_color {
            if self.border_width > 0 {
                canvas.outline_rect(bounds, border, self.border_width)?;
            }
        }
        if let Some(image) = &self.image {
            canvas.blit(image, self.x, self.y)?;
        }
        Ok(())
    }
}
