use crate::sprite::Sprite;

/// Keeps a sprite inside a box on one or both axes.
///
/// Each axis checks the low limit first and only then the high limit, so a
/// sprite larger than the box ends up pinned to the left/top limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clamp {
    pub left_limit: i32,
    pub right_limit: i32,
    pub top_limit: i32,
    pub bottom_limit: i32,
}

impl Clamp {
    pub const fn new(left_limit: i32, right_limit: i32, top_limit: i32, bottom_limit: i32) -> Self {
        Self {
            left_limit,
            right_limit,
            top_limit,
            bottom_limit,
        }
    }

    pub fn clamp_x(&self, sprite: &mut Sprite) {
        if sprite.x < self.left_limit {
            sprite.x = self.left_limit;
        } else if sprite.right() > self.right_limit {
            sprite.set_right(self.right_limit);
        }
    }

    pub fn clamp_y(&self, sprite: &mut Sprite) {
        if sprite.y < self.top_limit {
            sprite.y = self.top_limit;
        } else if sprite.bottom() > self.bottom_limit {
            sprite.set_bottom(self.bottom_limit);
        }
    }

    pub fn clamp_all(&self, sprite: &mut Sprite) {
        self.clamp_x(sprite);
        self.clamp_y(sprite);
    }
}

impl Default for Clamp {
    fn default() -> Self {
        Self::new(0, 800, 0, 600)
    }
}
