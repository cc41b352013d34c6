use std::time::Duration;

use crate::{geometry::Bounds, sprite::Sprite};

/// Vertical physics for a sprite: gravity, jump impulse and platform collisions.
///
/// The jumper is either grounded or airborne. While airborne it steps once
/// every `vertical_delay`, adding `gravity` to the vertical speed and moving
/// the sprite by the speed truncated to whole pixels. Negative speed is up.
#[derive(Clone, Debug, PartialEq)]
pub struct Jumper {
    pub vertical_speed: f32,
    pub jump_ability: f32,
    pub vertical_delay: Duration,
    pub gravity: f32,
    is_jumping: bool,
    elapsed: Duration,
}

impl Jumper {
    pub fn new(jump_ability: f32, vertical_delay: Duration, gravity: f32) -> Self {
        Self {
            vertical_speed: 0.0,
            jump_ability,
            vertical_delay,
            gravity,
            is_jumping: true,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    /// Force the grounded state and drop any vertical speed.
    pub fn land(&mut self) {
        self.is_jumping = false;
        self.vertical_speed = 0.0;
    }

    /// Launch with `force`, or with `jump_ability` when `None`.
    ///
    /// Ignored while airborne.
    pub fn jump(&mut self, force: Option<f32>) {
        if self.is_jumping {
            return;
        }
        self.is_jumping = true;
        self.vertical_speed = force.unwrap_or(self.jump_ability);
    }

    /// First platform in list order that overlaps the sprite.
    fn platform_under(sprite: &Sprite, platforms: &[Bounds]) -> Option<Bounds> {
        platforms.iter().copied().find(|p| sprite.intersects(p))
    }

    pub fn update(&mut self, sprite: &mut Sprite, platforms: &[Bounds], delta: Duration) {
        if Self::platform_under(sprite, platforms).is_none() {
            self.is_jumping = true;
        }
        if !self.is_jumping {
            return;
        }

        self.elapsed += delta;
        if self.elapsed < self.vertical_delay {
            return;
        }
        self.elapsed = Duration::ZERO;
        self.vertical_speed += self.gravity;
        sprite.increment_y(self.vertical_speed as i32);

        match Self::platform_under(sprite, platforms) {
            Some(platform) if self.vertical_speed < 0.0 => {
                // hit the underside: bounce back down
                self.vertical_speed = -self.vertical_speed;
                sprite.set_top(platform.bottom);
            }
            Some(platform) if self.vertical_speed > 0.0 && sprite.bottom() >= platform.top => {
                self.land();
                sprite.set_bottom(platform.top);
            }
            Some(_) => {}
            None => self.is_jumping = true,
        }
    }
}

impl Default for Jumper {
    fn default() -> Self {
        Self::new(-5.0, Duration::from_millis(10), 0.1)
    }
}
