use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

use crate::{
    animation::Animation,
    canvas::Canvas,
    clamp::Clamp,
    error::SpriteError,
    frame_loop::{Drawable, Updatable},
    geometry::Bounds,
    jumper::Jumper,
    mover::{Direction, Mover},
    sprite::Sprite,
    texture::FrameSet,
};

#[derive(Clone, Debug, PartialEq)]
pub struct PlatformerConfig {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub delay: Duration,
    pub speed: i32,
    pub jump_ability: f32,
    pub vertical_delay: Duration,
    pub gravity: f32,
    pub frame_delay: Duration,
    pub limits: Clamp,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            direction: Direction::Right,
            delay: Duration::from_millis(33),
            speed: 3,
            jump_ability: -12.0,
            vertical_delay: Duration::from_millis(10),
            gravity: 0.5,
            frame_delay: Duration::from_millis(75),
            limits: Clamp::default(),
        }
    }
}

/// Side-scrolling character: runs left/right, jumps and lands on platforms.
///
/// Only `Left`/`Right` move the character; `Up`/`Down` are left free for
/// jump input. Resting exactly on the arena floor counts as grounded.
#[derive(Clone, Debug)]
pub struct Platformer {
    sprite: Sprite,
    mover: Mover,
    jumper: Jumper,
    animation: Animation,
    left_frames: FrameSet,
    right_frames: FrameSet,
    platforms: Rc<[Bounds]>,
    pub limits: Clamp,
}

impl Platformer {
    pub fn new(
        left_frames: FrameSet,
        right_frames: FrameSet,
        platforms: Rc<[Bounds]>,
        config: PlatformerConfig,
    ) -> Result<Self, SpriteError> {
        if left_frames.is_empty() {
            return Err(SpriteError::EmptyFrameSet("left"));
        }
        if right_frames.is_empty() {
            return Err(SpriteError::EmptyFrameSet("right"));
        }

        let initial = if config.direction == Direction::Left {
            left_frames.clone()
        } else {
            right_frames.clone()
        };
        let first = *initial.first().ok_or(SpriteError::EmptyFrameSet("right"))?;
        let sprite = Sprite::with_image(config.x, config.y, first);

        Ok(Self {
            sprite,
            mover: Mover::new(config.direction, config.delay, config.speed),
            jumper: Jumper::new(config.jump_ability, config.vertical_delay, config.gravity),
            animation: Animation::new(initial, config.frame_delay),
            left_frames,
            right_frames,
            platforms,
            limits: config.limits,
        })
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    pub fn mover(&self) -> &Mover {
        &self.mover
    }

    pub fn mover_mut(&mut self) -> &mut Mover {
        &mut self.mover
    }

    pub fn jumper(&self) -> &Jumper {
        &self.jumper
    }

    pub fn jumper_mut(&mut self) -> &mut Jumper {
        &mut self.jumper
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn platforms(&self) -> &[Bounds] {
        &self.platforms
    }

    pub fn set_platforms(&mut self, platforms: Rc<[Bounds]>) {
        self.platforms = platforms;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.mover.direction = direction;
    }

    /// Jump with the configured impulse when grounded.
    pub fn jump(&mut self) {
        self.jumper.jump(None);
    }
}

impl Updatable for Platformer {
    fn update(&mut self, delta: Duration) {
        match self.mover.direction {
            Direction::Left => {
                self.mover.update(&mut self.sprite, delta);
                self.animation.set_frames(self.left_frames.clone());
            }
            Direction::Right => {
                self.mover.update(&mut self.sprite, delta);
                self.animation.set_frames(self.right_frames.clone());
            }
            _ => {}
        }

        self.jumper.update(&mut self.sprite, &self.platforms, delta);
        self.limits.clamp_all(&mut self.sprite);
        if self.sprite.bottom() == self.limits.bottom_limit {
            self.jumper.land();
        }
        self.animation.update(&mut self.sprite, delta);
    }
}

impl Drawable for Platformer {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        self.sprite.draw(canvas)
    }
}
