use std::time::Duration;

use anyhow::Result;
use fastrand::Rng;

use crate::{
    animation::Animation,
    canvas::Canvas,
    clamp::Clamp,
    error::SpriteError,
    frame_loop::{Drawable, Updatable},
    geometry::Bounds,
    mover::{Direction, Mover},
    sprite::Sprite,
    texture::FrameSet,
};

/// Spawn ranges and limits for falling objects. Ranges are inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct FallingConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub min_speed: i32,
    pub max_speed: i32,
    pub frame_delay: Duration,
    pub limits: Clamp,
}

impl Default for FallingConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(30),
            min_speed: 1,
            max_speed: 10,
            frame_delay: Duration::from_millis(100),
            limits: Clamp::new(0, 800, -600, 600),
        }
    }
}

/// Sprite that falls straight down and respawns at a random spot above the
/// arena once its top passes the bottom limit.
#[derive(Clone, Debug)]
pub struct FallingObject {
    sprite: Sprite,
    mover: Mover,
    animation: Animation,
    config: FallingConfig,
    rng: Rng,
}

impl FallingObject {
    pub fn new(frames: FrameSet, config: FallingConfig, rng: Rng) -> Result<Self, SpriteError> {
        let first = *frames.first().ok_or(SpriteError::EmptyFrameSet("down"))?;
        let mut object = Self {
            sprite: Sprite::with_image(0, 0, first),
            mover: Mover::new(Direction::Down, config.min_delay, config.min_speed),
            animation: Animation::new(frames, config.frame_delay),
            config,
            rng,
        };
        object.reset_position();
        Ok(object)
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

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn config(&self) -> &FallingConfig {
        &self.config
    }

    pub fn intersects(&self, bounds: &Bounds) -> bool {
        self.sprite.intersects(bounds)
    }

    /// Pick a fresh spawn point, speed and delay.
    ///
    /// x lands in `0..=right_limit - width`, the top in `top_limit..=0`.
    pub fn reset_position(&mut self) {
        let limits = self.config.limits;
        let max_x = (limits.right_limit - self.sprite.width()).max(0);
        self.sprite.x = self.rng.i32(0..=max_x);
        self.sprite.y = self.rng.i32(limits.top_limit.min(0)..=0);

        let (lo, hi) = ordered(self.config.min_speed, self.config.max_speed);
        self.mover.set_speed(self.rng.i32(lo..=hi));

        let (lo, hi) = ordered(
            self.config.min_delay.as_millis() as u64,
            self.config.max_delay.as_millis() as u64,
        );
        self.mover.delay = Duration::from_millis(self.rng.u64(lo..=hi));
    }
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Updatable for FallingObject {
    fn update(&mut self, delta: Duration) {
        self.mover.update(&mut self.sprite, delta);
        if self.sprite.top() > self.config.limits.bottom_limit {
            self.reset_position();
        }
        self.animation.update(&mut self.sprite, delta);
    }
}

impl Drawable for FallingObject {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        self.sprite.draw(canvas)
    }
}

/// Fixed-size pool of independent falling objects sharing one frame set.
#[derive(Clone, Debug)]
pub struct FallingObjectPool {
    objects: Vec<FallingObject>,
}

impl FallingObjectPool {
    /// `count` objects, each with its own generator forked from a random seed.
    pub fn new(frames: FrameSet, count: usize, config: FallingConfig) -> Result<Self, SpriteError> {
        Self::with_rng(frames, count, config, &mut Rng::new())
    }

    /// Deterministic pool for a given seed.
    pub fn with_seed(
        frames: FrameSet,
        count: usize,
        config: FallingConfig,
        seed: u64,
    ) -> Result<Self, SpriteError> {
        Self::with_rng(frames, count, config, &mut Rng::with_seed(seed))
    }

    fn with_rng(
        frames: FrameSet,
        count: usize,
        config: FallingConfig,
        rng: &mut Rng,
    ) -> Result<Self, SpriteError> {
        let objects = (0..count)
            .map(|_| FallingObject::new(frames.clone(), config.clone(), rng.fork()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { objects })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FallingObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FallingObject> {
        self.objects.get_mut(index)
    }

    pub fn objects(&self) -> &[FallingObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [FallingObject] {
        &mut self.objects
    }

    /// Every object currently overlapping `bounds`.
    pub fn intersects(&self, bounds: &Bounds) -> Vec<&FallingObject> {
        self.objects.iter().filter(|o| o.intersects(bounds)).collect()
    }

    /// Mutable variant of [`FallingObjectPool::intersects`], for callers that
    /// reset caught objects.
    pub fn intersecting_mut(
        &mut self,
        bounds: &Bounds,
    ) -> impl Iterator<Item = &mut FallingObject> + '_ {
        let bounds = *bounds;
        self.objects.iter_mut().filter(move |o| o.intersects(&bounds))
    }

    /// Respawn every object.
    pub fn reset_all(&mut self) {
        for object in &mut self.objects {
            object.reset_position();
        }
    }
}

impl Updatable for FallingObjectPool {
    fn update(&mut self, delta: Duration) {
        for object in &mut self.objects {
            object.update(delta);
        }
    }
}

impl Drawable for FallingObjectPool {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        for object in &self.objects {
            object.draw(canvas)?;
        }
        Ok(())
    }
}
