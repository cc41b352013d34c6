use std::time::Duration;

use anyhow::Result;

use crate::{
    animation::Animation,
    canvas::{Canvas, Color},
    clamp::Clamp,
    error::SpriteError,
    frame_loop::{Drawable, Updatable},
    mover::{Direction, Mover},
    sprite::Sprite,
    texture::FrameSet,
};

/// Frame sets per facing. A missing set keeps whatever is playing.
#[derive(Clone, Debug, Default)]
pub struct DirectionalFrames {
    pub left: Option<FrameSet>,
    pub right: Option<FrameSet>,
    pub up: Option<FrameSet>,
    pub down: Option<FrameSet>,
}

impl DirectionalFrames {
    pub fn four_way(left: FrameSet, right: FrameSet, up: FrameSet, down: FrameSet) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            up: Some(up),
            down: Some(down),
        }
    }

    pub fn horizontal(left: FrameSet, right: FrameSet) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            ..Self::default()
        }
    }

    pub fn vertical(up: FrameSet, down: FrameSet) -> Self {
        Self {
            up: Some(up),
            down: Some(down),
            ..Self::default()
        }
    }

    pub fn for_direction(&self, direction: Direction) -> Option<&FrameSet> {
        match direction {
            Direction::Left => self.left.as_ref(),
            Direction::Right => self.right.as_ref(),
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
            Direction::Stopped => None,
        }
    }

    fn named(&self) -> [(&'static str, Option<&FrameSet>); 4] {
        [
            ("left", self.left.as_ref()),
            ("right", self.right.as_ref()),
            ("up", self.up.as_ref()),
            ("down", self.down.as_ref()),
        ]
    }

    /// Every provided set must hold at least one frame, and at least one set
    /// must be provided.
    pub(crate) fn validate(&self) -> Result<(), SpriteError> {
        let mut any = false;
        for (name, set) in self.named() {
            if let Some(set) = set {
                if set.is_empty() {
                    return Err(SpriteError::EmptyFrameSet(name));
                }
                any = true;
            }
        }
        if any {
            Ok(())
        } else {
            Err(SpriteError::EmptyFrameSet("all"))
        }
    }

    /// The set to start with: the one for `direction`, else the first provided.
    fn initial(&self, direction: Direction) -> Option<&FrameSet> {
        self.for_direction(direction)
            .or_else(|| self.named().into_iter().find_map(|(_, set)| set))
    }
}

/// What happens when a moving sprite reaches its limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Stop at the limit.
    Clamp,
    /// Stop at the limit and reverse direction.
    Bounce,
    /// Once fully outside, reappear past the opposite limit.
    Wrap,
}

/// Which axes the boundary applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axes {
    Horizontal,
    Vertical,
    Both,
}

impl Axes {
    fn horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    fn vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

/// Starting state and tuning for an [`AnimatedMover`].
#[derive(Clone, Debug, PartialEq)]
pub struct MoverConfig {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub delay: Duration,
    pub speed: i32,
    pub frame_delay: Duration,
    pub limits: Clamp,
    pub border_color: Option<Color>,
    pub border_width: u32,
    pub fill_color: Option<Color>,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            direction: Direction::Right,
            delay: Duration::from_millis(100),
            speed: 1,
            frame_delay: Duration::from_millis(100),
            limits: Clamp::default(),
            border_color: None,
            border_width: 0,
            fill_color: None,
        }
    }
}

/// Sprite that moves, keeps to its limits and animates with its facing.
///
/// Each update moves, applies the boundary policy, picks the frame set for
/// the current direction, then animates.
#[derive(Clone, Debug)]
pub struct AnimatedMover {
    sprite: Sprite,
    mover: Mover,
    animation: Animation,
    frames: DirectionalFrames,
    boundary: Boundary,
    axes: Axes,
    pub limits: Clamp,
}

impl AnimatedMover {
    pub fn new(
        frames: DirectionalFrames,
        boundary: Boundary,
        axes: Axes,
        config: MoverConfig,
    ) -> Result<Self, SpriteError> {
        frames.validate()?;
        let initial = frames
            .initial(config.direction)
            .cloned()
            .ok_or(SpriteError::EmptyFrameSet("all"))?;
        let first = *initial.first().ok_or(SpriteError::EmptyFrameSet("all"))?;

        let sprite = Sprite::with_image(config.x, config.y, first)
            .with_border(config.border_color, config.border_width)
            .with_fill(config.fill_color);

        Ok(Self {
            sprite,
            mover: Mover::new(config.direction, config.delay, config.speed),
            animation: Animation::new(initial, config.frame_delay),
            frames,
            boundary,
            axes,
            limits: config.limits,
        })
    }

    /// Four-way walker clamped to a 2D box.
    pub fn walker(frames: DirectionalFrames, config: MoverConfig) -> Result<Self, SpriteError> {
        Self::new(frames, Boundary::Clamp, Axes::Both, config)
    }

    /// Left/right mover that stops at the horizontal limits.
    pub fn horizontal_clamped(
        left: FrameSet,
        right: FrameSet,
        config: MoverConfig,
    ) -> Result<Self, SpriteError> {
        Self::new(
            DirectionalFrames::horizontal(left, right),
            Boundary::Clamp,
            Axes::Horizontal,
            config,
        )
    }

    pub fn horizontal_bouncer(
        left: FrameSet,
        right: FrameSet,
        config: MoverConfig,
    ) -> Result<Self, SpriteError> {
        Self::new(
            DirectionalFrames::horizontal(left, right),
            Boundary::Bounce,
            Axes::Horizontal,
            config,
        )
    }

    pub fn horizontal_repeater(
        left: FrameSet,
        right: FrameSet,
        config: MoverConfig,
    ) -> Result<Self, SpriteError> {
        Self::new(
            DirectionalFrames::horizontal(left, right),
            Boundary::Wrap,
            Axes::Horizontal,
            config,
        )
    }

    /// `config.direction` should be `Up` or `Down`.
    pub fn vertical_bouncer(
        up: FrameSet,
        down: FrameSet,
        config: MoverConfig,
    ) -> Result<Self, SpriteError> {
        Self::new(
            DirectionalFrames::vertical(up, down),
            Boundary::Bounce,
            Axes::Vertical,
            config,
        )
    }

    /// `config.direction` should be `Up` or `Down`.
    pub fn vertical_repeater(
        up: FrameSet,
        down: FrameSet,
        config: MoverConfig,
    ) -> Result<Self, SpriteError> {
        Self::new(
            DirectionalFrames::vertical(up, down),
            Boundary::Wrap,
            Axes::Vertical,
            config,
        )
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

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn axes(&self) -> Axes {
        self.axes
    }

    pub fn direction(&self) -> Direction {
        self.mover.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.mover.direction = direction;
    }

    fn apply_boundary(&mut self) {
        match self.boundary {
            Boundary::Clamp => match self.axes {
                Axes::Horizontal => self.limits.clamp_x(&mut self.sprite),
                Axes::Vertical => self.limits.clamp_y(&mut self.sprite),
                Axes::Both => self.limits.clamp_all(&mut self.sprite),
            },
            Boundary::Bounce => self.bounce(),
            Boundary::Wrap => self.wrap(),
        }
    }

    fn bounce(&mut self) {
        let limits = self.limits;
        let sprite = &mut self.sprite;
        let direction = &mut self.mover.direction;
        if self.axes.horizontal() {
            if *direction == Direction::Left && sprite.left() < limits.left_limit {
                sprite.set_left(limits.left_limit);
                *direction = Direction::Right;
            } else if *direction == Direction::Right && sprite.right() > limits.right_limit {
                sprite.set_right(limits.right_limit);
                *direction = Direction::Left;
            }
        }
        if self.axes.vertical() {
            if *direction == Direction::Up && sprite.top() < limits.top_limit {
                sprite.set_top(limits.top_limit);
                *direction = Direction::Down;
            } else if *direction == Direction::Down && sprite.bottom() > limits.bottom_limit {
                sprite.set_bottom(limits.bottom_limit);
                *direction = Direction::Up;
            }
        }
    }

    fn wrap(&mut self) {
        let limits = self.limits;
        let sprite = &mut self.sprite;
        let direction = self.mover.direction;
        if self.axes.horizontal() {
            if direction == Direction::Left && sprite.right() < limits.left_limit {
                sprite.set_left(limits.right_limit);
            } else if direction == Direction::Right && sprite.left() > limits.right_limit {
                sprite.set_right(limits.left_limit);
            }
        }
        if self.axes.vertical() {
            if direction == Direction::Up && sprite.bottom() < limits.top_limit {
                sprite.set_top(limits.bottom_limit);
            } else if direction == Direction::Down && sprite.top() > limits.bottom_limit {
                sprite.set_bottom(limits.top_limit);
            }
        }
    }
}

impl Updatable for AnimatedMover {
    fn update(&mut self, delta: Duration) {
        self.mover.update(&mut self.sprite, delta);
        self.apply_boundary();
        if let Some(set) = self.frames.for_direction(self.mover.direction) {
            self.animation.set_frames(set.clone());
        }
        self.animation.update(&mut self.sprite, delta);
    }
}

impl Drawable for AnimatedMover {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        self.sprite.draw(canvas)
    }
}
