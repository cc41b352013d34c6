use std::time::Duration;

use crate::sprite::Sprite;

/// Cardinal heading of a [`Mover`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Left,
    Up,
    #[default]
    Right,
    Down,
    Stopped,
}

impl Direction {
    /// Map an arrow-key name ("Left", "Up", "Right", "Down") to a direction.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Left" => Some(Self::Left),
            "Up" => Some(Self::Up),
            "Right" => Some(Self::Right),
            "Down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// The opposite heading. `Stopped` stays stopped.
    pub fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Stopped => Self::Stopped,
        }
    }

    /// Unit step (dx, dy) in canvas coordinates.
    fn step(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Stopped => (0, 0),
        }
    }
}

/// Moves a sprite `speed` pixels in `direction` once every `delay`.
#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    pub direction: Direction,
    pub delay: Duration,
    speed: i32,
    elapsed: Duration,
}

impl Mover {
    pub fn new(direction: Direction, delay: Duration, speed: i32) -> Self {
        Self {
            direction,
            delay,
            speed: speed.abs(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Set the step distance. The sign is dropped; direction decides it.
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed.abs();
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Accumulate `delta` and take one step once the delay is reached.
    ///
    /// Returns whether a step was taken.
    pub fn update(&mut self, sprite: &mut Sprite, delta: Duration) -> bool {
        self.elapsed += delta;
        if self.elapsed < self.delay {
            return false;
        }
        self.elapsed = Duration::ZERO;
        let (dx, dy) = self.direction.step();
        sprite.increment_x(dx * self.speed);
        sprite.increment_y(dy * self.speed);
        true
    }

    /// Undo one step in the current direction.
    pub fn backup(&self, sprite: &mut Sprite) {
        let (dx, dy) = self.direction.step();
        sprite.increment_x(-dx * self.speed);
        sprite.increment_y(-dy * self.speed);
    }
}

impl Default for Mover {
    fn default() -> Self {
        Self::new(Direction::Right, Duration::from_millis(100), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_steps_only_once_delay_reached() {
        let mut mover = Mover::new(Direction::Right, ms(10), 5);
        let mut sprite = Sprite::new(0, 0, 10, 10);

        assert!(!mover.update(&mut sprite, ms(4)));
        assert!(!mover.update(&mut sprite, ms(5)));
        assert_eq!(sprite.x, 0);
        assert!(mover.update(&mut sprite, ms(1)));
        assert_eq!(sprite.x, 5);
        assert_eq!(mover.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_n_exact_updates_move_n_steps() {
        for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            let mut mover = Mover::new(direction, ms(20), 3);
            let mut sprite = Sprite::new(100, 100, 10, 10);
            for _ in 0..7 {
                mover.update(&mut sprite, ms(20));
            }
            let (dx, dy) = direction.step();
            assert_eq!((sprite.x, sprite.y), (100 + dx * 21, 100 + dy * 21));
            assert_eq!(mover.elapsed(), Duration::ZERO);
        }
    }

    #[test]
    fn test_stopped_never_moves() {
        let mut mover = Mover::new(Direction::Stopped, ms(1), 9);
        let mut sprite = Sprite::new(3, 4, 10, 10);
        mover.update(&mut sprite, ms(50));
        assert_eq!((sprite.x, sprite.y), (3, 4));
    }

    #[test]
    fn test_backup_restores_position() {
        let mut mover = Mover::new(Direction::Up, ms(10), 4);
        let mut sprite = Sprite::new(50, 50, 10, 10);
        mover.update(&mut sprite, ms(10));
        assert_eq!(sprite.y, 46);
        mover.backup(&mut sprite);
        assert_eq!((sprite.x, sprite.y), (50, 50));
    }

    #[test]
    fn test_speed_is_stored_absolute() {
        let mut mover = Mover::new(Direction::Right, ms(10), -6);
        assert_eq!(mover.speed(), 6);
        mover.set_speed(-2);
        assert_eq!(mover.speed(), 2);
    }

    #[test]
    fn test_direction_from_key_name() {
        assert_eq!(Direction::from_key_name("Left"), Some(Direction::Left));
        assert_eq!(Direction::from_key_name("Down"), Some(Direction::Down));
        assert_eq!(Direction::from_key_name("p"), None);
        assert_eq!(Direction::Up.reversed(), Direction::Down);
    }
}
