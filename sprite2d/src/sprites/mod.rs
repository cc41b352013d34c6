//! Ready-made entities built from sprites, movers, jumpers and animations.

mod falling;
mod moving;
mod platformer;

pub use falling::{FallingConfig, FallingObject, FallingObjectPool};
pub use moving::{AnimatedMover, Axes, Boundary, DirectionalFrames, MoverConfig};
pub use platformer::{Platformer, PlatformerConfig};

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::{
        clamp::Clamp,
        frame_loop::Updatable,
        geometry::Bounds,
        mover::Direction,
        texture::{frame_set, FrameSet, Texture, TextureHandle},
    };

    fn frames(first_id: u32) -> FrameSet {
        frame_set(
            (first_id..first_id + 4)
                .map(|id| Texture::new(TextureHandle::from_raw(id), 50, 50))
                .collect::<Vec<_>>(),
        )
    }

    fn walker(direction: Direction) -> (AnimatedMover, FrameSet, FrameSet) {
        let left = frames(10);
        let right = frames(20);
        let walker = AnimatedMover::walker(
            DirectionalFrames::four_way(left.clone(), right.clone(), frames(30), frames(40)),
            MoverConfig {
                x: 0,
                y: 100,
                direction,
                delay: Duration::from_millis(10),
                speed: 5,
                limits: Clamp::new(0, 800, 0, 600),
                ..MoverConfig::default()
            },
        )
        .unwrap();
        (walker, left, right)
    }

    #[test]
    fn test_walker_moves_right_and_faces_right() {
        let (mut walker, _, right) = walker(Direction::Right);
        for _ in 0..3 {
            walker.update(Duration::from_millis(10));
        }
        assert_eq!(walker.sprite().x, 15);
        assert!(Rc::ptr_eq(walker.animation().frames(), &right));
    }

    #[test]
    fn test_walker_cannot_leave_through_the_left_edge() {
        let (mut walker, left, _) = walker(Direction::Left);
        walker.update(Duration::from_millis(10));
        assert_eq!(walker.sprite().x, 0);
        assert!(Rc::ptr_eq(walker.animation().frames(), &left));
    }

    #[test]
    fn test_full_width_paddle_catches_every_coin() {
        let mut pool =
            FallingObjectPool::with_seed(frames(50), 4, FallingConfig::default(), 42).unwrap();
        let paddle = Bounds::new(0, 550, 800, 600);

        let mut caught = 0;
        for _ in 0..2000 {
            pool.update(Duration::from_millis(10));
            for coin in pool.intersecting_mut(&paddle) {
                coin.reset_position();
                assert!(coin.sprite().top() <= 0);
                caught += 1;
            }
            assert!(pool.objects().iter().all(|coin| coin.sprite().top() <= 600));
        }
        assert!(caught > 0);
    }
}
