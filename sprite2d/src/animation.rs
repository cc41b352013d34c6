use std::rc::Rc;
use std::time::Duration;

use crate::{
    sprite::Sprite,
    texture::{FrameSet, Texture},
};

/// Cycles a sprite's image through a frame set on a fixed frame delay.
#[derive(Clone, Debug)]
pub struct Animation {
    frames: FrameSet,
    pub frame_delay: Duration,
    pub paused: bool,
    current: usize,
    elapsed: Duration,
}

impl Animation {
    pub fn new(frames: FrameSet, frame_delay: Duration) -> Self {
        Self {
            frames,
            frame_delay,
            paused: false,
            current: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Swap the frame set without restarting the cycle.
    ///
    /// The current index wraps onto the new set's length. Swapping in the set
    /// already playing does nothing.
    pub fn set_frames(&mut self, frames: FrameSet) {
        if Rc::ptr_eq(&self.frames, &frames) {
            return;
        }
        self.current = match frames.len() {
            0 => 0,
            len => self.current % len,
        };
        self.frames = frames;
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn current_image(&self) -> Option<Texture> {
        self.frames.get(self.current).copied()
    }

    /// Back to the first frame with a fresh timer.
    pub fn reset(&mut self) {
        self.current = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Advance the frame timer and show the current frame on `sprite`.
    ///
    /// While paused the timer is held at zero and the frame does not change.
    pub fn update(&mut self, sprite: &mut Sprite, delta: Duration) {
        if self.paused {
            self.elapsed = Duration::ZERO;
        } else {
            self.elapsed += delta;
            if self.elapsed > self.frame_delay && !self.frames.is_empty() {
                self.elapsed = Duration::ZERO;
                self.current = (self.current + 1) % self.frames.len();
            }
        }
        if let Some(image) = self.current_image() {
            sprite.set_image(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{frame_set, TextureHandle};

    fn frames(ids: &[u32]) -> FrameSet {
        frame_set(
            ids.iter()
                .map(|id| Texture::new(TextureHandle::from_raw(*id), 16, 16))
                .collect::<Vec<_>>(),
        )
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_advances_only_past_delay() {
        let mut anim = Animation::new(frames(&[1, 2, 3]), ms(100));
        let mut sprite = Sprite::new(0, 0, 0, 0);

        anim.update(&mut sprite, ms(100));
        assert_eq!(anim.current_frame(), 0);
        anim.update(&mut sprite, ms(1));
        assert_eq!(anim.current_frame(), 1);
        assert_eq!(sprite.image().map(|t| t.handle.id()), Some(2));
    }

    #[test]
    fn test_wraps_after_last_frame() {
        let mut anim = Animation::new(frames(&[1, 2]), ms(10));
        let mut sprite = Sprite::new(0, 0, 0, 0);
        for _ in 0..2 {
            anim.update(&mut sprite, ms(11));
        }
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn test_pause_holds_frame_and_clears_timer() {
        let mut anim = Animation::new(frames(&[1, 2, 3]), ms(10));
        let mut sprite = Sprite::new(0, 0, 0, 0);
        anim.update(&mut sprite, ms(11));
        anim.update(&mut sprite, ms(8));

        anim.paused = true;
        for _ in 0..5 {
            anim.update(&mut sprite, ms(50));
        }
        assert_eq!(anim.current_frame(), 1);

        anim.paused = false;
        anim.update(&mut sprite, ms(8));
        assert_eq!(anim.current_frame(), 1);
        anim.update(&mut sprite, ms(3));
        assert_eq!(anim.current_frame(), 2);
    }

    #[test]
    fn test_image_assigned_every_tick() {
        let mut anim = Animation::new(frames(&[4]), ms(100));
        let mut sprite = Sprite::new(0, 0, 5, 5);
        anim.update(&mut sprite, ms(1));
        assert_eq!(sprite.image().map(|t| t.handle.id()), Some(4));
        assert_eq!(sprite.width(), 16);
    }

    #[test]
    fn test_swap_to_shorter_set_wraps_index() {
        let mut anim = Animation::new(frames(&[1, 2, 3, 4]), ms(1));
        let mut sprite = Sprite::new(0, 0, 0, 0);
        for _ in 0..3 {
            anim.update(&mut sprite, ms(2));
        }
        assert_eq!(anim.current_frame(), 3);

        anim.set_frames(frames(&[7, 8]));
        assert_eq!(anim.current_frame(), 1);
        assert_eq!(anim.current_image().map(|t| t.handle.id()), Some(8));
    }

    #[test]
    fn test_swap_to_same_set_keeps_index() {
        let set = frames(&[1, 2, 3]);
        let mut anim = Animation::new(set.clone(), ms(1));
        let mut sprite = Sprite::new(0, 0, 0, 0);
        anim.update(&mut sprite, ms(2));
        anim.set_frames(set);
        assert_eq!(anim.current_frame(), 1);
    }

    #[test]
    fn test_empty_set_leaves_sprite_alone() {
        let mut anim = Animation::new(frames(&[]), ms(1));
        let mut sprite = Sprite::new(0, 0, 5, 5);
        anim.update(&mut sprite, ms(10));
        assert!(sprite.image().is_none());
        assert_eq!(anim.current_frame(), 0);
    }
}
