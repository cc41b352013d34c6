use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::canvas::Canvas;

/// Something that advances with time.
pub trait Updatable {
    fn update(&mut self, delta: Duration);
}

/// Something that can render itself onto a canvas.
pub trait Drawable {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<()>;
}

pub type SharedUpdatable = Rc<RefCell<dyn Updatable>>;
pub type SharedDrawable = Rc<RefCell<dyn Drawable>>;

/// Cooperative update/draw loop over registered entities.
///
/// Every tick measures the wall-clock delta since the previous tick at
/// millisecond resolution, updates every updatable in registration order,
/// and re-arms itself `tick_delay` later. Drawables are drawn in registration
/// order, so later entries end up on top.
pub struct FrameLoop {
    updatables: Vec<SharedUpdatable>,
    drawables: Vec<SharedDrawable>,
    tick_delay: Duration,
    paused: bool,
    origin: Instant,
    last_ms: u128,
    next_due: Option<Instant>,
}

impl FrameLoop {
    /// New loop, paused until [`FrameLoop::start`] is called.
    pub fn new(tick_delay: Duration) -> Self {
        Self {
            updatables: Vec::new(),
            drawables: Vec::new(),
            tick_delay,
            paused: true,
            origin: Instant::now(),
            last_ms: 0,
            next_due: None,
        }
    }

    pub fn tick_delay(&self) -> Duration {
        self.tick_delay
    }

    pub fn add_updatable(&mut self, entity: SharedUpdatable) {
        self.updatables.push(entity);
    }

    pub fn add_drawable(&mut self, entity: SharedDrawable) {
        self.drawables.push(entity);
    }

    /// Register an entity that both updates and draws.
    pub fn add<T>(&mut self, entity: &Rc<RefCell<T>>)
    where
        T: Updatable + Drawable + 'static,
    {
        self.updatables.push(entity.clone());
        self.drawables.push(entity.clone());
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run (or resume) the loop. The next tick is due immediately and the
    /// delta clock restarts at `now`, so paused time is never delivered.
    pub fn start(&mut self, now: Instant) {
        if self.paused {
            log::debug!("frame loop started");
        }
        self.paused = false;
        self.origin = now;
        self.last_ms = 0;
        self.next_due = Some(now);
    }

    /// Stop scheduling ticks.
    pub fn stop(&mut self) {
        if !self.paused {
            log::debug!("frame loop stopped");
        }
        self.paused = true;
        self.next_due = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.paused && self.next_due.is_some_and(|due| now >= due)
    }

    /// Run one tick if one is due. Returns the delta handed to the entities.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        if !self.is_due(now) {
            return None;
        }
        let now_ms = now.saturating_duration_since(self.origin).as_millis();
        let delta = Duration::from_millis((now_ms - self.last_ms.min(now_ms)) as u64);
        self.last_ms = now_ms;

        log::trace!("tick delta={:?}", delta);
        for entity in &self.updatables {
            entity.borrow_mut().update(delta);
        }
        self.next_due = Some(now + self.tick_delay);
        Some(delta)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
        for entity in &self.drawables {
            entity.borrow().draw(canvas)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;

    struct Tracer {
        name: &'static str,
        log: Rc<RefCell<Vec<(&'static str, Duration)>>>,
    }

    impl Updatable for Tracer {
        fn update(&mut self, delta: Duration) {
            self.log.borrow_mut().push((self.name, delta));
        }
    }

    impl Drawable for Tracer {
        fn draw(&self, canvas: &mut dyn Canvas) -> Result<()> {
            canvas.text(self.name, 0, 0, 10.0, crate::canvas::BLACK, Default::default())
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn tracers() -> (FrameLoop, Rc<RefCell<Vec<(&'static str, Duration)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut frame_loop = FrameLoop::new(ms(8));
        for name in ["first", "second"] {
            frame_loop.add(&Rc::new(RefCell::new(Tracer {
                name,
                log: log.clone(),
            })));
        }
        (frame_loop, log)
    }

    #[test]
    fn test_paused_loop_never_ticks() {
        let (mut frame_loop, log) = tracers();
        assert!(frame_loop.is_paused());
        assert_eq!(frame_loop.tick(Instant::now()), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_updates_in_registration_order_with_delta() {
        let (mut frame_loop, log) = tracers();
        let t0 = Instant::now();
        frame_loop.start(t0);

        assert_eq!(frame_loop.tick(t0), Some(Duration::ZERO));
        // not re-armed yet
        assert_eq!(frame_loop.tick(t0 + ms(5)), None);
        assert_eq!(frame_loop.tick(t0 + ms(12)), Some(ms(12)));

        let log = log.borrow();
        let names: Vec<_> = log.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["first", "second", "first", "second"]);
        assert_eq!(log[3].1, ms(12));
    }

    #[test]
    fn test_resume_restarts_clock() {
        let (mut frame_loop, _log) = tracers();
        let t0 = Instant::now();
        frame_loop.start(t0);
        frame_loop.tick(t0);
        frame_loop.stop();
        assert_eq!(frame_loop.tick(t0 + ms(500)), None);

        frame_loop.start(t0 + ms(1000));
        assert_eq!(frame_loop.tick(t0 + ms(1000)), Some(Duration::ZERO));
        assert_eq!(frame_loop.tick(t0 + ms(1010)), Some(ms(10)));
    }

    #[test]
    fn test_draws_in_registration_order() {
        let (frame_loop, _log) = tracers();
        let mut canvas = RecordingCanvas::new();
        frame_loop.draw(&mut canvas).unwrap();
        assert_eq!(canvas.texts(), ["first", "second"]);
    }
}
