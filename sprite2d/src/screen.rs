use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::{
    canvas::Canvas,
    engine::{EngineContext, Game},
    error::SpriteError,
    input::InputState,
    schedule::{Scheduler, TimerHandle},
};

/// Per-update view handed to the active screen.
pub struct ScreenTick<'a> {
    pub input: &'a InputState,
    /// Time since the previous update.
    pub delta: Duration,
    pub now: Instant,
}

/// Lets screens ask for navigation without holding the manager.
///
/// Requests are applied after the current update returns.
pub trait Navigator {
    /// Raise the named screen.
    fn show(&mut self, name: &str);

    /// Raise the named screen once `delay` has passed.
    fn show_after(&mut self, delay: Duration, name: &str) -> TimerHandle;

    /// Drop a pending [`Navigator::show_after`]. Returns false if it already
    /// fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Close the application.
    fn quit(&mut self);
}

/// One full-window page of the application (menu, play field, ...).
///
/// Screens stay alive while hidden, so their state survives navigation.
pub trait Screen {
    /// Called every time this screen is raised.
    fn on_show(&mut self, _nav: &mut dyn Navigator) -> Result<()> {
        Ok(())
    }

    /// Called when another screen is raised over this one.
    fn on_hide(&mut self) {}

    /// Called once per engine update while this screen is active.
    fn update(&mut self, tick: &ScreenTick<'_>, nav: &mut dyn Navigator) -> Result<()>;

    fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Request {
    Show(String),
    /// A timer was scheduled for this screen; checked once the update returns.
    Scheduled(String),
    Quit,
}

/// Internal helper to let screens queue navigation without borrow conflicts.
struct NavigationQueue<'a> {
    requests: &'a mut Vec<Request>,
    timers: &'a mut Scheduler<String>,
}

impl<'a> Navigator for NavigationQueue<'a> {
    fn show(&mut self, name: &str) {
        self.requests.push(Request::Show(name.to_string()));
    }

    fn show_after(&mut self, delay: Duration, name: &str) -> TimerHandle {
        log::debug!("screen {name} scheduled in {delay:?}");
        self.requests.push(Request::Scheduled(name.to_string()));
        self.timers.schedule(delay, name.to_string())
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.cancel(handle)
    }

    fn quit(&mut self) {
        self.requests.push(Request::Quit);
    }
}

/// Keeps named screens and raises one at a time.
///
/// Only the active screen receives updates, input and draw calls.
pub struct ScreenManager {
    screens: HashMap<String, Box<dyn Screen>>,
    active: Option<String>,
    requests: Vec<Request>,
    timers: Scheduler<String>,
    quit_requested: bool,
}

impl ScreenManager {
    pub fn new() -> Self {
        Self {
            screens: HashMap::new(),
            active: None,
            requests: Vec::new(),
            timers: Scheduler::new(),
            quit_requested: false,
        }
    }

    /// Register a screen under `name`, replacing any previous one.
    pub fn add(&mut self, name: impl Into<String>, screen: Box<dyn Screen>) {
        self.screens.insert(name.into(), screen);
    }

    #[must_use]
    pub fn with_screen(mut self, name: impl Into<String>, screen: Box<dyn Screen>) -> Self {
        self.add(name, screen);
        self
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.screens.contains_key(name)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Delayed navigations not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Raise a screen right away.
    pub fn show(&mut self, name: &str) -> Result<()> {
        if !self.is_registered(name) {
            return Err(SpriteError::UnknownScreen(name.to_string()).into());
        }
        log::info!("showing screen {name}");
        let previous = self.active.replace(name.to_string());
        if let Some(previous) = previous.filter(|previous| previous != name) {
            if let Some(hidden) = self.screens.get_mut(&previous) {
                hidden.on_hide();
            }
        }

        let Some(screen) = self.screens.get_mut(name) else {
            return Ok(());
        };
        let mut queue = NavigationQueue {
            requests: &mut self.requests,
            timers: &mut self.timers,
        };
        screen.on_show(&mut queue)?;
        self.apply_requests()
    }

    fn apply_requests(&mut self) -> Result<()> {
        // on_show may queue further requests, so drain until empty
        while !self.requests.is_empty() {
            for request in std::mem::take(&mut self.requests) {
                match request {
                    Request::Show(name) => self.show(&name)?,
                    Request::Scheduled(name) => {
                        if !self.is_registered(&name) {
                            return Err(SpriteError::UnknownScreen(name).into());
                        }
                    }
                    Request::Quit => {
                        log::info!("quit requested");
                        self.quit_requested = true;
                    }
                }
            }
        }
        Ok(())
    }

    /// Fire due timers, then update the active screen and apply its requests.
    pub fn update(&mut self, tick: &ScreenTick<'_>) -> Result<()> {
        for name in self.timers.advance(tick.delta) {
            self.show(&name)?;
        }

        let Some(active) = self.active.clone() else {
            return Ok(());
        };
        if let Some(screen) = self.screens.get_mut(&active) {
            let mut queue = NavigationQueue {
                requests: &mut self.requests,
                timers: &mut self.timers,
            };
            screen.update(tick, &mut queue)?;
        }
        self.apply_requests()
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<()> {
        let Some(active) = self.active.as_deref() else {
            return Ok(());
        };
        match self.screens.get_mut(active) {
            Some(screen) => screen.draw(canvas),
            None => Ok(()),
        }
    }
}

impl Default for ScreenManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter to run a ScreenManager directly with `Engine::run()`.
impl Game for ScreenManager {
    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let tick = ScreenTick {
            input: ctx.input(),
            delta: ctx.delta_time(),
            now: Instant::now(),
        };
        ScreenManager::update(self, &tick)?;
        if self.quit_requested {
            ctx.request_exit();
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let renderer = ctx.renderer();
        let mut frame = renderer.begin_frame();
        ScreenManager::draw(self, &mut frame)?;
        renderer.end_frame(frame)
    }
}
