use std::time::{Duration, Instant};

use anyhow::Result;
use image::RgbaImage;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    assets::{AssetManager, ImageProvider, SheetGrid},
    input::InputState,
    render::Renderer,
    texture::Texture,
};

/// Configuration values for the engine window and runtime behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Minimum time between two game updates.
    pub tick_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "Sprite2D Game".into(),
            width: 800,
            height: 600,
            vsync: true,
            tick_delay: Duration::from_millis(8),
        }
    }
}

/// Main entrypoint for running a game.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine instance with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable or disable vertical sync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    /// Set how long the engine waits between game updates.
    #[must_use]
    pub fn with_tick_delay(mut self, tick_delay: Duration) -> Self {
        self.config.tick_delay = tick_delay;
        self
    }

    /// Run the provided game until the window is closed or the game requests exit.
    pub fn run<G: Game + 'static>(self, mut game: G) -> Result<()> {
        let config = self.config;

        let event_loop = EventLoop::new()?;
        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        window_attributes.inner_size = Some(LogicalSize::new(config.width, config.height).into());
        window_attributes.resizable = false;
        let window = event_loop.create_window(window_attributes)?;

        // The window lives for the whole program
        let window: &'static Window = Box::leak(Box::new(window));

        let mut ctx = EngineContext::new(window, &config)?;
        game.init(&mut ctx)?;
        log::info!(
            "engine started: {}x{} tick={:?}",
            config.width,
            config.height,
            config.tick_delay
        );

        let tick_delay = config.tick_delay;
        let mut last_update = Instant::now();
        let mut next_update = last_update;
        event_loop.run(move |event, elwt| {
            match event {
                Event::NewEvents(_) => {
                    ctx.begin_frame();
                }
                Event::WindowEvent { event, .. } => {
                    ctx.handle_window_event(&event);

                    match event {
                        WindowEvent::CloseRequested => {
                            log::info!("window closed");
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if is_escape_pressed(&event) {
                                elwt.exit();
                            }
                        }
                        WindowEvent::Resized(new_size) => {
                            ctx.resize_renderer(new_size);
                        }
                        WindowEvent::RedrawRequested => {
                            if let Err(err) = game.draw(&mut ctx) {
                                log::error!("error during draw: {err:?}");
                                elwt.exit();
                                return;
                            }

                            if ctx.exit_requested {
                                elwt.exit();
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    let now = Instant::now();
                    if now >= next_update {
                        ctx.update_time(now - last_update);
                        last_update = now;
                        next_update = now + tick_delay;

                        if let Err(err) = game.update(&mut ctx) {
                            log::error!("error during update: {err:?}");
                            elwt.exit();
                            return;
                        }

                        if ctx.exit_requested {
                            elwt.exit();
                            return;
                        }

                        ctx.window.request_redraw();
                    }
                    elwt.set_control_flow(ControlFlow::WaitUntil(next_update));
                }
                Event::LoopExiting => {
                    log::info!("engine exiting");
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn is_escape_pressed(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape))
}

/// Shared context provided to game code each frame.
pub struct EngineContext<'window> {
    window: &'window winit::window::Window,
    delta_time: Duration,
    elapsed_time: Duration,
    tick_delay: Duration,
    exit_requested: bool,
    input: InputState,
    renderer: Renderer<'window>,
    assets: AssetManager,
}

impl<'window> EngineContext<'window> {
    fn new(window: &'window winit::window::Window, config: &EngineConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync)?;

        Ok(Self {
            window,
            delta_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
            tick_delay: config.tick_delay,
            exit_requested: false,
            input: InputState::new(),
            renderer,
            assets: AssetManager::new(),
        })
    }

    fn begin_frame(&mut self) {
        self.input.begin_frame();
    }

    fn update_time(&mut self, delta: Duration) {
        self.delta_time = delta;
        self.elapsed_time += delta;
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            self.input.handle_key(event);
        }
    }

    fn resize_renderer(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    /// Duration between the current and previous updates.
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    /// Total time elapsed since the engine started running.
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    /// Configured time between updates.
    pub fn tick_delay(&self) -> Duration {
        self.tick_delay
    }

    /// Access the underlying winit window.
    pub fn window(&self) -> &winit::window::Window {
        self.window
    }

    /// Access the current input state.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Request that the engine exit after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Access the renderer for drawing operations.
    pub fn renderer(&mut self) -> &mut Renderer<'window> {
        &mut self.renderer
    }

    /// Access the asset manager for loading and caching assets.
    pub fn assets(&mut self) -> &mut AssetManager {
        &mut self.assets
    }
}

impl ImageProvider for EngineContext<'_> {
    fn sheet(&mut self, path: &str, grid: SheetGrid) -> Result<Vec<Texture>> {
        self.assets.load_sheet(&mut self.renderer, path, grid)
    }

    fn sized(&mut self, path: &str, width: u32, height: u32) -> Result<Texture> {
        self.assets.load_sized(&mut self.renderer, path, width, height)
    }

    fn from_rgba(&mut self, key: &str, image: &RgbaImage) -> Result<Texture> {
        self.assets.load_rgba(&mut self.renderer, key, image)
    }
}

/// Trait implemented by user code to hook into the engine lifecycle.
pub trait Game {
    /// Called once after the window is created but before the first frame.
    fn init(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Update game state. Called once per tick before drawing.
    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;

    /// Draw the current frame. Called after update when a redraw is requested.
    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;
}
