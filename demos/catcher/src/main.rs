//! Catcher: steer the alien left and right to catch the falling coins.

mod assets;
mod config;
mod game;
mod score;
mod screens;

use anyhow::Result;
use sprite2d::{Engine, EngineContext, Game, ScreenManager};

use crate::{assets::GameAssets, config::GameConfig, game::PlayScreen};

struct CatcherApp {
    config: GameConfig,
    screens: Option<ScreenManager>,
}

impl CatcherApp {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            screens: None,
        }
    }
}

impl Game for CatcherApp {
    fn init(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let assets = GameAssets::load(ctx, &self.config)?;
        let play = PlayScreen::new(&self.config, assets)?;
        self.screens = Some(screens::build(play)?);
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        match self.screens.as_mut() {
            Some(screens) => Game::update(screens, ctx),
            None => Ok(()),
        }
    }

    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        match self.screens.as_mut() {
            Some(screens) => Game::draw(screens, ctx),
            None => Ok(()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load()?;
    Engine::new()
        .with_title(config.title.clone())
        .with_size(config.width, config.height)
        .with_vsync(config.vsync)
        .with_tick_delay(config.tick_delay())
        .run(CatcherApp::new(config))
}
