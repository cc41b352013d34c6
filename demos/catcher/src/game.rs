use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use sprite2d::{
    sprites::{AnimatedMover, FallingObjectPool, MoverConfig},
    Anchor, Canvas, Clamp, Direction, FrameLoop, Navigator, Screen, ScreenTick, Sprite,
    TimerHandle, BLACK, WHITE,
};

use crate::{assets::GameAssets, config::GameConfig, score::Scoreboard};

pub const START_MESSAGE: &str = "Press Left/Right\nArrows to Begin";
const GAME_OVER_DELAY: Duration = Duration::from_secs(2);
const SPEED_STEP: i32 = 2;
const DELAY_STEP: Duration = Duration::from_millis(5);

/// The catcher itself: move the hero under the falling coins.
pub struct PlayScreen {
    width: i32,
    height: i32,
    frame_loop: FrameLoop,
    hero: Rc<RefCell<AnimatedMover>>,
    coins: Rc<RefCell<FallingObjectPool>>,
    score: Scoreboard,
    awaiting_start: bool,
    game_over: bool,
    /// Pending switch to the game-over screen.
    game_over_timer: Option<TimerHandle>,
}

impl PlayScreen {
    pub fn new(config: &GameConfig, assets: GameAssets) -> Result<Self> {
        let coins = FallingObjectPool::new(assets.coins.clone(), config.coins, config.falling())?;
        Self::build(config, assets, coins)
    }

    /// Same as [`PlayScreen::new`] with reproducible coin spawns.
    pub fn with_seed(config: &GameConfig, assets: GameAssets, seed: u64) -> Result<Self> {
        let coins = FallingObjectPool::with_seed(
            assets.coins.clone(),
            config.coins,
            config.falling(),
            seed,
        )?;
        Self::build(config, assets, coins)
    }

    fn build(config: &GameConfig, assets: GameAssets, coins: FallingObjectPool) -> Result<Self> {
        let width = config.width as i32;
        let height = config.height as i32;

        let mut hero = AnimatedMover::horizontal_clamped(
            assets.hero_left,
            assets.hero_right,
            MoverConfig {
                x: width / 2,
                y: height - 50,
                delay: config.hero_delay(),
                speed: config.hero_speed,
                limits: Clamp::new(0, width, 0, height),
                ..MoverConfig::default()
            },
        )?;
        hero.sprite_mut().set_center_x(width / 2);

        let hero = Rc::new(RefCell::new(hero));
        let coins = Rc::new(RefCell::new(coins));

        let mut frame_loop = FrameLoop::new(config.tick_delay());
        frame_loop.add_drawable(Rc::new(RefCell::new(Sprite::with_image(
            0,
            0,
            assets.background,
        ))));
        frame_loop.add(&hero);
        frame_loop.add(&coins);

        Ok(Self {
            width,
            height,
            frame_loop,
            hero,
            coins,
            score: Scoreboard::new(config.lives),
            awaiting_start: true,
            game_over: false,
            game_over_timer: None,
        })
    }

    pub fn score(&self) -> &Scoreboard {
        &self.score
    }

    pub fn is_paused(&self) -> bool {
        self.frame_loop.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn hero(&self) -> &Rc<RefCell<AnimatedMover>> {
        &self.hero
    }

    pub fn coins(&self) -> &Rc<RefCell<FallingObjectPool>> {
        &self.coins
    }

    /// New round: full lives, no points, hero centered, coins respawned,
    /// waiting for a direction key. A pending game-over switch is dropped.
    pub fn reset(&mut self, nav: &mut dyn Navigator) {
        log::info!("new round");
        if let Some(timer) = self.game_over_timer.take() {
            nav.cancel(timer);
        }
        self.score.reset();
        self.game_over = false;
        self.awaiting_start = true;
        self.frame_loop.stop();
        let center = self.width / 2;
        self.hero.borrow_mut().sprite_mut().set_center_x(center);
        self.coins.borrow_mut().reset_all();
    }

    fn handle_key(&mut self, name: &str, tick: &ScreenTick<'_>, nav: &mut dyn Navigator) {
        match name {
            "Left" | "Right" => {
                if self.frame_loop.is_paused() && !self.game_over {
                    self.awaiting_start = false;
                    self.frame_loop.start(tick.now);
                }
                if let Some(direction) = Direction::from_key_name(name) {
                    self.hero.borrow_mut().set_direction(direction);
                }
            }
            "p" if !self.game_over => {
                if self.frame_loop.is_paused() {
                    self.awaiting_start = false;
                    self.frame_loop.start(tick.now);
                } else {
                    self.frame_loop.stop();
                }
            }
            "s" => self.speed_up(),
            "a" => self.slow_down(),
            "y" => self.reset(nav),
            "n" => nav.quit(),
            _ => {}
        }
    }

    fn speed_up(&mut self) {
        let mut hero = self.hero.borrow_mut();
        let mover = hero.mover_mut();
        mover.set_speed(mover.speed() + SPEED_STEP);
        if mover.delay > self.frame_loop.tick_delay() {
            mover.delay = mover.delay.saturating_sub(DELAY_STEP);
        }
        log::debug!("hero speed {} delay {:?}", mover.speed(), mover.delay);
    }

    fn slow_down(&mut self) {
        let mut hero = self.hero.borrow_mut();
        let mover = hero.mover_mut();
        if mover.speed() > SPEED_STEP {
            mover.set_speed(mover.speed() - SPEED_STEP);
        }
        mover.delay += DELAY_STEP;
        log::debug!("hero speed {} delay {:?}", mover.speed(), mover.delay);
    }

    /// Score caught coins and charge a life for every coin that got past.
    fn settle(&mut self) {
        let hero_bounds = self.hero.borrow().sprite().bounds();
        let mut coins = self.coins.borrow_mut();

        let mut caught = 0;
        for coin in coins.intersecting_mut(&hero_bounds) {
            coin.reset_position();
            caught += 1;
        }
        self.score.catch(caught);

        for coin in coins.objects_mut() {
            if coin.sprite().top() > self.height {
                self.score.miss();
                coin.reset_position();
            }
        }
    }
}

impl Screen for PlayScreen {
    fn on_show(&mut self, nav: &mut dyn Navigator) -> Result<()> {
        if self.game_over {
            self.reset(nav);
        }
        Ok(())
    }

    fn on_hide(&mut self) {
        // hidden screens get no ticks; resume through the start prompt
        if !self.frame_loop.is_paused() {
            self.awaiting_start = true;
        }
        self.frame_loop.stop();
    }

    fn update(&mut self, tick: &ScreenTick<'_>, nav: &mut dyn Navigator) -> Result<()> {
        let pressed: Vec<&'static str> = tick.input.pressed_names().collect();
        for name in pressed {
            self.handle_key(name, tick, nav);
        }

        if self.frame_loop.tick(tick.now).is_none() {
            return Ok(());
        }
        self.settle();

        if self.score.is_game_over() && !self.game_over {
            log::info!("game over with {} points", self.score.points());
            self.game_over = true;
            self.frame_loop.stop();
            self.game_over_timer = Some(nav.show_after(GAME_OVER_DELAY, "gameover"));
        }
        Ok(())
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.clear(BLACK)?;
        self.frame_loop.draw(canvas)?;

        canvas.text(
            &format!("Lives: {}", self.score.lives()),
            25,
            10,
            18.0,
            WHITE,
            Anchor::TopLeft,
        )?;
        canvas.text(
            &format!("Points: {}", self.score.points()),
            self.width - 25,
            10,
            18.0,
            WHITE,
            Anchor::TopRight,
        )?;

        let (cx, cy) = (self.width / 2, self.height / 2);
        if self.game_over {
            canvas.text("Game Over", cx, cy, 52.0, WHITE, Anchor::Center)?;
            canvas.text("Play Again (y/n)?", cx, cy + 100, 26.0, WHITE, Anchor::Center)?;
        } else if self.awaiting_start {
            canvas.text(START_MESSAGE, cx, cy, 28.0, WHITE, Anchor::Center)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::screens::MenuScreen;
    use sprite2d::{
        frame_set, InputState, KeyCode, RecordingCanvas, Scheduler, ScreenManager, Texture,
        TextureHandle,
    };

    #[derive(Default)]
    struct Recorder {
        shown_after: Vec<(Duration, String)>,
        timers: Scheduler<String>,
        quit: bool,
    }

    impl Navigator for Recorder {
        fn show(&mut self, _name: &str) {}

        fn show_after(&mut self, delay: Duration, name: &str) -> TimerHandle {
            self.shown_after.push((delay, name.to_string()));
            self.timers.schedule(delay, name.to_string())
        }

        fn cancel(&mut self, handle: TimerHandle) -> bool {
            self.timers.cancel(handle)
        }

        fn quit(&mut self) {
            self.quit = true;
        }
    }

    fn frames(first_id: u32, count: u32, size: u32) -> sprite2d::FrameSet {
        frame_set(
            (first_id..first_id + count)
                .map(|id| Texture::new(TextureHandle::from_raw(id), size, size))
                .collect::<Vec<_>>(),
        )
    }

    fn assets() -> GameAssets {
        GameAssets {
            hero_left: frames(10, 4, 50),
            hero_right: frames(20, 4, 50),
            coins: frames(30, 9, 35),
            background: Texture::new(TextureHandle::from_raw(1), 800, 600),
        }
    }

    fn screen(config: &GameConfig) -> PlayScreen {
        PlayScreen::with_seed(config, assets(), 7).unwrap()
    }

    struct Driver {
        input: InputState,
        now: Instant,
        nav: Recorder,
    }

    impl Driver {
        fn new() -> Self {
            Self {
                input: InputState::new(),
                now: Instant::now(),
                nav: Recorder::default(),
            }
        }

        /// Tap `keys` in order and move the clock forward.
        fn advance(&mut self, keys: &[KeyCode], delta_ms: u64) -> Duration {
            self.input.begin_frame();
            for key in keys {
                self.input.press(*key);
                self.input.release(*key);
            }
            let delta = Duration::from_millis(delta_ms);
            self.now += delta;
            delta
        }

        fn step(&mut self, screen: &mut PlayScreen, keys: &[KeyCode], delta_ms: u64) {
            let delta = self.advance(keys, delta_ms);
            let tick = ScreenTick {
                input: &self.input,
                delta,
                now: self.now,
            };
            screen.update(&tick, &mut self.nav).unwrap();
        }

        fn step_screens(&mut self, screens: &mut ScreenManager, keys: &[KeyCode], delta_ms: u64) {
            let delta = self.advance(keys, delta_ms);
            let tick = ScreenTick {
                input: &self.input,
                delta,
                now: self.now,
            };
            screens.update(&tick).unwrap();
        }
    }

    /// Park every coin far above the arena.
    fn park_coins(screen: &PlayScreen) {
        for coin in screen.coins().borrow_mut().objects_mut() {
            coin.sprite_mut().y = -500;
        }
    }

    #[test]
    fn test_starts_paused_with_prompt() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        let hero_x = play.hero().borrow().sprite().x;

        driver.step(&mut play, &[], 50);
        assert!(play.is_paused());
        assert_eq!(play.hero().borrow().sprite().x, hero_x);
        assert_eq!(play.hero().borrow().sprite().center_x(), 400);

        let mut canvas = RecordingCanvas::new();
        play.draw(&mut canvas).unwrap();
        assert_eq!(canvas.texts(), ["Lives: 3", "Points: 0", START_MESSAGE]);
    }

    #[test]
    fn test_direction_key_starts_and_moves_hero() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        park_coins(&play);
        let start_x = play.hero().borrow().sprite().x;

        driver.step(&mut play, &[KeyCode::ArrowLeft], 0);
        assert!(!play.is_paused());
        for _ in 0..3 {
            driver.step(&mut play, &[], 15);
        }
        let hero = play.hero().borrow();
        assert_eq!(hero.direction(), Direction::Left);
        assert_eq!(hero.sprite().x, start_x - 9);
    }

    #[test]
    fn test_catching_scores_and_respawns() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        park_coins(&play);
        let hero_bounds = play.hero().borrow().sprite().bounds();
        play.coins().borrow_mut().objects_mut()[0]
            .sprite_mut()
            .set_center(hero_bounds.center());

        driver.step(&mut play, &[KeyCode::ArrowRight], 0);
        assert_eq!(play.score().points(), 1);
        assert_eq!(play.score().lives(), 3);
        assert!(play.coins().borrow().objects()[0].sprite().top() <= 0);
    }

    #[test]
    fn test_missed_coin_costs_a_life() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        park_coins(&play);
        play.coins().borrow_mut().objects_mut()[1].sprite_mut().y = 601;

        driver.step(&mut play, &[KeyCode::ArrowRight], 0);
        assert_eq!(play.score().lives(), 2);
        assert_eq!(play.score().points(), 0);
    }

    #[test]
    fn test_last_life_ends_the_game() {
        let config = GameConfig {
            lives: 1,
            ..GameConfig::default()
        };
        let mut play = screen(&config);
        let mut driver = Driver::new();
        park_coins(&play);
        play.coins().borrow_mut().objects_mut()[0].sprite_mut().y = 700;

        driver.step(&mut play, &[KeyCode::ArrowRight], 0);
        assert!(play.is_game_over());
        assert!(play.is_paused());
        assert_eq!(
            driver.nav.shown_after,
            [(Duration::from_secs(2), "gameover".to_string())]
        );

        // direction keys no longer restart the loop
        driver.step(&mut play, &[KeyCode::ArrowLeft], 10);
        assert!(play.is_paused());

        let mut canvas = RecordingCanvas::new();
        play.draw(&mut canvas).unwrap();
        assert_eq!(
            canvas.texts(),
            ["Lives: 0", "Points: 0", "Game Over", "Play Again (y/n)?"]
        );

        driver.step(&mut play, &[KeyCode::KeyY], 10);
        assert!(!play.is_game_over());
        assert_eq!(driver.nav.timers.pending(), 0);
    }

    #[test]
    fn test_new_round_keeps_play_screen_up() {
        let config = GameConfig {
            lives: 1,
            ..GameConfig::default()
        };
        let play = screen(&config);
        let coins = play.coins().clone();
        park_coins(&play);
        coins.borrow_mut().objects_mut()[0].sprite_mut().y = 700;
        let mut screens = ScreenManager::new()
            .with_screen("play", Box::new(play))
            .with_screen("gameover", Box::new(MenuScreen::game_over()));
        screens.show("play").unwrap();
        let mut driver = Driver::new();

        driver.step_screens(&mut screens, &[KeyCode::ArrowRight], 0);
        assert_eq!(screens.pending_timers(), 1);

        driver.step_screens(&mut screens, &[KeyCode::KeyY], 10);
        assert_eq!(screens.pending_timers(), 0);
        for coin in coins.borrow_mut().objects_mut() {
            coin.sprite_mut().y = -100_000;
        }

        driver.step_screens(&mut screens, &[KeyCode::ArrowLeft], 10);
        for _ in 0..25 {
            driver.step_screens(&mut screens, &[], 100);
        }
        assert_eq!(screens.active(), Some("play"));
    }

    #[test]
    fn test_keys_apply_in_press_order() {
        let config = GameConfig {
            lives: 1,
            ..GameConfig::default()
        };

        let mut play = screen(&config);
        let mut driver = Driver::new();
        park_coins(&play);
        play.coins().borrow_mut().objects_mut()[0].sprite_mut().y = 700;
        driver.step(&mut play, &[KeyCode::ArrowRight], 0);
        driver.step(&mut play, &[KeyCode::KeyY, KeyCode::ArrowLeft], 10);
        assert!(!play.is_game_over());
        assert!(!play.is_paused());

        let mut play = screen(&config);
        let mut driver = Driver::new();
        park_coins(&play);
        play.coins().borrow_mut().objects_mut()[0].sprite_mut().y = 700;
        driver.step(&mut play, &[KeyCode::ArrowRight], 0);
        driver.step(&mut play, &[KeyCode::ArrowLeft, KeyCode::KeyY], 10);
        assert!(!play.is_game_over());
        assert!(play.is_paused());
    }

    #[test]
    fn test_hiding_pauses_the_round() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        park_coins(&play);
        driver.step(&mut play, &[KeyCode::ArrowLeft], 0);
        assert!(!play.is_paused());

        play.on_hide();
        assert!(play.is_paused());
        let mut canvas = RecordingCanvas::new();
        play.draw(&mut canvas).unwrap();
        assert_eq!(canvas.texts(), ["Lives: 3", "Points: 0", START_MESSAGE]);
    }

    #[test]
    fn test_pause_toggle() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        driver.step(&mut play, &[KeyCode::KeyP], 0);
        assert!(!play.is_paused());
        driver.step(&mut play, &[KeyCode::KeyP], 10);
        assert!(play.is_paused());
    }

    #[test]
    fn test_speed_keys() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();

        driver.step(&mut play, &[KeyCode::KeyS], 0);
        {
            let hero = play.hero().borrow();
            assert_eq!(hero.mover().speed(), 5);
            assert_eq!(hero.mover().delay, Duration::from_millis(10));
        }

        // delay stops shrinking once it reaches the tick delay
        driver.step(&mut play, &[KeyCode::KeyS], 0);
        {
            let hero = play.hero().borrow();
            assert_eq!(hero.mover().speed(), 7);
            assert_eq!(hero.mover().delay, Duration::from_millis(5));
        }
        driver.step(&mut play, &[KeyCode::KeyS], 0);
        assert_eq!(play.hero().borrow().mover().delay, Duration::from_millis(5));

        driver.step(&mut play, &[KeyCode::KeyA], 0);
        let hero = play.hero().borrow();
        assert_eq!(hero.mover().speed(), 7);
        assert_eq!(hero.mover().delay, Duration::from_millis(10));
    }

    #[test]
    fn test_reset_and_quit_keys() {
        let mut play = screen(&GameConfig::default());
        let mut driver = Driver::new();
        park_coins(&play);
        play.coins().borrow_mut().objects_mut()[0].sprite_mut().y = 601;
        driver.step(&mut play, &[KeyCode::ArrowRight], 0);
        assert_eq!(play.score().lives(), 2);

        driver.step(&mut play, &[KeyCode::KeyY], 10);
        assert_eq!(play.score().lives(), 3);
        assert!(play.is_paused());
        assert_eq!(play.hero().borrow().sprite().center_x(), 400);

        driver.step(&mut play, &[KeyCode::KeyN], 10);
        assert!(driver.nav.quit);
    }
}
