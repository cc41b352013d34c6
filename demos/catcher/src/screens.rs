use std::time::Duration;

use anyhow::Result;
use sprite2d::{
    Anchor, Bounds, Canvas, Color, Navigator, Screen, ScreenManager, ScreenTick, BLACK,
};

use crate::game::PlayScreen;

const SPLASH_DELAY: Duration = Duration::from_secs(3);

const RED: Color = [0.8, 0.1, 0.1, 1.0];
const BLUE: Color = [0.1, 0.2, 0.8, 1.0];
const YELLOW: Color = [0.95, 0.85, 0.2, 1.0];
const BAR_HEIGHT: i32 = 60;

/// All screens of the game, starting on the splash screen.
pub fn build(play: PlayScreen) -> Result<ScreenManager> {
    let mut screens = ScreenManager::new()
        .with_screen("splash", Box::new(SplashScreen))
        .with_screen("menu", Box::new(MenuScreen::main_menu()))
        .with_screen("instructions", Box::new(MenuScreen::instructions()))
        .with_screen("gameover", Box::new(MenuScreen::game_over()))
        .with_screen("play", Box::new(play));
    screens.show("splash")?;
    Ok(screens)
}

/// Title card that hands over to the main menu on its own.
pub struct SplashScreen;

impl Screen for SplashScreen {
    fn on_show(&mut self, nav: &mut dyn Navigator) -> Result<()> {
        nav.show_after(SPLASH_DELAY, "menu");
        Ok(())
    }

    fn update(&mut self, _tick: &ScreenTick<'_>, _nav: &mut dyn Navigator) -> Result<()> {
        Ok(())
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.clear(RED)?;
        canvas.text("Splash Screen", 400, 300, 44.0, BLACK, Anchor::Center)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Show(&'static str),
    Quit,
}

/// Title over a bar of three numbered buttons, picked with keys 1 to 3.
pub struct MenuScreen {
    title: &'static str,
    body: &'static [&'static str],
    background: Color,
    buttons: [(&'static str, Target); 3],
}

impl MenuScreen {
    pub fn main_menu() -> Self {
        Self {
            title: "Main Menu",
            body: &[],
            background: RED,
            buttons: [
                ("Play Game", Target::Show("play")),
                ("Instructions", Target::Show("instructions")),
                ("Quit", Target::Quit),
            ],
        }
    }

    pub fn instructions() -> Self {
        Self {
            title: "Instructions",
            body: &[
                "Catch the falling coins with the alien.",
                "Left/Right: move    p: pause",
                "s: faster    a: slower",
                "y: new game    n: quit",
                "Every missed coin costs a life.",
            ],
            background: BLUE,
            buttons: [
                ("Play Game", Target::Show("play")),
                ("Splash Screen", Target::Show("splash")),
                ("Game Over", Target::Show("gameover")),
            ],
        }
    }

    pub fn game_over() -> Self {
        Self {
            title: "Game Over Screen",
            body: &[],
            background: RED,
            buttons: [
                ("Play Game", Target::Show("play")),
                ("Main Menu", Target::Show("menu")),
                ("Quit", Target::Quit),
            ],
        }
    }
}

impl Screen for MenuScreen {
    fn update(&mut self, tick: &ScreenTick<'_>, nav: &mut dyn Navigator) -> Result<()> {
        let choice = ["1", "2", "3"]
            .iter()
            .position(|key| tick.input.is_name_pressed(key));
        match choice.map(|index| self.buttons[index].1) {
            Some(Target::Show(name)) => nav.show(name),
            Some(Target::Quit) => nav.quit(),
            None => {}
        }
        Ok(())
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.clear(self.background)?;

        let button_width = 800 / self.buttons.len() as i32;
        for (index, (label, _)) in self.buttons.iter().enumerate() {
            let left = index as i32 * button_width;
            let button = Bounds::from_origin(left, 0, button_width, BAR_HEIGHT);
            canvas.fill_rect(button, YELLOW)?;
            canvas.outline_rect(button, BLACK, 2)?;
            let center = button.center();
            canvas.text(
                &format!("{}  {label}", index + 1),
                center.x,
                center.y,
                20.0,
                BLACK,
                Anchor::Center,
            )?;
        }

        canvas.text(self.title, 400, 200, 44.0, BLACK, Anchor::Center)?;
        for (line, text) in self.body.iter().enumerate() {
            canvas.text(text, 400, 280 + line as i32 * 36, 22.0, BLACK, Anchor::Center)?;
        }
        Ok(())
    }
}
