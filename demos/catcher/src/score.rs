/// Lives and points of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scoreboard {
    starting_lives: u32,
    lives: u32,
    points: u32,
}

impl Scoreboard {
    pub fn new(lives: u32) -> Self {
        Self {
            starting_lives: lives,
            lives,
            points: 0,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn catch(&mut self, count: u32) {
        self.points += count;
    }

    /// Lose a life, never going below zero.
    pub fn miss(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    pub fn reset(&mut self) {
        self.lives = self.starting_lives;
        self.points = 0;
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(3)
    }
}
