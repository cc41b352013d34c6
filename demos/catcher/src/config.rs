use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sprite2d::{sprites::FallingConfig, Clamp};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CATCHER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "catcher.json";

/// Tunables for the catcher game. Every field may be omitted from the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub tick_delay_ms: u64,
    pub lives: u32,
    pub coins: usize,
    pub coin_bottom_limit: i32,
    pub coin_min_delay_ms: u64,
    pub coin_max_delay_ms: u64,
    pub coin_min_speed: i32,
    pub coin_max_speed: i32,
    pub hero_speed: i32,
    pub hero_delay_ms: u64,
    pub assets: AssetPaths,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub hero_sheet: String,
    pub coin_sheet: String,
    pub background: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            hero_sheet: "images/alien.png".into(),
            coin_sheet: "images/electric_ball_sheet.png".into(),
            background: "images/moon_bg.jpg".into(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Catcher".into(),
            width: 800,
            height: 600,
            vsync: true,
            tick_delay_ms: 8,
            lives: 3,
            coins: 4,
            coin_bottom_limit: 750,
            coin_min_delay_ms: 10,
            coin_max_delay_ms: 30,
            coin_min_speed: 1,
            coin_max_speed: 10,
            hero_speed: 3,
            hero_delay_ms: 15,
            assets: AssetPaths::default(),
        }
    }
}

impl GameConfig {
    /// Read the file named by `CATCHER_CONFIG`, or `catcher.json` if unset.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(Path::new(&path))
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    pub fn hero_delay(&self) -> Duration {
        Duration::from_millis(self.hero_delay_ms)
    }

    pub fn falling(&self) -> FallingConfig {
        FallingConfig {
            min_delay: Duration::from_millis(self.coin_min_delay_ms),
            max_delay: Duration::from_millis(self.coin_max_delay_ms),
            min_speed: self.coin_min_speed,
            max_speed: self.coin_max_speed,
            limits: Clamp::new(
                0,
                self.width as i32,
                -(self.height as i32),
                self.coin_bottom_limit,
            ),
            ..FallingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(GameConfig::from_json("{}").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            GameConfig::from_json(r#"{ "lives": 5, "assets": { "background": "bg.png" } }"#)
                .unwrap();
        assert_eq!(config.lives, 5);
        assert_eq!(config.coins, 4);
        assert_eq!(config.assets.background, "bg.png");
        assert_eq!(config.assets.hero_sheet, "images/alien.png");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(GameConfig::from_json("{ lives: }").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("catcher-config-does-not-exist.json");
        assert_eq!(GameConfig::load_from(&path).unwrap(), GameConfig::default());
    }

    #[test]
    fn test_falling_limits_follow_arena() {
        let falling = GameConfig::default().falling();
        assert_eq!(falling.limits, Clamp::new(0, 800, -600, 750));
        assert_eq!(falling.min_delay, Duration::from_millis(10));
        assert_eq!(falling.max_speed, 10);
    }
}
