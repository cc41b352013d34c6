use anyhow::Result;
use sprite2d::image::{Rgba, RgbaImage};
use sprite2d::{frame_set, FrameSet, ImageProvider, SheetGrid, Texture};

use crate::config::GameConfig;

const HERO_GRID: SheetGrid = SheetGrid::new(4, 4, 50, 50);
const COIN_GRID: SheetGrid = SheetGrid::new(9, 1, 35, 35);

/// Textures the play screen needs.
#[derive(Clone, Debug)]
pub struct GameAssets {
    pub hero_left: FrameSet,
    pub hero_right: FrameSet,
    pub coins: FrameSet,
    pub background: Texture,
}

impl GameAssets {
    /// Load every asset named in `config`, substituting generated frames for
    /// files that cannot be read.
    pub fn load(images: &mut dyn ImageProvider, config: &GameConfig) -> Result<Self> {
        let paths = &config.assets;

        // rows: down, left, right, up
        let hero = sheet_or_placeholder(images, &paths.hero_sheet, HERO_GRID, [90, 200, 90])?;
        let frames_per_row = HERO_GRID.columns as usize;
        let row = |index: usize| {
            frame_set(hero[index * frames_per_row..(index + 1) * frames_per_row].to_vec())
        };
        let hero_left = row(1);
        let hero_right = row(2);

        let coins = frame_set(sheet_or_placeholder(
            images,
            &paths.coin_sheet,
            COIN_GRID,
            [240, 200, 40],
        )?);

        let background = match images.sized(&paths.background, config.width, config.height) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("using placeholder for {}: {err:#}", paths.background);
                let image =
                    RgbaImage::from_pixel(config.width, config.height, Rgba([20, 20, 40, 255]));
                images.from_rgba("placeholder:background", &image)?
            }
        };

        Ok(Self {
            hero_left,
            hero_right,
            coins,
            background,
        })
    }
}

fn sheet_or_placeholder(
    images: &mut dyn ImageProvider,
    path: &str,
    grid: SheetGrid,
    rgb: [u8; 3],
) -> Result<Vec<Texture>> {
    match images.sheet(path, grid) {
        Ok(frames) if frames.len() == grid.frame_count() => Ok(frames),
        Ok(frames) => {
            log::warn!(
                "{path} has {} frames, expected {}; using placeholder",
                frames.len(),
                grid.frame_count()
            );
            placeholder_frames(images, path, grid, rgb)
        }
        Err(err) => {
            log::warn!("using placeholder for {path}: {err:#}");
            placeholder_frames(images, path, grid, rgb)
        }
    }
}

/// Solid frames with a bright band that steps down one row per frame.
fn placeholder_frames(
    images: &mut dyn ImageProvider,
    path: &str,
    grid: SheetGrid,
    rgb: [u8; 3],
) -> Result<Vec<Texture>> {
    let count = grid.frame_count() as u32;
    (0..count)
        .map(|index| {
            let band = index * grid.cell_height / count.max(1);
            let image = RgbaImage::from_fn(grid.cell_width, grid.cell_height, |_, y| {
                if y.abs_diff(band) <= 2 {
                    Rgba([255, 255, 255, 255])
                } else {
                    Rgba([rgb[0], rgb[1], rgb[2], 255])
                }
            });
            images.from_rgba(&format!("placeholder:{path}#{index}"), &image)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use sprite2d::TextureHandle;

    /// Provider with no files on disk.
    #[derive(Default)]
    struct NoFiles {
        uploads: Vec<String>,
    }

    impl ImageProvider for NoFiles {
        fn sheet(&mut self, path: &str, _grid: SheetGrid) -> Result<Vec<Texture>> {
            Err(anyhow!("{path} not found"))
        }

        fn sized(&mut self, path: &str, _width: u32, _height: u32) -> Result<Texture> {
            Err(anyhow!("{path} not found"))
        }

        fn from_rgba(&mut self, key: &str, image: &RgbaImage) -> Result<Texture> {
            self.uploads.push(key.to_string());
            let handle = TextureHandle::from_raw(self.uploads.len() as u32);
            Ok(Texture::new(handle, image.width(), image.height()))
        }
    }

    #[test]
    fn test_missing_files_fall_back_to_placeholders() {
        let mut provider = NoFiles::default();
        let assets = GameAssets::load(&mut provider, &GameConfig::default()).unwrap();

        assert_eq!(assets.hero_left.len(), 4);
        assert_eq!(assets.hero_right.len(), 4);
        assert_eq!(assets.coins.len(), 9);
        assert_eq!((assets.coins[0].width, assets.coins[0].height), (35, 35));
        assert_eq!((assets.hero_left[0].width, assets.hero_left[0].height), (50, 50));
        assert_eq!((assets.background.width, assets.background.height), (800, 600));
        // 16 hero frames, 9 coin frames, one background
        assert_eq!(provider.uploads.len(), 26);
    }

    #[test]
    fn test_hero_rows_pick_left_and_right() {
        let mut provider = NoFiles::default();
        let assets = GameAssets::load(&mut provider, &GameConfig::default()).unwrap();
        // uploads are numbered from 1 in sheet order
        assert_eq!(assets.hero_left[0].handle.id(), 5);
        assert_eq!(assets.hero_right[0].handle.id(), 9);
    }
}
