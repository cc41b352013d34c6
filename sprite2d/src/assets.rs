use std::collections::HashMap;

use anyhow::{Context, Result};
use image::{imageops, RgbaImage};

use crate::{error::SpriteError, texture::Texture};

/// Layout of a sprite sheet: `columns` x `rows` cells of equal size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SheetGrid {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl SheetGrid {
    pub const fn new(columns: u32, rows: u32, cell_width: u32, cell_height: u32) -> Self {
        Self {
            columns,
            rows,
            cell_width,
            cell_height,
        }
    }

    pub fn frame_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    fn cache_key(&self, path: &str) -> String {
        format!(
            "{path}#{}x{}@{}x{}",
            self.columns, self.rows, self.cell_width, self.cell_height
        )
    }
}

/// Cut a sheet into frames, row by row, left to right.
pub fn slice_grid(sheet: &RgbaImage, grid: SheetGrid) -> Result<Vec<RgbaImage>, SpriteError> {
    let fits = grid.columns > 0
        && grid.rows > 0
        && grid.cell_width > 0
        && grid.cell_height > 0
        && grid.columns * grid.cell_width <= sheet.width()
        && grid.rows * grid.cell_height <= sheet.height();
    if !fits {
        return Err(SpriteError::InvalidGrid {
            columns: grid.columns,
            rows: grid.rows,
            cell_width: grid.cell_width,
            cell_height: grid.cell_height,
            sheet_width: sheet.width(),
            sheet_height: sheet.height(),
        });
    }

    let mut frames = Vec::with_capacity(grid.frame_count());
    for row in 0..grid.rows {
        for column in 0..grid.columns {
            let frame = imageops::crop_imm(
                sheet,
                column * grid.cell_width,
                row * grid.cell_height,
                grid.cell_width,
                grid.cell_height,
            )
            .to_image();
            frames.push(frame);
        }
    }
    Ok(frames)
}

/// Decode an image file into RGBA8.
pub fn decode_file(path: &str) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("failed to load image {path}"))?;
    Ok(image.to_rgba8())
}

/// Something that turns decoded pixels into drawable textures (the renderer).
pub trait TextureSink {
    fn upload_rgba(&mut self, image: &RgbaImage) -> Result<Texture>;
}

/// Source of decoded, uploaded images for game code.
pub trait ImageProvider {
    /// Frames of a sprite sheet, row by row.
    fn sheet(&mut self, path: &str, grid: SheetGrid) -> Result<Vec<Texture>>;

    /// One image scaled to `width` x `height`.
    fn sized(&mut self, path: &str, width: u32, height: u32) -> Result<Texture>;

    /// Upload in-memory pixels, cached under `key`.
    fn from_rgba(&mut self, key: &str, image: &RgbaImage) -> Result<Texture>;
}

/// Caches uploaded textures by path (or caller-chosen key).
#[derive(Debug, Default)]
pub struct AssetManager {
    textures: HashMap<String, Texture>,
    sheets: HashMap<String, Vec<Texture>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and slice a sprite sheet, returning cached frames on repeat calls.
    pub fn load_sheet(
        &mut self,
        sink: &mut dyn TextureSink,
        path: &str,
        grid: SheetGrid,
    ) -> Result<Vec<Texture>> {
        let key = grid.cache_key(path);
        if let Some(frames) = self.sheets.get(&key) {
            log::debug!("sheet cache hit: {key}");
            return Ok(frames.clone());
        }

        let sheet = decode_file(path)?;
        let frames = slice_grid(&sheet, grid)?
            .iter()
            .map(|frame| sink.upload_rgba(frame))
            .collect::<Result<Vec<_>>>()?;
        log::info!("loaded sheet {path} ({} frames)", frames.len());
        self.sheets.insert(key, frames.clone());
        Ok(frames)
    }

    /// Load an image resized to `width` x `height`, cached per size.
    pub fn load_sized(
        &mut self,
        sink: &mut dyn TextureSink,
        path: &str,
        width: u32,
        height: u32,
    ) -> Result<Texture> {
        let key = format!("{path}@{width}x{height}");
        if let Some(texture) = self.textures.get(&key) {
            return Ok(*texture);
        }

        let image = decode_file(path)?;
        let image = if image.dimensions() == (width, height) {
            image
        } else {
            imageops::resize(&image, width, height, imageops::FilterType::Lanczos3)
        };
        let texture = sink.upload_rgba(&image)?;
        log::info!("loaded image {path} at {width}x{height}");
        self.textures.insert(key, texture);
        Ok(texture)
    }

    /// Upload in-memory pixels once per key.
    pub fn load_rgba(
        &mut self,
        sink: &mut dyn TextureSink,
        key: &str,
        image: &RgbaImage,
    ) -> Result<Texture> {
        if let Some(texture) = self.textures.get(key) {
            return Ok(*texture);
        }
        let texture = sink.upload_rgba(image)?;
        self.textures.insert(key.to_string(), texture);
        Ok(texture)
    }

    pub fn get_texture(&self, key: &str) -> Option<Texture> {
        self.textures.get(key).copied()
    }

    pub fn has_texture(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }

    /// Forget every cached entry; the next load reads from disk again.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.sheets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureHandle;
    use image::Rgba;

    #[derive(Default)]
    struct CountingSink {
        uploads: Vec<(u32, u32)>,
    }

    impl TextureSink for CountingSink {
        fn upload_rgba(&mut self, image: &RgbaImage) -> Result<Texture> {
            self.uploads.push(image.dimensions());
            let id = self.uploads.len() as u32;
            Ok(Texture::new(TextureHandle::from_raw(id), image.width(), image.height()))
        }
    }

    /// 3x2 grid of 4x4 cells, each cell filled with its index as red.
    fn sheet() -> RgbaImage {
        RgbaImage::from_fn(12, 8, |x, y| {
            let index = (y / 4) * 3 + x / 4;
            Rgba([index as u8, 0, 0, 255])
        })
    }

    #[test]
    fn test_slices_row_by_row() {
        let frames = slice_grid(&sheet(), SheetGrid::new(3, 2, 4, 4)).unwrap();
        assert_eq!(frames.len(), 6);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.dimensions(), (4, 4));
            assert_eq!(frame.get_pixel(0, 0)[0], i as u8);
            assert_eq!(frame.get_pixel(3, 3)[0], i as u8);
        }
    }

    #[test]
    fn test_partial_grid_is_allowed() {
        let frames = slice_grid(&sheet(), SheetGrid::new(2, 1, 4, 4)).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_invalid_grids_rejected() {
        for grid in [
            SheetGrid::new(0, 2, 4, 4),
            SheetGrid::new(3, 2, 0, 4),
            SheetGrid::new(4, 2, 4, 4),
            SheetGrid::new(3, 3, 4, 4),
        ] {
            assert!(
                matches!(slice_grid(&sheet(), grid), Err(SpriteError::InvalidGrid { .. })),
                "{grid:?}"
            );
        }
    }

    #[test]
    fn test_rgba_upload_is_cached() {
        let mut assets = AssetManager::new();
        let mut sink = CountingSink::default();
        let a = assets.load_rgba(&mut sink, "white", &sheet()).unwrap();
        let b = assets.load_rgba(&mut sink, "white", &sheet()).unwrap();
        assert_eq!(a, b);
        assert_eq!(sink.uploads.len(), 1);
        assert!(assets.has_texture("white"));

        assets.clear();
        assert!(assets.get_texture("white").is_none());
    }

    #[test]
    fn test_sheet_and_sized_from_disk() {
        let path = std::env::temp_dir().join(format!("sprite2d-sheet-{}.png", std::process::id()));
        sheet().save(&path).unwrap();
        let path = path.to_string_lossy().into_owned();

        let mut assets = AssetManager::new();
        let mut sink = CountingSink::default();
        let frames = assets.load_sheet(&mut sink, &path, SheetGrid::new(3, 2, 4, 4)).unwrap();
        let again = assets.load_sheet(&mut sink, &path, SheetGrid::new(3, 2, 4, 4)).unwrap();
        assert_eq!(frames, again);
        assert_eq!(sink.uploads.len(), 6);

        let big = assets.load_sized(&mut sink, &path, 24, 16).unwrap();
        assert_eq!((big.width, big.height), (24, 16));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut assets = AssetManager::new();
        let mut sink = CountingSink::default();
        assert!(assets.load_sized(&mut sink, "does/not/exist.png", 4, 4).is_err());
        assert!(sink.uploads.is_empty());
    }
}
