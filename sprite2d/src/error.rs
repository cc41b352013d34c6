//! Error types for sprite and asset misuse.

use thiserror::Error;

/// Errors raised when the library is used in a way it does not support.
///
/// These are programmer errors: they are reported immediately and the
/// operation that raised them has no effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpriteError {
    /// A sprite's size is dictated by its image once one is attached.
    #[error("cannot set {dimension} of a sprite that has an image")]
    SizeLockedByImage { dimension: &'static str },

    /// Animated entities need at least one frame to size their sprite.
    #[error("frame set for {0} is empty")]
    EmptyFrameSet(&'static str),

    /// Sprite sheet grid does not describe any cell inside the sheet.
    #[error(
        "invalid sheet grid {columns}x{rows} of {cell_width}x{cell_height} \
         for a {sheet_width}x{sheet_height} sheet"
    )]
    InvalidGrid {
        columns: u32,
        rows: u32,
        cell_width: u32,
        cell_height: u32,
        sheet_width: u32,
        sheet_height: u32,
    },

    /// Navigation to a screen that was never registered.
    #[error("unknown screen: {0}")]
    UnknownScreen(String),
}

/// Result type for sprite operations.
pub type Result<T> = std::result::Result<T, SpriteError>;
