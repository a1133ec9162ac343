use thiserror::Error;

/// Failures raised while turning indexed sprite data into pixels.
///
/// Only buffer-bounds violations live here: missing sprites, out-of-range
/// indices and empty selections are skipped by the compositor instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("raw buffer for a {width}x{height} image holds {actual} bytes, expected at least {expected}")]
    BufferTooShort {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid of {width}x{height} needs {expected} tiles, got {actual}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{width}x{height} is not a factor pair of {count} tiles")]
    NotAFactor {
        width: usize,
        height: usize,
        count: usize,
    },
    #[error("grid dimensions must be non-zero")]
    ZeroDimension,
    #[error("{width}x{height} tiles do not fit in memory")]
    TooLarge { width: usize, height: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection width must be non-zero")]
    ZeroWidth,
    #[error("{len} selection tiles do not fill rows of width {width}")]
    Ragged { width: usize, len: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("palette data holds {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },
}
