use image::{RgbaImage, imageops};

use crate::error::RenderError;
use crate::sources::TileSource;
use crate::types::Palette;

/// Storage order of raw index bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// `data[y * width + x]`. Tiles and HPF wall sprites.
    #[default]
    RowMajor,
    /// `data[x * height + y]`. EPF frames; the decoded image is rotated 90
    /// degrees and mirrored horizontally afterwards, so it comes out
    /// `height x width`.
    ColumnMajor,
}

/// 16-bit packed output layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packed16 {
    Rgb565,
    Rgb555,
}

impl Packed16 {
    #[inline]
    pub fn pack(self, r: u8, g: u8, b: u8) -> u16 {
        let (r, g, b) = (r as u16, g as u16, b as u16);
        match self {
            Packed16::Rgb565 => ((r & 0xF8) << 8) + ((g & 0xFC) << 3) + (b >> 3),
            Packed16::Rgb555 => ((r & 0xF8) << 7) + ((g & 0xF8) << 2) + (b >> 3),
        }
    }
}

/// A palette-indexed sprite as handed over by the decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    orientation: Orientation,
    data: Vec<u8>,
}

impl IndexedImage {
    /// Wraps raw index bytes.
    ///
    /// # Errors
    /// * [`RenderError::BufferTooShort`] if `data` holds fewer than
    ///   `width * height` bytes. A short buffer means the upstream decoder is
    ///   broken, so it is refused here rather than rendered partially.
    pub fn new(
        width: u32,
        height: u32,
        orientation: Orientation,
        data: Vec<u8>,
    ) -> Result<Self, RenderError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            orientation,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Expands the sprite to RGBA. Index 0 pixels stay fully transparent.
    pub fn render(&self, palette: &Palette) -> RgbaImage {
        expand(
            self.width,
            self.height,
            &self.data,
            palette,
            self.orientation,
        )
    }

    /// Expands the sprite into a 16-bit packed buffer (row stride = output width).
    /// Index 0 pixels stay `0`.
    pub fn render_packed(&self, palette: &Palette, format: Packed16) -> Vec<u16> {
        let (out_w, out_h) = match self.orientation {
            Orientation::RowMajor => (self.width, self.height),
            Orientation::ColumnMajor => (self.height, self.width),
        };
        let mut out = vec![0u16; out_w as usize * out_h as usize];

        for y in 0..out_h as usize {
            for x in 0..out_w as usize {
                // After rotate + mirror the column-major data reads back as rows
                // of `height` bytes.
                let color_index = self.data[y * out_w as usize + x];
                if color_index == 0 {
                    continue;
                }
                let c = palette.color(color_index);
                out[y * out_w as usize + x] = format.pack(c[0], c[1], c[2]);
            }
        }

        out
    }
}

fn check_len(width: u32, height: u32, actual: usize) -> Result<(), RenderError> {
    let expected = width as usize * height as usize;
    if actual < expected {
        return Err(RenderError::BufferTooShort {
            width,
            height,
            expected,
            actual,
        });
    }
    Ok(())
}

fn expand(
    width: u32,
    height: u32,
    data: &[u8],
    palette: &Palette,
    orientation: Orientation,
) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return match orientation {
            Orientation::RowMajor => image,
            Orientation::ColumnMajor => RgbaImage::new(height, width),
        };
    }

    for (y, row) in image.chunks_exact_mut(w * 4).enumerate() {
        for x in 0..w {
            let color_index = match orientation {
                Orientation::RowMajor => data[y * w + x],
                Orientation::ColumnMajor => data[x * h + y],
            };
            if color_index == 0 {
                continue;
            }
            row[x * 4..x * 4 + 4].copy_from_slice(&palette.color(color_index).0);
        }
    }

    match orientation {
        Orientation::RowMajor => image,
        Orientation::ColumnMajor => {
            let mut rotated = imageops::rotate90(&image);
            imageops::flip_horizontal_in_place(&mut rotated);
            rotated
        }
    }
}

/// Renders a single floor tile into a standalone image.
///
/// # Returns
/// * `Ok(None)` if `index` is not in the tileset.
pub fn render_tile(
    tiles: &dyn TileSource,
    index: usize,
    palette: &Palette,
) -> Result<Option<RgbaImage>, RenderError> {
    let Some(data) = tiles.tile_data(index) else {
        return Ok(None);
    };
    let (width, height) = (tiles.tile_width(), tiles.tile_height());
    check_len(width, height, data.len())?;

    Ok(Some(expand(
        width,
        height,
        data,
        palette,
        Orientation::RowMajor,
    )))
}
