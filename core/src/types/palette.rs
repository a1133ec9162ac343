use std::collections::HashMap;

use image::Rgba;

use crate::error::PaletteError;

pub const PALETTE_SIZE: usize = 256;

/// A 256-colour palette. Entry 0 is the transparent key and is never drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgba<u8>; PALETTE_SIZE],
}

impl Palette {
    pub fn new(colors: [Rgba<u8>; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Builds a palette from 256 packed `r, g, b` triples.
    pub fn from_rgb_bytes(data: &[u8]) -> Result<Self, PaletteError> {
        let expected = PALETTE_SIZE * 3;
        if data.len() < expected {
            return Err(PaletteError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }

        let mut colors = [Rgba([0, 0, 0, 255]); PALETTE_SIZE];
        for (color, rgb) in colors.iter_mut().zip(data.chunks_exact(3)) {
            *color = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        }
        Ok(Self { colors })
    }

    #[inline]
    pub fn color(&self, index: u8) -> Rgba<u8> {
        self.colors[index as usize]
    }

    pub fn set_color(&mut self, index: u8, color: Rgba<u8>) {
        self.colors[index as usize] = color;
    }
}

/// Lookup from a tile or wall key to the palette it is drawn with.
pub trait PaletteLookup {
    fn palette(&self, key: usize) -> Option<&Palette>;
}

/// Palette key for a 0-based floor tile index. Floor tables are offset by two.
#[inline]
pub fn floor_palette_key(tile: usize) -> usize {
    tile + 2
}

/// Palette key for a wall index. Wall tables are offset by one.
#[inline]
pub fn wall_palette_key(wall: usize) -> usize {
    wall + 1
}

/// A set of palettes plus the table assigning them to keys.
///
/// Keys without an explicit entry use palette 0.
#[derive(Debug, Clone, Default)]
pub struct PaletteTable {
    palettes: Vec<Palette>,
    entries: HashMap<usize, usize>,
}

impl PaletteTable {
    pub fn new(palettes: Vec<Palette>) -> Self {
        Self {
            palettes,
            entries: HashMap::new(),
        }
    }

    /// Assigns `palette_id` to every key in `first..=last`.
    pub fn assign_range(&mut self, first: usize, last: usize, palette_id: usize) {
        for key in first..=last {
            self.entries.insert(key, palette_id);
        }
    }

    pub fn assign(&mut self, key: usize, palette_id: usize) {
        self.entries.insert(key, palette_id);
    }

    pub fn palette_count(&self) -> usize {
        self.palettes.len()
    }
}

impl PaletteLookup for PaletteTable {
    fn palette(&self, key: usize) -> Option<&Palette> {
        let id = self.entries.get(&key).copied().unwrap_or(0);
        self.palettes.get(id)
    }
}
