//! Picker sheets: the tile palettes shown beside the map, drawn through the
//! same caches as the map itself.

use image::{Rgba, RgbaImage};

use crate::constants::{
    FLOOR_SHEET_COLUMNS, SHEET_SELECTION_OUTLINE, WALL_SHEET_COLUMNS, WALL_SHEET_MIN_ROW_HEIGHT,
    WALL_SHEET_SPACING, WALL_SHEET_WIDTH,
};
use crate::error::RenderError;
use crate::render::cache::{SpriteCache, resolve};
use crate::render::compositor::{MapRenderer, blit_opaque, populate_floor, populate_wall};
use crate::sources::{TileSource, WallSource};
use crate::types::PaletteLookup;

/// A rendered wall picker page.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSheet {
    pub image: RgbaImage,
    /// First wall index on the page.
    pub first: usize,
    /// Height of each row of six walls, top to bottom.
    pub row_heights: Vec<u32>,
}

impl WallSheet {
    /// Wall index under a click at `(px, py)`, if it lands on a row.
    pub fn wall_at(&self, px: u32, py: u32) -> Option<usize> {
        if px >= WALL_SHEET_WIDTH {
            return None;
        }
        let column = (px / WALL_SHEET_SPACING) as usize;

        let mut top = 0;
        for (row, height) in self.row_heights.iter().enumerate() {
            if py < top + height {
                return Some(self.first + row * WALL_SHEET_COLUMNS as usize + column);
            }
            top += height;
        }
        None
    }

    /// Wall index that starts the page after this one.
    pub fn next_first(&self) -> usize {
        self.first + self.row_heights.len() * WALL_SHEET_COLUMNS as usize
    }
}

/// Floor tile index under a click on a floor sheet starting at `first`.
pub fn floor_sheet_tile_at(
    first: usize,
    tile_width: u32,
    tile_height: u32,
    px: u32,
    py: u32,
) -> Option<usize> {
    if tile_width == 0 || px >= tile_width * FLOOR_SHEET_COLUMNS {
        return None;
    }
    let row = (py / (tile_height + 1)) as usize;
    let column = (px / tile_width) as usize;
    Some(first + row * FLOOR_SHEET_COLUMNS as usize + column)
}

impl<C: SpriteCache> MapRenderer<C> {
    /// Renders floor tiles `first..first + count`, three per row.
    ///
    /// Indices past the end of the tileset leave their slot empty. The
    /// `selected` tile, if on the page, is drawn highlighted.
    pub fn render_floor_sheet(
        &mut self,
        tiles: &dyn TileSource,
        palettes: &dyn PaletteLookup,
        first: usize,
        count: usize,
        selected: Option<usize>,
    ) -> Result<RgbaImage, RenderError> {
        let (tw, th) = (tiles.tile_width(), tiles.tile_height());
        let row_pitch = th + 1;
        let rows = count.div_ceil(FLOOR_SHEET_COLUMNS as usize) as u32;
        let mut sheet = RgbaImage::new(tw * FLOOR_SHEET_COLUMNS, rows * row_pitch);

        for slot in 0..count {
            let index = first + slot;
            if index >= tiles.tile_count() {
                break;
            }
            let sprite = resolve(
                &mut self.caches.floor,
                &mut self.caches.floor_highlighted,
                index,
                selected == Some(index),
                || populate_floor(tiles, palettes, index),
            )?;
            let Some(sprite) = sprite else {
                continue;
            };

            let column = slot as u32 % FLOOR_SHEET_COLUMNS;
            let row = slot as u32 / FLOOR_SHEET_COLUMNS;
            blit_opaque(
                &mut sheet,
                sprite,
                ((column * tw) as i32, (row * row_pitch) as i32),
            );
        }

        Ok(sheet)
    }

    /// Renders walls from `first` onwards, six per row, until `height` pixels
    /// are filled.
    ///
    /// Each row is as tall as its tallest wall (at least 20 px) and starts
    /// with a black divider line. The `selected` wall gets a red outline.
    pub fn render_wall_sheet(
        &mut self,
        walls: &dyn WallSource,
        palettes: &dyn PaletteLookup,
        first: usize,
        height: u32,
        selected: Option<usize>,
    ) -> Result<WallSheet, RenderError> {
        let mut image = RgbaImage::new(WALL_SHEET_WIDTH, height);
        let mut row_heights = Vec::new();
        let mut top = 0u32;
        let mut index = first;

        while top < height {
            let mut row_height = WALL_SHEET_MIN_ROW_HEIGHT;

            for column in 0..WALL_SHEET_COLUMNS {
                let wall = index + column as usize;
                let x = column * WALL_SHEET_SPACING;
                let sprite = resolve(
                    &mut self.caches.wall,
                    &mut self.caches.wall_highlighted,
                    wall,
                    false,
                    || populate_wall(walls, palettes, wall),
                )?;
                let sprite_height = sprite.map_or(0, |s| s.height());
                if let Some(sprite) = sprite {
                    blit_opaque(&mut image, sprite, (x as i32, top as i32));
                }
                row_height = row_height.max(sprite_height);

                if selected == Some(wall) {
                    outline(
                        &mut image,
                        (x, top + 1),
                        WALL_SHEET_SPACING - 1,
                        sprite_height,
                        SHEET_SELECTION_OUTLINE,
                    );
                }
            }

            draw_hline(&mut image, top, [0, 0, 0, 255]);
            row_heights.push(row_height);
            top += row_height;
            index += WALL_SHEET_COLUMNS as usize;
        }

        log::debug!(
            "Rendered wall sheet from {first}: {} rows in {height} px",
            row_heights.len()
        );

        Ok(WallSheet {
            image,
            first,
            row_heights,
        })
    }
}

fn put_clipped(image: &mut RgbaImage, x: u32, y: u32, color: [u8; 4]) {
    if x < image.width() && y < image.height() {
        image.put_pixel(x, y, Rgba(color));
    }
}

fn draw_hline(image: &mut RgbaImage, y: u32, color: [u8; 4]) {
    for x in 0..image.width() {
        put_clipped(image, x, y, color);
    }
}

/// One-pixel rectangle outline covering `top_left..=top_left + (width, height)`.
fn outline(image: &mut RgbaImage, top_left: (u32, u32), width: u32, height: u32, color: [u8; 4]) {
    let (x0, y0) = top_left;
    let (x1, y1) = (x0 + width, y0 + height);
    for x in x0..=x1 {
        put_clipped(image, x, y0, color);
        put_clipped(image, x, y1, color);
    }
    for y in y0..=y1 {
        put_clipped(image, x0, y, color);
        put_clipped(image, x1, y, color);
    }
}
