//! Data types module - the map grid, selection blocks and palettes the renderer consumes

mod grid;
mod palette;
mod selection;

pub use grid::{Grid, MapTile, dimension_candidates, tile_index};
pub use palette::{
    PALETTE_SIZE, Palette, PaletteLookup, PaletteTable, floor_palette_key, wall_palette_key,
};
pub use selection::{SelectionBuffer, SelectionRect};
