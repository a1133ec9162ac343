//! Constants module - tileset geometry, layer flags and the legacy numeric rules
//! the renderer has to honour.

use bitflags::bitflags;

// =============================================================================
// Tileset geometry
// =============================================================================

/// Width of a floor tile in the stock tileset.
pub const TILE_WIDTH: u32 = 56;
/// Height of a floor tile in the stock tileset.
pub const TILE_HEIGHT: u32 = 27;

/// Default editor viewport.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 560;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 480;

// =============================================================================
// Wall placement
// =============================================================================

/// Wall indices below this are old placeholder tiles and are never drawn.
pub const MIN_WALL_INDEX: u16 = 13;

/// Walls with `index % WALL_SENTINEL_MODULUS <= 1` are resolved but never blitted.
pub const WALL_SENTINEL_MODULUS: u16 = 10000;

/// Headroom above the floor anchor reserved for tall wall sprites.
pub const WALL_HEADROOM: i32 = 150;

/// Extra vertical slack on the wall cull test; walls can be far taller than a tile.
pub const WALL_CULL_MARGIN: i32 = 200;

// =============================================================================
// Wall attribute bytes (sotp table)
// =============================================================================

/// Attribute bit: blend the wall additively when transparency is on.
pub const ATTR_TRANSLUCENT: u8 = 0x80;
/// Attribute value: the wall blocks movement.
pub const ATTR_COLLISION: u8 = 0x0F;

// =============================================================================
// Highlight / overlay colours
// =============================================================================

pub const HIGHLIGHT_RED: u8 = 25;
pub const HIGHLIGHT_GREEN: u8 = 25;
pub const HIGHLIGHT_BLUE: u8 = 50;

pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
pub const COLLISION_OVERLAY: [u8; 4] = [255, 255, 255, 128];
pub const SHEET_SELECTION_OUTLINE: [u8; 4] = [255, 0, 0, 255];

// =============================================================================
// Picker sheets
// =============================================================================

pub const FLOOR_SHEET_COLUMNS: u32 = 3;
pub const WALL_SHEET_COLUMNS: u32 = 6;
pub const WALL_SHEET_SPACING: u32 = 28;
pub const WALL_SHEET_WIDTH: u32 = WALL_SHEET_COLUMNS * WALL_SHEET_SPACING;
pub const WALL_SHEET_MIN_ROW_HEIGHT: u32 = 20;

bitflags! {
    /// Which map layers are drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerVisibility: u8 {
        const FLOOR = 1 << 0;
        const LEFT_WALL = 1 << 1;
        const RIGHT_WALL = 1 << 2;
    }
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self::all()
    }
}
