//! Collaborators the renderer reads from: the floor tileset, the wall sprite
//! archive and the wall attribute table.
//!
//! Decoding the on-disk archive formats happens elsewhere; these traits only
//! describe what the renderer needs once the raw index bytes exist.

use std::collections::HashMap;

use crate::constants::{ATTR_COLLISION, ATTR_TRANSLUCENT};
use crate::render::IndexedImage;
use crate::types::PaletteLookup;

/// Floor tileset: fixed-size tiles addressed by 0-based index.
pub trait TileSource {
    fn tile_count(&self) -> usize;
    fn tile_width(&self) -> u32;
    fn tile_height(&self) -> u32;
    fn tile_data(&self, index: usize) -> Option<&[u8]>;
}

/// In-memory tileset.
#[derive(Debug, Clone, Default)]
pub struct Tileset {
    tile_width: u32,
    tile_height: u32,
    tiles: Vec<Vec<u8>>,
}

impl Tileset {
    pub fn new(tile_width: u32, tile_height: u32, tiles: Vec<Vec<u8>>) -> Self {
        Self {
            tile_width,
            tile_height,
            tiles,
        }
    }
}

impl TileSource for Tileset {
    fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    fn tile_width(&self) -> u32 {
        self.tile_width
    }

    fn tile_height(&self) -> u32 {
        self.tile_height
    }

    fn tile_data(&self, index: usize) -> Option<&[u8]> {
        self.tiles.get(index).map(Vec::as_slice)
    }
}

/// Source of wall sprites by wall index.
pub trait WallSource {
    /// Returns `None` when the archive has no sprite for `index`; callers
    /// treat that as "nothing to draw".
    fn wall_sprite(&self, index: usize) -> Option<IndexedImage>;

    fn has_wall(&self, index: usize) -> bool {
        self.wall_sprite(index).is_some()
    }
}

/// Archive entry name of a wall sprite, e.g. `stc00042.hpf`.
pub fn wall_file_name(index: usize) -> String {
    format!("stc{index:05}.hpf")
}

/// Named-entry sprite archive (the decoded contents of a `.dat` file).
pub trait SpriteArchive {
    fn sprite(&self, name: &str) -> Option<IndexedImage>;

    fn contains(&self, name: &str) -> bool {
        self.sprite(name).is_some()
    }
}

/// Adapts a [`SpriteArchive`] into a [`WallSource`] using the `stcNNNNN.hpf`
/// naming scheme.
#[derive(Debug, Clone)]
pub struct ArchiveWalls<A> {
    archive: A,
}

impl<A: SpriteArchive> ArchiveWalls<A> {
    pub fn new(archive: A) -> Self {
        Self { archive }
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }
}

impl<A: SpriteArchive> WallSource for ArchiveWalls<A> {
    fn wall_sprite(&self, index: usize) -> Option<IndexedImage> {
        self.archive.sprite(&wall_file_name(index))
    }

    fn has_wall(&self, index: usize) -> bool {
        self.archive.contains(&wall_file_name(index))
    }
}

/// Sprite archive held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: HashMap<String, IndexedImage>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, sprite: IndexedImage) {
        self.entries.insert(name.into(), sprite);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SpriteArchive for MemoryArchive {
    fn sprite(&self, name: &str) -> Option<IndexedImage> {
        self.entries.get(name).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Approximates the highest wall index present in `walls`.
///
/// Walks a shrinking step (40000, then divided by 1.25 each probe) up or down
/// from 50000 depending on whether the probed index exists. The answer can be
/// off by a few indices; it only bounds the wall picker.
pub fn probe_wall_count(walls: &dyn WallSource) -> usize {
    let mut max_index: i64 = 50000;
    let mut step: f64 = 40000.0;

    while step > 1.0 {
        let present = max_index >= 0 && walls.has_wall(max_index as usize);
        if present {
            max_index += step as i64;
        } else {
            max_index -= step as i64;
        }
        step /= 1.25;
    }

    log::debug!("Probed wall archive upper bound: {max_index}");
    max_index.max(0) as usize
}

/// Per-wall attribute bytes (`sotp.dat`). Entry `i` describes wall `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    bytes: Vec<u8>,
}

impl AttributeTable {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Table slot describing `wall`, or `None` for wall 0.
    #[inline]
    pub fn slot(wall: usize) -> Option<usize> {
        wall.checked_sub(1)
    }

    pub fn attribute(&self, wall: usize) -> Option<u8> {
        Self::slot(wall)
            .and_then(|slot| self.bytes.get(slot).copied())
    }

    /// Wall should be blended additively when transparency is on.
    pub fn is_translucent(&self, wall: usize) -> bool {
        self.attribute(wall)
            .is_some_and(|attr| attr & ATTR_TRANSLUCENT == ATTR_TRANSLUCENT)
    }

    /// Wall blocks movement.
    pub fn is_collision(&self, wall: usize) -> bool {
        self.attribute(wall) == Some(ATTR_COLLISION)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Everything `render_map` reads besides the grid.
#[derive(Clone, Copy)]
pub struct MapAssets<'a> {
    pub tiles: &'a dyn TileSource,
    pub floor_palettes: &'a dyn PaletteLookup,
    pub wall_palettes: &'a dyn PaletteLookup,
    pub walls: &'a dyn WallSource,
    pub attributes: &'a AttributeTable,
}
