use crate::error::SelectionError;
use crate::types::grid::{Grid, MapTile};

/// Inclusive rectangle of grid cells, normalised so `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl SelectionRect {
    /// Builds a rectangle from the drag start and end cells, in any order.
    pub fn from_corners(start: (i32, i32), end: (i32, i32)) -> Self {
        Self {
            min_x: start.0.min(end.0),
            min_y: start.1.min(end.1),
            max_x: start.0.max(end.0),
            max_y: start.1.max(end.1),
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }
}

/// A copied block of cells, used as the paint brush and for the live
/// preview while hovering. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionBuffer {
    width: usize,
    tiles: Vec<MapTile>,
}

impl SelectionBuffer {
    pub fn new(width: usize, tiles: Vec<MapTile>) -> Result<Self, SelectionError> {
        if width == 0 {
            return Err(SelectionError::ZeroWidth);
        }
        if tiles.is_empty() || tiles.len() % width != 0 {
            return Err(SelectionError::Ragged {
                width,
                len: tiles.len(),
            });
        }

        Ok(Self { width, tiles })
    }

    /// A 1x1 brush, as produced by picking a tile from a picker sheet.
    pub fn single(tile: MapTile) -> Self {
        Self {
            width: 1,
            tiles: vec![tile],
        }
    }

    /// Copies the cells covered by `rect` out of `grid`.
    ///
    /// Cells of the rectangle that fall outside the grid are captured as
    /// empty tiles, so the buffer always has the rectangle's shape.
    pub fn capture(grid: &Grid, rect: SelectionRect) -> Self {
        let width = rect.width();
        let mut tiles = Vec::with_capacity(width * rect.height());

        for y in rect.min_y..=rect.max_y {
            for x in rect.min_x..=rect.max_x {
                let tile = if grid.contains(x, y) {
                    grid.tile(x as usize, y as usize)
                        .copied()
                        .unwrap_or_default()
                } else {
                    MapTile::default()
                };
                tiles.push(tile);
            }
        }

        Self { width, tiles }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.tiles.len() / self.width
    }

    pub fn tiles(&self) -> &[MapTile] {
        &self.tiles
    }

    /// Tile at an offset relative to the buffer's top-left corner.
    pub fn tile_at(&self, dx: i32, dy: i32) -> Option<&MapTile> {
        if dx < 0 || dy < 0 {
            return None;
        }
        let (dx, dy) = (dx as usize, dy as usize);
        if dx >= self.width || dy >= self.height() {
            return None;
        }
        self.tiles.get(dx + dy * self.width)
    }
}
