use crate::constants::{WALL_CULL_MARGIN, WALL_HEADROOM};

/// Grid-to-screen transform for one frame.
///
/// Moving `+1` in grid x steps `(tw / 2, (th + 1) / 2)` down-right on screen;
/// moving `+1` in grid y shifts the whole row's origin by `(-tw / 2, (th + 1) / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    tile_width: i32,
    tile_height: i32,
    viewport_width: i32,
    viewport_height: i32,
    hscroll: i32,
    vscroll: i32,
}

impl Projection {
    pub fn new(
        tile_width: u32,
        tile_height: u32,
        viewport_width: u32,
        viewport_height: u32,
        hscroll: i32,
        vscroll: i32,
    ) -> Self {
        Self {
            tile_width: tile_width as i32,
            tile_height: tile_height as i32,
            viewport_width: viewport_width as i32,
            viewport_height: viewport_height as i32,
            hscroll,
            vscroll,
        }
    }

    #[inline]
    pub fn tile_width(&self) -> i32 {
        self.tile_width
    }

    #[inline]
    pub fn tile_height(&self) -> i32 {
        self.tile_height
    }

    #[inline]
    pub fn x_step(&self) -> i32 {
        self.tile_width / 2
    }

    #[inline]
    pub fn y_step(&self) -> i32 {
        (self.tile_height + 1) / 2
    }

    /// Screen origin of row `y`, i.e. the anchor of cell `(0, y)`.
    #[inline]
    pub fn row_origin(&self, y: i32) -> (i32, i32) {
        let x0 = ((self.viewport_width / 2) - 1) - self.tile_width / 2 + 1 - self.hscroll;
        let y0 = -self.vscroll;
        (x0 - y * self.x_step(), y0 + y * self.y_step())
    }

    /// Top-left screen position of the floor tile at `(x, y)`.
    pub fn floor_anchor(&self, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.row_origin(y);
        (ox + x * self.x_step(), oy + x * self.y_step())
    }

    /// Whether a floor tile anchored at `anchor` can touch the viewport.
    pub fn floor_visible(&self, anchor: (i32, i32)) -> bool {
        let (ax, ay) = anchor;
        ax >= -self.tile_width
            && ay >= -self.tile_height
            && ax < self.viewport_width
            && ay < self.viewport_height
    }

    /// Reference point used to cull the walls of cell `(x, y)`.
    pub fn wall_probe(&self, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.row_origin(y);
        (
            ox + x * self.x_step(),
            oy + (x + 1) * self.y_step() - WALL_HEADROOM + (self.tile_height + 1) / 2,
        )
    }

    /// Wall cull test. The vertical range is widened because wall sprites
    /// can be several tiles tall.
    pub fn walls_visible(&self, probe: (i32, i32)) -> bool {
        let (px, py) = probe;
        px >= -self.tile_width
            && py >= -WALL_CULL_MARGIN
            && px < self.viewport_width
            && py < self.viewport_height + WALL_CULL_MARGIN
    }

    /// Top-left position of a left wall sprite `sprite_height` pixels tall,
    /// bottom edge resting on the floor tile.
    pub fn left_wall_anchor(&self, x: i32, y: i32, sprite_height: u32) -> (i32, i32) {
        let (ox, oy) = self.row_origin(y);
        (ox + x * self.x_step(), self.wall_top(oy, x, sprite_height))
    }

    /// Right walls sit half a tile further right than left walls.
    pub fn right_wall_anchor(&self, x: i32, y: i32, sprite_height: u32) -> (i32, i32) {
        let (ox, oy) = self.row_origin(y);
        (ox + (x + 1) * self.x_step(), self.wall_top(oy, x, sprite_height))
    }

    #[inline]
    fn wall_top(&self, row_y: i32, x: i32, sprite_height: u32) -> i32 {
        row_y + (x + 1) * self.y_step() - sprite_height as i32 + (self.tile_height + 1) / 2
    }

    /// Top vertex of the collision marker diamond for cell `(x, y)`.
    pub fn diamond_top(&self, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.row_origin(y);
        (
            ox + x * self.tile_width / 2 + self.tile_width / 2,
            oy + x * (self.tile_height + 1) / 2,
        )
    }

    /// Converts a viewport pixel back to the grid cell under it.
    ///
    /// Only the grid height is needed: the lattice is centred on the
    /// viewport, so the vertical intercepts depend on it alone. The result
    /// may lie outside the grid (or be negative); callers bounds-check it.
    /// The inverse is exact for tilesets where `tw == 2 * (th + 1)`.
    pub fn screen_to_cell(&self, px: i32, py: i32, grid_height: usize) -> (i32, i32) {
        let tile_pitch = self.tile_height + 1;
        let shift = grid_height as f64 / 2.0;

        let click_x = (px as f64 + self.hscroll as f64 + shift * self.tile_width as f64
            - (self.viewport_width / 2) as f64) as i32;
        let click_y = py + self.vscroll;

        let intercept = ((tile_pitch as f64 * grid_height as f64) / 2.0) as i32;
        let y0_x = (intercept as f64 - 0.5 * click_x as f64) as i32;
        let y0_y = (-intercept as f64 + 0.5 * click_x as f64) as i32;

        ((click_y - y0_x) / tile_pitch, (click_y - y0_y) / tile_pitch)
    }
}
