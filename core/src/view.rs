//! Editor-side view state. Mutated by input handling between frames and
//! turned into an immutable [`RenderRequest`] once per frame.

use crate::render::{EditMode, HoverPreview, Projection, RenderRequest};
use crate::settings::ViewSettings;
use crate::sources::TileSource;
use crate::types::{Grid, MapTile, SelectionBuffer, SelectionRect};

/// What a click on the map does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    /// Stamp the brush; its footprint is previewed under the cursor.
    #[default]
    Paint,
    /// Copy the clicked tile into a 1x1 brush.
    Pick,
    /// Drag out a rectangle and copy it into the brush.
    Select,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub settings: ViewSettings,
    pub hscroll: i32,
    pub vscroll: i32,
    pub edit_mode: EditMode,
    pub tool: Tool,
    selection: Option<SelectionRect>,
    drag_start: Option<(i32, i32)>,
    hover: Option<(i32, i32)>,
    brush: Option<SelectionBuffer>,
}

impl ViewState {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    pub fn hover(&self) -> Option<(i32, i32)> {
        self.hover
    }

    pub fn brush(&self) -> Option<&SelectionBuffer> {
        self.brush.as_ref()
    }

    pub fn set_brush(&mut self, brush: SelectionBuffer) {
        self.brush = Some(brush);
    }

    /// Snapshot of everything the compositor needs for the next frame.
    pub fn request(&self) -> RenderRequest<'_> {
        let preview = match (self.tool, self.hover, self.brush.as_ref()) {
            (Tool::Paint, Some(origin), Some(brush)) => Some(HoverPreview { origin, brush }),
            _ => None,
        };

        RenderRequest {
            viewport_width: self.settings.viewport_width,
            viewport_height: self.settings.viewport_height,
            hscroll: self.hscroll,
            vscroll: self.vscroll,
            layers: self.settings.layers(),
            edit_mode: self.edit_mode,
            transparency: self.settings.transparency,
            draw_empty_walls: self.settings.draw_empty_walls,
            collision_overlay: self.settings.collision_overlay,
            selection: self.selection,
            preview,
        }
    }

    fn projection(&self, tiles: &dyn TileSource) -> Projection {
        Projection::new(
            tiles.tile_width(),
            tiles.tile_height(),
            self.settings.viewport_width,
            self.settings.viewport_height,
            self.hscroll,
            self.vscroll,
        )
    }

    /// Pans by whole tiles: one tile width horizontally, one row pitch
    /// (`tile_height + 1`) vertically.
    pub fn scroll_by_tiles(&mut self, dx: i32, dy: i32, tiles: &dyn TileSource) {
        self.hscroll += dx * tiles.tile_width() as i32;
        self.vscroll += dy * (tiles.tile_height() as i32 + 1);
    }

    /// Grid cell under viewport pixel `(px, py)`, if it is on the map.
    pub fn cell_at(
        &self,
        px: i32,
        py: i32,
        grid: &Grid,
        tiles: &dyn TileSource,
    ) -> Option<(i32, i32)> {
        let (x, y) = self.projection(tiles).screen_to_cell(px, py, grid.height());
        grid.contains(x, y).then_some((x, y))
    }

    /// Tracks the cursor. Off-map positions clear the hover cell.
    pub fn hover_at(&mut self, px: i32, py: i32, grid: &Grid, tiles: &dyn TileSource) {
        self.hover = self.cell_at(px, py, grid, tiles);
        if let (Some(start), Some(end)) = (self.drag_start, self.hover) {
            self.selection = Some(SelectionRect::from_corners(start, end));
        }
    }

    pub fn leave(&mut self) {
        self.hover = None;
    }

    pub fn begin_selection(&mut self, cell: (i32, i32)) {
        self.drag_start = Some(cell);
        self.selection = Some(SelectionRect::from_corners(cell, cell));
    }

    /// Finishes a drag and copies the selected block into the brush.
    pub fn end_selection(&mut self, grid: &Grid) -> Option<&SelectionBuffer> {
        self.drag_start = None;
        let rect = self.selection?;
        let captured = SelectionBuffer::capture(grid, rect);
        log::debug!(
            "Captured {}x{} selection at ({}, {})",
            captured.width(),
            captured.height(),
            rect.min_x,
            rect.min_y
        );
        self.brush = Some(captured);
        self.brush.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.drag_start = None;
        self.selection = None;
    }

    /// Replaces the brush with the tile at `cell`, keeping only the layers
    /// the current edit mode works on.
    pub fn pick(&mut self, grid: &Grid, cell: (i32, i32)) -> Option<MapTile> {
        if !grid.contains(cell.0, cell.1) {
            return None;
        }
        let tile = grid.tile(cell.0 as usize, cell.1 as usize).copied()?;
        let mode = self.edit_mode;
        let picked = MapTile::new(
            if mode.includes_floor() { tile.floor } else { 0 },
            if mode.includes_left_wall() { tile.left_wall } else { 0 },
            if mode.includes_right_wall() { tile.right_wall } else { 0 },
        );
        self.brush = Some(SelectionBuffer::single(picked));
        Some(picked)
    }
}
