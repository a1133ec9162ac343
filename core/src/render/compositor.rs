use image::{Rgba, RgbaImage};

use crate::constants::{
    BACKGROUND, COLLISION_OVERLAY, LayerVisibility, MIN_WALL_INDEX, WALL_SENTINEL_MODULUS,
};
use crate::error::RenderError;
use crate::render::cache::{RenderCaches, SpriteCache, TileCache, resolve};
use crate::render::indexed::render_tile;
use crate::render::projection::Projection;
use crate::sources::{MapAssets, TileSource, WallSource};
use crate::types::{
    Grid, MapTile, PaletteLookup, SelectionBuffer, SelectionRect, floor_palette_key, tile_index,
    wall_palette_key,
};

/// Which layers selection highlighting and brush previews apply to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Floor,
    LeftWall,
    RightWall,
    All,
    /// Both wall layers, floor untouched.
    Walls,
}

impl EditMode {
    pub fn includes_floor(self) -> bool {
        matches!(self, EditMode::Floor | EditMode::All)
    }

    pub fn includes_left_wall(self) -> bool {
        matches!(self, EditMode::LeftWall | EditMode::All | EditMode::Walls)
    }

    pub fn includes_right_wall(self) -> bool {
        matches!(self, EditMode::RightWall | EditMode::All | EditMode::Walls)
    }
}

/// Brush block drawn under the mouse in place of the map contents.
#[derive(Debug, Clone, Copy)]
pub struct HoverPreview<'a> {
    /// Grid cell under the cursor; the brush's top-left tile lands here.
    pub origin: (i32, i32),
    pub brush: &'a SelectionBuffer,
}

impl HoverPreview<'_> {
    /// Brush tile covering `(x, y)`, if the footprint reaches it.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&MapTile> {
        self.brush.tile_at(x - self.origin.0, y - self.origin.1)
    }
}

/// Everything that parameterises one frame. Built fresh by the caller and
/// never mutated while a frame is being drawn.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub hscroll: i32,
    pub vscroll: i32,
    pub layers: LayerVisibility,
    pub edit_mode: EditMode,
    pub transparency: bool,
    /// Let empty brush walls erase walls in the preview.
    pub draw_empty_walls: bool,
    pub collision_overlay: bool,
    pub selection: Option<SelectionRect>,
    pub preview: Option<HoverPreview<'a>>,
}

impl RenderRequest<'_> {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            hscroll: 0,
            vscroll: 0,
            layers: LayerVisibility::all(),
            edit_mode: EditMode::default(),
            transparency: false,
            draw_empty_walls: false,
            collision_overlay: false,
            selection: None,
            preview: None,
        }
    }

    fn selected(&self, x: i32, y: i32) -> bool {
        self.selection.is_some_and(|rect| rect.contains(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WallSide {
    Left,
    Right,
}

impl WallSide {
    fn stored(self, tile: &MapTile) -> u16 {
        match self {
            WallSide::Left => tile.left_wall,
            WallSide::Right => tile.right_wall,
        }
    }

    fn layer(self) -> LayerVisibility {
        match self {
            WallSide::Left => LayerVisibility::LEFT_WALL,
            WallSide::Right => LayerVisibility::RIGHT_WALL,
        }
    }

    fn in_mode(self, mode: EditMode) -> bool {
        match self {
            WallSide::Left => mode.includes_left_wall(),
            WallSide::Right => mode.includes_right_wall(),
        }
    }
}

/// Inputs shared by every pass of one frame.
struct Frame<'f> {
    assets: &'f MapAssets<'f>,
    request: &'f RenderRequest<'f>,
    projection: Projection,
}

impl<'f> Frame<'f> {
    fn new(assets: &'f MapAssets<'f>, request: &'f RenderRequest<'f>) -> Self {
        let projection = Projection::new(
            assets.tiles.tile_width(),
            assets.tiles.tile_height(),
            request.viewport_width,
            request.viewport_height,
            request.hscroll,
            request.vscroll,
        );
        Self {
            assets,
            request,
            projection,
        }
    }
}

#[derive(Debug, Default)]
struct FrameStats {
    floors: usize,
    walls: usize,
    blended: usize,
    blockers: usize,
}

/// Draws map frames and picker sheets, owning the sprite caches they share.
#[derive(Debug, Default)]
pub struct MapRenderer<C = TileCache> {
    pub(crate) caches: RenderCaches<C>,
}

impl MapRenderer<TileCache> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: SpriteCache> MapRenderer<C> {
    pub fn with_caches(caches: RenderCaches<C>) -> Self {
        Self { caches }
    }

    pub fn caches(&self) -> &RenderCaches<C> {
        &self.caches
    }

    /// Composites one frame of the map.
    ///
    /// Floors are drawn for every cell first, then left and right walls cell
    /// by cell in row-major order, then the optional collision overlay.
    ///
    /// # Arguments
    /// * `grid` - The map, or `None` when nothing is loaded (blank frame).
    /// * `assets` - Tileset, wall archive, palettes and attribute table.
    /// * `request` - View parameters for this frame.
    ///
    /// # Errors
    /// * [`RenderError::BufferTooShort`] if a tile's pixel data is truncated.
    pub fn render_map(
        &mut self,
        grid: Option<&Grid>,
        assets: &MapAssets,
        request: &RenderRequest,
    ) -> Result<RgbaImage, RenderError> {
        let (width, height) = (request.viewport_width, request.viewport_height);
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba(BACKGROUND));
        let Some(grid) = grid else {
            return Ok(canvas);
        };

        let frame = Frame::new(assets, request);
        let mut stats = FrameStats::default();

        if request.layers.contains(LayerVisibility::FLOOR) {
            self.draw_floors(&mut canvas, grid, &frame, &mut stats)?;
        }

        let mut blockers = vec![false; grid.len()];
        self.draw_walls(&mut canvas, grid, &frame, &mut blockers, &mut stats)?;

        if request.collision_overlay {
            draw_collision_overlay(&mut canvas, grid, &frame.projection, &blockers, &mut stats);
        }

        log::debug!(
            "Rendered {}x{} map at scroll ({}, {}): {} floors, {} walls ({} blended), {} blockers",
            grid.width(),
            grid.height(),
            request.hscroll,
            request.vscroll,
            stats.floors,
            stats.walls,
            stats.blended,
            stats.blockers
        );

        Ok(canvas)
    }

    fn draw_floors(
        &mut self,
        canvas: &mut RgbaImage,
        grid: &Grid,
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let Frame {
            assets,
            request,
            projection,
        } = frame;
        let in_mode = request.edit_mode.includes_floor();

        for (y, row) in grid.tiles().chunks_exact(grid.width()).enumerate() {
            let y = y as i32;
            for (x, tile) in row.iter().enumerate() {
                let x = x as i32;
                let anchor = projection.floor_anchor(x, y);
                if !projection.floor_visible(anchor) {
                    continue;
                }

                let mut stored = tile.floor;
                let mut previewed = false;
                let brush_tile = request.preview.and_then(|p| p.tile_at(x, y).copied());
                if let Some(brush_tile) = brush_tile.filter(|_| in_mode) {
                    stored = brush_tile.floor;
                    previewed = true;
                }

                let Some(index) = tile_index(stored) else {
                    continue;
                };
                if index >= assets.tiles.tile_count() {
                    log::trace!("Floor tile {index} at ({x}, {y}) is outside the tileset");
                    continue;
                }

                let highlighted = in_mode && (previewed || request.selected(x, y));
                let sprite = resolve(
                    &mut self.caches.floor,
                    &mut self.caches.floor_highlighted,
                    index,
                    highlighted,
                    || populate_floor(assets.tiles, assets.floor_palettes, index),
                )?;
                if let Some(sprite) = sprite {
                    blit_opaque(canvas, sprite, anchor);
                    stats.floors += 1;
                }
            }
        }
        Ok(())
    }

    /// Left and right walls, cell by cell. Cells whose walls pass the cull
    /// test and carry a blocking wall are flagged in `blockers`.
    fn draw_walls(
        &mut self,
        canvas: &mut RgbaImage,
        grid: &Grid,
        frame: &Frame,
        blockers: &mut [bool],
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let projection = &frame.projection;

        for (y, row) in grid.tiles().chunks_exact(grid.width()).enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let cell = x + y * grid.width();
                let (x, y) = (x as i32, y as i32);
                if !projection.walls_visible(projection.wall_probe(x, y)) {
                    continue;
                }

                for side in [WallSide::Left, WallSide::Right] {
                    let wall = self.draw_wall(canvas, tile, side, (x, y), frame, stats)?;
                    if wall > 0 && frame.assets.attributes.is_collision(wall) {
                        blockers[cell] = true;
                    }
                }
            }
        }
        Ok(())
    }

    /// Draws one wall and returns the wall index that ended up in the cell,
    /// after brush substitution.
    fn draw_wall(
        &mut self,
        canvas: &mut RgbaImage,
        tile: &MapTile,
        side: WallSide,
        (x, y): (i32, i32),
        frame: &Frame,
        stats: &mut FrameStats,
    ) -> Result<usize, RenderError> {
        let Frame {
            assets,
            request,
            projection,
        } = frame;
        let mut wall = side.stored(tile) as usize;
        if !request.layers.contains(side.layer()) {
            return Ok(wall);
        }

        let in_mode = side.in_mode(request.edit_mode);
        let mut previewed = false;
        let brush_tile = request.preview.and_then(|p| p.tile_at(x, y).copied());
        if let Some(brush_tile) = brush_tile.filter(|_| in_mode) {
            let brush_wall = side.stored(&brush_tile);
            if brush_wall > 0 || request.draw_empty_walls {
                wall = brush_wall as usize;
                previewed = true;
            }
        }

        // Indices below 13 are placeholders from an older tileset.
        if wall < MIN_WALL_INDEX as usize {
            return Ok(wall);
        }

        let highlighted = in_mode && (previewed || request.selected(x, y));
        let Some(sprite) = resolve(
            &mut self.caches.wall,
            &mut self.caches.wall_highlighted,
            wall,
            highlighted,
            || populate_wall(assets.walls, assets.wall_palettes, wall),
        )?
        else {
            log::trace!("No sprite for wall {wall} at ({x}, {y})");
            return Ok(wall);
        };

        if wall % WALL_SENTINEL_MODULUS as usize <= 1 {
            return Ok(wall);
        }

        let anchor = match side {
            WallSide::Left => projection.left_wall_anchor(x, y, sprite.height()),
            WallSide::Right => projection.right_wall_anchor(x, y, sprite.height()),
        };
        if request.transparency && assets.attributes.is_translucent(wall) {
            blend_additive(canvas, sprite, anchor);
            stats.blended += 1;
        } else {
            blit_opaque(canvas, sprite, anchor);
        }
        stats.walls += 1;

        Ok(wall)
    }
}

pub(crate) fn populate_floor(
    tiles: &dyn TileSource,
    palettes: &dyn PaletteLookup,
    index: usize,
) -> Result<Option<RgbaImage>, RenderError> {
    let Some(palette) = palettes.palette(floor_palette_key(index)) else {
        log::trace!("No palette for floor tile {index}");
        return Ok(None);
    };
    render_tile(tiles, index, palette)
}

pub(crate) fn populate_wall(
    walls: &dyn WallSource,
    palettes: &dyn PaletteLookup,
    wall: usize,
) -> Result<Option<RgbaImage>, RenderError> {
    let Some(sprite) = walls.wall_sprite(wall) else {
        return Ok(None);
    };
    let Some(palette) = palettes.palette(wall_palette_key(wall)) else {
        log::trace!("No palette for wall {wall}");
        return Ok(None);
    };
    Ok(Some(sprite.render(palette)))
}

/// Overlap of a `sprite`-sized rectangle placed at `at` with the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
}

fn clip(canvas: (u32, u32), sprite: (u32, u32), at: (i32, i32)) -> Option<Span> {
    let (cw, ch) = (canvas.0 as i64, canvas.1 as i64);
    let (sw, sh) = (sprite.0 as i64, sprite.1 as i64);
    let (ax, ay) = (at.0 as i64, at.1 as i64);

    let x0 = ax.max(0);
    let y0 = ay.max(0);
    let x1 = (ax + sw).min(cw);
    let y1 = (ay + sh).min(ch);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    Some(Span {
        src_x: (x0 - ax) as usize,
        src_y: (y0 - ay) as usize,
        dst_x: x0 as usize,
        dst_y: y0 as usize,
        width: (x1 - x0) as usize,
        height: (y1 - y0) as usize,
    })
}

/// Copies every non-transparent sprite pixel over the canvas.
pub(crate) fn blit_opaque(canvas: &mut RgbaImage, sprite: &RgbaImage, at: (i32, i32)) {
    let Some(span) = clip(canvas.dimensions(), sprite.dimensions(), at) else {
        return;
    };
    let dst_stride = canvas.width() as usize * 4;
    let src_stride = sprite.width() as usize * 4;
    let dst: &mut [u8] = canvas;
    let src: &[u8] = sprite;

    for row in 0..span.height {
        let s = (span.src_y + row) * src_stride + span.src_x * 4;
        let d = (span.dst_y + row) * dst_stride + span.dst_x * 4;
        let src_row = &src[s..s + span.width * 4];
        let dst_row = &mut dst[d..d + span.width * 4];
        for (out, px) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            if px[3] != 0 {
                out.copy_from_slice(px);
            }
        }
    }
}

/// Adds every non-black sprite pixel onto what is already on the canvas,
/// saturating per channel.
pub(crate) fn blend_additive(canvas: &mut RgbaImage, sprite: &RgbaImage, at: (i32, i32)) {
    let Some(span) = clip(canvas.dimensions(), sprite.dimensions(), at) else {
        return;
    };
    let dst_stride = canvas.width() as usize * 4;
    let src_stride = sprite.width() as usize * 4;
    let dst: &mut [u8] = canvas;
    let src: &[u8] = sprite;

    for row in 0..span.height {
        let s = (span.src_y + row) * src_stride + span.src_x * 4;
        let d = (span.dst_y + row) * dst_stride + span.dst_x * 4;
        let src_row = &src[s..s + span.width * 4];
        let dst_row = &mut dst[d..d + span.width * 4];
        for (out, px) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            if px[0] == 0 && px[1] == 0 && px[2] == 0 {
                continue;
            }
            out[0] = out[0].saturating_add(px[0]);
            out[1] = out[1].saturating_add(px[1]);
            out[2] = out[2].saturating_add(px[2]);
            out[3] = 255;
        }
    }
}

/// Source-over composite of a single colour onto one canvas pixel.
fn composite_over(out: &mut [u8], color: [u8; 4]) {
    let a = color[3] as u32;
    let inv = 255 - a;
    for c in 0..3 {
        out[c] = ((color[c] as u32 * a + out[c] as u32 * inv + 127) / 255) as u8;
    }
    out[3] = (a + (out[3] as u32 * inv + 127) / 255) as u8;
}

/// Fills the diamond with top vertex `top`, `half_width` wide on each side
/// and `height` tall.
pub(crate) fn fill_diamond(
    canvas: &mut RgbaImage,
    top: (i32, i32),
    half_width: i32,
    height: i32,
    color: [u8; 4],
) {
    if half_width <= 0 || height <= 0 {
        return;
    }
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    // Doubled coordinates keep the centre exact for odd heights.
    let cx2 = top.0 * 2;
    let cy2 = top.1 * 2 + height;
    let (hw2, hh2) = (half_width as i64 * 2, height as i64);

    for py in top.1.max(0)..(top.1 + height + 1).min(ch) {
        let dy = (py * 2 - cy2).abs() as i64;
        for px in (top.0 - half_width).max(0)..(top.0 + half_width + 1).min(cw) {
            let dx = (px * 2 - cx2).abs() as i64;
            if dx * hh2 + dy * hw2 > hw2 * hh2 {
                continue;
            }
            let out = canvas.get_pixel_mut(px as u32, py as u32);
            composite_over(&mut out.0, color);
        }
    }
}

fn draw_collision_overlay(
    canvas: &mut RgbaImage,
    grid: &Grid,
    projection: &Projection,
    blockers: &[bool],
    stats: &mut FrameStats,
) {
    let half_width = projection.x_step();
    let height = projection.tile_height();

    for (cell, _) in blockers.iter().enumerate().filter(|(_, blocked)| **blocked) {
        let x = (cell % grid.width()) as i32;
        let y = (cell / grid.width()) as i32;
        fill_diamond(
            canvas,
            projection.diamond_top(x, y),
            half_width,
            height,
            COLLISION_OVERLAY,
        );
        stats.blockers += 1;
    }
}
