//! End-to-end frames through `MapRenderer::render_map` with the game's 56x27 tileset.

use image::{Rgba, RgbaImage};
use isomap_core::constants::{BACKGROUND, TILE_HEIGHT, TILE_WIDTH};
use isomap_core::error::RenderError;
use isomap_core::render::{
    EditMode, HoverPreview, IndexedImage, MapRenderer, Orientation, Projection, RenderRequest,
    SpriteCache,
};
use isomap_core::sources::{
    ArchiveWalls, AttributeTable, MapAssets, MemoryArchive, Tileset, wall_file_name,
};
use isomap_core::types::{
    Grid, MapTile, PALETTE_SIZE, Palette, PaletteTable, SelectionBuffer, SelectionRect,
};
use rand::Rng;

const TILE_PIXELS: usize = (TILE_WIDTH * TILE_HEIGHT) as usize;

struct World {
    tiles: Tileset,
    palettes: PaletteTable,
    walls: ArchiveWalls<MemoryArchive>,
    attributes: AttributeTable,
}

impl World {
    /// Floor tile `i` is solid grey `floor_colors[i]`; each wall is a solid
    /// `width x height` block of its grey level.
    fn new(floor_colors: &[u8], walls: &[(usize, u32, u32, u8)], attributes: Vec<u8>) -> Self {
        let mut archive = MemoryArchive::new();
        for &(index, width, height, color) in walls {
            archive.insert(
                wall_file_name(index),
                IndexedImage::new(
                    width,
                    height,
                    Orientation::RowMajor,
                    vec![color; (width * height) as usize],
                )
                .unwrap(),
            );
        }

        let mut colors = [Rgba([0, 0, 0, 255]); PALETTE_SIZE];
        for (i, c) in colors.iter_mut().enumerate() {
            *c = Rgba([i as u8, i as u8, i as u8, 255]);
        }

        World {
            tiles: Tileset::new(
                TILE_WIDTH,
                TILE_HEIGHT,
                floor_colors
                    .iter()
                    .map(|&c| vec![c; TILE_PIXELS])
                    .collect(),
            ),
            palettes: PaletteTable::new(vec![Palette::new(colors)]),
            walls: ArchiveWalls::new(archive),
            attributes: AttributeTable::new(attributes),
        }
    }

    fn assets(&self) -> MapAssets<'_> {
        MapAssets {
            tiles: &self.tiles,
            floor_palettes: &self.palettes,
            wall_palettes: &self.palettes,
            walls: &self.walls,
            attributes: &self.attributes,
        }
    }
}

fn stock_request() -> RenderRequest<'static> {
    RenderRequest::new(560, 480)
}

fn stock_projection() -> Projection {
    Projection::new(TILE_WIDTH, TILE_HEIGHT, 560, 480, 0, 0)
}

fn lit_pixels(img: &RgbaImage) -> usize {
    img.pixels().filter(|p| p.0 != BACKGROUND).count()
}

fn random_grid(rng: &mut impl Rng, width: usize, height: usize) -> Grid {
    let tiles = (0..width * height)
        .map(|_| {
            MapTile::new(
                rng.gen_range(0..4),
                [0, 5, 20, 21, 10000][rng.gen_range(0..5)],
                [0, 20, 21, 30][rng.gen_range(0..4)],
            )
        })
        .collect();
    Grid::new(width, height, tiles).unwrap()
}

fn busy_world() -> World {
    let mut attributes = vec![0u8; 40];
    attributes[20] = 0x80;
    attributes[29] = 0x0F;
    World::new(
        &[40, 80, 120],
        &[(20, 56, 60, 30), (21, 56, 27, 50), (30, 28, 90, 70), (10000, 28, 10, 99)],
        attributes,
    )
}

// ── Basic frames ────────────────────────────────────────────────────

#[test]
fn empty_map_renders_blank_viewport() {
    let world = World::new(&[40], &[], vec![]);
    let grid = Grid::blank(3, 3).unwrap();
    let mut renderer = MapRenderer::new();

    let img = renderer
        .render_map(Some(&grid), &world.assets(), &stock_request())
        .unwrap();

    assert_eq!(img.dimensions(), (560, 480));
    assert_eq!(lit_pixels(&img), 0);
    assert!(renderer.caches().floor.is_empty());
    assert!(renderer.caches().wall.is_empty());
}

#[test]
fn single_floor_tile_lands_on_its_anchor() {
    let world = World::new(&[40, 77], &[], vec![]);
    let grid = Grid::new(1, 1, vec![MapTile::new(2, 0, 0)]).unwrap();

    let img = MapRenderer::new()
        .render_map(Some(&grid), &world.assets(), &stock_request())
        .unwrap();

    let (ax, ay) = stock_projection().floor_anchor(0, 0);
    assert_eq!((ax, ay), (252, 0));
    assert_eq!(lit_pixels(&img), TILE_PIXELS);
    assert_eq!(img.get_pixel(252, 0).0, [77, 77, 77, 255]);
    assert_eq!(img.get_pixel(252 + 55, 26).0, [77, 77, 77, 255]);
    assert_eq!(img.get_pixel(251, 0).0, BACKGROUND);
}

#[test]
fn sentinel_walls_are_cached_but_not_drawn() {
    let world = World::new(&[40], &[(10000, 28, 40, 90), (10001, 28, 40, 90)], vec![]);
    let grid = Grid::new(1, 1, vec![MapTile::new(0, 10000, 10001)]).unwrap();
    let mut renderer = MapRenderer::new();

    let img = renderer
        .render_map(Some(&grid), &world.assets(), &stock_request())
        .unwrap();

    assert_eq!(lit_pixels(&img), 0);
    assert_eq!(renderer.caches().wall.len(), 2);
}

#[test]
fn truncated_tile_fails_the_frame() {
    let mut world = World::new(&[40], &[], vec![]);
    world.tiles = Tileset::new(TILE_WIDTH, TILE_HEIGHT, vec![vec![40; TILE_PIXELS - 1]]);
    let grid = Grid::new(1, 1, vec![MapTile::new(1, 0, 0)]).unwrap();

    let err = MapRenderer::new()
        .render_map(Some(&grid), &world.assets(), &stock_request())
        .unwrap_err();
    assert_eq!(
        err,
        RenderError::BufferTooShort {
            width: TILE_WIDTH,
            height: TILE_HEIGHT,
            expected: TILE_PIXELS,
            actual: TILE_PIXELS - 1,
        }
    );
}

// ── Transparency ────────────────────────────────────────────────────

#[test]
fn overlapping_transparent_walls_accumulate() {
    let mut attributes = vec![0u8; 30];
    attributes[19] = 0x80;
    attributes[20] = 0x80;
    let world = World::new(&[40], &[(20, 56, 27, 30), (21, 56, 27, 50)], attributes);
    let grid = Grid::new(1, 1, vec![MapTile::new(1, 20, 21)]).unwrap();
    let mut request = stock_request();
    request.transparency = true;

    let mut renderer = MapRenderer::new();
    let img = renderer
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();

    // Left wall spans x 252..308, right wall 280..336; both start one row
    // below the floor anchor.
    assert_eq!(img.get_pixel(260, 5).0, [70, 70, 70, 255]);
    assert_eq!(img.get_pixel(290, 5).0, [120, 120, 120, 255]);
    assert_eq!(img.get_pixel(320, 5).0, [50, 50, 50, 255]);

    request.transparency = false;
    let opaque = renderer
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();
    assert_eq!(opaque.get_pixel(260, 5).0, [30, 30, 30, 255]);
    assert_eq!(opaque.get_pixel(290, 5).0, [50, 50, 50, 255]);
}

#[test]
fn transparency_never_darkens() {
    let mut rng = rand::thread_rng();
    let world = busy_world();

    for _ in 0..10 {
        let grid = random_grid(&mut rng, 8, 8);
        let mut request = stock_request();
        let mut renderer = MapRenderer::new();

        let plain = renderer
            .render_map(Some(&grid), &world.assets(), &request)
            .unwrap();
        request.transparency = true;
        let lit = renderer
            .render_map(Some(&grid), &world.assets(), &request)
            .unwrap();

        // Only wall 21 blends. Where it was the last thing drawn, the plain
        // frame holds its colour and the blended frame holds colour + below.
        for (a, b) in plain.pixels().zip(lit.pixels()) {
            assert!(b[0] >= a[0], "{a:?} vs {b:?}");
            assert!(b[0] == b[1] && b[1] == b[2]);
        }
    }
}

// ── Caches and determinism ──────────────────────────────────────────

#[test]
fn frames_are_deterministic() {
    let mut rng = rand::thread_rng();
    let world = busy_world();
    let grid = random_grid(&mut rng, 12, 9);
    let mut request = stock_request();
    request.transparency = true;
    request.collision_overlay = true;
    request.hscroll = rng.gen_range(-200..200);
    request.vscroll = rng.gen_range(-100..100);

    let mut warm = MapRenderer::new();
    let first = warm
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();
    let second = warm
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();
    let cold = MapRenderer::new()
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, cold);
}

#[test]
fn repeated_frames_do_not_grow_caches() {
    let mut rng = rand::thread_rng();
    let world = busy_world();
    let grid = random_grid(&mut rng, 10, 10);
    let mut request = stock_request();
    request.selection = Some(SelectionRect::from_corners((2, 2), (5, 6)));
    request.edit_mode = EditMode::All;

    let mut renderer = MapRenderer::new();
    renderer
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();
    let sizes = |r: &MapRenderer| {
        let c = r.caches();
        (c.floor.len(), c.floor_highlighted.len(), c.wall.len(), c.wall_highlighted.len())
    };
    let before = sizes(&renderer);

    renderer
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();
    assert_eq!(sizes(&renderer), before);
}

#[test]
fn highlighting_leaves_base_sprites_untouched() {
    let world = World::new(&[40, 80], &[], vec![]);
    let grid = Grid::new(2, 1, vec![MapTile::new(1, 0, 0), MapTile::new(2, 0, 0)]).unwrap();
    let mut renderer = MapRenderer::new();

    let plain = renderer
        .render_map(Some(&grid), &world.assets(), &stock_request())
        .unwrap();

    let mut selected = stock_request();
    selected.selection = Some(SelectionRect::from_corners((0, 0), (1, 0)));
    let lit = renderer
        .render_map(Some(&grid), &world.assets(), &selected)
        .unwrap();
    assert_eq!(lit.get_pixel(252, 0).0, [65, 65, 90, 255]);

    let again = renderer
        .render_map(Some(&grid), &world.assets(), &stock_request())
        .unwrap();
    assert_eq!(plain, again);
}

#[test]
fn hover_preview_follows_brush_footprint() {
    let world = World::new(&[40, 80], &[], vec![]);
    let grid = Grid::new(3, 3, vec![MapTile::new(1, 0, 0); 9]).unwrap();
    let brush = SelectionBuffer::new(2, vec![MapTile::new(2, 0, 0); 2]).unwrap();
    let mut request = stock_request();
    request.preview = Some(HoverPreview {
        origin: (1, 2),
        brush: &brush,
    });

    let img = MapRenderer::new()
        .render_map(Some(&grid), &world.assets(), &request)
        .unwrap();

    let projection = stock_projection();
    let centre = |x, y| {
        let (ax, ay) = projection.floor_anchor(x, y);
        img.get_pixel((ax + 28) as u32, (ay + 13) as u32).0
    };
    // 80 highlighted: 105, 105, 130.
    assert_eq!(centre(1, 2), [105, 105, 130, 255]);
    assert_eq!(centre(2, 2), [105, 105, 130, 255]);
    assert_eq!(centre(0, 2), [40, 40, 40, 255]);
    assert_eq!(centre(1, 1), [40, 40, 40, 255]);
}
