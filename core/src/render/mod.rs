//! Rendering module - palette expansion, sprite caches, the isometric
//! projection and the frame compositor

mod cache;
mod compositor;
mod indexed;
mod projection;
mod sheet;

pub use cache::{RenderCaches, SpriteCache, TileCache, highlight};
pub use compositor::{EditMode, HoverPreview, MapRenderer, RenderRequest};
pub use indexed::{IndexedImage, Orientation, Packed16, render_tile};
pub use projection::Projection;
pub use sheet::{WallSheet, floor_sheet_tile_at};
