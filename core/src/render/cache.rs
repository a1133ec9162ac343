use std::collections::HashMap;

use image::RgbaImage;

use crate::constants::{HIGHLIGHT_BLUE, HIGHLIGHT_GREEN, HIGHLIGHT_RED};
use crate::error::RenderError;

/// Get-or-insert storage for rendered sprites, keyed by tile or wall index.
///
/// Entries are append-only: an existing key is never re-rendered or replaced.
pub trait SpriteCache {
    fn get(&self, index: usize) -> Option<&RgbaImage>;

    fn len(&self) -> usize;

    fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached image for `index`, running `populate` on a miss.
    ///
    /// `Ok(None)` from `populate` means there is nothing to render; no entry
    /// is created and the next call will try again.
    fn get_or_try_insert_with<F>(
        &mut self,
        index: usize,
        populate: F,
    ) -> Result<Option<&RgbaImage>, RenderError>
    where
        F: FnOnce() -> Result<Option<RgbaImage>, RenderError>;
}

/// Unbounded `HashMap` cache. The index space is bounded by the data files,
/// so nothing is ever evicted.
#[derive(Debug, Default)]
pub struct TileCache {
    images: HashMap<usize, RgbaImage>,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpriteCache for TileCache {
    fn get(&self, index: usize) -> Option<&RgbaImage> {
        self.images.get(&index)
    }

    fn len(&self) -> usize {
        self.images.len()
    }

    fn get_or_try_insert_with<F>(
        &mut self,
        index: usize,
        populate: F,
    ) -> Result<Option<&RgbaImage>, RenderError>
    where
        F: FnOnce() -> Result<Option<RgbaImage>, RenderError>,
    {
        if !self.images.contains_key(&index) {
            let Some(image) = populate()? else {
                return Ok(None);
            };
            log::trace!(
                "Cached sprite {index} ({}x{})",
                image.width(),
                image.height()
            );
            self.images.insert(index, image);
        }
        Ok(self.images.get(&index))
    }
}

/// The four sprite caches the compositor and picker sheets share.
#[derive(Debug, Default)]
pub struct RenderCaches<C = TileCache> {
    pub floor: C,
    pub floor_highlighted: C,
    pub wall: C,
    pub wall_highlighted: C,
}

/// Fetches the base sprite, and its highlighted variant when requested.
///
/// The highlighted variant is derived from the cached base image and stored
/// in `lit`; `base` itself is left untouched.
pub(crate) fn resolve<'c, C, F>(
    base: &'c mut C,
    lit: &'c mut C,
    index: usize,
    highlighted: bool,
    populate: F,
) -> Result<Option<&'c RgbaImage>, RenderError>
where
    C: SpriteCache,
    F: FnOnce() -> Result<Option<RgbaImage>, RenderError>,
{
    let Some(base_image) = base.get_or_try_insert_with(index, populate)? else {
        return Ok(None);
    };
    if !highlighted {
        return Ok(Some(base_image));
    }
    lit.get_or_try_insert_with(index, || Ok(Some(highlight(base_image))))
}

/// Brightened copy of `image` used for selection feedback.
///
/// Every pixel that is not pure black gets `+25` red, `+25` green and `+50`
/// blue, saturating at 255. Black pixels (background and transparent) stay.
pub fn highlight(image: &RgbaImage) -> RgbaImage {
    let mut lit = image.clone();
    for px in lit.chunks_exact_mut(4) {
        if px[0] == 0 && px[1] == 0 && px[2] == 0 {
            continue;
        }
        px[0] = px[0].saturating_add(HIGHLIGHT_RED);
        px[1] = px[1].saturating_add(HIGHLIGHT_GREEN);
        px[2] = px[2].saturating_add(HIGHLIGHT_BLUE);
    }
    lit
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::cell::Cell;

    fn sprite(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, Rgba(color))
    }

    #[test]
    fn populate_runs_once_per_index() {
        let mut cache = TileCache::new();
        let calls = Cell::new(0);
        let populate = || {
            calls.set(calls.get() + 1);
            Ok(Some(sprite([10, 20, 30, 255])))
        };

        let first = cache.get_or_try_insert_with(7, populate).unwrap().cloned();
        let second = cache.get_or_try_insert_with(7, populate).unwrap().cloned();

        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_sprite_is_not_cached() {
        let mut cache = TileCache::new();
        assert!(
            cache
                .get_or_try_insert_with(3, || Ok(None))
                .unwrap()
                .is_none()
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn populate_error_propagates() {
        let mut cache = TileCache::new();
        let err = cache
            .get_or_try_insert_with(1, || {
                Err(RenderError::BufferTooShort {
                    width: 2,
                    height: 2,
                    expected: 4,
                    actual: 1,
                })
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::BufferTooShort { .. }));
        assert!(!cache.contains(1));
    }

    #[test]
    fn highlight_brightens_and_clamps() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(2, 0, Rgba([240, 235, 210, 255]));

        let lit = highlight(&img);
        assert_eq!(*lit.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*lit.get_pixel(1, 0), Rgba([125, 125, 150, 255]));
        assert_eq!(*lit.get_pixel(2, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn highlight_leaves_opaque_black_alone() {
        let img = sprite([0, 0, 0, 255]);
        assert_eq!(highlight(&img), img);
    }

    #[test]
    fn resolve_highlight_does_not_touch_base_entry() {
        let mut caches: RenderCaches = RenderCaches::default();
        let base = sprite([40, 50, 60, 255]);

        let plain = resolve(&mut caches.wall, &mut caches.wall_highlighted, 20, false, || {
            Ok(Some(base.clone()))
        })
        .unwrap()
        .cloned();
        let lit = resolve(&mut caches.wall, &mut caches.wall_highlighted, 20, true, || {
            panic!("base entry already cached")
        })
        .unwrap()
        .cloned();

        assert_eq!(plain.as_ref(), Some(&base));
        assert_eq!(lit, Some(sprite([65, 75, 110, 255])));
        assert_eq!(caches.wall.get(20), Some(&base));
        assert_eq!(caches.wall_highlighted.len(), 1);
    }
}
