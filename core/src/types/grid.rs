use crate::error::GridError;

/// One map cell: a floor tile and the two wall sprites standing on it.
///
/// All three indices are stored 1-based; `0` means the layer is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MapTile {
    pub floor: u16,
    pub left_wall: u16,
    pub right_wall: u16,
}

impl MapTile {
    pub const fn new(floor: u16, left_wall: u16, right_wall: u16) -> Self {
        Self {
            floor,
            left_wall,
            right_wall,
        }
    }
}

/// Converts a stored 1-based floor index into a 0-based tileset index.
///
/// # Returns
/// * `None` for the empty marker `0`, otherwise `stored - 1`.
#[inline]
pub fn tile_index(stored: u16) -> Option<usize> {
    stored.checked_sub(1).map(usize::from)
}

/// A rectangular, row-major grid of map cells.
///
/// The backing array is sized once at load time. `resize` only changes how
/// that array is interpreted, so any factor pair of the tile count is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<MapTile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, tiles: Vec<MapTile>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension);
        }
        let expected = cell_count(width, height)?;
        if tiles.len() != expected {
            return Err(GridError::SizeMismatch {
                width,
                height,
                expected,
                actual: tiles.len(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// A grid of empty cells.
    pub fn blank(width: usize, height: usize) -> Result<Self, GridError> {
        let count = cell_count(width, height)?;
        Self::new(width, height, vec![MapTile::default(); count])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn tiles(&self) -> &[MapTile] {
        &self.tiles
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn cell_index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(x + y * self.width)
        } else {
            None
        }
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&MapTile> {
        self.cell_index(x, y).and_then(|idx| self.tiles.get(idx))
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> Option<&mut MapTile> {
        self.cell_index(x, y)
            .and_then(|idx| self.tiles.get_mut(idx))
    }

    /// Reinterprets the backing array as `width x height`.
    ///
    /// # Arguments
    /// * `width`, `height` - New logical dimensions; their product must equal
    ///   the tile count fixed at load time.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension);
        }
        if width.checked_mul(height) != Some(self.tiles.len()) {
            return Err(GridError::NotAFactor {
                width,
                height,
                count: self.tiles.len(),
            });
        }

        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Lists plausible `(width, height)` pairs for the tile count.
    ///
    /// Map files do not record their dimensions, so the loader offers these to
    /// the user. The square layout comes first when there is one, then every
    /// divisor pair (both orders) from the squarest down, limited to sides
    /// under 256.
    pub fn dimension_candidates(&self) -> Vec<(usize, usize)> {
        dimension_candidates(self.tiles.len())
    }
}

fn cell_count(width: usize, height: usize) -> Result<usize, GridError> {
    width
        .checked_mul(height)
        .ok_or(GridError::TooLarge { width, height })
}

pub fn dimension_candidates(count: usize) -> Vec<(usize, usize)> {
    let mut candidates = Vec::new();
    if count == 0 {
        return candidates;
    }

    let mut root = (count as f64).sqrt() as usize;
    while root * root > count {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= count {
        root += 1;
    }

    let mut start = root;
    if root * root == count {
        candidates.push((root, root));
        start -= 1;
    }

    for i in (2..=start).rev() {
        if count % i != 0 {
            continue;
        }
        let other = count / i;
        if i < 256 && other < 256 {
            candidates.push((i, other));
            candidates.push((other, i));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_index_treats_zero_as_empty() {
        assert_eq!(tile_index(0), None);
        assert_eq!(tile_index(1), Some(0));
        assert_eq!(tile_index(2), Some(1));
        assert_eq!(tile_index(u16::MAX), Some(u16::MAX as usize - 1));
    }

    #[test]
    fn new_rejects_mismatched_tile_count() {
        let err = Grid::new(3, 3, vec![MapTile::default(); 8]).unwrap_err();
        assert_eq!(
            err,
            GridError::SizeMismatch {
                width: 3,
                height: 3,
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn tile_lookup_is_row_major() {
        let tiles = (0..6).map(|i| MapTile::new(i, 0, 0)).collect();
        let grid = Grid::new(3, 2, tiles).unwrap();
        assert_eq!(grid.tile(2, 0).unwrap().floor, 2);
        assert_eq!(grid.tile(0, 1).unwrap().floor, 3);
        assert!(grid.tile(3, 0).is_none());
        assert!(grid.tile(0, 2).is_none());
    }

    #[test]
    fn resize_keeps_backing_array() {
        let tiles = (0..12).map(|i| MapTile::new(i, 0, 0)).collect();
        let mut grid = Grid::new(4, 3, tiles).unwrap();
        grid.resize(2, 6).unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 6));
        assert_eq!(grid.tile(1, 1).unwrap().floor, 3);

        assert_eq!(
            grid.resize(5, 2),
            Err(GridError::NotAFactor {
                width: 5,
                height: 2,
                count: 12
            })
        );
        assert_eq!((grid.width(), grid.height()), (2, 6));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(
            Grid::new(usize::MAX, 2, vec![]),
            Err(GridError::TooLarge {
                width: usize::MAX,
                height: 2
            })
        );
        assert!(Grid::blank(usize::MAX, usize::MAX).is_err());

        let mut grid = Grid::blank(2, 1).unwrap();
        let wide = (1usize << (usize::BITS - 1)) + 1;
        assert_eq!(
            grid.resize(wide, 2),
            Err(GridError::NotAFactor {
                width: wide,
                height: 2,
                count: 2
            })
        );
        assert_eq!((grid.width(), grid.height()), (2, 1));
    }

    #[test]
    fn cell_index_is_row_major() {
        let grid = Grid::blank(3, 2).unwrap();
        assert_eq!(grid.cell_index(2, 1), Some(5));
        assert_eq!(grid.cell_index(3, 0), None);
    }

    #[test]
    fn dimension_candidates_square_first() {
        assert_eq!(
            dimension_candidates(36),
            vec![(6, 6), (4, 9), (9, 4), (3, 12), (12, 3), (2, 18), (18, 2)]
        );
    }

    #[test]
    fn dimension_candidates_without_square() {
        assert_eq!(
            dimension_candidates(12),
            vec![(3, 4), (4, 3), (2, 6), (6, 2)]
        );
    }

    #[test]
    fn dimension_candidates_skip_sides_over_255() {
        // 600 = 2 * 300: the (2, 300) pair is too long.
        let candidates = dimension_candidates(600);
        assert!(!candidates.contains(&(2, 300)));
        assert!(candidates.contains(&(20, 30)));
        assert!(candidates.contains(&(30, 20)));
    }

    #[test]
    fn contains_rejects_negative_coordinates() {
        let grid = Grid::blank(2, 2).unwrap();
        assert!(grid.contains(1, 1));
        assert!(!grid.contains(-1, 0));
        assert!(!grid.contains(0, 2));
    }
}
