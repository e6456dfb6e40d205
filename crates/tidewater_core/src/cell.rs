//! # Cell & Region Keys
//!
//! Value-type identities for terrain cells and regions. Keys never hold a
//! live handle into the host world, so they hash, order and persist freely.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Region width/depth in cells.
pub const REGION_SIZE: i32 = 16;

/// Identifies one simulated world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub u64);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// A single terrain cell: world plus integer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    /// Owning world.
    pub world: WorldId,
    /// X coordinate (in cells).
    pub x: i32,
    /// Y coordinate (vertical).
    pub y: i32,
    /// Z coordinate (in cells).
    pub z: i32,
}

impl CellKey {
    /// Creates a new cell key.
    #[inline]
    #[must_use]
    pub const fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    /// Returns the region this cell belongs to.
    #[inline]
    #[must_use]
    pub const fn region(self) -> RegionKey {
        RegionKey::containing(self.world, self.x, self.z)
    }

    /// Returns the neighbouring cell across `face`, or `None` past the edge
    /// of the coordinate space.
    #[inline]
    #[must_use]
    pub const fn relative(self, face: BlockFace) -> Option<Self> {
        let (dx, dy, dz) = face.offset();
        let (Some(x), Some(y), Some(z)) = (
            self.x.checked_add(dx),
            self.y.checked_add(dy),
            self.z.checked_add(dz),
        ) else {
            return None;
        };
        Some(Self {
            world: self.world,
            x,
            y,
            z,
        })
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({}, {}, {})", self.world, self.x, self.y, self.z)
    }
}

/// A region (chunk) coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionKey {
    /// Owning world.
    pub world: WorldId,
    /// X coordinate (in regions, not cells).
    pub x: i32,
    /// Z coordinate (in regions, not cells).
    pub z: i32,
}

impl RegionKey {
    /// Creates a new region key.
    #[inline]
    #[must_use]
    pub const fn new(world: WorldId, x: i32, z: i32) -> Self {
        Self { world, x, z }
    }

    /// Returns the region holding the cell column at `(cell_x, cell_z)`.
    #[inline]
    #[must_use]
    pub const fn containing(world: WorldId, cell_x: i32, cell_z: i32) -> Self {
        Self {
            world,
            x: cell_x.div_euclid(REGION_SIZE),
            z: cell_z.div_euclid(REGION_SIZE),
        }
    }

    /// Returns the X coordinate of the region's origin cell.
    #[inline]
    #[must_use]
    pub const fn origin_x(self) -> i32 {
        self.x * REGION_SIZE
    }

    /// Returns the Z coordinate of the region's origin cell.
    #[inline]
    #[must_use]
    pub const fn origin_z(self) -> i32 {
        self.z * REGION_SIZE
    }

    /// Iterates over every `(x, z)` column in the region, in world coordinates.
    pub fn columns(self) -> impl Iterator<Item = (i32, i32)> {
        let (ox, oz) = (self.origin_x(), self.origin_z());
        (0..REGION_SIZE).flat_map(move |dz| (0..REGION_SIZE).map(move |dx| (ox + dx, oz + dz)))
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{},{}]", self.world, self.x, self.z)
    }
}

/// One of the six faces of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockFace {
    /// -Z
    North,
    /// +Z
    South,
    /// +X
    East,
    /// -X
    West,
    /// +Y
    Up,
    /// -Y
    Down,
}

impl BlockFace {
    /// Unit offset `(dx, dy, dz)` pointing out of this face.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::East => (1, 0, 0),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: WorldId = WorldId(1);

    #[test]
    fn test_region_from_cell() {
        assert_eq!(RegionKey::containing(W, 0, 0), RegionKey::new(W, 0, 0));
        assert_eq!(RegionKey::containing(W, 15, 15), RegionKey::new(W, 0, 0));
        assert_eq!(RegionKey::containing(W, 16, 16), RegionKey::new(W, 1, 1));
        assert_eq!(RegionKey::containing(W, -1, -1), RegionKey::new(W, -1, -1));
        assert_eq!(RegionKey::containing(W, -16, -16), RegionKey::new(W, -1, -1));
        assert_eq!(RegionKey::containing(W, -17, -17), RegionKey::new(W, -2, -2));
    }

    #[test]
    fn test_region_columns_cover_region() {
        let region = RegionKey::new(W, -1, 2);
        let columns: Vec<_> = region.columns().collect();
        assert_eq!(columns.len(), (REGION_SIZE * REGION_SIZE) as usize);
        assert!(columns
            .iter()
            .all(|&(x, z)| RegionKey::containing(W, x, z) == region));
    }

    #[test]
    fn test_relative_cell() {
        let cell = CellKey::new(W, 4, 62, -3);
        assert_eq!(cell.relative(BlockFace::Up), Some(CellKey::new(W, 4, 63, -3)));
        assert_eq!(cell.relative(BlockFace::West), Some(CellKey::new(W, 3, 62, -3)));
        assert_eq!(cell.relative(BlockFace::North), Some(CellKey::new(W, 4, 62, -4)));
    }

    #[test]
    fn test_relative_at_coordinate_edge() {
        let east = CellKey::new(W, i32::MAX, 64, 0);
        assert_eq!(east.relative(BlockFace::East), None);
        assert_eq!(east.relative(BlockFace::West), Some(CellKey::new(W, i32::MAX - 1, 64, 0)));

        let bottom = CellKey::new(W, 0, i32::MIN, 0);
        assert_eq!(bottom.relative(BlockFace::Down), None);
        assert_eq!(CellKey::new(W, 0, 0, i32::MIN).relative(BlockFace::North), None);
    }
}
