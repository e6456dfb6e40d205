//! # Chunk Storage
//!
//! World data is organized into fixed-size chunks:
//! - Memory efficiency (only nearby chunks are loaded)
//! - Unload/reload through compressed files
//!
//! ## Chunk Format
//!
//! Chunks are 16x16x256 cells (width x depth x height).
//! Each cell is stored as a u16 material id.
//!
//! ## Storage
//!
//! Unloaded chunks are saved as LZ4-compressed binary files.

use std::io::{Read, Write};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use tidewater_core::{CellKey, Material, RegionHandle, RegionKey, WriteRejected};

/// Chunk width/depth in cells.
pub const CHUNK_SIZE: usize = 16;

/// Chunk height in cells.
pub const CHUNK_HEIGHT: usize = 256;

/// Total cells per chunk.
pub const CELLS_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT;

type Cells = [[[Material; CHUNK_SIZE]; CHUNK_SIZE]; CHUNK_HEIGHT];

/// A chunk of world data.
#[derive(Clone)]
pub struct Chunk {
    /// Chunk position in the world.
    pub key: RegionKey,
    /// Cell data (indexed as [y][z][x]).
    cells: Box<Cells>,
    /// Whether this chunk has been modified since loading.
    pub modified: bool,
}

impl Chunk {
    /// Creates an empty (all air) chunk.
    #[must_use]
    pub fn new(key: RegionKey) -> Self {
        Self {
            key,
            cells: Box::new([[[Material::AIR; CHUNK_SIZE]; CHUNK_SIZE]; CHUNK_HEIGHT]),
            modified: false,
        }
    }

    /// Gets a cell at local coordinates. Out-of-range reads are air.
    #[inline]
    #[must_use]
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Material {
        if x < CHUNK_SIZE && y < CHUNK_HEIGHT && z < CHUNK_SIZE {
            self.cells[y][z][x]
        } else {
            Material::AIR
        }
    }

    /// Sets a cell at local coordinates. Returns false if out of range.
    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, material: Material) -> bool {
        if x < CHUNK_SIZE && y < CHUNK_HEIGHT && z < CHUNK_SIZE {
            self.cells[y][z][x] = material;
            self.modified = true;
            true
        } else {
            false
        }
    }

    /// Converts world coordinates to local indices, if inside this chunk.
    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation
    )]
    fn local(&self, x: i32, y: i32, z: i32) -> Option<(usize, usize, usize)> {
        let lx = x - self.key.origin_x();
        let lz = z - self.key.origin_z();
        let size = CHUNK_SIZE as i32;
        let height = CHUNK_HEIGHT as i32;
        if (0..size).contains(&lx) && (0..height).contains(&y) && (0..size).contains(&lz) {
            Some((lx as usize, y as usize, lz as usize))
        } else {
            None
        }
    }

    /// Counts cells holding `material`.
    #[must_use]
    pub fn count(&self, material: Material) -> usize {
        self.cells
            .iter()
            .flat_map(|layer| layer.iter())
            .flat_map(|row| row.iter())
            .filter(|&&cell| cell == material)
            .count()
    }

    /// Saves the chunk to a compressed binary file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations fail.
    pub fn save_compressed(&self, path: &Path) -> std::io::Result<()> {
        let compressed = compress_prepend_size(bytemuck::bytes_of(&*self.cells));

        let mut file = std::fs::File::create(path)?;
        file.write_all(&compressed)?;

        Ok(())
    }

    /// Loads a chunk from a compressed binary file.
    ///
    /// # Errors
    ///
    /// Returns error if file operations or decompression fail, or the data
    /// has the wrong size.
    pub fn load_compressed(path: &Path, key: RegionKey) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut compressed = Vec::new();
        file.read_to_end(&mut compressed)?;

        let decompressed = decompress_size_prepended(&compressed)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if decompressed.len() != Self::data_size() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Invalid chunk data size",
            ));
        }

        let mut chunk = Self::new(key);
        bytemuck::bytes_of_mut(&mut *chunk.cells).copy_from_slice(&decompressed);
        Ok(chunk)
    }

    /// Returns the raw cell data size in bytes (uncompressed).
    #[must_use]
    pub const fn data_size() -> usize {
        CELLS_PER_CHUNK * std::mem::size_of::<Material>()
    }
}

impl RegionHandle for Chunk {
    fn key(&self) -> RegionKey {
        self.key
    }

    fn cell_at(&self, x: i32, y: i32, z: i32) -> Material {
        self.local(x, y, z)
            .map_or(Material::AIR, |(lx, ly, lz)| self.cells[ly][lz][lx])
    }

    fn set_cell(&mut self, x: i32, y: i32, z: i32, material: Material) -> Result<(), WriteRejected> {
        let (lx, ly, lz) = self.local(x, y, z).ok_or(WriteRejected {
            cell: CellKey::new(self.key.world, x, y, z),
        })?;
        self.set_block(lx, ly, lz, material);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_core::WorldId;

    fn key() -> RegionKey {
        RegionKey::new(WorldId(1), -1, 2)
    }

    #[test]
    fn test_world_coordinates_map_into_chunk() {
        let mut chunk = Chunk::new(key());
        // Region (-1, 2) spans x -16..0, z 32..48.
        chunk.set_cell(-16, 70, 32, Material::STONE).unwrap();
        chunk.set_cell(-1, 70, 47, Material::SAND).unwrap();

        assert_eq!(chunk.get_block(0, 70, 0), Material::STONE);
        assert_eq!(chunk.get_block(15, 70, 15), Material::SAND);
        assert_eq!(chunk.cell_at(-1, 70, 47), Material::SAND);
        assert!(chunk.modified);
    }

    #[test]
    fn test_writes_outside_are_rejected() {
        let mut chunk = Chunk::new(key());

        assert!(chunk.set_cell(0, 70, 32, Material::WATER).is_err());
        assert!(chunk.set_cell(-16, 256, 32, Material::WATER).is_err());
        assert!(chunk.set_cell(-16, -1, 32, Material::WATER).is_err());
        assert_eq!(chunk.cell_at(-16, 300, 32), Material::AIR);
        assert!(!chunk.modified);
    }

    #[test]
    fn test_chunk_compression() {
        let mut chunk = Chunk::new(key());
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                chunk.set_block(x, 0, z, Material::BEDROCK);
                chunk.set_block(x, 62, z, Material::WATER);
            }
        }
        chunk.set_block(3, 62, 3, Material::ICE);

        let temp_path = std::env::temp_dir().join(format!(
            "tidewater_chunk_{}.bin",
            std::process::id()
        ));
        chunk.save_compressed(&temp_path).unwrap();

        let file_size = std::fs::metadata(&temp_path).unwrap().len();
        assert!((file_size as usize) < Chunk::data_size());

        let loaded = Chunk::load_compressed(&temp_path, key()).unwrap();
        assert_eq!(loaded.count(Material::BEDROCK), CHUNK_SIZE * CHUNK_SIZE);
        assert_eq!(loaded.count(Material::WATER), CHUNK_SIZE * CHUNK_SIZE - 1);
        assert_eq!(loaded.get_block(3, 62, 3), Material::ICE);
        assert!(!loaded.modified);

        std::fs::remove_file(&temp_path).ok();
    }
}
