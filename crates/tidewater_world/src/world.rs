//! # Voxel World
//!
//! A map of loaded chunks around which the sea-level engine runs.
//!
//! Chunks are generated on first load. With a storage directory, unloading
//! a chunk writes it to `chunk_{x}_{z}.bin` and the next load reads it back,
//! so engine-made changes survive the round trip.
//!
//! The mutation helpers (`place_block`, `empty_bucket`, `propose_flow`) do
//! the world-side part of an edit and hand back the event the engine must
//! be told about.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tidewater_core::{
    BlockFace, CellKey, Environment, FluidFlow, Material, MutationEvent, RegionHandle, RegionKey,
    WorldId, WorldView,
};
use tracing::{debug, warn};

use crate::chunk::{Chunk, CHUNK_HEIGHT};
use crate::generator::ChunkGenerator;

/// Load/unload counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks produced by the generator.
    pub generated: u64,
    /// Chunks read back from storage.
    pub loaded_from_disk: u64,
    /// Chunks unloaded.
    pub unloaded: u64,
}

/// A chunked voxel world.
pub struct VoxelWorld {
    id: WorldId,
    environment: Environment,
    generator: ChunkGenerator,
    chunks: HashMap<RegionKey, Chunk>,
    storage: Option<PathBuf>,
    stats: WorldStats,
}

impl VoxelWorld {
    /// Creates an overworld with no chunks loaded and no storage.
    #[must_use]
    pub fn new(id: WorldId, generator: ChunkGenerator) -> Self {
        Self {
            id,
            environment: Environment::Overworld,
            generator,
            chunks: HashMap::new(),
            storage: None,
            stats: WorldStats::default(),
        }
    }

    /// Sets the kind of world.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Persists unloaded chunks under `dir`.
    #[must_use]
    pub fn with_storage(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage = Some(dir.into());
        self
    }

    /// Load/unload counters.
    #[must_use]
    pub const fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Number of loaded chunks.
    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the chunk at `key` is loaded.
    #[must_use]
    pub fn is_loaded(&self, key: RegionKey) -> bool {
        self.chunks.contains_key(&key)
    }

    fn chunk_path(dir: &Path, key: RegionKey) -> PathBuf {
        dir.join(format!("chunk_{}_{}.bin", key.x, key.z))
    }

    /// Loads a chunk from storage, or generates it.
    pub fn load_chunk(&mut self, chunk_x: i32, chunk_z: i32) {
        let key = RegionKey::new(self.id, chunk_x, chunk_z);
        if self.chunks.contains_key(&key) {
            return;
        }

        let stored = self
            .storage
            .as_deref()
            .map(|dir| Self::chunk_path(dir, key))
            .filter(|path| path.exists());

        let chunk = match stored {
            Some(path) => match Chunk::load_compressed(&path, key) {
                Ok(chunk) => {
                    self.stats.loaded_from_disk += 1;
                    chunk
                }
                Err(e) => {
                    warn!(chunk = %key, error = %e, "stored chunk unreadable, regenerating");
                    self.stats.generated += 1;
                    self.generator.generate(key)
                }
            },
            None => {
                self.stats.generated += 1;
                self.generator.generate(key)
            }
        };

        debug!(chunk = %key, "chunk loaded");
        self.chunks.insert(key, chunk);
    }

    /// Unloads a chunk, writing it to storage if configured.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the chunk could not be written. The chunk
    /// stays loaded in that case.
    pub fn unload_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> std::io::Result<bool> {
        let key = RegionKey::new(self.id, chunk_x, chunk_z);
        let Some(chunk) = self.chunks.get(&key) else {
            return Ok(false);
        };

        if let Some(dir) = self.storage.as_deref() {
            std::fs::create_dir_all(dir)?;
            chunk.save_compressed(&Self::chunk_path(dir, key))?;
        }

        self.chunks.remove(&key);
        self.stats.unloaded += 1;
        debug!(chunk = %key, "chunk unloaded");
        Ok(true)
    }

    /// Unloads every chunk. Returns the number unloaded.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error; chunks not yet written stay loaded.
    pub fn unload_all(&mut self) -> std::io::Result<usize> {
        let mut unloaded = 0;
        for key in self.loaded_regions() {
            if self.unload_chunk(key.x, key.z)? {
                unloaded += 1;
            }
        }
        Ok(unloaded)
    }

    /// Ensures every chunk within `radius` chunks of a block position is
    /// loaded.
    pub fn ensure_loaded_around(&mut self, block_x: i32, block_z: i32, radius: i32) {
        let center = RegionKey::containing(self.id, block_x, block_z);
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                self.load_chunk(center.x + dx, center.z + dz);
            }
        }
    }

    /// Gets the material at world coordinates, if its chunk is loaded.
    #[must_use]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<Material> {
        let key = RegionKey::containing(self.id, x, z);
        self.chunks.get(&key).map(|chunk| chunk.cell_at(x, y, z))
    }

    /// Sets the material at world coordinates.
    ///
    /// Returns false if the chunk is not loaded or `y` is out of range.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, material: Material) -> bool {
        let key = RegionKey::containing(self.id, x, z);
        self.chunks
            .get_mut(&key)
            .is_some_and(|chunk| chunk.set_cell(x, y, z, material).is_ok())
    }

    /// Places a block by hand.
    ///
    /// Returns the event to hand to the engine, or `None` if the write
    /// failed.
    pub fn place_block(&mut self, x: i32, y: i32, z: i32, material: Material) -> Option<MutationEvent> {
        self.set_block(x, y, z, material).then(|| MutationEvent::BlockPlaced {
            cell: CellKey::new(self.id, x, y, z),
        })
    }

    /// Empties a water bucket against `face` of the clicked block.
    ///
    /// Water lands in the neighbouring cell if it is empty or already a
    /// liquid.
    pub fn empty_bucket(&mut self, clicked: CellKey, face: BlockFace) -> Option<MutationEvent> {
        let into = clicked.relative(face)?;
        let current = self.get_block(into.x, into.y, into.z)?;
        if !(current.is_empty() || current.is_liquid()) {
            return None;
        }
        self.set_block(into.x, into.y, into.z, Material::WATER)
            .then_some(MutationEvent::BucketEmptied { clicked, face })
    }

    /// Describes liquid at `source` spreading through `face`, if it could.
    ///
    /// Nothing is written: the host asks the engine first, then calls
    /// [`VoxelWorld::apply_flow`] unless the flow was denied.
    #[must_use]
    pub fn propose_flow(&self, source: CellKey, face: BlockFace) -> Option<FluidFlow> {
        let fluid = self.get_block(source.x, source.y, source.z)?;
        if !fluid.is_liquid() {
            return None;
        }
        let target = source.relative(face)?;
        let previous = self.get_block(target.x, target.y, target.z)?;
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let in_height = (0..CHUNK_HEIGHT as i32).contains(&target.y);
        (in_height && previous.is_empty()).then_some(FluidFlow {
            source,
            target,
            previous,
            fluid,
        })
    }

    /// Writes an allowed flow.
    pub fn apply_flow(&mut self, flow: &FluidFlow) -> bool {
        self.set_block(flow.target.x, flow.target.y, flow.target.z, flow.fluid)
    }
}

impl WorldView for VoxelWorld {
    type Region = Chunk;

    fn id(&self) -> WorldId {
        self.id
    }

    fn native_sea_level(&self) -> i32 {
        self.generator.sea_level()
    }

    fn environment(&self) -> Environment {
        self.environment
    }

    fn loaded_regions(&self) -> Vec<RegionKey> {
        let mut keys: Vec<RegionKey> = self.chunks.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    fn region_mut(&mut self, key: RegionKey) -> Option<&mut Chunk> {
        self.chunks.get_mut(&key)
    }
}
