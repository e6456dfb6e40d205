//! # TIDEWATER World
//!
//! Reference voxel host for the sea-level engine.
//!
//! ## Key Components
//!
//! - `Chunk`: 16x16x256 material storage, one engine region per chunk
//! - `ChunkGenerator`: deterministic terrain with a native sea
//! - `VoxelWorld`: loaded-chunk map implementing `WorldView`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tidewater_world::{ChunkGenerator, VoxelWorld};
//!
//! let mut world = VoxelWorld::new(WorldId(1), ChunkGenerator::rolling(42));
//! world.ensure_loaded_around(0, 0, 4);
//! engine.tick(&mut world, temperature);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod generator;
pub mod world;

pub use chunk::{Chunk, CELLS_PER_CHUNK, CHUNK_HEIGHT, CHUNK_SIZE};
pub use generator::{ChunkGenerator, TerrainProfile};
pub use world::{VoxelWorld, WorldStats};
