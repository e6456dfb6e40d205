//! # Chunk Generator
//!
//! Deterministic terrain with a sea. Two profiles:
//!
//! - **Flat**: every column has its ground at one height. Used by tests that
//!   need exact cell counts.
//! - **Rolling**: value-noise hills and basins around the sea level, with a
//!   seeded share of frozen sea surface.
//!
//! Columns are filled bottom to top: bedrock, stone, dirt, surface, then
//! water up to `sea_level - 1` wherever the ground lies below it.

use tidewater_core::{Material, RegionKey};

use crate::chunk::{Chunk, CHUNK_HEIGHT, CHUNK_SIZE};

/// Shape of the generated ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TerrainProfile {
    /// Ground at the same height everywhere.
    Flat {
        /// Y of the surface cell.
        ground: i32,
    },
    /// Smooth hills and basins.
    Rolling {
        /// World seed.
        seed: u64,
        /// Maximum distance of the ground from the sea level.
        relief: i32,
        /// Share of sea columns frozen at the surface (0.0 - 1.0).
        ice_fraction: f64,
    },
}

/// Chunk generator.
#[derive(Clone, Debug)]
pub struct ChunkGenerator {
    profile: TerrainProfile,
    /// Native sea level: water fills up to `sea_level - 1`.
    sea_level: i32,
}

impl ChunkGenerator {
    /// Default sea level.
    pub const DEFAULT_SEA_LEVEL: i32 = 63;

    /// Lattice spacing of the rolling profile, in cells.
    const LATTICE: i32 = 24;

    /// Creates a generator.
    #[must_use]
    pub const fn new(profile: TerrainProfile) -> Self {
        Self {
            profile,
            sea_level: Self::DEFAULT_SEA_LEVEL,
        }
    }

    /// Flat terrain with its ground at `ground`.
    #[must_use]
    pub const fn flat(ground: i32) -> Self {
        Self::new(TerrainProfile::Flat { ground })
    }

    /// Rolling terrain from a seed.
    #[must_use]
    pub const fn rolling(seed: u64) -> Self {
        Self::new(TerrainProfile::Rolling {
            seed,
            relief: 8,
            ice_fraction: 0.1,
        })
    }

    /// Sets the sea level.
    #[must_use]
    pub const fn with_sea_level(mut self, level: i32) -> Self {
        self.sea_level = level;
        self
    }

    /// Native sea level.
    #[must_use]
    pub const fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Generates the chunk at `key`.
    #[must_use]
    pub fn generate(&self, key: RegionKey) -> Chunk {
        let mut chunk = Chunk::new(key);

        for local_z in 0..CHUNK_SIZE {
            for local_x in 0..CHUNK_SIZE {
                #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                let (block_x, block_z) = (
                    key.origin_x() + local_x as i32,
                    key.origin_z() + local_z as i32,
                );
                self.generate_column(&mut chunk, local_x, local_z, block_x, block_z);
            }
        }

        chunk.modified = false;
        chunk
    }

    /// Surface height of a column.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn ground_height(&self, block_x: i32, block_z: i32) -> i32 {
        let height = match self.profile {
            TerrainProfile::Flat { ground } => ground,
            TerrainProfile::Rolling { seed, relief, .. } => {
                let n = value_noise(seed, block_x, block_z, Self::LATTICE);
                let offset = ((n * 2.0 - 1.0) * f64::from(relief)).round() as i32;
                self.sea_level - 1 + offset
            }
        };
        height.clamp(1, CHUNK_HEIGHT as i32 - 1)
    }

    /// Returns true if the sea surface above this column is frozen.
    fn frozen(&self, block_x: i32, block_z: i32) -> bool {
        match self.profile {
            TerrainProfile::Flat { .. } => false,
            TerrainProfile::Rolling { seed, ice_fraction, .. } => {
                unit(hash3(seed ^ 0x1CE, block_x, block_z)) < ice_fraction
            }
        }
    }

    #[allow(
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap,
        clippy::cast_possible_truncation
    )]
    fn generate_column(
        &self,
        chunk: &mut Chunk,
        local_x: usize,
        local_z: usize,
        block_x: i32,
        block_z: i32,
    ) {
        let ground = self.ground_height(block_x, block_z);
        let water_top = self.sea_level - 1;
        let frozen = self.frozen(block_x, block_z);

        for y in 0..CHUNK_HEIGHT as i32 {
            let material = if y == 0 {
                Material::BEDROCK
            } else if y < ground - 3 {
                Material::STONE
            } else if y < ground {
                Material::DIRT
            } else if y == ground {
                if ground < water_top {
                    Material::SAND
                } else {
                    Material::GRASS
                }
            } else if y < water_top {
                Material::WATER
            } else if y == water_top && ground < water_top {
                if frozen {
                    Material::ICE
                } else {
                    Material::WATER
                }
            } else {
                break;
            };

            chunk.set_block(local_x, y as usize, local_z, material);
        }
    }
}

/// Bilinear value noise in `[0, 1)` on a square lattice.
fn value_noise(seed: u64, x: i32, z: i32, lattice: i32) -> f64 {
    let (cx, cz) = (x.div_euclid(lattice), z.div_euclid(lattice));
    let tx = f64::from(x.rem_euclid(lattice)) / f64::from(lattice);
    let tz = f64::from(z.rem_euclid(lattice)) / f64::from(lattice);
    let (sx, sz) = (smooth(tx), smooth(tz));

    let corner = |dx: i32, dz: i32| unit(hash3(seed, cx + dx, cz + dz));
    let top = lerp(corner(0, 0), corner(1, 0), sx);
    let bottom = lerp(corner(0, 1), corner(1, 1), sx);
    lerp(top, bottom, sz)
}

fn smooth(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// SplitMix64 over seed and coordinates.
#[allow(clippy::cast_sign_loss)]
fn hash3(seed: u64, x: i32, z: i32) -> u64 {
    let mut h = seed
        ^ (u64::from(x as u32)).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (u64::from(z as u32)).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

#[allow(clippy::cast_precision_loss)]
fn unit(h: u64) -> f64 {
    (h >> 11) as f64 / (1u64 << 53) as f64
}
