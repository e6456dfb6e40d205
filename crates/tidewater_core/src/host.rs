//! # Host Interfaces
//!
//! The engine never owns world data. It reads and writes cells through these
//! traits and reads the climate signal through [`ClimateSource`].

use serde::{Deserialize, Serialize};

use crate::cell::{RegionKey, WorldId};
use crate::error::WriteRejected;
use crate::material::Material;

/// Kind of world. Only overworlds have a sea.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Surface world with an ocean.
    #[default]
    Overworld,
    /// Underworld, no sea.
    Nether,
    /// Void world, no sea.
    End,
}

impl Environment {
    /// Returns true if sea-level simulation applies to this kind of world.
    #[must_use]
    pub const fn has_sea(self) -> bool {
        matches!(self, Self::Overworld)
    }
}

/// A loaded region of the host world.
///
/// Coordinates are world coordinates of cells inside this region.
pub trait RegionHandle {
    /// Key of this region.
    fn key(&self) -> RegionKey;

    /// Material at a cell. Cells outside the world's height read as air.
    fn cell_at(&self, x: i32, y: i32, z: i32) -> Material;

    /// Writes a cell.
    ///
    /// # Errors
    ///
    /// Returns [`WriteRejected`] if the host refuses the write (for example
    /// outside build height or outside this region).
    fn set_cell(&mut self, x: i32, y: i32, z: i32, material: Material) -> Result<(), WriteRejected>;
}

/// The host world as seen by the engine.
pub trait WorldView {
    /// Region type handed out for loaded regions.
    type Region: RegionHandle;

    /// Identity of this world.
    fn id(&self) -> WorldId;

    /// Sea level the world was generated with.
    fn native_sea_level(&self) -> i32;

    /// Kind of world.
    fn environment(&self) -> Environment;

    /// Keys of every region currently loaded.
    fn loaded_regions(&self) -> Vec<RegionKey>;

    /// Mutable access to a loaded region.
    fn region_mut(&mut self, key: RegionKey) -> Option<&mut Self::Region>;
}

/// Supplies the climate signal that drives the sea level.
pub trait ClimateSource {
    /// Current temperature of a world.
    fn temperature(&self, world: WorldId) -> f64;
}

impl<F> ClimateSource for F
where
    F: Fn(WorldId) -> f64,
{
    fn temperature(&self, world: WorldId) -> f64 {
        self(world)
    }
}
