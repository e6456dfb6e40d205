//! # Materials
//!
//! A cell's material is a raw block-type id. The engine only cares about four
//! classes: empty, fluid, frozen fluid and "everything else" (solid terrain,
//! plants, player builds). Ids it does not know are carried verbatim so a
//! snapshot can restore any host block.

use bytemuck::{Pod, Zeroable};

/// Block-type id of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Material(pub u16);

impl Material {
    /// Air (empty).
    pub const AIR: Self = Self(0);
    /// Grass.
    pub const GRASS: Self = Self(1);
    /// Stone.
    pub const STONE: Self = Self(2);
    /// Dirt.
    pub const DIRT: Self = Self(3);
    /// Wood/Log.
    pub const WOOD: Self = Self(4);
    /// Leaves.
    pub const LEAVES: Self = Self(5);
    /// Bedrock.
    pub const BEDROCK: Self = Self(7);
    /// Water.
    pub const WATER: Self = Self(10);
    /// Sand.
    pub const SAND: Self = Self(11);
    /// Lava.
    pub const LAVA: Self = Self(12);
    /// Ice.
    pub const ICE: Self = Self(17);
    /// Packed ice.
    pub const PACKED_ICE: Self = Self(18);

    /// Creates a material from a raw id.
    #[inline]
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }

    /// Returns true for air.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::AIR.0
    }

    /// Returns true for the fluid the sea is made of.
    #[inline]
    #[must_use]
    pub const fn is_fluid(self) -> bool {
        self.0 == Self::WATER.0
    }

    /// Returns true for the solid phases of the sea fluid.
    #[inline]
    #[must_use]
    pub const fn is_frozen_fluid(self) -> bool {
        self.0 == Self::ICE.0 || self.0 == Self::PACKED_ICE.0
    }

    /// Returns true for anything that flows (water or lava).
    #[inline]
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        self.is_fluid() || self.0 == Self::LAVA.0
    }
}
