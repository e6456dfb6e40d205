//! # Sea-Level State
//!
//! The persisted per-world record: baseline level, applied level, the
//! direction of the last transition and every cell the engine flooded.
//!
//! ## Invariants
//!
//! - `default_level` is written once and never again.
//! - `current_level` only moves after a full pass over all loaded regions.
//! - A cell is in `tracked` exactly while it holds engine-placed fluid that
//!   has not been reverted or claimed by someone else.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cell::{CellKey, RegionKey};
use crate::material::Material;

/// Direction of the most recent level transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SeaChange {
    /// Level went up: propagated fluid is tracked.
    Up = 1,
    /// Level went down: fluid propagation is vetoed.
    Down = 2,
    /// Level unchanged on the last tick.
    #[default]
    None = 0,
}

impl SeaChange {
    /// Converts from u8.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Up),
            2 => Some(Self::Down),
            _ => None,
        }
    }

    /// Lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::None => "none",
        }
    }
}

/// What a cell was before the engine touched it, and what it became.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChangeRecord {
    /// The modified cell.
    pub location: CellKey,
    /// Material before the edit; restored on drain.
    pub original: Material,
    /// Material the engine wrote.
    pub applied: Material,
}

impl ChangeRecord {
    /// Creates a new change record.
    #[inline]
    #[must_use]
    pub const fn new(location: CellKey, original: Material, applied: Material) -> Self {
        Self {
            location,
            original,
            applied,
        }
    }
}

/// Map of tracked cell changes keyed by location.
///
/// Keeps a per-region index beside the records so a drain pass visits only
/// the records of the region it is working on. The index is derived data:
/// it is rebuilt on restore and ignored by equality.
#[derive(Clone, Debug, Default)]
pub struct TrackedChanges {
    records: BTreeMap<CellKey, ChangeRecord>,
    by_region: HashMap<RegionKey, BTreeSet<CellKey>>,
}

impl TrackedChanges {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for a cell.
    #[must_use]
    pub fn get(&self, cell: &CellKey) -> Option<&ChangeRecord> {
        self.records.get(cell)
    }

    /// Returns true if the cell is tracked.
    #[must_use]
    pub fn contains(&self, cell: &CellKey) -> bool {
        self.records.contains_key(cell)
    }

    /// Inserts a record, replacing any record at the same location.
    pub fn insert(&mut self, record: ChangeRecord) -> Option<ChangeRecord> {
        let key = record.location;
        self.by_region.entry(key.region()).or_default().insert(key);
        self.records.insert(key, record)
    }

    /// Removes the record at `cell`, if any.
    pub fn remove(&mut self, cell: &CellKey) -> Option<ChangeRecord> {
        let removed = self.records.remove(cell)?;
        let region = cell.region();
        if let Some(keys) = self.by_region.get_mut(&region) {
            keys.remove(cell);
            if keys.is_empty() {
                self.by_region.remove(&region);
            }
        }
        Some(removed)
    }

    /// Iterates over all records in location order.
    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.values()
    }

    /// Number of records inside one region.
    #[must_use]
    pub fn count_in_region(&self, region: RegionKey) -> usize {
        self.by_region.get(&region).map_or(0, BTreeSet::len)
    }

    /// Locations in `region` whose `y` is strictly above `level`.
    #[must_use]
    pub fn above_in_region(&self, region: RegionKey, level: i32) -> Vec<CellKey> {
        self.by_region
            .get(&region)
            .map(|keys| keys.iter().filter(|key| key.y > level).copied().collect())
            .unwrap_or_default()
    }
}

impl PartialEq for TrackedChanges {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for TrackedChanges {}

impl FromIterator<ChangeRecord> for TrackedChanges {
    fn from_iter<I: IntoIterator<Item = ChangeRecord>>(iter: I) -> Self {
        let mut tracked = Self::new();
        for record in iter {
            tracked.insert(record);
        }
        tracked
    }
}

/// Sea-level state of one world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeaLevelState {
    default_level: Option<i32>,
    current_level: Option<i32>,
    last_change: SeaChange,
    tracked: TrackedChanges,
    region_levels: BTreeMap<RegionKey, i32>,
}

impl SeaLevelState {
    /// Creates a fresh, unobserved state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassembles a state from its persisted parts.
    pub(crate) fn from_parts(
        default_level: Option<i32>,
        current_level: Option<i32>,
        last_change: SeaChange,
        tracked: TrackedChanges,
        region_levels: BTreeMap<RegionKey, i32>,
    ) -> Self {
        Self {
            default_level,
            current_level,
            last_change,
            tracked,
            region_levels,
        }
    }

    /// Baseline level, once observed.
    #[must_use]
    pub const fn default_level(&self) -> Option<i32> {
        self.default_level
    }

    /// Level currently applied to the world.
    #[must_use]
    pub const fn current_level(&self) -> Option<i32> {
        self.current_level
    }

    /// Direction of the last transition.
    #[must_use]
    pub const fn last_change(&self) -> SeaChange {
        self.last_change
    }

    /// Tracked cell changes.
    #[must_use]
    pub const fn tracked(&self) -> &TrackedChanges {
        &self.tracked
    }

    /// Mutable access to the tracked cell changes.
    pub fn tracked_mut(&mut self) -> &mut TrackedChanges {
        &mut self.tracked
    }

    /// Last level applied to each visited region.
    #[must_use]
    pub const fn region_levels(&self) -> &BTreeMap<RegionKey, i32> {
        &self.region_levels
    }

    /// Last level applied to one region, `None` if never filled.
    #[must_use]
    pub fn region_level(&self, region: RegionKey) -> Option<i32> {
        self.region_levels.get(&region).copied()
    }

    /// Records the world's baseline on first observation.
    ///
    /// Sets `default_level` if unset and seeds `current_level` from it if that
    /// is unset too. Returns true if the baseline was newly recorded.
    pub fn observe_baseline(&mut self, level: i32) -> bool {
        let fresh = self.default_level.is_none();
        if fresh {
            self.default_level = Some(level);
        }
        if self.current_level.is_none() {
            self.current_level = self.default_level;
        }
        fresh
    }

    pub(crate) fn set_region_level(&mut self, region: RegionKey, level: i32) {
        self.region_levels.insert(region, level);
    }

    pub(crate) fn set_last_change(&mut self, change: SeaChange) {
        self.last_change = change;
    }

    /// Publishes a completed transition.
    pub(crate) fn commit_level(&mut self, level: i32, change: SeaChange) {
        self.current_level = Some(level);
        self.last_change = change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::WorldId;

    const W: WorldId = WorldId(7);

    fn water_at(x: i32, y: i32, z: i32) -> ChangeRecord {
        ChangeRecord::new(CellKey::new(W, x, y, z), Material::AIR, Material::WATER)
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut tracked = TrackedChanges::new();
        tracked.insert(water_at(1, 63, 1));
        let replaced = tracked.insert(ChangeRecord::new(
            CellKey::new(W, 1, 63, 1),
            Material::ICE,
            Material::WATER,
        ));

        assert_eq!(replaced, Some(water_at(1, 63, 1)));
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked.count_in_region(RegionKey::new(W, 0, 0)), 1);
    }

    #[test]
    fn test_region_index_follows_removal() {
        let mut tracked: TrackedChanges = [
            water_at(0, 63, 0),
            water_at(0, 64, 0),
            water_at(20, 63, 0),
        ]
        .into_iter()
        .collect();

        let home = RegionKey::new(W, 0, 0);
        assert_eq!(tracked.count_in_region(home), 2);
        assert_eq!(tracked.above_in_region(home, 63), vec![CellKey::new(W, 0, 64, 0)]);

        tracked.remove(&CellKey::new(W, 0, 63, 0));
        tracked.remove(&CellKey::new(W, 0, 64, 0));
        assert_eq!(tracked.count_in_region(home), 0);
        assert_eq!(tracked.count_in_region(RegionKey::new(W, 1, 0)), 1);
        assert!(tracked.remove(&CellKey::new(W, 0, 64, 0)).is_none());
    }

    #[test]
    fn test_baseline_is_set_once() {
        let mut state = SeaLevelState::new();
        assert!(state.observe_baseline(62));
        assert!(!state.observe_baseline(70));
        assert_eq!(state.default_level(), Some(62));
        assert_eq!(state.current_level(), Some(62));
    }

    #[test]
    fn test_sea_change_tag_roundtrip() {
        for change in [SeaChange::Up, SeaChange::Down, SeaChange::None] {
            assert_eq!(SeaChange::from_u8(change as u8), Some(change));
        }
        assert_eq!(SeaChange::from_u8(9), None);
    }
}
