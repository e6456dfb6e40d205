//! # Diff Applier
//!
//! Flood and drain passes over a single region.
//!
//! ## UP
//!
//! Each column is tested at the default level. Fluid or air there means the
//! column is open sea: every empty cell strictly above it, up to the target,
//! becomes fluid. Ice at the default level is thawed first so the waterline
//! exists before anything is stacked on it. Solid columns are left alone and
//! solid cells inside an open column are never displaced.
//!
//! Cells already holding fluid produce no record, so repeating a pass with the
//! same target is a no-op.
//!
//! ## DOWN
//!
//! Every tracked record of the region above the target goes back to its
//! original material and leaves the map.
//!
//! Thaw records sit at the default level itself, so a drain back to the
//! default leaves them in place. Only a drain below the default refreezes the
//! base.

use tracing::{debug, warn};

use crate::cell::CellKey;
use crate::host::RegionHandle;
use crate::material::Material;
use crate::state::{ChangeRecord, SeaChange, SeaLevelState};

/// Counters from one region pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionReport {
    /// Cells newly filled with fluid above the default level.
    pub flooded: usize,
    /// Frozen cells at the default level converted to fluid.
    pub thawed: usize,
    /// Records restored to their original material.
    pub reverted: usize,
    /// Records dropped because the cell no longer held engine fluid.
    pub dropped: usize,
    /// Writes the host refused.
    pub rejected: usize,
}

impl RegionReport {
    /// Records created by this pass.
    #[must_use]
    pub const fn created(&self) -> usize {
        self.flooded + self.thawed
    }

    /// Records removed by this pass.
    #[must_use]
    pub const fn removed(&self) -> usize {
        self.reverted + self.dropped + self.rejected
    }

    /// Adds another report's counters into this one.
    pub fn absorb(&mut self, other: Self) {
        self.flooded += other.flooded;
        self.thawed += other.thawed;
        self.reverted += other.reverted;
        self.dropped += other.dropped;
        self.rejected += other.rejected;
    }
}

/// Applies one direction of change to one region.
///
/// Updates the region's entry in `region_levels` but never the world's
/// current level; the caller commits that after every loaded region is done.
/// Does nothing if the state has no default level yet or `direction` is
/// [`SeaChange::None`].
pub fn apply_region<R>(
    region: &mut R,
    direction: SeaChange,
    target_level: i32,
    state: &mut SeaLevelState,
) -> RegionReport
where
    R: RegionHandle + ?Sized,
{
    let Some(default_level) = state.default_level() else {
        return RegionReport::default();
    };

    let report = match direction {
        SeaChange::Up => flood(region, default_level, target_level, state),
        SeaChange::Down => drain(region, target_level, state),
        SeaChange::None => return RegionReport::default(),
    };

    state.set_region_level(region.key(), target_level);
    debug!(
        region = %region.key(),
        direction = direction.name(),
        target = target_level,
        created = report.created(),
        removed = report.removed(),
        tracked = state.tracked().len(),
        "region pass complete"
    );
    report
}

/// Frozen bases are thawed even when `target` is below `base`, leaving thaw
/// records above the current level until a later drain passes under them.
fn flood<R>(region: &mut R, base: i32, target: i32, state: &mut SeaLevelState) -> RegionReport
where
    R: RegionHandle + ?Sized,
{
    let key = region.key();
    let mut report = RegionReport::default();

    for (x, z) in key.columns() {
        let floor = region.cell_at(x, base, z);

        if floor.is_frozen_fluid() {
            let cell = CellKey::new(key.world, x, base, z);
            if !place_fluid(region, state, cell, floor, &mut report) {
                continue;
            }
            report.thawed += 1;
        } else if !(floor.is_fluid() || floor.is_empty()) {
            continue;
        }

        for y in (base + 1)..=target {
            let current = region.cell_at(x, y, z);
            if !(current.is_empty() || current.is_frozen_fluid()) {
                continue;
            }
            let cell = CellKey::new(key.world, x, y, z);
            if place_fluid(region, state, cell, current, &mut report) {
                report.flooded += 1;
            }
        }
    }

    report
}

fn drain<R>(region: &mut R, target: i32, state: &mut SeaLevelState) -> RegionReport
where
    R: RegionHandle + ?Sized,
{
    let mut report = RegionReport::default();

    for cell in state.tracked().above_in_region(region.key(), target) {
        let Some(record) = state.tracked_mut().remove(&cell) else {
            continue;
        };

        if region.cell_at(cell.x, cell.y, cell.z) != record.applied {
            debug!(%cell, "tracked cell was overridden, dropping record");
            report.dropped += 1;
            continue;
        }

        match region.set_cell(cell.x, cell.y, cell.z, record.original) {
            Ok(()) => report.reverted += 1,
            Err(rejected) => {
                warn!(%rejected, original = record.original.id(), "revert refused, record dropped");
                report.rejected += 1;
            }
        }
    }

    report
}

/// Writes fluid into `cell` and tracks it. Returns false if the host refused.
fn place_fluid<R>(
    region: &mut R,
    state: &mut SeaLevelState,
    cell: CellKey,
    previous: Material,
    report: &mut RegionReport,
) -> bool
where
    R: RegionHandle + ?Sized,
{
    if let Err(rejected) = region.set_cell(cell.x, cell.y, cell.z, Material::WATER) {
        warn!(%rejected, "flood write refused");
        report.rejected += 1;
        return false;
    }

    // A stale record already knows what the cell was before any flooding.
    let original = state
        .tracked()
        .get(&cell)
        .map_or(previous, |record| record.original);
    state
        .tracked_mut()
        .insert(ChangeRecord::new(cell, original, Material::WATER));
    true
}
