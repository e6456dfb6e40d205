//! # Reconciliation Handlers
//!
//! Keep the tracked set honest while the world changes underneath it.
//! Every handler is a small, synchronous update of the state with no world
//! access and no failure path: an absent key is a silent no-op.

use crate::cell::{BlockFace, CellKey, WorldId};
use crate::material::Material;
use crate::state::{ChangeRecord, SeaChange, SeaLevelState};

/// Fluid about to spread from one cell into another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FluidFlow {
    /// Cell the fluid flows out of.
    pub source: CellKey,
    /// Cell the fluid flows into.
    pub target: CellKey,
    /// Material of `target` before the flow.
    pub previous: Material,
    /// The flowing material.
    pub fluid: Material,
}

/// Answer to a fluid-flow notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowVerdict {
    /// Let the flow happen.
    Allow,
    /// Cancel the flow.
    Deny,
}

impl FlowVerdict {
    /// Returns true for [`FlowVerdict::Deny`].
    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Deny)
    }
}

/// A world mutation made by someone other than the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationEvent {
    /// A block was placed by hand.
    BlockPlaced {
        /// Where it was placed.
        cell: CellKey,
    },
    /// A bucket was emptied against a block face.
    BucketEmptied {
        /// The block that was clicked.
        clicked: CellKey,
        /// The face that was clicked.
        face: BlockFace,
    },
    /// Fluid is about to spread.
    FluidFlow(FluidFlow),
}

impl MutationEvent {
    /// Cell the event acts on. `None` for a bucket emptied past the edge of
    /// the coordinate space.
    #[must_use]
    pub const fn cell(&self) -> Option<CellKey> {
        match self {
            Self::BlockPlaced { cell } => Some(*cell),
            Self::BucketEmptied { clicked, face } => clicked.relative(*face),
            Self::FluidFlow(flow) => Some(flow.target),
        }
    }

    /// World the event happened in.
    #[must_use]
    pub const fn world(&self) -> WorldId {
        match self {
            Self::BlockPlaced { cell } => cell.world,
            Self::BucketEmptied { clicked, .. } => clicked.world,
            Self::FluidFlow(flow) => flow.target.world,
        }
    }
}

/// A placed block claims its cell: the engine will no longer revert it.
///
/// Returns true if a record was removed.
pub fn on_block_placed(state: &mut SeaLevelState, cell: CellKey) -> bool {
    state.tracked_mut().remove(&cell).is_some()
}

/// Emptying a bucket claims the cell in front of the clicked face.
///
/// Returns true if a record was removed. A face pointing past the edge of
/// the coordinate space claims nothing.
pub fn on_bucket_emptied(state: &mut SeaLevelState, clicked: CellKey, face: BlockFace) -> bool {
    clicked
        .relative(face)
        .is_some_and(|cell| on_block_placed(state, cell))
}

/// Intercepts fluid spreading into a new cell.
///
/// While the sea is rising, spread water becomes tracked so a later drain can
/// take it back. While it is falling, spreading is vetoed. Without a recent
/// change, or for liquids other than the sea fluid, nothing happens.
pub fn on_fluid_flow(state: &mut SeaLevelState, flow: FluidFlow) -> FlowVerdict {
    if !flow.fluid.is_fluid() {
        return FlowVerdict::Allow;
    }

    match state.last_change() {
        SeaChange::Up => {
            let original = state
                .tracked()
                .get(&flow.target)
                .map_or(flow.previous, |record| record.original);
            state
                .tracked_mut()
                .insert(ChangeRecord::new(flow.target, original, flow.fluid));
            FlowVerdict::Allow
        }
        SeaChange::Down => FlowVerdict::Deny,
        SeaChange::None => FlowVerdict::Allow,
    }
}

/// Dispatches any mutation event to its handler.
///
/// Only fluid flow can ever produce [`FlowVerdict::Deny`].
pub fn reconcile(state: &mut SeaLevelState, event: MutationEvent) -> FlowVerdict {
    match event {
        MutationEvent::BlockPlaced { cell } => {
            on_block_placed(state, cell);
            FlowVerdict::Allow
        }
        MutationEvent::BucketEmptied { clicked, face } => {
            on_bucket_emptied(state, clicked, face);
            FlowVerdict::Allow
        }
        MutationEvent::FluidFlow(flow) => on_fluid_flow(state, flow),
    }
}
