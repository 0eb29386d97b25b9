use crate::id::{ActorId, BlockPos};
use std::collections::BTreeSet;

/// Tracks which vessels and held slots have been modified since the last
/// clean point.
///
/// The host reads this after handling a notification to decide what to
/// persist and sync to clients. Call [`mark_clean`](DirtyTracker::mark_clean)
/// once everything has been flushed.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_vessels: BTreeSet<BlockPos>,
    dirty_blocks: BTreeSet<BlockPos>,
    dirty_held: BTreeSet<ActorId>,
    any_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the vessel stack at `pos` as changed.
    pub fn mark_vessel(&mut self, pos: BlockPos) {
        self.dirty_vessels.insert(pos);
        self.any_dirty = true;
    }

    /// Mark the block at `pos` for a visual refresh (e.g. mesh rebuild).
    pub fn mark_block(&mut self, pos: BlockPos) {
        self.dirty_blocks.insert(pos);
        self.any_dirty = true;
    }

    /// Mark the active slot of `actor` as changed.
    pub fn mark_held(&mut self, actor: ActorId) {
        self.dirty_held.insert(actor);
        self.any_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.any_dirty
    }

    pub fn is_vessel_dirty(&self, pos: BlockPos) -> bool {
        self.dirty_vessels.contains(&pos)
    }

    pub fn is_block_dirty(&self, pos: BlockPos) -> bool {
        self.dirty_blocks.contains(&pos)
    }

    pub fn is_held_dirty(&self, actor: ActorId) -> bool {
        self.dirty_held.contains(&actor)
    }

    pub fn dirty_vessels(&self) -> &BTreeSet<BlockPos> {
        &self.dirty_vessels
    }

    pub fn dirty_blocks(&self) -> &BTreeSet<BlockPos> {
        &self.dirty_blocks
    }

    pub fn dirty_held(&self) -> &BTreeSet<ActorId> {
        &self.dirty_held
    }

    /// Reset all dirty flags, marking everything as clean.
    pub fn mark_clean(&mut self) {
        self.dirty_vessels.clear();
        self.dirty_blocks.clear();
        self.dirty_held.clear();
        self.any_dirty = false;
    }
}
