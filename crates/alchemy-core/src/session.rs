//! Per-vessel fusion sessions: absorbed solids plus the in-progress match.
//!
//! Sessions are ephemeral. They are rebuilt by re-absorbing ingredients after
//! a restart and are never persisted.

use crate::fixed::Millis;
use crate::id::{BlockPos, ItemCode, RecipeId};
use std::collections::{BTreeMap, HashMap};

/// Where a session sits in the fusion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionState {
    Idle,
    Matching { recipe: RecipeId, started_at: Millis },
}

/// Accumulated state for one heated vessel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionSession {
    absorbed: BTreeMap<ItemCode, u32>,
    matched: Option<RecipeId>,
    match_started_at: Option<Millis>,
}

impl FusionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` of `item` to the absorbed solids.
    pub fn absorb(&mut self, item: ItemCode, count: u32) {
        if count == 0 {
            return;
        }
        let slot = self.absorbed.entry(item).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    pub fn absorbed(&self) -> &BTreeMap<ItemCode, u32> {
        &self.absorbed
    }

    pub fn absorbed_count(&self, item: &ItemCode) -> u32 {
        self.absorbed.get(item).copied().unwrap_or(0)
    }

    pub fn matched(&self) -> Option<RecipeId> {
        self.matched
    }

    pub fn match_started_at(&self) -> Option<Millis> {
        self.match_started_at
    }

    pub fn state(&self) -> FusionState {
        match (self.matched, self.match_started_at) {
            (Some(recipe), Some(started_at)) => FusionState::Matching { recipe, started_at },
            _ => FusionState::Idle,
        }
    }

    /// Start (or restart) the hold timer for `recipe`.
    pub fn begin_match(&mut self, recipe: RecipeId, now: Millis) {
        self.matched = Some(recipe);
        self.match_started_at = Some(now);
    }

    /// Drop the match and its timer. Absorbed solids stay.
    pub fn clear_match(&mut self) {
        self.matched = None;
        self.match_started_at = None;
    }

    /// Drop everything: absorbed solids and the match.
    pub fn reset(&mut self) {
        self.absorbed.clear();
        self.clear_match();
    }

    pub fn is_empty(&self) -> bool {
        self.absorbed.is_empty() && self.matched.is_none()
    }
}

/// Owned table of sessions keyed by vessel position.
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    sessions: HashMap<BlockPos, FusionSession>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: BlockPos) -> Option<&FusionSession> {
        self.sessions.get(&pos)
    }

    pub fn get_mut(&mut self, pos: BlockPos) -> Option<&mut FusionSession> {
        self.sessions.get_mut(&pos)
    }

    /// Session at `pos`, created empty on first use.
    pub fn entry(&mut self, pos: BlockPos) -> &mut FusionSession {
        self.sessions.entry(pos).or_default()
    }

    pub fn absorb(&mut self, pos: BlockPos, item: ItemCode, count: u32) {
        self.entry(pos).absorb(item, count);
    }

    /// Forget the session at `pos`. Returns it if there was one.
    pub fn evict(&mut self, pos: BlockPos) -> Option<FusionSession> {
        self.sessions.remove(&pos)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.sessions.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.sessions.keys().copied()
    }
}
