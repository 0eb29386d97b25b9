//! The host boundary: everything the alchemy system needs from the game
//! world, and nothing more.

use crate::fixed::Fixed64;
use crate::id::{ActorId, BlockPos, EntityId};
use crate::item::ItemStack;

/// A loose item lying in the world near a vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct LooseItem {
    pub entity: EntityId,
    pub stack: ItemStack,
}

/// Host world access.
///
/// Stacks are always read by value and written back whole; the system never
/// holds a reference into host storage across calls.
pub trait World {
    /// Stack stored in the vessel block at `pos`, if a block with a slot is
    /// there at all.
    fn vessel(&self, pos: BlockPos) -> Option<ItemStack>;

    /// Replace the vessel stack at `pos`.
    fn set_vessel(&mut self, pos: BlockPos, stack: ItemStack);

    /// Loose item entities whose position lies within `horizontal` blocks (on
    /// x and z) and `vertical` blocks (on y) of the centre of `pos`.
    fn item_entities_near(&self, pos: BlockPos, horizontal: Fixed64, vertical: Fixed64) -> Vec<LooseItem>;

    /// Despawn an entity. Returns `false` if it was already gone.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Stack in the actor's active slot.
    fn held(&self, actor: ActorId) -> Option<ItemStack>;

    /// Replace the actor's active slot. `None` empties it.
    fn set_held(&mut self, actor: ActorId, stack: Option<ItemStack>);

    /// Put `stack` into the actor's inventory, or drop it at the actor when
    /// there is no room.
    fn give_or_drop(&mut self, actor: ActorId, stack: ItemStack);
}
