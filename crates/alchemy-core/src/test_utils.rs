//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::config::AlchemyConfig;
use crate::fixed::Fixed64;
use crate::id::*;
use crate::item::{ContainerSpec, ItemStack};
use crate::liquid::{self, LiquidPortion};
use crate::recipe::RecipeDef;
use crate::registry::{ItemCatalog, RecipeRegistry, RegistryBuilder, recipe};
use crate::system::AlchemySystem;
use crate::world::{LooseItem, World};
use slotmap::SlotMap;
use std::collections::HashMap;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Item codes
// ===========================================================================

pub const WATER: &str = "game:waterportion";
pub const BROTH: &str = "game:brothportion";
pub const BLOOD: &str = "bloodrites:bloodportion";

pub const MEAT: &str = "game:meat";
pub const SALT: &str = "game:salt";
/// A solid no recipe uses.
pub const BONE: &str = "game:bone";

pub const BOWL: &str = "game:bowl-fired";
pub const CAULDRON: &str = "bloodrites:cauldron";
pub const BLOOD_CAULDRON: &str = "bloodrites:cauldron-blood";

pub const BOWL_CAPACITY: u32 = 100;
pub const CAULDRON_CAPACITY: u32 = 300;

// Recipe codes
pub const STEW: &str = "stew";
pub const BLOOD_BREW: &str = "blood_brew";

pub const VESSEL_POS: BlockPos = BlockPos::new(10, 64, -4);

// ===========================================================================
// Catalog and registry
// ===========================================================================

/// Catalog with the codes above. `mod:unknownportion` is deliberately absent.
pub fn standard_catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::new();
    for code in [WATER, BROTH, BLOOD] {
        catalog.register_liquid(code);
    }
    for code in [MEAT, SALT, BONE] {
        catalog.register_solid(code);
    }
    catalog.register_container(BOWL, ContainerSpec::charge(BOWL_CAPACITY));
    catalog.register_container(CAULDRON, ContainerSpec::reservoir(CAULDRON_CAPACITY));
    catalog.register_container(BLOOD_CAULDRON, ContainerSpec::reservoir(CAULDRON_CAPACITY));
    catalog
}

/// `stew`: 1 meat + 1 salt, no liquid, makes 100 broth.
pub fn stew_recipe() -> RecipeDef {
    recipe(STEW, &[(MEAT, 1), (SALT, 1)], None, (BROTH, 100))
}

/// `blood_brew`: 2 meat in at least one litre of water, makes a full vessel
/// of blood and turns the vessel into the blood cauldron. Outranks `stew`.
pub fn blood_brew_recipe() -> RecipeDef {
    let mut def = recipe(BLOOD_BREW, &[(MEAT, 2)], Some((WATER, 100)), (BLOOD, 300));
    def.output_vessel = Some(ItemCode::from(BLOOD_CAULDRON));
    def.priority = 10;
    def
}

pub fn standard_registry() -> RecipeRegistry {
    let mut b = RegistryBuilder::new();
    b.register_recipe(stew_recipe());
    b.register_recipe(blood_brew_recipe());
    // Both recipes are well-formed.
    match b.build() {
        Ok(registry) => registry,
        Err(e) => panic!("standard registry: {e}"),
    }
}

pub fn standard_system() -> AlchemySystem {
    AlchemySystem::new(AlchemyConfig::default(), standard_catalog(), standard_registry())
}

// ===========================================================================
// Container stacks
// ===========================================================================

pub fn empty_bowl() -> ItemStack {
    ItemStack::new(BOWL, 1)
}

/// A bowl with raw contents, written without any catalog check.
pub fn bowl_with(code: &str, portions: u32) -> ItemStack {
    liquid::write(&empty_bowl(), LiquidPortion::new(code, portions).as_ref())
}

pub fn empty_cauldron() -> ItemStack {
    ItemStack::new(CAULDRON, 1)
}

pub fn cauldron_with(code: &str, portions: u32) -> ItemStack {
    liquid::write(&empty_cauldron(), LiquidPortion::new(code, portions).as_ref())
}

// ===========================================================================
// In-memory world
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPos {
    pub x: Fixed64,
    pub y: Fixed64,
    pub z: Fixed64,
}

/// A [`World`] backed by plain maps.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    vessels: HashMap<BlockPos, ItemStack>,
    entities: SlotMap<EntityId, (EntityPos, ItemStack)>,
    held: HashMap<ActorId, ItemStack>,
    inventories: HashMap<ActorId, Vec<ItemStack>>,
    full_inventories: Vec<ActorId>,
    dropped: Vec<(ActorId, ItemStack)>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_vessel(&mut self, pos: BlockPos) {
        self.vessels.remove(&pos);
    }

    /// Spawn a loose item just above the centre of `pos`.
    pub fn spawn_item_near(&mut self, pos: BlockPos, stack: ItemStack) -> EntityId {
        let at = EntityPos {
            x: fixed(f64::from(pos.x) + 0.75),
            y: fixed(f64::from(pos.y) + 0.75),
            z: fixed(f64::from(pos.z) + 0.25),
        };
        self.spawn_item_at(at, stack)
    }

    pub fn spawn_item_at(&mut self, at: EntityPos, stack: ItemStack) -> EntityId {
        self.entities.insert((at, stack))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Make `give_or_drop` drop everything for `actor`.
    pub fn fill_inventory(&mut self, actor: ActorId) {
        self.full_inventories.push(actor);
    }

    /// Items handed to `actor` by `give_or_drop`.
    pub fn given(&self, actor: ActorId) -> &[ItemStack] {
        self.inventories.get(&actor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Items dropped at an actor because their inventory was full.
    pub fn dropped(&self) -> &[(ActorId, ItemStack)] {
        &self.dropped
    }
}

impl World for MemoryWorld {
    fn vessel(&self, pos: BlockPos) -> Option<ItemStack> {
        self.vessels.get(&pos).cloned()
    }

    fn set_vessel(&mut self, pos: BlockPos, stack: ItemStack) {
        self.vessels.insert(pos, stack);
    }

    fn item_entities_near(&self, pos: BlockPos, horizontal: Fixed64, vertical: Fixed64) -> Vec<LooseItem> {
        let half = fixed(0.5);
        let cx = Fixed64::from_num(pos.x) + half;
        let cy = Fixed64::from_num(pos.y) + half;
        let cz = Fixed64::from_num(pos.z) + half;
        self.entities
            .iter()
            .filter(|(_, (at, _))| {
                (at.x - cx).abs() <= horizontal
                    && (at.z - cz).abs() <= horizontal
                    && (at.y - cy).abs() <= vertical
            })
            .map(|(entity, (_, stack))| LooseItem {
                entity,
                stack: stack.clone(),
            })
            .collect()
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.entities.remove(entity).is_some()
    }

    fn held(&self, actor: ActorId) -> Option<ItemStack> {
        self.held.get(&actor).cloned()
    }

    fn set_held(&mut self, actor: ActorId, stack: Option<ItemStack>) {
        match stack {
            Some(stack) if stack.stack_size > 0 => {
                self.held.insert(actor, stack);
            }
            _ => {
                self.held.remove(&actor);
            }
        }
    }

    fn give_or_drop(&mut self, actor: ActorId, stack: ItemStack) {
        if self.full_inventories.contains(&actor) {
            self.dropped.push((actor, stack));
        } else {
            self.inventories.entry(actor).or_default().push(stack);
        }
    }
}
