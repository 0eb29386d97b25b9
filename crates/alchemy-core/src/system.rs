//! Host-facing entry point tying the alchemy subsystems together.

use crate::config::AlchemyConfig;
use crate::dirty::DirtyTracker;
use crate::event::{EventBus, EventKind, Listener};
use crate::fixed::Millis;
use crate::heat::{HeatNotification, HeatOutcome, HeatTickCoordinator};
use crate::id::BlockPos;
use crate::registry::{ItemCatalog, RecipeRegistry};
use crate::transfer::{InteractNotification, InteractResult, TransferProtocol};
use crate::world::World;

/// Top-level owner of the alchemy runtime.
///
/// Holds the frozen catalog and registry, the heat coordinator with its
/// per-position tables, the transfer protocol, the event bus and the dirty
/// tracker. Host notifications enter here.
#[derive(Debug)]
pub struct AlchemySystem {
    config: AlchemyConfig,
    catalog: ItemCatalog,
    registry: RecipeRegistry,
    coordinator: HeatTickCoordinator,
    transfer: TransferProtocol,
    events: EventBus,
    dirty: DirtyTracker,
}

impl AlchemySystem {
    pub fn new(config: AlchemyConfig, catalog: ItemCatalog, registry: RecipeRegistry) -> Self {
        tracing::info!(
            recipes = registry.len(),
            items = catalog.len(),
            hold_ms = config.hold_duration_ms,
            "alchemy system ready"
        );
        if let Err(error) = config.validate() {
            tracing::warn!(%error, "config value out of range, saturating");
        }
        Self {
            coordinator: HeatTickCoordinator::new(&config),
            transfer: TransferProtocol::new(config.transfer_unit),
            events: EventBus::new(config.event_buffer_capacity),
            dirty: DirtyTracker::new(),
            config,
            catalog,
            registry,
        }
    }

    /// A heat tick for one vessel.
    pub fn on_heat_tick<W: World + ?Sized>(&mut self, note: &HeatNotification, world: &mut W) -> HeatOutcome {
        self.coordinator.on_heat(
            note,
            world,
            &self.catalog,
            &self.registry,
            &mut self.events,
            &mut self.dirty,
        )
    }

    /// A player used their held item on a block.
    pub fn on_interact<W: World + ?Sized>(
        &mut self,
        note: &InteractNotification,
        world: &mut W,
    ) -> InteractResult {
        self.transfer
            .on_interact(note, world, &self.catalog, &mut self.events, &mut self.dirty)
    }

    /// The vessel block at `pos` was broken or replaced.
    pub fn on_vessel_removed(&mut self, pos: BlockPos) {
        self.coordinator.evict(pos);
    }

    /// Forget all per-position state for `pos`.
    pub fn evict(&mut self, pos: BlockPos) {
        self.coordinator.evict(pos);
    }

    /// Evict positions idle for longer than the configured timeout.
    pub fn sweep_idle(&mut self, now: Millis) -> usize {
        self.coordinator.sweep_idle(now)
    }

    /// Register a presentation listener.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.events.on(kind, listener);
    }

    /// Flush buffered events to listeners.
    pub fn deliver_events(&mut self) {
        self.events.deliver();
    }

    pub fn config(&self) -> &AlchemyConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &RecipeRegistry {
        &self.registry
    }

    pub fn coordinator(&self) -> &HeatTickCoordinator {
        &self.coordinator
    }

    pub fn transfer(&self) -> &TransferProtocol {
        &self.transfer
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyTracker {
        &mut self.dirty
    }
}
