//! Heat-tick coordination: throttling, ingredient absorption, and driving
//! the fusion engine for each heated vessel.
//!
//! The host forwards every heat tick of every vessel. Two independent
//! per-position clocks decide which ticks do any work:
//!
//! - the presentation clock (fast) gates read-only effects on rendering
//!   clients;
//! - the gameplay clock (slow) gates absorption and matching on the
//!   authoritative side.
//!
//! Per-position tables are evicted when the vessel disappears, when a tick
//! finds no reservoir at the position, or when no tick arrives for the idle
//! timeout.

use crate::config::AlchemyConfig;
use crate::dirty::DirtyTracker;
use crate::event::{AlchemyEvent, EventBus};
use crate::fixed::{Fixed64, Millis};
use crate::fusion::{FusionEngine, FusionError, FusionStep};
use crate::id::BlockPos;
use crate::item::{ContainerKind, ContainerSpec, ItemStack};
use crate::liquid;
use crate::registry::{ItemCatalog, RecipeRegistry};
use crate::session::SessionTable;
use crate::world::World;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Which side of the host is delivering a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The simulating server. Only this side mutates anything.
    Authoritative,
    /// A rendering client. Read-only.
    Presentation,
}

/// One heat tick for one vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatNotification {
    pub pos: BlockPos,
    pub temperature: Fixed64,
    pub side: Side,
    /// Host elapsed time.
    pub at: Millis,
}

/// What a heat notification ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum HeatOutcome {
    /// Dropped by the position's throttle.
    Throttled,
    /// No reservoir at the position. Authoritative ticks evict it; presentation
    /// ticks drop their own throttle entry.
    NoVessel,
    /// Not above the ignition threshold.
    Cold,
    /// Presentation effects were emitted.
    Presented,
    /// The gameplay path ran; `absorbed` entities were consumed.
    Evaluated { absorbed: usize, step: FusionStep },
    /// The gameplay path ran but the matched recipe could not commit.
    Failed { absorbed: usize, error: FusionError },
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

/// Per-position rate limiter. The first notification for a position passes;
/// later ones pass once `interval` has elapsed since the last one that did.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Millis,
    last: HashMap<BlockPos, Millis>,
}

impl Throttle {
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            last: HashMap::new(),
        }
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }

    /// Whether a notification at `now` should be processed. Records it if so.
    pub fn accept(&mut self, pos: BlockPos, now: Millis) -> bool {
        match self.last.get(&pos) {
            Some(&last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last.insert(pos, now);
                true
            }
        }
    }

    pub fn forget(&mut self, pos: BlockPos) {
        self.last.remove(&pos);
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.last.contains_key(&pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.last.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Owns the per-position sessions and throttles.
#[derive(Debug, Clone)]
pub struct HeatTickCoordinator {
    engine: FusionEngine,
    ignition_threshold: Fixed64,
    absorb_radius: (Fixed64, Fixed64),
    idle_timeout: Millis,
    sessions: SessionTable,
    presentation: Throttle,
    gameplay: Throttle,
    last_seen: HashMap<BlockPos, Millis>,
    heated: HashSet<BlockPos>,
    last_sweep: Millis,
}

impl HeatTickCoordinator {
    pub fn new(config: &AlchemyConfig) -> Self {
        Self {
            engine: FusionEngine::new(config.hold_duration_ms),
            ignition_threshold: config.ignition_threshold(),
            absorb_radius: config.absorb_radius(),
            idle_timeout: config.session_idle_timeout_ms,
            sessions: SessionTable::new(),
            presentation: Throttle::new(config.presentation_interval_ms),
            gameplay: Throttle::new(config.gameplay_interval_ms),
            last_seen: HashMap::new(),
            heated: HashSet::new(),
            last_sweep: 0,
        }
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn engine(&self) -> &FusionEngine {
        &self.engine
    }

    /// Whether `pos` is tracked in any per-position table.
    pub fn is_tracked(&self, pos: BlockPos) -> bool {
        self.sessions.contains(pos)
            || self.last_seen.contains_key(&pos)
            || self.heated.contains(&pos)
            || self.presentation.contains(pos)
            || self.gameplay.contains(pos)
    }

    /// Number of positions with any per-position state.
    pub fn tracked_positions(&self) -> usize {
        let mut all: HashSet<BlockPos> = self.last_seen.keys().copied().collect();
        all.extend(self.sessions.positions());
        all.extend(self.heated.iter().copied());
        all.extend(self.presentation.positions());
        all.extend(self.gameplay.positions());
        all.len()
    }

    /// Handle one heat notification.
    pub fn on_heat<W: World + ?Sized>(
        &mut self,
        note: &HeatNotification,
        world: &mut W,
        catalog: &ItemCatalog,
        registry: &RecipeRegistry,
        events: &mut EventBus,
        dirty: &mut DirtyTracker,
    ) -> HeatOutcome {
        self.sweep_if_due(note.at);
        self.last_seen.insert(note.pos, note.at);
        match note.side {
            Side::Presentation => self.present(note, &*world, catalog, events),
            Side::Authoritative => self.gameplay_tick(note, world, catalog, registry, events, dirty),
        }
    }

    /// Forget everything about `pos`.
    pub fn evict(&mut self, pos: BlockPos) {
        if self.sessions.evict(pos).is_some() {
            tracing::debug!(pos = %pos, "evicted fusion session");
        }
        self.presentation.forget(pos);
        self.gameplay.forget(pos);
        self.last_seen.remove(&pos);
        self.heated.remove(&pos);
    }

    /// Evict every position that has not seen a heat tick from either side
    /// for the idle timeout. Returns how many were evicted.
    pub fn sweep_idle(&mut self, now: Millis) -> usize {
        let stale: Vec<BlockPos> = self
            .last_seen
            .iter()
            .filter(|&(_, &seen)| now.saturating_sub(seen) >= self.idle_timeout)
            .map(|(&pos, _)| pos)
            .collect();
        for &pos in &stale {
            self.evict(pos);
        }
        self.last_sweep = now;
        stale.len()
    }

    fn sweep_if_due(&mut self, now: Millis) {
        if now.saturating_sub(self.last_sweep) >= self.idle_timeout {
            let evicted = self.sweep_idle(now);
            if evicted > 0 {
                tracing::debug!(evicted, "swept idle vessels");
            }
        }
    }

    /// Strictly above the ignition threshold.
    fn is_hot(&self, temperature: Fixed64) -> bool {
        temperature > self.ignition_threshold
    }

    // ---- presentation side ----

    fn present<W: World + ?Sized>(
        &mut self,
        note: &HeatNotification,
        world: &W,
        catalog: &ItemCatalog,
        events: &mut EventBus,
    ) -> HeatOutcome {
        if !self.presentation.accept(note.pos, note.at) {
            return HeatOutcome::Throttled;
        }
        let Some((vessel, spec)) = reservoir_at(world, note.pos, catalog) else {
            self.presentation.forget(note.pos);
            self.last_seen.remove(&note.pos);
            return HeatOutcome::NoVessel;
        };
        if !self.is_hot(note.temperature) {
            return HeatOutcome::Cold;
        }
        events.emit(AlchemyEvent::Simmering {
            pos: note.pos,
            temperature: note.temperature,
            fill: liquid::fill_fraction(&vessel, spec.capacity_portions, catalog),
            at: note.at,
        });
        HeatOutcome::Presented
    }

    // ---- authoritative side ----

    fn gameplay_tick<W: World + ?Sized>(
        &mut self,
        note: &HeatNotification,
        world: &mut W,
        catalog: &ItemCatalog,
        registry: &RecipeRegistry,
        events: &mut EventBus,
        dirty: &mut DirtyTracker,
    ) -> HeatOutcome {
        let pos = note.pos;
        if !self.gameplay.accept(pos, note.at) {
            return HeatOutcome::Throttled;
        }

        let Some((vessel, _)) = reservoir_at(&*world, pos, catalog) else {
            self.evict(pos);
            return HeatOutcome::NoVessel;
        };

        if !self.is_hot(note.temperature) {
            if let Some(session) = self.sessions.get_mut(pos)
                && session.matched().is_some()
            {
                tracing::debug!(pos = %pos, "vessel cooled, match abandoned");
                session.clear_match();
            }
            return HeatOutcome::Cold;
        }

        if self.heated.insert(pos) {
            tracing::info!(pos = %pos, temperature = %note.temperature, "vessel is hot");
            events.emit(AlchemyEvent::VesselHeated {
                pos,
                temperature: note.temperature,
                at: note.at,
            });
        }

        let absorbed = self.absorb(note, world, registry, events);

        if !self.sessions.contains(pos) {
            let liquid = liquid::read(&vessel, catalog);
            if registry.find_match(&BTreeMap::new(), liquid.as_ref()).is_none() {
                return HeatOutcome::Evaluated {
                    absorbed,
                    step: FusionStep::Idle,
                };
            }
        }
        let session = self.sessions.entry(pos);
        match self.engine.evaluate(session, &vessel, registry, catalog, note.at) {
            Ok(step) => {
                apply_step(pos, &step, note.at, world, registry, events, dirty);
                HeatOutcome::Evaluated { absorbed, step }
            }
            Err(error) => {
                tracing::error!(pos = %pos, %error, "recipe cannot commit");
                HeatOutcome::Failed { absorbed, error }
            }
        }
    }

    /// Consume every ingredient entity in range. Each entity counts once,
    /// with its full stack size.
    fn absorb<W: World + ?Sized>(
        &mut self,
        note: &HeatNotification,
        world: &mut W,
        registry: &RecipeRegistry,
        events: &mut EventBus,
    ) -> usize {
        let (horizontal, vertical) = self.absorb_radius;
        let mut absorbed = 0;
        for loose in world.item_entities_near(note.pos, horizontal, vertical) {
            let code = &loose.stack.code;
            if !registry.is_ingredient(code) || loose.stack.stack_size == 0 {
                continue;
            }
            if !world.remove_entity(loose.entity) {
                continue;
            }
            let count = loose.stack.stack_size;
            tracing::debug!(pos = %note.pos, item = %code, count, "absorbed ingredient");
            self.sessions.absorb(note.pos, code.clone(), count);
            events.emit(AlchemyEvent::IngredientAbsorbed {
                pos: note.pos,
                entity: loose.entity,
                item: code.clone(),
                count,
                at: note.at,
            });
            absorbed += 1;
        }
        absorbed
    }
}

fn apply_step<W: World + ?Sized>(
    pos: BlockPos,
    step: &FusionStep,
    at: Millis,
    world: &mut W,
    registry: &RecipeRegistry,
    events: &mut EventBus,
    dirty: &mut DirtyTracker,
) {
    let code = |id| registry.get(id).map(|r| r.code.as_str()).unwrap_or("?");
    match step {
        FusionStep::Idle => {}
        FusionStep::Cleared { previous } => {
            tracing::debug!(pos = %pos, recipe = code(*previous), "match lost");
        }
        FusionStep::Started { recipe } => {
            tracing::debug!(pos = %pos, recipe = code(*recipe), "match started");
            events.emit(AlchemyEvent::MatchStarted {
                pos,
                recipe: *recipe,
                at,
            });
        }
        FusionStep::Progressing {
            recipe,
            elapsed,
            hold,
        } => {
            tracing::trace!(pos = %pos, recipe = code(*recipe), elapsed, hold, "match holding");
            events.emit(AlchemyEvent::MatchProgressing {
                pos,
                recipe: *recipe,
                elapsed: *elapsed,
                hold: *hold,
                at,
            });
        }
        FusionStep::Committed {
            recipe,
            vessel,
            output,
        } => {
            tracing::info!(
                pos = %pos,
                recipe = code(*recipe),
                liquid = %output.liquid,
                portions = output.portions,
                "recipe committed"
            );
            world.set_vessel(pos, vessel.clone());
            dirty.mark_vessel(pos);
            dirty.mark_block(pos);
            events.emit(AlchemyEvent::RecipeCommitted {
                pos,
                recipe: *recipe,
                output: output.clone(),
                at,
            });
        }
    }
}

/// The vessel stack at `pos` and its container spec, if it is a reservoir.
pub(crate) fn reservoir_at<W: World + ?Sized>(
    world: &W,
    pos: BlockPos,
    catalog: &ItemCatalog,
) -> Option<(ItemStack, ContainerSpec)> {
    let stack = world.vessel(pos)?;
    let spec = catalog.container_spec(&stack.code)?;
    (spec.kind == ContainerKind::Reservoir).then_some((stack, spec))
}
