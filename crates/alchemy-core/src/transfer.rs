//! Player-driven liquid transfer between a held container and a vessel.
//!
//! The direction is decided by the held container alone: empty draws from
//! the vessel, filled pours into it. One call moves at most one transfer
//! unit. Transfers never touch fusion sessions.

use crate::dirty::DirtyTracker;
use crate::event::{AlchemyEvent, EventBus};
use crate::fixed::Millis;
use crate::heat::reservoir_at;
use crate::id::{ActorId, BlockPos, ItemCode};
use crate::item::{ContainerSpec, ItemStack};
use crate::liquid::{self, LiquidPortion};
use crate::registry::ItemCatalog;
use crate::world::World;

/// A player using their held item on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractNotification {
    pub actor: ActorId,
    pub target: BlockPos,
    /// Host elapsed time.
    pub at: Millis,
}

/// Whether the interaction was consumed or should fall through to the host's
/// default behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractResult {
    Handled,
    Unhandled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    /// Vessel into held container.
    Draw,
    /// Held container into vessel.
    Pour,
}

/// Why a transfer did not happen. Every refusal leaves both containers as
/// they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferRefusal {
    #[error("target holds no reservoir vessel")]
    NotAVessel,
    #[error("actor holds nothing")]
    NothingHeld,
    #[error("{0} is not a container")]
    NotAContainer(ItemCode),
    #[error("reservoir is empty")]
    ReservoirEmpty,
    #[error("reservoir holds {available} portions, less than one unit of {unit}")]
    InsufficientReservoir { available: u32, unit: u32 },
    #[error("reservoir is full")]
    ReservoirFull,
    #[error("held container has no capacity")]
    NoCapacity,
    #[error("cannot pour {held} into {reservoir}")]
    IncompatibleLiquid { held: ItemCode, reservoir: ItemCode },
}

/// The result of a transfer, computed without touching the world.
///
/// `held` is the single held item after the transfer; `remainder` is what
/// stays in the slot when a stacked item was split.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub direction: TransferDirection,
    pub liquid: ItemCode,
    pub portions: u32,
    pub held: ItemStack,
    pub remainder: Option<ItemStack>,
    pub reservoir: ItemStack,
}

/// Pour/draw handler.
#[derive(Debug, Clone, Copy)]
pub struct TransferProtocol {
    unit: u32,
}

impl TransferProtocol {
    pub fn new(unit: u32) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// Work out the transfer between `held` and the vessel stack
    /// `reservoir`.
    pub fn plan(
        &self,
        held: &ItemStack,
        reservoir: &ItemStack,
        reservoir_spec: ContainerSpec,
        catalog: &ItemCatalog,
    ) -> Result<TransferPlan, TransferRefusal> {
        if held.stack_size == 0 {
            return Err(TransferRefusal::NothingHeld);
        }
        let Some(held_spec) = catalog.container_spec(&held.code) else {
            return Err(TransferRefusal::NotAContainer(held.code.clone()));
        };

        let held = liquid::sanitize(held, catalog);
        let remainder = (held.stack_size > 1).then(|| held.with_size(held.stack_size - 1));
        let single = held.with_size(1);

        let in_vessel = liquid::read(reservoir, catalog);
        let in_held = liquid::read(&single, catalog);

        match in_held {
            None => self.plan_draw(single, remainder, reservoir, in_vessel, held_spec),
            Some(poured) => self.plan_pour(
                single,
                remainder,
                reservoir,
                reservoir_spec,
                in_vessel,
                poured,
            ),
        }
    }

    fn plan_draw(
        &self,
        single: ItemStack,
        remainder: Option<ItemStack>,
        reservoir: &ItemStack,
        in_vessel: Option<LiquidPortion>,
        held_spec: ContainerSpec,
    ) -> Result<TransferPlan, TransferRefusal> {
        let Some(available) = in_vessel else {
            return Err(TransferRefusal::ReservoirEmpty);
        };
        if available.portions < self.unit {
            return Err(TransferRefusal::InsufficientReservoir {
                available: available.portions,
                unit: self.unit,
            });
        }

        let amount = self.unit.min(available.portions).min(held_spec.capacity_portions);
        let Some(drawn) = available.with_portions(amount) else {
            return Err(TransferRefusal::NoCapacity);
        };
        let left = available.with_portions(available.portions - amount);

        Ok(TransferPlan {
            direction: TransferDirection::Draw,
            liquid: drawn.liquid.clone(),
            portions: amount,
            held: liquid::write(&single, Some(&drawn)),
            remainder,
            reservoir: liquid::write(reservoir, left.as_ref()),
        })
    }

    fn plan_pour(
        &self,
        single: ItemStack,
        remainder: Option<ItemStack>,
        reservoir: &ItemStack,
        reservoir_spec: ContainerSpec,
        in_vessel: Option<LiquidPortion>,
        poured: LiquidPortion,
    ) -> Result<TransferPlan, TransferRefusal> {
        let stored = in_vessel.as_ref().map(|p| p.portions).unwrap_or(0);
        if let Some(existing) = &in_vessel
            && existing.liquid != poured.liquid
        {
            return Err(TransferRefusal::IncompatibleLiquid {
                held: poured.liquid,
                reservoir: existing.liquid.clone(),
            });
        }

        let space = reservoir_spec.capacity_portions.saturating_sub(stored);
        let amount = self.unit.min(poured.portions).min(space);
        if amount == 0 {
            return Err(TransferRefusal::ReservoirFull);
        }

        let filled = poured.with_portions(stored + amount);
        let left = poured.with_portions(poured.portions - amount);

        Ok(TransferPlan {
            direction: TransferDirection::Pour,
            liquid: poured.liquid.clone(),
            portions: amount,
            held: liquid::write(&single, left.as_ref()),
            remainder,
            reservoir: liquid::write(reservoir, filled.as_ref()),
        })
    }

    /// Run a transfer against the world.
    pub fn transfer<W: World + ?Sized>(
        &self,
        note: &InteractNotification,
        world: &mut W,
        catalog: &ItemCatalog,
        events: &mut EventBus,
        dirty: &mut DirtyTracker,
    ) -> Result<TransferPlan, TransferRefusal> {
        let Some((reservoir, spec)) = reservoir_at(&*world, note.target, catalog) else {
            return Err(TransferRefusal::NotAVessel);
        };
        let Some(held) = world.held(note.actor) else {
            return Err(TransferRefusal::NothingHeld);
        };

        let plan = self.plan(&held, &reservoir, spec, catalog)?;

        world.set_vessel(note.target, plan.reservoir.clone());
        match &plan.remainder {
            Some(rest) => {
                world.set_held(note.actor, Some(rest.clone()));
                world.give_or_drop(note.actor, plan.held.clone());
            }
            None => world.set_held(note.actor, Some(plan.held.clone())),
        }

        dirty.mark_held(note.actor);
        dirty.mark_vessel(note.target);
        dirty.mark_block(note.target);

        tracing::debug!(
            pos = %note.target,
            actor = note.actor.0,
            direction = ?plan.direction,
            liquid = %plan.liquid,
            portions = plan.portions,
            "liquid transferred"
        );
        events.emit(AlchemyEvent::LiquidTransferred {
            pos: note.target,
            actor: note.actor,
            direction: plan.direction,
            liquid: plan.liquid.clone(),
            portions: plan.portions,
            at: note.at,
        });

        Ok(plan)
    }

    /// Host-facing entry point. Refusals fall through as `Unhandled`.
    pub fn on_interact<W: World + ?Sized>(
        &self,
        note: &InteractNotification,
        world: &mut W,
        catalog: &ItemCatalog,
        events: &mut EventBus,
        dirty: &mut DirtyTracker,
    ) -> InteractResult {
        match self.transfer(note, world, catalog, events, dirty) {
            Ok(_) => InteractResult::Handled,
            Err(refusal) => {
                tracing::debug!(pos = %note.target, actor = note.actor.0, %refusal, "transfer refused");
                InteractResult::Unhandled
            }
        }
    }
}
