//! Property-based tests for the transfer protocol.
//!
//! Generates random sequences of pours and draws between bowls and a
//! cauldron, then verifies conservation and capacity invariants after every
//! step.

use alchemy_core::dirty::DirtyTracker;
use alchemy_core::event::{EventBus, EventKind};
use alchemy_core::id::ActorId;
use alchemy_core::item::ItemStack;
use alchemy_core::liquid;
use alchemy_core::registry::ItemCatalog;
use alchemy_core::test_utils::*;
use alchemy_core::transfer::{InteractNotification, TransferProtocol};
use alchemy_core::world::World;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

const ACTOR: ActorId = ActorId(1);

/// One interaction: the actor picks up a bowl in some state and uses it.
#[derive(Debug, Clone)]
enum Op {
    UseEmptyBowl,
    UseFilledBowl { liquid: usize, portions: u32 },
    UseStackedBowls(u32),
}

const LIQUIDS: [&str; 2] = [WATER, BROTH];

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::UseEmptyBowl),
        (0..LIQUIDS.len(), 1..=BOWL_CAPACITY)
            .prop_map(|(liquid, portions)| Op::UseFilledBowl { liquid, portions }),
        (2..6u32).prop_map(Op::UseStackedBowls),
    ]
}

fn arb_start() -> impl Strategy<Value = Option<(usize, u32)>> {
    proptest::option::of((0..LIQUIDS.len(), 1..=CAULDRON_CAPACITY))
}

fn held_for(op: &Op) -> ItemStack {
    match op {
        Op::UseEmptyBowl => empty_bowl(),
        Op::UseFilledBowl { liquid, portions } => bowl_with(LIQUIDS[*liquid], *portions),
        Op::UseStackedBowls(n) => empty_bowl().with_size(*n),
    }
}

fn stored(stack: &ItemStack, catalog: &ItemCatalog) -> u32 {
    liquid::read(stack, catalog).map(|p| p.portions).unwrap_or(0)
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Liquid is neither created nor destroyed by a transfer, and the vessel
    /// never exceeds its capacity.
    #[test]
    fn transfers_conserve_and_respect_capacity(
        start in arb_start(),
        ops in proptest::collection::vec(arb_op(), 1..40),
    ) {
        let catalog = standard_catalog();
        let protocol = TransferProtocol::new(100);
        let mut events = EventBus::default();
        let mut dirty = DirtyTracker::new();
        let mut world = MemoryWorld::new();
        let vessel = match start {
            Some((liquid, portions)) => cauldron_with(LIQUIDS[liquid], portions),
            None => empty_cauldron(),
        };
        world.set_vessel(VESSEL_POS, vessel);

        for (i, op) in ops.iter().enumerate() {
            let held = held_for(op);
            world.set_held(ACTOR, Some(held.clone()));
            let vessel_before = world.vessel(VESSEL_POS).unwrap();
            let given_before = world.given(ACTOR).len();

            let total_before = stored(&vessel_before, &catalog)
                + stored(&held, &catalog) * held.stack_size;

            let note = InteractNotification { actor: ACTOR, target: VESSEL_POS, at: i as u64 };
            let result = protocol.transfer(&note, &mut world, &catalog, &mut events, &mut dirty);

            let vessel_after = world.vessel(VESSEL_POS).unwrap();
            let slot = world.held(ACTOR).unwrap();
            let given: u32 = world.given(ACTOR)[given_before..]
                .iter()
                .map(|s| stored(s, &catalog) * s.stack_size)
                .sum();
            let total_after = stored(&vessel_after, &catalog)
                + stored(&slot, &catalog) * slot.stack_size
                + given;

            prop_assert!(stored(&vessel_after, &catalog) <= CAULDRON_CAPACITY);
            prop_assert_eq!(total_before, total_after);

            match result {
                Ok(plan) => {
                    prop_assert!(plan.portions > 0 && plan.portions <= 100);
                    let moved = stored(&vessel_after, &catalog).abs_diff(stored(&vessel_before, &catalog));
                    prop_assert_eq!(moved, plan.portions);
                }
                Err(_) => {
                    prop_assert_eq!(vessel_after, vessel_before);
                    prop_assert_eq!(slot, held);
                }
            }
        }
    }

    /// A pour of a different liquid never changes either container.
    #[test]
    fn incompatible_pour_changes_nothing(
        held_portions in 1..=BOWL_CAPACITY,
        vessel_portions in 1..=CAULDRON_CAPACITY,
    ) {
        let catalog = standard_catalog();
        let protocol = TransferProtocol::new(100);
        let mut events = EventBus::default();
        let mut dirty = DirtyTracker::new();
        let mut world = MemoryWorld::new();
        let vessel = cauldron_with(WATER, vessel_portions);
        let held = bowl_with(BROTH, held_portions);
        world.set_vessel(VESSEL_POS, vessel.clone());
        world.set_held(ACTOR, Some(held.clone()));

        let note = InteractNotification { actor: ACTOR, target: VESSEL_POS, at: 0 };
        prop_assert!(protocol.transfer(&note, &mut world, &catalog, &mut events, &mut dirty).is_err());
        prop_assert_eq!(world.vessel(VESSEL_POS), Some(vessel));
        prop_assert_eq!(world.held(ACTOR), Some(held));
        prop_assert_eq!(events.buffered_count(EventKind::LiquidTransferred), 0);
    }

    /// Drawing from a vessel holding less than a unit never changes the bowl.
    #[test]
    fn short_draw_leaves_bowl_untouched(vessel_portions in 0..100u32) {
        let catalog = standard_catalog();
        let protocol = TransferProtocol::new(100);
        let mut events = EventBus::default();
        let mut dirty = DirtyTracker::new();
        let mut world = MemoryWorld::new();
        world.set_vessel(VESSEL_POS, cauldron_with(WATER, vessel_portions));
        world.set_held(ACTOR, Some(empty_bowl()));

        let note = InteractNotification { actor: ACTOR, target: VESSEL_POS, at: 0 };
        prop_assert!(protocol.transfer(&note, &mut world, &catalog, &mut events, &mut dirty).is_err());
        prop_assert_eq!(world.held(ACTOR), Some(empty_bowl()));
        prop_assert!(!dirty.is_dirty());
    }

    /// Content store writes read back as written.
    #[test]
    fn content_store_round_trip(liquid in 0..LIQUIDS.len(), portions in 0..=1_000u32) {
        let catalog = standard_catalog();
        let portion = liquid::LiquidPortion::new(LIQUIDS[liquid], portions);
        let written = liquid::write(&empty_cauldron(), portion.as_ref());
        prop_assert_eq!(liquid::read(&written, &catalog), portion);
    }
}
