#![no_main]
use alchemy_core::fixed::Fixed64;
use alchemy_core::heat::{HeatNotification, Side};
use alchemy_core::id::ActorId;
use alchemy_core::item::ItemStack;
use alchemy_core::liquid;
use alchemy_core::test_utils::*;
use alchemy_core::transfer::InteractNotification;
use alchemy_core::world::World;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// One host callback.
#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Heat { temperature: u16, presentation: bool },
    Interact,
    HoldBowl { liquid: u8, portions: u8 },
    Drop { item: u8, count: u8 },
    RemoveVessel,
    PlaceVessel,
    Wait { ms: u16 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

const ACTOR: ActorId = ActorId(1);

fuzz_target!(|input: FuzzInput| {
    let mut system = standard_system();
    let mut world = MemoryWorld::new();
    world.set_vessel(VESSEL_POS, empty_cauldron());
    let mut at = 0u64;

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(200);

    for op in &input.ops[..max_ops] {
        match *op {
            FuzzOp::Heat {
                temperature,
                presentation,
            } => {
                let side = if presentation {
                    Side::Presentation
                } else {
                    Side::Authoritative
                };
                let note = HeatNotification {
                    pos: VESSEL_POS,
                    temperature: Fixed64::from_num(temperature),
                    side,
                    at,
                };
                system.on_heat_tick(&note, &mut world);
            }
            FuzzOp::Interact => {
                let note = InteractNotification {
                    actor: ACTOR,
                    target: VESSEL_POS,
                    at,
                };
                system.on_interact(&note, &mut world);
            }
            FuzzOp::HoldBowl { liquid, portions } => {
                let code = [WATER, BROTH, BLOOD][usize::from(liquid % 3)];
                let bowl = match portions % 101 {
                    0 => empty_bowl(),
                    n => bowl_with(code, u32::from(n)),
                };
                world.set_held(ACTOR, Some(bowl));
            }
            FuzzOp::Drop { item, count } => {
                let code = [MEAT, SALT, BONE][usize::from(item % 3)];
                world.spawn_item_near(VESSEL_POS, ItemStack::new(code, u32::from(count % 4) + 1));
            }
            FuzzOp::RemoveVessel => {
                world.clear_vessel(VESSEL_POS);
                system.on_vessel_removed(VESSEL_POS);
            }
            FuzzOp::PlaceVessel => world.set_vessel(VESSEL_POS, empty_cauldron()),
            FuzzOp::Wait { ms } => at += u64::from(ms),
        }

        // The reservoir never exceeds its capacity.
        if let Some(vessel) = world.vessel(VESSEL_POS) {
            let spec = system.catalog().container_spec(&vessel.code);
            if let (Some(spec), Some(p)) = (spec, liquid::read(&vessel, system.catalog())) {
                assert!(p.portions <= spec.capacity_portions);
            }
        }
    }
});
