//! Brew demo: one cauldron on a fire, two ingredients thrown in, a bowl of
//! the result ladled out.
//!
//! Heat ticks arrive every 500 ms of game time. Listeners print each
//! presentation event as it is delivered.
//!
//! Run with: `RUST_LOG=alchemy_core=debug cargo run -p alchemy-core --example brew_demo`

use alchemy_core::event::{AlchemyEvent, EventKind};
use alchemy_core::fixed::{Fixed64, fixed64_to_f64};
use alchemy_core::heat::{HeatNotification, Side};
use alchemy_core::id::ActorId;
use alchemy_core::item::ItemStack;
use alchemy_core::liquid;
use alchemy_core::test_utils::*;
use alchemy_core::transfer::InteractNotification;
use alchemy_core::world::World;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alchemy_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut system = standard_system();
    let mut world = MemoryWorld::new();

    // --- Step 1: Place the cauldron and throw in ingredients ---

    world.set_vessel(VESSEL_POS, empty_cauldron());
    world.spawn_item_near(VESSEL_POS, ItemStack::new(MEAT, 1));
    world.spawn_item_near(VESSEL_POS, ItemStack::new(SALT, 1));

    // --- Step 2: Listen for presentation events ---

    for kind in [
        EventKind::VesselHeated,
        EventKind::IngredientAbsorbed,
        EventKind::MatchStarted,
        EventKind::MatchProgressing,
        EventKind::RecipeCommitted,
        EventKind::LiquidTransferred,
    ] {
        system.on(kind, Box::new(|e: &AlchemyEvent| println!("  event: {e:?}")));
    }

    // --- Step 3: Heat it up ---

    // The fire warms the cauldron by 20 degrees a tick until it settles at 260.
    let mut temperature = 20.0;
    for step in 0..=30u64 {
        let at = step * 500;
        let note = HeatNotification {
            pos: VESSEL_POS,
            temperature: Fixed64::from_num(temperature),
            side: Side::Authoritative,
            at,
        };
        system.on_heat_tick(&note, &mut world);
        system.deliver_events();
        temperature = f64::min(temperature + 20.0, 260.0);
    }

    // --- Step 4: Ladle out a bowl ---

    let cook = ActorId(1);
    world.set_held(cook, Some(empty_bowl()));
    system.on_interact(
        &InteractNotification {
            actor: cook,
            target: VESSEL_POS,
            at: 15_500,
        },
        &mut world,
    );
    system.deliver_events();

    // --- Step 5: Report ---

    let catalog = system.catalog();
    if let Some(bowl) = world.held(cook) {
        match liquid::read(&bowl, catalog) {
            Some(p) => println!(
                "bowl holds {} x {} ({} L)",
                p.portions,
                p.liquid,
                fixed64_to_f64(p.litres())
            ),
            None => println!("bowl is empty"),
        }
    }
    if let Some(vessel) = world.vessel(VESSEL_POS) {
        let fill = liquid::fill_fraction(&vessel, CAULDRON_CAPACITY, catalog);
        println!("cauldron is {:.0}% full", fixed64_to_f64(fill) * 100.0);
    }
}
