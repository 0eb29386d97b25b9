//! Cross-crate tests: content loaded from data files drives a full brew.
//!
//! Each test writes a data directory, loads it with `alchemy-data`, and runs
//! the resulting system against the in-memory world from `alchemy-core`.

use std::fs;
use std::path::{Path, PathBuf};

use alchemy_core::event::EventKind;
use alchemy_core::fixed::{Fixed64, Millis};
use alchemy_core::heat::{HeatNotification, Side};
use alchemy_core::id::{ActorId, ItemCode};
use alchemy_core::item::ItemStack;
use alchemy_core::liquid::{self, LiquidPortion};
use alchemy_core::serialize::{decode_vessels, encode_vessels};
use alchemy_core::system::AlchemySystem;
use alchemy_core::test_utils::*;
use alchemy_core::transfer::{InteractNotification, InteractResult};
use alchemy_core::validation::RecipeWarning;
use alchemy_core::world::World;
use alchemy_data::loader::{load_alchemy_data, DataLoadError};

const COOK: ActorId = ActorId(7);

// ---- data files ----

const ITEMS_RON: &str = r#"[
    (code: "game:waterportion", kind: liquid),
    (code: "game:brothportion", kind: liquid),
    (code: "bloodrites:bloodportion", kind: liquid),
    (code: "game:meat", kind: solid),
    (code: "game:salt", kind: solid),
    (code: "game:bone", kind: solid),
    (code: "game:bowl-fired", kind: charge, capacity: Some(100)),
    (code: "bloodrites:cauldron", kind: reservoir, capacity: Some(300)),
    (code: "bloodrites:cauldron-blood", kind: reservoir, capacity: Some(300)),
]"#;

const RECIPES_RON: &str = r#"[
    (
        code: "stew",
        ingredients: {"game:meat": 1, "game:salt": 1},
        output_liquid: "game:brothportion",
        output_litres: Some(1.0),
    ),
    (
        code: "blood_brew",
        ingredients: {"game:meat": 2},
        input_liquid: Some("game:waterportion"),
        input_portions: 100,
        output_liquid: "bloodrites:bloodportion",
        output_litres: Some(3.0),
        output_vessel: Some("bloodrites:cauldron-blood"),
        priority: 10,
    ),
]"#;

const RECIPES_JSON: &str = r#"[
    {
        "code": "stew",
        "ingredients": {"game:meat": 1, "game:salt": 1},
        "output_liquid": "game:brothportion",
        "output_portions": 100
    },
    {
        "code": "blood_brew",
        "ingredients": {"game:meat": 2},
        "input_liquid": "game:waterportion",
        "input_portions": 100,
        "output_liquid": "bloodrites:bloodportion",
        "output_litres": 3.0,
        "output_vessel": "bloodrites:cauldron-blood",
        "priority": 10
    }
]"#;

const RECIPES_TOML: &str = r#"
[[recipes]]
code = "stew"
output_liquid = "game:brothportion"

[recipes.ingredients]
"game:meat" = 1
"game:salt" = 1

[[recipes]]
code = "blood_brew"
input_liquid = "game:waterportion"
input_portions = 100
output_liquid = "bloodrites:bloodportion"
output_portions = 300
output_vessel = "bloodrites:cauldron-blood"
priority = 10

[recipes.ingredients]
"game:meat" = 2
"#;

// ---- helpers ----

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "alchemy_integration_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

fn write_data(dir: &Path, recipes_file: &str, recipes: &str) {
    fs::write(dir.join("items.ron"), ITEMS_RON).unwrap();
    fs::write(dir.join(recipes_file), recipes).unwrap();
}

fn system_from(dir: &Path) -> AlchemySystem {
    let data = load_alchemy_data(dir).unwrap();
    assert!(data.warnings.is_empty(), "unexpected warnings: {:?}", data.warnings);
    AlchemySystem::new(data.config, data.catalog, data.registry)
}

/// Authoritative heat ticks at 250 degrees every 500 ms over `[from, to]`.
fn simmer(system: &mut AlchemySystem, world: &mut MemoryWorld, from: Millis, to: Millis) {
    let mut at = from;
    while at <= to {
        system.on_heat_tick(
            &HeatNotification {
                pos: VESSEL_POS,
                temperature: Fixed64::from_num(250),
                side: Side::Authoritative,
                at,
            },
            world,
        );
        at += 500;
    }
}

fn interact(system: &mut AlchemySystem, world: &mut MemoryWorld, at: Millis) -> InteractResult {
    system.on_interact(
        &InteractNotification {
            actor: COOK,
            target: VESSEL_POS,
            at,
        },
        world,
    )
}

fn vessel_contents(system: &AlchemySystem, world: &MemoryWorld) -> Option<LiquidPortion> {
    liquid::read(&world.vessel(VESSEL_POS)?, system.catalog())
}

// ---- tests ----

#[test]
fn every_format_loads_the_same_recipes() {
    for (suffix, file, recipes) in [
        ("fmt_ron", "recipes.ron", RECIPES_RON),
        ("fmt_json", "recipes.json", RECIPES_JSON),
        ("fmt_toml", "recipes.toml", RECIPES_TOML),
    ] {
        let dir = make_test_dir(suffix);
        write_data(&dir, file, recipes);

        let data = load_alchemy_data(&dir).unwrap();
        assert_eq!(data.catalog.len(), 9, "{file}");
        assert_eq!(data.registry.len(), 2, "{file}");

        // Precedence follows priority, not file order.
        let order: Vec<&str> = data.registry.iter().map(|(_, r)| r.code.as_str()).collect();
        assert_eq!(order, ["blood_brew", "stew"], "{file}");

        let brew = data.registry.get(data.registry.recipe_id("blood_brew").unwrap()).unwrap();
        assert_eq!(brew.output.portions, 300, "{file}");
        let stew = data.registry.get(data.registry.recipe_id("stew").unwrap()).unwrap();
        assert_eq!(stew.output.portions, 100, "{file}");

        cleanup(&dir);
    }
}

#[test]
fn loaded_stew_brews_and_ladles() {
    let dir = make_test_dir("stew");
    write_data(&dir, "recipes.json", RECIPES_JSON);
    let mut system = system_from(&dir);
    let mut world = MemoryWorld::new();

    world.set_vessel(VESSEL_POS, empty_cauldron());
    world.spawn_item_near(VESSEL_POS, ItemStack::new(MEAT, 1));
    world.spawn_item_near(VESSEL_POS, ItemStack::new(SALT, 1));

    simmer(&mut system, &mut world, 0, 10_000);
    assert_eq!(vessel_contents(&system, &world), LiquidPortion::new(BROTH, 100));
    assert_eq!(world.entity_count(), 0);

    world.set_held(COOK, Some(empty_bowl()));
    assert_eq!(interact(&mut system, &mut world, 10_100), InteractResult::Handled);
    assert_eq!(vessel_contents(&system, &world), None);
    let bowl = world.held(COOK).unwrap();
    assert_eq!(liquid::read(&bowl, system.catalog()), LiquidPortion::new(BROTH, 100));

    cleanup(&dir);
}

#[test]
fn loaded_blood_brew_swaps_the_vessel() {
    let dir = make_test_dir("blood");
    write_data(&dir, "recipes.toml", RECIPES_TOML);
    let mut system = system_from(&dir);
    let mut world = MemoryWorld::new();

    world.set_vessel(VESSEL_POS, empty_cauldron());
    world.set_held(COOK, Some(bowl_with(WATER, 100)));
    assert_eq!(interact(&mut system, &mut world, 0), InteractResult::Handled);

    world.spawn_item_near(VESSEL_POS, ItemStack::new(MEAT, 2));
    simmer(&mut system, &mut world, 500, 10_500);

    let vessel = world.vessel(VESSEL_POS).unwrap();
    assert_eq!(vessel.code, ItemCode::from(BLOOD_CAULDRON));
    assert_eq!(vessel_contents(&system, &world), LiquidPortion::new(BLOOD, 300));
    assert_eq!(system.events().total_emitted(EventKind::RecipeCommitted), 1);

    cleanup(&dir);
}

#[test]
fn config_file_tunes_the_runtime() {
    let dir = make_test_dir("config");
    write_data(&dir, "recipes.ron", RECIPES_RON);
    fs::write(
        dir.join("alchemy.toml"),
        "hold_duration_ms = 4000\ntransfer_unit = 50\n",
    )
    .unwrap();

    let mut system = system_from(&dir);
    assert_eq!(system.transfer().unit(), 50);

    let mut world = MemoryWorld::new();
    world.set_vessel(VESSEL_POS, empty_cauldron());
    world.spawn_item_near(VESSEL_POS, ItemStack::new(MEAT, 1));
    world.spawn_item_near(VESSEL_POS, ItemStack::new(SALT, 1));

    simmer(&mut system, &mut world, 0, 4_000);
    assert_eq!(vessel_contents(&system, &world), LiquidPortion::new(BROTH, 100));

    // A 50-portion unit takes half the brew per draw.
    world.set_held(COOK, Some(empty_bowl()));
    assert_eq!(interact(&mut system, &mut world, 4_100), InteractResult::Handled);
    assert_eq!(vessel_contents(&system, &world), LiquidPortion::new(BROTH, 50));

    cleanup(&dir);
}

#[test]
fn unresolved_content_loads_with_warnings() {
    let dir = make_test_dir("warnings");
    fs::write(dir.join("items.ron"), ITEMS_RON).unwrap();
    fs::write(
        dir.join("recipes.json"),
        r#"[
            {"code": "stew", "ingredients": {"game:meat": 1}, "output_liquid": "game:brothportion"},
            {"code": "ash", "ingredients": {"game:meat": 1}, "output_liquid": "game:ash"}
        ]"#,
    )
    .unwrap();

    let data = load_alchemy_data(&dir).unwrap();
    assert!(data.warnings.iter().any(|w| matches!(
        w,
        RecipeWarning::Unresolved { recipe, .. } if recipe == "ash"
    )));
    assert!(data.warnings.iter().any(|w| matches!(
        w,
        RecipeWarning::Shadowed { recipe, by } if recipe == "ash" && by == "stew"
    )));

    cleanup(&dir);
}

#[test]
fn conflicting_recipe_files_are_rejected() {
    let dir = make_test_dir("conflict");
    write_data(&dir, "recipes.ron", RECIPES_RON);
    fs::write(dir.join("recipes.json"), RECIPES_JSON).unwrap();

    assert!(matches!(
        load_alchemy_data(&dir),
        Err(DataLoadError::ConflictingFormats { .. })
    ));

    cleanup(&dir);
}

#[test]
fn finished_brew_survives_a_save() {
    let dir = make_test_dir("save");
    write_data(&dir, "recipes.ron", RECIPES_RON);
    let mut system = system_from(&dir);
    let mut world = MemoryWorld::new();

    world.set_vessel(VESSEL_POS, empty_cauldron());
    world.spawn_item_near(VESSEL_POS, ItemStack::new(MEAT, 1));
    world.spawn_item_near(VESSEL_POS, ItemStack::new(SALT, 1));
    simmer(&mut system, &mut world, 0, 10_000);

    let bytes = encode_vessels(&[(VESSEL_POS, world.vessel(VESSEL_POS).unwrap())]).unwrap();

    // Fresh runtime and world, as after a reload.
    let mut system = system_from(&dir);
    let mut world = MemoryWorld::new();
    for (pos, stack) in decode_vessels(&bytes).unwrap() {
        world.set_vessel(pos, stack);
    }
    assert_eq!(vessel_contents(&system, &world), LiquidPortion::new(BROTH, 100));

    world.set_held(COOK, Some(empty_bowl()));
    assert_eq!(interact(&mut system, &mut world, 0), InteractResult::Handled);
    assert_eq!(vessel_contents(&system, &world), None);

    cleanup(&dir);
}
