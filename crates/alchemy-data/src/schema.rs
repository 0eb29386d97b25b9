//! Serde data file structs for alchemy content definitions.
//!
//! These structs define the on-disk format for items and recipes. They are
//! deserialized from RON, JSON, or TOML data files and then resolved into
//! core types by the loader.

use serde::Deserialize;
use std::collections::BTreeMap;

// ===========================================================================
// Items
// ===========================================================================

/// What role an item plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKindData {
    Solid,
    Liquid,
    /// A single-unit container such as a bowl.
    Charge,
    /// A heated vessel.
    Reservoir,
}

/// An item definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub code: String,
    pub kind: ItemKindData,
    /// Portions a container holds. Required for containers, ignored otherwise.
    #[serde(default)]
    pub capacity: Option<u32>,
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe definition in a data file.
///
/// The output amount may be given in portions or in litres, not both. With
/// neither, one litre is produced.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub code: String,
    /// Solid ingredient code -> count.
    #[serde(default)]
    pub ingredients: BTreeMap<String, u32>,
    #[serde(default)]
    pub input_liquid: Option<String>,
    /// Minimum portions of `input_liquid` the vessel must hold.
    #[serde(default)]
    pub input_portions: u32,
    pub output_liquid: String,
    #[serde(default)]
    pub output_portions: Option<u32>,
    #[serde(default)]
    pub output_litres: Option<f64>,
    /// Item code the vessel turns into on commit.
    #[serde(default)]
    pub output_vessel: Option<String>,
    #[serde(default)]
    pub priority: i32,
}
