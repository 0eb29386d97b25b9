//! Item catalog and recipe registry.
//!
//! Recipes are registered, optionally mutated, then frozen by `build()` into
//! an immutable registry that evaluates them in precedence order.

use crate::id::{ItemCode, RecipeId};
use crate::item::{ContainerSpec, ItemKind};
use crate::recipe::{LiquidOutput, LiquidRequirement, RecipeDef};
use crate::liquid::LiquidPortion;
use std::collections::{BTreeMap, HashMap, HashSet};

// ---------------------------------------------------------------------------
// Item catalog
// ---------------------------------------------------------------------------

/// An item definition in the catalog.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub code: ItemCode,
    pub kind: ItemKind,
}

/// The live item catalog that stored identities are resolved against.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemCode, ItemDef>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an item definition.
    pub fn register(&mut self, code: impl Into<ItemCode>, kind: ItemKind) {
        let code = code.into();
        self.items.insert(code.clone(), ItemDef { code, kind });
    }

    pub fn register_solid(&mut self, code: impl Into<ItemCode>) {
        self.register(code, ItemKind::Solid);
    }

    pub fn register_liquid(&mut self, code: impl Into<ItemCode>) {
        self.register(code, ItemKind::Liquid);
    }

    pub fn register_container(&mut self, code: impl Into<ItemCode>, spec: ContainerSpec) {
        self.register(code, ItemKind::Container(spec));
    }

    pub fn get(&self, code: &ItemCode) -> Option<&ItemDef> {
        self.items.get(code)
    }

    pub fn resolves(&self, code: &ItemCode) -> bool {
        self.items.contains_key(code)
    }

    pub fn is_liquid(&self, code: &ItemCode) -> bool {
        matches!(self.items.get(code).map(|d| d.kind), Some(ItemKind::Liquid))
    }

    /// Container spec for an item code, if the item is a container.
    pub fn container_spec(&self, code: &ItemCode) -> Option<ContainerSpec> {
        match self.items.get(code).map(|d| d.kind) {
            Some(ItemKind::Container(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Recipe registry
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`RecipeRegistry`].
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    recipes: Vec<RecipeDef>,
    code_to_id: HashMap<String, RecipeId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register a recipe. Returns its ID.
    ///
    /// A second registration under an existing code is kept so that `build()`
    /// can report it; lookups by code keep pointing at the first one.
    pub fn register_recipe(&mut self, recipe: RecipeDef) -> RecipeId {
        let id = RecipeId(self.recipes.len() as u32);
        self.code_to_id.entry(recipe.code.clone()).or_insert(id);
        self.recipes.push(recipe);
        id
    }

    /// Phase 2: Mutate an existing recipe by code.
    pub fn mutate_recipe<F>(&mut self, code: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut RecipeDef),
    {
        let id = self
            .code_to_id
            .get(code)
            .ok_or(RegistryError::NotFound(code.to_string()))?;
        f(&mut self.recipes[id.0 as usize]);
        Ok(())
    }

    pub fn recipe_id(&self, code: &str) -> Option<RecipeId> {
        self.code_to_id.get(code).copied()
    }

    /// Phase 3: Finalize and build the immutable registry.
    pub fn build(self) -> Result<RecipeRegistry, RegistryError> {
        let mut seen = HashSet::new();
        for recipe in &self.recipes {
            if !seen.insert(recipe.code.as_str()) {
                return Err(RegistryError::DuplicateCode(recipe.code.clone()));
            }
            if recipe.output.portions == 0 {
                return Err(RegistryError::EmptyOutput(recipe.code.clone()));
            }
        }

        // Precedence: higher priority first, ties keep registration order.
        let mut order: Vec<RecipeId> = (0..self.recipes.len() as u32).map(RecipeId).collect();
        order.sort_by_key(|id| (std::cmp::Reverse(self.recipes[id.0 as usize].priority), *id));

        let ingredients = self
            .recipes
            .iter()
            .flat_map(|r| r.solids.keys().cloned())
            .collect();

        Ok(RecipeRegistry {
            recipes: self.recipes,
            code_to_id: self.code_to_id,
            order,
            ingredients,
        })
    }
}

/// Immutable recipe registry. Frozen after `build()`.
#[derive(Debug, Clone)]
pub struct RecipeRegistry {
    recipes: Vec<RecipeDef>,
    code_to_id: HashMap<String, RecipeId>,
    /// Evaluation order for `find_match`.
    order: Vec<RecipeId>,
    ingredients: HashSet<ItemCode>,
}

impl RecipeRegistry {
    pub fn get(&self, id: RecipeId) -> Option<&RecipeDef> {
        self.recipes.get(id.0 as usize)
    }

    pub fn recipe_id(&self, code: &str) -> Option<RecipeId> {
        self.code_to_id.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (RecipeId, &RecipeDef)> {
        self.order
            .iter()
            .map(move |id| (*id, &self.recipes[id.0 as usize]))
    }

    /// Whether any recipe lists `code` as a solid ingredient.
    pub fn is_ingredient(&self, code: &ItemCode) -> bool {
        self.ingredients.contains(code)
    }

    /// First recipe, in precedence order, satisfied by the given solids and
    /// liquid. Recipes need not be mutually exclusive.
    pub fn find_match(
        &self,
        solids: &BTreeMap<ItemCode, u32>,
        liquid: Option<&LiquidPortion>,
    ) -> Option<(RecipeId, &RecipeDef)> {
        self.iter().find(|(_, recipe)| recipe.is_satisfied_by(solids, liquid))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate recipe code: {0}")]
    DuplicateCode(String),
    #[error("recipe {0} produces no liquid")]
    EmptyOutput(String),
}

/// Shorthand for a recipe with default precedence and no vessel swap.
pub fn recipe(
    code: &str,
    solids: &[(&str, u32)],
    input_liquid: Option<(&str, u32)>,
    output: (&str, u32),
) -> RecipeDef {
    RecipeDef {
        code: code.to_string(),
        solids: solids
            .iter()
            .map(|(c, n)| (ItemCode::from(*c), *n))
            .collect(),
        input_liquid: input_liquid.map(|(c, n)| LiquidRequirement {
            liquid: ItemCode::from(c),
            min_portions: n,
        }),
        output: LiquidOutput {
            liquid: ItemCode::from(output.0),
            portions: output.1,
        },
        output_vessel: None,
        priority: 0,
    }
}
