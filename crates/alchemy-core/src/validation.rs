//! Load-time checks of recipes against the item catalog.
//!
//! Nothing here is fatal. Unresolvable identities surface again at runtime
//! (content reads treat them as absent, commits refuse them), so these are
//! reported as warnings for the loader to log.

use crate::id::ItemCode;
use crate::item::{ContainerKind, ItemKind};
use crate::recipe::RecipeDef;
use crate::registry::{ItemCatalog, RecipeRegistry};
use std::fmt;

/// Where in a recipe an identity appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRole {
    Solid,
    InputLiquid,
    Output,
    OutputVessel,
}

impl fmt::Display for IdentityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentityRole::Solid => "solid ingredient",
            IdentityRole::InputLiquid => "input liquid",
            IdentityRole::Output => "output",
            IdentityRole::OutputVessel => "output vessel",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeWarning {
    /// The identity is not in the catalog.
    Unresolved {
        recipe: String,
        role: IdentityRole,
        identity: ItemCode,
    },
    /// The identity resolves but plays the wrong role.
    WrongKind {
        recipe: String,
        role: IdentityRole,
        identity: ItemCode,
    },
    /// Whenever `recipe` matches, the earlier `by` matches too, so `recipe`
    /// can never be selected.
    Shadowed { recipe: String, by: String },
}

impl fmt::Display for RecipeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeWarning::Unresolved {
                recipe,
                role,
                identity,
            } => write!(f, "recipe {recipe}: {role} {identity} does not resolve"),
            RecipeWarning::WrongKind {
                recipe,
                role,
                identity,
            } => write!(f, "recipe {recipe}: {identity} cannot be used as {role}"),
            RecipeWarning::Shadowed { recipe, by } => {
                write!(f, "recipe {recipe} is shadowed by {by} and never matches")
            }
        }
    }
}

/// Check every recipe in `registry` against `catalog`.
pub fn validate_recipes(registry: &RecipeRegistry, catalog: &ItemCatalog) -> Vec<RecipeWarning> {
    let mut warnings = Vec::new();

    for (_, recipe) in registry.iter() {
        for code in recipe.solids.keys() {
            check(catalog, recipe, IdentityRole::Solid, code, &mut warnings);
        }
        if let Some(req) = &recipe.input_liquid {
            check(catalog, recipe, IdentityRole::InputLiquid, &req.liquid, &mut warnings);
        }
        check(catalog, recipe, IdentityRole::Output, &recipe.output.liquid, &mut warnings);
        if let Some(vessel) = &recipe.output_vessel {
            check(catalog, recipe, IdentityRole::OutputVessel, vessel, &mut warnings);
        }
    }

    let ordered: Vec<&RecipeDef> = registry.iter().map(|(_, r)| r).collect();
    for (i, later) in ordered.iter().enumerate() {
        if let Some(earlier) = ordered[..i].iter().find(|e| implied_by(e, later)) {
            warnings.push(RecipeWarning::Shadowed {
                recipe: later.code.clone(),
                by: earlier.code.clone(),
            });
        }
    }

    warnings
}

fn check(
    catalog: &ItemCatalog,
    recipe: &RecipeDef,
    role: IdentityRole,
    identity: &ItemCode,
    warnings: &mut Vec<RecipeWarning>,
) {
    let Some(def) = catalog.get(identity) else {
        warnings.push(RecipeWarning::Unresolved {
            recipe: recipe.code.clone(),
            role,
            identity: identity.clone(),
        });
        return;
    };
    let fits = match role {
        IdentityRole::Solid => def.kind == ItemKind::Solid,
        IdentityRole::InputLiquid | IdentityRole::Output => def.kind == ItemKind::Liquid,
        IdentityRole::OutputVessel => {
            matches!(def.kind, ItemKind::Container(spec) if spec.kind == ContainerKind::Reservoir)
        }
    };
    if !fits {
        warnings.push(RecipeWarning::WrongKind {
            recipe: recipe.code.clone(),
            role,
            identity: identity.clone(),
        });
    }
}

/// Whether every state satisfying `later` also satisfies `earlier`.
fn implied_by(earlier: &RecipeDef, later: &RecipeDef) -> bool {
    let solids = earlier
        .solids
        .iter()
        .all(|(code, need)| later.solids.get(code).is_some_and(|have| have >= need));
    let liquid = match (&earlier.input_liquid, &later.input_liquid) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(a), Some(b)) => a.liquid == b.liquid && b.min_portions >= a.min_portions,
    };
    solids && liquid
}
