use crate::id::ItemCode;
use crate::liquid::LiquidPortion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Liquid a recipe needs to find in the vessel before it can match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidRequirement {
    pub liquid: ItemCode,
    pub min_portions: u32,
}

/// Liquid a recipe leaves in the vessel once it commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidOutput {
    pub liquid: ItemCode,
    pub portions: u32,
}

/// A transformation rule. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDef {
    pub code: String,
    /// Solid ingredient -> required count.
    pub solids: BTreeMap<ItemCode, u32>,
    pub input_liquid: Option<LiquidRequirement>,
    pub output: LiquidOutput,
    /// Item code the vessel becomes when the recipe commits.
    #[serde(default)]
    pub output_vessel: Option<ItemCode>,
    /// Higher runs first; equal priorities keep registration order.
    #[serde(default)]
    pub priority: i32,
}

impl RecipeDef {
    /// Whether the available solids and liquid satisfy this recipe.
    pub fn is_satisfied_by(
        &self,
        available: &BTreeMap<ItemCode, u32>,
        liquid: Option<&LiquidPortion>,
    ) -> bool {
        let solids_met = self
            .solids
            .iter()
            .all(|(code, need)| available.get(code).copied().unwrap_or(0) >= *need);
        if !solids_met {
            return false;
        }

        match (&self.input_liquid, liquid) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(req), Some(have)) => have.liquid == req.liquid && have.portions >= req.min_portions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::recipe;

    #[test]
    fn no_requirements_always_satisfied() {
        let r = recipe("water_from_nothing", &[], None, ("game:waterportion", 100));
        assert!(r.is_satisfied_by(&BTreeMap::new(), None));
    }

    #[test]
    fn surplus_solids_still_satisfy() {
        let r = recipe("stew", &[("game:meat", 1)], None, ("game:broth", 100));
        let mut have = BTreeMap::new();
        have.insert(ItemCode::from("game:meat"), 5);
        have.insert(ItemCode::from("game:bone"), 2);
        assert!(r.is_satisfied_by(&have, None));
    }

    #[test]
    fn liquid_present_but_not_required_is_ignored() {
        let r = recipe("stew", &[("game:meat", 1)], None, ("game:broth", 100));
        let mut have = BTreeMap::new();
        have.insert(ItemCode::from("game:meat"), 1);
        let milk = LiquidPortion::new("game:milkportion", 50).unwrap();
        assert!(r.is_satisfied_by(&have, Some(&milk)));
    }
}
