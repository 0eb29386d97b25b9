//! The fusion state machine.
//!
//! One call to [`FusionEngine::evaluate`] moves a session through at most one
//! transition:
//!
//! ```text
//!            match (new or different)         same match, elapsed < hold
//!   Idle ─────────────────────────────▶ Matching ◀───────────────┐
//!    ▲                                    │  │                   │
//!    │  nothing matches                   │  └───────────────────┘
//!    └────────────────────────────────────┤
//!    ▲                                    │ same match, elapsed >= hold
//!    └──────────── Committing ◀───────────┘
//! ```
//!
//! A commit only happens inside an evaluation that has just re-confirmed the
//! same recipe against the current solids and liquid, so the match is always
//! validated at the instant the timer expires.

use crate::fixed::Millis;
use crate::id::{ItemCode, RecipeId};
use crate::item::ItemStack;
use crate::liquid::{self, LiquidPortion};
use crate::recipe::RecipeDef;
use crate::registry::{ItemCatalog, RecipeRegistry};
use crate::session::FusionSession;

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FusionStep {
    /// Nothing matched and nothing was matching.
    Idle,
    /// The previous match stopped holding. Absorbed solids are kept.
    Cleared { previous: RecipeId },
    /// A new match began; the hold timer starts now.
    Started { recipe: RecipeId },
    /// The match still holds but the timer has not run out.
    Progressing {
        recipe: RecipeId,
        elapsed: Millis,
        hold: Millis,
    },
    /// The recipe committed. `vessel` replaces the vessel stack.
    Committed {
        recipe: RecipeId,
        vessel: ItemStack,
        output: LiquidPortion,
    },
}

/// A recipe whose output cannot be produced with the loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FusionError {
    #[error("recipe {recipe}: {identity} {problem}")]
    Configuration {
        recipe: String,
        identity: ItemCode,
        problem: &'static str,
    },
}

/// Evaluates sessions against the recipe registry.
#[derive(Debug, Clone, Copy)]
pub struct FusionEngine {
    hold_duration: Millis,
}

impl FusionEngine {
    pub fn new(hold_duration: Millis) -> Self {
        Self { hold_duration }
    }

    pub fn hold_duration(&self) -> Millis {
        self.hold_duration
    }

    /// Advance `session` for the vessel holding `vessel` at time `now`.
    ///
    /// On a configuration error the session is left untouched: still
    /// matching, timer not reset, so the next evaluation retries.
    pub fn evaluate(
        &self,
        session: &mut FusionSession,
        vessel: &ItemStack,
        registry: &RecipeRegistry,
        catalog: &ItemCatalog,
        now: Millis,
    ) -> Result<FusionStep, FusionError> {
        let stored = liquid::read(vessel, catalog);
        let found = registry.find_match(session.absorbed(), stored.as_ref());

        let Some((recipe, def)) = found else {
            return Ok(match session.matched() {
                Some(previous) => {
                    session.clear_match();
                    FusionStep::Cleared { previous }
                }
                None => FusionStep::Idle,
            });
        };

        let started_at = match (session.matched(), session.match_started_at()) {
            (Some(current), Some(started_at)) if current == recipe => started_at,
            _ => {
                session.begin_match(recipe, now);
                return Ok(FusionStep::Started { recipe });
            }
        };

        let elapsed = now.saturating_sub(started_at);
        if elapsed < self.hold_duration {
            return Ok(FusionStep::Progressing {
                recipe,
                elapsed,
                hold: self.hold_duration,
            });
        }

        let (vessel, output) = commit_output(def, vessel, catalog)?;
        session.reset();
        Ok(FusionStep::Committed {
            recipe,
            vessel,
            output,
        })
    }
}

/// Build the post-commit vessel stack: prior liquid overwritten by the
/// output, clamped to capacity, optionally swapped to the output vessel.
fn commit_output(
    def: &RecipeDef,
    vessel: &ItemStack,
    catalog: &ItemCatalog,
) -> Result<(ItemStack, LiquidPortion), FusionError> {
    let config_error = |identity: &ItemCode, problem| FusionError::Configuration {
        recipe: def.code.clone(),
        identity: identity.clone(),
        problem,
    };

    if !catalog.resolves(&def.output.liquid) {
        return Err(config_error(&def.output.liquid, "does not resolve"));
    }
    if !catalog.is_liquid(&def.output.liquid) {
        return Err(config_error(&def.output.liquid, "is not a liquid"));
    }

    let target = def.output_vessel.as_ref().unwrap_or(&vessel.code);
    if !catalog.resolves(target) {
        return Err(config_error(target, "does not resolve"));
    }
    let Some(spec) = catalog.container_spec(target) else {
        return Err(config_error(target, "is not a container"));
    };

    let portions = def.output.portions.min(spec.capacity_portions);
    let Some(output) = LiquidPortion::new(def.output.liquid.clone(), portions) else {
        return Err(config_error(target, "has no capacity"));
    };

    let mut swapped = vessel.clone();
    swapped.code = target.clone();
    Ok((liquid::write(&swapped, Some(&output)), output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryBuilder, recipe};
    use crate::test_utils::*;

    const HOLD: Millis = 10_000;

    fn engine() -> FusionEngine {
        FusionEngine::new(HOLD)
    }

    fn stew_session() -> FusionSession {
        let mut s = FusionSession::new();
        s.absorb(ItemCode::from(MEAT), 1);
        s.absorb(ItemCode::from(SALT), 1);
        s
    }

    #[test]
    fn idle_without_match() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = FusionSession::new();
        let step = engine()
            .evaluate(&mut s, &empty_cauldron(), &registry, &catalog, 0)
            .unwrap();
        assert_eq!(step, FusionStep::Idle);
    }

    #[test]
    fn first_match_starts_timer() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = stew_session();
        let step = engine()
            .evaluate(&mut s, &empty_cauldron(), &registry, &catalog, 1_000)
            .unwrap();
        let stew = registry.recipe_id(STEW).unwrap();
        assert_eq!(step, FusionStep::Started { recipe: stew });
        assert_eq!(s.match_started_at(), Some(1_000));
    }

    #[test]
    fn one_ms_short_does_not_commit() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = stew_session();
        let vessel = empty_cauldron();
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();

        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, HOLD - 1)
            .unwrap();
        assert!(matches!(step, FusionStep::Progressing { elapsed, .. } if elapsed == HOLD - 1));
    }

    #[test]
    fn exact_hold_commits_and_resets_session() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = stew_session();
        let vessel = empty_cauldron();
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();

        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, HOLD)
            .unwrap();
        let FusionStep::Committed { vessel, output, .. } = step else {
            panic!("expected commit, got {step:?}");
        };
        assert_eq!(output.liquid, ItemCode::from(BROTH));
        assert_eq!(liquid::read(&vessel, &catalog), Some(output));
        assert!(s.is_empty());
    }

    #[test]
    fn commit_overwrites_prior_liquid() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = stew_session();
        let vessel = cauldron_with(WATER, 50);
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();
        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, HOLD)
            .unwrap();
        let FusionStep::Committed { vessel, .. } = step else {
            panic!("expected commit");
        };
        let stored = liquid::read(&vessel, &catalog).unwrap();
        assert_eq!(stored.liquid, ItemCode::from(BROTH));
        assert_eq!(stored.portions, 100);
    }

    #[test]
    fn switching_recipes_restarts_timer() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = stew_session();
        let vessel = cauldron_with(WATER, 100);

        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 6_000).unwrap();

        // A second meat makes the higher-priority blood brew match instead.
        s.absorb(ItemCode::from(MEAT), 1);
        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, 6_000)
            .unwrap();
        let brew = registry.recipe_id(BLOOD_BREW).unwrap();
        assert_eq!(step, FusionStep::Started { recipe: brew });

        // 10 s cumulative, only 4 s on the brew.
        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, 10_000)
            .unwrap();
        assert!(matches!(step, FusionStep::Progressing { elapsed: 4_000, .. }));

        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, 16_000)
            .unwrap();
        let FusionStep::Committed { vessel, output, .. } = step else {
            panic!("expected commit");
        };
        assert_eq!(vessel.code, ItemCode::from(BLOOD_CAULDRON));
        assert_eq!(output.liquid, ItemCode::from(BLOOD));
    }

    #[test]
    fn losing_the_match_clears_timer_but_keeps_solids() {
        let (catalog, registry) = (standard_catalog(), standard_registry());
        let mut s = FusionSession::new();
        s.absorb(ItemCode::from(MEAT), 2);
        let watered = cauldron_with(WATER, 100);
        engine().evaluate(&mut s, &watered, &registry, &catalog, 0).unwrap();
        assert!(s.matched().is_some());

        let step = engine()
            .evaluate(&mut s, &empty_cauldron(), &registry, &catalog, 1_000)
            .unwrap();
        assert!(matches!(step, FusionStep::Cleared { .. }));
        assert_eq!(s.matched(), None);
        assert_eq!(s.absorbed_count(&ItemCode::from(MEAT)), 2);
    }

    #[test]
    fn output_clamped_to_vessel_capacity() {
        let catalog = standard_catalog();
        let mut b = RegistryBuilder::new();
        b.register_recipe(recipe("flood", &[(SALT, 1)], None, (WATER, 1_000)));
        let registry = b.build().unwrap();

        let mut s = FusionSession::new();
        s.absorb(ItemCode::from(SALT), 1);
        let vessel = empty_cauldron();
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();
        let step = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, HOLD)
            .unwrap();
        let FusionStep::Committed { output, .. } = step else {
            panic!("expected commit");
        };
        assert_eq!(output.portions, CAULDRON_CAPACITY);
    }

    #[test]
    fn unresolved_output_keeps_matching_and_retries() {
        let catalog = standard_catalog();
        let mut b = RegistryBuilder::new();
        b.register_recipe(recipe("ghost", &[(SALT, 1)], None, ("mod:unknownportion", 100)));
        let registry = b.build().unwrap();

        let mut s = FusionSession::new();
        s.absorb(ItemCode::from(SALT), 1);
        let vessel = empty_cauldron();
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();

        for now in [HOLD, HOLD + 2_000] {
            let err = engine()
                .evaluate(&mut s, &vessel, &registry, &catalog, now)
                .unwrap_err();
            assert!(matches!(err, FusionError::Configuration { .. }));
            assert_eq!(s.match_started_at(), Some(0));
            assert_eq!(s.absorbed_count(&ItemCode::from(SALT)), 1);
        }
    }

    #[test]
    fn output_vessel_must_be_a_container() {
        let catalog = standard_catalog();
        let mut b = RegistryBuilder::new();
        let mut def = recipe("salted", &[(SALT, 1)], None, (WATER, 100));
        def.output_vessel = Some(ItemCode::from(MEAT));
        b.register_recipe(def);
        let registry = b.build().unwrap();

        let mut s = FusionSession::new();
        s.absorb(ItemCode::from(SALT), 1);
        let vessel = empty_cauldron();
        engine().evaluate(&mut s, &vessel, &registry, &catalog, 0).unwrap();
        let err = engine()
            .evaluate(&mut s, &vessel, &registry, &catalog, HOLD)
            .unwrap_err();
        assert_eq!(
            err,
            FusionError::Configuration {
                recipe: "salted".into(),
                identity: ItemCode::from(MEAT),
                problem: "is not a container",
            }
        );
    }
}
