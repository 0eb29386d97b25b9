//! Liquid content store: reads and writes the single liquid portion a
//! container holds inside its persisted attribute tree.
//!
//! # Layout
//!
//! ```text
//! attributes
//! ├── contents: Tree
//! │   └── "0": Stack { code, stack_size = portions }
//! └── quantity: Int     (legacy mirror of stack_size, 0 when empty)
//! ```
//!
//! Every write returns a new [`ItemStack`]; the input is never mutated, so
//! hosts comparing old and new values always notice the change.

use crate::attributes::{AttributeTree, AttributeValue, NestedStack};
use crate::fixed::{Fixed64, ratio_clamped};
use crate::id::ItemCode;
use crate::item::ItemStack;
use crate::registry::ItemCatalog;
use serde::{Deserialize, Serialize};

/// 100 portions make one litre, everywhere.
pub const PORTIONS_PER_LITRE: u32 = 100;

pub const CONTENTS_KEY: &str = "contents";
pub const QUANTITY_KEY: &str = "quantity";
pub const SLOT_KEY: &str = "0";

/// A non-empty amount of one liquid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LiquidPortion {
    pub liquid: ItemCode,
    pub portions: u32,
}

impl LiquidPortion {
    /// A portion of `portions` of `liquid`. Zero is normalized to `None`.
    pub fn new(liquid: impl Into<ItemCode>, portions: u32) -> Option<Self> {
        (portions > 0).then(|| Self {
            liquid: liquid.into(),
            portions,
        })
    }

    pub fn litres(&self) -> Fixed64 {
        Fixed64::from_num(self.portions) / Fixed64::from_num(PORTIONS_PER_LITRE)
    }

    /// Same liquid, different amount. Zero yields `None`.
    pub fn with_portions(&self, portions: u32) -> Option<Self> {
        Self::new(self.liquid.clone(), portions)
    }
}

/// Why stored content was discarded on read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("stored identity {0} does not resolve in the item catalog")]
    UnresolvedIdentity(ItemCode),
    #[error("stored identity {0} is not a liquid")]
    NotALiquid(ItemCode),
}

/// Decode the stored portion without consulting the catalog.
pub fn read_raw(stack: &ItemStack) -> Option<LiquidPortion> {
    let nested = stack
        .attributes
        .get_tree(CONTENTS_KEY)
        .and_then(|tree| tree.get_stack(SLOT_KEY))?;
    LiquidPortion::new(nested.code.clone(), nested.stack_size)
}

/// Decode the stored portion and resolve its identity against the catalog.
pub fn try_read(stack: &ItemStack, catalog: &ItemCatalog) -> Result<Option<LiquidPortion>, ContentError> {
    let Some(portion) = read_raw(stack) else {
        return Ok(None);
    };
    if !catalog.resolves(&portion.liquid) {
        return Err(ContentError::UnresolvedIdentity(portion.liquid));
    }
    if !catalog.is_liquid(&portion.liquid) {
        return Err(ContentError::NotALiquid(portion.liquid));
    }
    Ok(Some(portion))
}

/// Stored portion of a container, or `None` when empty or unresolvable.
///
/// Unresolvable content is logged and treated as absent; it never becomes a
/// recipe input.
pub fn read(stack: &ItemStack, catalog: &ItemCatalog) -> Option<LiquidPortion> {
    match try_read(stack, catalog) {
        Ok(portion) => portion,
        Err(err) => {
            tracing::warn!(container = %stack.code, error = %err, "ignoring stored liquid");
            None
        }
    }
}

/// Copy of `stack` holding `portion` (or nothing). The legacy `quantity`
/// field is kept in sync.
pub fn write(stack: &ItemStack, portion: Option<&LiquidPortion>) -> ItemStack {
    let mut out = stack.clone();
    match portion.filter(|p| p.portions > 0) {
        Some(p) => {
            let mut contents = match out.attributes.remove(CONTENTS_KEY) {
                Some(AttributeValue::Tree(tree)) => tree,
                _ => AttributeTree::new(),
            };
            contents.set_stack(
                SLOT_KEY,
                NestedStack {
                    code: p.liquid.clone(),
                    stack_size: p.portions,
                },
            );
            out.attributes.set(CONTENTS_KEY, AttributeValue::Tree(contents));
            out.attributes.set_int(QUANTITY_KEY, i64::from(p.portions));
        }
        None => clear_contents(&mut out.attributes),
    }
    out
}

/// Copy of `stack` with malformed or non-liquid contents removed.
///
/// Returns the input unchanged (as a clone) when the contents are valid or
/// there are none.
pub fn sanitize(stack: &ItemStack, catalog: &ItemCatalog) -> ItemStack {
    let attrs = &stack.attributes;
    if !attrs.has(CONTENTS_KEY) {
        return stack.clone();
    }

    let valid = attrs
        .get_tree(CONTENTS_KEY)
        .and_then(|tree| tree.get_stack(SLOT_KEY))
        .is_some_and(|nested| nested.stack_size > 0 && catalog.is_liquid(&nested.code));

    if valid {
        return stack.clone();
    }

    tracing::debug!(container = %stack.code, "clearing malformed container contents");
    let mut out = stack.clone();
    clear_contents(&mut out.attributes);
    out
}

/// How full a container is, in `[0, 1]`.
pub fn fill_fraction(stack: &ItemStack, capacity_portions: u32, catalog: &ItemCatalog) -> Fixed64 {
    let stored = read(stack, catalog).map(|p| p.portions).unwrap_or(0);
    ratio_clamped(stored, capacity_portions)
}

fn clear_contents(attrs: &mut AttributeTree) {
    attrs.remove(CONTENTS_KEY);
    attrs.set_int(QUANTITY_KEY, 0);
}
