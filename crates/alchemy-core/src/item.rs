use crate::attributes::AttributeTree;
use crate::id::ItemCode;
use serde::{Deserialize, Serialize};

/// What role an item plays. Resolved once when the item is registered in the
/// catalog; nothing inspects item names at interaction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A solid that may be thrown into a vessel as an ingredient.
    Solid,
    /// A liquid portion (only ever stored inside a container).
    Liquid,
    /// Something that holds liquid.
    Container(ContainerSpec),
}

/// Which side of the transfer protocol a container plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// Holds exactly one transfer unit (a bowl).
    Charge,
    /// The heated vessel that accumulates output.
    Reservoir,
}

/// Capacity and role of a container item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub kind: ContainerKind,
    pub capacity_portions: u32,
}

impl ContainerSpec {
    pub const fn charge(capacity_portions: u32) -> Self {
        Self {
            kind: ContainerKind::Charge,
            capacity_portions,
        }
    }

    pub const fn reservoir(capacity_portions: u32) -> Self {
        Self {
            kind: ContainerKind::Reservoir,
            capacity_portions,
        }
    }
}

/// A stack of identical items together with their persisted attribute state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub code: ItemCode,
    pub stack_size: u32,
    #[serde(default)]
    pub attributes: AttributeTree,
}

impl ItemStack {
    pub fn new(code: impl Into<ItemCode>, stack_size: u32) -> Self {
        Self {
            code: code.into(),
            stack_size,
            attributes: AttributeTree::new(),
        }
    }

    /// Copy of this stack with a different size. Attributes are carried over.
    pub fn with_size(&self, stack_size: u32) -> Self {
        Self {
            code: self.code.clone(),
            stack_size,
            attributes: self.attributes.clone(),
        }
    }
}
