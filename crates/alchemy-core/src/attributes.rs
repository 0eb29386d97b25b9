//! Nested key-value state persisted with every item stack.
//!
//! Hosts treat this tree as opaque. Only the liquid content store reads or
//! writes the two fields it owns (`contents` and `quantity`); everything else
//! is carried through untouched.

use crate::id::ItemCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stack nested inside an attribute tree (e.g. the liquid held by a bowl).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedStack {
    pub code: ItemCode,
    pub stack_size: u32,
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Stack(NestedStack),
    Tree(AttributeTree),
}

/// Ordered attribute map. Ordering keeps the encoded form deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeTree {
    entries: BTreeMap<String, AttributeValue>,
}

impl AttributeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.entries.remove(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(AttributeValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, AttributeValue::Int(value));
    }

    pub fn get_tree(&self, key: &str) -> Option<&AttributeTree> {
        match self.entries.get(key) {
            Some(AttributeValue::Tree(t)) => Some(t),
            _ => None,
        }
    }

    pub fn get_stack(&self, key: &str) -> Option<&NestedStack> {
        match self.entries.get(key) {
            Some(AttributeValue::Stack(s)) => Some(s),
            _ => None,
        }
    }

    pub fn set_stack(&mut self, key: impl Into<String>, stack: NestedStack) {
        self.set(key, AttributeValue::Stack(stack));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
