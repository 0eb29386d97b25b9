//! Alchemy Core -- the fusion state machine and liquid-transfer protocol for
//! heated vessels.
//!
//! A vessel (a cauldron) sits on a heat source. While it is hot, solid
//! ingredients thrown next to it are absorbed; once the absorbed solids and
//! the liquid it holds satisfy a recipe continuously for the hold duration,
//! the recipe's output liquid replaces whatever the vessel held. Players move
//! liquid in and out one transfer unit at a time with a held container.
//!
//! # Notification flow
//!
//! ```text
//! HeatNotification ──▶ HeatTickCoordinator ──▶ SessionTable (absorb)
//!                          │                        │
//!                          └──────▶ FusionEngine ◀──┘
//!                                       │ commit
//!                                       ▼
//!                                 liquid::write ──▶ World::set_vessel
//!
//! InteractNotification ──▶ TransferProtocol ──▶ liquid::{read, write}
//! ```
//!
//! Every mutation replaces a whole [`item::ItemStack`]; nothing is edited in
//! place inside host storage.
//!
//! # Key Types
//!
//! - [`system::AlchemySystem`] -- Owns everything below; host entry point.
//! - [`heat::HeatTickCoordinator`] -- Throttles heat ticks, absorbs
//!   ingredients, drives fusion, evicts idle vessels.
//! - [`fusion::FusionEngine`] -- Idle / Matching / Committing state machine.
//! - [`transfer::TransferProtocol`] -- Pour and draw between a held container
//!   and a vessel.
//! - [`liquid`] -- Typed access to the liquid stored in a container's
//!   attribute tree.
//! - [`registry::RecipeRegistry`] -- Immutable recipe catalog (frozen at
//!   startup) with explicit precedence.
//! - [`event::EventBus`] -- Buffered presentation events.
//! - [`serialize`] -- Versioned persistence of container stacks via bitcode.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for temperatures and fill.

pub mod attributes;
pub mod config;
pub mod dirty;
pub mod event;
pub mod fixed;
pub mod fusion;
pub mod heat;
pub mod id;
pub mod item;
pub mod liquid;
pub mod recipe;
pub mod registry;
pub mod serialize;
pub mod session;
pub mod system;
pub mod transfer;
pub mod validation;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
