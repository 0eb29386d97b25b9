//! Data-driven content for the alchemy runtime: items, recipes and tuning
//! loaded from RON, JSON or TOML files.

pub mod loader;
pub mod schema;

pub use loader::{AlchemyData, DataLoadError, load_alchemy_data};
