//! Resolution pipeline: reads data files, converts them into core types, and
//! builds the item catalog and recipe registry.
//!
//! Every file may be RON, JSON or TOML; the format is picked from the
//! extension and a directory may hold only one format per base name.

use alchemy_core::config::AlchemyConfig;
use alchemy_core::id::ItemCode;
use alchemy_core::item::{ContainerSpec, ItemKind};
use alchemy_core::liquid::PORTIONS_PER_LITRE;
use alchemy_core::recipe::{LiquidOutput, LiquidRequirement, RecipeDef};
use alchemy_core::registry::{ItemCatalog, RecipeRegistry, RegistryBuilder, RegistryError};
use alchemy_core::validation::{RecipeWarning, validate_recipes};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::schema::{ItemData, ItemKindData, RecipeData};

pub const ITEMS_FILE: &str = "items";
pub const RECIPES_FILE: &str = "recipes";
pub const CONFIG_FILE: &str = "alchemy";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A field parsed but its value makes no sense.
    #[error("invalid value for '{name}' in {file}: {detail}")]
    InvalidValue {
        file: PathBuf,
        name: String,
        detail: String,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The recipes could not be frozen into a registry.
    #[error("registry error in {file}: {source}")]
    Registry {
        file: PathBuf,
        #[source]
        source: RegistryError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Find `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// `Ok(None)` if there is none; `ConflictingFormats` if there is more than one.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }

    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. RON and JSON files hold the list itself; TOML files
/// hold it under `toml_key` in the top-level table.
pub fn deserialize_list<T: DeserializeOwned>(path: &Path, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }

    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

/// Record `name`, failing if it was already seen.
pub fn check_duplicate(seen: &mut HashSet<String>, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if seen.insert(name.to_string()) {
        Ok(())
    } else {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    }
}

// ===========================================================================
// Conversion
// ===========================================================================

fn item_kind(item: &ItemData, file: &Path) -> Result<ItemKind, DataLoadError> {
    let capacity = || {
        item.capacity.ok_or_else(|| DataLoadError::InvalidValue {
            file: file.to_path_buf(),
            name: item.code.clone(),
            detail: "containers need a capacity".into(),
        })
    };
    Ok(match item.kind {
        ItemKindData::Solid => ItemKind::Solid,
        ItemKindData::Liquid => ItemKind::Liquid,
        ItemKindData::Charge => ItemKind::Container(ContainerSpec::charge(capacity()?)),
        ItemKindData::Reservoir => ItemKind::Container(ContainerSpec::reservoir(capacity()?)),
    })
}

/// Output amount in portions. Litres are rounded to the nearest portion.
fn output_portions(recipe: &RecipeData, file: &Path) -> Result<u32, DataLoadError> {
    let invalid = |detail: &str| DataLoadError::InvalidValue {
        file: file.to_path_buf(),
        name: recipe.code.clone(),
        detail: detail.to_string(),
    };
    match (recipe.output_portions, recipe.output_litres) {
        (Some(_), Some(_)) => Err(invalid("give output_portions or output_litres, not both")),
        (Some(portions), None) => Ok(portions),
        (None, Some(litres)) => {
            let portions = (litres * f64::from(PORTIONS_PER_LITRE)).round();
            if !(0.0..=f64::from(u32::MAX)).contains(&portions) {
                return Err(invalid("output_litres out of range"));
            }
            Ok(portions as u32)
        }
        (None, None) => Ok(PORTIONS_PER_LITRE),
    }
}

fn recipe_def(recipe: RecipeData, file: &Path) -> Result<RecipeDef, DataLoadError> {
    let portions = output_portions(&recipe, file)?;
    Ok(RecipeDef {
        code: recipe.code,
        solids: recipe
            .ingredients
            .into_iter()
            .map(|(code, count)| (ItemCode::from(code), count))
            .collect(),
        input_liquid: recipe.input_liquid.map(|liquid| LiquidRequirement {
            liquid: ItemCode::from(liquid),
            min_portions: recipe.input_portions,
        }),
        output: LiquidOutput {
            liquid: ItemCode::from(recipe.output_liquid),
            portions,
        },
        output_vessel: recipe.output_vessel.map(ItemCode::from),
        priority: recipe.priority,
    })
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Everything the alchemy runtime needs, loaded from one directory.
#[derive(Debug)]
pub struct AlchemyData {
    pub catalog: ItemCatalog,
    pub registry: RecipeRegistry,
    pub config: AlchemyConfig,
    /// Recipe problems that do not stop loading.
    pub warnings: Vec<RecipeWarning>,
}

/// Load an items file into a catalog.
pub fn load_items(path: &Path) -> Result<ItemCatalog, DataLoadError> {
    let items: Vec<ItemData> = deserialize_list(path, "items")?;
    let mut seen = HashSet::new();
    let mut catalog = ItemCatalog::new();
    for item in &items {
        check_duplicate(&mut seen, &item.code, path)?;
        catalog.register(item.code.as_str(), item_kind(item, path)?);
    }
    tracing::debug!(file = %path.display(), items = catalog.len(), "loaded items");
    Ok(catalog)
}

/// Load a recipes file into a frozen registry. File order is registration
/// order.
pub fn load_recipes(path: &Path) -> Result<RecipeRegistry, DataLoadError> {
    let recipes: Vec<RecipeData> = deserialize_list(path, "recipes")?;
    let mut builder = RegistryBuilder::new();
    for recipe in recipes {
        builder.register_recipe(recipe_def(recipe, path)?);
    }
    let registry = builder.build().map_err(|source| DataLoadError::Registry {
        file: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(file = %path.display(), recipes = registry.len(), "loaded recipes");
    Ok(registry)
}

/// Load `alchemy.{ron,json,toml}` from `dir`, or defaults if there is none.
pub fn load_config(dir: &Path) -> Result<AlchemyConfig, DataLoadError> {
    let Some(path) = find_data_file(dir, CONFIG_FILE)? else {
        return Ok(AlchemyConfig::default());
    };
    let config: AlchemyConfig = deserialize_file(&path)?;
    config.validate().map_err(|e| DataLoadError::InvalidValue {
        file: path.clone(),
        name: e.field().to_string(),
        detail: e.to_string(),
    })?;
    Ok(config)
}

/// Load items, recipes and config from `dir` and check the recipes against
/// the items. Warnings are logged and returned.
pub fn load_alchemy_data(dir: &Path) -> Result<AlchemyData, DataLoadError> {
    let catalog = load_items(&require_data_file(dir, ITEMS_FILE)?)?;
    let registry = load_recipes(&require_data_file(dir, RECIPES_FILE)?)?;
    let config = load_config(dir)?;

    let warnings = validate_recipes(&registry, &catalog);
    for warning in &warnings {
        tracing::warn!(dir = %dir.display(), "{warning}");
    }

    tracing::info!(
        dir = %dir.display(),
        items = catalog.len(),
        recipes = registry.len(),
        warnings = warnings.len(),
        "alchemy data loaded"
    );

    Ok(AlchemyData {
        catalog,
        registry,
        config,
        warnings,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
