//! Catalog seed loading from catalog.toml
//!
//! The seed file lists the categories, components and demo users a fresh database starts
//! with. It is read once at startup and handed to [`crate::core::seed::seed_catalog`].

use crate::entities::Role;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default seed file location
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// The whole catalog.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Categories to create
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    /// Components to create
    #[serde(default)]
    pub components: Vec<ComponentSeed>,
    /// Users to create
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

/// One `[[categories]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Category name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Budget weight
    #[serde(default)]
    pub priority: Option<i32>,
    /// Whether the category takes part in allocation
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// One `[[components]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct ComponentSeed {
    /// Component name, used to detect already-seeded entries
    pub name: String,
    /// Category name
    pub category: String,
    /// Price in dollars
    pub price: f64,
    /// Specification line
    pub specifications: String,
    /// Legacy compatibility text
    pub compatibility: Option<String>,
    /// Product link
    pub url: Option<String>,
    /// Socket
    pub socket: Option<String>,
    /// Chipset
    pub chipset: Option<String>,
    /// Form factor
    pub form_factor: Option<String>,
    /// Memory type
    pub ram_type: Option<String>,
    /// Storage interface
    pub storage_interface: Option<String>,
    /// Power draw in watts
    pub power_requirement: Option<i32>,
    /// PSU output in watts
    pub wattage: Option<i32>,
    /// Stock flag
    pub stock_status: Option<bool>,
    /// Priority weight
    pub priority: Option<i32>,
    /// Email of the owning supplier
    pub supplier: Option<String>,
}

/// One `[[users]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    /// Display name
    pub name: String,
    /// Unique email
    pub email: String,
    /// Role name: user, admin, assembler or supplier
    pub role: Role,
}

/// Loads the catalog seed from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid seed TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Loads the catalog seed from `CATALOG_PATH`, or ./catalog.toml when unset.
pub fn load_default_config() -> Result<CatalogConfig> {
    let path = std::env::var("CATALOG_PATH").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
    load_config(path)
}
