//! The menu dataset.
//!
//! Loaded once at startup from a JSON file into an immutable, process-wide
//! store. The menu is the authoritative price source: order submissions are
//! priced from it rather than from whatever the client sent, and the same
//! dataset is served verbatim at `GET /api/menu`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading the menu dataset.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The menu file could not be read.
    #[error("failed to read menu file: {0}")]
    Io(#[from] std::io::Error),

    /// The menu file is not valid JSON of the expected shape.
    #[error("failed to parse menu file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two menu items share an id.
    #[error("duplicate menu item id: {0}")]
    DuplicateItem(String),
}

/// One orderable dish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in euro, two fractional digits.
    pub price: Decimal,
}

/// A section of the menu (soups, curries, wok...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// The full menu as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuData {
    pub categories: Vec<MenuCategory>,
}

/// Immutable menu store with an id index for price lookups.
///
/// Cheap to clone; the dataset is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Menu {
    data: Arc<MenuData>,
    by_id: Arc<HashMap<String, MenuItem>>,
}

impl Menu {
    /// Load the menu from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `MenuError` if the file cannot be read, is not valid JSON,
    /// or contains duplicate item ids.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let raw = std::fs::read_to_string(path)?;
        let data: MenuData = serde_json::from_str(&raw)?;
        Self::from_data(data)
    }

    /// Build a menu from an already-parsed dataset.
    ///
    /// # Errors
    ///
    /// Returns `MenuError::DuplicateItem` if two items share an id.
    pub fn from_data(data: MenuData) -> Result<Self, MenuError> {
        let mut by_id = HashMap::new();
        for category in &data.categories {
            for item in &category.items {
                if by_id.insert(item.id.clone(), item.clone()).is_some() {
                    return Err(MenuError::DuplicateItem(item.id.clone()));
                }
            }
        }

        Ok(Self {
            data: Arc::new(data),
            by_id: Arc::new(by_id),
        })
    }

    /// The full dataset, for serving.
    #[must_use]
    pub fn data(&self) -> &MenuData {
        &self.data
    }

    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.by_id.get(id)
    }

    /// Total number of orderable items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.by_id.len()
    }
}
