use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ValidationError;

/// Something the pet can eat: costs `price` hunger points and restores `gain`
/// percentage points of hunger level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub price: u64,
    pub gain: u64,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, price: u64, gain: u64) -> Self {
        Self {
            name: name.into(),
            price,
            gain,
        }
    }

    /// Both price and gain must be positive for an item to be purchasable.
    pub fn is_valid(&self) -> bool {
        self.price > 0 && self.gain > 0
    }
}

/// The table of food offered to the user.
///
/// Passed into hosts explicitly so that prices are configuration, not code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodCatalog {
    items: Vec<FoodItem>,
}

impl FoodCatalog {
    pub fn new(items: Vec<FoodItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    /// Look up an item by name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&FoodItem> {
        let name = name.trim();
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Cheapest item, used to tell the user how many points they still need.
    pub fn cheapest(&self) -> Option<&FoodItem> {
        self.items.iter().min_by_key(|i| i.price)
    }

    /// # Errors
    /// Returns a [`ValidationError`] for an empty catalog, blank or duplicate
    /// names, or items with a zero price or gain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::Required {
                field: "catalog".into(),
            });
        }
        let mut seen = HashSet::new();
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "catalog.name".into(),
                });
            }
            if !seen.insert(item.name.to_ascii_lowercase()) {
                return Err(ValidationError::InvalidValue {
                    field: "catalog.name".into(),
                    message: format!("duplicate item '{}'", item.name),
                });
            }
            if !item.is_valid() {
                return Err(ValidationError::InvalidValue {
                    field: format!("catalog.{}", item.name),
                    message: "price and gain must be positive".into(),
                });
            }
        }
        Ok(())
    }
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::new(vec![
            FoodItem::new("Apple", 5, 5),
            FoodItem::new("Cookie", 15, 15),
            FoodItem::new("Fish", 25, 25),
            FoodItem::new("Cake", 50, 50),
            FoodItem::new("Chicken", 75, 75),
            FoodItem::new("Steak", 100, 100),
        ])
    }
}
