//! Item templates
//!
//! Read-only per-type definitions. Every instance of a type shares one
//! template through an `Arc`; nothing at runtime mutates them.

use serde::{Deserialize, Serialize};

use super::shape::{CellOffset, ShapeMask};
use crate::error::InventoryError;

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Get rarity name
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }

    /// Get numeric value for sorting (higher = rarer)
    pub fn sort_value(&self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
        }
    }
}

/// Main item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemCategory {
    Weapon,
    Armor,
    Accessory,
    /// Sub-item that attaches to another item's socket
    Augment,
    Consumable,
    #[default]
    Misc,
}

impl ItemCategory {
    /// Get sort value for grouping (lower = appears first)
    pub fn sort_value(&self) -> u8 {
        match self {
            ItemCategory::Weapon => 0,
            ItemCategory::Armor => 1,
            ItemCategory::Accessory => 2,
            ItemCategory::Augment => 3,
            ItemCategory::Consumable => 4,
            ItemCategory::Misc => 5,
        }
    }
}

/// Descriptive data that placement never looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default)]
    pub rarity: Rarity,
    /// Icon asset reference
    #[serde(default)]
    pub icon: Option<String>,
}

/// Immutable definition of one item type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTemplate {
    id: String,
    name: String,
    shape: ShapeMask,
    sockets: Vec<CellOffset>,
    max_stack: u32,
    metadata: ItemMetadata,
}

impl ItemTemplate {
    /// Start a builder; validation happens in [`ItemTemplateBuilder::build`]
    pub fn builder(id: impl Into<String>, shape: ShapeMask) -> ItemTemplateBuilder {
        ItemTemplateBuilder {
            id: id.into(),
            name: None,
            shape,
            sockets: Vec::new(),
            max_stack: 1,
            metadata: ItemMetadata::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape at rotation 0
    pub fn base_shape(&self) -> &ShapeMask {
        &self.shape
    }

    /// Socket offsets in the unrotated bounding box
    pub fn sockets(&self) -> &[CellOffset] {
        &self.sockets
    }

    pub fn max_stack(&self) -> u32 {
        self.max_stack
    }

    pub fn is_stackable(&self) -> bool {
        self.max_stack > 1
    }

    pub fn metadata(&self) -> &ItemMetadata {
        &self.metadata
    }

    /// Cells the item covers once placed
    pub fn cell_count(&self) -> usize {
        self.shape.solid_count()
    }
}

/// Validating builder for [`ItemTemplate`]
#[derive(Debug, Clone)]
pub struct ItemTemplateBuilder {
    id: String,
    name: Option<String>,
    shape: ShapeMask,
    sockets: Vec<CellOffset>,
    max_stack: u32,
    metadata: ItemMetadata,
}

impl ItemTemplateBuilder {
    /// Display name; defaults to the id
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn socket(mut self, x: u8, y: u8) -> Self {
        self.sockets.push(CellOffset::new(x, y));
        self
    }

    pub fn sockets(mut self, sockets: impl IntoIterator<Item = CellOffset>) -> Self {
        self.sockets.extend(sockets);
        self
    }

    pub fn max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    pub fn metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn category(mut self, category: ItemCategory) -> Self {
        self.metadata.category = category;
        self
    }

    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.metadata.rarity = rarity;
        self
    }

    /// Validate and freeze the template
    pub fn build(self) -> Result<ItemTemplate, InventoryError> {
        if self.id.trim().is_empty() {
            return Err(InventoryError::InvalidTemplate(
                "template id must not be empty".to_string(),
            ));
        }
        if self.max_stack == 0 {
            return Err(InventoryError::InvalidTemplate(format!(
                "'{}': stack limit must be at least 1",
                self.id
            )));
        }
        if let Some(bad) = self.sockets.iter().find(|s| !self.shape.contains(**s)) {
            return Err(InventoryError::InvalidTemplate(format!(
                "'{}': socket ({}, {}) lies outside the {}x{} shape",
                self.id,
                bad.x,
                bad.y,
                self.shape.width(),
                self.shape.height()
            )));
        }

        Ok(ItemTemplate {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            shape: self.shape,
            sockets: self.sockets,
            max_stack: self.max_stack,
            metadata: self.metadata,
        })
    }
}
