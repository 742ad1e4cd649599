//! Item template definitions for data-driven content
//!
//! These are the serializable forms loaded from RON. They are validated
//! into [`ItemTemplate`]s before anything can use them.

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::items::shape::{CellOffset, ShapeMask};
use crate::items::template::{ItemCategory, ItemMetadata, ItemTemplate, Rarity};

fn default_stack() -> u32 {
    1
}

/// A template for items from external data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplateDef {
    /// Unique template ID
    pub id: String,
    /// Display name of the item
    pub name: String,
    /// Shape rows, `#` solid and `.` empty
    pub shape: Vec<String>,
    /// Socket offsets within the unrotated shape
    #[serde(default)]
    pub sockets: Vec<CellOffset>,
    /// Stack limit
    #[serde(default = "default_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl ItemTemplateDef {
    /// Validate into a runtime template
    pub fn to_template(&self, max_shape_size: u8) -> Result<ItemTemplate, InventoryError> {
        let shape = ShapeMask::from_rows_with_limit(&self.shape, max_shape_size)
            .map_err(|e| match e {
                InventoryError::InvalidTemplate(msg) => {
                    InventoryError::InvalidTemplate(format!("'{}': {}", self.id, msg))
                }
                other => other,
            })?;
        ItemTemplate::builder(self.id.clone(), shape)
            .name(self.name.clone())
            .sockets(self.sockets.iter().copied())
            .max_stack(self.max_stack)
            .metadata(self.metadata.clone())
            .build()
    }
}

impl From<&ItemTemplate> for ItemTemplateDef {
    fn from(template: &ItemTemplate) -> Self {
        Self {
            id: template.id().to_string(),
            name: template.name().to_string(),
            shape: template.base_shape().rows(),
            sockets: template.sockets().to_vec(),
            max_stack: template.max_stack(),
            metadata: template.metadata().clone(),
        }
    }
}

/// Collection of item templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplateDefs {
    pub templates: Vec<ItemTemplateDef>,
}

impl ItemTemplateDefs {
    /// Find a template by ID
    pub fn find(&self, id: &str) -> Option<&ItemTemplateDef> {
        self.templates.iter().find(|t| t.id == id)
    }
}

fn def(
    id: &str,
    name: &str,
    shape: &[&str],
    sockets: &[(u8, u8)],
    max_stack: u32,
    category: ItemCategory,
    rarity: Rarity,
) -> ItemTemplateDef {
    ItemTemplateDef {
        id: id.to_string(),
        name: name.to_string(),
        shape: shape.iter().map(|r| r.to_string()).collect(),
        sockets: sockets.iter().map(|&(x, y)| CellOffset::new(x, y)).collect(),
        max_stack,
        metadata: ItemMetadata {
            category,
            rarity,
            icon: Some(format!("icons/{}.png", id)),
        },
    }
}

/// Create default item templates (hardcoded fallback)
pub fn default_item_templates() -> ItemTemplateDefs {
    use ItemCategory::*;
    use Rarity::*;

    ItemTemplateDefs {
        templates: vec![
            def("dagger", "Dagger", &["#", "#"], &[(0, 0)], 1, Weapon, Common),
            def("longsword", "Longsword", &["#", "#", "#", "#"], &[(0, 0), (0, 3)], 1, Weapon, Uncommon),
            def("pistol", "Pistol", &["###", "#.."], &[(2, 0)], 1, Weapon, Uncommon),
            def("rifle", "Rifle", &["#####", "...##"], &[(0, 0), (4, 1)], 1, Weapon, Rare),
            def("shield", "Kite Shield", &["###", "###", ".#."], &[(1, 1)], 1, Armor, Uncommon),
            def("helm", "Iron Helm", &["##", "##"], &[], 1, Armor, Common),
            def("amulet", "Cursed Amulet", &[".#.", "###", ".#."], &[(1, 1)], 1, Accessory, Epic),
            def("ring", "Band of Embers", &["#"], &[(0, 0)], 1, Accessory, Legendary),
            def("scope", "Scope", &["##"], &[], 1, Augment, Rare),
            def("rune", "Fire Rune", &["#"], &[], 1, Augment, Uncommon),
            def("potion", "Health Potion", &["#"], &[], 10, Consumable, Common),
            def("rations", "Rations", &["##"], &[], 5, Consumable, Common),
            def("boomerang", "Boomerang", &["##", "#."], &[(1, 0)], 1, Weapon, Common),
        ],
    }
}
