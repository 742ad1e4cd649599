//! RON template loader
//!
//! Loads item templates from an external RON file, with fallback to
//! hardcoded defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use super::templates::{default_item_templates, ItemTemplateDef, ItemTemplateDefs};
use crate::config::EngineConfig;
use crate::error::InventoryError;
use crate::items::instance::{InstanceIdGen, ItemInstance};
use crate::items::shape::MAX_SHAPE_SIZE;
use crate::items::template::ItemTemplate;

/// Errors from loading or exporting data files
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Template(#[from] InventoryError),

    #[error("template id '{0}' is defined more than once")]
    DuplicateTemplate(String),
}

/// Validated, shareable item templates keyed by ID
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, Arc<ItemTemplate>>,
}

impl TemplateLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every definition; any bad or duplicate entry fails the lot
    pub fn from_defs(defs: &ItemTemplateDefs, max_shape_size: u8) -> Result<Self, DataError> {
        let mut library = Self::new();
        for def in &defs.templates {
            library.insert(def.to_template(max_shape_size)?)?;
        }
        Ok(library)
    }

    /// The built-in templates
    pub fn defaults() -> Self {
        Self::from_defs(&default_item_templates(), MAX_SHAPE_SIZE).unwrap_or_else(|e| {
            warn!("Built-in templates are invalid: {}", e);
            Self::new()
        })
    }

    /// Parse templates from RON text
    pub fn from_ron(text: &str, max_shape_size: u8) -> Result<Self, DataError> {
        let defs: ItemTemplateDefs = ron::from_str(text).map_err(|e| DataError::Parse {
            what: "templates".to_string(),
            message: e.to_string(),
        })?;
        Self::from_defs(&defs, max_shape_size)
    }

    /// Load templates from a RON file
    pub fn load(path: &Path, max_shape_size: u8) -> Result<Self, DataError> {
        let text = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_ron(&text, max_shape_size)?;
        info!("Loaded {} item templates from {}", library.len(), path.display());
        Ok(library)
    }

    /// Load the configured template file, or fall back to the defaults
    pub fn load_or_default(config: &EngineConfig) -> Self {
        let path = config.templates_path();
        if path.exists() {
            match Self::load(&path, config.max_shape_size) {
                Ok(library) => return library,
                Err(e) => warn!("Failed to load {}: {}. Using defaults.", path.display(), e),
            }
        }
        Self::defaults()
    }

    /// Add one template
    pub fn insert(&mut self, template: ItemTemplate) -> Result<Arc<ItemTemplate>, DataError> {
        if self.templates.contains_key(template.id()) {
            return Err(DataError::DuplicateTemplate(template.id().to_string()));
        }
        let template = Arc::new(template);
        self.templates
            .insert(template.id().to_string(), template.clone());
        Ok(template)
    }

    /// Find a template by ID
    pub fn get(&self, id: &str) -> Option<&Arc<ItemTemplate>> {
        self.templates.get(id)
    }

    /// New unplaced instance of a template
    pub fn instantiate(&self, id: &str, ids: &mut InstanceIdGen) -> Option<ItemInstance> {
        self.get(id)
            .map(|template| ItemInstance::new(ids.next_id(), template.clone()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in ID order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ItemTemplate>> {
        self.templates.values()
    }

    /// Serializable form, in ID order
    pub fn to_defs(&self) -> ItemTemplateDefs {
        ItemTemplateDefs {
            templates: self.iter().map(|t| ItemTemplateDef::from(t.as_ref())).collect(),
        }
    }

    /// Write this library as pretty RON for hand editing
    pub fn export(&self, path: &Path) -> Result<(), DataError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| DataError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let text = ron::ser::to_string_pretty(&self.to_defs(), ron::ser::PrettyConfig::default())
            .map_err(|e| DataError::Serialize {
                what: "templates".to_string(),
                message: e.to_string(),
            })?;
        fs::write(path, text).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Exported {} item templates to {}", self.len(), path.display());
        Ok(())
    }
}
