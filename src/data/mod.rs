//! Data loading and external game content
//!
//! Item templates live in RON files so content can change without a
//! rebuild. Everything loaded here passes template validation first.

pub mod loader;
pub mod templates;

pub use loader::{DataError, TemplateLibrary};
pub use templates::{default_item_templates, ItemTemplateDef, ItemTemplateDefs};
