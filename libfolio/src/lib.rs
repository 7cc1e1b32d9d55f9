//! Folio - page composition for a travel CMS
//!
//! This library models content pages built from an ordered list of typed,
//! prop-configurable components: a component catalog, page templates, a
//! page store with a draft/published lifecycle, and component editing
//! operations on the page currently open for editing.

pub mod catalog;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod logging;
pub mod service;
pub mod source;
pub mod store;
pub mod templates;
pub mod types;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::Config;
pub use db::Database;
pub use editor::{EditOp, EditOutcome};
pub use error::{FolioError, Result, StoreError};
pub use store::{LoadingHandle, PageStore};
pub use templates::PageTemplate;
pub use types::{
    CmsPage, ComponentCategory, ComponentDefinition, MoveDirection, PageComponent, PageStatus,
    Props,
};
