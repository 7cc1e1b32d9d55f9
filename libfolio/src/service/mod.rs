//! Service layer for Folio
//!
//! `FolioService` wires the configured database, the page store and the
//! event bus together so the CLI tools (and any other front end) share one
//! way of opening and persisting pages.
//!
//! # Example
//!
//! ```no_run
//! use libfolio::service::FolioService;
//! use libfolio::templates::PageTemplate;
//!
//! # async fn example() -> libfolio::Result<()> {
//! let mut service = FolioService::new().await?;
//!
//! let id = service
//!     .store_mut()
//!     .create_new_page("Summer Deals", "summer-deals", PageTemplate::Landing)?;
//! service.store().persist_page(&id).await?;
//!
//! service.store_mut().select_page(&id)?;
//! service.store_mut().add_component("newsletter", None)?;
//! service.save_and_persist().await?;
//! # Ok(())
//! # }
//! ```

pub mod events;

use std::sync::Arc;

use self::events::{EventBus, EventReceiver};
use crate::error::{ConfigError, FolioError};
use crate::store::PageStore;
use crate::types::CmsPage;
use crate::{Config, Database, Result};

/// Main service facade
pub struct FolioService {
    db: Arc<Database>,
    config: Arc<Config>,
    store: PageStore,
    event_bus: EventBus,
}

impl FolioService {
    /// Create a service from the default configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, the database
    /// cannot be opened or migrated, or the initial page load fails.
    pub async fn new() -> Result<Self> {
        let config = Config::load_or_default()?;
        Self::from_config(config).await
    }

    /// Create a service with a custom configuration
    pub async fn from_config(config: Config) -> Result<Self> {
        let db_path = crate::config::resolve_db_path(&config.database.path)?;
        let db_path_str = db_path.to_str().ok_or_else(|| {
            FolioError::Config(ConfigError::MissingField(
                "Invalid database path".to_string(),
            ))
        })?;
        let db = Arc::new(Database::new(db_path_str).await?);

        let event_bus = EventBus::new(100);
        let mut store = PageStore::new(db.clone()).with_events(event_bus.clone());
        store.load_pages().await?;

        Ok(Self {
            db,
            config: Arc::new(config),
            store,
            event_bus,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the database directly
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn store(&self) -> &PageStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PageStore {
        &mut self.store
    }

    /// Subscribe to page events
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }

    /// Save the selected page into the collection and write it to the database
    pub async fn save_and_persist(&mut self) -> Result<CmsPage> {
        let page = self.store.save_page()?.clone();
        self.store.persist_page(&page.id).await?;
        Ok(page)
    }

    /// Publish a page and write it to the database
    pub async fn publish_and_persist(&mut self, page_id: &str) -> Result<CmsPage> {
        let page = self.store.publish_page(page_id)?.clone();
        self.store.persist_page(page_id).await?;
        Ok(page)
    }

    /// Delete a page from the collection and the database
    pub async fn delete_and_persist(&mut self, page_id: &str) -> Result<CmsPage> {
        let page = self.store.delete_page(page_id)?;
        self.store.unpersist_page(page_id).await?;
        Ok(page)
    }
}
