//! Backing stores for the page collection
//!
//! The page store never performs I/O on its own. It loads and writes pages
//! through a [`PageSource`], which is injected at construction time so tests
//! can swap the real database for an in-memory mock.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use libfolio::source::{mock::MockPageSource, PageSource};
//!
//! # async fn example() -> libfolio::Result<()> {
//! let source: Arc<dyn PageSource> = Arc::new(MockPageSource::seeded());
//! let pages = source.fetch_pages().await?;
//! println!("{} pages from {}", pages.len(), source.name());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::CmsPage;

// Available outside of tests so integration tests and demos can use it
pub mod mock;

/// Asynchronous access to wherever pages are persisted
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short human-readable name used in log lines
    fn name(&self) -> &str;

    /// Fetch the whole page collection, in collection order
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or returns data
    /// that cannot be decoded. An empty collection is `Ok(vec![])`.
    async fn fetch_pages(&self) -> Result<Vec<CmsPage>>;

    /// Insert or replace a page, keyed by its id
    async fn upsert_page(&self, page: &CmsPage) -> Result<()>;

    /// Remove a page. Removing an id that does not exist is not an error.
    async fn delete_page(&self, page_id: &str) -> Result<()>;
}
