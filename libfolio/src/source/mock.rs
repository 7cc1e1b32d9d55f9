//! In-memory page source for testing
//!
//! Simulates a remote CMS backend: pages live in a shared vector, every call
//! can be delayed to mimic network latency, and fetches or writes can be
//! made to fail.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::catalog::Catalog;
use crate::error::{Result, SourceError};
use crate::source::PageSource;
use crate::templates::PageTemplate;
use crate::types::CmsPage;

/// Configuration for mock source behavior
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Source name (e.g., "mock")
    pub name: String,

    /// Whether fetches should succeed
    pub fetch_succeeds: bool,

    /// Whether writes (upsert/delete) should succeed
    pub write_succeeds: bool,

    /// Error message returned by failing calls
    pub error: Option<String>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Pages currently held by the mock backend
    pub pages: Arc<Mutex<Vec<CmsPage>>>,

    /// Number of times fetch_pages has been called
    pub fetch_call_count: Arc<Mutex<usize>>,

    /// Number of times upsert_page or delete_page has been called
    pub write_call_count: Arc<Mutex<usize>>,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            fetch_succeeds: true,
            write_succeeds: true,
            error: None,
            delay: Duration::from_millis(0),
            pages: Arc::new(Mutex::new(Vec::new())),
            fetch_call_count: Arc::new(Mutex::new(0)),
            write_call_count: Arc::new(Mutex::new(0)),
        }
    }
}

/// Mock page source
pub struct MockPageSource {
    config: MockSourceConfig,
}

impl MockPageSource {
    pub fn new(config: MockSourceConfig) -> Self {
        Self { config }
    }

    /// An empty backend that always succeeds
    pub fn empty() -> Self {
        Self::new(MockSourceConfig::default())
    }

    /// A backend pre-filled with the given pages
    pub fn with_pages(pages: Vec<CmsPage>) -> Self {
        Self::new(MockSourceConfig {
            pages: Arc::new(Mutex::new(pages)),
            ..Default::default()
        })
    }

    /// A backend holding a published home page and a draft about page
    pub fn seeded() -> Self {
        Self::with_pages(sample_pages(&Catalog::builtin()))
    }

    /// A backend that answers after `delay`
    pub fn with_delay(pages: Vec<CmsPage>, delay: Duration) -> Self {
        Self::new(MockSourceConfig {
            pages: Arc::new(Mutex::new(pages)),
            delay,
            ..Default::default()
        })
    }

    /// A backend whose fetches fail with `error`
    pub fn fetch_failure(error: &str) -> Self {
        Self::new(MockSourceConfig {
            fetch_succeeds: false,
            error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A backend whose writes fail with `error`
    pub fn write_failure(error: &str) -> Self {
        Self::new(MockSourceConfig {
            write_succeeds: false,
            error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn fetch_call_count(&self) -> usize {
        *self.config.fetch_call_count.lock().unwrap()
    }

    pub fn write_call_count(&self) -> usize {
        *self.config.write_call_count.lock().unwrap()
    }

    /// Snapshot of the pages held by the backend
    pub fn stored_pages(&self) -> Vec<CmsPage> {
        self.config.pages.lock().unwrap().clone()
    }

    async fn simulate_latency(&self) {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }

    fn error_message(&self, fallback: &str) -> String {
        self.config
            .error
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_pages(&self) -> Result<Vec<CmsPage>> {
        *self.config.fetch_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        if !self.config.fetch_succeeds {
            return Err(SourceError::Fetch(self.error_message("Mock fetch failed")).into());
        }

        Ok(self.config.pages.lock().unwrap().clone())
    }

    async fn upsert_page(&self, page: &CmsPage) -> Result<()> {
        *self.config.write_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        if !self.config.write_succeeds {
            return Err(SourceError::Write(self.error_message("Mock write failed")).into());
        }

        let mut pages = self.config.pages.lock().unwrap();
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => *existing = page.clone(),
            None => pages.push(page.clone()),
        }
        Ok(())
    }

    async fn delete_page(&self, page_id: &str) -> Result<()> {
        *self.config.write_call_count.lock().unwrap() += 1;
        self.simulate_latency().await;

        if !self.config.write_succeeds {
            return Err(SourceError::Write(self.error_message("Mock write failed")).into());
        }

        self.config.pages.lock().unwrap().retain(|p| p.id != page_id);
        Ok(())
    }
}

/// Sample content used to seed the mock backend
pub fn sample_pages(catalog: &Catalog) -> Vec<CmsPage> {
    let mut home = CmsPage::new_draft(
        "Home".to_string(),
        "home".to_string(),
        PageTemplate::Landing.instantiate(catalog),
    );
    home.description = Some("Main landing page".to_string());
    home.publish();

    let mut about = CmsPage::new_draft(
        "About Us".to_string(),
        "about".to_string(),
        PageTemplate::About.instantiate(catalog),
    );
    about.description = Some("Company story and contact details".to_string());

    vec![home, about]
}
