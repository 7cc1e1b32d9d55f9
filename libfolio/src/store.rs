//! Page store
//!
//! Owns the page collection and the page currently open for editing.
//!
//! The selected page is a working copy: edits made through the component
//! operations in [`crate::editor`] only reach the collection when
//! [`PageStore::save_page`] is called. Publishing acts on the collection and
//! refreshes the working copy if it is the same page.
//!
//! Only [`PageStore::load_pages`], [`PageStore::persist_page`] and
//! [`PageStore::unpersist_page`] touch the source and are async. Everything
//! else is synchronous and takes `&mut self`, so a read-modify-write on the
//! collection can never interleave with another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::{Result, StoreError};
use crate::service::events::{Event, EventBus};
use crate::source::PageSource;
use crate::templates::PageTemplate;
use crate::types::CmsPage;

pub struct PageStore {
    pages: Vec<CmsPage>,
    pub(crate) selected: Option<CmsPage>,
    loading: Arc<AtomicBool>,
    pub(crate) catalog: Catalog,
    source: Arc<dyn PageSource>,
    events: Option<EventBus>,
}

impl PageStore {
    /// Create an empty store backed by `source`, using the built-in catalog
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self::with_catalog(source, Catalog::builtin())
    }

    pub fn with_catalog(source: Arc<dyn PageSource>, catalog: Catalog) -> Self {
        Self {
            pages: Vec::new(),
            selected: None,
            loading: Arc::new(AtomicBool::new(false)),
            catalog,
            source,
            events: None,
        }
    }

    /// Emit lifecycle events on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn pages(&self) -> &[CmsPage] {
        &self.pages
    }

    pub fn page(&self, page_id: &str) -> Option<&CmsPage> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&CmsPage> {
        self.pages.iter().find(|p| p.slug == slug)
    }

    pub fn selected_page(&self) -> Option<&CmsPage> {
        self.selected.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }

    /// True while [`PageStore::load_pages`] is waiting on the source
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Read-only view of the loading flag that stays usable while a load
    /// holds the store mutably, e.g. for a progress indicator
    pub fn loading_handle(&self) -> LoadingHandle {
        LoadingHandle(self.loading.clone())
    }

    /// Replace the collection with whatever the source holds.
    ///
    /// Returns the number of pages loaded. On failure the collection is left
    /// as it was and the source error is returned, so an unreachable backend
    /// is never mistaken for an empty one.
    ///
    /// The loading flag is cleared however the call ends, including when the
    /// returned future is dropped before the source answers.
    pub async fn load_pages(&mut self) -> Result<usize> {
        tracing::debug!("Loading pages from {}", self.source.name());

        let fetched = {
            let _loading = LoadingGuard::raise(&self.loading);
            self.source.fetch_pages().await
        };

        let pages = fetched.map_err(|e| {
            tracing::error!("Failed to load pages from {}: {}", self.source.name(), e);
            e
        })?;

        let count = pages.len();
        self.pages = pages;
        tracing::info!("Loaded {} pages from {}", count, self.source.name());
        self.emit(Event::PagesLoaded { count });

        Ok(count)
    }

    /// Create a draft page from a template and append it to the collection.
    ///
    /// The new page is not selected. Returns its id.
    pub fn create_new_page(
        &mut self,
        title: &str,
        slug: &str,
        template: PageTemplate,
    ) -> std::result::Result<String, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidInput(
                "Page title cannot be empty".to_string(),
            ));
        }
        validate_slug(slug)?;
        if self.find_by_slug(slug).is_some() {
            return Err(StoreError::DuplicateSlug(slug.to_string()));
        }

        let components = template.instantiate(&self.catalog);
        let page = CmsPage::new_draft(title.to_string(), slug.to_string(), components);
        let page_id = page.id.clone();

        tracing::info!(
            "Created page {} ('{}') from template {}",
            page_id,
            slug,
            template
        );
        self.emit(Event::PageCreated {
            page_id: page_id.clone(),
            slug: slug.to_string(),
        });
        self.pages.push(page);

        Ok(page_id)
    }

    /// Open a copy of the page for editing.
    ///
    /// An unknown id clears the current selection and raises a
    /// [`Event::PageNotFound`] notification.
    pub fn select_page(&mut self, page_id: &str) -> std::result::Result<&CmsPage, StoreError> {
        match self.page(page_id).cloned() {
            Some(page) => {
                tracing::debug!("Selected page {}", page_id);
                self.emit(Event::PageSelected {
                    page_id: page_id.to_string(),
                });
                let selected = self.selected.insert(page);
                Ok(&*selected)
            }
            None => {
                self.selected = None;
                tracing::warn!("Page not found: {}", page_id);
                self.emit(Event::PageNotFound {
                    page_id: page_id.to_string(),
                });
                Err(StoreError::PageNotFound(page_id.to_string()))
            }
        }
    }

    /// Drop the working copy without saving it
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Change the title and/or description of the working copy.
    ///
    /// The slug is fixed once a page exists. An empty title is rejected.
    pub fn update_page_details(
        &mut self,
        title: Option<String>,
        description: Option<String>,
    ) -> std::result::Result<&CmsPage, StoreError> {
        let selected = self.selected.as_mut().ok_or(StoreError::NoSelection)?;

        let title = match title {
            Some(title) if title.trim().is_empty() => {
                return Err(StoreError::InvalidInput(
                    "Page title cannot be empty".to_string(),
                ));
            }
            Some(title) => Some(title.trim().to_string()),
            None => None,
        };
        let description = description.map(|d| if d.is_empty() { None } else { Some(d) });

        let mut changed = false;
        if let Some(title) = title.filter(|t| *t != selected.title) {
            selected.title = title;
            changed = true;
        }
        if let Some(description) = description.filter(|d| *d != selected.description) {
            selected.description = description;
            changed = true;
        }
        if changed {
            selected.touch();
        }

        Ok(&*selected)
    }

    /// Write the working copy back into the collection.
    ///
    /// Refreshes `updated_at`. A page that was deleted from the collection
    /// while selected is appended again.
    pub fn save_page(&mut self) -> std::result::Result<&CmsPage, StoreError> {
        let selected = self.selected.as_mut().ok_or(StoreError::NoSelection)?;
        selected.touch();
        let saved = selected.clone();
        let page_id = saved.id.clone();

        let index = match self.pages.iter().position(|p| p.id == page_id) {
            Some(index) => {
                self.pages[index] = saved;
                index
            }
            None => {
                tracing::debug!("Saved page {} was not in the collection, appending", page_id);
                self.pages.push(saved);
                self.pages.len() - 1
            }
        };

        tracing::info!("Saved page {}", page_id);
        self.emit(Event::PageSaved { page_id });

        Ok(&self.pages[index])
    }

    /// Mark a page in the collection as published.
    ///
    /// Every call stamps a fresh `published_at`. If the page is also the
    /// current selection, the working copy's status and timestamps follow.
    pub fn publish_page(&mut self, page_id: &str) -> std::result::Result<&CmsPage, StoreError> {
        let Some(index) = self.pages.iter().position(|p| p.id == page_id) else {
            tracing::warn!("Cannot publish missing page {}", page_id);
            self.emit(Event::PageNotFound {
                page_id: page_id.to_string(),
            });
            return Err(StoreError::PageNotFound(page_id.to_string()));
        };

        let page = &mut self.pages[index];
        page.publish();
        let published_at = page.published_at.unwrap_or(page.updated_at);

        if let Some(selected) = self.selected.as_mut().filter(|s| s.id == page_id) {
            let page = &self.pages[index];
            selected.status = page.status;
            selected.published_at = page.published_at;
            selected.updated_at = page.updated_at;
        }

        tracing::info!("Published page {} at {}", page_id, published_at);
        self.emit(Event::PagePublished {
            page_id: page_id.to_string(),
            published_at,
        });

        Ok(&self.pages[index])
    }

    /// Remove a page from the collection, clearing it from the selection too
    pub fn delete_page(&mut self, page_id: &str) -> std::result::Result<CmsPage, StoreError> {
        let index = self
            .pages
            .iter()
            .position(|p| p.id == page_id)
            .ok_or_else(|| StoreError::PageNotFound(page_id.to_string()))?;

        let removed = self.pages.remove(index);
        if self.selected.as_ref().is_some_and(|s| s.id == page_id) {
            self.selected = None;
        }

        tracing::info!("Deleted page {}", page_id);
        self.emit(Event::PageDeleted {
            page_id: page_id.to_string(),
        });

        Ok(removed)
    }

    /// Write the collection's copy of a page through to the source
    pub async fn persist_page(&self, page_id: &str) -> Result<()> {
        let page = self
            .page(page_id)
            .ok_or_else(|| StoreError::PageNotFound(page_id.to_string()))?;

        self.source.upsert_page(page).await?;
        tracing::debug!("Persisted page {} to {}", page_id, self.source.name());
        Ok(())
    }

    /// Remove a page from the source
    pub async fn unpersist_page(&self, page_id: &str) -> Result<()> {
        self.source.delete_page(page_id).await?;
        tracing::debug!("Removed page {} from {}", page_id, self.source.name());
        Ok(())
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }
}

/// Shared view of a store's loading flag
#[derive(Debug, Clone)]
pub struct LoadingHandle(Arc<AtomicBool>);

impl LoadingHandle {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Slugs are lowercase ASCII letters and digits in groups joined by single hyphens
pub fn validate_slug(slug: &str) -> std::result::Result<(), StoreError> {
    let valid = !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidInput(format!(
            "Invalid slug '{}': use lowercase letters, digits and single hyphens",
            slug
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FolioError, SourceError};
    use crate::source::mock::MockPageSource;
    use crate::types::PageStatus;
    use std::time::Duration;

    fn empty_store() -> PageStore {
        PageStore::new(Arc::new(MockPageSource::empty()))
    }

    #[tokio::test]
    async fn test_load_pages_from_seeded_source() {
        let mut store = PageStore::new(Arc::new(MockPageSource::seeded()));
        assert!(store.pages().is_empty());

        let count = store.load_pages().await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.pages().len(), 2);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_update_page_details_only_touches_working_copy() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        assert_eq!(
            store.update_page_details(Some("New".to_string()), None),
            Err(StoreError::NoSelection)
        );

        let before = store.select_page(&id).unwrap().updated_at;
        assert!(matches!(
            store.update_page_details(Some("  ".to_string()), None),
            Err(StoreError::InvalidInput(_))
        ));

        // same title again is not a change
        let unchanged = store
            .update_page_details(Some("Home".to_string()), None)
            .unwrap();
        assert_eq!(unchanged.updated_at, before);

        let edited = store
            .update_page_details(Some("Welcome".to_string()), Some("Start here".to_string()))
            .unwrap();
        assert!(edited.updated_at > before);
        assert_eq!(edited.title, "Welcome");
        assert_eq!(edited.description.as_deref(), Some("Start here"));
        assert_eq!(store.page(&id).unwrap().title, "Home");

        store.save_page().unwrap();
        assert_eq!(store.page(&id).unwrap().title, "Welcome");

        store.select_page(&id).unwrap();
        let cleared = store.update_page_details(None, Some(String::new())).unwrap();
        assert!(cleared.description.is_none());
    }

    #[tokio::test]
    async fn test_load_pages_empty_is_not_an_error() {
        let mut store = empty_store();
        assert_eq!(store.load_pages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_pages_failure_is_distinct_and_keeps_collection() {
        let mut store = PageStore::new(Arc::new(MockPageSource::fetch_failure("offline")));
        store
            .create_new_page("Local", "local", PageTemplate::Blank)
            .unwrap();

        let result = store.load_pages().await;

        assert!(matches!(
            result,
            Err(FolioError::Source(SourceError::Fetch(_)))
        ));
        assert_eq!(store.pages().len(), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_load_pages_with_latency() {
        let source = MockPageSource::with_delay(
            crate::source::mock::sample_pages(&Catalog::builtin()),
            Duration::from_millis(20),
        );
        let mut store = PageStore::new(Arc::new(source));

        assert_eq!(store.load_pages().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_load_clears_loading_flag() {
        let source = MockPageSource::with_delay(vec![], Duration::from_millis(200));
        let mut store = PageStore::new(Arc::new(source));
        store
            .create_new_page("Local", "local", PageTemplate::Blank)
            .unwrap();

        let result = tokio::time::timeout(Duration::from_millis(10), store.load_pages()).await;

        assert!(result.is_err());
        assert!(!store.is_loading());
        assert_eq!(store.pages().len(), 1);
    }

    #[tokio::test]
    async fn test_loading_handle_reports_in_flight_load() {
        let source = MockPageSource::with_delay(
            crate::source::mock::sample_pages(&Catalog::builtin()),
            Duration::from_millis(300),
        );
        let mut store = PageStore::new(Arc::new(source));
        let loading = store.loading_handle();
        assert!(!loading.is_loading());

        let task = tokio::spawn(async move {
            let loaded = store.load_pages().await;
            (store, loaded)
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(loading.is_loading());

        let (store, loaded) = task.await.unwrap();
        assert_eq!(loaded.unwrap(), 2);
        assert!(!loading.is_loading());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_create_new_page() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();

        let page = store.page(&id).unwrap();
        assert_eq!(page.title, "Home");
        assert_eq!(page.slug, "home");
        assert_eq!(page.status, PageStatus::Draft);
        assert!(page.components.is_empty());
        assert_eq!(page.created_at, page.updated_at);
        assert!(page.published_at.is_none());
        assert!(store.selected_page().is_none());
    }

    #[test]
    fn test_create_from_landing_template() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Landing", "landing", PageTemplate::Landing)
            .unwrap();
        assert_eq!(store.page(&id).unwrap().components.len(), 4);
    }

    #[test]
    fn test_two_pages_from_same_template_share_no_ids() {
        let mut store = empty_store();
        let a = store
            .create_new_page("A", "a", PageTemplate::Landing)
            .unwrap();
        let b = store
            .create_new_page("B", "b", PageTemplate::Landing)
            .unwrap();

        assert_ne!(a, b);
        let a_ids: Vec<_> = store.page(&a).unwrap().components.iter().map(|c| &c.id).collect();
        for component in &store.page(&b).unwrap().components {
            assert!(!a_ids.contains(&&component.id));
        }
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let mut store = empty_store();

        assert!(matches!(
            store.create_new_page("  ", "home", PageTemplate::Blank),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.create_new_page("Home", "Home Page", PageTemplate::Blank),
            Err(StoreError::InvalidInput(_))
        ));

        store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        assert_eq!(
            store.create_new_page("Home again", "home", PageTemplate::Blank),
            Err(StoreError::DuplicateSlug("home".to_string()))
        );
        assert_eq!(store.pages().len(), 1);
    }

    #[test]
    fn test_validate_slug() {
        for slug in ["home", "about-us", "summer-2025", "a1-b2-c3"] {
            assert!(validate_slug(slug).is_ok(), "{} should be valid", slug);
        }
        for slug in ["", "-home", "home-", "about--us", "About", "über", "a b", "a_b"] {
            assert!(validate_slug(slug).is_err(), "{} should be invalid", slug);
        }
    }

    #[test]
    fn test_select_page_is_a_copy() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();

        store.select_page(&id).unwrap();
        store.selected.as_mut().unwrap().title = "Edited".to_string();

        assert_eq!(store.page(&id).unwrap().title, "Home");
        assert_eq!(store.selected_page().unwrap().title, "Edited");
    }

    #[tokio::test]
    async fn test_select_missing_page_clears_selection_and_notifies() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();
        let mut store = empty_store().with_events(bus);
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        store.select_page(&id).unwrap();

        let result = store.select_page("page-missing");

        assert_eq!(
            result.unwrap_err(),
            StoreError::PageNotFound("page-missing".to_string())
        );
        assert!(store.selected_page().is_none());

        assert!(matches!(receiver.recv().await.unwrap(), Event::PageCreated { .. }));
        assert!(matches!(receiver.recv().await.unwrap(), Event::PageSelected { .. }));
        assert_eq!(
            receiver.recv().await.unwrap(),
            Event::PageNotFound {
                page_id: "page-missing".to_string()
            }
        );
    }

    #[test]
    fn test_save_without_selection() {
        let mut store = empty_store();
        assert_eq!(store.save_page().unwrap_err(), StoreError::NoSelection);
    }

    #[test]
    fn test_save_merges_working_copy() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        let created_at = store.page(&id).unwrap().created_at;

        store.select_page(&id).unwrap();
        store.selected.as_mut().unwrap().description = Some("Welcome".to_string());
        let saved = store.save_page().unwrap().clone();

        assert_eq!(saved.description.as_deref(), Some("Welcome"));
        assert!(saved.updated_at > created_at);
        assert_eq!(store.page(&id).unwrap(), &saved);
        assert_eq!(store.selected_page().unwrap(), &saved);
    }

    #[test]
    fn test_save_after_delete_reappends() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        store.select_page(&id).unwrap();
        let working_copy = store.selected.take();
        store.delete_page(&id).unwrap();
        store.selected = working_copy;

        store.save_page().unwrap();

        assert_eq!(store.pages().len(), 1);
        assert_eq!(store.pages()[0].id, id);
    }

    #[test]
    fn test_publish_page() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();

        let page = store.publish_page(&id).unwrap();

        assert_eq!(page.status, PageStatus::Published);
        assert!(page.published_at.is_some());
        assert!(page.updated_at > page.created_at);
    }

    #[test]
    fn test_republish_stamps_new_timestamp() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();

        let first = store.publish_page(&id).unwrap().published_at.unwrap();
        let second = store.publish_page(&id).unwrap().published_at.unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_publish_updates_matching_selection_only() {
        let mut store = empty_store();
        let home = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        let about = store
            .create_new_page("About", "about", PageTemplate::Blank)
            .unwrap();

        store.select_page(&home).unwrap();
        store.publish_page(&about).unwrap();
        assert_eq!(store.selected_page().unwrap().status, PageStatus::Draft);

        store.publish_page(&home).unwrap();
        let selected = store.selected_page().unwrap();
        assert_eq!(selected.status, PageStatus::Published);
        assert_eq!(selected.published_at, store.page(&home).unwrap().published_at);
    }

    #[test]
    fn test_publish_keeps_unsaved_edits_in_selection() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        store.select_page(&id).unwrap();
        store.selected.as_mut().unwrap().title = "Unsaved".to_string();

        store.publish_page(&id).unwrap();

        assert_eq!(store.selected_page().unwrap().title, "Unsaved");
        assert_eq!(store.page(&id).unwrap().title, "Home");
    }

    #[test]
    fn test_publish_missing_page() {
        let mut store = empty_store();
        assert_eq!(
            store.publish_page("page-missing").unwrap_err(),
            StoreError::PageNotFound("page-missing".to_string())
        );
    }

    #[test]
    fn test_delete_page_clears_selection() {
        let mut store = empty_store();
        let id = store
            .create_new_page("Home", "home", PageTemplate::Blank)
            .unwrap();
        store.select_page(&id).unwrap();

        let removed = store.delete_page(&id).unwrap();

        assert_eq!(removed.id, id);
        assert!(store.pages().is_empty());
        assert!(store.selected_page().is_none());
        assert!(store.delete_page(&id).is_err());
    }

    #[tokio::test]
    async fn test_persist_page_writes_through() {
        let source = Arc::new(MockPageSource::empty());
        let mut store = PageStore::new(source.clone());
        let id = store
            .create_new_page("Home", "home", PageTemplate::Landing)
            .unwrap();

        assert!(source.stored_pages().is_empty());
        store.persist_page(&id).await.unwrap();

        assert_eq!(source.stored_pages(), vec![store.page(&id).unwrap().clone()]);

        store.unpersist_page(&id).await.unwrap();
        assert!(source.stored_pages().is_empty());
    }

    #[tokio::test]
    async fn test_persist_missing_page() {
        let store = empty_store();
        let result = store.persist_page("page-missing").await;
        assert!(matches!(
            result,
            Err(FolioError::Store(StoreError::PageNotFound(_)))
        ));
    }
}
