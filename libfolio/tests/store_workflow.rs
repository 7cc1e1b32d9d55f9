//! End-to-end page editing workflows against an in-memory source

use std::collections::HashSet;
use std::sync::Arc;

use libfolio::source::mock::MockPageSource;
use libfolio::templates;
use libfolio::types::props;
use libfolio::{Catalog, MoveDirection, PageStatus, PageStore, PageTemplate, StoreError};
use serde_json::json;

fn new_store() -> PageStore {
    PageStore::new(Arc::new(MockPageSource::empty()))
}

#[test]
fn test_create_select_add_save_round_trip() {
    let mut store = new_store();

    let id = store
        .create_new_page("T", "t", PageTemplate::from_name("blank"))
        .unwrap();
    store.select_page(&id).unwrap();
    store.add_component("hero", None).unwrap();
    store.save_page().unwrap();

    let page = store.page(&id).unwrap();
    assert_eq!(page.components.len(), 1);
    assert_eq!(page.components[0].component_type, "hero");
    assert!(page.updated_at > page.created_at);
}

#[test]
fn test_hero_scenario() {
    let mut store = new_store();
    let hero = store.catalog().find("hero").unwrap();
    assert_eq!(hero.default_props["title"], json!("Page Title"));

    let id = store
        .create_new_page("Home", "home", PageTemplate::Blank)
        .unwrap();
    store.select_page(&id).unwrap();
    store.add_component("hero", None).unwrap();

    let selected = store.selected_page().unwrap();
    assert_eq!(selected.components.len(), 1);
    assert_eq!(selected.components[0].props["title"], json!("Page Title"));
}

#[test]
fn test_landing_instantiations_never_collide() {
    let catalog = Catalog::builtin();
    let first = templates::instantiate("landing", &catalog);
    let second = templates::instantiate("landing", &catalog);

    let ids: HashSet<_> = first.iter().chain(&second).map(|c| c.id.clone()).collect();
    assert_eq!(ids.len(), first.len() + second.len());
}

#[test]
fn test_merge_then_reorder_then_remove() {
    let mut store = new_store();
    let id = store
        .create_new_page("Landing", "landing", PageTemplate::Landing)
        .unwrap();
    store.select_page(&id).unwrap();

    let cta_id = store.selected_page().unwrap().components[3].id.clone();
    store
        .update_component_props(&cta_id, props(json!({"a": 1})))
        .unwrap();
    store
        .update_component_props(&cta_id, props(json!({"b": 2})))
        .unwrap();

    // last element cannot move further down
    assert!(!store.move_component(&cta_id, MoveDirection::Down).unwrap());
    assert!(store.move_component(&cta_id, MoveDirection::Up).unwrap());

    let page = store.selected_page().unwrap();
    assert_eq!(page.components[2].id, cta_id);
    assert_eq!(page.components[2].props["a"], json!(1));
    assert_eq!(page.components[2].props["b"], json!(2));

    let before = page.components.clone();
    assert_eq!(
        store.remove_component("cta-unknown").unwrap_err(),
        StoreError::ComponentNotFound("cta-unknown".to_string())
    );
    assert_eq!(store.selected_page().unwrap().components, before);

    store.remove_component(&cta_id).unwrap();
    store.save_page().unwrap();
    let types: Vec<_> = store
        .page(&id)
        .unwrap()
        .components
        .iter()
        .map(|c| c.component_type.clone())
        .collect();
    assert_eq!(types, vec!["hero", "features", "testimonials"]);
}

#[test]
fn test_publish_lifecycle() {
    let mut store = new_store();
    let id = store
        .create_new_page("Home", "home", PageTemplate::Blank)
        .unwrap();

    let first = store.publish_page(&id).unwrap().published_at.unwrap();
    assert_eq!(store.page(&id).unwrap().status, PageStatus::Published);

    // edits after publishing keep the page published
    store.select_page(&id).unwrap();
    store.add_component("text", None).unwrap();
    let saved = store.save_page().unwrap();
    assert_eq!(saved.status, PageStatus::Published);
    assert_eq!(saved.published_at, Some(first));

    let second = store.publish_page(&id).unwrap().published_at.unwrap();
    assert!(second > first);
}

#[test]
fn test_selection_is_isolated_until_save() {
    let mut store = new_store();
    let id = store
        .create_new_page("Home", "home", PageTemplate::About)
        .unwrap();
    let original = store.page(&id).unwrap().clone();

    store.select_page(&id).unwrap();
    let hero_id = store.selected_page().unwrap().components[0].id.clone();
    store
        .update_component_props(&hero_id, props(json!({"title": "Our Story"})))
        .unwrap();
    store.add_component("gallery", Some(1)).unwrap();

    assert_eq!(store.page(&id).unwrap(), &original);

    // reselecting discards unsaved edits
    store.select_page(&id).unwrap();
    assert_eq!(store.selected_page().unwrap(), &original);
}

#[tokio::test]
async fn test_load_then_edit_seeded_pages() {
    let source = Arc::new(MockPageSource::seeded());
    let mut store = PageStore::new(source.clone());
    store.load_pages().await.unwrap();

    let about = store.find_by_slug("about").unwrap().id.clone();
    store.select_page(&about).unwrap();
    store.add_component("newsletter", None).unwrap();
    store.save_page().unwrap();
    store.persist_page(&about).await.unwrap();

    let stored = source
        .stored_pages()
        .into_iter()
        .find(|p| p.id == about)
        .unwrap();
    assert_eq!(
        stored.components.last().unwrap().component_type,
        "newsletter"
    );
}
