//! Core data types for Folio

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Property bag of a component: a JSON object keyed by property name.
pub type Props = Map<String, Value>;

// ============================================================================
// Catalog Types
// ============================================================================

/// Display category of a catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Layout,
    Content,
    Media,
    Form,
}

impl ComponentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Layout => "layout",
            ComponentCategory::Content => "content",
            ComponentCategory::Media => "media",
            ComponentCategory::Form => "form",
        }
    }

    pub fn all() -> [ComponentCategory; 4] {
        [
            ComponentCategory::Layout,
            ComponentCategory::Content,
            ComponentCategory::Media,
            ComponentCategory::Form,
        ]
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placeable component type and its default configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: String,
    pub name: String,
    pub category: ComponentCategory,
    pub icon: String,
    pub default_props: Props,
}

// ============================================================================
// Page Types
// ============================================================================

/// A component instance placed on a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub props: Props,
}

impl PageComponent {
    /// Create an instance of `definition` with a fresh id and its own copy of
    /// the default props.
    pub fn from_definition(definition: &ComponentDefinition) -> Self {
        Self {
            id: new_component_id(&definition.id),
            component_type: definition.id.clone(),
            props: definition.default_props.clone(),
        }
    }

    /// Shallow-merge `partial` into this component's props.
    ///
    /// Top-level keys in `partial` overwrite existing ones; nested values are
    /// replaced wholesale, never merged recursively.
    pub fn merge_props(&mut self, partial: Props) {
        for (key, value) in partial {
            self.props.insert(key, value);
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            _ => Err(format!(
                "Invalid page status: '{}'. Valid options: draft, published",
                s
            )),
        }
    }
}

/// A content page composed of an ordered list of components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CmsPage {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: PageStatus,
    pub components: Vec<PageComponent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl CmsPage {
    /// Create a draft page with the given components
    pub fn new_draft(title: String, slug: String, components: Vec<PageComponent>) -> Self {
        let now = now();
        Self {
            id: new_page_id(),
            title,
            slug,
            description: None,
            status: PageStatus::Draft,
            components,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Refresh `updated_at`. It strictly increases on every call.
    pub fn touch(&mut self) {
        self.updated_at = advance(self.updated_at);
    }

    /// Mark the page published. Every call stamps a new `published_at`.
    pub fn publish(&mut self) {
        let published_at = match self.published_at {
            Some(previous) => advance(previous),
            None => now(),
        };
        self.status = PageStatus::Published;
        self.published_at = Some(published_at);
        self.touch();
    }

    pub fn is_published(&self) -> bool {
        self.status == PageStatus::Published
    }

    pub fn component(&self, component_id: &str) -> Option<&PageComponent> {
        self.components.iter().find(|c| c.id == component_id)
    }

    pub(crate) fn component_index(&self, component_id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == component_id)
    }
}

/// Direction for reordering a component
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Toward index 0
    Up,
    /// Toward the end of the list
    Down,
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            _ => Err(format!(
                "Invalid direction: '{}'. Valid options: up, down",
                s
            )),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Up => write!(f, "up"),
            MoveDirection::Down => write!(f, "down"),
        }
    }
}

// ============================================================================
// Identifiers and Timestamps
// ============================================================================

/// Generate a page id of the form `page-<uuid>`
pub fn new_page_id() -> String {
    format!("page-{}", uuid::Uuid::new_v4().simple())
}

/// Generate a component id of the form `<type>-<uuid>`
pub fn new_component_id(component_type: &str) -> String {
    format!("{}-{}", component_type, uuid::Uuid::new_v4().simple())
}

/// Current time at the precision pages are persisted with (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The current time, or one microsecond past `previous` if the clock has
/// not moved beyond it.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Convert an object-shaped JSON value into [`Props`].
///
/// Non-object values yield an empty property bag.
pub fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}
