//! Page templates
//!
//! A template decides which components pre-populate a newly created page.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::catalog::Catalog;
use crate::types::{props, PageComponent};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageTemplate {
    #[default]
    Blank,
    Landing,
    About,
}

impl PageTemplate {
    /// Resolve a template by name. Unknown names resolve to [`PageTemplate::Blank`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "landing" => PageTemplate::Landing,
            "about" => PageTemplate::About,
            "blank" => PageTemplate::Blank,
            other => {
                tracing::debug!("Unknown template '{}', using blank", other);
                PageTemplate::Blank
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageTemplate::Blank => "blank",
            PageTemplate::Landing => "landing",
            PageTemplate::About => "about",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PageTemplate::Blank => "Empty page",
            PageTemplate::Landing => "Hero, feature grid, testimonials and a call to action",
            PageTemplate::About => "Hero, story text, image and a contact form",
        }
    }

    pub fn all() -> [PageTemplate; 3] {
        [PageTemplate::Blank, PageTemplate::Landing, PageTemplate::About]
    }

    /// Component types with per-template prop overrides
    fn layout(&self) -> Vec<(&'static str, Option<Value>)> {
        match self {
            PageTemplate::Blank => vec![],
            PageTemplate::Landing => vec![
                ("hero", None),
                ("features", None),
                ("testimonials", None),
                ("cta", None),
            ],
            PageTemplate::About => vec![
                (
                    "hero",
                    Some(json!({
                        "title": "About Us",
                        "subtitle": "The people behind your next journey",
                    })),
                ),
                ("text", None),
                ("image", None),
                ("contact-form", None),
            ],
        }
    }

    /// Produce the initial components for a new page.
    ///
    /// Every call returns fresh copies with newly generated ids. Layout
    /// entries whose type is missing from `catalog` are skipped.
    pub fn instantiate(&self, catalog: &Catalog) -> Vec<PageComponent> {
        self.layout()
            .into_iter()
            .filter_map(|(component_type, overrides)| {
                let Some(definition) = catalog.find(component_type) else {
                    tracing::warn!(
                        "Template '{}' references unknown component '{}'",
                        self.name(),
                        component_type
                    );
                    return None;
                };
                let mut component = PageComponent::from_definition(definition);
                if let Some(overrides) = overrides {
                    component.merge_props(props(overrides));
                }
                Some(component)
            })
            .collect()
    }
}

impl fmt::Display for PageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instantiate a template by name, falling back to blank for unknown names
pub fn instantiate(template_name: &str, catalog: &Catalog) -> Vec<PageComponent> {
    PageTemplate::from_name(template_name).instantiate(catalog)
}
