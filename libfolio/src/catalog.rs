//! Component catalog
//!
//! The fixed set of component types that can be placed on a page, together
//! with the default properties each new instance starts from.

use serde_json::json;

use crate::types::{props, ComponentCategory, ComponentDefinition};

/// Registry of placeable component types
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<ComponentDefinition>,
}

impl Catalog {
    /// Build a catalog from explicit definitions
    pub fn new(definitions: Vec<ComponentDefinition>) -> Self {
        Self { definitions }
    }

    /// The built-in catalog shipped with Folio
    pub fn builtin() -> Self {
        Self::new(vec![
            definition(
                "hero",
                "Hero Section",
                ComponentCategory::Layout,
                "layout",
                json!({
                    "title": "Page Title",
                    "subtitle": "Discover unforgettable stays and experiences",
                    "backgroundImage": "",
                    "ctaText": "Explore",
                    "ctaLink": "/",
                }),
            ),
            definition(
                "section",
                "Section",
                ComponentCategory::Layout,
                "square",
                json!({
                    "background": "white",
                    "padding": "medium",
                    "fullWidth": false,
                }),
            ),
            definition(
                "text",
                "Text Block",
                ComponentCategory::Content,
                "type",
                json!({
                    "content": "Start writing your content here...",
                    "alignment": "left",
                }),
            ),
            definition(
                "features",
                "Feature Grid",
                ComponentCategory::Content,
                "grid",
                json!({
                    "title": "Why Stay With Us",
                    "columns": 3,
                    "items": [
                        {"icon": "star", "title": "Prime Locations", "description": "Hotels in the heart of every destination"},
                        {"icon": "heart", "title": "Curated Experiences", "description": "Events and attractions picked by locals"},
                        {"icon": "shield", "title": "Flexible Booking", "description": "Free cancellation on most rooms"},
                    ],
                }),
            ),
            definition(
                "testimonials",
                "Testimonials",
                ComponentCategory::Content,
                "message-square",
                json!({
                    "title": "What Our Guests Say",
                    "items": [
                        {"quote": "An amazing stay from start to finish.", "author": "Guest", "rating": 5},
                    ],
                }),
            ),
            definition(
                "cta",
                "Call to Action",
                ComponentCategory::Content,
                "mouse-pointer",
                json!({
                    "title": "Ready to book?",
                    "description": "Find the perfect hotel for your next trip.",
                    "buttonText": "Book Now",
                    "buttonLink": "/book",
                }),
            ),
            definition(
                "image",
                "Image",
                ComponentCategory::Media,
                "image",
                json!({
                    "src": "",
                    "alt": "",
                    "caption": "",
                }),
            ),
            definition(
                "gallery",
                "Gallery",
                ComponentCategory::Media,
                "images",
                json!({
                    "title": "Gallery",
                    "layout": "grid",
                    "images": [],
                }),
            ),
            definition(
                "video",
                "Video",
                ComponentCategory::Media,
                "video",
                json!({
                    "url": "",
                    "autoplay": false,
                    "controls": true,
                }),
            ),
            definition(
                "contact-form",
                "Contact Form",
                ComponentCategory::Form,
                "mail",
                json!({
                    "title": "Contact Us",
                    "submitText": "Send Message",
                    "fields": [
                        {"name": "name", "label": "Name", "type": "text", "required": true},
                        {"name": "email", "label": "Email", "type": "email", "required": true},
                        {"name": "message", "label": "Message", "type": "textarea", "required": true},
                    ],
                }),
            ),
            definition(
                "newsletter",
                "Newsletter Signup",
                ComponentCategory::Form,
                "send",
                json!({
                    "title": "Stay in the loop",
                    "placeholder": "Your email address",
                    "buttonText": "Subscribe",
                }),
            ),
        ])
    }

    /// All definitions, in catalog order
    pub fn list(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    /// Look up a definition by id
    pub fn find(&self, id: &str) -> Option<&ComponentDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Definitions belonging to `category`, in catalog order
    pub fn by_category(
        &self,
        category: ComponentCategory,
    ) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions
            .iter()
            .filter(move |d| d.category == category)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn definition(
    id: &str,
    name: &str,
    category: ComponentCategory,
    icon: &str,
    default_props: serde_json::Value,
) -> ComponentDefinition {
    ComponentDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        icon: icon.to_string(),
        default_props: props(default_props),
    }
}
