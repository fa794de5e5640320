//! Editor driver registry.
//!
//! Plugins contribute alternative content editors for pages and posts.  A
//! driver is *available* for a resource when it uses the built-in blocks
//! editor or when its view for that resource is known to the host's
//! [`ViewCatalog`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Service id under which the application binds its [`EditorDriverRegistry`].
pub const EDITOR_DRIVERS_SERVICE_ID: &str = "folio.editor.drivers";

/// Id of the built-in driver backed by a resource's legacy editor view.
pub const LEGACY_PAGE_DRIVER_ID: &str = "page";

/// Service id of the legacy editor view binding for `resource`.
pub fn legacy_editor_view_binding(resource: &str) -> Option<&'static str> {
    match resource {
        "pages" => Some("folio.pages.editor.view"),
        "posts" => Some("folio.posts.editor.view"),
        _ => None,
    }
}

// ─── ViewCatalog ─────────────────────────────────────────────────────────────

/// Answers whether a named view exists.
pub trait ViewCatalog: Send + Sync {
    /// Returns `true` if `view` can be rendered.
    fn exists(&self, view: &str) -> bool;
}

/// A [`ViewCatalog`] backed by an explicit set of names.
#[derive(Debug, Default)]
pub struct StaticViewCatalog {
    views: RwLock<HashSet<String>>,
}

impl StaticViewCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `view` known.
    pub fn add(&self, view: impl Into<String>) {
        self.views.write().insert(view.into());
    }
}

impl ViewCatalog for StaticViewCatalog {
    fn exists(&self, view: &str) -> bool {
        self.views.read().contains(view)
    }
}

// ─── EditorDriverDefinition ──────────────────────────────────────────────────

/// One editor driver contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorDriverDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub storage: String,
    #[serde(default)]
    pub pages_view: Option<String>,
    #[serde(default)]
    pub posts_view: Option<String>,
    #[serde(default)]
    pub uses_blocks_editor: bool,
    #[serde(default = "default_sort_order")]
    pub sort_order: i32,
}

fn default_sort_order() -> i32 {
    100
}

impl EditorDriverDefinition {
    /// Returns the view used for `resource` (`"pages"` or `"posts"`).
    pub fn view_for(&self, resource: &str) -> Option<&str> {
        match resource {
            "pages" => self.pages_view.as_deref(),
            "posts" => self.posts_view.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if the driver can edit `resource`.
    pub fn available_for(&self, resource: &str, views: &dyn ViewCatalog) -> bool {
        if self.uses_blocks_editor {
            return true;
        }
        self.view_for(resource)
            .is_some_and(|view| !view.is_empty() && views.exists(view))
    }

    /// Flattens the driver for one resource.
    pub fn to_summary(&self, resource: &str) -> EditorDriverSummary {
        EditorDriverSummary {
            id: self.id.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            storage: self.storage.clone(),
            view: self.view_for(resource).map(str::to_owned),
            uses_blocks_editor: self.uses_blocks_editor,
            sort_order: self.sort_order,
        }
    }
}

/// A driver as presented for a single resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorDriverSummary {
    pub id: String,
    pub label: String,
    pub description: String,
    pub storage: String,
    pub view: Option<String>,
    pub uses_blocks_editor: bool,
    pub sort_order: i32,
}

// ─── EditorDriverRegistry ────────────────────────────────────────────────────

/// All editor drivers known to the host, keyed by id.
pub struct EditorDriverRegistry {
    definitions: RwLock<HashMap<String, EditorDriverDefinition>>,
    views: Arc<dyn ViewCatalog>,
}

impl EditorDriverRegistry {
    /// Creates an empty registry that checks views against `views`.
    pub fn new(views: Arc<dyn ViewCatalog>) -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            views,
        }
    }

    /// Registers (or replaces) a driver.  Blank ids are ignored.
    pub fn register(&self, mut definition: EditorDriverDefinition) -> bool {
        let id = definition.id.trim().to_string();
        if id.is_empty() {
            return false;
        }
        definition.id.clone_from(&id);
        self.definitions.write().insert(id, definition);
        true
    }

    /// Drivers available for `resource`, ordered by `sort_order` then label
    /// (case-insensitive).
    pub fn all_for(&self, resource: &str) -> Vec<EditorDriverDefinition> {
        let mut available: Vec<_> = self
            .definitions
            .read()
            .values()
            .filter(|d| d.available_for(resource, self.views.as_ref()))
            .cloned()
            .collect();

        available.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
        });
        available
    }

    /// Registers the built-in `page` driver for `resource`, backed by
    /// `view`.
    ///
    /// Does nothing if a `page` driver already exists, if `resource` has no
    /// legacy binding, or if `view` is blank or unknown to the view catalog.
    pub fn register_legacy_page_driver(&self, resource: &str, view: &str) -> bool {
        if legacy_editor_view_binding(resource).is_none()
            || view.is_empty()
            || !self.views.exists(view)
            || self.definitions.read().contains_key(LEGACY_PAGE_DRIVER_ID)
        {
            return false;
        }

        let view = Some(view.to_string());
        self.register(EditorDriverDefinition {
            id: LEGACY_PAGE_DRIVER_ID.to_string(),
            label: "Page Editor".to_string(),
            description: "Continuous writing surface.".to_string(),
            storage: "content".to_string(),
            pages_view: view.clone().filter(|_| resource == "pages"),
            posts_view: view.filter(|_| resource == "posts"),
            uses_blocks_editor: false,
            sort_order: 20,
        })
    }

    /// Ids of the drivers available for `resource`, in display order.
    pub fn ids_for(&self, resource: &str) -> Vec<String> {
        self.all_for(resource).into_iter().map(|d| d.id).collect()
    }

    /// Returns the driver if it exists and is available for `resource`.
    pub fn get(&self, id: &str, resource: &str) -> Option<EditorDriverDefinition> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        self.definitions
            .read()
            .get(id)
            .filter(|d| d.available_for(resource, self.views.as_ref()))
            .cloned()
    }

    /// Picks the driver to use: `requested` if available, else `fallback` if
    /// available, else the first available driver, else `fallback`.
    pub fn resolve(&self, requested: &str, resource: &str, fallback: &str) -> String {
        let requested = requested.trim();
        if !requested.is_empty() && self.get(requested, resource).is_some() {
            return requested.to_string();
        }
        if self.get(fallback, resource).is_some() {
            return fallback.to_string();
        }
        self.ids_for(resource)
            .into_iter()
            .next()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Number of registered drivers, available or not.
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Returns `true` if no driver is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: &str, label: &str, sort_order: i32) -> EditorDriverDefinition {
        EditorDriverDefinition {
            id: id.to_string(),
            label: label.to_string(),
            description: String::new(),
            storage: id.to_string(),
            pages_view: Some(format!("{id}::pages")),
            posts_view: None,
            uses_blocks_editor: false,
            sort_order,
        }
    }

    fn registry() -> (Arc<StaticViewCatalog>, EditorDriverRegistry) {
        let views = Arc::new(StaticViewCatalog::new());
        let registry = EditorDriverRegistry::new(views.clone());
        (views, registry)
    }

    #[test]
    fn test_blank_ids_are_ignored() {
        let (_, registry) = registry();
        assert!(!registry.register(driver("  ", "Blank", 1)));
        assert!(registry.register(driver(" md ", "Markdown", 1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_availability_requires_known_view() {
        let (views, registry) = registry();
        registry.register(driver("md", "Markdown", 1));

        assert!(registry.get("md", "pages").is_none());
        views.add("md::pages");
        assert!(registry.get("md", "pages").is_some());
        assert!(registry.get("md", "posts").is_none());
    }

    #[test]
    fn test_ordering_by_sort_order_then_label() {
        let (_, registry) = registry();
        let mut blocks = driver("blocks", "Blocks", 100);
        blocks.uses_blocks_editor = true;
        let mut zed = driver("zed", "zed", 10);
        zed.uses_blocks_editor = true;
        let mut alpha = driver("alpha", "Alpha", 10);
        alpha.uses_blocks_editor = true;

        registry.register(blocks);
        registry.register(zed);
        registry.register(alpha);

        assert_eq!(registry.ids_for("pages"), vec!["alpha", "zed", "blocks"]);
    }

    #[test]
    fn test_legacy_page_driver() {
        let (views, registry) = registry();

        assert!(!registry.register_legacy_page_driver("pages", "legacy::editor"));
        views.add("legacy::editor");
        assert!(!registry.register_legacy_page_driver("themes", "legacy::editor"));
        assert!(registry.register_legacy_page_driver("pages", "legacy::editor"));
        assert!(!registry.register_legacy_page_driver("posts", "legacy::editor"));

        let page = registry.get(LEGACY_PAGE_DRIVER_ID, "pages").unwrap();
        assert_eq!(page.pages_view.as_deref(), Some("legacy::editor"));
        assert_eq!(page.storage, "content");
        assert!(registry.get(LEGACY_PAGE_DRIVER_ID, "posts").is_none());
    }

    #[test]
    fn test_resolve_falls_back() {
        let (views, registry) = registry();
        let mut blocks = driver("blocks", "Blocks", 100);
        blocks.uses_blocks_editor = true;
        registry.register(blocks);
        registry.register(driver("md", "Markdown", 1));

        assert_eq!(registry.resolve("md", "pages", "blocks"), "blocks");
        views.add("md::pages");
        assert_eq!(registry.resolve("md", "pages", "blocks"), "md");
        assert_eq!(registry.resolve("", "pages", "missing"), "md");
    }
}
