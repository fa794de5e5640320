//! Provider units: plugin code that ships without a build step.
//!
//! A unit is a JSON document on disk that defines exactly one activation
//! class.  Registering the class applies the unit's contributions to the
//! application:
//!
//! ```json
//! {
//!   "class": "Acme\\Widgets\\Provider",
//!   "config": { "acme.widgets.loaded": true },
//!   "bindings": { "acme.widgets.greeting": "hello" },
//!   "views": ["acme::editor"],
//!   "editor_drivers": [
//!     { "id": "markdown", "label": "Markdown", "storage": "markdown",
//!       "pages_view": "acme::editor", "sort_order": 50 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use folio_core::{
    Application, BoxError, ClassOrigin, EditorDriverDefinition, ResolvedClass, ServiceProvider,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::UnitError;

/// Reads unit files into class definitions.
pub trait UnitLoader: Send + Sync {
    /// File extension of the units this loader reads, without the dot.
    fn extension(&self) -> &str;

    /// Loads the unit at `path`, returning the classes it defines.
    fn load(&self, path: &Path) -> Result<Vec<ResolvedClass>, UnitError>;
}

/// Parsed contents of a provider unit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderUnit {
    pub class: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub bindings: Map<String, Value>,
    #[serde(default)]
    pub views: Vec<String>,
    #[serde(default)]
    pub editor_drivers: Vec<EditorDriverDefinition>,
}

impl ProviderUnit {
    /// Parses a unit from JSON text.
    pub fn from_json(text: &str) -> Result<Self, UnitError> {
        let unit: Self = serde_json::from_str(text)?;
        if unit.class.trim().is_empty() {
            return Err(UnitError::MissingClass);
        }
        Ok(unit)
    }
}

/// The default [`UnitLoader`], reading `.json` provider units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestUnitLoader;

impl UnitLoader for ManifestUnitLoader {
    fn extension(&self) -> &str {
        "json"
    }

    fn load(&self, path: &Path) -> Result<Vec<ResolvedClass>, UnitError> {
        trace!(path = %path.display(), "Reading provider unit");
        let unit = Arc::new(ProviderUnit::from_json(&fs::read_to_string(path)?)?);
        let name = unit.class.trim().to_string();

        let factory = Arc::new(move || -> Box<dyn ServiceProvider> {
            Box::new(DeclarativeProvider::new(Arc::clone(&unit)))
        });
        let class = ResolvedClass::new(name, factory)
            .with_origin(ClassOrigin::Unit(path.to_path_buf()));
        Ok(vec![class])
    }
}

/// Service provider backed by a [`ProviderUnit`].
#[derive(Debug, Clone)]
pub struct DeclarativeProvider {
    unit: Arc<ProviderUnit>,
}

impl DeclarativeProvider {
    pub fn new(unit: Arc<ProviderUnit>) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> &ProviderUnit {
        &self.unit
    }
}

impl ServiceProvider for DeclarativeProvider {
    fn register(&self, app: &Application) -> Result<(), BoxError> {
        for (key, value) in &self.unit.config {
            app.config().set(key, value.clone());
        }
        for (id, value) in &self.unit.bindings {
            app.bind(id.clone(), value.clone());
        }
        for view in &self.unit.views {
            app.views().add(view.clone());
        }

        let drivers = app.editor_drivers();
        for driver in &self.unit.editor_drivers {
            if !drivers.register(driver.clone()) {
                return Err(format!("editor driver in {} has a blank id", self.unit.class).into());
            }
        }

        debug!(
            class = %self.unit.class,
            config = self.unit.config.len(),
            bindings = self.unit.bindings.len(),
            editor_drivers = self.unit.editor_drivers.len(),
            "Provider unit registered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Container;

    const UNIT: &str = r#"{
        "class": "Acme\\Widgets\\Provider",
        "config": { "acme.widgets.loaded": true },
        "bindings": { "acme.widgets.greeting": "hello" },
        "views": ["acme::editor"],
        "editor_drivers": [
            { "id": "markdown", "label": "Markdown", "storage": "markdown",
              "pages_view": "acme::editor", "sort_order": 50 }
        ]
    }"#;

    #[test]
    fn test_parse_rejects_missing_class() {
        assert!(matches!(
            ProviderUnit::from_json(r#"{"class": "  "}"#),
            Err(UnitError::MissingClass)
        ));
        assert!(matches!(
            ProviderUnit::from_json("not json"),
            Err(UnitError::Parse(_))
        ));
    }

    #[test]
    fn test_declarative_provider_applies_contributions() {
        let unit = Arc::new(ProviderUnit::from_json(UNIT).unwrap());
        let class = ResolvedClass::new(
            "Acme\\Widgets\\Provider",
            Arc::new(move || -> Box<dyn ServiceProvider> {
                Box::new(DeclarativeProvider::new(Arc::clone(&unit)))
            }),
        );

        let app = Application::new();
        app.register_provider(&class).unwrap();

        assert!(app.config().get_bool("acme.widgets.loaded", false));
        assert_eq!(
            app.value("acme.widgets.greeting"),
            Some(Value::String("hello".into()))
        );
        assert_eq!(app.editor_drivers().ids_for("pages"), vec!["markdown"]);
        assert!(app.editor_drivers().ids_for("posts").is_empty());
    }
}
