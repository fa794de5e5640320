//! The application container.
//!
//! [`Container`] is the single operation the activation pipeline needs from a
//! dependency-injection container: "register this activation class".
//! [`Application`] is the host's implementation.  It owns:
//!
//! - the **service map**, keyed by service id, holding type-erased `Arc`s;
//! - the configuration [`Repository`];
//! - the list of registered providers, each registered exactly once;
//! - the [`EditorDriverRegistry`], bound as a service at construction.
//!
//! # Lifecycle
//!
//! ```text
//! register_provider() ──► provider.register(app)      (once per class)
//!            boot()   ──► provider.boot(app)          (once per provider)
//! register_provider() after boot ──► register + boot immediately
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::class::ResolvedClass;
use crate::editor::{
    EDITOR_DRIVERS_SERVICE_ID, EditorDriverRegistry, StaticViewCatalog, legacy_editor_view_binding,
};
use crate::error::{ContainerError, ContainerResult};
use crate::provider::ServiceProvider;
use crate::repository::Repository;

type ServiceArc = Arc<dyn Any + Send + Sync>;

// =============================================================================
// Container trait
// =============================================================================

/// One-time registration of activation classes.
///
/// Implementations must run the class's initialization hook synchronously and
/// at most once per class, no matter how often they are asked.
pub trait Container: Send + Sync {
    /// Registers the class with the container.
    fn register_provider(&self, class: &ResolvedClass) -> ContainerResult<()>;
}

// =============================================================================
// Application
// =============================================================================

struct ProviderEntry {
    class: String,
    provider: Arc<dyn ServiceProvider>,
    booted: bool,
}

/// The host application container.
pub struct Application {
    config: Repository,
    services: RwLock<HashMap<String, ServiceArc>>,
    providers: Mutex<Vec<ProviderEntry>>,
    views: Arc<StaticViewCatalog>,
    booted: AtomicBool,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    /// Creates an application with an empty configuration.
    pub fn new() -> Self {
        Self::with_config(Repository::new())
    }

    /// Creates an application around an existing configuration.
    pub fn with_config(config: Repository) -> Self {
        let views = Arc::new(StaticViewCatalog::new());
        let app = Self {
            config,
            services: RwLock::new(HashMap::new()),
            providers: Mutex::new(Vec::new()),
            views: Arc::clone(&views),
            booted: AtomicBool::new(false),
        };
        app.bind(EDITOR_DRIVERS_SERVICE_ID, EditorDriverRegistry::new(views));
        app
    }

    // ─── Configuration & views ───────────────────────────────────────────────

    /// The configuration repository.
    pub fn config(&self) -> &Repository {
        &self.config
    }

    /// Views known to the host.
    pub fn views(&self) -> &StaticViewCatalog {
        &self.views
    }

    /// The editor driver registry.
    ///
    /// A `page` driver is added for the first resource whose legacy editor
    /// view binding (`folio.pages.editor.view`, `folio.posts.editor.view`)
    /// names a known view.
    pub fn editor_drivers(&self) -> Arc<EditorDriverRegistry> {
        let registry = match self.get::<EditorDriverRegistry>(EDITOR_DRIVERS_SERVICE_ID) {
            Some(registry) => registry,
            None => {
                // Rebound to something else; restore a fresh registry.
                let registry = Arc::new(EditorDriverRegistry::new(self.views.clone()));
                self.instance(EDITOR_DRIVERS_SERVICE_ID, Arc::clone(&registry));
                registry
            }
        };

        for resource in ["pages", "posts"] {
            let Some(binding) = legacy_editor_view_binding(resource) else {
                continue;
            };
            if let Some(view) = self.string_binding(binding)
                && registry.register_legacy_page_driver(resource, &view)
            {
                debug!(resource, view = %view, "Legacy page editor driver registered");
            }
        }
        registry
    }

    /// A binding holding either a `String` or a JSON string.
    fn string_binding(&self, id: &str) -> Option<String> {
        if let Some(value) = self.get::<String>(id) {
            return Some((*value).clone());
        }
        self.value(id)?.as_str().map(str::to_owned)
    }

    // ─── Services ────────────────────────────────────────────────────────────

    /// Binds `value` under `id`, replacing any previous binding.
    pub fn bind<T: Any + Send + Sync>(&self, id: impl Into<String>, value: T) {
        self.instance(id, Arc::new(value));
    }

    /// Binds an existing shared instance under `id`.
    pub fn instance<T: Any + Send + Sync>(&self, id: impl Into<String>, value: Arc<T>) {
        let id = id.into();
        debug!(service = %id, "Service bound");
        self.services.write().insert(id, value);
    }

    /// Returns the service bound under `id` if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, id: &str) -> Option<Arc<T>> {
        let service = self.services.read().get(id).cloned()?;
        service.downcast::<T>().ok()
    }

    /// Returns the JSON value bound under `id`.
    pub fn value(&self, id: &str) -> Option<Value> {
        self.get::<Value>(id).map(|v| (*v).clone())
    }

    /// Returns `true` if anything is bound under `id`.
    pub fn bound(&self, id: &str) -> bool {
        self.services.read().contains_key(id)
    }

    // ─── Providers ───────────────────────────────────────────────────────────

    /// Returns `true` if a provider for `class` has been registered.
    pub fn provider_loaded(&self, class: &str) -> bool {
        self.providers.lock().iter().any(|e| e.class == class)
    }

    /// Classes of all registered providers, in registration order.
    pub fn registered_providers(&self) -> Vec<String> {
        self.providers
            .lock()
            .iter()
            .map(|e| e.class.clone())
            .collect()
    }

    /// Returns `true` once [`boot`](Self::boot) has run.
    pub fn is_booted(&self) -> bool {
        self.booted.load(Ordering::SeqCst)
    }

    /// Runs the `boot` hook of every provider that has not booted yet.
    ///
    /// Every provider gets its turn even if an earlier one fails; the first
    /// failure is returned.
    pub fn boot(&self) -> ContainerResult<()> {
        self.booted.store(true, Ordering::SeqCst);

        let pending: Vec<(usize, String, Arc<dyn ServiceProvider>)> = self
            .providers
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.booted)
            .map(|(i, e)| (i, e.class.clone(), Arc::clone(&e.provider)))
            .collect();

        let mut first_error = None;
        for (index, class, provider) in pending {
            if let Err(e) = self.boot_one(index, &class, provider.as_ref()) {
                error!(provider = %class, error = %e, "Provider boot failed");
                first_error.get_or_insert(e);
            }
        }

        info!(providers = self.providers.lock().len(), "Application booted");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn boot_one(
        &self,
        index: usize,
        class: &str,
        provider: &dyn ServiceProvider,
    ) -> ContainerResult<()> {
        provider
            .boot(self)
            .map_err(|e| ContainerError::BootFailed {
                class: class.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(entry) = self.providers.lock().get_mut(index) {
            entry.booted = true;
        }
        debug!(provider = %class, "Provider booted");
        Ok(())
    }
}

impl Container for Application {
    fn register_provider(&self, class: &ResolvedClass) -> ContainerResult<()> {
        if self.provider_loaded(class.name()) {
            return Ok(());
        }

        let provider: Arc<dyn ServiceProvider> = Arc::from(class.instantiate());
        provider
            .register(self)
            .map_err(|e| ContainerError::RegisterFailed {
                class: class.name().to_string(),
                reason: e.to_string(),
            })?;

        let index = {
            let mut providers = self.providers.lock();
            providers.push(ProviderEntry {
                class: class.name().to_string(),
                provider: Arc::clone(&provider),
                booted: false,
            });
            providers.len() - 1
        };
        info!(provider = %class.name(), "Provider registered");

        // The provider stays registered even if its late boot fails.
        if self.is_booted()
            && let Err(e) = self.boot_one(index, class.name(), provider.as_ref())
        {
            error!(provider = %class.name(), error = %e, "Provider boot failed");
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorDriverDefinition;
    use crate::error::BoxError;

    struct CountingProvider;

    impl ServiceProvider for CountingProvider {
        fn register(&self, app: &Application) -> Result<(), BoxError> {
            let count = app.config().get_as::<u64>("counting.registers").unwrap_or(0);
            app.config().set("counting.registers", count + 1);
            app.bind("counting.greeting", String::from("hello"));
            Ok(())
        }

        fn boot(&self, app: &Application) -> Result<(), BoxError> {
            app.config().set("counting.booted", true);
            Ok(())
        }
    }

    fn counting() -> Box<dyn ServiceProvider> {
        Box::new(CountingProvider)
    }

    struct FailingProvider;

    impl ServiceProvider for FailingProvider {
        fn register(&self, _app: &Application) -> Result<(), BoxError> {
            Err("database unavailable".into())
        }
    }

    fn failing() -> Box<dyn ServiceProvider> {
        Box::new(FailingProvider)
    }

    #[test]
    fn test_register_runs_hook_once() {
        let app = Application::new();
        let class = ResolvedClass::from_fn("Test\\Counting", counting);

        app.register_provider(&class).unwrap();
        app.register_provider(&class).unwrap();

        assert_eq!(app.config().get_as::<u64>("counting.registers"), Some(1));
        assert_eq!(app.registered_providers(), vec!["Test\\Counting"]);
        assert_eq!(
            app.get::<String>("counting.greeting").as_deref().map(String::as_str),
            Some("hello")
        );
    }

    #[test]
    fn test_boot_runs_pending_and_late_providers() {
        let app = Application::new();
        app.boot().unwrap();
        assert!(app.is_booted());

        let class = ResolvedClass::from_fn("Test\\Late", counting);
        app.register_provider(&class).unwrap();
        assert!(app.config().get_bool("counting.booted", false));
    }

    struct FailingBootProvider;

    impl ServiceProvider for FailingBootProvider {
        fn register(&self, app: &Application) -> Result<(), BoxError> {
            app.config().set("late.registered", true);
            Ok(())
        }

        fn boot(&self, _app: &Application) -> Result<(), BoxError> {
            Err("assets missing".into())
        }
    }

    fn failing_boot() -> Box<dyn ServiceProvider> {
        Box::new(FailingBootProvider)
    }

    #[test]
    fn test_late_boot_failure_keeps_registration() {
        let app = Application::new();
        app.boot().unwrap();

        let class = ResolvedClass::from_fn("Test\\FailingBoot", failing_boot);
        app.register_provider(&class).unwrap();

        assert!(app.provider_loaded("Test\\FailingBoot"));
        assert!(app.config().get_bool("late.registered", false));
        assert_eq!(app.registered_providers(), vec!["Test\\FailingBoot"]);
    }

    #[test]
    fn test_failed_register_is_not_recorded() {
        let app = Application::new();
        let class = ResolvedClass::from_fn("Test\\Failing", failing);

        let err = app.register_provider(&class).unwrap_err();
        assert!(matches!(err, ContainerError::RegisterFailed { .. }));
        assert!(!app.provider_loaded("Test\\Failing"));
    }

    #[test]
    fn test_get_checks_type() {
        let app = Application::new();
        app.bind("number", 42_u32);

        assert_eq!(app.get::<u32>("number").as_deref(), Some(&42));
        assert!(app.get::<String>("number").is_none());
        assert!(app.bound("number"));
    }

    #[test]
    fn test_legacy_editor_view_adds_page_driver() {
        let app = Application::new();
        app.bind("folio.pages.editor.view", String::from("classic::editor"));
        assert!(app.editor_drivers().ids_for("pages").is_empty());

        app.views().add("classic::editor");
        assert_eq!(app.editor_drivers().ids_for("pages"), vec!["page"]);
        assert!(app.editor_drivers().ids_for("posts").is_empty());
    }

    #[test]
    fn test_editor_drivers_bound_by_default() {
        let app = Application::new();
        app.views().add("md::pages");
        app.editor_drivers().register(EditorDriverDefinition {
            id: "md".into(),
            label: "Markdown".into(),
            description: String::new(),
            storage: "markdown".into(),
            pages_view: Some("md::pages".into()),
            posts_view: None,
            uses_blocks_editor: false,
            sort_order: 50,
        });

        assert!(app.bound(EDITOR_DRIVERS_SERVICE_ID));
        assert_eq!(app.editor_drivers().ids_for("pages"), vec!["md"]);
    }
}
