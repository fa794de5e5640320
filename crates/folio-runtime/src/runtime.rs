//! Host bootstrap.
//!
//! [`FolioRuntime`] wires configuration, logging, the application container,
//! the class registry and the plugin activator together, then runs the boot
//! sequence:
//!
//! ```text
//! config ──► logging ──► Application ──► PluginActivator::activate_enabled_plugins
//!                                                   │
//!                                                   ▼
//!                                         Application::boot
//! ```
//!
//! ```rust,ignore
//! use folio_runtime::FolioRuntime;
//!
//! let runtime = FolioRuntime::builder()
//!     .config_file("folio.toml")
//!     .build()?
//!     .booted();
//! println!("{}", runtime.stats());
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use folio_core::{Application, ClassRegistry, Repository};
use folio_framework::{
    ActivationReport, DiagnosticsSink, LoaderInstaller, PluginActivator, SkippedPlugin,
    TracingDiagnostics,
};
use serde_json::json;
use tracing::{Level, error, info, span};

use crate::cache::FileEnablementCache;
use crate::config::{ConfigLoader, FolioConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use crate::paths::Paths;

/// The assembled host.
pub struct FolioRuntime {
    config: FolioConfig,
    paths: Paths,
    app: Arc<Application>,
    cache: FileEnablementCache,
    activator: PluginActivator,
    booted: bool,
}

impl FolioRuntime {
    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Assembles a runtime from configuration without booting it.
    ///
    /// Validates the configuration and initializes logging.
    pub fn from_config(config: &FolioConfig) -> RuntimeResult<Self> {
        Self::assemble(
            config,
            Arc::new(ClassRegistry::new()),
            Arc::new(TracingDiagnostics),
        )
    }

    /// Assembles and boots a runtime.
    pub fn boot(config: &FolioConfig) -> RuntimeResult<Self> {
        Ok(Self::from_config(config)?.booted())
    }

    fn assemble(
        config: &FolioConfig,
        classes: Arc<ClassRegistry>,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> RuntimeResult<Self> {
        validate_config(config)?;
        logging::init_from_config(&config.logging);

        let paths = Paths::from_config(config);
        let app = Arc::new(Application::with_config(seed_config(&paths)));
        let cache = FileEnablementCache::new(paths.plugin_cache_path());

        let activator = PluginActivator::new(
            app.clone(),
            Arc::new(cache.clone()),
            LoaderInstaller::new(paths.base_path()),
        )
        .with_classes(classes)
        .with_diagnostics(diagnostics);

        info!(
            base_path = %paths.base_path().display(),
            cache = %cache.path().display(),
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: config.clone(),
            paths,
            app,
            cache,
            activator,
            booted: false,
        })
    }

    /// Activates enabled plugins and boots the application.  Runs once.
    pub fn start(&mut self) {
        if self.booted {
            return;
        }

        let span = span!(Level::INFO, "boot");
        let _enter = span.enter();

        info!("Activating enabled plugins");
        self.activator.activate_enabled_plugins();

        info!("Booting application");
        if let Err(e) = self.app.boot() {
            error!(error = %e, "Application boot reported a failure");
        }

        self.booted = true;
        info!(providers = self.app.registered_providers().len(), "Host booted");
    }

    /// [`start`](Self::start), by value.
    pub fn booted(mut self) -> Self {
        self.start();
        self
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn app(&self) -> &Arc<Application> {
        &self.app
    }

    pub fn cache(&self) -> &FileEnablementCache {
        &self.cache
    }

    pub fn activator(&self) -> &PluginActivator {
        &self.activator
    }

    /// Outcomes of the activation pass.
    pub fn report(&self) -> &ActivationReport {
        self.activator.report()
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn stats(&self) -> RuntimeStats {
        let ledger = self.activator.ledger();
        RuntimeStats {
            booted: self.booted,
            registered_classes: ledger.registered_classes().map(str::to_owned).collect(),
            installed_loader_prefixes: ledger
                .installed_loader_prefixes()
                .map(str::to_owned)
                .collect(),
            skipped: self.activator.report().skipped(),
            providers: self.app.registered_providers().len(),
        }
    }
}

fn seed_config(paths: &Paths) -> Repository {
    Repository::from_value(json!({
        "folio": {
            "base_path": paths.base_path().display().to_string(),
            "plugins_path": paths.plugins_path("").display().to_string(),
            "themes_path": paths.themes_path("").display().to_string(),
            "plugin_cache": paths.plugin_cache_path().display().to_string(),
        }
    }))
}

impl fmt::Debug for FolioRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolioRuntime")
            .field("paths", &self.paths)
            .field("booted", &self.booted)
            .finish_non_exhaustive()
    }
}

/// Snapshot of what the boot sequence did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub booted: bool,
    /// Activation classes registered by the activator, sorted.
    pub registered_classes: Vec<String>,
    /// Namespace prefixes with an installed loader, sorted.
    pub installed_loader_prefixes: Vec<String>,
    pub skipped: Vec<SkippedPlugin>,
    /// Providers known to the container, including ones registered directly.
    pub providers: usize,
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} plugin(s) activated, {} skipped, {} provider(s) registered",
            self.registered_classes.len(),
            self.skipped.len(),
            self.providers
        )?;
        for class in &self.registered_classes {
            writeln!(f, "  active   {class}")?;
        }
        for skipped in &self.skipped {
            writeln!(
                f,
                "  skipped  {} ({}): {}",
                skipped.plugin_id, skipped.activation_class, skipped.reason
            )?;
        }
        Ok(())
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`FolioRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    classes: Option<Arc<ClassRegistry>>,
    diagnostics: Option<Arc<dyn DiagnosticsSink>>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            classes: None,
            diagnostics: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Overrides `paths.base_path`.
    pub fn base_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self
            .config_loader
            .set("paths.base_path", path.as_ref().to_path_buf());
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: FolioConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses `classes` instead of a registry seeded from linked providers.
    pub fn classes(mut self, classes: Arc<ClassRegistry>) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Reports skipped plugins to `diagnostics` instead of `tracing`.
    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Loads configuration and assembles the runtime without booting it.
    pub fn build(self) -> RuntimeResult<FolioRuntime> {
        let config = self.config_loader.load()?;
        FolioRuntime::assemble(
            &config,
            self.classes
                .unwrap_or_else(|| Arc::new(ClassRegistry::new())),
            self.diagnostics
                .unwrap_or_else(|| Arc::new(TracingDiagnostics)),
        )
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
