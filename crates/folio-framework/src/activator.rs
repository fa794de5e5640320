//! The plugin activation pass.
//!
//! [`PluginActivator`] walks the enabled-plugin snapshot once and, for every
//! record that names an activation class, makes the class resolvable (by
//! installing a namespace loader when needed) and registers it with the
//! container.
//!
//! ```text
//! snapshot ──► record ──► ledger hit? ──► AlreadyRegistered
//!                          │ miss
//!                          ▼
//!                   resolvable? ──no──► LoaderInstaller::install ──► re-check
//!                          │ yes                                        │
//!                          ▼                                            ▼
//!                Container::register_provider ◄──── yes ──── resolvable? ──no──► Skipped
//! ```
//!
//! A failing plugin never aborts the pass.  Skips are reported through the
//! [`DiagnosticsSink`] once the pass is complete.

use std::sync::Arc;

use folio_core::{ClassRegistry, Container, ResolvedClass};
use tracing::{Level, debug, info, span, warn};

use crate::cache::EnablementCache;
use crate::diagnostics::{DiagnosticsSink, TracingDiagnostics};
use crate::installer::LoaderInstaller;
use crate::ledger::ActivationLedger;
use crate::outcome::{ActivationReport, PluginOutcome, SkipReason};

/// Activates enabled plugins exactly once per process.
pub struct PluginActivator {
    ledger: ActivationLedger,
    installer: LoaderInstaller,
    classes: Arc<ClassRegistry>,
    container: Arc<dyn Container>,
    cache: Arc<dyn EnablementCache>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    report: ActivationReport,
}

impl PluginActivator {
    /// Creates an activator using the process-wide class registry and
    /// reporting skips through `tracing`.
    pub fn new(
        container: Arc<dyn Container>,
        cache: Arc<dyn EnablementCache>,
        installer: LoaderInstaller,
    ) -> Self {
        Self {
            ledger: ActivationLedger::new(),
            installer,
            classes: Arc::new(ClassRegistry::new()),
            container,
            cache,
            diagnostics: Arc::new(TracingDiagnostics),
            report: ActivationReport::default(),
        }
    }

    /// Uses `classes` instead of a fresh registry.
    pub fn with_classes(mut self, classes: Arc<ClassRegistry>) -> Self {
        self.classes = classes;
        self
    }

    /// Reports skipped plugins to `diagnostics`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn ledger(&self) -> &ActivationLedger {
        &self.ledger
    }

    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    pub fn installer(&self) -> &LoaderInstaller {
        &self.installer
    }

    /// Outcomes of the last pass that read the snapshot.
    pub fn report(&self) -> &ActivationReport {
        &self.report
    }

    /// Activates every enabled plugin.
    ///
    /// Once any class has been registered, further calls return immediately
    /// without reading the snapshot again.
    pub fn activate_enabled_plugins(&mut self) {
        if self.ledger.has_registrations() {
            debug!("Plugins already activated");
            return;
        }

        let snapshot = match self.cache.read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Plugin cache unreadable, no plugins activated");
                return;
            }
        };
        if snapshot.is_empty() {
            debug!("No enabled plugins");
            return;
        }

        let mut report = ActivationReport::default();
        for record in &snapshot {
            let Some(class) = record.activation_class() else {
                debug!(plugin = %record.id, "Plugin has no provider class");
                report.push(&record.id, None, PluginOutcome::Inert);
                continue;
            };

            let span = span!(Level::DEBUG, "activate", plugin = %record.id, class);
            let _enter = span.enter();
            let outcome = self.register_once(class, &record.id, record.source_path());
            debug!(outcome = %outcome, "Plugin processed");
            report.push(&record.id, Some(class), outcome);
        }

        let skipped = report.skipped();
        for plugin in &skipped {
            self.diagnostics.plugin_skipped(plugin);
        }

        info!(
            plugins = snapshot.len(),
            activated = report.activated_count(),
            skipped = skipped.len(),
            "Plugin activation complete"
        );
        self.report = report;
    }

    /// Registers `class` with the container unless it already is, loading
    /// it from the plugin's sources if nothing else can resolve it.
    pub fn register_once(
        &mut self,
        class: &str,
        plugin_id: &str,
        source_path: &str,
    ) -> PluginOutcome {
        if self.ledger.is_registered(class) {
            return PluginOutcome::AlreadyRegistered;
        }

        let resolved = match self.resolve(class, plugin_id, source_path) {
            Ok(resolved) => resolved,
            Err(reason) => return PluginOutcome::Skipped(reason),
        };

        match self.container.register_provider(&resolved) {
            Ok(()) => {
                self.ledger.record_registered(class);
                PluginOutcome::Activated
            }
            Err(e) => PluginOutcome::Skipped(SkipReason::RegistrationFailed(e)),
        }
    }

    fn resolve(
        &mut self,
        class: &str,
        plugin_id: &str,
        source_path: &str,
    ) -> Result<ResolvedClass, SkipReason> {
        if let Ok(Some(found)) = self.classes.resolve(class) {
            return Ok(found);
        }

        let loader = self
            .installer
            .install(&mut self.ledger, &self.classes, class, source_path);
        debug!(plugin = plugin_id, loader = %loader, "Loader installation attempted");

        match self.classes.resolve(class) {
            Ok(Some(found)) => Ok(found),
            Ok(None) => Err(SkipReason::ClassNotFound { loader }),
            Err(e) => Err(SkipReason::LoadFailed(e)),
        }
    }
}

impl std::fmt::Debug for PluginActivator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginActivator")
            .field("ledger", &self.ledger)
            .field("installer", &self.installer)
            .finish_non_exhaustive()
    }
}
