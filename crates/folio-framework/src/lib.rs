//! # Folio Framework
//!
//! The plugin activation pipeline.
//!
//! - [`PluginActivator`] reads the enabled-plugin snapshot and registers each
//!   plugin's activation class with the container, once.
//! - [`LoaderInstaller`] maps a class's namespace prefix onto the plugin's
//!   `src` directory when the class is not otherwise known.
//! - [`ManifestUnitLoader`] turns `.json` provider units into classes.
//! - [`DiagnosticsSink`] receives the plugins that were skipped.
//!
//! ```rust,ignore
//! let mut activator = PluginActivator::new(app, cache, LoaderInstaller::new(base_dir))
//!     .with_classes(classes);
//! activator.activate_enabled_plugins();
//! ```

pub mod activator;
pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod installer;
pub mod ledger;
pub mod outcome;
pub mod unit;

pub use activator::PluginActivator;
pub use cache::EnablementCache;
pub use diagnostics::{DiagnosticsSink, RecordingDiagnostics, TracingDiagnostics};
pub use error::{CacheError, CacheResult, UnitError};
pub use installer::{
    InstallOutcome, LoaderInstaller, SOURCE_DIR, ScopedResolver, normalize_source_path,
};
pub use ledger::ActivationLedger;
pub use outcome::{ActivationReport, PluginOutcome, PluginReport, SkipReason, SkippedPlugin};
pub use unit::{DeclarativeProvider, ManifestUnitLoader, ProviderUnit, UnitLoader};
