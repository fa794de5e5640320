//! # Folio
//!
//! A plugin-oriented content host.  Enabled plugins are listed in an
//! enablement cache; at boot each plugin's activation class is registered
//! with the application container exactly once, loading the plugin's provider
//! unit from its `src` directory when the class is not compiled in.
//!
//! ## Crates
//!
//! - [`core`]: class registry, service providers, application container
//! - [`framework`]: the activation pipeline
//! - [`runtime`]: configuration, logging, paths and the boot sequence
//!
//! ## Compiled-in providers
//!
//! ```rust,ignore
//! use folio::prelude::*;
//!
//! #[folio::provider("Folio\\Pages\\PagesProvider")]
//! #[derive(Default)]
//! struct PagesProvider;
//!
//! impl ServiceProvider for PagesProvider {
//!     fn register(&self, app: &Application) -> Result<(), BoxError> {
//!         app.config().set("pages.enabled", true);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = FolioRuntime::builder().build()?.booted();
//!     print!("{}", runtime.stats());
//!     Ok(())
//! }
//! ```

pub mod listing;

pub use folio_core as core;
pub use folio_framework as framework;
pub use folio_runtime as runtime;

pub use folio_macros::provider;

/// Prelude module for convenient imports.
pub mod prelude {
    // Runtime - main entry point
    pub use folio_runtime::{FolioConfig, FolioRuntime, Paths, RuntimeStats};

    // Providers and the container
    pub use folio_core::{Application, BoxError, Container, ServiceProvider};

    // Activation
    pub use folio_framework::{PluginActivator, PluginOutcome, SkipReason, SkippedPlugin};

    pub use folio_macros::provider;
}
