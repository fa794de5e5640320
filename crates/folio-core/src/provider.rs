//! Service providers: the initialization hook behind every activation class.

use std::sync::Arc;

use crate::container::Application;
use crate::error::BoxError;

/// The initialization hook of an activation class.
///
/// The container calls [`register`](ServiceProvider::register) exactly once
/// when the class is activated, and [`boot`](ServiceProvider::boot) once the
/// application boot phase runs (or immediately, for providers registered
/// after boot).
///
/// # Example
///
/// ```rust,ignore
/// use folio::prelude::*;
///
/// #[derive(Default)]
/// #[folio::provider("Acme\\Widgets\\Provider")]
/// struct WidgetsProvider;
///
/// impl ServiceProvider for WidgetsProvider {
///     fn register(&self, app: &Application) -> Result<(), BoxError> {
///         app.config().set("acme.widgets.loaded", true);
///         Ok(())
///     }
/// }
/// ```
pub trait ServiceProvider: Send + Sync + 'static {
    /// Wires the provider's contributions into the application.
    fn register(&self, app: &Application) -> Result<(), BoxError>;

    /// Runs after every provider known at boot time has registered.
    fn boot(&self, app: &Application) -> Result<(), BoxError> {
        let _ = app;
        Ok(())
    }
}

/// Creates a fresh provider instance for an activation class.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn ServiceProvider> + Send + Sync>;
