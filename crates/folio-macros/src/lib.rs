//! Procedural macros for the Folio plugin host.
//!
//! - `#[provider("Vendor\\Name\\Class")]` - links a service provider into the
//!   binary under an activation class name
//!
//! Generated code refers to `::folio_core`, so the calling crate must depend
//! on `folio-core` directly.

mod provider;

use proc_macro::TokenStream;

/// Registers a compiled-in activation class.
///
/// The decorated type must implement `Default` and
/// `folio_core::ServiceProvider`, and must not be generic.  Classes linked
/// this way are always resolvable, so the activator never installs a loader
/// for them.
///
/// # Example
///
/// ```rust,ignore
/// use folio_core::{Application, BoxError, ServiceProvider};
///
/// #[folio::provider("Folio\\Blog\\BlogProvider")]
/// #[derive(Default)]
/// pub struct BlogProvider;
///
/// impl ServiceProvider for BlogProvider {
///     fn register(&self, app: &Application) -> Result<(), BoxError> {
///         app.config().set("blog.enabled", true);
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn provider(attr: TokenStream, item: TokenStream) -> TokenStream {
    provider::provider(attr, item)
}
