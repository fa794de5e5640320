//! # Folio Core
//!
//! Core building blocks of the Folio plugin host.
//!
//! - **Class registry**: the process-wide set of activation classes, with
//!   lazily consulted, namespace-scoped resolvers ([`ClassRegistry`]).
//! - **Service providers**: the initialization hook behind every activation
//!   class ([`ServiceProvider`]).
//! - **Container**: one-time provider registration and the service map
//!   ([`Container`], [`Application`]).
//! - **Plugin records**: enabled plugins as read from the enablement cache
//!   ([`PluginRecord`], [`PluginSnapshot`]).
//!
//! The activation pipeline that ties these together lives in
//! `folio-framework`.

pub mod class;
pub mod container;
pub mod editor;
pub mod error;
pub mod provider;
pub mod record;
pub mod repository;

pub use class::{
    ClassOrigin, ClassRegistry, ClassResolver, NAMESPACE_SEPARATOR, PROVIDER_CLASSES,
    ProviderClass, ResolvedClass, namespace_prefix,
};
pub use container::{Application, Container};
pub use editor::{
    EDITOR_DRIVERS_SERVICE_ID, EditorDriverDefinition, EditorDriverRegistry, EditorDriverSummary,
    LEGACY_PAGE_DRIVER_ID, StaticViewCatalog, ViewCatalog, legacy_editor_view_binding,
};
pub use error::{BoxError, ClassError, ClassResult, ContainerError, ContainerResult};
pub use provider::{ProviderFactory, ServiceProvider};
pub use record::{PluginRecord, PluginSnapshot};
pub use repository::Repository;

// Re-export linkme for `#[folio::provider]`.
pub use linkme;
