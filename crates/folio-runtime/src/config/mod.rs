//! Configuration module for the Folio runtime.
//!
//! Layered loading (defaults, files, `FOLIO_*` environment) of the host's
//! paths, plugin and logging settings, plus validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    FolioConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, PathsConfig, PluginsConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
