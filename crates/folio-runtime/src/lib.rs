//! Folio Runtime - host bootstrap for the Folio plugin host.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `FolioConfig`)
//! - Logging setup (`LoggingBuilder`, `logging::init_from_config`)
//! - Filesystem layout and cache locations (`Paths`)
//! - The on-disk enablement cache (`FileEnablementCache`)
//! - The boot sequence (`FolioRuntime`)
//!
//! ```ignore
//! use folio_runtime::FolioRuntime;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = FolioRuntime::builder().build()?.booted();
//!     for class in runtime.stats().registered_classes {
//!         println!("{class}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod runtime;

// Re-exports
pub use cache::FileEnablementCache;
pub use config::{ConfigError, ConfigLoader, ConfigResult, FolioConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use paths::Paths;
pub use runtime::{FolioRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
