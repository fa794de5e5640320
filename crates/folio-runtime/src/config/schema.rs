//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Filesystem layout of the host.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Plugin discovery and cache settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Paths
// =============================================================================

/// Filesystem layout, relative to `base_path` unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Host base directory.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Directory holding first-party plugins.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: String,

    /// Directory holding themes.
    #[serde(default = "default_themes_dir")]
    pub themes_dir: String,

    /// Directory holding the enablement caches.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            plugins_dir: default_plugins_dir(),
            themes_dir: default_themes_dir(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_plugins_dir() -> String {
    "plugins".to_string()
}

fn default_themes_dir() -> String {
    "themes".to_string()
}

fn default_cache_dir() -> String {
    "bootstrap/cache".to_string()
}

// =============================================================================
// Plugins
// =============================================================================

/// Plugin settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// File stem of the plugin enablement cache.
    #[serde(default = "default_cache_key")]
    pub cache_key: String,

    /// Namespaces under `vendor/` searched for plugin manifests.
    #[serde(default = "default_vendor_namespaces")]
    pub vendor_namespaces: Vec<String>,

    /// Parallel-test token appended to cache file names.
    ///
    /// Falls back to the `TEST_TOKEN` environment variable when unset.
    #[serde(default)]
    pub test_token: Option<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            cache_key: default_cache_key(),
            vendor_namespaces: default_vendor_namespaces(),
            test_token: None,
        }
    }
}

fn default_cache_key() -> String {
    "plugins".to_string()
}

fn default_vendor_namespaces() -> Vec<String> {
    vec!["folio".to_string()]
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level; `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module levels, e.g. `folio_framework = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    #[serde(default)]
    pub span_events: SpanEventConfig,
}
