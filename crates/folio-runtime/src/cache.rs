//! The on-disk enablement cache.
//!
//! ```json
//! {
//!   "generated_at": "1760000000",
//!   "plugins": {
//!     "acme/widgets": {
//!       "provider": "Acme\\Widgets\\Provider",
//!       "path": "plugins/acme/widgets",
//!       "version": "0.1.0",
//!       "manifest": { "name": "acme/widgets" }
//!     }
//!   }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use folio_core::PluginSnapshot;
use folio_framework::{CacheError, CacheResult, EnablementCache};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Top-level key holding the plugin map.
pub const PLUGINS_KEY: &str = "plugins";

/// Reads (and writes) the enabled-plugin cache file.
#[derive(Debug, Clone)]
pub struct FileEnablementCache {
    path: PathBuf,
}

impl FileEnablementCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `snapshot` to the cache file, creating parent directories.
    pub fn write(&self, snapshot: &PluginSnapshot) -> CacheResult<()> {
        let write_error = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let generated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let document = json!({
            "generated_at": generated_at.to_string(),
            "plugins": snapshot.to_plugins_value(),
        });
        let text = serde_json::to_string_pretty(&document)
            .map_err(|e| write_error(std::io::Error::other(e)))?;
        fs::write(&self.path, text).map_err(write_error)?;

        info!(path = %self.path.display(), plugins = snapshot.len(), "Plugin cache written");
        Ok(())
    }
}

impl EnablementCache for FileEnablementCache {
    fn read(&self) -> CacheResult<PluginSnapshot> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No plugin cache");
                return Ok(PluginSnapshot::empty());
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if text.trim().is_empty() {
            return Ok(PluginSnapshot::empty());
        }

        let document: Value = serde_json::from_str(&text).map_err(|source| CacheError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = document
            .get(PLUGINS_KEY)
            .map(PluginSnapshot::from_plugins_value)
            .unwrap_or_default();

        debug!(path = %self.path.display(), plugins = snapshot.len(), "Plugin cache read");
        Ok(snapshot)
    }
}
