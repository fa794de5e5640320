//! Source of the enabled-plugin snapshot.

use folio_core::PluginSnapshot;

use crate::error::CacheResult;

/// Produces the current snapshot of enabled plugins.
///
/// A missing backing store must be reported as an empty snapshot, not an
/// error.
pub trait EnablementCache: Send + Sync {
    fn read(&self) -> CacheResult<PluginSnapshot>;
}

/// A fixed, in-memory snapshot.
impl EnablementCache for PluginSnapshot {
    fn read(&self) -> CacheResult<PluginSnapshot> {
        Ok(self.clone())
    }
}
