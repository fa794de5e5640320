//! Where skipped plugins are reported.

use parking_lot::Mutex;
use tracing::warn;

use crate::outcome::SkippedPlugin;

/// Receives one call per plugin that failed to activate.
pub trait DiagnosticsSink: Send + Sync {
    fn plugin_skipped(&self, skipped: &SkippedPlugin);
}

/// Reports skipped plugins as `warn!` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn plugin_skipped(&self, skipped: &SkippedPlugin) {
        warn!(
            plugin = %skipped.plugin_id,
            class = %skipped.activation_class,
            reason = %skipped.reason,
            "Skipping enabled plugin because its provider class could not be activated"
        );
    }
}

/// Keeps reports in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    skipped: Mutex<Vec<SkippedPlugin>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far.
    pub fn skipped(&self) -> Vec<SkippedPlugin> {
        self.skipped.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.skipped.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.lock().is_empty()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn plugin_skipped(&self, skipped: &SkippedPlugin) {
        self.skipped.lock().push(skipped.clone());
    }
}
