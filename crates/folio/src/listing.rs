//! Enabled-plugin listing, as printed by `folio plugins`.

use std::fmt;

use folio_core::PluginSnapshot;
use folio_framework::{ActivationReport, PluginOutcome};
use serde::Serialize;

/// One enabled plugin and what activation made of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginRow {
    pub id: String,
    pub provider: Option<String>,
    pub path: Option<String>,
    pub version: Option<String>,
    /// `active`, `inert`, `skipped: <reason>`, or `pending` if activation
    /// has not processed the plugin.
    pub state: String,
}

/// Joins the snapshot with the activation report, in snapshot order.
pub fn plugin_rows(snapshot: &PluginSnapshot, report: &ActivationReport) -> Vec<PluginRow> {
    snapshot
        .iter()
        .map(|record| {
            let state = match report.get(&record.id) {
                Some(entry) => entry.outcome.to_string(),
                None if record.is_inert() => PluginOutcome::Inert.to_string(),
                None => "pending".to_string(),
            };
            PluginRow {
                id: record.id.clone(),
                provider: record.activation_class().map(str::to_owned),
                path: record.source_path.clone(),
                version: record.version().map(str::to_owned),
                state,
            }
        })
        .collect()
}

/// Plain-text table of [`PluginRow`]s.
pub struct PluginTable<'a>(pub &'a [PluginRow]);

impl fmt::Display for PluginTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No enabled plugins.");
        }

        let id_width = self.0.iter().map(|r| r.id.len()).max().unwrap_or(0).max(2);
        let version_width = self
            .0
            .iter()
            .map(|r| r.version.as_deref().unwrap_or("-").len())
            .max()
            .unwrap_or(0)
            .max(7);

        writeln!(f, "{:id_width$}  {:version_width$}  STATE", "ID", "VERSION")?;
        for row in self.0 {
            writeln!(
                f,
                "{:id_width$}  {:version_width$}  {}",
                row.id,
                row.version.as_deref().unwrap_or("-"),
                row.state
            )?;
        }
        Ok(())
    }
}
