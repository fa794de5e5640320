//! Per-plugin activation outcomes.

use std::fmt;

use folio_core::{ClassError, ContainerError};
use thiserror::Error;

use crate::installer::InstallOutcome;

/// Why an enabled plugin was not activated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The activation class stayed unresolvable after loader installation.
    #[error("provider class was not found ({loader})")]
    ClassNotFound { loader: InstallOutcome },

    /// A unit file for the class exists but could not be loaded.
    #[error("provider class failed to load: {0}")]
    LoadFailed(ClassError),

    /// The container rejected the class.
    #[error("{0}")]
    RegistrationFailed(ContainerError),
}

/// Outcome of processing one snapshot record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOutcome {
    /// The class was registered with the container during this pass.
    Activated,
    /// The class was registered earlier.
    AlreadyRegistered,
    /// The record names no activation class.
    Inert,
    /// The plugin was skipped.
    Skipped(SkipReason),
}

impl PluginOutcome {
    /// Returns `true` if the plugin's class is registered.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Activated | Self::AlreadyRegistered)
    }

    /// Returns the skip reason, if any.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for PluginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activated | Self::AlreadyRegistered => f.write_str("active"),
            Self::Inert => f.write_str("inert"),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

/// A plugin that failed to activate, as reported to diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlugin {
    pub plugin_id: String,
    pub activation_class: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipping enabled plugin '{}' ({}): {}",
            self.plugin_id, self.activation_class, self.reason
        )
    }
}

/// One line of an [`ActivationReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReport {
    pub plugin_id: String,
    pub activation_class: Option<String>,
    pub outcome: PluginOutcome,
}

/// Outcomes of the most recent activation pass, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    entries: Vec<PluginReport>,
}

impl ActivationReport {
    pub(crate) fn push(
        &mut self,
        plugin_id: &str,
        activation_class: Option<&str>,
        outcome: PluginOutcome,
    ) {
        self.entries.push(PluginReport {
            plugin_id: plugin_id.to_string(),
            activation_class: activation_class.map(str::to_owned),
            outcome,
        });
    }

    pub fn entries(&self) -> &[PluginReport] {
        &self.entries
    }

    pub fn get(&self, plugin_id: &str) -> Option<&PluginReport> {
        self.entries.iter().find(|e| e.plugin_id == plugin_id)
    }

    pub fn activated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_active()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.skip_reason().is_some()).count()
    }

    /// Skipped plugins, in snapshot order.
    pub fn skipped(&self) -> Vec<SkippedPlugin> {
        self.entries
            .iter()
            .filter_map(|e| {
                let reason = e.outcome.skip_reason()?;
                Some(SkippedPlugin {
                    plugin_id: e.plugin_id.clone(),
                    activation_class: e.activation_class.clone().unwrap_or_default(),
                    reason: reason.clone(),
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_and_skips() {
        let mut report = ActivationReport::default();
        report.push("a/one", Some("A\\Provider"), PluginOutcome::Activated);
        report.push("b/two", None, PluginOutcome::Inert);
        report.push(
            "c/three",
            Some("C\\Provider"),
            PluginOutcome::Skipped(SkipReason::ClassNotFound {
                loader: InstallOutcome::EmptySourcePath,
            }),
        );

        assert_eq!(report.activated_count(), 1);
        assert_eq!(report.skipped_count(), 1);

        let skipped = report.skipped();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].plugin_id, "c/three");
        assert_eq!(
            skipped[0].to_string(),
            "Skipping enabled plugin 'c/three' (C\\Provider): provider class was not found (plugin source path is empty)"
        );
        assert_eq!(report.get("b/two").unwrap().outcome.to_string(), "inert");
    }
}
