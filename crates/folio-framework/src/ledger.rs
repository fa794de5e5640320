//! Process-local bookkeeping of what has already been activated or loaded.

use std::collections::BTreeSet;

/// Records which activation classes have been handed to the container and
/// which namespace prefixes already have a resolver installed.
///
/// Both sets only grow: nothing is ever removed or re-processed for the
/// lifetime of the owning activator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationLedger {
    registered_classes: BTreeSet<String>,
    installed_loader_prefixes: BTreeSet<String>,
}

impl ActivationLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `class` was registered with the container.
    pub fn is_registered(&self, class: &str) -> bool {
        self.registered_classes.contains(class)
    }

    /// Records a registered class.  Returns `false` if it was already known.
    pub fn record_registered(&mut self, class: impl Into<String>) -> bool {
        self.registered_classes.insert(class.into())
    }

    /// Returns `true` once at least one class has been registered.
    pub fn has_registrations(&self) -> bool {
        !self.registered_classes.is_empty()
    }

    /// Returns `true` if a resolver is installed for `prefix`.
    pub fn has_loader(&self, prefix: &str) -> bool {
        self.installed_loader_prefixes.contains(prefix)
    }

    /// Records an installed resolver.  Returns `false` if it was already known.
    pub fn record_loader(&mut self, prefix: impl Into<String>) -> bool {
        self.installed_loader_prefixes.insert(prefix.into())
    }

    /// Registered classes in sorted order.
    pub fn registered_classes(&self) -> impl Iterator<Item = &str> {
        self.registered_classes.iter().map(String::as_str)
    }

    /// Prefixes with an installed resolver, in sorted order.
    pub fn installed_loader_prefixes(&self) -> impl Iterator<Item = &str> {
        self.installed_loader_prefixes.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_grow_without_duplicates() {
        let mut ledger = ActivationLedger::new();
        assert!(!ledger.has_registrations());

        assert!(ledger.record_registered("B\\Provider"));
        assert!(ledger.record_registered("A\\Provider"));
        assert!(!ledger.record_registered("A\\Provider"));
        assert!(ledger.has_registrations());
        assert_eq!(
            ledger.registered_classes().collect::<Vec<_>>(),
            vec!["A\\Provider", "B\\Provider"]
        );

        assert!(ledger.record_loader("A\\"));
        assert!(!ledger.record_loader("A\\"));
        assert!(ledger.has_loader("A\\"));
        assert!(!ledger.has_loader("B\\"));
    }
}
