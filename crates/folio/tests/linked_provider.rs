//! `#[folio::provider]` classes are linked into the registry and activate
//! without a loader.

use std::sync::Arc;

use folio::core::{ClassOrigin, ClassRegistry, PluginRecord, PluginSnapshot};
use folio::framework::{LoaderInstaller, PluginActivator, PluginOutcome};
use folio::listing::plugin_rows;
use folio::prelude::*;

const LINKED_CLASS: &str = "Test\\Linked\\Provider";

#[folio::provider("Test\\Linked\\Provider")]
#[derive(Default)]
struct LinkedProvider;

impl ServiceProvider for LinkedProvider {
    fn register(&self, app: &Application) -> Result<(), BoxError> {
        app.config().set("linked.registered", true);
        Ok(())
    }
}

#[test]
fn linked_class_is_in_the_default_registry() {
    let classes = ClassRegistry::new();

    let class = classes.find(LINKED_CLASS).expect("linked class");
    assert_eq!(class.name(), LINKED_CLASS);
    assert!(matches!(class.origin(), ClassOrigin::Linked));
    assert!(classes.linked_class_names().contains(&LINKED_CLASS));
}

#[test]
fn linked_class_activates_without_a_loader() {
    let base = tempfile::tempdir().unwrap();
    let app = Arc::new(Application::new());
    let snapshot = PluginSnapshot::from_iter([PluginRecord::new(
        "test/linked",
        LINKED_CLASS,
        "plugins/test/linked",
    )]);

    let mut activator = PluginActivator::new(
        app.clone(),
        Arc::new(snapshot.clone()),
        LoaderInstaller::new(base.path()),
    );
    activator.activate_enabled_plugins();

    assert_eq!(
        activator.report().get("test/linked").map(|r| &r.outcome),
        Some(&PluginOutcome::Activated)
    );
    assert!(activator.ledger().is_registered(LINKED_CLASS));
    assert_eq!(activator.ledger().installed_loader_prefixes().count(), 0);
    assert!(app.config().get_bool("linked.registered", false));

    let rows = plugin_rows(&snapshot, activator.report());
    assert_eq!(rows[0].state, "active");
}
