//! Activation pass behaviour against plugin trees on disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use folio_core::{
    Application, BoxError, ClassRegistry, PluginRecord, PluginSnapshot, ProviderClass,
    ServiceProvider,
};
use folio_framework::{
    CacheError, CacheResult, EnablementCache, InstallOutcome, LoaderInstaller, PluginActivator,
    PluginOutcome, RecordingDiagnostics, SkipReason,
};
use serde_json::json;
use tempfile::TempDir;

const ACME_CLASS: &str = "Acme\\Widgets\\Provider";

struct Harness {
    app: Arc<Application>,
    diagnostics: Arc<RecordingDiagnostics>,
    activator: PluginActivator,
}

fn harness(base: &Path, cache: Arc<dyn EnablementCache>, classes: ClassRegistry) -> Harness {
    let app = Arc::new(Application::new());
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let activator = PluginActivator::new(app.clone(), cache, LoaderInstaller::new(base))
        .with_classes(Arc::new(classes))
        .with_diagnostics(diagnostics.clone());
    Harness {
        app,
        diagnostics,
        activator,
    }
}

fn write_acme_unit(base: &Path) {
    let src = base.join("plugins/acme/widgets/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("Provider.json"),
        json!({
            "class": ACME_CLASS,
            "config": { "acme.widgets.loaded": true },
            "bindings": { "acme.widgets.greeting": "hello" }
        })
        .to_string(),
    )
    .unwrap();
}

fn acme_snapshot() -> PluginSnapshot {
    PluginSnapshot::from_iter([PluginRecord::new(
        "acme/widgets",
        ACME_CLASS,
        "plugins/acme/widgets",
    )])
}

/// Counts reads so tests can assert the snapshot is only consulted once.
struct CountingCache {
    snapshot: PluginSnapshot,
    reads: AtomicUsize,
}

impl EnablementCache for CountingCache {
    fn read(&self) -> CacheResult<PluginSnapshot> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

struct CorruptCache;

impl EnablementCache for CorruptCache {
    fn read(&self) -> CacheResult<PluginSnapshot> {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        Err(CacheError::Parse {
            path: "bootstrap/cache/plugins.json".into(),
            source,
        })
    }
}

struct LinkedProvider;

impl ServiceProvider for LinkedProvider {
    fn register(&self, app: &Application) -> Result<(), BoxError> {
        app.config().set("linked.registered", true);
        Ok(())
    }
}

fn linked() -> Box<dyn ServiceProvider> {
    Box::new(LinkedProvider)
}

struct RejectingProvider;

impl ServiceProvider for RejectingProvider {
    fn register(&self, _app: &Application) -> Result<(), BoxError> {
        Err("missing license key".into())
    }
}

fn rejecting() -> Box<dyn ServiceProvider> {
    Box::new(RejectingProvider)
}

#[test]
fn acme_plugin_is_loaded_from_its_source_tree() {
    let dir = TempDir::new().unwrap();
    write_acme_unit(dir.path());
    let mut h = harness(dir.path(), Arc::new(acme_snapshot()), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    assert_eq!(h.activator.ledger().registered_classes().collect::<Vec<_>>(), vec![ACME_CLASS]);
    assert_eq!(
        h.activator.ledger().installed_loader_prefixes().collect::<Vec<_>>(),
        vec!["Acme\\Widgets\\"]
    );
    assert_eq!(h.app.registered_providers(), vec![ACME_CLASS]);
    assert!(h.app.config().get_bool("acme.widgets.loaded", false));
    assert_eq!(h.app.value("acme.widgets.greeting"), Some(json!("hello")));
    assert!(h.diagnostics.is_empty());
    assert_eq!(
        h.activator.report().get("acme/widgets").map(|r| &r.outcome),
        Some(&PluginOutcome::Activated)
    );
}

#[test]
fn acme_plugin_without_unit_file_is_reported_once() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("plugins/acme/widgets/src")).unwrap();
    let mut h = harness(dir.path(), Arc::new(acme_snapshot()), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    assert!(!h.activator.ledger().has_registrations());
    assert!(h.app.registered_providers().is_empty());

    let skipped = h.diagnostics.skipped();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].plugin_id, "acme/widgets");
    assert_eq!(skipped[0].activation_class, ACME_CLASS);
    assert!(matches!(skipped[0].reason, SkipReason::ClassNotFound { .. }));
}

#[test]
fn second_pass_is_a_noop() {
    let dir = TempDir::new().unwrap();
    write_acme_unit(dir.path());
    let cache = Arc::new(CountingCache {
        snapshot: acme_snapshot(),
        reads: AtomicUsize::new(0),
    });
    let mut h = harness(dir.path(), cache.clone(), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();
    h.activator.activate_enabled_plugins();

    assert_eq!(cache.reads.load(Ordering::SeqCst), 1);
    assert_eq!(h.app.registered_providers().len(), 1);
    assert_eq!(h.activator.ledger().registered_classes().count(), 1);
}

#[test]
fn linked_class_never_triggers_the_installer() {
    let dir = TempDir::new().unwrap();
    let classes = ClassRegistry::with_linked(&[ProviderClass {
        name: "Core\\Linked\\Provider",
        create: linked,
    }]);
    let snapshot = PluginSnapshot::from_iter([PluginRecord::new(
        "core/linked",
        "Core\\Linked\\Provider",
        "plugins/core/linked",
    )]);
    let mut h = harness(dir.path(), Arc::new(snapshot), classes);

    h.activator.activate_enabled_plugins();

    assert!(h.activator.ledger().is_registered("Core\\Linked\\Provider"));
    assert_eq!(h.activator.ledger().installed_loader_prefixes().count(), 0);
    assert_eq!(h.activator.classes().resolver_count(), 0);
    assert!(h.app.config().get_bool("linked.registered", false));
}

#[test]
fn empty_source_path_and_flat_name_each_warn_once() {
    let dir = TempDir::new().unwrap();
    let snapshot = PluginSnapshot::from_iter([
        PluginRecord::new("acme/widgets", ACME_CLASS, "//"),
        PluginRecord::new("flat/plugin", "FlatProvider", "plugins/flat"),
    ]);
    let mut h = harness(dir.path(), Arc::new(snapshot), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    let skipped = h.diagnostics.skipped();
    assert_eq!(skipped.len(), 2);
    assert_eq!(
        skipped[0].reason,
        SkipReason::ClassNotFound {
            loader: InstallOutcome::EmptySourcePath
        }
    );
    assert_eq!(
        skipped[1].reason,
        SkipReason::ClassNotFound {
            loader: InstallOutcome::NoNamespacePrefix
        }
    );
}

#[test]
fn invalid_plugin_does_not_block_valid_one() {
    let dir = TempDir::new().unwrap();
    write_acme_unit(dir.path());
    let snapshot = PluginSnapshot::from_iter([
        PluginRecord::new("ghost/plugin", "Ghost\\Provider", "plugins/ghost"),
        PluginRecord::new("acme/widgets", ACME_CLASS, "plugins/acme/widgets"),
    ]);
    let mut h = harness(dir.path(), Arc::new(snapshot), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    assert_eq!(h.app.registered_providers(), vec![ACME_CLASS]);
    let skipped = h.diagnostics.skipped();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].plugin_id, "ghost/plugin");
    assert_eq!(
        skipped[0].reason,
        SkipReason::ClassNotFound {
            loader: InstallOutcome::MissingSourceDir(dir.path().join("plugins/ghost/src"))
        }
    );
}

#[test]
fn empty_or_corrupt_cache_activates_nothing_quietly() {
    let dir = TempDir::new().unwrap();

    let mut empty = harness(
        dir.path(),
        Arc::new(PluginSnapshot::empty()),
        ClassRegistry::isolated(),
    );
    empty.activator.activate_enabled_plugins();
    assert!(empty.app.registered_providers().is_empty());
    assert!(empty.diagnostics.is_empty());

    let mut corrupt = harness(dir.path(), Arc::new(CorruptCache), ClassRegistry::isolated());
    corrupt.activator.activate_enabled_plugins();
    assert!(corrupt.app.registered_providers().is_empty());
    assert!(corrupt.diagnostics.is_empty());
}

#[test]
fn inert_records_are_ignored() {
    let dir = TempDir::new().unwrap();
    let snapshot = PluginSnapshot::from_plugins_value(&json!({
        "theme/only": { "path": "plugins/theme/only", "version": "1.0.0" },
        "blank/provider": { "provider": "", "path": "plugins/blank" }
    }));
    let mut h = harness(dir.path(), Arc::new(snapshot), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    assert!(h.diagnostics.is_empty());
    assert_eq!(h.activator.report().entries().len(), 2);
    assert!(
        h.activator
            .report()
            .entries()
            .iter()
            .all(|e| e.outcome == PluginOutcome::Inert)
    );
}

#[test]
fn shared_class_is_registered_once() {
    let dir = TempDir::new().unwrap();
    write_acme_unit(dir.path());
    let snapshot = PluginSnapshot::from_iter([
        PluginRecord::new("acme/widgets", ACME_CLASS, "plugins/acme/widgets"),
        PluginRecord::new("acme/widgets-copy", ACME_CLASS, "plugins/acme/widgets"),
    ]);
    let mut h = harness(dir.path(), Arc::new(snapshot), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    assert_eq!(h.app.registered_providers(), vec![ACME_CLASS]);
    assert_eq!(
        h.activator.report().get("acme/widgets-copy").map(|r| &r.outcome),
        Some(&PluginOutcome::AlreadyRegistered)
    );
    assert!(h.diagnostics.is_empty());
}

#[test]
fn malformed_unit_and_failing_provider_are_skipped() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("plugins/broken/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("Provider.json"), "{ not json").unwrap();

    let classes = ClassRegistry::with_linked(&[ProviderClass {
        name: "Locked\\Provider",
        create: rejecting,
    }]);
    let snapshot = PluginSnapshot::from_iter([
        PluginRecord::new("broken/plugin", "Broken\\Provider", "plugins/broken"),
        PluginRecord::new("locked/plugin", "Locked\\Provider", "plugins/locked"),
    ]);
    let mut h = harness(dir.path(), Arc::new(snapshot), classes);

    h.activator.activate_enabled_plugins();

    let skipped = h.diagnostics.skipped();
    assert_eq!(skipped.len(), 2);
    assert!(matches!(skipped[0].reason, SkipReason::LoadFailed(_)));
    assert!(matches!(skipped[1].reason, SkipReason::RegistrationFailed(_)));
    assert!(!h.activator.ledger().has_registrations());
}

#[test]
fn unit_declaring_another_class_leaves_requested_class_unresolved() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("plugins/acme/widgets/src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("Provider.json"),
        json!({ "class": "Acme\\Widgets\\Other" }).to_string(),
    )
    .unwrap();
    let mut h = harness(dir.path(), Arc::new(acme_snapshot()), ClassRegistry::isolated());

    h.activator.activate_enabled_plugins();

    assert!(h.app.registered_providers().is_empty());
    assert_eq!(h.diagnostics.len(), 1);
    assert!(h.activator.classes().is_defined("Acme\\Widgets\\Other"));
}
