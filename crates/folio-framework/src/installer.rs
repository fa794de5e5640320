//! Dynamic loader installation.
//!
//! When an enabled plugin's activation class is unknown to the
//! [`ClassRegistry`], the installer maps the class's namespace prefix onto
//! the plugin's `src` directory by installing a [`ScopedResolver`].  At most
//! one resolver is installed per prefix for the lifetime of the ledger.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_core::{
    ClassError, ClassRegistry, ClassResolver, ClassResult, NAMESPACE_SEPARATOR, namespace_prefix,
};
use tracing::{debug, info, trace};

use crate::ledger::ActivationLedger;
use crate::unit::{ManifestUnitLoader, UnitLoader};

/// Directory under a plugin's source path that holds its units.
pub const SOURCE_DIR: &str = "src";

/// Result of [`LoaderInstaller::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A resolver was installed for the given source root.
    Installed(PathBuf),
    /// A resolver for the prefix already exists.
    AlreadyInstalled,
    /// The class name has no namespace prefix.
    NoNamespacePrefix,
    /// The plugin's source path is empty after normalization.
    EmptySourcePath,
    /// The source path would leave the base directory.
    UnsafeSourcePath,
    /// The plugin has no source directory.
    MissingSourceDir(PathBuf),
}

impl InstallOutcome {
    /// Returns `true` if a resolver was installed by this call.
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed(_))
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed(root) => write!(f, "loader installed for {}", root.display()),
            Self::AlreadyInstalled => f.write_str("namespace loader already installed"),
            Self::NoNamespacePrefix => f.write_str("class name has no namespace prefix"),
            Self::EmptySourcePath => f.write_str("plugin source path is empty"),
            Self::UnsafeSourcePath => f.write_str("plugin source path leaves the base directory"),
            Self::MissingSourceDir(root) => {
                write!(f, "source directory {} does not exist", root.display())
            }
        }
    }
}

/// Trims leading and trailing `/` and `\` from a plugin source path.
pub fn normalize_source_path(path: &str) -> &str {
    path.trim_matches(['/', '\\'])
}

fn has_parent_component(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Installs namespace-scoped resolvers into a [`ClassRegistry`].
#[derive(Clone)]
pub struct LoaderInstaller {
    base_dir: PathBuf,
    units: Arc<dyn UnitLoader>,
}

impl LoaderInstaller {
    /// Creates an installer resolving source paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            units: Arc::new(ManifestUnitLoader),
        }
    }

    /// Replaces the unit loader used by installed resolvers.
    pub fn with_unit_loader(mut self, units: Arc<dyn UnitLoader>) -> Self {
        self.units = units;
        self
    }

    /// The host base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Ensures a resolver exists for the namespace prefix of `class`.
    pub fn install(
        &self,
        ledger: &mut ActivationLedger,
        classes: &ClassRegistry,
        class: &str,
        source_path: &str,
    ) -> InstallOutcome {
        let Some(prefix) = namespace_prefix(class) else {
            debug!(class, "No namespace prefix, loader not installed");
            return InstallOutcome::NoNamespacePrefix;
        };

        let relative = normalize_source_path(source_path);
        if relative.is_empty() {
            debug!(class, "Empty source path, loader not installed");
            return InstallOutcome::EmptySourcePath;
        }

        if ledger.has_loader(prefix) {
            trace!(prefix, "Loader already installed");
            return InstallOutcome::AlreadyInstalled;
        }

        if has_parent_component(relative) {
            debug!(class, source_path, "Source path leaves the base directory");
            return InstallOutcome::UnsafeSourcePath;
        }

        let source_root = self.base_dir.join(relative).join(SOURCE_DIR);
        if !source_root.is_dir() {
            debug!(class, root = %source_root.display(), "Source directory missing");
            return InstallOutcome::MissingSourceDir(source_root);
        }

        let resolver = ScopedResolver::new(prefix, source_root.clone(), Arc::clone(&self.units));
        classes.register_resolver(prefix, Arc::new(resolver));
        ledger.record_loader(prefix);
        info!(prefix, root = %source_root.display(), "Plugin loader installed");

        InstallOutcome::Installed(source_root)
    }
}

impl fmt::Debug for LoaderInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderInstaller")
            .field("base_dir", &self.base_dir)
            .field("extension", &self.units.extension())
            .finish()
    }
}

/// Maps class names under one namespace prefix onto unit files below a
/// source root.
///
/// `Acme\Widgets\Http\Provider` with prefix `Acme\Widgets\` resolves to
/// `<root>/Http/Provider.json`.
pub struct ScopedResolver {
    prefix: String,
    source_root: PathBuf,
    units: Arc<dyn UnitLoader>,
}

impl ScopedResolver {
    pub fn new(
        prefix: impl Into<String>,
        source_root: impl Into<PathBuf>,
        units: Arc<dyn UnitLoader>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            source_root: source_root.into(),
            units,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The unit file that would define `class`, if the name maps to one.
    pub fn unit_path(&self, class: &str) -> Option<PathBuf> {
        let relative = class.strip_prefix(self.prefix.as_str())?;
        if relative.is_empty() {
            return None;
        }
        let mut segments = relative.split(NAMESPACE_SEPARATOR);
        if segments.any(|s| s.is_empty() || s == "." || s == ".." || s.contains('/')) {
            return None;
        }

        let file = format!(
            "{}.{}",
            relative.replace(NAMESPACE_SEPARATOR, "/"),
            self.units.extension()
        );
        Some(self.source_root.join(file))
    }
}

impl ClassResolver for ScopedResolver {
    fn resolve(&self, class: &str, registry: &ClassRegistry) -> ClassResult<()> {
        let Some(file) = self.unit_path(class) else {
            return Ok(());
        };
        if !file.is_file() {
            trace!(class, file = %file.display(), "No unit file");
            return Ok(());
        }

        registry.require_once(&file, |path| {
            let defined = self
                .units
                .load(path)
                .map_err(|e| ClassError::unit_load(path, e))?;
            for class in defined {
                registry.define(class)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl fmt::Debug for ScopedResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedResolver")
            .field("prefix", &self.prefix)
            .field("source_root", &self.source_root)
            .finish()
    }
}
