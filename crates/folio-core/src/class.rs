//! Process-wide activation class registry.
//!
//! The [`ClassRegistry`] is the host's class-resolution mechanism.  A class is
//! known to it in one of three ways:
//!
//! - **Linked**: compiled into the binary and contributed to
//!   [`PROVIDER_CLASSES`] (usually through `#[folio::provider(...)]`).
//! - **Defined**: added at runtime via [`ClassRegistry::define`], typically
//!   by a resolver that just loaded a unit file.
//! - **Resolvable**: not defined yet, but a resolver registered for a
//!   matching namespace prefix can define it on demand.
//!
//! Resolvers are consulted only on a resolution miss, in installation order,
//! and only for class names that start with their prefix.
//!
//! ```text
//! resolve("Acme\\Widgets\\Provider")
//!   ├─ linked?   ──► hit
//!   ├─ defined?  ──► hit
//!   └─ resolvers["Acme\\Widgets\\"] ──► define(...) ──► hit / miss
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use linkme::distributed_slice;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::error::{ClassError, ClassResult};
use crate::provider::{ProviderFactory, ServiceProvider};

/// Separator between namespace segments of a fully-qualified class name.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Returns the namespace prefix of `class`: everything up to and including
/// the last [`NAMESPACE_SEPARATOR`].
///
/// Flat names have no prefix.
///
/// ```rust
/// use folio_core::class::namespace_prefix;
///
/// assert_eq!(namespace_prefix("Acme\\Widgets\\Provider"), Some("Acme\\Widgets\\"));
/// assert_eq!(namespace_prefix("Provider"), None);
/// ```
pub fn namespace_prefix(class: &str) -> Option<&str> {
    class
        .rfind(NAMESPACE_SEPARATOR)
        .map(|pos| &class[..pos + NAMESPACE_SEPARATOR.len_utf8()])
}

// =============================================================================
// Linked classes (linkme distributed slice)
// =============================================================================

/// A compiled-in activation class.
#[derive(Clone, Copy)]
pub struct ProviderClass {
    /// Fully-qualified class name.
    pub name: &'static str,
    /// Creates a provider instance.
    pub create: fn() -> Box<dyn ServiceProvider>,
}

impl fmt::Debug for ProviderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of compiled-in activation classes.
/// Each crate that links a provider contributes one entry.
#[distributed_slice]
pub static PROVIDER_CLASSES: [ProviderClass];

// =============================================================================
// ResolvedClass
// =============================================================================

/// Where a resolved class came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOrigin {
    /// Compiled into the binary.
    Linked,
    /// Defined programmatically.
    Defined,
    /// Defined by a unit file loaded from disk.
    Unit(PathBuf),
}

/// A class the registry knows how to instantiate.
#[derive(Clone)]
pub struct ResolvedClass {
    name: Arc<str>,
    factory: ProviderFactory,
    origin: ClassOrigin,
}

impl ResolvedClass {
    /// Creates a programmatically defined class.
    pub fn new(name: impl Into<Arc<str>>, factory: ProviderFactory) -> Self {
        Self {
            name: name.into(),
            factory,
            origin: ClassOrigin::Defined,
        }
    }

    /// Creates a class from a plain constructor function.
    pub fn from_fn(name: impl Into<Arc<str>>, create: fn() -> Box<dyn ServiceProvider>) -> Self {
        Self::new(name, Arc::new(create))
    }

    /// Marks the class as loaded from `path`.
    pub fn with_origin(mut self, origin: ClassOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Fully-qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this class came from.
    pub fn origin(&self) -> &ClassOrigin {
        &self.origin
    }

    /// Creates a new provider instance.
    pub fn instantiate(&self) -> Box<dyn ServiceProvider> {
        (self.factory)()
    }
}

impl fmt::Debug for ResolvedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedClass")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ClassResolver
// =============================================================================

/// A lazily consulted, prefix-scoped class resolver.
///
/// Called with the full class name on a resolution miss.  An implementation
/// either defines the class through `registry` or declines by returning
/// `Ok(())` without defining anything.
pub trait ClassResolver: Send + Sync {
    /// Attempts to define `class`.
    fn resolve(&self, class: &str, registry: &ClassRegistry) -> ClassResult<()>;
}

impl<F> ClassResolver for F
where
    F: Fn(&str, &ClassRegistry) -> ClassResult<()> + Send + Sync,
{
    fn resolve(&self, class: &str, registry: &ClassRegistry) -> ClassResult<()> {
        self(class, registry)
    }
}

struct ResolverEntry {
    prefix: String,
    resolver: Arc<dyn ClassResolver>,
}

// =============================================================================
// ClassRegistry
// =============================================================================

/// Process-wide registry of activation classes and their resolvers.
///
/// No lock is held while a resolver runs, so resolvers may freely call back
/// into the registry (define classes, include files, install resolvers).
pub struct ClassRegistry {
    linked: HashMap<&'static str, ResolvedClass>,
    defined: RwLock<HashMap<String, ResolvedClass>>,
    resolvers: RwLock<Vec<ResolverEntry>>,
    included: Mutex<HashSet<PathBuf>>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Creates a registry seeded with every linked class in [`PROVIDER_CLASSES`].
    pub fn new() -> Self {
        Self::with_linked(&PROVIDER_CLASSES)
    }

    /// Creates a registry that knows no classes at all.
    pub fn isolated() -> Self {
        Self::with_linked(&[])
    }

    /// Creates a registry seeded with the given linked classes.
    ///
    /// The first entry wins when two classes share a name.
    pub fn with_linked(classes: &[ProviderClass]) -> Self {
        let mut linked = HashMap::with_capacity(classes.len());
        for class in classes {
            if linked.contains_key(class.name) {
                warn!(class = class.name, "Duplicate linked provider class, keeping the first");
                continue;
            }
            linked.insert(
                class.name,
                ResolvedClass::from_fn(class.name, class.create).with_origin(ClassOrigin::Linked),
            );
        }

        Self {
            linked,
            defined: RwLock::new(HashMap::new()),
            resolvers: RwLock::new(Vec::new()),
            included: Mutex::new(HashSet::new()),
        }
    }

    // ─── Lookup ──────────────────────────────────────────────────────────────

    /// Returns the class if it is linked or already defined.
    ///
    /// Never consults resolvers.
    pub fn find(&self, class: &str) -> Option<ResolvedClass> {
        if let Some(linked) = self.linked.get(class) {
            return Some(linked.clone());
        }
        self.defined.read().get(class).cloned()
    }

    /// Returns `true` if the class is linked or already defined.
    pub fn is_defined(&self, class: &str) -> bool {
        self.linked.contains_key(class) || self.defined.read().contains_key(class)
    }

    /// Resolves a class, consulting matching resolvers on a miss.
    ///
    /// Returns `Ok(None)` when no resolver could define the class.  If a
    /// resolver failed and no later resolver succeeded, the first failure is
    /// returned.
    pub fn resolve(&self, class: &str) -> ClassResult<Option<ResolvedClass>> {
        if let Some(found) = self.find(class) {
            return Ok(Some(found));
        }

        let candidates: Vec<Arc<dyn ClassResolver>> = self
            .resolvers
            .read()
            .iter()
            .filter(|entry| class.starts_with(entry.prefix.as_str()))
            .map(|entry| Arc::clone(&entry.resolver))
            .collect();

        let mut first_error = None;
        for resolver in candidates {
            trace!(class, "Consulting class resolver");
            if let Err(e) = resolver.resolve(class, self) {
                debug!(class, error = %e, "Class resolver failed");
                first_error.get_or_insert(e);
            }
            if let Some(found) = self.find(class) {
                return Ok(Some(found));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// Returns `true` if [`resolve`](Self::resolve) yields a class.
    pub fn is_resolvable(&self, class: &str) -> bool {
        matches!(self.resolve(class), Ok(Some(_)))
    }

    // ─── Definition ──────────────────────────────────────────────────────────

    /// Defines a class.
    ///
    /// Fails with [`ClassError::AlreadyDefined`] if the name is taken; an
    /// existing class is never replaced.
    pub fn define(&self, class: ResolvedClass) -> ClassResult<()> {
        if self.linked.contains_key(class.name()) {
            return Err(ClassError::AlreadyDefined(class.name().to_string()));
        }

        let mut defined = self.defined.write();
        if defined.contains_key(class.name()) {
            return Err(ClassError::AlreadyDefined(class.name().to_string()));
        }
        debug!(class = %class.name(), origin = ?class.origin(), "Class defined");
        defined.insert(class.name().to_string(), class);
        Ok(())
    }

    /// Includes a unit file at most once per registry.
    ///
    /// Returns `Ok(false)` without calling `load` if `path` was already
    /// included.  A failed load is forgotten so a later attempt reports the
    /// same error again.
    pub fn require_once<F>(&self, path: &Path, load: F) -> ClassResult<bool>
    where
        F: FnOnce(&Path) -> ClassResult<()>,
    {
        if !self.included.lock().insert(path.to_path_buf()) {
            return Ok(false);
        }

        match load(path) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.included.lock().remove(path);
                Err(e)
            }
        }
    }

    /// Returns `true` if `path` has been included.
    pub fn is_included(&self, path: &Path) -> bool {
        self.included.lock().contains(path)
    }

    // ─── Resolvers ───────────────────────────────────────────────────────────

    /// Installs a resolver scoped to class names starting with `prefix`.
    ///
    /// The registry does not deduplicate; callers that must install at most
    /// one resolver per prefix track that themselves.
    pub fn register_resolver(&self, prefix: impl Into<String>, resolver: Arc<dyn ClassResolver>) {
        let prefix = prefix.into();
        debug!(prefix = %prefix, "Class resolver installed");
        self.resolvers.write().push(ResolverEntry { prefix, resolver });
    }

    /// Number of installed resolvers.
    pub fn resolver_count(&self) -> usize {
        self.resolvers.read().len()
    }

    /// Names of all linked classes, sorted.
    pub fn linked_class_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.linked.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("linked", &self.linked.len())
            .field("defined", &self.defined.read().len())
            .field("resolvers", &self.resolver_count())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
