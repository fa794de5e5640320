//! Filesystem layout of a Folio host.

use std::path::{Path, PathBuf};

use crate::config::FolioConfig;

/// Environment variable carrying the parallel-test token.
pub const TEST_TOKEN_ENV: &str = "TEST_TOKEN";

/// Cache file stem of the active-theme cache.
pub const THEME_CACHE_KEY: &str = "theme";

/// Resolved host paths.
///
/// Everything is relative to `base_path`.  Cache file names gain a
/// `.<token>` suffix while a parallel-test token is set, so concurrent test
/// processes never share a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base_path: PathBuf,
    plugins_dir: String,
    themes_dir: String,
    cache_dir: String,
    cache_key: String,
    vendor_namespaces: Vec<String>,
    test_token: Option<String>,
}

impl Paths {
    /// Default layout under `base_path`, without a test token.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let mut config = FolioConfig::default();
        config.paths.base_path = base_path.into();
        Self::layout(&config, None)
    }

    /// Layout from configuration, using `plugins.test_token`.
    ///
    /// [`ConfigLoader`](crate::config::ConfigLoader) fills that field from
    /// the `TEST_TOKEN` environment variable when it reads the environment.
    pub fn from_config(config: &FolioConfig) -> Self {
        Self::layout(config, config.plugins.test_token.as_deref())
    }

    fn layout(config: &FolioConfig, token: Option<&str>) -> Self {
        Self {
            base_path: config.paths.base_path.clone(),
            plugins_dir: config.paths.plugins_dir.clone(),
            themes_dir: config.paths.themes_dir.clone(),
            cache_dir: config.paths.cache_dir.clone(),
            cache_key: config.plugins.cache_key.trim().to_string(),
            vendor_namespaces: config.plugins.vendor_namespaces.clone(),
            test_token: token.and_then(sanitize_token),
        }
    }

    /// Replaces the test token.
    pub fn with_test_token(mut self, token: Option<&str>) -> Self {
        self.test_token = token.and_then(sanitize_token);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The sanitized test token, if any.
    pub fn test_token(&self) -> Option<&str> {
        self.test_token.as_deref()
    }

    /// The plugins directory, or `append` below it.
    pub fn plugins_path(&self, append: &str) -> PathBuf {
        join_below(self.base_path.join(&self.plugins_dir), append)
    }

    /// The themes directory, or `append` below it.
    pub fn themes_path(&self, append: &str) -> PathBuf {
        join_below(self.base_path.join(&self.themes_dir), append)
    }

    /// The enablement cache directory.
    pub fn cache_path(&self) -> PathBuf {
        self.base_path.join(&self.cache_dir)
    }

    /// The enabled-plugin cache file.
    pub fn plugin_cache_path(&self) -> PathBuf {
        self.cache_file(&self.cache_key)
    }

    /// The active-theme cache file.
    pub fn theme_cache_path(&self) -> PathBuf {
        self.cache_file(THEME_CACHE_KEY)
    }

    /// Existing directories to search for plugin manifests: the plugins
    /// directory, then `vendor/<namespace>` for each configured namespace.
    pub fn plugin_search_roots(&self) -> Vec<PathBuf> {
        let vendors = self
            .vendor_namespaces
            .iter()
            .map(|ns| ns.trim())
            .filter(|ns| !ns.is_empty())
            .map(|ns| self.base_path.join("vendor").join(ns));

        std::iter::once(self.plugins_path(""))
            .chain(vendors)
            .filter(|root| root.is_dir())
            .collect()
    }

    /// Existing directories to search for theme manifests.
    pub fn theme_search_roots(&self) -> Vec<PathBuf> {
        Some(self.themes_path(""))
            .into_iter()
            .filter(|root| root.is_dir())
            .collect()
    }

    fn cache_file(&self, key: &str) -> PathBuf {
        let name = match &self.test_token {
            Some(token) => format!("{key}.{token}.json"),
            None => format!("{key}.json"),
        };
        self.cache_path().join(name)
    }
}

/// Normalizes a parallel-test token to `[A-Za-z0-9._-]`, replacing every
/// other character with `-`.  Blank tokens yield `None`.
pub fn sanitize_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(
        token
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect(),
    )
}

fn join_below(root: PathBuf, append: &str) -> PathBuf {
    let append = append.trim_start_matches(['/', '\\']);
    if append.is_empty() {
        root
    } else {
        root.join(append)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plugins_path_appends_relative() {
        let paths = Paths::new("/srv/site");
        assert_eq!(paths.plugins_path(""), PathBuf::from("/srv/site/plugins"));
        assert_eq!(
            paths.plugins_path("/acme/widgets"),
            PathBuf::from("/srv/site/plugins/acme/widgets")
        );
        assert_eq!(paths.themes_path("dark"), PathBuf::from("/srv/site/themes/dark"));
    }

    #[test]
    fn test_cache_paths_with_token() {
        let paths = Paths::new("/srv/site");
        assert_eq!(
            paths.plugin_cache_path(),
            PathBuf::from("/srv/site/bootstrap/cache/plugins.json")
        );

        let paths = paths.with_test_token(Some(" worker 3/a "));
        assert_eq!(paths.test_token(), Some("worker-3-a"));
        assert_eq!(
            paths.plugin_cache_path(),
            PathBuf::from("/srv/site/bootstrap/cache/plugins.worker-3-a.json")
        );
        assert_eq!(
            paths.theme_cache_path(),
            PathBuf::from("/srv/site/bootstrap/cache/theme.worker-3-a.json")
        );
    }

    #[test]
    fn test_from_config_ignores_environment() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(TEST_TOKEN_ENV, "worker-9");

            let paths = Paths::from_config(&FolioConfig::default());
            assert_eq!(paths.test_token(), None);

            let mut config = FolioConfig::default();
            config.plugins.test_token = Some("worker-2".into());
            assert_eq!(Paths::from_config(&config).test_token(), Some("worker-2"));
            Ok(())
        });
    }

    #[test]
    fn test_sanitize_token() {
        assert_eq!(sanitize_token("   "), None);
        assert_eq!(sanitize_token("a.b_c-1").as_deref(), Some("a.b_c-1"));
        assert_eq!(sanitize_token("ü$x").as_deref(), Some("--x"));
    }

    #[test]
    fn test_search_roots_only_existing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("plugins")).unwrap();
        fs::create_dir_all(dir.path().join("vendor/folio")).unwrap();

        let mut config = FolioConfig::default();
        config.paths.base_path = dir.path().to_path_buf();
        config.plugins.vendor_namespaces = vec!["folio".into(), " ".into(), "missing".into()];
        let paths = Paths::from_config(&config);

        assert_eq!(
            paths.plugin_search_roots(),
            vec![dir.path().join("plugins"), dir.path().join("vendor/folio")]
        );
        assert!(paths.theme_search_roots().is_empty());
    }
}
