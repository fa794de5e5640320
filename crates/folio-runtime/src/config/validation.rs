//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{FolioConfig, LogOutput, LoggingConfig, PathsConfig, PluginsConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &FolioConfig) -> ConfigResult<()> {
    validate_paths_config(&config.paths)?;
    validate_plugins_config(&config.plugins)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_paths_config(paths: &PathsConfig) -> ConfigResult<()> {
    if paths.base_path.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("paths.base_path"));
    }

    for (field, value) in [
        ("paths.plugins_dir", &paths.plugins_dir),
        ("paths.themes_dir", &paths.themes_dir),
        ("paths.cache_dir", &paths.cache_dir),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::missing_field(field));
        }
    }

    Ok(())
}

fn validate_plugins_config(plugins: &PluginsConfig) -> ConfigResult<()> {
    let key = plugins.cache_key.trim();
    if key.is_empty() {
        return Err(ConfigError::missing_field("plugins.cache_key"));
    }
    if key.contains(['/', '\\']) {
        return Err(ConfigError::validation(format!(
            "Cache key must be a file stem, not a path: {key}"
        )));
    }

    if plugins.vendor_namespaces.iter().any(|ns| ns.trim().is_empty()) {
        return Err(ConfigError::validation(
            "Vendor namespaces cannot be blank",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Log filter module cannot be blank: {module:?}"
        )));
    }

    Ok(())
}
