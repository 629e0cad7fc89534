//! Configuration loading.
//!
//! Resolution order, lowest to highest precedence:
//! 1. Built-in defaults (`BOOKNAV_FETCH_TIMEOUT_MS` adjusts the default
//!    fetch timeout)
//! 2. `booknav.yaml` in the site root, or the file given with `--config`
//! 3. Command-line flags, applied by the caller

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::schema::SiteConfig;
use crate::error::ConfigError;

/// Config file looked up in the site root when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "booknav.yaml";

/// Default fetch timeout, overridable through `BOOKNAV_FETCH_TIMEOUT_MS`.
#[must_use]
pub fn default_fetch_timeout() -> Duration {
    Duration::from_millis(env_or("BOOKNAV_FETCH_TIMEOUT_MS", 10_000))
}

/// Loads the site configuration.
///
/// An explicit path must exist. Without one, `booknav.yaml` in `site_root`
/// is used when present, otherwise the defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing (explicit path only),
/// unparseable, or fails validation.
pub fn resolve(site_root: &Path, explicit: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    if let Some(path) = explicit {
        return load(path);
    }

    let candidate = site_root.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        load(&candidate)
    } else {
        debug!(path = %candidate.display(), "no site config, using defaults");
        Ok(SiteConfig::default())
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns `ConfigError::MissingFile` if the file cannot be read,
/// `ConfigError::ParseError` for malformed or empty YAML, and
/// `ConfigError::InvalidValue` for validation failures.
pub fn load(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    if content.trim().is_empty() {
        return Err(parse_error(path, None, "Configuration file is empty"));
    }

    let config: SiteConfig = serde_yaml::from_str(content)
        .map_err(|e| parse_error(path, e.location().map(|l| l.line()), &e.to_string()))?;

    validate(&config)?;
    info!(path = %path.display(), roots = config.roots.len(), "loaded site config");
    Ok(config)
}

fn parse_error(path: &Path, line: Option<usize>, message: &str) -> ConfigError {
    ConfigError::ParseError {
        path: PathBuf::from(path),
        line,
        message: message.to_string(),
    }
}

/// Checks invariants serde cannot express.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for the first violation found.
pub fn validate(config: &SiteConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (i, root) in config.roots.iter().enumerate() {
        if root.id.trim().is_empty() {
            return Err(invalid(&format!("roots[{i}].id"), "", "a non-empty id"));
        }
        if !seen.insert(root.id.as_str()) {
            return Err(invalid(&format!("roots[{i}].id"), &root.id, "a unique id"));
        }
        if root.path.as_deref().is_some_and(|p| Path::new(p).is_absolute()) {
            return Err(invalid(
                &format!("roots[{i}].path"),
                root.path.as_deref().unwrap_or_default(),
                "a path relative to the site root",
            ));
        }
    }

    if config.extensions.is_empty() {
        return Err(invalid("extensions", "[]", "at least one extension"));
    }
    if let Some(ext) = config
        .extensions
        .iter()
        .find(|e| e.is_empty() || !e.chars().all(|c| c.is_ascii_alphanumeric()))
    {
        return Err(invalid("extensions", ext, "an alphanumeric extension without a leading dot"));
    }
    if config.chapters_dir.is_empty() || config.chapters_dir.contains(['/', '\\']) {
        return Err(invalid("chapters_dir", &config.chapters_dir, "a single directory name"));
    }
    if !is_identifier(&config.binding) {
        return Err(invalid("binding", &config.binding, "a JavaScript identifier"));
    }
    if config.content_class.trim().is_empty() {
        return Err(invalid("content_class", "", "a non-empty class name"));
    }
    if config.fetch_timeout.is_zero() {
        return Err(invalid("fetch_timeout", "0s", "a non-zero duration"));
    }
    if config.contributors.cache_ttl.is_zero() {
        return Err(invalid("contributors.cache_ttl", "0s", "a non-zero duration"));
    }
    Ok(())
}

fn invalid(field: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Reads an environment variable, falling back to `default` when unset or
/// unparseable.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
