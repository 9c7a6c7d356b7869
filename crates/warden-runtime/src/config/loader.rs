//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.warden/config.toml`)
//! 3. Project config (`<root>/.warden/config.toml`)
//! 4. Environment variables (`WARDEN_*`)
//!
//! Each layer overrides the previous for the keys it sets, including keys
//! set back to their default value.

use super::error::FileOp;
use super::{
    default_config_path, ConfigError, ConfigLayer, WardenConfig, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides a bool field from an environment variable, if set.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val).ok_or_else(|| ConfigError::InvalidEnvVar {
                name: $var,
                value: val.clone(),
                expected: "bool",
            })?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use warden_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), warden_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.warden/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip global config loading.
    skip_global: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.warden/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be read
    /// or parsed, or if a `WARDEN_*` variable holds an invalid value.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<WardenConfig, ConfigError> {
        let mut config = WardenConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global) = load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.apply(&global);
            }
        }

        if let Some(ref root) = self.project_root {
            let project_path = root.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILE);

            if let Some(project) = load_file(&project_path)? {
                debug!(
                    path = %project_path.display(),
                    project = %root.display(),
                    "Loaded project config"
                );
                config.apply(&project);
            }
        }

        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        Ok(config)
    }
}

/// Loads a config file, returning None if it doesn't exist.
fn load_file(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(FileOp::Read, path, e))?;
    let layer = ConfigLayer::from_toml(&content).map_err(|e| ConfigError::parse(path, e))?;

    Ok(Some(layer))
}

/// Applies `WARDEN_*` overrides.
fn apply_env_vars(config: &mut WardenConfig) -> Result<(), ConfigError> {
    parse_env_bool!(config.enforcement.enabled, "WARDEN_ENFORCE");
    parse_env_bool!(
        config.enforcement.permissive_unresolved_identity,
        "WARDEN_PERMISSIVE_IDENTITY"
    );
    parse_env_bool!(config.events.enabled, "WARDEN_EMIT_EVENTS");
    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Writes a config to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be serialized or written.
pub fn save_config(config: &WardenConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(FileOp::CreateDir, parent, e))?;
        }
    }

    let toml = config.to_toml()?;
    std::fs::write(path, toml).map_err(|e| ConfigError::io(FileOp::Write, path, e))?;
    debug!(path = %path.display(), "Saved config");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config, WardenConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().expect("tempdir");
        let path = create_config_file(
            temp.path(),
            r#"
[enforcement]
enabled = false

[events]
enabled = true
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&path)
            .skip_env_vars()
            .load()
            .expect("load");

        assert!(!config.enforcement.enabled);
        assert!(config.events.enabled);
    }

    #[test]
    fn load_project_overrides_global() {
        let global_temp = TempDir::new().expect("tempdir");
        let project_temp = TempDir::new().expect("tempdir");

        let warden_dir = project_temp.path().join(".warden");
        std::fs::create_dir_all(&warden_dir).expect("mkdir");

        let global_path = create_config_file(
            global_temp.path(),
            r#"
[events]
enabled = true

[resolver]
skip_modules = ["global_harness"]
"#,
        );

        create_config_file(
            &warden_dir,
            r#"
[resolver]
skip_modules = ["project_harness"]
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .expect("load");

        // events from global (not overridden in project)
        assert!(config.events.enabled);
        // resolver from project (overrides global)
        assert_eq!(config.resolver.skip_modules, vec!["project_harness".to_string()]);
    }

    #[test]
    fn project_restores_default_disabled_globally() {
        let global_temp = TempDir::new().expect("tempdir");
        let project_temp = TempDir::new().expect("tempdir");

        let warden_dir = project_temp.path().join(".warden");
        std::fs::create_dir_all(&warden_dir).expect("mkdir");

        let global_path = create_config_file(
            global_temp.path(),
            r#"
[enforcement]
enabled = false
permissive_unresolved_identity = false
"#,
        );
        create_config_file(
            &warden_dir,
            r#"
[enforcement]
enabled = true
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .expect("load");

        assert!(config.enforcement.enabled);
        // untouched by the project file
        assert!(!config.enforcement.permissive_unresolved_identity);
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config, WardenConfig::default());
    }

    #[test]
    fn invalid_toml_is_error() {
        let temp = TempDir::new().expect("tempdir");
        let path = create_config_file(temp.path(), "[enforcement\nenabled = ");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_env_vars()
            .load()
            .expect_err("parse error");

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");

        let mut config = WardenConfig::default();
        config.enforcement.permissive_unresolved_identity = false;
        save_config(&config, &path).expect("save");

        let loaded = ConfigLoader::new()
            .with_global_config(&path)
            .skip_env_vars()
            .load()
            .expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool(" yes "), Some(true));
        assert_eq!(parse_bool("on"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));

        assert_eq!(parse_bool("invalid"), None);
    }

    #[test]
    fn env_var_override() {
        // Only this test touches WARDEN_* variables
        std::env::set_var("WARDEN_ENFORCE", "false");
        std::env::set_var("WARDEN_EMIT_EVENTS", "yes");

        let result = ConfigLoader::new().skip_global_config().load();

        std::env::set_var("WARDEN_PERMISSIVE_IDENTITY", "maybe");
        let invalid = ConfigLoader::new().skip_global_config().load();

        std::env::remove_var("WARDEN_ENFORCE");
        std::env::remove_var("WARDEN_EMIT_EVENTS");
        std::env::remove_var("WARDEN_PERMISSIVE_IDENTITY");

        let config = result.expect("load");
        assert!(!config.enforcement.enabled);
        assert!(config.events.enabled);

        let err = invalid.expect_err("invalid bool");
        assert!(err.to_string().contains("WARDEN_PERMISSIVE_IDENTITY"));
    }
}
