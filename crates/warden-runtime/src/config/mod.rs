//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. Environment Variables (WARDEN_*)      │  Runtime override
//! ├───────────────────────────────────────────┤
//! │  2. Project Config (.warden/config.toml)  │  Project-specific
//! ├───────────────────────────────────────────┤
//! │  3. Global Config (~/.warden/config.toml) │  User defaults
//! ├───────────────────────────────────────────┤
//! │  4. Default Values (compile-time)         │  Fallback
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `WARDEN_ENFORCE` | `enforcement.enabled` | bool |
//! | `WARDEN_PERMISSIVE_IDENTITY` | `enforcement.permissive_unresolved_identity` | bool |
//! | `WARDEN_EMIT_EVENTS` | `events.enabled` | bool |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.warden/config.toml
//!
//! [enforcement]
//! enabled = true
//! permissive_unresolved_identity = false
//!
//! [events]
//! enabled = true
//!
//! [resolver]
//! skip_functions = ["invoke", "invoke_resolved", "dispatch", "run_case"]
//! skip_modules = ["warden_runtime", "harness"]
//! ```

mod error;
mod loader;
mod types;

pub use error::{ConfigError, FileOp};
pub use loader::{save_config, ConfigLoader};
pub use types::{
    ConfigLayer, EnforcementConfig, EnforcementLayer, EventsConfig, EventsLayer, ResolverConfig, ResolverLayer,
    WardenConfig,
};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join(PROJECT_CONFIG_FILE)
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".warden";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
