//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers. Every
/// section is optional in a config file.
///
/// # Example
///
/// ```
/// use warden_runtime::config::WardenConfig;
///
/// let config = WardenConfig::default();
/// assert!(config.enforcement.enabled);
/// assert!(config.enforcement.permissive_unresolved_identity);
/// assert!(!config.events.enabled);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WardenConfig {
    /// Access enforcement settings.
    pub enforcement: EnforcementConfig,

    /// Observability event settings.
    pub events: EventsConfig,

    /// Caller identity resolution settings.
    pub resolver: ResolverConfig,
}

impl WardenConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Applies every value a file layer sets, leaving the rest unchanged.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        let e = &layer.enforcement;
        if let Some(enabled) = e.enabled {
            self.enforcement.enabled = enabled;
        }
        if let Some(permissive) = e.permissive_unresolved_identity {
            self.enforcement.permissive_unresolved_identity = permissive;
        }
        if let Some(enabled) = layer.events.enabled {
            self.events.enabled = enabled;
        }
        if let Some(functions) = &layer.resolver.skip_functions {
            self.resolver.skip_functions = functions.clone();
        }
        if let Some(modules) = &layer.resolver.skip_modules {
            self.resolver.skip_modules = modules.clone();
        }
    }
}

/// One config file as written: only the keys it actually sets.
///
/// Layering applies layers in order with [`WardenConfig::apply`], so a
/// later file can restore a default value an earlier file changed.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigLayer {
    /// `[enforcement]` keys.
    pub enforcement: EnforcementLayer,
    /// `[events]` keys.
    pub events: EventsLayer,
    /// `[resolver]` keys.
    pub resolver: ResolverLayer,
}

impl ConfigLayer {
    /// Parses one file's contents.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or a key has the wrong type.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// Keys of `[enforcement]` set by one layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnforcementLayer {
    pub enabled: Option<bool>,
    pub permissive_unresolved_identity: Option<bool>,
}

/// Keys of `[events]` set by one layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventsLayer {
    pub enabled: Option<bool>,
}

/// Keys of `[resolver]` set by one layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverLayer {
    pub skip_functions: Option<Vec<String>>,
    pub skip_modules: Option<Vec<String>>,
}

/// Access enforcement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnforcementConfig {
    /// Check access before running guarded members.
    ///
    /// When `false`, every guarded call proceeds unchecked.
    pub enabled: bool,

    /// Treat an unresolved caller as the receiver's own type.
    pub permissive_unresolved_identity: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permissive_unresolved_identity: true,
        }
    }
}

/// Observability event configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventsConfig {
    /// Emit access and registration events.
    pub enabled: bool,
}

/// Caller identity resolution configuration.
///
/// Frames matching these lists are never reported as the caller. Function
/// names match free frames only; member frames always report themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Free-function frame names to skip.
    pub skip_functions: Vec<String>,

    /// Module path prefixes to skip (`a::b` also skips `a::b::c`).
    pub skip_modules: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            skip_functions: vec![
                "invoke".into(),
                "invoke_resolved".into(),
                "dispatch".into(),
            ],
            skip_modules: vec!["warden_runtime".into()],
        }
    }
}
