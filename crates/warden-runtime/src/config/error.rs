//! Configuration loading errors.
//!
//! Distinct from [`ConfigurationError`](warden_auth::ConfigurationError),
//! which reports an inconsistent access model. These errors concern the
//! `config.toml` files and `WARDEN_*` variables only.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use warden_types::ErrorCode;

/// Filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    /// Reading a config file.
    Read,
    /// Writing a config file.
    Write,
    /// Creating the config directory.
    CreateDir,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::CreateDir => "create directory",
        })
    }
}

/// Failure to load or save a [`WardenConfig`](super::WardenConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A filesystem operation failed.
    #[error("failed to {op} '{path}': {source}")]
    Io {
        op: FileOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML for [`WardenConfig`](super::WardenConfig).
    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A `WARDEN_*` variable holds a value of the wrong shape.
    #[error("environment variable {name}={value:?} is not a valid {expected}")]
    InvalidEnvVar {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn io(op: FileOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io {
                op: FileOp::Read, ..
            } => "CONFIG_READ_FILE",
            Self::Io {
                op: FileOp::Write, ..
            } => "CONFIG_WRITE_FILE",
            Self::Io {
                op: FileOp::CreateDir,
                ..
            } => "CONFIG_CREATE_DIR",
            Self::Parse { .. } => "CONFIG_PARSE_TOML",
            Self::Serialize(_) => "CONFIG_SERIALIZE",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
        }
    }

    /// Filesystem failures may clear up (permissions, a missing mount);
    /// malformed content will not.
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
