//! Error types for the alias domain

use crate::value::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable misuse of a [`Value`] or [`crate::AliasDomain`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("expected a register, found {0}")]
    NotARegister(Value),

    #[error("alias state is unreachable (bottom)")]
    Unreachable,
}

/// Failure to load a [`crate::CopyPropConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid copy-propagation config: {0}")]
    Parse(#[from] toml::de::Error),
}
