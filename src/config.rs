//! Configuration System
//!
//! Layered configuration for embedding applications. Sources, lowest to
//! highest precedence: built-in defaults, an optional TOML file, then
//! `PCD_COLLECTION__*` environment variables (`__` separates nesting, so
//! `PCD_COLLECTION__DESERIALIZE__FALLBACK=wrap_unknown`).

use crate::error::CollectionError;
use crate::logging::LoggingConfig;
use crate::package::VerifyBehavior;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "PCD_COLLECTION";
const ENV_SEPARATOR: &str = "__";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub unknown_pcd: UnknownPcdConfig,

    #[serde(default)]
    pub deserialize: DeserializeConfig,
}

/// Treatment of unknown-record sentinels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownPcdConfig {
    #[serde(default)]
    pub verify_behavior: VerifyBehavior,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeserializeConfig {
    #[serde(default)]
    pub fallback: FallbackMode,
}

/// What happens to a record that cannot be deserialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Fail the load
    #[default]
    Reject,
    /// Keep the record as an unknown-record sentinel
    WrapUnknown,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CollectionConfig {
    /// Validate the entire configuration
    ///
    /// Enum-typed settings are already checked while deserializing; this
    /// covers the free-form logging strings.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Builds a [`CollectionConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, then `path` if given, then the environment
    ///
    /// A `path` that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<CollectionConfig, CollectionError> {
        let mut builder = builder_with_defaults()?;
        if let Some(path) = path {
            if !path.exists() {
                return Err(CollectionError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        build_validated(builder)
    }

    /// Load a single file without consulting the environment
    pub fn load_from_file(path: &Path) -> Result<CollectionConfig, CollectionError> {
        build_validated(builder_with_defaults()?.add_source(File::from(path).required(true)))
    }
}

fn build_validated(
    builder: ConfigBuilder<DefaultState>,
) -> Result<CollectionConfig, CollectionError> {
    let config: CollectionConfig = builder.build()?.try_deserialize()?;
    config.validate().map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        CollectionError::ConfigError(messages.join("; "))
    })?;
    Ok(config)
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stdout")?
        .set_default("unknown_pcd.verify_behavior", "error")?
        .set_default("deserialize.fallback", "reject")
}
