// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`ReciprocityEngine`](crate::engine::ReciprocityEngine).
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file into
//!    a [`ReciprocityConfig`] struct.
//! 2. **Environment variables** — [`load_config_from_env`] reads
//!    `RECIPROCITY_`-prefixed environment variables.
//!
//! Both loaders are only available with the `config-loader` feature.
//!
//! # File format
//!
//! ```toml
//! condition_match = "substring"   # "substring" | "exact"
//! default_locale  = "en"
//! data_dir        = "_data"
//! ```
//!
//! # Environment variables
//!
//! | Variable                       | Type   | Default       |
//! |--------------------------------|--------|---------------|
//! | `RECIPROCITY_CONDITION_MATCH`  | string | "substring"   |
//! | `RECIPROCITY_DEFAULT_LOCALE`   | string | "en"          |
//! | `RECIPROCITY_DATA_DIR`         | path   | unset         |

// "config-loader" implies "std", so std facilities are always available here.
#![cfg(feature = "config-loader")]

use std::fs;

use serde::{Deserialize, Serialize};

use crate::config::{ConditionMatch, Config};
use crate::types::FALLBACK_LOCALE;

// ---------------------------------------------------------------------------
// ReciprocityConfig
// ---------------------------------------------------------------------------

/// Flat, file-friendly configuration.
///
/// Distinct from the engine-internal [`Config`]: it also names where the
/// catalog files live, which the engine itself never reads.  Convert with
/// [`Into<Config>`] after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReciprocityConfig {
    /// Treaty condition matching mode.
    #[serde(default)]
    pub condition_match: ConditionMatch,

    /// Locale used when a caller does not name one.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Directory holding `countries.yml`, `treaties.yml`, `licenses.yml`
    /// and `rules.yml`.
    #[serde(default)]
    pub data_dir: Option<String>,
}

fn default_locale() -> String {
    FALLBACK_LOCALE.into()
}

impl Default for ReciprocityConfig {
    fn default() -> Self {
        Self {
            condition_match: ConditionMatch::default(),
            default_locale:  default_locale(),
            data_dir:        None,
        }
    }
}

impl From<ReciprocityConfig> for Config {
    fn from(config: ReciprocityConfig) -> Self {
        Config {
            condition_match: config.condition_match,
            default_locale:  config.default_locale,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required file could not be opened.
    #[error("failed to read config file \"{path}\": {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The TOML content could not be deserialised.
    #[error("failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// A field could not be parsed to its expected type.
    #[error("field \"{field}\": cannot parse \"{value}\": {reason}")]
    ParseField { field: String, value: String, reason: String },
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load a [`ReciprocityConfig`] from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or if the TOML
/// content does not match the expected schema.
///
/// # Example
///
/// ```rust,no_run
/// use reciprocity_core::config_loader::load_config;
///
/// let config = load_config("/etc/reciprocity/config.toml").unwrap();
/// println!("matching: {}", config.condition_match.as_str());
/// ```
pub fn load_config(path: &str) -> Result<ReciprocityConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;
    parse_config(&content)
}

/// Parse TOML text into a [`ReciprocityConfig`].  Missing keys take their
/// defaults.
pub fn parse_config(content: &str) -> Result<ReciprocityConfig, ConfigError> {
    Ok(toml::from_str::<ReciprocityConfig>(content)?)
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load a [`ReciprocityConfig`] from `RECIPROCITY_`-prefixed environment
/// variables.  Unset or empty variables fall back to their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::ParseField`] if `RECIPROCITY_CONDITION_MATCH` is
/// set to anything other than `substring` or `exact`.
pub fn load_config_from_env() -> Result<ReciprocityConfig, ConfigError> {
    load_config_from_vars(|key| std::env::var(key).ok())
}

/// Same as [`load_config_from_env`], reading variables through `lookup`.
pub fn load_config_from_vars<F>(lookup: F) -> Result<ReciprocityConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).map(|val| val.trim().to_owned()).filter(|val| !val.is_empty());

    let condition_match = match read("RECIPROCITY_CONDITION_MATCH") {
        Some(val) => parse_condition_match(&val)?,
        None => ConditionMatch::default(),
    };

    Ok(ReciprocityConfig {
        condition_match,
        default_locale: read("RECIPROCITY_DEFAULT_LOCALE").unwrap_or_else(default_locale),
        data_dir: read("RECIPROCITY_DATA_DIR"),
    })
}

fn parse_condition_match(val: &str) -> Result<ConditionMatch, ConfigError> {
    match val.to_ascii_lowercase().as_str() {
        "substring" => Ok(ConditionMatch::Substring),
        "exact"     => Ok(ConditionMatch::Exact),
        other => Err(ConfigError::ParseField {
            field: "RECIPROCITY_CONDITION_MATCH".into(),
            value: other.into(),
            reason: "expected one of: substring, exact".into(),
        }),
    }
}
