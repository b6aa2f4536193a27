// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Error types for loading and rewriting catalog files.

use std::path::PathBuf;

/// A catalog or translation file could not be loaded.
///
/// A file that does not exist is never an error; loaders return an empty
/// catalog for it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file exists but could not be read.
    #[error("failed to read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The YAML content does not match the expected shape.
    #[error("failed to parse YAML in \"{}\": {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// The JSON content does not match the expected shape.
    #[error("failed to parse JSON in \"{}\": {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A rewritten rules file could not be persisted.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The document could not be serialised back to YAML.
    #[error("failed to serialise rules: {0}")]
    Serialize(#[from] serde_yaml::Error),
    /// The temporary file could not be written or renamed over the target.
    #[error("failed to write \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
