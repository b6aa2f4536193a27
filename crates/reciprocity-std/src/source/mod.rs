// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! File-backed catalog sources.

pub mod file;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Extensions tried, in order, when a catalog is looked up by stem.
pub const EXTENSIONS: [&str; 3] = ["yml", "yaml", "json"];

/// Serialization format of a data file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` is JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// First existing `<dir>/<stem>.<ext>` for the known extensions.
pub fn find_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Read and parse `path`.  Returns `Ok(None)` when the file does not exist
/// or holds nothing but whitespace.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LoadError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "data file absent; treating as empty");
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_document(path, &raw).map(Some)
}

/// Parse `raw` in the format implied by `path`.
pub fn parse_document<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T, LoadError> {
    match Format::from_path(path) {
        Format::Json => serde_json::from_str(raw).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Format::Yaml => serde_yaml::from_str(raw).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}
