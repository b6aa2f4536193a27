// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Translation table loading.
//!
//! Two layouts are supported:
//!
//! * a single file holding the full `locale → path → text` tree
//!   ([`load_translations`]);
//! * a directory of `<locale>.yml` files, each holding the tree for one
//!   locale ([`load_translation_dir`]), as static site generators lay out
//!   their `_data/i18n` folder.
//!
//! Both return only what is on disk.  Overlay the result on the built-in
//! table with `ReciprocityEngine::with_translations` or
//! `TranslationTable::merge`.

use std::path::Path;

use reciprocity_core::composer::TranslationTable;
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::source::{read_document, EXTENSIONS};

/// Load a full translation tree from `path`.  A missing file yields an
/// empty table.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file exists but cannot be read or parsed.
pub fn load_translations<P: AsRef<Path>>(path: P) -> Result<TranslationTable, LoadError> {
    let value: Option<Value> = read_document(path.as_ref())?;
    Ok(value.map(TranslationTable::from_value).unwrap_or_default())
}

/// Load every `<locale>.{yml,yaml,json}` file in `dir`, nesting each tree
/// under its file stem.  Files are read in name order so the result does
/// not depend on directory iteration order.
///
/// # Errors
///
/// Returns a [`LoadError`] if the directory or any matching file cannot be
/// read or parsed.
pub fn load_translation_dir<P: AsRef<Path>>(dir: P) -> Result<TranslationTable, LoadError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(TranslationTable::new());
    }

    let io_error = |source| LoadError::Io { path: dir.to_path_buf(), source };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let known = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)));
        if known && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut root = Map::new();
    for path in files {
        let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        match read_document::<Value>(&path)? {
            Some(tree @ Value::Object(_)) => {
                root.insert(locale.to_owned(), tree);
            }
            Some(_) => tracing::warn!(path = %path.display(), "translation file is not a mapping; skipped"),
            None => {}
        }
    }

    tracing::debug!(locales = root.len(), dir = %dir.display(), "translations loaded");
    Ok(TranslationTable::from_value(Value::Object(root)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn single_file_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i18n.yml");
        fs::write(&path, "de:\n  result:\n    domestic: Inlandsbetrieb.\n").unwrap();

        let table = load_translations(&path).unwrap();
        assert_eq!(table.lookup("de", "result.domestic", None), "Inlandsbetrieb.");
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_translations(dir.path().join("absent.yml")).unwrap();
        assert_eq!(table.locales().count(), 0);
    }

    #[test]
    fn directory_of_locales() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fr.yml"), "result:\n  domestic: Opération nationale.\n").unwrap();
        fs::write(dir.path().join("ko.json"), r#"{"result": {"domestic": "국내 운용입니다."}}"#).unwrap();
        fs::write(dir.path().join("README.md"), "not a locale").unwrap();
        fs::write(dir.path().join("xx.yml"), "- a list\n").unwrap();

        let table = load_translation_dir(dir.path()).unwrap();
        assert_eq!(table.lookup("fr-CA", "result.domestic", None), "Opération nationale.");
        assert_eq!(table.lookup("ko", "result.domestic", None), "국내 운용입니다.");
        let mut locales: Vec<&str> = table.locales().collect();
        locales.sort_unstable();
        assert_eq!(locales, ["fr", "ko"]);
    }

    #[test]
    fn overlay_on_builtin_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en.yml"), "station:\n  required: Station license needed.\n").unwrap();

        let mut table = TranslationTable::builtin();
        table.merge(load_translation_dir(dir.path()).unwrap());
        assert_eq!(table.lookup("en", "station.required", None), "Station license needed.");
        assert_eq!(table.lookup("en", "result.domestic", None), "Domestic operation.");
    }
}
