// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Editable view of `rules.yml` for the acquisition tool.
//!
//! [`RulesFile`] keeps the document as a raw YAML tree so that fields this
//! crate does not model survive a rewrite untouched.  Updates only ever set
//! `application_url` and `detail_note`; nothing is removed.  [`RulesFile::save`]
//! writes nothing unless an update actually changed a value, and then
//! replaces the file atomically (write-rename) so a crash mid-write never
//! leaves a partial document.

use std::path::{Path, PathBuf};

use reciprocity_core::types::{BilateralRule, LocalizedText};
use serde_yaml::{Mapping, Value};

use crate::error::{LoadError, WriteError};

/// Fields to set on one rule.  `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleUpdate {
    pub application_url: Option<String>,
    pub detail_note: Option<LocalizedText>,
}

impl RuleUpdate {
    /// `true` when there is nothing to set.
    pub fn is_empty(&self) -> bool {
        self.application_url.is_none() && self.detail_note.as_ref().map_or(true, LocalizedText::is_empty)
    }
}

/// A `rules.yml` document loaded for editing.
///
/// # Examples
///
/// ```rust,no_run
/// use reciprocity_std::rules_file::{RuleUpdate, RulesFile};
///
/// let mut file = RulesFile::open("_data/rules.yml").expect("rules file is readable");
/// for index in 0..file.len() {
///     file.apply(index, &RuleUpdate {
///         application_url: Some("https://example.org/apply".into()),
///         ..RuleUpdate::default()
///     });
/// }
/// file.save().expect("rules file is writable");
/// ```
#[derive(Debug)]
pub struct RulesFile {
    path: PathBuf,
    document: Value,
    dirty: bool,
}

impl RulesFile {
    /// Open `path` for editing.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be read or is not YAML.
    /// Unlike the catalog loaders, a missing file is an error here.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let document = if raw.trim().is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            serde_yaml::from_str(&raw).map_err(|source| LoadError::Yaml {
                path: path.clone(),
                source,
            })?
        };
        Ok(Self { path, document, dirty: false })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries under `rules`.
    pub fn len(&self) -> usize {
        self.entries().map_or(0, Vec::len)
    }

    /// `true` when there are no rules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed view of rule `index`.  `None` if out of range or malformed.
    pub fn rule(&self, index: usize) -> Option<BilateralRule> {
        let entry = self.entries()?.get(index)?;
        match serde_yaml::from_value(entry.clone()) {
            Ok(rule) => Some(rule),
            Err(error) => {
                tracing::warn!(index, %error, "rule entry does not parse; skipped");
                None
            }
        }
    }

    /// Set the fields named by `update` on rule `index`.  Returns `true` when
    /// a value changed.
    pub fn apply(&mut self, index: usize, update: &RuleUpdate) -> bool {
        let Some(Value::Mapping(entry)) = self.entries_mut().and_then(|rules| rules.get_mut(index)) else {
            return false;
        };

        let mut changed = false;
        if let Some(url) = &update.application_url {
            changed |= set_field(entry, "application_url", Value::String(url.clone()));
        }
        if let Some(note) = update.detail_note.as_ref().filter(|note| !note.is_empty()) {
            match serde_yaml::to_value(note) {
                Ok(value) => changed |= set_field(entry, "detail_note", value),
                Err(error) => tracing::warn!(index, %error, "detail note does not serialise; skipped"),
            }
        }

        self.dirty |= changed;
        changed
    }

    /// `true` when an [`apply`](Self::apply) call changed something since
    /// the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document back if it changed.  Returns whether a write
    /// happened.
    ///
    /// The file is written to `<path>.tmp` first, then renamed over the
    /// target.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if serialisation fails or the file cannot be
    /// written or renamed.
    pub fn save(&mut self) -> Result<bool, WriteError> {
        if !self.dirty {
            tracing::debug!(path = %self.path.display(), "rules unchanged; not writing");
            return Ok(false);
        }

        let yaml = serde_yaml::to_string(&self.document)?;
        let tmp_path = self.path.with_extension("tmp");
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| WriteError::Io { path, source }
        };
        std::fs::write(&tmp_path, yaml).map_err(io_error(&tmp_path))?;
        std::fs::rename(&tmp_path, &self.path).map_err(io_error(&self.path))?;

        self.dirty = false;
        tracing::info!(path = %self.path.display(), "rules written");
        Ok(true)
    }

    fn entries(&self) -> Option<&Vec<Value>> {
        self.document.get("rules")?.as_sequence()
    }

    fn entries_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.document.get_mut("rules")?.as_sequence_mut()
    }
}

fn set_field(entry: &mut Mapping, key: &str, value: Value) -> bool {
    let key = Value::String(key.to_owned());
    if entry.get(&key) == Some(&value) {
        return false;
    }
    entry.insert(key, value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RULES: &str = "\
rules:
  - home: japan
    target: germany
    allowed_home_classes: [1]
    curator: keep-me
  - home: japan
    target: france
    application_url: https://example.org/fr
";

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yml");
        fs::write(&path, RULES).unwrap();
        (dir, path)
    }

    #[test]
    fn typed_view_reads_rules() {
        let (_dir, path) = fixture();
        let file = RulesFile::open(&path).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.rule(0).unwrap().allowed_home_classes, ["1"]);
        assert_eq!(file.rule(1).unwrap().application_url.as_deref(), Some("https://example.org/fr"));
        assert!(file.rule(2).is_none());
    }

    #[test]
    fn unchanged_document_is_not_written() {
        let (_dir, path) = fixture();
        let mut file = RulesFile::open(&path).unwrap();
        let same = RuleUpdate {
            application_url: Some("https://example.org/fr".into()),
            ..RuleUpdate::default()
        };
        assert!(!file.apply(1, &same));
        assert!(!file.save().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), RULES);
    }

    #[test]
    fn update_is_persisted_and_unknown_fields_survive() {
        let (dir, path) = fixture();
        let mut file = RulesFile::open(&path).unwrap();
        let update = RuleUpdate {
            application_url: Some("https://example.org/de".into()),
            detail_note: Some(LocalizedText::new().with("en", "Apply early.").with("ja", "早めに申請")),
        };
        assert!(file.apply(0, &update));
        assert!(file.save().unwrap());
        assert!(!dir.path().join("rules.tmp").exists());

        let reread = RulesFile::open(&path).unwrap();
        let rule = reread.rule(0).unwrap();
        assert_eq!(rule.application_url.as_deref(), Some("https://example.org/de"));
        assert_eq!(rule.detail_note.get("ja"), Some("早めに申請"));
        assert!(fs::read_to_string(&path).unwrap().contains("curator: keep-me"));
    }

    #[test]
    fn out_of_range_and_empty_updates_are_no_ops() {
        let (_dir, path) = fixture();
        let mut file = RulesFile::open(&path).unwrap();
        assert!(RuleUpdate::default().is_empty());
        assert!(!file.apply(5, &RuleUpdate { application_url: Some("x".into()), ..RuleUpdate::default() }));
        assert!(!file.apply(0, &RuleUpdate { detail_note: Some(LocalizedText::new()), ..RuleUpdate::default() }));
        assert!(!file.is_dirty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(RulesFile::open(dir.path().join("rules.yml")), Err(LoadError::Io { .. })));
    }
}
