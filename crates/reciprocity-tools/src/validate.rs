// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Offline referential-integrity checks for `licenses.yml` and `rules.yml`.
//!
//! The resolver never fails on inconsistent data; it degrades to
//! `DataMissing` or `Denied`.  This module is where inconsistencies are
//! caught instead, before the data is published.
//!
//! Rules are read loosely (any scalar id, optional fields, `links` of any
//! shape) so that a malformed entry becomes a reported error rather than a
//! parse failure of the whole file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reciprocity_core::types::LicenseRecord;
use reciprocity_std::source::read_document;
use reciprocity_std::LoadError;
use serde::Deserialize;
use serde_yaml::Value;

use crate::exit;

/// One rule as written, before any typing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleEntry {
    #[serde(default)]
    pub home: Option<Value>,
    #[serde(default)]
    pub target: Option<Value>,
    #[serde(default)]
    pub allowed_home_classes: Option<Vec<Value>>,
    #[serde(default)]
    pub links: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RuleEntries {
    #[serde(default)]
    rules: Option<Vec<RuleEntry>>,
}

/// A single integrity problem.  `index` is the rule's position in the file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("rule[{index}]: missing home or target")]
    MissingEndpoint { index: usize },

    #[error("rule[{index}]: home country '{home}' not found in the license catalog")]
    UnknownHome { index: usize, home: String },

    #[error(
        "rule[{index}]: allowed_home_classes contains '{class}' which is not defined for home='{home}' in the license catalog"
    )]
    UnknownClass { index: usize, home: String, class: String },

    #[error("rule[{index}].links[{link}]: invalid url '{url}'")]
    InvalidUrl { index: usize, link: usize, url: String },

    #[error("rule[{index}].links[{link}]: url parse error '{url}': {reason}")]
    UnparsableUrl { index: usize, link: usize, url: String, reason: String },
}

/// Render a YAML scalar the way a human wrote it: `1` and `"1"` are both
/// `"1"`.  Null, sequences and mappings have no scalar form.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Check every rule against the license catalog.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::types::{LicenseClassEntry, LicenseRecord};
/// use reciprocity_tools::validate::{validate, RuleEntry};
///
/// let licenses = vec![LicenseRecord {
///     id: "japan".into(),
///     classes: vec![LicenseClassEntry { id: "1".into(), ..Default::default() }],
/// }];
/// let rule = RuleEntry {
///     home: Some("japan".into()),
///     target: Some("germany".into()),
///     allowed_home_classes: Some(vec!["1".into(), "9".into()]),
///     ..RuleEntry::default()
/// };
///
/// let errors = validate(&licenses, &[rule]);
/// assert_eq!(errors.len(), 1);
/// assert!(errors[0].to_string().contains("'9'"));
/// ```
pub fn validate(licenses: &[LicenseRecord], rules: &[RuleEntry]) -> Vec<ValidationError> {
    let classes_by_country: HashMap<&str, Vec<&str>> = licenses
        .iter()
        .map(|record| {
            let classes = record.classes.iter().map(|class| class.id.as_str()).collect();
            (record.id.as_str(), classes)
        })
        .collect();

    let mut errors = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        let home = rule.home.as_ref().and_then(scalar_string);
        let target = rule.target.as_ref().and_then(scalar_string);
        let (Some(home), Some(_target)) = (home, target) else {
            errors.push(ValidationError::MissingEndpoint { index });
            continue;
        };

        let Some(known) = classes_by_country.get(home.as_str()) else {
            errors.push(ValidationError::UnknownHome { index, home });
            continue;
        };

        for class in rule.allowed_home_classes.iter().flatten() {
            let class = scalar_string(class).unwrap_or_default();
            if !known.contains(&class.as_str()) {
                errors.push(ValidationError::UnknownClass { index, home: home.clone(), class });
            }
        }

        if let Some(links) = rule.links.as_ref().and_then(Value::as_sequence) {
            for (link, entry) in links.iter().enumerate() {
                let url = entry.get("url").and_then(scalar_string).unwrap_or_default();
                if let Some(error) = check_url(index, link, &url) {
                    errors.push(error);
                }
            }
        }
    }
    errors
}

fn check_url(index: usize, link: usize, raw: &str) -> Option<ValidationError> {
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(_) => Some(ValidationError::InvalidUrl { index, link, url: raw.into() }),
        Err(error) => Some(ValidationError::UnparsableUrl {
            index,
            link,
            url: raw.into(),
            reason: error.to_string(),
        }),
    }
}

/// Read the license catalog.  `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file exists but cannot be read or parsed.
pub fn load_licenses(path: &Path) -> Result<Option<Vec<LicenseRecord>>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(read_document(path)?.unwrap_or_default()))
}

/// Read the rule table loosely.  `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file exists but cannot be read or parsed.
pub fn load_rules(path: &Path) -> Result<Option<Vec<RuleEntry>>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }
    let document: Option<RuleEntries> = read_document(path)?;
    Ok(Some(document.and_then(|document| document.rules).unwrap_or_default()))
}

/// Result of checking a pair of catalog files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    LicensesMissing(PathBuf),
    RulesMissing(PathBuf),
    Passed,
    Failed(Vec<ValidationError>),
}

impl Outcome {
    /// Process exit code reported by `validate-data`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Passed => exit::OK,
            Self::LicensesMissing(_) | Self::RulesMissing(_) => exit::MISSING_INPUT,
            Self::Failed(_) => exit::CHECK_FAILED,
        }
    }
}

/// Load both files and validate the rules against the licenses.  The
/// license catalog is checked for existence first.
///
/// # Errors
///
/// Returns a [`LoadError`] if either file exists but cannot be read or
/// parsed.
pub fn check_files(licenses: &Path, rules: &Path) -> Result<Outcome, LoadError> {
    let Some(license_records) = load_licenses(licenses)? else {
        return Ok(Outcome::LicensesMissing(licenses.to_path_buf()));
    };
    let Some(rule_entries) = load_rules(rules)? else {
        return Ok(Outcome::RulesMissing(rules.to_path_buf()));
    };
    tracing::debug!(licenses = license_records.len(), rules = rule_entries.len(), "catalogs loaded");

    let errors = validate(&license_records, &rule_entries);
    if errors.is_empty() {
        Ok(Outcome::Passed)
    } else {
        Ok(Outcome::Failed(errors))
    }
}
