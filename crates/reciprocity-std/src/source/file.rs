// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! File-based catalog source.
//!
//! [`FileSource`] reads the four catalogs from disk once, at open time, and
//! then serves them through [`CatalogSource`].  Nothing is re-read later;
//! reopen to pick up edits.
//!
//! ## Layout
//!
//! ```text
//! _data/
//!   countries.yml   - [ { id, name, treaties, cept, cept_novice, harec, prefix } ]
//!   treaties.yml    - { <id>: { name, members, conditions, links } }
//!   licenses.yml    - [ { id, classes: [ { id, name } ] } ]
//!   rules.yml       - { rules: [ { home, target, allowed_home_classes, ... } ] }
//! ```
//!
//! Each file may also be `.yaml` or `.json`.  A missing file yields an empty
//! catalog.
//!
//! ## Caveats
//!
//! * Treaty order is the order of the keys in `treaties.yml`; it decides
//!   which treaties a synthesized country lists first.

use std::path::{Path, PathBuf};

use reciprocity_core::source::CatalogSource;
use reciprocity_core::types::{
    BilateralRule, Country, LicenseRecord, RuleTable, Treaty, TreatyMatrix,
};

use super::{find_file, read_document};
use crate::error::LoadError;

/// Paths of the four catalog files.  `None` means "no such catalog".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPaths {
    pub countries: Option<PathBuf>,
    pub treaties: Option<PathBuf>,
    pub licenses: Option<PathBuf>,
    pub rules: Option<PathBuf>,
}

impl CatalogPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let pick = |stem: &str| Some(find_file(dir, stem).unwrap_or_else(|| dir.join(format!("{stem}.yml"))));
        Self {
            countries: pick("countries"),
            treaties: pick("treaties"),
            licenses: pick("licenses"),
            rules: pick("rules"),
        }
    }
}

/// A [`CatalogSource`] backed by YAML or JSON files.
///
/// # Examples
///
/// ```rust,no_run
/// use reciprocity_core::{Catalogs, Config, ReciprocityEngine};
/// use reciprocity_std::FileSource;
///
/// let source = FileSource::open_dir("_data").expect("catalog files are readable");
/// let engine = ReciprocityEngine::new(Config::default(), Catalogs::from_source(&source));
/// println!("{}", engine.explain(&engine.check("japan", "germany", Some("1")), None).text);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    countries: Vec<Country>,
    treaties: Vec<Treaty>,
    licenses: Vec<LicenseRecord>,
    rules: Vec<BilateralRule>,
}

impl FileSource {
    /// Load `countries`, `treaties`, `licenses` and `rules` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a file exists but cannot be read or
    /// parsed.
    pub fn open_dir<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
        Self::open(&CatalogPaths::in_dir(dir))
    }

    /// Load from explicit paths.
    ///
    /// # Errors
    ///
    /// See [`FileSource::open_dir`].
    pub fn open(paths: &CatalogPaths) -> Result<Self, LoadError> {
        let countries = load(paths.countries.as_deref(), |doc: Vec<Country>| doc)?;
        let treaties = load(paths.treaties.as_deref(), |doc: TreatyMatrix| doc.0)?;
        let licenses = load(paths.licenses.as_deref(), |doc: Vec<LicenseRecord>| doc)?;
        let rules = load(paths.rules.as_deref(), |doc: RuleTable| doc.rules)?;

        tracing::info!(
            countries = countries.len(),
            treaties = treaties.len(),
            licenses = licenses.len(),
            rules = rules.len(),
            "catalog files loaded"
        );

        Ok(Self { countries, treaties, licenses, rules })
    }
}

fn load<D, T, F>(path: Option<&Path>, unwrap: F) -> Result<Vec<T>, LoadError>
where
    D: serde::de::DeserializeOwned,
    F: FnOnce(D) -> Vec<T>,
{
    match path {
        Some(path) => Ok(read_document::<D>(path)?.map(unwrap).unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}

impl CatalogSource for FileSource {
    fn countries(&self) -> Vec<Country> {
        self.countries.clone()
    }

    fn treaties(&self) -> Vec<Treaty> {
        self.treaties.clone()
    }

    fn licenses(&self) -> Vec<LicenseRecord> {
        self.licenses.clone()
    }

    fn rules(&self) -> Vec<BilateralRule> {
        self.rules.clone()
    }
}
