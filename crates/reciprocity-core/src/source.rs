// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Source abstraction for the four catalogs.
//!
//! The [`CatalogSource`] trait is the single interface between the merge step
//! and wherever the curated data lives.  This crate ships [`InMemorySource`]
//! for tests, benchmarks and WASM hosts that hand over already-parsed
//! documents.  File-backed sources live in `reciprocity-std` so that this core
//! crate remains `no_std`.
//!
//! A source that has nothing for a catalog returns an empty list; the merge
//! treats "absent" and "empty" identically.
//!
//! # Implementing `CatalogSource`
//!
//! ```rust
//! use reciprocity_core::source::CatalogSource;
//! use reciprocity_core::types::{BilateralRule, Country, LicenseRecord, Treaty};
//!
//! struct NoData;
//!
//! impl CatalogSource for NoData {
//!     fn countries(&self) -> Vec<Country> { Vec::new() }
//!     fn treaties(&self) -> Vec<Treaty> { Vec::new() }
//!     fn licenses(&self) -> Vec<LicenseRecord> { Vec::new() }
//!     fn rules(&self) -> Vec<BilateralRule> { Vec::new() }
//! }
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::types::{BilateralRule, Country, LicenseRecord, Treaty};

// ---------------------------------------------------------------------------
// CatalogSource trait
// ---------------------------------------------------------------------------

/// Read-only access to the four persisted catalogs.
///
/// Each method returns owned records in source order; order is significant
/// for treaties (stub treaty sets) and rules (last duplicate wins).
pub trait CatalogSource {
    /// The explicit country registry.
    fn countries(&self) -> Vec<Country>;

    /// The treaty matrix, each entry with its `id` filled in.
    fn treaties(&self) -> Vec<Treaty>;

    /// License-class tables, one record per country.
    fn licenses(&self) -> Vec<LicenseRecord>;

    /// The bilateral rule table.
    fn rules(&self) -> Vec<BilateralRule>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn countries(&self) -> Vec<Country> {
        (**self).countries()
    }

    fn treaties(&self) -> Vec<Treaty> {
        (**self).treaties()
    }

    fn licenses(&self) -> Vec<LicenseRecord> {
        (**self).licenses()
    }

    fn rules(&self) -> Vec<BilateralRule> {
        (**self).rules()
    }
}

// ---------------------------------------------------------------------------
// InMemorySource
// ---------------------------------------------------------------------------

/// A [`CatalogSource`] over records held in memory.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::source::{CatalogSource, InMemorySource};
/// use reciprocity_core::types::Country;
///
/// let source = InMemorySource::new().with_country(Country::stub("japan"));
/// assert_eq!(source.countries().len(), 1);
/// assert!(source.rules().is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    countries: Vec<Country>,
    treaties: Vec<Treaty>,
    licenses: Vec<LicenseRecord>,
    rules: Vec<BilateralRule>,
}

impl InMemorySource {
    /// Create a new, empty [`InMemorySource`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a country registry entry.
    pub fn with_country(mut self, country: Country) -> Self {
        self.countries.push(country);
        self
    }

    /// Append a treaty under `id`, overriding whatever `treaty.id` held.
    pub fn with_treaty(mut self, id: &str, mut treaty: Treaty) -> Self {
        treaty.id = String::from(id);
        self.treaties.push(treaty);
        self
    }

    /// Append a license table.
    pub fn with_licenses(mut self, record: LicenseRecord) -> Self {
        self.licenses.push(record);
        self
    }

    /// Append a bilateral rule.
    pub fn with_rule(mut self, rule: BilateralRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl CatalogSource for InMemorySource {
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
