// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Catalog merge and query indices.
//!
//! [`Catalogs`] is built once, from one or more [`CatalogSource`]s, and is
//! immutable afterwards.  It holds no decision logic; the resolver reads it
//! through shared references, so a single instance can serve any number of
//! threads without locking.
//!
//! ## Merge precedence
//!
//! 1. Explicit country-registry entries.  A repeated id replaces the earlier
//!    entry.
//! 2. Treaty members that are still unknown become stubs.  A stub collects the
//!    ids of every treaty that lists it, in treaty order.  Explicit countries
//!    keep their own treaty lists untouched.
//! 3. License tables and then bilateral rules (`home`, then `target`) create
//!    stubs with an empty treaty set for ids that are still unknown.
//!
//! Duplicate rule keys follow "last loaded wins".  Referential integrity is
//! not checked here; that is the offline validator's job.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::source::CatalogSource;
use crate::types::{BilateralRule, Country, LicenseClass, LicenseRecord, Treaty};

/// Query-ready, immutable view over the merged catalogs.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::catalog::Catalogs;
/// use reciprocity_core::source::InMemorySource;
/// use reciprocity_core::types::{Country, Treaty};
///
/// let source = InMemorySource::new()
///     .with_country(Country::stub("germany"))
///     .with_treaty("cept", Treaty {
///         name: "CEPT T/R 61-01".into(),
///         members: vec!["germany".into(), "france".into()],
///         ..Treaty::default()
///     });
///
/// let catalogs = Catalogs::from_source(&source);
///
/// // "france" only appears as a treaty member, so it was synthesized.
/// let france = catalogs.country("france").unwrap();
/// assert!(france.synthesized);
/// assert_eq!(france.treaties, ["cept"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    /// Countries in merge order.
    countries: Vec<Country>,
    /// Key: country id → position in `countries`.
    by_id: HashMap<String, usize>,
    /// Treaties in source order.
    treaties: Vec<Treaty>,
    /// Key: treaty id → position in `treaties`.
    treaty_index: HashMap<String, usize>,
    /// Key: home id → target id → rule.  Nested so ids never need escaping.
    by_pair: HashMap<String, HashMap<String, BilateralRule>>,
    /// Key: country id → classes in display order.
    licenses_by_country: HashMap<String, Vec<LicenseClass>>,
}

impl Catalogs {
    /// Catalogs with every index empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the indices from the four catalogs.
    ///
    /// Any argument may be empty; the matching index is then empty as well.
    pub fn load(
        countries: Vec<Country>,
        treaties: Vec<Treaty>,
        licenses: Vec<LicenseRecord>,
        rules: Vec<BilateralRule>,
    ) -> Self {
        let mut catalogs = Self::empty();

        for country in countries {
            catalogs.insert_explicit(country);
        }

        for treaty in treaties {
            catalogs.insert_treaty(treaty);
        }
        catalogs.synthesize_treaty_members();

        for record in licenses {
            catalogs.ensure_country(&record.id);
            let country_id = record.id.clone();
            if catalogs
                .licenses_by_country
                .insert(country_id.clone(), record.into_classes())
                .is_some()
            {
                tracing::warn!(country = %country_id, "duplicate license table; later entry replaces earlier");
            }
        }

        for rule in rules {
            catalogs.ensure_country(&rule.home);
            catalogs.ensure_country(&rule.target);
            catalogs.insert_rule(rule);
        }

        tracing::debug!(
            countries = catalogs.countries.len(),
            synthesized = catalogs.countries.iter().filter(|country| country.synthesized).count(),
            treaties = catalogs.treaties.len(),
            license_tables = catalogs.licenses_by_country.len(),
            rules = catalogs.rule_count(),
            "catalogs merged"
        );

        catalogs
    }

    /// Build from a single source.
    pub fn from_source<S: CatalogSource + ?Sized>(source: &S) -> Self {
        Self::load(source.countries(), source.treaties(), source.licenses(), source.rules())
    }

    /// Build from several sources.  Records are concatenated in slice order
    /// before merging, so later sources override earlier ones on duplicate
    /// keys.
    pub fn merge(sources: &[&dyn CatalogSource]) -> Self {
        let mut countries = Vec::new();
        let mut treaties = Vec::new();
        let mut licenses = Vec::new();
        let mut rules = Vec::new();
        for source in sources {
            countries.extend(source.countries());
            treaties.extend(source.treaties());
            licenses.extend(source.licenses());
            rules.extend(source.rules());
        }
        Self::load(countries, treaties, licenses, rules)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Look up a country by id.
    pub fn country(&self, id: &str) -> Option<&Country> {
        self.by_id.get(id).map(|&index| &self.countries[index])
    }

    /// All countries in merge order (explicit entries first, then stubs).
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Look up a treaty by id.
    pub fn treaty(&self, id: &str) -> Option<&Treaty> {
        self.treaty_index.get(id).map(|&index| &self.treaties[index])
    }

    /// All treaties in source order.
    pub fn treaties(&self) -> &[Treaty] {
        &self.treaties
    }

    /// The explicit rule for the ordered pair, if any.
    pub fn rule(&self, home: &str, target: &str) -> Option<&BilateralRule> {
        self.by_pair.get(home)?.get(target)
    }

    /// Every rule, in no particular order.
    pub fn rules(&self) -> impl Iterator<Item = &BilateralRule> {
        self.by_pair.values().flat_map(|targets| targets.values())
    }

    /// Number of distinct `(home, target)` keys.
    pub fn rule_count(&self) -> usize {
        self.by_pair.values().map(HashMap::len).sum()
    }

    /// License classes of `country_id` in display order; empty when unknown.
    pub fn license_classes(&self, country_id: &str) -> &[LicenseClass] {
        self.licenses_by_country
            .get(country_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `true` when no country is known.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    // ------------------------------------------------------------------
    // Merge helpers
    // ------------------------------------------------------------------

    fn insert_explicit(&mut self, mut country: Country) {
        if country.id.is_empty() {
            tracing::warn!("country entry without id skipped");
            return;
        }
        country.synthesized = false;
        match self.by_id.get(&country.id) {
            Some(&index) => {
                tracing::warn!(id = %country.id, "duplicate country id; later entry replaces earlier");
                self.countries[index] = country;
            }
            None => {
                self.by_id.insert(country.id.clone(), self.countries.len());
                self.countries.push(country);
            }
        }
    }

    fn insert_treaty(&mut self, treaty: Treaty) {
        match self.treaty_index.get(&treaty.id) {
            Some(&index) => {
                tracing::warn!(id = %treaty.id, "duplicate treaty id; later entry replaces earlier");
                self.treaties[index] = treaty;
            }
            None => {
                self.treaty_index.insert(treaty.id.clone(), self.treaties.len());
                self.treaties.push(treaty);
            }
        }
    }

    fn synthesize_treaty_members(&mut self) {
        let memberships: Vec<(String, String)> = self
            .treaties
            .iter()
            .flat_map(|treaty| {
                treaty
                    .members
                    .iter()
                    .map(move |member| (member.clone(), treaty.id.clone()))
            })
            .collect();

        for (member, treaty_id) in memberships {
            let index = match self.ensure_country(&member) {
                Some(index) => index,
                None => continue,
            };
            let country = &mut self.countries[index];
            if country.synthesized && !country.treaties.contains(&treaty_id) {
                country.treaties.push(treaty_id);
            }
        }
    }

    /// Return the position of `id`, synthesizing a stub when unknown.
    /// Empty ids are ignored.
    fn ensure_country(&mut self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        if let Some(&index) = self.by_id.get(id) {
            return Some(index);
        }
        let index = self.countries.len();
        self.by_id.insert(id.into(), index);
        self.countries.push(Country::stub(id));
        Some(index)
    }

    fn insert_rule(&mut self, rule: BilateralRule) {
        let targets = self.by_pair.entry(rule.home.clone()).or_default();
        if let Some(previous) = targets.insert(rule.target.clone(), rule) {
            tracing::warn!(
                home = %previous.home,
                target = %previous.target,
                "duplicate bilateral rule; later entry replaces earlier"
            );
        }
    }
}
