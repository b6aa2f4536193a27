// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Reciprocity engine — the top-level composition of the three components.
//!
//! [`ReciprocityEngine`] owns the merged [`Catalogs`], a [`TranslationTable`]
//! and the engine [`Config`].  It is immutable once built: every method takes
//! `&self`, so an `Arc<ReciprocityEngine>` can be shared by any number of
//! request handlers without a lock.
//!
//! ## Pipeline
//!
//! 1. **Load** — [`Catalogs`] merged from one or more sources at startup.
//! 2. **Check** — [`RuleResolver`] produces a [`Decision`].
//! 3. **Explain** — [`MessageComposer`] renders the decision for a locale.
//!
//! The engine keeps nothing between calls.  Replacing the data means building
//! a new engine.

use crate::catalog::Catalogs;
use crate::composer::{Message, MessageComposer, TranslationTable};
use crate::config::Config;
use crate::resolver::RuleResolver;
use crate::source::CatalogSource;
use crate::types::{Decision, LicenseClass};

/// Composes catalog lookup, rule resolution and message rendering.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::{
///     config::Config,
///     engine::ReciprocityEngine,
///     source::InMemorySource,
///     types::{Country, OutcomeKind},
/// };
///
/// let source = InMemorySource::new().with_country(Country::stub("japan"));
/// let engine = ReciprocityEngine::from_source(Config::default(), &source);
///
/// let decision = engine.check("japan", "japan", None);
/// assert_eq!(decision.kind(), OutcomeKind::Domestic);
/// assert_eq!(engine.explain(&decision, Some("ja")).text, "国内運用です。");
/// ```
#[derive(Debug, Clone)]
pub struct ReciprocityEngine {
    config: Config,
    catalogs: Catalogs,
    translations: TranslationTable,
}

impl ReciprocityEngine {
    /// Engine over prepared catalogs with the built-in translations.
    pub fn new(config: Config, catalogs: Catalogs) -> Self {
        Self {
            config,
            catalogs,
            translations: TranslationTable::builtin(),
        }
    }

    /// Merge `source` and build an engine over it.
    pub fn from_source<S: CatalogSource + ?Sized>(config: Config, source: &S) -> Self {
        Self::new(config, Catalogs::from_source(source))
    }

    /// Overlay `translations` on the built-in table.
    pub fn with_translations(mut self, translations: TranslationTable) -> Self {
        self.translations.merge(translations);
        self
    }

    /// Resolve `(home, target, license_class)`.
    ///
    /// Thin wrapper over [`RuleResolver::resolve`] using the configured
    /// condition matching mode.
    pub fn check(&self, home_id: &str, target_id: &str, license_class: Option<&str>) -> Decision {
        RuleResolver::with_condition_match(&self.catalogs, self.config.condition_match)
            .resolve(home_id, target_id, license_class)
    }

    /// Render `decision` in `locale`, or in the configured default locale.
    pub fn explain(&self, decision: &Decision, locale: Option<&str>) -> Message {
        let locale = locale
            .filter(|locale| !locale.is_empty())
            .unwrap_or(self.config.default_locale.as_str());
        MessageComposer::new(&self.translations).render(decision, locale)
    }

    /// [`check`](Self::check) then [`explain`](Self::explain).
    pub fn evaluate(
        &self,
        home_id: &str,
        target_id: &str,
        license_class: Option<&str>,
        locale: Option<&str>,
    ) -> (Decision, Message) {
        let decision = self.check(home_id, target_id, license_class);
        let message = self.explain(&decision, locale);
        (decision, message)
    }

    /// License classes of `country_id`, for a class selector.
    pub fn license_classes(&self, country_id: &str) -> &[LicenseClass] {
        self.catalogs.license_classes(country_id)
    }

    /// The merged catalogs.
    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// The effective translation table.
    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    /// The engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
