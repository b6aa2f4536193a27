// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across the catalog, resolver and composer.
//!
//! The record types double as the wire contract of the persisted catalogs:
//! field names match the YAML/JSON documents the curation pipeline produces,
//! and every optional field carries a `#[serde(default)]` so that a sparse
//! record still loads.  All types implement [`Clone`], [`Debug`],
//! [`serde::Serialize`], and [`serde::Deserialize`] so they can cross WASM
//! boundaries without additional conversion steps.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Locale used whenever a requested locale has no entry.
pub const FALLBACK_LOCALE: &str = "en";

// ---------------------------------------------------------------------------
// Localised text
// ---------------------------------------------------------------------------

/// Per-locale strings, e.g. `{ en: "Japan", ja: "日本" }`.
///
/// A bare string in a catalog is accepted and stored under the fallback
/// locale, so hand-edited data does not need the map form for English-only
/// entries.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::types::LocalizedText;
///
/// let name = LocalizedText::new().with("en", "Japan").with("ja", "日本");
/// assert_eq!(name.display("ja"), Some("日本"));
/// assert_eq!(name.display("ja-JP"), Some("日本"));
/// assert_eq!(name.display("fr"), Some("Japan"));
/// assert_eq!(LocalizedText::new().display("en"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Create an empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one locale.
    pub fn with(mut self, locale: &str, text: &str) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Lookup with fallback: exact locale, then its primary language subtag
    /// (`ja-JP` → `ja`), then [`FALLBACK_LOCALE`].  Empty strings count as
    /// missing.
    pub fn display(&self, locale: &str) -> Option<&str> {
        locale_chain(locale)
            .filter_map(|candidate| self.get(candidate))
            .find(|text| !text.is_empty())
    }

    /// Like [`display`](Self::display) but never empty-handed.
    pub fn display_or<'a>(&'a self, locale: &str, fallback: &'a str) -> &'a str {
        self.display(locale).unwrap_or(fallback)
    }

    /// `true` when no locale carries non-empty text.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(String::is_empty)
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = LocalizedText;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a map of locale to string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(LocalizedText::new().with(FALLBACK_LOCALE, value))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LocalizedText::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LocalizedText::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = BTreeMap::new();
                while let Some((locale, text)) = map.next_entry::<String, Option<String>>()? {
                    if let Some(text) = text {
                        entries.insert(locale, text);
                    }
                }
                Ok(LocalizedText(entries))
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}

/// Candidate locales for a lookup, most specific first.
pub(crate) fn locale_chain(locale: &str) -> impl Iterator<Item = &str> {
    let primary = locale.split(['-', '_']).next().unwrap_or(locale);
    let primary = (primary != locale).then_some(primary);
    let fallback = (locale != FALLBACK_LOCALE && primary != Some(FALLBACK_LOCALE))
        .then_some(FALLBACK_LOCALE);
    core::iter::once(locale).chain(primary).chain(fallback)
}

/// A reference link with a per-locale title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute HTTP(S) URL.
    pub url: String,
    /// Title shown for the link.
    #[serde(default)]
    pub title: LocalizedText,
}

// ---------------------------------------------------------------------------
// Identifier helpers
// ---------------------------------------------------------------------------

/// Serde helpers for identifiers that hand-edited YAML often writes as bare
/// numbers (`allowed_home_classes: [1, 2]`).
pub mod id {
    use super::*;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer identifier")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.into())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(alloc::format!("{value}"))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(alloc::format!("{value}"))
        }
    }

    /// Deserialize a single identifier.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }

    /// Deserialize a list of identifiers; `null` yields an empty list.
    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        #[derive(Deserialize)]
        struct Id(#[serde(deserialize_with = "crate::types::id::deserialize")] String);

        let ids: Option<Vec<Id>> = Option::deserialize(deserializer)?;
        Ok(ids.unwrap_or_default().into_iter().map(|Id(id)| id).collect())
    }
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// A jurisdiction in the country registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Stable key, e.g. `"united_states"`.
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    /// Display name per locale.
    #[serde(default)]
    pub name: LocalizedText,
    /// Treaty memberships in the order the registry lists them.  This order
    /// is the tie-break when a home and target share several treaties.
    #[serde(default, deserialize_with = "id::list")]
    pub treaties: Vec<String>,
    /// Implements CEPT T/R 61-01.
    #[serde(default)]
    pub cept: bool,
    /// Implements the CEPT novice recommendation (ECC/REC/(05)06).
    #[serde(default)]
    pub cept_novice: bool,
    /// Issues HAREC certificates (T/R 61-02).
    #[serde(default)]
    pub harec: bool,
    /// Callsign prefix a visiting operator signs with.
    #[serde(default)]
    pub prefix: String,
    /// `true` for entries the merge synthesized from a cross-reference.
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub synthesized: bool,
}

impl Country {
    /// Minimal placeholder for an id referenced but never defined.  The id
    /// doubles as the display name.
    pub fn stub(id: &str) -> Self {
        Self {
            id: id.into(),
            name: LocalizedText::new().with(FALLBACK_LOCALE, id),
            treaties: Vec::new(),
            cept: false,
            cept_novice: false,
            harec: false,
            prefix: String::new(),
            synthesized: true,
        }
    }

    /// Display name in `locale`, falling back to the id.
    pub fn display_name(&self, locale: &str) -> &str {
        self.name.display_or(locale, &self.id)
    }
}

/// One equivalence row of a treaty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatyCondition {
    /// Pattern compared against the operator's home license class.
    #[serde(rename = "home_class", default, deserialize_with = "id::deserialize")]
    pub home_class_pattern: String,
    /// Class the operator is treated as holding in the target country.
    #[serde(rename = "equivalent", default)]
    pub equivalent_class: Option<String>,
    /// Whether the target requires a separate station license.
    #[serde(default)]
    pub requires_station_license: Option<bool>,
}

/// A multilateral arrangement such as CEPT or HAREC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treaty {
    /// Key referenced from [`Country::treaties`].  In the persisted matrix
    /// the id is the mapping key, not a field.
    #[serde(default)]
    pub id: String,
    /// Display name, e.g. `"CEPT T/R 61-01"`.
    #[serde(default)]
    pub name: String,
    /// Member country ids.
    #[serde(default, deserialize_with = "id::list")]
    pub members: Vec<String>,
    /// Equivalence rows; the first matching row wins.
    #[serde(default)]
    pub conditions: Vec<TreatyCondition>,
    /// Reference material.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// One license class of a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseClass {
    /// Owning country id.
    pub country_id: String,
    /// Class id, unique within the country.
    pub class_id: String,
    /// Display name per locale.
    pub name: LocalizedText,
}

/// Persisted form of one country's license table:
/// `{ id: <country>, classes: [{ id, name }] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Country id.
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    /// Classes in display order.
    #[serde(default)]
    pub classes: Vec<LicenseClassEntry>,
}

/// A class row inside a [`LicenseRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseClassEntry {
    /// Class id.
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    /// Display name per locale.
    #[serde(default)]
    pub name: LocalizedText,
}

impl LicenseRecord {
    /// Flatten into [`LicenseClass`] values, preserving order.
    pub fn into_classes(self) -> Vec<LicenseClass> {
        let country_id = self.id;
        self.classes
            .into_iter()
            .map(|entry| LicenseClass {
                country_id: country_id.clone(),
                class_id: entry.id,
                name: entry.name,
            })
            .collect()
    }
}

/// An explicit, pair-specific rule.  Overrides any treaty inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilateralRule {
    /// Operator's licensing country.
    #[serde(deserialize_with = "id::deserialize")]
    pub home: String,
    /// Country the operator wants to transmit from.
    #[serde(deserialize_with = "id::deserialize")]
    pub target: String,
    /// Home classes the rule admits.
    #[serde(default, deserialize_with = "id::list")]
    pub allowed_home_classes: Vec<String>,
    /// `None` means the source did not say.
    #[serde(default)]
    pub requires_station_license: Option<bool>,
    /// Free-text guidance per locale.
    #[serde(default)]
    pub note: LocalizedText,
    /// Reference material.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Where to apply for the target's permit, when known.
    #[serde(default)]
    pub application_url: Option<String>,
    /// Extract from the publisher's page, written by the acquisition tool.
    #[serde(default)]
    pub detail_note: LocalizedText,
}

impl BilateralRule {
    /// Whether `class_id` is on the allow list.  An empty id never is.
    pub fn admits(&self, class_id: &str) -> bool {
        !class_id.is_empty() && self.allowed_home_classes.iter().any(|allowed| allowed == class_id)
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Auxiliary data carried by [`Outcome::Allowed`] and [`Outcome::Denied`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitRuling {
    /// Copied from [`BilateralRule::requires_station_license`].
    pub station_license_required: Option<bool>,
    /// Copied from [`BilateralRule::note`].
    pub note: LocalizedText,
    /// Copied from [`BilateralRule::links`].
    pub links: Vec<Link>,
    /// Copied from [`BilateralRule::application_url`].
    pub application_url: Option<String>,
    /// Copied from [`BilateralRule::detail_note`].
    pub detail_note: LocalizedText,
}

impl From<&BilateralRule> for ExplicitRuling {
    fn from(rule: &BilateralRule) -> Self {
        Self {
            station_license_required: rule.requires_station_license,
            note: rule.note.clone(),
            links: rule.links.clone(),
            application_url: rule.application_url.clone(),
            detail_note: rule.detail_note.clone(),
        }
    }
}

/// Auxiliary data carried by [`Outcome::AllowedByTreaty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatyRuling {
    /// The primary shared treaty.
    pub treaty_id: String,
    /// Its display name, or the id when the treaty matrix has no entry.
    pub treaty_name: String,
    /// From the first matching condition, if any matched.
    pub equivalent_class: Option<String>,
    /// From the first matching condition, if any matched.
    pub station_license_required: Option<bool>,
    /// The treaty's reference links.
    pub links: Vec<Link>,
}

/// Tagged result of rule resolution.  Every input maps to exactly one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Home or target is not in the country index.
    DataMissing {
        /// The ids that could not be found.
        unknown: Vec<String>,
    },
    /// Home and target are the same country.
    Domestic,
    /// An explicit rule admits the supplied class.
    Allowed(ExplicitRuling),
    /// An explicit rule exists but does not admit the supplied class.
    Denied(ExplicitRuling),
    /// No explicit rule; both countries share a treaty.
    AllowedByTreaty(TreatyRuling),
    /// No explicit rule and no shared treaty.
    Unresolved {
        /// Prefix the visitor would sign with.
        target_prefix: String,
    },
}

/// Discriminant of [`Outcome`], handy for templates and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    DataMissing,
    Domestic,
    Allowed,
    Denied,
    AllowedByTreaty,
    Unresolved,
}

impl OutcomeKind {
    /// Stable snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::DataMissing     => "data_missing",
            OutcomeKind::Domestic        => "domestic",
            OutcomeKind::Allowed         => "allowed",
            OutcomeKind::Denied          => "denied",
            OutcomeKind::AllowedByTreaty => "allowed_by_treaty",
            OutcomeKind::Unresolved      => "unresolved",
        }
    }
}

impl Outcome {
    /// The tag of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::DataMissing { .. } => OutcomeKind::DataMissing,
            Outcome::Domestic           => OutcomeKind::Domestic,
            Outcome::Allowed(_)         => OutcomeKind::Allowed,
            Outcome::Denied(_)          => OutcomeKind::Denied,
            Outcome::AllowedByTreaty(_) => OutcomeKind::AllowedByTreaty,
            Outcome::Unresolved { .. }  => OutcomeKind::Unresolved,
        }
    }
}

/// Result of [`RuleResolver::resolve`](crate::resolver::RuleResolver::resolve).
///
/// Carries the query alongside the outcome so a composer can explain it
/// without going back to the catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Queried home id, verbatim.
    pub home_id: String,
    /// Queried target id, verbatim.
    pub target_id: String,
    /// Target display names; empty when the target is unknown.
    pub target_name: LocalizedText,
    /// Queried license class, `None` when absent or empty.
    pub license_class: Option<String>,
    /// The verdict.
    pub outcome: Outcome,
}

impl Decision {
    /// Shorthand for `self.outcome.kind()`.
    pub fn kind(&self) -> OutcomeKind {
        self.outcome.kind()
    }

    /// `Some(true)` for outcomes that permit operation, `Some(false)` for an
    /// explicit denial, `None` when the answer is unknown.
    pub fn permitted(&self) -> Option<bool> {
        match self.outcome {
            Outcome::Domestic | Outcome::Allowed(_) | Outcome::AllowedByTreaty(_) => Some(true),
            Outcome::Denied(_) => Some(false),
            Outcome::DataMissing { .. } | Outcome::Unresolved { .. } => None,
        }
    }

    /// Target display name in `locale`, falling back to the id.
    pub fn target_display_name(&self, locale: &str) -> &str {
        self.target_name.display_or(locale, &self.target_id)
    }
}

// ---------------------------------------------------------------------------
// Persisted document shapes
// ---------------------------------------------------------------------------

/// The treaty matrix as persisted: a mapping keyed by treaty id, read in
/// document order so the order survives formats whose maps are unordered
/// once parsed.  A list of treaties carrying their own `id` is accepted too.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::types::TreatyMatrix;
///
/// let matrix: TreatyMatrix = serde_json::from_str(
///     r#"{ "harec": { "name": "HAREC" }, "cept": { "members": ["germany"] } }"#,
/// ).unwrap();
/// let ids: Vec<&str> = matrix.0.iter().map(|treaty| treaty.id.as_str()).collect();
/// assert_eq!(ids, ["harec", "cept"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreatyMatrix(pub Vec<Treaty>);

impl<'de> Deserialize<'de> for TreatyMatrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MatrixVisitor;

        impl<'de> Visitor<'de> for MatrixVisitor {
            type Value = TreatyMatrix;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of treaty id to treaty, or a list of treaties")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut treaties = Vec::new();
                while let Some((id, mut treaty)) = map.next_entry::<String, Treaty>()? {
                    treaty.id = id;
                    treaties.push(treaty);
                }
                Ok(TreatyMatrix(treaties))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut treaties = Vec::new();
                while let Some(treaty) = seq.next_element::<Treaty>()? {
                    if treaty.id.is_empty() {
                        return Err(de::Error::missing_field("id"));
                    }
                    treaties.push(treaty);
                }
                Ok(TreatyMatrix(treaties))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(TreatyMatrix::default())
            }
        }

        deserializer.deserialize_any(MatrixVisitor)
    }
}

/// The rule table as persisted: `{ rules: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub rules: Vec<BilateralRule>,
}
