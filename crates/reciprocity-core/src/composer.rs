// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Message composition.
//!
//! [`MessageComposer`] renders a [`Decision`] into display text for a locale.
//! Templates live in a [`TranslationTable`] keyed by dotted paths
//! (`result.allowed`, `station.required`, ...).  Every lookup falls back in
//! the same order:
//!
//! 1. the requested locale (then its primary subtag, `ja-JP` → `ja`)
//! 2. English
//! 3. the built-in English literal for that key
//! 4. the empty string
//!
//! so a locale with no entries at all still renders legible English.  Nothing
//! here can fail.
//!
//! ## Placeholders
//!
//! | Placeholder    | Source                                                  |
//! |----------------|---------------------------------------------------------|
//! | `{target}`     | target display name, or its id                          |
//! | `{license}`    | `license.annotation` filled with the class, when given  |
//! | `{station}`    | `station.required` / `station.not_required`, when known |
//! | `{note}`       | rule note then detail note, in the locale               |
//! | `{treaty}`     | treaty display name                                     |
//! | `{equivalent}` | `equivalent.annotation` filled with the class, if any   |
//! | `{prefix}`     | target callsign prefix                                  |
//! | `{unknown}`    | comma-separated unknown ids                             |

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{locale_chain, Decision, ExplicitRuling, Link, Outcome, OutcomeKind};

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

/// English templates.  Also the literal fallback for every key.
const CATALOG_EN: &[(&str, &str)] = &[
    ("result.domestic", "Domestic operation."),
    (
        "result.allowed",
        "{target}: operation is permitted under the bilateral arrangement{license}. {station} {note}",
    ),
    (
        "result.denied",
        "{target}: the bilateral arrangement does not cover your license class{license}. {station} {note}",
    ),
    ("result.allowed_by_treaty", "{target} - please consult {treaty}{license}. {equivalent} {station}"),
    ("result.unresolved", "{target}: Reciprocity or CEPT rules should be checked. Prefix: {prefix}/"),
    ("result.data_missing", "Country data missing: {unknown}"),
    ("license.annotation", " (license: {license})"),
    ("equivalent.annotation", "Equivalent class: {equivalent}."),
    ("station.required", "A station license is required."),
    ("station.not_required", "No separate station license is required."),
];

/// Japanese templates.
const CATALOG_JA: &[(&str, &str)] = &[
    ("result.domestic", "国内運用です。"),
    ("result.allowed", "{target}での運用は相互運用協定により認められています{license}。{station}{note}"),
    ("result.denied", "{target}での運用は、お持ちの免許{license}では相互運用協定の対象外です。{station}{note}"),
    ("result.allowed_by_treaty", "{target}での運用には{treaty}{license}をご確認ください。{equivalent}{station}"),
    (
        "result.unresolved",
        "{target}での運用には、相互承認またはCEPT規定の確認が必要です。プリフィックスは {prefix}/ です。",
    ),
    ("result.data_missing", "国データがありません: {unknown}"),
    ("license.annotation", "（免許: {license}）"),
    ("equivalent.annotation", "相当資格: {equivalent}。"),
    ("station.required", "局免許が必要です。"),
    ("station.not_required", "別途の局免許は不要です。"),
];

fn builtin_literal(key: &str) -> Option<&'static str> {
    CATALOG_EN
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, text)| *text)
}

// ---------------------------------------------------------------------------
// TranslationTable
// ---------------------------------------------------------------------------

/// Nested `locale → path → text` table, e.g.
///
/// ```yaml
/// en:
///   result:
///     domestic: Domestic operation.
/// ja:
///   result:
///     domestic: 国内運用です。
/// ```
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::composer::TranslationTable;
///
/// let mut table = TranslationTable::new();
/// table.insert("en", "result.domestic", "Home sweet home.");
///
/// assert_eq!(table.lookup("fr", "result.domestic", None), "Home sweet home.");
/// assert_eq!(table.lookup("en", "result.missing", Some("fallback")), "fallback");
/// assert_eq!(table.lookup("en", "result.domestic.too.deep", None), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable {
    root: Map<String, Value>,
}

impl TranslationTable {
    /// An empty table.  Rendering with it yields the English literals.
    pub fn new() -> Self {
        Self::default()
    }

    /// The English and Japanese templates shipped with the crate.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (key, text) in CATALOG_EN {
            table.insert("en", key, text);
        }
        for (key, text) in CATALOG_JA {
            table.insert("ja", key, text);
        }
        table
    }

    /// Wrap an already-parsed document.  Anything but an object yields an
    /// empty table.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => {
                tracing::warn!("translation table is not a mapping; ignoring it");
                Self::new()
            }
        }
    }

    /// Set `key` (a dotted path) for `locale`, creating intermediate levels.
    pub fn insert(&mut self, locale: &str, key: &str, text: &str) {
        let segments: Vec<&str> = core::iter::once(locale).chain(key.split('.')).collect();
        insert_path(&mut self.root, &segments, text);
    }

    /// Deep-merge `overlay` into this table; overlay entries win.
    pub fn merge(&mut self, overlay: TranslationTable) {
        merge_maps(&mut self.root, overlay.root);
    }

    /// Locales present at the top level.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Resolve `key` for `locale`.  Walks the dotted path and gives up on
    /// the first missing segment, moving on to the next candidate: primary
    /// subtag, English, `fallback`, then `""`.  Empty entries count as
    /// missing.
    pub fn lookup<'a>(&'a self, locale: &str, key: &str, fallback: Option<&'a str>) -> &'a str {
        locale_chain(locale)
            .find_map(|candidate| self.walk(candidate, key))
            .or(fallback)
            .unwrap_or("")
    }

    fn walk(&self, locale: &str, key: &str) -> Option<&str> {
        let mut node = self.root.get(locale)?;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        node.as_str().filter(|text| !text.is_empty())
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], text: &str) {
    match segments {
        [] => {}
        [last] => {
            map.insert(String::from(*last), Value::String(text.into()));
        }
        [head, rest @ ..] => {
            let entry = map
                .entry(String::from(*head))
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, text);
            }
        }
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = base.get_mut(&key) {
                merge_maps(existing, incoming);
                continue;
            }
            base.insert(key, Value::Object(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Rendered output of [`MessageComposer::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Display text.
    pub text: String,
    /// Reference links, verbatim from the decision.
    pub links: Vec<Link>,
    /// Permit application page, when the rule names one.
    pub application_url: Option<String>,
}

/// Renders decisions with a borrowed [`TranslationTable`].
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::{
///     composer::{MessageComposer, TranslationTable},
///     types::{Decision, LocalizedText, Outcome},
/// };
///
/// let decision = Decision {
///     home_id: "japan".into(),
///     target_id: "brazil".into(),
///     target_name: LocalizedText::new().with("en", "Brazil").with("ja", "ブラジル"),
///     license_class: None,
///     outcome: Outcome::Unresolved { target_prefix: "PY".into() },
/// };
///
/// let table = TranslationTable::builtin();
/// let composer = MessageComposer::new(&table);
/// assert_eq!(
///     composer.render(&decision, "en").text,
///     "Brazil: Reciprocity or CEPT rules should be checked. Prefix: PY/"
/// );
/// assert!(composer.render(&decision, "ja").text.starts_with("ブラジルでの運用には"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MessageComposer<'a> {
    translations: &'a TranslationTable,
}

impl<'a> MessageComposer<'a> {
    /// Composer over `translations`.
    pub fn new(translations: &'a TranslationTable) -> Self {
        Self { translations }
    }

    /// Render `decision` for `locale`.
    pub fn render(&self, decision: &Decision, locale: &str) -> Message {
        let target = decision.target_display_name(locale);
        let license = match &decision.license_class {
            Some(class) => fill(self.text(locale, "license.annotation"), &[("license", class.as_str())]),
            None => String::new(),
        };

        let (text, links, application_url) = match &decision.outcome {
            Outcome::DataMissing { unknown } => {
                let unknown = unknown.join(", ");
                let text = fill(self.template(locale, OutcomeKind::DataMissing), &[("unknown", unknown.as_str())]);
                (text, Vec::new(), None)
            }
            Outcome::Domestic => (
                fill(self.template(locale, OutcomeKind::Domestic), &[("target", target)]),
                Vec::new(),
                None,
            ),
            Outcome::Allowed(ruling) | Outcome::Denied(ruling) => {
                let note = explicit_note(ruling, locale);
                let text = fill(
                    self.template(locale, decision.kind()),
                    &[
                        ("target", target),
                        ("license", license.as_str()),
                        ("station", self.station(locale, ruling.station_license_required)),
                        ("note", note.as_str()),
                    ],
                );
                (text, ruling.links.clone(), ruling.application_url.clone())
            }
            Outcome::AllowedByTreaty(ruling) => {
                let equivalent = match &ruling.equivalent_class {
                    Some(class) => fill(self.text(locale, "equivalent.annotation"), &[("equivalent", class.as_str())]),
                    None => String::new(),
                };
                let text = fill(
                    self.template(locale, OutcomeKind::AllowedByTreaty),
                    &[
                        ("target", target),
                        ("treaty", ruling.treaty_name.as_str()),
                        ("license", license.as_str()),
                        ("equivalent", equivalent.as_str()),
                        ("station", self.station(locale, ruling.station_license_required)),
                    ],
                );
                (text, ruling.links.clone(), None)
            }
            Outcome::Unresolved { target_prefix } => (
                fill(
                    self.template(locale, OutcomeKind::Unresolved),
                    &[("target", target), ("prefix", target_prefix.as_str())],
                ),
                Vec::new(),
                None,
            ),
        };

        Message {
            text: normalize_spaces(&text),
            links,
            application_url,
        }
    }

    fn template(&self, locale: &str, kind: OutcomeKind) -> &'a str {
        let key = alloc::format!("result.{}", kind.as_str());
        self.text(locale, &key)
    }

    fn text(&self, locale: &str, key: &str) -> &'a str {
        self.translations.lookup(locale, key, builtin_literal(key))
    }

    fn station(&self, locale: &str, required: Option<bool>) -> &'a str {
        match required {
            Some(true) => self.text(locale, "station.required"),
            Some(false) => self.text(locale, "station.not_required"),
            None => "",
        }
    }
}

/// Convenience wrapper around [`MessageComposer::render`].
pub fn render(decision: &Decision, locale: &str, translations: &TranslationTable) -> Message {
    MessageComposer::new(translations).render(decision, locale)
}

/// Rule note followed by the acquisition tool's detail note, in `locale`.
fn explicit_note(ruling: &ExplicitRuling, locale: &str) -> String {
    let parts: Vec<&str> = [ruling.note.display(locale), ruling.detail_note.display(locale)]
        .into_iter()
        .flatten()
        .collect();
    parts.join(" ")
}

/// Replace `{name}` placeholders in one pass.  Unknown placeholders are kept
/// verbatim and substituted values are never rescanned.
fn fill(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match args.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Collapse runs of ASCII spaces left by empty fragments and trim the ends.
fn normalize_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(' ').filter(|word| !word.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LocalizedText, TreatyRuling};
    use alloc::vec;

    fn decision(outcome: Outcome, class: Option<&str>) -> Decision {
        Decision {
            home_id: "japan".into(),
            target_id: "united_states".into(),
            target_name: LocalizedText::new().with("en", "United States").with("ja", "アメリカ"),
            license_class: class.map(String::from),
            outcome,
        }
    }

    fn ruling() -> ExplicitRuling {
        ExplicitRuling {
            station_license_required: Some(false),
            note: LocalizedText::new().with("en", "Apply to the FCC."),
            links: vec![Link { url: "https://www.fcc.gov".into(), title: LocalizedText::new().with("en", "FCC") }],
            application_url: Some("https://example.org/apply".into()),
            detail_note: LocalizedText::new(),
        }
    }

    #[test]
    fn allowed_message_mentions_station_and_note() {
        let table = TranslationTable::builtin();
        let message = render(&decision(Outcome::Allowed(ruling()), Some("1")), "en", &table);
        assert_eq!(
            message.text,
            "United States: operation is permitted under the bilateral arrangement (license: 1). \
             No separate station license is required. Apply to the FCC."
        );
        assert_eq!(message.links.len(), 1);
        assert_eq!(message.application_url.as_deref(), Some("https://example.org/apply"));
    }

    #[test]
    fn denied_message_without_station_info_has_no_double_spaces() {
        let table = TranslationTable::builtin();
        let ruling = ExplicitRuling { station_license_required: None, ..ruling() };
        let message = render(&decision(Outcome::Denied(ruling), None), "en", &table);
        assert_eq!(
            message.text,
            "United States: the bilateral arrangement does not cover your license class. Apply to the FCC."
        );
    }

    #[test]
    fn treaty_message_in_japanese() {
        let table = TranslationTable::builtin();
        let outcome = Outcome::AllowedByTreaty(TreatyRuling {
            treaty_id: "cept".into(),
            treaty_name: "CEPT".into(),
            equivalent_class: Some("CEPT".into()),
            station_license_required: Some(true),
            links: vec![],
        });
        let message = render(&decision(outcome, Some("A")), "ja-JP", &table);
        assert_eq!(
            message.text,
            "アメリカでの運用にはCEPT（免許: A）をご確認ください。相当資格: CEPT。局免許が必要です。"
        );
    }

    #[test]
    fn locale_without_entries_falls_back_to_literals() {
        let empty = TranslationTable::new();
        let message = render(&decision(Outcome::Domestic, None), "xx", &empty);
        assert_eq!(message.text, "Domestic operation.");

        let message = render(
            &decision(Outcome::DataMissing { unknown: vec!["atlantis".into()] }, None),
            "xx",
            &empty,
        );
        assert_eq!(message.text, "Country data missing: atlantis");
    }

    #[test]
    fn locale_table_overrides_english() {
        let mut table = TranslationTable::builtin();
        table.insert("de", "result.domestic", "Inlandsbetrieb.");
        assert_eq!(render(&decision(Outcome::Domestic, None), "de", &table).text, "Inlandsbetrieb.");
        assert_eq!(render(&decision(Outcome::Domestic, None), "fr", &table).text, "Domestic operation.");
    }

    #[test]
    fn merge_is_deep() {
        let mut table = TranslationTable::builtin();
        let mut overlay = TranslationTable::new();
        overlay.insert("en", "station.required", "Get a station license first.");
        table.merge(overlay);
        assert_eq!(table.lookup("en", "station.required", None), "Get a station license first.");
        assert_eq!(table.lookup("en", "station.not_required", None), "No separate station license is required.");
    }

    #[test]
    fn lookup_survives_non_object_nodes() {
        let table = TranslationTable::from_value(serde_json::json!({ "en": { "result": 5 } }));
        assert_eq!(table.lookup("en", "result.domestic", None), "");
        assert!(TranslationTable::from_value(Value::Null).locales().next().is_none());
    }

    #[test]
    fn fill_keeps_unknown_placeholders_and_does_not_rescan() {
        assert_eq!(fill("{a} {b} {", &[("a", "{b}")]), "{b} {b} {");
    }

    #[test]
    fn detail_note_follows_note() {
        let ruling = ExplicitRuling {
            detail_note: LocalizedText::new().with("ja", "申請不要"),
            ..ruling()
        };
        assert_eq!(explicit_note(&ruling, "ja"), "Apply to the FCC. 申請不要");
    }
}
