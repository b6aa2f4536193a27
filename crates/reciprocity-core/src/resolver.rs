// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Rule resolution — the decision engine.
//!
//! [`RuleResolver`] turns a `(home, target, license_class)` query into exactly
//! one [`Decision`].  It is pure: no I/O, no mutation, no hidden state.  The
//! catalogs are borrowed, never read from a global.
//!
//! ## Evaluation Order
//!
//! 1. **Lookup** — home or target unknown → [`Outcome::DataMissing`].
//! 2. **Domestic** — `home == target` → [`Outcome::Domestic`], whatever the class.
//! 3. **Explicit rule** — a bilateral rule for the ordered pair decides alone:
//!    [`Outcome::Allowed`] when the class is on its allow list, otherwise
//!    [`Outcome::Denied`].  Treaties are never consulted once a rule exists.
//! 4. **Shared treaty** — the first treaty of `home.treaties` that the target
//!    also lists is the primary treaty.  Its first condition matching the
//!    class supplies the equivalent class and the station-license flag →
//!    [`Outcome::AllowedByTreaty`].
//! 5. **Fallback** — [`Outcome::Unresolved`] with the target's prefix.
//!
//! The first step that matches ends evaluation.
//!
//! Both "first" selections in step 4 are positional.  Neither the treaty
//! order in the registry nor the condition order in the matrix encodes legal
//! precedence; callers that need one must impose their own ordering on the
//! data.

use alloc::string::String;
use alloc::vec::Vec;

use crate::catalog::Catalogs;
use crate::config::ConditionMatch;
use crate::types::{
    Country, Decision, ExplicitRuling, Outcome, Treaty, TreatyCondition, TreatyRuling,
};

/// Evaluates queries against a borrowed [`Catalogs`].
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::{
///     catalog::Catalogs,
///     resolver::RuleResolver,
///     source::InMemorySource,
///     types::{BilateralRule, Country, OutcomeKind},
/// };
///
/// let source = InMemorySource::new()
///     .with_country(Country::stub("japan"))
///     .with_country(Country::stub("united_states"))
///     .with_rule(BilateralRule {
///         home: "japan".into(),
///         target: "united_states".into(),
///         allowed_home_classes: vec!["1".into(), "2".into()],
///         requires_station_license: Some(false),
///         ..BilateralRule::default()
///     });
/// let catalogs = Catalogs::from_source(&source);
/// let resolver = RuleResolver::new(&catalogs);
///
/// assert_eq!(resolver.resolve("japan", "united_states", Some("1")).kind(), OutcomeKind::Allowed);
/// assert_eq!(resolver.resolve("japan", "united_states", Some("3")).kind(), OutcomeKind::Denied);
/// assert_eq!(resolver.resolve("japan", "japan", None).kind(), OutcomeKind::Domestic);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RuleResolver<'a> {
    catalogs: &'a Catalogs,
    condition_match: ConditionMatch,
}

impl<'a> RuleResolver<'a> {
    /// Resolver with the default [`ConditionMatch::Substring`] mode.
    pub fn new(catalogs: &'a Catalogs) -> Self {
        Self::with_condition_match(catalogs, ConditionMatch::default())
    }

    /// Resolver with an explicit matching mode.
    pub fn with_condition_match(catalogs: &'a Catalogs, condition_match: ConditionMatch) -> Self {
        Self { catalogs, condition_match }
    }

    /// Resolve one query.  Never fails; see the module docs for the order.
    ///
    /// An empty `license_class` is treated as absent.
    pub fn resolve(&self, home_id: &str, target_id: &str, license_class: Option<&str>) -> Decision {
        let license_class = license_class.filter(|class| !class.is_empty());
        let home = self.catalogs.country(home_id);
        let target = self.catalogs.country(target_id);

        let outcome = self.evaluate(home_id, target_id, home, target, license_class);
        tracing::debug!(
            home = %home_id,
            target = %target_id,
            class = license_class.unwrap_or(""),
            outcome = outcome.kind().as_str(),
            "rule resolved"
        );

        Decision {
            home_id: home_id.into(),
            target_id: target_id.into(),
            target_name: target.map(|country| country.name.clone()).unwrap_or_default(),
            license_class: license_class.map(String::from),
            outcome,
        }
    }

    fn evaluate(
        &self,
        home_id: &str,
        target_id: &str,
        home: Option<&Country>,
        target: Option<&Country>,
        license_class: Option<&str>,
    ) -> Outcome {
        // ------------------------------------------------------------------
        // Step 1: both countries must be known
        // ------------------------------------------------------------------
        let (home, target) = match (home, target) {
            (Some(home), Some(target)) => (home, target),
            _ => {
                let mut unknown = Vec::new();
                if home.is_none() {
                    unknown.push(String::from(home_id));
                }
                if target.is_none() && (target_id != home_id || home.is_some()) {
                    unknown.push(String::from(target_id));
                }
                return Outcome::DataMissing { unknown };
            }
        };

        // ------------------------------------------------------------------
        // Step 2: domestic operation
        // ------------------------------------------------------------------
        if home.id == target.id {
            return Outcome::Domestic;
        }

        // ------------------------------------------------------------------
        // Step 3: an explicit rule decides on its own, even when it denies
        // ------------------------------------------------------------------
        if let Some(rule) = self.catalogs.rule(&home.id, &target.id) {
            let ruling = ExplicitRuling::from(rule);
            return match license_class {
                Some(class) if rule.admits(class) => Outcome::Allowed(ruling),
                _ => Outcome::Denied(ruling),
            };
        }

        // ------------------------------------------------------------------
        // Step 4: first shared treaty, in the home country's order
        // ------------------------------------------------------------------
        if let Some(treaty_id) = shared_treaties(home, target).next() {
            let treaty = self.catalogs.treaty(treaty_id);
            let condition = treaty.and_then(|treaty| self.first_matching_condition(treaty, license_class));
            return Outcome::AllowedByTreaty(TreatyRuling {
                treaty_id: treaty_id.into(),
                treaty_name: treaty
                    .map(|treaty| treaty.name.as_str())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(treaty_id)
                    .into(),
                equivalent_class: condition.and_then(|condition| condition.equivalent_class.clone()),
                station_license_required: condition.and_then(|condition| condition.requires_station_license),
                links: treaty.map(|treaty| treaty.links.clone()).unwrap_or_default(),
            });
        }

        // ------------------------------------------------------------------
        // Step 5: nothing applies
        // ------------------------------------------------------------------
        Outcome::Unresolved {
            target_prefix: target.prefix.clone(),
        }
    }

    fn first_matching_condition<'t>(
        &self,
        treaty: &'t Treaty,
        license_class: Option<&str>,
    ) -> Option<&'t TreatyCondition> {
        let class = license_class?;
        treaty
            .conditions
            .iter()
            .find(|condition| class_matches(&condition.home_class_pattern, class, self.condition_match))
    }
}

/// Ids of `home.treaties` that `target` also lists, in home order.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::{resolver::shared_treaties, types::Country};
///
/// let home = Country { treaties: vec!["a".into(), "b".into()], ..Country::stub("home") };
/// let target = Country { treaties: vec!["b".into(), "a".into()], ..Country::stub("target") };
/// assert_eq!(shared_treaties(&home, &target).collect::<Vec<_>>(), ["a", "b"]);
/// ```
pub fn shared_treaties<'c>(home: &'c Country, target: &'c Country) -> impl Iterator<Item = &'c str> {
    home.treaties
        .iter()
        .filter(move |treaty| target.treaties.contains(*treaty))
        .map(String::as_str)
}

/// Compare a condition pattern with a license class under `mode`.
///
/// Empty strings never match, so a blank pattern cannot swallow every class.
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::{config::ConditionMatch, resolver::class_matches};
///
/// assert!(class_matches("A", "a1", ConditionMatch::Substring));
/// assert!(class_matches("A1", "A", ConditionMatch::Substring));
/// assert!(!class_matches("A", "A1", ConditionMatch::Exact));
/// assert!(!class_matches("", "A", ConditionMatch::Substring));
/// ```
pub fn class_matches(pattern: &str, class: &str, mode: ConditionMatch) -> bool {
    if pattern.is_empty() || class.is_empty() {
        return false;
    }
    let pattern = pattern.to_lowercase();
    let class = class.to_lowercase();
    match mode {
        ConditionMatch::Substring => pattern.contains(&class) || class.contains(&pattern),
        ConditionMatch::Exact => pattern == class,
    }
}

/// Convenience wrapper: resolve with the default matching mode.
pub fn resolve(catalogs: &Catalogs, home_id: &str, target_id: &str, license_class: Option<&str>) -> Decision {
    RuleResolver::new(catalogs).resolve(home_id, target_id, license_class)
}

/// Display name of `country_id` in `locale`, or the id when unknown.
pub fn country_name(catalogs: &Catalogs, country_id: &str, locale: &str) -> String {
    catalogs
        .country(country_id)
        .map(|country| country.display_name(locale))
        .unwrap_or(country_id)
        .into()
}

/// Names of the license classes of `country_id`, for selection lists.
pub fn license_class_names(catalogs: &Catalogs, country_id: &str, locale: &str) -> Vec<(String, String)> {
    catalogs
        .license_classes(country_id)
        .iter()
        .map(|class| (class.class_id.clone(), String::from(class.name.display_or(locale, &class.class_id))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use crate::types::{BilateralRule, Link, LocalizedText, OutcomeKind};
    use alloc::vec;

    fn country(id: &str, treaties: &[&str], prefix: &str) -> Country {
        Country {
            treaties: treaties.iter().map(|t| String::from(*t)).collect(),
            prefix: prefix.into(),
            synthesized: false,
            ..Country::stub(id)
        }
    }

    fn fixture() -> Catalogs {
        let source = InMemorySource::new()
            .with_country(country("japan", &[], "JA"))
            .with_country(country("united_states", &["cept"], "W"))
            .with_country(country("germany", &["cept", "harec"], "DL"))
            .with_country(country("france", &["harec", "cept"], "F"))
            .with_country(country("brazil", &[], "PY"))
            .with_treaty("cept", Treaty {
                name: "CEPT T/R 61-01".into(),
                conditions: vec![
                    TreatyCondition {
                        home_class_pattern: "A".into(),
                        equivalent_class: Some("CEPT".into()),
                        requires_station_license: Some(true),
                    },
                    TreatyCondition {
                        home_class_pattern: "Novice".into(),
                        equivalent_class: Some("CEPT Novice".into()),
                        requires_station_license: Some(false),
                    },
                ],
                links: vec![Link { url: "https://cept.org".into(), ..Link::default() }],
                ..Treaty::default()
            })
            .with_treaty("harec", Treaty { name: "HAREC".into(), ..Treaty::default() })
            .with_rule(BilateralRule {
                home: "japan".into(),
                target: "united_states".into(),
                allowed_home_classes: vec!["1".into(), "2".into()],
                requires_station_license: Some(false),
                note: LocalizedText::new().with("en", "FCC reciprocal permit"),
                links: vec![Link { url: "https://www.fcc.gov".into(), ..Link::default() }],
                ..BilateralRule::default()
            })
            .with_rule(BilateralRule {
                home: "germany".into(),
                target: "united_states".into(),
                allowed_home_classes: vec![],
                ..BilateralRule::default()
            });
        Catalogs::from_source(&source)
    }

    #[test]
    fn domestic_regardless_of_class() {
        let catalogs = fixture();
        for class in [None, Some("1"), Some("zzz")] {
            assert_eq!(resolve(&catalogs, "japan", "japan", class).outcome, Outcome::Domestic);
        }
    }

    #[test]
    fn unknown_country_is_data_missing() {
        let catalogs = fixture();
        let decision = resolve(&catalogs, "unknown_id", "japan", Some("1"));
        assert_eq!(decision.outcome, Outcome::DataMissing { unknown: vec!["unknown_id".into()] });
        assert!(decision.target_name.get("en").is_some());

        let decision = resolve(&catalogs, "japan", "atlantis", None);
        assert_eq!(decision.outcome, Outcome::DataMissing { unknown: vec!["atlantis".into()] });
        assert!(decision.target_name.is_empty());

        let decision = resolve(&catalogs, "atlantis", "atlantis", None);
        assert_eq!(decision.outcome, Outcome::DataMissing { unknown: vec!["atlantis".into()] });
    }

    #[test]
    fn explicit_rule_allows_listed_class() {
        let catalogs = fixture();
        let decision = resolve(&catalogs, "japan", "united_states", Some("1"));
        match decision.outcome {
            Outcome::Allowed(ruling) => {
                assert_eq!(ruling.station_license_required, Some(false));
                assert_eq!(ruling.note.get("en"), Some("FCC reciprocal permit"));
            }
            other => panic!("expected Allowed, got {other:?}"),
        }
        assert_eq!(decision.license_class.as_deref(), Some("1"));
    }

    #[test]
    fn explicit_rule_denies_other_classes_with_same_details() {
        let catalogs = fixture();
        let decision = resolve(&catalogs, "japan", "united_states", Some("3"));
        match decision.outcome {
            Outcome::Denied(ruling) => {
                assert_eq!(ruling.links.len(), 1);
                assert_eq!(ruling.note.get("en"), Some("FCC reciprocal permit"));
            }
            other => panic!("expected Denied, got {other:?}"),
        }
    }

    #[test]
    fn missing_class_is_denied_by_explicit_rule() {
        let catalogs = fixture();
        assert_eq!(resolve(&catalogs, "japan", "united_states", None).kind(), OutcomeKind::Denied);
        assert_eq!(resolve(&catalogs, "japan", "united_states", Some("")).kind(), OutcomeKind::Denied);
    }

    #[test]
    fn explicit_denial_beats_shared_treaty() {
        let catalogs = fixture();
        // germany and united_states share "cept", but the rule has an empty allow list.
        let decision = resolve(&catalogs, "germany", "united_states", Some("A"));
        assert_eq!(decision.kind(), OutcomeKind::Denied);
    }

    #[test]
    fn treaty_condition_supplies_station_requirement() {
        let catalogs = fixture();
        let decision = resolve(&catalogs, "germany", "france", Some("A"));
        match decision.outcome {
            Outcome::AllowedByTreaty(ruling) => {
                assert_eq!(ruling.treaty_id, "cept");
                assert_eq!(ruling.treaty_name, "CEPT T/R 61-01");
                assert_eq!(ruling.equivalent_class.as_deref(), Some("CEPT"));
                assert_eq!(ruling.station_license_required, Some(true));
                assert_eq!(ruling.links.len(), 1);
            }
            other => panic!("expected AllowedByTreaty, got {other:?}"),
        }
    }

    #[test]
    fn primary_treaty_follows_home_order() {
        let catalogs = fixture();
        let from_germany = resolve(&catalogs, "germany", "france", None);
        let from_france = resolve(&catalogs, "france", "germany", None);
        match (from_germany.outcome, from_france.outcome) {
            (Outcome::AllowedByTreaty(a), Outcome::AllowedByTreaty(b)) => {
                assert_eq!(a.treaty_id, "cept");
                assert_eq!(b.treaty_id, "harec");
            }
            other => panic!("unexpected outcomes {other:?}"),
        }
    }

    #[test]
    fn unmatched_class_leaves_treaty_details_unspecified() {
        let catalogs = fixture();
        let decision = resolve(&catalogs, "germany", "france", Some("Z"));
        match decision.outcome {
            Outcome::AllowedByTreaty(ruling) => {
                assert_eq!(ruling.equivalent_class, None);
                assert_eq!(ruling.station_license_required, None);
            }
            other => panic!("expected AllowedByTreaty, got {other:?}"),
        }
    }

    #[test]
    fn substring_matching_is_bidirectional_and_exact_mode_is_strict() {
        let catalogs = fixture();
        let lenient = RuleResolver::new(&catalogs);
        let strict = RuleResolver::with_condition_match(&catalogs, ConditionMatch::Exact);

        let treaty_class = |decision: Decision| match decision.outcome {
            Outcome::AllowedByTreaty(ruling) => ruling.equivalent_class,
            other => panic!("expected AllowedByTreaty, got {other:?}"),
        };

        assert_eq!(treaty_class(lenient.resolve("germany", "france", Some("a1"))).as_deref(), Some("CEPT"));
        assert_eq!(treaty_class(lenient.resolve("germany", "france", Some("nov"))).as_deref(), Some("CEPT Novice"));
        assert_eq!(treaty_class(strict.resolve("germany", "france", Some("a1"))), None);
        assert_eq!(treaty_class(strict.resolve("germany", "france", Some("novice"))).as_deref(), Some("CEPT Novice"));
    }

    #[test]
    fn empty_pattern_or_class_never_matches() {
        for mode in [ConditionMatch::Substring, ConditionMatch::Exact] {
            assert!(!class_matches("", "A1", mode));
            assert!(!class_matches("A", "", mode));
            assert!(!class_matches("", "", mode));
        }

        let source = InMemorySource::new()
            .with_country(country("a", &["open"], "A"))
            .with_country(country("b", &["open"], "B"))
            .with_treaty("open", Treaty {
                name: "Open".into(),
                conditions: vec![TreatyCondition {
                    home_class_pattern: String::new(),
                    equivalent_class: Some("Any".into()),
                    requires_station_license: None,
                }],
                ..Treaty::default()
            });
        let catalogs = Catalogs::from_source(&source);
        match resolve(&catalogs, "a", "b", Some("A1")).outcome {
            Outcome::AllowedByTreaty(ruling) => assert_eq!(ruling.equivalent_class, None),
            other => panic!("expected AllowedByTreaty, got {other:?}"),
        }
    }

    #[test]
    fn no_rule_and_no_treaty_is_unresolved() {
        let catalogs = fixture();
        let decision = resolve(&catalogs, "japan", "brazil", Some("1"));
        assert_eq!(decision.outcome, Outcome::Unresolved { target_prefix: "PY".into() });
    }

    #[test]
    fn treaty_missing_from_matrix_is_named_by_id() {
        let source = InMemorySource::new()
            .with_country(country("a", &["ghost"], "A"))
            .with_country(country("b", &["ghost"], "B"));
        let catalogs = Catalogs::from_source(&source);
        match resolve(&catalogs, "a", "b", Some("x")).outcome {
            Outcome::AllowedByTreaty(ruling) => {
                assert_eq!(ruling.treaty_name, "ghost");
                assert!(ruling.links.is_empty());
            }
            other => panic!("expected AllowedByTreaty, got {other:?}"),
        }
    }

    #[test]
    fn helper_lookups_fall_back_to_ids() {
        let catalogs = fixture();
        assert_eq!(country_name(&catalogs, "japan", "ja"), "japan");
        assert_eq!(country_name(&catalogs, "atlantis", "en"), "atlantis");
        assert!(license_class_names(&catalogs, "japan", "en").is_empty());
    }
}
