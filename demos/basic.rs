// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # Basic Reciprocity Engine Example
//!
//! Builds a small catalog in memory, resolves a handful of (home, target,
//! class) triples and prints the rendered messages in English and Japanese.
//! Run with:
//!
//! ```bash
//! cargo run --example basic
//! ```

use reciprocity_core::{
    config::Config,
    engine::ReciprocityEngine,
    source::InMemorySource,
    types::{
        BilateralRule, Country, LicenseClassEntry, LicenseRecord, Link, LocalizedText, Treaty,
        TreatyCondition,
    },
};

fn country(id: &str, en: &str, ja: &str, prefix: &str, treaties: &[&str]) -> Country {
    Country {
        name: LocalizedText::new().with("en", en).with("ja", ja),
        prefix: prefix.into(),
        treaties: treaties.iter().map(|id| (*id).into()).collect(),
        ..Country::stub(id)
    }
}

fn main() {
    println!("Reciprocity Engine — Basic Example\n");

    // -----------------------------------------------------------------------
    // 1. Assemble the catalogs
    // -----------------------------------------------------------------------
    let source = InMemorySource::new()
        .with_country(country("japan", "Japan", "日本", "JA", &[]))
        .with_country(country("united_states", "United States", "アメリカ合衆国", "W", &["cept"]))
        .with_country(country("germany", "Germany", "ドイツ", "DL", &["cept"]))
        .with_country(country("brazil", "Brazil", "ブラジル", "PY", &[]))
        .with_treaty(
            "cept",
            Treaty {
                name: "CEPT T/R 61-01".into(),
                conditions: vec![TreatyCondition {
                    home_class_pattern: "Extra".into(),
                    equivalent_class: Some("CEPT Class 1".into()),
                    requires_station_license: Some(false),
                }],
                ..Treaty::default()
            },
        )
        .with_licenses(LicenseRecord {
            id: "japan".into(),
            classes: [("1", "1st class"), ("2", "2nd class")]
                .iter()
                .map(|(id, name)| LicenseClassEntry {
                    id: (*id).into(),
                    name: LocalizedText::new().with("en", name),
                })
                .collect(),
        })
        .with_rule(BilateralRule {
            home: "japan".into(),
            target: "united_states".into(),
            allowed_home_classes: vec!["1".into(), "2".into()],
            requires_station_license: Some(false),
            links: vec![Link {
                url: "https://www.fcc.gov".into(),
                title: LocalizedText::new().with("en", "FCC"),
            }],
            ..BilateralRule::default()
        });

    let engine = ReciprocityEngine::from_source(Config::default(), &source);

    println!("License classes for japan:");
    for class in engine.license_classes("japan") {
        println!("  {} — {}", class.class_id, class.name.display_or("en", &class.class_id));
    }
    println!();

    // -----------------------------------------------------------------------
    // 2. Resolve and render
    // -----------------------------------------------------------------------
    let queries: &[(&str, &str, Option<&str>)] = &[
        ("japan", "japan", None),
        ("japan", "united_states", Some("1")),
        ("japan", "united_states", Some("3")),
        ("united_states", "germany", Some("Amateur Extra")),
        ("japan", "brazil", None),
        ("japan", "atlantis", None),
    ];

    for (home, target, class) in queries {
        let decision = engine.check(home, target, *class);
        println!("{home} → {target} (class {}): {:?}", class.unwrap_or("-"), decision.kind());
        for locale in ["en", "ja"] {
            let message = engine.explain(&decision, Some(locale));
            println!("  [{locale}] {}", message.text);
        }
        for link in &engine.explain(&decision, None).links {
            println!("  link: {} <{}>", link.title.display_or("en", &link.url), link.url);
        }
        println!();
    }

    // -----------------------------------------------------------------------
    // 3. Decisions serialise for transport
    // -----------------------------------------------------------------------
    let decision = engine.check("united_states", "germany", Some("Amateur Extra"));
    match serde_json::to_string_pretty(&decision) {
        Ok(json) => println!("Decision as JSON:\n{json}"),
        Err(error) => eprintln!("serialisation failed: {error}"),
    }
}
