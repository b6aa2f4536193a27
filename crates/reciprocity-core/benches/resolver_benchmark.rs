// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Criterion benchmark suite for the reciprocity engine.
//!
//! - Catalog merge with synthesized members
//! - Rule resolution along each evaluation path
//! - Message rendering in a built-in and an unknown locale
//!
//! Run with: `cargo bench --bench resolver_benchmark`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use reciprocity_core::{
    catalog::Catalogs,
    composer::{MessageComposer, TranslationTable},
    resolver::RuleResolver,
    source::InMemorySource,
    types::{BilateralRule, Country, LicenseClassEntry, LicenseRecord, LocalizedText, Treaty, TreatyCondition},
};

/// A registry of `size` countries.  Even-numbered countries join "cept",
/// every third one also joins "harec", and each country has a bilateral
/// rule towards its successor.
fn synthetic_source(size: usize) -> InMemorySource {
    let mut source = InMemorySource::new();
    let mut cept_members = Vec::new();

    for index in 0..size {
        let id = format!("country-{index:04}");
        let mut treaties = Vec::new();
        if index % 2 == 0 {
            treaties.push("cept".to_string());
        }
        if index % 3 == 0 {
            treaties.push("harec".to_string());
        }
        source = source
            .with_country(Country {
                name: LocalizedText::new().with("en", &format!("Country {index}")),
                treaties,
                prefix: format!("P{index}"),
                synthesized: false,
                ..Country::stub(&id)
            })
            .with_licenses(LicenseRecord {
                id: id.clone(),
                classes: ["1", "2", "3"]
                    .iter()
                    .map(|class| LicenseClassEntry { id: (*class).into(), name: LocalizedText::new() })
                    .collect(),
            })
            .with_rule(BilateralRule {
                home: id.clone(),
                target: format!("country-{:04}", (index + 1) % size),
                allowed_home_classes: vec!["1".into()],
                requires_station_license: Some(false),
                note: LocalizedText::new().with("en", "Apply in advance."),
                ..BilateralRule::default()
            });
        cept_members.push(id);
    }
    // Members that are not in the registry get synthesized.
    cept_members.extend((0..size / 10).map(|index| format!("extra-{index:04}")));

    source
        .with_treaty("cept", Treaty {
            name: "CEPT T/R 61-01".into(),
            members: cept_members,
            conditions: vec![TreatyCondition {
                home_class_pattern: "1".into(),
                equivalent_class: Some("CEPT".into()),
                requires_station_license: Some(true),
            }],
            ..Treaty::default()
        })
        .with_treaty("harec", Treaty { name: "HAREC".into(), ..Treaty::default() })
}

// ---------------------------------------------------------------------------
// Merge benchmark
// ---------------------------------------------------------------------------

fn merge_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("catalog_merge");

    for size in [50usize, 250] {
        let source = synthetic_source(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |bencher, source| {
            bencher.iter(|| black_box(Catalogs::from_source(black_box(source))));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Resolve benchmark
// ---------------------------------------------------------------------------

fn resolve_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("resolve");
    let catalogs = Catalogs::from_source(&synthetic_source(250));
    let resolver = RuleResolver::new(&catalogs);

    let paths = [
        ("domestic", "country-0000", "country-0000"),
        ("explicit_rule", "country-0000", "country-0001"),
        ("shared_treaty", "country-0000", "country-0004"),
        ("unresolved", "country-0001", "country-0005"),
        ("data_missing", "country-0000", "atlantis"),
    ];

    for (label, home, target) in paths {
        group.bench_function(label, |bencher| {
            bencher.iter(|| black_box(resolver.resolve(black_box(home), black_box(target), black_box(Some("1")))));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Render benchmark
// ---------------------------------------------------------------------------

fn render_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    let catalogs = Catalogs::from_source(&synthetic_source(50));
    let translations = TranslationTable::builtin();
    let composer = MessageComposer::new(&translations);
    let allowed = RuleResolver::new(&catalogs).resolve("country-0000", "country-0001", Some("1"));
    let treaty = RuleResolver::new(&catalogs).resolve("country-0000", "country-0004", Some("1"));

    for locale in ["en", "ja", "xx"] {
        group.bench_with_input(BenchmarkId::new("allowed", locale), &locale, |bencher, locale| {
            bencher.iter(|| black_box(composer.render(black_box(&allowed), locale)));
        });
        group.bench_with_input(BenchmarkId::new("treaty", locale), &locale, |bencher, locale| {
            bencher.iter(|| black_box(composer.render(black_box(&treaty), locale)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Criterion harness
// ---------------------------------------------------------------------------

criterion_group!(benches, merge_benchmark, resolve_benchmark, render_benchmark);

criterion_main!(benches);
