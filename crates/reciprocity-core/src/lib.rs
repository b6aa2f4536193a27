// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # reciprocity-core
//!
//! Decides whether an amateur radio operator licensed in one country may
//! operate in another, and explains the answer in the operator's language.
//!
//! This crate is `no_std`-compatible (requires `alloc`).  Enable the `std`
//! feature (on by default) to lift that restriction.  File loading lives in
//! `reciprocity-std`; the browser binding in `reciprocity-wasm`.
//!
//! ## Architecture
//!
//! ```text
//! ReciprocityEngine
//!   ├── Catalogs          — merged countries, treaties, license classes, rules
//!   ├── RuleResolver      — (home, target, class) → Decision
//!   └── MessageComposer   — Decision + locale → Message
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use reciprocity_core::{
//!     config::Config,
//!     engine::ReciprocityEngine,
//!     source::InMemorySource,
//!     types::{BilateralRule, Country, LocalizedText, OutcomeKind},
//! };
//!
//! let source = InMemorySource::new()
//!     .with_country(Country::stub("japan"))
//!     .with_country(Country {
//!         name: LocalizedText::new().with("en", "United States"),
//!         prefix: "W".into(),
//!         ..Country::stub("united_states")
//!     })
//!     .with_rule(BilateralRule {
//!         home: "japan".into(),
//!         target: "united_states".into(),
//!         allowed_home_classes: vec!["1".into(), "2".into()],
//!         requires_station_license: Some(false),
//!         ..BilateralRule::default()
//!     });
//!
//! let engine = ReciprocityEngine::from_source(Config::default(), &source);
//! let (decision, message) = engine.evaluate("japan", "united_states", Some("1"), Some("en"));
//!
//! assert_eq!(decision.kind(), OutcomeKind::Allowed);
//! assert!(message.text.starts_with("United States: operation is permitted"));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod catalog;
pub mod composer;
pub mod config;
pub mod config_loader;
pub mod engine;
pub mod resolver;
pub mod source;
pub mod types;

// Re-export the most commonly used items at the crate root so consumers can
// write `use reciprocity_core::ReciprocityEngine;` instead of the fully
// qualified path.
pub use catalog::Catalogs;
pub use composer::{Message, MessageComposer, TranslationTable};
pub use config::{ConditionMatch, Config};
pub use engine::ReciprocityEngine;
pub use resolver::RuleResolver;
pub use source::{CatalogSource, InMemorySource};
pub use types::{
    BilateralRule, Country, Decision, ExplicitRuling, LicenseClass, LicenseRecord, Link,
    LocalizedText, Outcome, OutcomeKind, RuleTable, Treaty, TreatyCondition, TreatyMatrix,
    TreatyRuling,
};
