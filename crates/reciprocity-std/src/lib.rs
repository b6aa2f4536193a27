// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # reciprocity-std
//!
//! `std`-only loaders for `reciprocity-core`.
//!
//! This crate provides [`FileSource`], a YAML/JSON file-backed implementation
//! of the [`CatalogSource`](reciprocity_core::CatalogSource) trait, loaders
//! for translation tables, and [`RulesFile`], the atomic rewriter used by the
//! acquisition tool.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reciprocity_core::{Catalogs, Config, ReciprocityEngine};
//! use reciprocity_std::{load_translation_dir, FileSource};
//!
//! let source = FileSource::open_dir("_data").expect("failed to load catalogs");
//! let translations = load_translation_dir("_data/i18n").expect("failed to load translations");
//!
//! let engine = ReciprocityEngine::new(Config::default(), Catalogs::from_source(&source))
//!     .with_translations(translations);
//! ```

pub mod error;
pub mod rules_file;
pub mod source;
pub mod translations;

pub use error::{LoadError, WriteError};
pub use rules_file::{RuleUpdate, RulesFile};
pub use source::file::{CatalogPaths, FileSource};
pub use translations::{load_translation_dir, load_translations};
