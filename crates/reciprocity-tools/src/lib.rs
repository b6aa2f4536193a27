// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # reciprocity-tools
//!
//! Maintenance tooling for the catalog data under `_data/`.
//!
//! - [`validate`] checks that every rule refers to known countries and
//!   license classes and that its links are well-formed URLs
//!   (binary: `validate-data`).
//! - [`enrich`] crawls the publisher's overseas-operation pages and records
//!   application URLs and notes on Japanese-home rules (binary:
//!   `enrich-rules`).
//!
//! Neither tool is used by the resolver at runtime.

pub mod enrich;
pub mod validate;

/// Process exit codes shared by the binaries.
pub mod exit {
    /// Ran to completion.
    pub const OK: u8 = 0;
    /// Anything not covered below.
    pub const FAILURE: u8 = 1;
    /// A required input file does not exist.
    pub const MISSING_INPUT: u8 = 2;
    /// The validator found errors, or the enricher could not reach its main page.
    pub const CHECK_FAILED: u8 = 3;
}

/// Install the `tracing` fmt subscriber, filtered by `RUST_LOG` (default
/// `info`), writing to stderr.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
