// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Engine-level configuration.
//!
//! [`Config`] is the single entry point for tuning the engine at construction
//! time.  All fields have sensible defaults so that `Config::default()` is
//! always a valid starting point.

use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::types::FALLBACK_LOCALE;

/// How a treaty condition's `home_class` pattern is compared with the
/// operator's license class.  Both modes ignore ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionMatch {
    /// Either side containing the other counts as a match, so pattern `"A"`
    /// matches class `"A1"` and pattern `"A1"` matches class `"A"`.  This is
    /// the behaviour the published data was curated against; it can pair
    /// overlapping class names such as `"A"` and `"AE"`.  An empty pattern or
    /// class never matches, although the empty string is contained in every
    /// class.
    #[default]
    Substring,
    /// Pattern and class must be equal.  A deliberate deviation from the
    /// published behaviour for callers who need it.
    Exact,
}

impl ConditionMatch {
    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionMatch::Substring => "substring",
            ConditionMatch::Exact     => "exact",
        }
    }
}

/// Top-level configuration for [`ReciprocityEngine`](crate::engine::ReciprocityEngine).
///
/// # Examples
///
/// ```rust
/// use reciprocity_core::config::{Config, ConditionMatch};
///
/// let config = Config {
///     condition_match: ConditionMatch::Exact,
///     ..Config::default()
/// };
/// assert_eq!(config.default_locale, "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Treaty condition matching mode.  Defaults to
    /// [`ConditionMatch::Substring`].
    #[serde(default)]
    pub condition_match: ConditionMatch,

    /// Locale used by `explain` when the caller does not name one.
    /// Defaults to `"en"`.
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_locale() -> String {
    FALLBACK_LOCALE.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            condition_match: ConditionMatch::default(),
            default_locale:  default_locale(),
        }
    }
}
