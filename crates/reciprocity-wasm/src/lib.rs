// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # reciprocity-wasm
//!
//! WebAssembly bindings for the reciprocal licensing resolver.
//!
//! This crate exposes `reciprocity-core` to the JavaScript of a static site
//! via `wasm-bindgen`.  The page fetches its catalog documents, hands them
//! over once, and then resolves and renders as the operator changes the
//! selectors.  DOM work stays in JavaScript.
//!
//! ## Architecture
//!
//! Each handle owns a [`ReciprocityEngine`].  Engines are stored in a
//! thread-local registry keyed by integer handles because WASM is
//! single-threaded and `wasm_bindgen` cannot export opaque Rust structs
//! across the JS boundary without serialisation overhead.
//!
//! ## Exported Functions
//!
//! | Function                    | Description                                          |
//! |-----------------------------|------------------------------------------------------|
//! | `load_catalogs`             | Merge four JSON catalog documents, return a handle   |
//! | `load_catalogs_with_config` | Same, with an explicit JSON engine config            |
//! | `last_error`                | Why the last `load_*` call returned `u32::MAX`       |
//! | `add_translations`          | Overlay a JSON translation table                     |
//! | `resolve`                   | Decision as a JSON string                            |
//! | `resolve_object`            | Decision as a plain JS object                        |
//! | `render`                    | Rendered message as a JSON string                    |
//! | `license_classes`           | `[{id, name}]` for a country's class selector        |
//! | `country_names`             | `[{id, name}]` for the country selectors             |
//! | `destroy_catalogs`          | Release a handle and free its memory                 |
//!
//! ## JavaScript Usage
//!
//! ```js
//! import init, { load_catalogs, render, license_classes } from '@reciprocity/wasm';
//!
//! await init();
//!
//! const [countries, treaties, licenses, rules] = await Promise.all(
//!   ['countries', 'treaties', 'licenses', 'rules'].map((name) =>
//!     fetch(`/data/${name}.json`).then((response) => response.text())),
//! );
//! const handle = load_catalogs(countries, treaties, licenses, rules);
//!
//! const classes = JSON.parse(license_classes(handle, 'japan', 'ja'));
//! const message = JSON.parse(render(handle, 'japan', 'germany', classes[0].id, 'ja'));
//! document.querySelector('#result').textContent = message.text;
//! ```

use reciprocity_core::{
    catalog::Catalogs,
    composer::{Message, TranslationTable},
    config::Config,
    engine::ReciprocityEngine,
    resolver::{country_name, license_class_names},
    types::{BilateralRule, Country, Decision, LicenseRecord, RuleTable, TreatyMatrix},
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Engine registry
// ---------------------------------------------------------------------------

// WASM is single-threaded; RefCell<HashMap<...>> is safe here.
thread_local! {
    static ENGINES: RefCell<HashMap<u32, ReciprocityEngine>> = RefCell::new(HashMap::new());
    static NEXT_HANDLE: RefCell<u32> = RefCell::new(0);
    static LAST_ERROR: RefCell<Option<String>> = RefCell::new(None);
}

/// Allocate a new handle. Handles wrap around at `u32::MAX - 1` to reserve
/// `u32::MAX` as the error sentinel.
fn next_handle() -> u32 {
    NEXT_HANDLE.with(|counter| {
        let handle = *counter.borrow();
        let next = if handle >= u32::MAX - 1 { 0 } else { handle + 1 };
        *counter.borrow_mut() = next;
        handle
    })
}

fn register(engine: ReciprocityEngine) -> u32 {
    let handle = next_handle();
    ENGINES.with(|engines| {
        engines.borrow_mut().insert(handle, engine);
    });
    LAST_ERROR.with(|last| *last.borrow_mut() = None);
    handle
}

fn fail(message: String) -> u32 {
    LAST_ERROR.with(|last| *last.borrow_mut() = Some(message));
    u32::MAX
}

/// Helper: run a closure with shared access to an engine. Returns
/// `Err(message)` if the handle is unknown.
fn with_engine<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&ReciprocityEngine) -> R,
{
    ENGINES.with(|engines| {
        let map = engines.borrow();
        match map.get(&handle) {
            Some(engine) => Ok(callback(engine)),
            None => Err(format!("unknown catalog handle {handle}")),
        }
    })
}

fn with_engine_mut<F, R>(handle: u32, callback: F) -> Result<R, String>
where
    F: FnOnce(&mut ReciprocityEngine) -> R,
{
    ENGINES.with(|engines| {
        let mut map = engines.borrow_mut();
        match map.get_mut(&handle) {
            Some(engine) => Ok(callback(engine)),
            None => Err(format!("unknown catalog handle {handle}")),
        }
    })
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| error_json(&format!("serialisation error: {error}")))
}

/// Parse one catalog document; blank input is an empty catalog.
fn parse<T: for<'de> Deserialize<'de> + Default>(name: &str, json: &str) -> Result<T, String> {
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(json).map_err(|error| format!("{name} parse error: {error}"))
}

/// `rules` may be the persisted `{ "rules": [...] }` or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum RulesInput {
    Table(RuleTable),
    List(Vec<BilateralRule>),
}

impl Default for RulesInput {
    fn default() -> Self {
        RulesInput::List(Vec::new())
    }
}

impl RulesInput {
    fn into_rules(self) -> Vec<BilateralRule> {
        match self {
            RulesInput::Table(table) => table.rules,
            RulesInput::List(rules) => rules,
        }
    }
}

fn build_catalogs(
    countries_json: &str,
    treaties_json: &str,
    licenses_json: &str,
    rules_json: &str,
) -> Result<Catalogs, String> {
    let countries: Vec<Country> = parse("countries", countries_json)?;
    let treaties: TreatyMatrix = parse("treaties", treaties_json)?;
    let licenses: Vec<LicenseRecord> = parse("licenses", licenses_json)?;
    let rules: RulesInput = parse("rules", rules_json)?;
    Ok(Catalogs::load(countries, treaties.0, licenses, rules.into_rules()))
}

/// `{ "id": ..., "name": ... }` row for a selector.
#[derive(Serialize)]
struct Choice {
    id: String,
    name: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Merge the four catalog documents (JSON strings; pass `""` for an absent
/// catalog) and return a handle for subsequent calls.
///
/// `treaties_json` is the id-keyed mapping; key order is preserved.
/// Returns `u32::MAX` on parse error; see [`last_error`].
#[wasm_bindgen]
pub fn load_catalogs(countries_json: &str, treaties_json: &str, licenses_json: &str, rules_json: &str) -> u32 {
    match build_catalogs(countries_json, treaties_json, licenses_json, rules_json) {
        Ok(catalogs) => register(ReciprocityEngine::new(Config::default(), catalogs)),
        Err(error) => fail(error),
    }
}

/// [`load_catalogs`] with an explicit engine configuration:
///
/// ```json
/// { "condition_match": "exact", "default_locale": "ja" }
/// ```
#[wasm_bindgen]
pub fn load_catalogs_with_config(
    countries_json: &str,
    treaties_json: &str,
    licenses_json: &str,
    rules_json: &str,
    config_json: &str,
) -> u32 {
    let config: Config = match parse("config", config_json) {
        Ok(config) => config,
        Err(error) => return fail(error),
    };
    match build_catalogs(countries_json, treaties_json, licenses_json, rules_json) {
        Ok(catalogs) => register(ReciprocityEngine::new(config, catalogs)),
        Err(error) => fail(error),
    }
}

/// `{"error": "..."}` describing the last failed load, or `""` when the last
/// load succeeded.
#[wasm_bindgen]
pub fn last_error() -> String {
    LAST_ERROR.with(|last| last.borrow().as_deref().map(error_json).unwrap_or_default())
}

/// Overlay a nested `locale → path → text` JSON table on the handle's
/// translations.  Returns `false` on an unknown handle or malformed JSON.
#[wasm_bindgen]
pub fn add_translations(handle: u32, translations_json: &str) -> bool {
    let value: serde_json::Value = match serde_json::from_str(translations_json) {
        Ok(value) => value,
        Err(_) => return false,
    };
    let overlay = TranslationTable::from_value(value);
    with_engine_mut(handle, |engine| {
        *engine = engine.clone().with_translations(overlay);
    })
    .is_ok()
}

/// Release the catalogs associated with `handle`, freeing their memory.
///
/// After calling this function the handle is no longer valid.
#[wasm_bindgen]
pub fn destroy_catalogs(handle: u32) {
    ENGINES.with(|engines| {
        engines.borrow_mut().remove(&handle);
    });
}

// ---------------------------------------------------------------------------
// Resolution and rendering
// ---------------------------------------------------------------------------

fn decide(handle: u32, home: &str, target: &str, license_class: Option<String>) -> Result<Decision, String> {
    let license_class = non_empty(license_class);
    with_engine(handle, |engine| engine.check(home, target, license_class.as_deref()))
}

/// Resolve a query and return the JSON-serialised [`Decision`], or
/// `{"error":"..."}` on an unknown handle.
///
/// The outcome is tagged by `outcome.kind`: `data_missing`, `domestic`,
/// `allowed`, `denied`, `allowed_by_treaty` or `unresolved`.
#[wasm_bindgen]
pub fn resolve(handle: u32, home: &str, target: &str, license_class: Option<String>) -> String {
    match decide(handle, home, target, license_class) {
        Ok(decision) => to_json(&decision),
        Err(error) => error_json(&error),
    }
}

/// [`resolve`] returning a plain JS object instead of a string.
#[wasm_bindgen]
pub fn resolve_object(
    handle: u32,
    home: &str,
    target: &str,
    license_class: Option<String>,
) -> Result<JsValue, JsValue> {
    let decision = decide(handle, home, target, license_class).map_err(|error| JsValue::from_str(&error))?;
    serde_wasm_bindgen::to_value(&decision).map_err(JsValue::from)
}

/// Resolve and render in `locale` (the engine's default locale when absent),
/// returning the JSON-serialised [`Message`].
#[wasm_bindgen]
pub fn render(
    handle: u32,
    home: &str,
    target: &str,
    license_class: Option<String>,
    locale: Option<String>,
) -> String {
    let license_class = non_empty(license_class);
    let rendered: Result<Message, String> = with_engine(handle, |engine| {
        let (_, message) = engine.evaluate(home, target, license_class.as_deref(), locale.as_deref());
        message
    });
    match rendered {
        Ok(message) => to_json(&message),
        Err(error) => error_json(&error),
    }
}

// ---------------------------------------------------------------------------
// Selector data
// ---------------------------------------------------------------------------

/// `[{id, name}]` of `country`'s license classes in display order, names in
/// `locale`.  Unknown countries yield `[]`.
#[wasm_bindgen]
pub fn license_classes(handle: u32, country: &str, locale: &str) -> String {
    let choices = with_engine(handle, |engine| {
        license_class_names(engine.catalogs(), country, locale)
            .into_iter()
            .map(|(id, name)| Choice { id, name })
            .collect::<Vec<_>>()
    });
    match choices {
        Ok(choices) => to_json(&choices),
        Err(error) => error_json(&error),
    }
}

/// `[{id, name}]` of every known country, in merge order, names in `locale`.
#[wasm_bindgen]
pub fn country_names(handle: u32, locale: &str) -> String {
    let choices = with_engine(handle, |engine| {
        let catalogs = engine.catalogs();
        catalogs
            .countries()
            .iter()
            .map(|country| Choice {
                id: country.id.clone(),
                name: country_name(catalogs, &country.id, locale),
            })
            .collect::<Vec<_>>()
    });
    match choices {
        Ok(choices) => to_json(&choices),
        Err(error) => error_json(&error),
    }
}

// ---------------------------------------------------------------------------
// wasm-bindgen-test
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Native unit tests (run with `cargo test` outside of WASM)
// ---------------------------------------------------------------------------
