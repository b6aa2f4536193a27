// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Fills `application_url` and `detail_note` on Japanese-home rules from the
//! publisher's overseas-operation pages.
//!
//! One run is:
//!
//! 1. fetch the main page (failure is fatal);
//! 2. collect same-site candidate links under `/Japanese/` or `/English/`
//!    from the main page, then follow every same-site link on those pages
//!    for `crawl_depth` further levels;
//! 3. for every rule with `home == "japan"`, locate the target's page: an
//!    anchor on the main page naming the target, else the first link near
//!    the target's name on the main page, else the first candidate page whose
//!    body mentions it, else a candidate whose file name matches;
//! 4. extract a note from that page and record both on the rule;
//! 5. rewrite `rules.yml` only if something changed.
//!
//! Every page is fetched at most once per run, failures included.

pub mod extract;
pub mod fetch;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use reciprocity_core::types::LocalizedText;
use reciprocity_std::{LoadError, RuleUpdate, RulesFile, WriteError};
use url::Url;

use self::extract::{
    extract_detail_note, filename_matches, find_country_link, find_link_near_name, hrefs, target_names,
    NEAR_NAME_WINDOW,
};
use self::fetch::{FetchError, Fetcher};
use crate::exit;

/// Site root used when none is given.
pub const DEFAULT_BASE_URL: &str = "https://www.jarl.org";
/// Overseas-operation index used when none is given.
pub const DEFAULT_MAIN_PAGE: &str = "https://www.jarl.org/Japanese/8_World/8-1_overseas/8-1_Overseas.htm";

/// Link levels followed past the main page's candidates when none is given.
pub const DEFAULT_CRAWL_DEPTH: usize = 1;
/// Per-request timeout, in seconds, when none is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Home country whose rules this tool maintains.
const HOME: &str = "japan";

/// Path fragments that mark a link as part of the publisher's own content.
const CANDIDATE_SECTIONS: &[&str] = &["/Japanese/", "/English/"];

/// Settings for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// `rules.yml` to update in place.
    pub rules: PathBuf,
    /// Links outside this origin are never followed.
    pub base_url: Url,
    pub main_page: Url,
    /// `0` considers only links on the main page; each further level follows
    /// the same-site links of the previous one.
    pub crawl_depth: usize,
    pub timeout: Duration,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Japanese-home rules looked at.
    pub examined: usize,
    /// Rules with at least one changed field.
    pub updated: usize,
    /// Whether `rules.yml` was rewritten.
    pub written: bool,
}

/// A run that could not complete.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("rules file not found: \"{}\"", .0.display())]
    RulesMissing(PathBuf),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("main page {url} is unreachable: {source}")]
    MainPage {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl EnrichError {
    /// Process exit code reported by `enrich-rules`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::RulesMissing(_) => exit::MISSING_INPUT,
            Self::MainPage { .. } => exit::CHECK_FAILED,
            Self::Load(_) | Self::Write(_) => exit::FAILURE,
        }
    }
}

/// Run one enrichment pass over `config.rules` using `fetcher`.
///
/// # Errors
///
/// - [`EnrichError::RulesMissing`] if the rules file does not exist.
/// - [`EnrichError::MainPage`] if the main page cannot be fetched.
/// - [`EnrichError::Load`] / [`EnrichError::Write`] if the rules file cannot
///   be read or rewritten.
///
/// Individual pages that fail to load are logged and skipped.
pub async fn run<F>(config: &EnrichConfig, fetcher: &F) -> Result<Summary, EnrichError>
where
    F: Fetcher + ?Sized,
{
    if !config.rules.exists() {
        return Err(EnrichError::RulesMissing(config.rules.clone()));
    }
    let mut file = RulesFile::open(&config.rules)?;

    let main_html = fetcher
        .fetch(&config.main_page)
        .await
        .map_err(|source| EnrichError::MainPage { url: config.main_page.to_string(), source })?;

    let mut crawler = Crawler::new(fetcher, config.base_url.clone());
    crawler.remember(&config.main_page, Some(main_html.clone()));
    let candidates = crawler.crawl(&config.main_page, &main_html, config.crawl_depth).await;
    tracing::info!(candidates = candidates.len(), depth = config.crawl_depth, "candidate pages collected");

    let mut summary = Summary::default();
    for index in 0..file.len() {
        let Some(rule) = file.rule(index) else {
            continue;
        };
        if rule.home != HOME {
            continue;
        }
        summary.examined += 1;

        let Some(page) = crawler.locate(&rule.target, &config.main_page, &main_html, &candidates).await else {
            tracing::info!(country = %rule.target, "no page found");
            continue;
        };

        let note = crawler.page(&page).await.and_then(|body| extract_detail_note(&body));
        if let Some(extraction) = &note {
            tracing::debug!(country = %rule.target, confidence = ?extraction.confidence, "note extracted");
        }
        let update = RuleUpdate {
            application_url: Some(page.to_string()),
            detail_note: note.map(|extraction| {
                LocalizedText::new().with("en", &extraction.text).with("ja", &extraction.text)
            }),
        };
        if file.apply(index, &update) {
            tracing::info!(country = %rule.target, url = %page, "rule updated");
            summary.updated += 1;
        }
    }

    summary.written = file.save()?;
    Ok(summary)
}

/// Page cache plus link discovery for one run.
struct Crawler<'f, F: Fetcher + ?Sized> {
    fetcher: &'f F,
    base: Url,
    pages: HashMap<Url, Option<String>>,
}

impl<'f, F: Fetcher + ?Sized> Crawler<'f, F> {
    fn new(fetcher: &'f F, base: Url) -> Self {
        Self { fetcher, base, pages: HashMap::new() }
    }

    fn remember(&mut self, url: &Url, body: Option<String>) {
        self.pages.insert(url.clone(), body);
    }

    /// Body of `url`, fetched on first use.  `None` if it failed to load.
    async fn page(&mut self, url: &Url) -> Option<String> {
        if let Some(cached) = self.pages.get(url) {
            return cached.clone();
        }
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => Some(body),
            Err(error) => {
                tracing::warn!(%url, %error, "page skipped");
                None
            }
        };
        self.remember(url, body.clone());
        body
    }

    /// Same-site links on `html`, resolved against `page_url`, without
    /// fragments or repeats.
    fn site_links(&self, page_url: &Url, html: &str) -> Vec<Url> {
        let mut links: Vec<Url> = Vec::new();
        for href in hrefs(html) {
            let Ok(mut link) = page_url.join(href) else {
                continue;
            };
            link.set_fragment(None);
            let same_site = link.scheme() == self.base.scheme() && link.host_str() == self.base.host_str();
            if same_site && !links.contains(&link) {
                links.push(link);
            }
        }
        links
    }

    /// [`Self::site_links`] restricted to the publisher's content sections.
    fn candidate_links(&self, page_url: &Url, html: &str) -> Vec<Url> {
        let mut links = self.site_links(page_url, html);
        links.retain(|link| CANDIDATE_SECTIONS.iter().any(|section| link.path().contains(section)));
        links
    }

    /// Candidates from the main page, then `depth` levels of same-site links
    /// reached from them.
    async fn crawl(&mut self, main_page: &Url, main_html: &str, depth: usize) -> Vec<Url> {
        let mut candidates = self.candidate_links(main_page, main_html);
        candidates.retain(|link| link != main_page);
        let mut frontier = candidates.clone();

        for level in 1..=depth {
            let mut next = Vec::new();
            for url in &frontier {
                let Some(body) = self.page(url).await else {
                    continue;
                };
                for link in self.site_links(url, &body) {
                    if &link != main_page && !candidates.contains(&link) {
                        candidates.push(link.clone());
                        next.push(link);
                    }
                }
            }
            tracing::debug!(level, found = next.len(), "crawl level done");
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        candidates
    }

    /// The page describing `target`, if one can be found.
    async fn locate(&mut self, target: &str, main_page: &Url, main_html: &str, candidates: &[Url]) -> Option<Url> {
        let names = target_names(target);

        if let Some(link) = find_country_link(main_html, &names).and_then(|href| main_page.join(href).ok()) {
            if self.page(&link).await.is_some() {
                return Some(link);
            }
        }

        for name in &names {
            let Some(link) =
                find_link_near_name(main_html, name, NEAR_NAME_WINDOW).and_then(|href| main_page.join(href).ok())
            else {
                continue;
            };
            if self.page(&link).await.is_some() {
                return Some(link);
            }
        }

        for candidate in candidates {
            let Some(body) = self.page(candidate).await else {
                continue;
            };
            let body = body.to_lowercase();
            if names.iter().any(|name| body.contains(&name.to_lowercase())) {
                return Some(candidate.clone());
            }
        }

        candidates.iter().find(|candidate| filename_matches(candidate, target)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::fetch::StaticFetcher;

    const MAIN: &str = "https://www.jarl.org/Japanese/8_World/8-1_overseas/8-1_Overseas.htm";
    const US: &str = "https://www.jarl.org/Japanese/8_World/8-1_overseas/us.htm";
    const LIST: &str = "https://www.jarl.org/Japanese/8_World/list.htm";
    const CA2: &str = "https://www.jarl.org/Japanese/8_World/ca2.htm";

    const RULES: &str = "\
rules:
  - home: japan
    target: united_states
    allowed_home_classes: ['1']
  - home: japan
    target: germany
  - home: united_states
    target: japan
  - home: japan
    target: canada
";

    fn site() -> StaticFetcher {
        StaticFetcher::new()
            .with_page(
                MAIN,
                r#"<ul><li><a href="us.htm">アメリカ合衆国</a></li>
                   <li><a href="/Japanese/8_World/list.htm#top">一覧</a></li>
                   <li><a href="https://other.example/Japanese/x.htm">外部</a></li>
                   <li><a href="/about.htm">概要</a></li></ul>"#,
            )
            .with_page(US, "<p>米国では事前の<b>申請不要</b>で運用できます。</p>")
            .with_page(LIST, "<p>ドイツ</p>")
    }

    fn config(rules: PathBuf) -> EnrichConfig {
        EnrichConfig {
            rules,
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            main_page: Url::parse(MAIN).unwrap(),
            crawl_depth: DEFAULT_CRAWL_DEPTH,
            timeout: Duration::from_secs(1),
        }
    }

    fn rules_fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yml");
        std::fs::write(&path, RULES).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn japanese_rules_are_enriched() {
        let (_dir, path) = rules_fixture();
        let summary = run(&config(path.clone()), &site()).await.unwrap();
        assert_eq!(summary, Summary { examined: 3, updated: 2, written: true });

        let file = RulesFile::open(&path).unwrap();
        let us = file.rule(0).unwrap();
        assert_eq!(us.application_url.as_deref(), Some(US));
        assert_eq!(us.detail_note.get("ja"), Some("米国では事前の申請不要で運用できます"));
        assert_eq!(us.detail_note.get("en"), us.detail_note.get("ja"));

        let germany = file.rule(1).unwrap();
        assert_eq!(germany.application_url.as_deref(), Some(LIST));
        assert!(germany.detail_note.is_empty());

        assert_eq!(file.rule(2).unwrap().application_url, None);
        assert_eq!(file.rule(3).unwrap().application_url, None);
    }

    #[tokio::test]
    async fn second_run_writes_nothing() {
        let (_dir, path) = rules_fixture();
        run(&config(path.clone()), &site()).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let summary = run(&config(path.clone()), &site()).await.unwrap();
        assert_eq!(summary, Summary { examined: 3, updated: 0, written: false });
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn unreachable_main_page_is_fatal() {
        let (_dir, path) = rules_fixture();
        let error = run(&config(path), &StaticFetcher::new()).await.unwrap_err();
        assert!(matches!(error, EnrichError::MainPage { .. }));
    }

    #[tokio::test]
    async fn missing_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = run(&config(dir.path().join("rules.yml")), &site()).await.unwrap_err();
        assert!(matches!(error, EnrichError::RulesMissing(_)));
    }

    #[tokio::test]
    async fn default_depth_follows_links_from_candidates() {
        let fetcher = StaticFetcher::new()
            .with_page(MAIN, r#"<a href="/Japanese/8_World/list.htm">一覧</a>"#)
            .with_page(LIST, r#"<a href="ca2.htm">次へ</a>"#)
            .with_page(CA2, "<p>カナダでは申請が必要です。</p>");
        let (_dir, path) = rules_fixture();

        let summary = run(&config(path.clone()), &fetcher).await.unwrap();
        assert_eq!(summary, Summary { examined: 3, updated: 1, written: true });

        let file = RulesFile::open(&path).unwrap();
        let canada = file.rule(3).unwrap();
        assert_eq!(canada.application_url.as_deref(), Some(CA2));
        assert_eq!(canada.detail_note.get("ja"), Some("カナダでは申請が必要です"));
        assert_eq!(file.rule(0).unwrap().application_url, None);
    }

    #[tokio::test]
    async fn link_next_to_the_name_on_the_main_page() {
        let ca = "https://www.jarl.org/Japanese/8_World/ca.htm";
        let fetcher = StaticFetcher::new().with_page(ca, "<p>詳細</p>");
        let main = Url::parse(MAIN).unwrap();
        let main_html = r#"<table><tr><td>カナダ</td><td><a href="/Japanese/8_World/ca.htm">詳細</a></td></tr></table>"#;

        let mut crawler = Crawler::new(&fetcher, Url::parse(DEFAULT_BASE_URL).unwrap());
        let candidates = crawler.crawl(&main, main_html, DEFAULT_CRAWL_DEPTH).await;
        let found = crawler.locate("canada", &main, main_html, &candidates).await;
        assert_eq!(found.as_ref().map(Url::as_str), Some(ca));
    }

    #[test]
    fn exit_codes_per_failure() {
        let io = || std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let missing = EnrichError::RulesMissing(PathBuf::from("rules.yml"));
        let main_page = EnrichError::MainPage { url: MAIN.into(), source: FetchError::NotFound(MAIN.into()) };
        let load = EnrichError::Load(LoadError::Io { path: PathBuf::from("rules.yml"), source: io() });
        let write = EnrichError::Write(WriteError::Io { path: PathBuf::from("rules.yml"), source: io() });

        assert_eq!(missing.exit_code(), exit::MISSING_INPUT);
        assert_eq!(main_page.exit_code(), exit::CHECK_FAILED);
        assert_eq!(load.exit_code(), exit::FAILURE);
        assert_eq!(write.exit_code(), exit::FAILURE);
    }

    #[test]
    fn candidates_stay_on_site_and_in_section() {
        let fetcher = StaticFetcher::new();
        let crawler = Crawler::new(&fetcher, Url::parse(DEFAULT_BASE_URL).unwrap());
        let main = Url::parse(MAIN).unwrap();
        let links = crawler.candidate_links(&main, r#"<a href="us.htm">a</a><a href="us.htm#x">b</a>
            <a href="/English/8_World/fr.htm">c</a><a href="/index.htm">d</a>
            <a href="http://www.jarl.org/Japanese/plain.htm">e</a>"#);
        assert_eq!(
            links.iter().map(Url::as_str).collect::<Vec<_>>(),
            [US, "https://www.jarl.org/English/8_World/fr.htm"]
        );
    }

    #[tokio::test]
    async fn deeper_crawl_reaches_linked_pages() {
        let fr = "https://www.jarl.org/8_World/fr.htm";
        let fetcher = StaticFetcher::new()
            .with_page(
                LIST,
                r#"<a href="/8_World/fr.htm">仏</a><a href="https://other.example/8_World/de.htm">独</a>"#,
            )
            .with_page(fr, r#"<p>フランスでの運用</p><a href="/8_World/it.htm">伊</a>"#)
            .with_page("https://www.jarl.org/8_World/it.htm", "<p>イタリア</p>");
        let main = Url::parse(MAIN).unwrap();
        let main_html = r#"<a href="/Japanese/8_World/list.htm">一覧</a>"#;

        let mut shallow = Crawler::new(&fetcher, Url::parse(DEFAULT_BASE_URL).unwrap());
        let candidates = shallow.crawl(&main, main_html, 0).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(shallow.locate("france", &main, main_html, &candidates).await, None);

        let mut one = Crawler::new(&fetcher, Url::parse(DEFAULT_BASE_URL).unwrap());
        let candidates = one.crawl(&main, main_html, 1).await;
        assert_eq!(candidates.iter().map(Url::as_str).collect::<Vec<_>>(), [LIST, fr]);
        let found = one.locate("france", &main, main_html, &candidates).await.unwrap();
        assert_eq!(found.as_str(), fr);

        let mut two = Crawler::new(&fetcher, Url::parse(DEFAULT_BASE_URL).unwrap());
        assert_eq!(two.crawl(&main, main_html, 2).await.len(), 3);
    }

    #[tokio::test]
    async fn file_name_is_the_last_resort() {
        let fetcher = StaticFetcher::new();
        let main = Url::parse(MAIN).unwrap();
        let candidates = vec![Url::parse("https://www.jarl.org/Japanese/8_World/NewZealand.htm").unwrap()];

        let mut crawler = Crawler::new(&fetcher, Url::parse(DEFAULT_BASE_URL).unwrap());
        let found = crawler.locate("new_zealand", &main, "", &candidates).await;
        assert_eq!(found, candidates.first().cloned());
    }
}
