// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! HTML heuristics for the publisher's overseas-operation pages.
//!
//! None of this parses HTML properly.  The pages are hand-written and small,
//! and every function here is a best-effort guess: a miss returns `None` and
//! the rule is left alone.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use url::Url;

/// How much an extracted note can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// Only the word "application" (or 申請) was found.
    Low,
    /// A stay period such as "90 days" or 3か月 was found.
    Medium,
    /// An explicit statement that an application is or is not required.
    High,
}

/// A sentence lifted from a page, with tags removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub confidence: Confidence,
}

/// Japanese keywords, most specific first, with the confidence they carry.
const JA_KEYWORDS: &[(&str, Confidence)] = &[
    ("申請不要", Confidence::High),
    ("申請が不要", Confidence::High),
    ("申請が必要", Confidence::High),
    ("申請方法", Confidence::High),
    ("90日以内", Confidence::Medium),
    ("90日", Confidence::Medium),
    ("3か月", Confidence::Medium),
    ("3ヶ月", Confidence::Medium),
    ("申請", Confidence::Low),
];

/// English keywords, matched case-insensitively.
const EN_KEYWORDS: &[(&str, Confidence)] = &[
    ("no prior application", Confidence::High),
    ("no application", Confidence::High),
    ("required to apply", Confidence::High),
    ("90 days", Confidence::Medium),
    ("3 months", Confidence::Medium),
    ("application", Confidence::Low),
];

/// Characters of context kept on each side of a Japanese keyword.
const JA_CONTEXT: usize = 120;
/// Characters of context kept on each side of an English keyword.
const EN_CONTEXT: usize = 200;

/// Display names the publisher may use for a target id, Japanese first.
/// Unknown ids are searched for verbatim.
pub fn target_names(target: &str) -> Vec<&str> {
    let names: &[&str] = match target {
        "united_states" => &["アメリカ", "アメリカ合衆国", "United States"],
        "france" => &["フランス", "France"],
        "australia" => &["オーストラリア", "Australia"],
        "new_zealand" => &["ニュージーランド", "New Zealand"],
        "germany" => &["ドイツ", "Germany"],
        "canada" => &["カナダ", "Canada"],
        "korea" => &["韓国", "Korea", "Republic of Korea"],
        "cept_members" => &["CEPT", "CEPT T/R 61-02", "CEPT加盟国"],
        _ => return vec![target],
    };
    names.to_vec()
}

/// File-name fragments that identify a target's page when its name is not
/// on the page.
const FILENAME_KEYWORDS: &[(&str, &str)] = &[
    ("korea", "korea"),
    ("Korea", "korea"),
    ("America", "united_states"),
    ("USA", "united_states"),
    ("United", "united_states"),
    ("France", "france"),
    ("Australia", "australia"),
    ("NewZealand", "new_zealand"),
    ("Germany", "germany"),
    ("Canada", "canada"),
];

/// Whether `link` looks like `target`'s page by its file name alone.
pub fn filename_matches(link: &Url, target: &str) -> bool {
    FILENAME_KEYWORDS
        .iter()
        .any(|(keyword, keyword_target)| *keyword_target == target && link.path().contains(keyword))
}

fn href_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            RegexBuilder::new(r#"href\s*=\s*["']([^"']+)["']"#)
                .case_insensitive(true)
                .build()
                .ok()
        })
        .as_ref()
}

fn anchor_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a\s*>"#).ok())
        .as_ref()
}

fn tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").ok()).as_ref()
}

/// `html` with every `<...>` tag removed.
pub fn strip_tags(html: &str) -> String {
    match tag_pattern() {
        Some(pattern) => pattern.replace_all(html, "").into_owned(),
        None => html.to_owned(),
    }
}

/// Every `href` value on the page, in document order, deduplicated.
pub fn hrefs(html: &str) -> Vec<&str> {
    let mut seen = Vec::new();
    let Some(pattern) = href_pattern() else {
        return seen;
    };
    for capture in pattern.captures_iter(html) {
        if let Some(href) = capture.get(1).map(|m| m.as_str()) {
            if !seen.contains(&href) {
                seen.push(href);
            }
        }
    }
    seen
}

/// `href` of the first anchor whose text names one of `names`.
///
/// Names are tried in order.  For each, an anchor with the name in its
/// leading text run is preferred; failing that, the name may appear anywhere
/// inside the anchor, behind nested markup.  Matching ignores case.
pub fn find_country_link<'h>(html: &'h str, names: &[&str]) -> Option<&'h str> {
    for name in names.iter().filter(|name| !name.is_empty()) {
        let escaped = regex::escape(name);
        let leading_run = format!(r#"(?i)<a[^>]+href=["']([^"']+)["'][^>]*>[^<]*{escaped}[^<]*</"#);
        match Regex::new(&leading_run) {
            Ok(regex) => {
                if let Some(href) = regex.captures(html).and_then(|capture| capture.get(1)) {
                    return Some(href.as_str());
                }
            }
            Err(error) => tracing::warn!(%name, %error, "country name does not form a valid pattern"),
        }

        let needle = name.to_lowercase();
        for capture in anchor_pattern()?.captures_iter(html) {
            let (Some(href), Some(inner)) = (capture.get(1), capture.get(2)) else {
                continue;
            };
            if strip_tags(inner.as_str()).to_lowercase().contains(&needle) {
                return Some(href.as_str());
            }
        }
    }
    None
}

/// Characters either side of a country name searched by
/// [`find_link_near_name`].
pub const NEAR_NAME_WINDOW: usize = 800;

/// First `href` within `window` characters of the first occurrence of
/// `name`, for pages that list the country in one cell and link it from a
/// neighbouring one.  `name` is matched case-sensitively.
pub fn find_link_near_name<'h>(html: &'h str, name: &str, window: usize) -> Option<&'h str> {
    if name.is_empty() {
        return None;
    }
    let at = html.find(name)?;
    let start = html[..at]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map_or(at, |(index, _)| index);
    let end = html[at..]
        .char_indices()
        .nth(window)
        .map_or(html.len(), |(index, _)| at + index);

    let capture = href_pattern()?.captures(&html[start..end])?;
    capture.get(1).map(|href| href.as_str())
}

/// The sentence around the first application-related keyword, tags removed.
///
/// Japanese keywords are tried before English ones.  The sentence is the
/// keyword plus up to a fixed number of characters either side, cut at the
/// nearest sentence end (`。` or `.`) or line break.
pub fn extract_detail_note(html: &str) -> Option<Extraction> {
    extract_around(html, JA_KEYWORDS, &['。', '\n'], JA_CONTEXT, false)
        .or_else(|| extract_around(html, EN_KEYWORDS, &['.', '\n'], EN_CONTEXT, true))
}

fn extract_around(
    html: &str,
    keywords: &[(&str, Confidence)],
    stops: &[char],
    context: usize,
    ignore_case: bool,
) -> Option<Extraction> {
    let alternation = keywords.iter().map(|(keyword, _)| regex::escape(keyword)).collect::<Vec<_>>().join("|");
    let regex = RegexBuilder::new(&alternation).case_insensitive(ignore_case).build().ok()?;
    let found = regex.find(html)?;

    let confidence = keywords
        .iter()
        .find(|(keyword, _)| {
            if ignore_case {
                keyword.eq_ignore_ascii_case(found.as_str())
            } else {
                *keyword == found.as_str()
            }
        })
        .map_or(Confidence::Low, |(_, confidence)| *confidence);

    let before = &html[..found.start()];
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| !stops.contains(c))
        .take(context)
        .last()
        .map_or(found.start(), |(index, _)| index);

    let after = &html[found.end()..];
    let end = found.end()
        + after
            .char_indices()
            .take_while(|(_, c)| !stops.contains(c))
            .take(context)
            .last()
            .map_or(0, |(index, c)| index + c.len_utf8());

    let text = strip_tags(&html[start..end]);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(Extraction { text: text.to_owned(), confidence })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_for_known_and_unknown_targets() {
        assert_eq!(target_names("germany"), ["ドイツ", "Germany"]);
        assert_eq!(target_names("brazil"), ["brazil"]);
    }

    #[test]
    fn anchor_with_name_in_text() {
        let html = r#"<ul><li><a href="/Japanese/8_World/fr.htm">フランス</a></li>
            <li><a class="x" href='/Japanese/8_World/de.htm'>ドイツ連邦共和国</a></li></ul>"#;
        assert_eq!(find_country_link(html, &["ドイツ", "Germany"]), Some("/Japanese/8_World/de.htm"));
        assert_eq!(find_country_link(html, &["カナダ"]), None);
    }

    #[test]
    fn anchor_with_name_behind_markup() {
        let html = "<a href=\"/English/us.htm\"><img src=\"flag.png\">\n<b>United States</b></a>";
        assert_eq!(find_country_link(html, &["アメリカ", "united states"]), Some("/English/us.htm"));
    }

    #[test]
    fn link_in_neighbouring_cell() {
        let html = r#"<table><tr><td>カナダ</td><td><a href="/Japanese/8_World/ca.htm">詳細</a></td></tr></table>"#;
        assert_eq!(find_country_link(html, &["カナダ"]), None);
        assert_eq!(find_link_near_name(html, "カナダ", NEAR_NAME_WINDOW), Some("/Japanese/8_World/ca.htm"));
    }

    #[test]
    fn link_outside_the_window_is_ignored() {
        let html = format!("<p>カナダ</p>{}<a href=\"/far.htm\">x</a>", "あ".repeat(20));
        assert_eq!(find_link_near_name(&html, "カナダ", 10), None);
        assert_eq!(find_link_near_name(&html, "カナダ", 60), Some("/far.htm"));
        assert_eq!(find_link_near_name(&html, "メキシコ", 60), None);
        assert_eq!(find_link_near_name(&html, "", 60), None);
    }

    #[test]
    fn hrefs_are_unique_and_ordered() {
        let html = r#"<a href="/a">a</a><a HREF = "/b">b</a><a href="/a">again</a>"#;
        assert_eq!(hrefs(html), ["/a", "/b"]);
    }

    #[test]
    fn japanese_note_stops_at_sentence_end() {
        let html = "<p>前文です。<b>事前の申請不要</b>で90日まで運用できます。次の文。</p>";
        let extraction = extract_detail_note(html).unwrap();
        assert_eq!(extraction.text, "事前の申請不要で90日まで運用できます");
        assert_eq!(extraction.confidence, Confidence::High);
    }

    #[test]
    fn english_note_is_the_fallback() {
        let html = "<p>Intro. Visitors may operate for up to 90 Days\nwithout a permit. Done.</p>";
        let extraction = extract_detail_note(html).unwrap();
        assert_eq!(extraction.text, "Visitors may operate for up to 90 Days");
        assert_eq!(extraction.confidence, Confidence::Medium);
    }

    #[test]
    fn no_keyword_no_note() {
        assert_eq!(extract_detail_note("<p>Nothing relevant here.</p>"), None);
    }

    #[test]
    fn context_is_bounded() {
        let html = format!("{}申請{}", "あ".repeat(300), "い".repeat(300));
        let extraction = extract_detail_note(&html).unwrap();
        assert_eq!(extraction.text.chars().count(), JA_CONTEXT * 2 + 2);
        assert_eq!(extraction.confidence, Confidence::Low);
    }

    #[test]
    fn filename_keywords() {
        let link = Url::parse("https://www.jarl.org/Japanese/8_World/NewZealand.htm").unwrap();
        assert!(filename_matches(&link, "new_zealand"));
        assert!(!filename_matches(&link, "canada"));
    }
}
