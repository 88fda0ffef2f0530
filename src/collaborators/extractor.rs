//! Default [`Extractor`]: `scraper`-based title/body/link extraction with a
//! regex text cleanup pass (strip URLs, emails, collapse whitespace).

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{ExtractedPage, Extractor};

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").unwrap())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap())
}

/// Whitespace-normalize, strip URLs and emails.
fn clean_text(text: &str) -> String {
    let no_urls = url_re().replace_all(text, "");
    let no_emails = email_re().replace_all(&no_urls, "");
    whitespace_re().replace_all(&no_emails, " ").trim().to_string()
}

const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".post-content",
    ".entry-content",
];

#[derive(Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_title(document: &Html) -> String {
        let selector = Selector::parse("title").expect("static selector");
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    fn extract_body(document: &Html) -> String {
        for selector_str in MAIN_CONTENT_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(el) = document.select(&selector).next() {
                    let text: String = el.text().collect::<Vec<_>>().join(" ");
                    if !text.trim().is_empty() {
                        return clean_text(&text);
                    }
                }
            }
        }
        let body_selector = Selector::parse("body").expect("static selector");
        let text = document
            .select(&body_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        clean_text(&text)
    }

    fn extract_publish_date(document: &Html) -> Option<DateTime<Utc>> {
        const META_KEYS: &[&str] = &[
            "meta[property='article:published_time']",
            "meta[name='publish-date']",
            "meta[name='date']",
            "time[datetime]",
        ];
        for selector_str in META_KEYS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(el) = document.select(&selector).next() {
                    let raw = el
                        .value()
                        .attr("content")
                        .or_else(|| el.value().attr("datetime"))
                        .unwrap_or("");
                    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                        return Some(dt.with_timezone(&Utc));
                    }
                }
            }
        }
        None
    }

    fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };
        let base_host = base_url.host_str().unwrap_or("");

        let mut seen = std::collections::HashSet::new();
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| base_url.join(href).ok())
            .filter(|u| {
                u.host_str() == Some(base_host) && matches!(u.scheme(), "http" | "https") && u.fragment().is_none()
            })
            .map(|mut u| {
                u.set_fragment(None);
                u.to_string()
            })
            .filter(|u| seen.insert(u.clone()))
            .collect()
    }
}

impl Extractor for HtmlExtractor {
    fn parse(&self, html: &str, url: &str) -> Option<ExtractedPage> {
        let base_url = Url::parse(url).ok()?;
        let document = Html::parse_document(html);

        let title = Self::extract_title(&document);
        let body = Self::extract_body(&document);
        let word_count = body.split_whitespace().count();
        let publish_date = Self::extract_publish_date(&document);
        let outbound_links = Self::extract_links(&document, &base_url);

        Some(ExtractedPage {
            title,
            body,
            publish_date,
            outbound_links,
            word_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_body() {
        let html = r#"<html><head><title>Hello World</title></head>
            <body><article>Some rust crawler content here, plenty of words to count.</article></body></html>"#;
        let page = HtmlExtractor::new().parse(html, "https://example.com/a").unwrap();
        assert_eq!(page.title, "Hello World");
        assert!(page.body.contains("rust crawler content"));
        assert!(page.word_count > 0);
    }

    #[test]
    fn strips_urls_and_emails_from_body() {
        let html = r#"<html><body><article>Contact us at test@example.com or visit https://example.com/page for more.</article></body></html>"#;
        let page = HtmlExtractor::new().parse(html, "https://example.com/a").unwrap();
        assert!(!page.body.contains("@example.com"));
        assert!(!page.body.contains("https://example.com/page"));
    }

    #[test]
    fn extracts_same_host_absolute_links_only() {
        let html = r#"<html><body>
            <a href="/local-page">local</a>
            <a href="https://other.com/page">external</a>
            <a href="https://example.com/abs#frag">fragment</a>
        </body></html>"#;
        let page = HtmlExtractor::new().parse(html, "https://example.com/start").unwrap();
        assert!(page.outbound_links.iter().any(|l| l.contains("local-page")));
        assert!(!page.outbound_links.iter().any(|l| l.contains("other.com")));
        assert!(page.outbound_links.iter().all(|l| !l.contains('#')));
    }

    #[test]
    fn invalid_base_url_returns_none() {
        assert!(HtmlExtractor::new().parse("<html></html>", "not a url").is_none());
    }
}
