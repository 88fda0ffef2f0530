//! URL validation, canonicalization, and the keyword-substring filter.
//!
//! Canonical form drops the fragment and lowercases the authority the way
//! `url::Url` already does; it does not attempt query-parameter reordering or
//! trailing-slash normalization beyond what `Url` gives for free.

use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use url::Url;

/// Absolute `http(s)` with a non-empty host. Parse failures are rejected, not
/// propagated.
pub fn is_valid(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Canonical identity for the visited/seen sets: scheme+host+path+query, no
/// fragment. Parse failures fall back to the raw string so callers never
/// panic on a malformed discovered link (it will simply fail `is_valid`
/// upstream and never reach this point in practice).
pub fn canonicalize(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut u) => {
            u.set_fragment(None);
            u.into()
        }
        Err(_) => url.to_string(),
    }
}

/// Admits a URL if the percent-decoded, lowercased `path + "?" + query`
/// contains at least `min_matches` of `keywords` as substrings. An empty
/// keyword set admits every (valid) URL.
pub fn keyword_filter(url: &str, keywords: &[String], min_matches: usize) -> bool {
    if keywords.is_empty() {
        return is_valid(url);
    }
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let raw = format!("{}?{}", parsed.path(), parsed.query().unwrap_or(""));
    let decoded = percent_decode_str(&raw).decode_utf8_lossy().to_lowercase();

    let hits = keywords.iter().filter(|k| decoded.contains(k.as_str())).count();
    hits >= min_matches
}

/// Filters a batch of candidate URLs through [`is_valid`] and [`keyword_filter`],
/// reduces every survivor to its [`canonicalize`]d identity, and drops
/// repeats of that identity — callers build the visited/seen sets directly
/// from this output, so it must never hand back the same canonical URL twice
/// (two raw links differing only by fragment, case, or an accidental
/// duplicate in a discovered-links batch must collapse to one entry).
pub fn filter_batch<'a>(urls: impl IntoIterator<Item = &'a String>, keywords: &[String], min_matches: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| is_valid(u) && keyword_filter(u, keywords, min_matches))
        .map(|u| canonicalize(u))
        .filter(|u| seen.insert(u.clone()))
        .collect()
}
