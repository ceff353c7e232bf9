// src/crawl/classify.rs
// =============================================================================
// This module decides which discovered links are worth crawling.
//
// Every candidate href goes through the same gate before it can enter the
// frontier:
// 1. Is it usable at all? (not empty, not a bare "#")
// 2. Is it on the seed's origin? (scheme + host + port, compared textually)
// 3. Is it blacklisted? (any configured substring appears in it)
// 4. What is its canonical key? (query and fragment stripped)
//
// All functions here are pure: same input, same answer, no IO, no errors.
//
// Rust concepts:
// - &str slices: We cut URLs without allocating where possible
// - Option<T>: For "this link produced nothing usable"
// =============================================================================

use url::Url;

// Returns false for empty hrefs and the bare fragment marker "#"
pub fn is_valid(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url != "#"
}

// True iff `url` starts with the exact origin string of the seed.
//
// The character right after the prefix must end the authority, otherwise
// "http://site.test.evil" would pass as internal to "http://site.test".
// Relative hrefs never carry the prefix, so they are external here.
pub fn is_internal(url: &str, origin: &str) -> bool {
    match url.strip_prefix(origin) {
        Some(rest) => {
            rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') || rest.starts_with('#')
        }
        None => false,
    }
}

// True iff any blacklist pattern is a substring of `url`
pub fn is_blacklisted(url: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| url.contains(pattern.as_str()))
}

// Strips everything from the first '?' and from the first '#' onward.
//
// The result is the key used for every set membership check and for the
// output path, so "/a/b?x=1#frag" and "/a/b" are the same page.
pub fn normalize(url: &str) -> &str {
    let url = url.trim();
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    &url[..end]
}

// The origin string ("http://host[:port]") used as the internal-link prefix
pub fn origin_of(seed: &Url) -> String {
    seed.origin().ascii_serialization()
}

// Resolves a possibly-relative href against the page it was found on.
//
// Used only when relative-link resolution is switched on. Links that point
// at something other than a page (mail, phone, scripts, in-page anchors)
// resolve to None.
pub fn resolve_against(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    base.join(href).ok().map(|url| url.to_string())
}

// Bundles the seed origin and the blacklist so the scheduler can ask one
// question per candidate: "should this enter the frontier, and as what key?"
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    origin: String,
    blacklist: Vec<String>,
}

impl UrlClassifier {
    pub fn new(origin: impl Into<String>, blacklist: Vec<String>) -> Self {
        Self {
            origin: origin.into(),
            blacklist,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    // Returns the normalized key if the candidate is valid, internal and not
    // blacklisted. Deduplication against the crawl state happens later, under
    // the state lock.
    pub fn accept(&self, candidate: &str) -> Option<String> {
        if !is_valid(candidate) {
            return None;
        }

        let candidate = candidate.trim();
        if !is_internal(candidate, &self.origin) || is_blacklisted(candidate, &self.blacklist) {
            return None;
        }

        Some(self.key_for(candidate))
    }

    // The normalized key, with the bare origin spelled the way a parsed seed
    // is ("http://site.test" and "http://site.test/" are one page)
    pub fn key_for(&self, url: &str) -> String {
        let key = normalize(url);
        if key == self.origin {
            format!("{}/", key)
        } else {
            key.to_string()
        }
    }
}
