// src/fetch/html.rs
// =============================================================================
// This module extracts anchor links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so broken markup is fine
//
// The hrefs come back raw: no resolution, no filtering, duplicates kept.
// Deciding which of them to crawl is the classifier's job.
// =============================================================================

use scraper::{Html, Selector};

// Returns the href of every <a> element, in document order
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='/docs'>Again</a>"
//   result = ["/docs", "/docs"]
pub fn extract_links(html: &str) -> Vec<String> {
    // "a[href]" means "all <a> tags that have an href attribute"
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_document_order() {
        let html = r#"
            <nav><a href="http://site.test/">Home</a></nav>
            <main>
                <a href="http://site.test/about">About</a>
                <p>See <a href="/relative">this</a>.</p>
            </main>
        "#;
        assert_eq!(
            extract_links(html),
            vec!["http://site.test/", "http://site.test/about", "/relative"]
        );
    }

    #[test]
    fn test_keeps_duplicates_and_raw_values() {
        let html = r##"
            <a href="/a?x=1#top">One</a>
            <a href="/a?x=1#top">Two</a>
            <a href="#">Top</a>
            <a href="">Empty</a>
        "##;
        assert_eq!(extract_links(html), vec!["/a?x=1#top", "/a?x=1#top", "#", ""]);
    }

    #[test]
    fn test_ignores_anchors_without_href_and_other_tags() {
        let html = r#"
            <a name="section">Named anchor</a>
            <link rel="stylesheet" href="/style.css">
            <img src="/logo.png">
        "#;
        assert!(extract_links(html).is_empty());
    }

    #[test]
    fn test_tolerates_broken_markup() {
        let html = r#"<div><a href="/ok">unclosed <p>paragraph"#;
        assert_eq!(extract_links(html), vec!["/ok"]);
    }
}
