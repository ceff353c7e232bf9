// src/fetch/mod.rs
// =============================================================================
// This module gets pages off the network and looks inside them.
//
// Submodules:
// - http: The Fetch trait and the reqwest-backed HttpFetcher
// - html: Pulls raw anchor hrefs out of an HTML document
// - minify: Optional whitespace minifier applied before saving HTML
//
// None of these keep state between calls; the crawl scheduler owns all of it.
// =============================================================================

mod html;
mod http;
mod minify;

pub use html::extract_links;
pub use http::{Fetch, FetchError, HttpFetcher, Page};
pub use minify::minify_html;
