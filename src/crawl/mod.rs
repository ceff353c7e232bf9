// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Submodules:
// - classify: Which links are usable, internal and not blacklisted
// - frontier: The single state object (queue + completed/skipped sets)
// - scheduler: The worker pool that drives fetch -> save -> enqueue cycles
//
// Features:
// - Bounded concurrency (max_workers cycles at once)
// - Same-origin restriction (never leaves the seed's scheme + host)
// - Each URL fetched at most once per run
// - Stops by itself when no work is queued and no worker is busy
// =============================================================================

mod classify;
mod frontier;
mod scheduler;

pub use classify::{is_blacklisted, normalize};
pub use scheduler::{CrawlReport, Crawler};
