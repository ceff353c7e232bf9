// src/crawl/scheduler.rs
// =============================================================================
// This module runs the crawl: a fixed pool of workers pulling URLs from the
// shared frontier until there is nothing left to do.
//
// How one cycle works:
// 1. Take the next URL from the frontier (and count the worker as active)
// 2. Fetch it
//    - network error -> log it, forget the URL, end the cycle
//    - 404           -> remember it as skipped, end the cycle
// 3. Write the body to <output>/<path>/index.html
// 4. If it's HTML, pull out the links, keep the internal non-blacklisted
//    ones and add the new ones to the back of the frontier
// 5. Mark the worker idle and wake anyone waiting for work
//
// When does it stop?
// - A worker that finds the frontier empty waits, as long as some other
//   worker is still mid-cycle (that cycle may discover more links)
// - Once the frontier is empty AND no cycle is active, every worker exits
//
// Concurrency:
// - All crawl state lives in one CrawlState behind one tokio Mutex
// - The lock is never held across a fetch or a file write
// - "Is this link new? Then queue it" happens inside one locked call, so a
//   URL linked from many pages is fetched at most once
// =============================================================================

use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

use super::classify::{origin_of, resolve_against, UrlClassifier};
use super::frontier::{CrawlPhase, CrawlState, Next};
use crate::config::{ConfigError, MirrorConfig};
use crate::fetch::{extract_links, minify_html, Fetch};
use crate::output::Writer;

// What a finished crawl reports back
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed_url: String,
    pub pages_written: usize,
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
    /// URLs whose last attempt failed (transport or filesystem error)
    pub failed: Vec<String>,
    pub elapsed_ms: u64,
}

impl CrawlReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

// Everything the workers share. One instance per crawl.
struct Shared<F> {
    fetcher: F,
    classifier: UrlClassifier,
    writer: Writer,
    state: Mutex<CrawlState>,
    // Signalled whenever work is added or a cycle ends
    wake: Notify,
    minify: bool,
    resolve_relative_links: bool,
}

pub struct Crawler<F> {
    shared: Arc<Shared<F>>,
    seed: String,
    max_workers: usize,
}

impl<F: Fetch> Crawler<F> {
    // Validates the configuration and seeds the frontier with the start URL
    pub fn new(config: &MirrorConfig, fetcher: F) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed_url = config.seed()?;
        let origin = origin_of(&seed_url);
        let classifier = UrlClassifier::new(origin.clone(), config.blacklist.clone());

        // Same keying rule as every discovered link, so a page linking back to
        // the bare origin doesn't look like a new URL
        let seed = classifier.key_for(seed_url.as_str());

        let shared = Shared {
            fetcher,
            classifier,
            writer: Writer::new(config.output_directory.clone(), origin),
            state: Mutex::new(CrawlState::new(seed.clone(), config.max_workers)),
            wake: Notify::new(),
            minify: config.minify,
            resolve_relative_links: config.resolve_relative_links,
        };

        Ok(Self {
            shared: Arc::new(shared),
            seed,
            max_workers: config.max_workers,
        })
    }

    pub async fn phase(&self) -> CrawlPhase {
        self.shared.state.lock().await.phase()
    }

    // Runs the crawl to completion. Per-page failures never abort it.
    pub async fn run(&self) -> CrawlReport {
        let started = Instant::now();
        info!(
            "Mirroring {} into {} with up to {} workers",
            self.seed,
            self.shared.writer.root().display(),
            self.max_workers
        );

        // All workers start at once; the ones with nothing to do just wait
        let mut workers = JoinSet::new();
        for id in 0..self.max_workers {
            workers.spawn(worker(id, Arc::clone(&self.shared)));
        }

        // Workers only return once the crawl is Done
        while let Some(result) = workers.join_next().await {
            // A panicked task surfaces here as a JoinError
            if let Err(e) = result {
                error!("Crawl worker stopped unexpectedly: {}", e);
            }
        }

        let elapsed = started.elapsed();
        // No workers left, so this lock is uncontended
        let state = self.shared.state.lock().await;
        let report = CrawlReport {
            seed_url: self.seed.clone(),
            pages_written: state.completed_urls().len(),
            completed: state.completed_urls(),
            skipped: state.skipped_urls(),
            failed: state.failed_urls(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            "Crawl finished in {:.2?}: {} written, {} skipped, {} failed",
            elapsed,
            report.pages_written,
            report.skipped.len(),
            report.failed.len()
        );
        report
    }
}

// One worker: take a URL, run a cycle, repeat until the crawl is done
async fn worker<F: Fetch>(id: usize, shared: Arc<Shared<F>>) {
    loop {
        // Register for wake-ups before looking at the state, so a cycle that
        // ends between our check and our wait can't be missed
        let wake = shared.wake.notified();
        tokio::pin!(wake);
        wake.as_mut().enable();

        // The guard is a temporary: the lock is released before we match
        let next = shared.state.lock().await.next();
        match next {
            Next::Fetch(url) => {
                // Errors are handled inside the cycle; it never fails outward
                shared.run_cycle(&url).await;

                // Only after the cycle's links are merged do we count it as
                // finished, otherwise others could see "empty and idle" too early
                let finished = shared.state.lock().await.finish_cycle();
                if finished {
                    debug!("Worker {} ended the last cycle", id);
                }
                // Either there's new work, or the crawl is over: both matter
                // to waiting workers
                shared.wake.notify_waiters();
            }
            Next::Wait => wake.await,
            Next::Done => break,
        }
    }
}

impl<F: Fetch> Shared<F> {
    async fn run_cycle(&self, url: &str) {
        debug!("Fetching {}", url);

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            // Network failure: not retried now, but a later link may bring it back
            Err(e) => {
                warn!("Dropping {}: {}", url, e);
                self.state.lock().await.record_failed(url);
                return;
            }
        };

        // 404 is the only status that means "this page doesn't exist"
        if page.is_not_found() {
            info!("Skipping {} (404)", url);
            self.state.lock().await.record_skipped(url);
            return;
        }

        // Guard against writing the same page twice
        {
            let mut state = self.state.lock().await;
            if state.is_completed(url) {
                debug!("{} is already mirrored", url);
                state.record_completed(url);
                return;
            }
        }

        // Other error statuses and redirects are still mirrored as content
        if !(200..300).contains(&page.status) {
            debug!("Saving {} with status {}", url, page.status);
        }

        // Decode once: used both for minifying and for link extraction
        let html = page
            .is_html()
            .then(|| String::from_utf8_lossy(&page.body).into_owned());

        let contents: Cow<'_, [u8]> = match &html {
            Some(html) if self.minify => Cow::Owned(minify_html(html).into_bytes()),
            _ => Cow::Borrowed(&page.body),
        };

        // Only a successful write makes the page "completed"
        match self.writer.save(url, &contents).await {
            Ok(file) => {
                debug!("Saved {} to {}", url, file.display());
                self.state.lock().await.record_completed(url);
            }
            Err(e) => {
                warn!("Could not save {}: {}", url, e);
                self.state.lock().await.record_failed(url);
                return;
            }
        }

        if let Some(html) = html {
            // Classify outside the lock, dedup + enqueue inside it
            let candidates = self.candidates(url, &html);
            let mut state = self.state.lock().await;
            let added = state.merge(candidates);
            if added > 0 {
                debug!(
                    "Queued {} new link(s) from {} ({} pending, {} active)",
                    added,
                    url,
                    state.pending(),
                    state.active()
                );
                // Release the lock before waking anyone who'll want it
                drop(state);
                self.wake.notify_waiters();
            }
        }
    }

    // Links on the page that pass the classifier, as normalized keys.
    // Deduplication against the crawl state happens in merge().
    fn candidates(&self, page_url: &str, html: &str) -> Vec<String> {
        let base = if self.resolve_relative_links {
            Url::parse(page_url).ok()
        } else {
            None
        };

        extract_links(html)
            .into_iter()
            // With resolution on, "/about" becomes "http://site.test/about"
            .filter_map(|href| match &base {
                Some(base) => resolve_against(base, &href),
                None => Some(href),
            })
            .filter_map(|link| self.classifier.accept(&link))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is Arc<Shared<F>>?
//    - Arc = atomically reference-counted pointer
//    - Every spawned worker holds a clone; the Shared value is freed when
//      the last one is dropped
//    - tokio::spawn needs 'static data, which a plain &Shared can't give
//
// 2. Why tokio::sync::Mutex and not std::sync::Mutex?
//    - lock() is async, so a worker waiting for the lock lets others run
//    - It can't be "poisoned", so no unwrap() on lock results
//
// 3. What are Notify and notified().enable()?
//    - Notify is a wake-up signal with no data attached
//    - notify_waiters() wakes every task currently waiting
//    - enable() registers us as a waiter BEFORE we look at the state, so a
//      wake-up sent in between is not lost
//
// 4. What is JoinSet?
//    - A group of spawned tasks we can await one by one with join_next()
//    - Here it's the worker pool; run() returns when all of them have exited
//
// 5. Why Cow<[u8]> for the contents?
//    - Cow = "clone on write": borrowed when we write the body as-is,
//      owned when minify_html produced a new String
//    - Avoids copying every page body just to pass it to the writer
// -----------------------------------------------------------------------------
