// src/crawl/frontier.rs
// =============================================================================
// This module holds all mutable crawl state in one struct.
//
// Collections:
// - frontier:  URLs discovered but not yet handed to a worker (FIFO)
// - queued:    the same URLs as frontier, for O(1) membership checks
// - in_flight: URLs a worker is currently fetching
// - completed: URLs fetched and written to disk
// - skipped:   URLs that answered 404
// - failed:    URLs whose last attempt hit a transport or filesystem error
//
// The scheduler wraps a single CrawlState in one mutex. Every check-then-insert
// happens inside one method call, so two workers can never both decide that
// the same link is new.
//
// Invariants kept by the methods below:
// - completed and skipped never share a URL
// - a URL in frontier or in_flight is in neither completed nor skipped
// - active never exceeds max_workers
// =============================================================================

use std::collections::{BTreeSet, HashSet, VecDeque};

// Where the crawl is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Constructed, no worker has asked for work yet
    Idle,
    /// Frontier non-empty or at least one cycle in flight
    Running,
    /// Frontier empty and no cycle in flight
    Done,
}

// What a worker should do next
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Start a cycle for this URL (already counted as active)
    Fetch(String),
    /// Nothing to take right now, but other cycles may still add work
    Wait,
    /// The crawl is over
    Done,
}

#[derive(Debug)]
pub struct CrawlState {
    frontier: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
    completed: HashSet<String>,
    skipped: HashSet<String>,
    failed: BTreeSet<String>,
    active: usize,
    max_workers: usize,
    started: bool,
}

impl CrawlState {
    // The frontier starts with exactly the seed
    pub fn new(seed: String, max_workers: usize) -> Self {
        // The seed goes into both the queue and its membership set, so a page
        // linking back to it is recognized as known from the very first cycle
        Self {
            frontier: VecDeque::from([seed.clone()]),
            queued: HashSet::from([seed]),
            in_flight: HashSet::new(),
            completed: HashSet::new(),
            skipped: HashSet::new(),
            failed: BTreeSet::new(),
            active: 0,
            // Zero workers would never finish; clamp to one
            max_workers: max_workers.max(1),
            started: false,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        if !self.started {
            CrawlPhase::Idle
        } else if self.is_done() {
            CrawlPhase::Done
        } else {
            CrawlPhase::Running
        }
    }

    fn is_done(&self) -> bool {
        self.frontier.is_empty() && self.active == 0
    }

    // Pops the front of the frontier and counts the cycle as active, in one step
    pub fn next(&mut self) -> Next {
        // The first call moves us out of Idle
        self.started = true;

        // Nothing queued and nobody working: nothing can ever be added again
        if self.is_done() {
            return Next::Done;
        }
        // Concurrency cap reached
        if self.active >= self.max_workers {
            return Next::Wait;
        }

        match self.frontier.pop_front() {
            Some(url) => {
                // Pending -> in flight. It stays "known" the whole time, so
                // no other page can queue it while we fetch it.
                self.queued.remove(&url);
                self.active += 1;
                self.in_flight.insert(url.clone());
                Next::Fetch(url)
            }
            // Empty queue, but some cycle may still discover links
            None => Next::Wait,
        }
    }

    // Has this URL been seen in any form? (pending, in flight, completed, skipped)
    pub fn is_known(&self, url: &str) -> bool {
        self.completed.contains(url)
            || self.skipped.contains(url)
            || self.in_flight.contains(url)
            || self.queued.contains(url)
    }

    pub fn is_completed(&self, url: &str) -> bool {
        self.completed.contains(url)
    }

    // Appends every candidate not already known, keeping discovery order.
    // Returns how many were actually enqueued.
    pub fn merge<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for url in candidates {
            // Check and insert under the same &mut borrow: this is the step
            // that makes "fetched at most once" hold
            if !self.is_known(&url) {
                self.queued.insert(url.clone());
                self.frontier.push_back(url);
                added += 1;
            }
        }
        added
    }

    // The page was written; it can never be fetched again this run
    pub fn record_completed(&mut self, url: &str) {
        self.in_flight.remove(url);
        // A retry that succeeded is no longer a failure
        self.failed.remove(url);
        // Keep completed and skipped disjoint
        if !self.skipped.contains(url) {
            self.completed.insert(url.to_string());
        }
    }

    // The page answered 404; it can never be fetched again this run
    pub fn record_skipped(&mut self, url: &str) {
        self.in_flight.remove(url);
        self.failed.remove(url);
        if !self.completed.contains(url) {
            self.skipped.insert(url.to_string());
        }
    }

    // The attempt failed. The URL is forgotten so a later link may retry it.
    pub fn record_failed(&mut self, url: &str) {
        // Leaving in_flight without entering completed/skipped is what makes
        // the URL unknown again
        self.in_flight.remove(url);
        self.failed.insert(url.to_string());
    }

    // Ends a cycle. Returns true when this was the last cycle of the crawl.
    pub fn finish_cycle(&mut self) -> bool {
        // saturating_sub: an unmatched call can't wrap the counter around
        self.active = self.active.saturating_sub(1);
        self.is_done()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    // Sorted copies for the final report
    pub fn completed_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.completed.iter().cloned().collect();
        urls.sort();
        urls
    }

    pub fn skipped_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.skipped.iter().cloned().collect();
        urls.sort();
        urls
    }

    pub fn failed_urls(&self) -> Vec<String> {
        self.failed.iter().cloned().collect()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is everything in one struct instead of separate locked fields?
//    - "Is this URL new?" reads four collections and "queue it" writes one
//    - With one struct behind one lock, that read-then-write is a single
//      step no other worker can interleave with
//
// 2. Why keep `queued` next to the VecDeque?
//    - VecDeque keeps the order (breadth-first-ish crawling)
//    - HashSet answers "is it in there?" in O(1) instead of scanning
//
// 3. Why BTreeSet for failed URLs?
//    - It keeps them sorted, so the report lists them in a stable order
//
// 4. What does `impl IntoIterator<Item = String>` buy merge()?
//    - Callers can pass a Vec, an iterator chain, an array... anything that
//      yields owned Strings
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_seeded_with_exactly_the_seed() {
        let state = CrawlState::new("http://site.test/".to_string(), 4);
        assert_eq!(state.pending(), 1);
        assert_eq!(state.active(), 0);
        assert_eq!(state.phase(), CrawlPhase::Idle);
    }

    #[test]
    fn test_next_pops_and_counts_active() {
        let mut state = CrawlState::new("http://site.test/".to_string(), 4);

        assert_eq!(state.next(), Next::Fetch("http://site.test/".to_string()));
        assert_eq!(state.active(), 1);
        assert_eq!(state.pending(), 0);
        assert_eq!(state.phase(), CrawlPhase::Running);

        // Frontier empty but a cycle is in flight: wait, don't stop
        assert_eq!(state.next(), Next::Wait);
    }

    #[test]
    fn test_done_when_empty_and_idle() {
        let mut state = CrawlState::new("http://site.test/".to_string(), 4);
        let Next::Fetch(url) = state.next() else {
            panic!("expected the seed");
        };
        state.record_completed(&url);

        assert!(state.finish_cycle());
        assert_eq!(state.phase(), CrawlPhase::Done);
        assert_eq!(state.next(), Next::Done);
    }

    #[test]
    fn test_active_never_exceeds_max_workers() {
        let mut state = CrawlState::new("http://site.test/".to_string(), 2);
        state.merge(urls(&["http://site.test/a", "http://site.test/b"]));

        assert!(matches!(state.next(), Next::Fetch(_)));
        assert!(matches!(state.next(), Next::Fetch(_)));
        assert_eq!(state.next(), Next::Wait);
        assert_eq!(state.active(), 2);
        assert_eq!(state.pending(), 1);
    }

    #[test]
    fn test_merge_deduplicates_against_every_set() {
        let mut state = CrawlState::new("http://site.test/".to_string(), 4);
        state.merge(urls(&["http://site.test/done", "http://site.test/gone"]));

        // seed in flight, two pending
        let _ = state.next();
        let Next::Fetch(done) = state.next() else { panic!() };
        let Next::Fetch(gone) = state.next() else { panic!() };
        state.record_completed(&done);
        state.record_skipped(&gone);
        state.merge(urls(&["http://site.test/queued"]));

        let added = state.merge(urls(&[
            "http://site.test/",       // in flight
            "http://site.test/done",   // completed
            "http://site.test/gone",   // skipped
            "http://site.test/queued", // pending
            "http://site.test/new",
            "http://site.test/new",    // duplicate within one page
        ]));

        assert_eq!(added, 1);
        assert_eq!(state.pending(), 2);
    }

    #[test]
    fn test_completed_and_skipped_stay_disjoint() {
        let mut state = CrawlState::new("http://site.test/".to_string(), 4);
        state.record_completed("http://site.test/x");
        state.record_skipped("http://site.test/x");

        assert_eq!(state.completed_urls(), urls(&["http://site.test/x"]));
        assert!(state.skipped_urls().is_empty());
    }

    #[test]
    fn test_failed_url_can_be_rediscovered() {
        let mut state = CrawlState::new("http://site.test/".to_string(), 4);
        let Next::Fetch(url) = state.next() else { panic!() };
        state.record_failed(&url);
        state.finish_cycle();

        assert!(!state.is_known(&url));
        assert_eq!(state.merge(urls(&["http://site.test/"])), 1);
        assert_eq!(state.failed_urls(), urls(&["http://site.test/"]));

        let Next::Fetch(url) = state.next() else { panic!() };
        state.record_completed(&url);
        assert!(state.failed_urls().is_empty());
    }
}
