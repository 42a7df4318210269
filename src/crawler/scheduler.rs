//! Scheduler for managing the crawl frontier and page pacing
//!
//! This module handles:
//! - FIFO frontier of URLs to visit
//! - The visited set guaranteeing no URL is fetched twice
//! - Host, robots and namespace scoping of discovered links
//! - The page budget and the idle → running → done phase
//! - The minimum gap between two page visits

use crate::config::CrawlerConfig;
use crate::robots::{self, RobotsPolicy};
use crate::state::{CrawlPhase, Pacer};
use crate::url::{absolutize, host_key, is_crawlable};
use crate::HarvestError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Why a dequeued URL was not handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Already dequeued earlier in the run
    Visited,
    /// Host differs from the start host
    OffHost,
    /// Disallowed by robots.txt
    Robots,
}

/// Counters of dequeued URLs that were skipped, by reason
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipCounts {
    pub visited: u32,
    pub off_host: u32,
    pub robots: u32,
}

impl SkipCounts {
    fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Visited => self.visited += 1,
            SkipReason::OffHost => self.off_host += 1,
            SkipReason::Robots => self.robots += 1,
        }
    }
}

/// Scheduler owns the frontier and every piece of state deciding what to
/// visit next
///
/// The scheduler coordinates:
/// - FIFO selection from the frontier
/// - Deduplication through the visited and discovered sets
/// - Policy rejections (host, robots) at dequeue time
/// - The processed-page budget
/// - Pacing between page visits
pub struct Scheduler {
    /// URLs waiting to be visited, in discovery order
    frontier: VecDeque<Url>,

    /// URLs already dequeued
    visited: HashSet<String>,

    /// URLs ever enqueued; keeps duplicates out of the frontier
    discovered: HashSet<String>,

    start_url: Url,
    start_host: String,
    banned_namespaces: Vec<String>,
    robots: RobotsPolicy,

    max_pages: u32,
    processed: u32,

    phase: CrawlPhase,
    pacer: Pacer,
    skips: SkipCounts,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `start_url` - The normalized seed URL; its host bounds the crawl
    /// * `config` - The crawler configuration
    /// * `robots` - The start host's robots policy
    ///
    /// # Returns
    ///
    /// A scheduler in the idle phase with an empty frontier
    pub fn new(start_url: Url, config: &CrawlerConfig, robots: RobotsPolicy) -> Self {
        let start_host = host_key(&start_url).unwrap_or_default();

        Self {
            frontier: VecDeque::new(),
            visited: HashSet::new(),
            discovered: HashSet::new(),
            start_url,
            start_host,
            banned_namespaces: config.banned_namespaces.clone(),
            robots,
            max_pages: config.max_pages,
            processed: 0,
            phase: CrawlPhase::Idle,
            pacer: Pacer::from_millis(config.page_delay_ms),
            skips: SkipCounts::default(),
        }
    }

    /// Moves to the running phase and seeds the frontier with the start URL
    pub fn start(&mut self) -> Result<(), HarvestError> {
        self.transition(CrawlPhase::Running)?;
        let seed = self.start_url.clone();
        self.discovered.insert(seed.to_string());
        self.frontier.push_back(seed);
        Ok(())
    }

    /// Moves to the done phase
    pub fn finish(&mut self) -> Result<(), HarvestError> {
        if self.phase != CrawlPhase::Done {
            self.transition(CrawlPhase::Done)?;
        }
        Ok(())
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Dequeues the next URL to visit
    ///
    /// URLs already visited, off the start host, or disallowed by robots are
    /// discarded without counting against the budget.
    ///
    /// # Returns
    ///
    /// * `Some(Url)` - The next page to visit
    /// * `None` - The frontier is exhausted or the budget is reached
    pub fn next_url(&mut self) -> Option<Url> {
        if self.phase != CrawlPhase::Running {
            return None;
        }

        loop {
            if self.budget_reached() {
                return None;
            }
            let url = self.frontier.pop_front()?;

            match self.admit(&url) {
                Ok(()) => return Some(url),
                Err(reason) => {
                    self.skips.record(reason);
                    match reason {
                        SkipReason::Visited => tracing::trace!("Already visited: {}", url),
                        SkipReason::OffHost => tracing::info!("[skip host] {}", url),
                        SkipReason::Robots => tracing::info!("[skip robots] {}", url.path()),
                    }
                }
            }
        }
    }

    /// Marks a URL visited and applies the dequeue-time policy checks
    fn admit(&mut self, url: &Url) -> Result<(), SkipReason> {
        if !self.visited.insert(url.to_string()) {
            return Err(SkipReason::Visited);
        }
        if host_key(url).as_deref() != Some(self.start_host.as_str()) {
            return Err(SkipReason::OffHost);
        }
        if !robots::is_allowed(&self.robots, url) {
            return Err(SkipReason::Robots);
        }
        Ok(())
    }

    /// Sleeps until the pause after the previous page visit has elapsed
    pub async fn wait_turn(&mut self) {
        self.pacer.wait().await;
    }

    /// Marks the current page visit finished, images included
    ///
    /// The pause before the next visit is measured from this point.
    pub fn end_visit(&mut self) {
        self.pacer.complete();
    }

    /// Counts one page against the budget
    ///
    /// # Returns
    ///
    /// The number of pages processed so far, including this one
    pub fn record_processed(&mut self) -> u32 {
        self.processed += 1;
        self.processed
    }

    /// Enqueues the in-scope outbound links of a page
    ///
    /// # Arguments
    ///
    /// * `links` - Raw href values found on the page
    /// * `page_url` - URL of the page, for resolving relative links
    ///
    /// # Returns
    ///
    /// The number of URLs newly added to the frontier
    pub fn enqueue_links(&mut self, links: &[String], page_url: &Url) -> usize {
        let mut added = 0;

        for href in links {
            let Some(mut url) = absolutize(href, page_url) else {
                continue;
            };
            url.set_fragment(None);

            if !is_crawlable(&url, &self.start_host, &self.banned_namespaces) {
                continue;
            }
            if self.visited.contains(url.as_str()) {
                continue;
            }
            if self.discovered.insert(url.to_string()) {
                self.frontier.push_back(url);
                added += 1;
            }
        }

        added
    }

    /// Returns true once the processed-page budget is spent
    pub fn budget_reached(&self) -> bool {
        self.processed >= self.max_pages
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn skips(&self) -> SkipCounts {
        self.skips
    }
}
