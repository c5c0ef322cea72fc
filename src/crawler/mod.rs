//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with response classification
//! - HTML parsing and link extraction
//! - The visit ledger and page budget
//! - Outstanding-work tracking for termination
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod ledger;
mod parser;
mod tracker;

pub use coordinator::{crawl, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, fetch_url, is_markup, FetchError, Fetcher, HttpFetcher};
pub use ledger::{Claim, Ledger, LedgerSnapshot, VisitEntry};
pub use parser::extract_links;
pub use tracker::{WorkGuard, WorkTracker};

pub use crate::config::CrawlSettings;
