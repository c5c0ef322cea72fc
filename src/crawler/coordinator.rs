//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of the
//! crawling process:
//! - Deriving the crawl scope from the seed
//! - Dispatching work units from an unbounded queue to spawned workers
//! - Claiming addresses in the ledger under the page budget
//! - Bounding parallel fetches with a permit pool
//! - Feeding in-scope discovered links back in as new work
//! - Detecting termination when no work remains, or unwinding on cancellation

use crate::config::{CrawlSettings, FetcherConfig};
use crate::crawler::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::crawler::ledger::{Claim, Ledger, LedgerSnapshot};
use crate::crawler::parser::extract_links;
use crate::crawler::tracker::{WorkGuard, WorkTracker};
use crate::state::{OutcomeTally, UnitState};
use crate::url::{parse_address, CrawlScope};
use crate::RippleError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// One address awaiting processing
///
/// The guard keeps the unit counted as outstanding until the unit is
/// dropped, wherever that happens.
struct WorkUnit {
    address: String,
    _guard: WorkGuard,
}

/// Final result of a crawl
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// The seed as it was enqueued (absolute)
    pub seed: String,

    /// Scope the crawl was restricted to
    pub scope: CrawlScope,

    /// Visit ledger and page budget at the end of the crawl
    pub ledger: LedgerSnapshot,

    /// How many units ended in each terminal state
    pub outcomes: BTreeMap<UnitState, u64>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Whether the crawl was stopped by cancellation rather than running dry
    pub cancelled: bool,
}

impl CrawlOutcome {
    /// Number of pages that consumed a budget slot
    pub fn pages_fetched(&self) -> usize {
        self.ledger.pages_fetched
    }

    /// Count of units that ended in `state`
    pub fn count(&self, state: UnitState) -> u64 {
        self.outcomes.get(&state).copied().unwrap_or(0)
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// State shared by the dispatcher and every worker
struct CrawlContext {
    ledger: Ledger,
    permits: Semaphore,
    fetcher: Arc<dyn Fetcher>,
    scope: CrawlScope,
    tracker: WorkTracker,
    tally: OutcomeTally,
    cancel: CancellationToken,
    queue: mpsc::UnboundedSender<WorkUnit>,
    pages_completed: AtomicUsize,
    progress_interval: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
    queue_rx: mpsc::UnboundedReceiver<WorkUnit>,
    seed: String,
    max_concurrency: usize,
    max_pages: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `settings` - Seed, limits and scope of the crawl
    /// * `fetcher` - Retrieves documents; shared by all workers
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(RippleError)` - Invalid settings, or a seed with no host to scope by
    pub fn new(settings: CrawlSettings, fetcher: Arc<dyn Fetcher>) -> Result<Self, RippleError> {
        settings.validate()?;

        let seed_url =
            parse_address(&settings.seed).map_err(|source| RippleError::MalformedAddress {
                address: settings.seed.clone(),
                source,
            })?;
        let seed = seed_url.to_string();

        let scope = CrawlScope::from_seed(&seed, settings.scope).map_err(|source| {
            RippleError::MalformedAddress {
                address: seed.clone(),
                source,
            }
        })?;

        let (queue, queue_rx) = mpsc::unbounded_channel();

        let context = CrawlContext {
            ledger: Ledger::new(settings.max_pages),
            permits: Semaphore::new(settings.max_concurrency),
            fetcher,
            scope,
            tracker: WorkTracker::new(),
            tally: OutcomeTally::new(),
            cancel: CancellationToken::new(),
            queue,
            pages_completed: AtomicUsize::new(0),
            progress_interval: settings.progress_interval,
        };

        Ok(Self {
            context: Arc::new(context),
            queue_rx,
            seed,
            max_concurrency: settings.max_concurrency,
            max_pages: settings.max_pages,
        })
    }

    /// Creates a coordinator that fetches over HTTP
    pub fn with_http(settings: CrawlSettings, config: &FetcherConfig) -> Result<Self, RippleError> {
        let fetcher = HttpFetcher::from_config(config)?;
        Self::new(settings, Arc::new(fetcher))
    }

    /// Token that aborts the crawl when cancelled
    ///
    /// Pending permit acquisitions and in-flight fetches unwind promptly;
    /// the ledger collected so far is still returned by [`Coordinator::run`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.context.cancel.clone()
    }

    /// Runs the crawl until no work remains or the crawl is cancelled
    ///
    /// This is the core crawling logic that:
    /// 1. Enqueues the seed as the first work unit
    /// 2. Spawns a worker for every queued unit
    /// 3. Reaps finished workers
    /// 4. Stops when the outstanding-work count reaches zero
    pub async fn run(self) -> CrawlOutcome {
        let Coordinator {
            context,
            mut queue_rx,
            seed,
            max_concurrency,
            max_pages,
        } = self;

        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (scope: {}, max pages: {}, max concurrency: {})",
            seed,
            context.scope,
            max_pages,
            max_concurrency
        );

        context.enqueue(seed.clone());

        let mut workers = JoinSet::new();
        let mut cancelled = false;

        loop {
            tokio::select! {
                biased;

                _ = context.cancel.cancelled() => {
                    tracing::warn!(
                        "Crawl cancelled with {} units outstanding",
                        context.tracker.outstanding()
                    );
                    cancelled = true;
                    break;
                }

                Some(unit) = queue_rx.recv() => {
                    let context = Arc::clone(&context);
                    workers.spawn(async move { context.process(unit).await });
                }

                Some(joined) = workers.join_next() => log_join(joined),

                _ = context.tracker.wait_idle() => {
                    tracing::debug!("No outstanding work left");
                    break;
                }
            }
        }

        // Workers observe the token at every suspension point, so this
        // drains promptly after a cancellation too
        while let Some(joined) = workers.join_next().await {
            log_join(joined);
        }

        // Units that were queued but never picked up
        queue_rx.close();
        while let Ok(unit) = queue_rx.try_recv() {
            tracing::debug!("Discarding queued {} after cancellation", unit.address);
            context.tally.record(UnitState::Cancelled);
        }

        let finished_at = Utc::now();
        let ledger = context.ledger.snapshot();
        let outcomes = context.tally.snapshot();

        tracing::info!(
            "Crawl {}: {} pages fetched, {} distinct pages discovered in {:.2}s",
            if cancelled { "cancelled" } else { "completed" },
            ledger.pages_fetched,
            ledger.distinct_pages(),
            (finished_at - started_at).num_milliseconds() as f64 / 1000.0
        );

        CrawlOutcome {
            seed,
            scope: context.scope.clone(),
            ledger,
            outcomes,
            started_at,
            finished_at,
            cancelled,
        }
    }
}

impl CrawlContext {
    /// Registers and queues a new work unit; never blocks
    fn enqueue(&self, address: String) {
        let unit = WorkUnit {
            address,
            _guard: self.tracker.register(),
        };

        if let Err(rejected) = self.queue.send(unit) {
            tracing::debug!("Dispatcher stopped, dropping {}", rejected.0.address);
            self.tally.record(UnitState::Cancelled);
        }
    }

    /// Processes a single work unit and records how it ended
    async fn process(&self, unit: WorkUnit) {
        let state = match self.visit(&unit.address).await {
            Ok(state) => state,
            Err(error) => {
                let state = failure_state(&error);
                match state {
                    UnitState::Malformed | UnitState::Cancelled => {
                        tracing::debug!("{}", error)
                    }
                    _ => tracing::warn!("{}", error),
                }
                state
            }
        };

        self.tally.record(state);
        tracing::trace!("{} finished as {}", unit.address, state);
        // dropping the unit releases its work guard
    }

    /// Claims, fetches, extracts and fans out one address
    ///
    /// The permit is held from acquisition to the end of fan-out.
    async fn visit(&self, address: &str) -> Result<UnitState, RippleError> {
        let mut state = UnitState::Pending;

        let claim = self
            .ledger
            .claim(address)
            .map_err(|source| RippleError::MalformedAddress {
                address: address.to_string(),
                source,
            })?;

        let key = match claim {
            Claim::Fetch { key } => key,
            Claim::Duplicate { key, visits } => {
                tracing::trace!("Already seen {} ({} visits)", key, visits);
                return Ok(advance(address, &mut state, UnitState::Duplicate));
            }
            Claim::OverBudget { key } => {
                tracing::debug!("Page budget spent, not fetching {}", key);
                return Ok(advance(address, &mut state, UnitState::OverBudget));
            }
        };
        advance(address, &mut state, UnitState::Claimed);

        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(RippleError::PermitUnavailable { address: address.to_string() });
            }
            permit = self.permits.acquire() => permit.map_err(|_| {
                RippleError::PermitUnavailable { address: address.to_string() }
            })?,
        };
        advance(address, &mut state, UnitState::Fetching);

        tracing::debug!("Fetching {} ({})", address, key);
        let body = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(RippleError::Cancelled { address: address.to_string() });
            }
            fetched = self.fetcher.fetch(address) => fetched.map_err(|source| RippleError::Fetch {
                address: address.to_string(),
                source,
            })?,
        };
        self.record_progress();
        advance(address, &mut state, UnitState::Extracting);

        let links = match extract_links(&body, address) {
            Ok(links) => links,
            Err(error) => {
                tracing::warn!("{}; treating as zero links", error);
                return Ok(advance(address, &mut state, UnitState::Unparsable));
            }
        };
        advance(address, &mut state, UnitState::FanningOut);

        if self.cancel.is_cancelled() {
            tracing::debug!("Not following {} links from {}: cancelled", links.len(), key);
        } else {
            self.fan_out(address, links);
        }

        Ok(advance(address, &mut state, UnitState::Processed))
    }

    /// Queues every in-scope link as a new work unit
    fn fan_out(&self, from: &str, links: Vec<String>) {
        let found = links.len();
        let mut scheduled = 0;

        for link in links {
            if self.scope.contains(&link) {
                self.enqueue(link);
                scheduled += 1;
            } else {
                tracing::trace!("Skipping out-of-scope link {}", link);
                self.tally.record(UnitState::OutOfScope);
            }
        }

        tracing::debug!(
            "{}: {} links found, {} scheduled, {} out of scope",
            from,
            found,
            scheduled,
            found - scheduled
        );
    }

    fn record_progress(&self) {
        let completed = self.pages_completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.progress_interval > 0 && completed % self.progress_interval == 0 {
            tracing::info!(
                "Progress: {} pages fetched, {} units outstanding",
                completed,
                self.tracker.outstanding()
            );
        }
    }
}

/// Moves a unit to its next lifecycle state
fn advance(address: &str, state: &mut UnitState, next: UnitState) -> UnitState {
    debug_assert!(
        state.can_transition_to(next),
        "invalid transition {} -> {}",
        state,
        next
    );
    tracing::trace!("{}: {} -> {}", address, state, next);
    *state = next;
    next
}

/// Maps a per-unit failure to the terminal state it leaves the unit in
fn failure_state(error: &RippleError) -> UnitState {
    match error {
        RippleError::MalformedAddress { .. } => UnitState::Malformed,
        RippleError::UnparsableDocument { .. } => UnitState::Unparsable,
        RippleError::Fetch { source, .. } => match source {
            FetchError::ClientError(_) => UnitState::ClientError,
            FetchError::ServerError(_) => UnitState::ServerError,
            FetchError::WrongContentType(_) => UnitState::WrongContentType,
            FetchError::Timeout => UnitState::TimedOut,
            FetchError::Transport(_) => UnitState::Unreachable,
        },
        RippleError::PermitUnavailable { .. } | RippleError::Cancelled { .. } => {
            UnitState::Cancelled
        }
        _ => UnitState::Unreachable,
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!("Crawl worker panicked: {}", e);
        }
    }
}

/// Runs a complete crawl over HTTP with default fetcher settings
///
/// # Arguments
///
/// * `seed` - Address to start from; also defines the crawl scope
/// * `max_concurrency` - Maximum number of fetches in flight at once
/// * `max_pages` - Maximum number of distinct pages fetched
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::crawler::crawl;
///
/// # async fn example() -> Result<(), ripple_crawl::RippleError> {
/// let outcome = crawl("https://example.com", 4, 50).await?;
/// println!("fetched {} pages", outcome.pages_fetched());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed: &str,
    max_concurrency: usize,
    max_pages: usize,
) -> Result<CrawlOutcome, RippleError> {
    let settings = CrawlSettings::new(seed, max_concurrency, max_pages);
    let coordinator = Coordinator::with_http(settings, &FetcherConfig::default())?;
    Ok(coordinator.run().await)
}
