//! Statistics derived from a finished crawl
//!
//! This module turns the outcome tally into totals and rates, and prints
//! them for the operator.

use crate::crawler::CrawlOutcome;
use crate::state::UnitState;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Pages that consumed a budget slot
    pub pages_fetched: usize,

    /// The page budget
    pub max_pages: usize,

    /// Distinct normalized keys in the ledger
    pub distinct_pages: usize,

    /// Sum of all visit counts (first claims plus rediscoveries)
    pub total_visits: u64,

    /// How many units ended in each terminal state
    pub units_by_state: BTreeMap<UnitState, u64>,

    /// Wall-clock duration in milliseconds
    pub duration_ms: i64,

    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Collects statistics from a finished crawl
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        Self {
            pages_fetched: outcome.ledger.pages_fetched,
            max_pages: outcome.ledger.max_pages,
            distinct_pages: outcome.ledger.distinct_pages(),
            total_visits: outcome
                .ledger
                .visits
                .values()
                .map(|entry| u64::from(entry.visits))
                .sum(),
            units_by_state: outcome.outcomes.clone(),
            duration_ms: outcome.duration().num_milliseconds(),
            cancelled: outcome.cancelled,
        }
    }

    /// Total units that reached a terminal state
    pub fn total_units(&self) -> u64 {
        self.units_by_state.values().sum()
    }

    /// Units that ended in an error state
    pub fn total_errors(&self) -> u64 {
        self.sum_where(UnitState::is_error)
    }

    /// Units turned away before fetching
    pub fn total_rejections(&self) -> u64 {
        self.sum_where(UnitState::is_rejection)
    }

    pub fn count(&self, state: UnitState) -> u64 {
        self.units_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Percentage of fetched pages that were fully processed
    pub fn success_rate(&self) -> f64 {
        if self.pages_fetched == 0 {
            return 0.0;
        }
        self.count(UnitState::Processed) as f64 / self.pages_fetched as f64 * 100.0
    }

    fn sum_where(&self, predicate: fn(&UnitState) -> bool) -> u64 {
        self.units_by_state
            .iter()
            .filter(|(state, _)| predicate(state))
            .map(|(_, count)| count)
            .sum()
    }
}

/// Formats statistics for terminal output
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::from("=== Crawl Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!(
        "  Pages fetched: {} / {}\n",
        stats.pages_fetched, stats.max_pages
    ));
    out.push_str(&format!("  Distinct pages: {}\n", stats.distinct_pages));
    out.push_str(&format!("  Total visits: {}\n", stats.total_visits));
    out.push_str(&format!(
        "  Duration: {:.2}s{}\n\n",
        stats.duration_ms as f64 / 1000.0,
        if stats.cancelled { " (cancelled)" } else { "" }
    ));

    out.push_str("Units by Outcome:\n");
    // Sort states by count (descending)
    let mut state_counts: Vec<_> = stats.units_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let total = stats.total_units();
    for (state, count) in state_counts {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        out.push_str(&format!("  {}: {} ({:.1}%)\n", state, count, percentage));
    }
    out.push('\n');

    out.push_str(&format!(
        "Rejected before fetch: {} (duplicate, over budget, out of scope, malformed)\n",
        stats.total_rejections()
    ));
    out.push_str(&format!(
        "Success Rate: {:.1}% ({} / {} fetched pages processed, {} errors)\n",
        stats.success_rate(),
        stats.count(UnitState::Processed),
        stats.pages_fetched,
        stats.total_errors()
    ));

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
