//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including run information, outcome statistics, and the visit ledger.

use crate::crawler::CrawlOutcome;
use crate::output::stats::CrawlStatistics;
use crate::output::OutputResult;
use crate::state::UnitState;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of ledger rows written to the summary
const MAX_LEDGER_ROWS: usize = 200;

/// Generates a markdown summary of a finished crawl
///
/// # Arguments
///
/// * `outcome` - The finished crawl
/// * `config_hash` - Hash of the configuration file, if one was used
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    outcome: &CrawlOutcome,
    config_hash: Option<&str>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(outcome, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote crawl summary to {}", output_path.display());
    Ok(())
}

/// Formats a finished crawl as markdown
pub fn format_markdown_summary(outcome: &CrawlOutcome, config_hash: Option<&str>) -> String {
    let stats = CrawlStatistics::from_outcome(outcome);
    let mut md = String::new();

    // Title
    md.push_str("# Ripple-Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", outcome.seed));
    md.push_str(&format!("- **Scope**: {}\n", outcome.scope));
    md.push_str(&format!("- **Started**: {}\n", outcome.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        outcome.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.duration_ms as f64 / 1000.0
    ));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if outcome.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    ));
    md.push_str(&format!(
        "- **Config Hash**: {}\n\n",
        config_hash.unwrap_or("(defaults)")
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Pages Fetched**: {} of {}\n",
        stats.pages_fetched, stats.max_pages
    ));
    md.push_str(&format!("- **Distinct Pages**: {}\n", stats.distinct_pages));
    md.push_str(&format!("- **Total Visits**: {}\n", stats.total_visits));
    md.push_str(&format!("- **Total Errors**: {}\n", stats.total_errors()));
    md.push_str(&format!(
        "- **Total Rejections**: {}\n",
        stats.total_rejections()
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Outcome breakdown, every terminal state listed for comparability
    md.push_str("## Unit Outcome Breakdown\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    for state in UnitState::terminal_states() {
        md.push_str(&format!("| {} | {} |\n", state, stats.count(state)));
    }
    md.push('\n');

    // Ledger
    let entries = outcome.ledger.sorted_entries();
    if !entries.is_empty() {
        md.push_str("## Visit Ledger\n\n");
        md.push_str("| Page | Visits | Fetched |\n");
        md.push_str("|------|--------|---------|\n");

        for (key, entry) in entries.iter().take(MAX_LEDGER_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                key,
                entry.visits,
                if entry.fetched { "yes" } else { "no" }
            ));
        }
        if entries.len() > MAX_LEDGER_ROWS {
            md.push_str(&format!(
                "\n... and {} more\n",
                entries.len() - MAX_LEDGER_ROWS
            ));
        }
        md.push('\n');
    }

    md
}
