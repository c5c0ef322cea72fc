//! Plain-text crawl report
//!
//! The report lists every fetched page with the number of times it was
//! encountered, most-linked first. Pages that were discovered after the
//! page budget ran out are listed separately at the end.

use crate::crawler::LedgerSnapshot;

const RULE: &str = "=============================";

/// Renders the final ledger as a human-readable report
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::Ledger;
/// use ripple_crawl::output::render_report;
///
/// let ledger = Ledger::new(10);
/// ledger.claim("https://test.com").unwrap();
/// ledger.claim("https://test.com/").unwrap();
///
/// let report = render_report(&ledger.snapshot());
/// assert!(report.contains("Found 2 links to test.com"));
/// ```
pub fn render_report(snapshot: &LedgerSnapshot) -> String {
    let entries = snapshot.sorted_entries();
    let (fetched, skipped): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|(_, entry)| entry.fetched);

    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\n  CRAWL REPORT\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "Pages fetched: {} (budget {})\n",
        snapshot.pages_fetched, snapshot.max_pages
    ));
    out.push_str(&format!(
        "Distinct pages discovered: {}\n\n",
        snapshot.distinct_pages()
    ));

    for (key, entry) in &fetched {
        out.push_str(&format!("Found {} {} to {}\n", entry.visits, links(entry.visits), key));
    }

    if !skipped.is_empty() {
        out.push_str(&format!(
            "\nNot fetched, page budget spent ({}):\n",
            skipped.len()
        ));
        for (key, entry) in &skipped {
            out.push_str(&format!("Found {} {} to {}\n", entry.visits, links(entry.visits), key));
        }
    }

    out
}

fn links(count: u32) -> &'static str {
    if count == 1 {
        "link"
    } else {
        "links"
    }
}
