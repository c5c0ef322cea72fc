//! Visit ledger and page budget
//!
//! The ledger is the only shared mutable crawl state. It exposes a single
//! mutating operation, [`Ledger::claim`], which inserts-or-increments a key
//! and checks the page budget under one lock, so duplicate detection and
//! budget enforcement are exact even when many workers claim at once.

use crate::url::{normalize_url, NormalizedKey};
use crate::UrlError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ledger record for one normalized key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitEntry {
    /// 1 + number of times the key was rediscovered after its first claim
    pub visits: u32,

    /// Whether the first claim of this key also won a budget slot
    pub fetched: bool,
}

/// Result of a claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// First sighting of the key and under budget: the caller must fetch it
    Fetch { key: NormalizedKey },

    /// Key already known; its visit count was incremented
    Duplicate { key: NormalizedKey, visits: u32 },

    /// First sighting of the key but the budget is spent; the key stays in
    /// the ledger with one visit and is never fetched
    OverBudget { key: NormalizedKey },
}

#[derive(Debug)]
struct LedgerState {
    visits: HashMap<NormalizedKey, VisitEntry>,
    pages_fetched: usize,
    max_pages: usize,
}

/// Visit ledger plus page budget behind a single critical section
#[derive(Debug)]
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Creates an empty ledger allowing at most `max_pages` fetches
    pub fn new(max_pages: usize) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                visits: HashMap::new(),
                pages_fetched: 0,
                max_pages,
            }),
        }
    }

    /// Claims an address
    ///
    /// # Claim Rules
    ///
    /// | Ledger has key | Budget left | Effect | Result |
    /// |---|---|---|---|
    /// | yes | any | visits += 1 | `Duplicate` |
    /// | no | yes | insert (1, fetched), pages_fetched += 1 | `Fetch` |
    /// | no | no | insert (1, not fetched) | `OverBudget` |
    ///
    /// Normalization is pure and happens before the lock is taken; the
    /// lookup, insert, and budget check all happen under it.
    ///
    /// # Returns
    ///
    /// * `Ok(Claim)` - What the caller should do with the address
    /// * `Err(UrlError)` - The address cannot be normalized; nothing was recorded
    pub fn claim(&self, address: &str) -> Result<Claim, UrlError> {
        let key = normalize_url(address)?;
        let mut state = self.lock();

        if let Some(entry) = state.visits.get_mut(&key) {
            entry.visits += 1;
            let visits = entry.visits;
            return Ok(Claim::Duplicate { key, visits });
        }

        let under_budget = state.pages_fetched < state.max_pages;
        if under_budget {
            state.pages_fetched += 1;
        }
        state.visits.insert(
            key.clone(),
            VisitEntry {
                visits: 1,
                fetched: under_budget,
            },
        );

        if under_budget {
            Ok(Claim::Fetch { key })
        } else {
            Ok(Claim::OverBudget { key })
        }
    }

    /// Number of claims that won a budget slot so far
    pub fn pages_fetched(&self) -> usize {
        self.lock().pages_fetched
    }

    /// Copies the full ledger out for reporting
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.lock();
        LedgerSnapshot {
            visits: state.visits.clone(),
            pages_fetched: state.pages_fetched,
            max_pages: state.max_pages,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // No code path panics while holding the lock, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Point-in-time copy of the ledger and budget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub visits: HashMap<NormalizedKey, VisitEntry>,
    pub pages_fetched: usize,
    pub max_pages: usize,
}

impl LedgerSnapshot {
    /// Number of distinct keys discovered (fetched or not)
    pub fn distinct_pages(&self) -> usize {
        self.visits.len()
    }

    /// Visit count for a key, if it was ever claimed
    pub fn visits_of(&self, key: &str) -> Option<u32> {
        self.visits.get(key).map(|entry| entry.visits)
    }

    /// Entries sorted by visit count descending, then key ascending
    pub fn sorted_entries(&self) -> Vec<(&NormalizedKey, VisitEntry)> {
        let mut entries: Vec<_> = self.visits.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| b.1.visits.cmp(&a.1.visits).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_claim_fetches() {
        let ledger = Ledger::new(10);
        let claim = ledger.claim("https://test.com/a").unwrap();
        assert!(matches!(claim, Claim::Fetch { ref key } if key.as_str() == "test.com/a"));
        assert_eq!(ledger.pages_fetched(), 1);
    }

    #[test]
    fn test_second_claim_is_duplicate() {
        let ledger = Ledger::new(10);
        ledger.claim("https://test.com/a").unwrap();
        let claim = ledger.claim("http://test.com/a/").unwrap();

        assert!(matches!(claim, Claim::Duplicate { visits: 2, .. }));
        assert_eq!(ledger.pages_fetched(), 1);
        assert_eq!(ledger.snapshot().visits_of("test.com/a"), Some(2));
    }

    #[test]
    fn test_over_budget_still_recorded() {
        let ledger = Ledger::new(1);
        ledger.claim("https://test.com").unwrap();
        let claim = ledger.claim("https://test.com/b").unwrap();

        assert!(matches!(claim, Claim::OverBudget { .. }));
        assert_eq!(ledger.pages_fetched(), 1);

        let snapshot = ledger.snapshot();
        let entry = snapshot.visits["test.com/b"];
        assert_eq!(entry.visits, 1);
        assert!(!entry.fetched);
    }

    #[test]
    fn test_over_budget_key_rediscovered_is_duplicate() {
        let ledger = Ledger::new(0);
        assert!(matches!(
            ledger.claim("https://test.com").unwrap(),
            Claim::OverBudget { .. }
        ));
        assert!(matches!(
            ledger.claim("https://test.com/").unwrap(),
            Claim::Duplicate { visits: 2, .. }
        ));
        assert_eq!(ledger.pages_fetched(), 0);
    }

    #[test]
    fn test_malformed_address_records_nothing() {
        let ledger = Ledger::new(10);
        assert!(ledger.claim("/relative/only").is_err());
        assert_eq!(ledger.snapshot().distinct_pages(), 0);
        assert_eq!(ledger.pages_fetched(), 0);
    }

    #[test]
    fn test_sorted_entries() {
        let ledger = Ledger::new(10);
        for address in [
            "https://test.com/b",
            "https://test.com/a",
            "https://test.com/c",
            "https://test.com/c",
            "https://test.com/a",
            "https://test.com/c",
        ] {
            ledger.claim(address).unwrap();
        }

        let snapshot = ledger.snapshot();
        let order: Vec<_> = snapshot
            .sorted_entries()
            .into_iter()
            .map(|(k, e)| (k.as_str().to_string(), e.visits))
            .collect();

        assert_eq!(
            order,
            vec![
                ("test.com/c".to_string(), 3),
                ("test.com/a".to_string(), 2),
                ("test.com/b".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_concurrent_claims_respect_budget() {
        let ledger = Arc::new(Ledger::new(25));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let mut won = 0;
                    for page in 0..50 {
                        // every thread races for the same 50 pages
                        let address = format!("https://test.com/page/{}", page);
                        if let Ok(Claim::Fetch { .. }) = ledger.claim(&address) {
                            won += 1;
                        }
                    }
                    won
                })
            })
            .collect();

        let total_won: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        let snapshot = ledger.snapshot();

        assert_eq!(total_won, 25);
        assert_eq!(snapshot.pages_fetched, 25);
        assert_eq!(snapshot.distinct_pages(), 50);
        assert_eq!(
            snapshot.visits.values().filter(|e| e.fetched).count(),
            25
        );
        let total_visits: u32 = snapshot.visits.values().map(|e| e.visits).sum();
        assert_eq!(total_visits, 8 * 50);
    }
}
