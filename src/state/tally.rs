use crate::state::UnitState;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters of how work units ended
///
/// Workers record their terminal state here so that every failure leaves a
/// trace in the final report, even when it was only logged at debug level.
#[derive(Debug, Default)]
pub struct OutcomeTally {
    counts: [AtomicU64; UnitState::TERMINAL_COUNT],
}

impl OutcomeTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one unit ending in `state`; active states are ignored
    pub fn record(&self, state: UnitState) {
        if let Some(idx) = Self::slot(state) {
            self.counts[idx].fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::debug!("Ignoring non-terminal state {} in tally", state);
        }
    }

    /// Current count for a terminal state
    pub fn get(&self, state: UnitState) -> u64 {
        Self::slot(state)
            .map(|idx| self.counts[idx].load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Copies the non-zero counts out
    pub fn snapshot(&self) -> BTreeMap<UnitState, u64> {
        UnitState::terminal_states()
            .into_iter()
            .map(|state| (state, self.get(state)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    fn slot(state: UnitState) -> Option<usize> {
        UnitState::terminal_states()
            .iter()
            .position(|candidate| *candidate == state)
    }
}
