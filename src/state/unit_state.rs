/// Work unit lifecycle definitions
///
/// This module defines every state a work unit passes through between being
/// discovered and being done.
use std::fmt;

/// Represents the current state of a work unit in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitState {
    // ===== Active States =====
    /// Address is queued and waiting to be claimed
    Pending,

    /// Address won a ledger claim and a budget slot
    Claimed,

    /// Page is being fetched (holds a permit)
    Fetching,

    /// Links are being extracted from the fetched document
    Extracting,

    /// Discovered in-scope links are being scheduled
    FanningOut,

    // ===== Terminal Success States =====
    /// Page was fetched and its links were scheduled
    Processed,

    // ===== Terminal Rejection States =====
    /// Address was already in the ledger; its visit count was incremented
    Duplicate,

    /// Address entered the ledger but the page budget was exhausted
    OverBudget,

    /// Discovered address lies outside the crawl scope
    OutOfScope,

    /// Address could not be normalized
    Malformed,

    // ===== Terminal Error States =====
    /// Server answered with a 4xx status
    ClientError,

    /// Server answered with a 5xx status
    ServerError,

    /// Response was not a markup document
    WrongContentType,

    /// Fetch exceeded its deadline
    TimedOut,

    /// Transport failure (connection refused, DNS, TLS, redirect limit)
    Unreachable,

    /// Page was fetched but its markup could not be read for links
    Unparsable,

    /// Crawl was cancelled before the unit could finish
    Cancelled,
}

impl UnitState {
    /// Number of terminal states
    pub const TERMINAL_COUNT: usize = 12;

    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (unit may still progress)
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Claimed | Self::Fetching | Self::Extracting | Self::FanningOut
        )
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the unit was turned away without being fetched
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Duplicate | Self::OverBudget | Self::OutOfScope | Self::Malformed
        )
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ClientError
                | Self::ServerError
                | Self::WrongContentType
                | Self::TimedOut
                | Self::Unreachable
                | Self::Unparsable
                | Self::Cancelled
        )
    }

    /// Returns true if the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: UnitState) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Claimed | Self::Duplicate | Self::OverBudget | Self::Malformed
            ),
            Self::Claimed => matches!(next, Self::Fetching | Self::Cancelled),
            Self::Fetching => matches!(
                next,
                Self::Extracting
                    | Self::ClientError
                    | Self::ServerError
                    | Self::WrongContentType
                    | Self::TimedOut
                    | Self::Unreachable
                    | Self::Cancelled
            ),
            Self::Extracting => matches!(next, Self::FanningOut | Self::Unparsable),
            Self::FanningOut => matches!(next, Self::Processed),
            _ => false,
        }
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::FanningOut => "fanning_out",
            Self::Processed => "processed",
            Self::Duplicate => "duplicate",
            Self::OverBudget => "over_budget",
            Self::OutOfScope => "out_of_scope",
            Self::Malformed => "malformed",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::WrongContentType => "wrong_content_type",
            Self::TimedOut => "timed_out",
            Self::Unreachable => "unreachable",
            Self::Unparsable => "unparsable",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all terminal states, in reporting order
    pub fn terminal_states() -> [Self; Self::TERMINAL_COUNT] {
        [
            Self::Processed,
            Self::Duplicate,
            Self::OverBudget,
            Self::OutOfScope,
            Self::Malformed,
            Self::ClientError,
            Self::ServerError,
            Self::WrongContentType,
            Self::TimedOut,
            Self::Unreachable,
            Self::Unparsable,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
