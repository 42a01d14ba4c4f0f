/// URL status definitions for tracking queue progress
///
/// A record moves strictly forward: `New -> Processing -> {Done | Error}`.
use std::fmt;

/// Represents the current state of a URL record in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlStatus {
    // ===== Active States =====
    /// Loaded into the queue and waiting for a worker
    New,

    /// Claimed by exactly one worker and being fetched
    Processing,

    // ===== Terminal States =====
    /// The remote endpoint answered; the raw HTTP code is recorded
    Done,

    /// The fetch failed at the transport level
    Error,
}

impl UrlStatus {
    /// Returns true if this is a terminal state (no further transitions occur)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Returns true if this record may still be worked on
    pub fn is_active(&self) -> bool {
        matches!(self, Self::New | Self::Processing)
    }

    /// Returns true if moving from `self` to `next` is a legal forward step
    pub fn can_transition_to(&self, next: UrlStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Processing)
                | (Self::Processing, Self::Done)
                | (Self::Processing, Self::Error)
        )
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Done => "DONE",
            Self::Error => "ERROR",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(Self::New),
            "PROCESSING" => Some(Self::Processing),
            "DONE" => Some(Self::Done),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns all statuses in lifecycle order
    pub fn all_statuses() -> [Self; 4] {
        [Self::New, Self::Processing, Self::Done, Self::Error]
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
