// tagsmith/src/writer/mod.rs

//! Writing a catalog record onto a blank or rewritable tag.

pub mod mifare;
pub mod ntag;

pub use mifare::write_mifare;
pub use ntag::write_ntag215;

use crate::error::Failure;

/// Per-cell counters of one write operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Cells sent to the tag
    pub cells_attempted: usize,
    /// Cells the tag accepted
    pub cells_written: usize,
    /// Cells whose read-back matched (trailers: access bits only)
    pub cells_verified: usize,
}

/// Terminal result of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Every critical cell written
    Success(WriteStats),
    /// Write aborted
    Error(Failure),
}

impl WriteOutcome {
    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Counters on success
    pub fn stats(&self) -> Option<&WriteStats> {
        match self {
            Self::Success(s) => Some(s),
            Self::Error(_) => None,
        }
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Error(f) => Some(f),
            Self::Success(_) => None,
        }
    }
}

impl From<Failure> for WriteOutcome {
    fn from(f: Failure) -> Self {
        Self::Error(f)
    }
}
