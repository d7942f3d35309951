// tagsmith/src/eraser/mod.rs

//! Resetting tags to a blank, rewritable state.

pub mod mifare;
pub mod ntag;

pub use mifare::erase_mifare;
pub use ntag::erase_ntag215;

use crate::error::{ErrorKind, Failure};

/// Counters of a successful erase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EraseStats {
    /// Data blocks / pages zeroed and verified
    pub cells_erased: usize,
    /// Sector trailers reset to the default pattern (Mifare only)
    pub groups_reset: usize,
    /// Summary for the user
    pub message: String,
}

/// Terminal result of an erase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EraseOutcome {
    /// Tag blanked
    Success(EraseStats),
    /// Erase failed
    Error(Failure),
}

impl EraseOutcome {
    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Counters on success
    pub fn stats(&self) -> Option<&EraseStats> {
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

impl From<Failure> for EraseOutcome {
    fn from(f: Failure) -> Self {
        Self::Error(f)
    }
}

/// Running totals shared by both families.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub verified: usize,
    pub reset: usize,
    /// writes the tag accepted, verified or not
    pub acknowledged: usize,
}

impl Tally {
    /// Success needs at least one verified cell. Accepted writes that never
    /// stuck mean the tag lies about its write protection.
    pub(crate) fn finish(self, unit: &str) -> EraseOutcome {
        if self.verified + self.reset > 0 {
            let message = if self.reset > 0 {
                format!(
                    "Erased {} {} and reset {} sector trailers",
                    self.verified, unit, self.reset
                )
            } else {
                format!("Erased {} {}", self.verified, unit)
            };
            return EraseOutcome::Success(EraseStats {
                cells_erased: self.verified,
                groups_reset: self.reset,
                message,
            });
        }
        if self.acknowledged > 0 {
            Failure::new(
                ErrorKind::WriteProtected,
                "Tag is write-protected: writes were acknowledged but nothing changed",
            )
            .into()
        } else {
            Failure::new(ErrorKind::WriteProtected, format!("No {} could be erased", unit)).into()
        }
    }
}
