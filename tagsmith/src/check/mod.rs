// tagsmith/src/check/mod.rs

//! Non-destructive compatibility probes.
//!
//! A check walks a fixed sequence of steps (family, geometry, authentication,
//! read, write, UID lock) and stops at the first step that makes the tag
//! unusable. Everything it writes is restored before it returns.

pub mod mifare;
pub mod ntag;

pub use mifare::check_mifare;
pub use ntag::check_ntag215;

use crate::error::Error;
use crate::types::{TagFamily, Uid};

/// Verdict of a compatibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Safe to write
    Compatible,
    /// Usable, but something looked wrong
    Warning {
        /// First problem found
        message: String,
        /// Every problem found
        details: Vec<String>,
    },
    /// Not usable for cloning
    Incompatible {
        /// Why the check stopped
        reason: String,
        /// Problems found before stopping
        details: Vec<String>,
    },
}

/// Result of checking one tag. Built fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityReport {
    /// Overall verdict
    pub classification: Classification,
    /// Human-readable chip name
    pub tag_type: String,
    /// `None` when the tag is neither supported family
    pub family: Option<TagFamily>,
    /// Blocks or pages
    pub cell_count: usize,
    /// Sectors on Mifare; NTAG has none
    pub group_count: usize,
    /// UID, once the tag answered
    pub uid: Option<Uid>,
    /// A dictionary key opened sector 0 (always true for NTAG)
    pub authenticatable: bool,
    /// Manufacturer data could be read
    pub readable: bool,
    /// A test write stuck and was restored
    pub writable: bool,
    /// `None` until the UID write test ran
    pub uid_changeable: Option<bool>,
    /// Non-fatal problems, in discovery order
    pub issues: Vec<String>,
    /// Advice for the user
    pub recommendations: Vec<String>,
}

impl CompatibilityReport {
    pub(crate) fn new(tag_type: impl Into<String>, family: Option<TagFamily>) -> Self {
        Self {
            classification: Classification::Compatible,
            tag_type: tag_type.into(),
            family,
            cell_count: 0,
            group_count: 0,
            uid: None,
            authenticatable: false,
            readable: false,
            writable: false,
            uid_changeable: None,
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Usable for writing (possibly with warnings).
    pub fn is_compatible(&self) -> bool {
        !matches!(self.classification, Classification::Incompatible { .. })
    }

    /// Usable, but with a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self.classification, Classification::Warning { .. })
    }

    /// Terminal: mark the tag incompatible and stop.
    pub(crate) fn reject(mut self, reason: &str, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self.classification = Classification::Incompatible {
            reason: reason.to_string(),
            details: self.issues.clone(),
        };
        self
    }

    /// Reject after a protocol error, telling the user to retry when the
    /// tag simply left the field.
    pub(crate) fn reject_error(mut self, reason: &str, err: &Error) -> Self {
        if err.is_connection_lost() {
            self.recommendations.push(err.user_message());
            return self.reject("connection lost", err.to_string());
        }
        self.reject(reason, err.to_string())
    }

    /// Record a non-fatal problem; the first one becomes the warning message.
    pub(crate) fn caution(&mut self, message: &str, issue: impl Into<String>) {
        self.issues.push(issue.into());
        if matches!(self.classification, Classification::Compatible) {
            self.classification = Classification::Warning {
                message: message.to_string(),
                details: Vec::new(),
            };
        }
    }

    pub(crate) fn recommend(&mut self, text: impl Into<String>) {
        self.recommendations.push(text.into());
    }

    /// Copy the accumulated issues into the classification details.
    pub(crate) fn finish(mut self) -> Self {
        let issues = self.issues.clone();
        match &mut self.classification {
            Classification::Warning { details, .. } | Classification::Incompatible { details, .. } => {
                *details = issues
            }
            Classification::Compatible => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_caution_wins() {
        let mut r = CompatibilityReport::new("NTAG215", Some(TagFamily::Ntag215));
        r.caution("restore failed", "page 16 not restored");
        r.caution("uid locked", "page 0 refused");
        let r = r.finish();
        match r.classification {
            Classification::Warning { message, details } => {
                assert_eq!(message, "restore failed");
                assert_eq!(details.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reject_overrides_warning() {
        let mut r = CompatibilityReport::new("Mifare Classic", None);
        r.caution("odd", "something odd");
        let r = r.reject("not readable", "block 0 failed");
        assert!(!r.is_compatible());
        assert_eq!(r.issues.len(), 2);
    }

    #[test]
    fn connection_loss_recommends_retry() {
        let r = CompatibilityReport::new("NTAG215", None)
            .reject_error("not readable", &Error::ConnectionLost("Tag was lost".into()));
        assert!(matches!(
            r.classification,
            Classification::Incompatible { ref reason, .. } if reason == "connection lost"
        ));
        assert!(r.recommendations[0].contains("keep the tag close"));
    }
}
