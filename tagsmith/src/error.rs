// tagsmith/src/error.rs

//! Crate error type and the caller-facing failure classes.

use derive_more::Display;
use thiserror::Error;

/// Common error type for every tag transaction and catalog operation.
#[derive(Error, Debug)]
pub enum Error {
    /// The tag left the field or the platform invalidated the handle.
    #[error("tag connection lost: {0}")]
    ConnectionLost(String),

    /// Any other platform I/O failure.
    #[error("tag i/o error: {0}")]
    TagIo(String),

    /// No key in the dictionary opened the sector.
    #[error("authentication failed for sector {sector}")]
    AuthenticationFailure {
        /// Sector that refused every key
        sector: u8,
    },

    /// The tag is not the technology the operation needs.
    #[error("tag type mismatch: {0}")]
    TagTypeMismatch(String),

    /// Record and tag disagree on the number of cells.
    #[error("geometry mismatch: expected {expected} cells, got {actual}")]
    GeometryMismatch {
        /// Cells the tag layout needs
        expected: usize,
        /// Cells actually present
        actual: usize,
    },

    /// The tag answered a write with something other than success.
    #[error("write rejected at cell {index}: response={response}")]
    WriteRejected {
        /// Block or page index
        index: usize,
        /// Hex of the tag's answer
        response: String,
    },

    /// Read-back after a write returned different bytes.
    #[error("verification mismatch at cell {index}: wrote {expected}, read {actual}")]
    VerificationMismatch {
        /// Block or page index
        index: usize,
        /// Hex of the bytes written
        expected: String,
        /// Hex of the bytes read back
        actual: String,
    },

    /// A catalog dump failed to parse or validate.
    #[error("malformed reference data: {0}")]
    MalformedReferenceData(String),

    /// A tag answer had the wrong size.
    #[error("invalid response length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Bytes required
        expected: usize,
        /// Bytes received
        actual: usize,
    },

    /// Requested operation is not available for this tag.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Filesystem error while loading the catalog.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading the catalog.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure classes surfaced to callers alongside a message.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Tag left the field
    #[display(fmt = "connection lost")]
    ConnectionLost,
    /// No dictionary key opened a sector
    #[display(fmt = "authentication failure")]
    AuthenticationFailure,
    /// Wrong chip for the operation
    #[display(fmt = "tag type mismatch")]
    TagTypeMismatch,
    /// Record and tag sizes disagree
    #[display(fmt = "geometry mismatch")]
    GeometryMismatch,
    /// Tag refused a write
    #[display(fmt = "write protected")]
    WriteProtected,
    /// Read-back differed from what was written
    #[display(fmt = "verification mismatch")]
    VerificationMismatch,
    /// Catalog data is unusable
    #[display(fmt = "malformed reference data")]
    MalformedReferenceData,
    /// Anything else
    #[display(fmt = "unknown protocol error")]
    UnknownProtocolError,
}

/// Message fragments platform stacks use when the tag leaves the field.
const CONNECTION_LOSS_PATTERNS: [&str; 4] = ["out of date", "connection", "tag was lost", "ioexception"];

impl Error {
    /// Classify a raw platform I/O message. Radio-range failures become
    /// `ConnectionLost` (the only retried class); anything else is `TagIo`.
    pub fn from_io_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if CONNECTION_LOSS_PATTERNS.iter().any(|p| lower.contains(p)) {
            Error::ConnectionLost(message)
        } else {
            Error::TagIo(message)
        }
    }

    /// Coarse class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConnectionLost(_) => ErrorKind::ConnectionLost,
            Error::AuthenticationFailure { .. } => ErrorKind::AuthenticationFailure,
            Error::TagTypeMismatch(_) => ErrorKind::TagTypeMismatch,
            Error::GeometryMismatch { .. } => ErrorKind::GeometryMismatch,
            Error::WriteRejected { .. } => ErrorKind::WriteProtected,
            Error::VerificationMismatch { .. } => ErrorKind::VerificationMismatch,
            Error::MalformedReferenceData(_) | Error::Json(_) => ErrorKind::MalformedReferenceData,
            Error::TagIo(_)
            | Error::InvalidLength { .. }
            | Error::UnsupportedOperation(_)
            | Error::Io(_) => ErrorKind::UnknownProtocolError,
        }
    }

    /// Whether this is the retried, connection-loss class.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Error::ConnectionLost(_))
    }

    /// Text suitable for showing to the person holding the tag.
    pub fn user_message(&self) -> String {
        match self {
            Error::ConnectionLost(_) => KEEP_CLOSE.to_string(),
            other => other.to_string(),
        }
    }

    /// Collapse into the payload carried by operation outcomes.
    pub fn into_failure(self) -> Failure {
        Failure::new(self.kind(), self.user_message())
    }
}

pub(crate) const KEEP_CLOSE: &str = "Tag connection lost. Please keep the tag close and try again.";

/// Terminal failure payload carried by every operation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Failure class
    pub kind: ErrorKind,
    /// Human-readable explanation
    pub message: String,
}

impl Failure {
    /// Build a failure from a class and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        err.into_failure()
    }
}
