// tagsmith/src/protocol/mod.rs

//! Low-level tag protocol helpers.

pub mod mifare;
pub mod ntag;
pub mod session;

pub use ntag::Command;
pub use session::Session;

use crate::Error;

/// Platform stacks report radio loss as generic I/O failures; re-read the
/// message so connection loss is recognised whatever variant carried it.
pub(crate) fn classify(err: Error) -> Error {
    match err {
        Error::TagIo(msg) => Error::from_io_message(msg),
        Error::Io(e) => Error::from_io_message(e.to_string()),
        other => other,
    }
}
