// tagsmith/src/lib.rs

//! tagsmith
//!
//! Read, identify, check, write and erase Mifare Classic 1K and NTAG215
//! figure tags over a platform-supplied NFC handle.
#![warn(missing_docs)]

pub mod catalog;
pub mod check;
pub mod config;
pub mod constants;
pub mod eraser;
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod reader;
pub mod service;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;
pub mod writer;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
