// tagsmith/src/prelude.rs

//! Convenience re-exports for typical consumers.

pub use crate::catalog::{Catalog, MifareRecord, NTagRecord, ReferenceCatalog, TagRecord};
pub use crate::check::{Classification, CompatibilityReport};
pub use crate::eraser::{EraseOutcome, EraseStats};
pub use crate::reader::{ReadOutcome, TagDump};
pub use crate::service::TagService;
pub use crate::transport::{DetectedTag, MifareClassicTech, NfcATech, TagConnection};
pub use crate::writer::{WriteOutcome, WriteStats};
pub use crate::{
    BlockData, Error, ErrorKind, Failure, MifareKey, MifareType, PageData, Result, TagFamily, Uid,
};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_from_hex, bytes_to_hex_spaced, hex_from_bytes, page_from_hex};
