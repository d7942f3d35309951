// tagsmith/src/reader/mod.rs

//! Full-tag dumps and identification against the reference catalog.

pub mod identify;
pub mod mifare;
pub mod ntag;

pub use identify::FuzzyMatcher;
pub use mifare::read_mifare;
pub use ntag::read_ntag215;

use crate::catalog::{ReferenceCatalog, TagRecord};
use crate::error::Failure;
use crate::types::{TagFamily, Uid};
use log::{debug, info};

/// Everything read from one tag, in address order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDump {
    /// Geometry the dump follows
    pub family: TagFamily,
    /// Anti-collision UID
    pub uid: Uid,
    /// Upper-case hex per block/page; unreadable cells are all-zero placeholders
    pub cells: Vec<String>,
    /// Catalog record this tag was cloned from, if recognised
    pub identified: Option<TagRecord>,
    /// Cells actually read (placeholders excluded)
    pub cells_read: usize,
    /// Always 0 for NTAG215
    pub sectors_authenticated: usize,
}

impl TagDump {
    /// Every cell was read
    pub fn is_complete(&self) -> bool {
        self.cells_read == self.family.cell_count()
    }
}

/// Terminal result of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Dump, possibly partial
    Success(TagDump),
    /// Read aborted
    Error(Failure),
}

impl ReadOutcome {
    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The dump on success
    pub fn dump(&self) -> Option<&TagDump> {
        match self {
            Self::Success(d) => Some(d),
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

/// Find the catalog record a dump was written from.
///
/// NTAG215 dumps try the character/game id pages first. Both families then
/// fall back to cell-by-cell fuzzy matching and finally to the UID.
pub fn identify<C>(catalog: &C, family: TagFamily, uid: &Uid, cells: &[String]) -> Option<TagRecord>
where
    C: ReferenceCatalog + ?Sized,
{
    if family == TagFamily::Ntag215 {
        if let Some(r) = identify::match_ntag_ids(cells, catalog.records()) {
            debug!("identified by character id: {}", r.display_name());
            return Some(r.clone());
        }
    }
    let found = catalog.fuzzy_match(family, cells).or_else(|| {
        catalog
            .lookup_by_uid(&uid.to_hex())
            .filter(|r| r.family() == family)
    });
    match found {
        Some(r) => info!("identified tag as '{}'", r.display_name()),
        None => debug!("tag {} not found in catalog", uid),
    }
    found.cloned()
}
