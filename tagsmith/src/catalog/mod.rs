// tagsmith/src/catalog/mod.rs

//! Reference catalog of figure images, loaded from JSON documents.

pub mod cache;
pub mod loader;
pub mod record;

pub use cache::Catalog;
pub use record::{MifareMetadata, MifareRecord, NTagMetadata, NTagRecord, TagRecord};

use crate::reader::identify::FuzzyMatcher;
use crate::types::TagFamily;

/// The narrow view readers need of a catalog.
pub trait ReferenceCatalog {
    /// Every record, in load order
    fn records(&self) -> &[TagRecord];

    /// Exact UID match, case-insensitive
    fn lookup_by_uid(&self, uid: &str) -> Option<&TagRecord> {
        self.records()
            .iter()
            .find(|r| r.uid().eq_ignore_ascii_case(uid))
    }

    /// Best record at the default 80% agreement threshold
    fn fuzzy_match(&self, family: TagFamily, cells: &[String]) -> Option<&TagRecord> {
        FuzzyMatcher::default().best_match(family, cells, self.records())
    }
}

impl ReferenceCatalog for [TagRecord] {
    fn records(&self) -> &[TagRecord] {
        self
    }
}

impl ReferenceCatalog for Vec<TagRecord> {
    fn records(&self) -> &[TagRecord] {
        self
    }
}
