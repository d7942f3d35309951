// tagsmith/src/service.rs

//! Single entry point dispatching check/read/write/erase by tag family.

use crate::catalog::{ReferenceCatalog, TagRecord};
use crate::check::{self, CompatibilityReport};
use crate::eraser::{self, EraseOutcome};
use crate::protocol::ntag::is_ntag215_signature;
use crate::reader::{self, ReadOutcome};
use crate::transport::traits::DetectedTag;
use crate::types::TagFamily;
use crate::writer::{self, WriteOutcome};
use log::debug;

/// Operations on detected tags, identified against a reference catalog.
#[derive(Debug, Clone)]
pub struct TagService<C> {
    catalog: C,
}

impl<C: ReferenceCatalog> TagService<C> {
    /// Wrap a catalog
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Catalog used for identification
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Guess the family from the technologies a tag advertises.
    pub fn detect_family(tag: &dyn DetectedTag) -> Option<TagFamily> {
        let techs = tag.tech_list();
        if techs.iter().any(|t| t == "MifareClassic") {
            return Some(TagFamily::MifareClassic1K);
        }
        let family = tag
            .nfc_a()
            .filter(|t| is_ntag215_signature(&t.atqa(), t.sak()))
            .map(|_| TagFamily::Ntag215);
        debug!("techs {:?} -> {:?}", techs, family);
        family
    }

    /// Run the compatibility check for `family`.
    pub fn check(&self, tag: &dyn DetectedTag, family: TagFamily) -> CompatibilityReport {
        match family {
            TagFamily::MifareClassic1K => check::check_mifare(tag),
            TagFamily::Ntag215 => check::check_ntag215(tag),
        }
    }

    /// Dump the tag and identify it against the catalog.
    pub fn read(&self, tag: &dyn DetectedTag, family: TagFamily) -> ReadOutcome {
        match family {
            TagFamily::MifareClassic1K => reader::read_mifare(tag, &self.catalog),
            TagFamily::Ntag215 => reader::read_ntag215(tag, &self.catalog),
        }
    }

    /// Write `record`; the family follows the record variant.
    pub fn write(&self, tag: &dyn DetectedTag, record: &TagRecord) -> WriteOutcome {
        match record {
            TagRecord::Mifare(r) => writer::write_mifare(tag, r),
            TagRecord::NTag(r) => writer::write_ntag215(tag, r),
        }
    }

    /// Blank the tag back to factory defaults.
    pub fn erase(&self, tag: &dyn DetectedTag, family: TagFamily) -> EraseOutcome {
        match family {
            TagFamily::MifareClassic1K => eraser::erase_mifare(tag),
            TagFamily::Ntag215 => eraser::erase_ntag215(tag),
        }
    }
}

#[cfg(feature = "async")]
pub use self::blocking::*;

/// Awaitable wrappers running each operation on tokio's blocking pool.
#[cfg(feature = "async")]
mod blocking {
    use super::TagService;
    use crate::catalog::{ReferenceCatalog, TagRecord};
    use crate::check::CompatibilityReport;
    use crate::eraser::EraseOutcome;
    use crate::reader::ReadOutcome;
    use crate::transport::traits::DetectedTag;
    use crate::types::TagFamily;
    use crate::writer::WriteOutcome;
    use crate::{Error, Result};
    use std::sync::Arc;

    /// Tag handle that can move onto the blocking pool.
    pub type BoxedTag = Box<dyn DetectedTag + Send>;

    async fn run<R, F>(f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| Error::Io(e.into()))
    }

    /// `TagService::check` off the async executor. Errs only when the blocking task is cancelled or panics.
    pub async fn spawn_check<C>(
        service: Arc<TagService<C>>,
        tag: BoxedTag,
        family: TagFamily,
    ) -> Result<CompatibilityReport>
    where
        C: ReferenceCatalog + Send + Sync + 'static,
    {
        run(move || service.check(tag.as_ref(), family)).await
    }

    /// `TagService::read` off the async executor.
    pub async fn spawn_read<C>(
        service: Arc<TagService<C>>,
        tag: BoxedTag,
        family: TagFamily,
    ) -> Result<ReadOutcome>
    where
        C: ReferenceCatalog + Send + Sync + 'static,
    {
        run(move || service.read(tag.as_ref(), family)).await
    }

    /// `TagService::write` off the async executor.
    pub async fn spawn_write<C>(
        service: Arc<TagService<C>>,
        tag: BoxedTag,
        record: TagRecord,
    ) -> Result<WriteOutcome>
    where
        C: ReferenceCatalog + Send + Sync + 'static,
    {
        run(move || service.write(tag.as_ref(), &record)).await
    }

    /// `TagService::erase` off the async executor.
    pub async fn spawn_erase<C>(
        service: Arc<TagService<C>>,
        tag: BoxedTag,
        family: TagFamily,
    ) -> Result<EraseOutcome>
    where
        C: ReferenceCatalog + Send + Sync + 'static,
    {
        run(move || service.erase(tag.as_ref(), family)).await
    }

}
