// tagsmith/src/reader/ntag.rs

//! NTAG215 page dump.

use super::{ReadOutcome, TagDump, identify};
use crate::catalog::ReferenceCatalog;
use crate::constants::NTAG215_PAGE_COUNT;
use crate::error::Error;
use crate::protocol::Session;
use crate::protocol::ntag::{is_ntag215_signature, read_page};
use crate::transport::traits::DetectedTag;
use crate::types::{TagFamily, Uid};
use crate::utils::hex_from_bytes;
use log::{debug, info};

/// Dump all 135 pages of an NTAG215 and try to identify it.
pub fn read_ntag215<C>(tag: &dyn DetectedTag, catalog: &C) -> ReadOutcome
where
    C: ReferenceCatalog + ?Sized,
{
    let Some(tech) = tag.nfc_a() else {
        return ReadOutcome::Error(
            Error::TagTypeMismatch("tag does not support NFC-A".into()).into_failure(),
        );
    };
    if !is_ntag215_signature(&tech.atqa(), tech.sak()) {
        return ReadOutcome::Error(
            Error::TagTypeMismatch(format!(
                "ATQA {} / SAK {:02X} is not an NTAG215",
                hex_from_bytes(&tech.atqa()),
                tech.sak()
            ))
            .into_failure(),
        );
    }
    let mut session = match Session::open(tech) {
        Ok(s) => s,
        Err(e) => return ReadOutcome::Error(e.into_failure()),
    };

    let placeholder = TagFamily::Ntag215.placeholder();
    let mut cells = Vec::with_capacity(NTAG215_PAGE_COUNT);
    let mut cells_read = 0;
    for page in 0..NTAG215_PAGE_COUNT {
        match session.with_reconnect(|tech, _| read_page(&mut *tech, page)) {
            Ok(data) => {
                cells.push(data.to_hex());
                cells_read += 1;
            }
            Err(e) if e.is_connection_lost() => return ReadOutcome::Error(e.into_failure()),
            Err(e) => {
                debug!("page {} unreadable: {}", page, e);
                cells.push(placeholder.to_string());
            }
        }
    }
    drop(session);

    if cells_read == 0 {
        return ReadOutcome::Error(
            Error::TagIo("no page of the tag could be read".into()).into_failure(),
        );
    }
    info!("read {} of {} pages", cells_read, NTAG215_PAGE_COUNT);

    let uid = Uid::from_bytes(&tag.id());
    let identified = identify(catalog, TagFamily::Ntag215, &uid, &cells);
    ReadOutcome::Success(TagDump {
        family: TagFamily::Ntag215,
        uid,
        cells,
        identified,
        cells_read,
        sectors_authenticated: 0,
    })
}
