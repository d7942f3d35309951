// tagsmith/src/eraser/ntag.rs

//! Zero the NTAG215 user area and restore the default capability container.

use super::{EraseOutcome, Tally};
use crate::constants::{NTAG_CC_PAGE, NTAG_LAST_USER_PAGE, NTAG215_DEFAULT_CC};
use crate::error::Error;
use crate::protocol::Session;
use crate::protocol::ntag::{is_ntag215_signature, read_page, write_page};
use crate::transport::traits::DetectedTag;
use crate::types::PageData;
use log::{debug, info, warn};

/// Restore the capability container and zero user pages 4-129.
///
/// UID/lock pages and the configuration area are never touched.
pub fn erase_ntag215(tag: &dyn DetectedTag) -> EraseOutcome {
    let Some(tech) = tag.nfc_a() else {
        return Error::TagTypeMismatch("tag does not support NFC-A".into())
            .into_failure()
            .into();
    };
    if !is_ntag215_signature(&tech.atqa(), tech.sak()) {
        return Error::TagTypeMismatch("tag is not an NTAG215".into())
            .into_failure()
            .into();
    }
    let mut session = match Session::open(tech) {
        Ok(s) => s,
        Err(e) => return e.into_failure().into(),
    };

    let mut tally = Tally::default();
    for page in NTAG_CC_PAGE..=NTAG_LAST_USER_PAGE {
        let target = if page == NTAG_CC_PAGE {
            PageData::from_bytes(NTAG215_DEFAULT_CC)
        } else {
            PageData::ZERO
        };
        let result = session.with_reconnect(|tech, _| {
            write_page(&mut *tech, page, &target)?;
            match read_page(&mut *tech, page) {
                Ok(actual) => Ok(actual == target),
                Err(e) if e.is_connection_lost() => Err(e),
                Err(e) => {
                    debug!("page {} read-back failed: {}", page, e);
                    Ok(false)
                }
            }
        });
        match result {
            Ok(true) => {
                tally.acknowledged += 1;
                tally.verified += 1;
            }
            Ok(false) => {
                tally.acknowledged += 1;
                debug!("page {} did not verify after erase", page);
            }
            Err(e) if e.is_connection_lost() => return e.into_failure().into(),
            Err(e) => warn!("page {} not erased: {}", page, e),
        }
    }
    drop(session);

    info!("erase finished: {} pages verified", tally.verified);
    tally.finish("pages")
}
