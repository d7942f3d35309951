// tagsmith/src/writer/ntag.rs

//! Clone a catalog record onto an NTAG215.

use super::{WriteOutcome, WriteStats};
use crate::catalog::NTagRecord;
use crate::config::MIN_VERIFIED_PAGES;
use crate::constants::{NTAG_LAST_IDENTITY_PAGE, NTAG_LAST_UID_PAGE, NTAG215_PAGE_COUNT};
use crate::error::{Error, ErrorKind, Failure};
use crate::protocol::Session;
use crate::protocol::ntag::{is_ntag215_signature, read_page, write_page};
use crate::transport::traits::DetectedTag;
use crate::types::PageData;
use crate::utils::page_from_hex;
use log::{debug, error, info, warn};

/// Write all 135 pages of `record`.
///
/// Pages 0-2 (UID, BCC, static lock) are best effort. Every later page is
/// read back; a mismatch on pages 3-10 fails the write because the figure
/// would not be recognised.
pub fn write_ntag215(tag: &dyn DetectedTag, record: &NTagRecord) -> WriteOutcome {
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

    let mut stats = WriteStats::default();
    let mut critical: Vec<usize> = Vec::new();
    for page in 0..NTAG215_PAGE_COUNT {
        let data: PageData = record
            .pages
            .get(page)
            .map(|hex| page_from_hex(hex))
            .unwrap_or(PageData::ZERO);
        stats.cells_attempted += 1;

        if page <= NTAG_LAST_UID_PAGE {
            match session.with_reconnect(|tech, _| write_page(&mut *tech, page, &data)) {
                Ok(()) => stats.cells_written += 1,
                Err(e) if e.is_connection_lost() => {
                    error!("connection lost at page {}: {}", page, e);
                    return e.into_failure().into();
                }
                Err(e) => debug!("page {} not written (UID/lock area): {}", page, e),
            }
            continue;
        }

        let result = session.with_reconnect(|tech, _| {
            write_page(&mut *tech, page, &data)?;
            match read_page(&mut *tech, page) {
                Ok(actual) => Ok(actual == data),
                Err(e) if e.is_connection_lost() => Err(e),
                Err(e) => {
                    debug!("page {} read-back failed: {}", page, e);
                    Ok(false)
                }
            }
        });
        match result {
            Ok(verified) => {
                stats.cells_written += 1;
                if verified {
                    stats.cells_verified += 1;
                } else if page <= NTAG_LAST_IDENTITY_PAGE {
                    warn!("critical page {} did not verify", page);
                    critical.push(page);
                } else {
                    debug!("page {} did not verify", page);
                }
            }
            Err(e) if e.is_connection_lost() => {
                error!("connection lost at page {}: {}", page, e);
                return e.into_failure().into();
            }
            Err(e @ Error::WriteRejected { .. }) => {
                error!("page {} refused: {}", page, e);
                return Failure::new(
                    ErrorKind::WriteProtected,
                    format!("Page {} is write-protected: {}", page, e),
                )
                .into();
            }
            Err(e) => {
                error!("page {} failed: {}", page, e);
                return e.into_failure().into();
            }
        }
    }
    drop(session);

    if !critical.is_empty() {
        let pages: Vec<String> = critical.iter().map(|p| p.to_string()).collect();
        return Failure::new(
            ErrorKind::VerificationMismatch,
            format!(
                "Verification failed: critical pages ({}) were not written",
                pages.join(", ")
            ),
        )
        .into();
    }
    if stats.cells_written == 0 {
        return Failure::new(ErrorKind::WriteProtected, "No page could be written").into();
    }
    if stats.cells_verified < MIN_VERIFIED_PAGES {
        warn!("only {} pages verified", stats.cells_verified);
    }
    info!(
        "wrote '{}': {} attempted, {} written, {} verified",
        record.metadata.display_name(),
        stats.cells_attempted,
        stats.cells_written,
        stats.cells_verified
    );
    WriteOutcome::Success(stats)
}
