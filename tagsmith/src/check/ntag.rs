// tagsmith/src/check/ntag.rs

//! NTAG215 compatibility check.
//!
//! One user page is written inverted and restored before the tag is
//! reported writable.

use super::CompatibilityReport;
use crate::config::NTAG_PROBE_PAGE;
use crate::constants::{NTAG_CC_PAGE, NTAG215_CC_SIZE_BYTE, NTAG215_PAGE_COUNT};
use crate::protocol::Session;
use crate::protocol::ntag::{is_ntag215_signature, read_page, write_page, write_page_verified};
use crate::transport::traits::DetectedTag;
use crate::types::{TagFamily, Uid};
use crate::utils::hex_from_bytes;
use log::{debug, info};

/// Probe whether `tag` can hold an NTAG215 figure.
pub fn check_ntag215(tag: &dyn DetectedTag) -> CompatibilityReport {
    let Some(tech) = tag.nfc_a() else {
        return CompatibilityReport::new("Unknown", None)
            .reject("wrong tag type", "tag does not support NFC-A")
            .finish();
    };
    if !is_ntag215_signature(&tech.atqa(), tech.sak()) {
        let mut report = CompatibilityReport::new("NFC-A", None);
        report.recommend("Use an NTAG215 tag");
        let issue = format!(
            "ATQA {} / SAK {:02X} is not an NTAG215",
            hex_from_bytes(&tech.atqa()),
            tech.sak()
        );
        return report.reject("wrong tag type", issue).finish();
    }

    let mut report = CompatibilityReport::new("NTAG215", Some(TagFamily::Ntag215));
    report.uid = Some(Uid::from_bytes(&tag.id()));
    report.cell_count = NTAG215_PAGE_COUNT;
    // keyless page model
    report.authenticatable = true;

    let mut session = match Session::open(tech) {
        Ok(s) => s,
        Err(e) => return report.reject_error("connection failed", &e).finish(),
    };

    let cc = match session.with_reconnect(|tech, _| read_page(&mut *tech, NTAG_CC_PAGE)) {
        Ok(p) => p,
        Err(e) => return report.reject_error("not readable", &e).finish(),
    };
    report.readable = true;
    let size = cc.as_bytes()[2];
    if size != 0 && size != NTAG215_CC_SIZE_BYTE {
        report.recommend("Use an NTAG215 tag (NTAG213/216 have a different size)");
        let issue = format!(
            "capability container announces size byte {:02X}, expected {:02X}",
            size, NTAG215_CC_SIZE_BYTE
        );
        return report.reject("unsupported geometry", issue).finish();
    }

    let original = match session.with_reconnect(|tech, _| read_page(&mut *tech, NTAG_PROBE_PAGE)) {
        Ok(p) => p,
        Err(e) => return report.reject_error("not readable", &e).finish(),
    };
    match write_page_verified(&mut *session, NTAG_PROBE_PAGE, &original.inverted()) {
        Ok(true) => report.writable = true,
        Ok(false) => {
            report.recommend("Use a tag that is not write-protected");
            return report
                .reject(
                    "not writable: write-protected despite success response",
                    format!("page {} kept its old content", NTAG_PROBE_PAGE),
                )
                .finish();
        }
        Err(e) => return report.reject_error("not writable", &e).finish(),
    }
    if !matches!(write_page_verified(&mut *session, NTAG_PROBE_PAGE, &original), Ok(true)) {
        report.caution(
            "probe data could not be restored",
            format!("page {} may still hold inverted probe data", NTAG_PROBE_PAGE),
        );
    }

    let uid_page = read_page(&mut *session, 0).and_then(|p| write_page(&mut *session, 0, &p));
    match uid_page {
        Ok(()) => report.uid_changeable = Some(true),
        Err(e) => {
            debug!("page 0 rewrite refused: {}", e);
            report.uid_changeable = Some(false);
            report.caution("UID cannot be changed", "UID pages are read-only");
            report.recommend("The figure will carry this tag's own UID");
        }
    }

    info!("ntag215 check finished: {:?}", report.classification);
    report.finish()
}
