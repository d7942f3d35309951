// tagsmith/src/check/mifare.rs

//! Mifare Classic compatibility check.

use super::CompatibilityReport;
use crate::config::MIFARE_PROBE_BLOCK;
use crate::constants::{MIFARE_1K_BLOCK_COUNT, MIFARE_4K_BLOCK_COUNT};
use crate::protocol::Session;
use crate::protocol::mifare::{authenticate_sector, read_block_retrying, verify_block, write_block};
use crate::transport::traits::DetectedTag;
use crate::types::{MifareKey, TagFamily, Uid};
use log::{debug, info};

/// Probe whether `tag` can hold a Mifare Classic 1K figure.
pub fn check_mifare(tag: &dyn DetectedTag) -> CompatibilityReport {
    let Some(tech) = tag.mifare_classic() else {
        return CompatibilityReport::new("Unknown", None)
            .reject("wrong tag type", "tag does not support Mifare Classic")
            .finish();
    };
    let mifare_type = tech.mifare_type();
    let mut report = CompatibilityReport::new(
        format!("Mifare {}", mifare_type),
        Some(TagFamily::MifareClassic1K),
    );
    report.uid = Some(Uid::from_bytes(&tag.id()));
    if !mifare_type.is_classic_compatible() {
        report.recommend("Use a Mifare Classic 1K tag");
        return report
            .reject("wrong tag type", format!("Mifare {} does not speak Classic", mifare_type))
            .finish();
    }

    report.cell_count = tech.block_count();
    report.group_count = tech.sector_count();
    if report.cell_count != MIFARE_1K_BLOCK_COUNT {
        if report.cell_count == MIFARE_4K_BLOCK_COUNT {
            report.recommend("This is a 4K tag; figures need a Mifare Classic 1K tag");
        }
        let issue = format!(
            "tag has {} blocks, expected {}",
            report.cell_count, MIFARE_1K_BLOCK_COUNT
        );
        return report.reject("unsupported geometry", issue).finish();
    }

    let mut session = match Session::open(tech) {
        Ok(s) => s,
        Err(e) => return report.reject_error("connection failed", &e).finish(),
    };

    let dictionary: Vec<MifareKey> = MifareKey::defaults().collect();
    let key = match authenticate_sector(&mut session, 0, &dictionary) {
        Ok(Some(key)) => key,
        Ok(None) => {
            report.recommend("The tag uses keys outside the default dictionary");
            return report
                .reject("cannot authenticate", "sector 0 refused every default key")
                .finish();
        }
        Err(e) => return report.reject_error("cannot authenticate", &e).finish(),
    };
    report.authenticatable = true;

    let block0 = match read_block_retrying(&mut session, 0, &key) {
        Ok(b) => b,
        Err(e) => return report.reject_error("not readable", &e).finish(),
    };
    report.readable = true;

    // Write probe: flip every bit of a data block, check, put it back
    let original = match read_block_retrying(&mut session, MIFARE_PROBE_BLOCK, &key) {
        Ok(b) => b,
        Err(e) => return report.reject_error("not readable", &e).finish(),
    };
    let probe = original.inverted();
    if let Err(e) = write_block(&mut *session, MIFARE_PROBE_BLOCK, &probe) {
        return report.reject_error("not writable", &e).finish();
    }
    match verify_block(&mut *session, MIFARE_PROBE_BLOCK, &probe) {
        Ok(true) => {}
        Ok(false) => {
            report.recommend("Use a tag that is not write-protected");
            return report
                .reject(
                    "not writable: write-protected despite success response",
                    format!("block {} kept its old content", MIFARE_PROBE_BLOCK),
                )
                .finish();
        }
        Err(e) => return report.reject_error("not writable", &e).finish(),
    }
    report.writable = true;
    let restored = write_block(&mut *session, MIFARE_PROBE_BLOCK, &original)
        .and_then(|_| verify_block(&mut *session, MIFARE_PROBE_BLOCK, &original));
    if !matches!(restored, Ok(true)) {
        report.caution(
            "probe data could not be restored",
            format!("block {} may still hold inverted probe data", MIFARE_PROBE_BLOCK),
        );
    }

    match write_block(&mut *session, 0, &block0) {
        Ok(()) => report.uid_changeable = Some(true),
        Err(e) => {
            debug!("block 0 rewrite refused: {}", e);
            report.uid_changeable = Some(false);
            report.caution("UID cannot be changed", "block 0 is read-only");
            report.recommend("Use a UID-changeable (magic) tag to copy the original UID");
        }
    }

    info!("mifare check finished: {:?}", report.classification);
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Classification;
    use crate::transport::mock::{MockMifareTag, MockNtagTag, MockTag};
    use crate::types::MifareType;

    #[test]
    fn blank_1k_is_compatible() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        let report = check_mifare(&MockTag::mifare(mock.clone()));
        assert_eq!(report.classification, Classification::Compatible);
        assert_eq!(report.cell_count, 64);
        assert_eq!(report.group_count, 16);
        assert!(report.authenticatable && report.readable && report.writable);
        assert_eq!(report.uid_changeable, Some(true));
        assert!(!mock.is_open());
    }

    #[test]
    fn probe_leaves_data_untouched() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        let before = mock.blocks();
        check_mifare(&MockTag::mifare(mock.clone()));
        check_mifare(&MockTag::mifare(mock.clone()));
        assert_eq!(mock.blocks(), before);
    }

    #[test]
    fn locked_uid_is_a_warning() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        mock.lock_uid();
        let report = check_mifare(&MockTag::mifare(mock));
        assert!(report.is_warning());
        assert_eq!(report.uid_changeable, Some(false));
    }

    #[test]
    fn silent_protection_is_incompatible() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        mock.protect([1]);
        let report = check_mifare(&MockTag::mifare(mock));
        match report.classification {
            Classification::Incompatible { reason, .. } => {
                assert!(reason.contains("write-protected"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!report.writable);
    }

    #[test]
    fn unknown_keys_cannot_authenticate() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        mock.set_sector_key(0, [0x12; 6]);
        let report = check_mifare(&MockTag::mifare(mock));
        assert!(!report.authenticatable);
        assert!(!report.is_compatible());
    }

    #[test]
    fn four_k_gets_recommendation() {
        let report = check_mifare(&MockTag::mifare(MockMifareTag::blank_4k(&[1, 2, 3, 4])));
        assert!(!report.is_compatible());
        assert!(report.recommendations.iter().any(|r| r.contains("4K")));
    }

    #[test]
    fn pro_type_is_wrong_type() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        mock.set_type(MifareType::Pro);
        let report = check_mifare(&MockTag::mifare(mock));
        assert!(matches!(
            report.classification,
            Classification::Incompatible { ref reason, .. } if reason == "wrong tag type"
        ));
    }

    #[test]
    fn ntag_is_wrong_type() {
        let tag = MockTag::ntag(MockNtagTag::blank_215(&[4, 1, 2, 3, 4, 5, 6]));
        let report = check_mifare(&tag);
        assert!(report.family.is_none());
        assert!(!report.is_compatible());
    }

    #[test]
    fn dropped_auth_and_read_are_retried() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        mock.drop_connection_on_auth(0, 1);
        mock.drop_connection_on_read(1, 1);
        let report = check_mifare(&MockTag::mifare(mock.clone()));
        assert_eq!(report.classification, Classification::Compatible);
        assert_eq!(mock.connect_count(), 3);
        assert!(!mock.is_open());
    }

    #[test]
    fn repeated_drop_is_incompatible() {
        let mock = MockMifareTag::blank_1k(&[1, 2, 3, 4]);
        mock.drop_connection_on_read(0, 2);
        let report = check_mifare(&MockTag::mifare(mock));
        assert!(matches!(
            report.classification,
            Classification::Incompatible { ref reason, .. } if reason == "connection lost"
        ));
    }
}
