// tagsmith/src/writer/mifare.rs

//! Clone a catalog record onto a Mifare Classic 1K.

use super::{WriteOutcome, WriteStats};
use crate::catalog::MifareRecord;
use crate::constants::MIFARE_1K_BLOCK_COUNT;
use crate::error::{Error, ErrorKind, Failure};
use crate::protocol::Session;
use crate::protocol::mifare::{
    authenticate_sector, authenticate_with_keys, block_to_sector, is_sector_trailer, verify_block,
    write_block,
};
use crate::transport::traits::DetectedTag;
use crate::types::{BlockData, MifareKey};
use log::{debug, error, info, warn};
use std::collections::HashMap;

/// Keys to try for `sector`: the record's own trailer key, then the dictionary.
fn sector_keys(record: &MifareRecord, sector: u8) -> Vec<MifareKey> {
    let mut keys: Vec<MifareKey> = record.trailer_key(sector).into_iter().collect();
    for key in MifareKey::defaults() {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Content for `index`, or `None` when the block must be left alone.
fn planned_block(record: &MifareRecord, index: usize) -> Option<BlockData> {
    match record.block(index) {
        Some(b) => Some(b),
        None if index == 0 || is_sector_trailer(index) => {
            warn!("block {} in record is malformed, skipping", index);
            None
        }
        None => {
            warn!("block {} in record is malformed, writing zeros", index);
            Some(BlockData::ZERO)
        }
    }
}

/// Write all 64 blocks of `record` in ascending order, trailers included.
///
/// Block 0 and trailer failures are tolerated. Any other block that cannot
/// be written aborts the operation.
pub fn write_mifare(tag: &dyn DetectedTag, record: &MifareRecord) -> WriteOutcome {
    let Some(tech) = tag.mifare_classic() else {
        return Error::TagTypeMismatch("tag does not support Mifare Classic".into())
            .into_failure()
            .into();
    };
    let mifare_type = tech.mifare_type();
    if !mifare_type.is_classic_compatible() {
        return Error::TagTypeMismatch(format!("Mifare {} does not speak Classic", mifare_type))
            .into_failure()
            .into();
    }
    let mut session = match Session::open(tech) {
        Ok(s) => s,
        Err(e) => return e.into_failure().into(),
    };
    let block_count = session.block_count();
    if block_count != MIFARE_1K_BLOCK_COUNT {
        return Error::GeometryMismatch {
            expected: MIFARE_1K_BLOCK_COUNT,
            actual: block_count,
        }
        .into_failure()
        .into();
    }

    let mut auth: HashMap<u8, bool> = HashMap::new();
    let mut stats = WriteStats::default();
    for index in 0..MIFARE_1K_BLOCK_COUNT {
        let Some(data) = planned_block(record, index) else {
            continue;
        };
        let sector = block_to_sector(index);
        let keys = sector_keys(record, sector);
        if !auth.contains_key(&sector) {
            let ok = match authenticate_sector(&mut session, sector, &keys) {
                Ok(found) => found.is_some(),
                Err(e) => {
                    error!("connection lost authenticating sector {}: {}", sector, e);
                    return e.into_failure().into();
                }
            };
            if !ok {
                warn!("sector {} could not be authenticated, writing anyway", sector);
            }
            auth.insert(sector, ok);
        }

        stats.cells_attempted += 1;
        let result = session.with_reconnect(|tech, attempt| {
            if attempt > 0 {
                let ok = authenticate_with_keys(&mut *tech, sector, keys.iter().copied()).is_some();
                auth.insert(sector, ok);
            }
            write_block(&mut *tech, index, &data)?;
            match verify_block(&mut *tech, index, &data) {
                Err(e) if !e.is_connection_lost() => {
                    debug!("block {} read-back failed: {}", index, e);
                    Ok(false)
                }
                other => other,
            }
        });

        match result {
            Ok(verified) => {
                stats.cells_written += 1;
                if verified {
                    stats.cells_verified += 1;
                } else {
                    debug!("block {} written but did not verify", index);
                }
            }
            Err(e) if e.is_connection_lost() => {
                error!("connection lost at block {}: {}", index, e);
                return e.into_failure().into();
            }
            Err(e) if index == 0 => warn!("block 0 not written (UID locked?): {}", e),
            Err(e) if is_sector_trailer(index) => warn!("trailer {} not written: {}", index, e),
            Err(e) => {
                let kind = if auth.get(&sector).copied().unwrap_or(false) {
                    ErrorKind::WriteProtected
                } else {
                    ErrorKind::AuthenticationFailure
                };
                error!("block {} failed: {}", index, e);
                return Failure::new(kind, format!("Failed to write block {}: {}", index, e)).into();
            }
        }
    }
    drop(session);

    if stats.cells_written == 0 {
        return Failure::new(ErrorKind::WriteProtected, "No block could be written").into();
    }
    if stats.cells_verified < stats.cells_attempted / 2 {
        warn!(
            "only {} of {} blocks verified",
            stats.cells_verified, stats.cells_attempted
        );
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_mifare_record;
    use crate::transport::mock::{MockMifareTag, MockNtagTag, MockTag};

    fn blank() -> MockMifareTag {
        MockMifareTag::blank_1k(&[0x11, 0x22, 0x33, 0x44])
    }

    fn record() -> MifareRecord {
        sample_mifare_record("Spyro.nfc", "Skylanders")
    }

    #[test]
    fn default_keys_write_everything() {
        let mock = blank();
        let rec = record();
        let outcome = write_mifare(&MockTag::mifare(mock.clone()), &rec);
        let stats = *outcome.stats().unwrap();
        assert_eq!(stats.cells_attempted, 64);
        assert_eq!(stats.cells_written, 64);
        assert_eq!(stats.cells_verified, 64);
        assert_eq!(BlockData::from_bytes(mock.block(5)), rec.block(5).unwrap());
        assert_eq!(mock.write_log(), (0..64).collect::<Vec<_>>());
        assert!(!mock.is_open());
    }

    #[test]
    fn record_trailer_key_unlocks_sector() {
        let key = [0x4B, 0x0B, 0x20, 0x10, 0x7C, 0xCB];
        let mut rec = record();
        rec.blocks[11] = format!("4B0B20107CCB{}", &rec.blocks[11][12..]);
        let mock = blank();
        mock.set_sector_key(2, key);
        let outcome = write_mifare(&MockTag::mifare(mock.clone()), &rec);
        assert_eq!(outcome.stats().unwrap().cells_written, 64);
        assert_eq!(&mock.block(11)[..6], &key);
    }

    #[test]
    fn locked_uid_is_tolerated() {
        let mock = blank();
        mock.lock_uid();
        let stats = *write_mifare(&MockTag::mifare(mock.clone()), &record())
            .stats()
            .unwrap();
        assert_eq!(stats.cells_attempted, 64);
        assert_eq!(stats.cells_written, 63);
        assert_eq!(&mock.block(0)[..4], &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn rejected_trailer_is_skipped() {
        let mock = blank();
        mock.reject_writes([7]);
        let stats = *write_mifare(&MockTag::mifare(mock), &record()).stats().unwrap();
        assert_eq!(stats.cells_written, 63);
    }

    #[test]
    fn rejected_data_block_is_write_protected() {
        let mock = blank();
        mock.reject_writes([5]);
        let f = write_mifare(&MockTag::mifare(mock.clone()), &record())
            .failure()
            .cloned()
            .unwrap();
        assert_eq!(f.kind, ErrorKind::WriteProtected);
        assert!(f.message.contains("block 5"));
        assert!(!mock.write_log().contains(&6));
    }

    #[test]
    fn unauthenticated_sector_is_authentication_failure() {
        let mock = blank();
        mock.lock_sector(15);
        let f = write_mifare(&MockTag::mifare(mock), &record())
            .failure()
            .cloned()
            .unwrap();
        assert_eq!(f.kind, ErrorKind::AuthenticationFailure);
        assert!(f.message.contains("block 60"));
    }

    #[test]
    fn single_drop_is_retried() {
        let mock = blank();
        mock.drop_connection_on_write(9, 1);
        let stats = *write_mifare(&MockTag::mifare(mock.clone()), &record())
            .stats()
            .unwrap();
        assert_eq!(stats.cells_verified, 64);
        assert_eq!(mock.connect_count(), 2);
    }

    #[test]
    fn second_drop_aborts() {
        let mock = blank();
        mock.drop_connection_on_write(9, 2);
        let f = write_mifare(&MockTag::mifare(mock.clone()), &record())
            .failure()
            .cloned()
            .unwrap();
        assert_eq!(f.kind, ErrorKind::ConnectionLost);
        assert!(f.message.contains("keep the tag close"));
        assert!(!mock.is_open());
    }

    #[test]
    fn malformed_cells() {
        let mut rec = record();
        rec.blocks[5] = "not hex".into();
        rec.blocks[7] = "FFFF".into();
        let mock = blank();
        let stats = *write_mifare(&MockTag::mifare(mock.clone()), &rec).stats().unwrap();
        assert_eq!(stats.cells_attempted, 63);
        assert_eq!(mock.block(5), [0u8; 16]);
        assert!(!mock.write_log().contains(&7));
    }

    #[test]
    fn silent_protection_lowers_verified_count() {
        let mock = blank();
        mock.protect(1..40);
        let stats = *write_mifare(&MockTag::mifare(mock), &record()).stats().unwrap();
        assert_eq!(stats.cells_written, 64);
        // trailers still verify on their access bytes
        assert_eq!(stats.cells_verified, 35);
    }

    #[test]
    fn ntag_is_type_mismatch() {
        let tag = MockTag::ntag(MockNtagTag::blank_215(&[4, 1, 2, 3, 4, 5, 6]));
        let f = write_mifare(&tag, &record()).failure().cloned().unwrap();
        assert_eq!(f.kind, ErrorKind::TagTypeMismatch);
    }

    #[test]
    fn drop_during_sector_auth_is_retried() {
        let mock = blank();
        mock.drop_connection_on_auth(3, 1);
        let stats = *write_mifare(&MockTag::mifare(mock.clone()), &record())
            .stats()
            .unwrap();
        assert_eq!(stats.cells_verified, 64);
        assert_eq!(mock.connect_count(), 2);
    }

    #[test]
    fn mifare_pro_is_type_mismatch() {
        let mock = blank();
        mock.set_type(crate::MifareType::Pro);
        let f = write_mifare(&MockTag::mifare(mock.clone()), &record())
            .failure()
            .cloned()
            .unwrap();
        assert_eq!(f.kind, ErrorKind::TagTypeMismatch);
        assert_eq!(mock.connect_count(), 0);
    }
}
