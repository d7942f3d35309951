// tagsmith/src/eraser/mifare.rs

//! Blank a Mifare Classic 1K back to transport defaults.

use super::{EraseOutcome, Tally};
use crate::constants::{MIFARE_1K_BLOCK_COUNT, MIFARE_1K_SECTOR_COUNT, MIFARE_DEFAULT_TRAILER};
use crate::error::Error;
use crate::protocol::Session;
use crate::protocol::mifare::{
    authenticate, authenticate_sector, is_sector_trailer, read_block_retrying, sector_first_block,
    trailer_block, verify_block, write_block,
};
use crate::transport::traits::{DetectedTag, MifareClassicTech};
use crate::types::{BlockData, MifareKey};
use crate::Result;
use log::{debug, info, warn};

/// Remember Key A of an authenticated sector if the tag shows it.
fn harvest_key(
    session: &mut Session<dyn MifareClassicTech>,
    sector: u8,
    key: &MifareKey,
    recovered: &mut Vec<MifareKey>,
) -> Result<()> {
    match read_block_retrying(session, trailer_block(sector), key) {
        Ok(trailer) => {
            let found = MifareKey::from_trailer(&trailer);
            if !found.is_zero() && !recovered.contains(&found) {
                debug!("recovered key {} from sector {}", found.to_hex(), sector);
                recovered.push(found);
            }
            Ok(())
        }
        Err(e) if e.is_connection_lost() => Err(e),
        Err(e) => {
            debug!("sector {} trailer unreadable: {}", sector, e);
            Ok(())
        }
    }
}

/// Zero the data blocks of an authenticated sector and reset its trailer.
/// Only connection loss is returned; other failures are logged.
fn erase_sector(
    session: &mut Session<dyn MifareClassicTech>,
    sector: u8,
    key: MifareKey,
    tally: &mut Tally,
) -> Result<()> {
    for index in sector_first_block(sector)..=trailer_block(sector) {
        if index == 0 {
            continue;
        }
        let trailer = is_sector_trailer(index);
        let target = if trailer {
            BlockData::from_bytes(MIFARE_DEFAULT_TRAILER)
        } else {
            BlockData::ZERO
        };
        let result = session.with_reconnect(|tech, attempt| {
            if attempt > 0 && !authenticate(&mut *tech, sector, &key) {
                return Err(Error::AuthenticationFailure { sector });
            }
            write_block(&mut *tech, index, &target)?;
            match verify_block(&mut *tech, index, &target) {
                Err(e) if !e.is_connection_lost() => {
                    debug!("block {} read-back failed: {}", index, e);
                    Ok(false)
                }
                other => other,
            }
        });
        match result {
            Ok(verified) => {
                tally.acknowledged += 1;
                match (verified, trailer) {
                    (true, true) => tally.reset += 1,
                    (true, false) => tally.verified += 1,
                    (false, _) => debug!("block {} did not verify after erase", index),
                }
            }
            Err(e) if e.is_connection_lost() => return Err(e),
            Err(e) => warn!("block {} not erased: {}", index, e),
        }
    }
    Ok(())
}

/// Dictionary pass with key harvesting, then a pass over the sectors the
/// dictionary missed using every key recovered from the tag.
fn erase_all(session: &mut Session<dyn MifareClassicTech>, tally: &mut Tally) -> Result<()> {
    let dictionary: Vec<MifareKey> = MifareKey::defaults().collect();
    let mut recovered: Vec<MifareKey> = Vec::new();
    let mut pending: Vec<u8> = Vec::new();
    for sector in 0..MIFARE_1K_SECTOR_COUNT as u8 {
        let Some(key) = authenticate_sector(session, sector, &dictionary)? else {
            pending.push(sector);
            continue;
        };
        // before the trailer is overwritten
        harvest_key(session, sector, &key, &mut recovered)?;
        erase_sector(session, sector, key, tally)?;
    }

    for sector in pending {
        match authenticate_sector(session, sector, &recovered)? {
            Some(key) => erase_sector(session, sector, key, tally)?,
            None => warn!("sector {} skipped: no working key", sector),
        }
    }
    Ok(())
}

/// Zero every data block except block 0 and reset every sector trailer.
pub fn erase_mifare(tag: &dyn DetectedTag) -> EraseOutcome {
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

    let mut tally = Tally::default();
    if let Err(e) = erase_all(&mut session, &mut tally) {
        return e.into_failure().into();
    }
    drop(session);

    info!(
        "erase finished: {} blocks verified, {} trailers reset",
        tally.verified, tally.reset
    );
    tally.finish("blocks")
}
