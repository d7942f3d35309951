// tagsmith/src/reader/mifare.rs

//! Mifare Classic dump with key harvesting from sector trailers.

use super::{ReadOutcome, TagDump, identify};
use crate::catalog::ReferenceCatalog;
use crate::constants::{MIFARE_1K_BLOCK_COUNT, MIFARE_1K_SECTOR_COUNT};
use crate::error::{Error, Failure};
use crate::protocol::Session;
use crate::protocol::mifare::{
    authenticate_sector, read_block_retrying, sector_first_block, trailer_block,
};
use crate::transport::traits::{DetectedTag, MifareClassicTech};
use crate::types::{MifareKey, TagFamily, Uid};
use crate::Result;
use log::{debug, info, warn};

/// Read one authenticated sector into `cells`, collecting Key A from the
/// trailer when the tag returns it unmasked.
fn read_sector(
    session: &mut Session<dyn MifareClassicTech>,
    sector: u8,
    key: &MifareKey,
    cells: &mut [String],
    recovered: &mut Vec<MifareKey>,
) -> Result<usize> {
    let mut read = 0;
    let trailer = trailer_block(sector);
    for index in sector_first_block(sector)..=trailer {
        match read_block_retrying(session, index, key) {
            Ok(block) => {
                cells[index] = block.to_hex();
                read += 1;
                if index == trailer {
                    let key = MifareKey::from_trailer(&block);
                    if !key.is_zero() && !recovered.contains(&key) {
                        debug!("recovered key {} from sector {}", key.to_hex(), sector);
                        recovered.push(key);
                    }
                }
            }
            Err(e) if e.is_connection_lost() => return Err(e),
            Err(e) => debug!("block {} unreadable: {}", index, e),
        }
    }
    Ok(read)
}

fn dump_blocks(session: &mut Session<dyn MifareClassicTech>) -> Result<(Vec<String>, usize, usize)> {
    let placeholder = TagFamily::MifareClassic1K.placeholder();
    let mut cells = vec![placeholder.to_string(); MIFARE_1K_BLOCK_COUNT];
    let dictionary: Vec<MifareKey> = MifareKey::defaults().collect();
    let mut recovered: Vec<MifareKey> = Vec::new();
    let mut authenticated = [false; MIFARE_1K_SECTOR_COUNT];
    let mut cells_read = 0;

    for sector in 0..MIFARE_1K_SECTOR_COUNT as u8 {
        if let Some(key) = authenticate_sector(session, sector, &dictionary)? {
            authenticated[sector as usize] = true;
            cells_read += read_sector(session, sector, &key, &mut cells, &mut recovered)?;
        }
    }

    // Second pass: sectors the dictionary missed, with keys found on the tag
    for sector in 0..MIFARE_1K_SECTOR_COUNT as u8 {
        if authenticated[sector as usize] || recovered.is_empty() {
            continue;
        }
        let keys = recovered.clone();
        match authenticate_sector(session, sector, &keys)? {
            Some(key) => {
                authenticated[sector as usize] = true;
                cells_read += read_sector(session, sector, &key, &mut cells, &mut recovered)?;
            }
            None => warn!("sector {} could not be authenticated", sector),
        }
    }

    let sectors = authenticated.iter().filter(|a| **a).count();
    Ok((cells, cells_read, sectors))
}

/// Dump a Mifare Classic 1K tag and try to identify it.
pub fn read_mifare<C>(tag: &dyn DetectedTag, catalog: &C) -> ReadOutcome
where
    C: ReferenceCatalog + ?Sized,
{
    let Some(tech) = tag.mifare_classic() else {
        return ReadOutcome::Error(
            Error::TagTypeMismatch("tag does not support Mifare Classic".into()).into_failure(),
        );
    };
    let mifare_type = tech.mifare_type();
    if !mifare_type.is_classic_compatible() {
        return ReadOutcome::Error(
            Error::TagTypeMismatch(format!("Mifare {} does not speak Classic", mifare_type))
                .into_failure(),
        );
    }
    let mut session = match Session::open(tech) {
        Ok(s) => s,
        Err(e) => return ReadOutcome::Error(e.into_failure()),
    };
    let block_count = session.block_count();
    if block_count != MIFARE_1K_BLOCK_COUNT {
        return ReadOutcome::Error(
            Error::GeometryMismatch {
                expected: MIFARE_1K_BLOCK_COUNT,
                actual: block_count,
            }
            .into_failure(),
        );
    }

    let (cells, cells_read, sectors) = match dump_blocks(&mut session) {
        Ok(v) => v,
        Err(e) => return ReadOutcome::Error(e.into_failure()),
    };
    drop(session);

    if sectors == 0 {
        return ReadOutcome::Error(Failure::new(
            crate::ErrorKind::AuthenticationFailure,
            "Could not authenticate any sector with the known keys",
        ));
    }
    info!(
        "read {} of {} blocks ({} sectors authenticated)",
        cells_read, MIFARE_1K_BLOCK_COUNT, sectors
    );

    let uid = Uid::from_bytes(&tag.id());
    let identified = identify(catalog, TagFamily::MifareClassic1K, &uid, &cells);
    ReadOutcome::Success(TagDump {
        family: TagFamily::MifareClassic1K,
        uid,
        cells,
        identified,
        cells_read,
        sectors_authenticated: sectors,
    })
}
