// tagsmith/src/protocol/mifare.rs

//! Mifare Classic block primitives and sector arithmetic.

use super::classify;
use super::session::Session;
use crate::constants::{MIFARE_BLOCKS_PER_SECTOR, MIFARE_TRAILER_ACCESS_RANGE};
use crate::transport::traits::MifareClassicTech;
use crate::types::{BlockData, MifareKey};
use crate::{Error, Result};
use log::debug;
use std::convert::TryFrom;

/// Sector owning `index` (1K layout)
pub fn block_to_sector(index: usize) -> u8 {
    (index / MIFARE_BLOCKS_PER_SECTOR) as u8
}

/// First block of `sector` (1K layout)
pub fn sector_first_block(sector: u8) -> usize {
    sector as usize * MIFARE_BLOCKS_PER_SECTOR
}

/// Last block of `sector`, holding Key A, access bits, GPB and Key B
pub fn trailer_block(sector: u8) -> usize {
    sector_first_block(sector) + MIFARE_BLOCKS_PER_SECTOR - 1
}

/// Whether `index` is the last block of its sector
pub fn is_sector_trailer(index: usize) -> bool {
    (index + 1) % MIFARE_BLOCKS_PER_SECTOR == 0
}

/// Try one Key A. Refusals and transport faults both come back as `false`.
pub fn authenticate<T: MifareClassicTech + ?Sized>(tech: &mut T, sector: u8, key: &MifareKey) -> bool {
    match tech.authenticate_sector_with_key_a(sector, key) {
        Ok(ok) => ok,
        Err(e) => {
            debug!("sector {} auth with {} raised: {}", sector, key.to_hex(), e);
            false
        }
    }
}

/// Try `keys` in order, returning the first one the sector accepts.
pub fn authenticate_with_keys<T, I>(tech: &mut T, sector: u8, keys: I) -> Option<MifareKey>
where
    T: MifareClassicTech + ?Sized,
    I: IntoIterator<Item = MifareKey>,
{
    keys.into_iter().find(|key| authenticate(tech, sector, key))
}

/// Try the static key dictionary.
pub fn authenticate_with_dictionary<T: MifareClassicTech + ?Sized>(
    tech: &mut T,
    sector: u8,
) -> Option<MifareKey> {
    authenticate_with_keys(tech, sector, MifareKey::defaults())
}

/// Find a key `sector` accepts on a live session.
///
/// A tag that drops out while keys are being tried gets one reconnect, and
/// the whole key list is tried again. `Ok(None)` means every key was refused
/// on a healthy link.
pub fn authenticate_sector<T: MifareClassicTech + ?Sized>(
    session: &mut Session<T>,
    sector: u8,
    keys: &[MifareKey],
) -> Result<Option<MifareKey>> {
    session.with_reconnect(|tech, _| {
        let found = authenticate_with_keys(&mut *tech, sector, keys.iter().copied());
        if found.is_none() && !tech.is_connected() {
            return Err(Error::ConnectionLost(format!(
                "lost during sector {} auth",
                sector
            )));
        }
        Ok(found)
    })
}

/// Read a block of a sector already opened with `key`, reconnecting once and
/// re-authenticating when the tag drops out.
pub fn read_block_retrying<T: MifareClassicTech + ?Sized>(
    session: &mut Session<T>,
    index: usize,
    key: &MifareKey,
) -> Result<BlockData> {
    let sector = block_to_sector(index);
    session.with_reconnect(|tech, attempt| {
        if attempt > 0 && !authenticate(&mut *tech, sector, key) {
            return Err(Error::AuthenticationFailure { sector });
        }
        read_block(&mut *tech, index)
    })
}

/// Read one block through the Classic technology
pub fn read_block<T: MifareClassicTech + ?Sized>(tech: &mut T, index: usize) -> Result<BlockData> {
    let raw = tech.read_block(index).map_err(classify)?;
    BlockData::try_from(&raw[..])
}

/// Write one block through the Classic technology
pub fn write_block<T: MifareClassicTech + ?Sized>(
    tech: &mut T,
    index: usize,
    data: &BlockData,
) -> Result<()> {
    tech.write_block(index, data.as_bytes()).map_err(classify)
}

/// Bytes of a block that can be compared after a write. Trailers read back
/// with Key A masked (and Key B often masked), so only access bits and GPB
/// are meaningful there.
pub fn comparable(index: usize, data: &BlockData) -> &[u8] {
    if is_sector_trailer(index) {
        &data.as_bytes()[MIFARE_TRAILER_ACCESS_RANGE]
    } else {
        &data.as_bytes()[..]
    }
}

/// Read `index` back and compare it with what was written.
pub fn verify_block<T: MifareClassicTech + ?Sized>(
    tech: &mut T,
    index: usize,
    expected: &BlockData,
) -> Result<bool> {
    let actual = read_block(tech, index)?;
    Ok(comparable(index, &actual) == comparable(index, expected))
}

/// Write, read back, and fail with `VerificationMismatch` on disagreement.
pub fn write_block_verified<T: MifareClassicTech + ?Sized>(
    tech: &mut T,
    index: usize,
    data: &BlockData,
) -> Result<()> {
    write_block(tech, index, data)?;
    let actual = read_block(tech, index)?;
    if comparable(index, &actual) == comparable(index, data) {
        Ok(())
    } else {
        Err(Error::VerificationMismatch {
            index,
            expected: data.to_hex(),
            actual: actual.to_hex(),
        })
    }
}
