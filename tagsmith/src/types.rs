// tagsmith/src/types.rs

//! Strongly typed identifiers and fixed-size cell payloads.

use crate::Error;
use crate::constants::{
    MIFARE_1K_BLOCK_COUNT, MIFARE_BLOCK_SIZE, MIFARE_KEY_LEN, NTAG_PAGE_SIZE, NTAG215_PAGE_COUNT,
};
use derive_more::{Display, From};
use std::convert::TryFrom;

/// Tag family - one of the two fixed geometries this crate supports
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
    /// 1K Mifare Classic, 64 blocks of 16 bytes
    #[display(fmt = "Mifare Classic 1K")]
    MifareClassic1K,
    /// NTAG215, 135 pages of 4 bytes
    #[display(fmt = "NTAG215")]
    Ntag215,
}

impl TagFamily {
    /// Number of addressable cells (blocks or pages)
    pub const fn cell_count(self) -> usize {
        match self {
            Self::MifareClassic1K => MIFARE_1K_BLOCK_COUNT,
            Self::Ntag215 => NTAG215_PAGE_COUNT,
        }
    }

    /// Bytes per cell
    pub const fn cell_width(self) -> usize {
        match self {
            Self::MifareClassic1K => MIFARE_BLOCK_SIZE,
            Self::Ntag215 => NTAG_PAGE_SIZE,
        }
    }

    /// All-zero hex placeholder of the right width
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::MifareClassic1K => crate::constants::MIFARE_PLACEHOLDER,
            Self::Ntag215 => crate::constants::NTAG_PLACEHOLDER,
        }
    }
}

/// Chip type reported by the Mifare Classic technology
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum MifareType {
    /// Genuine Classic
    #[display(fmt = "Classic")]
    Classic,
    /// Mifare Plus
    #[display(fmt = "Plus")]
    Plus,
    /// Mifare Pro
    #[display(fmt = "Pro")]
    Pro,
    /// Platform could not tell
    #[default]
    #[display(fmt = "Unknown")]
    Unknown,
}

impl MifareType {
    /// Classic and Plus (in SL1) both speak the Classic command set
    pub fn is_classic_compatible(self) -> bool {
        matches!(self, Self::Classic | Self::Plus)
    }
}

/// Tag UID - variable length (4, 7 or 10 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, From)]
pub struct Uid(Vec<u8>);

impl Uid {
    /// Copy a UID from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Raw UID bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Uppercase hex without separators
    pub fn to_hex(&self) -> String {
        crate::utils::hex_from_bytes(&self.0)
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Mifare sector key (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From)]
pub struct MifareKey([u8; MIFARE_KEY_LEN]);

impl MifareKey {
    /// Wrap six raw key bytes
    pub const fn from_bytes(bytes: [u8; MIFARE_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; MIFARE_KEY_LEN] {
        &self.0
    }

    /// Key A as stored in bytes 0-5 of a sector trailer
    pub fn from_trailer(trailer: &BlockData) -> Self {
        let mut key = [0u8; MIFARE_KEY_LEN];
        key.copy_from_slice(&trailer.as_bytes()[..MIFARE_KEY_LEN]);
        Self(key)
    }

    /// All-zero key, which is never worth harvesting
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The static dictionary of known-common keys
    pub fn defaults() -> impl Iterator<Item = MifareKey> {
        crate::constants::DEFAULT_MIFARE_KEYS.into_iter().map(MifareKey)
    }

    /// Uppercase hex
    pub fn to_hex(&self) -> String {
        crate::utils::hex_from_bytes(&self.0)
    }
}

impl TryFrom<&[u8]> for MifareKey {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != MIFARE_KEY_LEN {
            return Err(Error::InvalidLength {
                expected: MIFARE_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; MIFARE_KEY_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// BlockData (16 bytes) - one Mifare block
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub struct BlockData([u8; MIFARE_BLOCK_SIZE]);

impl BlockData {
    /// All-zero block
    pub const ZERO: Self = Self([0u8; MIFARE_BLOCK_SIZE]);

    /// Wrap 16 raw bytes
    pub const fn from_bytes(bytes: [u8; MIFARE_BLOCK_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw block bytes
    pub fn as_bytes(&self) -> &[u8; MIFARE_BLOCK_SIZE] {
        &self.0
    }

    /// Uppercase hex
    pub fn to_hex(&self) -> String {
        crate::utils::hex_from_bytes(&self.0)
    }

    /// Every bit flipped; always differs from the original
    pub fn inverted(&self) -> Self {
        let mut out = self.0;
        out.iter_mut().for_each(|b| *b = !*b);
        Self(out)
    }

    /// Every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl TryFrom<&[u8]> for BlockData {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != MIFARE_BLOCK_SIZE {
            return Err(Error::InvalidLength {
                expected: MIFARE_BLOCK_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; MIFARE_BLOCK_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// PageData (4 bytes) - one NTAG page
#[derive(Debug, Clone, Copy, PartialEq, Eq, From)]
pub struct PageData([u8; NTAG_PAGE_SIZE]);

impl PageData {
    /// All-zero page
    pub const ZERO: Self = Self([0u8; NTAG_PAGE_SIZE]);

    /// Wrap 4 raw bytes
    pub const fn from_bytes(bytes: [u8; NTAG_PAGE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw page bytes
    pub fn as_bytes(&self) -> &[u8; NTAG_PAGE_SIZE] {
        &self.0
    }

    /// Uppercase hex
    pub fn to_hex(&self) -> String {
        crate::utils::hex_from_bytes(&self.0)
    }

    /// Every bit flipped
    pub fn inverted(&self) -> Self {
        let mut out = self.0;
        out.iter_mut().for_each(|b| *b = !*b);
        Self(out)
    }

    /// Every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl TryFrom<&[u8]> for PageData {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < NTAG_PAGE_SIZE {
            return Err(Error::InvalidLength {
                expected: NTAG_PAGE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; NTAG_PAGE_SIZE];
        arr.copy_from_slice(&bytes[..NTAG_PAGE_SIZE]);
        Ok(Self(arr))
    }
}

/// ATQA as the 16-bit little-endian value NFC-A stacks report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atqa(u16);

impl Atqa {
    /// Wrap the 16-bit value
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Platforms hand ATQA over as two bytes, low byte first
    pub fn from_le_slice(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [lo, hi, ..] => Some(Self(u16::from_le_bytes([*lo, *hi]))),
            _ => None,
        }
    }

    /// Little-endian 16-bit value
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_geometry() {
        assert_eq!(TagFamily::MifareClassic1K.cell_count(), 64);
        assert_eq!(TagFamily::MifareClassic1K.cell_width(), 16);
        assert_eq!(TagFamily::Ntag215.cell_count(), 135);
        assert_eq!(TagFamily::Ntag215.cell_width(), 4);
        assert_eq!(TagFamily::Ntag215.placeholder().len(), 8);
        assert_eq!(TagFamily::MifareClassic1K.placeholder().len(), 32);
    }

    #[test]
    fn family_display() {
        assert_eq!(TagFamily::Ntag215.to_string(), "NTAG215");
        assert_eq!(TagFamily::MifareClassic1K.to_string(), "Mifare Classic 1K");
    }

    #[test]
    fn key_dictionary_order() {
        let keys: Vec<_> = MifareKey::defaults().map(|k| k.to_hex()).collect();
        assert_eq!(
            keys,
            vec!["FFFFFFFFFFFF", "000000000000", "A0A1A2A3A4A5", "D3F7D3F7D3F7"]
        );
    }

    #[test]
    fn key_from_trailer_takes_first_six_bytes() {
        let mut raw = [0u8; 16];
        raw[..6].copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        raw[6] = 0xFF;
        let key = MifareKey::from_trailer(&BlockData::from_bytes(raw));
        assert_eq!(key.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert!(!key.is_zero());
    }

    #[test]
    fn block_try_from_err() {
        let b: [u8; 4] = [0, 1, 2, 3];
        assert!(BlockData::try_from(&b[..]).is_err());
    }

    #[test]
    fn page_try_from_takes_prefix_of_longer_read() {
        let resp: Vec<u8> = (0u8..16).collect();
        let page = PageData::try_from(&resp[..]).unwrap();
        assert_eq!(page.as_bytes(), &[0, 1, 2, 3]);
    }

    #[test]
    fn inverted_differs_everywhere() {
        let page = PageData::from_bytes([0x00, 0xFF, 0x0F, 0xA5]);
        assert_eq!(page.inverted().as_bytes(), &[0xFF, 0x00, 0xF0, 0x5A]);
        assert_eq!(page.inverted().inverted(), page);
    }

    #[test]
    fn atqa_is_little_endian() {
        assert_eq!(Atqa::from_le_slice(&[0x44, 0x00]).unwrap().as_u16(), 0x0044);
        assert!(Atqa::from_le_slice(&[0x44]).is_none());
    }

    #[test]
    fn uid_to_hex() {
        let uid = Uid::from_bytes(&[0x04, 0xde, 0xad, 0xbe, 0xef, 0x00, 0x11]);
        assert_eq!(uid.to_hex(), "04DEADBEEF0011");
        assert_eq!(uid.to_string(), "04DEADBEEF0011");
    }

    #[test]
    fn mifare_type_compat() {
        assert!(MifareType::Classic.is_classic_compatible());
        assert!(MifareType::Plus.is_classic_compatible());
        assert!(!MifareType::Pro.is_classic_compatible());
        assert!(!MifareType::Unknown.is_classic_compatible());
    }
}
