// tagsmith/src/transport/traits.rs

//! Technology traits a platform NFC binding implements.

use crate::Result;
use crate::types::{MifareKey, MifareType};

/// Connection lifecycle shared by every tag technology.
///
/// Platform NFC stacks hand out one technology object per detected tag; only
/// one of them may be connected at a time.
pub trait TagConnection {
    /// Open the radio connection to the tag
    fn connect(&mut self) -> Result<()>;

    /// Close the connection. Closing an already closed handle is not an error.
    fn close(&mut self) -> Result<()>;

    /// Whether the platform still considers the tag in range and connected
    fn is_connected(&self) -> bool;
}

/// Block-addressed Mifare Classic technology.
pub trait MifareClassicTech: TagConnection {
    /// Chip type as reported by the platform
    fn mifare_type(&self) -> MifareType;

    /// Total number of 16-byte blocks (64 for 1K, 256 for 4K)
    fn block_count(&self) -> usize;

    /// Total number of sectors
    fn sector_count(&self) -> usize;

    /// Authenticate `sector` with Key A. `Ok(false)` means the key was refused.
    fn authenticate_sector_with_key_a(&mut self, sector: u8, key: &MifareKey) -> Result<bool>;

    /// Read one block; the sector must be authenticated first
    fn read_block(&mut self, index: usize) -> Result<Vec<u8>>;

    /// Write one block; the sector must be authenticated first
    fn write_block(&mut self, index: usize, data: &[u8; 16]) -> Result<()>;
}

/// ISO 14443-3A technology with raw frame exchange, used for NTAG pages.
pub trait NfcATech: TagConnection {
    /// ATQA bytes as received, low byte first
    fn atqa(&self) -> Vec<u8>;

    /// SAK byte from anticollision
    fn sak(&self) -> u8;

    /// Send a raw command frame and return the tag's answer
    fn transceive(&mut self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Opaque handle for a tag the platform discovered in the field.
///
/// Each accessor returns a fresh technology object or `None` when the tag
/// does not support that technology.
pub trait DetectedTag {
    /// Anti-collision UID
    fn id(&self) -> Vec<u8>;

    /// Names of the technologies the platform negotiated
    fn tech_list(&self) -> Vec<String>;

    /// Mifare Classic technology, when negotiated
    fn mifare_classic(&self) -> Option<Box<dyn MifareClassicTech>>;

    /// NfcA technology, when negotiated
    fn nfc_a(&self) -> Option<Box<dyn NfcATech>>;
}
