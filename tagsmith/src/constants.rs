// tagsmith/src/constants.rs
//! Fixed geometry, command opcodes and key tables for the two supported tag families

/// Mifare Classic 1K: 16 sectors of 4 blocks
pub const MIFARE_1K_BLOCK_COUNT: usize = 64;
/// Sectors on a 1K card
pub const MIFARE_1K_SECTOR_COUNT: usize = 16;
/// Blocks per sector; the last one is the trailer
pub const MIFARE_BLOCKS_PER_SECTOR: usize = 4;
/// Block count reported by a 4K card
pub const MIFARE_4K_BLOCK_COUNT: usize = 256;

/// Bytes per Mifare block
pub const MIFARE_BLOCK_SIZE: usize = 16;

/// Bytes per Mifare key (Key A / Key B)
pub const MIFARE_KEY_LEN: usize = 6;

/// Known-common Mifare keys, tried in this order
pub const DEFAULT_MIFARE_KEYS: [[u8; MIFARE_KEY_LEN]; 4] = [
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5],
    [0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7],
];

/// Sector trailer written on erase: Key A FF.., access bits 00000000, GPB FF, Key B 00..
/// (the documented pattern is 17 bytes; the last Key B byte does not fit a block)
pub const MIFARE_DEFAULT_TRAILER: [u8; MIFARE_BLOCK_SIZE] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // Key A
    0x00, 0x00, 0x00, 0x00, // access bits
    0xFF, // GPB
    0x00, 0x00, 0x00, 0x00, 0x00, // Key B
];

/// Trailer bytes that read back unmasked (access bits + GPB)
pub const MIFARE_TRAILER_ACCESS_RANGE: std::ops::Range<usize> = 6..10;

/// NTAG215: 135 pages of 4 bytes
pub const NTAG215_PAGE_COUNT: usize = 135;
/// Bytes per NTAG page
pub const NTAG_PAGE_SIZE: usize = 4;

/// NTAG215 identification signature
pub const NTAG215_ATQA: u16 = 0x0044;
/// SAK expected alongside `NTAG215_ATQA`
pub const NTAG215_SAK: u8 = 0x00;

/// NTAG raw commands and acknowledgement
pub const NTAG_CMD_READ: u8 = 0x30;
/// WRITE opcode; one page per frame
pub const NTAG_CMD_WRITE: u8 = 0xA2;
/// ACK answer to a write
pub const NTAG_ACK: u8 = 0x0A;

/// Pages 0-2 hold UID, BCC and static lock bytes
pub const NTAG_LAST_UID_PAGE: usize = 2;

/// Capability container page and its NTAG215 default
pub const NTAG_CC_PAGE: usize = 3;
/// Factory CC for an NTAG215
pub const NTAG215_DEFAULT_CC: [u8; NTAG_PAGE_SIZE] = [0xE1, 0x10, 0x3E, 0x00];

/// CC byte 2 value (data area size / 8) announcing NTAG215
pub const NTAG215_CC_SIZE_BYTE: u8 = 0x3E;

/// Pages 3-10 identify the figure; a corrupted copy is unrecognisable
pub const NTAG_LAST_IDENTITY_PAGE: usize = 10;

/// User memory bounds; pages 130-134 are dynamic lock, config and password
pub const NTAG_FIRST_USER_PAGE: usize = 4;
/// Last page of user memory
pub const NTAG_LAST_USER_PAGE: usize = 129;

/// Character / game identifier pages in Amiibo dumps
pub const NTAG_CHARACTER_ID_PAGE: usize = 21;
/// Game identifier page
pub const NTAG_GAME_ID_PAGE: usize = 22;

/// Pages 3..=20 carry figure-specific data compared during fuzzy identification
pub const NTAG_FUZZY_PAGES: std::ops::Range<usize> = 3..21;

/// Hex placeholders substituted for cells that could not be read
pub const MIFARE_PLACEHOLDER: &str = "00000000000000000000000000000000";
/// Unread NTAG page
pub const NTAG_PLACEHOLDER: &str = "00000000";
