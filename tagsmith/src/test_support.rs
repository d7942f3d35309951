//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralise sample catalog records and the mock tags built
//! from them, so tests across the crate and the tests/ directory share one
//! deterministic data set.
#![allow(dead_code)]

use crate::catalog::{MifareMetadata, MifareRecord, NTagMetadata, NTagRecord};
use crate::constants::{
    MIFARE_1K_BLOCK_COUNT, MIFARE_BLOCK_SIZE, NTAG_CHARACTER_ID_PAGE, NTAG_GAME_ID_PAGE,
    NTAG_PAGE_SIZE, NTAG215_DEFAULT_CC, NTAG215_PAGE_COUNT,
};
use crate::protocol::mifare::is_sector_trailer;
use crate::transport::mock::{MockMifareTag, MockNtagTag};
use crate::utils::{bytes_from_hex, hex_from_bytes};

/// Trailer used by sample records: default Key A / Key B, transport access bits.
#[doc(hidden)]
pub const SAMPLE_TRAILER: &str = "FFFFFFFFFFFFFF078069FFFFFFFFFFFF";

fn seed(name: &str) -> usize {
    name.bytes()
        .fold(0x811C_9DC5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193)) as usize
}

/// Deterministic, never-zero filler byte.
fn filler(seed: usize, cell: usize, offset: usize) -> u8 {
    let mixed = seed.rotate_left((offset % 4 * 8) as u32) ^ (cell * 131 + offset * 29);
    (mixed % 255 + 1) as u8
}

/// A complete Mifare Classic 1K figure whose data depends on `filename`.
#[doc(hidden)]
pub fn sample_mifare_record(filename: &str, category: &str) -> MifareRecord {
    let s = seed(filename);
    let uid: Vec<u8> = (0..4).map(|j| filler(s, 0, j)).collect();
    let mut blocks = Vec::with_capacity(MIFARE_1K_BLOCK_COUNT);
    for i in 0..MIFARE_1K_BLOCK_COUNT {
        if i == 0 {
            let mut b0 = [0u8; MIFARE_BLOCK_SIZE];
            b0[..4].copy_from_slice(&uid);
            b0[4] = uid.iter().fold(0, |a, b| a ^ b);
            b0[5] = 0x08;
            b0[6] = 0x04;
            for (j, slot) in b0.iter_mut().enumerate().skip(7) {
                *slot = filler(s, 0, j);
            }
            blocks.push(hex_from_bytes(&b0));
        } else if is_sector_trailer(i) {
            blocks.push(SAMPLE_TRAILER.to_string());
        } else {
            let data: Vec<u8> = (0..MIFARE_BLOCK_SIZE).map(|j| filler(s, i, j)).collect();
            blocks.push(hex_from_bytes(&data));
        }
    }
    MifareRecord {
        uid: hex_from_bytes(&uid),
        atqa: Some("0004".into()),
        sak: Some("08".into()),
        mifare_type: Some("1K".into()),
        blocks,
        metadata: MifareMetadata {
            original_filename: filename.to_string(),
            original_path: format!("figures/{}", filename),
            category: Some(category.to_string()),
            subcategory: Some("Figures".into()),
            element: None,
            biography: None,
            abilities: Vec::new(),
            character_type: None,
        },
    }
}

/// A complete NTAG215 figure whose data depends on `character_name`.
#[doc(hidden)]
pub fn sample_ntag_record(character_name: &str, series: &str) -> NTagRecord {
    let s = seed(character_name);
    let mut uid = [0u8; 7];
    uid[0] = 0x04;
    for (j, slot) in uid.iter_mut().enumerate().skip(1) {
        *slot = filler(s, 0, j);
    }
    let mut pages = vec![[0u8; NTAG_PAGE_SIZE]; NTAG215_PAGE_COUNT];
    pages[0] = [uid[0], uid[1], uid[2], 0x88 ^ uid[0] ^ uid[1] ^ uid[2]];
    pages[1] = [uid[3], uid[4], uid[5], uid[6]];
    pages[2] = [uid[3] ^ uid[4] ^ uid[5] ^ uid[6], 0x48, 0x0F, 0xE0];
    pages[3] = NTAG215_DEFAULT_CC;
    for (i, page) in pages.iter_mut().enumerate().take(130).skip(4) {
        for (j, b) in page.iter_mut().enumerate() {
            *b = filler(s, i, j);
        }
    }
    pages[130] = [0x01, 0x00, 0x0F, 0xBD];
    pages[131] = [0x00, 0x00, 0x00, 0x04];
    pages[132] = [0x5F, 0x00, 0x00, 0x00];
    pages[133] = [0xFF; 4];
    pages[134] = [0x80, 0x80, 0x00, 0x00];

    let pages: Vec<String> = pages.iter().map(|p| hex_from_bytes(p)).collect();
    NTagRecord {
        uid: hex_from_bytes(&uid),
        metadata: NTagMetadata {
            original_filename: format!("{}.bin", character_name),
            original_path: format!("amiibo/{}/{}.bin", series, character_name),
            character_name: character_name.to_string(),
            game_series: Some(series.to_string()),
            character_id: Some(pages[NTAG_CHARACTER_ID_PAGE].clone()),
            game_id: Some(pages[NTAG_GAME_ID_PAGE].clone()),
            biography: None,
            release_date: None,
            amiibo_type: Some("Figure".into()),
        },
        pages,
    }
}

/// A mock card already holding `record`'s image, as if written earlier.
#[doc(hidden)]
pub fn mifare_tag_from_record(record: &MifareRecord) -> MockMifareTag {
    let blocks = (0..MIFARE_1K_BLOCK_COUNT)
        .map(|i| record.block(i).map(|b| *b.as_bytes()).unwrap_or([0u8; MIFARE_BLOCK_SIZE]))
        .collect();
    MockMifareTag::new(&bytes_from_hex(&record.uid), blocks)
}

/// NTAG counterpart of `mifare_tag_from_record`.
#[doc(hidden)]
pub fn ntag_tag_from_record(record: &NTagRecord) -> MockNtagTag {
    let pages = (0..NTAG215_PAGE_COUNT)
        .map(|i| record.page(i).map(|p| *p.as_bytes()).unwrap_or([0u8; NTAG_PAGE_SIZE]))
        .collect();
    MockNtagTag::new(pages)
}
