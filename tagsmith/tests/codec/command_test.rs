use tagsmith::PageData;
use tagsmith::constants::{DEFAULT_MIFARE_KEYS, MIFARE_DEFAULT_TRAILER};
use tagsmith::protocol::Command;
use tagsmith::protocol::mifare::{block_to_sector, is_sector_trailer, trailer_block};
use tagsmith::protocol::ntag::{is_ack, is_ntag215_signature};

#[test]
fn ntag_frames_are_bit_exact() {
    assert_eq!(Command::Read { page: 0x21 }.encode(), hex::decode("3021").unwrap());
    let write = Command::Write {
        page: 0x04,
        data: PageData::from_bytes([0x03, 0x00, 0xFE, 0x00]),
    };
    assert_eq!(write.encode(), hex::decode("A2040300FE00").unwrap());
    assert!(is_ack(&[0x0A]));
    assert!(!is_ack(&[0x00]));
    assert!(!is_ack(&[]));
}

#[test]
fn ntag215_signature() {
    assert!(is_ntag215_signature(&[0x44, 0x00], 0x00));
    assert!(!is_ntag215_signature(&[0x44, 0x00], 0x08));
}

#[test]
fn key_dictionary_order() {
    let keys: Vec<String> = DEFAULT_MIFARE_KEYS.iter().map(hex::encode_upper).collect();
    assert_eq!(
        keys,
        ["FFFFFFFFFFFF", "000000000000", "A0A1A2A3A4A5", "D3F7D3F7D3F7"]
    );
}

#[test]
fn erase_trailer_layout() {
    assert_eq!(
        hex::encode_upper(MIFARE_DEFAULT_TRAILER),
        "FFFFFFFFFFFF00000000FF0000000000"
    );
}

#[test]
fn every_fourth_block_is_a_trailer() {
    let trailers: Vec<usize> = (0..64).filter(|&i| is_sector_trailer(i)).collect();
    assert_eq!(trailers.len(), 16);
    for (sector, &t) in trailers.iter().enumerate() {
        assert_eq!(trailer_block(sector as u8), t);
        assert_eq!(block_to_sector(t) as usize, sector);
    }
}
