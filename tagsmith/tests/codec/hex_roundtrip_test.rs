use proptest::prelude::*;
use tagsmith::utils::{bytes_from_hex, bytes_to_hex_spaced, hex_from_bytes, is_hex_cell, page_from_hex};

proptest! {
    #[test]
    fn hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let encoded = hex_from_bytes(&bytes);
        prop_assert_eq!(&encoded, &hex::encode_upper(&bytes));
        prop_assert_eq!(hex_from_bytes(&bytes_from_hex(&encoded)), encoded);
    }

    #[test]
    fn separators_are_ignored(bytes in proptest::collection::vec(any::<u8>(), 1..32)) {
        let spaced = bytes_to_hex_spaced(&bytes);
        prop_assert_eq!(bytes_from_hex(&spaced), bytes);
    }

    #[test]
    fn page_from_hex_never_panics(s in ".{0,24}") {
        let page = page_from_hex(&s);
        prop_assert_eq!(page.as_bytes().len(), 4);
    }

    #[test]
    fn lower_case_cells_decode_like_upper(bytes in proptest::array::uniform16(any::<u8>())) {
        let lower = hex::encode(bytes);
        prop_assert!(is_hex_cell(&lower, 16));
        prop_assert_eq!(bytes_from_hex(&lower), bytes.to_vec());
    }
}

#[test]
fn odd_length_is_empty() {
    common_init();
    assert!(bytes_from_hex("ABC").is_empty());
    assert!(bytes_from_hex("A B C").is_empty());
    assert_eq!(bytes_from_hex("0a:0B"), vec![0x0A, 0x0B]);
}

#[test]
fn short_and_long_pages_are_fixed_up() {
    assert_eq!(page_from_hex("E110").as_bytes(), &[0xE1, 0x10, 0x00, 0x00]);
    assert_eq!(page_from_hex("E1103E00FF").as_bytes(), &[0xE1, 0x10, 0x3E, 0x00]);
}

fn common_init() {
    crate::common::init_logging();
}
