use crate::common::fixtures::{blank_mifare, blank_ntag};
use tagsmith::prelude::*;
use tagsmith::transport::mock::MockTag;

#[test]
fn checking_twice_leaves_mifare_bit_identical() {
    let mock = blank_mifare();
    mock.lock_uid();
    let before = mock.blocks();
    let service = TagService::new(Vec::<TagRecord>::new());
    let tag = MockTag::mifare(mock.clone());
    let first = service.check(&tag, TagFamily::MifareClassic1K);
    let second = service.check(&tag, TagFamily::MifareClassic1K);
    assert_eq!(first, second);
    assert!(first.is_warning());
    assert_eq!(mock.blocks(), before);
}

#[test]
fn checking_twice_leaves_ntag_bit_identical() {
    let mock = blank_ntag();
    let before = mock.pages();
    let service = TagService::new(Vec::<TagRecord>::new());
    let tag = MockTag::ntag(mock.clone());
    for _ in 0..2 {
        let report = service.check(&tag, TagFamily::Ntag215);
        assert_eq!(report.classification, Classification::Compatible);
    }
    assert_eq!(mock.pages(), before);
}

#[test]
fn wrong_family_is_incompatible() {
    let service = TagService::new(Vec::<TagRecord>::new());
    let report = service.check(&MockTag::ntag(blank_ntag()), TagFamily::MifareClassic1K);
    match report.classification {
        Classification::Incompatible { reason, details } => {
            assert_eq!(reason, "wrong tag type");
            assert!(!details.is_empty());
        }
        other => panic!("unexpected {:?}", other),
    }
}
