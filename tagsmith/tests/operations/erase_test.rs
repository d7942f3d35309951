use crate::common::fixtures::{blank_mifare, blank_ntag, fixture_catalog, record_named};
use tagsmith::prelude::*;
use tagsmith::transport::mock::MockTag;

#[test]
fn erase_is_idempotent_on_both_families() {
    let catalog = fixture_catalog();
    let mario = record_named(&catalog, "Mario").clone();
    let spyro = record_named(&catalog, "Spyro").clone();
    let service = TagService::new(catalog);

    let ntag = MockTag::ntag(blank_ntag());
    assert!(service.write(&ntag, &mario).is_success());
    let first = service.erase(&ntag, TagFamily::Ntag215);
    let second = service.erase(&ntag, TagFamily::Ntag215);
    assert_eq!(first.stats().map(|s| s.cells_erased), Some(127));
    assert_eq!(first, second);

    let mifare = MockTag::mifare(blank_mifare());
    assert!(service.write(&mifare, &spyro).is_success());
    let first = service.erase(&mifare, TagFamily::MifareClassic1K);
    let second = service.erase(&mifare, TagFamily::MifareClassic1K);
    assert_eq!(first.stats().map(|s| (s.cells_erased, s.groups_reset)), Some((47, 16)));
    assert_eq!(first, second);
}

#[test]
fn erased_tag_can_be_rewritten() {
    let catalog = fixture_catalog();
    let link = record_named(&catalog, "Link").clone();
    let service = TagService::new(catalog);
    let tag = MockTag::ntag(blank_ntag());
    assert!(service.write(&tag, &link).is_success());
    assert!(service.erase(&tag, TagFamily::Ntag215).is_success());
    assert!(service.read(&tag, TagFamily::Ntag215).dump().unwrap().identified.is_none());
    assert!(service.write(&tag, &link).is_success());
    let read = service.read(&tag, TagFamily::Ntag215);
    assert_eq!(read.dump().unwrap().identified.as_ref().map(|r| r.display_name()), Some("Link"));
}
