use crate::common::fixtures::{blank_mifare, blank_ntag, fixture_catalog, record_named};
use crate::common::init_logging;
use tagsmith::prelude::*;
use tagsmith::transport::mock::MockTag;

fn blank_for(record: &TagRecord) -> MockTag {
    match record.family() {
        TagFamily::MifareClassic1K => MockTag::mifare(blank_mifare()),
        TagFamily::Ntag215 => MockTag::ntag(blank_ntag()),
    }
}

#[test]
fn every_fixture_is_identified_after_writing() {
    init_logging();
    let service = TagService::new(fixture_catalog());
    let records: Vec<TagRecord> = service.catalog().load().to_vec();
    for record in &records {
        let tag = blank_for(record);
        let written = service.write(&tag, record);
        assert!(written.is_success(), "{}: {:?}", record.display_name(), written);

        let read = service.read(&tag, record.family());
        let dump = read.dump().expect("read failed");
        assert!(dump.is_complete());
        let found = dump.identified.as_ref().map(|r| r.display_name());
        assert_eq!(found, Some(record.display_name()));
    }
}

#[test]
fn mifare_default_keys_scenario() {
    let catalog = fixture_catalog();
    let record = record_named(&catalog, "Gill Grunt").clone();
    let service = TagService::new(catalog);
    let mock = blank_mifare();
    let outcome = service.write(&MockTag::mifare(mock.clone()), &record);
    let stats = outcome.stats().expect("write failed");
    assert_eq!(stats.cells_attempted, 64);
    assert!(stats.cells_verified >= 60);
    assert!(!mock.is_open());
}

#[test]
fn spyro_trailer_key_is_carried_over() {
    let catalog = fixture_catalog();
    let record = record_named(&catalog, "Spyro").clone();
    let service = TagService::new(catalog);
    let mock = blank_mifare();
    let tag = MockTag::mifare(mock.clone());
    assert!(service.write(&tag, &record).is_success());
    // sector 0 now opens with A0A1A2A3A4A5, still in the dictionary
    assert_eq!(hex::encode_upper(&mock.block(3)[..6]), "A0A1A2A3A4A5");
    let dump = service.read(&tag, TagFamily::MifareClassic1K);
    assert_eq!(dump.dump().unwrap().sectors_authenticated, 16);
}

#[test]
fn unknown_figure_is_not_identified() {
    let service = TagService::new(fixture_catalog());
    let tag = MockTag::ntag(blank_ntag());
    let read = service.read(&tag, TagFamily::Ntag215);
    assert!(read.dump().unwrap().identified.is_none());
}
