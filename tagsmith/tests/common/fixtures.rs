// fixtures.rs: catalog documents and tags used across the integration tests

use std::path::PathBuf;
use tagsmith::catalog::{Catalog, TagRecord};
use tagsmith::transport::mock::{MockMifareTag, MockNtagTag};

/// Documents on disk, one of which (`broken/missing_uid.json`) is invalid.
pub const FIXTURE_FILES: usize = 5;

pub fn catalog_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog")
}

pub fn fixture_catalog() -> Catalog {
    Catalog::from_dir(catalog_dir())
}

pub fn record_named<'a>(catalog: &'a Catalog, name: &str) -> &'a TagRecord {
    catalog
        .load()
        .iter()
        .find(|r| r.display_name() == name)
        .unwrap_or_else(|| panic!("fixture '{}' missing", name))
}

pub fn blank_mifare() -> MockMifareTag {
    MockMifareTag::blank_1k(&[0xC0, 0xFF, 0xEE, 0x01])
}

pub fn blank_ntag() -> MockNtagTag {
    MockNtagTag::blank_215(&[0x04, 0xC0, 0xFF, 0xEE, 0x01, 0x02, 0x03])
}
