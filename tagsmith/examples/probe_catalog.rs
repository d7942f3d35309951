//! Load a catalog directory and run every operation against simulated tags.
//!
//! Usage:
//!   RUST_LOG=debug cargo run -p tagsmith --example probe_catalog -- [catalog-dir]

use std::path::PathBuf;
use tagsmith::prelude::*;
use tagsmith::transport::mock::{MockMifareTag, MockNtagTag, MockTag};

fn blank_for(family: TagFamily) -> MockTag {
    match family {
        TagFamily::MifareClassic1K => MockTag::mifare(MockMifareTag::blank_1k(&[0xDE, 0xAD, 0xBE, 0xEF])),
        TagFamily::Ntag215 => {
            MockTag::ntag(MockNtagTag::blank_215(&[0x04, 0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]))
        }
    }
}

fn main() {
    env_logger::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog"));
    let service = TagService::new(Catalog::from_dir(dir.clone()));

    println!("{} records in {}", service.catalog().len(), dir.display());
    for (series, records) in service.catalog().by_series() {
        let names: Vec<&str> = records.iter().map(|r| r.display_name()).collect();
        println!("  {}: {}", series, names.join(", "));
    }

    for record in service.catalog().load() {
        let family = record.family();
        let tag = blank_for(family);
        println!("\n== {} ({:?})", record.display_name(), family);

        let report = service.check(&tag, family);
        println!("check: {:?}", report.classification);

        match service.write(&tag, record) {
            WriteOutcome::Success(stats) => println!(
                "write: {} attempted, {} written, {} verified",
                stats.cells_attempted, stats.cells_written, stats.cells_verified
            ),
            WriteOutcome::Error(f) => println!("write failed: {}", f),
        }

        match service.read(&tag, family) {
            ReadOutcome::Success(dump) => println!(
                "read: uid {} identified as {}",
                dump.uid,
                dump.identified
                    .as_ref()
                    .map_or("<unknown>", |r| r.display_name())
            ),
            ReadOutcome::Error(f) => println!("read failed: {}", f),
        }

        match service.erase(&tag, family) {
            EraseOutcome::Success(stats) => println!("erase: {}", stats.message),
            EraseOutcome::Error(f) => println!("erase failed: {}", f),
        }
    }
}
