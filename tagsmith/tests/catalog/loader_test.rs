use crate::common::fixtures::{FIXTURE_FILES, catalog_dir, fixture_catalog, record_named};
use crate::common::init_logging;
use tagsmith::catalog::loader::{load_dir, load_documents, parse_record};
use tagsmith::catalog::{Catalog, ReferenceCatalog};
use tagsmith::{ErrorKind, TagFamily};

#[test]
fn entry_without_uid_is_skipped() {
    init_logging();
    let records = load_dir(&catalog_dir());
    assert_eq!(records.len(), FIXTURE_FILES - 1);
    assert!(records.iter().all(|r| r.display_name() != "Toad"));
}

#[test]
fn loaded_records_have_family_geometry() {
    let catalog = fixture_catalog();
    for record in catalog.load() {
        let family = record.family();
        assert_eq!(record.cells().len(), family.cell_count());
        for cell in record.cells() {
            assert_eq!(cell.len(), family.cell_width() * 2);
            assert_eq!(cell, &cell.to_ascii_uppercase());
        }
    }
    assert_eq!(catalog.of_family(TagFamily::MifareClassic1K).count(), 2);
    assert_eq!(catalog.of_family(TagFamily::Ntag215).count(), 2);
}

#[test]
fn walk_is_recursive_and_sorted() {
    let names: Vec<String> = load_dir(&catalog_dir())
        .iter()
        .map(|r| r.display_name().to_string())
        .collect();
    // amiibo/mario.json < amiibo/zelda/link.json < skylanders/...
    assert_eq!(names, ["Mario", "Link", "Gill Grunt", "Spyro"]);
}

#[test]
fn lower_case_documents_are_normalised() {
    let catalog = fixture_catalog();
    let link = record_named(&catalog, "Link").as_ntag().unwrap();
    assert!(link.pages.iter().all(|p| p == &p.to_ascii_uppercase()));
    let id = link.metadata.character_id.as_deref().unwrap();
    assert!(id.eq_ignore_ascii_case(&link.pages[21]));
}

#[test]
fn missing_directory_is_empty() {
    let catalog = Catalog::from_dir(catalog_dir().join("does-not-exist"));
    assert!(catalog.is_empty());
    assert_eq!(catalog.records().len(), 0);
}

#[test]
fn in_memory_documents() {
    let good = std::fs::read_to_string(catalog_dir().join("amiibo/mario.json")).unwrap();
    let bad = std::fs::read_to_string(catalog_dir().join("broken/missing_uid.json")).unwrap();
    let records = load_documents([("mario", good.as_str()), ("toad", bad.as_str()), ("junk", "{")]);
    assert_eq!(records.len(), 1);

    let err = parse_record(r#"{"uid": "01020304", "sectors": []}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedReferenceData);
}

#[test]
fn short_block_array_is_rejected() -> anyhow::Result<()> {
    let text = std::fs::read_to_string(catalog_dir().join("skylanders/spyro.json"))?;
    let mut doc: serde_json::Value = serde_json::from_str(&text)?;
    doc["blocks"].as_array_mut().unwrap().pop();
    let err = parse_record(&doc.to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedReferenceData);
    Ok(())
}
