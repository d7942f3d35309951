// tagsmith/src/catalog/loader.rs

//! Parsers for the bundled reference JSON dumps.

use super::record::{MifareRecord, NTagRecord, TagRecord};
use crate::{Error, Result};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Decide the family from the cell array present and deserialize.
pub fn parse_value(value: Value) -> Result<TagRecord> {
    let mut record = if value.get("blocks").is_some() {
        TagRecord::Mifare(serde_json::from_value::<MifareRecord>(value)?)
    } else if value.get("pages").is_some() {
        TagRecord::NTag(serde_json::from_value::<NTagRecord>(value)?)
    } else {
        return Err(Error::MalformedReferenceData(
            "document has neither 'blocks' nor 'pages'".into(),
        ));
    };
    record.normalise();
    record.validate()?;
    Ok(record)
}

/// Parse and validate one catalog document.
pub fn parse_record(json: &str) -> Result<TagRecord> {
    let value: Value = serde_json::from_str(json)?;
    parse_value(value)
}

/// Parse named in-memory documents, dropping the malformed ones.
pub fn load_documents<'a, I>(documents: I) -> Vec<TagRecord>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    documents
        .into_iter()
        .filter_map(|(name, json)| match parse_record(json) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("skipping catalog entry {}: {}", name, e);
                None
            }
        })
        .collect()
}

/// Recursively load every `*.json` document under `root`, in file-name order.
pub fn load_dir(root: &Path) -> Vec<TagRecord> {
    if !root.is_dir() {
        warn!("catalog directory {} does not exist", root.display());
        return Vec::new();
    }
    let mut records = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !path.is_file() || !is_json {
            continue;
        }
        match fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|s| parse_record(&s))
        {
            Ok(r) => {
                debug!("loaded {} ({})", r.display_name(), path.display());
                records.push(r);
            }
            Err(e) => warn!("skipping catalog file {}: {}", path.display(), e),
        }
    }
    records
}
