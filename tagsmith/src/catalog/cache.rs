// tagsmith/src/catalog/cache.rs

//! Process-wide catalog cache keyed by asset directory.

use super::ReferenceCatalog;
use super::loader;
use super::record::TagRecord;
use crate::types::TagFamily;
use log::{debug, info};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug)]
enum Source {
    Dir(PathBuf),
    Documents(Vec<(String, String)>),
    Preloaded,
}

/// Load-once reference catalog.
///
/// The source is read on first access; later calls see the cached list,
/// including an empty one when the source held nothing usable.
#[derive(Debug)]
pub struct Catalog {
    source: Source,
    records: OnceLock<Vec<TagRecord>>,
}

impl Catalog {
    /// Catalog backed by a directory tree of JSON documents
    pub fn from_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Dir(path.into()),
            records: OnceLock::new(),
        }
    }

    /// Catalog backed by `(name, json)` pairs
    pub fn from_documents(documents: Vec<(String, String)>) -> Self {
        Self {
            source: Source::Documents(documents),
            records: OnceLock::new(),
        }
    }

    /// Catalog over records that are already parsed
    pub fn from_records(records: Vec<TagRecord>) -> Self {
        Self {
            source: Source::Preloaded,
            records: OnceLock::from(records),
        }
    }

    /// All records, loading them on first use.
    pub fn load(&self) -> &[TagRecord] {
        self.records.get_or_init(|| {
            let records = match &self.source {
                Source::Dir(path) => loader::load_dir(path),
                Source::Documents(docs) => {
                    loader::load_documents(docs.iter().map(|(n, j)| (n.as_str(), j.as_str())))
                }
                Source::Preloaded => Vec::new(),
            };
            info!("catalog loaded {} records", records.len());
            records
        })
    }

    /// Number of loaded records
    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// True when nothing loaded or every dump was rejected
    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    /// Records of one family, in load order
    pub fn of_family(&self, family: TagFamily) -> impl Iterator<Item = &TagRecord> {
        self.load().iter().filter(move |r| r.family() == family)
    }

    /// Records grouped by game series, series names sorted.
    pub fn by_series(&self) -> BTreeMap<&str, Vec<&TagRecord>> {
        let mut groups: BTreeMap<&str, Vec<&TagRecord>> = BTreeMap::new();
        for r in self.load() {
            groups.entry(r.game_series()).or_default().push(r);
        }
        groups
    }

    /// Number of distinct game series
    pub fn series_count(&self) -> usize {
        self.by_series().len()
    }

    /// Ranked search over display name, series and character name.
    ///
    /// Exact hits come first, then word-prefix hits, then substring hits;
    /// each record appears once (first UID wins). A blank query returns
    /// every record.
    pub fn search(&self, query: &str) -> Vec<&TagRecord> {
        let all = self.load();
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return all.iter().collect();
        }

        let mut ranks: [Vec<&TagRecord>; 3] = Default::default();
        for r in all {
            let fields: Vec<String> = [Some(r.display_name()), Some(r.game_series()), r.secondary_name()]
                .into_iter()
                .flatten()
                .map(str::to_lowercase)
                .collect();
            let rank = if fields.iter().any(|f| *f == q) {
                Some(0)
            } else if fields
                .iter()
                .any(|f| f.starts_with(&q) || f.split(' ').any(|w| w.starts_with(&q)))
            {
                Some(1)
            } else if fields.iter().any(|f| f.contains(&q)) {
                Some(2)
            } else {
                None
            };
            if let Some(rank) = rank {
                ranks[rank].push(r);
            }
        }

        let mut seen = HashSet::new();
        let results: Vec<&TagRecord> = ranks
            .into_iter()
            .flatten()
            .filter(|r| seen.insert(r.uid().to_ascii_uppercase()))
            .collect();
        debug!("search '{}' returned {} results", query, results.len());
        results
    }
}

impl ReferenceCatalog for Catalog {
    fn records(&self) -> &[TagRecord] {
        self.load()
    }
}
