// tagsmith/src/reader/identify.rs

//! Best-effort identification of a dumped tag against catalog records.

use crate::catalog::TagRecord;
use crate::config::MATCH_THRESHOLD;
use crate::constants::{
    MIFARE_1K_BLOCK_COUNT, MIFARE_TRAILER_ACCESS_RANGE, NTAG_CHARACTER_ID_PAGE, NTAG_FUZZY_PAGES,
    NTAG_GAME_ID_PAGE,
};
use crate::protocol::mifare::is_sector_trailer;
use crate::types::TagFamily;
use log::debug;
use std::ops::Range;

/// Scores records by the number of identical, non-blank cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(MATCH_THRESHOLD)
    }
}

impl FuzzyMatcher {
    /// Matcher requiring `threshold` (0.0 to 1.0) of compared cells to agree
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Fraction of compared cells that must agree
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Cells that carry figure data; the UID cell is never compared.
    pub fn compared_range(family: TagFamily) -> Range<usize> {
        match family {
            TagFamily::MifareClassic1K => 1..MIFARE_1K_BLOCK_COUNT,
            TagFamily::Ntag215 => NTAG_FUZZY_PAGES,
        }
    }

    /// Whether one tag cell agrees with the record's. Mifare trailers read
    /// back with keys masked, so only access bits and GPB are compared.
    fn cells_agree(family: TagFamily, index: usize, ours: &str, theirs: &str) -> bool {
        if family == TagFamily::MifareClassic1K && is_sector_trailer(index) {
            let hex = MIFARE_TRAILER_ACCESS_RANGE.start * 2..MIFARE_TRAILER_ACCESS_RANGE.end * 2;
            return match (ours.get(hex.clone()), theirs.get(hex)) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => false,
            };
        }
        ours.eq_ignore_ascii_case(theirs)
    }

    /// Number of compared cells where tag and record agree, ignoring blanks.
    pub fn score(&self, family: TagFamily, cells: &[String], record: &TagRecord) -> usize {
        let placeholder = family.placeholder();
        let theirs = record.cells();
        Self::compared_range(family)
            .filter(|&i| match (cells.get(i), theirs.get(i)) {
                (Some(ours), Some(theirs)) => {
                    ours != placeholder && Self::cells_agree(family, i, ours, theirs)
                }
                _ => false,
            })
            .count()
    }

    fn required(&self, family: TagFamily) -> f64 {
        Self::compared_range(family).len() as f64 * self.threshold
    }

    /// Highest-scoring record above the threshold. Ties keep the earlier record.
    pub fn best_match<'a, I>(&self, family: TagFamily, cells: &[String], candidates: I) -> Option<&'a TagRecord>
    where
        I: IntoIterator<Item = &'a TagRecord>,
    {
        let required = self.required(family);
        let mut best: Option<(&'a TagRecord, usize)> = None;
        for record in candidates {
            if record.family() != family || record.cells().len() != family.cell_count() {
                continue;
            }
            let score = self.score(family, cells, record);
            let best_score = best.map_or(0, |(_, s)| s);
            if score as f64 >= required && score > best_score {
                debug!(
                    "candidate '{}' matches {} cells",
                    record.display_name(),
                    score
                );
                best = Some((record, score));
            }
        }
        best.map(|(r, _)| r)
    }
}

/// Character/game id lookup for Amiibo-style NTAG215 dumps.
///
/// Pages 21 and 22 hold the character and game identifiers. A record matches
/// on character id when either side lacks a game id, and on both otherwise.
pub fn match_ntag_ids<'a, I>(cells: &[String], candidates: I) -> Option<&'a TagRecord>
where
    I: IntoIterator<Item = &'a TagRecord>,
{
    let character_id = cells.get(NTAG_CHARACTER_ID_PAGE)?;
    if character_id == TagFamily::Ntag215.placeholder() {
        return None;
    }
    let game_id = cells
        .get(NTAG_GAME_ID_PAGE)
        .filter(|g| *g != TagFamily::Ntag215.placeholder());

    candidates.into_iter().find(|record| {
        let Some(ntag) = record.as_ntag() else {
            return false;
        };
        let meta = &ntag.metadata;
        let char_hit = meta
            .character_id
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(character_id));
        if !char_hit {
            return false;
        }
        match (game_id, meta.game_id.as_deref()) {
            (Some(ours), Some(theirs)) => ours.eq_ignore_ascii_case(theirs),
            _ => true,
        }
    })
}
