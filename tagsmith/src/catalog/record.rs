// tagsmith/src/catalog/record.rs

//! Reference records: the exact on-tag image of one figure plus its metadata.

use crate::constants::{MIFARE_KEY_LEN, NTAG_CHARACTER_ID_PAGE, NTAG_GAME_ID_PAGE};
use crate::protocol::mifare::trailer_block;
use crate::reader::TagDump;
use crate::types::{BlockData, MifareKey, PageData, TagFamily};
use crate::utils::{bytes_from_hex, is_hex_cell, page_from_hex};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::TryFrom;

const UNKNOWN_SERIES: &str = "Unknown";

/// Optional catalog strings treat `""` the same as absent.
fn empty_as_none<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    let v: Option<String> = Option::deserialize(d)?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

/// Descriptive fields of a Mifare catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MifareMetadata {
    /// Dump file name, `.nfc` included
    pub original_filename: String,
    /// Path of the dump relative to the asset root
    pub original_path: String,
    /// Game series
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Character or variant name
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Element or class
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Free-form description
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    /// Listed abilities, possibly empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
    /// Figure kind
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub character_type: Option<String>,
}

impl MifareMetadata {
    /// File name without `.nfc`
    pub fn display_name(&self) -> &str {
        self.original_filename
            .strip_suffix(".nfc")
            .unwrap_or(&self.original_filename)
    }

    /// Category, or "Unknown"
    pub fn game_series(&self) -> &str {
        self.category.as_deref().unwrap_or(UNKNOWN_SERIES)
    }
}

/// A Mifare Classic 1K figure image (64 blocks of 32 hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MifareRecord {
    /// Uppercase hex UID
    pub uid: String,
    /// ATQA as recorded, hex
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub atqa: Option<String>,
    /// SAK as recorded, hex
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub sak: Option<String>,
    /// Chip type as recorded
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub mifare_type: Option<String>,
    /// 64 blocks of 32 hex digits
    pub blocks: Vec<String>,
    /// Descriptive fields
    pub metadata: MifareMetadata,
}

impl MifareRecord {
    /// Decoded block, or `None` when the stored hex is not exactly 16 bytes.
    pub fn block(&self, index: usize) -> Option<BlockData> {
        let hex = self.blocks.get(index)?;
        BlockData::try_from(&bytes_from_hex(hex)[..]).ok()
    }

    /// Key A recorded in the trailer of `sector`, if present and well formed.
    pub fn trailer_key(&self, sector: u8) -> Option<MifareKey> {
        let hex = self.blocks.get(trailer_block(sector))?;
        let bytes = bytes_from_hex(hex);
        if bytes.len() < MIFARE_KEY_LEN {
            return None;
        }
        MifareKey::try_from(&bytes[..MIFARE_KEY_LEN]).ok()
    }

    /// Build a catalog entry from a tag dump.
    pub fn from_dump(dump: &TagDump, original_filename: &str) -> Result<Self> {
        if dump.family != TagFamily::MifareClassic1K {
            return Err(Error::TagTypeMismatch(format!(
                "cannot export a {} dump as a Mifare record",
                dump.family
            )));
        }
        Ok(Self {
            uid: dump.uid.to_hex(),
            atqa: None,
            sak: None,
            mifare_type: Some("1K".into()),
            blocks: dump.cells.clone(),
            metadata: MifareMetadata {
                original_filename: original_filename.to_string(),
                original_path: original_filename.to_string(),
                category: None,
                subcategory: None,
                element: None,
                biography: None,
                abilities: Vec::new(),
                character_type: None,
            },
        })
    }
}

/// Descriptive fields of an NTAG catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NTagMetadata {
    /// Dump file name, `.bin` or `.nfc` included
    pub original_filename: String,
    /// Path of the dump relative to the asset root
    pub original_path: String,
    /// Character shown to users
    pub character_name: String,
    /// Series the figure belongs to
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub game_series: Option<String>,
    /// Character identifier, hex
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    /// Game identifier, hex
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    /// Free-form description
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    /// Release date as recorded
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Amiibo kind as recorded
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub amiibo_type: Option<String>,
}

impl NTagMetadata {
    /// Character name, or the file name without `.bin` / `.nfc`
    pub fn display_name(&self) -> &str {
        if !self.character_name.trim().is_empty() {
            return &self.character_name;
        }
        let name = &self.original_filename;
        let name = name.strip_suffix(".bin").unwrap_or(name);
        name.strip_suffix(".nfc").unwrap_or(name)
    }

    /// Series, or "Unknown"
    pub fn game_series(&self) -> &str {
        self.game_series.as_deref().unwrap_or(UNKNOWN_SERIES)
    }
}

/// An NTAG215 figure image (135 pages of 8 hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NTagRecord {
    /// Uppercase hex UID
    pub uid: String,
    /// 135 pages of 8 hex digits
    pub pages: Vec<String>,
    /// Descriptive fields
    pub metadata: NTagMetadata,
}

impl NTagRecord {
    /// Decoded page; malformed hex is padded or truncated to four bytes.
    pub fn page(&self, index: usize) -> Option<PageData> {
        self.pages.get(index).map(|hex| page_from_hex(hex))
    }

    /// Build a catalog entry from a tag dump.
    pub fn from_dump(dump: &TagDump, original_filename: &str, character_name: &str) -> Result<Self> {
        if dump.family != TagFamily::Ntag215 {
            return Err(Error::TagTypeMismatch(format!(
                "cannot export a {} dump as an NTAG215 record",
                dump.family
            )));
        }
        let id_page = |i: usize| dump.cells.get(i).cloned();
        Ok(Self {
            uid: dump.uid.to_hex(),
            pages: dump.cells.clone(),
            metadata: NTagMetadata {
                original_filename: original_filename.to_string(),
                original_path: original_filename.to_string(),
                character_name: character_name.to_string(),
                game_series: None,
                character_id: id_page(NTAG_CHARACTER_ID_PAGE),
                game_id: id_page(NTAG_GAME_ID_PAGE),
                biography: None,
                release_date: None,
                amiibo_type: None,
            },
        })
    }
}

/// One catalog entry of either family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagRecord {
    /// Mifare Classic 1K entry
    Mifare(MifareRecord),
    /// NTAG215 entry
    NTag(NTagRecord),
}

impl From<MifareRecord> for TagRecord {
    fn from(r: MifareRecord) -> Self {
        Self::Mifare(r)
    }
}

impl From<NTagRecord> for TagRecord {
    fn from(r: NTagRecord) -> Self {
        Self::NTag(r)
    }
}

impl TagRecord {
    /// Tag family implied by the variant
    pub fn family(&self) -> TagFamily {
        match self {
            Self::Mifare(_) => TagFamily::MifareClassic1K,
            Self::NTag(_) => TagFamily::Ntag215,
        }
    }

    /// Uppercase hex UID
    pub fn uid(&self) -> &str {
        match self {
            Self::Mifare(r) => &r.uid,
            Self::NTag(r) => &r.uid,
        }
    }

    /// Blocks or pages as stored
    pub fn cells(&self) -> &[String] {
        match self {
            Self::Mifare(r) => &r.blocks,
            Self::NTag(r) => &r.pages,
        }
    }

    /// Name shown to users
    pub fn display_name(&self) -> &str {
        match self {
            Self::Mifare(r) => r.metadata.display_name(),
            Self::NTag(r) => r.metadata.display_name(),
        }
    }

    /// Series, or "Unknown"
    pub fn game_series(&self) -> &str {
        match self {
            Self::Mifare(r) => r.metadata.game_series(),
            Self::NTag(r) => r.metadata.game_series(),
        }
    }

    /// Third searchable field: character name (NTAG) or subcategory (Mifare)
    pub fn secondary_name(&self) -> Option<&str> {
        match self {
            Self::Mifare(r) => r.metadata.subcategory.as_deref(),
            Self::NTag(r) => Some(r.metadata.character_name.as_str()),
        }
    }

    /// Description, when the dump has one
    pub fn biography(&self) -> Option<&str> {
        match self {
            Self::Mifare(r) => r.metadata.biography.as_deref(),
            Self::NTag(r) => r.metadata.biography.as_deref(),
        }
    }

    /// The Mifare entry, if this is one
    pub fn as_mifare(&self) -> Option<&MifareRecord> {
        match self {
            Self::Mifare(r) => Some(r),
            Self::NTag(_) => None,
        }
    }

    /// The NTAG entry, if this is one
    pub fn as_ntag(&self) -> Option<&NTagRecord> {
        match self {
            Self::NTag(r) => Some(r),
            Self::Mifare(_) => None,
        }
    }

    /// Upper-case the UID and every cell, trimming stray whitespace.
    pub fn normalise(&mut self) {
        let (uid, cells) = match self {
            Self::Mifare(r) => (&mut r.uid, &mut r.blocks),
            Self::NTag(r) => (&mut r.uid, &mut r.pages),
        };
        *uid = uid.trim().to_ascii_uppercase();
        for cell in cells.iter_mut() {
            *cell = cell.trim().to_ascii_uppercase();
        }
    }

    /// Geometry and hex shape checks applied when a record is loaded.
    pub fn validate(&self) -> Result<()> {
        let family = self.family();
        if self.uid().is_empty() || bytes_from_hex(self.uid()).is_empty() {
            return Err(Error::MalformedReferenceData(format!(
                "uid '{}' is not hex",
                self.uid()
            )));
        }
        let cells = self.cells();
        if cells.len() != family.cell_count() {
            return Err(Error::MalformedReferenceData(format!(
                "{} record has {} cells, expected {}",
                family,
                cells.len(),
                family.cell_count()
            )));
        }
        if let Some((i, bad)) = cells
            .iter()
            .enumerate()
            .find(|(_, c)| !is_hex_cell(c, family.cell_width()))
        {
            return Err(Error::MalformedReferenceData(format!(
                "cell {} ('{}') is not {} bytes of hex",
                i,
                bad,
                family.cell_width()
            )));
        }
        Ok(())
    }
}
