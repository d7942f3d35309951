// tagsmith/src/transport/mock.rs

//! In-memory simulated tags for unit tests, integration tests and benches.
//!
//! Each mock is a cheap handle around shared state, so a test can give a
//! clone to the code under test and inspect the memory afterwards.

use crate::constants::{
    MIFARE_1K_BLOCK_COUNT, MIFARE_4K_BLOCK_COUNT, MIFARE_BLOCK_SIZE, MIFARE_KEY_LEN, NTAG_ACK,
    NTAG_CMD_READ, NTAG_CMD_WRITE, NTAG_PAGE_SIZE, NTAG215_DEFAULT_CC, NTAG215_PAGE_COUNT,
};
use crate::transport::traits::{DetectedTag, MifareClassicTech, NfcATech, TagConnection};
use crate::types::{MifareKey, MifareType};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const NTAG_NAK: u8 = 0x00;

/// Factory sector trailer: Key A FF.., transport access bits, Key B FF..
const FACTORY_TRAILER: [u8; MIFARE_BLOCK_SIZE] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x80, 0x69, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF,
];

/// Link state and fault injection shared by both mock families.
#[derive(Debug, Default)]
struct Link {
    connected: bool,
    connects: usize,
    closes: usize,
    refuse_connect: bool,
    /// NAK / error on write
    rejected: HashSet<usize>,
    /// write acknowledged but memory unchanged
    protected: HashSet<usize>,
    unreadable: HashSet<usize>,
    /// cell -> number of writes that drop the connection before succeeding
    drops: HashMap<usize, usize>,
    /// cell -> number of reads that drop the connection before succeeding
    read_drops: HashMap<usize, usize>,
    writes: Vec<usize>,
}

impl Link {
    fn connect(&mut self) -> Result<()> {
        self.connects += 1;
        if self.refuse_connect {
            return Err(Error::from_io_message("Tag was lost."));
        }
        self.connected = true;
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
        self.connected = false;
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::ConnectionLost("tag is not connected".into()))
        }
    }

    /// Simulate the tag leaving the field on a write to `index`.
    fn maybe_drop(&mut self, index: usize) -> Result<()> {
        let left = self.drops.get_mut(&index);
        Self::take_drop(left, &mut self.connected, "Tag is out of date")
    }

    /// Simulate the tag leaving the field on a read of `index`.
    fn maybe_drop_read(&mut self, index: usize) -> Result<()> {
        let left = self.read_drops.get_mut(&index);
        Self::take_drop(left, &mut self.connected, "Tag was lost.")
    }

    fn take_drop(left: Option<&mut usize>, connected: &mut bool, message: &str) -> Result<()> {
        match left {
            Some(left) if *left > 0 => {
                *left -= 1;
                *connected = false;
                Err(Error::from_io_message(message))
            }
            _ => Ok(()),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct MifareState {
    uid: Vec<u8>,
    blocks: Vec<[u8; MIFARE_BLOCK_SIZE]>,
    mifare_type: MifareType,
    authenticated: Option<u8>,
    uid_locked: bool,
    expose_key_a: bool,
    locked_sectors: HashSet<u8>,
    /// keys accepted in addition to the trailer's Key A
    extra_keys: HashMap<u8, Vec<[u8; MIFARE_KEY_LEN]>>,
    /// sector -> number of authentications that drop the connection
    auth_drops: HashMap<u8, usize>,
    link: Link,
}

fn mifare_sector_of(index: usize) -> u8 {
    if index < 128 {
        (index / 4) as u8
    } else {
        (32 + (index - 128) / 16) as u8
    }
}

fn mifare_trailer_of(sector: u8) -> usize {
    let s = sector as usize;
    if s < 32 { s * 4 + 3 } else { 128 + (s - 32) * 16 + 15 }
}

/// Simulated Mifare Classic 1K/4K card.
#[derive(Debug, Clone)]
pub struct MockMifareTag {
    state: Arc<Mutex<MifareState>>,
}

impl MockMifareTag {
    /// Build a card from raw block contents. Block 0 is left as given.
    pub fn new(uid: &[u8], blocks: Vec<[u8; MIFARE_BLOCK_SIZE]>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MifareState {
                uid: uid.to_vec(),
                blocks,
                mifare_type: MifareType::Classic,
                authenticated: None,
                uid_locked: false,
                expose_key_a: false,
                locked_sectors: HashSet::new(),
                extra_keys: HashMap::new(),
                auth_drops: HashMap::new(),
                link: Link::default(),
            })),
        }
    }

    fn blank(uid: &[u8], block_count: usize) -> Self {
        let mut blocks = vec![[0u8; MIFARE_BLOCK_SIZE]; block_count];
        let mut manufacturer = [0u8; MIFARE_BLOCK_SIZE];
        let n = uid.len().min(4);
        manufacturer[..n].copy_from_slice(&uid[..n]);
        manufacturer[4] = uid.iter().take(4).fold(0, |acc, b| acc ^ b);
        manufacturer[5] = 0x08;
        manufacturer[6] = 0x04;
        blocks[0] = manufacturer;
        let mut sector = 0u8;
        loop {
            let t = mifare_trailer_of(sector);
            if t >= block_count {
                break;
            }
            blocks[t] = FACTORY_TRAILER;
            sector += 1;
        }
        Self::new(uid, blocks)
    }

    /// Factory-fresh 1K card with default keys
    pub fn blank_1k(uid: &[u8]) -> Self {
        Self::blank(uid, MIFARE_1K_BLOCK_COUNT)
    }

    /// Factory-fresh 4K card with default keys
    pub fn blank_4k(uid: &[u8]) -> Self {
        Self::blank(uid, MIFARE_4K_BLOCK_COUNT)
    }

    /// Chip type reported to callers
    pub fn set_type(&self, mifare_type: MifareType) {
        lock(&self.state).mifare_type = mifare_type;
    }

    /// Block 0 refuses writes (genuine, non-magic card)
    pub fn lock_uid(&self) {
        lock(&self.state).uid_locked = true;
    }

    /// Trailers read back with Key A in clear, as some clone cards do
    pub fn expose_key_a(&self) {
        lock(&self.state).expose_key_a = true;
    }

    /// Replace Key A of `sector` in its trailer
    pub fn set_sector_key(&self, sector: u8, key: [u8; MIFARE_KEY_LEN]) {
        let mut st = lock(&self.state);
        let t = mifare_trailer_of(sector);
        st.blocks[t][..MIFARE_KEY_LEN].copy_from_slice(&key);
    }

    /// Accept `key` for `sector` whatever the trailer holds
    pub fn also_accept(&self, sector: u8, key: [u8; MIFARE_KEY_LEN]) {
        lock(&self.state)
            .extra_keys
            .entry(sector)
            .or_default()
            .push(key);
    }

    /// Sector refuses every key
    pub fn lock_sector(&self, sector: u8) {
        lock(&self.state).locked_sectors.insert(sector);
    }

    /// Writes to these blocks fail with an I/O error
    pub fn reject_writes(&self, indices: impl IntoIterator<Item = usize>) {
        lock(&self.state).link.rejected.extend(indices);
    }

    /// Writes to these blocks succeed but change nothing
    pub fn protect(&self, indices: impl IntoIterator<Item = usize>) {
        lock(&self.state).link.protected.extend(indices);
    }

    /// Reads of these blocks fail
    pub fn make_unreadable(&self, indices: impl IntoIterator<Item = usize>) {
        lock(&self.state).link.unreadable.extend(indices);
    }

    /// The next `times` writes to block `index` drop the connection
    pub fn drop_connection_on_write(&self, index: usize, times: usize) {
        lock(&self.state).link.drops.insert(index, times);
    }

    /// The next `times` reads of block `index` drop the connection
    pub fn drop_connection_on_read(&self, index: usize, times: usize) {
        lock(&self.state).link.read_drops.insert(index, times);
    }

    /// The next `times` authentications of `sector` drop the connection
    pub fn drop_connection_on_auth(&self, sector: u8, times: usize) {
        lock(&self.state).auth_drops.insert(sector, times);
    }

    /// Make every `connect` fail as if the card were out of range
    pub fn refuse_connect(&self, refuse: bool) {
        lock(&self.state).link.refuse_connect = refuse;
    }

    /// Current contents of one block
    pub fn block(&self, index: usize) -> [u8; MIFARE_BLOCK_SIZE] {
        lock(&self.state).blocks[index]
    }

    /// Snapshot of the whole memory
    pub fn blocks(&self) -> Vec<[u8; MIFARE_BLOCK_SIZE]> {
        lock(&self.state).blocks.clone()
    }

    /// UID handed out by the detected tag
    pub fn uid(&self) -> Vec<u8> {
        lock(&self.state).uid.clone()
    }

    /// Number of `connect` calls so far
    pub fn connect_count(&self) -> usize {
        lock(&self.state).link.connects
    }

    /// Number of `close` calls so far
    pub fn close_count(&self) -> usize {
        lock(&self.state).link.closes
    }

    /// Whether a connection is up
    pub fn is_open(&self) -> bool {
        lock(&self.state).link.connected
    }

    /// Block indices in the order writes reached the card
    pub fn write_log(&self) -> Vec<usize> {
        lock(&self.state).link.writes.clone()
    }
}

impl TagConnection for MockMifareTag {
    fn connect(&mut self) -> Result<()> {
        let mut st = lock(&self.state);
        st.authenticated = None;
        st.link.connect()
    }

    fn close(&mut self) -> Result<()> {
        let mut st = lock(&self.state);
        st.authenticated = None;
        st.link.close();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).link.connected
    }
}

impl MifareClassicTech for MockMifareTag {
    fn mifare_type(&self) -> MifareType {
        lock(&self.state).mifare_type
    }

    fn block_count(&self) -> usize {
        lock(&self.state).blocks.len()
    }

    fn sector_count(&self) -> usize {
        let blocks = lock(&self.state).blocks.len();
        mifare_sector_of(blocks - 1) as usize + 1
    }

    fn authenticate_sector_with_key_a(&mut self, sector: u8, key: &MifareKey) -> Result<bool> {
        let mut st = lock(&self.state);
        st.link.ensure_connected()?;
        let st = &mut *st;
        if let Some(left) = st.auth_drops.get_mut(&sector) {
            if let Err(e) = Link::take_drop(Some(left), &mut st.link.connected, "Tag was lost.") {
                st.authenticated = None;
                return Err(e);
            }
        }
        let t = mifare_trailer_of(sector);
        if t >= st.blocks.len() {
            return Err(Error::TagIo(format!("sector {} out of range", sector)));
        }
        let extra = st
            .extra_keys
            .get(&sector)
            .is_some_and(|keys| keys.contains(key.as_bytes()));
        let ok = !st.locked_sectors.contains(&sector)
            && (extra || st.blocks[t][..MIFARE_KEY_LEN] == key.as_bytes()[..]);
        st.authenticated = ok.then_some(sector);
        Ok(ok)
    }

    fn read_block(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut st = lock(&self.state);
        st.link.ensure_connected()?;
        if let Err(e) = st.link.maybe_drop_read(index) {
            st.authenticated = None;
            return Err(e);
        }
        if index >= st.blocks.len() || st.authenticated != Some(mifare_sector_of(index)) {
            return Err(Error::TagIo("Transceive failed".into()));
        }
        if st.link.unreadable.contains(&index) {
            return Err(Error::TagIo("Transceive failed".into()));
        }
        let mut out = st.blocks[index];
        if index == mifare_trailer_of(mifare_sector_of(index)) && !st.expose_key_a {
            out[..MIFARE_KEY_LEN].fill(0);
        }
        Ok(out.to_vec())
    }

    fn write_block(&mut self, index: usize, data: &[u8; 16]) -> Result<()> {
        let mut st = lock(&self.state);
        st.link.ensure_connected()?;
        if let Err(e) = st.link.maybe_drop(index) {
            st.authenticated = None;
            return Err(e);
        }
        if index >= st.blocks.len() || st.authenticated != Some(mifare_sector_of(index)) {
            return Err(Error::TagIo("Transceive failed".into()));
        }
        if st.link.rejected.contains(&index) || (index == 0 && st.uid_locked) {
            return Err(Error::TagIo("Write rejected".into()));
        }
        st.link.writes.push(index);
        if !st.link.protected.contains(&index) {
            st.blocks[index] = *data;
        }
        Ok(())
    }
}

// A Mifare card also answers as a plain NFC-A target.
impl NfcATech for MockMifareTag {
    fn atqa(&self) -> Vec<u8> {
        vec![0x04, 0x00]
    }

    fn sak(&self) -> u8 {
        0x08
    }

    fn transceive(&mut self, _data: &[u8]) -> Result<Vec<u8>> {
        lock(&self.state).link.ensure_connected()?;
        Err(Error::TagIo("Transceive failed".into()))
    }
}

#[derive(Debug)]
struct NtagState {
    pages: Vec<[u8; NTAG_PAGE_SIZE]>,
    atqa: [u8; 2],
    sak: u8,
    uid_locked: bool,
    link: Link,
}

/// Simulated NTAG21x speaking raw READ (0x30) / WRITE (0xA2).
#[derive(Debug, Clone)]
pub struct MockNtagTag {
    state: Arc<Mutex<NtagState>>,
}

impl MockNtagTag {
    /// Build a tag from raw pages; the UID is taken from pages 0 and 1
    pub fn new(pages: Vec<[u8; NTAG_PAGE_SIZE]>) -> Self {
        Self {
            state: Arc::new(Mutex::new(NtagState {
                pages,
                atqa: [0x44, 0x00],
                sak: 0x00,
                uid_locked: false,
                link: Link::default(),
            })),
        }
    }

    /// Factory-fresh NTAG215 with a 7-byte UID
    pub fn blank_215(uid: &[u8]) -> Self {
        let mut u = [0u8; 7];
        let n = uid.len().min(7);
        u[..n].copy_from_slice(&uid[..n]);
        let bcc0 = 0x88 ^ u[0] ^ u[1] ^ u[2];
        let bcc1 = u[3] ^ u[4] ^ u[5] ^ u[6];
        let mut pages = vec![[0u8; NTAG_PAGE_SIZE]; NTAG215_PAGE_COUNT];
        pages[0] = [u[0], u[1], u[2], bcc0];
        pages[1] = [u[3], u[4], u[5], u[6]];
        pages[2] = [bcc1, 0x48, 0x00, 0x00];
        pages[3] = NTAG215_DEFAULT_CC;
        pages[4] = [0x03, 0x00, 0xFE, 0x00];
        pages[130] = [0x00, 0x00, 0x00, 0xBD];
        pages[131] = [0x04, 0x00, 0x00, 0xFF];
        pages[132] = [0x00, 0x05, 0x00, 0x00];
        pages[133] = [0xFF; 4];
        Self::new(pages)
    }

    /// Override the ATQA/SAK pair
    pub fn set_signature(&self, atqa: [u8; 2], sak: u8) {
        let mut st = lock(&self.state);
        st.atqa = atqa;
        st.sak = sak;
    }

    /// Overwrite a page directly, bypassing every fault
    pub fn set_page(&self, page: usize, data: [u8; NTAG_PAGE_SIZE]) {
        lock(&self.state).pages[page] = data;
    }

    /// Pages 0-1 (the UID) NAK every write
    pub fn lock_uid(&self) {
        lock(&self.state).uid_locked = true;
    }

    /// WRITE to these pages is answered with a NAK
    pub fn reject_writes(&self, pages: impl IntoIterator<Item = usize>) {
        lock(&self.state).link.rejected.extend(pages);
    }

    /// WRITE to these pages is ACKed but ignored
    pub fn protect(&self, pages: impl IntoIterator<Item = usize>) {
        lock(&self.state).link.protected.extend(pages);
    }

    /// READ starting at these pages fails
    pub fn make_unreadable(&self, pages: impl IntoIterator<Item = usize>) {
        lock(&self.state).link.unreadable.extend(pages);
    }

    /// The next `times` writes to `page` drop the connection
    pub fn drop_connection_on_write(&self, page: usize, times: usize) {
        lock(&self.state).link.drops.insert(page, times);
    }

    /// The next `times` READ commands starting at `page` drop the connection
    pub fn drop_connection_on_read(&self, page: usize, times: usize) {
        lock(&self.state).link.read_drops.insert(page, times);
    }

    /// Make every `connect` fail as if the tag were out of range
    pub fn refuse_connect(&self, refuse: bool) {
        lock(&self.state).link.refuse_connect = refuse;
    }

    /// Current contents of one page
    pub fn page(&self, page: usize) -> [u8; NTAG_PAGE_SIZE] {
        lock(&self.state).pages[page]
    }

    /// Snapshot of the whole memory
    pub fn pages(&self) -> Vec<[u8; NTAG_PAGE_SIZE]> {
        lock(&self.state).pages.clone()
    }

    /// Seven-byte UID from pages 0 and 1, BCC0 skipped
    pub fn uid(&self) -> Vec<u8> {
        let st = lock(&self.state);
        let mut uid = st.pages[0][..3].to_vec();
        uid.extend_from_slice(&st.pages[1]);
        uid
    }

    /// Number of `connect` calls so far
    pub fn connect_count(&self) -> usize {
        lock(&self.state).link.connects
    }

    /// Number of `close` calls so far
    pub fn close_count(&self) -> usize {
        lock(&self.state).link.closes
    }

    /// Whether a connection is up
    pub fn is_open(&self) -> bool {
        lock(&self.state).link.connected
    }

    /// Pages in the order writes reached the tag
    pub fn write_log(&self) -> Vec<usize> {
        lock(&self.state).link.writes.clone()
    }
}

impl TagConnection for MockNtagTag {
    fn connect(&mut self) -> Result<()> {
        lock(&self.state).link.connect()
    }

    fn close(&mut self) -> Result<()> {
        lock(&self.state).link.close();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        lock(&self.state).link.connected
    }
}

impl NfcATech for MockNtagTag {
    fn atqa(&self) -> Vec<u8> {
        lock(&self.state).atqa.to_vec()
    }

    fn sak(&self) -> u8 {
        lock(&self.state).sak
    }

    fn transceive(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut st = lock(&self.state);
        st.link.ensure_connected()?;
        let count = st.pages.len();
        match data {
            [NTAG_CMD_READ, page] => {
                let page = *page as usize;
                if page >= count {
                    return Ok(vec![NTAG_NAK]);
                }
                st.link.maybe_drop_read(page)?;
                if st.link.unreadable.contains(&page) {
                    return Err(Error::TagIo("Transceive failed".into()));
                }
                // READ returns four pages, rolling over past the last page
                Ok((0..4)
                    .flat_map(|i| st.pages[(page + i) % count])
                    .collect())
            }
            [NTAG_CMD_WRITE, page, b0, b1, b2, b3] => {
                let page = *page as usize;
                st.link.maybe_drop(page)?;
                if page >= count
                    || st.link.rejected.contains(&page)
                    || (page < 2 && st.uid_locked)
                {
                    return Ok(vec![NTAG_NAK]);
                }
                st.link.writes.push(page);
                if !st.link.protected.contains(&page) {
                    st.pages[page] = [*b0, *b1, *b2, *b3];
                }
                Ok(vec![NTAG_ACK])
            }
            _ => Err(Error::TagIo(format!(
                "unsupported command {}",
                crate::utils::bytes_to_hex_spaced(data)
            ))),
        }
    }
}

#[derive(Debug, Clone)]
enum Chip {
    Mifare(MockMifareTag),
    Ntag(MockNtagTag),
    Unsupported,
}

/// A detected tag backed by one of the mocks above.
#[derive(Debug, Clone)]
pub struct MockTag {
    id: Vec<u8>,
    chip: Chip,
}

impl MockTag {
    /// Detected tag exposing Mifare Classic and NfcA
    pub fn mifare(tag: MockMifareTag) -> Self {
        Self {
            id: tag.uid(),
            chip: Chip::Mifare(tag),
        }
    }

    /// Detected tag exposing NfcA only
    pub fn ntag(tag: MockNtagTag) -> Self {
        Self {
            id: tag.uid(),
            chip: Chip::Ntag(tag),
        }
    }

    /// A tag exposing neither technology (e.g. an ISO-DEP card)
    pub fn unsupported(id: &[u8]) -> Self {
        Self {
            id: id.to_vec(),
            chip: Chip::Unsupported,
        }
    }
}

impl DetectedTag for MockTag {
    fn id(&self) -> Vec<u8> {
        self.id.clone()
    }

    fn tech_list(&self) -> Vec<String> {
        let techs: &[&str] = match self.chip {
            Chip::Mifare(_) => &["NfcA", "MifareClassic"],
            Chip::Ntag(_) => &["NfcA", "MifareUltralight"],
            Chip::Unsupported => &["IsoDep"],
        };
        techs.iter().map(|s| s.to_string()).collect()
    }

    fn mifare_classic(&self) -> Option<Box<dyn MifareClassicTech>> {
        match &self.chip {
            Chip::Mifare(m) => Some(Box::new(m.clone())),
            _ => None,
        }
    }

    fn nfc_a(&self) -> Option<Box<dyn NfcATech>> {
        match &self.chip {
            Chip::Mifare(m) => Some(Box::new(m.clone())),
            Chip::Ntag(n) => Some(Box::new(n.clone())),
            Chip::Unsupported => None,
        }
    }
}
