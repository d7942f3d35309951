// tagsmith/src/config.rs
//! Tunables for probing, identification and retry behaviour

/// Fraction of compared cells that must agree before a catalog record is
/// accepted as a fuzzy match.
pub const MATCH_THRESHOLD: f64 = 0.8;

/// Below this many verified pages an NTAG215 write is logged as suspicious.
pub const MIN_VERIFIED_PAGES: usize = 5;

/// Data block used for the Mifare write probe (sector 0, not the UID block).
pub const MIFARE_PROBE_BLOCK: usize = 1;

/// User page used for the NTAG215 write probe, outside the identity region.
pub const NTAG_PROBE_PAGE: usize = 16;

/// Reconnect-and-retry budget per cell.
pub const RECONNECT_ATTEMPTS: usize = 1;
