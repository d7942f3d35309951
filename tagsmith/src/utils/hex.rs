//! Hexadecimal helpers for catalog cells and log output.
//!
//! Catalog documents carry every block and page as a hex string, so decoding
//! is lenient (it never fails, it degrades) while validation used at load time
//! is strict.

use crate::constants::NTAG_PAGE_SIZE;
use crate::types::PageData;
use log::warn;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Convert a byte slice to an upper-case hex string without separators.
///
/// Example: `&[0xde, 0xad]` -> `"DEAD"`
pub fn hex_from_bytes(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        s.push(HEX_DIGITS[(b >> 4) as usize] as char);
        s.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
    }
    s
}

/// Convert a byte slice to an upper-case hex string with a single space
/// between each byte. Used for log lines.
///
/// Example: `&[0xde, 0xad]` -> `"DE AD"`
pub fn bytes_to_hex_spaced(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            s.push(' ');
        }
        s.push_str(&hex_from_bytes(std::slice::from_ref(b)));
    }
    s
}

fn clean(s: &str) -> Vec<u8> {
    s.bytes().filter(u8::is_ascii_hexdigit).collect()
}

fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

/// Decode a hex string into bytes.
///
/// Non-hex characters (whitespace, separators) are dropped first. An odd
/// number of remaining digits yields an empty vector.
pub fn bytes_from_hex(s: &str) -> Vec<u8> {
    let digits = clean(s);
    if digits.len() % 2 != 0 {
        return Vec::new();
    }
    digits
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect()
}

/// Decode exactly one NTAG page from hex.
///
/// Short input is right-padded with `0`, long input is truncated to eight
/// digits. Either anomaly is logged.
pub fn page_from_hex(s: &str) -> PageData {
    let mut digits = clean(s);
    let want = NTAG_PAGE_SIZE * 2;
    if digits.len() != want {
        warn!(
            "page hex '{}' has {} digits, normalising to {}",
            s,
            digits.len(),
            want
        );
        digits.resize(want, b'0');
    }
    let mut out = [0u8; NTAG_PAGE_SIZE];
    for (slot, pair) in out.iter_mut().zip(digits.chunks_exact(2)) {
        *slot = (nibble(pair[0]) << 4) | nibble(pair[1]);
    }
    PageData::from_bytes(out)
}

/// Strict check used by the catalog loader: exactly `width` bytes worth of
/// hex digits and nothing else.
pub fn is_hex_cell(s: &str, width: usize) -> bool {
    s.len() == width * 2 && s.bytes().all(|c| c.is_ascii_hexdigit())
}
