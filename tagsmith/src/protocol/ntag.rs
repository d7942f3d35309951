// tagsmith/src/protocol/ntag.rs

//! NTAG21x raw page commands over NFC-A.

use super::classify;
use crate::constants::{NTAG_ACK, NTAG_CMD_READ, NTAG_CMD_WRITE, NTAG215_ATQA, NTAG215_SAK};
use crate::transport::traits::NfcATech;
use crate::types::{Atqa, PageData};
use crate::utils::hex_from_bytes;
use crate::{Error, Result};
use std::convert::TryFrom;

/// Page-level command frames understood by NTAG21x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// READ returns 16 bytes starting at `page`
    Read {
        /// First page returned
        page: u8,
    },
    /// WRITE stores exactly one page
    Write {
        /// Target page
        page: u8,
        /// New contents
        data: PageData,
    },
}

impl Command {
    /// Command byte
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Read { .. } => NTAG_CMD_READ,
            Self::Write { .. } => NTAG_CMD_WRITE,
        }
    }

    /// Frame ready for `transceive`
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Read { page } => vec![NTAG_CMD_READ, *page],
            Self::Write { page, data } => {
                let mut buf = Vec::with_capacity(6);
                buf.push(NTAG_CMD_WRITE);
                buf.push(*page);
                buf.extend_from_slice(data.as_bytes());
                buf
            }
        }
    }
}

fn page_address(page: usize) -> Result<u8> {
    u8::try_from(page)
        .map_err(|_| Error::UnsupportedOperation(format!("page {} is not addressable", page)))
}

/// ATQA 0x0044 with SAK 0x00 identifies an NTAG21x / Ultralight target.
pub fn is_ntag215_signature(atqa: &[u8], sak: u8) -> bool {
    Atqa::from_le_slice(atqa).is_some_and(|a| a.as_u16() == NTAG215_ATQA) && sak == NTAG215_SAK
}

/// The tag acknowledged a write (0x0A in the first byte).
pub fn is_ack(response: &[u8]) -> bool {
    response.first() == Some(&NTAG_ACK)
}

/// Read one page; READ answers four pages and only the first is kept.
pub fn read_page<T: NfcATech + ?Sized>(tech: &mut T, page: usize) -> Result<PageData> {
    let cmd = Command::Read {
        page: page_address(page)?,
    };
    let response = tech.transceive(&cmd.encode()).map_err(classify)?;
    PageData::try_from(&response[..])
}

/// Send WRITE and require an ACK. An ACK does not prove the page changed;
/// callers that care read back.
pub fn write_page<T: NfcATech + ?Sized>(tech: &mut T, page: usize, data: &PageData) -> Result<()> {
    let cmd = Command::Write {
        page: page_address(page)?,
        data: *data,
    };
    let response = tech.transceive(&cmd.encode()).map_err(classify)?;
    if is_ack(&response) {
        Ok(())
    } else {
        Err(Error::WriteRejected {
            index: page,
            response: hex_from_bytes(&response),
        })
    }
}

/// Write then read back; `Ok(false)` when the tag ACKed but kept old data.
pub fn write_page_verified<T: NfcATech + ?Sized>(
    tech: &mut T,
    page: usize,
    data: &PageData,
) -> Result<bool> {
    write_page(tech, page, data)?;
    Ok(read_page(tech, page)? == *data)
}
