//! Master header: the 18-byte prefix of every protocol message.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, FixedSize, Reader, Result, Writer};
use crate::protocol::{MsgType, PROTOCOL_VERSION};
use crate::records::HeaderId;

pub const HEADER_SIZE: usize = 18;

const LENGTH_OFFSET: usize = 12;
const SEQ_OFFSET: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RawHeader {
    pub msg_type: u8,
    pub vers: u8,
    pub id: HeaderId,
    pub length: u16,
    pub seq: u32,
}

impl FixedSize for RawHeader {
    const SIZE: usize = HEADER_SIZE;
}

impl RawHeader {
    pub(crate) fn new(msg_type: MsgType, id: HeaderId, length: u16, seq: u32) -> Self {
        Self {
            msg_type: msg_type as u8,
            vers: PROTOCOL_VERSION,
            id,
            length,
            seq,
        }
    }

    /// Read a header and check its version.
    pub(crate) fn read(buf: &[u8]) -> Result<Self> {
        let head: RawHeader = Reader::new(buf).get()?;
        if head.vers != PROTOCOL_VERSION {
            return Err(CodecError::WrongVersion(head.vers));
        }
        Ok(head)
    }
}

fn check_len(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(CodecError::Truncated {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Write a master header with zeroed length and sequence. Returns the header size.
pub fn format_head(buf: &mut [u8], msg_type: MsgType, id: HeaderId) -> Result<usize> {
    let mut w = Writer::new(buf);
    w.put(&RawHeader::new(msg_type, id, 0, 0))?;
    Ok(w.position())
}

/// Parse a master header into its message type and identifiers.
pub fn parse_head(buf: &[u8]) -> Result<(MsgType, HeaderId)> {
    let head = RawHeader::read(buf)?;
    let msg_type =
        MsgType::from_u8(head.msg_type).ok_or(CodecError::UnknownMsgType(head.msg_type))?;
    Ok((msg_type, head.id))
}

/// Message type of `buf`, or `Invalid` if it is too short or the code is unknown.
pub fn msg_type(buf: &[u8]) -> MsgType {
    buf.first()
        .filter(|_| buf.len() >= HEADER_SIZE)
        .and_then(|t| MsgType::from_u8(*t))
        .unwrap_or(MsgType::Invalid)
}

pub fn seq(buf: &[u8]) -> Result<u32> {
    check_len(buf, HEADER_SIZE)?;
    Reader::at(buf, SEQ_OFFSET).get()
}

pub fn msg_length(buf: &[u8]) -> Result<u16> {
    check_len(buf, HEADER_SIZE)?;
    Reader::at(buf, LENGTH_OFFSET).get()
}

pub fn set_seq(buf: &mut [u8], seq: u32) -> Result<()> {
    check_len(buf, HEADER_SIZE)?;
    Writer::at(buf, SEQ_OFFSET).put(&seq)
}

pub fn set_msg_length(buf: &mut [u8], length: u16) -> Result<()> {
    check_len(buf, HEADER_SIZE)?;
    Writer::at(buf, LENGTH_OFFSET).put(&length)
}
