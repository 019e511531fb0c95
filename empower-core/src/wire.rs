//! Framing: 4-byte big-endian prologue carrying the message size, then the message.

use std::fmt::Write;

use crate::codec::CodecError;
use crate::messages::Message;
use crate::protocol::PROLOGUE_SIZE;

/// Largest message a frame may carry; bounded by the u16 header length field.
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;

/// Encode a message into a single frame: prologue + message.
pub fn encode_frame(msg: &Message) -> Result<Vec<u8>, FrameEncodeError> {
    let len = msg.encoded_len();
    if len > MAX_MESSAGE_SIZE {
        return Err(FrameEncodeError::TooLarge);
    }
    let mut out = vec![0u8; PROLOGUE_SIZE + len];
    out[..PROLOGUE_SIZE].copy_from_slice(&(len as u32).to_be_bytes());
    msg.encode_into(&mut out[PROLOGUE_SIZE..])?;
    Ok(out)
}

/// Prefix an already encoded message with its prologue.
pub fn frame_bytes(raw: &[u8]) -> Result<Vec<u8>, FrameEncodeError> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(FrameEncodeError::TooLarge);
    }
    let mut out = Vec::with_capacity(PROLOGUE_SIZE + raw.len());
    out.extend_from_slice(&(raw.len() as u32).to_be_bytes());
    out.extend_from_slice(raw);
    Ok(out)
}

/// Error encoding a message into a frame (codec failure or size limit).
#[derive(Debug, thiserror::Error)]
pub enum FrameEncodeError {
    #[error("encode error: {0}")]
    Encode(#[from] CodecError),
    #[error("frame too large")]
    TooLarge,
}

/// Size announced by a prologue.
pub fn prologue_len(prologue: [u8; PROLOGUE_SIZE]) -> usize {
    u32::from_be_bytes(prologue) as usize
}

/// Split one frame off the front of `bytes` without decoding it.
/// Returns the raw message and the number of bytes consumed.
pub fn split_frame(bytes: &[u8]) -> Result<(&[u8], usize), FrameDecodeError> {
    if bytes.len() < PROLOGUE_SIZE {
        return Err(FrameDecodeError::NeedMore);
    }
    let len = prologue_len([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if len > MAX_MESSAGE_SIZE {
        return Err(FrameDecodeError::TooLarge);
    }
    if bytes.len() < PROLOGUE_SIZE + len {
        return Err(FrameDecodeError::NeedMore);
    }
    Ok((&bytes[PROLOGUE_SIZE..PROLOGUE_SIZE + len], PROLOGUE_SIZE + len))
}

/// Decode one frame from the front of `bytes`. Returns the message and the number of bytes consumed.
/// Call with partial buffer; returns `NeedMore` if not enough bytes (caller should try again after more data).
pub fn decode_frame(bytes: &[u8]) -> Result<(Message, usize), FrameDecodeError> {
    let (raw, consumed) = split_frame(bytes)?;
    let msg = Message::decode(raw)?;
    Ok((msg, consumed))
}

/// Hex dump of a message, 16 bytes per row, for trace logs.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3 + bytes.len() / 16 * 5);
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "\n{:03x} ", row * 16);
        for b in chunk {
            let _ = write!(out, "{:02x} ", b);
        }
    }
    out
}

/// Error decoding a frame (need more bytes, too large, or malformed message).
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("need more bytes")]
    NeedMore,
    #[error("frame too large")]
    TooLarge,
    #[error("decode error: {0}")]
    Decode(#[from] CodecError),
}
