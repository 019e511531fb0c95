//! Packed big-endian record codec shared by the header, event and message modules.
//!
//! Records are plain serde structs laid out in wire order; bincode with fixed-width,
//! big-endian integers produces exactly the packed layout used on the wire.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::protocol::{MsgType, EP_ERROR, EP_WRONG_VERSION, PROTOCOL_VERSION};

/// Error encoding or decoding a protocol message.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("buffer too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error("protocol version mismatch: expected {}, got {0}", PROTOCOL_VERSION)]
    WrongVersion(u8),
    #[error("unknown message type: {0}")]
    UnknownMsgType(u8),
    #[error("unknown action type: {0}")]
    UnknownAction(u8),
    #[error("unknown direction: {0}")]
    UnknownDirection(u8),
    #[error("unknown operation: {0}")]
    UnknownOperation(u8),
    #[error("unsupported message: type {msg_type:?}, action {action}")]
    Unsupported { msg_type: MsgType, action: u8 },
    #[error("header length {declared} does not fit a buffer of {available} bytes")]
    LengthMismatch { declared: usize, available: usize },
    #[error("message too large: {0} bytes")]
    TooLarge(usize),
    #[error("expected {expected}, got {found}")]
    UnexpectedMessage {
        expected: &'static str,
        found: String,
    },
    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl CodecError {
    /// Status code reported over the C ABI.
    pub fn status(&self) -> i32 {
        match self {
            CodecError::WrongVersion(_) => EP_WRONG_VERSION,
            _ => EP_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Encoded size of a fixed-layout wire record.
pub trait FixedSize {
    const SIZE: usize;
}

macro_rules! fixed_scalar {
    ($($ty:ty),*) => {
        $(impl FixedSize for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
        })*
    };
}

fixed_scalar!(u8, u16, i16, u32, u64);

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

/// Sequential writer over a caller-supplied buffer. Never writes past its end.
pub(crate) struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn at(buf: &'a mut [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn put<T: Serialize + FixedSize>(&mut self, value: &T) -> Result<()> {
        let end = self.pos + T::SIZE;
        if end > self.buf.len() {
            return Err(CodecError::Truncated {
                needed: end,
                available: self.buf.len(),
            });
        }
        options().serialize_into(&mut self.buf[self.pos..end], value)?;
        self.pos = end;
        Ok(())
    }

    pub(crate) fn put_all<T: Serialize + FixedSize>(&mut self, values: &[T]) -> Result<()> {
        let end = self.pos + T::SIZE * values.len();
        if end > self.buf.len() {
            return Err(CodecError::Truncated {
                needed: end,
                available: self.buf.len(),
            });
        }
        for v in values {
            self.put(v)?;
        }
        Ok(())
    }
}

/// Sequential reader with explicit bounds checks.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub(crate) fn get<T: DeserializeOwned + FixedSize>(&mut self) -> Result<T> {
        let end = self.pos + T::SIZE;
        if end > self.buf.len() {
            return Err(CodecError::Truncated {
                needed: end,
                available: self.buf.len(),
            });
        }
        let value = options().deserialize(&self.buf[self.pos..end])?;
        self.pos = end;
        Ok(value)
    }

    /// Read `count` records. The whole list is bounds-checked before allocating.
    pub(crate) fn get_list<T: DeserializeOwned + FixedSize>(&mut self, count: usize) -> Result<Vec<T>> {
        let needed = count.saturating_mul(T::SIZE);
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                needed: self.pos.saturating_add(needed),
                available: self.buf.len(),
            });
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.get()?);
        }
        Ok(out)
    }

    /// Skip a padding byte if present; request bodies carry one and some peers omit it.
    pub(crate) fn skip_dummy(&mut self) {
        if self.remaining() > 0 {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        a: u8,
        b: u32,
        c: u16,
    }

    impl FixedSize for Sample {
        const SIZE: usize = 7;
    }

    #[test]
    fn records_are_packed_big_endian() {
        let mut buf = [0u8; 7];
        Writer::new(&mut buf)
            .put(&Sample {
                a: 0xaa,
                b: 0x0102_0304,
                c: 0x0506,
            })
            .unwrap();
        assert_eq!(buf, [0xaa, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        let back: Sample = Reader::new(&buf).get().unwrap();
        assert_eq!(back.b, 0x0102_0304);
    }

    #[test]
    fn writer_refuses_overflow() {
        let mut buf = [0u8; 3];
        let mut w = Writer::new(&mut buf);
        w.put(&1u16).unwrap();
        let err = w.put(&1u16).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Truncated {
                needed: 4,
                available: 3
            }
        ));
        assert_eq!(w.position(), 2);
    }

    #[test]
    fn list_is_checked_before_allocation() {
        let buf = [0u8; 8];
        let mut r = Reader::new(&buf);
        assert!(r.get_list::<u32>(u32::MAX as usize).is_err());
        assert_eq!(r.get_list::<u32>(2).unwrap(), vec![0, 0]);
    }

    #[test]
    fn status_codes() {
        assert_eq!(CodecError::WrongVersion(2).status(), EP_WRONG_VERSION);
        assert_eq!(CodecError::UnknownAction(9).status(), EP_ERROR);
    }
}
