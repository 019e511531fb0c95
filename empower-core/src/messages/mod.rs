//! Tagged-variant message model and the per-family flat operations built on it.
//!
//! A [`Message`] is a master header, an event header and a typed [`Body`]. Every
//! encode and decode step is bounds checked; a formatter never writes past the
//! buffer it is given.

use std::fmt;

use crate::codec::{CodecError, FixedSize, Reader, Result, Writer};
use crate::event::{RawEvent, RawSchedule, EVENT_HEADER_SIZE, SCHEDULE_HEADER_SIZE};
use crate::header::{RawHeader, HEADER_SIZE};
use crate::protocol::{ActionType, Direction, EnbCapabilities, MsgType, Operation};
use crate::records::{
    CellDetails, HandoverReply, HandoverRequest, HeaderId, MacReport, UeDetails, UeMeasure,
    UeMeasureRequest,
};

pub mod cell_cap;
pub mod enb_cap;
pub mod handover;
pub mod hello;
pub mod mac_report;
pub mod ue_measure;
pub mod ue_report;

pub use cell_cap::*;
pub use enb_cap::*;
pub use handover::*;
pub use hello::*;
pub use mac_report::*;
pub use ue_measure::*;
pub use ue_report::*;

/// Event kind, selected by the master header type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Single,
    /// Recurring event; interval in milliseconds.
    Schedule { interval: u32 },
    Trigger,
}

impl Event {
    pub fn msg_type(&self) -> MsgType {
        match self {
            Event::Single => MsgType::Single,
            Event::Schedule { .. } => MsgType::Schedule,
            Event::Trigger => MsgType::Trigger,
        }
    }

    fn header_size(&self) -> usize {
        match self {
            Event::Schedule { .. } => SCHEDULE_HEADER_SIZE,
            _ => EVENT_HEADER_SIZE,
        }
    }
}

/// Message body, one variant per family and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    HelloRequest { id: u32 },
    HelloReply { id: u32 },
    EnbCapRequest,
    EnbCapReply {
        cap: EnbCapabilities,
        cells: Vec<CellDetails>,
    },
    CellCapRequest,
    CellCapReply(CellDetails),
    UeReportRequest,
    UeReportReply { ues: Vec<UeDetails> },
    UeMeasureRequest(UeMeasureRequest),
    UeMeasureReply { measures: Vec<UeMeasure> },
    /// Report interval in milliseconds.
    MacReportRequest { interval: u16 },
    MacReportReply(MacReport),
    HandoverRequest(HandoverRequest),
    HandoverReply(HandoverReply),
}

impl Body {
    pub fn action(&self) -> ActionType {
        match self {
            Body::HelloRequest { .. } | Body::HelloReply { .. } => ActionType::Hello,
            Body::EnbCapRequest | Body::EnbCapReply { .. } => ActionType::EnbCap,
            Body::CellCapRequest | Body::CellCapReply(_) => ActionType::CellCap,
            Body::UeReportRequest | Body::UeReportReply { .. } => ActionType::UeReport,
            Body::UeMeasureRequest(_) | Body::UeMeasureReply { .. } => ActionType::UeMeasure,
            Body::MacReportRequest { .. } | Body::MacReportReply(_) => ActionType::MacReport,
            Body::HandoverRequest(_) | Body::HandoverReply(_) => ActionType::Handover,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Body::HelloRequest { .. }
            | Body::EnbCapRequest
            | Body::CellCapRequest
            | Body::UeReportRequest
            | Body::UeMeasureRequest(_)
            | Body::MacReportRequest { .. }
            | Body::HandoverRequest(_) => Direction::Request,
            _ => Direction::Reply,
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Body::HelloRequest { .. } | Body::HelloReply { .. } => u32::SIZE,
            Body::EnbCapRequest | Body::CellCapRequest | Body::UeReportRequest => u8::SIZE,
            Body::EnbCapReply { cells, .. } => 2 * u32::SIZE + cells.len() * CellDetails::SIZE,
            Body::CellCapReply(_) => CellDetails::SIZE,
            Body::UeReportReply { ues } => u32::SIZE + ues.len() * UeDetails::SIZE,
            Body::UeMeasureRequest(_) => UeMeasureRequest::SIZE,
            Body::UeMeasureReply { measures } => u32::SIZE + measures.len() * UeMeasure::SIZE,
            Body::MacReportRequest { .. } => u16::SIZE,
            Body::MacReportReply(_) => MacReport::SIZE,
            Body::HandoverRequest(_) => HandoverRequest::SIZE,
            Body::HandoverReply(_) => HandoverReply::SIZE,
        }
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<()> {
        match self {
            Body::HelloRequest { id } | Body::HelloReply { id } => w.put(id),
            Body::EnbCapRequest | Body::CellCapRequest | Body::UeReportRequest => w.put(&0u8),
            Body::EnbCapReply { cap, cells } => {
                w.put(cap)?;
                w.put(&count(cells.len())?)?;
                w.put_all(cells)
            }
            Body::CellCapReply(cell) => w.put(cell),
            Body::UeReportReply { ues } => {
                w.put(&count(ues.len())?)?;
                w.put_all(ues)
            }
            Body::UeMeasureRequest(req) => w.put(req),
            Body::UeMeasureReply { measures } => {
                w.put(&count(measures.len())?)?;
                w.put_all(measures)
            }
            Body::MacReportRequest { interval } => w.put(interval),
            Body::MacReportReply(report) => w.put(report),
            Body::HandoverRequest(req) => w.put(req),
            Body::HandoverReply(rep) => w.put(rep),
        }
    }

    fn decode(msg_type: MsgType, action: ActionType, dir: Direction, r: &mut Reader<'_>) -> Result<Self> {
        use Direction::{Reply, Request};
        let body = match (action, dir) {
            (ActionType::Hello, Request) => Body::HelloRequest { id: r.get()? },
            (ActionType::Hello, Reply) => Body::HelloReply { id: r.get()? },
            (ActionType::EnbCap, Request) => {
                r.skip_dummy();
                Body::EnbCapRequest
            }
            (ActionType::EnbCap, Reply) => {
                let cap = r.get()?;
                let n: u32 = r.get()?;
                Body::EnbCapReply {
                    cap,
                    cells: r.get_list(n as usize)?,
                }
            }
            (ActionType::CellCap, Request) => {
                r.skip_dummy();
                Body::CellCapRequest
            }
            (ActionType::CellCap, Reply) => Body::CellCapReply(r.get()?),
            (ActionType::UeReport, Request) => {
                r.skip_dummy();
                Body::UeReportRequest
            }
            (ActionType::UeReport, Reply) => {
                let n: u32 = r.get()?;
                Body::UeReportReply {
                    ues: r.get_list(n as usize)?,
                }
            }
            (ActionType::UeMeasure, Request) => Body::UeMeasureRequest(r.get()?),
            (ActionType::UeMeasure, Reply) => {
                let n: u32 = r.get()?;
                Body::UeMeasureReply {
                    measures: r.get_list(n as usize)?,
                }
            }
            (ActionType::MacReport, Request) => Body::MacReportRequest { interval: r.get()? },
            (ActionType::MacReport, Reply) => Body::MacReportReply(r.get()?),
            (ActionType::Handover, Request) => Body::HandoverRequest(r.get()?),
            (ActionType::Handover, Reply) => Body::HandoverReply(r.get()?),
            (ActionType::Invalid | ActionType::Extended, _) => {
                return Err(CodecError::Unsupported {
                    msg_type,
                    action: action as u8,
                })
            }
        };
        Ok(body)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction() {
            Direction::Request => "request",
            Direction::Reply => "reply",
        };
        write!(f, "{} {}", self.action(), dir)
    }
}

fn count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CodecError::TooLarge(len))
}

/// A complete protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: HeaderId,
    pub seq: u32,
    pub op: Operation,
    pub event: Event,
    pub body: Body,
}

impl Message {
    pub fn single(id: HeaderId, op: Operation, body: Body) -> Self {
        Self {
            id,
            seq: 0,
            op,
            event: Event::Single,
            body,
        }
    }

    pub fn schedule(id: HeaderId, interval: u32, op: Operation, body: Body) -> Self {
        Self {
            id,
            seq: 0,
            op,
            event: Event::Schedule { interval },
            body,
        }
    }

    pub fn trigger(id: HeaderId, op: Operation, body: Body) -> Self {
        Self {
            id,
            seq: 0,
            op,
            event: Event::Trigger,
            body,
        }
    }

    pub fn action(&self) -> ActionType {
        self.body.action()
    }

    pub fn direction(&self) -> Direction {
        self.body.direction()
    }

    /// Encoded size: master header, event header and body.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.event.header_size() + self.body.encoded_len()
    }

    /// Encode into `buf`, setting the header length. Returns the number of bytes written.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize> {
        let total = self.encoded_len();
        let length = u16::try_from(total).map_err(|_| CodecError::TooLarge(total))?;
        if buf.len() < total {
            return Err(CodecError::Truncated {
                needed: total,
                available: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put(&RawHeader::new(self.event.msg_type(), self.id, length, self.seq))?;
        let event = RawEvent::new(self.action(), self.op, self.direction());
        match self.event {
            Event::Schedule { interval } => w.put(&RawSchedule { event, interval })?,
            Event::Single | Event::Trigger => w.put(&event)?,
        }
        self.body.encode(&mut w)?;
        Ok(w.position())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()];
        let n = self.encode_into(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Decode one message. A non-zero header length trims trailing bytes; zero means unset.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let head = RawHeader::read(buf)?;
        let buf = match head.length as usize {
            0 => buf,
            n if n > buf.len() || n < HEADER_SIZE => {
                return Err(CodecError::LengthMismatch {
                    declared: n,
                    available: buf.len(),
                })
            }
            n => &buf[..n],
        };
        let msg_type =
            MsgType::from_u8(head.msg_type).ok_or(CodecError::UnknownMsgType(head.msg_type))?;
        let mut r = Reader::at(buf, HEADER_SIZE);
        let (event, raw) = match msg_type {
            MsgType::Single => (Event::Single, r.get::<RawEvent>()?),
            MsgType::Trigger => (Event::Trigger, r.get::<RawEvent>()?),
            MsgType::Schedule => {
                let s: RawSchedule = r.get()?;
                (Event::Schedule { interval: s.interval }, s.event)
            }
            MsgType::Invalid | MsgType::Extended => {
                let action = buf.get(HEADER_SIZE).copied().unwrap_or(0);
                return Err(CodecError::Unsupported { msg_type, action });
            }
        };
        let action = raw.action()?;
        let dir = raw.direction()?;
        let op = raw.operation()?;
        let body = Body::decode(msg_type, action, dir, &mut r)?;
        Ok(Message {
            id: head.id,
            seq: head.seq,
            op,
            event,
            body,
        })
    }
}

pub(crate) fn unexpected(expected: &'static str, body: &Body) -> CodecError {
    CodecError::UnexpectedMessage {
        expected,
        found: body.to_string(),
    }
}
