//! Event headers that follow the master header.
//!
//! Formatters write at the start of the slice they are given (callers pass the
//! region after the master header). Accessors take the whole message.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, FixedSize, Reader, Result, Writer};
use crate::header::HEADER_SIZE;
use crate::protocol::{ActionType, Direction, Operation};

/// Size of a single or trigger event header.
pub const EVENT_HEADER_SIZE: usize = 3;
/// Size of a schedule event header (with the interval).
pub const SCHEDULE_HEADER_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RawEvent {
    pub action: u8,
    pub dir: u8,
    pub op: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RawSchedule {
    pub event: RawEvent,
    pub interval: u32,
}

impl FixedSize for RawEvent {
    const SIZE: usize = EVENT_HEADER_SIZE;
}

impl FixedSize for RawSchedule {
    const SIZE: usize = SCHEDULE_HEADER_SIZE;
}

impl RawEvent {
    pub(crate) fn new(action: ActionType, op: Operation, dir: Direction) -> Self {
        Self {
            action: action as u8,
            dir: dir as u8,
            op: op as u8,
        }
    }

    pub(crate) fn action(&self) -> Result<ActionType> {
        ActionType::from_u8(self.action).ok_or(CodecError::UnknownAction(self.action))
    }

    pub(crate) fn direction(&self) -> Result<Direction> {
        Direction::from_u8(self.dir).ok_or(CodecError::UnknownDirection(self.dir))
    }

    pub(crate) fn operation(&self) -> Result<Operation> {
        Operation::from_u8(self.op).ok_or(CodecError::UnknownOperation(self.op))
    }
}

fn write_event<T: Serialize + FixedSize>(buf: &mut [u8], raw: &T) -> Result<usize> {
    let mut w = Writer::new(buf);
    w.put(raw)?;
    Ok(w.position())
}

fn read_event(buf: &[u8]) -> Result<RawEvent> {
    Reader::at(buf, HEADER_SIZE).get()
}

fn event_type(buf: &[u8]) -> ActionType {
    read_event(buf)
        .ok()
        .and_then(|e| ActionType::from_u8(e.action))
        .unwrap_or(ActionType::Invalid)
}

pub fn format_single(buf: &mut [u8], action: ActionType, op: Operation, dir: Direction) -> Result<usize> {
    write_event(buf, &RawEvent::new(action, op, dir))
}

pub fn single_dir(buf: &[u8]) -> Result<Direction> {
    read_event(buf)?.direction()
}

pub fn single_type(buf: &[u8]) -> ActionType {
    event_type(buf)
}

pub fn format_schedule(
    buf: &mut [u8],
    action: ActionType,
    op: Operation,
    dir: Direction,
    interval: u32,
) -> Result<usize> {
    write_event(
        buf,
        &RawSchedule {
            event: RawEvent::new(action, op, dir),
            interval,
        },
    )
}

pub fn schedule_dir(buf: &[u8]) -> Result<Direction> {
    read_event(buf)?.direction()
}

pub fn schedule_type(buf: &[u8]) -> ActionType {
    event_type(buf)
}

/// Interval of a schedule event, in milliseconds.
pub fn schedule_interval(buf: &[u8]) -> Result<u32> {
    let raw: RawSchedule = Reader::at(buf, HEADER_SIZE).get()?;
    Ok(raw.interval)
}

pub fn format_trigger(buf: &mut [u8], action: ActionType, op: Operation, dir: Direction) -> Result<usize> {
    write_event(buf, &RawEvent::new(action, op, dir))
}

pub fn trigger_dir(buf: &[u8]) -> Result<Direction> {
    read_event(buf)?.direction()
}

pub fn trigger_op(buf: &[u8]) -> Result<Operation> {
    read_event(buf)?.operation()
}

pub fn trigger_type(buf: &[u8]) -> ActionType {
    event_type(buf)
}
