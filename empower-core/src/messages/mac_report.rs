//! MAC report: periodic PRB usage of a cell.

use super::{unexpected, Body, Message};
use crate::codec::Result;
use crate::protocol::Operation;
use crate::records::{HeaderId, MacReport};

fn reply(buf: &mut [u8], id: HeaderId, op: Operation, report: MacReport) -> Result<usize> {
    Message::trigger(id, op, Body::MacReportReply(report)).encode_into(buf)
}

pub fn format_trigger_macrep_rep_fail(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    reply(buf, id, Operation::Fail, MacReport::default())
}

pub fn format_trigger_macrep_rep_ns(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    reply(buf, id, Operation::NotSupported, MacReport::default())
}

pub fn format_trigger_macrep_rep(buf: &mut [u8], id: HeaderId, report: &MacReport) -> Result<usize> {
    reply(buf, id, Operation::Success, *report)
}

pub fn parse_trigger_macrep_rep(buf: &[u8]) -> Result<MacReport> {
    match Message::decode(buf)?.body {
        Body::MacReportReply(report) => Ok(report),
        other => Err(unexpected("MAC report reply", &other)),
    }
}

/// MAC report request; `interval` is the report period in milliseconds.
pub fn format_trigger_macrep_req(buf: &mut [u8], id: HeaderId, interval: u16) -> Result<usize> {
    Message::trigger(id, Operation::Unspecified, Body::MacReportRequest { interval }).encode_into(buf)
}

pub fn parse_trigger_macrep_req(buf: &[u8]) -> Result<u16> {
    match Message::decode(buf)?.body {
        Body::MacReportRequest { interval } => Ok(interval),
        other => Err(unexpected("MAC report request", &other)),
    }
}
