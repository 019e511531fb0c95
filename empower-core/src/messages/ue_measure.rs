//! UE measurement: trigger asking UEs to measure a neighbour carrier.

use super::{unexpected, Body, Message};
use crate::codec::Result;
use crate::protocol::Operation;
use crate::records::{HeaderId, UeMeasure, UeMeasureRequest};

pub fn format_trigger_uemeas_rep_fail(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    Message::trigger(
        id,
        Operation::Fail,
        Body::UeMeasureReply {
            measures: Vec::new(),
        },
    )
    .encode_into(buf)
}

pub fn format_trigger_uemeas_rep(buf: &mut [u8], id: HeaderId, measures: &[UeMeasure]) -> Result<usize> {
    Message::trigger(
        id,
        Operation::Success,
        Body::UeMeasureReply {
            measures: measures.to_vec(),
        },
    )
    .encode_into(buf)
}

pub fn parse_trigger_uemeas_rep(buf: &[u8]) -> Result<Vec<UeMeasure>> {
    match Message::decode(buf)?.body {
        Body::UeMeasureReply { measures } => Ok(measures),
        other => Err(unexpected("UE measurement reply", &other)),
    }
}

pub fn format_trigger_uemeas_req(
    buf: &mut [u8],
    id: HeaderId,
    op: Operation,
    meas_id: u8,
    pci: u16,
    earfcn: u16,
) -> Result<usize> {
    let req = UeMeasureRequest { meas_id, pci, earfcn };
    Message::trigger(id, op, Body::UeMeasureRequest(req)).encode_into(buf)
}

pub fn parse_trigger_uemeas_req(buf: &[u8]) -> Result<UeMeasureRequest> {
    match Message::decode(buf)?.body {
        Body::UeMeasureRequest(req) => Ok(req),
        other => Err(unexpected("UE measurement request", &other)),
    }
}
