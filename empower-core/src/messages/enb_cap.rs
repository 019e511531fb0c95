//! eNB capabilities: what the base station can do and which cells it serves.

use super::{unexpected, Body, Message};
use crate::codec::Result;
use crate::protocol::{EnbCapabilities, Operation};
use crate::records::{CellDetails, HeaderId};

pub fn format_single_ecap_rep_fail(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    Message::single(
        id,
        Operation::Fail,
        Body::EnbCapReply {
            cap: EnbCapabilities::NOTHING,
            cells: Vec::new(),
        },
    )
    .encode_into(buf)
}

pub fn format_single_ecap_rep(
    buf: &mut [u8],
    id: HeaderId,
    cap: EnbCapabilities,
    cells: &[CellDetails],
) -> Result<usize> {
    Message::single(
        id,
        Operation::Unspecified,
        Body::EnbCapReply {
            cap,
            cells: cells.to_vec(),
        },
    )
    .encode_into(buf)
}

pub fn parse_single_ecap_rep(buf: &[u8]) -> Result<(EnbCapabilities, Vec<CellDetails>)> {
    match Message::decode(buf)?.body {
        Body::EnbCapReply { cap, cells } => Ok((cap, cells)),
        other => Err(unexpected("eNB capabilities reply", &other)),
    }
}

pub fn format_single_ecap_req(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    Message::single(id, Operation::Unspecified, Body::EnbCapRequest).encode_into(buf)
}

pub fn parse_single_ecap_req(buf: &[u8]) -> Result<()> {
    match Message::decode(buf)?.body {
        Body::EnbCapRequest => Ok(()),
        other => Err(unexpected("eNB capabilities request", &other)),
    }
}
