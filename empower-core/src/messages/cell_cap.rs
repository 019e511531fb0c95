//! Cell capabilities: parameters of the cell addressed by the header.

use super::{unexpected, Body, Message};
use crate::codec::Result;
use crate::protocol::Operation;
use crate::records::{CellDetails, HeaderId};

pub fn format_single_ccap_rep_fail(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    Message::single(id, Operation::Fail, Body::CellCapReply(CellDetails::default())).encode_into(buf)
}

pub fn format_single_ccap_rep(buf: &mut [u8], id: HeaderId, cell: &CellDetails) -> Result<usize> {
    Message::single(id, Operation::Unspecified, Body::CellCapReply(*cell)).encode_into(buf)
}

pub fn parse_single_ccap_rep(buf: &[u8]) -> Result<CellDetails> {
    match Message::decode(buf)?.body {
        Body::CellCapReply(cell) => Ok(cell),
        other => Err(unexpected("cell capabilities reply", &other)),
    }
}

pub fn format_single_ccap_req(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    Message::single(id, Operation::Unspecified, Body::CellCapRequest).encode_into(buf)
}

pub fn parse_single_ccap_req(buf: &[u8]) -> Result<()> {
    match Message::decode(buf)?.body {
        Body::CellCapRequest => Ok(()),
        other => Err(unexpected("cell capabilities request", &other)),
    }
}
