//! Handover: the controller moves a UE to another cell or eNB.

use super::{unexpected, Body, Message};
use crate::codec::Result;
use crate::protocol::{HandoverCause, Operation};
use crate::records::{HandoverReply, HandoverRequest, HeaderId};

fn reply(buf: &mut [u8], id: HeaderId, op: Operation, rep: HandoverReply) -> Result<usize> {
    Message::single(id, op, Body::HandoverReply(rep)).encode_into(buf)
}

pub fn format_single_ho_rep_fail(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    reply(buf, id, Operation::Fail, HandoverReply::default())
}

pub fn format_single_ho_rep_ns(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    reply(buf, id, Operation::NotSupported, HandoverReply::default())
}

pub fn format_single_ho_rep(
    buf: &mut [u8],
    id: HeaderId,
    origin_enb: u32,
    origin_pci: u16,
    origin_rnti: u16,
    target_rnti: u16,
) -> Result<usize> {
    let rep = HandoverReply {
        origin_enb,
        origin_pci,
        origin_rnti,
        target_rnti,
    };
    reply(buf, id, Operation::Success, rep)
}

pub fn parse_single_ho_rep(buf: &[u8]) -> Result<HandoverReply> {
    match Message::decode(buf)?.body {
        Body::HandoverReply(rep) => Ok(rep),
        other => Err(unexpected("handover reply", &other)),
    }
}

pub fn format_single_ho_req(
    buf: &mut [u8],
    id: HeaderId,
    rnti: u16,
    target_enb: u32,
    target_pci: u16,
    cause: HandoverCause,
) -> Result<usize> {
    let req = HandoverRequest {
        rnti,
        target_enb,
        target_pci,
        cause: cause as u8,
    };
    Message::single(id, Operation::Unspecified, Body::HandoverRequest(req)).encode_into(buf)
}

pub fn parse_single_ho_req(buf: &[u8]) -> Result<HandoverRequest> {
    match Message::decode(buf)?.body {
        Body::HandoverRequest(req) => Ok(req),
        other => Err(unexpected("handover request", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::single_dir;
    use crate::header::HEADER_SIZE;
    use crate::protocol::Direction;

    #[test]
    fn request_layout() {
        let mut buf = [0u8; 64];
        let n = format_single_ho_req(
            &mut buf,
            HeaderId::new(1, 1, 0),
            0x4601,
            0x0000_0002,
            7,
            HandoverCause::Critical,
        )
        .unwrap();
        assert_eq!(n, HEADER_SIZE + 3 + 9);
        assert_eq!(&buf[HEADER_SIZE + 3..n], &[0x46, 0x01, 0, 0, 0, 2, 0, 7, 1]);
        let req = parse_single_ho_req(&buf).unwrap();
        assert_eq!(req.rnti, 0x4601);
        assert_eq!(req.cause(), Some(HandoverCause::Critical));
    }

    #[test]
    fn reply_fields() {
        let mut buf = [0u8; 64];
        format_single_ho_rep(&mut buf, HeaderId::default(), 0x0001_0000, 3, 0x4601, 0x4702).unwrap();
        assert_eq!(single_dir(&buf).unwrap(), Direction::Reply);
        let rep = parse_single_ho_rep(&buf).unwrap();
        assert_eq!(rep.origin_enb, 0x0001_0000);
        assert_eq!(rep.target_rnti, 0x4702);
    }

    #[test]
    fn not_supported_reply() {
        let mut buf = [0u8; 64];
        let n = format_single_ho_rep_ns(&mut buf, HeaderId::default()).unwrap();
        assert_eq!(n, HEADER_SIZE + 3 + 10);
        assert_eq!(buf[HEADER_SIZE + 2], Operation::NotSupported as u8);
        assert_eq!(parse_single_ho_rep(&buf).unwrap(), HandoverReply::default());
        assert!(parse_single_ho_req(&buf).is_err());
    }
}
