//! UE report: trigger listing the UEs attached to the eNB.

use super::{unexpected, Body, Message};
use crate::codec::Result;
use crate::protocol::Operation;
use crate::records::{HeaderId, UeDetails};

pub fn format_trigger_uerep_rep_fail(buf: &mut [u8], id: HeaderId) -> Result<usize> {
    Message::trigger(id, Operation::Fail, Body::UeReportReply { ues: Vec::new() }).encode_into(buf)
}

/// Write at most `max_ues` records; the advertised count matches what is written.
pub fn format_trigger_uerep_rep(
    buf: &mut [u8],
    id: HeaderId,
    ues: &[UeDetails],
    max_ues: usize,
) -> Result<usize> {
    let ues = ues[..ues.len().min(max_ues)].to_vec();
    Message::trigger(id, Operation::Success, Body::UeReportReply { ues }).encode_into(buf)
}

/// Returns the advertised UE count and at most `max_ues` records.
pub fn parse_trigger_uerep_rep(buf: &[u8], max_ues: usize) -> Result<(u32, Vec<UeDetails>)> {
    match Message::decode(buf)?.body {
        Body::UeReportReply { mut ues } => {
            let declared = ues.len() as u32;
            ues.truncate(max_ues);
            Ok((declared, ues))
        }
        other => Err(unexpected("UE report reply", &other)),
    }
}

/// UE report request; `op` is `Add` to start reporting or `Rem` to stop.
pub fn format_trigger_uerep_req(buf: &mut [u8], id: HeaderId, op: Operation) -> Result<usize> {
    Message::trigger(id, op, Body::UeReportRequest).encode_into(buf)
}

pub fn parse_trigger_uerep_req(buf: &[u8]) -> Result<()> {
    match Message::decode(buf)?.body {
        Body::UeReportRequest => Ok(()),
        other => Err(unexpected("UE report request", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{trigger_op, trigger_type};
    use crate::header::HEADER_SIZE;
    use crate::protocol::ActionType;

    fn ues(n: u16) -> Vec<UeDetails> {
        (0..n)
            .map(|i| UeDetails {
                pci: 1,
                plmn: 0x22f810,
                rnti: 0x4600 + i,
                imsi: 222_010_000_000_000 + u64::from(i),
            })
            .collect()
    }

    #[test]
    fn reply_is_capped_at_max() {
        let mut buf = [0u8; 256];
        let n = format_trigger_uerep_rep(&mut buf, HeaderId::default(), &ues(5), 3).unwrap();
        assert_eq!(n, HEADER_SIZE + 3 + 4 + 3 * 16);
        assert_eq!(&buf[HEADER_SIZE + 3..HEADER_SIZE + 7], &3u32.to_be_bytes());
        let (declared, parsed) = parse_trigger_uerep_rep(&buf, 2).unwrap();
        assert_eq!(declared, 3);
        assert_eq!(parsed, ues(2));
    }

    #[test]
    fn fail_reply() {
        let mut buf = [0u8; 64];
        format_trigger_uerep_rep_fail(&mut buf, HeaderId::default()).unwrap();
        assert_eq!(trigger_op(&buf).unwrap(), Operation::Fail);
        assert_eq!(parse_trigger_uerep_rep(&buf, 8).unwrap(), (0, vec![]));
    }

    #[test]
    fn request_carries_op() {
        let mut buf = [0u8; 32];
        let n = format_trigger_uerep_req(&mut buf, HeaderId::new(1, 0, 3), Operation::Rem).unwrap();
        assert_eq!(n, HEADER_SIZE + 3 + 1);
        assert_eq!(trigger_type(&buf), ActionType::UeReport);
        assert_eq!(trigger_op(&buf).unwrap(), Operation::Rem);
        parse_trigger_uerep_req(&buf).unwrap();
    }
}
