//! Hello: keep-alive exchanged as a single message or on a schedule.

use super::{unexpected, Body, Event, Message};
use crate::codec::{CodecError, Result};
use crate::protocol::Operation;
use crate::records::HeaderId;

pub fn format_single_hello_req(buf: &mut [u8], id: HeaderId, hello_id: u32) -> Result<usize> {
    Message::single(id, Operation::Unspecified, Body::HelloRequest { id: hello_id }).encode_into(buf)
}

pub fn parse_single_hello_req(buf: &[u8]) -> Result<u32> {
    hello_request(buf, false)
}

pub fn format_single_hello_rep(buf: &mut [u8], id: HeaderId, hello_id: u32) -> Result<usize> {
    Message::single(id, Operation::Unspecified, Body::HelloReply { id: hello_id }).encode_into(buf)
}

pub fn parse_single_hello_rep(buf: &[u8]) -> Result<u32> {
    hello_reply(buf, false)
}

/// Scheduled hello request. `interval` is the period in milliseconds.
pub fn format_sched_hello_req(buf: &mut [u8], id: HeaderId, interval: u32, hello_id: u32) -> Result<usize> {
    Message::schedule(id, interval, Operation::Unspecified, Body::HelloRequest { id: hello_id })
        .encode_into(buf)
}

pub fn parse_sched_hello_req(buf: &[u8]) -> Result<u32> {
    hello_request(buf, true)
}

pub fn format_sched_hello_rep(buf: &mut [u8], id: HeaderId, interval: u32, hello_id: u32) -> Result<usize> {
    Message::schedule(id, interval, Operation::Unspecified, Body::HelloReply { id: hello_id })
        .encode_into(buf)
}

pub fn parse_sched_hello_rep(buf: &[u8]) -> Result<u32> {
    hello_reply(buf, true)
}

fn hello_request(buf: &[u8], scheduled: bool) -> Result<u32> {
    let expected = if scheduled { "scheduled hello request" } else { "single hello request" };
    let msg = Message::decode(buf)?;
    match msg.body {
        Body::HelloRequest { id } => check_event(&msg, scheduled, expected).map(|()| id),
        ref other => Err(unexpected(expected, other)),
    }
}

fn hello_reply(buf: &[u8], scheduled: bool) -> Result<u32> {
    let expected = if scheduled { "scheduled hello reply" } else { "single hello reply" };
    let msg = Message::decode(buf)?;
    match msg.body {
        Body::HelloReply { id } => check_event(&msg, scheduled, expected).map(|()| id),
        ref other => Err(unexpected(expected, other)),
    }
}

/// Single and scheduled hellos share a body; only the event header tells them apart.
fn check_event(msg: &Message, scheduled: bool, expected: &'static str) -> Result<()> {
    let ok = match msg.event {
        Event::Single => !scheduled,
        Event::Schedule { .. } => scheduled,
        Event::Trigger => false,
    };
    if ok {
        return Ok(());
    }
    Err(CodecError::UnexpectedMessage {
        expected,
        found: format!("{} in a {:?} event", msg.body, msg.event),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{schedule_interval, schedule_type};
    use crate::header::{msg_length, msg_type, HEADER_SIZE};
    use crate::protocol::{ActionType, MsgType};

    const ID: HeaderId = HeaderId {
        enb_id: 1,
        cell_id: 0,
        mod_id: 0,
    };

    #[test]
    fn sched_hello_request() {
        let mut buf = [0u8; 64];
        let n = format_sched_hello_req(&mut buf, ID, 2000, 0x0102_0304).unwrap();
        assert_eq!(n, HEADER_SIZE + 7 + 4);
        assert_eq!(msg_length(&buf).unwrap() as usize, n);
        assert_eq!(msg_type(&buf), MsgType::Schedule);
        assert_eq!(schedule_type(&buf), ActionType::Hello);
        assert_eq!(schedule_interval(&buf).unwrap(), 2000);
        assert_eq!(&buf[n - 4..n], &[1, 2, 3, 4]);
        assert_eq!(parse_sched_hello_req(&buf[..n]).unwrap(), 0x0102_0304);
    }

    #[test]
    fn single_hello_reply() {
        let mut buf = [0u8; 32];
        let n = format_single_hello_rep(&mut buf, ID, 5).unwrap();
        assert_eq!(n, HEADER_SIZE + 3 + 4);
        assert_eq!(parse_single_hello_rep(&buf).unwrap(), 5);
        assert!(matches!(
            parse_single_hello_req(&buf),
            Err(CodecError::UnexpectedMessage { .. })
        ));
    }

    #[test]
    fn event_kind_must_match() {
        let mut buf = [0u8; 64];
        let n = format_single_hello_req(&mut buf, ID, 9).unwrap();
        assert_eq!(parse_single_hello_req(&buf[..n]).unwrap(), 9);
        assert!(matches!(
            parse_sched_hello_req(&buf[..n]),
            Err(CodecError::UnexpectedMessage { .. })
        ));

        let n = format_sched_hello_rep(&mut buf, ID, 2000, 9).unwrap();
        assert_eq!(parse_sched_hello_rep(&buf[..n]).unwrap(), 9);
        assert!(matches!(
            parse_single_hello_rep(&buf[..n]),
            Err(CodecError::UnexpectedMessage { .. })
        ));

        let trigger = Message::trigger(ID, Operation::Unspecified, Body::HelloRequest { id: 9 })
            .encode()
            .unwrap();
        assert!(parse_single_hello_req(&trigger).is_err());
        assert!(parse_sched_hello_req(&trigger).is_err());
    }

    #[test]
    fn too_small_buffer() {
        let mut buf = [0u8; 20];
        assert!(format_single_hello_req(&mut buf, ID, 1).is_err());
        assert!(format_sched_hello_rep(&mut buf, ID, 1, 1).is_err());
    }
}
