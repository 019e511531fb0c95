//! Callbacks an eNB implementation provides to its agent.

use crate::codec::CodecError;
use crate::messages::Message;
use crate::records::HeaderId;

/// Outcome of a callback that could not serve the request.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    /// The eNB cannot perform this operation; the controller gets a negative reply.
    #[error("operation not supported")]
    NotSupported,
    #[error("operation failed: {0}")]
    Failed(String),
}

pub type OpsResult = Result<(), OpsError>;

/// Replies queued by a callback. The agent numbers and sends them in order.
#[derive(Debug)]
pub struct Outbox {
    enb_id: u32,
    messages: Vec<Vec<u8>>,
}

impl Outbox {
    pub fn new(enb_id: u32) -> Self {
        Self {
            enb_id,
            messages: Vec::new(),
        }
    }

    /// Id of the eNB this agent speaks for.
    pub fn enb_id(&self) -> u32 {
        self.enb_id
    }

    /// Header ids for a reply about `cell_id` of module `mod_id`.
    pub fn header(&self, cell_id: u16, mod_id: u32) -> HeaderId {
        HeaderId::new(self.enb_id, cell_id, mod_id)
    }

    pub fn push(&mut self, msg: &Message) -> Result<(), CodecError> {
        self.messages.push(msg.encode()?);
        Ok(())
    }

    /// Queue a message encoded with one of the flat formatters.
    pub fn push_raw(&mut self, raw: Vec<u8>) {
        self.messages.push(raw);
    }

    /// Messages queued so far, in send order.
    pub fn messages(&self) -> &[Vec<u8>] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn into_messages(self) -> Vec<Vec<u8>> {
        self.messages
    }
}

/// Operations the agent delegates to the eNB.
///
/// Request callbacks receive an [`Outbox`] for their replies. Returning
/// [`OpsError::NotSupported`] or [`OpsError::Failed`] makes the agent answer
/// with the matching negative reply instead. Unimplemented request callbacks
/// are not supported.
pub trait AgentOps: Send {
    /// Called once before the agent starts. An error keeps the agent from starting.
    fn init(&mut self) -> OpsResult {
        Ok(())
    }

    fn release(&mut self) -> OpsResult {
        Ok(())
    }

    /// The controller connection dropped; every trigger has been flushed.
    fn disconnected(&mut self) -> OpsResult {
        Ok(())
    }

    fn cell_setup_request(&mut self, _out: &mut Outbox, _mod_id: u32, _cell_id: u16) -> OpsResult {
        Err(OpsError::NotSupported)
    }

    fn enb_setup_request(&mut self, _out: &mut Outbox, _mod_id: u32) -> OpsResult {
        Err(OpsError::NotSupported)
    }

    fn ue_report(&mut self, _out: &mut Outbox, _mod_id: u32, _trigger_id: u32) -> OpsResult {
        Err(OpsError::NotSupported)
    }

    fn ue_measure(
        &mut self,
        _out: &mut Outbox,
        _mod_id: u32,
        _trigger_id: u32,
        _meas_id: u8,
        _pci: u16,
        _earfcn: u16,
    ) -> OpsResult {
        Err(OpsError::NotSupported)
    }

    #[allow(clippy::too_many_arguments)]
    fn handover_ue(
        &mut self,
        _out: &mut Outbox,
        _mod_id: u32,
        _source_cell: u16,
        _rnti: u16,
        _target_enb: u32,
        _target_cell: u16,
        _cause: u8,
    ) -> OpsResult {
        Err(OpsError::NotSupported)
    }

    /// `interval` is the report period in milliseconds.
    fn mac_report(&mut self, _out: &mut Outbox, _mod_id: u32, _interval: u16, _trigger_id: u32) -> OpsResult {
        Err(OpsError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Body;
    use crate::protocol::Operation;

    struct Nothing;
    impl AgentOps for Nothing {}

    #[test]
    fn defaults_are_not_supported() {
        let mut ops = Nothing;
        let mut out = Outbox::new(1);
        assert!(ops.init().is_ok());
        assert!(matches!(
            ops.enb_setup_request(&mut out, 0),
            Err(OpsError::NotSupported)
        ));
        assert!(matches!(
            ops.mac_report(&mut out, 0, 100, 9),
            Err(OpsError::NotSupported)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn outbox_encodes_messages() {
        let mut out = Outbox::new(42);
        let id = out.header(3, 7);
        assert_eq!(id, HeaderId::new(42, 3, 7));
        out.push(&Message::single(id, Operation::Unspecified, Body::CellCapRequest))
            .unwrap();
        out.push_raw(vec![1, 2, 3]);
        let msgs = out.into_messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].len(), 18 + 3 + 1);
    }
}
