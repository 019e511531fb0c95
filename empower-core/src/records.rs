//! Fixed-width records carried inside message bodies.
//!
//! Field order is wire order: each struct encodes to its packed big-endian layout.

use serde::{Deserialize, Serialize};

use crate::codec::FixedSize;
use crate::protocol::{CellCapabilities, HandoverCause};

/// Identifiers carried by every master header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HeaderId {
    pub enb_id: u32,
    pub cell_id: u16,
    pub mod_id: u32,
}

impl HeaderId {
    pub fn new(enb_id: u32, cell_id: u16, mod_id: u32) -> Self {
        Self {
            enb_id,
            cell_id,
            mod_id,
        }
    }
}

/// Parameters of one cell: physical id, capabilities, carriers and PRB counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellDetails {
    pub pci: u16,
    pub cap: CellCapabilities,
    pub dl_earfcn: u16,
    pub dl_prbs: u8,
    pub ul_earfcn: u16,
    pub ul_prbs: u8,
}

/// Identity of a UE attached to the eNB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UeDetails {
    pub pci: u16,
    pub plmn: u32,
    pub rnti: u16,
    pub imsi: u64,
}

/// One radio measurement reported for a UE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UeMeasure {
    pub meas_id: u8,
    pub rnti: u16,
    pub pci: u16,
    pub earfcn: u16,
    pub rsrp: i16,
    pub rsrq: i16,
}

/// PRB usage of a cell over the last report interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacReport {
    pub dl_prbs_total: u8,
    pub dl_prbs_used: u32,
    pub ul_prbs_total: u8,
    pub ul_prbs_used: u32,
}

/// Measurement the controller asks a UE to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UeMeasureRequest {
    pub meas_id: u8,
    pub pci: u16,
    pub earfcn: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandoverRequest {
    pub rnti: u16,
    pub target_enb: u32,
    pub target_pci: u16,
    pub cause: u8,
}

impl HandoverRequest {
    pub fn cause(&self) -> Option<HandoverCause> {
        HandoverCause::from_u8(self.cause)
    }
}

/// Outcome of a hand-over, as seen from the source eNB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandoverReply {
    pub origin_enb: u32,
    pub origin_pci: u16,
    pub origin_rnti: u16,
    pub target_rnti: u16,
}

impl FixedSize for HeaderId {
    const SIZE: usize = 10;
}
impl FixedSize for CellDetails {
    const SIZE: usize = 12;
}
impl FixedSize for UeDetails {
    const SIZE: usize = 16;
}
impl FixedSize for UeMeasure {
    const SIZE: usize = 11;
}
impl FixedSize for MacReport {
    const SIZE: usize = 10;
}
impl FixedSize for UeMeasureRequest {
    const SIZE: usize = 5;
}
impl FixedSize for HandoverRequest {
    const SIZE: usize = 9;
}
impl FixedSize for HandoverReply {
    const SIZE: usize = 10;
}
