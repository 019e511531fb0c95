//! An eNB backend that answers from its configuration instead of a live stack.

use empower_core::messages::{Body, Message};
use empower_core::ops::{AgentOps, OpsError, OpsResult, Outbox};
use empower_core::protocol::{
    EnbCapabilities, Operation, ENB_CAP_MAX_CELLS, UE_MEASURE_MAX_UES, UE_MEAS_ANY_EARFCN,
    UE_MEAS_ANY_PCI,
};
use empower_core::records::{MacReport, UeMeasure};
use tracing::debug;

use crate::config::{CellConfig, UeConfig};

pub struct StaticEnb {
    cells: Vec<CellConfig>,
    ues: Vec<UeConfig>,
}

impl StaticEnb {
    pub fn new(cells: Vec<CellConfig>, ues: Vec<UeConfig>) -> Self {
        Self { cells, ues }
    }

    fn capabilities(&self) -> EnbCapabilities {
        let mut cap = EnbCapabilities::UE_REPORT;
        if self.ues.iter().any(|ue| !ue.measurements.is_empty()) {
            cap |= EnbCapabilities::UE_MEASURE;
        }
        cap
    }
}

fn push(out: &mut Outbox, msg: Message) -> OpsResult {
    out.push(&msg).map_err(|e| OpsError::Failed(e.to_string()))
}

impl AgentOps for StaticEnb {
    fn enb_setup_request(&mut self, out: &mut Outbox, mod_id: u32) -> OpsResult {
        let cells = self
            .cells
            .iter()
            .take(ENB_CAP_MAX_CELLS)
            .map(CellConfig::details)
            .collect();
        let reply = Body::EnbCapReply {
            cap: self.capabilities(),
            cells,
        };
        let id = out.header(0, mod_id);
        push(out, Message::single(id, Operation::Unspecified, reply))
    }

    fn cell_setup_request(&mut self, out: &mut Outbox, mod_id: u32, cell_id: u16) -> OpsResult {
        let cell = self
            .cells
            .iter()
            .find(|c| c.pci == cell_id)
            .ok_or_else(|| OpsError::Failed(format!("unknown cell {cell_id}")))?;
        let reply = Body::CellCapReply(cell.details());
        let id = out.header(cell_id, mod_id);
        push(out, Message::single(id, Operation::Unspecified, reply))
    }

    fn ue_report(&mut self, out: &mut Outbox, mod_id: u32, trigger_id: u32) -> OpsResult {
        debug!(trigger_id, ues = self.ues.len(), "UE report");
        let ues = self.ues.iter().map(UeConfig::details).collect();
        let reply = Body::UeReportReply { ues };
        let id = out.header(0, mod_id);
        push(out, Message::trigger(id, Operation::Success, reply))
    }

    fn ue_measure(
        &mut self,
        out: &mut Outbox,
        mod_id: u32,
        trigger_id: u32,
        meas_id: u8,
        pci: u16,
        earfcn: u16,
    ) -> OpsResult {
        let measures: Vec<UeMeasure> = self
            .ues
            .iter()
            .flat_map(|ue| {
                ue.measurements
                    .iter()
                    .filter(|m| pci == UE_MEAS_ANY_PCI || m.pci == pci)
                    .filter(|m| earfcn == UE_MEAS_ANY_EARFCN || m.earfcn == earfcn)
                    .map(move |m| UeMeasure {
                        meas_id,
                        rnti: ue.rnti,
                        pci: m.pci,
                        earfcn: m.earfcn,
                        rsrp: m.rsrp,
                        rsrq: m.rsrq,
                    })
            })
            .take(UE_MEASURE_MAX_UES)
            .collect();
        debug!(trigger_id, meas_id, found = measures.len(), "UE measurement");
        let reply = Body::UeMeasureReply { measures };
        let id = out.header(0, mod_id);
        push(out, Message::trigger(id, Operation::Success, reply))
    }

    /// MAC usage is modelled for one cell only: the report always describes the
    /// first configured cell, whatever cell the trigger addressed.
    fn mac_report(&mut self, out: &mut Outbox, mod_id: u32, _interval: u16, _trigger_id: u32) -> OpsResult {
        let cell = self.cells.first().ok_or(OpsError::NotSupported)?;
        let report = MacReport {
            dl_prbs_total: cell.dl_prbs,
            dl_prbs_used: cell.dl_prbs_used,
            ul_prbs_total: cell.ul_prbs,
            ul_prbs_used: cell.ul_prbs_used,
        };
        let id = out.header(cell.pci, mod_id);
        push(out, Message::trigger(id, Operation::Success, Body::MacReportReply(report)))
    }
}
