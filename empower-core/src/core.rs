//! Host-driven agent: AgentCore receives connection events, controller messages
//! and clock ticks from the host, and returns the frames to write.

use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::codec::{self, CodecError};
use crate::header;
use crate::messages::{self, Body, Event, Message};
use crate::ops::{AgentOps, OpsError, OpsResult, Outbox};
use crate::protocol::{ActionType, Operation};
use crate::records::HeaderId;
use crate::scheduler::{Job, JobType, Repeat, SchedError, Scheduler};
use crate::triggers::{TriggerKey, TriggerTable, TriggerType};
use crate::wire;

/// Default period of the hello job.
pub const DEFAULT_HELLO_INTERVAL: Duration = Duration::from_millis(2000);

/// Default limit on the size of one outgoing message.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

const DISSECT: &str = "empower::dissect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub hello_interval: Duration,
    pub max_message_size: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            hello_interval: DEFAULT_HELLO_INTERVAL,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent init failed: {0}")]
    Init(#[source] OpsError),
    #[error("agent release failed: {0}")]
    Release(#[source] OpsError),
    #[error("not connected to the controller")]
    NotConnected,
    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    TooLong { size: usize, limit: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Sched(#[from] SchedError),
}

/// One agent: the state behind a single eNB's controller session.
pub struct AgentCore {
    enb_id: u32,
    ops: Box<dyn AgentOps>,
    settings: AgentSettings,
    sched: Scheduler,
    triggers: TriggerTable,
    seq: u32,
    connected: bool,
}

impl AgentCore {
    pub fn new(enb_id: u32, ops: Box<dyn AgentOps>, settings: AgentSettings) -> Self {
        Self {
            enb_id,
            ops,
            settings,
            sched: Scheduler::new(),
            triggers: TriggerTable::new(),
            seq: 0,
            connected: false,
        }
    }

    pub fn enb_id(&self) -> u32 {
        self.enb_id
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Run the eNB's init callback. The agent must not start if this fails.
    pub fn init(&mut self) -> Result<(), AgentError> {
        self.ops.init().map_err(AgentError::Init)?;
        info!(enb_id = self.enb_id, "agent initialized");
        Ok(())
    }

    /// Flush all state, stop the scheduler and run the release callback.
    pub fn release(&mut self) -> Result<(), AgentError> {
        self.triggers.flush();
        self.sched.stop();
        self.connected = false;
        self.ops.release().map_err(AgentError::Release)?;
        info!(enb_id = self.enb_id, "agent released");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn has_trigger(&self, id: u32) -> bool {
        self.triggers.has_trigger(id)
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }

    /// The controller connection is up: start the hello job.
    pub fn on_connected(&mut self, now: Instant) {
        if self.connected {
            return;
        }
        self.connected = true;
        info!(enb_id = self.enb_id, "connected to controller");
        let hello = Job::new(
            0,
            JobType::Hello,
            self.settings.hello_interval,
            Repeat::Forever,
            Vec::new(),
        );
        if let Err(e) = self.sched.add(hello, now) {
            warn!(error = %e, "cannot schedule hello");
        }
    }

    /// The controller connection dropped: flush jobs and triggers, reset numbering.
    pub fn on_disconnected(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.sched.clear();
        let flushed = self.triggers.flush();
        self.seq = 0;
        info!(enb_id = self.enb_id, triggers = flushed, "disconnected from controller");
        if let Err(e) = self.ops.disconnected() {
            warn!(error = %e, "disconnected callback failed");
        }
    }

    /// Handle one message received from the controller.
    pub fn on_message(&mut self, bytes: &[u8], now: Instant) -> Result<(), AgentError> {
        if tracing::enabled!(target: DISSECT, tracing::Level::TRACE) {
            trace!(target: DISSECT, len = bytes.len(), "<-- {}", wire::hex_dump(bytes));
        }
        let msg = Message::decode(bytes)?;
        match (msg.event, &msg.body) {
            (_, Body::HelloRequest { .. } | Body::HelloReply { .. }) => {
                debug!(seq = msg.seq, "hello from controller");
            }
            (Event::Single, Body::EnbCapRequest) => {
                self.schedule_request(JobType::EnbSetup, &msg, bytes, now)?
            }
            (Event::Single, Body::CellCapRequest) => {
                self.schedule_request(JobType::CellSetup, &msg, bytes, now)?
            }
            (Event::Single, Body::HandoverRequest(_)) => {
                self.schedule_request(JobType::Handover, &msg, bytes, now)?
            }
            (Event::Trigger, Body::UeReportRequest) => {
                self.on_trigger_request(&msg, TriggerType::UeReport, 0, bytes)?
            }
            (Event::Trigger, Body::UeMeasureRequest(req)) => {
                let instance = req.meas_id as u32;
                self.on_trigger_request(&msg, TriggerType::UeMeasure, instance, bytes)?
            }
            (Event::Trigger, Body::MacReportRequest { .. }) => {
                self.on_trigger_request(&msg, TriggerType::MacReport, 0, bytes)?
            }
            (event, body) => debug!(?event, %body, "ignoring message"),
        }
        Ok(())
    }

    /// Queue an already encoded message for the controller.
    pub fn send(&mut self, raw: Vec<u8>, now: Instant) -> Result<(), AgentError> {
        if !self.connected {
            return Err(AgentError::NotConnected);
        }
        if raw.len() > self.settings.max_message_size {
            return Err(AgentError::TooLong {
                size: raw.len(),
                limit: self.settings.max_message_size,
            });
        }
        self.sched
            .add(Job::new(0, JobType::Send, Duration::ZERO, Repeat::Once, raw), now)?;
        Ok(())
    }

    /// Run the jobs due at `now`. Returns framed messages, in send order.
    pub fn tick(&mut self, now: Instant) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        if !self.connected {
            return frames;
        }
        for job in self.sched.take_due(now) {
            for raw in self.perform(&job) {
                self.emit(raw, &mut frames);
            }
            if self.job_alive(&job) {
                self.sched.requeue(job, now);
            }
        }
        frames
    }

    fn schedule_request(
        &mut self,
        job_type: JobType,
        msg: &Message,
        raw: &[u8],
        now: Instant,
    ) -> Result<(), AgentError> {
        let job = Job::new(msg.seq, job_type, Duration::ZERO, Repeat::Once, raw.to_vec());
        self.sched.add(job, now)?;
        Ok(())
    }

    fn on_trigger_request(
        &mut self,
        msg: &Message,
        kind: TriggerType,
        instance: u32,
        raw: &[u8],
    ) -> Result<(), AgentError> {
        let key = TriggerKey {
            mod_id: msg.id.mod_id,
            kind,
            instance,
        };
        match msg.op {
            Operation::Rem => {
                if let Some(t) = self.triggers.del(&key) {
                    let jobs = self.sched.remove(t.id, kind.job_type());
                    debug!(id = t.id, ?key, jobs, "trigger removed");
                }
            }
            Operation::Add | Operation::Unspecified => {
                // A repeated request replaces the stored one; later jobs read its parameters.
                let id = match self.triggers.has_trigger_ext(&key).map(|t| t.id) {
                    Some(id) => {
                        self.triggers.set_request(id, raw.to_vec());
                        id
                    }
                    None => self.triggers.add(key, raw.to_vec()).id,
                };
                let job = match msg.body {
                    Body::MacReportRequest { interval } => {
                        let replaced = self.sched.remove(id, JobType::MacReport);
                        if replaced > 0 {
                            debug!(id, interval, "MAC report rescheduled");
                        }
                        if interval > 0 {
                            Job::new(
                                id,
                                JobType::MacReport,
                                Duration::from_millis(interval as u64),
                                Repeat::Forever,
                                Vec::new(),
                            )
                        } else {
                            Job::new(id, JobType::MacReport, Duration::ZERO, Repeat::Once, Vec::new())
                        }
                    }
                    _ => Job::new(id, kind.job_type(), Duration::ZERO, Repeat::Once, Vec::new()),
                };
                self.sched.add_due(job)?;
            }
            op => debug!(?op, ?key, "ignoring trigger operation"),
        }
        Ok(())
    }

    /// Trigger jobs end with their trigger.
    fn job_alive(&self, job: &Job) -> bool {
        match job.job_type {
            JobType::UeReport | JobType::UeMeasure | JobType::MacReport => {
                self.triggers.has_trigger(job.id)
            }
            _ => true,
        }
    }

    fn perform(&mut self, job: &Job) -> Vec<Vec<u8>> {
        match job.job_type {
            JobType::Send => vec![job.args.clone()],
            JobType::Hello => {
                let interval = u32::try_from(job.elapse.as_millis()).unwrap_or(u32::MAX);
                let hello = Message::schedule(
                    HeaderId::new(self.enb_id, 0, 0),
                    interval,
                    Operation::Unspecified,
                    Body::HelloRequest { id: 0 },
                );
                match hello.encode() {
                    Ok(raw) => vec![raw],
                    Err(e) => {
                        warn!(error = %e, "cannot encode hello");
                        Vec::new()
                    }
                }
            }
            JobType::EnbSetup | JobType::CellSetup | JobType::Handover => {
                let Some(req) = decode_stored(&job.args) else {
                    return Vec::new();
                };
                self.perform_request(job.job_type, &req)
            }
            JobType::UeReport | JobType::UeMeasure | JobType::MacReport => {
                let Some(trigger) = self.triggers.find(job.id) else {
                    debug!(id = job.id, job = %job.job_type, "trigger gone, job skipped");
                    return Vec::new();
                };
                let trigger_id = trigger.id;
                let Some(req) = decode_stored(&trigger.request) else {
                    return Vec::new();
                };
                self.perform_trigger(trigger_id, &req)
            }
        }
    }

    fn perform_request(&mut self, job_type: JobType, req: &Message) -> Vec<Vec<u8>> {
        let mod_id = req.id.mod_id;
        let cell_id = req.id.cell_id;
        let reply_id = HeaderId::new(self.enb_id, cell_id, mod_id);
        match (job_type, &req.body) {
            (JobType::EnbSetup, _) => self.run_callback(ActionType::EnbCap, reply_id, |ops, out| {
                ops.enb_setup_request(out, mod_id)
            }),
            (JobType::CellSetup, _) => self.run_callback(ActionType::CellCap, reply_id, |ops, out| {
                ops.cell_setup_request(out, mod_id, cell_id)
            }),
            (JobType::Handover, Body::HandoverRequest(ho)) => {
                let ho = *ho;
                self.run_callback(ActionType::Handover, reply_id, |ops, out| {
                    ops.handover_ue(
                        out,
                        mod_id,
                        cell_id,
                        ho.rnti,
                        ho.target_enb,
                        ho.target_pci,
                        ho.cause,
                    )
                })
            }
            (job_type, body) => {
                warn!(job = %job_type, %body, "stored request does not match job");
                Vec::new()
            }
        }
    }

    fn perform_trigger(&mut self, trigger_id: u32, req: &Message) -> Vec<Vec<u8>> {
        let mod_id = req.id.mod_id;
        let reply_id = HeaderId::new(self.enb_id, req.id.cell_id, mod_id);
        match &req.body {
            Body::UeReportRequest => self.run_callback(ActionType::UeReport, reply_id, |ops, out| {
                ops.ue_report(out, mod_id, trigger_id)
            }),
            Body::UeMeasureRequest(m) => {
                let m = *m;
                self.run_callback(ActionType::UeMeasure, reply_id, |ops, out| {
                    ops.ue_measure(out, mod_id, trigger_id, m.meas_id, m.pci, m.earfcn)
                })
            }
            Body::MacReportRequest { interval } => {
                let interval = *interval;
                self.run_callback(ActionType::MacReport, reply_id, |ops, out| {
                    ops.mac_report(out, mod_id, interval, trigger_id)
                })
            }
            body => {
                warn!(trigger_id, %body, "stored trigger request not understood");
                Vec::new()
            }
        }
    }

    /// Run one callback and collect its replies, plus a negative reply on error.
    fn run_callback<F>(&mut self, action: ActionType, reply_id: HeaderId, f: F) -> Vec<Vec<u8>>
    where
        F: FnOnce(&mut dyn AgentOps, &mut Outbox) -> OpsResult,
    {
        let mut out = Outbox::new(self.enb_id);
        let result = f(self.ops.as_mut(), &mut out);
        let mut replies = out.into_messages();
        if let Err(e) = result {
            match e {
                OpsError::NotSupported => debug!(%action, "request not supported by eNB"),
                OpsError::Failed(ref reason) => warn!(%action, %reason, "request failed"),
            }
            match negative_reply(action, &e, reply_id) {
                Ok(Some(raw)) => replies.push(raw),
                Ok(None) => {}
                Err(err) => warn!(%action, error = %err, "cannot encode negative reply"),
            }
        }
        replies
    }

    /// Number, frame and queue one outgoing message.
    fn emit(&mut self, mut raw: Vec<u8>, frames: &mut Vec<Vec<u8>>) {
        if raw.len() > self.settings.max_message_size {
            warn!(
                size = raw.len(),
                limit = self.settings.max_message_size,
                "message too long, dropped"
            );
            return;
        }
        if let Err(e) = header::set_seq(&mut raw, self.seq) {
            warn!(error = %e, "malformed outgoing message dropped");
            return;
        }
        match wire::frame_bytes(&raw) {
            Ok(frame) => {
                if tracing::enabled!(target: DISSECT, tracing::Level::TRACE) {
                    trace!(target: DISSECT, seq = self.seq, len = raw.len(), "--> {}", wire::hex_dump(&raw));
                }
                self.seq = self.seq.wrapping_add(1);
                frames.push(frame);
            }
            Err(e) => warn!(error = %e, "cannot frame message"),
        }
    }
}

fn decode_stored(raw: &[u8]) -> Option<Message> {
    match Message::decode(raw) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!(error = %e, "stored request no longer decodes");
            None
        }
    }
}

/// The reply telling the controller a request was not served.
fn negative_reply(
    action: ActionType,
    err: &OpsError,
    id: HeaderId,
) -> codec::Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; 64];
    let not_supported = matches!(err, OpsError::NotSupported);
    let n = match action {
        ActionType::Handover if not_supported => messages::format_single_ho_rep_ns(&mut buf, id)?,
        ActionType::Handover => messages::format_single_ho_rep_fail(&mut buf, id)?,
        ActionType::MacReport if not_supported => {
            messages::format_trigger_macrep_rep_ns(&mut buf, id)?
        }
        ActionType::MacReport => messages::format_trigger_macrep_rep_fail(&mut buf, id)?,
        ActionType::EnbCap => messages::format_single_ecap_rep_fail(&mut buf, id)?,
        ActionType::CellCap => messages::format_single_ccap_rep_fail(&mut buf, id)?,
        ActionType::UeReport => messages::format_trigger_uerep_rep_fail(&mut buf, id)?,
        ActionType::UeMeasure => messages::format_trigger_uemeas_rep_fail(&mut buf, id)?,
        _ => return Ok(None),
    };
    buf.truncate(n);
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{EnbCapabilities, HandoverCause, MsgType};
    use crate::records::{CellDetails, UeDetails};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<String>>>;

    /// Serves eNB capabilities and UE reports, fails cell setup, leaves the rest unsupported.
    struct TestOps {
        calls: Calls,
    }

    impl TestOps {
        fn boxed() -> (Box<dyn AgentOps>, Calls) {
            let calls = Calls::default();
            (Box::new(TestOps { calls: calls.clone() }), calls)
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl AgentOps for TestOps {
        fn disconnected(&mut self) -> OpsResult {
            self.log("disconnected".into());
            Ok(())
        }

        fn enb_setup_request(&mut self, out: &mut Outbox, mod_id: u32) -> OpsResult {
            self.log(format!("enb_setup {mod_id}"));
            let reply = Message::single(
                out.header(0, mod_id),
                Operation::Unspecified,
                Body::EnbCapReply {
                    cap: EnbCapabilities::UE_REPORT,
                    cells: vec![CellDetails::default()],
                },
            );
            out.push(&reply).map_err(|e| OpsError::Failed(e.to_string()))
        }

        fn cell_setup_request(&mut self, _out: &mut Outbox, mod_id: u32, cell_id: u16) -> OpsResult {
            self.log(format!("cell_setup {mod_id} {cell_id}"));
            Err(OpsError::Failed("no such cell".into()))
        }

        fn ue_report(&mut self, out: &mut Outbox, mod_id: u32, trigger_id: u32) -> OpsResult {
            self.log(format!("ue_report {mod_id} {trigger_id}"));
            let reply = Message::trigger(
                out.header(0, mod_id),
                Operation::Success,
                Body::UeReportReply {
                    ues: vec![UeDetails::default()],
                },
            );
            out.push(&reply).map_err(|e| OpsError::Failed(e.to_string()))
        }

        fn mac_report(&mut self, _out: &mut Outbox, mod_id: u32, interval: u16, trigger_id: u32) -> OpsResult {
            self.log(format!("mac_report {mod_id} {interval} {trigger_id}"));
            Ok(())
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn connected_agent() -> (AgentCore, Calls, Instant) {
        let (ops, calls) = TestOps::boxed();
        let mut agent = AgentCore::new(7, ops, AgentSettings::default());
        agent.init().unwrap();
        let t0 = Instant::now();
        agent.on_connected(t0);
        (agent, calls, t0)
    }

    fn request(seq: u32, msg: Message) -> Vec<u8> {
        let mut raw = msg.encode().unwrap();
        header::set_seq(&mut raw, seq).unwrap();
        raw
    }

    fn unframe(frames: &[Vec<u8>]) -> Vec<Message> {
        frames
            .iter()
            .map(|f| wire::decode_frame(f).unwrap().0)
            .collect()
    }

    fn ctrl() -> HeaderId {
        HeaderId::new(7, 1, 55)
    }

    #[test]
    fn hello_every_interval_with_sequence() {
        let (mut agent, _, t0) = connected_agent();
        assert!(agent.tick(t0 + ms(1999)).is_empty());
        let first = unframe(&agent.tick(t0 + ms(2000)));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].event, Event::Schedule { interval: 2000 });
        assert_eq!(first[0].body, Body::HelloRequest { id: 0 });
        assert_eq!(first[0].id, HeaderId::new(7, 0, 0));
        assert_eq!(first[0].seq, 0);
        let second = unframe(&agent.tick(t0 + ms(4000)));
        assert_eq!(second[0].seq, 1);
    }

    #[test]
    fn enb_setup_answered_by_callback() {
        let (mut agent, calls, t0) = connected_agent();
        let req = request(9, Message::single(ctrl(), Operation::Unspecified, Body::EnbCapRequest));
        agent.on_message(&req, t0).unwrap();
        let replies = unframe(&agent.tick(t0));
        assert_eq!(calls.lock().unwrap().as_slice(), ["enb_setup 55"]);
        assert_eq!(replies.len(), 1);
        assert!(matches!(replies[0].body, Body::EnbCapReply { ref cells, .. } if cells.len() == 1));
        assert_eq!(replies[0].id.mod_id, 55);
    }

    #[test]
    fn failed_callback_sends_fail_reply() {
        let (mut agent, calls, t0) = connected_agent();
        let req = request(3, Message::single(ctrl(), Operation::Unspecified, Body::CellCapRequest));
        agent.on_message(&req, t0).unwrap();
        let replies = unframe(&agent.tick(t0));
        assert_eq!(calls.lock().unwrap().as_slice(), ["cell_setup 55 1"]);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].op, Operation::Fail);
        assert_eq!(replies[0].body, Body::CellCapReply(CellDetails::default()));
        assert_eq!(replies[0].id, HeaderId::new(7, 1, 55));
    }

    #[test]
    fn unsupported_handover_sends_not_supported() {
        let (mut agent, _, t0) = connected_agent();
        let mut buf = [0u8; 64];
        let n = messages::format_single_ho_req(&mut buf, ctrl(), 0x46, 8, 2, HandoverCause::Optimization)
            .unwrap();
        agent.on_message(&buf[..n], t0).unwrap();
        let frames = agent.tick(t0);
        assert_eq!(frames.len(), 1);
        let raw = &frames[0][4..];
        assert_eq!(header::msg_type(raw), MsgType::Single);
        let msg = Message::decode(raw).unwrap();
        assert_eq!(msg.op, Operation::NotSupported);
        assert_eq!(msg.action(), ActionType::Handover);
    }

    #[test]
    fn ue_report_trigger_add_and_remove() {
        let (mut agent, calls, t0) = connected_agent();
        let add = request(1, Message::trigger(ctrl(), Operation::Add, Body::UeReportRequest));
        agent.on_message(&add, t0).unwrap();
        assert_eq!(agent.triggers().len(), 1);
        let replies = unframe(&agent.tick(t0));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].op, Operation::Success);

        let tid: u32 = calls.lock().unwrap()[0]
            .rsplit(' ')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(agent.has_trigger(tid));
        // Runs once; the eNB reports changes itself while the trigger lives.
        assert!(agent.tick(t0 + ms(10)).is_empty());

        let rem = request(2, Message::trigger(ctrl(), Operation::Rem, Body::UeReportRequest));
        agent.on_message(&rem, t0).unwrap();
        assert!(!agent.has_trigger(tid));
    }

    #[test]
    fn mac_report_repeats_until_removed() {
        let (mut agent, calls, t0) = connected_agent();
        let add = request(
            1,
            Message::trigger(ctrl(), Operation::Unspecified, Body::MacReportRequest { interval: 500 }),
        );
        agent.on_message(&add, t0).unwrap();
        agent.tick(t0);
        agent.tick(t0 + ms(499));
        agent.tick(t0 + ms(500));
        assert_eq!(calls.lock().unwrap().len(), 2);

        // Same key again does not start a second job.
        agent.on_message(&add, t0 + ms(600)).unwrap();
        assert_eq!(agent.triggers().len(), 1);
        assert_eq!(agent.scheduler().len(), 2);

        let rem = request(
            2,
            Message::trigger(ctrl(), Operation::Rem, Body::MacReportRequest { interval: 500 }),
        );
        agent.on_message(&rem, t0 + ms(700)).unwrap();
        agent.tick(t0 + ms(1000));
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(agent.triggers().is_empty());
    }

    fn mac_intervals(calls: &Calls) -> Vec<String> {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| c.split(' ').nth(2).map(str::to_owned))
            .collect()
    }

    #[test]
    fn mac_report_readd_takes_new_interval() {
        let (mut agent, calls, t0) = connected_agent();
        let once = request(
            1,
            Message::trigger(ctrl(), Operation::Add, Body::MacReportRequest { interval: 0 }),
        );
        agent.on_message(&once, t0).unwrap();
        agent.tick(t0);
        assert_eq!(mac_intervals(&calls), ["0"]);

        let periodic = request(
            2,
            Message::trigger(ctrl(), Operation::Add, Body::MacReportRequest { interval: 500 }),
        );
        agent.on_message(&periodic, t0).unwrap();
        assert_eq!(agent.triggers().len(), 1);
        agent.tick(t0);
        agent.tick(t0 + ms(500));
        agent.tick(t0 + ms(1000));
        assert_eq!(mac_intervals(&calls), ["0", "500", "500", "500"]);
        assert_eq!(agent.scheduler().len(), 2);

        // A faster rate replaces the running job instead of adding one.
        let faster = request(
            3,
            Message::trigger(ctrl(), Operation::Add, Body::MacReportRequest { interval: 100 }),
        );
        agent.on_message(&faster, t0 + ms(1000)).unwrap();
        assert_eq!(agent.scheduler().len(), 2);
        agent.tick(t0 + ms(1000));
        agent.tick(t0 + ms(1100));
        assert_eq!(mac_intervals(&calls)[4..], ["100", "100"]);
    }

    #[test]
    fn hello_from_controller_schedules_nothing() {
        let (mut agent, calls, t0) = connected_agent();
        let mut buf = [0u8; 64];
        let n = messages::format_single_hello_req(&mut buf, ctrl(), 3).unwrap();
        agent.on_message(&buf[..n], t0).unwrap();
        let n = messages::format_sched_hello_rep(&mut buf, ctrl(), 2000, 3).unwrap();
        agent.on_message(&buf[..n], t0).unwrap();
        assert_eq!(agent.scheduler().len(), 1);
        assert!(agent.tick(t0).is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn trigger_with_other_operation_is_ignored() {
        let (mut agent, _, t0) = connected_agent();
        let req = request(1, Message::trigger(ctrl(), Operation::Success, Body::UeReportRequest));
        agent.on_message(&req, t0).unwrap();
        assert!(agent.triggers().is_empty());
        assert_eq!(agent.scheduler().len(), 1);
    }

    #[test]
    fn measure_removal_matches_meas_id() {
        let (mut agent, _, t0) = connected_agent();
        let mut buf = [0u8; 64];
        for meas_id in [4, 5] {
            let n = messages::format_trigger_uemeas_req(&mut buf, ctrl(), Operation::Add, meas_id, 1, 1750)
                .unwrap();
            agent.on_message(&buf[..n], t0).unwrap();
        }
        assert_eq!(agent.triggers().len(), 2);
        let n = messages::format_trigger_uemeas_req(&mut buf, ctrl(), Operation::Rem, 4, 1, 1750).unwrap();
        agent.on_message(&buf[..n], t0).unwrap();

        let key = |instance| TriggerKey {
            mod_id: 55,
            kind: TriggerType::UeMeasure,
            instance,
        };
        assert_eq!(agent.triggers().len(), 1);
        assert!(agent.triggers().has_trigger_ext(&key(4)).is_none());
        assert!(agent.triggers().has_trigger_ext(&key(5)).is_some());
    }

    #[test]
    fn trigger_body_in_single_event_is_ignored() {
        let (mut agent, calls, t0) = connected_agent();
        let req = request(1, Message::single(ctrl(), Operation::Add, Body::UeReportRequest));
        agent.on_message(&req, t0).unwrap();
        assert!(agent.triggers().is_empty());
        assert_eq!(agent.scheduler().len(), 1);
        assert!(agent.tick(t0).is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unsupported_measure_sends_fail() {
        let (mut agent, _, t0) = connected_agent();
        let mut buf = [0u8; 64];
        let n = messages::format_trigger_uemeas_req(&mut buf, ctrl(), Operation::Add, 4, 0xffff, 0xffff)
            .unwrap();
        agent.on_message(&buf[..n], t0).unwrap();
        let replies = unframe(&agent.tick(t0));
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].op, Operation::Fail);
        assert_eq!(replies[0].body, Body::UeMeasureReply { measures: vec![] });
    }

    #[test]
    fn disconnect_flushes_state() {
        let (mut agent, calls, t0) = connected_agent();
        agent.tick(t0 + ms(2000));
        let add = request(1, Message::trigger(ctrl(), Operation::Add, Body::UeReportRequest));
        agent.on_message(&add, t0).unwrap();
        agent.on_disconnected();
        assert!(!agent.is_connected());
        assert!(agent.triggers().is_empty());
        assert!(agent.scheduler().is_empty());
        assert_eq!(calls.lock().unwrap().last().unwrap(), "disconnected");
        assert!(agent.tick(t0 + ms(5000)).is_empty());

        agent.on_connected(t0 + ms(5000));
        let hello = unframe(&agent.tick(t0 + ms(7000)));
        assert_eq!(hello[0].seq, 0);
    }

    #[test]
    fn send_requires_connection_and_limit() {
        let (ops, _) = TestOps::boxed();
        let mut agent = AgentCore::new(
            7,
            ops,
            AgentSettings {
                max_message_size: 32,
                ..AgentSettings::default()
            },
        );
        let t0 = Instant::now();
        let raw = Message::single(ctrl(), Operation::Unspecified, Body::EnbCapRequest)
            .encode()
            .unwrap();
        assert!(matches!(agent.send(raw.clone(), t0), Err(AgentError::NotConnected)));
        agent.on_connected(t0);
        assert!(matches!(
            agent.send(vec![0; 33], t0),
            Err(AgentError::TooLong { size: 33, limit: 32 })
        ));
        agent.send(raw.clone(), t0).unwrap();
        let frames = agent.tick(t0);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][4..], raw.as_slice());
    }

    #[test]
    fn oversized_reply_is_dropped() {
        let (ops, _) = TestOps::boxed();
        let mut agent = AgentCore::new(
            7,
            ops,
            AgentSettings {
                max_message_size: 24,
                ..AgentSettings::default()
            },
        );
        let t0 = Instant::now();
        agent.on_connected(t0);
        let req = request(1, Message::single(ctrl(), Operation::Unspecified, Body::EnbCapRequest));
        agent.on_message(&req, t0).unwrap();
        assert!(agent.tick(t0).is_empty());
    }

    #[test]
    fn malformed_message_is_an_error() {
        let (mut agent, _, t0) = connected_agent();
        assert!(matches!(
            agent.on_message(&[0u8; 5], t0),
            Err(AgentError::Codec(_))
        ));
        assert!(agent.scheduler().len() == 1);
    }

    #[test]
    fn release_stops_scheduler() {
        let (mut agent, _, t0) = connected_agent();
        agent.release().unwrap();
        assert!(agent.scheduler().is_stopped());
        let req = request(1, Message::single(ctrl(), Operation::Unspecified, Body::EnbCapRequest));
        assert!(agent.on_message(&req, t0).is_err());
    }
}
