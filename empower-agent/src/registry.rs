//! Running agents, one per eNB id, each with its own controller link task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use empower_core::{AgentCore, AgentError, AgentOps, AgentSettings};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::net::{self, Link};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("agent for eNB {0} is already running")]
    AlreadyRunning(u32),
    #[error("no agent running for eNB {0}")]
    NotRunning(u32),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

struct AgentHandle {
    core: Arc<Mutex<AgentCore>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub struct Registry {
    agents: Mutex<HashMap<u32, AgentHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize an agent for `enb_id` and start its controller link.
    pub async fn start(
        &self,
        enb_id: u32,
        ops: Box<dyn AgentOps>,
        settings: AgentSettings,
        link: Link,
    ) -> Result<(), RegistryError> {
        let mut agents = self.agents.lock().await;
        if agents.contains_key(&enb_id) {
            return Err(RegistryError::AlreadyRunning(enb_id));
        }
        let mut core = AgentCore::new(enb_id, ops, settings);
        core.init()?;
        let core = Arc::new(Mutex::new(core));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(net::run(core.clone(), link, shutdown_rx));
        agents.insert(
            enb_id,
            AgentHandle {
                core,
                shutdown,
                task,
            },
        );
        info!(enb_id, "agent started");
        Ok(())
    }

    /// Stop one agent: close its link, then release it.
    pub async fn terminate(&self, enb_id: u32) -> Result<(), RegistryError> {
        let handle = self
            .agents
            .lock()
            .await
            .remove(&enb_id)
            .ok_or(RegistryError::NotRunning(enb_id))?;
        if handle.shutdown.send(true).is_err() {
            debug!(enb_id, "link task already exited");
        }
        if let Err(e) = handle.task.await {
            warn!(enb_id, error = %e, "link task ended abnormally");
        }
        handle.core.lock().await.release()?;
        info!(enb_id, "agent terminated");
        Ok(())
    }

    pub async fn stop_all(&self) {
        let ids: Vec<u32> = self.agents.lock().await.keys().copied().collect();
        for enb_id in ids {
            if let Err(e) = self.terminate(enb_id).await {
                warn!(enb_id, error = %e, "cannot stop agent");
            }
        }
    }

    /// Queue an encoded message for the controller of `enb_id`.
    pub async fn send(&self, enb_id: u32, raw: Vec<u8>) -> Result<(), RegistryError> {
        let core = self.core(enb_id).await?;
        let mut core = core.lock().await;
        core.send(raw, Instant::now())?;
        Ok(())
    }

    pub async fn is_connected(&self, enb_id: u32) -> bool {
        match self.core(enb_id).await {
            Ok(core) => core.lock().await.is_connected(),
            Err(_) => false,
        }
    }

    pub async fn has_trigger(&self, enb_id: u32, trigger_id: u32) -> bool {
        match self.core(enb_id).await {
            Ok(core) => core.lock().await.has_trigger(trigger_id),
            Err(_) => false,
        }
    }

    async fn core(&self, enb_id: u32) -> Result<Arc<Mutex<AgentCore>>, RegistryError> {
        self.agents
            .lock()
            .await
            .get(&enb_id)
            .map(|h| h.core.clone())
            .ok_or(RegistryError::NotRunning(enb_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use empower_core::records::HeaderId;
    use empower_core::{Body, Event, Message, OpsError, OpsResult, Operation};
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;

    use crate::config::CellConfig;
    use crate::static_enb::StaticEnb;

    const WAIT: Duration = Duration::from_secs(5);

    struct Refuse;
    impl AgentOps for Refuse {
        fn init(&mut self) -> OpsResult {
            Err(OpsError::Failed("no radio".into()))
        }
    }

    fn settings() -> AgentSettings {
        AgentSettings {
            hello_interval: Duration::from_millis(50),
            ..AgentSettings::default()
        }
    }

    fn link(port: u16) -> Link {
        Link {
            addr: "127.0.0.1".into(),
            port,
            sched_interval: Duration::from_millis(10),
            net_interval: Duration::ZERO,
        }
    }

    fn enb() -> Box<dyn AgentOps> {
        let cell: CellConfig = toml::from_str("pci = 1").unwrap();
        Box::new(StaticEnb::new(vec![cell], Vec::new()))
    }

    async fn next_message(stream: &mut TcpStream) -> Message {
        let raw = timeout(WAIT, net::read_message(stream, 8192))
            .await
            .unwrap()
            .unwrap();
        Message::decode(&raw).unwrap()
    }

    async fn wait_connected(reg: &Registry, enb_id: u32) {
        timeout(WAIT, async {
            while !reg.is_connected(enb_id).await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn hello_then_enb_capabilities() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let reg = Registry::new();
        reg.start(11, enb(), settings(), link(port)).await.unwrap();

        let (mut ctrl, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let hello = next_message(&mut ctrl).await;
        assert_eq!(hello.event, Event::Schedule { interval: 50 });
        assert_eq!(hello.id.enb_id, 11);

        let req = Message::single(HeaderId::new(11, 0, 99), Operation::Unspecified, Body::EnbCapRequest);
        ctrl.write_all(&empower_core::encode_frame(&req).unwrap())
            .await
            .unwrap();
        let reply = loop {
            let msg = next_message(&mut ctrl).await;
            if !matches!(msg.body, Body::HelloRequest { .. }) {
                break msg;
            }
        };
        assert!(matches!(reply.body, Body::EnbCapReply { ref cells, .. } if cells.len() == 1));
        assert_eq!(reply.id.mod_id, 99);
        assert!(reply.seq > hello.seq);

        reg.stop_all().await;
        assert!(!reg.is_connected(11).await);
    }

    #[tokio::test]
    async fn duplicate_and_failed_starts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let reg = Registry::new();
        reg.start(1, enb(), settings(), link(port)).await.unwrap();
        assert!(matches!(
            reg.start(1, enb(), settings(), link(port)).await,
            Err(RegistryError::AlreadyRunning(1))
        ));
        assert!(matches!(
            reg.start(2, Box::new(Refuse), settings(), link(port)).await,
            Err(RegistryError::Agent(AgentError::Init(_)))
        ));
        assert!(matches!(
            reg.terminate(2).await,
            Err(RegistryError::NotRunning(2))
        ));
        reg.terminate(1).await.unwrap();
    }

    #[tokio::test]
    async fn reconnects_after_oversized_prologue() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let reg = Registry::new();
        reg.start(3, enb(), settings(), link(port)).await.unwrap();

        let (mut first, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        wait_connected(&reg, 3).await;
        first.write_all(&[0xff, 0xff, 0xff, 0xff]).await.unwrap();

        let (mut second, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let hello = next_message(&mut second).await;
        assert_eq!(hello.seq, 0);
        reg.stop_all().await;
    }

    #[tokio::test]
    async fn terminate_after_link_task_exited() {
        let reg = Registry::new();
        reg.start(5, enb(), settings(), link(1)).await.unwrap();
        let core = {
            let agents = reg.agents.lock().await;
            let handle = agents.get(&5).unwrap();
            handle.task.abort();
            handle.core.clone()
        };
        timeout(WAIT, async {
            while !reg.agents.lock().await.get(&5).unwrap().task.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        reg.terminate(5).await.unwrap();
        assert!(core.lock().await.scheduler().is_stopped());
        assert!(matches!(
            reg.terminate(5).await,
            Err(RegistryError::NotRunning(5))
        ));
    }

    #[tokio::test]
    async fn send_needs_a_connection() {
        let reg = Registry::new();
        assert!(matches!(
            reg.send(4, vec![0; 20]).await,
            Err(RegistryError::NotRunning(4))
        ));
        // Nothing listens on port 1; the agent stays disconnected.
        reg.start(4, enb(), settings(), link(1)).await.unwrap();
        assert!(matches!(
            reg.send(4, vec![0; 20]).await,
            Err(RegistryError::Agent(AgentError::NotConnected))
        ));
        assert!(!reg.has_trigger(4, 1).await);
        reg.stop_all().await;
    }
}
