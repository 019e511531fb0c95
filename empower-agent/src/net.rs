//! Controller link: TCP client with reconnect, prologue framing, scheduler tick.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use empower_core::header::HEADER_SIZE;
use empower_core::protocol::PROLOGUE_SIZE;
use empower_core::wire;
use empower_core::AgentCore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Base delay between connection attempts; `net_interval` is added to it.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Where the controller lives and how often the link runs the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub addr: String,
    pub port: u16,
    pub sched_interval: Duration,
    pub net_interval: Duration,
}

/// Keep one agent connected to its controller until `shutdown` fires.
pub async fn run(core: Arc<Mutex<AgentCore>>, link: Link, mut shutdown: watch::Receiver<bool>) {
    let enb_id = core.lock().await.enb_id();
    loop {
        tokio::select! {
            res = TcpStream::connect((link.addr.as_str(), link.port)) => match res {
                Ok(stream) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!(enb_id, error = %e, "cannot set TCP_NODELAY");
                    }
                    info!(enb_id, addr = %link.addr, port = link.port, "controller link up");
                    core.lock().await.on_connected(Instant::now());
                    let closed = serve(stream, &core, &link, &mut shutdown).await;
                    core.lock().await.on_disconnected();
                    match closed {
                        Ok(()) => return,
                        Err(e) => warn!(enb_id, error = %e, "controller link lost"),
                    }
                }
                Err(e) => debug!(enb_id, error = %e, "controller unreachable"),
            },
            _ = shutdown.changed() => return,
        }
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay(&link)) => {}
            _ = shutdown.changed() => return,
        }
    }
}

fn reconnect_delay(link: &Link) -> Duration {
    RECONNECT_DELAY.saturating_add(link.net_interval)
}

/// Run one connection. `Ok` means shutdown was requested; `Err` is why the link dropped.
async fn serve(
    stream: TcpStream,
    core: &Arc<Mutex<AgentCore>>,
    link: &Link,
    shutdown: &mut watch::Receiver<bool>,
) -> io::Result<()> {
    let limit = core.lock().await.settings().max_message_size;
    let (mut reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::channel::<io::Result<Vec<u8>>>(16);
    let reader_task = tokio::spawn(async move {
        loop {
            let msg = read_message(&mut reader, limit).await;
            let failed = msg.is_err();
            if tx.send(msg).await.is_err() || failed {
                break;
            }
        }
    });

    let mut ticker = tokio::time::interval(link.sched_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let closed = loop {
        tokio::select! {
            msg = rx.recv() => {
                let raw = match msg {
                    Some(Ok(raw)) => raw,
                    Some(Err(e)) => break Err(e),
                    None => break Err(io::ErrorKind::UnexpectedEof.into()),
                };
                if let Err(e) = core.lock().await.on_message(&raw, Instant::now()) {
                    warn!(error = %e, "message from controller dropped");
                }
            }
            _ = ticker.tick() => {
                let frames = core.lock().await.tick(Instant::now());
                if let Err(e) = write_frames(&mut writer, &frames).await {
                    break Err(e);
                }
            }
            _ = shutdown.changed() => break Ok(()),
        }
    };
    reader_task.abort();
    closed
}

async fn write_frames<W>(writer: &mut W, frames: &[Vec<u8>]) -> io::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    for frame in frames {
        writer.write_all(frame).await?;
    }
    if !frames.is_empty() {
        writer.flush().await?;
    }
    Ok(())
}

/// Read one prologue-framed message. A size over `limit`, or too small to hold a header, is an error.
pub async fn read_message<R>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut prologue = [0u8; PROLOGUE_SIZE];
    reader.read_exact(&mut prologue).await?;
    let len = wire::prologue_len(prologue);
    if len > limit || len < HEADER_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("bad message size {len}"),
        ));
    }
    let mut msg = vec![0u8; len];
    reader.read_exact(&mut msg).await?;
    Ok(msg)
}
