//! EmPOWER agent protocol: message codec, C ABI and agent core.
//! Host-driven: no I/O; host passes connection events, messages and ticks, and
//! receives frames to write.

pub mod codec;
pub mod event;
pub mod header;
pub mod messages;
pub mod protocol;
pub mod records;
pub mod wire;

pub use codec::CodecError;
pub use messages::{Body, Event, Message};
pub use protocol::{ActionType, Direction, MsgType, Operation, PROTOCOL_VERSION};
pub use records::HeaderId;
pub use wire::{decode_frame, encode_frame, FrameDecodeError, FrameEncodeError};
pub use crate::core::{AgentCore, AgentError, AgentSettings};
pub use ops::{AgentOps, OpsError, OpsResult, Outbox};

pub mod core;
pub mod ffi;
pub mod ops;
pub mod scheduler;
pub mod triggers;
