#![no_std]

//! Light state synchronization for ESP-NOW connected light nodes
//!
//! Architecture layers:
//! - `state` - Shared light state ([`StateStore`]) and the mode/brightness model
//! - `button` - Debounced button input ([`ButtonInput`])
//! - `message` - Wire format of peer-to-peer payloads
//! - `peer` - Static peer allow-list
//! - `link` - Datagram plumbing, delivery accounting
//! - `liveness` - Paired lead contact tracking
//! - `protocol` - Sync state machine ([`SyncProtocol`])
//! - `runtime` - Async loops wiring the state machine to channels and the link
//!
//! The state machine performs no I/O. It consumes [`Event`]s and returns
//! [`Action`]s, which keeps it testable without a radio.

pub mod button;
pub mod link;
pub mod liveness;
pub mod message;
pub mod peer;
pub mod ports;
pub mod protocol;
pub mod runtime;
pub mod state;

pub use button::{ButtonInput, DEBOUNCE_WINDOW, Debouncer};
pub use link::{Datagram, DeliveryStatus, LinkCounters, LinkStats};
pub use liveness::{LIVENESS_TIMEOUT, LivenessTracker};
pub use message::{DecodeError, Frame, Message, SENTINEL};
pub use peer::{Address, Peer, PeerRole, PeerTable};
pub use ports::{LightStateSink, LinkReceiver, LinkSender, PressHandler};
pub use protocol::{
    Action, Actions, Event, LocalCommand, Role, SyncConfig, SyncError, SyncProtocol,
};
pub use runtime::{ActionChannel, EventChannel, LocalCommandForwarder};
pub use state::{BRIGHTNESS_STEP, LightState, MODE_COUNT, ModeId, StateStore};
