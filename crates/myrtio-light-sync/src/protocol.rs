//! Sync state machine
//!
//! Keeps the node's [`LightState`] converged with its peers over a lossy link.
//! There are no acknowledgements. Every resync tick pushes the full state, so
//! a lost send is repaired at most one resync period later.
//!
//! Lead transitions, keyed on the liveness of the paired lead:
//!
//! | inbound from paired lead | Disconnected                       | Connected                           |
//! |--------------------------|------------------------------------|-------------------------------------|
//! | sentinel                 | connect, reply with local snapshot | advance mode, push to follow + lead |
//! | snapshot                 | adopt, connect, push to follow     | adopt (last write wins)             |
//!
//! Master snapshots are adopted unconditionally on every role.
//!
//! A sentinel is the only non-idempotent message. A duplicated sentinel
//! received while connected advances the mode twice.

use core::fmt;

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::link::Datagram;
use crate::liveness::{LIVENESS_TIMEOUT, LivenessTracker};
use crate::message::{DecodeError, Frame, Message};
use crate::peer::{Address, PeerRole, PeerTable};
use crate::ports::LightStateSink;
use crate::state::{BRIGHTNESS_STEP, LightState};

/// Pause between back-to-back sends so they do not collide on the radio
pub const INTER_SEND_PAUSE: Duration = Duration::from_millis(10);

/// Upper bound of actions produced by a single event (send, pause, send)
pub const MAX_ACTIONS: usize = 3;

/// Role of this node in the network
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Accepts local input and is paired with exactly one remote lead
    Lead,
    /// Mirrors its own lead (held in the paired lead slot) and the master
    Follow,
    /// Standalone node driven by local input and the master only
    MasterSubject,
}

#[derive(Clone, Copy, Debug)]
pub struct SyncConfig {
    pub role: Role,
    pub peers: PeerTable,
    pub liveness_timeout: Duration,
    pub inter_send_pause: Duration,
}

impl SyncConfig {
    pub const fn new(role: Role, peers: PeerTable) -> Self {
        Self {
            role,
            peers,
            liveness_timeout: LIVENESS_TIMEOUT,
            inter_send_pause: INTER_SEND_PAUSE,
        }
    }

    #[must_use]
    pub const fn with_liveness_timeout(mut self, timeout: Duration) -> Self {
        self.liveness_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_inter_send_pause(mut self, pause: Duration) -> Self {
        self.inter_send_pause = pause;
        self
    }
}

/// Command raised by local input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalCommand {
    AdvanceMode,
    RetreatMode,
    BrightnessUp,
    BrightnessDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Node finished startup, the link is ready
    Boot,
    /// Datagram received from the link
    Datagram(Datagram),
    /// Local input accepted by the button handler
    Local(LocalCommand),
    /// Periodic full-state push
    ResyncTick,
    /// Periodic liveness expiry sweep
    LivenessTick,
}

/// Side effect requested by the protocol, executed in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Send { to: Address, frame: Frame },
    Pause(Duration),
}

/// Ordered actions produced by one event
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Actions {
    items: Vec<Action, MAX_ACTIONS>,
}

impl Actions {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn push(&mut self, action: Action) {
        if self.items.push(action).is_err() {
            log::warn!("sync: action list full, dropping {:?}", action);
        }
    }

    fn send(&mut self, to: Address, message: Message) {
        self.push(Action::Send {
            to,
            frame: message.encode(),
        });
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Action> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Actions {
    type Item = &'a Action;
    type IntoIter = core::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// Payload from an allow-listed peer could not be decoded
    Decode { from: Address, error: DecodeError },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Decode { from, error } => {
                write!(f, "rejected payload from {}: {}", from, error)
            }
        }
    }
}

pub struct SyncProtocol<'a, S: LightStateSink + ?Sized> {
    role: Role,
    peers: PeerTable,
    inter_send_pause: Duration,
    state: &'a S,
    liveness: Option<LivenessTracker>,
}

impl<'a, S: LightStateSink + ?Sized> SyncProtocol<'a, S> {
    pub fn new(config: SyncConfig, state: &'a S) -> Self {
        let liveness = match config.role {
            Role::Lead => config
                .peers
                .paired_lead()
                .map(|peer| LivenessTracker::new(*peer, config.liveness_timeout)),
            Role::Follow | Role::MasterSubject => None,
        };

        Self {
            role: config.role,
            peers: config.peers,
            inter_send_pause: config.inter_send_pause,
            state,
            liveness,
        }
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    /// Liveness of the paired lead, `None` if this node does not track one
    pub const fn liveness(&self) -> Option<&LivenessTracker> {
        self.liveness.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.liveness
            .as_ref()
            .is_some_and(LivenessTracker::is_connected)
    }

    /// Process a single event observed at `now`
    pub fn handle(&mut self, event: Event, now: Instant) -> Result<Actions, SyncError> {
        match event {
            Event::Boot => Ok(self.on_boot()),
            Event::Datagram(datagram) => self.on_datagram(&datagram, now),
            Event::Local(command) => Ok(self.on_local(command)),
            Event::ResyncTick => Ok(self.fan_out(self.state.get())),
            Event::LivenessTick => {
                self.sweep(now);
                Ok(Actions::new())
            }
        }
    }

    /// Startup handshake: a lead announces itself to its paired lead
    fn on_boot(&self) -> Actions {
        let mut actions = Actions::new();
        if let Some(tracker) = &self.liveness {
            log::info!("sync: sending handshake to {}", tracker.peer().address);
            actions.send(tracker.peer().address, Message::Sentinel);
        }
        actions
    }

    fn on_datagram(&mut self, datagram: &Datagram, now: Instant) -> Result<Actions, SyncError> {
        let from = datagram.from;
        let Some(role) = self.peers.classify(&from) else {
            log::debug!("sync: ignoring datagram from unknown peer {}", from);
            return Ok(Actions::new());
        };
        let decode = |datagram: &Datagram| {
            datagram
                .message()
                .map_err(|error| SyncError::Decode { from, error })
        };

        match role {
            PeerRole::DownstreamFollow => {
                log::debug!("sync: ignoring datagram from follow {}", from);
                Ok(Actions::new())
            }
            PeerRole::Master => Ok(self.on_master(decode(datagram)?)),
            PeerRole::PairedLead => Ok(self.on_paired_lead(from, decode(datagram)?, now)),
        }
    }

    fn on_master(&self, message: Message) -> Actions {
        match message {
            Message::Snapshot(snapshot) => {
                log::info!(
                    "sync: master override mode={} brightness={}",
                    snapshot.mode.as_str(),
                    snapshot.brightness
                );
                self.state.set(snapshot);
            }
            Message::Sentinel => log::debug!("sync: ignoring sentinel from master"),
        }
        Actions::new()
    }

    fn on_paired_lead(&mut self, from: Address, message: Message, now: Instant) -> Actions {
        let Some(tracker) = self.liveness.as_mut() else {
            // Follow and master-subject nodes mirror their upstream without liveness
            if let Message::Snapshot(snapshot) = message {
                self.state.set(snapshot);
            }
            return Actions::new();
        };

        let was_connected = tracker.is_connected();
        tracker.touch(now);

        let mut actions = Actions::new();
        match (message, was_connected) {
            (Message::Sentinel, false) => {
                log::info!("sync: discovered paired lead {}", from);
                actions.send(from, Message::Snapshot(self.state.get()));
            }
            (Message::Sentinel, true) => {
                let state = self.state.advance_mode();
                log::info!("sync: remote toggle, mode={}", state.mode.as_str());
                actions = self.fan_out(state);
            }
            (Message::Snapshot(snapshot), false) => {
                log::info!(
                    "sync: adopted state from {} mode={} brightness={}",
                    from,
                    snapshot.mode.as_str(),
                    snapshot.brightness
                );
                self.state.set(snapshot);
                if let Some(follow) = self.peers.follow() {
                    actions.send(follow.address, Message::Snapshot(snapshot));
                }
            }
            (Message::Snapshot(snapshot), true) => self.state.set(snapshot),
        }
        actions
    }

    fn on_local(&self, command: LocalCommand) -> Actions {
        if self.role == Role::Follow {
            log::debug!("sync: follow node ignores local {:?}", command);
            return Actions::new();
        }

        let step = i16::from(BRIGHTNESS_STEP);
        let state = match command {
            LocalCommand::AdvanceMode => self.state.advance_mode(),
            LocalCommand::RetreatMode => self.state.retreat_mode(),
            LocalCommand::BrightnessUp => self.state.adjust_brightness(step),
            LocalCommand::BrightnessDown => self.state.adjust_brightness(-step),
        };
        log::info!(
            "sync: local {:?}, mode={} brightness={}",
            command,
            state.mode.as_str(),
            state.brightness
        );
        self.fan_out(state)
    }

    /// Push `state` downstream first, then to the paired lead if this node is a lead
    fn fan_out(&self, state: LightState) -> Actions {
        let mut actions = Actions::new();
        let follow = self.peers.follow().map(|peer| peer.address);
        let lead = self.liveness.as_ref().map(|tracker| tracker.peer().address);

        if let Some(follow) = follow {
            actions.send(follow, Message::Snapshot(state));
        }
        if let Some(lead) = lead {
            if follow.is_some() {
                actions.push(Action::Pause(self.inter_send_pause));
            }
            actions.send(lead, Message::Snapshot(state));
        }
        actions
    }

    fn sweep(&mut self, now: Instant) {
        if let Some(tracker) = self.liveness.as_mut() {
            if tracker.expire(now) {
                log::info!("sync: paired lead {} timed out", tracker.peer().address);
            }
        }
    }
}
