#![allow(clippy::unreadable_literal)]

use embassy_time::Duration;
use myrtio_light_sync::{Address, LightState, ModeId, PeerTable, Role, SyncConfig};

pub(crate) struct NodeConfig {
    pub name: &'static str,
    pub role: Role,
    pub peers: PeerTable,
}

pub(crate) struct TimingConfig {
    pub debounce_ms: u64,
    pub resync_period_ms: u64,
    pub liveness_sweep_ms: u64,
    pub liveness_timeout_ms: u64,
    pub inter_send_pause_ms: u64,
}

pub(crate) struct LinkConfig {
    pub start_attempts: u32,
    pub start_backoff_ms: u64,
    pub report_period_secs: u64,
}

const FRONT_LEAD: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE2, 0x20]);
const REAR_LEAD: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE2, 0x38]);
const FRONT_FOLLOW: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE1, 0x34]);
const REAR_FOLLOW: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE1, 0x58]);
const MASTER: Address = Address::new([0xDC, 0x54, 0x75, 0xF1, 0xE1, 0xE0]);

// Channel 0 sends on whatever channel the radio is currently on
const CHANNEL: u8 = 0;

#[cfg(feature = "front")]
pub(crate) const NODE: NodeConfig = NodeConfig {
    name: "front-lead",
    role: Role::Lead,
    peers: PeerTable::new()
        .with_paired_lead(REAR_LEAD, CHANNEL)
        .with_follow(FRONT_FOLLOW, CHANNEL)
        .with_master(MASTER, CHANNEL),
};
#[cfg(feature = "front-follow")]
pub(crate) const NODE: NodeConfig = NodeConfig {
    name: "front-follow",
    role: Role::Follow,
    peers: PeerTable::new()
        .with_paired_lead(FRONT_LEAD, CHANNEL)
        .with_master(MASTER, CHANNEL),
};
#[cfg(feature = "rear-follow")]
pub(crate) const NODE: NodeConfig = NodeConfig {
    name: "rear-follow",
    role: Role::Follow,
    peers: PeerTable::new()
        .with_paired_lead(REAR_LEAD, CHANNEL)
        .with_master(MASTER, CHANNEL),
};
#[cfg(not(any(feature = "front", feature = "front-follow", feature = "rear-follow")))]
pub(crate) const NODE: NodeConfig = NodeConfig {
    name: "rear-lead",
    role: Role::Lead,
    peers: PeerTable::new()
        .with_paired_lead(FRONT_LEAD, CHANNEL)
        .with_follow(REAR_FOLLOW, CHANNEL)
        .with_master(MASTER, CHANNEL),
};

pub(crate) const STARTUP_STATE: LightState = LightState::new(ModeId::White, 255);

pub(crate) const TIMING: TimingConfig = TimingConfig {
    debounce_ms: 50,
    resync_period_ms: 200,
    liveness_sweep_ms: 100,
    liveness_timeout_ms: 5000,
    inter_send_pause_ms: 10,
};

pub(crate) const LINK: LinkConfig = LinkConfig {
    start_attempts: 5,
    start_backoff_ms: 500,
    report_period_secs: 30,
};

pub(crate) const fn sync_config() -> SyncConfig {
    SyncConfig::new(NODE.role, NODE.peers)
        .with_liveness_timeout(Duration::from_millis(TIMING.liveness_timeout_ms))
        .with_inter_send_pause(Duration::from_millis(TIMING.inter_send_pause_ms))
}

#[macro_export]
macro_rules! button_gpio {
    ($p:expr) => {
        $p.GPIO0
    };
}
