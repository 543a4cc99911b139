//! Static peer allow-list
//!
//! Peers are configured once at startup and never change. Sender identity is
//! taken from the transport-reported source address without any
//! cryptographic check, so a spoofed address is accepted as that peer.

use core::fmt;

/// 6-byte link (MAC) address
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 6]);

impl Address {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Role of a peer relative to this node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerRole {
    /// The other lead this node is paired with (or, on a follow node, its own lead)
    PairedLead,
    /// Follow node mirroring this node
    DownstreamFollow,
    /// Out-of-band node allowed to impose state unconditionally
    Master,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peer {
    pub address: Address,
    pub role: PeerRole,
    /// Radio channel, 0 means the current channel
    pub channel: u8,
}

impl Peer {
    pub const fn new(address: Address, role: PeerRole, channel: u8) -> Self {
        Self {
            address,
            role,
            channel,
        }
    }
}

/// Per-node peer allow-list, one slot per role
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeerTable {
    paired_lead: Option<Peer>,
    follow: Option<Peer>,
    master: Option<Peer>,
}

impl PeerTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            paired_lead: None,
            follow: None,
            master: None,
        }
    }

    #[must_use]
    pub const fn with_paired_lead(mut self, address: Address, channel: u8) -> Self {
        self.paired_lead = Some(Peer::new(address, PeerRole::PairedLead, channel));
        self
    }

    #[must_use]
    pub const fn with_follow(mut self, address: Address, channel: u8) -> Self {
        self.follow = Some(Peer::new(address, PeerRole::DownstreamFollow, channel));
        self
    }

    #[must_use]
    pub const fn with_master(mut self, address: Address, channel: u8) -> Self {
        self.master = Some(Peer::new(address, PeerRole::Master, channel));
        self
    }

    pub const fn paired_lead(&self) -> Option<&Peer> {
        self.paired_lead.as_ref()
    }

    pub const fn follow(&self) -> Option<&Peer> {
        self.follow.as_ref()
    }

    pub const fn master(&self) -> Option<&Peer> {
        self.master.as_ref()
    }

    /// Role of the sender at `address`, `None` if it is not allow-listed.
    ///
    /// The master slot is checked first.
    pub fn classify(&self, address: &Address) -> Option<PeerRole> {
        [self.master, self.paired_lead, self.follow]
            .into_iter()
            .flatten()
            .find(|peer| peer.address == *address)
            .map(|peer| peer.role)
    }

    /// Peers this node sends to and therefore must register with the transport
    pub fn send_targets(&self) -> impl Iterator<Item = Peer> {
        [self.follow, self.paired_lead].into_iter().flatten()
    }
}
