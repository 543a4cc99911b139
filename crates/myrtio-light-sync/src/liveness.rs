//! Paired lead contact tracking
//!
//! One tracker exists per lead-to-lead pairing. It starts disconnected,
//! connects on the first qualifying message from the paired lead and drops
//! back to disconnected once no contact was seen for longer than the timeout.

use embassy_time::{Duration, Instant};

use crate::peer::Peer;

/// Contact gap after which the paired lead is considered gone
pub const LIVENESS_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct LivenessTracker {
    peer: Peer,
    connected: bool,
    last_contact: Option<Instant>,
    timeout: Duration,
}

impl LivenessTracker {
    pub const fn new(peer: Peer, timeout: Duration) -> Self {
        Self {
            peer,
            connected: false,
            last_contact: None,
            timeout,
        }
    }

    pub const fn peer(&self) -> &Peer {
        &self.peer
    }

    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    pub const fn last_contact(&self) -> Option<Instant> {
        self.last_contact
    }

    /// Record contact at `now` and mark the peer connected.
    ///
    /// Returns `true` if this contact caused the Disconnected -> Connected transition.
    pub fn touch(&mut self, now: Instant) -> bool {
        self.last_contact = Some(now);
        let was_connected = self.connected;
        self.connected = true;
        !was_connected
    }

    /// Disconnect if the last contact is older than the timeout.
    ///
    /// Returns `true` if the peer was disconnected by this sweep.
    pub fn expire(&mut self, now: Instant) -> bool {
        if !self.connected {
            return false;
        }
        let idle = self
            .last_contact
            .map_or(Duration::MAX, |last| now.saturating_duration_since(last));
        if idle > self.timeout {
            self.connected = false;
            return true;
        }
        false
    }
}
