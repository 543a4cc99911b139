//! Datagram link plumbing
//!
//! The link is unicast, connectionless and lossy: no retry, no ordering and no
//! flow control. Delivery status is only counted for observability and never
//! feeds back into the protocol.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::message::{DecodeError, MAX_MESSAGE_LEN, Message};
use crate::peer::Address;

/// Inbound datagram as reported by the transport.
///
/// Only the first [`MAX_MESSAGE_LEN`] bytes are kept, together with the true
/// payload length, so an oversized payload is still reported with its length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Datagram {
    pub from: Address,
    len: usize,
    head: [u8; MAX_MESSAGE_LEN],
}

impl Datagram {
    pub fn new(from: Address, payload: &[u8]) -> Self {
        let mut head = [0u8; MAX_MESSAGE_LEN];
        let kept = payload.len().min(MAX_MESSAGE_LEN);
        head[..kept].copy_from_slice(&payload[..kept]);
        Self {
            from,
            len: payload.len(),
            head,
        }
    }

    /// Payload length as received
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode the payload
    pub fn message(&self) -> Result<Message, DecodeError> {
        if self.len > MAX_MESSAGE_LEN {
            return Err(DecodeError::InvalidLength(self.len));
        }
        Message::decode(&self.head[..self.len])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Failed,
}

/// Point-in-time copy of [`LinkStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkCounters {
    pub sent: u32,
    pub delivered: u32,
    pub failed: u32,
}

/// Outbound delivery counters
///
/// Uses atomics for lock-free access from the transmitter and reporting tasks.
#[derive(Debug, Default)]
pub struct LinkStats {
    sent: AtomicU32,
    delivered: AtomicU32,
    failed: AtomicU32,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            sent: AtomicU32::new(0),
            delivered: AtomicU32::new(0),
            failed: AtomicU32::new(0),
        }
    }

    /// Record the outcome of one send
    pub fn record(&self, status: DeliveryStatus) {
        self.sent.fetch_add(1, Ordering::Relaxed);
        match status {
            DeliveryStatus::Delivered => self.delivered.fetch_add(1, Ordering::Relaxed),
            DeliveryStatus::Failed => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn counters(&self) -> LinkCounters {
        LinkCounters {
            sent: self.sent.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
