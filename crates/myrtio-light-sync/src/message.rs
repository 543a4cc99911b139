//! Peer-to-peer wire format
//!
//! Exactly two payload shapes exist:
//! - 1 byte `0xFF` - sentinel, a presence / toggle signal without state
//! - 2 bytes `{mode, brightness}` - full state snapshot
//!
//! There is no sequence number and no checksum beyond what the transport
//! provides. Anything else is rejected, never truncated or over-read.

use core::fmt;

use bytemuck::{Pod, Zeroable};

use crate::state::{LightState, ModeId};

/// Reserved single-byte payload value
pub const SENTINEL: u8 = 0xFF;

/// Longest valid payload
pub const MAX_MESSAGE_LEN: usize = size_of::<SnapshotFrame>();

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct SnapshotFrame {
    mode: u8,
    brightness: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is neither 1 nor 2 bytes long
    InvalidLength(usize),
    /// Single-byte payload other than the sentinel
    UnknownSignal(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidLength(len) => write!(f, "invalid payload length {}", len),
            DecodeError::UnknownSignal(byte) => write!(f, "unknown signal byte {:#04x}", byte),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Presence or toggle signal, no state payload
    Sentinel,
    /// Full state snapshot
    Snapshot(LightState),
}

impl Message {
    /// Decode a payload.
    ///
    /// Snapshot mode indices outside the mode set are folded modulo the mode count.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        match payload {
            [SENTINEL] => Ok(Message::Sentinel),
            [other] => Err(DecodeError::UnknownSignal(*other)),
            _ => {
                let frame: SnapshotFrame = bytemuck::try_pod_read_unaligned(payload)
                    .map_err(|_| DecodeError::InvalidLength(payload.len()))?;
                let mode = ModeId::from_raw_wrapping(frame.mode);
                if ModeId::from_raw(frame.mode).is_none() {
                    log::debug!(
                        "message: mode {} out of range, folded to {}",
                        frame.mode,
                        mode.as_str()
                    );
                }
                Ok(Message::Snapshot(LightState::new(mode, frame.brightness)))
            }
        }
    }

    pub fn encode(&self) -> Frame {
        match self {
            Message::Sentinel => Frame::from_parts([SENTINEL, 0], 1),
            Message::Snapshot(state) => {
                let frame = SnapshotFrame {
                    mode: state.mode.as_u8(),
                    brightness: state.brightness,
                };
                let mut bytes = [0u8; MAX_MESSAGE_LEN];
                bytes.copy_from_slice(bytemuck::bytes_of(&frame));
                Frame::from_parts(bytes, MAX_MESSAGE_LEN)
            }
        }
    }
}

/// Encoded payload ready to hand to the link
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_MESSAGE_LEN],
    len: usize,
}

impl Frame {
    const fn from_parts(bytes: [u8; MAX_MESSAGE_LEN], len: usize) -> Self {
        Self { bytes, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:02x?})", self.as_bytes())
    }
}
