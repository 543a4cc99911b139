use crate::link::{Datagram, DeliveryStatus};
use crate::peer::Address;
use crate::state::{LightState, ModeId};

/// Capability over the node's light state, shared by button handlers, the
/// sync protocol and display collaborators.
///
/// All methods take `&self` and must be callable from interrupt, receive and
/// periodic-task contexts.
pub trait LightStateSink {
    /// Get the current light state
    fn get(&self) -> LightState;

    /// Overwrite the whole light state
    fn set(&self, state: LightState);

    fn set_mode(&self, mode: ModeId);

    /// Step to the next mode, returns the resulting state
    fn advance_mode(&self) -> LightState;

    /// Step to the previous mode, returns the resulting state
    fn retreat_mode(&self) -> LightState;

    fn brightness(&self) -> u8;

    fn set_brightness(&self, brightness: u8);

    /// Move brightness by `delta`, clamped to `0..=255`
    fn adjust_brightness(&self, delta: i16) -> LightState;
}

/// Handler invoked on an accepted button press.
///
/// Runs in interrupt context: it must return promptly and never wait on I/O.
pub trait PressHandler: Sync {
    fn on_press(&self);
}

impl<F: Fn() + Sync> PressHandler for F {
    fn on_press(&self) {
        self();
    }
}

/// Sending half of the peer-to-peer datagram link
#[allow(async_fn_in_trait)]
pub trait LinkSender {
    /// Send a single datagram, resolving once the transport reports delivery status
    async fn send(&mut self, to: &Address, payload: &[u8]) -> DeliveryStatus;
}

/// Receiving half of the peer-to-peer datagram link
#[allow(async_fn_in_trait)]
pub trait LinkReceiver {
    /// Wait for the next inbound datagram
    async fn receive(&mut self) -> Datagram;
}
