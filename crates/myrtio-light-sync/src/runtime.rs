//! Async loops wiring [`SyncProtocol`] to the link
//!
//! Every input reaches the protocol through one event channel, and every
//! side effect leaves it through one action channel, so the protocol itself
//! is only ever touched by [`run_sync`].
//!
//! None of the producers wait on a full channel: a dropped event or action
//! batch is healed by the next resync tick. Batches produced by one event are
//! admitted to the outbox whole or not at all.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Instant, Ticker, Timer};

use crate::link::{DeliveryStatus, LinkStats};
use crate::ports::{LightStateSink, LinkReceiver, LinkSender, PressHandler};
use crate::protocol::{Action, Event, LocalCommand, SyncProtocol};

const EVENT_CHANNEL_SIZE: usize = 8;
const ACTION_CHANNEL_SIZE: usize = 8;

/// Type alias for the protocol event channel
pub type EventChannel = Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE>;

/// Type alias for the protocol event sender
pub type EventSender<'a> = Sender<'a, CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE>;

/// Type alias for the protocol event receiver
pub type EventReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE>;

/// Type alias for the outbound action channel
pub type ActionChannel = Channel<CriticalSectionRawMutex, Action, ACTION_CHANNEL_SIZE>;

/// Type alias for the outbound action sender
pub type ActionSender<'a> = Sender<'a, CriticalSectionRawMutex, Action, ACTION_CHANNEL_SIZE>;

/// Type alias for the outbound action receiver
pub type ActionReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, Action, ACTION_CHANNEL_SIZE>;

/// Button handler turning an accepted press into a protocol event.
///
/// Safe to call from interrupt context: it only attempts a non-blocking enqueue.
pub struct LocalCommandForwarder<'a> {
    events: EventSender<'a>,
    command: LocalCommand,
}

impl<'a> LocalCommandForwarder<'a> {
    pub const fn new(events: EventSender<'a>, command: LocalCommand) -> Self {
        Self { events, command }
    }
}

impl PressHandler for LocalCommandForwarder<'_> {
    fn on_press(&self) {
        if self.events.try_send(Event::Local(self.command)).is_err() {
            log::warn!("button: event queue full, dropping {:?}", self.command);
        }
    }
}

/// Drive the protocol from the event channel, forever
pub async fn run_sync<S: LightStateSink + ?Sized>(
    protocol: &mut SyncProtocol<'_, S>,
    events: EventReceiver<'_>,
    actions: ActionSender<'_>,
) -> ! {
    loop {
        let event = events.receive().await;
        match protocol.handle(event, Instant::now()) {
            Ok(produced) => {
                // Admit the whole batch or none of it
                if actions.free_capacity() < produced.len() {
                    log::warn!("sync: outbox full, dropping {} actions", produced.len());
                    continue;
                }
                for action in &produced {
                    if actions.try_send(*action).is_err() {
                        log::warn!("sync: outbox full, dropping {:?}", action);
                    }
                }
            }
            Err(err) => log::warn!("sync: {}", err),
        }
    }
}

/// Emit `event` every `period`, forever
pub async fn run_ticker(events: EventSender<'_>, period: Duration, event: Event) -> ! {
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        if events.try_send(event).is_err() {
            log::debug!("ticker: event queue full, skipping {:?}", event);
        }
    }
}

/// Execute outbound actions in order, forever
pub async fn run_transmitter<L: LinkSender>(
    link: &mut L,
    actions: ActionReceiver<'_>,
    stats: &LinkStats,
) -> ! {
    loop {
        match actions.receive().await {
            Action::Send { to, frame } => {
                let status = link.send(&to, frame.as_bytes()).await;
                stats.record(status);
                if status == DeliveryStatus::Failed {
                    log::debug!("link: send to {} failed", to);
                }
            }
            Action::Pause(duration) => Timer::after(duration).await,
        }
    }
}

/// Forward inbound datagrams to the protocol, forever
pub async fn run_receiver<L: LinkReceiver>(link: &mut L, events: EventSender<'_>) -> ! {
    loop {
        let datagram = link.receive().await;
        if events.try_send(Event::Datagram(datagram)).is_err() {
            log::warn!("link: event queue full, dropping datagram from {}", datagram.from);
        }
    }
}
